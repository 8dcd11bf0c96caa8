use std::io::ErrorKind;
use std::os::unix::fs::{FileTypeExt, MetadataExt};
use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::{Result, TransportError};
use crate::packet::{Packet, MAX_PACKET_SIZE};
use crate::traits::Channel;

/// Pause between sends while the peer's receive queue is full.
const SEND_BACKOFF: Duration = Duration::from_millis(1);
/// How long a send waits on a full queue before the packet is dropped.
const SEND_BACKOFF_LIMIT: Duration = Duration::from_secs(2);

/// Packet channel over Unix datagram sockets.
///
/// Each station binds its own socket path and sends to the peer's path, one
/// datagram per packet. Stands in for the radio on a single host: like the
/// radio, a datagram nobody is listening for is simply lost.
pub struct UnixDatagramChannel {
    socket: UnixDatagram,
    path: PathBuf,
    peer: Option<PathBuf>,
    created_inode: Option<(u64, u64)>,
}

impl UnixDatagramChannel {
    /// Maximum socket path length.
    /// Unix `sockaddr_un.sun_path` is typically 108 bytes on Linux, 104 on macOS.
    #[cfg(target_os = "linux")]
    const MAX_PATH_LEN: usize = 108;
    #[cfg(not(target_os = "linux"))]
    const MAX_PATH_LEN: usize = 104;

    /// Bind the local end of the channel at `path`.
    ///
    /// A stale socket file at `path` is removed first. Any other kind of
    /// file is left alone and the bind fails.
    pub fn bind(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        check_path_len(&path, Self::MAX_PATH_LEN)?;

        if path.exists() {
            let metadata = std::fs::symlink_metadata(&path).map_err(|e| TransportError::Bind {
                path: path.clone(),
                source: e,
            })?;
            if !metadata.file_type().is_socket() {
                return Err(TransportError::Bind {
                    path: path.clone(),
                    source: std::io::Error::new(
                        ErrorKind::AlreadyExists,
                        "existing path is not a unix socket",
                    ),
                });
            }
            debug!(?path, "removing stale socket");
            std::fs::remove_file(&path).map_err(|e| TransportError::Bind {
                path: path.clone(),
                source: e,
            })?;
        }

        let socket = UnixDatagram::bind(&path).map_err(|e| TransportError::Bind {
            path: path.clone(),
            source: e,
        })?;
        socket.set_nonblocking(true)?;

        let created = std::fs::symlink_metadata(&path).map_err(|e| TransportError::Bind {
            path: path.clone(),
            source: e,
        })?;

        info!(?path, "bound datagram channel");
        Ok(Self {
            socket,
            path,
            peer: None,
            created_inode: Some((created.dev(), created.ino())),
        })
    }

    /// Bind at `local` and address every send to `peer`.
    pub fn open(local: impl AsRef<Path>, peer: impl AsRef<Path>) -> Result<Self> {
        let mut channel = Self::bind(local)?;
        channel.connect(peer)?;
        Ok(channel)
    }

    /// Set the peer socket path that sends go to.
    ///
    /// The peer does not need to be bound yet; sends made while nobody is
    /// listening are dropped.
    pub fn connect(&mut self, peer: impl AsRef<Path>) -> Result<()> {
        let peer = peer.as_ref().to_path_buf();
        check_path_len(&peer, Self::MAX_PATH_LEN)?;
        debug!(?peer, "datagram channel peer set");
        self.peer = Some(peer);
        Ok(())
    }

    /// The path this channel is bound to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The peer path, if connected.
    pub fn peer(&self) -> Option<&Path> {
        self.peer.as_deref()
    }
}

fn check_path_len(path: &Path, max: usize) -> Result<()> {
    let len = path.as_os_str().len();
    if len >= max {
        return Err(TransportError::PathTooLong {
            path: path.to_path_buf(),
            len,
            max,
        });
    }
    Ok(())
}

impl Channel for UnixDatagramChannel {
    fn send(&mut self, packet: &Packet) -> Result<()> {
        let Some(peer) = self.peer.as_ref() else {
            return Err(TransportError::Disconnected);
        };
        let started = Instant::now();
        loop {
            match self.socket.send_to(packet.as_bytes(), peer) {
                Ok(_) => return Ok(()),
                // Nobody listening: the packet is lost, as it would be on air.
                Err(err)
                    if matches!(
                        err.kind(),
                        ErrorKind::NotFound | ErrorKind::ConnectionRefused
                    ) =>
                {
                    debug!(?peer, "peer not listening; packet lost");
                    return Ok(());
                }
                // Peer queue full: wait for it to drain, then give the packet up.
                Err(err) if err.kind() == ErrorKind::WouldBlock => {
                    if started.elapsed() >= SEND_BACKOFF_LIMIT {
                        warn!(?peer, "peer queue full; packet lost");
                        return Ok(());
                    }
                    std::thread::sleep(SEND_BACKOFF);
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }

    fn try_recv(&mut self) -> Result<Option<Packet>> {
        let mut buf = [0u8; MAX_PACKET_SIZE + 1];
        loop {
            match self.socket.recv(&mut buf) {
                Ok(n) if n > MAX_PACKET_SIZE => {
                    warn!(len = n, "dropping oversized datagram");
                    continue;
                }
                Ok(n) => return Packet::from_slice(&buf[..n]).map(Some),
                Err(err) if err.kind() == ErrorKind::WouldBlock => return Ok(None),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }
}

impl Drop for UnixDatagramChannel {
    fn drop(&mut self) {
        if let Some((expected_dev, expected_ino)) = self.created_inode {
            if let Ok(metadata) = std::fs::symlink_metadata(&self.path) {
                if metadata.file_type().is_socket()
                    && metadata.dev() == expected_dev
                    && metadata.ino() == expected_ino
                {
                    debug!(path = ?self.path, "cleaning up socket file");
                    let _ = std::fs::remove_file(&self.path);
                } else {
                    debug!(
                        path = ?self.path,
                        "socket path identity changed; skipping cleanup"
                    );
                }
            }
        }
    }
}

impl std::fmt::Debug for UnixDatagramChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnixDatagramChannel")
            .field("path", &self.path)
            .field("peer", &self.peer)
            .finish()
    }
}
