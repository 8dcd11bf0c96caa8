use std::path::PathBuf;
use std::time::Duration;

/// Errors that can occur in channel operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to bind to the specified address.
    #[error("failed to bind to {path}: {source}")]
    Bind {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to connect to the specified address.
    #[error("failed to connect to {path}: {source}")]
    Connect {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error occurred on the channel.
    #[error("channel I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The socket path is too long for the platform.
    #[error("socket path too long ({len} bytes, max {max}): {path}")]
    PathTooLong {
        path: PathBuf,
        len: usize,
        max: usize,
    },

    /// A packet exceeds the radio payload size.
    #[error("packet too large ({size} bytes, max {max})")]
    PacketTooLarge { size: usize, max: usize },

    /// No packet arrived before the receive deadline.
    #[error("no packet received within {0:?}")]
    Timeout(Duration),

    /// The far end of the channel is gone.
    #[error("channel disconnected")]
    Disconnected,

    /// The channel has been shut down locally.
    #[error("channel shut down")]
    Shutdown,
}

impl TransportError {
    /// True when the channel can never deliver another packet.
    pub fn is_closed(&self) -> bool {
        matches!(self, TransportError::Disconnected | TransportError::Shutdown)
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
