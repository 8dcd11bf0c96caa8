use bytes::Bytes;

use crate::error::{Result, TransportError};

/// Largest packet the radio link carries, in bytes.
pub const MAX_PACKET_SIZE: usize = 32;

/// One unit exchanged over a [`Channel`](crate::Channel).
///
/// A packet is an opaque byte string of at most [`MAX_PACKET_SIZE`] bytes.
/// How the bytes are interpreted (raw text or length-prefixed) is decided by
/// the framing layer, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    data: Bytes,
}

impl Packet {
    /// Create a packet, rejecting payloads longer than [`MAX_PACKET_SIZE`].
    pub fn new(data: impl Into<Bytes>) -> Result<Self> {
        let data = data.into();
        if data.len() > MAX_PACKET_SIZE {
            return Err(TransportError::PacketTooLarge {
                size: data.len(),
                max: MAX_PACKET_SIZE,
            });
        }
        Ok(Self { data })
    }

    /// Copy a slice into a new packet.
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        Self::new(Bytes::copy_from_slice(data))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consume the packet and return its bytes.
    pub fn into_bytes(self) -> Bytes {
        self.data
    }
}

impl AsRef<[u8]> for Packet {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
