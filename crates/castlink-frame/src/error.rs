use castlink_codec::CodecError;
use castlink_transport::TransportError;

/// Errors that can occur while framing or reassembling messages.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The underlying channel failed.
    #[error("channel error: {0}")]
    Transport(#[from] TransportError),

    /// The voice codec rejected a frame.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// A chunk does not fit the packet layout of its discipline.
    #[error("chunk too large ({size} bytes, max {max})")]
    ChunkTooLarge { size: usize, max: usize },

    /// Binary data chunks must carry at least one byte.
    #[error("binary chunk must not be empty")]
    EmptyChunk,

    /// The configured text chunk size is outside `1..=32`.
    #[error("text chunk size {size} outside 1..={max}")]
    InvalidChunkSize { size: usize, max: usize },

    /// Noise envelopes describe received garbage and cannot be sent.
    #[error("noise envelopes cannot be encoded")]
    NoiseNotEncodable,
}

pub type Result<T> = std::result::Result<T, FrameError>;
