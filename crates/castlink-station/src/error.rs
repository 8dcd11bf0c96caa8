use castlink_codec::CodecError;
use castlink_frame::FrameError;
use castlink_transport::TransportError;

use crate::mode::ModeTag;

/// Errors that can occur in station operations.
#[derive(Debug, thiserror::Error)]
pub enum StationError {
    /// Framing-level error, including channel failures.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// Codec could not be built for a voice session.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// A string that names none of the four modes.
    #[error("unknown mode {0:?}")]
    UnknownMode(String),

    /// A text payload was offered for a voice mode.
    #[error("mode {0} carries voice, not text")]
    NotTextMode(ModeTag),
}

impl StationError {
    /// The underlying channel error, if this is one.
    pub fn transport(&self) -> Option<&TransportError> {
        match self {
            StationError::Frame(FrameError::Transport(err)) => Some(err),
            _ => None,
        }
    }

    /// True for a receive that ran past its timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self.transport(), Some(TransportError::Timeout(_)))
    }

    /// True when the channel will not deliver another packet.
    pub fn is_closed(&self) -> bool {
        self.transport().is_some_and(TransportError::is_closed)
    }
}

impl From<TransportError> for StationError {
    fn from(err: TransportError) -> Self {
        StationError::Frame(FrameError::Transport(err))
    }
}

/// Failure reported by a [`MessageHandler`](crate::MessageHandler).
///
/// The dispatcher logs these and carries on.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// Storage or playback I/O failed.
    #[error("{context}: {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },

    /// An external tool exited unsuccessfully.
    #[error("{tool} failed: {detail}")]
    Tool { tool: String, detail: String },

    #[error("{0}")]
    Other(String),
}

impl HandlerError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        HandlerError::Io {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, StationError>;
