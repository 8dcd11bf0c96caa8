/// Errors that can occur while encoding or decoding voice frames.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// A buffer does not match the codec's frame size.
    #[error("{what} holds {actual} elements, codec frame needs {expected}")]
    FrameSize {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A codec was configured with zero samples per frame.
    #[error("samples per frame must be greater than zero")]
    EmptyFrame,
}

pub type Result<T> = std::result::Result<T, CodecError>;
