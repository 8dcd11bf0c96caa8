use crate::error::{CodecError, Result};

/// A fixed-size audio frame codec.
///
/// `encode` turns exactly [`samples_per_frame`](Self::samples_per_frame)
/// samples into exactly [`bytes_per_frame`](Self::bytes_per_frame) bytes;
/// `decode` does the reverse. Both sizes are constant for the lifetime of a
/// codec instance. Codecs may keep state between frames, so one instance
/// serves one stream.
pub trait VoiceCodec {
    /// Short codec name for logs.
    fn name(&self) -> &'static str;

    fn samples_per_frame(&self) -> usize;

    fn bytes_per_frame(&self) -> usize;

    /// Compress one frame of samples into `out`.
    fn encode(&mut self, samples: &[i16], out: &mut [u8]) -> Result<()>;

    /// Expand one compressed frame into `out`.
    fn decode(&mut self, frame: &[u8], out: &mut [i16]) -> Result<()>;
}

impl<C: VoiceCodec + ?Sized> VoiceCodec for Box<C> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn samples_per_frame(&self) -> usize {
        (**self).samples_per_frame()
    }

    fn bytes_per_frame(&self) -> usize {
        (**self).bytes_per_frame()
    }

    fn encode(&mut self, samples: &[i16], out: &mut [u8]) -> Result<()> {
        (**self).encode(samples, out)
    }

    fn decode(&mut self, frame: &[u8], out: &mut [i16]) -> Result<()> {
        (**self).decode(frame, out)
    }
}

impl<C: VoiceCodec + ?Sized> VoiceCodec for &mut C {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn samples_per_frame(&self) -> usize {
        (**self).samples_per_frame()
    }

    fn bytes_per_frame(&self) -> usize {
        (**self).bytes_per_frame()
    }

    fn encode(&mut self, samples: &[i16], out: &mut [u8]) -> Result<()> {
        (**self).encode(samples, out)
    }

    fn decode(&mut self, frame: &[u8], out: &mut [i16]) -> Result<()> {
        (**self).decode(frame, out)
    }
}

pub(crate) fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(CodecError::FrameSize {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}
