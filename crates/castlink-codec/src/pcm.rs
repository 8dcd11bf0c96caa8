use crate::error::{CodecError, Result};
use crate::traits::{check_len, VoiceCodec};

/// Uncompressed 16-bit little-endian PCM.
///
/// Two bytes per sample and lossless, so decoded output can be compared
/// exactly with what was sent.
#[derive(Debug, Clone)]
pub struct Pcm16Codec {
    samples_per_frame: usize,
}

impl Pcm16Codec {
    pub fn new(samples_per_frame: usize) -> Result<Self> {
        if samples_per_frame == 0 {
            return Err(CodecError::EmptyFrame);
        }
        Ok(Self { samples_per_frame })
    }
}

impl VoiceCodec for Pcm16Codec {
    fn name(&self) -> &'static str {
        "pcm16"
    }

    fn samples_per_frame(&self) -> usize {
        self.samples_per_frame
    }

    fn bytes_per_frame(&self) -> usize {
        self.samples_per_frame * 2
    }

    fn encode(&mut self, samples: &[i16], out: &mut [u8]) -> Result<()> {
        check_len("sample frame", self.samples_per_frame, samples.len())?;
        check_len("output buffer", self.bytes_per_frame(), out.len())?;
        for (dst, sample) in out.chunks_exact_mut(2).zip(samples) {
            dst.copy_from_slice(&sample.to_le_bytes());
        }
        Ok(())
    }

    fn decode(&mut self, frame: &[u8], out: &mut [i16]) -> Result<()> {
        check_len("compressed frame", self.bytes_per_frame(), frame.len())?;
        check_len("output buffer", self.samples_per_frame, out.len())?;
        for (dst, src) in out.iter_mut().zip(frame.chunks_exact(2)) {
            *dst = i16::from_le_bytes([src[0], src[1]]);
        }
        Ok(())
    }
}
