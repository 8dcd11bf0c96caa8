use crate::error::{CodecError, Result};
use crate::traits::{check_len, VoiceCodec};

const BIAS: i32 = 0x84;
const CLIP: i32 = 32635;

/// G.711 μ-law codec: 14-bit dynamic range in one byte per sample.
#[derive(Debug, Clone)]
pub struct MuLawCodec {
    samples_per_frame: usize,
}

impl MuLawCodec {
    pub fn new(samples_per_frame: usize) -> Result<Self> {
        if samples_per_frame == 0 {
            return Err(CodecError::EmptyFrame);
        }
        Ok(Self { samples_per_frame })
    }
}

impl VoiceCodec for MuLawCodec {
    fn name(&self) -> &'static str {
        "mulaw"
    }

    fn samples_per_frame(&self) -> usize {
        self.samples_per_frame
    }

    fn bytes_per_frame(&self) -> usize {
        self.samples_per_frame
    }

    fn encode(&mut self, samples: &[i16], out: &mut [u8]) -> Result<()> {
        check_len("sample frame", self.samples_per_frame, samples.len())?;
        check_len("output buffer", self.bytes_per_frame(), out.len())?;
        for (dst, &sample) in out.iter_mut().zip(samples) {
            *dst = linear_to_ulaw(sample);
        }
        Ok(())
    }

    fn decode(&mut self, frame: &[u8], out: &mut [i16]) -> Result<()> {
        check_len("compressed frame", self.bytes_per_frame(), frame.len())?;
        check_len("output buffer", self.samples_per_frame, out.len())?;
        for (dst, &byte) in out.iter_mut().zip(frame) {
            *dst = ulaw_to_linear(byte);
        }
        Ok(())
    }
}

/// Compress one 16-bit sample.
pub fn linear_to_ulaw(sample: i16) -> u8 {
    let mut pcm = i32::from(sample);
    let sign = if pcm < 0 {
        pcm = -pcm;
        0x80
    } else {
        0x00
    };
    pcm = pcm.min(CLIP) + BIAS;

    // pcm is in 0x84..=0x7FFF here, so the segment byte is never zero.
    let segment = (pcm >> 7) as u8;
    let exponent = 7 - segment.leading_zeros() as i32;
    let mantissa = (pcm >> (exponent + 3)) & 0x0F;

    !((sign | (exponent << 4) | mantissa) as u8)
}

/// Expand one μ-law byte.
pub fn ulaw_to_linear(byte: u8) -> i16 {
    let u = !byte;
    let exponent = i32::from((u >> 4) & 0x07);
    let mantissa = i32::from(u & 0x0F);
    let magnitude = (((mantissa << 3) + BIAS) << exponent) - BIAS;

    if u & 0x80 != 0 {
        -magnitude as i16
    } else {
        magnitude as i16
    }
}
