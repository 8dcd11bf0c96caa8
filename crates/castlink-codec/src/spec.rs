use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::mulaw::MuLawCodec;
use crate::pcm::Pcm16Codec;
use crate::traits::VoiceCodec;

/// Default frame length: 20 ms at 8 kHz.
pub const DEFAULT_FRAME_SAMPLES: usize = 160;

/// Names a codec and its frame length.
///
/// Both stations must use the same spec; the frame sizes it yields are
/// link-wide constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CodecSpec {
    MuLaw { samples_per_frame: usize },
    Pcm16 { samples_per_frame: usize },
}

impl Default for CodecSpec {
    fn default() -> Self {
        CodecSpec::MuLaw {
            samples_per_frame: DEFAULT_FRAME_SAMPLES,
        }
    }
}

impl CodecSpec {
    /// Build a fresh codec instance for one stream.
    pub fn build(&self) -> Result<Box<dyn VoiceCodec + Send>> {
        let codec: Box<dyn VoiceCodec + Send> = match *self {
            CodecSpec::MuLaw { samples_per_frame } => Box::new(MuLawCodec::new(samples_per_frame)?),
            CodecSpec::Pcm16 { samples_per_frame } => Box::new(Pcm16Codec::new(samples_per_frame)?),
        };
        debug!(
            codec = codec.name(),
            samples = codec.samples_per_frame(),
            bytes = codec.bytes_per_frame(),
            "codec created"
        );
        Ok(codec)
    }

    pub fn samples_per_frame(&self) -> usize {
        match *self {
            CodecSpec::MuLaw { samples_per_frame } | CodecSpec::Pcm16 { samples_per_frame } => {
                samples_per_frame
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CodecSpec::MuLaw { .. } => "mulaw",
            CodecSpec::Pcm16 { .. } => "pcm16",
        }
    }
}
