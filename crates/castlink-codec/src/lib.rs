//! Fixed-frame voice codec interface for castlink.
//!
//! The link never looks inside compressed audio. It only needs two
//! constants from the codec, samples per frame and bytes per frame, and a
//! way to turn one into the other. [`VoiceCodec`] is that contract.
//!
//! Two reference codecs ship with the crate:
//! - [`MuLawCodec`]: ITU-T G.711 μ-law, one byte per sample
//! - [`Pcm16Codec`]: little-endian 16-bit PCM, lossless
//!
//! [`CodecSpec`] names a codec and its frame length so both stations can
//! agree on the same constants and build a fresh codec per session.

pub mod error;
pub mod mulaw;
pub mod pcm;
pub mod spec;
pub mod traits;

pub use error::{CodecError, Result};
pub use mulaw::MuLawCodec;
pub use pcm::Pcm16Codec;
pub use spec::{CodecSpec, DEFAULT_FRAME_SAMPLES};
pub use traits::VoiceCodec;

/// Link audio sample rate in Hz (mono).
pub const SAMPLE_RATE: u32 = 8000;
