//! Text and voice framing over fixed-size radio packets.
//!
//! Two framing disciplines share one channel:
//! - **Text**: each packet carries raw message bytes; a packet starting
//!   with `EOF` ends the message.
//! - **Binary**: each 32-byte packet carries a length byte (1–31) and that
//!   many payload bytes; a length byte of `0xFF` ends the stream.
//!
//! Both are expressed as [`Envelope`]s (discipline + kind + payload) so the
//! rest of the stack never touches raw packet layouts. The
//! [`FrameReassembler`] bridges arbitrary packet payload sizes to the voice
//! codec's fixed frame size.

pub mod config;
pub mod envelope;
pub mod error;
pub mod reader;
pub mod reassembler;
pub mod wire;
pub mod writer;

pub use config::FrameConfig;
pub use envelope::{
    chunk_text, chunk_voice, decode_envelope, encode_envelope, Discipline, Envelope, EnvelopeKind,
};
pub use error::{FrameError, Result};
pub use reader::PacketReader;
pub use reassembler::{FrameReassembler, VoiceMessage};
pub use wire::{
    is_text_sentinel, SentinelForm, END_FILL, END_OF_STREAM, MAX_CHUNK, PACKET_SIZE, TEXT_SENTINEL,
};
pub use writer::{PacketWriter, SendStats};
