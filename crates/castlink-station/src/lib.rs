//! Station-level logic for a castlink radio link.
//!
//! Every logical message on the link is a pair: a text-framed mode tag
//! followed by a payload in the discipline the tag selects. The
//! [`Dispatcher`] reads tags, opens one [`Session`] at a time, and hands
//! completed messages to a [`MessageHandler`]. The [`Transmitter`] is the
//! sending half.
//!
//! | Tag   | Payload        | Receiver action        |
//! |-------|----------------|------------------------|
//! | `STS` | voice stream   | decode, play or store  |
//! | `STT` | text           | store transcription    |
//! | `TTS` | text           | store, speak           |
//! | `TTT` | text           | store                  |

pub mod classifier;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod message;
pub mod mode;
pub mod session;
pub mod transmitter;

pub use classifier::{is_emergency, matched_keywords, EMERGENCY_KEYWORDS};
pub use config::{StationConfig, DEFAULT_MODE_GAP};
pub use dispatcher::{DispatchOutcome, DispatchState, DispatchStats, Dispatcher};
pub use error::{HandlerError, Result, StationError};
pub use handler::MessageHandler;
pub use message::{Message, TextMessage};
pub use mode::ModeTag;
pub use session::Session;
pub use transmitter::Transmitter;
