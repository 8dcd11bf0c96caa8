//! Point-to-point text and voice messaging over 32-byte radio packets.
//!
//! castlink carries four kinds of traffic between two stations, selected
//! by a mode tag sent ahead of each message: speech to speech (`STS`),
//! speech to text (`STT`), text to speech (`TTS`) and text to text (`TTT`).
//!
//! # Crate Structure
//!
//! - [`transport`]: packet channel abstraction (in-memory, Unix datagram)
//! - [`codec`]: fixed-frame voice codecs
//! - [`frame`]: text and voice framing, frame reassembly
//! - [`station`]: mode dispatch, sessions, emergency classification

/// Re-export transport types.
pub mod transport {
    pub use castlink_transport::*;
}

/// Re-export codec types.
pub mod codec {
    pub use castlink_codec::*;
}

/// Re-export frame types.
pub mod frame {
    pub use castlink_frame::*;
}

/// Re-export station types.
pub mod station {
    pub use castlink_station::*;
}
