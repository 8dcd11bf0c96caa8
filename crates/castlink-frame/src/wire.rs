//! Legacy wire constants.
//!
//! These values are fixed by the stations already in the field and must not
//! change.

use castlink_transport::MAX_PACKET_SIZE;

/// Packet size on air. Binary packets always use all of it.
pub const PACKET_SIZE: usize = MAX_PACKET_SIZE;

/// Payload bytes per binary packet (one byte goes to the length).
pub const MAX_CHUNK: usize = PACKET_SIZE - 1;

/// Binary control byte that ends a voice stream.
pub const END_OF_STREAM: u8 = 0xFF;

/// Filler for the bytes after the end-of-stream control byte.
pub const END_FILL: u8 = 0xEE;

/// Literal that ends a text message.
pub const TEXT_SENTINEL: &[u8; 3] = b"EOF";

/// Which form of the text sentinel a transmitter emits.
///
/// Receivers accept both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SentinelForm {
    /// `EOF`, three bytes.
    Bare,
    /// `EOF\0`, four bytes, as sent by the original transmitters.
    #[default]
    NulTerminated,
}

impl SentinelForm {
    pub fn bytes(self) -> &'static [u8] {
        match self {
            SentinelForm::Bare => b"EOF",
            SentinelForm::NulTerminated => b"EOF\0",
        }
    }
}

/// True when a text packet ends the message.
///
/// Matches on the first three bytes, like the deployed receivers do. A text
/// chunk that happens to start with `EOF` therefore ends the message early.
pub fn is_text_sentinel(packet: &[u8]) -> bool {
    packet.len() >= TEXT_SENTINEL.len() && packet[..TEXT_SENTINEL.len()] == TEXT_SENTINEL[..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_sentinel_forms_are_recognised() {
        assert!(is_text_sentinel(SentinelForm::Bare.bytes()));
        assert!(is_text_sentinel(SentinelForm::NulTerminated.bytes()));
    }

    #[test]
    fn sentinel_match_is_a_prefix_match() {
        assert!(is_text_sentinel(b"EOF and more"));
        assert!(!is_text_sentinel(b"EO"));
        assert!(!is_text_sentinel(b"eof"));
        assert!(!is_text_sentinel(b" EOF"));
    }

    #[test]
    fn chunk_budget_leaves_room_for_length_byte() {
        assert_eq!(PACKET_SIZE, 32);
        assert_eq!(MAX_CHUNK, 31);
    }
}
