use std::time::Duration;

use castlink_transport::PollPolicy;

use crate::error::{FrameError, Result};
use crate::wire::{SentinelForm, PACKET_SIZE};

/// Pause after each text chunk. The only flow control the link has.
pub const DEFAULT_TEXT_CHUNK_DELAY: Duration = Duration::from_millis(500);

/// Configuration for packet readers and writers.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Bytes per text packet, `1..=32`. Default: 32.
    pub text_chunk_size: usize,
    /// Sentinel form emitted after a text message.
    pub sentinel: SentinelForm,
    /// Pause after each text chunk. Default: 500 ms.
    pub text_chunk_delay: Duration,
    /// Pause after each voice packet. Default: none.
    pub voice_packet_delay: Duration,
    /// How receives wait for packets. Default: poll every 100 ms, forever.
    pub poll: PollPolicy,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            text_chunk_size: PACKET_SIZE,
            sentinel: SentinelForm::default(),
            text_chunk_delay: DEFAULT_TEXT_CHUNK_DELAY,
            voice_packet_delay: Duration::ZERO,
            poll: PollPolicy::default(),
        }
    }
}

impl FrameConfig {
    /// Check values that would otherwise produce an unreadable stream.
    pub fn validate(&self) -> Result<()> {
        if self.text_chunk_size == 0 || self.text_chunk_size > PACKET_SIZE {
            return Err(FrameError::InvalidChunkSize {
                size: self.text_chunk_size,
                max: PACKET_SIZE,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployed_stations() {
        let cfg = FrameConfig::default();
        assert_eq!(cfg.text_chunk_size, 32);
        assert_eq!(cfg.sentinel, SentinelForm::NulTerminated);
        assert_eq!(cfg.text_chunk_delay, Duration::from_millis(500));
        assert_eq!(cfg.voice_packet_delay, Duration::ZERO);
        assert_eq!(cfg.poll.timeout, None);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn chunk_size_bounds() {
        for size in [0usize, 33, 64] {
            let cfg = FrameConfig {
                text_chunk_size: size,
                ..FrameConfig::default()
            };
            assert!(matches!(
                cfg.validate(),
                Err(FrameError::InvalidChunkSize { .. })
            ));
        }
        let cfg = FrameConfig {
            text_chunk_size: 1,
            ..FrameConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }
}
