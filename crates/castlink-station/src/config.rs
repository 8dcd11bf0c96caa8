use std::time::Duration;

use castlink_codec::CodecSpec;
use castlink_frame::FrameConfig;

/// Pause between a mode tag and its payload.
pub const DEFAULT_MODE_GAP: Duration = Duration::from_millis(500);

/// Configuration shared by the dispatcher and transmitter of a station.
#[derive(Debug, Clone)]
pub struct StationConfig {
    pub frame: FrameConfig,
    /// Voice codec. Both stations must agree on it.
    pub codec: CodecSpec,
    /// Pause after the tag, before the payload. Default: 500 ms.
    pub mode_gap: Duration,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self::new(FrameConfig::default(), CodecSpec::default())
    }
}

impl StationConfig {
    pub fn new(frame: FrameConfig, codec: CodecSpec) -> Self {
        Self {
            frame,
            codec,
            mode_gap: DEFAULT_MODE_GAP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_legacy_pacing() {
        let config = StationConfig::default();
        assert_eq!(config.mode_gap, Duration::from_millis(500));
        assert_eq!(config.frame.text_chunk_delay, Duration::from_millis(500));
        assert_eq!(config.codec, CodecSpec::default());
        assert!(config.frame.poll.timeout.is_none());
    }
}
