use std::time::Duration;

use bytes::Bytes;
use castlink_codec::CodecSpec;
use castlink_frame::{PacketWriter, SendStats};
use castlink_transport::Channel;
use tracing::info;

use crate::config::StationConfig;
use crate::error::{Result, StationError};
use crate::mode::ModeTag;

/// Sending half of a station: a mode tag, a pause, then the payload.
pub struct Transmitter<T> {
    writer: PacketWriter<T>,
    codec: CodecSpec,
    mode_gap: Duration,
}

impl<T: Channel> Transmitter<T> {
    pub fn new(channel: T, config: &StationConfig) -> Self {
        Self {
            writer: PacketWriter::with_config(channel, config.frame.clone()),
            codec: config.codec,
            mode_gap: config.mode_gap,
        }
    }

    /// Send a tag message on its own and wait out the mode gap.
    pub fn send_tag(&mut self, tag: ModeTag) -> Result<SendStats> {
        let stats = self.writer.send_text(tag.as_str())?;
        if !self.mode_gap.is_zero() {
            std::thread::sleep(self.mode_gap);
        }
        Ok(stats)
    }

    /// Send `message` under a text mode (STT, TTS or TTT).
    pub fn send_text(&mut self, tag: ModeTag, message: &str) -> Result<SendStats> {
        if tag.is_voice() {
            return Err(StationError::NotTextMode(tag));
        }
        let tag_stats = self.send_tag(tag)?;
        let mut stats = self
            .writer
            .send_text(Bytes::copy_from_slice(message.as_bytes()))?;
        stats.packets += tag_stats.packets;

        info!(mode = %tag, bytes = message.len(), packets = stats.packets, "text message sent");
        Ok(stats)
    }

    /// Send `samples` as an STS voice stream.
    pub fn send_voice(&mut self, samples: &[i16]) -> Result<SendStats> {
        let mut codec = self.codec.build()?;
        let tag_stats = self.send_tag(ModeTag::Sts)?;
        let mut stats = self.writer.send_voice(&mut codec, samples)?;
        stats.packets += tag_stats.packets;

        info!(
            mode = %ModeTag::Sts,
            frames = stats.frames,
            packets = stats.packets,
            "voice message sent"
        );
        Ok(stats)
    }

    pub fn codec(&self) -> CodecSpec {
        self.codec
    }

    pub fn get_ref(&self) -> &T {
        self.writer.get_ref()
    }

    pub fn get_mut(&mut self) -> &mut T {
        self.writer.get_mut()
    }

    pub fn into_inner(self) -> T {
        self.writer.into_inner()
    }
}
