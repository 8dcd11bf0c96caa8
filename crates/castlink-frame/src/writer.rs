use std::time::Duration;

use bytes::Bytes;
use castlink_codec::VoiceCodec;
use castlink_transport::Channel;
use tracing::{debug, trace};

use crate::config::FrameConfig;
use crate::envelope::{chunk_text, chunk_voice, encode_envelope, Envelope};
use crate::error::Result;

/// Counters for one transmitted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SendStats {
    /// Packets put on the channel, sentinel included.
    pub packets: usize,
    /// Voice frames encoded (zero for text).
    pub frames: usize,
    /// Trailing samples that did not fill a whole frame and were not sent.
    pub dropped_samples: usize,
}

/// Writes complete messages to a packet [`Channel`].
pub struct PacketWriter<T> {
    inner: T,
    config: FrameConfig,
}

impl<T: Channel> PacketWriter<T> {
    /// Create a new writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self { inner, config }
    }

    /// Encode and send a single envelope.
    pub fn send_envelope(&mut self, envelope: &Envelope) -> Result<()> {
        let packet = encode_envelope(envelope, self.config.sentinel)?;
        self.inner.send(&packet)?;
        Ok(())
    }

    /// Send a text message followed by the sentinel packet.
    ///
    /// Each chunk is followed by the configured inter-chunk delay. The
    /// message is sent as-is: if a chunk starts with `EOF` the receiver
    /// will cut the message short there.
    pub fn send_text(&mut self, message: impl Into<Bytes>) -> Result<SendStats> {
        self.config.validate()?;
        let message = message.into();
        let mut stats = SendStats::default();

        for envelope in chunk_text(&message, self.config.text_chunk_size) {
            self.send_envelope(&envelope)?;
            stats.packets += 1;
            trace!(len = envelope.payload.len(), "sent text chunk");
            pause(self.config.text_chunk_delay);
        }
        self.send_envelope(&Envelope::text_end())?;
        stats.packets += 1;

        debug!(bytes = message.len(), packets = stats.packets, "text message sent");
        Ok(stats)
    }

    /// Encode `samples` frame by frame and send them as a voice stream,
    /// followed by the end-of-stream packet.
    ///
    /// Only whole frames are sent; a trailing partial frame is dropped.
    pub fn send_voice<C: VoiceCodec>(&mut self, codec: &mut C, samples: &[i16]) -> Result<SendStats> {
        let samples_per_frame = codec.samples_per_frame();
        let mut compressed = vec![0u8; codec.bytes_per_frame()];
        let mut stats = SendStats::default();

        let frames = samples.chunks_exact(samples_per_frame);
        stats.dropped_samples = frames.remainder().len();
        for frame in frames {
            codec.encode(frame, &mut compressed)?;
            for envelope in chunk_voice(&compressed) {
                self.send_envelope(&envelope)?;
                stats.packets += 1;
                pause(self.config.voice_packet_delay);
            }
            stats.frames += 1;
        }
        self.send_envelope(&Envelope::voice_end())?;
        stats.packets += 1;

        debug!(
            codec = codec.name(),
            frames = stats.frames,
            packets = stats.packets,
            dropped_samples = stats.dropped_samples,
            "voice stream sent"
        );
        Ok(stats)
    }

    /// Borrow the underlying channel.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying channel.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner channel.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

fn pause(delay: Duration) {
    if !delay.is_zero() {
        std::thread::sleep(delay);
    }
}
