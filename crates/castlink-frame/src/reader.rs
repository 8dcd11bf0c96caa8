use bytes::{Bytes, BytesMut};
use castlink_codec::VoiceCodec;
use castlink_transport::{Channel, Packet, PollPolicy};
use tracing::{debug, trace};

use crate::config::FrameConfig;
use crate::envelope::{decode_envelope, Discipline, EnvelopeKind};
use crate::error::Result;
use crate::reassembler::{FrameReassembler, VoiceMessage};

/// Reads complete messages from a packet [`Channel`].
///
/// Packet polling, sentinel detection, and frame reassembly happen here;
/// callers get whole messages.
pub struct PacketReader<T> {
    inner: T,
    config: FrameConfig,
}

impl<T: Channel> PacketReader<T> {
    /// Create a new reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self { inner, config }
    }

    /// Read one text message (blocking until its sentinel arrives).
    ///
    /// Packet bytes are concatenated in arrival order. The first packet that
    /// starts with `EOF` ends the message and is not part of it.
    pub fn read_text(&mut self) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        let mut packets = 0usize;
        loop {
            let envelope = decode_envelope(Discipline::Text, self.next_packet()?);
            match envelope.kind {
                EnvelopeKind::End => {
                    debug!(packets, bytes = buf.len(), "text message complete");
                    return Ok(buf.freeze());
                }
                EnvelopeKind::Data => {
                    packets += 1;
                    trace!(len = envelope.payload.len(), "text chunk");
                    buf.extend_from_slice(&envelope.payload);
                }
                EnvelopeKind::Noise => {}
            }
        }
    }

    /// Read one voice stream and decode it with `codec`.
    ///
    /// Runs until the end-of-stream packet. Packets with an invalid length
    /// byte are dropped; a partial frame left at the end is discarded.
    pub fn read_voice<C: VoiceCodec>(&mut self, codec: C) -> Result<VoiceMessage> {
        let mut reassembler = FrameReassembler::new(codec);
        loop {
            let envelope = decode_envelope(Discipline::Binary, self.next_packet()?);
            match envelope.kind {
                EnvelopeKind::End => {
                    let message = reassembler.finish();
                    debug!(
                        frames = message.frames,
                        discarded = message.discarded_bytes,
                        noise = message.noise_packets,
                        "voice stream complete"
                    );
                    return Ok(message);
                }
                EnvelopeKind::Data => {
                    reassembler.push(&envelope.payload)?;
                }
                EnvelopeKind::Noise => {
                    debug!(len = envelope.payload.len(), "dropping noise packet");
                    reassembler.note_noise();
                }
            }
        }
    }

    fn next_packet(&mut self) -> Result<Packet> {
        Ok(self.inner.recv(&self.config.poll)?)
    }

    /// Borrow the underlying channel.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying channel.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner channel.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Replace the receive policy for subsequent reads.
    pub fn set_poll_policy(&mut self, poll: PollPolicy) {
        self.config.poll = poll;
    }

    /// Current reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
