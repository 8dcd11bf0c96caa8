use bytes::BytesMut;
use castlink_codec::{CodecError, VoiceCodec};
use tracing::{debug, trace};

use crate::error::Result;

/// Decoded result of one voice session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VoiceMessage {
    /// Decoded samples, frame after frame.
    pub samples: Vec<i16>,
    /// Number of codec frames decoded.
    pub frames: usize,
    /// Samples per decoded frame.
    pub samples_per_frame: usize,
    /// Payload bytes accepted from valid packets.
    pub received_bytes: usize,
    /// Bytes left over (less than one frame) when the stream ended.
    pub discarded_bytes: usize,
    /// Packets dropped for an invalid length byte.
    pub noise_packets: usize,
}

/// Bridges packet-sized payloads to fixed-size codec frames.
///
/// Payloads of any length are appended to an internal buffer; every time
/// the buffer holds a whole codec frame, that frame is removed from the
/// head and decoded. The decoded output depends only on the concatenated
/// payload bytes, never on how they were split into packets.
///
/// The reassembler owns its codec for the duration of one stream.
pub struct FrameReassembler<C> {
    codec: C,
    buf: BytesMut,
    scratch: Vec<i16>,
    message: VoiceMessage,
}

impl<C: VoiceCodec> FrameReassembler<C> {
    pub fn new(codec: C) -> Self {
        let bytes_per_frame = codec.bytes_per_frame();
        let samples_per_frame = codec.samples_per_frame();
        Self {
            codec,
            buf: BytesMut::with_capacity(bytes_per_frame * 2),
            scratch: vec![0; samples_per_frame],
            message: VoiceMessage {
                samples_per_frame,
                ..VoiceMessage::default()
            },
        }
    }

    /// Append payload bytes and decode every frame that is now complete.
    ///
    /// Returns the number of frames decoded by this call. A codec that
    /// reports zero-length frames is rejected with [`CodecError::EmptyFrame`].
    pub fn push(&mut self, payload: &[u8]) -> Result<usize> {
        let frame_len = self.codec.bytes_per_frame();
        if frame_len == 0 || self.codec.samples_per_frame() == 0 {
            return Err(CodecError::EmptyFrame.into());
        }

        self.buf.extend_from_slice(payload);
        self.message.received_bytes += payload.len();

        let mut decoded = 0;
        while self.buf.len() >= frame_len {
            let frame = self.buf.split_to(frame_len);
            self.codec.decode(&frame, &mut self.scratch)?;
            self.message.samples.extend_from_slice(&self.scratch);
            decoded += 1;
        }
        self.message.frames += decoded;
        if decoded > 0 {
            trace!(decoded, buffered = self.buf.len(), "decoded voice frames");
        }
        Ok(decoded)
    }

    /// Count a packet that was dropped as noise.
    pub fn note_noise(&mut self) {
        self.message.noise_packets += 1;
    }

    /// Bytes waiting for the rest of their frame.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    pub fn frames(&self) -> usize {
        self.message.frames
    }

    /// End the stream, dropping any partial frame.
    pub fn finish(self) -> VoiceMessage {
        let mut message = self.message;
        message.discarded_bytes = self.buf.len();
        if message.discarded_bytes > 0 {
            debug!(
                discarded = message.discarded_bytes,
                "dropping partial voice frame at end of stream"
            );
        }
        message
    }
}
