use bytes::{BufMut, Bytes, BytesMut};
use castlink_transport::Packet;
use tracing::trace;

use crate::error::{FrameError, Result};
use crate::wire::{is_text_sentinel, SentinelForm, END_FILL, END_OF_STREAM, MAX_CHUNK, PACKET_SIZE};

/// Which packet layout governs a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discipline {
    /// Raw bytes, literal `EOF` sentinel.
    Text,
    /// Length byte + payload, `0xFF` sentinel.
    Binary,
}

/// What a packet means within its discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeKind {
    /// Carries payload bytes for the current message.
    Data,
    /// Ends the current message or stream.
    End,
    /// Unusable packet (bad length byte); dropped by receivers.
    Noise,
}

/// One packet, independent of its on-air layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub discipline: Discipline,
    pub kind: EnvelopeKind,
    /// Data bytes for `Data`, the raw packet for `Noise`, empty for `End`.
    pub payload: Bytes,
}

impl Envelope {
    pub fn text(payload: impl Into<Bytes>) -> Self {
        Self {
            discipline: Discipline::Text,
            kind: EnvelopeKind::Data,
            payload: payload.into(),
        }
    }

    pub fn text_end() -> Self {
        Self {
            discipline: Discipline::Text,
            kind: EnvelopeKind::End,
            payload: Bytes::new(),
        }
    }

    pub fn voice(payload: impl Into<Bytes>) -> Self {
        Self {
            discipline: Discipline::Binary,
            kind: EnvelopeKind::Data,
            payload: payload.into(),
        }
    }

    pub fn voice_end() -> Self {
        Self {
            discipline: Discipline::Binary,
            kind: EnvelopeKind::End,
            payload: Bytes::new(),
        }
    }

    pub fn is_end(&self) -> bool {
        self.kind == EnvelopeKind::End
    }
}

/// Render an envelope as a legacy wire packet.
///
/// Text data goes out as raw bytes (up to 32); text end is the sentinel in
/// the requested form. Binary data becomes a 32-byte packet:
///
/// ```text
/// ┌────────────┬──────────────────┬──────────────┐
/// │ Len (1B)   │ Payload          │ Zero padding │
/// │ 1..=31     │ (Len bytes)      │ to 32 bytes  │
/// └────────────┴──────────────────┴──────────────┘
/// ```
///
/// Binary end is `0xFF` followed by 31 bytes of `0xEE`.
pub fn encode_envelope(envelope: &Envelope, sentinel: SentinelForm) -> Result<Packet> {
    let packet = match (envelope.discipline, envelope.kind) {
        (_, EnvelopeKind::Noise) => return Err(FrameError::NoiseNotEncodable),
        (Discipline::Text, EnvelopeKind::Data) => {
            if envelope.payload.len() > PACKET_SIZE {
                return Err(FrameError::ChunkTooLarge {
                    size: envelope.payload.len(),
                    max: PACKET_SIZE,
                });
            }
            Packet::new(envelope.payload.clone())?
        }
        (Discipline::Text, EnvelopeKind::End) => Packet::new(Bytes::from_static(sentinel.bytes()))?,
        (Discipline::Binary, EnvelopeKind::Data) => {
            let len = envelope.payload.len();
            if len == 0 {
                return Err(FrameError::EmptyChunk);
            }
            if len > MAX_CHUNK {
                return Err(FrameError::ChunkTooLarge {
                    size: len,
                    max: MAX_CHUNK,
                });
            }
            let mut buf = BytesMut::with_capacity(PACKET_SIZE);
            buf.put_u8(len as u8);
            buf.put_slice(&envelope.payload);
            buf.put_bytes(0, PACKET_SIZE - 1 - len);
            Packet::new(buf.freeze())?
        }
        (Discipline::Binary, EnvelopeKind::End) => {
            let mut buf = BytesMut::with_capacity(PACKET_SIZE);
            buf.put_u8(END_OF_STREAM);
            buf.put_bytes(END_FILL, PACKET_SIZE - 1);
            Packet::new(buf.freeze())?
        }
    };
    Ok(packet)
}

/// Classify a received packet under `discipline`.
///
/// Never fails: anything a binary receiver cannot use is reported as
/// [`EnvelopeKind::Noise`] so the caller can drop it.
pub fn decode_envelope(discipline: Discipline, packet: Packet) -> Envelope {
    match discipline {
        Discipline::Text => {
            if is_text_sentinel(packet.as_bytes()) {
                Envelope::text_end()
            } else {
                Envelope::text(packet.into_bytes())
            }
        }
        Discipline::Binary => decode_binary(packet),
    }
}

fn decode_binary(packet: Packet) -> Envelope {
    let noise = |packet: Packet| Envelope {
        discipline: Discipline::Binary,
        kind: EnvelopeKind::Noise,
        payload: packet.into_bytes(),
    };

    if packet.is_empty() {
        return noise(packet);
    }
    let control = packet.as_bytes()[0];
    if control == END_OF_STREAM {
        return Envelope::voice_end();
    }

    let len = usize::from(control);
    if len == 0 || len > MAX_CHUNK || packet.len() < 1 + len {
        trace!(control, packet_len = packet.len(), "binary packet is noise");
        return noise(packet);
    }
    Envelope::voice(packet.into_bytes().slice(1..1 + len))
}

/// Split a text message into data envelopes of at most `chunk_size` bytes.
///
/// The last chunk may be shorter. An empty message yields no envelopes. The
/// sentinel is not included.
pub fn chunk_text(message: &Bytes, chunk_size: usize) -> impl Iterator<Item = Envelope> + '_ {
    let chunk_size = chunk_size.max(1);
    (0..message.len())
        .step_by(chunk_size)
        .map(move |start| {
            let end = (start + chunk_size).min(message.len());
            Envelope::text(message.slice(start..end))
        })
}

/// Split one compressed voice frame into data envelopes of at most
/// [`MAX_CHUNK`] bytes.
pub fn chunk_voice(frame: &[u8]) -> impl Iterator<Item = Envelope> + '_ {
    frame
        .chunks(MAX_CHUNK)
        .map(|chunk| Envelope::voice(Bytes::copy_from_slice(chunk)))
}
