use castlink_codec::{CodecSpec, VoiceCodec};
use castlink_frame::PacketReader;
use castlink_transport::Channel;
use tracing::debug;

use crate::error::Result;
use crate::message::{Message, TextMessage};
use crate::mode::ModeTag;

/// One tag's worth of receive state.
///
/// Voice sessions own a freshly built codec; it is dropped with the
/// session. [`Session::receive`] consumes the session, so each one
/// produces at most one message.
pub struct Session {
    tag: ModeTag,
    codec: Option<Box<dyn VoiceCodec + Send>>,
}

impl Session {
    pub fn open(tag: ModeTag, codec: &CodecSpec) -> Result<Self> {
        let codec = if tag.is_voice() {
            Some(codec.build()?)
        } else {
            None
        };
        debug!(mode = %tag, "session opened");
        Ok(Self { tag, codec })
    }

    pub fn tag(&self) -> ModeTag {
        self.tag
    }

    /// Read the payload this session's tag announced.
    pub fn receive<T: Channel>(self, reader: &mut PacketReader<T>) -> Result<Message> {
        match self.codec {
            Some(codec) => Ok(Message::Voice(reader.read_voice(codec)?)),
            None => {
                let raw = reader.read_text()?;
                Ok(Message::Text(TextMessage::from_bytes(self.tag, &raw)))
            }
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("tag", &self.tag)
            .field("codec", &self.codec.as_ref().map(|c| c.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use castlink_codec::CodecError;
    use castlink_frame::{FrameConfig, PacketWriter};
    use castlink_transport::{MemoryChannel, PollPolicy};

    use super::*;
    use crate::error::StationError;

    fn fast_config() -> FrameConfig {
        FrameConfig {
            text_chunk_delay: Duration::ZERO,
            poll: PollPolicy {
                poll_interval: Duration::from_millis(1),
                timeout: Some(Duration::from_secs(2)),
            },
            ..FrameConfig::default()
        }
    }

    #[test]
    fn text_session_reads_text() {
        let (tx, rx) = MemoryChannel::pair();
        let mut writer = PacketWriter::with_config(tx, fast_config());
        let mut reader = PacketReader::with_config(rx, fast_config());

        writer.send_text("hello").expect("send should succeed");
        let session = Session::open(ModeTag::Ttt, &CodecSpec::default()).expect("open");
        assert_eq!(session.tag(), ModeTag::Ttt);

        let Message::Text(text) = session.receive(&mut reader).expect("receive") else {
            panic!("expected text");
        };
        assert_eq!(text.body, "hello");
        assert_eq!(text.tag, ModeTag::Ttt);
    }

    #[test]
    fn voice_session_owns_a_codec() {
        let spec = CodecSpec::Pcm16 {
            samples_per_frame: 4,
        };
        let (tx, rx) = MemoryChannel::pair();
        let mut writer = PacketWriter::with_config(tx, fast_config());
        let mut reader = PacketReader::with_config(rx, fast_config());

        let samples: Vec<i16> = (1..=8).collect();
        writer
            .send_voice(&mut spec.build().expect("codec"), &samples)
            .expect("send should succeed");

        let session = Session::open(ModeTag::Sts, &spec).expect("open");
        assert!(format!("{session:?}").contains("pcm16"));
        let Message::Voice(voice) = session.receive(&mut reader).expect("receive") else {
            panic!("expected voice");
        };
        assert_eq!(voice.samples, samples);
    }

    #[test]
    fn bad_codec_spec_fails_only_for_voice() {
        let spec = CodecSpec::MuLaw {
            samples_per_frame: 0,
        };
        assert!(Session::open(ModeTag::Tts, &spec).is_ok());
        let err = Session::open(ModeTag::Sts, &spec).unwrap_err();
        assert!(matches!(err, StationError::Codec(CodecError::EmptyFrame)));
    }
}
