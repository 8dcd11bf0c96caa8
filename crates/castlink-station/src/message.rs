use castlink_frame::VoiceMessage;
use serde::Serialize;

use crate::classifier::is_emergency;
use crate::mode::ModeTag;

/// A received text payload (STT, TTS or TTT).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextMessage {
    pub tag: ModeTag,
    /// Message body. Invalid UTF-8 is replaced, never rejected.
    pub body: String,
    pub emergency: bool,
}

impl TextMessage {
    /// Build from raw payload bytes and classify the body.
    pub fn from_bytes(tag: ModeTag, raw: &[u8]) -> Self {
        let body = String::from_utf8_lossy(raw).into_owned();
        let emergency = is_emergency(&body);
        Self {
            tag,
            body,
            emergency,
        }
    }
}

/// The single product of one session.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Text(TextMessage),
    Voice(VoiceMessage),
}

impl Message {
    pub fn tag(&self) -> ModeTag {
        match self {
            Message::Text(text) => text.tag,
            Message::Voice(_) => ModeTag::Sts,
        }
    }
}
