use std::fmt;
use std::str::FromStr;

use castlink_frame::Discipline;
use serde::{Deserialize, Serialize};

use crate::error::StationError;

/// The four link modes. The tag names the sender's input and the
/// receiver's output: `S` for speech, `T` for text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ModeTag {
    /// Speech to speech: a voice stream follows.
    Sts,
    /// Speech to text: a transcription follows.
    Stt,
    /// Text to speech: text to be spoken follows.
    Tts,
    /// Text to text.
    Ttt,
}

impl ModeTag {
    pub const ALL: [ModeTag; 4] = [ModeTag::Sts, ModeTag::Stt, ModeTag::Tts, ModeTag::Ttt];

    /// Match a received tag message. Exact and case-sensitive: `sts`,
    /// `STS\0` or `STS ` are not tags.
    pub fn parse(raw: &[u8]) -> Option<Self> {
        match raw {
            b"STS" => Some(ModeTag::Sts),
            b"STT" => Some(ModeTag::Stt),
            b"TTS" => Some(ModeTag::Tts),
            b"TTT" => Some(ModeTag::Ttt),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ModeTag::Sts => "STS",
            ModeTag::Stt => "STT",
            ModeTag::Tts => "TTS",
            ModeTag::Ttt => "TTT",
        }
    }

    /// Framing discipline of the payload that follows this tag.
    pub fn discipline(self) -> Discipline {
        if self.is_voice() {
            Discipline::Binary
        } else {
            Discipline::Text
        }
    }

    pub fn is_voice(self) -> bool {
        self == ModeTag::Sts
    }

    pub fn describe(self) -> &'static str {
        match self {
            ModeTag::Sts => "speech to speech",
            ModeTag::Stt => "speech to text",
            ModeTag::Tts => "text to speech",
            ModeTag::Ttt => "text to text",
        }
    }
}

impl fmt::Display for ModeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModeTag {
    type Err = StationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModeTag::parse(s.as_bytes()).ok_or_else(|| StationError::UnknownMode(s.to_string()))
    }
}
