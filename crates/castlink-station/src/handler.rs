use castlink_frame::VoiceMessage;

use crate::error::HandlerError;
use crate::message::TextMessage;

/// Downstream consumer of dispatched messages.
///
/// Storage, playback, speech and alerting live behind this trait. Errors
/// returned here are logged by the dispatcher and do not affect protocol
/// state.
pub trait MessageHandler {
    /// A text session (STT, TTS or TTT) completed.
    fn on_text(&mut self, message: &TextMessage) -> Result<(), HandlerError>;

    /// A voice session (STS) completed.
    fn on_voice(&mut self, message: &VoiceMessage) -> Result<(), HandlerError>;

    /// A tag message named no known mode.
    fn on_unknown(&mut self, _raw: &str) -> Result<(), HandlerError> {
        Ok(())
    }
}

impl<H: MessageHandler + ?Sized> MessageHandler for &mut H {
    fn on_text(&mut self, message: &TextMessage) -> Result<(), HandlerError> {
        (**self).on_text(message)
    }

    fn on_voice(&mut self, message: &VoiceMessage) -> Result<(), HandlerError> {
        (**self).on_voice(message)
    }

    fn on_unknown(&mut self, raw: &str) -> Result<(), HandlerError> {
        (**self).on_unknown(raw)
    }
}

impl<H: MessageHandler + ?Sized> MessageHandler for Box<H> {
    fn on_text(&mut self, message: &TextMessage) -> Result<(), HandlerError> {
        (**self).on_text(message)
    }

    fn on_voice(&mut self, message: &VoiceMessage) -> Result<(), HandlerError> {
        (**self).on_voice(message)
    }

    fn on_unknown(&mut self, raw: &str) -> Result<(), HandlerError> {
        (**self).on_unknown(raw)
    }
}
