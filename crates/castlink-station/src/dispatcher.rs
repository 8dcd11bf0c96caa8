use std::sync::atomic::{AtomicBool, Ordering};

use castlink_codec::CodecSpec;
use castlink_frame::{PacketReader, VoiceMessage};
use castlink_transport::{Channel, TransportError};
use serde::Serialize;
use tracing::{debug, error, info, trace, warn};

use crate::classifier::matched_keywords;
use crate::config::StationConfig;
use crate::error::{HandlerError, Result, StationError};
use crate::handler::MessageHandler;
use crate::message::{Message, TextMessage};
use crate::mode::ModeTag;
use crate::session::Session;

/// Where the dispatcher is in the tag/payload cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    AwaitingMode,
    InSession(ModeTag),
}

/// Result of one [`Dispatcher::step`].
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// A text session completed.
    Text(TextMessage),
    /// A voice session completed.
    Voice(VoiceMessage),
    /// The tag message named no mode. Nothing further was read.
    Unknown(String),
    /// The session's payload stopped arriving before its terminator.
    Abandoned(ModeTag),
    /// No tag arrived before the receive timeout.
    Idle,
}

/// Running totals kept by a dispatcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    pub text: u64,
    pub voice: u64,
    pub unknown: u64,
    pub abandoned: u64,
    pub emergencies: u64,
    pub handler_errors: u64,
}

impl DispatchStats {
    /// Sessions that produced a message.
    pub fn completed(&self) -> u64 {
        self.text + self.voice
    }
}

/// Receive-side state machine: read a tag, run its session, deliver.
///
/// Only one session exists at a time. An unknown tag is logged and the
/// dispatcher goes straight back to waiting for a tag, so the payload that
/// followed it is read as the next tag.
pub struct Dispatcher<T> {
    reader: PacketReader<T>,
    codec: CodecSpec,
    state: DispatchState,
    stats: DispatchStats,
}

impl<T: Channel> Dispatcher<T> {
    pub fn new(channel: T, config: &StationConfig) -> Self {
        Self {
            reader: PacketReader::with_config(channel, config.frame.clone()),
            codec: config.codec,
            state: DispatchState::AwaitingMode,
            stats: DispatchStats::default(),
        }
    }

    /// Read one tag and, if it names a mode, that mode's payload.
    ///
    /// Only channel failures other than a timeout are returned as errors.
    /// A session that fails for any other reason (a codec that cannot be
    /// built, a frame it rejects) is logged and reported as abandoned.
    /// Handler errors are logged and counted.
    pub fn step<H: MessageHandler + ?Sized>(&mut self, handler: &mut H) -> Result<DispatchOutcome> {
        let raw = match self.reader.read_text() {
            Ok(raw) => raw,
            Err(err) => {
                let err = StationError::from(err);
                if err.is_timeout() {
                    trace!("no mode tag before timeout");
                    return Ok(DispatchOutcome::Idle);
                }
                return Err(err);
            }
        };

        let Some(tag) = ModeTag::parse(&raw) else {
            let text = String::from_utf8_lossy(&raw).into_owned();
            warn!(mode = %text.escape_debug(), "unknown mode tag, ignoring");
            self.stats.unknown += 1;
            let result = handler.on_unknown(&text);
            self.check_handler(result);
            return Ok(DispatchOutcome::Unknown(text));
        };

        info!(mode = %tag, "{} session started", tag.describe());
        self.state = DispatchState::InSession(tag);
        let result = Session::open(tag, &self.codec).and_then(|s| s.receive(&mut self.reader));
        self.state = DispatchState::AwaitingMode;

        let message = match result {
            Ok(message) => message,
            Err(err) if err.is_timeout() => {
                warn!(mode = %tag, "payload timed out, session abandoned");
                self.stats.abandoned += 1;
                return Ok(DispatchOutcome::Abandoned(tag));
            }
            Err(err) if err.transport().is_some() => {
                debug!(mode = %tag, error = %err, "session ended without a message");
                return Err(err);
            }
            Err(err) => {
                error!(mode = %tag, error = %err, "session failed, abandoned");
                self.stats.abandoned += 1;
                return Ok(DispatchOutcome::Abandoned(tag));
            }
        };

        Ok(self.deliver(message, handler))
    }

    fn deliver<H: MessageHandler + ?Sized>(&mut self, message: Message, handler: &mut H) -> DispatchOutcome {
        match message {
            Message::Text(text) => {
                self.stats.text += 1;
                if text.emergency {
                    self.stats.emergencies += 1;
                    warn!(
                        mode = %text.tag,
                        keywords = ?matched_keywords(&text.body),
                        "emergency message received"
                    );
                }
                info!(mode = %text.tag, bytes = text.body.len(), "text message received");
                let result = handler.on_text(&text);
                self.check_handler(result);
                DispatchOutcome::Text(text)
            }
            Message::Voice(voice) => {
                self.stats.voice += 1;
                info!(
                    mode = %ModeTag::Sts,
                    frames = voice.frames,
                    samples = voice.samples.len(),
                    "voice message received"
                );
                let result = handler.on_voice(&voice);
                self.check_handler(result);
                DispatchOutcome::Voice(voice)
            }
        }
    }

    fn check_handler(&mut self, result: std::result::Result<(), HandlerError>) {
        if let Err(err) = result {
            self.stats.handler_errors += 1;
            error!(error = %err, "message handler failed");
        }
    }

    /// Dispatch until `stop` is raised or the channel shuts down.
    ///
    /// `stop` is checked between steps; pair it with a receive timeout or
    /// an [`Interruptible`](castlink_transport::Interruptible) channel so a
    /// blocked read returns. Any channel error other than
    /// [`TransportError::Shutdown`] ends the loop with that error.
    pub fn run<H: MessageHandler + ?Sized>(
        &mut self,
        handler: &mut H,
        stop: &AtomicBool,
    ) -> Result<DispatchStats> {
        info!("dispatcher awaiting mode tags");
        while !stop.load(Ordering::SeqCst) {
            match self.step(handler) {
                Ok(_) => {}
                Err(err) if matches!(err.transport(), Some(TransportError::Shutdown)) => {
                    debug!("channel shut down");
                    break;
                }
                Err(err) => return Err(err),
            }
        }
        info!(
            text = self.stats.text,
            voice = self.stats.voice,
            unknown = self.stats.unknown,
            abandoned = self.stats.abandoned,
            "dispatcher stopped"
        );
        Ok(self.stats)
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    pub fn get_ref(&self) -> &T {
        self.reader.get_ref()
    }

    pub fn into_inner(self) -> T {
        self.reader.into_inner()
    }
}
