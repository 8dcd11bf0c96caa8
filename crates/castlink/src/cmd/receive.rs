use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use castlink_codec::SAMPLE_RATE;
use castlink_frame::VoiceMessage;
use castlink_station::{
    matched_keywords, Dispatcher, HandlerError, MessageHandler, ModeTag, TextMessage,
};
use castlink_transport::{Interruptible, UnixDatagramChannel};
use serde::Serialize;
use tracing::{info, warn};

use crate::cmd::ReceiveArgs;
use crate::exit::{station_error, transport_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{now_unix_millis, print_record, OutputFormat, Record};
use crate::speech::Speaker;
use crate::store::MessageStore;

const EMERGENCY_ANNOUNCEMENT: &str = "Emergency message received!";

pub fn run(args: ReceiveArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args.link.station_config()?;

    let stop = Arc::new(AtomicBool::new(false));
    install_ctrlc_handler(Arc::clone(&stop))?;

    let channel = UnixDatagramChannel::open(&args.local, &args.peer)
        .map_err(|err| transport_error("open failed", err))?;
    let channel = Interruptible::new(channel, Arc::clone(&stop));

    let mut handler = ReceiveHandler {
        store: args
            .store
            .open()
            .map(|store| store.with_raw_dump(args.save_raw)),
        speaker: args.speak_cmd.as_deref().and_then(Speaker::parse),
        format,
        remaining: args.count,
        stop: Arc::clone(&stop),
    };

    info!(
        local = %args.local.display(),
        peer = %args.peer.display(),
        codec = config.codec.name(),
        "receiver ready"
    );
    let mut dispatcher = Dispatcher::new(channel, &config);
    let stats = dispatcher
        .run(&mut handler, &stop)
        .map_err(|err| station_error("receive failed", err))?;

    info!(
        messages = stats.completed(),
        emergencies = stats.emergencies,
        handler_errors = stats.handler_errors,
        "receiver stopped"
    );
    Ok(SUCCESS)
}

fn install_ctrlc_handler(stop: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        stop.store(true, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

/// Stores, announces and prints each dispatched message.
struct ReceiveHandler {
    store: Option<MessageStore>,
    speaker: Option<Speaker>,
    format: OutputFormat,
    remaining: Option<u64>,
    stop: Arc<AtomicBool>,
}

impl ReceiveHandler {
    fn count_message(&mut self) {
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                self.stop.store(true, Ordering::SeqCst);
            }
        }
    }

    fn speak(&self, text: &str) -> Result<(), HandlerError> {
        match &self.speaker {
            Some(speaker) => speaker.say(text),
            None => Ok(()),
        }
    }
}

impl MessageHandler for ReceiveHandler {
    fn on_text(&mut self, message: &TextMessage) -> Result<(), HandlerError> {
        let stamp = now_unix_millis();
        let stored = self
            .store
            .as_ref()
            .map(|store| store.save_text(message, stamp))
            .transpose();
        let file = stored.as_ref().ok().and_then(|path| path.as_deref());

        print_record(&TextRecord::new(message, stamp, file), self.format);
        self.count_message();

        let mut result = stored.map(|_| ());
        if message.emergency {
            warn!(mode = %message.tag, "emergency message, announcing");
            result = result.and(self.speak(EMERGENCY_ANNOUNCEMENT));
        }
        result.and(self.speak(&message.body))
    }

    fn on_voice(&mut self, message: &VoiceMessage) -> Result<(), HandlerError> {
        let stamp = now_unix_millis();
        let stored = self
            .store
            .as_ref()
            .map(|store| store.save_voice(message, stamp))
            .transpose();
        let file = stored.as_ref().ok().and_then(|path| path.as_deref());

        print_record(&VoiceRecord::new(message, stamp, file), self.format);
        self.count_message();
        stored.map(|_| ())
    }

    fn on_unknown(&mut self, raw: &str) -> Result<(), HandlerError> {
        print_record(
            &UnknownRecord {
                event: "unknown",
                mode: raw.to_string(),
                timestamp_ms: now_unix_millis(),
            },
            self.format,
        );
        Ok(())
    }
}

#[derive(Serialize)]
struct TextRecord {
    event: &'static str,
    mode: ModeTag,
    message: String,
    emergency: bool,
    keywords: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<String>,
    timestamp_ms: u64,
}

impl TextRecord {
    fn new(message: &TextMessage, stamp: u64, file: Option<&Path>) -> Self {
        Self {
            event: "text",
            mode: message.tag,
            message: message.body.clone(),
            emergency: message.emergency,
            keywords: matched_keywords(&message.body),
            file: file.map(|p| p.display().to_string()),
            timestamp_ms: stamp,
        }
    }
}

impl Record for TextRecord {
    fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("event", self.event.to_string()),
            ("mode", self.mode.to_string()),
            ("message", self.message.clone()),
            ("emergency", self.emergency.to_string()),
        ];
        if !self.keywords.is_empty() {
            fields.push(("keywords", self.keywords.join(",")));
        }
        if let Some(file) = &self.file {
            fields.push(("file", file.clone()));
        }
        fields
    }
}

#[derive(Serialize)]
struct VoiceRecord {
    event: &'static str,
    mode: ModeTag,
    frames: usize,
    samples: usize,
    duration_ms: u64,
    discarded_bytes: usize,
    noise_packets: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<String>,
    timestamp_ms: u64,
}

impl VoiceRecord {
    fn new(message: &VoiceMessage, stamp: u64, file: Option<&Path>) -> Self {
        Self {
            event: "voice",
            mode: ModeTag::Sts,
            frames: message.frames,
            samples: message.samples.len(),
            duration_ms: message.samples.len() as u64 * 1000 / u64::from(SAMPLE_RATE),
            discarded_bytes: message.discarded_bytes,
            noise_packets: message.noise_packets,
            file: file.map(|p| p.display().to_string()),
            timestamp_ms: stamp,
        }
    }
}

impl Record for VoiceRecord {
    fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("event", self.event.to_string()),
            ("mode", self.mode.to_string()),
            ("frames", self.frames.to_string()),
            ("duration_ms", self.duration_ms.to_string()),
            ("discarded_bytes", self.discarded_bytes.to_string()),
            ("noise_packets", self.noise_packets.to_string()),
        ];
        if let Some(file) = &self.file {
            fields.push(("file", file.clone()));
        }
        fields
    }
}

#[derive(Serialize)]
struct UnknownRecord {
    event: &'static str,
    mode: String,
    timestamp_ms: u64,
}

impl Record for UnknownRecord {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("event", self.event.to_string()),
            ("mode", self.mode.escape_debug().to_string()),
        ]
    }
}
