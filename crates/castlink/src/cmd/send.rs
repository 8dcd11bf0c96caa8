use std::fs;
use std::path::{Path, PathBuf};

use castlink_codec::SAMPLE_RATE;
use castlink_frame::{is_text_sentinel, SendStats};
use castlink_station::{is_emergency, ModeTag, StationConfig, Transmitter};
use castlink_transport::UnixDatagramChannel;
use clap::{ArgGroup, Args, Subcommand};
use serde::Serialize;
use tracing::warn;

use crate::cmd::{LinkArgs, StoreArgs};
use crate::exit::{
    handler_error, io_error, station_error, transport_error, wav_error, CliError, CliResult,
    DATA_INVALID, SUCCESS, USAGE,
};
use crate::output::{now_unix_millis, print_record, OutputFormat, Record};
use crate::speech::Transcriber;

/// Canned messages for `--emergency N`.
pub const EMERGENCY_PRESETS: [&str; 5] = [
    "Emergency! I need help immediately.",
    "There's a fire!",
    "I'm in danger, call emergency services.",
    "Medical emergency, please respond!",
    "Intruder alert!",
];

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(subcommand)]
    pub command: SendCommand,
}

#[derive(Subcommand, Debug)]
pub enum SendCommand {
    /// Send a text message under STT, TTS or TTT.
    Text(SendTextArgs),
    /// Send a 16-bit mono WAV file as speech (STS).
    Voice(SendVoiceArgs),
    /// Transcribe a WAV file and send the transcript (STT).
    Transcribe(TranscribeArgs),
}

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("payload")
        .required(true)
        .args(["message", "file", "emergency"])
))]
pub struct SendTextArgs {
    /// Socket path this station binds.
    pub local: PathBuf,
    /// Socket path of the receiving station.
    pub peer: PathBuf,
    /// Mode tag: STT, TTS or TTT.
    #[arg(long, default_value = "TTS", value_parser = parse_text_mode)]
    pub mode: ModeTag,
    /// Message text.
    #[arg(long)]
    pub message: Option<String>,
    /// Read the message from a UTF-8 file.
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Send emergency preset N (1-5).
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u8).range(1..=5))]
    pub emergency: Option<u8>,
    #[command(flatten)]
    pub store: StoreArgs,
    #[command(flatten)]
    pub link: LinkArgs,
}

#[derive(Args, Debug)]
pub struct SendVoiceArgs {
    /// Socket path this station binds.
    pub local: PathBuf,
    /// Socket path of the receiving station.
    pub peer: PathBuf,
    /// 16-bit mono WAV file, 8 kHz.
    #[arg(long)]
    pub wav: PathBuf,
    #[command(flatten)]
    pub link: LinkArgs,
}

#[derive(Args, Debug)]
pub struct TranscribeArgs {
    /// Socket path this station binds.
    pub local: PathBuf,
    /// Socket path of the receiving station.
    pub peer: PathBuf,
    /// WAV file to transcribe.
    #[arg(long)]
    pub wav: PathBuf,
    /// Transcription tool (whisper.cpp CLI conventions).
    #[arg(long, env = "CASTLINK_WHISPER", default_value = "whisper-cli")]
    pub tool: PathBuf,
    /// Model file passed to the tool with -m.
    #[arg(long, env = "CASTLINK_WHISPER_MODEL")]
    pub model: PathBuf,
    /// Keep the tool's output in this directory instead of a temporary one.
    #[arg(long)]
    pub work_dir: Option<PathBuf>,
    #[command(flatten)]
    pub store: StoreArgs,
    #[command(flatten)]
    pub link: LinkArgs,
}

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    match args.command {
        SendCommand::Text(args) => send_text(args, format),
        SendCommand::Voice(args) => send_voice(args, format),
        SendCommand::Transcribe(args) => transcribe(args, format),
    }
}

fn send_text(args: SendTextArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args.link.station_config()?;
    let message = resolve_message(&args)?;
    warn_on_sentinel_collision(&message, &config);

    let mut transmitter = open(&args.local, &args.peer, &config)?;
    let stats = transmitter
        .send_text(args.mode, &message)
        .map_err(|err| station_error("send failed", err))?;

    let kind = match args.emergency {
        Some(_) => format!("{}-EMERGENCY", args.mode),
        None => args.mode.to_string(),
    };
    let file = log_sent(&args.store, &kind, &message);

    print_record(&SendRecord::text(args.mode, &message, stats, file), format);
    Ok(SUCCESS)
}

fn send_voice(args: SendVoiceArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args.link.station_config()?;
    let samples = read_wav(&args.wav)?;

    let mut transmitter = open(&args.local, &args.peer, &config)?;
    let stats = transmitter
        .send_voice(&samples)
        .map_err(|err| station_error("send failed", err))?;
    if stats.dropped_samples > 0 {
        warn!(
            dropped = stats.dropped_samples,
            "trailing samples did not fill a frame and were not sent"
        );
    }

    print_record(&SendRecord::voice(stats), format);
    Ok(SUCCESS)
}

fn transcribe(args: TranscribeArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args.link.station_config()?;
    if !args.wav.is_file() {
        return Err(CliError::new(
            USAGE,
            format!("no such WAV file: {}", args.wav.display()),
        ));
    }

    let (work_dir, temporary) = match &args.work_dir {
        Some(dir) => (dir.clone(), false),
        None => (
            std::env::temp_dir().join(format!("castlink-stt-{}", std::process::id())),
            true,
        ),
    };
    fs::create_dir_all(&work_dir)
        .map_err(|err| io_error(&format!("creating {}", work_dir.display()), err))?;

    let transcript =
        Transcriber::new(&args.tool, &args.model).transcribe(&args.wav, &work_dir);
    if temporary {
        let _ = fs::remove_dir_all(&work_dir);
    }
    let transcript = transcript.map_err(|err| handler_error("transcription failed", err))?;
    if transcript.is_empty() {
        warn!("transcript is empty, sending an empty message");
    }
    warn_on_sentinel_collision(&transcript, &config);

    let mut transmitter = open(&args.local, &args.peer, &config)?;
    let stats = transmitter
        .send_text(ModeTag::Stt, &transcript)
        .map_err(|err| station_error("send failed", err))?;
    let file = log_sent(&args.store, ModeTag::Stt.as_str(), &transcript);

    print_record(
        &SendRecord::text(ModeTag::Stt, &transcript, stats, file),
        format,
    );
    Ok(SUCCESS)
}

fn open(
    local: &Path,
    peer: &Path,
    config: &StationConfig,
) -> CliResult<Transmitter<UnixDatagramChannel>> {
    let channel = UnixDatagramChannel::open(local, peer)
        .map_err(|err| transport_error("open failed", err))?;
    Ok(Transmitter::new(channel, config))
}

/// Log a sent message. The message is already on air, so a storage
/// failure is only a warning.
fn log_sent(store: &StoreArgs, kind: &str, body: &str) -> Option<PathBuf> {
    let store = store.open()?;
    match store.save_entry(kind, body, now_unix_millis()) {
        Ok(path) => Some(path),
        Err(err) => {
            warn!(error = %err, "sent message was not logged");
            None
        }
    }
}

fn parse_text_mode(input: &str) -> Result<ModeTag, String> {
    match input.to_ascii_uppercase().parse::<ModeTag>() {
        Ok(ModeTag::Sts) => Err("STS carries voice; use `send voice`".to_string()),
        Ok(tag) => Ok(tag),
        Err(err) => Err(err.to_string()),
    }
}

fn resolve_message(args: &SendTextArgs) -> CliResult<String> {
    if let Some(preset) = args.emergency {
        return EMERGENCY_PRESETS
            .get(usize::from(preset).wrapping_sub(1))
            .map(|text| text.to_string())
            .ok_or_else(|| CliError::new(USAGE, format!("no emergency preset {preset}")));
    }
    if let Some(message) = &args.message {
        return Ok(message.clone());
    }
    if let Some(path) = &args.file {
        let bytes = fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
        return String::from_utf8(bytes).map_err(|_| {
            CliError::new(
                DATA_INVALID,
                format!("{} is not valid UTF-8", path.display()),
            )
        });
    }
    Err(CliError::new(USAGE, "nothing to send"))
}

/// The receiver ends a text message at any chunk starting with `EOF`.
fn warn_on_sentinel_collision(message: &str, config: &StationConfig) {
    let size = config.frame.text_chunk_size.max(1);
    if let Some(index) = message
        .as_bytes()
        .chunks(size)
        .position(is_text_sentinel)
    {
        warn!(
            chunk = index,
            "a chunk starts with EOF; the receiver will cut the message short there"
        );
    }
}

fn read_wav(path: &Path) -> CliResult<Vec<i16>> {
    let context = format!("reading {}", path.display());
    let mut reader = hound::WavReader::open(path).map_err(|err| wav_error(&context, err))?;
    let spec = reader.spec();
    if spec.channels != 1 || spec.bits_per_sample != 16 || spec.sample_format != hound::SampleFormat::Int
    {
        return Err(CliError::new(
            DATA_INVALID,
            format!(
                "{}: expected 16-bit mono PCM, got {} channel(s) of {}-bit {:?}",
                path.display(),
                spec.channels,
                spec.bits_per_sample,
                spec.sample_format
            ),
        ));
    }
    if spec.sample_rate != SAMPLE_RATE {
        warn!(
            rate = spec.sample_rate,
            expected = SAMPLE_RATE,
            "WAV sample rate differs from the link rate; audio is sent unresampled"
        );
    }
    reader
        .samples::<i16>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| wav_error(&context, err))
}

#[derive(Serialize)]
struct SendRecord {
    event: &'static str,
    mode: ModeTag,
    packets: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    emergency: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frames: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dropped_samples: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<String>,
}

impl SendRecord {
    fn text(mode: ModeTag, message: &str, stats: SendStats, file: Option<PathBuf>) -> Self {
        Self {
            event: "sent",
            mode,
            packets: stats.packets,
            message: Some(message.to_string()),
            emergency: Some(is_emergency(message)),
            frames: None,
            dropped_samples: None,
            file: file.map(|path| path.display().to_string()),
        }
    }

    fn voice(stats: SendStats) -> Self {
        Self {
            event: "sent",
            mode: ModeTag::Sts,
            packets: stats.packets,
            message: None,
            emergency: None,
            frames: Some(stats.frames),
            dropped_samples: Some(stats.dropped_samples),
            file: None,
        }
    }
}

impl Record for SendRecord {
    fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("event", self.event.to_string()),
            ("mode", self.mode.to_string()),
            ("packets", self.packets.to_string()),
        ];
        if let Some(message) = &self.message {
            fields.push(("message", message.clone()));
        }
        if let Some(emergency) = self.emergency {
            fields.push(("emergency", emergency.to_string()));
        }
        if let Some(frames) = self.frames {
            fields.push(("frames", frames.to_string()));
        }
        if let Some(dropped) = self.dropped_samples {
            fields.push(("dropped_samples", dropped.to_string()));
        }
        if let Some(file) = &self.file {
            fields.push(("file", file.clone()));
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::{CodecKind, SentinelArg};

    fn text_args() -> SendTextArgs {
        SendTextArgs {
            local: PathBuf::from("/tmp/tx.sock"),
            peer: PathBuf::from("/tmp/rx.sock"),
            mode: ModeTag::Tts,
            message: None,
            file: None,
            emergency: None,
            store: StoreArgs {
                log_dir: PathBuf::from("logs"),
                no_store: true,
            },
            link: LinkArgs {
                poll_ms: 100,
                timeout: None,
                chunk_delay_ms: 0,
                mode_gap_ms: 0,
                codec: CodecKind::Mulaw,
                frame_samples: 160,
                sentinel: SentinelArg::Nul,
            },
        }
    }

    #[test]
    fn text_modes_parse_case_insensitively() {
        assert_eq!(parse_text_mode("ttt"), Ok(ModeTag::Ttt));
        assert_eq!(parse_text_mode("Stt"), Ok(ModeTag::Stt));
        assert!(parse_text_mode("sts").is_err());
        assert!(parse_text_mode("xyz").is_err());
    }

    #[test]
    fn emergency_presets_all_classify_as_emergencies() {
        for (n, preset) in EMERGENCY_PRESETS.iter().enumerate() {
            let args = SendTextArgs {
                emergency: Some(n as u8 + 1),
                ..text_args()
            };
            assert_eq!(resolve_message(&args).expect("preset"), *preset);
        }
        // "There's a fire!" and "Intruder alert!" carry no keyword.
        let flagged = EMERGENCY_PRESETS.iter().filter(|p| is_emergency(p)).count();
        assert_eq!(flagged, 3);
    }

    #[test]
    fn message_sources() {
        let args = SendTextArgs {
            message: Some("hello".into()),
            ..text_args()
        };
        assert_eq!(resolve_message(&args).expect("message"), "hello");

        let args = SendTextArgs {
            file: Some(PathBuf::from("/nonexistent/castlink/message.txt")),
            ..text_args()
        };
        assert!(resolve_message(&args).is_err());

        assert_eq!(resolve_message(&text_args()).unwrap_err().code, USAGE);
    }

    #[test]
    fn send_record_fields() {
        let stats = SendStats {
            packets: 4,
            frames: 0,
            dropped_samples: 0,
        };
        let record = SendRecord::text(ModeTag::Ttt, "help", stats, None);
        let json = serde_json::to_value(&record).expect("record should serialize");
        assert_eq!(json["mode"], "TTT");
        assert_eq!(json["emergency"], true);
        assert!(json.get("frames").is_none());
        assert!(json.get("file").is_none());
        assert_eq!(record.fields().len(), 5);

        let record = SendRecord::text(
            ModeTag::Tts,
            "hi",
            stats,
            Some(PathBuf::from("logs/TTS_1.txt")),
        );
        assert_eq!(record.fields().len(), 6);
    }

    #[test]
    fn sent_messages_are_logged_unless_disabled() {
        let dir = std::env::temp_dir().join(format!(
            "castlink-sent-{}-{}",
            std::process::id(),
            now_unix_millis()
        ));
        let store = StoreArgs {
            log_dir: dir.clone(),
            no_store: false,
        };

        let path = log_sent(&store, "STT-EMERGENCY", "Intruder alert!").expect("file logged");
        assert!(path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("STT-EMERGENCY_")));
        assert_eq!(
            std::fs::read_to_string(&path).expect("read"),
            "Intruder alert!"
        );

        let disabled = StoreArgs {
            no_store: true,
            ..store
        };
        assert!(log_sent(&disabled, "TTS", "quiet").is_none());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
