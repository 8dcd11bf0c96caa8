use std::path::PathBuf;
use std::time::Duration;

use castlink_codec::{CodecSpec, DEFAULT_FRAME_SAMPLES};
use castlink_frame::{FrameConfig, SentinelForm};
use castlink_station::StationConfig;
use castlink_transport::PollPolicy;
use clap::{Args, Subcommand, ValueEnum};

use crate::exit::{codec_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;
use crate::store::MessageStore;

pub mod classify;
pub mod receive;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the receiving station until interrupted.
    Receive(ReceiveArgs),
    /// Transmit one message.
    Send(send::SendArgs),
    /// Check text for emergency keywords.
    Classify(ClassifyArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Receive(args) => receive::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Classify(args) => classify::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum CodecKind {
    Mulaw,
    Pcm16,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SentinelArg {
    /// `EOF\0`, as the legacy transmitters send.
    Nul,
    /// `EOF`.
    Bare,
}

/// Link settings shared by every station command. Both stations must use
/// the same codec and frame length.
#[derive(Args, Debug, Clone)]
pub struct LinkArgs {
    /// Receive poll interval in milliseconds.
    #[arg(long, env = "CASTLINK_POLL_MS", default_value_t = 100)]
    pub poll_ms: u64,
    /// Give up on a silent link after this long (e.g. 30s, 500ms). Default: wait forever.
    #[arg(long, env = "CASTLINK_TIMEOUT")]
    pub timeout: Option<String>,
    /// Pause after each text packet in milliseconds.
    #[arg(long, env = "CASTLINK_CHUNK_DELAY_MS", default_value_t = 500)]
    pub chunk_delay_ms: u64,
    /// Pause between a mode tag and its payload in milliseconds.
    #[arg(long, env = "CASTLINK_MODE_GAP_MS", default_value_t = 500)]
    pub mode_gap_ms: u64,
    /// Voice codec.
    #[arg(long, env = "CASTLINK_CODEC", value_enum, default_value = "mulaw")]
    pub codec: CodecKind,
    /// Samples per voice frame (8 kHz mono).
    #[arg(long, env = "CASTLINK_FRAME_SAMPLES", default_value_t = DEFAULT_FRAME_SAMPLES)]
    pub frame_samples: usize,
    /// Sentinel packet sent after each text message.
    #[arg(long, env = "CASTLINK_SENTINEL", value_enum, default_value = "nul")]
    pub sentinel: SentinelArg,
}

impl LinkArgs {
    pub fn codec_spec(&self) -> CodecSpec {
        let samples_per_frame = self.frame_samples;
        match self.codec {
            CodecKind::Mulaw => CodecSpec::MuLaw { samples_per_frame },
            CodecKind::Pcm16 => CodecSpec::Pcm16 { samples_per_frame },
        }
    }

    /// Build and check the station configuration. Invalid settings are
    /// usage errors, reported before any socket is opened.
    pub fn station_config(&self) -> CliResult<StationConfig> {
        if self.poll_ms == 0 {
            return Err(CliError::new(USAGE, "--poll-ms must be greater than zero"));
        }
        let timeout = self.timeout.as_deref().map(parse_duration).transpose()?;

        let codec = self.codec_spec();
        codec
            .build()
            .map_err(|err| codec_error("invalid codec settings", err))?;

        let frame = FrameConfig {
            sentinel: match self.sentinel {
                SentinelArg::Nul => SentinelForm::NulTerminated,
                SentinelArg::Bare => SentinelForm::Bare,
            },
            text_chunk_delay: Duration::from_millis(self.chunk_delay_ms),
            poll: PollPolicy {
                poll_interval: Duration::from_millis(self.poll_ms),
                timeout,
            },
            ..FrameConfig::default()
        };

        Ok(StationConfig {
            frame,
            codec,
            mode_gap: Duration::from_millis(self.mode_gap_ms),
        })
    }
}

/// Where a station logs the messages it handles.
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Directory for message files, WAV files and the CSV summary.
    #[arg(long, env = "CASTLINK_LOG_DIR", default_value = "logs")]
    pub log_dir: PathBuf,
    /// Do not write anything under --log-dir.
    #[arg(long)]
    pub no_store: bool,
}

impl StoreArgs {
    /// The configured store, or `None` with `--no-store`.
    pub fn open(&self) -> Option<MessageStore> {
        (!self.no_store).then(|| MessageStore::new(&self.log_dir))
    }
}

#[derive(Args, Debug)]
pub struct ReceiveArgs {
    /// Socket path this station binds.
    pub local: PathBuf,
    /// Socket path of the transmitting station.
    pub peer: PathBuf,
    #[command(flatten)]
    pub store: StoreArgs,
    /// Also write each voice message as raw 16-bit PCM next to its WAV.
    #[arg(long)]
    pub save_raw: bool,
    /// Command used to speak text (the text is passed as its last argument), e.g. `espeak`.
    #[arg(long, env = "CASTLINK_SPEAK_CMD")]
    pub speak_cmd: Option<String>,
    /// Exit after receiving N messages.
    #[arg(long)]
    pub count: Option<u64>,
    #[command(flatten)]
    pub link: LinkArgs,
}

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Text to check. Multiple words are joined with spaces.
    #[arg(required = true)]
    pub text: Vec<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse `30s`, `500ms` or a bare number of seconds.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
