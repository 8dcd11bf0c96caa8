//! On-disk record of link traffic, sent and received.
//!
//! Layout under the log directory:
//! - `<TAG>_<millis>.txt` per text message (`<TAG>-EMERGENCY_<millis>.txt`
//!   for emergency presets sent by this station)
//! - `STS/RECV_<millis>.wav` per voice message (16-bit mono, 8 kHz)
//! - `STS/RECV_<millis>.raw` with the same samples as bare little-endian
//!   PCM, when raw dumps are enabled
//! - `log_summary.csv` with one row per stored message

use std::borrow::Cow;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use castlink_codec::SAMPLE_RATE;
use castlink_frame::VoiceMessage;
use castlink_station::{HandlerError, TextMessage};
use tracing::debug;

pub const SUMMARY_FILE: &str = "log_summary.csv";
const SUMMARY_HEADER: &str = "timestamp,type,filename,message";

pub struct MessageStore {
    dir: PathBuf,
    raw_dump: bool,
}

impl MessageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            raw_dump: false,
        }
    }

    /// Also write each voice message as headerless PCM next to its WAV.
    pub fn with_raw_dump(mut self, enabled: bool) -> Self {
        self.raw_dump = enabled;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a received text message to its own file and log it in the summary.
    pub fn save_text(&self, message: &TextMessage, stamp: u64) -> Result<PathBuf, HandlerError> {
        self.save_entry(message.tag.as_str(), &message.body, stamp)
    }

    /// Write `body` to `<kind>_<stamp>.txt` and log it in the summary
    /// under `kind`.
    pub fn save_entry(&self, kind: &str, body: &str, stamp: u64) -> Result<PathBuf, HandlerError> {
        create_dir(&self.dir)?;
        let path = unique_path(&self.dir, &format!("{kind}_{stamp}"), "txt");
        fs::write(&path, body.as_bytes())
            .map_err(|err| HandlerError::io(format!("writing {}", path.display()), err))?;
        debug!(path = %path.display(), kind, "stored text message");

        self.append_summary(stamp, kind, &path, body)?;
        Ok(path)
    }

    /// Write a voice message as a WAV file and log it in the summary.
    pub fn save_voice(&self, message: &VoiceMessage, stamp: u64) -> Result<PathBuf, HandlerError> {
        let dir = self.dir.join("STS");
        create_dir(&dir)?;
        let path = unique_path(&dir, &format!("RECV_{stamp}"), "wav");
        write_wav(&path, &message.samples)?;
        if self.raw_dump {
            write_raw(&path.with_extension("raw"), &message.samples)?;
        }
        debug!(path = %path.display(), samples = message.samples.len(), "stored voice message");

        self.append_summary(stamp, "STS", &path, "Audio saved as WAV")?;
        Ok(path)
    }

    fn append_summary(
        &self,
        stamp: u64,
        kind: &str,
        file: &Path,
        message: &str,
    ) -> Result<(), HandlerError> {
        let path = self.dir.join(SUMMARY_FILE);
        let fresh = !path.exists();
        let mut csv = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|err| HandlerError::io(format!("opening {}", path.display()), err))?;

        let mut row = String::new();
        if fresh {
            row.push_str(SUMMARY_HEADER);
            row.push('\n');
        }
        let file = file.display().to_string();
        row.push_str(&format!(
            "{stamp},{},{},{}\n",
            csv_field(kind),
            csv_field(&file),
            csv_field(message)
        ));
        csv.write_all(row.as_bytes())
            .map_err(|err| HandlerError::io(format!("appending to {}", path.display()), err))
    }
}

/// 16-bit mono WAV at the link sample rate.
pub fn write_wav(path: &Path, samples: &[i16]) -> Result<(), HandlerError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let context = || format!("writing {}", path.display());
    let mut writer = hound::WavWriter::create(path, spec).map_err(|err| wav_failure(context(), err))?;
    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|err| wav_failure(context(), err))?;
    }
    writer.finalize().map_err(|err| wav_failure(context(), err))
}

/// Samples as consecutive 16-bit little-endian values, no header.
pub fn write_raw(path: &Path, samples: &[i16]) -> Result<(), HandlerError> {
    let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    fs::write(path, bytes).map_err(|err| HandlerError::io(format!("writing {}", path.display()), err))
}

fn wav_failure(context: String, err: hound::Error) -> HandlerError {
    match err {
        hound::Error::IoError(source) => HandlerError::io(context, source),
        other => HandlerError::Other(format!("{context}: {other}")),
    }
}

fn create_dir(dir: &Path) -> Result<(), HandlerError> {
    fs::create_dir_all(dir)
        .map_err(|err| HandlerError::io(format!("creating {}", dir.display()), err))
}

/// `<dir>/<stem>.<ext>`, or `<stem>-N.<ext>` if that name is taken.
fn unique_path(dir: &Path, stem: &str, ext: &str) -> PathBuf {
    let first = dir.join(format!("{stem}.{ext}"));
    if !first.exists() {
        return first;
    }
    (1u32..)
        .map(|n| dir.join(format!("{stem}-{n}.{ext}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or(first)
}

/// Quote a CSV field when it contains a separator, quote or line break.
pub fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}
