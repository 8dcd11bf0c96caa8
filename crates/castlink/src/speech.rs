//! External speech tools: a text-to-speech command on the receiving side
//! and a whisper.cpp style transcriber on the sending side.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use castlink_station::HandlerError;
use tracing::{debug, info};

/// Runs a speech command with the text as its final argument.
///
/// No shell is involved, so the text is never interpreted.
#[derive(Debug, Clone)]
pub struct Speaker {
    program: String,
    args: Vec<String>,
}

impl Speaker {
    /// Split a command line such as `espeak -s 140` on whitespace.
    pub fn parse(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn say(&self, text: &str) -> Result<(), HandlerError> {
        debug!(program = %self.program, "speaking");
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .status()
            .map_err(|err| HandlerError::io(format!("running {}", self.program), err))?;
        if !status.success() {
            return Err(HandlerError::Tool {
                tool: self.program.clone(),
                detail: status.to_string(),
            });
        }
        Ok(())
    }
}

/// Invokes a transcription tool with the whisper.cpp CLI convention:
/// `TOOL -m MODEL -f WAV -otxt -of PREFIX`, then reads `PREFIX.txt`.
#[derive(Debug, Clone)]
pub struct Transcriber {
    tool: PathBuf,
    model: PathBuf,
}

impl Transcriber {
    pub fn new(tool: impl Into<PathBuf>, model: impl Into<PathBuf>) -> Self {
        Self {
            tool: tool.into(),
            model: model.into(),
        }
    }

    /// Transcribe `wav`, writing the tool's output under `work_dir`.
    ///
    /// Returns the transcript with surrounding whitespace removed.
    pub fn transcribe(&self, wav: &Path, work_dir: &Path) -> Result<String, HandlerError> {
        let prefix = work_dir.join("transcription_output");
        info!(tool = %self.tool.display(), wav = %wav.display(), "transcribing");

        let output = Command::new(&self.tool)
            .arg("-m")
            .arg(&self.model)
            .arg("-f")
            .arg(wav)
            .arg("-otxt")
            .arg("-of")
            .arg(&prefix)
            .stdin(Stdio::null())
            .output()
            .map_err(|err| {
                HandlerError::io(format!("running {}", self.tool.display()), err)
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HandlerError::Tool {
                tool: self.tool.display().to_string(),
                detail: format!("{}: {}", output.status, stderr.trim()),
            });
        }

        let mut transcript_path = OsString::from(prefix.as_os_str());
        transcript_path.push(".txt");
        let transcript_path = PathBuf::from(transcript_path);
        let text = std::fs::read_to_string(&transcript_path).map_err(|err| {
            HandlerError::io(format!("reading {}", transcript_path.display()), err)
        })?;
        Ok(text.trim().to_string())
    }
}
