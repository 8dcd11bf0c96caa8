#![cfg(all(unix, feature = "cli"))]

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/castcli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn castlink() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_castlink"));
    command.arg("--log-level").arg("error");
    command
}

fn fast_link(command: &mut Command) -> &mut Command {
    command
        .arg("--poll-ms")
        .arg("5")
        .arg("--chunk-delay-ms")
        .arg("0")
        .arg("--mode-gap-ms")
        .arg("0")
}

fn wait_for_path(path: &Path, timeout: Duration) {
    let start = Instant::now();
    while !path.exists() {
        if start.elapsed() >= timeout {
            panic!("{} never appeared", path.display());
        }
        thread::sleep(Duration::from_millis(25));
    }
}

fn wait_with_timeout(mut child: Child, timeout: Duration) -> Output {
    let start = Instant::now();
    loop {
        if child.try_wait().expect("child should be pollable").is_some() {
            return child.wait_with_output().expect("child output");
        }
        if start.elapsed() >= timeout {
            let _ = child.kill();
            let output = child.wait_with_output().expect("child output");
            panic!(
                "receiver did not exit in time; stderr: {}",
                String::from_utf8_lossy(&output.stderr)
            );
        }
        thread::sleep(Duration::from_millis(25));
    }
}

fn write_tone(path: &Path, samples: usize) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("wav should be creatable");
    for i in 0..samples {
        let sample = ((i as f32 * 0.2).sin() * 10000.0) as i16;
        writer.write_sample(sample).expect("sample should write");
    }
    writer.finalize().expect("wav should finalize");
}

#[test]
fn classify_reports_keywords_as_json() {
    let output = castlink()
        .args(["--format", "json", "classify", "I", "am", "a", "helper"])
        .output()
        .expect("classify should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"emergency\":true"));
    assert!(stdout.contains("\"keywords\":[\"help\"]"));
}

#[test]
fn version_prints_name() {
    let output = castlink()
        .args(["version", "--extended"])
        .output()
        .expect("version should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("name: castlink"));
    assert!(stdout.contains("packet_size: 32"));
}

#[test]
fn send_without_payload_is_a_usage_error() {
    let output = castlink()
        .args(["send", "text", "/tmp/castcli-a.sock", "/tmp/castcli-b.sock"])
        .output()
        .expect("send should run");

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn invalid_timeout_returns_64() {
    let dir = unique_temp_dir("timeout");
    let output = castlink()
        .arg("receive")
        .arg(dir.join("rx.sock"))
        .arg(dir.join("tx.sock"))
        .args(["--timeout", "soon"])
        .output()
        .expect("receive should run");

    assert_eq!(output.status.code(), Some(64));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn non_wav_input_returns_60() {
    let dir = unique_temp_dir("badwav");
    let bogus = dir.join("bogus.wav");
    std::fs::write(&bogus, b"not a wav file at all").expect("write");

    let output = castlink()
        .args(["send", "voice"])
        .arg(dir.join("tx.sock"))
        .arg(dir.join("rx.sock"))
        .arg("--wav")
        .arg(&bogus)
        .output()
        .expect("send should run");

    assert_eq!(output.status.code(), Some(60));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn receiver_stores_text_and_voice_from_sender() {
    let dir = unique_temp_dir("station");
    let rx_sock = dir.join("rx.sock");
    let tx_sock = dir.join("tx.sock");
    let log_dir = dir.join("logs");

    let mut receive = castlink();
    receive
        .args(["--format", "json", "receive"])
        .arg(&rx_sock)
        .arg(&tx_sock)
        .arg("--log-dir")
        .arg(&log_dir)
        .arg("--save-raw")
        .args(["--count", "2"]);
    let child = fast_link(&mut receive)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("receive command should start");

    wait_for_path(&rx_sock, Duration::from_secs(5));

    let mut send_text = castlink();
    send_text
        .args(["--format", "json", "send", "text"])
        .arg(&tx_sock)
        .arg(&rx_sock)
        .args(["--mode", "TTT", "--message", "Urgent: bring water, please"])
        .arg("--no-store");
    let output = fast_link(&mut send_text)
        .output()
        .expect("send text should run");
    assert!(
        output.status.success(),
        "send text failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let wav = dir.join("tone.wav");
    write_tone(&wav, 160 * 10);
    let mut send_voice = castlink();
    send_voice
        .args(["--format", "json", "send", "voice"])
        .arg(&tx_sock)
        .arg(&rx_sock)
        .arg("--wav")
        .arg(&wav);
    let output = fast_link(&mut send_voice)
        .output()
        .expect("send voice should run");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("\"frames\":10"));

    let output = wait_with_timeout(child, Duration::from_secs(15));
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2, "stdout: {stdout}");
    assert!(lines[0].contains("\"event\":\"text\""));
    assert!(lines[0].contains("\"mode\":\"TTT\""));
    assert!(lines[0].contains("\"emergency\":true"));
    assert!(lines[1].contains("\"event\":\"voice\""));
    assert!(lines[1].contains("\"frames\":10"));

    let summary =
        std::fs::read_to_string(log_dir.join("log_summary.csv")).expect("summary should exist");
    assert!(summary.starts_with("timestamp,type,filename,message\n"));
    assert!(summary.contains(",TTT,"));
    assert!(summary.contains("\"Urgent: bring water, please\""));
    assert!(summary.contains(",STS,"));

    let text_files: Vec<_> = std::fs::read_dir(&log_dir)
        .expect("log dir")
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().starts_with("TTT_"))
        .collect();
    assert_eq!(text_files.len(), 1);
    assert_eq!(
        std::fs::read_to_string(text_files[0].path()).expect("text file"),
        "Urgent: bring water, please"
    );

    let wavs: Vec<_> = std::fs::read_dir(log_dir.join("STS"))
        .expect("STS dir")
        .filter_map(Result::ok)
        .collect();
    assert_eq!(wavs.len(), 2);
    let wav_path = wavs
        .iter()
        .map(|e| e.path())
        .find(|p| p.extension().is_some_and(|ext| ext == "wav"))
        .expect("wav file");
    let reader = hound::WavReader::open(&wav_path).expect("wav should open");
    assert_eq!(reader.len(), 1600);
    let raw = std::fs::metadata(wav_path.with_extension("raw")).expect("raw dump");
    assert_eq!(raw.len(), 1600 * 2);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn sender_logs_what_it_transmits() {
    let dir = unique_temp_dir("sentlog");
    let log_dir = dir.join("logs");

    // Nobody listens on the peer socket; the packets are lost like on air.
    let mut send_text = castlink();
    send_text
        .args(["--format", "json", "send", "text"])
        .arg(dir.join("tx.sock"))
        .arg(dir.join("rx.sock"))
        .args(["--mode", "STT", "--emergency", "5"])
        .arg("--log-dir")
        .arg(&log_dir);
    let output = fast_link(&mut send_text)
        .output()
        .expect("send text should run");
    assert!(
        output.status.success(),
        "send text failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("\"file\":"));

    let mut send_plain = castlink();
    send_plain
        .args(["send", "text"])
        .arg(dir.join("tx.sock"))
        .arg(dir.join("rx.sock"))
        .args(["--message", "checking in"])
        .arg("--log-dir")
        .arg(&log_dir);
    let output = fast_link(&mut send_plain)
        .output()
        .expect("send text should run");
    assert!(output.status.success());

    let names: Vec<String> = std::fs::read_dir(&log_dir)
        .expect("log dir")
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    let emergency = names
        .iter()
        .find(|n| n.starts_with("STT-EMERGENCY_") && n.ends_with(".txt"))
        .expect("emergency preset file");
    assert_eq!(
        std::fs::read_to_string(log_dir.join(emergency)).expect("sent file"),
        "Intruder alert!"
    );
    assert!(names.iter().any(|n| n.starts_with("TTS_") && n.ends_with(".txt")));

    let summary =
        std::fs::read_to_string(log_dir.join("log_summary.csv")).expect("summary should exist");
    let rows: Vec<&str> = summary.lines().collect();
    assert_eq!(rows.len(), 3, "summary: {summary}");
    assert_eq!(rows[0], "timestamp,type,filename,message");
    assert!(rows[1].contains(",STT-EMERGENCY,"));
    assert!(rows[1].ends_with(",Intruder alert!"));
    assert!(rows[2].contains(",TTS,"));
    assert!(rows[2].ends_with(",checking in"));

    let _ = std::fs::remove_dir_all(&dir);
}
