use castlink_codec::{DEFAULT_FRAME_SAMPLES, SAMPLE_RATE};
use castlink_frame::{MAX_CHUNK, PACKET_SIZE};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("castlink {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: castlink");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("CASTLINK_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "profile: {}",
        option_env!("CASTLINK_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!("packet_size: {PACKET_SIZE}");
    println!("voice_chunk: {MAX_CHUNK}");
    println!("sample_rate: {SAMPLE_RATE}");
    println!("codecs: mulaw (default, {DEFAULT_FRAME_SAMPLES} samples/frame), pcm16");
    println!("modes: STS, STT, TTS, TTT");

    Ok(SUCCESS)
}
