//! Two stations joined by an in-memory channel.
//!
//! The transmitter sends one message in each mode; the receiver thread
//! dispatches them and prints what arrived.
//!
//! ```sh
//! cargo run --example loopback
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use castlink::codec::CodecSpec;
use castlink::frame::{FrameConfig, VoiceMessage};
use castlink::station::{
    Dispatcher, HandlerError, MessageHandler, ModeTag, StationConfig, TextMessage, Transmitter,
};
use castlink::transport::{Interruptible, MemoryChannel};

struct Printer {
    remaining: usize,
    stop: Arc<AtomicBool>,
}

impl Printer {
    fn done_one(&mut self) {
        self.remaining -= 1;
        if self.remaining == 0 {
            self.stop.store(true, Ordering::SeqCst);
        }
    }
}

impl MessageHandler for Printer {
    fn on_text(&mut self, message: &TextMessage) -> Result<(), HandlerError> {
        let flag = if message.emergency { " [EMERGENCY]" } else { "" };
        println!("rx {}: {}{flag}", message.tag, message.body);
        self.done_one();
        Ok(())
    }

    fn on_voice(&mut self, message: &VoiceMessage) -> Result<(), HandlerError> {
        println!(
            "rx STS: {} frames, {} samples",
            message.frames,
            message.samples.len()
        );
        self.done_one();
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = StationConfig {
        frame: FrameConfig {
            text_chunk_delay: Duration::from_millis(5),
            ..FrameConfig::default()
        },
        codec: CodecSpec::default(),
        mode_gap: Duration::from_millis(10),
    };

    let (tx, rx) = MemoryChannel::pair();
    let stop = Arc::new(AtomicBool::new(false));

    let receiver = {
        let config = config.clone();
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let channel = Interruptible::new(rx, Arc::clone(&stop));
            let mut dispatcher = Dispatcher::new(channel, &config);
            let mut printer = Printer {
                remaining: 4,
                stop: Arc::clone(&stop),
            };
            dispatcher.run(&mut printer, &stop)
        })
    };

    let mut transmitter = Transmitter::new(tx, &config);
    transmitter.send_text(ModeTag::Ttt, "Checking in from the north ridge.")?;
    transmitter.send_text(ModeTag::Stt, "Transcribed: all quiet at base camp")?;
    transmitter.send_text(ModeTag::Tts, "Danger: rockfall on the east trail")?;

    let tone: Vec<i16> = (0..8000)
        .map(|i| ((i as f32 * 0.0785).sin() * 12000.0) as i16)
        .collect();
    transmitter.send_voice(&tone)?;

    let stats = receiver
        .join()
        .map_err(|_| "receiver thread panicked")??;
    println!(
        "{} messages, {} emergency",
        stats.completed(),
        stats.emergencies
    );
    Ok(())
}
