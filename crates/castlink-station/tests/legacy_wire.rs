//! Byte-level compatibility with the legacy radio programs.
//!
//! Packets here are built by hand in the exact layout the legacy
//! transmitters put on the air, and transmitter output is checked against
//! the layout the legacy receivers expect.

use std::time::Duration;

use castlink_codec::{CodecSpec, MuLawCodec, VoiceCodec};
use castlink_frame::{FrameConfig, VoiceMessage};
use castlink_station::{
    DispatchOutcome, Dispatcher, HandlerError, MessageHandler, ModeTag, StationConfig,
    TextMessage, Transmitter,
};
use castlink_transport::{Channel, MemoryChannel, Packet, PollPolicy};

fn config() -> StationConfig {
    StationConfig {
        frame: FrameConfig {
            text_chunk_delay: Duration::ZERO,
            poll: PollPolicy {
                poll_interval: Duration::from_millis(1),
                timeout: Some(Duration::from_secs(2)),
            },
            ..FrameConfig::default()
        },
        codec: CodecSpec::default(),
        mode_gap: Duration::ZERO,
    }
}

struct Discard;

impl MessageHandler for Discard {
    fn on_text(&mut self, _message: &TextMessage) -> Result<(), HandlerError> {
        Ok(())
    }

    fn on_voice(&mut self, _message: &VoiceMessage) -> Result<(), HandlerError> {
        Ok(())
    }
}

fn send_raw(channel: &mut MemoryChannel, packets: &[&[u8]]) {
    for bytes in packets {
        let packet = Packet::from_slice(bytes).expect("packet should fit");
        channel.send(&packet).expect("send should succeed");
    }
}

fn drain(channel: &mut MemoryChannel) -> Vec<Packet> {
    std::iter::from_fn(|| channel.try_recv().expect("recv should succeed")).collect()
}

/// `[len, payload.., 0, 0, ..]`, 32 bytes, as the legacy voice sender
/// fills its packet buffer.
fn voice_packet(payload: &[u8]) -> Vec<u8> {
    let mut packet = vec![0u8; 32];
    packet[0] = payload.len() as u8;
    packet[1..=payload.len()].copy_from_slice(payload);
    packet
}

fn end_packet() -> Vec<u8> {
    let mut packet = vec![0xEEu8; 32];
    packet[0] = 0xFF;
    packet
}

fn tone(samples: usize) -> Vec<i16> {
    (0..samples)
        .map(|i| ((i as f32 * 0.31).sin() * 9000.0) as i16)
        .collect()
}

#[test]
fn text_session_from_legacy_sender() {
    let (mut tx, rx) = MemoryChannel::pair();
    let mut dispatcher = Dispatcher::new(rx, &config());

    let body = "Weather at the ridge: clear skies, light wind from the north.";
    let bytes = body.as_bytes();
    send_raw(
        &mut tx,
        &[b"TTT", b"EOF\0", &bytes[..32], &bytes[32..], b"EOF\0"],
    );

    let outcome = dispatcher.step(&mut Discard).expect("step should succeed");
    let DispatchOutcome::Text(message) = outcome else {
        panic!("expected text outcome");
    };
    assert_eq!(message.tag, ModeTag::Ttt);
    assert_eq!(message.body, body);
}

#[test]
fn bare_and_nul_terminated_sentinels_are_both_accepted() {
    let (mut tx, rx) = MemoryChannel::pair();
    let mut dispatcher = Dispatcher::new(rx, &config());

    send_raw(&mut tx, &[b"STT", b"EOF", b"heard you", b"EOF"]);
    send_raw(&mut tx, &[b"TTS", b"EOF\0", b"loud and clear", b"EOF\0"]);

    for expected in ["heard you", "loud and clear"] {
        match dispatcher.step(&mut Discard).expect("step should succeed") {
            DispatchOutcome::Text(message) => assert_eq!(message.body, expected),
            other => panic!("expected text, got {other:?}"),
        }
    }
}

#[test]
fn voice_stream_from_legacy_sender_with_noise() {
    let spec = CodecSpec::default();
    let frame_bytes = spec.build().expect("codec").bytes_per_frame();
    let samples = tone(spec.samples_per_frame() * 3);

    let mut encoder = MuLawCodec::new(spec.samples_per_frame()).expect("codec");
    let mut stream = Vec::new();
    for frame in samples.chunks_exact(spec.samples_per_frame()) {
        let mut out = vec![0u8; frame_bytes];
        encoder.encode(frame, &mut out).expect("encode");
        stream.extend_from_slice(&out);
    }
    // A partial fourth frame that the receiver must discard.
    stream.extend_from_slice(&[0x7F; 50]);

    let mut packets: Vec<Vec<u8>> = Vec::new();
    for (i, chunk) in stream.chunks(31).enumerate() {
        packets.push(voice_packet(chunk));
        if i % 4 == 1 {
            let mut zero_len = voice_packet(&[1, 2, 3]);
            zero_len[0] = 0;
            packets.push(zero_len);
        }
        if i % 5 == 2 {
            let mut too_long = voice_packet(&[9; 10]);
            too_long[0] = 200;
            packets.push(too_long);
        }
    }
    packets.push(end_packet());

    let (mut tx, rx) = MemoryChannel::pair();
    let mut dispatcher = Dispatcher::new(rx, &config());
    send_raw(&mut tx, &[b"STS", b"EOF\0"]);
    let refs: Vec<&[u8]> = packets.iter().map(Vec::as_slice).collect();
    send_raw(&mut tx, &refs);

    let DispatchOutcome::Voice(voice) = dispatcher.step(&mut Discard).expect("step") else {
        panic!("expected voice outcome");
    };
    assert_eq!(voice.frames, stream.len() / frame_bytes);
    assert_eq!(voice.discarded_bytes, 50);
    assert!(voice.noise_packets > 0);

    let mut decoder = MuLawCodec::new(spec.samples_per_frame()).expect("codec");
    let mut expected = Vec::new();
    for frame in stream.chunks_exact(frame_bytes) {
        let mut out = vec![0i16; spec.samples_per_frame()];
        decoder.decode(frame, &mut out).expect("decode");
        expected.extend_from_slice(&out);
    }
    assert_eq!(voice.samples, expected);
}

#[test]
fn transmitter_voice_packets_match_legacy_layout() {
    let (tx, mut rx) = MemoryChannel::pair();
    let mut transmitter = Transmitter::new(tx, &config());
    let samples = tone(160 * 2);

    transmitter.send_voice(&samples).expect("send should succeed");
    let packets = drain(&mut rx);

    assert_eq!(packets[0].as_bytes(), b"STS");
    assert_eq!(packets[1].as_bytes(), b"EOF\0");

    let voice = &packets[2..];
    let (end, data) = voice.split_last().expect("stream should not be empty");
    assert_eq!(end.as_bytes(), end_packet().as_slice());
    for packet in data {
        let bytes = packet.as_bytes();
        assert_eq!(bytes.len(), 32);
        let len = bytes[0] as usize;
        assert!((1..=31).contains(&len));
        assert!(bytes[1 + len..].iter().all(|&b| b == 0), "padding must be zero");
    }
    // 160 bytes per frame: five full packets and one of five bytes.
    let lengths: Vec<u8> = data.iter().map(|p| p.as_bytes()[0]).collect();
    assert_eq!(lengths, vec![31, 31, 31, 31, 31, 5, 31, 31, 31, 31, 31, 5]);
}

#[test]
fn text_starting_with_sentinel_truncates_the_message() {
    let (tx, rx) = MemoryChannel::pair();
    let mut transmitter = Transmitter::new(tx, &config());
    let mut dispatcher = Dispatcher::new(rx, &config());

    transmitter
        .send_text(ModeTag::Ttt, "EOF marks the end")
        .expect("send should succeed");

    // The only chunk reads as the sentinel: the message arrives empty and
    // the real sentinel is then read as an empty tag.
    match dispatcher.step(&mut Discard).expect("step") {
        DispatchOutcome::Text(message) => assert!(message.body.is_empty()),
        other => panic!("expected text, got {other:?}"),
    }
    assert_eq!(
        dispatcher.step(&mut Discard).expect("step"),
        DispatchOutcome::Unknown(String::new())
    );
}
