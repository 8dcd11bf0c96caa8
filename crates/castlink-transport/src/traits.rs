use std::time::{Duration, Instant};

use crate::error::{Result, TransportError};
use crate::packet::Packet;

/// Sleep between empty polls when no packet is waiting.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How a blocking receive waits on a non-blocking channel.
///
/// The default never gives up: a silent peer blocks the receiver forever,
/// which is how the stations have always behaved. Set `timeout` to bound the
/// wait for each packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between polls while the channel is idle.
    pub poll_interval: Duration,
    /// Give up after this long without a packet. `None` waits forever.
    pub timeout: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
        }
    }
}

impl PollPolicy {
    /// Same poll interval, bounded by `timeout`.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..self
        }
    }
}

/// A best-effort, packet-oriented link to the other station.
///
/// Packets are delivered whole, in order, or not at all. Implementations do
/// not retransmit; whatever reliability exists lives below this trait.
pub trait Channel {
    /// Send one packet.
    fn send(&mut self, packet: &Packet) -> Result<()>;

    /// Take the next packet if one is waiting. Never blocks.
    fn try_recv(&mut self) -> Result<Option<Packet>>;

    /// Wait for the next packet according to `policy`.
    ///
    /// Polls [`try_recv`](Self::try_recv) and sleeps `poll_interval` only
    /// while nothing is waiting. Returns [`TransportError::Timeout`] when the
    /// policy's timeout elapses first.
    fn recv(&mut self, policy: &PollPolicy) -> Result<Packet> {
        let started = Instant::now();
        loop {
            if let Some(packet) = self.try_recv()? {
                return Ok(packet);
            }
            if let Some(timeout) = policy.timeout {
                if started.elapsed() >= timeout {
                    return Err(TransportError::Timeout(timeout));
                }
            }
            std::thread::sleep(policy.poll_interval);
        }
    }
}

impl<C: Channel + ?Sized> Channel for &mut C {
    fn send(&mut self, packet: &Packet) -> Result<()> {
        (**self).send(packet)
    }

    fn try_recv(&mut self) -> Result<Option<Packet>> {
        (**self).try_recv()
    }
}

impl<C: Channel + ?Sized> Channel for Box<C> {
    fn send(&mut self, packet: &Packet) -> Result<()> {
        (**self).send(packet)
    }

    fn try_recv(&mut self) -> Result<Option<Packet>> {
        (**self).try_recv()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    struct Scripted {
        polls: usize,
        ready_after: usize,
        queue: VecDeque<Packet>,
    }

    impl Channel for Scripted {
        fn send(&mut self, packet: &Packet) -> Result<()> {
            self.queue.push_back(packet.clone());
            Ok(())
        }

        fn try_recv(&mut self) -> Result<Option<Packet>> {
            self.polls += 1;
            if self.polls <= self.ready_after {
                return Ok(None);
            }
            Ok(self.queue.pop_front())
        }
    }

    fn fast() -> PollPolicy {
        PollPolicy {
            poll_interval: Duration::from_millis(1),
            timeout: None,
        }
    }

    #[test]
    fn recv_polls_until_packet_arrives() {
        let mut channel = Scripted {
            polls: 0,
            ready_after: 3,
            queue: VecDeque::new(),
        };
        channel.send(&Packet::from_slice(b"hi").unwrap()).unwrap();

        let packet = channel.recv(&fast()).unwrap();
        assert_eq!(packet.as_bytes(), b"hi");
        assert_eq!(channel.polls, 4);
    }

    #[test]
    fn recv_times_out_when_idle() {
        let mut channel = Scripted {
            polls: 0,
            ready_after: 0,
            queue: VecDeque::new(),
        };
        let policy = fast().with_timeout(Duration::from_millis(20));

        let err = channel.recv(&policy).unwrap_err();
        assert!(matches!(err, TransportError::Timeout(d) if d == Duration::from_millis(20)));
        assert!(channel.polls >= 2);
    }

    #[test]
    fn default_policy_waits_forever() {
        let policy = PollPolicy::default();
        assert_eq!(policy.timeout, None);
        assert_eq!(policy.poll_interval, DEFAULT_POLL_INTERVAL);
    }

    fn echo_once<C: Channel>(mut channel: C) -> Option<Packet> {
        channel.send(&Packet::from_slice(b"x").unwrap()).unwrap();
        channel.try_recv().unwrap()
    }

    #[test]
    fn mutable_reference_and_box_are_channels() {
        let mut channel = Scripted {
            polls: 0,
            ready_after: 0,
            queue: VecDeque::new(),
        };
        assert!(echo_once(&mut channel).is_some());
        assert_eq!(channel.polls, 1);

        let boxed: Box<dyn Channel> = Box::new(channel);
        assert!(echo_once(boxed).is_some());
    }
}
