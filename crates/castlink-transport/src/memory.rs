use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use tracing::trace;

use crate::error::{Result, TransportError};
use crate::packet::Packet;
use crate::traits::Channel;

/// One end of a connected in-process channel pair.
///
/// Delivery is ordered and lossless. Once the peer is dropped, sends fail
/// and receives fail after the queue is drained, both with
/// [`TransportError::Disconnected`].
#[derive(Debug)]
pub struct MemoryChannel {
    tx: Sender<Packet>,
    rx: Receiver<Packet>,
    sent: usize,
}

impl MemoryChannel {
    /// Create two connected endpoints.
    pub fn pair() -> (Self, Self) {
        let (left_tx, right_rx) = mpsc::channel();
        let (right_tx, left_rx) = mpsc::channel();
        (
            Self {
                tx: left_tx,
                rx: left_rx,
                sent: 0,
            },
            Self {
                tx: right_tx,
                rx: right_rx,
                sent: 0,
            },
        )
    }

    /// Number of packets sent from this end.
    pub fn sent_packets(&self) -> usize {
        self.sent
    }
}

impl Channel for MemoryChannel {
    fn send(&mut self, packet: &Packet) -> Result<()> {
        self.tx
            .send(packet.clone())
            .map_err(|_| TransportError::Disconnected)?;
        self.sent += 1;
        trace!(len = packet.len(), "memory channel send");
        Ok(())
    }

    fn try_recv(&mut self) -> Result<Option<Packet>> {
        match self.rx.try_recv() {
            Ok(packet) => Ok(Some(packet)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(TransportError::Disconnected),
        }
    }
}
