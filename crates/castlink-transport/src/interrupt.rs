use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Result, TransportError};
use crate::packet::Packet;
use crate::traits::Channel;

/// Channel wrapper that stops receiving once a shared flag is raised.
///
/// After the flag is set, every receive fails with
/// [`TransportError::Shutdown`], which unblocks a receiver waiting on
/// [`Channel::recv`] within one poll interval. Sends are unaffected.
#[derive(Debug)]
pub struct Interruptible<C> {
    inner: C,
    stop: Arc<AtomicBool>,
}

impl<C: Channel> Interruptible<C> {
    pub fn new(inner: C, stop: Arc<AtomicBool>) -> Self {
        Self { inner, stop }
    }

    /// The shared stop flag.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn get_ref(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: Channel> Channel for Interruptible<C> {
    fn send(&mut self, packet: &Packet) -> Result<()> {
        self.inner.send(packet)
    }

    fn try_recv(&mut self) -> Result<Option<Packet>> {
        if self.stop.load(Ordering::SeqCst) {
            return Err(TransportError::Shutdown);
        }
        self.inner.try_recv()
    }
}
