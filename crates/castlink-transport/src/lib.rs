//! Fixed-size packet channel abstraction.
//!
//! A castlink channel moves whole packets of at most [`MAX_PACKET_SIZE`]
//! bytes between two stations. Delivery is best effort: packets that arrive
//! keep their order, but the channel may drop packets silently.
//!
//! Implementations:
//! - [`MemoryChannel`]: connected in-process pair, used by tests and demos
//! - [`UnixDatagramChannel`]: one datagram per packet over Unix sockets
//!
//! [`Interruptible`] wraps any channel so a stop flag (set from a signal
//! handler, say) ends a blocking receive.
//!
//! This is the lowest layer of castlink. The framing layer builds on top of
//! the [`Channel`] trait provided here.

pub mod error;
pub mod interrupt;
pub mod memory;
pub mod packet;
pub mod traits;

#[cfg(unix)]
pub mod uds;

pub use error::{Result, TransportError};
pub use interrupt::Interruptible;
pub use memory::MemoryChannel;
pub use packet::{Packet, MAX_PACKET_SIZE};
pub use traits::{Channel, PollPolicy, DEFAULT_POLL_INTERVAL};

#[cfg(unix)]
pub use uds::UnixDatagramChannel;
