//! Packet sources for the update loop.
//!
//! The loop pulls one datagram per invocation from a [`PacketSource`]. The
//! production source is a UDP socket; tests supply their own.

pub mod udp;

use thiserror::Error;

pub use udp::{UdpPacketSource, DEFAULT_PORT, DEFAULT_RECEIVE_TIMEOUT, MAX_PACKET_SIZE};

/// Errors from a single receive attempt.
#[derive(Debug, Error)]
pub enum ReceiveError {
    /// Nothing arrived within the receive timeout. Expected and recoverable.
    #[error("receive timed out")]
    TimedOut,
    #[error("receive failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A blocking source of raw packets.
pub trait PacketSource {
    /// Block until a packet arrives or the source's timeout elapses.
    fn recv(&mut self) -> Result<Vec<u8>, ReceiveError>;
}

impl<S: PacketSource + ?Sized> PacketSource for Box<S> {
    fn recv(&mut self) -> Result<Vec<u8>, ReceiveError> {
        (**self).recv()
    }
}
