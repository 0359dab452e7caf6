//! UDP packet source.

use super::{PacketSource, ReceiveError};
use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

/// Port the PICO streaming service sends to by default.
pub const DEFAULT_PORT: u16 = 29765;

/// Upper bound on a single receive.
pub const MAX_PACKET_SIZE: usize = 4096;

/// How long one receive may block.
pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_millis(100);

/// Blocking UDP socket with a read timeout.
pub struct UdpPacketSource {
    socket: UdpSocket,
    local_addr: SocketAddr,
    buf: Vec<u8>,
}

impl UdpPacketSource {
    /// Bind to a local address with the default receive timeout.
    pub fn bind(addr: SocketAddr) -> Result<Self, ReceiveError> {
        Self::bind_with_timeout(addr, DEFAULT_RECEIVE_TIMEOUT)
    }

    /// Bind to a local address with a custom receive timeout.
    pub fn bind_with_timeout(addr: SocketAddr, timeout: Duration) -> Result<Self, ReceiveError> {
        let socket = UdpSocket::bind(addr)?;
        socket.set_read_timeout(Some(timeout))?;
        let local_addr = socket.local_addr()?;
        tracing::debug!(%local_addr, timeout_ms = timeout.as_millis() as u64, "udp source bound");

        Ok(Self {
            socket,
            local_addr,
            buf: vec![0u8; MAX_PACKET_SIZE],
        })
    }

    /// Get local address
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

impl PacketSource for UdpPacketSource {
    fn recv(&mut self) -> Result<Vec<u8>, ReceiveError> {
        match self.socket.recv_from(&mut self.buf) {
            Ok((len, _from)) => Ok(self.buf[..len].to_vec()),
            // Unix reports an elapsed read timeout as WouldBlock.
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                Err(ReceiveError::TimedOut)
            }
            Err(e) => Err(ReceiveError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loopback() -> SocketAddr {
        "127.0.0.1:0".parse().unwrap()
    }

    #[test]
    fn test_bind_assigns_port() {
        let source = UdpPacketSource::bind(loopback()).unwrap();
        assert_ne!(source.local_addr().port(), 0);
    }

    #[test]
    fn test_recv_times_out() {
        let mut source =
            UdpPacketSource::bind_with_timeout(loopback(), Duration::from_millis(10)).unwrap();
        assert!(matches!(source.recv(), Err(ReceiveError::TimedOut)));
    }

    #[test]
    fn test_recv_returns_datagram() {
        let mut source = UdpPacketSource::bind(loopback()).unwrap();
        let sender = UdpSocket::bind(loopback()).unwrap();
        sender.send_to(&[1, 2, 3], source.local_addr()).unwrap();

        assert_eq!(source.recv().unwrap(), vec![1, 2, 3]);
    }
}
