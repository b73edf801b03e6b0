//! UDP transport

use super::Transport;
use crate::error::Result;
use std::io::ErrorKind;
use std::net::{ToSocketAddrs, UdpSocket};
use std::time::Duration;

/// Largest reply accepted
const MAX_DATAGRAM: usize = 4096;

/// Connected UDP socket with a reply timeout
pub struct UdpTransport {
    socket: UdpSocket,
    buffer: Vec<u8>,
}

impl UdpTransport {
    /// Bind an ephemeral local port and connect it to the simulator
    pub fn connect<A: ToSocketAddrs>(addr: A, timeout: Duration) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect(addr)?;
        socket.set_read_timeout(Some(timeout))?;
        Ok(Self {
            socket,
            buffer: vec![0u8; MAX_DATAGRAM],
        })
    }

    /// Drop replies that arrived after an earlier timeout
    fn drain_stale(&mut self) -> Result<()> {
        self.socket.set_nonblocking(true)?;
        while self.socket.recv(&mut self.buffer).is_ok() {
            tracing::debug!("Discarded stale reply");
        }
        self.socket.set_nonblocking(false)?;
        Ok(())
    }
}

impl Transport for UdpTransport {
    fn exchange(&mut self, request: &[u8]) -> Result<Option<Vec<u8>>> {
        self.drain_stale()?;

        if let Err(e) = self.socket.send(request) {
            // Nothing listening on the simulator port yet
            if e.kind() == ErrorKind::ConnectionRefused {
                return Ok(None);
            }
            return Err(e.into());
        }

        match self.socket.recv(&mut self.buffer) {
            Ok(len) => Ok(Some(self.buffer[..len].to_vec())),
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::ConnectionRefused
                ) =>
            {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}
