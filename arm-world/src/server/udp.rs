//! Socket loop for the world server

use super::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::simulator::SharedSimulator;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Largest request accepted
const MAX_DATAGRAM: usize = 4096;

/// UDP server answering protocol requests against a shared simulator
pub struct WorldServer {
    socket: UdpSocket,
    dispatcher: Dispatcher,
    running: Arc<AtomicBool>,
    buffer: Vec<u8>,
}

impl WorldServer {
    /// Bind the server socket
    ///
    /// `read_timeout` bounds how long a shutdown request can go unnoticed.
    pub fn bind<A: ToSocketAddrs>(
        addr: A,
        simulator: SharedSimulator,
        running: Arc<AtomicBool>,
        read_timeout: Duration,
    ) -> Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        socket.set_read_timeout(Some(read_timeout))?;
        Ok(Self {
            socket,
            dispatcher: Dispatcher::new(simulator),
            running,
            buffer: vec![0u8; MAX_DATAGRAM],
        })
    }

    /// Address the socket is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Serve until the running flag is cleared
    pub fn run(&mut self) -> Result<()> {
        log::info!("World server listening on {}", self.local_addr()?);

        while self.running.load(Ordering::Relaxed) {
            let (len, peer) = match self.socket.recv_from(&mut self.buffer) {
                Ok(received) => received,
                Err(e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    continue;
                }
                Err(e) => {
                    // Windows reports ICMP port unreachable from a previous send here
                    if e.kind() == std::io::ErrorKind::ConnectionReset {
                        continue;
                    }
                    log::error!("Receive failed: {}", e);
                    return Err(Error::Io(e));
                }
            };

            let reply = self.dispatcher.handle(&self.buffer[..len]);
            if let Err(e) = self.socket.send_to(reply.as_bytes(), peer) {
                log::warn!("Failed to reply to {}: {}", peer, e);
            }
        }

        log::info!("World server stopped");
        Ok(())
    }

    /// Run the server on its own thread
    pub fn spawn(mut self) -> Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("world-server".to_string())
            .spawn(move || {
                if let Err(e) = self.run() {
                    log::error!("World server error: {}", e);
                }
            })
            .map_err(|e| Error::Other(format!("Failed to spawn server thread: {}", e)))
    }
}
