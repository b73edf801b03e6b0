//! Request/reply transport to the world simulator

use crate::error::Result;

mod mock;
mod udp;

pub use mock::MockTransport;
pub use udp::UdpTransport;

/// One datagram out, at most one datagram back
pub trait Transport: Send {
    /// Send `request` and wait for a reply
    ///
    /// Returns `Ok(None)` when no reply arrived before the timeout.
    fn exchange(&mut self, request: &[u8]) -> Result<Option<Vec<u8>>>;
}
