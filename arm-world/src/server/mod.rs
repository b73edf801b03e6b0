//! UDP request/reply endpoint
//!
//! One thread owns the socket and answers requests one at a time; the PLC
//! bridge is the only expected client.

mod dispatch;
mod udp;

pub use dispatch::Dispatcher;
pub use udp::WorldServer;
