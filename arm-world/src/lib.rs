//! arm-world - World simulator for the 6-axis robot arm
//!
//! Owns the authoritative arm and cube state and serves it over a small UDP
//! text protocol (`KEY;TYPE;JSON`) to the PLC bridge.
//!
//! ## Threads
//!
//! - **world-physics**: ticks the [`Simulator`] at a fixed period
//! - **world-server**: answers protocol requests one at a time
//!
//! Both share one `Arc<parking_lot::Mutex<Simulator>>`.

pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod simulator;

pub use config::WorldConfig;
pub use error::{Error, Result};
pub use server::{Dispatcher, WorldServer};
pub use simulator::{SharedSimulator, Simulator, spawn_physics};
