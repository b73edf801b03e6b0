//! arm-plc - PLC bridge and HMI controller for the robot arm simulator
//!
//! The bridge logs in to the world simulator over UDP and keeps a variable
//! store in sync with it. The HMI reads sensor variables from that store and
//! writes target variables, including autonomous grasp targets from IK.
//!
//! ## Threads
//!
//! - **plc-sync**: [`SyncLoop`] ticks at a fixed interval and steps the
//!   reconnect countdown on its own cadence
//! - **main**: HMI commands (auto-grab, scenarios) against the same store
//!
//! The store is shared as `Arc<dyn VariableStore>`; each side gets a
//! [`RoleWriter`] that can only write its own variables.

pub mod config;
pub mod connector;
pub mod error;
pub mod hmi;
pub mod store;
pub mod sync;
pub mod transport;

pub use config::PlcConfig;
pub use connector::{BridgeConnector, ConnectionState};
pub use error::{PlcError, Result};
pub use hmi::{HmiController, HmiError, HmiSnapshot, ScenarioAction, load_scenario};
pub use store::{
    MemoryStore, RoleWriter, StoreError, Value, VariableName, VariableStore, WriterRole,
    register_variables,
};
pub use sync::{SyncLoop, SyncStatus, TickReport};
pub use transport::{MockTransport, Transport, UdpTransport};
