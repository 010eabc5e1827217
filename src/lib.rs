//! LG TV remote: discovery, pairing and command dispatch for LG televisions
//!
//! Two control paths are supported. Over the network, the TV is found with
//! a UDAP broadcast probe, paired with the PIN it displays, and driven with
//! numeric key codes. Over RS-232C, named commands are sent to one of the
//! units on the bus and the TV's echo is decoded through a response table
//! derived from the command catalog.

pub mod catalog;
pub mod core;
pub mod network;
pub mod protocol;
pub mod util;

// Re-export commonly used items
pub use crate::catalog::{CommandCatalog, CommandDescriptor};
pub use crate::core::{Config, DeviceSlot, Error, Result};
pub use crate::network::{
    DiscoveryEngine, DiscoveryOutcome, Dispatcher, HttpTransport, SerialDispatcher,
    SerialTransport, Transport,
};
pub use crate::protocol::{ResponseTable, SerialCommandIndex};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
