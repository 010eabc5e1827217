//! Core types and constants for the LG TV remote
//!
//! This module contains the fundamental building blocks used throughout the library.

pub mod error;
pub mod serde;
pub mod types;

use std::time::Duration;

pub use self::error::{Error, Result};
pub use self::types::{Config, DeviceSession, DeviceSlot, SerialConfig, SharedPin};

/// UDP port for the UDAP discovery probe and its replies
pub const DISCOVERY_PORT: u16 = 1990;

/// HTTP port of the TV's UDAP service
pub const DEVICE_PORT: u16 = 8080;

/// Number of units addressable on one RS-232C bus
pub const MAX_SLOTS: usize = 5;

/// Discovery receive attempts before giving up
pub const MAX_DISCOVERY_ATTEMPTS: u32 = 10;

/// Write deadline for the discovery broadcast
pub const BROADCAST_WRITE_TIMEOUT: Duration = Duration::from_secs(7);

/// Payload asking the TV to report a value instead of setting one
pub const STATUS_QUERY: &str = "FF";

/// The UDAP service only answers clients that look like a browser
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_11_6) AppleWebKit/601.7.7 (KHTML, like Gecko) Version/9.1.2 Safari/601.7.7";
