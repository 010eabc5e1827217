use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{Error, Result};

/// Address of one unit on a shared RS-232C control bus (e.g. a display wall)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DeviceSlot(u8);

impl DeviceSlot {
    /// Creates a slot, or `None` when `id` is outside `[0, MAX_SLOTS)`
    pub fn new(id: u8) -> Option<Self> {
        (usize::from(id) < super::MAX_SLOTS).then_some(DeviceSlot(id))
    }

    /// Every addressable slot, in ascending order
    pub fn all() -> impl Iterator<Item = DeviceSlot> {
        (0..super::MAX_SLOTS as u8).map(DeviceSlot)
    }

    /// Returns the raw slot id
    pub fn id(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for DeviceSlot {
    type Error = Error;

    fn try_from(id: u8) -> Result<Self> {
        DeviceSlot::new(id).ok_or_else(|| {
            Error::config(format!(
                "device slot {} is out of range 0..{}",
                id,
                super::MAX_SLOTS
            ))
        })
    }
}

impl From<DeviceSlot> for u8 {
    fn from(slot: DeviceSlot) -> u8 {
        slot.0
    }
}

/// Renders the slot the way it appears on the wire: two digits, zero padded
impl fmt::Display for DeviceSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

/// Pairing PIN shared by a session and every handle that pairs on its behalf
///
/// Clones share one value, so a PIN entered after a dispatcher was handed out
/// is the one its next re-pair sends.
#[derive(Debug, Clone, Default)]
pub struct SharedPin(Arc<RwLock<String>>);

impl SharedPin {
    pub fn new(pin: impl Into<String>) -> Self {
        SharedPin(Arc::new(RwLock::new(pin.into())))
    }

    /// Current PIN
    pub fn get(&self) -> String {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Replaces the PIN for every clone
    pub fn set(&self, pin: impl Into<String>) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = pin.into();
    }
}

impl PartialEq for SharedPin {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.get() == other.get()
    }
}

impl Eq for SharedPin {}

impl From<String> for SharedPin {
    fn from(pin: String) -> Self {
        SharedPin::new(pin)
    }
}

impl From<&str> for SharedPin {
    fn from(pin: &str) -> Self {
        SharedPin::new(pin)
    }
}

/// What the discovery engine knows about the device it is talking to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSession {
    found: bool,
    ip: Option<IpAddr>,
    name: String,
    /// Operator supplied pairing code, empty until the TV has shown it
    pin: SharedPin,
    /// Interval between discovery polls
    pub timeout: Duration,
}

impl DeviceSession {
    /// Creates an empty session that has not seen a device yet
    pub fn new(timeout: Duration) -> Self {
        DeviceSession {
            found: false,
            ip: None,
            name: String::new(),
            pin: SharedPin::default(),
            timeout,
        }
    }

    /// Records the first device that answered discovery.
    ///
    /// Returns `false` and leaves the session untouched if a device was
    /// already recorded; a session never forgets or replaces its device.
    pub fn record(&mut self, ip: IpAddr, name: impl Into<String>) -> bool {
        if self.found {
            return false;
        }
        self.found = true;
        self.ip = Some(ip);
        self.name = name.into();
        true
    }

    pub fn found(&self) -> bool {
        self.found
    }

    pub fn ip(&self) -> Option<IpAddr> {
        self.ip
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pin(&self) -> &SharedPin {
        &self.pin
    }
}

/// Serial line settings for RS-232C control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device path of the serial port
    pub path: String,
    /// Line speed
    pub baud_rate: u32,
    /// Upper bound on waiting for an acknowledgement frame
    #[serde(serialize_with = "super::serde::serialize_duration")]
    #[serde(deserialize_with = "super::serde::deserialize_duration")]
    pub read_timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        SerialConfig {
            path: "/dev/ttys000".to_string(),
            baud_rate: 9600,
            read_timeout: Duration::from_secs(1),
        }
    }
}

/// Configuration for discovery, pairing and command transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Local address the discovery socket binds to
    pub bind_addr: SocketAddr,
    /// Where the discovery probe is sent
    pub broadcast_addr: SocketAddr,
    /// Source port a genuine discovery reply comes from
    pub discovery_port: u16,
    /// This machine's address; detected from the interfaces when unset
    pub local_addr: Option<IpAddr>,
    /// HTTP port of the TV's UDAP service
    pub device_port: u16,
    /// Port announced to the TV in the pairing hello
    pub client_port: u16,
    /// Discovery receive attempts before giving up
    pub max_attempts: u32,
    /// Pause between discovery attempts
    #[serde(serialize_with = "super::serde::serialize_duration")]
    #[serde(deserialize_with = "super::serde::deserialize_duration")]
    pub poll_interval: Duration,
    /// Bound on a single discovery receive
    #[serde(serialize_with = "super::serde::serialize_duration")]
    #[serde(deserialize_with = "super::serde::deserialize_duration")]
    pub receive_timeout: Duration,
    /// Write deadline for the discovery broadcast
    #[serde(serialize_with = "super::serde::serialize_duration")]
    #[serde(deserialize_with = "super::serde::deserialize_duration")]
    pub broadcast_timeout: Duration,
    /// Timeout for HTTP command and pairing requests
    #[serde(serialize_with = "super::serde::serialize_duration")]
    #[serde(deserialize_with = "super::serde::deserialize_duration")]
    pub http_timeout: Duration,
    /// Identification sent in the probe and HTTP requests
    pub user_agent: String,
    /// Serial line settings
    pub serial: SerialConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), super::DISCOVERY_PORT),
            broadcast_addr: SocketAddr::new(Ipv4Addr::BROADCAST.into(), super::DISCOVERY_PORT),
            discovery_port: super::DISCOVERY_PORT,
            local_addr: None,
            device_port: super::DEVICE_PORT,
            client_port: super::DEVICE_PORT,
            max_attempts: super::MAX_DISCOVERY_ATTEMPTS,
            poll_interval: Duration::from_secs(1),
            receive_timeout: Duration::from_secs(1),
            broadcast_timeout: super::BROADCAST_WRITE_TIMEOUT,
            http_timeout: Duration::from_secs(10),
            user_agent: super::USER_AGENT.to_string(),
            serial: SerialConfig::default(),
        }
    }
}

impl Config {
    /// Parses a JSON document; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every wait is bounded and the attempt budget is usable
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::config("max_attempts must be at least 1"));
        }

        let waits = [
            ("receive_timeout", self.receive_timeout),
            ("broadcast_timeout", self.broadcast_timeout),
            ("http_timeout", self.http_timeout),
            ("serial.read_timeout", self.serial.read_timeout),
        ];
        for (name, wait) in waits {
            if wait.is_zero() {
                return Err(Error::config(format!("{} must be non-zero", name)));
            }
        }

        if self.serial.baud_rate == 0 {
            return Err(Error::config("serial.baud_rate must be non-zero"));
        }

        Ok(())
    }
}
