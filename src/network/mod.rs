//! Device communication
//!
//! Discovery finds a TV and starts pairing, the dispatchers send commands,
//! and the transports move bytes over HTTP or a serial line.

mod discovery;
mod dispatcher;
mod pairing;
mod serial;
mod transport;

pub use self::discovery::{DiscoveredDevice, DiscoveryEngine, DiscoveryOutcome, PairingStatus};
pub use self::dispatcher::{Acknowledgement, Dispatcher, SerialDispatcher};
pub use self::pairing::Pairing;
pub use self::serial::{SerialLine, SerialTransport};
pub use self::transport::{HttpTransport, Reply, Transport, STATUS_NOT_ACCEPTABLE, STATUS_OK};
