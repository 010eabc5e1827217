//! Protocol implementation module
//!
//! Wire formats for both ways of talking to the TV: UDAP envelopes and the
//! discovery probe for the IP protocol, acknowledgement framing and the
//! derived response tables for RS-232C, and the discovery state machine.

pub mod codec;
pub mod message;
pub mod state;
pub mod table;

pub use self::codec::SerialCodec;
pub use self::message::{
    discovery_probe, is_discovery_probe, parse_server_name, Envelope, COMMAND_PATH, PAIRING_PATH,
};
pub use self::state::DiscoveryState;
pub use self::table::{
    ack_marker, expand, Expansion, Marker, ResponseTable, SerialCommand, SerialCommandIndex,
};

/// Largest discovery datagram we read
pub const MAX_DATAGRAM_SIZE: usize = 1024;
