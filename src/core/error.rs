use std::io;
use thiserror::Error;

/// Custom error types for the LG TV remote
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The request never produced a usable reply
    #[error("Transport error: {0}")]
    Transport(String),

    /// A device sent something that does not follow the wire protocol
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A local resource (socket, interface, port) is unavailable
    #[error("Resource error: {0}")]
    Resource(String),

    #[error("Pairing error: {0}")]
    Pairing(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a new transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Error::Transport(msg.into())
    }

    /// Creates a new protocol error
    pub fn protocol(msg: impl Into<String>) -> Self {
        Error::Protocol(msg.into())
    }

    /// Creates a new resource error
    pub fn resource(msg: impl Into<String>) -> Self {
        Error::Resource(msg.into())
    }

    /// Creates a new pairing error
    pub fn pairing(msg: impl Into<String>) -> Self {
        Error::Pairing(msg.into())
    }

    /// Creates a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Creates a new invalid state error
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Error::InvalidState(msg.into())
    }

    /// True for malformed device replies, as opposed to network trouble
    pub fn is_protocol(&self) -> bool {
        matches!(self, Error::Protocol(_))
    }
}
