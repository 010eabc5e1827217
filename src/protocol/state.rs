use std::fmt;

use crate::core::{Error, Result};

/// Where a discovery run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryState {
    /// Not running
    Idle,

    /// Probe is being sent
    Broadcasting,

    /// Waiting for replies
    AwaitingReply {
        /// One-based attempt number
        attempt: u32,
    },

    /// A TV answered; terminal for the engine's lifetime
    Found,

    /// Attempt budget exhausted
    GivingUp,
}

impl DiscoveryState {
    /// Validates a move to `next` and returns it.
    ///
    /// Any state may return to `Idle` (cancellation or abort). A run that gave
    /// up may broadcast again; a run that found a device never leaves `Found`
    /// except to `Idle`.
    pub fn advance(self, next: DiscoveryState) -> Result<DiscoveryState> {
        use DiscoveryState::*;

        let allowed = match (self, next) {
            (_, Idle) => true,
            (Idle | GivingUp, Broadcasting) => true,
            (Broadcasting, AwaitingReply { attempt }) => attempt == 1,
            (AwaitingReply { attempt: current }, AwaitingReply { attempt }) => {
                attempt == current + 1
            }
            (AwaitingReply { .. }, Found | GivingUp) => true,
            _ => false,
        };

        if allowed {
            Ok(next)
        } else {
            Err(Error::invalid_state(format!(
                "cannot move discovery from {} to {}",
                self, next
            )))
        }
    }

    /// True once the run has an answer
    pub fn is_terminal(&self) -> bool {
        matches!(self, DiscoveryState::Found | DiscoveryState::GivingUp)
    }
}

impl fmt::Display for DiscoveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryState::Idle => f.write_str("idle"),
            DiscoveryState::Broadcasting => f.write_str("broadcasting"),
            DiscoveryState::AwaitingReply { attempt } => write!(f, "awaiting reply #{}", attempt),
            DiscoveryState::Found => f.write_str("found"),
            DiscoveryState::GivingUp => f.write_str("giving up"),
        }
    }
}
