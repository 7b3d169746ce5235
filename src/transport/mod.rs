//! Transport — TCP delivery of programs and dashboard commands.
//!
//! Delivery is fire-and-forget: success means the bytes were written and
//! flushed, not that the controller executed anything. No response is read
//! on either channel.

pub mod tcp;

pub use tcp::RobotClient;

use crate::core::types::{CompiledProgram, ControlCommand};
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Which bounded phase of a send expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutPhase {
    Connect,
    Write,
}

impl fmt::Display for TimeoutPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => write!(f, "connect"),
            Self::Write => write!(f, "write"),
        }
    }
}

/// Delivery failure. A send that fails partway is failed as a whole; the
/// controller's partial receipt is undefined and out of this core's control.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connect to {addr} failed: {source}")]
    ConnectFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("write to {addr} failed: {source}")]
    WriteFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{phase} to {addr} timed out after {timeout:?}")]
    Timeout {
        addr: String,
        phase: TimeoutPhase,
        timeout: Duration,
    },
}

/// Delivery seam between the dispatcher and the wire.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver one compiled program to the program-execution port.
    async fn send_program(&self, program: &CompiledProgram) -> Result<(), TransportError>;

    /// Deliver one dashboard command to the control port.
    async fn send_command(&self, command: ControlCommand) -> Result<(), TransportError>;
}
