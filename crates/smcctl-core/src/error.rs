//! Error types for smcctl-core
//!
//! Every protocol failure is a status poll that ran out of attempts. The
//! transaction layer wraps it with the key and the stage that was in
//! progress so the caller can tell where the handshake stalled.

use core::fmt;

use crate::key::SmcKey;
use crate::status::Status;

/// A status poll exhausted its attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTimeout {
    /// Value the masked status was expected to equal
    pub target: Status,
    /// Bits that were compared
    pub mask: Status,
    /// Last status byte sampled
    pub last: Status,
}

impl fmt::Display for PollTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "status 0x{:02X} & 0x{:02X} never became 0x{:02X}",
            self.last.bits(),
            self.mask.bits(),
            self.target.bits()
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PollTimeout {}

/// Step of a key transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Recovery probe before the command
    Sanity,
    /// Command byte
    Command,
    /// Four key bytes
    Argument,
    /// Legacy length byte
    Length,
    /// Payload byte at `index`
    Data {
        /// Position within the payload
        index: usize,
    },
    /// Waiting for BUSY to clear at the end
    Settle,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sanity => write!(f, "sanity check"),
            Self::Command => write!(f, "command"),
            Self::Argument => write!(f, "argument"),
            Self::Length => write!(f, "length"),
            Self::Data { index } => write!(f, "data[{}]", index),
            Self::Settle => write!(f, "settle"),
        }
    }
}

/// Core error type - no_std compatible, Copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The controller did not reach the expected status in time
    Timeout {
        /// Key being accessed
        key: SmcKey,
        /// Step that stalled
        stage: Stage,
        /// Poll details
        poll: PollTimeout,
    },
    /// Payload longer than [`MAX_DATA_LENGTH`](crate::MAX_DATA_LENGTH)
    InvalidLength(usize),
}

impl Error {
    /// True for protocol timeouts (as opposed to argument errors)
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Stage that failed, for timeouts
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Timeout { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout { key, stage, poll } => {
                write!(f, "{}: {} failed: {}", key, stage, poll)
            }
            Self::InvalidLength(len) => write!(
                f,
                "payload length {} exceeds {} bytes",
                len,
                crate::MAX_DATA_LENGTH
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Timeout { poll, .. } => Some(poll),
            Self::InvalidLength(_) => None,
        }
    }
}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
