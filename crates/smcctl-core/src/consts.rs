//! SMC port addresses, command codes and protocol limits
//!
//! These values match the applesmc Linux driver and must not change: the
//! controller firmware expects exactly this framing.

use core::fmt;

/// Data port: key bytes, length and payload go through here
pub const DATA_PORT: u16 = 0x300;

/// Command/status port: command byte in, status byte out
pub const CMD_PORT: u16 = 0x304;

/// Number of consecutive ports claimed starting at [`DATA_PORT`]
pub const PORT_RANGE: u16 = 0x10;

/// Largest value any single key can hold
pub const MAX_DATA_LENGTH: usize = 32;

/// Base sleep between status samples, in microseconds
pub const MIN_WAIT_US: u32 = 0x0010;

/// Status samples taken by one poll before giving up
pub const POLL_ATTEMPTS: u32 = 24;

/// Samples taken at the base interval before the backoff starts doubling
pub const POLL_FAST_ATTEMPTS: u32 = 10;

/// Upper bound on bytes discarded after a read
pub const DRAIN_ATTEMPTS: usize = 16;

/// Transaction command byte
///
/// The command selects the direction of the transfer that follows the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    /// Read a key's value
    Read = 0x10,
    /// Write a key's value
    Write = 0x11,
}

impl Command {
    /// Raw command byte as written to [`CMD_PORT`]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decode a raw command byte
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0x10 => Some(Self::Read),
            0x11 => Some(Self::Write),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
        }
    }
}
