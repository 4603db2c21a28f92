//! smcctl-core - Apple System Management Controller protocol core
//!
//! The SMC sits behind two legacy I/O ports: a data port (0x300) and a
//! command/status port (0x304). Every key access is a short handshake driven
//! by polling the status register:
//!
//! ```text
//! sanity check -> command -> 4-byte key -> length -> payload -> settle
//! ```
//!
//! This crate implements that handshake on top of two small traits,
//! [`PortIo`] and [`Clock`], so the same code runs against real hardware
//! (see `smcctl-ioport`) and against the in-memory emulator in
//! `smcctl-dummy`. It is `no_std` and never allocates.
//!
//! # Features
//!
//! - `std` - Implement `std::error::Error` for the error types
//!
//! # Example
//!
//! ```ignore
//! use smcctl_core::{Command, Controller, SmcKey};
//!
//! let mut smc = Controller::new(ports, clock);
//! let key = SmcKey::try_from("BCLM")?;
//!
//! smc.write_smc(Command::Write, key, &[80])?;
//!
//! let mut buf = [0u8; 1];
//! smc.read_smc(Command::Read, key, &mut buf)?;
//! println!("{} = {}", key, buf[0]);
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod consts;
pub mod controller;
pub mod error;
pub mod io;
pub mod key;
pub mod sequencer;
pub mod status;
pub mod transaction;

#[cfg(test)]
mod testutil;

pub use consts::{Command, MAX_DATA_LENGTH};
pub use controller::Controller;
pub use error::{Error, PollTimeout, Result, Stage};
pub use io::{Clock, PortIo};
pub use key::{KeyError, SmcKey};
pub use status::Status;
pub use transaction::{DrainReport, Payload};
