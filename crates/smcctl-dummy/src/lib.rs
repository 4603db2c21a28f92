//! smcctl-dummy - In-memory SMC emulator for testing
//!
//! [`DummySmc`] implements [`PortIo`] as a small model of the controller's
//! port protocol: it accepts a command, four key bytes and a length byte,
//! then either presents a stored value on the data port or collects the
//! bytes of a write. It is what the tests and the `dummy` backend of the CLI
//! run transactions against.
//!
//! Reads present the whole stored value, the way 2012 and later controllers
//! ignore the length byte. Asking for fewer bytes than the key holds leaves
//! the rest for the drain step; asking for more times out.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::collections::{BTreeMap, VecDeque};
use alloc::vec::Vec;

use smcctl_core::consts::{CMD_PORT, DATA_PORT};
use smcctl_core::{Clock, Command, PortIo, SmcKey, Status};

#[cfg(feature = "std")]
mod params;

#[cfg(feature = "std")]
pub use params::{from_params, DummyError};

/// Configuration for the emulated controller
#[derive(Debug, Clone, Default)]
pub struct DummyConfig {
    /// Start busy, as if a previous transaction had been aborted
    pub start_stuck: bool,
    /// Honour the length byte: present exactly the requested number of
    /// bytes (zero padded) instead of the full stored value
    pub honour_length: bool,
}

/// One port access seen by the emulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortOp {
    /// Status register read, with the value returned
    ReadStatus(u8),
    /// Data port read, with the value returned
    ReadData(u8),
    /// Byte written to the command port
    WriteCommand(u8),
    /// Byte written to the data port
    WriteData(u8),
}

#[derive(Debug, Clone)]
enum Phase {
    Idle,
    /// Busy with nothing to do, cleared by any command
    Stuck,
    Argument {
        cmd: Command,
        key: [u8; 4],
        received: usize,
    },
    Length {
        cmd: Command,
        key: [u8; 4],
    },
    Reading {
        pending: VecDeque<u8>,
    },
    Writing {
        key: [u8; 4],
        expected: usize,
        data: Vec<u8>,
    },
}

/// Emulated SMC
pub struct DummySmc {
    config: DummyConfig,
    keys: BTreeMap<SmcKey, Vec<u8>>,
    phase: Phase,
    input_closed: bool,
    trace: Vec<PortOp>,
}

impl DummySmc {
    /// Create an emulator with no keys
    pub fn new(config: DummyConfig) -> Self {
        let phase = if config.start_stuck {
            Phase::Stuck
        } else {
            Phase::Idle
        };
        Self {
            config,
            keys: BTreeMap::new(),
            phase,
            input_closed: false,
            trace: Vec::new(),
        }
    }

    /// Create an idle emulator with default configuration
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Builder form of [`set_key`](Self::set_key)
    pub fn with_key(mut self, key: SmcKey, value: &[u8]) -> Self {
        self.set_key(key, value);
        self
    }

    /// Store `value` under `key`
    pub fn set_key(&mut self, key: SmcKey, value: &[u8]) {
        self.keys.insert(key, value.to_vec());
    }

    /// Current value of `key`
    pub fn value(&self, key: SmcKey) -> Option<&[u8]> {
        self.keys.get(&key).map(Vec::as_slice)
    }

    /// All stored keys, in order
    pub fn keys(&self) -> impl Iterator<Item = &SmcKey> {
        self.keys.keys()
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// Port accesses since creation or the last [`clear_trace`](Self::clear_trace)
    pub fn trace(&self) -> &[PortOp] {
        &self.trace
    }

    /// Forget recorded port accesses
    pub fn clear_trace(&mut self) {
        self.trace.clear();
    }

    /// True when no transaction is in progress
    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    /// Leave the controller busy with no transaction to finish
    pub fn set_stuck(&mut self) {
        self.phase = Phase::Stuck;
    }

    /// Close or reopen the input buffer; while closed all writes are ignored
    pub fn set_input_closed(&mut self, closed: bool) {
        self.input_closed = closed;
    }

    /// Current status register value
    pub fn status(&self) -> Status {
        let mut status = match &self.phase {
            Phase::Idle => Status::empty(),
            Phase::Stuck
            | Phase::Argument { .. }
            | Phase::Length { .. }
            | Phase::Writing { .. } => Status::BUSY,
            Phase::Reading { pending } if pending.is_empty() => Status::empty(),
            Phase::Reading { .. } => Status::BUSY | Status::AWAITING_DATA,
        };
        if self.input_closed {
            status |= Status::IB_CLOSED;
        }
        status
    }

    fn handle_command(&mut self, code: u8) {
        if !matches!(self.phase, Phase::Idle) {
            // A command while busy abandons whatever was in progress
            log::debug!("dummy SMC: command 0x{:02X} while busy, resetting", code);
            self.phase = Phase::Idle;
            return;
        }

        match Command::from_code(code) {
            Some(cmd) => {
                self.phase = Phase::Argument {
                    cmd,
                    key: [0; 4],
                    received: 0,
                };
            }
            None => log::warn!("dummy SMC: unsupported command 0x{:02X}", code),
        }
    }

    fn handle_data(&mut self, value: u8) {
        let phase = core::mem::replace(&mut self.phase, Phase::Idle);

        self.phase = match phase {
            Phase::Argument {
                cmd,
                mut key,
                received,
            } => {
                key[received] = value;
                if received + 1 == key.len() {
                    Phase::Length { cmd, key }
                } else {
                    Phase::Argument {
                        cmd,
                        key,
                        received: received + 1,
                    }
                }
            }
            Phase::Length { cmd, key } => self.start_transfer(cmd, key, value as usize),
            Phase::Writing {
                key,
                expected,
                mut data,
            } => {
                data.push(value);
                if data.len() == expected {
                    self.store(key, data);
                    Phase::Idle
                } else {
                    Phase::Writing {
                        key,
                        expected,
                        data,
                    }
                }
            }
            other => {
                log::warn!("dummy SMC: unexpected data byte 0x{:02X}", value);
                other
            }
        };
    }

    fn start_transfer(&mut self, cmd: Command, key: [u8; 4], len: usize) -> Phase {
        let Ok(smc_key) = SmcKey::new(key) else {
            log::debug!("dummy SMC: malformed key {:02X?}", key);
            return Phase::Idle;
        };

        match cmd {
            Command::Read => {
                let Some(value) = self.keys.get(&smc_key) else {
                    log::debug!("dummy SMC: no such key {}", smc_key);
                    return Phase::Idle;
                };
                let mut pending: VecDeque<u8> = value.iter().copied().collect();
                if self.config.honour_length {
                    pending.resize(len, 0);
                }
                if pending.is_empty() {
                    Phase::Idle
                } else {
                    Phase::Reading { pending }
                }
            }
            Command::Write if len == 0 => {
                self.store(key, Vec::new());
                Phase::Idle
            }
            Command::Write => Phase::Writing {
                key,
                expected: len,
                data: Vec::with_capacity(len),
            },
        }
    }

    fn store(&mut self, key: [u8; 4], data: Vec<u8>) {
        if let Ok(key) = SmcKey::new(key) {
            log::trace!("dummy SMC: {} <- {:02X?}", key, data);
            self.keys.insert(key, data);
        }
    }

    fn read_data(&mut self) -> u8 {
        let Phase::Reading { pending } = &mut self.phase else {
            log::warn!("dummy SMC: data read with nothing pending");
            return 0xFF;
        };
        let value = pending.pop_front().unwrap_or(0xFF);
        if pending.is_empty() {
            self.phase = Phase::Idle;
        }
        value
    }
}

impl PortIo for DummySmc {
    fn read_byte(&mut self, port: u16) -> u8 {
        match port {
            CMD_PORT => {
                let status = self.status().bits();
                self.trace.push(PortOp::ReadStatus(status));
                status
            }
            DATA_PORT => {
                let value = self.read_data();
                self.trace.push(PortOp::ReadData(value));
                value
            }
            _ => {
                log::warn!("dummy SMC: read from unmapped port 0x{:X}", port);
                0xFF
            }
        }
    }

    fn write_byte(&mut self, port: u16, value: u8) {
        match port {
            CMD_PORT => self.trace.push(PortOp::WriteCommand(value)),
            DATA_PORT => self.trace.push(PortOp::WriteData(value)),
            _ => {
                log::warn!("dummy SMC: write to unmapped port 0x{:X}", port);
                return;
            }
        }

        if self.input_closed {
            log::trace!("dummy SMC: input closed, dropping 0x{:02X}", value);
            return;
        }

        if port == CMD_PORT {
            self.handle_command(value);
        } else {
            self.handle_data(value);
        }
    }
}

/// Clock that only keeps count
///
/// No delay is needed for in-memory operations; the total requested time is
/// kept so callers can see what a real controller would have cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VirtualClock {
    /// Sum of all requested delays in microseconds
    pub elapsed_us: u64,
    /// Number of delays requested
    pub delays: u64,
}

impl Clock for VirtualClock {
    fn delay_us(&mut self, us: u32) {
        self.elapsed_us += u64::from(us);
        self.delays += 1;
    }
}
