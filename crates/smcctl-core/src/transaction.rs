//! Key read and write transactions
//!
//! A transaction is: sanity check, command, key, length byte, payload, and a
//! final wait for BUSY to clear. Reads additionally drain any bytes the
//! controller still offers after the requested length. The first failing
//! step aborts the transaction; nothing is rolled back, the next
//! transaction's sanity check takes care of a controller left mid-command.

use crate::consts::{Command, DATA_PORT, DRAIN_ATTEMPTS, MAX_DATA_LENGTH, MIN_WAIT_US};
use crate::controller::Controller;
use crate::error::{Error, PollTimeout, Result, Stage};
use crate::io::{Clock, PortIo};
use crate::key::SmcKey;
use crate::status::Status;

/// A key value as returned by [`Controller::read_key`]
pub type Payload = heapless::Vec<u8, MAX_DATA_LENGTH>;

/// Bytes discarded after a read
///
/// The controller sometimes keeps offering data after the requested length
/// has been read, e.g. when the key is longer than what was asked for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Number of bytes read and discarded
    pub flushed: usize,
    /// Last discarded byte
    pub last_value: Option<u8>,
}

impl DrainReport {
    /// True if nothing had to be drained
    pub fn is_clean(&self) -> bool {
        self.flushed == 0
    }
}

fn at(key: SmcKey, stage: Stage) -> impl FnOnce(PollTimeout) -> Error {
    move |poll| {
        log::debug!("{}: {} failed: {}", key, stage, poll);
        Error::Timeout { key, stage, poll }
    }
}

fn check_len(len: usize) -> Result<u8> {
    if len > MAX_DATA_LENGTH {
        return Err(Error::InvalidLength(len));
    }
    Ok(len as u8)
}

impl<P: PortIo, C: Clock> Controller<P, C> {
    /// Sanity check, command, key and length byte
    fn begin(&mut self, cmd: Command, key: SmcKey, len: u8) -> Result<()> {
        self.smc_sane().map_err(at(key, Stage::Sanity))?;
        self.send_command(cmd).map_err(at(key, Stage::Command))?;
        self.send_argument(&key).map_err(at(key, Stage::Argument))?;
        // Ignored by 2012 and later controllers, required by older ones
        self.send_byte(len, DATA_PORT)
            .map_err(at(key, Stage::Length))
    }

    fn drain(&mut self) -> DrainReport {
        let mut report = DrainReport::default();

        while report.flushed < DRAIN_ATTEMPTS {
            self.delay_us(MIN_WAIT_US);
            if !self.read_status().contains(Status::AWAITING_DATA) {
                break;
            }
            report.last_value = Some(self.read_data());
            report.flushed += 1;
        }

        report
    }

    fn settle(&mut self, key: SmcKey) -> Result<()> {
        self.wait_status(Status::empty(), Status::BUSY)
            .map_err(at(key, Stage::Settle))
    }

    /// Read `buf.len()` bytes of `key` into `buf`
    ///
    /// `cmd` is normally [`Command::Read`]. Extra bytes the controller
    /// offers after the payload are discarded and reported in the returned
    /// [`DrainReport`]; that is not an error.
    pub fn read_smc(&mut self, cmd: Command, key: SmcKey, buf: &mut [u8]) -> Result<DrainReport> {
        let len = check_len(buf.len())?;
        self.begin(cmd, key, len)?;

        let ready = Status::AWAITING_DATA | Status::BUSY;
        for (index, byte) in buf.iter_mut().enumerate() {
            self.wait_status(ready, ready)
                .map_err(at(key, Stage::Data { index }))?;
            *byte = self.read_data();
        }

        let report = self.drain();
        if let Some(last) = report.last_value {
            log::warn!(
                "{}: flushed {} bytes, last value is: {}",
                key,
                report.flushed,
                last
            );
        }

        self.settle(key)?;
        Ok(report)
    }

    /// Write `buf` as the value of `key`
    ///
    /// `cmd` is normally [`Command::Write`].
    pub fn write_smc(&mut self, cmd: Command, key: SmcKey, buf: &[u8]) -> Result<()> {
        let len = check_len(buf.len())?;
        self.begin(cmd, key, len)?;

        for (index, &byte) in buf.iter().enumerate() {
            self.send_byte(byte, DATA_PORT)
                .map_err(at(key, Stage::Data { index }))?;
        }

        self.settle(key)
    }

    /// Read `len` bytes of `key`
    pub fn read_key(&mut self, key: SmcKey, len: usize) -> Result<Payload> {
        let mut buf = [0u8; MAX_DATA_LENGTH];
        let out = buf.get_mut(..len).ok_or(Error::InvalidLength(len))?;
        self.read_smc(Command::Read, key, out)?;

        Payload::from_slice(&buf[..len]).map_err(|_| Error::InvalidLength(len))
    }

    /// Write `data` to `key`
    pub fn write_key(&mut self, key: SmcKey, data: &[u8]) -> Result<()> {
        self.write_smc(Command::Write, key, data)
    }
}
