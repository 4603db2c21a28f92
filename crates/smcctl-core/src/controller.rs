//! Controller handle and status poller
//!
//! [`Controller`] owns the port backend and the clock. All protocol
//! operations take `&mut self`, so two transactions can never interleave on
//! the same handle; the controller itself keeps no protocol state, the
//! hardware does.

use crate::consts::{CMD_PORT, DATA_PORT, MIN_WAIT_US, POLL_ATTEMPTS, POLL_FAST_ATTEMPTS};
use crate::error::PollTimeout;
use crate::io::{Clock, PortIo};
use crate::status::Status;

/// Exclusive handle to an SMC
pub struct Controller<P, C> {
    port: P,
    clock: C,
}

/// Delay after the `attempt`-th failed status sample (1-based)
///
/// The first [`POLL_FAST_ATTEMPTS`] samples use the base interval, every
/// later one doubles the previous delay.
pub const fn backoff_delay_us(attempt: u32) -> u32 {
    MIN_WAIT_US << attempt.saturating_sub(POLL_FAST_ATTEMPTS)
}

impl<P: PortIo, C: Clock> Controller<P, C> {
    /// Take ownership of a port backend and clock
    ///
    /// The caller is responsible for having obtained access to the ports.
    pub fn new(port: P, clock: C) -> Self {
        Self { port, clock }
    }

    /// Borrow the port backend (read-only, no I/O possible through it)
    pub fn port(&self) -> &P {
        &self.port
    }

    /// Borrow the clock
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Give back the port backend and clock
    pub fn into_parts(self) -> (P, C) {
        (self.port, self.clock)
    }

    #[inline]
    pub(crate) fn read_status(&mut self) -> Status {
        Status::from_raw(self.port.read_byte(CMD_PORT))
    }

    #[inline]
    pub(crate) fn read_data(&mut self) -> u8 {
        self.port.read_byte(DATA_PORT)
    }

    #[inline]
    pub(crate) fn write_port(&mut self, port: u16, value: u8) {
        self.port.write_byte(port, value);
    }

    #[inline]
    pub(crate) fn delay_us(&mut self, us: u32) {
        self.clock.delay_us(us);
    }

    /// Poll the status register until `(status & mask) == target`
    ///
    /// Takes at most [`POLL_ATTEMPTS`] samples, sleeping after each miss
    /// according to [`backoff_delay_us`]. Returns as soon as a sample
    /// matches, without sleeping.
    pub fn wait_status(
        &mut self,
        target: Status,
        mask: Status,
    ) -> core::result::Result<(), PollTimeout> {
        let mut last = Status::empty();

        for attempt in 1..=POLL_ATTEMPTS {
            last = self.read_status();
            if last.matches(target, mask) {
                return Ok(());
            }
            self.delay_us(backoff_delay_us(attempt));
        }

        log::trace!(
            "wait_status: gave up waiting for 0x{:02X}/0x{:02X}, last 0x{:02X}",
            target.bits(),
            mask.bits(),
            last.bits()
        );
        Err(PollTimeout { target, mask, last })
    }
}
