//! Command and byte sequencing
//!
//! Each byte sent to the SMC is gated on the status register. Commands only
//! need the input buffer to be open; argument and data bytes additionally
//! need BUSY to be set, proving a command is being processed.

use crate::consts::{Command, CMD_PORT, DATA_PORT};
use crate::controller::Controller;
use crate::error::PollTimeout;
use crate::io::{Clock, PortIo};
use crate::key::SmcKey;
use crate::status::Status;

type PollResult = core::result::Result<(), PollTimeout>;

impl<P: PortIo, C: Clock> Controller<P, C> {
    /// Write a command byte once the input buffer is open
    pub fn send_command(&mut self, cmd: Command) -> PollResult {
        self.wait_status(Status::empty(), Status::IB_CLOSED)?;
        self.write_port(CMD_PORT, cmd.code());
        Ok(())
    }

    /// Write an argument or data byte to `port`
    ///
    /// Waits for the input buffer to open, then separately for BUSY. The
    /// two polls must not be merged into one status sample.
    pub fn send_byte(&mut self, value: u8, port: u16) -> PollResult {
        self.wait_status(Status::empty(), Status::IB_CLOSED)?;
        self.wait_status(Status::BUSY, Status::BUSY)?;
        self.write_port(port, value);
        Ok(())
    }

    /// Send the four key bytes to the data port
    pub fn send_argument(&mut self, key: &SmcKey) -> PollResult {
        for &b in key.as_bytes() {
            self.send_byte(b, DATA_PORT)?;
        }
        Ok(())
    }

    /// Recover a controller left busy by an aborted transaction
    ///
    /// An idle controller costs a single status read. A busy one gets a
    /// READ command and must then drop BUSY within one poll.
    pub fn smc_sane(&mut self) -> PollResult {
        if !self.read_status().contains(Status::BUSY) {
            return Ok(());
        }

        log::debug!("SMC busy before transaction, sending recovery read");
        self.send_command(Command::Read)?;
        self.wait_status(Status::empty(), Status::BUSY)
    }
}

#[cfg(test)]
mod tests {
    use crate::consts::{CMD_PORT, DATA_PORT};
    use crate::testutil::{Op, RecordingClock, ScriptedPort};
    use crate::{Command, Controller, SmcKey, Status};

    fn controller(statuses: &[u8], fallback: u8) -> Controller<ScriptedPort, RecordingClock> {
        Controller::new(ScriptedPort::new(statuses, fallback), RecordingClock::default())
    }

    #[test]
    fn test_send_command_waits_for_input_buffer() {
        let mut smc = controller(&[0x02, 0x02, 0x04], 0x00);
        smc.send_command(Command::Write).unwrap();
        assert_eq!(smc.port().status_reads(), 3);
        assert_eq!(smc.port().writes(), [(CMD_PORT, 0x11)]);
    }

    #[test]
    fn test_send_command_does_not_wait_for_busy() {
        // Input open but BUSY clear: a command is still accepted
        let mut smc = controller(&[0x00], 0x00);
        smc.send_command(Command::Read).unwrap();
        assert_eq!(smc.port().status_reads(), 1);
    }

    #[test]
    fn test_send_command_timeout_writes_nothing() {
        let mut smc = controller(&[], 0x02);
        assert!(smc.send_command(Command::Read).is_err());
        assert!(smc.port().writes().is_empty());
    }

    #[test]
    fn test_send_byte_uses_two_separate_polls() {
        // Both conditions already hold: still two distinct status samples
        let mut smc = controller(&[0x04, 0x04], 0x00);
        smc.send_byte(0xAB, DATA_PORT).unwrap();
        assert_eq!(
            smc.port().ops,
            [
                Op::Status(0x04),
                Op::Status(0x04),
                Op::Write {
                    port: DATA_PORT,
                    value: 0xAB
                }
            ]
        );
    }

    #[test]
    fn test_send_byte_waits_for_busy() {
        // IB open immediately, BUSY only on the third sample of the second poll
        let mut smc = controller(&[0x00, 0x00, 0x00, 0x04], 0x00);
        smc.send_byte(0x01, DATA_PORT).unwrap();
        assert_eq!(smc.port().status_reads(), 4);
        assert_eq!(smc.port().writes(), [(DATA_PORT, 0x01)]);
    }

    #[test]
    fn test_send_byte_busy_timeout_writes_nothing() {
        let mut smc = controller(&[0x00], 0x00);
        let err = smc.send_byte(0x01, DATA_PORT).unwrap_err();
        assert_eq!(err.mask, Status::BUSY);
        assert_eq!(smc.port().status_reads(), 25);
        assert!(smc.port().writes().is_empty());
    }

    #[test]
    fn test_send_argument_sends_key_bytes_in_order() {
        let mut smc = controller(&[], 0x04);
        let key = SmcKey::try_from("BCLM").unwrap();
        smc.send_argument(&key).unwrap();
        assert_eq!(
            smc.port().writes(),
            [
                (DATA_PORT, b'B'),
                (DATA_PORT, b'C'),
                (DATA_PORT, b'L'),
                (DATA_PORT, b'M')
            ]
        );
    }

    #[test]
    fn test_send_argument_stops_at_first_failure() {
        // Two bytes go through, then the input buffer stays closed
        let mut smc = controller(&[0x04, 0x04, 0x04, 0x04], 0x06);
        let key = SmcKey::try_from("BCLM").unwrap();
        assert!(smc.send_argument(&key).is_err());
        assert_eq!(smc.port().writes(), [(DATA_PORT, b'B'), (DATA_PORT, b'C')]);
    }

    #[test]
    fn test_smc_sane_idle_is_single_read() {
        let mut smc = controller(&[0x00], 0x04);
        smc.smc_sane().unwrap();
        assert_eq!(smc.port().ops, [Op::Status(0x00)]);
        assert!(smc.clock().sleeps.is_empty());
    }

    #[test]
    fn test_smc_sane_ignores_other_bits_when_idle() {
        let mut smc = controller(&[0x03], 0x04);
        smc.smc_sane().unwrap();
        assert_eq!(smc.port().status_reads(), 1);
        assert!(smc.port().writes().is_empty());
    }

    #[test]
    fn test_smc_sane_busy_sends_one_read_command() {
        // busy probe, IB open for the command, then BUSY clears after one sample
        let mut smc = controller(&[0x04, 0x04, 0x04, 0x00], 0x00);
        smc.smc_sane().unwrap();
        assert_eq!(smc.port().writes(), [(CMD_PORT, 0x10)]);
        assert_eq!(smc.port().status_reads(), 4);
    }

    #[test]
    fn test_smc_sane_busy_forever_fails() {
        let mut smc = controller(&[0x04, 0x04], 0x04);
        let err = smc.smc_sane().unwrap_err();
        assert_eq!(err.mask, Status::BUSY);
        assert_eq!(smc.port().writes(), [(CMD_PORT, 0x10)]);
        // probe + command poll + 24 settle samples
        assert_eq!(smc.port().status_reads(), 26);
    }

    #[test]
    fn test_smc_sane_stuck_input_buffer_fails_before_command() {
        let mut smc = controller(&[], 0x06);
        assert!(smc.smc_sane().is_err());
        assert!(smc.port().writes().is_empty());
    }
}
