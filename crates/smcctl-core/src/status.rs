//! SMC status register

use bitflags::bitflags;

bitflags! {
    /// Status byte read from the command port
    ///
    /// The bits are independent; the protocol tests combinations of them
    /// (a readable payload byte shows up as `AWAITING_DATA | BUSY`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Status: u8 {
        /// Controller has a data byte waiting to be read
        const AWAITING_DATA = 0x01;
        /// Input buffer closed, writes are ignored
        const IB_CLOSED     = 0x02;
        /// A command is in progress
        const BUSY          = 0x04;
    }
}

impl Status {
    /// Interpret a raw status byte, keeping any undocumented bits
    pub const fn from_raw(raw: u8) -> Self {
        Self::from_bits_retain(raw)
    }

    /// True when `(self & mask) == target`
    pub fn matches(self, target: Status, mask: Status) -> bool {
        self.bits() & mask.bits() == target.bits()
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_masks_other_bits() {
        let s = Status::from_raw(0x05);
        assert!(s.matches(Status::BUSY, Status::BUSY));
        assert!(s.matches(Status::empty(), Status::IB_CLOSED));
        assert!(!s.matches(Status::empty(), Status::BUSY));
        assert!(s.matches(
            Status::AWAITING_DATA | Status::BUSY,
            Status::AWAITING_DATA | Status::BUSY
        ));
    }

    #[test]
    fn test_unknown_bits_retained() {
        let s = Status::from_raw(0x84);
        assert_eq!(s.bits(), 0x84);
        assert!(s.contains(Status::BUSY));
        // Bits outside the mask never affect a match
        assert!(s.matches(Status::BUSY, Status::BUSY | Status::IB_CLOSED));
    }
}
