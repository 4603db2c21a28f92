//! Port and time abstractions
//!
//! The protocol only ever needs byte-wide port I/O and a way to sleep. Real
//! hardware backends implement these with `in`/`out` instructions and
//! `std::thread::sleep`; tests and the emulator substitute deterministic
//! fakes.

/// Byte-wide access to I/O ports
///
/// No validation and no retry: each call is exactly one port access.
pub trait PortIo {
    /// Read one byte from `port`
    fn read_byte(&mut self, port: u16) -> u8;

    /// Write one byte to `port`
    fn write_byte(&mut self, port: u16, value: u8);
}

/// Source of delays between status samples
pub trait Clock {
    /// Sleep for at least `us` microseconds
    fn delay_us(&mut self, us: u32);
}

impl<T: PortIo + ?Sized> PortIo for &mut T {
    fn read_byte(&mut self, port: u16) -> u8 {
        (**self).read_byte(port)
    }

    fn write_byte(&mut self, port: u16, value: u8) {
        (**self).write_byte(port, value)
    }
}

impl<T: Clock + ?Sized> Clock for &mut T {
    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }
}

#[cfg(feature = "std")]
impl<T: PortIo + ?Sized> PortIo for std::boxed::Box<T> {
    fn read_byte(&mut self, port: u16) -> u8 {
        (**self).read_byte(port)
    }

    fn write_byte(&mut self, port: u16, value: u8) {
        (**self).write_byte(port, value)
    }
}

#[cfg(feature = "std")]
impl<T: Clock + ?Sized> Clock for std::boxed::Box<T> {
    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }
}
