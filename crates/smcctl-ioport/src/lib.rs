//! smcctl-ioport - Hardware port backend for smcctl
//!
//! Gives [`smcctl_core`] access to the real SMC through the x86 `in`/`out`
//! instructions. Linux only lets a process use them after `ioperm` has
//! opened the range for it, which needs root.
//!
//! # Safety
//!
//! Raw port writes talk directly to the hardware. Only one process may drive
//! the SMC at a time; nothing here enforces that.

mod error;

pub use error::{IoPortError, Result};

use smcctl_core::consts::{DATA_PORT, PORT_RANGE};
use smcctl_core::{Clock, PortIo};

#[cfg(all(target_os = "linux", any(target_arch = "x86", target_arch = "x86_64")))]
mod raw {
    #[inline(always)]
    pub unsafe fn inb(port: u16) -> u8 {
        let value: u8;
        core::arch::asm!(
            "in al, dx",
            in("dx") port,
            out("al") value,
            options(nomem, nostack, preserves_flags)
        );
        value
    }

    #[inline(always)]
    pub unsafe fn outb(port: u16, value: u8) {
        core::arch::asm!(
            "out dx, al",
            in("dx") port,
            in("al") value,
            options(nomem, nostack, preserves_flags)
        );
    }
}

/// Claimed SMC port range
///
/// Created by [`IoPorts::open`]; the range is released again on drop.
#[derive(Debug)]
pub struct IoPorts {
    base: u16,
    count: u16,
}

#[cfg(all(target_os = "linux", any(target_arch = "x86", target_arch = "x86_64")))]
impl IoPorts {
    /// Claim the SMC ports (0x300..0x310)
    pub fn open() -> Result<Self> {
        Self::open_range(DATA_PORT, PORT_RANGE)
    }

    fn open_range(base: u16, count: u16) -> Result<Self> {
        if unsafe { libc::geteuid() } != 0 {
            return Err(IoPortError::NotRoot);
        }

        let ret = unsafe { libc::ioperm(base.into(), count.into(), 1) };
        if ret != 0 {
            return Err(IoPortError::PermissionDenied {
                base,
                count,
                source: std::io::Error::last_os_error(),
            });
        }

        log::debug!("Claimed I/O ports {:#x}..{:#x}", base, base + count);
        Ok(Self { base, count })
    }

    fn check(&self, port: u16) {
        debug_assert!(
            port >= self.base && port < self.base + self.count,
            "port {:#x} outside claimed range",
            port
        );
    }
}

#[cfg(all(target_os = "linux", any(target_arch = "x86", target_arch = "x86_64")))]
impl PortIo for IoPorts {
    fn read_byte(&mut self, port: u16) -> u8 {
        self.check(port);
        // Range opened with ioperm in open()
        unsafe { raw::inb(port) }
    }

    fn write_byte(&mut self, port: u16, value: u8) {
        self.check(port);
        unsafe { raw::outb(port, value) }
    }
}

#[cfg(all(target_os = "linux", any(target_arch = "x86", target_arch = "x86_64")))]
impl Drop for IoPorts {
    fn drop(&mut self) {
        let ret = unsafe { libc::ioperm(self.base.into(), self.count.into(), 0) };
        if ret != 0 {
            log::warn!(
                "Failed to release I/O ports {:#x}: {}",
                self.base,
                std::io::Error::last_os_error()
            );
        }
    }
}

// Stub for platforms without port I/O
#[cfg(not(all(target_os = "linux", any(target_arch = "x86", target_arch = "x86_64"))))]
impl IoPorts {
    pub fn open() -> Result<Self> {
        Err(IoPortError::Unsupported)
    }
}

#[cfg(not(all(target_os = "linux", any(target_arch = "x86", target_arch = "x86_64"))))]
impl PortIo for IoPorts {
    fn read_byte(&mut self, _port: u16) -> u8 {
        0xFF
    }

    fn write_byte(&mut self, _port: u16, _value: u8) {}
}

impl IoPorts {
    /// First claimed port
    pub fn base(&self) -> u16 {
        self.base
    }

    /// Number of claimed ports
    pub fn count(&self) -> u16 {
        self.count
    }
}

/// Clock backed by `std::thread::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct StdClock;

impl Clock for StdClock {
    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(std::time::Duration::from_micros(u64::from(us)));
    }
}
