//! Raw key read and write

use smcctl_core::{Clock, Controller, PortIo, SmcKey, MAX_DATA_LENGTH};

/// Format a key value the way `read` prints it
///
/// Single bytes are shown in decimal, longer values as hex bytes.
pub fn format_value(key: SmcKey, value: &[u8]) -> String {
    match value {
        [byte] => format!("{} = {}", key, byte),
        _ => {
            let hex: Vec<String> = value.iter().map(|b| format!("{:02x}", b)).collect();
            format!("{} = [{}]", key, hex.join(" "))
        }
    }
}

/// Read `len` bytes of `key` and print them
pub fn run_read<P: PortIo, C: Clock>(
    smc: &mut Controller<P, C>,
    key: SmcKey,
    len: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut buf = [0u8; MAX_DATA_LENGTH];
    let value = buf
        .get_mut(..len)
        .ok_or(smcctl_core::Error::InvalidLength(len))?;

    let report = smc.read_smc(smcctl_core::Command::Read, key, value)?;
    if !report.is_clean() {
        log::info!("{} holds more than {} bytes", key, len);
    }

    println!("{}", format_value(key, value));
    Ok(())
}

/// Write `bytes` to `key`
pub fn run_write<P: PortIo, C: Clock>(
    smc: &mut Controller<P, C>,
    key: SmcKey,
    bytes: &[u8],
) -> Result<(), Box<dyn std::error::Error>> {
    smc.write_key(key, bytes)?;
    log::info!("Wrote {} bytes to {}", bytes.len(), key);
    Ok(())
}

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use smcctl_dummy::{DummySmc, VirtualClock};

    fn key(s: &str) -> SmcKey {
        SmcKey::try_from(s).unwrap()
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(key("BCLM"), &[80]), "BCLM = 80");
        assert_eq!(format_value(key("FNum"), &[0x01, 0xab]), "FNum = [01 ab]");
        assert_eq!(format_value(key("FNum"), &[]), "FNum = []");
    }

    #[test]
    fn test_write_then_read() {
        let mut smc = Controller::new(DummySmc::new_default(), VirtualClock::default());

        run_write(&mut smc, key("ACID"), &[1, 2, 3]).unwrap();
        assert_eq!(smc.port().value(key("ACID")), Some(&[1u8, 2, 3][..]));

        run_read(&mut smc, key("ACID"), 3).unwrap();
        assert!(smc.port().is_idle());
    }

    #[test]
    fn test_read_short_drains() {
        let dummy = DummySmc::new_default().with_key(key("ACID"), &[9, 8, 7, 6]);
        let mut smc = Controller::new(dummy, VirtualClock::default());

        run_read(&mut smc, key("ACID"), 1).unwrap();
        assert!(smc.port().is_idle());
    }

    #[test]
    fn test_read_missing_key_fails() {
        let mut smc = Controller::new(DummySmc::new_default(), VirtualClock::default());
        let err = run_read(&mut smc, key("NONE"), 1).unwrap_err();
        assert!(err.to_string().contains("NONE"));
    }
}
