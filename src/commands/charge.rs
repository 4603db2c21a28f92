//! Battery charge limit (BCLM/BFCL)
//!
//! BCLM is the charge level the controller stops charging at. BFCL drives
//! the charge indicator LED and is kept a few percent below BCLM so the LED
//! turns green once charging stops.

use smcctl_core::{Clock, Controller, PortIo, SmcKey};

const fn key(name: [u8; 4]) -> SmcKey {
    match SmcKey::new(name) {
        Ok(k) => k,
        Err(_) => panic!("invalid key constant"),
    }
}

/// Battery charge limit
pub const BCLM: SmcKey = key(*b"BCLM");
/// Full charge LED threshold
pub const BFCL: SmcKey = key(*b"BFCL");

/// Distance between BCLM and BFCL in percent
const LED_OFFSET: u8 = 5;

/// BFCL value matching a BCLM of `percent`
pub fn led_threshold(percent: u8) -> u8 {
    percent.saturating_sub(LED_OFFSET)
}

/// Current (BCLM, BFCL) values
pub fn read_limits<P: PortIo, C: Clock>(
    smc: &mut Controller<P, C>,
) -> smcctl_core::Result<(u8, u8)> {
    let bclm = smc.read_key(BCLM, 1)?;
    let bfcl = smc.read_key(BFCL, 1)?;
    Ok((bclm[0], bfcl[0]))
}

/// Write BCLM and the matching BFCL
pub fn write_limit<P: PortIo, C: Clock>(
    smc: &mut Controller<P, C>,
    percent: u8,
) -> smcctl_core::Result<()> {
    let bfcl = led_threshold(percent);
    log::info!("Setting charge limit to {}% (LED at {}%)", percent, bfcl);
    smc.write_key(BCLM, &[percent])?;
    smc.write_key(BFCL, &[bfcl])
}

/// Optionally set the charge limit, then print both keys
pub fn run_charge_limit<P: PortIo, C: Clock>(
    smc: &mut Controller<P, C>,
    percent: Option<u8>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(percent) = percent {
        write_limit(smc, percent)?;
    }

    let (bclm, bfcl) = read_limits(smc)?;
    println!("{} = {}", BCLM, bclm);
    println!("{} = {}", BFCL, bfcl);
    Ok(())
}
