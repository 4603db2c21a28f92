//! Building an emulator from `key=value` backend parameters

use std::collections::HashMap;

use smcctl_core::{KeyError, SmcKey};
use thiserror::Error;

use crate::{DummyConfig, DummySmc};

/// Errors in dummy backend parameters
#[derive(Debug, Error)]
pub enum DummyError {
    /// A four-character parameter name that is not a valid key
    #[error("Invalid key {name:?}: {source}")]
    InvalidKey {
        name: String,
        #[source]
        source: KeyError,
    },

    /// Key value is not a byte or a hex byte string
    #[error("Invalid value {value:?} for key {key} (use 0-255 or 0x<hex bytes>)")]
    InvalidValue { key: String, value: String },

    /// Flag parameter that is not 0/1
    #[error("Invalid value {value:?} for {name} (use 0 or 1)")]
    InvalidFlag { name: String, value: String },

    /// Parameter that is neither an option nor a key
    #[error("Unknown dummy parameter: {0}")]
    UnknownParameter(String),
}

fn parse_flag(name: &str, value: &str) -> Result<bool, DummyError> {
    match value {
        "1" | "yes" | "true" => Ok(true),
        "0" | "no" | "false" => Ok(false),
        _ => Err(DummyError::InvalidFlag {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Parse a key value: a decimal byte, or `0x` followed by whole hex bytes
fn parse_value(key: &str, value: &str) -> Result<Vec<u8>, DummyError> {
    let invalid = || DummyError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    };

    if let Some(hex) = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        // ASCII hex digits only, the slicing below is by byte offset
        if hex.is_empty() || hex.len() % 2 != 0 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        return (0..hex.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid()))
            .collect();
    }

    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    value.parse::<u8>().map(|b| vec![b]).map_err(|_| invalid())
}

/// Build an emulator from backend parameters
///
/// Supported parameters:
/// - `stuck=0|1` - start busy
/// - `legacy=0|1` - honour the length byte like pre-2012 controllers
/// - `<KEY>=<value>` - seed a four-character key, e.g. `BCLM=80` or
///   `F0Mx=0x1770`
pub fn from_params(params: &HashMap<String, String>) -> Result<DummySmc, DummyError> {
    let mut config = DummyConfig::default();
    let mut keys = Vec::new();

    for (name, value) in params {
        match name.as_str() {
            "stuck" => config.start_stuck = parse_flag(name, value)?,
            "legacy" => config.honour_length = parse_flag(name, value)?,
            _ if name.len() == 4 => {
                let key = SmcKey::try_from(name.as_str()).map_err(|source| {
                    DummyError::InvalidKey {
                        name: name.clone(),
                        source,
                    }
                })?;
                keys.push((key, parse_value(name, value)?));
            }
            _ => return Err(DummyError::UnknownParameter(name.clone())),
        }
    }

    let mut smc = DummySmc::new(config);
    for (key, value) in keys {
        log::debug!("dummy SMC: seeding {} = {:02X?}", key, value);
        smc.set_key(key, &value);
    }
    Ok(smc)
}
