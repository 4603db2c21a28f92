//! Backend registration and dispatch
//!
//! A backend string has the form `name[:key=value,...]`, e.g. `ioport` or
//! `dummy:BCLM=80,BFCL=75`.

use std::collections::HashMap;

use smcctl_core::{Clock, Controller, PortIo};
use thiserror::Error;

/// Controller over whichever backend was selected
pub type SmcHandle = Controller<Box<dyn PortIo>, Box<dyn Clock>>;

/// Information about a backend
pub struct BackendInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Parsed backend specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendParams {
    pub name: String,
    pub params: HashMap<String, String>,
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Invalid parameter format: '{0}' (expected key=value)")]
    InvalidParameter(String),

    #[error("Unknown backend: {0} (available: {names})", names = backend_names_short())]
    Unknown(String),

    #[error("Backend {0} does not take parameters")]
    UnexpectedParameters(&'static str),
}

/// Get information about all backends enabled at compile time
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_backends() -> Vec<BackendInfo> {
    let mut backends = Vec::new();

    #[cfg(feature = "ioport")]
    backends.push(BackendInfo {
        name: "ioport",
        aliases: &["internal", "hw"],
        description: "Real SMC through I/O ports 0x300/0x304 (root, Linux x86)",
    });

    #[cfg(feature = "dummy")]
    backends.push(BackendInfo {
        name: "dummy",
        aliases: &["emulator"],
        description: "In-memory SMC emulator (KEY=value,stuck=0|1,legacy=0|1)",
    });

    backends
}

/// Parse a backend string into name and parameters
pub fn parse_backend_params(s: &str) -> Result<BackendParams, BackendError> {
    let (name, opts_str) = s.split_once(':').unwrap_or((s, ""));

    let mut params = HashMap::new();
    if !opts_str.is_empty() {
        for opt in opts_str.split(',') {
            if let Some((key, value)) = opt.split_once('=') {
                params.insert(key.to_string(), value.to_string());
            } else {
                return Err(BackendError::InvalidParameter(opt.to_string()));
            }
        }
    }

    Ok(BackendParams {
        name: name.to_string(),
        params,
    })
}

fn resolve(name: &str) -> Option<&'static str> {
    available_backends()
        .into_iter()
        .find(|b| b.name == name || b.aliases.contains(&name))
        .map(|b| b.name)
}

/// Open the backend named by `spec` and wrap it in a controller
pub fn open_backend(spec: &str) -> Result<SmcHandle, Box<dyn std::error::Error>> {
    let params = parse_backend_params(spec)?;
    let name = resolve(&params.name).ok_or_else(|| BackendError::Unknown(params.name.clone()))?;

    log::debug!("Opening backend {} {:?}", name, params.params);

    match name {
        #[cfg(feature = "ioport")]
        "ioport" => {
            if !params.params.is_empty() {
                return Err(BackendError::UnexpectedParameters("ioport").into());
            }
            let ports: Box<dyn PortIo> = Box::new(smcctl_ioport::IoPorts::open()?);
            let clock: Box<dyn Clock> = Box::new(smcctl_ioport::StdClock);
            Ok(Controller::new(ports, clock))
        }
        #[cfg(feature = "dummy")]
        "dummy" => {
            let smc: Box<dyn PortIo> = Box::new(smcctl_dummy::from_params(&params.params)?);
            let clock: Box<dyn Clock> = Box::new(smcctl_dummy::VirtualClock::default());
            Ok(Controller::new(smc, clock))
        }
        _ => Err(BackendError::Unknown(params.name).into()),
    }
}

/// Backend names for help text
pub fn backend_names_short() -> String {
    let backends = available_backends();
    if backends.is_empty() {
        return "none (recompile with features)".to_string();
    }
    backends
        .iter()
        .map(|b| b.name)
        .collect::<Vec<_>>()
        .join(", ")
}
