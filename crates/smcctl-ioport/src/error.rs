//! Error types for port access setup

use thiserror::Error;

/// Errors claiming the SMC port range
#[derive(Debug, Error)]
pub enum IoPortError {
    /// Port permissions need an effective uid of 0
    #[error("You must be root to access the SMC ports")]
    NotRoot,

    /// ioperm refused the range
    #[error("ioperm({base:#x}, {count:#x}) failed: {source}")]
    PermissionDenied {
        base: u16,
        count: u16,
        #[source]
        source: std::io::Error,
    },

    /// No port I/O on this platform
    #[error("Port I/O is only supported on Linux x86/x86_64")]
    Unsupported,
}

/// Result type for port setup
pub type Result<T> = std::result::Result<T, IoPortError>;
