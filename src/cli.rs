//! CLI argument parsing

use clap::{Parser, Subcommand};
use smcctl_core::{SmcKey, MAX_DATA_LENGTH};

/// Parse a four-character SMC key name
fn parse_key(s: &str) -> Result<SmcKey, String> {
    SmcKey::try_from(s).map_err(|e| format!("Invalid key {:?}: {}", s, e))
}

/// Parse a byte as hex (0x prefix) or decimal
fn parse_byte(s: &str) -> Result<u8, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u8::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex byte: {}", e))
    } else {
        s.parse::<u8>().map_err(|e| format!("Invalid byte: {}", e))
    }
}

#[derive(Parser)]
#[command(name = "smcctl")]
#[command(author, version, about = "Apple SMC key access tool", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Backend to use: "ioport" for the real SMC, or "dummy[:KEY=value,...]"
    /// for the in-memory emulator
    #[arg(short, long, global = true, default_value = "ioport")]
    pub backend: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read a key and print its value
    Read {
        /// Key name (e.g. BCLM)
        #[arg(value_parser = parse_key)]
        key: SmcKey,

        /// Number of bytes to read
        #[arg(short, long, default_value_t = 1,
              value_parser = clap::value_parser!(u8).range(0..=MAX_DATA_LENGTH as i64))]
        len: u8,
    },

    /// Write bytes to a key
    Write {
        /// Key name (e.g. BCLM)
        #[arg(value_parser = parse_key)]
        key: SmcKey,

        /// Bytes to write (decimal or 0x-prefixed hex)
        #[arg(required = true, num_args = 1..=MAX_DATA_LENGTH, value_parser = parse_byte)]
        bytes: Vec<u8>,
    },

    /// Show or set the battery charge limit (BCLM/BFCL)
    ChargeLimit {
        /// Charge limit in percent to write to BCLM
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=100))]
        percent: Option<u8>,
    },

    /// List available backends
    ListBackends,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_byte() {
        assert_eq!(parse_byte("80"), Ok(80));
        assert_eq!(parse_byte("0x50"), Ok(0x50));
        assert_eq!(parse_byte("0XFF"), Ok(0xFF));
        assert!(parse_byte("256").is_err());
        assert!(parse_byte("0x100").is_err());
    }

    #[test]
    fn test_parse_charge_limit() {
        let cli = Cli::try_parse_from(["smcctl", "charge-limit", "-p", "80"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::ChargeLimit { percent: Some(80) }
        ));

        assert!(Cli::try_parse_from(["smcctl", "charge-limit", "-p", "0"]).is_err());
        assert!(Cli::try_parse_from(["smcctl", "charge-limit", "-p", "101"]).is_err());
    }

    #[test]
    fn test_parse_read_and_write() {
        let cli = Cli::try_parse_from(["smcctl", "-b", "dummy", "read", "BCLM", "-l", "2"]).unwrap();
        assert_eq!(cli.backend, "dummy");
        match cli.command {
            Commands::Read { key, len } => {
                assert_eq!(key.as_str(), "BCLM");
                assert_eq!(len, 2);
            }
            _ => panic!("expected read"),
        }

        let cli = Cli::try_parse_from(["smcctl", "write", "BFCL", "0x4B", "1"]).unwrap();
        match cli.command {
            Commands::Write { key, bytes } => {
                assert_eq!(key.as_str(), "BFCL");
                assert_eq!(bytes, [0x4B, 1]);
            }
            _ => panic!("expected write"),
        }

        assert!(Cli::try_parse_from(["smcctl", "read", "BCLMX"]).is_err());
        assert!(Cli::try_parse_from(["smcctl", "read", "BCLM", "-l", "33"]).is_err());
        assert!(Cli::try_parse_from(["smcctl", "write", "BCLM"]).is_err());
    }
}
