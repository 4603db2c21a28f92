//! Four-character SMC key names

use core::fmt;
use core::str::FromStr;

/// Why a key name was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyError {
    /// Key names are exactly four bytes
    Length(usize),
    /// Byte at `index` is not printable ASCII
    NotAscii {
        /// Position of the offending byte
        index: usize,
        /// The offending byte
        byte: u8,
    },
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length(len) => write!(f, "key must be 4 bytes long, got {}", len),
            Self::NotAscii { index, byte } => {
                write!(
                    f,
                    "key byte {} (0x{:02X}) is not printable ASCII",
                    index, byte
                )
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for KeyError {}

/// An SMC key such as `BCLM` or `#KEY`
///
/// Always exactly four printable ASCII bytes, which is what goes on the wire.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SmcKey([u8; 4]);

impl SmcKey {
    /// Validate four raw bytes as a key
    pub const fn new(bytes: [u8; 4]) -> Result<Self, KeyError> {
        let mut i = 0;
        while i < 4 {
            let b = bytes[i];
            if b < 0x20 || b > 0x7E {
                return Err(KeyError::NotAscii { index: i, byte: b });
            }
            i += 1;
        }
        Ok(Self(bytes))
    }

    /// The four key bytes in transmission order
    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// The key as text
    pub fn as_str(&self) -> &str {
        // Validated as ASCII on construction
        core::str::from_utf8(&self.0).unwrap_or("????")
    }
}

impl TryFrom<&[u8]> for SmcKey {
    type Error = KeyError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; 4] = bytes
            .try_into()
            .map_err(|_| KeyError::Length(bytes.len()))?;
        Self::new(bytes)
    }
}

impl TryFrom<&str> for SmcKey {
    type Error = KeyError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::try_from(s.as_bytes())
    }
}

impl TryFrom<[u8; 4]> for SmcKey {
    type Error = KeyError;

    fn try_from(bytes: [u8; 4]) -> Result<Self, Self::Error> {
        Self::new(bytes)
    }
}

impl FromStr for SmcKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

impl fmt::Display for SmcKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for SmcKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SmcKey({:?})", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_keys() {
        let key: SmcKey = "BCLM".parse().unwrap();
        assert_eq!(key.as_bytes(), b"BCLM");
        assert_eq!(key.as_str(), "BCLM");

        // Leading '#' and embedded spaces occur in real key names
        assert!(SmcKey::try_from("#KEY").is_ok());
        assert!(SmcKey::try_from("MSL ").is_ok());
    }

    #[test]
    fn test_reject_wrong_length() {
        assert_eq!(SmcKey::try_from("BCL"), Err(KeyError::Length(3)));
        assert_eq!(SmcKey::try_from("BCLMX"), Err(KeyError::Length(5)));
        assert_eq!(SmcKey::try_from(""), Err(KeyError::Length(0)));
        // A C-style trailing NUL is not silently dropped
        assert_eq!(SmcKey::try_from(&b"BCLM\0"[..]), Err(KeyError::Length(5)));
    }

    #[test]
    fn test_reject_non_ascii() {
        assert_eq!(
            SmcKey::new([b'B', 0, b'L', b'M']),
            Err(KeyError::NotAscii { index: 1, byte: 0 })
        );
        assert_eq!(
            SmcKey::try_from("BCLé"),
            Err(KeyError::Length(5))
        );
        assert_eq!(
            SmcKey::new([b'B', b'C', b'L', 0x80]),
            Err(KeyError::NotAscii {
                index: 3,
                byte: 0x80
            })
        );
    }

    #[test]
    fn test_display() {
        let key = SmcKey::try_from("BFCL").unwrap();
        assert_eq!(std::format!("{}", key), "BFCL");
        assert_eq!(std::format!("{:?}", key), "SmcKey(\"BFCL\")");
    }
}
