//! Fixed-width digest and address types.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from parsing fixed-width hex values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HexParseError {
    /// The input was not valid hexadecimal.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// The decoded byte length did not match the type width.
    #[error("invalid length: got {got} bytes, want {want}")]
    InvalidLength { got: usize, want: usize },
}

macro_rules! fixed_bytes {
    ($name:ident, $len:expr, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// The all-zero value.
            pub const ZERO: $name = $name([0u8; $len]);

            /// Width in bytes.
            pub const LEN: usize = $len;

            /// Copy from a slice, checking the length.
            pub fn from_slice(data: &[u8]) -> Result<Self, HexParseError> {
                if data.len() != $len {
                    return Err(HexParseError::InvalidLength {
                        got: data.len(),
                        want: $len,
                    });
                }
                let mut out = [0u8; $len];
                out.copy_from_slice(data);
                Ok($name(out))
            }

            /// Borrow the raw bytes.
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Render as a `0x`-prefixed lowercase hex string.
            pub fn to_hex(&self) -> String {
                format!("0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl FromStr for $name {
            type Err = HexParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.strip_prefix("0x").unwrap_or(s);
                let bytes =
                    hex::decode(s).map_err(|e| HexParseError::InvalidHex(e.to_string()))?;
                Self::from_slice(&bytes)
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                $name(bytes)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(de::Error::custom)
            }
        }
    };
}

fixed_bytes!(Hash32, 32, "A 256-bit digest (block hash, state root, fuzzy hash).");
fixed_bytes!(Address, 20, "A 20-byte account address.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let h: Hash32 = "0x49ff31917cd16c593d376347f82f7ea67a7ded0d49ff31917cd16c593d376347"
            .parse()
            .unwrap();
        assert_eq!(h.to_hex().parse::<Hash32>().unwrap(), h);

        let a: Address = "0x49ff31917cd16c593d376347f82f7ea67a7ded0d".parse().unwrap();
        assert_eq!(a.to_hex(), "0x49ff31917cd16c593d376347f82f7ea67a7ded0d");
    }

    #[test]
    fn prefix_is_optional() {
        let with: Address = "0x6e2aeaa5d6bbd27656aa8c774005e71d9afc1b23".parse().unwrap();
        let without: Address = "6e2aeaa5d6bbd27656aa8c774005e71d9afc1b23".parse().unwrap();
        assert_eq!(with, without);
    }

    #[test]
    fn length_is_enforced() {
        let err = Address::from_slice(&[0u8; 19]).unwrap_err();
        assert_eq!(err, HexParseError::InvalidLength { got: 19, want: 20 });

        assert!("0xabcd".parse::<Hash32>().is_err());
        assert!("zz".repeat(16).parse::<Hash32>().is_err());
    }

    #[test]
    fn serde_uses_hex_strings() {
        let a: Address = "0x80960290c3e717ba425333219e2b4a64c9184422".parse().unwrap();
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, "\"0x80960290c3e717ba425333219e2b4a64c9184422\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
    }
}
