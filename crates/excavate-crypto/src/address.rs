//! Opaque base58 account addresses

use std::fmt;
use std::str::FromStr;

use excavate_core::{ExcavateError, ExcavateResult};

/// A 32-byte on-chain account address, displayed as base58.
///
/// Passed through to the mint layer untouched.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 32]);

impl Address {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Address(bytes)
    }

    pub fn to_bytes(self) -> [u8; 32] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Decode a base58 address
    pub fn parse(s: &str) -> ExcavateResult<Self> {
        let decoded = bs58::decode(s.trim())
            .into_vec()
            .map_err(|e| ExcavateError::InvalidAddress(format!("{s}: {e}")))?;

        let bytes: [u8; 32] = decoded.as_slice().try_into().map_err(|_| {
            ExcavateError::InvalidAddress(format!("{s}: expected 32 bytes, got {}", decoded.len()))
        })?;

        Ok(Address(bytes))
    }
}

impl FromStr for Address {
    type Err = ExcavateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}
