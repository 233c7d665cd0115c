use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::NuggetError;

/// Native value and reward-token amounts, in 18-decimal base units.
pub type Wei = u128;

/// Unix timestamp (seconds, UTC).
pub type Timestamp = i64;

/// Collectible token identifier. Valid ids live in `[1, max_supply]`.
pub type TokenId = u64;

// ── Address ──────────────────────────────────────────────────────────────────

/// 20-byte account or contract address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The null address. Never a valid owner, wallet or depositor.
    pub const ZERO: Address = Address([0u8; 20]);

    pub fn from_bytes(b: [u8; 20]) -> Self {
        Self(b)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse a hex address, with or without the `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, NuggetError> {
        let bytes = decode_fixed::<20>(s)?;
        Ok(Self(bytes))
    }
}

impl FromStr for Address {
    type Err = NuggetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({}…)", &self.to_hex()[..10])
    }
}

// ── Hash32 ───────────────────────────────────────────────────────────────────

/// 32-byte Keccak-256 output: Merkle roots, leaves and proof elements.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Hash32(pub [u8; 32]);

impl Hash32 {
    pub const ZERO: Hash32 = Hash32([0u8; 32]);

    pub fn from_bytes(b: [u8; 32]) -> Self {
        Self(b)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn from_hex(s: &str) -> Result<Self, NuggetError> {
        let bytes = decode_fixed::<32>(s)?;
        Ok(Self(bytes))
    }
}

impl FromStr for Hash32 {
    type Err = NuggetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash32({}…)", &self.to_hex()[..18])
    }
}

fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], NuggetError> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(stripped).map_err(|e| NuggetError::InvalidHex(e.to_string()))?;
    if bytes.len() != N {
        return Err(NuggetError::InvalidHex(format!(
            "expected {N} bytes, got {}",
            bytes.len()
        )));
    }
    let mut arr = [0u8; N];
    arr.copy_from_slice(&bytes);
    Ok(arr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_hex_round_trip_accepts_mixed_case() {
        let a = Address::from_hex("0x1DD85Fc6D1ea476c9Fd74e2f2346a1A69677F1D6").unwrap();
        assert_eq!(a.to_hex(), "0x1dd85fc6d1ea476c9fd74e2f2346a1a69677f1d6");
        assert_eq!(Address::from_hex(&a.to_hex()[2..]).unwrap(), a);
    }

    #[test]
    fn wrong_length_rejected() {
        assert!(matches!(Address::from_hex("0x1234"), Err(NuggetError::InvalidHex(_))));
        assert!(matches!(Hash32::from_hex("zz"), Err(NuggetError::InvalidHex(_))));
    }

    #[test]
    fn zero_address_is_zero() {
        assert!(Address::ZERO.is_zero());
        assert_eq!(Address::ZERO.to_hex(), format!("0x{}", "0".repeat(40)));
    }
}
