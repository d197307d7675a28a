use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Errors that can occur when parsing an address string.
#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    #[error("address must be {expected} hex characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("address payload is not valid hexadecimal")]
    InvalidHex(#[from] hex::FromHexError),
}

/// Number of raw bytes contained in an address.
pub const ADDRESS_BYTES: usize = 32;
/// Number of hex characters in an encoded address, without the `0x` prefix.
pub const ADDRESS_HEX_LENGTH: usize = ADDRESS_BYTES * 2;

/// Identity of a principal: a submitter, the administrator, the registry
/// itself or the reward token.
///
/// Encoded as `0x` followed by 64 lowercase hex characters. The all-zero
/// address is the null identity and is never a valid admin or issuer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub [u8; ADDRESS_BYTES]);

impl Address {
    /// The null identity.
    pub const ZERO: Address = Address([0u8; ADDRESS_BYTES]);

    /// Create from raw bytes.
    pub fn new(bytes: [u8; ADDRESS_BYTES]) -> Self {
        Self(bytes)
    }

    /// Derive a deterministic identity from a human label (BLAKE3 of the label).
    pub fn from_label(label: &str) -> Self {
        Self(*blake3::hash(label.as_bytes()).as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_BYTES] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_BYTES]
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse a hex address, with or without the `0x` prefix.
    pub fn from_hex(value: &str) -> Result<Self, AddressError> {
        let payload = value
            .strip_prefix("0x")
            .or_else(|| value.strip_prefix("0X"))
            .unwrap_or(value);
        if payload.len() != ADDRESS_HEX_LENGTH {
            return Err(AddressError::InvalidLength {
                expected: ADDRESS_HEX_LENGTH,
                actual: payload.len(),
            });
        }
        let mut bytes = [0u8; ADDRESS_BYTES];
        hex::decode_to_slice(payload, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; ADDRESS_BYTES]> for Address {
    fn from(value: [u8; ADDRESS_BYTES]) -> Self {
        Address(value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.to_hex()
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip_with_and_without_prefix() {
        let addr = Address::new([0xABu8; ADDRESS_BYTES]);
        let encoded = addr.to_hex();
        assert!(encoded.starts_with("0x"));
        assert_eq!(encoded.len(), ADDRESS_HEX_LENGTH + 2);

        assert_eq!(Address::from_hex(&encoded).unwrap(), addr);
        assert_eq!(Address::from_hex(&encoded[2..]).unwrap(), addr);
    }

    #[test]
    fn invalid_length_rejected() {
        let err = Address::from_hex("0x1234").unwrap_err();
        assert!(matches!(err, AddressError::InvalidLength { actual: 4, .. }));
    }

    #[test]
    fn invalid_hex_rejected() {
        let err = Address::from_hex(&"gg".repeat(ADDRESS_BYTES)).unwrap_err();
        assert!(matches!(err, AddressError::InvalidHex(_)));
    }

    #[test]
    fn labels_are_deterministic_and_distinct() {
        assert_eq!(Address::from_label("alice"), Address::from_label("alice"));
        assert_ne!(Address::from_label("alice"), Address::from_label("bob"));
        assert!(!Address::from_label("alice").is_zero());
        assert!(Address::ZERO.is_zero());
    }

    #[test]
    fn serializes_as_hex_string() {
        let addr = Address::from_label("carol");
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", addr.to_hex()));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
