//! Content fingerprints.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;

/// Errors that can occur when parsing a content hash string.
#[derive(Debug, thiserror::Error)]
pub enum ContentHashError {
    #[error("content hash must be 64 hex characters, got {0}")]
    InvalidLength(usize),
    #[error("content hash is not valid hexadecimal")]
    InvalidHex(#[from] hex::FromHexError),
}

/// Fixed-size fingerprint of a file's contents (Keccak-256).
///
/// The registry treats this as opaque bytes; only the upload tooling
/// computes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    /// Keccak-256 of the given data.
    pub fn of(data: &[u8]) -> Self {
        Self(Keccak256::digest(data).into())
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse from hex, with or without the `0x` prefix.
    pub fn from_hex(value: &str) -> Result<Self, ContentHashError> {
        let payload = value
            .strip_prefix("0x")
            .or_else(|| value.strip_prefix("0X"))
            .unwrap_or(value);
        if payload.len() != 64 {
            return Err(ContentHashError::InvalidLength(payload.len()));
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(payload, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ContentHash {
    type Err = ContentHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for ContentHash {
    type Error = ContentHashError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<ContentHash> for String {
    fn from(hash: ContentHash) -> Self {
        hash.to_hex()
    }
}
