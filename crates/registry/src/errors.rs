//! Error types for the knowledge registry

use ikf_token::TokenError;
use ikf_types::{Address, FileStatus};
use thiserror::Error;

/// Every failure aborts the whole operation; no variant leaves partial state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("File already exists: {filename}")]
    AlreadyExists { filename: String },

    #[error("File not found: {filename}")]
    NotFound { filename: String },

    #[error("Unauthorized: {caller} {reason}")]
    Unauthorized { caller: Address, reason: String },

    #[error("Invalid state for {filename} ({status}): {reason}")]
    InvalidState {
        filename: String,
        status: FileStatus,
        reason: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Reward for {filename} failed: {source}")]
    RewardFailed {
        filename: String,
        #[source]
        source: TokenError,
    },

    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

/// Fieldless discriminant of [`RegistryError`], for callers that branch on
/// the kind of failure rather than its details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    AlreadyExists,
    NotFound,
    Unauthorized,
    InvalidState,
    InvalidInput,
    RewardFailed,
    Snapshot,
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegistryError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            RegistryError::NotFound { .. } => ErrorKind::NotFound,
            RegistryError::Unauthorized { .. } => ErrorKind::Unauthorized,
            RegistryError::InvalidState { .. } => ErrorKind::InvalidState,
            RegistryError::InvalidInput(_) => ErrorKind::InvalidInput,
            RegistryError::RewardFailed { .. } => ErrorKind::RewardFailed,
            RegistryError::Snapshot(_) => ErrorKind::Snapshot,
        }
    }

    pub(crate) fn not_found(filename: &str) -> Self {
        RegistryError::NotFound {
            filename: filename.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_reason() {
        let err = RegistryError::InvalidState {
            filename: "a.txt".into(),
            status: FileStatus::Approved,
            reason: "approved files are immutable".into(),
        };
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(
            err.to_string(),
            "Invalid state for a.txt (approved): approved files are immutable"
        );
    }

    #[test]
    fn reward_failure_exposes_source() {
        use std::error::Error as _;

        let err = RegistryError::RewardFailed {
            filename: "a.txt".into(),
            source: TokenError::ZeroRecipient,
        };
        assert_eq!(err.kind(), ErrorKind::RewardFailed);
        assert!(err.source().is_some());
    }
}
