//! Types for the knowledge registry

use ikf_types::{Address, ContentHash, FileStatus, TokenAmount};
use serde::{Deserialize, Serialize};

/// A submitted file: metadata, content fingerprint and moderation status.
///
/// `filename`, `owner`, `created_at` and `category` never change after
/// creation. Once `status` is `Approved` nothing changes at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub filename: String,
    pub content_hash: ContentHash,
    pub size: u64,
    pub owner: Address,
    /// Creation timestamp (UNIX seconds)
    pub created_at: u64,
    /// Last content update (UNIX seconds)
    pub updated_at: u64,
    pub status: FileStatus,
    pub category: String,
    /// Opaque payload, typically serialized JSON
    pub metadata: String,
    /// Set while `Rejected`, cleared on resubmission
    pub rejection_reason: Option<String>,
}

/// The externally visible record tuple:
/// `(contentHash, size, owner, createdAt, status, category, metadata)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDetails {
    pub content_hash: ContentHash,
    pub size: u64,
    pub owner: Address,
    pub created_at: u64,
    pub status: FileStatus,
    pub category: String,
    pub metadata: String,
}

impl From<&FileRecord> for FileDetails {
    fn from(record: &FileRecord) -> Self {
        Self {
            content_hash: record.content_hash,
            size: record.size,
            owner: record.owner,
            created_at: record.created_at,
            status: record.status,
            category: record.category.clone(),
            metadata: record.metadata.clone(),
        }
    }
}

/// New submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSubmission {
    pub filename: String,
    pub content_hash: ContentHash,
    pub size: u64,
    pub category: String,
    pub metadata: String,
}

/// Owner revision of an existing submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRevision {
    pub filename: String,
    pub content_hash: ContentHash,
    pub size: u64,
    pub metadata: String,
}

/// Aggregate counters. `pending + approved + rejected == total` after every
/// completed operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    pub total_files: u64,
    pub total_pending_files: u64,
    pub total_approved_files: u64,
    pub total_rejected_files: u64,
    pub total_tokens_rewarded: TokenAmount,
}

impl RegistryStats {
    pub fn is_consistent(&self) -> bool {
        self.total_pending_files
            .checked_add(self.total_approved_files)
            .and_then(|sum| sum.checked_add(self.total_rejected_files))
            == Some(self.total_files)
    }

    pub fn count_of(&self, status: FileStatus) -> u64 {
        match status {
            FileStatus::Pending => self.total_pending_files,
            FileStatus::Approved => self.total_approved_files,
            FileStatus::Rejected => self.total_rejected_files,
        }
    }

    pub(crate) fn count_of_mut(&mut self, status: FileStatus) -> &mut u64 {
        match status {
            FileStatus::Pending => &mut self.total_pending_files,
            FileStatus::Approved => &mut self.total_approved_files,
            FileStatus::Rejected => &mut self.total_rejected_files,
        }
    }
}

/// Upper bounds on caller-supplied strings, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryLimits {
    pub max_filename_len: usize,
    pub max_category_len: usize,
    pub max_metadata_len: usize,
}

impl Default for RegistryLimits {
    fn default() -> Self {
        Self {
            max_filename_len: 256,
            max_category_len: 64,
            max_metadata_len: 64 * 1024,
        }
    }
}

/// Construction-time settings for a registry instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// The registry's own identity; used as the minter when rewarding.
    pub address: Address,
    /// Initial administrator, normally the deployer.
    pub admin: Address,
    #[serde(default)]
    pub limits: RegistryLimits,
}

impl RegistryConfig {
    pub fn new(address: Address, admin: Address) -> Self {
        Self {
            address,
            admin,
            limits: RegistryLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: RegistryLimits) -> Self {
        self.limits = limits;
        self
    }
}
