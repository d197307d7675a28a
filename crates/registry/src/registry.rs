//! Knowledge registry implementation
//!
//! Contributors submit file records, the administrator approves or rejects
//! them, and approval mints a token reward to the file's owner.

use crate::access::{require_admin, require_owner};
use crate::errors::*;
use crate::events::{EventLog, EventRecord, RegistryEvent};
use crate::index::FileIndex;
use crate::store::FileStore;
use crate::types::*;
use crate::workflow::{self, Action};
use ikf_token::RewardIssuer;
use ikf_types::{now_secs, Address, FileStatus, TokenAmount};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Knowledge Registry
///
/// All state sits behind a single lock. Mutating calls hold the write lock
/// from validation through commit, including the reward mint, so no reader
/// ever observes a half-applied operation.
pub struct KnowledgeRegistry {
    state: RwLock<RegistryState>,
}

pub(crate) struct RegistryState {
    pub(crate) address: Address,
    pub(crate) admin: Address,
    pub(crate) limits: RegistryLimits,
    pub(crate) issuer: Arc<dyn RewardIssuer>,
    pub(crate) store: FileStore,
    pub(crate) index: FileIndex,
    pub(crate) stats: RegistryStats,
    pub(crate) events: EventLog,
}

impl KnowledgeRegistry {
    /// Create a registry administered by `config.admin` and rewarding
    /// through `issuer`.
    ///
    /// The registry must separately be authorized as a minter on the issuer;
    /// until then every approval fails with `RewardFailed`.
    pub fn new(config: RegistryConfig, issuer: Arc<dyn RewardIssuer>) -> Result<Self> {
        if config.address.is_zero() {
            return Err(RegistryError::InvalidInput(
                "registry address cannot be the null identity".to_string(),
            ));
        }
        if config.admin.is_zero() {
            return Err(RegistryError::InvalidInput(
                "admin cannot be the null identity".to_string(),
            ));
        }
        ensure_bindable(issuer.as_ref())?;

        info!(
            target: "registry",
            "Registry {} created, admin {}, reward issuer {}",
            config.address,
            config.admin,
            issuer.address()
        );

        Ok(Self::from_state(RegistryState {
            address: config.address,
            admin: config.admin,
            limits: config.limits,
            issuer,
            store: FileStore::new(),
            index: FileIndex::new(),
            stats: RegistryStats::default(),
            events: EventLog::new(),
        }))
    }

    pub(crate) fn from_state(state: RegistryState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    pub(crate) fn read_state(&self) -> parking_lot::RwLockReadGuard<'_, RegistryState> {
        self.state.read()
    }

    // ---------------------------------------------------------------------
    // File store
    // ---------------------------------------------------------------------

    /// Submit a new file as `caller`. The record starts `Pending`.
    pub fn create(&self, caller: &Address, submission: FileSubmission) -> Result<()> {
        let mut state = self.state.write();
        validate_submission(&submission, &state.limits)?;

        if state.store.contains(&submission.filename) {
            return Err(RegistryError::AlreadyExists {
                filename: submission.filename,
            });
        }

        let now = now_secs();
        let record = FileRecord {
            filename: submission.filename,
            content_hash: submission.content_hash,
            size: submission.size,
            owner: *caller,
            created_at: now,
            updated_at: now,
            status: FileStatus::Pending,
            category: submission.category,
            metadata: submission.metadata,
            rejection_reason: None,
        };
        let event = RegistryEvent::FileUploaded {
            filename: record.filename.clone(),
            owner: record.owner,
            category: record.category.clone(),
        };

        info!(
            target: "registry",
            "File {} uploaded by {} under {}", record.filename, record.owner, record.category
        );
        let (filename, category) = (record.filename.clone(), record.category.clone());
        state.store.insert(record)?;
        state.index.append(&filename, &category, caller);
        state.stats = workflow::record_creation(&state.stats);
        state.events.append(event, now);

        Ok(())
    }

    /// Fetch the full record.
    pub fn file(&self, filename: &str) -> Result<FileRecord> {
        self.state.read().store.get(filename).cloned()
    }

    /// Fetch the public record tuple.
    pub fn file_details(&self, filename: &str) -> Result<FileDetails> {
        let state = self.state.read();
        state.store.get(filename).map(FileDetails::from)
    }

    pub fn exists(&self, filename: &str) -> bool {
        self.state.read().store.contains(filename)
    }

    pub fn rejection_reason(&self, filename: &str) -> Result<Option<String>> {
        let state = self.state.read();
        Ok(state.store.get(filename)?.rejection_reason.clone())
    }

    /// Owner revision. Overwrites hash, size and metadata; a `Rejected`
    /// file goes back to `Pending` and its rejection reason is cleared.
    pub fn update(&self, caller: &Address, revision: FileRevision) -> Result<()> {
        let mut state = self.state.write();
        let limits = state.limits;

        let (from, to) = {
            let record = state.store.get(&revision.filename)?;
            // Approved files are frozen for everyone, so the state check comes first.
            let to = workflow::transition(&record.filename, record.status, Action::Update)?;
            require_owner(caller, record)?;
            (record.status, to)
        };
        check_len("metadata", &revision.metadata, limits.max_metadata_len)?;

        let now = now_secs();
        let stats = workflow::move_between(&state.stats, from, to);
        let record = state.store.get_mut(&revision.filename)?;
        record.content_hash = revision.content_hash;
        record.size = revision.size;
        record.metadata = revision.metadata;
        record.updated_at = now;
        record.status = to;
        if from == FileStatus::Rejected {
            record.rejection_reason = None;
        }
        let event = RegistryEvent::FileUpdated {
            filename: record.filename.clone(),
            content_hash: record.content_hash,
            size: record.size,
        };

        if from == FileStatus::Rejected {
            info!(target: "registry", "File {} resubmitted for review", revision.filename);
        } else {
            info!(target: "registry", "File {} updated", revision.filename);
        }
        state.stats = stats;
        state.events.append(event, now);

        Ok(())
    }

    // ---------------------------------------------------------------------
    // Workflow
    // ---------------------------------------------------------------------

    /// Approve a pending file and mint `reward` to its owner.
    ///
    /// The mint happens before anything is committed; if the issuer refuses,
    /// the file stays `Pending` and no counter or event changes.
    pub fn approve(&self, caller: &Address, filename: &str, reward: TokenAmount) -> Result<()> {
        let mut state = self.state.write();
        require_admin(caller, &state.admin)?;

        let (owner, to) = {
            let record = state.store.get(filename)?;
            let to = workflow::transition(filename, record.status, Action::Approve)?;
            (record.owner, to)
        };

        let mut stats = workflow::move_between(&state.stats, FileStatus::Pending, to);
        stats.total_tokens_rewarded = stats
            .total_tokens_rewarded
            .checked_add(reward)
            .ok_or_else(|| {
                RegistryError::InvalidInput(format!(
                    "reward {reward} would overflow total tokens rewarded"
                ))
            })?;

        if let Err(source) = state.issuer.mint(&state.address, &owner, reward) {
            warn!(
                target: "registry",
                "Approval of {} rolled back: reward mint failed: {}", filename, source
            );
            return Err(RegistryError::RewardFailed {
                filename: filename.to_string(),
                source,
            });
        }

        let now = now_secs();
        let record = state.store.get_mut(filename)?;
        record.status = to;
        state.stats = stats;
        state.events.append(
            RegistryEvent::FileApproved {
                filename: filename.to_string(),
                reward,
            },
            now,
        );

        info!(
            target: "registry",
            "File {} approved, {} rewarded to {}", filename, reward, owner
        );
        Ok(())
    }

    /// Reject a pending file, recording `reason`.
    pub fn reject(&self, caller: &Address, filename: &str, reason: &str) -> Result<()> {
        let mut state = self.state.write();
        require_admin(caller, &state.admin)?;

        let to = {
            let record = state.store.get(filename)?;
            workflow::transition(filename, record.status, Action::Reject)?
        };

        let now = now_secs();
        let stats = workflow::move_between(&state.stats, FileStatus::Pending, to);
        let record = state.store.get_mut(filename)?;
        record.status = to;
        record.rejection_reason = Some(reason.to_string());
        state.stats = stats;
        state.events.append(
            RegistryEvent::FileRejected {
                filename: filename.to_string(),
                reason: reason.to_string(),
            },
            now,
        );

        info!(target: "registry", "File {} rejected: {}", filename, reason);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Administration
    // ---------------------------------------------------------------------

    pub fn change_admin(&self, caller: &Address, new_admin: Address) -> Result<()> {
        let mut state = self.state.write();
        require_admin(caller, &state.admin)?;
        if new_admin.is_zero() {
            return Err(RegistryError::InvalidInput(
                "admin cannot be the null identity".to_string(),
            ));
        }

        let previous = state.admin;
        state.admin = new_admin;
        state.events.append(
            RegistryEvent::AdminChanged {
                previous,
                new_admin,
            },
            now_secs(),
        );

        info!(target: "registry", "Admin changed from {} to {}", previous, new_admin);
        Ok(())
    }

    /// Rebind the reward issuer. Emits no event.
    pub fn set_reward_issuer(&self, caller: &Address, issuer: Arc<dyn RewardIssuer>) -> Result<()> {
        let mut state = self.state.write();
        require_admin(caller, &state.admin)?;
        ensure_bindable(issuer.as_ref())?;

        info!(
            target: "registry",
            "Reward issuer changed from {} to {}",
            state.issuer.address(),
            issuer.address()
        );
        state.issuer = issuer;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Filenames ever created under `category`, in creation order.
    pub fn list_by_category(&self, category: &str) -> Vec<String> {
        self.state.read().index.by_category(category)
    }

    /// Filenames ever created by `owner`, in creation order.
    pub fn list_by_owner(&self, owner: &Address) -> Vec<String> {
        self.state.read().index.by_owner(owner)
    }

    /// Filenames whose current status is `status`, in creation order.
    ///
    /// Computed by a full scan of the store: O(total files).
    pub fn list_by_status(&self, status: FileStatus) -> Vec<String> {
        let state = self.state.read();
        let matches = state.store.filenames_with_status(status);
        debug!(
            target: "registry",
            "Status scan for {} matched {} of {} files",
            status,
            matches.len(),
            state.store.len()
        );
        matches
    }

    pub fn categories(&self) -> Vec<String> {
        self.state.read().index.categories()
    }

    pub fn count(&self) -> u64 {
        self.state.read().stats.total_files
    }

    pub fn stats(&self) -> RegistryStats {
        self.state.read().stats
    }

    pub fn admin(&self) -> Address {
        self.state.read().admin
    }

    /// The registry's own identity.
    pub fn address(&self) -> Address {
        self.state.read().address
    }

    pub fn limits(&self) -> RegistryLimits {
        self.state.read().limits
    }

    /// Address of the bound reward issuer.
    pub fn reward_issuer(&self) -> Address {
        self.state.read().issuer.address()
    }

    /// Reward balance of `account` on the bound issuer.
    pub fn balance_of(&self, account: &Address) -> TokenAmount {
        self.state.read().issuer.balance_of(account)
    }

    pub fn events(&self) -> Vec<EventRecord> {
        self.state.read().events.records().to_vec()
    }

    /// Events with `seq >= from`.
    pub fn events_since(&self, from: u64) -> Vec<EventRecord> {
        self.state.read().events.since(from).to_vec()
    }
}

fn ensure_bindable(issuer: &dyn RewardIssuer) -> Result<()> {
    if issuer.address().is_zero() {
        return Err(RegistryError::InvalidInput(
            "reward issuer cannot be the null identity".to_string(),
        ));
    }
    Ok(())
}

fn validate_submission(submission: &FileSubmission, limits: &RegistryLimits) -> Result<()> {
    if submission.filename.is_empty() {
        return Err(RegistryError::InvalidInput(
            "filename cannot be empty".to_string(),
        ));
    }
    if submission.size == 0 {
        return Err(RegistryError::InvalidInput(
            "file size must be positive".to_string(),
        ));
    }
    if submission.category.is_empty() {
        return Err(RegistryError::InvalidInput(
            "category cannot be empty".to_string(),
        ));
    }
    check_len("filename", &submission.filename, limits.max_filename_len)?;
    check_len("category", &submission.category, limits.max_category_len)?;
    check_len("metadata", &submission.metadata, limits.max_metadata_len)?;
    Ok(())
}

fn check_len(field: &str, value: &str, max: usize) -> Result<()> {
    if value.len() > max {
        return Err(RegistryError::InvalidInput(format!(
            "{field} is {} bytes, limit is {max}",
            value.len()
        )));
    }
    Ok(())
}
