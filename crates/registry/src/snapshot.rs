//! Serializable registry image.
//!
//! Indices are not stored: they are rebuilt from the records on restore.

use crate::errors::{RegistryError, Result};
use crate::events::{EventLog, EventRecord};
use crate::index::FileIndex;
use crate::registry::{KnowledgeRegistry, RegistryState};
use crate::store::FileStore;
use crate::types::{FileRecord, RegistryLimits, RegistryStats};
use ikf_token::RewardIssuer;
use ikf_types::{Address, FileStatus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub address: Address,
    pub admin: Address,
    pub reward_issuer: Address,
    #[serde(default)]
    pub limits: RegistryLimits,
    /// Records in creation order
    pub files: Vec<FileRecord>,
    pub stats: RegistryStats,
    #[serde(default)]
    pub events: Vec<EventRecord>,
}

impl KnowledgeRegistry {
    pub fn snapshot(&self) -> RegistrySnapshot {
        let state = self.read_state();
        RegistrySnapshot {
            address: state.address,
            admin: state.admin,
            reward_issuer: state.issuer.address(),
            limits: state.limits,
            files: state.store.iter().cloned().collect(),
            stats: state.stats,
            events: state.events.records().to_vec(),
        }
    }

    /// Rebuild a registry from `snapshot`, bound to `issuer`.
    ///
    /// `issuer` must be the issuer the snapshot was bound to, and the
    /// counters must agree with the record statuses.
    pub fn restore(snapshot: RegistrySnapshot, issuer: Arc<dyn RewardIssuer>) -> Result<Self> {
        if snapshot.address.is_zero() || snapshot.admin.is_zero() {
            return Err(RegistryError::Snapshot(
                "registry address and admin must be non-null".to_string(),
            ));
        }
        if issuer.address() != snapshot.reward_issuer {
            return Err(RegistryError::Snapshot(format!(
                "snapshot is bound to issuer {}, got {}",
                snapshot.reward_issuer,
                issuer.address()
            )));
        }
        if !snapshot.stats.is_consistent() {
            return Err(RegistryError::Snapshot(
                "status counters do not sum to total files".to_string(),
            ));
        }

        let mut store = FileStore::new();
        for record in snapshot.files {
            if record.status != FileStatus::Rejected && record.rejection_reason.is_some() {
                return Err(RegistryError::Snapshot(format!(
                    "{} carries a rejection reason while {}",
                    record.filename, record.status
                )));
            }
            store.insert(record).map_err(|e| RegistryError::Snapshot(e.to_string()))?;
        }

        let stats = snapshot.stats;
        if stats.total_files != store.len() as u64 {
            return Err(RegistryError::Snapshot(format!(
                "total files is {} but snapshot holds {} records",
                stats.total_files,
                store.len()
            )));
        }
        for status in FileStatus::ALL {
            let actual = store.filenames_with_status(status).len() as u64;
            if actual != stats.count_of(status) {
                return Err(RegistryError::Snapshot(format!(
                    "{} counter is {} but {} records are {}",
                    status,
                    stats.count_of(status),
                    actual,
                    status
                )));
            }
        }

        let events = EventLog::from_records(snapshot.events).ok_or_else(|| {
            RegistryError::Snapshot("event sequence numbers are not contiguous".to_string())
        })?;
        let index = FileIndex::rebuild(&store);

        info!(
            target: "registry",
            "Registry {} restored with {} files and {} events",
            snapshot.address,
            store.len(),
            events.len()
        );

        Ok(KnowledgeRegistry::from_state(RegistryState {
            address: snapshot.address,
            admin: snapshot.admin,
            limits: snapshot.limits,
            issuer,
            store,
            index,
            stats,
            events,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::types::{FileSubmission, RegistryConfig};
    use ikf_token::MockRewardIssuer;
    use ikf_types::ContentHash;

    fn populated() -> (KnowledgeRegistry, Arc<MockRewardIssuer>, Address) {
        let admin = Address::from_label("admin");
        let issuer = Arc::new(MockRewardIssuer::new(Address::from_label("token")));
        let registry = KnowledgeRegistry::new(
            RegistryConfig::new(Address::from_label("registry"), admin),
            issuer.clone(),
        )
        .unwrap();
        let users = [Address::from_label("u1"), Address::from_label("u2")];
        for (i, category) in ["doc", "image", "audio"].iter().enumerate() {
            for (j, user) in users.iter().enumerate() {
                let name = format!("file{i}_{j}.txt");
                registry
                    .create(
                        user,
                        FileSubmission {
                            filename: name.clone(),
                            content_hash: ContentHash::of(name.as_bytes()),
                            size: 100 * (i as u64 + 1),
                            category: category.to_string(),
                            metadata: "{}".into(),
                        },
                    )
                    .unwrap();
            }
        }
        registry.approve(&admin, "file0_0.txt", 5).unwrap();
        registry.reject(&admin, "file2_0.txt", "bad format").unwrap();
        (registry, issuer, admin)
    }

    #[test]
    fn restore_rebuilds_indices() {
        let (registry, issuer, admin) = populated();
        let json = serde_json::to_string(&registry.snapshot()).unwrap();
        let restored =
            KnowledgeRegistry::restore(serde_json::from_str(&json).unwrap(), issuer).unwrap();

        assert_eq!(restored.admin(), admin);
        assert_eq!(restored.stats(), registry.stats());
        assert_eq!(restored.list_by_category("doc"), registry.list_by_category("doc"));
        assert_eq!(
            restored.list_by_owner(&Address::from_label("u1")),
            vec!["file0_0.txt", "file1_0.txt", "file2_0.txt"]
        );
        assert_eq!(
            restored.rejection_reason("file2_0.txt").unwrap().as_deref(),
            Some("bad format")
        );
        assert_eq!(restored.events(), registry.events());
    }

    #[test]
    fn large_rewards_survive_json() {
        let (registry, issuer, admin) = populated();
        let reward = 10u128.pow(24);
        registry.approve(&admin, "file1_0.txt", reward).unwrap();

        let json = serde_json::to_string_pretty(&registry.snapshot()).unwrap();
        let restored =
            KnowledgeRegistry::restore(serde_json::from_str(&json).unwrap(), issuer).unwrap();

        assert_eq!(restored.stats().total_tokens_rewarded, reward + 5);
        assert_eq!(restored.events(), registry.events());
        assert_eq!(restored.snapshot(), registry.snapshot());
    }

    #[test]
    fn restore_rejects_wrong_issuer() {
        let (registry, _, _) = populated();
        let other = Arc::new(MockRewardIssuer::new(Address::from_label("other")));
        let err = KnowledgeRegistry::restore(registry.snapshot(), other).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Snapshot);
    }

    #[test]
    fn restore_rejects_counter_mismatch() {
        let (registry, issuer, _) = populated();
        let mut snapshot = registry.snapshot();
        snapshot.stats.total_pending_files += 1;
        snapshot.stats.total_approved_files -= 1;
        assert!(KnowledgeRegistry::restore(snapshot, issuer).is_err());
    }

    #[test]
    fn restore_rejects_duplicate_filenames() {
        let (registry, issuer, _) = populated();
        let mut snapshot = registry.snapshot();
        let first = snapshot.files[0].clone();
        snapshot.files.push(first);
        snapshot.stats.total_files += 1;
        snapshot.stats.total_approved_files += 1;
        let err = KnowledgeRegistry::restore(snapshot, issuer).err().unwrap();
        assert!(err.to_string().contains("already exists"));
    }
}
