//! Moderation state machine.
//!
//! | From     | Action  | To       |
//! |----------|---------|----------|
//! | Pending  | Approve | Approved |
//! | Pending  | Reject  | Rejected |
//! | Pending  | Update  | Pending  |
//! | Rejected | Update  | Pending  |
//!
//! Everything else, and any action on an `Approved` file, is `InvalidState`.

use crate::errors::{RegistryError, Result};
use crate::types::RegistryStats;
use ikf_types::FileStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Approve,
    Reject,
    Update,
}

impl Action {
    fn describe(self) -> &'static str {
        match self {
            Action::Approve => "approve",
            Action::Reject => "reject",
            Action::Update => "update",
        }
    }
}

/// Target status for `action` applied to a file in `from`, if legal.
pub fn next_status(from: FileStatus, action: Action) -> Option<FileStatus> {
    match (from, action) {
        (FileStatus::Pending, Action::Approve) => Some(FileStatus::Approved),
        (FileStatus::Pending, Action::Reject) => Some(FileStatus::Rejected),
        (FileStatus::Pending, Action::Update) | (FileStatus::Rejected, Action::Update) => {
            Some(FileStatus::Pending)
        }
        _ => None,
    }
}

/// Like [`next_status`], with the failure mapped to `InvalidState`.
pub fn transition(filename: &str, from: FileStatus, action: Action) -> Result<FileStatus> {
    next_status(from, action).ok_or_else(|| {
        let reason = match (from, action) {
            (FileStatus::Approved, Action::Update) => "approved files cannot be updated".to_string(),
            _ => format!("cannot {} a file that is not pending", action.describe()),
        };
        RegistryError::InvalidState {
            filename: filename.to_string(),
            status: from,
            reason,
        }
    })
}

/// Counters after moving one file from `from` to `to`. Pure: the caller
/// commits the returned value only once every other step has succeeded.
pub fn move_between(stats: &RegistryStats, from: FileStatus, to: FileStatus) -> RegistryStats {
    let mut next = *stats;
    if from != to {
        let source = next.count_of_mut(from);
        *source = source.saturating_sub(1);
        *next.count_of_mut(to) += 1;
    }
    next
}

/// Counters after a new `Pending` file.
pub fn record_creation(stats: &RegistryStats) -> RegistryStats {
    let mut next = *stats;
    next.total_files += 1;
    next.total_pending_files += 1;
    next
}
