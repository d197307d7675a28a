//! Primary storage: filename → record.

use crate::errors::{RegistryError, Result};
use crate::types::FileRecord;
use ikf_types::FileStatus;
use std::collections::HashMap;

/// Records keyed by filename, plus the creation order used by scans.
#[derive(Debug, Clone, Default)]
pub struct FileStore {
    records: HashMap<String, FileRecord>,
    /// Every filename ever created, in creation order
    order: Vec<String>,
}

impl FileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.records.contains_key(filename)
    }

    /// Insert a new record. The key must be unused.
    pub fn insert(&mut self, record: FileRecord) -> Result<()> {
        if self.records.contains_key(&record.filename) {
            return Err(RegistryError::AlreadyExists {
                filename: record.filename,
            });
        }
        self.order.push(record.filename.clone());
        self.records.insert(record.filename.clone(), record);
        Ok(())
    }

    pub fn get(&self, filename: &str) -> Result<&FileRecord> {
        self.records
            .get(filename)
            .ok_or_else(|| RegistryError::not_found(filename))
    }

    pub(crate) fn get_mut(&mut self, filename: &str) -> Result<&mut FileRecord> {
        self.records
            .get_mut(filename)
            .ok_or_else(|| RegistryError::not_found(filename))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &FileRecord> + '_ {
        self.order.iter().filter_map(|name| self.records.get(name))
    }

    /// Full scan filtered on current status, in creation order.
    pub fn filenames_with_status(&self, status: FileStatus) -> Vec<String> {
        self.iter()
            .filter(|record| record.status == status)
            .map(|record| record.filename.clone())
            .collect()
    }
}
