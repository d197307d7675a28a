//! Secondary indices by category and by owner.
//!
//! Both are append-only: a filename is pushed once, at creation, and never
//! removed when its status changes. Status filtering is done by scanning the
//! store instead (see [`crate::store::FileStore::filenames_with_status`]).

use crate::store::FileStore;
use ikf_types::Address;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct FileIndex {
    by_category: HashMap<String, Vec<String>>,
    by_owner: HashMap<Address, Vec<String>>,
}

impl FileIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from the store's creation order.
    pub fn rebuild(store: &FileStore) -> Self {
        let mut index = Self::new();
        for record in store.iter() {
            index.append(&record.filename, &record.category, &record.owner);
        }
        index
    }

    pub fn append(&mut self, filename: &str, category: &str, owner: &Address) {
        self.by_category
            .entry(category.to_string())
            .or_default()
            .push(filename.to_string());
        self.by_owner
            .entry(*owner)
            .or_default()
            .push(filename.to_string());
    }

    pub fn by_category(&self, category: &str) -> Vec<String> {
        self.by_category.get(category).cloned().unwrap_or_default()
    }

    pub fn by_owner(&self, owner: &Address) -> Vec<String> {
        self.by_owner.get(owner).cloned().unwrap_or_default()
    }

    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self.by_category.keys().cloned().collect();
        categories.sort();
        categories
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_in_insertion_order() {
        let alice = Address::from_label("alice");
        let bob = Address::from_label("bob");
        let mut index = FileIndex::new();
        index.append("b.txt", "doc", &alice);
        index.append("a.txt", "doc", &bob);
        index.append("c.png", "image", &alice);

        assert_eq!(index.by_category("doc"), vec!["b.txt", "a.txt"]);
        assert_eq!(index.by_owner(&alice), vec!["b.txt", "c.png"]);
        assert_eq!(index.categories(), vec!["doc", "image"]);
    }

    #[test]
    fn unknown_keys_are_empty() {
        let index = FileIndex::new();
        assert!(index.by_category("audio").is_empty());
        assert!(index.by_owner(&Address::ZERO).is_empty());
    }
}
