//! In-memory store
//!
//! Used by tests and by `--memory` runs that should leave no database behind.

use crate::model::CompanyRecord;
use crate::storage::traits::{CompanyStore, StorageError, StorageResult};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Inner {
    /// Keys known to exist without a stored record (pre-seeded)
    seeded: HashSet<String>,
    records: HashMap<String, CompanyRecord>,
    /// Insertion order of `records`
    order: Vec<String>,
}

/// Mutex-guarded map of company records
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already knows the given dedup keys
    pub fn with_existing<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let store = Self::new();
        if let Ok(mut inner) = store.inner.lock() {
            inner.seeded.extend(keys.into_iter().map(Into::into));
        }
        store
    }

    /// Number of records inserted through [`CompanyStore::insert`]
    pub fn len(&self) -> usize {
        self.lock().map(|inner| inner.records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records in insertion order
    pub fn records(&self) -> Vec<CompanyRecord> {
        self.lock()
            .map(|inner| {
                inner
                    .order
                    .iter()
                    .filter_map(|key| inner.records.get(key).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<CompanyRecord> {
        self.lock().ok()?.records.get(key).cloned()
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))
    }
}

impl CompanyStore for MemoryStore {
    fn exists_by_url(&self, url: &str) -> StorageResult<bool> {
        let inner = self.lock()?;
        Ok(inner.seeded.contains(url) || inner.records.contains_key(url))
    }

    fn insert(&self, record: &CompanyRecord) -> StorageResult<bool> {
        let mut inner = self.lock()?;
        let key = record.dedup_key.clone();

        if inner.seeded.contains(&key) || inner.records.contains_key(&key) {
            return Ok(false);
        }

        inner.order.push(key.clone());
        inner.records.insert(key, record.clone());
        Ok(true)
    }
}
