//! Duplicate detection against the store plus a per-run claim set

use crate::storage::{CompanyStore, StorageResult};
use crate::url::dedup_key;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Decides whether a candidate has already been ingested
///
/// One instance lives for one run. The store answers "ingested before", the
/// claim set answers "already taken by another task of this run".
pub struct Deduplicator {
    store: Arc<dyn CompanyStore>,
    canonicalize: bool,
    claimed: Mutex<HashSet<String>>,
}

impl Deduplicator {
    pub fn new(store: Arc<dyn CompanyStore>, canonicalize: bool) -> Self {
        Self {
            store,
            canonicalize,
            claimed: Mutex::new(HashSet::new()),
        }
    }

    /// The dedup key for a candidate URL
    pub fn key(&self, url: &str) -> String {
        dedup_key(url, self.canonicalize)
    }

    pub fn store(&self) -> &Arc<dyn CompanyStore> {
        &self.store
    }

    /// Returns true if the store already holds a record for this URL
    pub fn is_duplicate(&self, url: &str) -> StorageResult<bool> {
        self.store.exists_by_url(&self.key(url))
    }

    /// Claims the URL's key for the calling task
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The key is new; the caller owns it for this run
    /// * `Ok(false)` - The store has it, or another task already claimed it
    /// * `Err(StorageError)` - The store lookup failed; nothing was claimed
    pub fn claim(&self, url: &str) -> StorageResult<bool> {
        let key = self.key(url);

        if self.store.exists_by_url(&key)? {
            return Ok(false);
        }

        let mut claimed = self.claimed.lock().unwrap_or_else(|e| e.into_inner());
        Ok(claimed.insert(key))
    }

    /// Gives a claim back after the record could not be stored
    pub fn release(&self, url: &str) {
        let key = self.key(url);
        let mut claimed = self.claimed.lock().unwrap_or_else(|e| e.into_inner());
        claimed.remove(&key);
    }
}
