//! Storage traits and error types
//!
//! This module defines the trait the pipeline uses to deduplicate and persist
//! company records, and the associated error types.

use crate::model::CompanyRecord;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Store lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Dedup and persistence collaborator
///
/// Implementations are shared by every task of a run and provide their own
/// locking. Records are keyed by [`CompanyRecord::dedup_key`].
pub trait CompanyStore: Send + Sync {
    /// Returns true if a record with this dedup key exists
    fn exists_by_url(&self, url: &str) -> StorageResult<bool>;

    /// Persists a record
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The record was stored
    /// * `Ok(false)` - A record with the same key already existed; nothing changed
    /// * `Err(StorageError)` - The store failed
    fn insert(&self, record: &CompanyRecord) -> StorageResult<bool>;
}
