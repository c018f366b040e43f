//! Storage module for company records and run history
//!
//! This module handles persistence for the pipeline, including:
//! - The [`CompanyStore`] trait used for dedup and ingestion
//! - An in-memory store for tests and throwaway runs
//! - A SQLite store with run tracking

mod memory;
mod schema;
mod sqlite;
mod traits;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{CompanyStore, StorageError, StorageResult};

use std::path::Path;

/// Initializes or opens a store database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStore)` - Successfully initialized store
/// * `Err(StorageError)` - Failed to initialize store
pub fn open_store(path: &Path) -> StorageResult<SqliteStore> {
    SqliteStore::new(path)
}

/// Represents a harvest run in the database
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub total: u64,
    pub accepted: u64,
    pub duplicates: u64,
    pub rejected: u64,
    pub errored: u64,
    pub cancelled: u64,
}

/// Status of a harvest run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
