//! SQLite storage implementation
//!
//! This module provides a SQLite-backed [`CompanyStore`] plus run bookkeeping.

use crate::model::CompanyRecord;
use crate::output::RunSummary;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{CompanyStore, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const COMPANY_COLUMNS: &str = "candidate_url, url, source_url, company_name, address, \
     postal_code, region, locality, address_remainder, tel, fax, representative, \
     business_description, established_date, capital, contact_url, created_at, updated_at";

const RUN_COLUMNS: &str =
    "id, started_at, finished_at, config_hash, status, total, accepted, duplicates, rejected, errored, cancelled";

/// SQLite store backend
///
/// The connection sits behind a mutex so one store can be shared by every
/// task of a run.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens or creates a store database
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))
    }

    // ===== Run Management =====

    /// Creates a new harvest run
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    pub fn create_run(&self, config_hash: &str) -> StorageResult<i64> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Marks a run finished and records its outcome counts
    pub fn complete_run(
        &self,
        run_id: i64,
        status: RunStatus,
        summary: &RunSummary,
    ) -> StorageResult<()> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();
        let updated = conn.execute(
            "UPDATE runs SET finished_at = ?1, status = ?2, total = ?3, accepted = ?4,
                 duplicates = ?5, rejected = ?6, errored = ?7, cancelled = ?8
             WHERE id = ?9",
            params![
                now,
                status.to_db_string(),
                summary.total as i64,
                summary.accepted as i64,
                summary.duplicates as i64,
                summary.validation_failures as i64,
                summary.errored() as i64,
                summary.cancelled as i64,
                run_id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    /// Gets a run by ID
    pub fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
            params![run_id],
            run_from_row,
        )
        .optional()?
        .ok_or(StorageError::RunNotFound(run_id))
    }

    /// Gets the most recent run
    pub fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let conn = self.conn()?;
        let run = conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                run_from_row,
            )
            .optional()?;
        Ok(run)
    }

    // ===== Companies =====

    /// Looks up a stored company by dedup key
    pub fn get_company(&self, key: &str) -> StorageResult<Option<CompanyRecord>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM companies WHERE url = ?1", COMPANY_COLUMNS),
                params![key],
                company_from_row,
            )
            .optional()?;

        row.map(StoredCompany::into_record).transpose()
    }

    pub fn count_companies(&self) -> StorageResult<u64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM companies", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl CompanyStore for SqliteStore {
    fn exists_by_url(&self, url: &str) -> StorageResult<bool> {
        let conn = self.conn()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM companies WHERE url = ?1",
                params![url],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn insert(&self, record: &CompanyRecord) -> StorageResult<bool> {
        let conn = self.conn()?;
        let inserted = conn.execute(
            &format!(
                "INSERT OR IGNORE INTO companies ({}) VALUES
                 (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
                COMPANY_COLUMNS
            ),
            params![
                record.url,
                record.dedup_key,
                record.source_url,
                record.company_name,
                record.address,
                record.postal_code,
                record.region,
                record.locality,
                record.remainder,
                record.tel,
                record.fax,
                record.representative,
                record.business_description,
                record.established_date,
                record.capital,
                record.contact_url,
                record.created_at.to_rfc3339(),
                record.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(inserted == 1)
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?).unwrap_or(RunStatus::Running),
        total: row.get::<_, i64>(5)? as u64,
        accepted: row.get::<_, i64>(6)? as u64,
        duplicates: row.get::<_, i64>(7)? as u64,
        rejected: row.get::<_, i64>(8)? as u64,
        errored: row.get::<_, i64>(9)? as u64,
        cancelled: row.get::<_, i64>(10)? as u64,
    })
}

/// A companies row before timestamps are parsed
struct StoredCompany {
    record: CompanyRecord,
    created_at: String,
    updated_at: String,
}

impl StoredCompany {
    fn into_record(self) -> StorageResult<CompanyRecord> {
        let mut record = self.record;
        record.created_at = parse_timestamp(&self.created_at)?;
        record.updated_at = parse_timestamp(&self.updated_at)?;
        Ok(record)
    }
}

fn company_from_row(row: &Row<'_>) -> rusqlite::Result<StoredCompany> {
    let epoch = DateTime::<Utc>::default();
    Ok(StoredCompany {
        record: CompanyRecord {
            url: row.get(0)?,
            dedup_key: row.get(1)?,
            source_url: row.get(2)?,
            company_name: row.get(3)?,
            address: row.get(4)?,
            postal_code: row.get(5)?,
            region: row.get(6)?,
            locality: row.get(7)?,
            remainder: row.get(8)?,
            tel: row.get(9)?,
            fax: row.get(10)?,
            representative: row.get(11)?,
            business_description: row.get(12)?,
            established_date: row.get(13)?,
            capital: row.get(14)?,
            contact_url: row.get(15)?,
            created_at: epoch,
            updated_at: epoch,
        },
        created_at: row.get(16)?,
        updated_at: row.get(17)?,
    })
}

fn parse_timestamp(value: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::Database(format!("bad timestamp {:?}: {}", value, e)))
}
