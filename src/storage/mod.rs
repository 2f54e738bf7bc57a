//! Storage module for the inverted index
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Site lifecycle rows
//! - Page, lemma, and page-to-lemma link persistence
//! - The consistency-preserving index updates (fold, remove, clear)

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::state::SiteStatus;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Storage handle shared between the orchestrator, crawl tasks, and search
pub type SharedStorage = Arc<Mutex<SqliteStorage>>;

/// Opens (or creates) the index database and wraps it for sharing
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SharedStorage)` - Successfully opened storage
/// * `Err(LexiError)` - Failed to open or initialize the database
pub fn open_storage(path: &Path) -> crate::Result<SharedStorage> {
    Ok(shared(SqliteStorage::new(path)?))
}

/// Wraps a storage backend for sharing between tasks
pub fn shared(storage: SqliteStorage) -> SharedStorage {
    Arc::new(Mutex::new(storage))
}

/// Locks the shared storage, mapping a poisoned lock to a storage error
///
/// The guard must be dropped before the caller awaits anything.
pub fn lock(storage: &SharedStorage) -> StorageResult<MutexGuard<'_, SqliteStorage>> {
    storage.lock().map_err(|_| StorageError::LockPoisoned)
}

/// Runs a closure against the locked storage
///
/// Async callers use this so that no guard is alive across an await point.
pub fn with_storage<T>(
    storage: &SharedStorage,
    f: impl FnOnce(&mut SqliteStorage) -> StorageResult<T>,
) -> StorageResult<T> {
    let mut guard = lock(storage)?;
    f(&mut guard)
}

/// Represents a site in the database
#[derive(Debug, Clone)]
pub struct SiteRecord {
    pub id: i64,
    pub url: String,
    pub name: String,
    pub status: SiteStatus,
    pub status_time: DateTime<Utc>,
    pub last_error: Option<String>,
}

impl SiteRecord {
    /// Status time as milliseconds since the Unix epoch
    pub fn status_time_millis(&self) -> i64 {
        self.status_time.timestamp_millis()
    }
}

/// Represents a page in the database
#[derive(Debug, Clone)]
pub struct PageRecord {
    pub id: i64,
    pub site_id: i64,
    pub path: String,
    pub status_code: u16,
    pub content: String,
}

/// Represents a lemma in the database
#[derive(Debug, Clone)]
pub struct LemmaRecord {
    pub id: i64,
    pub site_id: i64,
    pub lemma: String,
    pub frequency: u64,
}
