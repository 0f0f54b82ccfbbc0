//! Read-only access to the extracted session database.
//!
//! [`WwdcStore`] exclusively owns the `SQLite` connection for the process
//! lifetime. The connection is opened read-only, so `SQLite`'s own locking
//! suffices for parallel reads; the mutex serializes statement preparation.

pub mod query;
mod search;

pub use query::{
    DEFAULT_SEARCH_LIMIT, DEFAULT_YEAR_LIMIT, MAX_LIMIT, MAX_OFFSET, MAX_QUERY_CHARS, MAX_YEAR,
    MIN_YEAR, SearchQuery, SessionLookup, YearListing,
};

use crate::error::StoreError;
use crate::model::{CorpusStats, SearchResult, Session};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Handle over the read-only session database.
pub struct WwdcStore {
    conn: Mutex<Connection>,
}

impl WwdcStore {
    /// Opens the database read-only with foreign keys enabled.
    ///
    /// # Errors
    ///
    /// [`StoreError::OpenFailed`] when the file cannot be opened as a
    /// `SQLite` database.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open_with_flags(path.as_ref(), OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| StoreError::OpenFailed {
                detail: e.to_string(),
            })?;

        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| StoreError::OpenFailed {
                detail: e.to_string(),
            })?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Runs a validated full-text search.
    ///
    /// Returns an empty vector for zero hits; errors are infrastructure
    /// failures only.
    pub fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, StoreError> {
        let conn = self.lock()?;
        search::run_search(&conn, query)
    }

    /// Fetches one session by validated id. `None` for zero hits.
    pub fn session_by_id(&self, lookup: &SessionLookup) -> Result<Option<Session>, StoreError> {
        let conn = self.lock()?;
        search::run_lookup(&conn, lookup)
    }

    /// Lists sessions for a validated year, ordered by numeric session
    /// number. Empty for a year with no sessions.
    pub fn sessions_by_year(&self, listing: YearListing) -> Result<Vec<Session>, StoreError> {
        let conn = self.lock()?;
        search::run_year_listing(&conn, listing)
    }

    /// Computes the aggregate statistics snapshot.
    pub fn statistics(&self) -> Result<CorpusStats, StoreError> {
        let conn = self.lock()?;
        search::run_statistics(&conn)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::ExecutionFailed {
            detail: "connection mutex poisoned".to_string(),
        })
    }
}

impl std::fmt::Debug for WwdcStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WwdcStore").finish_non_exhaustive()
    }
}
