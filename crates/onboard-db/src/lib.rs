pub mod memory;
pub mod migrations;
pub mod models;
pub mod queries;

use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

use crate::models::{ConfigRow, UserRow, UserUpdate};

pub use memory::MemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The email is already taken (compared case-insensitively).
    #[error("email already exists")]
    DuplicateEmail,

    #[error(transparent)]
    Unavailable(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Unavailable(e.into())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Unavailable(e.into())
    }
}

/// Persistence for user records and onboarding configurations.
///
/// Calls are blocking; async callers should run them on a blocking thread.
pub trait Store: Send + Sync {
    /// Inserts a new user. Must reject a duplicate email atomically.
    fn insert_user(
        &self,
        id: &str,
        email: &str,
        password_hash: &str,
        current_step: i64,
    ) -> Result<UserRow, StoreError>;

    fn get_user(&self, id: &str) -> Result<Option<UserRow>, StoreError>;

    /// Writes the given fields and step in one operation. `None` if the id is
    /// unknown or its stored step no longer equals `update.expected_step`.
    fn update_user(&self, id: &str, update: &UserUpdate) -> Result<Option<UserRow>, StoreError>;

    /// All users, newest first.
    fn list_users(&self) -> Result<Vec<UserRow>, StoreError>;

    /// Returns false if no such user existed.
    fn delete_user(&self, id: &str) -> Result<bool, StoreError>;

    /// The most recently created configuration, if any.
    fn latest_config(&self) -> Result<Option<ConfigRow>, StoreError>;

    /// Appends a configuration row. Existing rows are never modified.
    fn insert_config(&self, page_2: &[String], page_3: &[String]) -> Result<ConfigRow, StoreError>;

    fn ping(&self) -> Result<(), StoreError>;
}

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;

        migrations::run(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
        f(&conn)
    }
}

/// Timestamp format used for every stored row. Fixed-width, so it sorts
/// lexicographically.
pub(crate) fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
