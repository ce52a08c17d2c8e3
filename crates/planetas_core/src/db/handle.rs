//! Lazily opened, shared SQLite connection.
//!
//! # Responsibility
//! - Own exactly one connection for the lifetime of the handle.
//! - Open it on first use and reuse it for every later operation.
//!
//! # Invariants
//! - Concurrent first use opens one connection and runs migrations once.
//! - A failed open leaves the handle unopened; the next call retries the open.
//! - Callers access the connection only through `with_conn`, which serializes
//!   statement execution.

use super::open::{open_db, open_db_in_memory};
use super::{DbError, DbResult};
use once_cell::sync::OnceCell;
use rusqlite::Connection;
use std::fmt::{Debug, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Location {
    File(PathBuf),
    Memory,
}

/// Owner of the planet database connection.
pub struct DbHandle {
    location: Location,
    conn: OnceCell<Mutex<Connection>>,
}

impl DbHandle {
    /// Handle for a database file; the file is created on first open.
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self {
            location: Location::File(path.as_ref().to_path_buf()),
            conn: OnceCell::new(),
        }
    }

    /// Handle for a private in-memory database, mostly useful in tests.
    pub fn in_memory() -> Self {
        Self {
            location: Location::Memory,
            conn: OnceCell::new(),
        }
    }

    /// Database file path, `None` for in-memory handles.
    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            Location::File(path) => Some(path.as_path()),
            Location::Memory => None,
        }
    }

    /// Whether the connection has been opened already.
    pub fn is_open(&self) -> bool {
        self.conn.get().is_some()
    }

    /// Opens the database and applies the schema if that has not happened yet.
    pub fn initialize(&self) -> DbResult<()> {
        self.connection().map(|_| ())
    }

    /// Runs `f` with exclusive access to the opened connection.
    pub fn with_conn<T, E>(&self, f: impl FnOnce(&Connection) -> Result<T, E>) -> Result<T, E>
    where
        E: From<DbError>,
    {
        let conn = self.connection()?;
        let guard = conn.lock().map_err(|_| DbError::ConnectionPoisoned)?;
        f(&guard)
    }

    fn connection(&self) -> DbResult<&Mutex<Connection>> {
        self.conn.get_or_try_init(|| {
            let conn = match &self.location {
                Location::File(path) => open_db(path)?,
                Location::Memory => open_db_in_memory()?,
            };
            Ok(Mutex::new(conn))
        })
    }
}

impl Debug for DbHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbHandle")
            .field("location", &self.location)
            .field("open", &self.is_open())
            .finish()
    }
}
