//! Relational storage accessor.
//!
//! The dispatcher only talks to the [`Storage`] and [`Database`] traits; the
//! SQLite implementation lives in [`sqlite`].

pub mod sqlite;

use std::path::PathBuf;

use crate::error::{DebugError, Result};
use crate::types::{RowUpdateRequest, TableDataResponse};

pub use sqlite::{SqliteDatabase, SqliteStorage};

/// A set of discoverable database files.
pub trait Storage: Send + Sync {
    /// Names of every database that can be opened, sorted.
    fn list_targets(&self) -> Result<Vec<String>>;

    /// Open an existing database. Never creates one.
    fn open_target(&self, name: &str) -> Result<Box<dyn Database>>;

    /// Path of the file backing `name`, if it exists.
    fn backing_file(&self, name: &str) -> Result<PathBuf>;
}

/// An open database connection.
pub trait Database: Send {
    /// Tables and views, sorted case-insensitively.
    fn list_tables(&self) -> Result<Vec<String>>;

    /// Run a read query. Fails if the statement cannot be prepared or stepped.
    fn run_query(&self, sql: &str) -> Result<TableDataResponse>;

    /// Run one or more DDL/DML statements.
    fn run_exec(&self, sql: &str) -> Result<()>;

    /// Apply each update as its own statement, in order, stopping at the first
    /// failure. Returns the number of updates that matched no row.
    fn update_rows(&self, table: &str, updates: &[RowUpdateRequest]) -> Result<usize>;
}

/// Reject anything that is not a plain file name.
pub fn validate_target_name(name: &str) -> Result<()> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.chars().any(char::is_control);
    if bad {
        return Err(DebugError::InvalidTargetName(name.to_string()));
    }
    Ok(())
}

/// Quote an SQL identifier, doubling embedded quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
