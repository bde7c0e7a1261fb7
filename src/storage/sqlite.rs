use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::types::{Value, ValueRef};
use rusqlite::{params, Connection, OpenFlags};
use tracing::{debug, warn};

use super::{quote_identifier, validate_target_name, Database, Storage};
use crate::error::{DebugError, Result};
use crate::types::{ColumnType, RowUpdateRequest, TableDataResponse};

const DATABASE_EXTENSIONS: &[&str] = &["db", "sqlite", "sqlite3", "db3"];
const COMPANION_SUFFIXES: &[&str] = &["-journal", "-wal", "-shm"];

/// Database files living directly inside one directory.
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    data_dir: PathBuf,
}

impl SqliteStorage {
    pub fn new<P: Into<PathBuf>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn is_database_file(path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if COMPANION_SUFFIXES.iter().any(|s| name.ends_with(s)) {
            return false;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| DATABASE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
    }
}

impl Storage for SqliteStorage {
    fn list_targets(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.data_dir)? {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type()?.is_file() || !Self::is_database_file(&path) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn open_target(&self, name: &str) -> Result<Box<dyn Database>> {
        let path = self.backing_file(name)?;
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&path, flags)?;
        debug!(path = %path.display(), "opened database");
        Ok(Box::new(SqliteDatabase::new(conn)))
    }

    fn backing_file(&self, name: &str) -> Result<PathBuf> {
        validate_target_name(name)?;
        let path = self.data_dir.join(name);
        if !path.is_file() {
            return Err(DebugError::TargetNotFound(name.to_string()));
        }
        Ok(path)
    }
}

/// An open SQLite connection.
pub struct SqliteDatabase {
    conn: Connection,
}

impl SqliteDatabase {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

fn cell_to_string(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => String::from_utf8_lossy(b).into_owned(),
    }
}

/// Convert the textual cell value into the SQL value its column type asks for.
fn typed_value(raw: &str, column_type: ColumnType) -> Result<Value> {
    let invalid = |name: &'static str| DebugError::InvalidValue {
        value: raw.to_string(),
        column_type: name,
    };
    let value = match column_type {
        ColumnType::Integer => Value::Integer(raw.trim().parse().map_err(|_| invalid("integer"))?),
        ColumnType::Real => Value::Real(raw.trim().parse().map_err(|_| invalid("real"))?),
        ColumnType::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Value::Integer(1),
            "false" | "0" => Value::Integer(0),
            _ => return Err(invalid("boolean")),
        },
        ColumnType::Text => Value::Text(raw.to_string()),
    };
    Ok(value)
}

impl Database for SqliteDatabase {
    fn list_tables(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master WHERE type='table' OR type='view' \
             ORDER BY name COLLATE NOCASE",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }

    fn run_query(&self, sql: &str) -> Result<TableDataResponse> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let column_count = columns.len();

        let mut rows = stmt.query([])?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(column_count);
            for i in 0..column_count {
                cells.push(cell_to_string(row.get_ref(i)?));
            }
            result.push(cells);
        }

        Ok(TableDataResponse::success(columns, result))
    }

    fn run_exec(&self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    fn update_rows(&self, table: &str, updates: &[RowUpdateRequest]) -> Result<usize> {
        let mut unmatched = 0;
        for update in updates {
            let value = typed_value(&update.column_value, ColumnType::parse(&update.column_type))?;
            let sql = format!(
                "UPDATE {} SET {} = ?1 WHERE {} = ?2",
                quote_identifier(table),
                quote_identifier(&update.column_name),
                quote_identifier(&update.primary_key_column_name),
            );
            let changed = self
                .conn
                .execute(&sql, params![value, update.primary_key_column_value])?;
            if changed == 0 {
                warn!(
                    table,
                    key = %update.primary_key_column_value,
                    "row update matched no row"
                );
                unmatched += 1;
            }
        }
        Ok(unmatched)
    }
}
