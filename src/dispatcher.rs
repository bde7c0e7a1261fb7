//! Executes debug operations against the shared session.

use std::fs;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::assets::AssetProvider;
use crate::error::{DebugError, Result};
use crate::prefs::{Preferences, PREFERENCES_TARGET};
use crate::response::Response;
use crate::route::{operation_name, Operation, Route};
use crate::session::Session;
use crate::storage::{quote_identifier, Storage};
use crate::types::{GenericResponse, TableDataResponse, UpdateRowResponse};

/// What an operation produced, before framing.
#[derive(Debug)]
pub enum Reply {
    Json(Vec<u8>),
    Download { filename: String, bytes: Vec<u8> },
    Asset { bytes: Vec<u8>, mime: &'static str },
}

impl From<Reply> for Response {
    fn from(reply: Reply) -> Self {
        match reply {
            Reply::Json(body) => Response::json(body),
            Reply::Download { filename, bytes } => Response::attachment(filename, bytes),
            Reply::Asset { bytes, mime } => Response::ok(mime, bytes),
        }
    }
}

fn json<T: Serialize>(value: &T) -> Result<Reply> {
    Ok(Reply::Json(serde_json::to_vec(value)?))
}

/// Routes requests to the storage, preference and asset accessors.
///
/// Holds the one debug session of the server. Every operation takes the
/// session lock for its whole run, so operations from different connections
/// are serialized and see whichever `getTableList` finished last.
pub struct Dispatcher {
    storage: Box<dyn Storage>,
    prefs: Box<dyn Preferences>,
    assets: Box<dyn AssetProvider>,
    session: Mutex<Session>,
}

impl Dispatcher {
    pub fn new(
        storage: Box<dyn Storage>,
        prefs: Box<dyn Preferences>,
        assets: Box<dyn AssetProvider>,
    ) -> Self {
        Self {
            storage,
            prefs,
            assets,
            session: Mutex::new(Session::new()),
        }
    }

    #[cfg(test)]
    fn selected_target(&self) -> Option<String> {
        self.lock().selected_target().map(str::to_string)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Handle one request target end to end. Never fails: errors become a
    /// `500` response.
    pub fn respond(&self, target: Option<&str>) -> Response {
        let route = Route::parse(target);
        let result = Operation::from_route(&route).and_then(|op| {
            debug!(operation = operation_name(&route), "dispatching");
            self.dispatch(op)
        });
        match result {
            Ok(reply) => {
                let response = Response::from(reply);
                info!(route = route.as_str(), status = response.status_line(), "request served");
                response
            }
            Err(e) => {
                warn!(route = route.as_str(), error = %e, "request failed");
                Response::server_error()
            }
        }
    }

    pub fn dispatch(&self, op: Operation) -> Result<Reply> {
        match op {
            Operation::GetAllDataFromTheTable { table_name } => {
                json(&self.get_all_data_from_the_table(&table_name))
            }
            Operation::Query { sql } => self.query(&sql),
            Operation::GetDbList => json(&self.get_db_list()),
            Operation::GetTableList { database } => json(&self.get_table_list(&database)),
            Operation::DownloadDb => self.download_db(),
            Operation::UpdateTableData {
                table_name,
                updates,
            } => {
                let session = self.lock();
                let response = match session.database() {
                    None => UpdateRowResponse::failure(DebugError::NoDatabaseOpen.to_string()),
                    Some(db) => match db.update_rows(&table_name, &updates) {
                        Ok(_) if updates.is_empty() => {
                            UpdateRowResponse::failure("no row updates supplied")
                        }
                        Ok(0) => UpdateRowResponse::success(),
                        Ok(unmatched) => UpdateRowResponse::failure(format!(
                            "{unmatched} of {} updates matched no row",
                            updates.len()
                        )),
                        Err(e) => UpdateRowResponse::failure(e.to_string()),
                    },
                };
                json(&response)
            }
            Operation::Asset { name } => {
                let (bytes, mime) = self.assets.load(&name)?;
                Ok(Reply::Asset { bytes, mime })
            }
        }
    }

    fn get_all_data_from_the_table(&self, table_name: &str) -> TableDataResponse {
        let session = self.lock();
        let result = match session.database() {
            Some(db) => db.run_query(&format!("SELECT * FROM {}", quote_identifier(table_name))),
            None => self.prefs.list_entries(table_name),
        };
        result.unwrap_or_else(|e| TableDataResponse::failure(e.to_string()))
    }

    fn query(&self, sql: &str) -> Result<Reply> {
        let session = self.lock();
        let is_select = sql
            .split_whitespace()
            .next()
            .is_some_and(|first| first.eq_ignore_ascii_case("select"));

        let Some(db) = session.database() else {
            let message = DebugError::NoDatabaseOpen.to_string();
            return if is_select {
                json(&TableDataResponse::failure(message))
            } else {
                json(&GenericResponse::failure(message))
            };
        };

        if is_select {
            let response = db
                .run_query(sql)
                .unwrap_or_else(|e| TableDataResponse::failure(e.to_string()));
            json(&response)
        } else {
            let response = match db.run_exec(sql) {
                Ok(()) => GenericResponse::success(Vec::new()),
                Err(e) => GenericResponse::failure(e.to_string()),
            };
            json(&response)
        }
    }

    fn get_db_list(&self) -> GenericResponse {
        let mut rows = self.storage.list_targets().unwrap_or_else(|e| {
            warn!(error = %e, "could not list databases");
            Vec::new()
        });
        rows.push(PREFERENCES_TARGET.to_string());
        GenericResponse::success(rows)
    }

    fn get_table_list(&self, database: &str) -> GenericResponse {
        let mut session = self.lock();
        if database == PREFERENCES_TARGET {
            session.select_preferences();
            return match self.prefs.list_groups() {
                Ok(groups) => GenericResponse::success(groups),
                Err(e) => GenericResponse::failure(e.to_string()),
            };
        }

        let db = match self.storage.open_target(database) {
            Ok(db) => db,
            Err(e) => {
                warn!(database, error = %e, "could not open database");
                return GenericResponse::failure(e.to_string());
            }
        };
        let tables = db.list_tables();
        session.open_relational(database.to_string(), db);
        info!(database, "database selected");
        match tables {
            Ok(tables) => GenericResponse::success(tables),
            Err(e) => GenericResponse::failure(e.to_string()),
        }
    }

    fn download_db(&self) -> Result<Reply> {
        let session = self.lock();
        let name = session.selected_target().ok_or(DebugError::NoDatabaseOpen)?;
        let bytes = fs::read(self.storage.backing_file(name)?)?;
        Ok(Reply::Download {
            filename: name.to_string(),
            bytes,
        })
    }
}
