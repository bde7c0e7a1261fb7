//! Embedded debug server for SQLite databases and preference stores.
//!
//! A browser talks to the server with plain `GET` requests such as
//! `getTableList?database=app.db` or `query?query=SELECT%20*%20FROM%20users`
//! and gets JSON back over an HTTP/1.0 response, one request per connection.
//!
//! The server keeps a single debug session: the database chosen by the last
//! `getTableList` is the one every later table read, query, update and
//! download works on, for every client.

pub mod assets;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod prefs;
pub mod request;
pub mod response;
pub mod route;
pub mod server;
pub mod session;
pub mod storage;
pub mod types;

pub use config::{Cli, Config};
pub use dispatcher::Dispatcher;
pub use error::{DebugError, Result};
pub use server::Server;
