//! Command line and environment configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

/// Inspect and edit SQLite databases and preference stores from a browser
#[derive(Parser, Debug, Clone)]
#[command(name = "debug-db", version, about)]
pub struct Cli {
    /// Address to bind to
    #[arg(long, env = "DEBUG_DB_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "DEBUG_DB_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Directory holding the database files
    #[arg(long, env = "DEBUG_DB_DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,

    /// Directory of `<group>.json` preference files [default: <data-dir>/shared_prefs]
    #[arg(long, env = "DEBUG_DB_PREFS_DIR")]
    pub prefs_dir: Option<PathBuf>,

    /// Directory of static assets; the built-in landing page is used otherwise
    #[arg(long, env = "DEBUG_DB_ASSETS_DIR")]
    pub assets_dir: Option<PathBuf>,

    /// Seconds to wait for a client to send its request head
    #[arg(long, env = "DEBUG_DB_READ_TIMEOUT_SECS", default_value_t = 10)]
    pub read_timeout_secs: u64,

    #[arg(long, env = "DEBUG_DB_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

/// Resolved server settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub addr: String,
    pub data_dir: PathBuf,
    pub prefs_dir: PathBuf,
    pub assets_dir: Option<PathBuf>,
    pub read_timeout: Duration,
    pub log_format: LogFormat,
}

impl Config {
    /// Settings for tests and embedding: bind anywhere on loopback.
    pub fn local<P: Into<PathBuf>>(data_dir: P) -> Self {
        let data_dir = data_dir.into();
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 0)).to_string(),
            prefs_dir: data_dir.join("shared_prefs"),
            data_dir,
            assets_dir: None,
            read_timeout: Duration::from_secs(10),
            log_format: LogFormat::Compact,
        }
    }
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let prefs_dir = cli
            .prefs_dir
            .unwrap_or_else(|| cli.data_dir.join("shared_prefs"));
        Self {
            addr: format!("{}:{}", cli.host, cli.port),
            data_dir: cli.data_dir,
            prefs_dir,
            assets_dir: cli.assets_dir,
            read_timeout: Duration::from_secs(cli.read_timeout_secs),
            log_format: cli.log_format,
        }
    }
}
