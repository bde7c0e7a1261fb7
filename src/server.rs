//! Accept loop and per-connection handling.
//!
//! Every connection carries exactly one request: the head is read (bounded by
//! a timeout and [`crate::request::MAX_HEAD_BYTES`]), the operation runs on
//! the blocking pool, the response is written and the socket is closed.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, info_span, warn, Instrument, Span};

use crate::assets::StaticAssets;
use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::prefs::JsonPreferences;
use crate::request::{head_reader, read_route};
use crate::response::Response;
use crate::storage::SqliteStorage;

pub struct Server {
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    read_timeout: Duration,
}

impl Server {
    /// Bind the listener and build the SQLite / JSON preference / static
    /// asset backends from `config`.
    pub async fn bind(config: &Config) -> Result<Self> {
        let dispatcher = Dispatcher::new(
            Box::new(SqliteStorage::new(&config.data_dir)),
            Box::new(JsonPreferences::new(&config.prefs_dir)),
            Box::new(StaticAssets::new(config.assets_dir.clone())),
        );
        Self::with_dispatcher(config, dispatcher).await
    }

    pub async fn with_dispatcher(config: &Config, dispatcher: Dispatcher) -> Result<Self> {
        let listener = TcpListener::bind(&config.addr).await?;
        Ok(Self {
            listener,
            dispatcher: Arc::new(dispatcher),
            read_timeout: config.read_timeout,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub async fn run(self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Serve until `shutdown` resolves. Connections already accepted finish
    /// on their own tasks.
    pub async fn run_until<F: Future<Output = ()>>(self, shutdown: F) -> Result<()> {
        info!(addr = %self.local_addr()?, "debug server listening");
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutting down");
                    return Ok(());
                }
                accepted = self.listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            warn!(error = %e, "accept failed");
                            continue;
                        }
                    };
                    debug!(%peer, "accepted connection");
                    let dispatcher = Arc::clone(&self.dispatcher);
                    let read_timeout = self.read_timeout;
                    tokio::spawn(
                        handle_connection(stream, dispatcher, read_timeout)
                            .instrument(info_span!("connection", %peer)),
                    );
                }
            }
        }
    }
}

/// Serve one request on `stream`. The stream is dropped, and so closed, on
/// every path out of here.
pub async fn handle_connection(
    mut stream: TcpStream,
    dispatcher: Arc<Dispatcher>,
    read_timeout: Duration,
) {
    if let Err(e) = serve_one(&mut stream, dispatcher, read_timeout).await {
        debug!(error = %e, "connection abandoned");
    }
}

async fn serve_one(
    stream: &mut TcpStream,
    dispatcher: Arc<Dispatcher>,
    read_timeout: Duration,
) -> io::Result<()> {
    let (read_half, mut write_half) = stream.split();
    let mut reader = head_reader(read_half);

    let route = match tokio::time::timeout(read_timeout, read_route(&mut reader)).await {
        Ok(route) => route?,
        Err(_) => {
            warn!(?read_timeout, "timed out waiting for request head");
            return Ok(());
        }
    };

    let span = Span::current();
    let response = tokio::task::spawn_blocking(move || {
        span.in_scope(|| dispatcher.respond(route.as_deref()))
    })
    .await
    .unwrap_or_else(|e| {
        warn!(error = %e, "dispatch task failed");
        Response::server_error()
    });

    response.write_to(&mut write_half).await?;
    write_half.shutdown().await
}
