use anyhow::Context;
use clap::Parser;
use tracing::info;

use debug_db::{logging, Cli, Config, Server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from(Cli::parse());
    logging::init(config.log_format)?;

    let server = Server::bind(&config)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    info!(
        data_dir = %config.data_dir.display(),
        prefs_dir = %config.prefs_dir.display(),
        "serving databases"
    );

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "could not listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await?;
    Ok(())
}
