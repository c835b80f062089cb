mod cli;
mod server;

use std::sync::Arc;

use clap::Parser;
use eyre::WrapErr;

use xcpview_core::SqliteStore;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    // Opening read-only means a missing file is an error rather than a fresh
    // empty database.
    let store = SqliteStore::open(&args.db_path, args.db_connections)
        .await
        .with_context(|| format!("open ledger database `{}`", args.db_path.display()))?;
    tracing::info!(path = %args.db_path.display(), "opened ledger database read-only");

    let state = server::AppState {
        store: Arc::new(store),
        node: server::NodeInfo {
            bitcoin_version: args.bitcoin_version,
            counterparty_version: args.counterparty_version,
        },
        latest_blocks: args.latest_blocks,
    };
    let router = server::build_router(state);

    let bind_addr = format!("{}:{}", args.bind, args.port);
    if args.bind == "0.0.0.0" {
        tracing::warn!("server is bound to 0.0.0.0 and accessible from the network");
    }

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .context("bind TCP listener")?;

    tracing::info!("listening on {bind_addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("run HTTP server")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
