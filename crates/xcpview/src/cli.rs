use std::path::PathBuf;

use clap::Parser;

/// xcpview — read-only JSON API over a Counterparty ledger database.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Path to the Counterparty SQLite database (opened read-only).
    #[arg(
        long,
        env = "XCPVIEW_DB_PATH",
        default_value = "/var/lib/docker/volumes/federatednode_counterparty-data/_data/counterparty.db"
    )]
    pub db_path: PathBuf,

    /// Maximum pooled database connections.
    #[arg(long, env = "XCPVIEW_DB_CONNECTIONS", default_value = "4")]
    pub db_connections: u32,

    /// Address to bind the web server to.
    #[arg(long, env = "XCPVIEW_BIND", default_value = "127.0.0.1")]
    pub bind: String,

    /// Port to listen on.
    #[arg(long, env = "XCPVIEW_PORT", default_value = "3000")]
    pub port: u16,

    /// Bitcoin Core version reported in node metadata.
    #[arg(long, env = "XCPVIEW_BITCOIN_VERSION", default_value = "0.21.1")]
    pub bitcoin_version: String,

    /// Counterparty version reported in node metadata.
    #[arg(long, env = "XCPVIEW_COUNTERPARTY_VERSION", default_value = "9.59.6")]
    pub counterparty_version: String,

    /// Number of recent blocks listed by `/blocks`.
    #[arg(long, env = "XCPVIEW_LATEST_BLOCKS", default_value = "10")]
    pub latest_blocks: u32,
}
