//! Read-only data access over the Counterparty ledger database.
//!
//! Defines the [`LedgerStore`] trait and provides a SQLite implementation
//! ([`SqliteStore`]) plus an in-memory test double (`memory::MemoryStore`).

#[cfg(any(test, feature = "test-util"))]
pub mod memory;
mod sqlite;

pub use sqlite::SqliteStore;

use async_trait::async_trait;

use crate::error::CoreError;
use crate::types::{BlockActivity, MempoolMessage, Message, Record};

/// The queries the HTTP surface needs, one method per table lookup.
///
/// A missing row is `Ok(None)` or an empty `Vec`, never an error.
/// Implementations never write.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// All unconfirmed messages, newest first.
    async fn mempool(&self) -> Result<Vec<MempoolMessage>, CoreError>;

    /// Unconfirmed messages produced by one transaction.
    async fn mempool_by_tx_hash(&self, tx_hash: &str) -> Result<Vec<MempoolMessage>, CoreError>;

    /// Messages of the `limit` most recent blocks that have any, newest
    /// block first.
    async fn latest_block_activity(&self, limit: u32) -> Result<Vec<BlockActivity>, CoreError>;

    /// Every message recorded in a block, in `message_index` order.
    async fn messages_by_block(&self, block_index: i64) -> Result<Vec<Message>, CoreError>;

    async fn block(&self, block_index: i64) -> Result<Option<Record>, CoreError>;

    async fn transaction(&self, tx_hash: &str) -> Result<Option<Record>, CoreError>;

    async fn balances_by_address(&self, address: &str) -> Result<Vec<Record>, CoreError>;

    /// Broadcasts whose `source` is the address.
    async fn broadcasts_by_address(&self, address: &str) -> Result<Vec<Record>, CoreError>;

    async fn asset(&self, asset_name: &str) -> Result<Option<Record>, CoreError>;

    async fn issuances_by_asset(&self, asset_name: &str) -> Result<Vec<Record>, CoreError>;

    async fn destructions_by_asset(&self, asset_name: &str) -> Result<Vec<Record>, CoreError>;
}
