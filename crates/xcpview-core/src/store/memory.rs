use std::cmp::Reverse;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::CoreError;
use crate::types::{record_i64, record_str, BlockActivity, MempoolMessage, Message, Record};

use super::LedgerStore;

/// An in-memory ledger for testing. Rows are supplied through the builder
/// and queried with the same filters and ordering as [`super::SqliteStore`].
#[derive(Default)]
pub struct MemoryStore {
    blocks: Vec<Record>,
    transactions: Vec<Record>,
    messages: Vec<Message>,
    mempool: Vec<MempoolMessage>,
    balances: Vec<Record>,
    broadcasts: Vec<Record>,
    assets: Vec<Record>,
    issuances: Vec<Record>,
    destructions: Vec<Record>,
}

impl MemoryStore {
    pub fn builder() -> MemoryStoreBuilder {
        MemoryStoreBuilder {
            store: MemoryStore::default(),
        }
    }
}

pub struct MemoryStoreBuilder {
    store: MemoryStore,
}

impl MemoryStoreBuilder {
    pub fn with_block(mut self, block: Record) -> Self {
        self.store.blocks.push(block);
        self
    }

    pub fn with_transaction(mut self, tx: Record) -> Self {
        self.store.transactions.push(tx);
        self
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.store.messages.push(message);
        self
    }

    pub fn with_mempool(mut self, message: MempoolMessage) -> Self {
        self.store.mempool.push(message);
        self
    }

    pub fn with_balance(mut self, balance: Record) -> Self {
        self.store.balances.push(balance);
        self
    }

    pub fn with_broadcast(mut self, broadcast: Record) -> Self {
        self.store.broadcasts.push(broadcast);
        self
    }

    pub fn with_asset(mut self, asset: Record) -> Self {
        self.store.assets.push(asset);
        self
    }

    pub fn with_issuance(mut self, issuance: Record) -> Self {
        self.store.issuances.push(issuance);
        self
    }

    pub fn with_destruction(mut self, destruction: Record) -> Self {
        self.store.destructions.push(destruction);
        self
    }

    pub fn build(self) -> MemoryStore {
        self.store
    }
}

fn find_by_str(rows: &[Record], column: &str, value: &str) -> Option<Record> {
    rows.iter()
        .find(|row| record_str(row, column) == Some(value))
        .cloned()
}

fn filter_by_str(rows: &[Record], column: &str, value: &str, order_by: &str) -> Vec<Record> {
    let mut matched: Vec<Record> = rows
        .iter()
        .filter(|row| record_str(row, column) == Some(value))
        .cloned()
        .collect();
    matched.sort_by(|a, b| {
        let (a, b) = (a.get(order_by), b.get(order_by));
        match (a.and_then(Value::as_i64), b.and_then(Value::as_i64)) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => a.and_then(Value::as_str).cmp(&b.and_then(Value::as_str)),
        }
    });
    matched
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn mempool(&self) -> Result<Vec<MempoolMessage>, CoreError> {
        let mut rows = self.mempool.clone();
        rows.sort_by_key(|m| Reverse(m.timestamp));
        Ok(rows)
    }

    async fn mempool_by_tx_hash(&self, tx_hash: &str) -> Result<Vec<MempoolMessage>, CoreError> {
        Ok(self
            .mempool
            .iter()
            .filter(|m| m.tx_hash == tx_hash)
            .cloned()
            .collect())
    }

    async fn latest_block_activity(&self, limit: u32) -> Result<Vec<BlockActivity>, CoreError> {
        let mut block_indexes: Vec<i64> = self.messages.iter().map(|m| m.block_index).collect();
        block_indexes.sort_unstable_by_key(|&i| Reverse(i));
        block_indexes.dedup();
        block_indexes.truncate(limit as usize);

        let mut activity = Vec::with_capacity(block_indexes.len());
        for block_index in block_indexes {
            let block_time = self
                .blocks
                .iter()
                .find(|b| record_i64(b, "block_index") == Some(block_index))
                .and_then(|b| record_i64(b, "block_time"));
            activity.push(BlockActivity {
                block_index,
                block_time,
                messages: self.messages_by_block(block_index).await?,
            });
        }
        Ok(activity)
    }

    async fn messages_by_block(&self, block_index: i64) -> Result<Vec<Message>, CoreError> {
        let mut rows: Vec<Message> = self
            .messages
            .iter()
            .filter(|m| m.block_index == block_index)
            .cloned()
            .collect();
        rows.sort_by_key(|m| m.message_index);
        Ok(rows)
    }

    async fn block(&self, block_index: i64) -> Result<Option<Record>, CoreError> {
        Ok(self
            .blocks
            .iter()
            .find(|b| record_i64(b, "block_index") == Some(block_index))
            .cloned())
    }

    async fn transaction(&self, tx_hash: &str) -> Result<Option<Record>, CoreError> {
        Ok(find_by_str(&self.transactions, "tx_hash", tx_hash))
    }

    async fn balances_by_address(&self, address: &str) -> Result<Vec<Record>, CoreError> {
        Ok(filter_by_str(&self.balances, "address", address, "asset"))
    }

    async fn broadcasts_by_address(&self, address: &str) -> Result<Vec<Record>, CoreError> {
        Ok(filter_by_str(&self.broadcasts, "source", address, "tx_index"))
    }

    async fn asset(&self, asset_name: &str) -> Result<Option<Record>, CoreError> {
        Ok(find_by_str(&self.assets, "asset_name", asset_name))
    }

    async fn issuances_by_asset(&self, asset_name: &str) -> Result<Vec<Record>, CoreError> {
        Ok(filter_by_str(&self.issuances, "asset", asset_name, "tx_index"))
    }

    async fn destructions_by_asset(&self, asset_name: &str) -> Result<Vec<Record>, CoreError> {
        Ok(filter_by_str(&self.destructions, "asset", asset_name, "tx_index"))
    }
}
