use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, FromRow, Row, TypeInfo, ValueRef};

use crate::error::CoreError;
use crate::types::{BlockActivity, MempoolMessage, Message, Record};

use super::LedgerStore;

// ==============================================================================
// Queries
// ==============================================================================

const MEMPOOL: &str = "SELECT tx_hash, command, category, bindings, timestamp \
     FROM mempool ORDER BY timestamp DESC, rowid ASC";

const MEMPOOL_BY_TX_HASH: &str = "SELECT tx_hash, command, category, bindings, timestamp \
     FROM mempool WHERE tx_hash = ? ORDER BY rowid ASC";

const LATEST_BLOCK_ACTIVITY: &str =
    "SELECT m.message_index, m.block_index, m.command, m.category, m.bindings, m.timestamp, \
            b.block_time \
     FROM messages m LEFT JOIN blocks b ON b.block_index = m.block_index \
     WHERE m.block_index IN ( \
         SELECT DISTINCT block_index FROM messages ORDER BY block_index DESC LIMIT ? \
     ) \
     ORDER BY m.block_index DESC, m.message_index ASC";

const MESSAGES_BY_BLOCK: &str =
    "SELECT message_index, block_index, command, category, bindings, timestamp \
     FROM messages WHERE block_index = ? ORDER BY message_index ASC";

const BLOCK: &str = "SELECT * FROM blocks WHERE block_index = ?";
const TRANSACTION: &str = "SELECT * FROM transactions WHERE tx_hash = ?";
const BALANCES_BY_ADDRESS: &str = "SELECT * FROM balances WHERE address = ? ORDER BY asset ASC";
const BROADCASTS_BY_ADDRESS: &str =
    "SELECT * FROM broadcasts WHERE source = ? ORDER BY tx_index ASC";
const ASSET: &str = "SELECT * FROM assets WHERE asset_name = ?";
const ISSUANCES_BY_ASSET: &str = "SELECT * FROM issuances WHERE asset = ? ORDER BY tx_index ASC";
const DESTRUCTIONS_BY_ASSET: &str =
    "SELECT * FROM destructions WHERE asset = ? ORDER BY tx_index ASC";

// ==============================================================================
// SQLite Store
// ==============================================================================

/// [`LedgerStore`] backed by the Counterparty SQLite database.
///
/// The database file is opened read-only; the parser daemon that owns it
/// keeps writing while we serve.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open an existing database file in read-only mode.
    pub async fn open(path: impl AsRef<Path>, max_connections: u32) -> Result<Self, CoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .read_only(true)
            .create_if_missing(false);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;
        tracing::debug!(path = %path.as_ref().display(), "opened ledger database");
        Ok(Self { pool })
    }

    /// Wrap an already-configured pool.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_record(&self, sql: &str, key: &str) -> Result<Option<Record>, CoreError> {
        sqlx::query(sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(row_to_record)
            .transpose()
    }

    async fn fetch_records(&self, sql: &str, key: &str) -> Result<Vec<Record>, CoreError> {
        sqlx::query(sql)
            .bind(key)
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(row_to_record)
            .collect()
    }
}

#[async_trait]
impl LedgerStore for SqliteStore {
    async fn mempool(&self) -> Result<Vec<MempoolMessage>, CoreError> {
        Ok(sqlx::query_as(MEMPOOL).fetch_all(&self.pool).await?)
    }

    async fn mempool_by_tx_hash(&self, tx_hash: &str) -> Result<Vec<MempoolMessage>, CoreError> {
        Ok(sqlx::query_as(MEMPOOL_BY_TX_HASH)
            .bind(tx_hash)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn latest_block_activity(&self, limit: u32) -> Result<Vec<BlockActivity>, CoreError> {
        let rows = sqlx::query(LATEST_BLOCK_ACTIVITY)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        // Rows arrive grouped by block, newest block first.
        let mut activity: Vec<BlockActivity> = Vec::new();
        for row in &rows {
            let message = Message::from_row(row)?;
            match activity.last_mut() {
                Some(group) if group.block_index == message.block_index => {
                    group.messages.push(message);
                }
                _ => activity.push(BlockActivity {
                    block_index: message.block_index,
                    block_time: row.try_get("block_time")?,
                    messages: vec![message],
                }),
            }
        }
        Ok(activity)
    }

    async fn messages_by_block(&self, block_index: i64) -> Result<Vec<Message>, CoreError> {
        Ok(sqlx::query_as(MESSAGES_BY_BLOCK)
            .bind(block_index)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn block(&self, block_index: i64) -> Result<Option<Record>, CoreError> {
        sqlx::query(BLOCK)
            .bind(block_index)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(row_to_record)
            .transpose()
    }

    async fn transaction(&self, tx_hash: &str) -> Result<Option<Record>, CoreError> {
        self.fetch_record(TRANSACTION, tx_hash).await
    }

    async fn balances_by_address(&self, address: &str) -> Result<Vec<Record>, CoreError> {
        self.fetch_records(BALANCES_BY_ADDRESS, address).await
    }

    async fn broadcasts_by_address(&self, address: &str) -> Result<Vec<Record>, CoreError> {
        self.fetch_records(BROADCASTS_BY_ADDRESS, address).await
    }

    async fn asset(&self, asset_name: &str) -> Result<Option<Record>, CoreError> {
        self.fetch_record(ASSET, asset_name).await
    }

    async fn issuances_by_asset(&self, asset_name: &str) -> Result<Vec<Record>, CoreError> {
        self.fetch_records(ISSUANCES_BY_ASSET, asset_name).await
    }

    async fn destructions_by_asset(&self, asset_name: &str) -> Result<Vec<Record>, CoreError> {
        self.fetch_records(DESTRUCTIONS_BY_ASSET, asset_name).await
    }
}

// ==============================================================================
// Row Conversion
// ==============================================================================

/// Convert a row into a [`Record`] using each value's storage class.
/// BLOBs become lowercase hex strings.
fn row_to_record(row: &SqliteRow) -> Result<Record, CoreError> {
    let mut record = Record::new();
    for column in row.columns() {
        let idx = column.ordinal();
        let raw = row.try_get_raw(idx)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            let storage_class = raw.type_info().name().to_owned();
            match storage_class.as_str() {
                "INTEGER" | "BOOLEAN" => Value::from(row.try_get::<i64, _>(idx)?),
                "REAL" => Value::from(row.try_get::<f64, _>(idx)?),
                "BLOB" => Value::from(hex::encode(row.try_get::<Vec<u8>, _>(idx)?)),
                _ => Value::from(row.try_get::<String, _>(idx)?),
            }
        };
        record.insert(column.name().to_owned(), value);
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SCHEMA: &str = r#"
        CREATE TABLE blocks (
            block_index INTEGER PRIMARY KEY,
            block_hash TEXT,
            block_time INTEGER,
            difficulty REAL
        );
        CREATE TABLE transactions (
            tx_index INTEGER PRIMARY KEY,
            tx_hash TEXT UNIQUE,
            block_index INTEGER,
            source TEXT,
            btc_amount INTEGER,
            data BLOB
        );
        CREATE TABLE messages (
            message_index INTEGER PRIMARY KEY,
            block_index INTEGER,
            command TEXT,
            category TEXT,
            bindings TEXT,
            timestamp INTEGER
        );
        CREATE TABLE mempool (
            tx_hash TEXT,
            command TEXT,
            category TEXT,
            bindings TEXT,
            timestamp INTEGER
        );
        CREATE TABLE balances (address TEXT, asset TEXT, quantity INTEGER);
        CREATE TABLE broadcasts (tx_index INTEGER, tx_hash TEXT, source TEXT, text TEXT, value REAL);
        CREATE TABLE assets (asset_id TEXT, asset_name TEXT UNIQUE, block_index INTEGER, asset_longname TEXT);
        CREATE TABLE issuances (tx_index INTEGER, tx_hash TEXT, asset TEXT, quantity INTEGER);
        CREATE TABLE destructions (tx_index INTEGER, tx_hash TEXT, asset TEXT, quantity INTEGER);

        INSERT INTO blocks VALUES (700000, 'b700000', 1631000000, 1.5);
        INSERT INTO blocks VALUES (700001, 'b700001', 1631000600, 1.5);
        INSERT INTO transactions VALUES (1, 'aa', 700000, '1Source', 5430, X'00ff10');
        INSERT INTO messages VALUES (10, 700000, 'insert', 'sends', '{"tx_hash":"aa"}', 1631000000);
        INSERT INTO messages VALUES (11, 700000, 'insert', 'debits', '{"event":"aa"}', 1631000000);
        INSERT INTO messages VALUES (12, 700001, 'insert', 'issuances', '{"tx_hash":"bb"}', 1631000600);
        INSERT INTO messages VALUES (13, 700002, 'insert', 'sends', '{"tx_hash":"cc"}', 1631001200);
        INSERT INTO mempool VALUES ('dd', 'insert', 'sends', '{"tx_hash":"dd"}', 100);
        INSERT INTO mempool VALUES ('ee', 'insert', 'orders', '{"tx_hash":"ee"}', 200);
        INSERT INTO balances VALUES ('1Source', 'XCP', 10);
        INSERT INTO balances VALUES ('1Source', 'PEPE', 1);
        INSERT INTO broadcasts VALUES (7, 'ff', '1Source', 'hello', 1.0);
        INSERT INTO assets VALUES ('1', 'XCP', 0, NULL);
        INSERT INTO assets VALUES ('2', 'PEPE', 700000, NULL);
        INSERT INTO issuances VALUES (3, 'i2', 'PEPE', 5);
        INSERT INTO issuances VALUES (2, 'i1', 'PEPE', 10);
        INSERT INTO destructions VALUES (4, 'd1', 'PEPE', 1);
    "#;

    async fn seeded_store() -> SqliteStore {
        // A single connection keeps every query on the same in-memory database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite must open");
        sqlx::raw_sql(SCHEMA)
            .execute(&pool)
            .await
            .expect("fixture schema must apply");
        SqliteStore::from_pool(pool)
    }

    #[tokio::test]
    async fn transaction_row_keeps_column_order_and_hex_encodes_blobs() {
        let store = seeded_store().await;
        let tx = store.transaction("aa").await.unwrap().expect("tx row");
        let columns: Vec<&str> = tx.keys().map(String::as_str).collect();
        assert_eq!(
            columns,
            ["tx_index", "tx_hash", "block_index", "source", "btc_amount", "data"]
        );
        assert_eq!(tx["block_index"], json!(700000));
        assert_eq!(tx["data"], json!("00ff10"));

        assert!(store.transaction("zz").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn block_row_maps_storage_classes() {
        let store = seeded_store().await;
        let block = store.block(700000).await.unwrap().expect("block row");
        assert_eq!(block["block_hash"], json!("b700000"));
        assert_eq!(block["difficulty"], json!(1.5));
        assert!(store.block(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn messages_by_block_filters_and_orders() {
        let store = seeded_store().await;
        let messages = store.messages_by_block(700000).await.unwrap();
        let indexes: Vec<i64> = messages.iter().map(|m| m.message_index).collect();
        assert_eq!(indexes, [10, 11]);
        assert!(store.messages_by_block(5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn latest_block_activity_groups_newest_first() {
        let store = seeded_store().await;
        let activity = store.latest_block_activity(2).await.unwrap();
        assert_eq!(activity.len(), 2);

        // 700002 has messages but no block row yet.
        assert_eq!(activity[0].block_index, 700002);
        assert_eq!(activity[0].block_time, None);
        assert_eq!(activity[1].block_index, 700001);
        assert_eq!(activity[1].block_time, Some(1631000600));
        assert_eq!(activity[1].messages[0].category, "issuances");
    }

    #[tokio::test]
    async fn mempool_queries() {
        let store = seeded_store().await;
        let all = store.mempool().await.unwrap();
        let hashes: Vec<&str> = all.iter().map(|m| m.tx_hash.as_str()).collect();
        assert_eq!(hashes, ["ee", "dd"]);

        let one = store.mempool_by_tx_hash("dd").await.unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].category, "sends");
        assert!(store.mempool_by_tx_hash("aa").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn address_tables() {
        let store = seeded_store().await;
        let balances = store.balances_by_address("1Source").await.unwrap();
        let assets: Vec<&Value> = balances.iter().map(|b| &b["asset"]).collect();
        assert_eq!(assets, [&json!("PEPE"), &json!("XCP")]);

        let broadcasts = store.broadcasts_by_address("1Source").await.unwrap();
        assert_eq!(broadcasts.len(), 1);
        assert_eq!(broadcasts[0]["text"], json!("hello"));

        assert!(store.balances_by_address("1Nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn asset_tables() {
        let store = seeded_store().await;
        let asset = store.asset("PEPE").await.unwrap().expect("asset row");
        assert_eq!(asset["asset_longname"], Value::Null);
        assert!(store.asset("NOSUCHASSET").await.unwrap().is_none());

        let issuances = store.issuances_by_asset("PEPE").await.unwrap();
        let hashes: Vec<&Value> = issuances.iter().map(|i| &i["tx_hash"]).collect();
        assert_eq!(hashes, [&json!("i1"), &json!("i2")]);

        let destructions = store.destructions_by_asset("PEPE").await.unwrap();
        assert_eq!(destructions.len(), 1);
    }

    #[tokio::test]
    async fn open_refuses_missing_file() {
        let result = SqliteStore::open("/nonexistent/dir/counterparty.db", 1).await;
        assert!(matches!(result, Err(CoreError::Database(_))));
    }
}
