//! Shared test helpers for building ledger rows.
//!
//! Used by `xcpview-core` unit tests and, through the `test-util` feature,
//! by the server's router tests.

use serde_json::Value;

use crate::types::{MempoolMessage, Message, Record};

/// Turn a `json!({...})` object literal into a [`Record`].
///
/// Panics on non-object input; only meant for fixtures.
pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("record fixture must be a JSON object, got {other}"),
    }
}

/// A `blocks` row with the columns the handlers and tests look at.
pub fn block_row(block_index: i64, block_time: i64) -> Record {
    record(serde_json::json!({
        "block_index": block_index,
        "block_hash": format!("{block_index:064x}"),
        "block_time": block_time,
    }))
}

/// A `transactions` row confirmed in `block_index`.
pub fn tx_row(tx_hash: &str, block_index: i64) -> Record {
    record(serde_json::json!({
        "tx_index": 1,
        "tx_hash": tx_hash,
        "block_index": block_index,
        "source": "1SourceAddress",
    }))
}

pub fn make_message(
    message_index: i64,
    block_index: i64,
    category: &str,
    command: &str,
    bindings: Value,
) -> Message {
    Message {
        message_index,
        block_index,
        command: command.to_string(),
        category: category.to_string(),
        bindings: bindings.to_string(),
        timestamp: Some(1_600_000_000 + message_index),
    }
}

pub fn make_mempool_message(tx_hash: &str, category: &str, timestamp: i64) -> MempoolMessage {
    MempoolMessage {
        tx_hash: tx_hash.to_string(),
        command: "insert".to_string(),
        category: category.to_string(),
        bindings: serde_json::json!({ "tx_hash": tx_hash }).to_string(),
        timestamp: Some(timestamp),
    }
}
