//! Row types read from the Counterparty ledger database.
//!
//! Tables whose only consumer is the JSON response (blocks, transactions,
//! balances, broadcasts, assets, issuances, destructions) are carried as a
//! loosely-typed [`Record`]; their column sets drift between protocol
//! versions and nothing here interprets them. Messages and mempool rows are
//! typed because correlation reads their category, command, and bindings.

use serde::Serialize;
use serde_json::{Map, Value};

/// One database row as an ordered column-name → value map.
///
/// Column order follows the SELECT, so serializing the same row twice
/// yields byte-identical JSON.
pub type Record = Map<String, Value>;

/// Read an integer column from a [`Record`].
pub fn record_i64(record: &Record, column: &str) -> Option<i64> {
    record.get(column).and_then(Value::as_i64)
}

/// Read a text column from a [`Record`].
pub fn record_str<'a>(record: &'a Record, column: &str) -> Option<&'a str> {
    record.get(column).and_then(Value::as_str)
}

// ==============================================================================
// Ledger Messages
// ==============================================================================

/// A confirmed ledger message (`messages` table).
///
/// `bindings` is kept as the raw JSON text stored by the parser so it is
/// returned to clients exactly as written.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Message {
    pub message_index: i64,
    pub block_index: i64,
    pub command: String,
    pub category: String,
    pub bindings: String,
    pub timestamp: Option<i64>,
}

/// An unconfirmed ledger message (`mempool` table).
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct MempoolMessage {
    pub tx_hash: String,
    pub command: String,
    pub category: String,
    pub bindings: String,
    pub timestamp: Option<i64>,
}

// ==============================================================================
// Bindings
// ==============================================================================

/// Parsed message bindings.
///
/// The payload shape differs per category, so it stays a loose map and only
/// the keys correlation needs are exposed.
#[derive(Debug, Clone)]
pub struct Bindings(Map<String, Value>);

impl Bindings {
    /// Parse the stored JSON text. Valid JSON that is not an object carries
    /// no keys; only malformed JSON is an error.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        match serde_json::from_str(raw)? {
            Value::Object(map) => Ok(Self(map)),
            _ => Ok(Self(Map::new())),
        }
    }

    pub fn tx_hash(&self) -> Option<&str> {
        self.str_field("tx_hash")
    }

    pub fn event(&self) -> Option<&str> {
        self.str_field("event")
    }

    pub fn action(&self) -> Option<&str> {
        self.str_field("action")
    }

    /// True when `tx_hash` or `event` equals the given hash.
    ///
    /// Update-style messages that carry the hash under another key (for
    /// example `dispenser_tx_hash` or `offer_hash`) do not match.
    pub fn references(&self, tx_hash: &str) -> bool {
        self.tx_hash() == Some(tx_hash) || self.event() == Some(tx_hash)
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

// ==============================================================================
// Query Results
// ==============================================================================

/// Messages of one recent block, as listed by the latest-activity view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockActivity {
    pub block_index: i64,
    /// `None` when the block row is missing (the parser writes messages first).
    pub block_time: Option<i64>,
    pub messages: Vec<Message>,
}

/// A message associated with a transaction, flagged when it is the
/// transaction's primary effect.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedMessage {
    #[serde(flatten)]
    pub message: Message,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub main_message: bool,
}

/// Everything known about a transaction hash.
#[derive(Debug, Clone, Serialize)]
pub struct TxResolution {
    /// Confirmed transaction row; `None` when the hash is unconfirmed or unknown.
    pub transaction: Option<Record>,
    /// Every message of the transaction's block, for client-side exploration.
    /// Primary effects of the hash are flagged here as well.
    pub messages_all: Vec<ClassifiedMessage>,
    /// Messages bound to the hash, in block order.
    pub messages: Vec<ClassifiedMessage>,
    /// Mempool rows for the hash; empty once the transaction is confirmed.
    pub mempool: Vec<MempoolMessage>,
}

impl TxResolution {
    pub fn is_found(&self) -> bool {
        self.transaction.is_some() || !self.mempool.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bindings_match_on_tx_hash_or_event() {
        let by_hash = Bindings::parse(r#"{"tx_hash":"aa","asset":"PEPE"}"#).unwrap();
        assert!(by_hash.references("aa"));
        assert!(!by_hash.references("bb"));

        let by_event = Bindings::parse(r#"{"event":"bb","action":"close dispenser"}"#).unwrap();
        assert!(by_event.references("bb"));
        assert_eq!(by_event.action(), Some("close dispenser"));
    }

    #[test]
    fn bindings_ignore_other_hash_keys_and_non_strings() {
        let update = Bindings::parse(r#"{"dispenser_tx_hash":"aa","status":10}"#).unwrap();
        assert!(!update.references("aa"));

        let numeric = Bindings::parse(r#"{"tx_hash":12}"#).unwrap();
        assert_eq!(numeric.tx_hash(), None);
    }

    #[test]
    fn bindings_reject_malformed_json_only() {
        assert!(Bindings::parse("not json").is_err());

        let array = Bindings::parse("[1,2]").unwrap();
        assert_eq!(array.tx_hash(), None);
        assert!(!array.references("aa"));

        let null = Bindings::parse("null").unwrap();
        assert_eq!(null.event(), None);
    }

    #[test]
    fn classified_message_flag_only_serialized_when_primary() {
        let message = Message {
            message_index: 1,
            block_index: 2,
            command: "insert".into(),
            category: "sends".into(),
            bindings: "{}".into(),
            timestamp: Some(3),
        };
        let primary = serde_json::to_value(ClassifiedMessage {
            message: message.clone(),
            main_message: true,
        })
        .unwrap();
        assert_eq!(primary["main_message"], json!(true));
        assert_eq!(primary["category"], json!("sends"));

        let secondary = serde_json::to_value(ClassifiedMessage {
            message,
            main_message: false,
        })
        .unwrap();
        assert!(secondary.get("main_message").is_none());
    }

    #[test]
    fn resolution_found_when_confirmed_or_pending() {
        let empty = TxResolution {
            transaction: None,
            messages_all: vec![],
            messages: vec![],
            mempool: vec![],
        };
        assert!(!empty.is_found());

        let confirmed = TxResolution {
            transaction: Some(Record::new()),
            ..empty.clone()
        };
        assert!(confirmed.is_found());
    }
}
