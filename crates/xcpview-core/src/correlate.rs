use crate::error::CoreError;
use crate::store::LedgerStore;
use crate::types::{record_i64, Bindings, ClassifiedMessage, Message, TxResolution};

// ==============================================================================
// Primary Effects
// ==============================================================================

/// A `(category, command)` pair counted as the main consequence of a
/// transaction, optionally gated on the bindings' `action`.
#[derive(Debug, Clone, Copy)]
pub struct PrimaryRule {
    pub category: &'static str,
    pub command: &'static str,
    pub action: Option<&'static str>,
}

impl PrimaryRule {
    const fn insert(category: &'static str) -> Self {
        Self {
            category,
            command: "insert",
            action: None,
        }
    }

    fn matches(&self, message: &Message, bindings: &Bindings) -> bool {
        self.category == message.category
            && self.command == message.command
            && self
                .action
                .is_none_or(|action| bindings.action() == Some(action))
    }
}

/// Closing a dispenser has no insert of its own; the refund credit stands in
/// for it.
pub const PRIMARY_RULES: &[PrimaryRule] = &[
    PrimaryRule::insert("issuances"),
    PrimaryRule::insert("destructions"),
    PrimaryRule::insert("sends"),
    PrimaryRule::insert("dispensers"),
    PrimaryRule::insert("dispenses"),
    PrimaryRule::insert("orders"),
    PrimaryRule::insert("cancels"),
    PrimaryRule {
        category: "credits",
        command: "insert",
        action: Some("close dispenser"),
    },
];

pub fn is_primary(message: &Message, bindings: &Bindings) -> bool {
    PRIMARY_RULES
        .iter()
        .any(|rule| rule.matches(message, bindings))
}

// ==============================================================================
// Transaction Resolution
// ==============================================================================

/// A block's messages classified against one transaction hash.
#[derive(Debug, Clone)]
pub struct BlockCorrelation {
    /// Every message of the block, primary effects of the hash flagged.
    pub messages_all: Vec<ClassifiedMessage>,
    /// The messages bound to the hash.
    pub messages: Vec<ClassifiedMessage>,
}

/// Select the messages bound to `tx_hash` and flag its primary effects.
///
/// A message is bound when its bindings carry the hash as `tx_hash` or
/// `event`. Order follows `messages`. Any unparseable bindings fails the
/// whole selection.
pub fn correlate_block(
    messages: Vec<Message>,
    tx_hash: &str,
) -> Result<BlockCorrelation, CoreError> {
    let mut correlation = BlockCorrelation {
        messages_all: Vec::with_capacity(messages.len()),
        messages: Vec::new(),
    };
    for message in messages {
        let bindings =
            Bindings::parse(&message.bindings).map_err(|source| CoreError::InvalidBindings {
                message_index: message.message_index,
                source,
            })?;
        let bound = bindings.references(tx_hash);
        let classified = ClassifiedMessage {
            main_message: bound && is_primary(&message, &bindings),
            message,
        };
        if bound {
            correlation.messages.push(classified.clone());
        }
        correlation.messages_all.push(classified);
    }
    Ok(correlation)
}

/// Resolve a transaction hash against the ledger.
///
/// A confirmed transaction yields its row, every message of its block, and
/// the subset bound to the hash. Otherwise the mempool is consulted. The
/// reads are not wrapped in a snapshot, so a parser committing a block in
/// between can make them disagree.
pub async fn resolve_transaction(
    store: &dyn LedgerStore,
    tx_hash: &str,
) -> Result<TxResolution, CoreError> {
    let Some(transaction) = store.transaction(tx_hash).await? else {
        let mempool = store.mempool_by_tx_hash(tx_hash).await?;
        tracing::debug!(tx_hash, pending = mempool.len(), "transaction not confirmed");
        return Ok(TxResolution {
            transaction: None,
            messages_all: Vec::new(),
            messages: Vec::new(),
            mempool,
        });
    };

    let block_index = record_i64(&transaction, "block_index").ok_or_else(|| {
        CoreError::InvalidRow(format!("transaction {tx_hash} has no integer block_index"))
    })?;

    let block_messages = store.messages_by_block(block_index).await?;
    let BlockCorrelation {
        messages_all,
        messages,
    } = correlate_block(block_messages, tx_hash)?;
    tracing::debug!(
        tx_hash,
        block_index,
        block_messages = messages_all.len(),
        matched = messages.len(),
        "correlated transaction messages"
    );

    Ok(TxResolution {
        transaction: Some(transaction),
        messages_all,
        messages,
        mempool: Vec::new(),
    })
}
