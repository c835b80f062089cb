#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("database query failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid bindings on message {message_index}: {source}")]
    InvalidBindings {
        message_index: i64,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid row: {0}")]
    InvalidRow(String),
}
