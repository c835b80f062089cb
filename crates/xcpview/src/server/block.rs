use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use xcpview_core::{Message, Record};

use super::error::AppError;
use super::SharedState;

#[derive(Serialize)]
pub(super) struct BlockResponse {
    block_row: Record,
    messages: Vec<Message>,
}

pub(super) async fn get_block(
    State(state): State<SharedState>,
    Path(block_index): Path<String>,
) -> Result<Json<BlockResponse>, AppError> {
    // A non-numeric index cannot match any block.
    let Some(block_index) = parse_block_index(&block_index) else {
        return Err(AppError::NotFound);
    };

    let block_row = state
        .store
        .block(block_index)
        .await?
        .ok_or(AppError::NotFound)?;
    let messages = state.store.messages_by_block(block_index).await?;

    Ok(Json(BlockResponse {
        block_row,
        messages,
    }))
}

/// Read a path segment the way SQLite's INTEGER affinity would: any numeric
/// text that converts to an integer without loss, so `700000.0` and `7e5`
/// name block 700000.
fn parse_block_index(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(index) = raw.parse::<i64>() {
        return Some(index);
    }
    let value = raw.parse::<f64>().ok()?;
    // Beyond 2^53 an f64 no longer holds every integer exactly.
    (value.is_finite() && value.fract() == 0.0 && value.abs() <= 9_007_199_254_740_992.0)
        .then_some(value as i64)
}

#[cfg(test)]
mod tests {
    use super::parse_block_index;

    #[test]
    fn block_index_accepts_integral_numeric_text() {
        assert_eq!(parse_block_index("700000"), Some(700_000));
        assert_eq!(parse_block_index("700000.0"), Some(700_000));
        assert_eq!(parse_block_index("7e5"), Some(700_000));
        assert_eq!(parse_block_index("-1"), Some(-1));
    }

    #[test]
    fn block_index_rejects_fractions_and_words() {
        assert_eq!(parse_block_index("700000.5"), None);
        assert_eq!(parse_block_index("not-a-number"), None);
        assert_eq!(parse_block_index("NaN"), None);
        assert_eq!(parse_block_index("inf"), None);
        assert_eq!(parse_block_index(""), None);
    }
}
