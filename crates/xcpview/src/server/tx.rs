use axum::extract::{Path, State};
use axum::Json;

use xcpview_core::correlate::resolve_transaction;
use xcpview_core::TxResolution;

use super::error::AppError;
use super::SharedState;

/// Confirmed transactions come back with their block's messages; pending
/// ones with their mempool rows. 404 only when neither exists.
pub(super) async fn get_tx(
    State(state): State<SharedState>,
    Path(tx_hash): Path<String>,
) -> Result<Json<TxResolution>, AppError> {
    let resolution = resolve_transaction(state.store.as_ref(), &tx_hash).await?;
    if !resolution.is_found() {
        return Err(AppError::NotFound);
    }
    Ok(Json(resolution))
}
