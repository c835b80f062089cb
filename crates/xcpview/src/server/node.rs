use axum::extract::State;
use axum::Json;
use serde::Serialize;

use xcpview_core::types::BlockActivity;
use xcpview_core::MempoolMessage;

use super::error::AppError;
use super::{NodeInfo, SharedState};

// ==============================================================================
// DTOs
// ==============================================================================

#[derive(Serialize)]
pub(super) struct MempoolResponse {
    node: NodeInfo,
    mempool: Vec<MempoolMessage>,
}

#[derive(Serialize)]
pub(super) struct BlocksResponse {
    node: NodeInfo,
    blocks: Vec<BlockActivity>,
}

// ==============================================================================
// Handlers
// ==============================================================================

pub(super) async fn get_mempool(
    State(state): State<SharedState>,
) -> Result<Json<MempoolResponse>, AppError> {
    let mempool = state.store.mempool().await?;
    Ok(Json(MempoolResponse {
        node: state.node.clone(),
        mempool,
    }))
}

/// Latest activity: messages of the most recent blocks.
pub(super) async fn get_blocks(
    State(state): State<SharedState>,
) -> Result<Json<BlocksResponse>, AppError> {
    let blocks = state
        .store
        .latest_block_activity(state.latest_blocks)
        .await?;
    Ok(Json(BlocksResponse {
        node: state.node.clone(),
        blocks,
    }))
}
