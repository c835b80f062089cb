mod address;
mod asset;
mod block;
mod error;
mod node;
mod tx;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use xcpview_core::LedgerStore;

// ==============================================================================
// Application State
// ==============================================================================

/// Versions of the node stack that populates the database. Static
/// configuration, never read from the database.
#[derive(Clone, Serialize)]
pub struct NodeInfo {
    #[serde(rename = "BITCOIN_VERSION")]
    pub bitcoin_version: String,
    #[serde(rename = "COUNTERPARTY_VERSION")]
    pub counterparty_version: String,
}

pub struct AppState {
    pub store: Arc<dyn LedgerStore>,
    pub node: NodeInfo,
    pub latest_blocks: u32,
}

type SharedState = Arc<AppState>;

// ==============================================================================
// Router
// ==============================================================================

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/mempool", get(node::get_mempool))
        .route("/blocks", get(node::get_blocks))
        // Kept for clients of the first release.
        .route("/blocks1", get(node::get_blocks))
        .route("/tx/{tx_hash}", get(tx::get_tx))
        .route("/block/{block_index}", get(block::get_block))
        .route("/address/{address}", get(address::get_address))
        .route("/asset/{asset_name}", get(asset::get_asset))
        .fallback(route_not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

async fn route_not_found() -> error::AppError {
    error::AppError::NotFound
}
