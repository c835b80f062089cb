use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use xcpview_core::Record;

use super::error::AppError;
use super::SharedState;

/// BTC and XCP are not issued through the protocol; their history tables are
/// never queried.
const NATIVE_ASSETS: [&str; 2] = ["BTC", "XCP"];

#[derive(Serialize)]
pub(super) struct AssetResponse {
    asset_row: Record,
    tables: AssetTables,
}

#[derive(Default, Serialize)]
pub(super) struct AssetTables {
    issuances: Vec<Record>,
    destructions: Vec<Record>,
}

pub(super) async fn get_asset(
    State(state): State<SharedState>,
    Path(asset_name): Path<String>,
) -> Result<Json<AssetResponse>, AppError> {
    let asset_row = state
        .store
        .asset(&asset_name)
        .await?
        .ok_or(AppError::NotFound)?;

    let tables = if NATIVE_ASSETS.contains(&asset_name.as_str()) {
        AssetTables::default()
    } else {
        AssetTables {
            issuances: state.store.issuances_by_asset(&asset_name).await?,
            destructions: state.store.destructions_by_asset(&asset_name).await?,
        }
    };

    Ok(Json(AssetResponse { asset_row, tables }))
}
