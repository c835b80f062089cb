use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use xcpview_core::Record;

use super::error::AppError;
use super::SharedState;

#[derive(Serialize)]
pub(super) struct AddressResponse {
    tables: AddressTables,
}

#[derive(Serialize)]
pub(super) struct AddressTables {
    balances: Vec<Record>,
    broadcasts: Vec<Record>,
}

/// Always 200: an address with no rows is just empty.
pub(super) async fn get_address(
    State(state): State<SharedState>,
    Path(address): Path<String>,
) -> Result<Json<AddressResponse>, AppError> {
    let balances = state.store.balances_by_address(&address).await?;
    let broadcasts = state.store.broadcasts_by_address(&address).await?;
    Ok(Json(AddressResponse {
        tables: AddressTables {
            balances,
            broadcasts,
        },
    }))
}
