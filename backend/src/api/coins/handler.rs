//! Loyalty coin handlers

use axum::{Json, extract::State};
use serde::Serialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::LedgerEntry;
use crate::loyalty;
use crate::utils::{AppError, AppResponse, AppResult, ok};

#[derive(Debug, Serialize)]
pub struct CoinsResponse {
    pub balance: i64,
    /// Ledger history, newest first
    pub transactions: Vec<LedgerEntry>,
}

/// Current balance and full ledger history for the calling customer
pub async fn my_coins(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<CoinsResponse>>> {
    let balance = loyalty::balance(&state.store, &user.user_id)
        .map_err(|e| AppError::database(e.to_string()))?;
    let transactions = loyalty::history(&state.store, &user.user_id)
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(ok(CoinsResponse {
        balance,
        transactions,
    }))
}
