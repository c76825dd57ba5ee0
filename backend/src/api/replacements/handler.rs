//! Replacement handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use crate::auth::{AdminUser, CurrentUser};
use crate::core::ServerState;
use crate::db::models::{ReplacementRequest, ReplacementStatus};
use crate::replacements::{CreateReplacementRequest, ReplacementError};
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};

/// File a replacement request for one of the caller's delivered orders
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CreateReplacementRequest>,
) -> AppResult<Json<AppResponse<ReplacementRequest>>> {
    // The order must belong to the caller before eligibility is even checked
    state
        .store
        .get_order(&payload.order_id)
        .map_err(|e| AppError::database(e.to_string()))?
        .filter(|o| {
            o.customer_email.eq_ignore_ascii_case(&user.email)
                || o.user_id.as_deref() == Some(user.user_id.as_str())
        })
        .ok_or_else(|| AppError::not_found(format!("order not found: {}", payload.order_id)))?;

    let replacement = state
        .replacements
        .create(&user.user_id, payload)
        .map_err(AppError::from)?;

    Ok(ok_with_message(replacement, "Replacement request submitted"))
}

/// The caller's replacement requests, newest first
pub async fn list_mine(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<Vec<ReplacementRequest>>>> {
    let requests = state
        .store
        .replacements_for_user(&user.user_id)
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(ok(requests))
}

#[derive(Debug, Serialize)]
pub struct EligibilityResponse {
    pub order_id: String,
    pub eligible: bool,
}

/// Whether a replacement can currently be requested for an order
pub async fn eligibility(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(order_id): Path<String>,
) -> AppResult<Json<AppResponse<EligibilityResponse>>> {
    state
        .store
        .get_order(&order_id)
        .map_err(|e| AppError::database(e.to_string()))?
        .filter(|o| {
            o.customer_email.eq_ignore_ascii_case(&user.email)
                || o.user_id.as_deref() == Some(user.user_id.as_str())
        })
        .ok_or_else(|| AppError::not_found(format!("order not found: {order_id}")))?;

    let eligible = state
        .replacements
        .is_eligible(&order_id)
        .map_err(AppError::from)?;
    Ok(ok(EligibilityResponse { order_id, eligible }))
}

/// All replacement requests (admin)
pub async fn admin_list(
    State(state): State<ServerState>,
    _admin: AdminUser,
) -> AppResult<Json<AppResponse<Vec<ReplacementRequest>>>> {
    let requests = state
        .store
        .list_replacements()
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(ok(requests))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ReplacementStatus,
    pub admin_notes: Option<String>,
}

/// Advance a request through the workflow (admin)
pub async fn admin_update_status(
    State(state): State<ServerState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<AppResponse<ReplacementRequest>>> {
    let replacement = state
        .replacements
        .advance(&id, payload.status, payload.admin_notes)
        .map_err(AppError::from)?;
    Ok(ok(replacement))
}
