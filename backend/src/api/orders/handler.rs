//! Order handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::auth::{AdminUser, CurrentUser};
use crate::core::ServerState;
use crate::db::models::{Order, OrderStatus};
use crate::orders::TransitionParams;
use crate::utils::validation::{MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text};
use crate::utils::{AppError, AppResponse, AppResult, ok};

/// List the calling customer's orders, newest first
pub async fn list_my_orders(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<Vec<Order>>>> {
    let orders = state
        .store
        .orders_by_email(&user.email)
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(ok(orders))
}

/// Get one of the calling customer's orders
///
/// Orders belonging to someone else read as not found, so order ids
/// cannot be probed.
pub async fn get_my_order(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Order>>> {
    let order = state
        .store
        .get_order(&id)
        .map_err(|e| AppError::database(e.to_string()))?
        .filter(|o| {
            o.customer_email.eq_ignore_ascii_case(&user.email)
                || o.user_id.as_deref() == Some(user.user_id.as_str())
        })
        .ok_or_else(|| AppError::not_found(format!("order not found: {id}")))?;
    Ok(ok(order))
}

/// List all orders (admin)
pub async fn admin_list_orders(
    State(state): State<ServerState>,
    _admin: AdminUser,
) -> AppResult<Json<AppResponse<Vec<Order>>>> {
    let orders = state
        .store
        .list_orders()
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(ok(orders))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
    pub reason: Option<String>,
    pub tracking_id: Option<String>,
}

/// Apply a status transition (admin)
pub async fn admin_update_status(
    State(state): State<ServerState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<AppResponse<Order>>> {
    validate_optional_text(&payload.reason, "reason", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.tracking_id, "tracking_id", MAX_SHORT_TEXT_LEN)?;

    let order = state.orders.transition(
        &id,
        payload.status,
        TransitionParams {
            reason: payload.reason,
            tracking_id: payload.tracking_id,
        },
    )?;
    Ok(ok(order))
}
