//! Checkout handler

use axum::{Json, extract::State};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::Order;
use crate::orders::CheckoutRequest;
use crate::utils::{AppResponse, AppResult, ok_with_message};

/// Create an order from a checkout payload
///
/// When identity headers are present they override the payload's
/// `user_id` and email; guests check out with neither.
pub async fn create_order(
    State(state): State<ServerState>,
    user: Option<CurrentUser>,
    Json(mut payload): Json<CheckoutRequest>,
) -> AppResult<Json<AppResponse<Order>>> {
    match user {
        Some(user) => {
            payload.user_id = Some(user.user_id);
            payload.customer_email = user.email;
        }
        None => payload.user_id = None,
    }

    let order = state.orders.create_order(payload)?;

    // Fire-and-forget; the order is already committed
    let notifier = state.notifier.clone();
    let notified = order.clone();
    tokio::spawn(async move {
        notifier.order_placed(&notified).await;
    });

    Ok(ok_with_message(order, "Order placed"))
}
