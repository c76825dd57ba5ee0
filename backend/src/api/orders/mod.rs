//! Order routes
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/orders | GET | customer |
//! | /api/orders/{id} | GET | customer (own orders only) |
//! | /api/admin/orders | GET | admin |
//! | /api/admin/orders/{id}/status | PUT | admin |

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/orders", get(handler::list_my_orders))
        .route("/api/orders/{id}", get(handler::get_my_order))
        .route("/api/admin/orders", get(handler::admin_list_orders))
        .route(
            "/api/admin/orders/{id}/status",
            put(handler::admin_update_status),
        )
}
