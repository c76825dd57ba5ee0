//! Coupon routes
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/coupons/validate | POST | none (storefront preview) |
//! | /api/admin/coupons | GET | admin |
//! | /api/admin/coupons | POST | admin |
//! | /api/admin/coupons/{code} | PUT | admin |
//! | /api/admin/coupons/{code} | DELETE | admin |

mod handler;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/coupons/validate", post(handler::validate))
        .route("/api/admin/coupons", get(handler::admin_list))
        .route("/api/admin/coupons", post(handler::admin_create))
        .route("/api/admin/coupons/{code}", put(handler::admin_update))
        .route("/api/admin/coupons/{code}", delete(handler::admin_delete))
}
