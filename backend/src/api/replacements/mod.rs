//! Replacement routes
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/replacements | POST | customer |
//! | /api/replacements | GET | customer |
//! | /api/replacements/eligibility/{order_id} | GET | customer |
//! | /api/admin/replacements | GET | admin |
//! | /api/admin/replacements/{id}/status | PUT | admin |

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route(
            "/api/replacements",
            post(handler::create).get(handler::list_mine),
        )
        .route(
            "/api/replacements/eligibility/{order_id}",
            get(handler::eligibility),
        )
        .route("/api/admin/replacements", get(handler::admin_list))
        .route(
            "/api/admin/replacements/{id}/status",
            put(handler::admin_update_status),
        )
}
