//! Checkout route
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/checkout | POST | optional (guest checkout allowed) |

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/checkout", post(handler::create_order))
}
