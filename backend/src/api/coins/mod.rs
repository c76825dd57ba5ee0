//! Loyalty coin routes
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/coins | GET | customer |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/coins", get(handler::my_coins))
}
