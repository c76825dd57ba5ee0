//! Foxtail Fashions order backend
//!
//! Order processing service for the Foxtail Fashions storefront:
//! checkout, the order status lifecycle, a loyalty coin ledger, coupon
//! discounts and a post-delivery replacement workflow.
//!
//! # Module structure
//!
//! ```text
//! backend/src/
//! ├── core/          # configuration, shared state, server startup
//! ├── auth/          # request identity extractors
//! ├── api/           # HTTP routes and handlers
//! ├── db/            # redb storage layer and data models
//! ├── pricing/       # subtotal, shipping, coupon and coin pricing
//! ├── orders/        # checkout and the status state machine
//! ├── loyalty/       # coin ledger and balance
//! ├── replacements/  # post-delivery replacement workflow
//! ├── notify/        # order confirmation notifications
//! └── utils/         # errors, logging, time, validation
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod loyalty;
pub mod notify;
pub mod orders;
pub mod pricing;
pub mod replacements;
pub mod utils;

// Re-export public types
pub use auth::{AdminUser, CurrentUser};
pub use core::{Config, Server, ServerState};
pub use db::Store;
pub use orders::{CheckoutRequest, OrderManager, TransitionParams};
pub use replacements::ReplacementManager;
pub use utils::{AppError, AppResponse, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Load .env and initialize logging
pub fn setup_environment() {
    dotenv::dotenv().ok();
    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());
}
