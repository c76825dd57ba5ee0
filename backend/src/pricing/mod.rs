//! Pricing
//!
//! Stateless pricing logic for checkout:
//!
//! - [`money`] - Decimal helpers and cart item validation
//! - [`coupon`] - coupon validation and discount computation
//! - [`engine`] - full order draft pricing (subtotal, shipping, coins, total)

pub mod coupon;
pub mod engine;
pub mod money;

pub use coupon::{CouponPricing, evaluate_coupon, normalize_code};
pub use engine::{PricedDraft, price_order};

use thiserror::Error;

/// Free shipping for subtotals strictly above this amount
pub const FREE_SHIPPING_THRESHOLD: f64 = 999.0;

/// Flat shipping fee below the threshold
pub const SHIPPING_FEE: f64 = 99.0;

/// One coin is earned per this many rupees of subtotal
pub const RUPEES_PER_COIN: i64 = 100;

/// Pricing and coupon validation errors
///
/// All are detected before any write; nothing is partially persisted.
#[derive(Debug, Error)]
pub enum PricingError {
    #[error("invalid cart: {0}")]
    InvalidCart(String),

    #[error("coupon not found: {0}")]
    CouponNotFound(String),

    #[error("coupon has expired")]
    CouponExpired,

    #[error("coupon is not active")]
    CouponInactive,

    #[error("order subtotal is below the coupon minimum of {0}")]
    CouponBelowMinimum(f64),

    #[error("coupon usage limit reached")]
    CouponExhausted,
}

impl From<PricingError> for crate::utils::AppError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::CouponNotFound(code) => {
                crate::utils::AppError::not_found(format!("coupon not found: {code}"))
            }
            other => crate::utils::AppError::validation(other.to_string()),
        }
    }
}
