//! Coupon model

use serde::{Deserialize, Serialize};

/// How a coupon discounts an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// Flat amount off the subtotal
    Fixed,
    /// Percentage of the subtotal, optionally capped
    Percentage,
    /// No discount amount; shipping is forced to zero
    FreeDelivery,
}

/// Coupon entity
///
/// Codes are case-insensitive and stored uppercase. `used_count` is
/// advisory: the evaluator checks it against `usage_limit` but the
/// checkout path does not increment it (see DESIGN.md).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    #[serde(default)]
    pub min_order_value: f64,
    /// Cap on the computed discount; only meaningful for percentage coupons
    pub max_discount_amount: Option<f64>,
    pub expires_at: Option<i64>,
    pub is_active: bool,
    pub usage_limit: Option<u32>,
    #[serde(default)]
    pub used_count: u32,
    pub created_at: i64,
}
