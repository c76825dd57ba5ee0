//! Order Pricing Engine
//!
//! Prices a draft order from cart items, an optional (already looked up)
//! coupon and a coin redemption request against the customer's balance.
//!
//! ```text
//! subtotal  = Σ price × quantity
//! shipping  = 0 if subtotal > ₹999 (or free-delivery coupon), else ₹99
//! discount  = coupon evaluator result
//! coins     = clamp(requested, 0 ..= min(balance, subtotal)),
//!             then clamped so the total never goes negative
//! total     = subtotal + shipping - discount - coins
//! ```
//!
//! `coins_earned` is floor(subtotal / 100), computed on the subtotal
//! before discount and shipping, and fixed at creation time.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::money::{subtotal_of, to_decimal, to_f64, validate_item};
use super::{FREE_SHIPPING_THRESHOLD, PricingError, RUPEES_PER_COIN, SHIPPING_FEE, coupon};
use crate::db::models::{Coupon, OrderItem};

/// A fully priced order draft, ready to persist
#[derive(Debug, Clone)]
pub struct PricedDraft {
    pub subtotal: f64,
    pub shipping: f64,
    pub discount_amount: f64,
    pub coupon_code: Option<String>,
    /// Redemption after clamping; may be less than requested
    pub coins_redeemed: i64,
    pub coins_earned: i64,
    pub total: f64,
}

/// Price a draft order
///
/// The coin request is clamped, not rejected: asking for more than
/// `min(balance, subtotal)` silently reduces to the maximum allowed.
/// The commit path re-checks the live balance; this clamp only shapes
/// the draft.
pub fn price_order(
    items: &[OrderItem],
    applied_coupon: Option<&Coupon>,
    coins_requested: i64,
    balance: i64,
    now_millis: i64,
) -> Result<PricedDraft, PricingError> {
    if items.is_empty() {
        return Err(PricingError::InvalidCart("cart is empty".to_string()));
    }
    for item in items {
        validate_item(item)?;
    }

    let subtotal = subtotal_of(items);

    let coupon_pricing = match applied_coupon {
        Some(c) => coupon::evaluate_coupon(c, to_f64(subtotal), now_millis)?,
        None => coupon::CouponPricing::default(),
    };

    let shipping = if coupon_pricing.free_shipping || subtotal > to_decimal(FREE_SHIPPING_THRESHOLD)
    {
        Decimal::ZERO
    } else {
        to_decimal(SHIPPING_FEE)
    };

    // Earned coins come from the undiscounted subtotal, 1 per ₹100
    let coins_earned = (subtotal / Decimal::from(RUPEES_PER_COIN))
        .floor()
        .to_i64()
        .unwrap_or(0);

    // Clamp the redemption: never above the balance, never above the subtotal
    let subtotal_coins = subtotal.floor().to_i64().unwrap_or(0);
    let mut coins = coins_requested.clamp(0, balance.min(subtotal_coins));

    // Discount applies first; coins are then capped by what remains so the
    // total cannot go negative
    let discount = to_decimal(coupon_pricing.discount);
    let remaining = (subtotal + shipping - discount).max(Decimal::ZERO);
    let remaining_coins = remaining.floor().to_i64().unwrap_or(0);
    coins = coins.min(remaining_coins);

    let total = subtotal + shipping - discount - Decimal::from(coins);

    Ok(PricedDraft {
        subtotal: to_f64(subtotal),
        shipping: to_f64(shipping),
        discount_amount: to_f64(discount),
        coupon_code: applied_coupon.map(|c| c.code.clone()),
        coins_redeemed: coins,
        coins_earned,
        total: to_f64(total.max(Decimal::ZERO)),
    })
}
