//! Money calculation utilities using rust_decimal for precision
//!
//! All pricing arithmetic is done in `Decimal` internally, then converted
//! to `f64` for storage/serialization.

use rust_decimal::prelude::*;

use super::PricingError;
use crate::db::models::OrderItem;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed unit price per item (₹10,00,000)
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per line item
const MAX_QUANTITY: i32 = 9999;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Validate a line item before pricing
pub fn validate_item(item: &OrderItem) -> Result<(), PricingError> {
    if !item.price.is_finite() {
        return Err(PricingError::InvalidCart(format!(
            "price must be a finite number, got {}",
            item.price
        )));
    }
    if item.price < 0.0 {
        return Err(PricingError::InvalidCart(format!(
            "price must be non-negative, got {}",
            item.price
        )));
    }
    if item.price > MAX_PRICE {
        return Err(PricingError::InvalidCart(format!(
            "price exceeds maximum allowed ({}), got {}",
            MAX_PRICE, item.price
        )));
    }
    if item.quantity < 1 {
        return Err(PricingError::InvalidCart(format!(
            "quantity must be at least 1, got {}",
            item.quantity
        )));
    }
    if item.quantity > MAX_QUANTITY {
        return Err(PricingError::InvalidCart(format!(
            "quantity exceeds maximum allowed ({}), got {}",
            MAX_QUANTITY, item.quantity
        )));
    }
    Ok(())
}

/// Sum of `price × quantity` over all items, as Decimal
pub fn subtotal_of(items: &[OrderItem]) -> Decimal {
    items
        .iter()
        .map(|i| to_decimal(i.price) * Decimal::from(i.quantity))
        .sum()
}
