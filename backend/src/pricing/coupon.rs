//! Coupon Evaluator
//!
//! Pure validation + pricing of a coupon against an order subtotal.
//! No side effects: `used_count` is checked against `usage_limit` but
//! never incremented here.

use rust_decimal::Decimal;

use super::PricingError;
use super::money::{to_decimal, to_f64};
use crate::db::models::{Coupon, DiscountType};

/// Result of evaluating a coupon against a subtotal
#[derive(Debug, Clone, Default)]
pub struct CouponPricing {
    /// Discount amount taken off the subtotal
    pub discount: f64,
    /// Whether shipping is forced to zero regardless of the subtotal threshold
    pub free_shipping: bool,
}

/// Normalize a submitted code for lookup (codes are stored uppercase)
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Validate a coupon and compute its pricing for the given subtotal
///
/// Rejection order: expired → inactive → below minimum → exhausted.
pub fn evaluate_coupon(
    coupon: &Coupon,
    subtotal: f64,
    now_millis: i64,
) -> Result<CouponPricing, PricingError> {
    if let Some(expires_at) = coupon.expires_at
        && expires_at < now_millis
    {
        return Err(PricingError::CouponExpired);
    }
    if !coupon.is_active {
        return Err(PricingError::CouponInactive);
    }
    if subtotal < coupon.min_order_value {
        return Err(PricingError::CouponBelowMinimum(coupon.min_order_value));
    }
    if let Some(limit) = coupon.usage_limit
        && coupon.used_count >= limit
    {
        return Err(PricingError::CouponExhausted);
    }

    let subtotal_dec = to_decimal(subtotal);
    let value = to_decimal(coupon.discount_value);

    let pricing = match coupon.discount_type {
        DiscountType::Fixed => CouponPricing {
            // A fixed discount never exceeds the subtotal
            discount: to_f64(value.min(subtotal_dec)),
            free_shipping: false,
        },
        DiscountType::Percentage => {
            let mut discount = subtotal_dec * value / Decimal::ONE_HUNDRED;
            if let Some(cap) = coupon.max_discount_amount {
                discount = discount.min(to_decimal(cap));
            }
            CouponPricing {
                discount: to_f64(discount.min(subtotal_dec)),
                free_shipping: false,
            }
        }
        DiscountType::FreeDelivery => CouponPricing {
            discount: 0.0,
            free_shipping: true,
        },
    };

    Ok(pricing)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coupon(discount_type: DiscountType, value: f64) -> Coupon {
        Coupon {
            code: "FOX20".to_string(),
            discount_type,
            discount_value: value,
            min_order_value: 0.0,
            max_discount_amount: None,
            expires_at: None,
            is_active: true,
            usage_limit: None,
            used_count: 0,
            created_at: 0,
        }
    }

    #[test]
    fn percentage_discount_is_capped() {
        // Subtotal ₹1000, 20% with cap ₹150 → ₹150, not ₹200
        let mut c = coupon(DiscountType::Percentage, 20.0);
        c.max_discount_amount = Some(150.0);
        let pricing = evaluate_coupon(&c, 1000.0, 0).unwrap();
        assert_eq!(pricing.discount, 150.0);
        assert!(!pricing.free_shipping);
    }

    #[test]
    fn percentage_discount_without_cap() {
        let c = coupon(DiscountType::Percentage, 20.0);
        let pricing = evaluate_coupon(&c, 1000.0, 0).unwrap();
        assert_eq!(pricing.discount, 200.0);
    }

    #[test]
    fn fixed_discount_never_exceeds_subtotal() {
        let c = coupon(DiscountType::Fixed, 500.0);
        let pricing = evaluate_coupon(&c, 300.0, 0).unwrap();
        assert_eq!(pricing.discount, 300.0);
    }

    #[test]
    fn free_delivery_has_no_discount_amount() {
        let c = coupon(DiscountType::FreeDelivery, 0.0);
        let pricing = evaluate_coupon(&c, 250.0, 0).unwrap();
        assert_eq!(pricing.discount, 0.0);
        assert!(pricing.free_shipping);
    }

    #[test]
    fn rejects_expired() {
        let mut c = coupon(DiscountType::Fixed, 100.0);
        c.expires_at = Some(999);
        assert!(matches!(
            evaluate_coupon(&c, 1000.0, 1000),
            Err(PricingError::CouponExpired)
        ));
        // Not yet expired
        assert!(evaluate_coupon(&c, 1000.0, 998).is_ok());
    }

    #[test]
    fn rejects_inactive() {
        let mut c = coupon(DiscountType::Fixed, 100.0);
        c.is_active = false;
        assert!(matches!(
            evaluate_coupon(&c, 1000.0, 0),
            Err(PricingError::CouponInactive)
        ));
    }

    #[test]
    fn rejects_below_minimum() {
        let mut c = coupon(DiscountType::Fixed, 100.0);
        c.min_order_value = 500.0;
        assert!(matches!(
            evaluate_coupon(&c, 499.0, 0),
            Err(PricingError::CouponBelowMinimum(_))
        ));
        assert!(evaluate_coupon(&c, 500.0, 0).is_ok());
    }

    #[test]
    fn rejects_exhausted() {
        let mut c = coupon(DiscountType::Fixed, 100.0);
        c.usage_limit = Some(10);
        c.used_count = 10;
        assert!(matches!(
            evaluate_coupon(&c, 1000.0, 0),
            Err(PricingError::CouponExhausted)
        ));
        c.used_count = 9;
        assert!(evaluate_coupon(&c, 1000.0, 0).is_ok());
    }

    #[test]
    fn normalizes_codes_to_uppercase() {
        assert_eq!(normalize_code("  fox20 "), "FOX20");
    }
}
