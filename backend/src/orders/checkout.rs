//! Checkout: turn a validated cart into a persisted order
//!
//! Pricing, balance clamping, order insert and the coin redemption debit
//! all happen inside one write transaction. A failed redemption aborts
//! the whole checkout; a committed order and its ledger debit are never
//! observable separately.

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{OrderError, OrderManager};
use crate::db::models::{Order, OrderItem, OrderStatus, PaymentStatus};
use crate::loyalty;
use crate::pricing::{self, PricingError};
use crate::utils::now_millis;

/// Checkout payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CheckoutRequest {
    /// Authenticated customer id; absent for guest checkout
    pub user_id: Option<String>,

    #[validate(length(min = 1, max = 200, message = "name is required"))]
    pub customer_name: String,

    #[validate(email(message = "invalid email address"))]
    pub customer_email: String,

    #[validate(custom(function = validate_phone))]
    pub customer_phone: String,

    #[validate(length(min = 1, max = 500, message = "address is required"))]
    pub shipping_address: String,

    #[validate(length(min = 1, max = 100, message = "city is required"))]
    pub city: String,

    #[validate(length(min = 1, max = 100, message = "state is required"))]
    pub state: String,

    #[validate(custom(function = validate_pincode))]
    pub pincode: String,

    #[validate(length(max = 200))]
    pub landmark: Option<String>,

    pub items: Vec<OrderItem>,

    pub coupon_code: Option<String>,

    #[serde(default)]
    pub coins_to_redeem: i64,

    /// Set by the payment step once the gateway confirmed payment
    #[serde(default)]
    pub payment_confirmed: bool,

    pub payment_method: Option<String>,
}

/// Indian mobile number: exactly 10 digits, starting 6-9
fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let valid = phone.len() == 10
        && phone.starts_with(['6', '7', '8', '9'])
        && phone.chars().all(|c| c.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("phone").with_message("invalid phone number".into()))
    }
}

/// Indian postal code: exactly 6 digits
fn validate_pincode(pincode: &str) -> Result<(), ValidationError> {
    if pincode.len() == 6 && pincode.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("pincode").with_message("invalid pincode".into()))
    }
}

/// Generate an order id: `ORD` + base36 millis + 4 random chars
///
/// Sortable by creation time at the prefix, collision-proofed by the
/// random suffix.
fn generate_order_id(now: i64) -> String {
    let mut millis = now.max(0) as u64;
    let mut encoded = Vec::new();
    const DIGITS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if millis == 0 {
        encoded.push(b'0');
    }
    while millis > 0 {
        encoded.push(DIGITS[(millis % 36) as usize]);
        millis /= 36;
    }
    encoded.reverse();

    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(4)
        .collect::<String>()
        .to_uppercase();

    format!("ORD{}{}", String::from_utf8_lossy(&encoded), suffix)
}

impl OrderManager {
    /// Create an order from a checkout request
    pub fn create_order(&self, request: CheckoutRequest) -> Result<Order, OrderError> {
        request
            .validate()
            .map_err(|e| OrderError::InvalidRequest(e.to_string()))?;

        let now = now_millis();

        // Coupon lookup happens before the write transaction; codes are
        // stored uppercase so normalization is the key
        let applied_coupon = match request.coupon_code.as_deref() {
            Some(raw) => {
                let code = pricing::normalize_code(raw);
                Some(
                    self.store()
                        .get_coupon(&code)?
                        .ok_or(PricingError::CouponNotFound(code))?,
                )
            }
            None => None,
        };

        let txn = self.store().begin_write()?;

        // Redemption needs a profile; guests have balance 0 and any coin
        // request clamps away
        let profile = match &request.user_id {
            Some(user_id) => Some(loyalty::ensure_profile(
                self.store(),
                &txn,
                user_id,
                &request.customer_email,
                now,
            )?),
            None => None,
        };
        let balance = profile.as_ref().map(|p| p.fox_coins).unwrap_or(0);

        let draft = pricing::price_order(
            &request.items,
            applied_coupon.as_ref(),
            request.coins_to_redeem,
            balance,
            now,
        )?;

        // The clamp above already bounds the redemption; this guards the
        // invariant directly at the commit point
        if draft.coins_redeemed > balance {
            return Err(OrderError::InsufficientBalance {
                requested: draft.coins_redeemed,
                available: balance,
            });
        }

        let payment_status = if request.payment_confirmed {
            PaymentStatus::Paid
        } else if request.payment_method.as_deref() == Some("cod") {
            PaymentStatus::Cod
        } else {
            PaymentStatus::Pending
        };

        let order = Order {
            id: generate_order_id(now),
            user_id: request.user_id.clone(),
            customer_name: request.customer_name,
            customer_email: request.customer_email,
            customer_phone: request.customer_phone,
            shipping_address: request.shipping_address,
            city: request.city,
            state: request.state,
            pincode: request.pincode,
            landmark: request.landmark,
            items: request.items,
            subtotal: draft.subtotal,
            shipping: draft.shipping,
            discount_amount: draft.discount_amount,
            coupon_code: draft.coupon_code,
            coins_redeemed: draft.coins_redeemed,
            coins_earned: draft.coins_earned,
            coins_credited: false,
            total: draft.total,
            status: OrderStatus::Pending,
            payment_status,
            payment_method: request.payment_method,
            cancel_reason: None,
            tracking_id: None,
            delivered_at: None,
            created_at: now,
        };

        self.store().put_order(&txn, &order)?;

        if order.coins_redeemed > 0 {
            let mut profile = profile.ok_or_else(|| {
                OrderError::LedgerCommitFailed("redemption without a profile".to_string())
            })?;
            loyalty::append_and_apply(
                self.store(),
                &txn,
                &mut profile,
                -order.coins_redeemed,
                crate::db::models::LedgerKind::Redeemed,
                Some(&order.id),
                format!("Redeemed {} coins on order {}", order.coins_redeemed, order.id),
                now,
            )
            .map_err(|e| OrderError::LedgerCommitFailed(e.to_string()))?;
        }

        txn.commit().map_err(crate::db::StorageError::from)?;

        info!(
            order_id = %order.id,
            total = order.total,
            coins_redeemed = order.coins_redeemed,
            "Order created"
        );
        Ok(order)
    }
}
