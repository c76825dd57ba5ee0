//! Order model
//!
//! Prices are snapshotted at order time and never recomputed from the
//! catalog. `total` is derived once at creation:
//! `total = subtotal + shipping - discount_amount - coins_redeemed`.

use serde::{Deserialize, Serialize};

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Terminal states admit no further transitions
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Payment state as reported by the external payment collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Cod,
}

/// Order line item
///
/// `custom_data` carries the opaque custom t-shirt payload (colors, print
/// images, per-gender sizes); the backend never interprets it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: String,
    pub product_name: String,
    pub size: String,
    pub quantity: i32,
    pub price: f64,
    pub image: Option<String>,
    #[serde(default)]
    pub is_custom: bool,
    pub custom_data: Option<serde_json::Value>,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    /// Authenticated customer id, if the order was placed while logged in
    #[serde(default)]
    pub user_id: Option<String>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub shipping_address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub landmark: Option<String>,
    /// Insertion order preserved for display
    pub items: Vec<OrderItem>,
    pub subtotal: f64,
    pub shipping: f64,
    #[serde(default)]
    pub discount_amount: f64,
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub coins_redeemed: i64,
    #[serde(default)]
    pub coins_earned: i64,
    #[serde(default)]
    pub coins_credited: bool,
    pub total: f64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<String>,
    pub cancel_reason: Option<String>,
    pub tracking_id: Option<String>,
    /// Set exactly once, on the transition into `delivered`
    pub delivered_at: Option<i64>,
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Shipped.is_terminal());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Processing).unwrap(),
            "\"processing\""
        );
        assert_eq!(OrderStatus::Shipped.to_string(), "shipped");
    }
}
