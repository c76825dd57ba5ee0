//! Order confirmation notifications
//!
//! Fire-and-forget: notifications are spawned after the checkout
//! transaction commits and never affect the request outcome. Failures
//! are logged and dropped.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::db::models::Order;

/// Order event sink
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn order_placed(&self, order: &Order);
}

/// Posts an order summary to the configured email endpoint
pub struct EmailNotifier {
    client: reqwest::Client,
    endpoint: String,
}

impl EmailNotifier {
    pub fn new(endpoint: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self { client, endpoint }
    }
}

/// Build the order-placed payload: the full priced order plus the event name
fn order_placed_payload(order: &Order) -> serde_json::Value {
    json!({
        "event": "order_placed",
        "order": order,
    })
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn order_placed(&self, order: &Order) {
        let payload = order_placed_payload(order);

        match self.client.post(&self.endpoint).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(order_id = %order.id, "Order confirmation email dispatched");
            }
            Ok(response) => {
                warn!(order_id = %order.id, status = %response.status(),
                    "Order confirmation email rejected");
            }
            Err(e) => {
                warn!(order_id = %order.id, error = %e,
                    "Order confirmation email failed");
            }
        }
    }
}

/// Drops all notifications; used when no endpoint is configured and in tests
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn order_placed(&self, order: &Order) {
        debug!(order_id = %order.id, "Notification skipped, no endpoint configured");
    }
}

/// Pick a notifier from the optional endpoint configuration
pub fn from_endpoint(endpoint: Option<String>) -> Arc<dyn Notifier> {
    match endpoint {
        Some(url) if !url.trim().is_empty() => Arc::new(EmailNotifier::new(url)),
        _ => Arc::new(NoopNotifier),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{OrderItem, OrderStatus, PaymentStatus};

    #[test]
    fn payload_carries_the_full_priced_order() {
        let order = Order {
            id: "ORDTEST1".to_string(),
            user_id: Some("user-1".to_string()),
            customer_name: "Asha Rao".to_string(),
            customer_email: "asha@example.com".to_string(),
            customer_phone: "9876543210".to_string(),
            shipping_address: "12 MG Road".to_string(),
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            pincode: "560001".to_string(),
            landmark: None,
            items: vec![OrderItem {
                product_id: "p1".to_string(),
                product_name: "Graphic Tee".to_string(),
                size: "M".to_string(),
                quantity: 2,
                price: 499.0,
                image: None,
                is_custom: false,
                custom_data: None,
            }],
            subtotal: 998.0,
            shipping: 99.0,
            discount_amount: 100.0,
            coupon_code: Some("SAVE100".to_string()),
            coins_redeemed: 50,
            coins_earned: 9,
            coins_credited: false,
            total: 947.0,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Paid,
            payment_method: None,
            cancel_reason: None,
            tracking_id: None,
            delivered_at: None,
            created_at: 1_700_000_000_000,
        };

        let payload = order_placed_payload(&order);
        assert_eq!(payload["event"], "order_placed");
        assert_eq!(payload["order"]["id"], "ORDTEST1");
        assert_eq!(payload["order"]["total"], 947.0);
        assert_eq!(payload["order"]["coupon_code"], "SAVE100");
        assert_eq!(payload["order"]["coins_redeemed"], 50);
        // Line items come through in full, not as a count
        assert_eq!(payload["order"]["items"][0]["product_name"], "Graphic Tee");
        assert_eq!(payload["order"]["items"][0]["quantity"], 2);
    }
}
