//! Order status state machine
//!
//! Transitions are driven by the admin UI, which resubmits on network
//! timeouts: re-requesting the status an order already has is a no-op
//! success, never an error. Everything else outside the transition table
//! fails with `InvalidTransition`.

use tracing::info;

use super::{OrderError, OrderManager};
use crate::db::models::{Order, OrderStatus};
use crate::loyalty;
use crate::utils::now_millis;

/// Status-specific fields captured during a transition
#[derive(Debug, Clone, Default)]
pub struct TransitionParams {
    /// Required (non-empty) when cancelling
    pub reason: Option<String>,
    /// Required (non-empty) when shipping
    pub tracking_id: Option<String>,
}

/// The transition table: no skipping stages, no leaving a terminal state
pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
    use OrderStatus::*;
    matches!(
        (from, to),
        (Pending, Confirmed)
            | (Pending, Cancelled)
            | (Confirmed, Processing)
            | (Confirmed, Cancelled)
            | (Processing, Shipped)
            | (Processing, Cancelled)
            | (Shipped, Delivered)
    )
}

impl OrderManager {
    /// Apply a status transition to an order
    ///
    /// Runs load → validate → mutate → commit inside one write
    /// transaction. The transition into `delivered` sets `delivered_at`
    /// once and credits earned coins in the same transaction; if the
    /// credit fails nothing is applied.
    pub fn transition(
        &self,
        order_id: &str,
        new_status: OrderStatus,
        params: TransitionParams,
    ) -> Result<Order, OrderError> {
        let now = now_millis();
        let txn = self.store().begin_write()?;

        let mut order = self
            .store()
            .get_order_txn(&txn, order_id)?
            .ok_or_else(|| OrderError::NotFound(order_id.to_string()))?;

        // Idempotent retry: same target status is a no-op success.
        // The transaction is dropped (aborted) without writing.
        if order.status == new_status {
            return Ok(order);
        }

        if !is_valid_transition(order.status, new_status) {
            return Err(OrderError::InvalidTransition {
                from: order.status,
                to: new_status,
            });
        }

        match new_status {
            OrderStatus::Cancelled => {
                let reason = params
                    .reason
                    .as_deref()
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .ok_or(OrderError::MissingCancelReason)?;
                order.cancel_reason = Some(reason.to_string());
            }
            OrderStatus::Shipped => {
                let tracking = params
                    .tracking_id
                    .as_deref()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .ok_or(OrderError::MissingTrackingId)?;
                order.tracking_id = Some(tracking.to_string());
            }
            OrderStatus::Delivered => {
                if order.delivered_at.is_none() {
                    order.delivered_at = Some(now);
                }
                loyalty::credit_delivery(self.store(), &txn, &mut order, now)
                    .map_err(|e| OrderError::LedgerCommitFailed(e.to_string()))?;
            }
            _ => {}
        }

        let old_status = order.status;
        order.status = new_status;
        self.store().put_order(&txn, &order)?;
        txn.commit().map_err(crate::db::StorageError::from)?;

        info!(order_id = %order.id, from = %old_status, to = %new_status, "Order status updated");
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Store;
    use crate::db::models::{OrderItem, PaymentStatus};
    use crate::loyalty;

    const ALL_STATUSES: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    fn seed_order(store: &Store, id: &str, status: OrderStatus) -> Order {
        let order = Order {
            id: id.to_string(),
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
                quantity: 1,
                price: 1200.0,
                image: None,
                is_custom: false,
                custom_data: None,
            }],
            subtotal: 1200.0,
            shipping: 0.0,
            discount_amount: 0.0,
            coupon_code: None,
            coins_redeemed: 0,
            coins_earned: 12,
            coins_credited: false,
            total: 1200.0,
            status,
            payment_status: PaymentStatus::Paid,
            payment_method: None,
            cancel_reason: None,
            tracking_id: if matches!(status, OrderStatus::Shipped) {
                Some("TRK1".to_string())
            } else {
                None
            },
            delivered_at: None,
            created_at: now_millis(),
        };
        let txn = store.begin_write().unwrap();
        store.put_order(&txn, &order).unwrap();
        txn.commit().unwrap();
        order
    }

    fn seed_profile(store: &Store, user_id: &str, email: &str) {
        let txn = store.begin_write().unwrap();
        loyalty::ensure_profile(store, &txn, user_id, email, 0).unwrap();
        txn.commit().unwrap();
    }

    fn params_for(status: OrderStatus) -> TransitionParams {
        match status {
            OrderStatus::Cancelled => TransitionParams {
                reason: Some("out of stock".to_string()),
                ..Default::default()
            },
            OrderStatus::Shipped => TransitionParams {
                tracking_id: Some("TRK123".to_string()),
                ..Default::default()
            },
            _ => TransitionParams::default(),
        }
    }

    #[test]
    fn full_transition_matrix() {
        let mut n = 0;
        for from in ALL_STATUSES {
            for to in ALL_STATUSES {
                if from == to {
                    continue;
                }
                let store = Store::open_in_memory().unwrap();
                seed_profile(&store, "user-1", "asha@example.com");
                let manager = OrderManager::new(store);
                let id = format!("ORD-{n}");
                n += 1;
                seed_order(manager.store(), &id, from);

                let result = manager.transition(&id, to, params_for(to));
                if is_valid_transition(from, to) {
                    let updated = result.expect("transition in table must succeed");
                    assert_eq!(updated.status, to);
                } else {
                    assert!(
                        matches!(result, Err(OrderError::InvalidTransition { .. })),
                        "{from} -> {to} must be rejected"
                    );
                }
            }
        }
    }

    #[test]
    fn same_status_retry_is_noop_success() {
        let store = Store::open_in_memory().unwrap();
        let manager = OrderManager::new(store);
        seed_order(manager.store(), "ORD1", OrderStatus::Confirmed);

        let result = manager
            .transition("ORD1", OrderStatus::Confirmed, TransitionParams::default())
            .unwrap();
        assert_eq!(result.status, OrderStatus::Confirmed);
    }

    #[test]
    fn cancel_requires_reason() {
        let store = Store::open_in_memory().unwrap();
        let manager = OrderManager::new(store);
        seed_order(manager.store(), "ORD1", OrderStatus::Pending);

        let err = manager
            .transition("ORD1", OrderStatus::Cancelled, TransitionParams::default())
            .unwrap_err();
        assert!(matches!(err, OrderError::MissingCancelReason));

        // Whitespace-only is still missing
        let err = manager
            .transition(
                "ORD1",
                OrderStatus::Cancelled,
                TransitionParams {
                    reason: Some("   ".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, OrderError::MissingCancelReason));

        let updated = manager
            .transition(
                "ORD1",
                OrderStatus::Cancelled,
                TransitionParams {
                    reason: Some("out of stock".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.cancel_reason.as_deref(), Some("out of stock"));
        assert_eq!(updated.status, OrderStatus::Cancelled);
    }

    #[test]
    fn shipping_requires_tracking_id() {
        let store = Store::open_in_memory().unwrap();
        let manager = OrderManager::new(store);
        seed_order(manager.store(), "ORD1", OrderStatus::Processing);

        let err = manager
            .transition("ORD1", OrderStatus::Shipped, TransitionParams::default())
            .unwrap_err();
        assert!(matches!(err, OrderError::MissingTrackingId));

        let updated = manager
            .transition(
                "ORD1",
                OrderStatus::Shipped,
                TransitionParams {
                    tracking_id: Some("TRK42".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.tracking_id.as_deref(), Some("TRK42"));
    }

    #[test]
    fn failed_transition_leaves_order_untouched() {
        let store = Store::open_in_memory().unwrap();
        let manager = OrderManager::new(store);
        seed_order(manager.store(), "ORD1", OrderStatus::Pending);

        let err = manager
            .transition("ORD1", OrderStatus::Cancelled, TransitionParams::default())
            .unwrap_err();
        assert!(matches!(err, OrderError::MissingCancelReason));

        let order = manager.store().get_order("ORD1").unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.cancel_reason.is_none());
    }

    #[test]
    fn delivery_credits_coins_exactly_once() {
        let store = Store::open_in_memory().unwrap();
        seed_profile(&store, "user-1", "asha@example.com");
        let manager = OrderManager::new(store);
        seed_order(manager.store(), "ORD1", OrderStatus::Shipped);

        let delivered = manager
            .transition("ORD1", OrderStatus::Delivered, TransitionParams::default())
            .unwrap();
        assert!(delivered.coins_credited);
        assert!(delivered.delivered_at.is_some());
        assert_eq!(loyalty::balance(manager.store(), "user-1").unwrap(), 12);

        // Retried delivery is a no-op and must not credit again
        let retried = manager
            .transition("ORD1", OrderStatus::Delivered, TransitionParams::default())
            .unwrap();
        assert_eq!(retried.delivered_at, delivered.delivered_at);
        assert_eq!(loyalty::balance(manager.store(), "user-1").unwrap(), 12);
        assert_eq!(manager.store().ledger_sum("user-1").unwrap(), 12);
    }

    #[test]
    fn delivery_with_zero_earned_credits_nothing() {
        let store = Store::open_in_memory().unwrap();
        seed_profile(&store, "user-1", "asha@example.com");
        let manager = OrderManager::new(store);
        let mut order = seed_order(manager.store(), "ORD1", OrderStatus::Shipped);
        order.coins_earned = 0;
        let txn = manager.store().begin_write().unwrap();
        manager.store().put_order(&txn, &order).unwrap();
        txn.commit().unwrap();

        let delivered = manager
            .transition("ORD1", OrderStatus::Delivered, TransitionParams::default())
            .unwrap();
        assert!(!delivered.coins_credited);
        assert_eq!(loyalty::balance(manager.store(), "user-1").unwrap(), 0);
    }

    #[test]
    fn delivery_without_profile_skips_credit() {
        let store = Store::open_in_memory().unwrap();
        let manager = OrderManager::new(store);
        seed_order(manager.store(), "ORD1", OrderStatus::Shipped);

        let delivered = manager
            .transition("ORD1", OrderStatus::Delivered, TransitionParams::default())
            .unwrap();
        assert_eq!(delivered.status, OrderStatus::Delivered);
        assert!(!delivered.coins_credited);
    }

    #[test]
    fn unknown_order_is_not_found() {
        let store = Store::open_in_memory().unwrap();
        let manager = OrderManager::new(store);
        let err = manager
            .transition("ORD-404", OrderStatus::Confirmed, TransitionParams::default())
            .unwrap_err();
        assert!(matches!(err, OrderError::NotFound(_)));
    }
}
