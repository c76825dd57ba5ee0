//! End-to-end order flow over the library API
//!
//! Checkout with coupon and coin redemption, the full status lifecycle,
//! delivery crediting, and the replacement workflow on top of it.

use backend::db::Store;
use backend::db::models::{
    Coupon, DiscountType, LedgerKind, OrderStatus, OrderItem, Profile, ReplacementStatus,
};
use backend::orders::{CheckoutRequest, OrderManager, TransitionParams};
use backend::replacements::{CreateReplacementRequest, ReplacementManager};
use backend::{loyalty, pricing};

fn seed_store() -> Store {
    let store = Store::open_in_memory().unwrap();

    let txn = store.begin_write().unwrap();
    let mut profile = Profile::new("user-1", "asha@example.com", 0);
    profile.fox_coins = 200;
    store.put_profile(&txn, &profile).unwrap();
    let seq = store.next_ledger_seq(&txn).unwrap();
    store
        .append_ledger(
            &txn,
            &backend::db::models::LedgerEntry {
                seq,
                user_id: "user-1".to_string(),
                amount: 200,
                kind: LedgerKind::Earned,
                order_id: None,
                description: "seed".to_string(),
                created_at: 0,
            },
        )
        .unwrap();
    txn.commit().unwrap();

    store
        .upsert_coupon(&Coupon {
            code: "FOX20".to_string(),
            discount_type: DiscountType::Percentage,
            discount_value: 20.0,
            min_order_value: 500.0,
            max_discount_amount: Some(150.0),
            expires_at: None,
            is_active: true,
            usage_limit: None,
            used_count: 0,
            created_at: 0,
        })
        .unwrap();

    store
}

fn checkout_request() -> CheckoutRequest {
    CheckoutRequest {
        user_id: Some("user-1".to_string()),
        customer_name: "Asha Rao".to_string(),
        customer_email: "asha@example.com".to_string(),
        customer_phone: "9876543210".to_string(),
        shipping_address: "12 MG Road".to_string(),
        city: "Bengaluru".to_string(),
        state: "Karnataka".to_string(),
        pincode: "560001".to_string(),
        landmark: Some("Opposite the metro station".to_string()),
        items: vec![OrderItem {
            product_id: "tee-01".to_string(),
            product_name: "Graphic Tee".to_string(),
            size: "L".to_string(),
            quantity: 2,
            price: 600.0,
            image: Some("https://img.example/tee.jpg".to_string()),
            is_custom: false,
            custom_data: None,
        }],
        coupon_code: Some("fox20".to_string()),
        coins_to_redeem: 100,
        payment_confirmed: true,
        payment_method: Some("upi".to_string()),
    }
}

#[test]
fn checkout_to_delivery_to_replacement() {
    let store = seed_store();
    let orders = OrderManager::new(store.clone());
    let replacements = ReplacementManager::new(store.clone());

    // Checkout: 1200 subtotal, free shipping, 20% capped at 150, 100 coins
    let order = orders.create_order(checkout_request()).unwrap();
    assert_eq!(order.subtotal, 1200.0);
    assert_eq!(order.shipping, 0.0);
    assert_eq!(order.discount_amount, 150.0);
    assert_eq!(order.coins_redeemed, 100);
    assert_eq!(order.total, 950.0);
    assert_eq!(order.coins_earned, 12);
    assert_eq!(order.status, OrderStatus::Pending);

    // The redemption debit is already committed
    assert_eq!(loyalty::balance(&store, "user-1").unwrap(), 100);
    assert_eq!(store.ledger_sum("user-1").unwrap(), 100);

    // Walk the lifecycle forward
    for status in [OrderStatus::Confirmed, OrderStatus::Processing] {
        let updated = orders
            .transition(&order.id, status, TransitionParams::default())
            .unwrap();
        assert_eq!(updated.status, status);
    }
    let shipped = orders
        .transition(
            &order.id,
            OrderStatus::Shipped,
            TransitionParams {
                tracking_id: Some("FXT-4471".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(shipped.tracking_id.as_deref(), Some("FXT-4471"));

    // Delivery credits the earned coins in the same commit
    let delivered = orders
        .transition(&order.id, OrderStatus::Delivered, TransitionParams::default())
        .unwrap();
    assert!(delivered.coins_credited);
    assert!(delivered.delivered_at.is_some());
    assert_eq!(loyalty::balance(&store, "user-1").unwrap(), 112);
    assert_eq!(store.ledger_sum("user-1").unwrap(), 112);

    // A terminal order admits no further transitions
    assert!(
        orders
            .transition(&order.id, OrderStatus::Cancelled, TransitionParams {
                reason: Some("changed mind".to_string()),
                ..Default::default()
            })
            .is_err()
    );

    // Replacement: eligible now, then the workflow runs to completion
    assert!(replacements.is_eligible(&order.id).unwrap());
    let request = replacements
        .create(
            "user-1",
            CreateReplacementRequest {
                order_id: order.id.clone(),
                reason: "Size Issue".to_string(),
                description: Some("Need XL instead".to_string()),
                images: vec![],
            },
        )
        .unwrap();
    assert_eq!(request.status, ReplacementStatus::Pending);

    let approved = replacements
        .advance(
            &request.id,
            ReplacementStatus::Approved,
            Some("Pickup scheduled".to_string()),
        )
        .unwrap();
    assert_eq!(approved.status, ReplacementStatus::Approved);

    let completed = replacements
        .advance(&request.id, ReplacementStatus::Completed, None)
        .unwrap();
    assert_eq!(completed.status, ReplacementStatus::Completed);
    assert_eq!(completed.admin_notes.as_deref(), Some("Pickup scheduled"));

    // Still at most one request per order
    assert!(
        replacements
            .create(
                "user-1",
                CreateReplacementRequest {
                    order_id: order.id.clone(),
                    reason: "Other".to_string(),
                    description: None,
                    images: vec![],
                },
            )
            .is_err()
    );
}

#[test]
fn cancellation_does_not_touch_the_ledger() {
    let store = seed_store();
    let orders = OrderManager::new(store.clone());

    let mut request = checkout_request();
    request.coupon_code = None;
    request.coins_to_redeem = 0;
    let order = orders.create_order(request).unwrap();

    orders
        .transition(
            &order.id,
            OrderStatus::Cancelled,
            TransitionParams {
                reason: Some("payment declined".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

    // No earn, no redemption: the seed balance is untouched
    assert_eq!(loyalty::balance(&store, "user-1").unwrap(), 200);
    assert_eq!(store.ledger_sum("user-1").unwrap(), 200);
}

#[test]
fn durability_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("foxtail.redb");

    let order_id = {
        let store = Store::open(&path).unwrap();
        let orders = OrderManager::new(store);
        let mut request = checkout_request();
        request.user_id = None;
        request.coupon_code = None;
        request.coins_to_redeem = 0;
        orders.create_order(request).unwrap().id
    };

    let store = Store::open(&path).unwrap();
    let order = store.get_order(&order_id).unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total, 1200.0);
}

#[test]
fn coupon_preview_matches_checkout_pricing() {
    let store = seed_store();
    let coupon = store.get_coupon("FOX20").unwrap().unwrap();

    let preview = pricing::evaluate_coupon(&coupon, 1200.0, 0).unwrap();
    assert_eq!(preview.discount, 150.0);

    let orders = OrderManager::new(store);
    let mut request = checkout_request();
    request.coins_to_redeem = 0;
    let order = orders.create_order(request).unwrap();
    assert_eq!(order.discount_amount, preview.discount);
}
