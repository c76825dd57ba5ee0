//! Persisted entity models
//!
//! One file per entity, serde-serialized to JSON for storage:
//!
//! - [`order`] - orders and line items
//! - [`ledger`] - append-only coin ledger entries
//! - [`profile`] - customer profile with denormalized coin balance
//! - [`coupon`] - discount coupons
//! - [`replacement`] - post-delivery replacement requests

pub mod coupon;
pub mod ledger;
pub mod order;
pub mod profile;
pub mod replacement;

pub use coupon::{Coupon, DiscountType};
pub use ledger::{LedgerEntry, LedgerKind};
pub use order::{Order, OrderItem, OrderStatus, PaymentStatus};
pub use profile::Profile;
pub use replacement::{REPLACEMENT_REASONS, ReplacementRequest, ReplacementStatus};
