//! Order lifecycle
//!
//! Owns order creation (checkout) and the status state machine:
//!
//! ```text
//! pending    -> confirmed | cancelled
//! confirmed  -> processing | cancelled
//! processing -> shipped | cancelled
//! shipped    -> delivered
//! delivered  -> (terminal, credits earned coins)
//! cancelled  -> (terminal)
//! ```
//!
//! Every mutation runs inside one redb write transaction: the status
//! write, any captured fields, and the coin ledger side effects commit
//! together or not at all.

pub mod checkout;
pub mod error;
pub mod lifecycle;

pub use checkout::CheckoutRequest;
pub use error::OrderError;
pub use lifecycle::{TransitionParams, is_valid_transition};

use crate::db::Store;

/// Order lifecycle manager
///
/// Cheap to clone; all state lives in the store.
#[derive(Clone)]
pub struct OrderManager {
    store: Store,
}

impl OrderManager {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub(crate) fn store(&self) -> &Store {
        &self.store
    }
}
