//! Customer profile model

use serde::{Deserialize, Serialize};

/// Customer profile with the denormalized coin balance
///
/// Created lazily with balance 0 on a customer's first authenticated
/// action. `fox_coins` is only ever mutated together with a ledger entry
/// in the same transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    pub email: String,
    pub fox_coins: i64,
    pub updated_at: i64,
}

impl Profile {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>, now: i64) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            fox_coins: 0,
            updated_at: now,
        }
    }
}
