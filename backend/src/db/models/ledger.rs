//! Coin ledger entry model
//!
//! The ledger is append-only: entries are immutable once written, and for
//! any customer the sum of entry amounts must equal the profile balance.

use serde::{Deserialize, Serialize};

/// Kind of balance mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerKind {
    Earned,
    Redeemed,
    Refund,
}

/// One coin balance change
///
/// `amount` is signed: positive for earn/refund, negative for redemption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Global sequence number, allocated at append time
    pub seq: u64,
    pub user_id: String,
    pub amount: i64,
    pub kind: LedgerKind,
    pub order_id: Option<String>,
    pub description: String,
    pub created_at: i64,
}
