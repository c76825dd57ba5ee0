//! Loyalty coin ledger
//!
//! Every balance mutation pairs a ledger append with the profile update in
//! the caller's write transaction, so the ledger-sum invariant
//! (`sum(entries) == profile.fox_coins`) holds after every commit and a
//! partial application is never observable.

use redb::WriteTransaction;
use tracing::warn;

use crate::db::models::{LedgerEntry, LedgerKind, Order, Profile};
use crate::db::{StorageResult, Store};

/// Load a profile, creating it with balance 0 on first sight
pub fn ensure_profile(
    store: &Store,
    txn: &WriteTransaction,
    user_id: &str,
    email: &str,
    now: i64,
) -> StorageResult<Profile> {
    if let Some(profile) = store.get_profile_txn(txn, user_id)? {
        return Ok(profile);
    }
    let profile = Profile::new(user_id, email, now);
    store.put_profile(txn, &profile)?;
    Ok(profile)
}

/// Append a ledger entry and apply its amount to the profile balance
///
/// Callers must have verified the resulting balance is non-negative.
pub fn append_and_apply(
    store: &Store,
    txn: &WriteTransaction,
    profile: &mut Profile,
    amount: i64,
    kind: LedgerKind,
    order_id: Option<&str>,
    description: String,
    now: i64,
) -> StorageResult<()> {
    let seq = store.next_ledger_seq(txn)?;
    let entry = LedgerEntry {
        seq,
        user_id: profile.user_id.clone(),
        amount,
        kind,
        order_id: order_id.map(str::to_string),
        description,
        created_at: now,
    };
    store.append_ledger(txn, &entry)?;

    profile.fox_coins += amount;
    profile.updated_at = now;
    store.put_profile(txn, profile)?;
    Ok(())
}

/// Credit earned coins for a delivered order
///
/// Invoked only from within the `-> delivered` transition, inside the same
/// write transaction that flips the order status. At-most-once: a no-op
/// when `coins_credited` is already set or nothing was earned. The caller
/// persists the mutated order; the flag and the ledger entry therefore
/// commit together or not at all.
pub fn credit_delivery(
    store: &Store,
    txn: &WriteTransaction,
    order: &mut Order,
    now: i64,
) -> StorageResult<()> {
    if order.coins_credited || order.coins_earned <= 0 {
        return Ok(());
    }

    let mut profile = match &order.user_id {
        Some(user_id) => store.get_profile_txn(txn, user_id)?,
        None => None,
    };
    if profile.is_none() {
        profile = store.find_profile_by_email_txn(txn, &order.customer_email)?;
    }
    let Some(mut profile) = profile else {
        // Guest order with no matching profile: nothing to credit to.
        // The flag stays unset so a later profile can still be credited
        // manually if support ever needs to.
        warn!(order_id = %order.id, email = %order.customer_email,
            "No profile found for delivered order, skipping coin credit");
        return Ok(());
    };

    append_and_apply(
        store,
        txn,
        &mut profile,
        order.coins_earned,
        LedgerKind::Earned,
        Some(&order.id),
        format!("Earned {} coins from order {}", order.coins_earned, order.id),
        now,
    )?;

    order.coins_credited = true;
    Ok(())
}

/// Current coin balance for a customer (0 if no profile yet)
pub fn balance(store: &Store, user_id: &str) -> StorageResult<i64> {
    Ok(store.get_profile(user_id)?.map(|p| p.fox_coins).unwrap_or(0))
}

/// Ledger history for a customer, newest first
pub fn history(store: &Store, user_id: &str) -> StorageResult<Vec<LedgerEntry>> {
    store.ledger_for_user(user_id)
}
