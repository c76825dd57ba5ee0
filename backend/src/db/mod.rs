//! redb-based storage layer
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `order_id` | `Order` | Orders, one JSON blob per order |
//! | `coin_ledger` | `(user_id, seq)` | `LedgerEntry` | Append-only coin ledger |
//! | `profiles` | `user_id` | `Profile` | Customer profiles (coin balance) |
//! | `profile_email_idx` | `email` | `user_id` | Email lookup for profiles |
//! | `coupons` | `code` (uppercase) | `Coupon` | Discount coupons |
//! | `replacements` | `request_id` | `ReplacementRequest` | Replacement requests |
//! | `replacement_order_idx` | `order_id` | `request_id` | At-most-one-per-order index |
//! | `meta` | `&str` | `u64` | Counters (ledger sequence) |
//!
//! # Atomicity and serialization
//!
//! Every multi-entity mutation (order insert + ledger debit + balance
//! update; delivery transition + ledger credit) happens inside a single
//! write transaction. redb allows one writer at a time, so overlapping
//! checkouts or status transitions on the same order or balance serialize
//! at `begin_write()` and each sees the previous commit's state.

pub mod models;

use models::{Coupon, LedgerEntry, Order, Profile, ReplacementRequest};
use redb::{
    Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction,
};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");
const LEDGER_TABLE: TableDefinition<(&str, u64), &[u8]> = TableDefinition::new("coin_ledger");
const PROFILES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("profiles");
const PROFILE_EMAIL_INDEX: TableDefinition<&str, &str> =
    TableDefinition::new("profile_email_idx");
const COUPONS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("coupons");
const REPLACEMENTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("replacements");
const REPLACEMENT_ORDER_INDEX: TableDefinition<&str, &str> =
    TableDefinition::new("replacement_order_idx");
const META_TABLE: TableDefinition<&str, u64> = TableDefinition::new("meta");

const LEDGER_SEQ_KEY: &str = "ledger_seq";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Storefront storage backed by redb
#[derive(Clone)]
pub struct Store {
    db: Arc<Database>,
}

impl Store {
    /// Open or create the database at the given path
    ///
    /// redb commits with `Durability::Immediate`: once `commit()` returns
    /// the data is persistent, and the file is always in a consistent
    /// state (copy-on-write with atomic pointer swap).
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    /// Create all tables so later read transactions never hit a missing table
    fn init_tables(&self) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(LEDGER_TABLE)?;
            let _ = write_txn.open_table(PROFILES_TABLE)?;
            let _ = write_txn.open_table(PROFILE_EMAIL_INDEX)?;
            let _ = write_txn.open_table(COUPONS_TABLE)?;
            let _ = write_txn.open_table(REPLACEMENTS_TABLE)?;
            let _ = write_txn.open_table(REPLACEMENT_ORDER_INDEX)?;

            let mut meta = write_txn.open_table(META_TABLE)?;
            if meta.get(LEDGER_SEQ_KEY)?.is_none() {
                meta.insert(LEDGER_SEQ_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Order Operations ==========

    /// Insert or update an order (within a transaction)
    pub fn put_order(&self, txn: &WriteTransaction, order: &Order) -> StorageResult<()> {
        let mut table = txn.open_table(ORDERS_TABLE)?;
        let value = serde_json::to_vec(order)?;
        table.insert(order.id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Load an order inside a write transaction (sees pending writes)
    pub fn get_order_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<Option<Order>> {
        let table = txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Load an order (read-only)
    pub fn get_order(&self, order_id: &str) -> StorageResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// All orders, newest first
    pub fn list_orders(&self) -> StorageResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        let mut orders = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let order: Order = serde_json::from_slice(value.value())?;
            orders.push(order);
        }

        orders.sort_by_key(|o| std::cmp::Reverse(o.created_at));
        Ok(orders)
    }

    /// A customer's orders (matched by email), newest first
    pub fn orders_by_email(&self, email: &str) -> StorageResult<Vec<Order>> {
        let mut orders = self.list_orders()?;
        orders.retain(|o| o.customer_email.eq_ignore_ascii_case(email));
        Ok(orders)
    }

    // ========== Ledger Operations ==========

    /// Allocate the next ledger sequence number (within a transaction)
    pub fn next_ledger_seq(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        let mut meta = txn.open_table(META_TABLE)?;
        let current = meta.get(LEDGER_SEQ_KEY)?.map(|g| g.value()).unwrap_or(0);
        let next = current + 1;
        meta.insert(LEDGER_SEQ_KEY, next)?;
        Ok(next)
    }

    /// Append a ledger entry (within a transaction)
    ///
    /// The ledger is append-only; nothing ever updates or removes entries.
    pub fn append_ledger(&self, txn: &WriteTransaction, entry: &LedgerEntry) -> StorageResult<()> {
        let mut table = txn.open_table(LEDGER_TABLE)?;
        let key = (entry.user_id.as_str(), entry.seq);
        let value = serde_json::to_vec(entry)?;
        table.insert(key, value.as_slice())?;
        Ok(())
    }

    /// All ledger entries for a customer, newest first
    pub fn ledger_for_user(&self, user_id: &str) -> StorageResult<Vec<LedgerEntry>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(LEDGER_TABLE)?;

        let mut entries = Vec::new();
        let range_start = (user_id, 0u64);
        let range_end = (user_id, u64::MAX);

        for result in table.range(range_start..=range_end)? {
            let (_key, value) = result?;
            let entry: LedgerEntry = serde_json::from_slice(value.value())?;
            entries.push(entry);
        }

        entries.sort_by_key(|e| std::cmp::Reverse(e.seq));
        Ok(entries)
    }

    /// Sum of all ledger amounts for a customer
    ///
    /// Must always equal the profile's `fox_coins`; used by tests and
    /// consistency checks.
    pub fn ledger_sum(&self, user_id: &str) -> StorageResult<i64> {
        Ok(self.ledger_for_user(user_id)?.iter().map(|e| e.amount).sum())
    }

    // ========== Profile Operations ==========

    /// Insert or update a profile and its email index (within a transaction)
    pub fn put_profile(&self, txn: &WriteTransaction, profile: &Profile) -> StorageResult<()> {
        let mut table = txn.open_table(PROFILES_TABLE)?;
        let value = serde_json::to_vec(profile)?;
        table.insert(profile.user_id.as_str(), value.as_slice())?;
        drop(table);

        let mut index = txn.open_table(PROFILE_EMAIL_INDEX)?;
        let email_key = profile.email.to_lowercase();
        index.insert(email_key.as_str(), profile.user_id.as_str())?;
        Ok(())
    }

    /// Load a profile inside a write transaction
    pub fn get_profile_txn(
        &self,
        txn: &WriteTransaction,
        user_id: &str,
    ) -> StorageResult<Option<Profile>> {
        let table = txn.open_table(PROFILES_TABLE)?;
        match table.get(user_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Load a profile (read-only)
    pub fn get_profile(&self, user_id: &str) -> StorageResult<Option<Profile>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PROFILES_TABLE)?;
        match table.get(user_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Resolve a profile by email inside a write transaction
    ///
    /// Delivery crediting matches orders to profiles by customer email
    /// when the order predates authenticated checkout.
    pub fn find_profile_by_email_txn(
        &self,
        txn: &WriteTransaction,
        email: &str,
    ) -> StorageResult<Option<Profile>> {
        let index = txn.open_table(PROFILE_EMAIL_INDEX)?;
        let email_key = email.to_lowercase();
        let user_id = match index.get(email_key.as_str())? {
            Some(guard) => guard.value().to_string(),
            None => return Ok(None),
        };
        drop(index);
        self.get_profile_txn(txn, &user_id)
    }

    // ========== Coupon Operations ==========

    /// Insert or update a coupon (own transaction)
    pub fn upsert_coupon(&self, coupon: &Coupon) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(COUPONS_TABLE)?;
            let value = serde_json::to_vec(coupon)?;
            table.insert(coupon.code.as_str(), value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Load a coupon by (already normalized) code
    pub fn get_coupon(&self, code: &str) -> StorageResult<Option<Coupon>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(COUPONS_TABLE)?;
        match table.get(code)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// All coupons, newest first
    pub fn list_coupons(&self) -> StorageResult<Vec<Coupon>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(COUPONS_TABLE)?;

        let mut coupons = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let coupon: Coupon = serde_json::from_slice(value.value())?;
            coupons.push(coupon);
        }

        coupons.sort_by_key(|c| std::cmp::Reverse(c.created_at));
        Ok(coupons)
    }

    /// Delete a coupon; returns whether it existed
    pub fn delete_coupon(&self, code: &str) -> StorageResult<bool> {
        let txn = self.db.begin_write()?;
        let existed = {
            let mut table = txn.open_table(COUPONS_TABLE)?;
            table.remove(code)?.is_some()
        };
        txn.commit()?;
        Ok(existed)
    }

    // ========== Replacement Operations ==========

    /// Insert a replacement request and its order index (within a transaction)
    ///
    /// Callers must check `replacement_for_order_txn` first, in the same
    /// transaction, to enforce at-most-one request per order.
    pub fn insert_replacement(
        &self,
        txn: &WriteTransaction,
        request: &ReplacementRequest,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(REPLACEMENTS_TABLE)?;
        let value = serde_json::to_vec(request)?;
        table.insert(request.id.as_str(), value.as_slice())?;
        drop(table);

        let mut index = txn.open_table(REPLACEMENT_ORDER_INDEX)?;
        index.insert(request.order_id.as_str(), request.id.as_str())?;
        Ok(())
    }

    /// Update an existing replacement request (within a transaction)
    pub fn put_replacement(
        &self,
        txn: &WriteTransaction,
        request: &ReplacementRequest,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(REPLACEMENTS_TABLE)?;
        let value = serde_json::to_vec(request)?;
        table.insert(request.id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Look up the request bound to an order inside a write transaction
    pub fn replacement_for_order_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<Option<ReplacementRequest>> {
        let index = txn.open_table(REPLACEMENT_ORDER_INDEX)?;
        let request_id = match index.get(order_id)? {
            Some(guard) => guard.value().to_string(),
            None => return Ok(None),
        };
        drop(index);

        let table = txn.open_table(REPLACEMENTS_TABLE)?;
        match table.get(request_id.as_str())? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Look up the request bound to an order (read-only)
    pub fn replacement_for_order(&self, order_id: &str) -> StorageResult<Option<ReplacementRequest>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(REPLACEMENT_ORDER_INDEX)?;
        let request_id = match index.get(order_id)? {
            Some(guard) => guard.value().to_string(),
            None => return Ok(None),
        };
        drop(index);

        let table = read_txn.open_table(REPLACEMENTS_TABLE)?;
        match table.get(request_id.as_str())? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Load a replacement request by id
    pub fn get_replacement(&self, request_id: &str) -> StorageResult<Option<ReplacementRequest>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(REPLACEMENTS_TABLE)?;
        match table.get(request_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Load a replacement request inside a write transaction
    pub fn get_replacement_txn(
        &self,
        txn: &WriteTransaction,
        request_id: &str,
    ) -> StorageResult<Option<ReplacementRequest>> {
        let table = txn.open_table(REPLACEMENTS_TABLE)?;
        match table.get(request_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// All replacement requests, newest first
    pub fn list_replacements(&self) -> StorageResult<Vec<ReplacementRequest>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(REPLACEMENTS_TABLE)?;

        let mut requests = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let request: ReplacementRequest = serde_json::from_slice(value.value())?;
            requests.push(request);
        }

        requests.sort_by_key(|r| std::cmp::Reverse(r.created_at));
        Ok(requests)
    }

    /// A customer's replacement requests, newest first
    pub fn replacements_for_user(&self, user_id: &str) -> StorageResult<Vec<ReplacementRequest>> {
        let mut requests = self.list_replacements()?;
        requests.retain(|r| r.user_id == user_id);
        Ok(requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{LedgerKind, OrderStatus, PaymentStatus};

    fn sample_order(id: &str) -> Order {
        Order {
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
            items: vec![models::OrderItem {
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
            discount_amount: 0.0,
            coupon_code: None,
            coins_redeemed: 0,
            coins_earned: 9,
            coins_credited: false,
            total: 1097.0,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Paid,
            payment_method: None,
            cancel_reason: None,
            tracking_id: None,
            delivered_at: None,
            created_at: 1_700_000_000_000,
        }
    }

    #[test]
    fn order_round_trip() {
        let store = Store::open_in_memory().unwrap();

        let txn = store.begin_write().unwrap();
        store.put_order(&txn, &sample_order("ORD1")).unwrap();
        txn.commit().unwrap();

        let loaded = store.get_order("ORD1").unwrap().unwrap();
        assert_eq!(loaded.customer_email, "asha@example.com");
        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.status, OrderStatus::Pending);

        assert!(store.get_order("ORD-missing").unwrap().is_none());
    }

    #[test]
    fn orders_by_email_is_case_insensitive() {
        let store = Store::open_in_memory().unwrap();

        let txn = store.begin_write().unwrap();
        let mut a = sample_order("ORD1");
        a.created_at = 100;
        let mut b = sample_order("ORD2");
        b.created_at = 200;
        let mut other = sample_order("ORD3");
        other.customer_email = "someone@else.com".to_string();
        store.put_order(&txn, &a).unwrap();
        store.put_order(&txn, &b).unwrap();
        store.put_order(&txn, &other).unwrap();
        txn.commit().unwrap();

        let orders = store.orders_by_email("ASHA@example.com").unwrap();
        assert_eq!(orders.len(), 2);
        // Newest first
        assert_eq!(orders[0].id, "ORD2");
    }

    #[test]
    fn ledger_range_scan_isolates_users() {
        let store = Store::open_in_memory().unwrap();

        let txn = store.begin_write().unwrap();
        for (user, amount) in [("user-1", 10), ("user-2", 5), ("user-1", -3)] {
            let seq = store.next_ledger_seq(&txn).unwrap();
            store
                .append_ledger(
                    &txn,
                    &LedgerEntry {
                        seq,
                        user_id: user.to_string(),
                        amount,
                        kind: if amount > 0 {
                            LedgerKind::Earned
                        } else {
                            LedgerKind::Redeemed
                        },
                        order_id: None,
                        description: "test".to_string(),
                        created_at: 0,
                    },
                )
                .unwrap();
        }
        txn.commit().unwrap();

        assert_eq!(store.ledger_for_user("user-1").unwrap().len(), 2);
        assert_eq!(store.ledger_sum("user-1").unwrap(), 7);
        assert_eq!(store.ledger_sum("user-2").unwrap(), 5);
        assert_eq!(store.ledger_sum("user-3").unwrap(), 0);
    }

    #[test]
    fn profile_email_index_resolves() {
        let store = Store::open_in_memory().unwrap();

        let txn = store.begin_write().unwrap();
        store
            .put_profile(&txn, &Profile::new("user-1", "Asha@Example.com", 0))
            .unwrap();
        let found = store
            .find_profile_by_email_txn(&txn, "asha@example.com")
            .unwrap();
        assert_eq!(found.unwrap().user_id, "user-1");
        txn.commit().unwrap();
    }
}
