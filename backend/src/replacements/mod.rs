//! Post-delivery replacement workflow
//!
//! Customers can request a replacement for a delivered order within a
//! 7-day window, at most once per order. Requests move through:
//!
//! ```text
//! pending  -> approved | rejected
//! approved -> completed
//! ```
//!
//! `rejected` and `completed` are terminal. No transition ever touches
//! the order itself.

use serde::Deserialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::db::models::{
    Order, OrderStatus, REPLACEMENT_REASONS, ReplacementRequest, ReplacementStatus,
};
use crate::db::{StorageError, Store};
use crate::utils::validation::{MAX_NOTE_LEN, MAX_URL_LEN, validate_optional_text};
use crate::utils::{AppError, days_since, now_millis};

/// Days after delivery during which a replacement can be requested
pub const REPLACEMENT_WINDOW_DAYS: i64 = 7;

/// Maximum number of evidence images per request
pub const MAX_IMAGES: usize = 3;

/// Replacement workflow errors
#[derive(Debug, Error)]
pub enum ReplacementError {
    #[error("order not found: {0}")]
    OrderNotFound(String),

    #[error("replacement request not found: {0}")]
    NotFound(String),

    #[error("order is not delivered")]
    OrderNotDelivered,

    #[error("replacement window of {REPLACEMENT_WINDOW_DAYS} days has expired")]
    WindowExpired,

    #[error("a replacement request already exists for this order")]
    DuplicateRequest,

    #[error("invalid replacement reason: {0}")]
    InvalidReason(String),

    #[error("at most {MAX_IMAGES} images are allowed")]
    TooManyImages,

    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: ReplacementStatus,
        to: ReplacementStatus,
    },

    #[error(transparent)]
    Validation(#[from] AppError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<ReplacementError> for AppError {
    fn from(err: ReplacementError) -> Self {
        match err {
            ReplacementError::OrderNotFound(id) => {
                AppError::not_found(format!("order not found: {id}"))
            }
            ReplacementError::NotFound(id) => {
                AppError::not_found(format!("replacement request not found: {id}"))
            }
            ReplacementError::DuplicateRequest => AppError::conflict(err.to_string()),
            ReplacementError::InvalidReason(_) | ReplacementError::TooManyImages => {
                AppError::validation(err.to_string())
            }
            ReplacementError::OrderNotDelivered
            | ReplacementError::WindowExpired
            | ReplacementError::InvalidTransition { .. } => AppError::business_rule(err.to_string()),
            ReplacementError::Validation(e) => e,
            ReplacementError::Storage(e) => AppError::database(e.to_string()),
        }
    }
}

/// Replacement request payload
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReplacementRequest {
    pub order_id: String,
    pub reason: String,
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// The replacement transition table
pub fn is_valid_transition(from: ReplacementStatus, to: ReplacementStatus) -> bool {
    use ReplacementStatus::*;
    matches!(
        (from, to),
        (Pending, Approved) | (Pending, Rejected) | (Approved, Completed)
    )
}

/// Replacement workflow manager
#[derive(Clone)]
pub struct ReplacementManager {
    store: Store,
}

impl ReplacementManager {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub(crate) fn store(&self) -> &Store {
        &self.store
    }

    /// File a replacement request for a delivered order
    ///
    /// The eligibility checks and the insert run in one write transaction,
    /// so two concurrent requests for the same order cannot both pass the
    /// duplicate check.
    pub fn create(
        &self,
        user_id: &str,
        request: CreateReplacementRequest,
    ) -> Result<ReplacementRequest, ReplacementError> {
        if !REPLACEMENT_REASONS.contains(&request.reason.as_str()) {
            return Err(ReplacementError::InvalidReason(request.reason));
        }
        if request.images.len() > MAX_IMAGES {
            return Err(ReplacementError::TooManyImages);
        }
        validate_optional_text(&request.description, "description", MAX_NOTE_LEN)?;
        for image in &request.images {
            if image.len() > MAX_URL_LEN {
                return Err(AppError::validation("image url is too long").into());
            }
        }

        let now = now_millis();
        let txn = self.store.begin_write()?;

        let order = self
            .store
            .get_order_txn(&txn, &request.order_id)?
            .ok_or_else(|| ReplacementError::OrderNotFound(request.order_id.clone()))?;

        check_eligibility(&order, now)?;

        if self
            .store
            .replacement_for_order_txn(&txn, &order.id)?
            .is_some()
        {
            return Err(ReplacementError::DuplicateRequest);
        }

        let replacement = ReplacementRequest {
            id: Uuid::new_v4().to_string(),
            order_id: order.id.clone(),
            user_id: user_id.to_string(),
            reason: request.reason,
            description: request.description,
            images: request.images,
            status: ReplacementStatus::Pending,
            admin_notes: None,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_replacement(&txn, &replacement)?;
        txn.commit().map_err(StorageError::from)?;

        info!(request_id = %replacement.id, order_id = %replacement.order_id,
            reason = %replacement.reason, "Replacement request created");
        Ok(replacement)
    }

    /// Advance a request through the workflow (admin operation)
    ///
    /// Notes, when given, replace the previous notes verbatim.
    pub fn advance(
        &self,
        request_id: &str,
        new_status: ReplacementStatus,
        admin_notes: Option<String>,
    ) -> Result<ReplacementRequest, ReplacementError> {
        validate_optional_text(&admin_notes, "admin_notes", MAX_NOTE_LEN)?;

        let now = now_millis();
        let txn = self.store.begin_write()?;

        let mut replacement = self
            .store
            .get_replacement_txn(&txn, request_id)?
            .ok_or_else(|| ReplacementError::NotFound(request_id.to_string()))?;

        if !is_valid_transition(replacement.status, new_status) {
            return Err(ReplacementError::InvalidTransition {
                from: replacement.status,
                to: new_status,
            });
        }

        let old_status = replacement.status;
        replacement.status = new_status;
        if admin_notes.is_some() {
            replacement.admin_notes = admin_notes;
        }
        replacement.updated_at = now;

        self.store.put_replacement(&txn, &replacement)?;
        txn.commit().map_err(StorageError::from)?;

        info!(request_id = %replacement.id, from = ?old_status, to = ?new_status,
            "Replacement request updated");
        Ok(replacement)
    }

    /// Whether a replacement can currently be requested for an order
    pub fn is_eligible(&self, order_id: &str) -> Result<bool, ReplacementError> {
        let Some(order) = self.store.get_order(order_id)? else {
            return Err(ReplacementError::OrderNotFound(order_id.to_string()));
        };
        if check_eligibility(&order, now_millis()).is_err() {
            return Ok(false);
        }
        Ok(self.store.replacement_for_order(order_id)?.is_none())
    }
}

/// Delivered, and within the window counted from the delivery timestamp
///
/// Orders delivered before `delivered_at` was recorded fall back to the
/// creation timestamp, which only ever shortens the window.
fn check_eligibility(order: &Order, now: i64) -> Result<(), ReplacementError> {
    if order.status != OrderStatus::Delivered {
        return Err(ReplacementError::OrderNotDelivered);
    }
    let delivered_at = order.delivered_at.unwrap_or(order.created_at);
    if days_since(delivered_at, now) > REPLACEMENT_WINDOW_DAYS {
        return Err(ReplacementError::WindowExpired);
    }
    Ok(())
}
