//! Order lifecycle errors

use thiserror::Error;

use crate::db::StorageError;
use crate::db::models::OrderStatus;
use crate::pricing::PricingError;
use crate::utils::AppError;

/// Errors from order creation and status transitions
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("invalid checkout request: {0}")]
    InvalidRequest(String),

    #[error("order not found: {0}")]
    NotFound(String),

    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("cancellation requires a reason")]
    MissingCancelReason,

    #[error("shipping requires a tracking id")]
    MissingTrackingId,

    #[error("insufficient coin balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: i64, available: i64 },

    #[error("ledger commit failed: {0}")]
    LedgerCommitFailed(String),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::InvalidRequest(msg) => AppError::validation(msg),
            OrderError::NotFound(id) => AppError::not_found(format!("order not found: {id}")),
            OrderError::InvalidTransition { .. }
            | OrderError::MissingCancelReason
            | OrderError::MissingTrackingId
            | OrderError::InsufficientBalance { .. } => AppError::business_rule(err.to_string()),
            OrderError::LedgerCommitFailed(msg) => {
                AppError::internal(format!("ledger commit failed: {msg}"))
            }
            OrderError::Pricing(e) => e.into(),
            OrderError::Storage(e) => AppError::database(e.to_string()),
        }
    }
}
