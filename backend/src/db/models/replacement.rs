//! Replacement request model

use serde::{Deserialize, Serialize};

/// Accepted replacement reasons, as shown in the storefront form
pub const REPLACEMENT_REASONS: [&str; 6] = [
    "Size Issue",
    "Damaged Product",
    "Wrong Item Received",
    "Quality Issue",
    "Color Mismatch",
    "Other",
];

/// Replacement workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplacementStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl ReplacementStatus {
    /// `rejected` and `completed` admit no further transitions
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ReplacementStatus::Rejected | ReplacementStatus::Completed
        )
    }
}

impl std::fmt::Display for ReplacementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ReplacementStatus::Pending => "pending",
            ReplacementStatus::Approved => "approved",
            ReplacementStatus::Rejected => "rejected",
            ReplacementStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// Replacement request entity (at most one per order)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplacementRequest {
    pub id: String,
    pub order_id: String,
    pub user_id: String,
    pub reason: String,
    pub description: Option<String>,
    /// Evidence image URLs, at most 3
    #[serde(default)]
    pub images: Vec<String>,
    pub status: ReplacementStatus,
    /// Stored verbatim and surfaced to the customer
    pub admin_notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}
