// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Sealbox

//! # API Data Models
//!
//! Request and response structures for the REST API. All types derive
//! `Serialize`, `Deserialize`, and `ToSchema` for JSON handling and OpenAPI
//! documentation. Wire field names are camelCase.
//!
//! ## Soft Authorization
//!
//! The view operation never rejects a wrong secret. [`ViewFeedbackResponse`]
//! instead reports `isSecretCorrect` as data, and each record's `feedback`
//! field degrades to the stored envelope when decryption fails. Request
//! fields default to empty strings so handlers can distinguish missing
//! values without deserialization failures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::storage::{FeedbackCategory, FeedbackRecord, FeedbackStatus, StatusBreakdown};

fn default_filter_param() -> String {
    "all".to_string()
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

// =============================================================================
// Submission Models
// =============================================================================

/// Request to submit a new piece of feedback.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFeedbackRequest {
    /// Feedback text, 1 to 1000 characters.
    #[serde(default)]
    pub feedback_text: String,
    /// Category wire name (e.g. `ideas_requests`).
    #[serde(default)]
    pub category: String,
    /// Paying wallet address. Checked for presence, then discarded.
    #[serde(default)]
    pub wallet_address: String,
}

/// Acknowledgement for a stored submission. Carries no record id.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitFeedbackResponse {
    pub success: bool,
}

// =============================================================================
// Retrieval Models
// =============================================================================

/// Request to view a page of feedback.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ViewFeedbackRequest {
    /// Candidate operator secret; doubles as the decryption passphrase.
    #[serde(default)]
    pub secret: String,
    /// Case-insensitive substring filter applied after decryption,
    /// within the fetched page only.
    #[serde(default)]
    pub search_term: String,
    /// Category wire name, or `all`.
    #[serde(default = "default_filter_param")]
    pub category: String,
    /// Status name, `all`, or `hide-spam`.
    #[serde(default = "default_filter_param")]
    pub status: String,
    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Page size.
    #[serde(default = "default_limit")]
    pub limit: u32,
}

/// One feedback record as presented to the operator.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackView {
    /// Record identifier.
    pub id: String,
    /// Decrypted text when the supplied secret verifies, otherwise the
    /// stored envelope verbatim.
    pub feedback: String,
    /// Category chosen at submission.
    pub category: FeedbackCategory,
    /// Current moderation status.
    pub status: FeedbackStatus,
    /// Randomized ordering timestamp.
    pub created_at: DateTime<Utc>,
    /// When the status was last set, if ever.
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl FeedbackView {
    /// Build the wire view of a record around already-recovered text.
    pub fn new(record: FeedbackRecord, feedback: String) -> Self {
        Self {
            id: record.id,
            feedback,
            category: record.category,
            status: record.status,
            created_at: record.created_at,
            reviewed_at: record.reviewed_at,
        }
    }

    /// View of a record with its text left sealed.
    pub fn sealed(record: FeedbackRecord) -> Self {
        let ciphertext = record.ciphertext.clone();
        Self::new(record, ciphertext)
    }
}

/// A page of feedback plus the aggregates the review UI renders.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ViewFeedbackResponse {
    /// Page records after filtering, newest first.
    pub records: Vec<FeedbackView>,
    /// Whether the supplied secret matches the operator secret.
    pub is_secret_correct: bool,
    /// Whether pages beyond this one exist under the current filters.
    pub has_more: bool,
    /// Record count matching the category and status filters.
    pub total: u64,
    /// Per-status counts scoped by category only; never narrowed by the
    /// status filter, so spam stays visible even under `hide-spam`.
    pub status_breakdown: StatusBreakdown,
    /// Echo of the requested page.
    pub page: u32,
    /// Echo of the requested page size.
    pub limit: u32,
}

// =============================================================================
// Moderation Models
// =============================================================================

/// Request to set the status of a record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModerateFeedbackRequest {
    /// Operator secret; must match exactly.
    #[serde(default)]
    pub secret: String,
    /// Id of the record to moderate.
    #[serde(default)]
    pub feedback_id: String,
    /// New status name (`pending`, `acknowledged`, `rejected`, `spam`).
    #[serde(default)]
    pub status: String,
}

/// Result of a status change.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModerateFeedbackResponse {
    pub success: bool,
    /// The record after the change, text still sealed.
    pub record: FeedbackView,
}
