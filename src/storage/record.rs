// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Sealbox

//! Feedback record model.
//!
//! The feedback text exists in storage only as a sealed envelope; plaintext
//! never touches disk. `created_at` is a randomized historical instant
//! assigned at write time, not the submission time, and is the sole ordering
//! key for listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Category chosen by the submitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCategory {
    /// Latency and throughput complaints
    SpeedPerformance,
    /// Usability and onboarding friction
    EaseOfUse,
    /// Feature ideas and requests
    IdeasRequests,
    /// Community and support experience
    CommunitySupport,
    /// SDK, docs, and tooling
    DeveloperExperience,
    /// Anything else
    Other,
}

impl FeedbackCategory {
    /// Wire name of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SpeedPerformance => "speed_performance",
            Self::EaseOfUse => "ease_of_use",
            Self::IdeasRequests => "ideas_requests",
            Self::CommunitySupport => "community_support",
            Self::DeveloperExperience => "developer_experience",
            Self::Other => "other",
        }
    }

    /// Parse a wire name. Unknown names yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "speed_performance" => Some(Self::SpeedPerformance),
            "ease_of_use" => Some(Self::EaseOfUse),
            "ideas_requests" => Some(Self::IdeasRequests),
            "community_support" => Some(Self::CommunitySupport),
            "developer_experience" => Some(Self::DeveloperExperience),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Moderation status of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackStatus {
    /// Not yet reviewed
    Pending,
    /// Reviewed and accepted
    Acknowledged,
    /// Reviewed and declined
    Rejected,
    /// Marked as spam
    Spam,
}

impl Default for FeedbackStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl FeedbackStatus {
    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Acknowledged => "acknowledged",
            Self::Rejected => "rejected",
            Self::Spam => "spam",
        }
    }

    /// Parse a wire name. Unknown names yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "acknowledged" => Some(Self::Acknowledged),
            "rejected" => Some(Self::Rejected),
            "spam" => Some(Self::Spam),
            _ => None,
        }
    }
}

/// Per-status record counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusBreakdown {
    pub pending: u64,
    pub acknowledged: u64,
    pub rejected: u64,
    pub spam: u64,
}

impl StatusBreakdown {
    /// Count one record with the given status.
    pub fn tally(&mut self, status: FeedbackStatus) {
        match status {
            FeedbackStatus::Pending => self.pending += 1,
            FeedbackStatus::Acknowledged => self.acknowledged += 1,
            FeedbackStatus::Rejected => self.rejected += 1,
            FeedbackStatus::Spam => self.spam += 1,
        }
    }

    /// Total across all four statuses.
    pub fn total(&self) -> u64 {
        self.pending + self.acknowledged + self.rejected + self.spam
    }
}

/// Stored feedback record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
    /// Unique identifier (UUIDv4)
    pub id: String,
    /// Sealed feedback text envelope
    pub ciphertext: String,
    /// Category chosen at submission
    pub category: FeedbackCategory,
    /// Current moderation status
    pub status: FeedbackStatus,
    /// Randomized ordering timestamp, decorrelated from submission time
    pub created_at: DateTime<Utc>,
    /// When the status was last set by a moderator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl FeedbackRecord {
    /// Create a new pending record around sealed text.
    pub fn new_pending(
        ciphertext: String,
        category: FeedbackCategory,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            ciphertext,
            category,
            status: FeedbackStatus::Pending,
            created_at,
            reviewed_at: None,
        }
    }

    /// Apply a moderation decision, stamping the review time.
    ///
    /// Re-setting the current status still counts as a review.
    pub fn set_status(&mut self, status: FeedbackStatus) {
        self.status = status;
        self.reviewed_at = Some(Utc::now());
    }
}
