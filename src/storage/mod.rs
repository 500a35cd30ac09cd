// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Sealbox

//! # Feedback Storage Module
//!
//! Persistent storage for sealed feedback records, backed by an embedded
//! redb database.
//!
//! ## Storage Layout
//!
//! ```text
//! {DATA_DIR}/
//!   feedback.redb
//!     feedback                # record id → serialized FeedbackRecord
//!     feedback_created_index  # (!created_at|id) → record id
//! ```
//!
//! ## Anonymity Model
//!
//! - Feedback text is stored only as a sealed envelope (see [`crate::cipher`])
//! - Submitter identity is never persisted; wallet addresses are validated
//!   and dropped at the API boundary
//! - `created_at` is a randomized historical instant, so stored records
//!   cannot be correlated with observed submissions by timestamp
//! - Records are never deleted; moderation only flips their status

pub mod db;
pub mod record;

pub use db::{CategoryFilter, FeedbackDb, StatusFilter, StoreError, StoreResult};
pub use record::{FeedbackCategory, FeedbackRecord, FeedbackStatus, StatusBreakdown};
