// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Sealbox

//! Embedded feedback database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `feedback`: record id → serialized FeedbackRecord
//! - `feedback_created_index`: composite key (!created_at|id) → record id
//!
//! The index key inverts the creation timestamp so a forward scan yields
//! newest-first ordering without sorting. Status updates never touch
//! `created_at` or `id`, so index rows stay valid for the life of a record.

use std::path::Path;

use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use super::record::{FeedbackRecord, FeedbackStatus, StatusBreakdown};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: record id → serialized FeedbackRecord (JSON bytes).
const FEEDBACK: TableDefinition<&str, &[u8]> = TableDefinition::new("feedback");

/// Index: composite key → record id.
/// Key format: `!created_at_micros_be|id` for descending-time scans.
const CREATED_INDEX: TableDefinition<&[u8], &str> =
    TableDefinition::new("feedback_created_index");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Query Filters
// =============================================================================

/// Category narrowing for queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    /// No narrowing.
    All,
    /// Records whose category wire name equals the given string.
    /// Unknown names match nothing.
    Named(String),
}

impl CategoryFilter {
    /// Interpret a wire parameter (`"all"` disables narrowing).
    pub fn from_param(value: &str) -> Self {
        if value == "all" {
            Self::All
        } else {
            Self::Named(value.to_string())
        }
    }

    fn matches(&self, record: &FeedbackRecord) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => record.category.as_str() == name,
        }
    }
}

/// Status narrowing for queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    /// No narrowing. Also the fallback for unrecognized parameters.
    All,
    /// Records with exactly this status.
    Only(FeedbackStatus),
    /// Everything except spam.
    HideSpam,
}

impl StatusFilter {
    /// Interpret a wire parameter.
    ///
    /// `"all"` and any unrecognized value disable narrowing; `"hide-spam"`
    /// excludes spam; the four status names match exactly.
    pub fn from_param(value: &str) -> Self {
        match value {
            "hide-spam" => Self::HideSpam,
            other => match FeedbackStatus::parse(other) {
                Some(status) => Self::Only(status),
                None => Self::All,
            },
        }
    }

    fn matches(&self, record: &FeedbackRecord) -> bool {
        match self {
            Self::All => true,
            Self::Only(status) => record.status == *status,
            Self::HideSpam => record.status != FeedbackStatus::Spam,
        }
    }
}

// =============================================================================
// Index Key Helper
// =============================================================================

/// Build a composite key for the created-at index.
///
/// Format: `inverted_micros_be_bytes | record_id`
///
/// The inverted timestamp ensures newest-first ordering when scanning
/// forward; the id suffix disambiguates records sharing a timestamp.
fn make_index_key(created_at: DateTime<Utc>, id: &str) -> Vec<u8> {
    let micros = created_at.timestamp_micros();
    let mut key = Vec::with_capacity(8 + 1 + id.len());
    key.extend_from_slice(&(!micros as u64).to_be_bytes());
    key.push(b'|');
    key.extend_from_slice(id.as_bytes());
    key
}

// =============================================================================
// FeedbackDb
// =============================================================================

/// Embedded ACID feedback database.
pub struct FeedbackDb {
    db: Database,
}

impl FeedbackDb {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(FEEDBACK)?;
            let _ = write_txn.open_table(CREATED_INDEX)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Insert a record and its index entry in one transaction.
    pub fn insert(&self, record: &FeedbackRecord) -> StoreResult<()> {
        let json = serde_json::to_vec(record)?;
        let index_key = make_index_key(record.created_at, &record.id);

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(FEEDBACK)?;
            table.insert(record.id.as_str(), json.as_slice())?;

            let mut idx_table = write_txn.open_table(CREATED_INDEX)?;
            idx_table.insert(index_key.as_slice(), record.id.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Look up a single record by id.
    pub fn get(&self, id: &str) -> StoreResult<Option<FeedbackRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(FEEDBACK)?;
        match table.get(id)? {
            Some(value) => {
                let record: FeedbackRecord = serde_json::from_slice(value.value())?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Count records matching both filters.
    pub fn count(&self, category: &CategoryFilter, status: &StatusFilter) -> StoreResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(FEEDBACK)?;

        let mut total = 0u64;
        for entry in table.iter()? {
            let entry = entry?;
            let record: FeedbackRecord = serde_json::from_slice(entry.1.value())?;
            if category.matches(&record) && status.matches(&record) {
                total += 1;
            }
        }
        Ok(total)
    }

    /// Per-status counts over records matching the category filter.
    ///
    /// Deliberately takes no status filter: the breakdown always reports all
    /// four statuses, spam included.
    pub fn group_by_status(&self, category: &CategoryFilter) -> StoreResult<StatusBreakdown> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(FEEDBACK)?;

        let mut breakdown = StatusBreakdown::default();
        for entry in table.iter()? {
            let entry = entry?;
            let record: FeedbackRecord = serde_json::from_slice(entry.1.value())?;
            if category.matches(&record) {
                breakdown.tally(record.status);
            }
        }
        Ok(breakdown)
    }

    /// One page of records matching the filters, newest-first by `created_at`.
    ///
    /// `skip` and `take` are counted over matching records only.
    pub fn find_page(
        &self,
        category: &CategoryFilter,
        status: &StatusFilter,
        skip: usize,
        take: usize,
    ) -> StoreResult<Vec<FeedbackRecord>> {
        let read_txn = self.db.begin_read()?;
        let idx_table = read_txn.open_table(CREATED_INDEX)?;
        let table = read_txn.open_table(FEEDBACK)?;

        let mut page = Vec::new();
        let mut skipped = 0usize;

        for entry in idx_table.iter()? {
            let entry = entry?;
            let id = entry.1.value().to_string();

            let Some(value) = table.get(id.as_str())? else {
                continue;
            };
            let record: FeedbackRecord = serde_json::from_slice(value.value())?;

            if !(category.matches(&record) && status.matches(&record)) {
                continue;
            }
            if skipped < skip {
                skipped += 1;
                continue;
            }

            page.push(record);
            if page.len() >= take {
                break;
            }
        }

        Ok(page)
    }

    /// Set the status of a record, stamping its review time.
    ///
    /// Returns the updated record, or `NotFound` for an unknown id.
    pub fn update_status(
        &self,
        id: &str,
        status: FeedbackStatus,
    ) -> StoreResult<FeedbackRecord> {
        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut table = write_txn.open_table(FEEDBACK)?;

            // Read existing value and deserialize before mutating
            let existing_bytes = {
                let existing = table
                    .get(id)?
                    .ok_or_else(|| StoreError::NotFound(format!("Feedback {id}")))?;
                existing.value().to_vec()
            };

            let mut record: FeedbackRecord = serde_json::from_slice(&existing_bytes)?;
            record.set_status(status);

            let json = serde_json::to_vec(&record)?;
            table.insert(id, json.as_slice())?;
            record
        };
        write_txn.commit()?;
        Ok(updated)
    }

    /// Cheap readiness check: open a read transaction on the primary table.
    pub fn ping(&self) -> StoreResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(FEEDBACK)?;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
