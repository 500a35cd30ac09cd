// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Sealbox

//! Sealbox - Anonymous Encrypted Feedback Service
//!
//! Wallet-paying users drop anonymous text feedback; operators holding the
//! shared secret decrypt, search, and triage it. Feedback is sealed with
//! ChaCha20-Poly1305 before it touches disk, submitter identity is dropped
//! at the API boundary, and creation timestamps are randomized so stored
//! records cannot be correlated with observed payments.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `cipher` - Passphrase-keyed sealing of feedback text
//! - `storage` - Embedded feedback store (redb)

pub mod api;
pub mod cipher;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
