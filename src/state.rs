// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Sealbox

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::storage::FeedbackDb;

/// Shared application state handed to every handler.
///
/// The database handle is internally synchronized and the configuration is
/// read-only after startup; handlers need no further locking.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<FeedbackDb>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(db: FeedbackDb, config: ServerConfig) -> Self {
        Self {
            db: Arc::new(db),
            config: Arc::new(config),
        }
    }
}
