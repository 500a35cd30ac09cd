// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Sealbox

//! # Runtime Configuration
//!
//! This module defines environment variable names and the configuration
//! loaded from them at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Directory holding the feedback database | `/data` |
//! | `OPERATOR_SECRET` | Shared operator password and sealing passphrase | Required |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;
use std::path::PathBuf;

/// Environment variable name for the data directory path.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Environment variable name for the operator secret.
///
/// The secret is both the moderation password and the passphrase feedback
/// text is sealed under. It is read once at startup and held read-only for
/// the life of the process.
pub const OPERATOR_SECRET_ENV: &str = "OPERATOR_SECRET";

/// Environment variable name for the bind address.
pub const HOST_ENV: &str = "HOST";

/// Environment variable name for the bind port.
pub const PORT_ENV: &str = "PORT";

/// Environment variable name selecting the log format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("OPERATOR_SECRET must be set to a non-empty value")]
    MissingOperatorSecret,
}

/// Runtime configuration resolved from the environment at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directory holding the feedback database.
    pub data_dir: PathBuf,
    /// Shared operator password; also the sealing passphrase.
    pub operator_secret: String,
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl ServerConfig {
    /// Load configuration from the environment.
    ///
    /// Fails when `OPERATOR_SECRET` is missing or empty; the service does
    /// not start without a secret.
    pub fn from_env() -> Result<Self, ConfigError> {
        let operator_secret = env::var(OPERATOR_SECRET_ENV).unwrap_or_default();
        if operator_secret.is_empty() {
            return Err(ConfigError::MissingOperatorSecret);
        }

        let data_dir = env::var(DATA_DIR_ENV).unwrap_or_else(|_| "/data".to_string());
        let host = env::var(HOST_ENV).unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var(PORT_ENV)
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        Ok(Self {
            data_dir: PathBuf::from(data_dir),
            operator_secret,
            host,
            port,
        })
    }

    /// Path of the redb database file inside the data directory.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("feedback.redb")
    }
}
