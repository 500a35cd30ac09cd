// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Sealbox

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::signal;

use sealbox_server::{api, config, config::ServerConfig, state::AppState, storage::FeedbackDb};

#[tokio::main]
async fn main() {
    init_tracing();

    let server_config = ServerConfig::from_env().expect("Invalid configuration");

    let db_path = server_config.db_path();
    let db = FeedbackDb::open(&db_path).expect("Failed to open feedback store");
    tracing::info!(path = %db_path.display(), "Feedback store opened");

    let addr: SocketAddr = format!("{}:{}", server_config.host, server_config.port)
        .parse()
        .expect("Failed to parse bind address");

    let state = AppState::new(db, server_config);
    let app = api::router(state);

    tracing::info!(%addr, "Sealbox server listening (docs at /docs)");

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind listen address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");
}

/// Initialize the tracing subscriber from `RUST_LOG` and `LOG_FORMAT`.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=debug"));

    let format = std::env::var(config::LOG_FORMAT_ENV).unwrap_or_default();
    if format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Resolve when SIGINT or SIGTERM arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
