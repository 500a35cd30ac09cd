// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Sealbox

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        FeedbackView, ModerateFeedbackRequest, ModerateFeedbackResponse, SubmitFeedbackRequest,
        SubmitFeedbackResponse, ViewFeedbackRequest, ViewFeedbackResponse,
    },
    state::AppState,
    storage::{FeedbackCategory, FeedbackStatus, StatusBreakdown},
};

pub mod feedback;
pub mod health;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/feedback", post(feedback::submit_feedback))
        .route("/feedback/view", post(feedback::view_feedback))
        .route("/feedback/status", post(feedback::moderate_feedback))
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        feedback::submit_feedback,
        feedback::view_feedback,
        feedback::moderate_feedback,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            SubmitFeedbackRequest,
            SubmitFeedbackResponse,
            ViewFeedbackRequest,
            ViewFeedbackResponse,
            ModerateFeedbackRequest,
            ModerateFeedbackResponse,
            FeedbackView,
            FeedbackCategory,
            FeedbackStatus,
            StatusBreakdown,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Feedback", description = "Anonymous feedback submission and review"),
        (name = "Health", description = "Service health probes")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::storage::FeedbackDb;

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let dir = tempfile::tempdir().unwrap();
        let db = FeedbackDb::open(&dir.path().join("feedback.redb")).unwrap();
        let config = ServerConfig {
            data_dir: dir.path().to_path_buf(),
            operator_secret: "secret".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
        };
        let app = router(AppState::new(db, config));
        // Ensure the router can be converted into a service without panicking.
        let _ = app.into_make_service();
    }
}
