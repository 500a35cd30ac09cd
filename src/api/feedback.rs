// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Sealbox

//! Feedback submission, retrieval, and moderation handlers.
//!
//! ## Authorization Model
//!
//! Retrieval is soft-gated: a wrong secret still returns a page, with
//! `isSecretCorrect = false` and every record's text left as its stored
//! envelope. Moderation is the one hard gate; it rejects anything but the
//! exact operator secret with 401.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use rand::Rng;

use crate::{
    cipher::{self, RecoveredText},
    error::ApiError,
    models::{
        FeedbackView, ModerateFeedbackRequest, ModerateFeedbackResponse, SubmitFeedbackRequest,
        SubmitFeedbackResponse, ViewFeedbackRequest, ViewFeedbackResponse,
    },
    state::AppState,
    storage::{
        CategoryFilter, FeedbackCategory, FeedbackRecord, FeedbackStatus, StatusFilter, StoreError,
    },
};

/// Maximum accepted feedback length in characters.
const MAX_FEEDBACK_CHARS: usize = 1000;

/// 2002-01-01T00:00:00Z in Unix milliseconds, the floor of the timestamp
/// window records are scattered across.
const TIMESTAMP_WINDOW_START_MS: i64 = 1_009_843_200_000;

/// Pick a uniformly random instant between 2002-01-01 and now.
///
/// Submission time is deliberately never recorded; the randomized timestamp
/// keeps a stored record uncorrelated with any observed wallet payment.
fn random_created_at() -> DateTime<Utc> {
    let now_ms = Utc::now().timestamp_millis();
    let ms = rand::thread_rng().gen_range(TIMESTAMP_WINDOW_START_MS..now_ms);
    DateTime::from_timestamp_millis(ms).unwrap_or_else(Utc::now)
}

/// Log the real failure and hand the client a generic 500.
fn store_failure(err: StoreError) -> ApiError {
    tracing::error!(error = %err, "Feedback store operation failed");
    ApiError::internal()
}

/// Accept an anonymous feedback submission.
///
/// The wallet address proves the submitter paid; it is checked for presence
/// and then dropped so the stored record carries no identity.
#[utoipa::path(
    post,
    path = "/v1/feedback",
    request_body = SubmitFeedbackRequest,
    tag = "Feedback",
    responses(
        (status = 200, description = "Feedback sealed and stored", body = SubmitFeedbackResponse),
        (status = 400, description = "Missing field, unknown category, or text over 1000 characters"),
        (status = 500, description = "Sealing or storage failed")
    )
)]
pub async fn submit_feedback(
    State(state): State<AppState>,
    Json(request): Json<SubmitFeedbackRequest>,
) -> Result<Json<SubmitFeedbackResponse>, ApiError> {
    if request.feedback_text.is_empty()
        || request.category.is_empty()
        || request.wallet_address.is_empty()
    {
        return Err(ApiError::bad_request("Missing required fields"));
    }
    if request.feedback_text.chars().count() > MAX_FEEDBACK_CHARS {
        return Err(ApiError::bad_request("Feedback must be 1000 characters or less"));
    }
    let category = FeedbackCategory::parse(&request.category)
        .ok_or_else(|| ApiError::bad_request("Invalid category"))?;

    let ciphertext =
        cipher::seal(&request.feedback_text, &state.config.operator_secret).map_err(|e| {
            tracing::error!(error = %e, "Failed to seal feedback text");
            ApiError::internal()
        })?;

    let record = FeedbackRecord::new_pending(ciphertext, category, random_created_at());
    state.db.insert(&record).map_err(store_failure)?;

    tracing::info!(id = %record.id, category = category.as_str(), "Stored feedback submission");
    Ok(Json(SubmitFeedbackResponse { success: true }))
}

/// Return one page of feedback for the review UI.
///
/// Category and status filters narrow the set that `total` and `hasMore`
/// describe; the search term is applied after decryption within the fetched
/// page only, and a blank term applies no filter. The status breakdown is
/// scoped by category alone.
#[utoipa::path(
    post,
    path = "/v1/feedback/view",
    request_body = ViewFeedbackRequest,
    tag = "Feedback",
    responses(
        (status = 200, description = "Page of records plus aggregates", body = ViewFeedbackResponse),
        (status = 400, description = "Missing secret or non-positive paging"),
        (status = 500, description = "Storage failed")
    )
)]
pub async fn view_feedback(
    State(state): State<AppState>,
    Json(request): Json<ViewFeedbackRequest>,
) -> Result<Json<ViewFeedbackResponse>, ApiError> {
    if request.secret.is_empty() {
        return Err(ApiError::bad_request("Secret is required"));
    }
    if request.page == 0 || request.limit == 0 {
        return Err(ApiError::bad_request("page and limit must be positive"));
    }

    let category = CategoryFilter::from_param(&request.category);
    let status = StatusFilter::from_param(&request.status);

    let skip = (request.page as usize - 1) * request.limit as usize;
    let take = request.limit as usize;

    let total = state.db.count(&category, &status).map_err(store_failure)?;
    let status_breakdown = state.db.group_by_status(&category).map_err(store_failure)?;
    let page_records = state
        .db
        .find_page(&category, &status, skip, take)
        .map_err(store_failure)?;

    let is_secret_correct = request.secret == state.config.operator_secret;

    // The search filter gates on the trimmed term but matches with the term
    // as sent.
    let needle = request.search_term.to_lowercase();
    let search_active = !request.search_term.trim().is_empty();
    let mut records = Vec::with_capacity(page_records.len());
    for record in page_records {
        let text = RecoveredText::recover(&record.ciphertext, &request.secret).into_text();
        if search_active && !text.to_lowercase().contains(&needle) {
            continue;
        }
        records.push(FeedbackView::new(record, text));
    }

    let has_more = skip + take < total as usize;

    Ok(Json(ViewFeedbackResponse {
        records,
        is_secret_correct,
        has_more,
        total,
        status_breakdown,
        page: request.page,
        limit: request.limit,
    }))
}

/// Set the moderation status of a record.
#[utoipa::path(
    post,
    path = "/v1/feedback/status",
    request_body = ModerateFeedbackRequest,
    tag = "Feedback",
    responses(
        (status = 200, description = "Status updated", body = ModerateFeedbackResponse),
        (status = 400, description = "Missing field or unknown status"),
        (status = 401, description = "Secret does not match"),
        (status = 404, description = "No record with that id"),
        (status = 500, description = "Storage failed")
    )
)]
pub async fn moderate_feedback(
    State(state): State<AppState>,
    Json(request): Json<ModerateFeedbackRequest>,
) -> Result<Json<ModerateFeedbackResponse>, ApiError> {
    if request.secret != state.config.operator_secret {
        return Err(ApiError::unauthorized("Unauthorized"));
    }
    if request.feedback_id.is_empty() || request.status.is_empty() {
        return Err(ApiError::bad_request("Missing required fields"));
    }
    let status = FeedbackStatus::parse(&request.status)
        .ok_or_else(|| ApiError::bad_request("Invalid status"))?;

    let record = match state.db.update_status(&request.feedback_id, status) {
        Ok(record) => record,
        Err(StoreError::NotFound(_)) => {
            return Err(ApiError::not_found("Feedback not found"));
        }
        Err(e) => return Err(store_failure(e)),
    };

    tracing::info!(id = %record.id, status = status.as_str(), "Feedback status updated");
    Ok(Json(ModerateFeedbackResponse {
        success: true,
        record: FeedbackView::sealed(record),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::storage::FeedbackDb;
    use axum::http::StatusCode;
    use serde_json::json;

    const SECRET: &str = "correct horse battery staple";

    fn test_state() -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = FeedbackDb::open(&dir.path().join("feedback.redb")).unwrap();
        let config = ServerConfig {
            data_dir: dir.path().to_path_buf(),
            operator_secret: SECRET.to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
        };
        (AppState::new(db, config), dir)
    }

    async fn submit(state: &AppState, text: &str, category: &str) {
        let request = SubmitFeedbackRequest {
            feedback_text: text.to_string(),
            category: category.to_string(),
            wallet_address: "0x742d35cc6634c0532925a3b844bc9e7595f4ab12".to_string(),
        };
        submit_feedback(State(state.clone()), Json(request))
            .await
            .expect("submission succeeds");
    }

    async fn view(state: &AppState, body: serde_json::Value) -> ViewFeedbackResponse {
        let request: ViewFeedbackRequest = serde_json::from_value(body).unwrap();
        let Json(response) = view_feedback(State(state.clone()), Json(request))
            .await
            .expect("view succeeds");
        response
    }

    fn stored_records(state: &AppState) -> Vec<FeedbackRecord> {
        state
            .db
            .find_page(&CategoryFilter::All, &StatusFilter::All, 0, 100)
            .unwrap()
    }

    #[tokio::test]
    async fn submit_then_view_round_trips_plaintext() {
        let (state, _dir) = test_state();
        submit(&state, "The relayer drops messages under load", "ideas_requests").await;

        let response = view(&state, json!({ "secret": SECRET })).await;
        assert!(response.is_secret_correct);
        assert_eq!(response.total, 1);
        assert_eq!(response.records.len(), 1);
        assert_eq!(response.records[0].feedback, "The relayer drops messages under load");
        assert_eq!(response.status_breakdown.pending, 1);
        assert!(!response.has_more);

        // Plaintext never reaches the store.
        let stored = stored_records(&state);
        assert!(stored[0].ciphertext.starts_with("sealed:v1:"));
    }

    #[tokio::test]
    async fn wrong_secret_returns_the_stored_envelope() {
        let (state, _dir) = test_state();
        submit(&state, "only for operator eyes", "other").await;
        let envelope = stored_records(&state)[0].ciphertext.clone();

        let response = view(&state, json!({ "secret": "guess" })).await;
        assert!(!response.is_secret_correct);
        assert_eq!(response.records.len(), 1);
        assert_eq!(response.records[0].feedback, envelope);
        assert!(!response.records[0].feedback.contains("operator eyes"));
        // Aggregates are served regardless of the secret.
        assert_eq!(response.total, 1);
        assert_eq!(response.status_breakdown.pending, 1);
    }

    #[tokio::test]
    async fn secret_correctness_is_independent_of_records() {
        let (state, _dir) = test_state();

        let empty = view(&state, json!({ "secret": SECRET })).await;
        assert!(empty.is_secret_correct);
        assert_eq!(empty.total, 0);
        assert!(empty.records.is_empty());

        let wrong = view(&state, json!({ "secret": "nope" })).await;
        assert!(!wrong.is_secret_correct);
    }

    #[tokio::test]
    async fn submit_rejects_missing_fields() {
        let (state, _dir) = test_state();
        for request in [
            SubmitFeedbackRequest {
                feedback_text: String::new(),
                category: "other".to_string(),
                wallet_address: "0xabc".to_string(),
            },
            SubmitFeedbackRequest {
                feedback_text: "text".to_string(),
                category: String::new(),
                wallet_address: "0xabc".to_string(),
            },
            SubmitFeedbackRequest {
                feedback_text: "text".to_string(),
                category: "other".to_string(),
                wallet_address: String::new(),
            },
        ] {
            let err = submit_feedback(State(state.clone()), Json(request))
                .await
                .unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn submit_enforces_length_limit() {
        let (state, _dir) = test_state();

        submit(&state, &"a".repeat(1000), "other").await;

        let request = SubmitFeedbackRequest {
            feedback_text: "b".repeat(1001),
            category: "other".to_string(),
            wallet_address: "0xabc".to_string(),
        };
        let err = submit_feedback(State(state.clone()), Json(request))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        assert_eq!(stored_records(&state).len(), 1);
    }

    #[tokio::test]
    async fn submit_rejects_unknown_category() {
        let (state, _dir) = test_state();
        let request = SubmitFeedbackRequest {
            feedback_text: "text".to_string(),
            category: "snack_quality".to_string(),
            wallet_address: "0xabc".to_string(),
        };
        let err = submit_feedback(State(state.clone()), Json(request))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn view_requires_secret_and_positive_paging() {
        let (state, _dir) = test_state();

        let missing: ViewFeedbackRequest = serde_json::from_value(json!({})).unwrap();
        let err = view_feedback(State(state.clone()), Json(missing))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let zero_page: ViewFeedbackRequest =
            serde_json::from_value(json!({ "secret": SECRET, "page": 0 })).unwrap();
        let err = view_feedback(State(state.clone()), Json(zero_page))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let zero_limit: ViewFeedbackRequest =
            serde_json::from_value(json!({ "secret": SECRET, "limit": 0 })).unwrap();
        let err = view_feedback(State(state.clone()), Json(zero_limit))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn pagination_sets_has_more() {
        let (state, _dir) = test_state();
        for i in 0..5 {
            submit(&state, &format!("note number {i}"), "other").await;
        }

        let first = view(&state, json!({ "secret": SECRET, "page": 1, "limit": 2 })).await;
        assert_eq!(first.records.len(), 2);
        assert_eq!(first.total, 5);
        assert!(first.has_more);

        let third = view(&state, json!({ "secret": SECRET, "page": 3, "limit": 2 })).await;
        assert_eq!(third.records.len(), 1);
        assert!(!third.has_more);

        let beyond = view(&state, json!({ "secret": SECRET, "page": 4, "limit": 2 })).await;
        assert!(beyond.records.is_empty());
        assert!(!beyond.has_more);
    }

    #[tokio::test]
    async fn search_term_filters_within_page_only() {
        let (state, _dir) = test_state();
        submit(&state, "alpha wave latency", "other").await;
        submit(&state, "beta channel noise", "other").await;

        let response = view(
            &state,
            json!({ "secret": SECRET, "searchTerm": "ALPHA", "limit": 20 }),
        )
        .await;
        assert_eq!(response.records.len(), 1);
        assert_eq!(response.records[0].feedback, "alpha wave latency");

        // The search term narrows the page, not the aggregates.
        assert_eq!(response.total, 2);
        assert_eq!(response.status_breakdown.total(), 2);
    }

    #[tokio::test]
    async fn whitespace_search_term_applies_no_filter() {
        let (state, _dir) = test_state();
        submit(&state, "solo note", "other").await;

        let response = view(&state, json!({ "secret": SECRET, "searchTerm": "   " })).await;
        assert_eq!(response.records.len(), 1);
        assert_eq!(response.records[0].feedback, "solo note");
    }

    #[tokio::test]
    async fn padded_search_term_matches_untrimmed() {
        let (state, _dir) = test_state();
        submit(&state, "alpha wave latency", "other").await;
        submit(&state, "alphabet", "other").await;

        let response = view(&state, json!({ "secret": SECRET, "searchTerm": "alpha " })).await;
        assert_eq!(response.records.len(), 1);
        assert_eq!(response.records[0].feedback, "alpha wave latency");
    }

    #[tokio::test]
    async fn status_filters_narrow_records_but_not_breakdown() {
        let (state, _dir) = test_state();
        submit(&state, "first", "ease_of_use").await;
        submit(&state, "second", "ease_of_use").await;
        submit(&state, "third", "ease_of_use").await;

        let spam_id = stored_records(&state)[0].id.clone();
        let request = ModerateFeedbackRequest {
            secret: SECRET.to_string(),
            feedback_id: spam_id.clone(),
            status: "spam".to_string(),
        };
        moderate_feedback(State(state.clone()), Json(request))
            .await
            .expect("moderation succeeds");

        let hidden = view(&state, json!({ "secret": SECRET, "status": "hide-spam" })).await;
        assert_eq!(hidden.total, 2);
        assert_eq!(hidden.records.len(), 2);
        assert!(hidden.records.iter().all(|r| r.id != spam_id));
        // Spam stays visible in the breakdown even while hidden from the page.
        assert_eq!(hidden.status_breakdown.spam, 1);
        assert_eq!(hidden.status_breakdown.total(), 3);

        let only_spam = view(&state, json!({ "secret": SECRET, "status": "spam" })).await;
        assert_eq!(only_spam.total, 1);
        assert_eq!(only_spam.records[0].id, spam_id);
    }

    #[tokio::test]
    async fn unknown_status_filter_is_a_no_op() {
        let (state, _dir) = test_state();
        submit(&state, "first", "other").await;
        submit(&state, "second", "other").await;

        let response = view(&state, json!({ "secret": SECRET, "status": "wibble" })).await;
        assert_eq!(response.total, 2);
        assert_eq!(response.records.len(), 2);
    }

    #[tokio::test]
    async fn unknown_category_filter_matches_nothing() {
        let (state, _dir) = test_state();
        submit(&state, "first", "other").await;

        let response = view(&state, json!({ "secret": SECRET, "category": "snacks" })).await;
        assert_eq!(response.total, 0);
        assert!(response.records.is_empty());
        assert_eq!(response.status_breakdown.total(), 0);
    }

    #[tokio::test]
    async fn moderation_requires_exact_secret() {
        let (state, _dir) = test_state();
        submit(&state, "borderline", "other").await;
        let id = stored_records(&state)[0].id.clone();

        let request = ModerateFeedbackRequest {
            secret: "close but wrong".to_string(),
            feedback_id: id.clone(),
            status: "spam".to_string(),
        };
        let err = moderate_feedback(State(state.clone()), Json(request))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);

        // Nothing changed.
        let record = state.db.get(&id).unwrap().unwrap();
        assert_eq!(record.status, FeedbackStatus::Pending);
        assert!(record.reviewed_at.is_none());
    }

    #[tokio::test]
    async fn moderation_validates_fields() {
        let (state, _dir) = test_state();
        submit(&state, "text", "other").await;
        let id = stored_records(&state)[0].id.clone();

        let missing_id = ModerateFeedbackRequest {
            secret: SECRET.to_string(),
            feedback_id: String::new(),
            status: "spam".to_string(),
        };
        let err = moderate_feedback(State(state.clone()), Json(missing_id))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let bad_status = ModerateFeedbackRequest {
            secret: SECRET.to_string(),
            feedback_id: id,
            status: "archived".to_string(),
        };
        let err = moderate_feedback(State(state.clone()), Json(bad_status))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn moderation_of_unknown_id_is_not_found() {
        let (state, _dir) = test_state();
        let request = ModerateFeedbackRequest {
            secret: SECRET.to_string(),
            feedback_id: "no-such-record".to_string(),
            status: "rejected".to_string(),
        };
        let err = moderate_feedback(State(state.clone()), Json(request))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn full_review_cycle() {
        let (state, _dir) = test_state();
        submit(&state, "Please add testnet faucets", "ideas_requests").await;

        let before = view(&state, json!({ "secret": SECRET })).await;
        assert_eq!(before.status_breakdown.pending, 1);
        assert_eq!(before.status_breakdown.acknowledged, 0);
        let id = before.records[0].id.clone();

        let request = ModerateFeedbackRequest {
            secret: SECRET.to_string(),
            feedback_id: id.clone(),
            status: "acknowledged".to_string(),
        };
        let Json(response) = moderate_feedback(State(state.clone()), Json(request))
            .await
            .expect("moderation succeeds");
        assert!(response.success);
        assert_eq!(response.record.id, id);
        assert_eq!(response.record.status, FeedbackStatus::Acknowledged);
        assert!(response.record.reviewed_at.is_some());
        // The moderation response leaves the text sealed.
        assert!(response.record.feedback.starts_with("sealed:v1:"));

        let after = view(&state, json!({ "secret": SECRET })).await;
        assert_eq!(after.status_breakdown.pending, 0);
        assert_eq!(after.status_breakdown.acknowledged, 1);
        assert_eq!(after.records[0].feedback, "Please add testnet faucets");
    }

    #[tokio::test]
    async fn created_at_is_randomized_into_the_window() {
        let (state, _dir) = test_state();
        submit(&state, "window check", "other").await;

        let stored = stored_records(&state);
        let record = &stored[0];
        let floor = DateTime::from_timestamp_millis(TIMESTAMP_WINDOW_START_MS).unwrap();
        assert!(record.created_at >= floor);
        assert!(record.created_at <= Utc::now());
    }
}
