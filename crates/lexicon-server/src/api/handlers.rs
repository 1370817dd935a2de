//! API endpoint handlers

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use serde_json::Value;

use lexicon_core::{
    record_review, Clock, ImportReport, ReviewOutcome, Word, WordInput, WordStats, WordStore,
};

use super::error::ApiError;
use super::state::AppState;
use crate::config::MAX_REVIEW_BATCH;

/// List all words, newest first
pub async fn list_words(State(state): State<AppState>) -> Result<Json<Vec<Word>>, ApiError> {
    Ok(Json(state.storage.list_words()?))
}

/// Create a word
pub async fn create_word(
    State(state): State<AppState>,
    payload: Result<Json<WordInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Word>), ApiError> {
    let Json(input) = payload?;
    let word = state.storage.create_word(input, state.clock.now())?;
    Ok((StatusCode::CREATED, Json(word)))
}

/// Delete every word
pub async fn delete_all_words(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let deleted = state.storage.delete_all_words()?;

    Ok(Json(serde_json::json!({
        "success": true,
        "deletedCount": deleted,
    })))
}

/// Bulk import from a JSON array of words
pub async fn import_words(
    State(state): State<AppState>,
    payload: Result<Json<Vec<WordInput>>, JsonRejection>,
) -> Result<Json<ImportReport>, ApiError> {
    let Json(inputs) = payload?;
    let report = state.storage.import_words(&inputs, state.clock.now())?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct ReviewQueueParams {
    pub limit: Option<i32>,
}

/// Words due for review, shuffled
pub async fn review_queue(
    State(state): State<AppState>,
    params: Result<Query<ReviewQueueParams>, QueryRejection>,
) -> Result<Json<Vec<Word>>, ApiError> {
    let Query(params) = params?;
    let limit = params
        .limit
        .unwrap_or(state.review_batch_size)
        .clamp(1, MAX_REVIEW_BATCH);

    let words = state
        .storage
        .select_due_for_review(state.clock.now(), limit)?;
    Ok(Json(words))
}

/// Get a single word by ID
pub async fn get_word(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Word>, ApiError> {
    let Path(id) = id?;
    let word = state
        .storage
        .get_word(id)?
        .ok_or_else(|| ApiError::NotFound(format!("Word not found: {}", id)))?;
    Ok(Json(word))
}

/// Replace word, definition and example
pub async fn update_word(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<WordInput>, JsonRejection>,
) -> Result<Json<Word>, ApiError> {
    let Path(id) = id?;
    let Json(input) = payload?;
    let word = state.storage.update_word(id, input, state.clock.now())?;
    Ok(Json(word))
}

/// Delete a word by ID
pub async fn delete_word(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    if state.storage.delete_word(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Word not found: {}", id)))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAnswer {
    pub is_correct: bool,
}

/// Submit one review answer
pub async fn submit_review(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ReviewAnswer>, JsonRejection>,
) -> Result<Json<ReviewOutcome>, ApiError> {
    let Path(id) = id?;
    let Json(answer) = payload?;
    let outcome = record_review(
        state.storage.as_ref(),
        id,
        answer.is_correct,
        state.clock.as_ref(),
    )?;
    Ok(Json(outcome))
}

/// Aggregate counts
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<WordStats>, ApiError> {
    Ok(Json(state.storage.get_stats(state.clock.now())?))
}

/// Liveness probe
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": state.clock.now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
