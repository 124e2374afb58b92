use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use vocab_algo::sanitize::format_timestamp;
use vocab_algo::{estimated_next_interval_days, format_interval, MasteryRecord};

use crate::response::{ok, AppError};
use crate::state::{AppState, ListLimits};

const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttemptRequest {
    word_id: String,
    is_correct: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LimitQuery {
    limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct MasteryRecordDto {
    word_id: String,
    mastery_level: u8,
    correct_count: u32,
    incorrect_count: u32,
    last_reviewed: String,
    next_review: String,
    is_due: bool,
    /// Authoritative interval, human readable
    interval: String,
    /// Day-scale estimate for UI hints only
    estimated_interval_days: u32,
}

impl MasteryRecordDto {
    fn from_record(record: &MasteryRecord, now: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            word_id: record.word_id.clone(),
            mastery_level: record.mastery_level.get(),
            correct_count: record.correct_count,
            incorrect_count: record.incorrect_count,
            last_reviewed: format_timestamp(record.last_reviewed),
            next_review: format_timestamp(record.next_review),
            is_due: record.is_due(now),
            interval: format_interval(record.next_review - record.last_reviewed),
            estimated_interval_days: estimated_next_interval_days(record),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct DueWordsDto {
    words: Vec<MasteryRecordDto>,
    count: usize,
    limit: usize,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/attempts", post(record_attempt))
        .route("/due", get(due_words))
        .route("/urgent", get(urgent_words))
        .route("/stats", get(get_stats))
        .route("/:wordId", get(get_word))
}

async fn record_attempt(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AttemptRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = require_user(&headers)?;
    let Json(payload) = payload?;
    let service = state.mastery();

    let record = service
        .record_attempt(&user_id, &payload.word_id, payload.is_correct)
        .await?;

    Ok(ok(MasteryRecordDto::from_record(&record, service.now())))
}

async fn due_words(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = require_user(&headers)?;
    let Query(query) = query?;
    let limit = resolve_limit(query.limit, state.limits())?;
    let service = state.mastery();

    let records = service.due_words(&user_id, limit).await?;
    let now = service.now();
    let words: Vec<MasteryRecordDto> = records
        .iter()
        .map(|record| MasteryRecordDto::from_record(record, now))
        .collect();

    Ok(ok(DueWordsDto {
        count: words.len(),
        words,
        limit,
    }))
}

async fn urgent_words(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = require_user(&headers)?;
    let Query(query) = query?;
    let limit = resolve_limit(query.limit, state.limits())?;

    let entries = state.mastery().urgent_words(&user_id, limit).await?;
    Ok(ok(entries))
}

async fn get_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let user_id = require_user(&headers)?;
    let stats = state.mastery().stats(&user_id).await?;
    Ok(ok(stats))
}

async fn get_word(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(word_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = require_user(&headers)?;
    let service = state.mastery();

    let record = service
        .get_record(&user_id, &word_id)
        .await?
        .ok_or_else(|| AppError::not_found("该单词尚无学习记录"))?;

    Ok(ok(MasteryRecordDto::from_record(&record, service.now())))
}

fn require_user(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::unauthorized("未提供用户标识"))
}

fn resolve_limit(requested: Option<usize>, limits: ListLimits) -> Result<usize, AppError> {
    match requested {
        None => Ok(limits.default),
        Some(0) => Err(AppError::bad_request("limit必须大于0")),
        Some(n) => Ok(n.min(limits.max)),
    }
}
