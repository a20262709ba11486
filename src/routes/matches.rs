//! # 완료 기록(Match) 라우트 핸들러
//!
//! | 메서드 | 경로 | 설명 |
//! |--------|------|------|
//! | GET | /api/v1/matches/past | 과거 매치 목록 |
//! | GET | /api/v1/matches/search | 과거 매치 검색 (키워드 포함) |
//! | GET | /api/v1/matches/{id}?pin_user_id= | 매치 조회 |
//! | DELETE | /api/v1/matches/{id}?pin_user_id= | 매치 삭제 |
//! | POST | /api/v1/matches/{id}/undo?pin_user_id= | 매치 되돌리기 (요청은 In Progress로) |
//! | POST | /api/v1/matches/undo-complete | 요청 기준 완료 되돌리기 |

use axum::{
    extract::State,
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::AppError,
    middleware::extract::{AppJson, AppPath, AppQuery},
    models::*,
    routes::requests::AppState,
    services::lifecycle,
};

pub async fn list_past_matches(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<PastMatchQuery>,
) -> Result<Json<Value>, AppError> {
    let matches = lifecycle::list_past_matches(&state.pool, &query).await?;
    Ok(Json(json!({ "matches": matches })))
}

pub async fn search_past_matches(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<PastMatchQuery>,
) -> Result<Json<Value>, AppError> {
    let matches = lifecycle::search_past_matches(&state.pool, &query).await?;
    Ok(Json(json!({ "matches": matches })))
}

pub async fn get_match(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppQuery(owner): AppQuery<MatchOwnerQuery>,
) -> Result<Json<Match>, AppError> {
    let found = lifecycle::get_match(&state.pool, id, owner.pin_user_id).await?;
    Ok(Json(found))
}

/// 삭제된 매치의 스냅샷을 돌려줍니다: `{ "deleted": { ...match } }`
pub async fn delete_match(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppQuery(owner): AppQuery<MatchOwnerQuery>,
) -> Result<Json<Value>, AppError> {
    let deleted = lifecycle::delete_match(&state.pool, id, owner.pin_user_id).await?;
    Ok(Json(json!({ "deleted": deleted })))
}

pub async fn undo_match(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppQuery(owner): AppQuery<MatchOwnerQuery>,
) -> Result<Json<UndoMatchSummary>, AppError> {
    let summary = lifecycle::undo_match(&state.pool, id, owner.pin_user_id).await?;
    Ok(Json(summary))
}

/// `POST /matches/undo-complete` + `{ "request_id": 12, "pin_user_id": 7, "new_status": "Open" }`
pub async fn undo_complete(
    State(state): State<AppState>,
    AppJson(input): AppJson<UndoCompleteInput>,
) -> Result<Json<UndoCompleteSummary>, AppError> {
    let summary = lifecycle::undo_complete(&state.pool, &input).await?;
    Ok(Json(summary))
}
