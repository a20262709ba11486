//! # 지원 요청(Request) 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET    /api/v1/requests?pin_user_id=&status=&order=`  → 내 요청 목록
//! - `POST   /api/v1/requests`                               → 요청 생성 (201)
//! - `PUT    /api/v1/requests`                               → 요청 수정 (Completed면 매치 생성)
//! - `DELETE /api/v1/requests`                               → 요청 삭제 (매치가 있으면 409)
//! - `GET    /api/v1/requests/search?...`                    → 내 요청 검색
//! - `GET    /api/v1/requests/active?search=`                → CSR 탐색 (Open / In Progress)
//! - `GET    /api/v1/requests/{id}`                          → CSR 요청 열람 (조회 수 증가)
//! - `GET    /api/v1/requests/{id}/shortlist-count`          → 숏리스트에 담긴 횟수
//!
//! 소유자 확인은 본문/쿼리의 `pin_user_id`로 합니다.
//! 다른 사람의 요청이면 "없음"과 같은 404를 돌려줍니다.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    middleware::extract::{AppJson, AppPath, AppQuery},
    models::*,
    services::lifecycle,
};

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// `SqlitePool`은 내부적으로 Arc라서 clone해도 같은 풀을 가리킵니다.
#[derive(Clone)]
pub struct AppState {
    /// SQLite 연결 풀
    pub pool: SqlitePool,
    /// JWT 토큰 서명용 비밀키
    pub jwt_secret: String,
}

/// `GET /requests` → `{ "requests": [...] }`
pub async fn list_requests(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListRequestsQuery>,
) -> Result<Json<Value>, AppError> {
    let requests = lifecycle::list_my_requests(&state.pool, &query).await?;
    Ok(Json(json!({ "requests": requests })))
}

/// `POST /requests`: 새 요청을 만듭니다. 성공하면 201 Created.
pub async fn create_request(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateRequestInput>,
) -> Result<(StatusCode, Json<PinRequest>), AppError> {
    let request = lifecycle::create_request(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// `PUT /requests`: 요청을 수정합니다.
///
/// `{ "status": "Completed", "csr_id": 3, ... }`처럼 완료로 바꾸면
/// 같은 트랜잭션에서 완료 기록이 만들어집니다.
pub async fn update_request(
    State(state): State<AppState>,
    AppJson(input): AppJson<UpdateRequestInput>,
) -> Result<Json<PinRequest>, AppError> {
    let request = lifecycle::update_request(&state.pool, &input).await?;
    Ok(Json(request))
}

/// `DELETE /requests` + `{ "pin_user_id": 7, "request_id": 12 }`
pub async fn delete_request(
    State(state): State<AppState>,
    AppJson(input): AppJson<DeleteRequestInput>,
) -> Result<Json<Value>, AppError> {
    if !lifecycle::delete_request(&state.pool, &input).await? {
        return Err(AppError::NotFound);
    }
    Ok(Json(json!({ "deleted": true, "request_id": input.request_id })))
}

pub async fn search_requests(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<SearchRequestsQuery>,
) -> Result<Json<Value>, AppError> {
    let requests = lifecycle::search_my_requests(&state.pool, &query).await?;
    Ok(Json(json!({ "requests": requests })))
}

pub async fn list_active_requests(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ActiveRequestsQuery>,
) -> Result<Json<Value>, AppError> {
    let requests = lifecycle::list_active_requests(&state.pool, &query).await?;
    Ok(Json(json!({ "requests": requests })))
}

/// `GET /requests/{id}`: CSR이 요청을 열람합니다. 조회 기록이 남습니다.
pub async fn read_request(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<PinRequest>, AppError> {
    let request = lifecycle::read_request(&state.pool, id).await?;
    Ok(Json(request))
}

pub async fn shortlist_count(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<Value>, AppError> {
    let count = lifecycle::shortlist_count(&state.pool, id).await?;
    Ok(Json(json!({ "request_id": id, "shortlist_count": count })))
}
