use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::AppError,
    middleware::extract::{AppJson, AppQuery},
    models::*,
    routes::requests::AppState,
    services::shortlists,
};

/// `GET /shortlist?csr_id=3&search=...` (`/shortlist/search`도 같은 핸들러)
pub async fn view_shortlist(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ShortlistQuery>,
) -> Result<Json<Value>, AppError> {
    let entries = shortlists::view(&state.pool, &query).await?;
    Ok(Json(json!({ "shortlist": entries })))
}

/// `POST /shortlist` + `{ "csr_id": 3, "request_id": 12, "notes": "..." }`
///
/// 추가든 해제든 같은 응답을 돌려줍니다.
pub async fn toggle_shortlist(
    State(state): State<AppState>,
    AppJson(input): AppJson<ToggleShortlistInput>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    shortlists::toggle(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(json!({ "message": "Shortlist saved" }))))
}
