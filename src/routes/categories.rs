//! # 서비스 카테고리 라우트 핸들러
//!
//! 조회는 누구나, 변경은 Platform_Manager 토큰이 필요합니다.
//!
//! | 메서드 | 경로 | 핸들러 |
//! |--------|------|--------|
//! | GET | /api/v1/categories | `list_categories` |
//! | POST | /api/v1/categories | `create_category` (PM) |
//! | GET | /api/v1/categories/{id} | `get_category` |
//! | PATCH | /api/v1/categories/{id} | `rename_category` (PM) |
//! | DELETE | /api/v1/categories/{id} | `delete_category` (PM, 참조 중이면 409) |
//! | DELETE | /api/v1/categories/{id}/matches | `delete_category_matches` (PM) |

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::{
    db,
    error::AppError,
    middleware::{
        auth::AuthUser,
        extract::{AppJson, AppPath, AppQuery},
    },
    models::*,
    routes::requests::AppState,
    services::{lifecycle, validation::require_text},
};

pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let mut conn = state.pool.acquire().await?;
    let categories = db::list_categories(&mut conn).await?;
    Ok(Json(json!({ "categories": categories })))
}

pub async fn get_category(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<Category>, AppError> {
    let mut conn = state.pool.acquire().await?;
    let category = db::get_category(&mut conn, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(category))
}

pub async fn create_category(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppJson(input): AppJson<CategoryInput>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    auth_user.require_role(Role::PlatformManager)?;
    let name = require_text(input.name.as_deref(), "name")?;

    let mut conn = state.pool.acquire().await?;
    let category = db::create_category(&mut conn, &name).await?;

    tracing::info!("Category {} '{}' created", category.id, category.name);
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn rename_category(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppPath(id): AppPath<i64>,
    AppJson(input): AppJson<CategoryInput>,
) -> Result<Json<Category>, AppError> {
    auth_user.require_role(Role::PlatformManager)?;
    let name = require_text(input.name.as_deref(), "name")?;

    let mut conn = state.pool.acquire().await?;
    let category = db::rename_category(&mut conn, id, &name)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(category))
}

/// 참조 중인 카테고리는 409와 참조 수(`references`)를 돌려줍니다.
pub async fn delete_category(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    auth_user.require_role(Role::PlatformManager)?;

    let mut conn = state.pool.acquire().await?;
    if !db::delete_category(&mut conn, id).await? {
        return Err(AppError::NotFound);
    }

    tracing::info!("Category {} deleted", id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_category_matches(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppPath(id): AppPath<i64>,
    AppQuery(owner): AppQuery<MatchOwnerQuery>,
) -> Result<Json<Value>, AppError> {
    auth_user.require_role(Role::PlatformManager)?;
    let deleted = lifecycle::delete_matches_by_category(&state.pool, id, owner.pin_user_id).await?;
    Ok(Json(json!({ "category_id": id, "deleted": deleted })))
}
