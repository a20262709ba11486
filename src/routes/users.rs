//! # 사용자 관리 라우트 (Admin 전용)
//!
//! - `GET    /api/v1/users?search=`  → 목록/검색
//! - `POST   /api/v1/users`          → 계정 생성 (201)
//! - `PATCH  /api/v1/users/{id}`     → 프로필/역할/비밀번호 수정
//! - `DELETE /api/v1/users/{id}`     → 계정 삭제 (204)

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::AppError,
    middleware::{
        auth::AuthUser,
        extract::{AppJson, AppPath, AppQuery},
    },
    models::user::*,
    routes::requests::AppState,
    services::auth,
};

pub async fn list_users(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppQuery(query): AppQuery<UserSearchQuery>,
) -> Result<Json<Value>, AppError> {
    auth_user.require_role(Role::Admin)?;
    let users: Vec<UserProfile> = auth::list_users(&state.pool, query.search.as_deref())
        .await?
        .into_iter()
        .map(UserProfile::from)
        .collect();
    Ok(Json(json!({ "users": users })))
}

pub async fn create_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppJson(req): AppJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserProfile>), AppError> {
    auth_user.require_role(Role::Admin)?;
    let user = auth::create_user(&state.pool, &req).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn update_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<UpdateUserRequest>,
) -> Result<Json<UserProfile>, AppError> {
    auth_user.require_role(Role::Admin)?;
    let user = auth::update_user(&state.pool, id, &req).await?;
    Ok(Json(user.into()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    auth_user.require_role(Role::Admin)?;
    auth::delete_user(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
