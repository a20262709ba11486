use axum::{extract::State, Json};

use crate::{
    db::users as db_users,
    error::AppError,
    middleware::{
        auth::{create_access_token, AuthUser},
        extract::AppJson,
    },
    models::user::*,
    routes::requests::AppState,
    services::auth,
};

/// `POST /auth/login` + `{ "username", "password", "role" }`
///
/// 세 값이 모두 맞아야 로그인됩니다. 응답의 `destination`은
/// 역할별 화면 토큰(`role_page.Csr_Rep` 등)입니다.
pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = auth::authenticate(&state.pool, &req.username, &req.password, &req.role)
        .await?
        .ok_or(AppError::Unauthorized(
            "Invalid username, password or role".to_string(),
        ))?;

    let access_token = create_access_token(user.user_id, &user.role, &state.jwt_secret)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;
    let destination = role_endpoint_for(&user.role);

    tracing::info!("User {} logged in as {}", user.username, user.role);

    Ok(Json(LoginResponse {
        user: user.into(),
        access_token,
        destination,
    }))
}

pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<UserProfile>, AppError> {
    let mut conn = state.pool.acquire().await?;
    let user = db_users::find_by_id(&mut conn, auth_user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(user.into()))
}
