use axum::{
    extract::State,
    Json,
};

use crate::{
    error::AppError,
    middleware::{auth::AuthUser, extract::AppQuery},
    models::*,
    routes::requests::AppState,
    services::reports,
};

/// `GET /report?days=30&include_zero=true`: Platform_Manager 전용
pub async fn report_summary(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppQuery(query): AppQuery<ReportQuery>,
) -> Result<Json<ReportSummary>, AppError> {
    auth_user.require_role(Role::PlatformManager)?;
    let summary = reports::build_summary(&state.pool, &query).await?;
    Ok(Json(summary))
}
