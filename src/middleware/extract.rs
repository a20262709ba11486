//! # 에러 형식을 맞춘 요청 추출기
//!
//! `axum::Json`, `Query`, `Path`와 같지만, 해석에 실패하면 axum의 평문 응답 대신
//! `AppError::Validation`(HTTP 400, `{ "error", "code": "validation_error" }`)을 돌려줍니다.
//!
//! ```ignore
//! pub async fn create_request(
//!     State(state): State<AppState>,
//!     AppJson(input): AppJson<CreateRequestInput>,
//! ) -> Result<...>
//! ```
//!
//! `#[derive(FromRequest)]`의 `via(...)`는 안쪽 추출기를 그대로 실행하고,
//! `rejection(AppError)`는 실패를 `From<...Rejection> for AppError`로 바꿉니다.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// JSON 본문 (잘못된 JSON, 타입 불일치, Content-Type 누락 → 400)
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// 쿼리 문자열 (`?pin_user_id=abc`, `?order=DESC` → 400)
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// 경로 파라미터 (`/matches/abc` → 400)
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);
