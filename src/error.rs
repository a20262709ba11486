//! # 에러 처리 모듈
//!
//! 애플리케이션에서 발생할 수 있는 모든 에러 타입을 정의합니다.
//!
//! 이 모듈의 핵심:
//! - `AppError` 열거형(enum): 모든 에러 종류를 하나의 타입으로 통합
//! - `IntoResponse` 구현: 에러를 HTTP 응답으로 자동 변환
//!
//! 에러 분류:
//! | variant | HTTP | 의미 |
//! |---------|------|------|
//! | `Validation` | 400 | 잘못된 입력 (음수 ID, 빈 텍스트, 알 수 없는 상태, 날짜 형식/범위) |
//! | `Unauthorized` | 401 | 로그인 실패, 토큰 없음 |
//! | `Forbidden` | 403 | 역할(role)이 맞지 않음 |
//! | `NotFound` | 404 | 없음 **또는** 소유자가 아님 (두 경우를 구분하지 않음) |
//! | `Conflict` / `InUse` | 409 | 중복 이름, 참조 중인 레코드 삭제 시도 |
//! | `Internal` / `Database` / `Migration` | 500 | 예상하지 못한 오류 |

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// 애플리케이션에서 발생할 수 있는 모든 에러 종류
///
/// 핸들러에서 `Result<T, AppError>`를 반환하면,
/// Axum이 자동으로 `IntoResponse`를 호출하여 HTTP 응답으로 변환합니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 요청한 리소스가 없거나, 요청자가 소유자가 아님 (HTTP 404)
    ///
    /// 다른 사용자의 레코드 존재 여부가 노출되지 않도록 두 경우 모두 같은 응답을 씁니다.
    #[error("Resource not found")]
    NotFound,

    /// 입력 검증 실패 (HTTP 400)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// 인증 실패 (HTTP 401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 역할 권한 없음 (HTTP 403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 중복 등 단순 충돌 (HTTP 409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 다른 레코드가 참조하고 있어 삭제할 수 없음 (HTTP 409)
    /// `references`는 삭제를 막고 있는 참조 수입니다.
    #[error("Conflict: {message}")]
    InUse { message: String, references: i64 },

    /// 서버 내부 오류 (HTTP 500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// 데이터베이스 오류 (HTTP 500)
    /// #[from]: sqlx::Error → AppError::Database 자동 변환 (`?` 연산자 사용 가능)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// 마이그레이션 실패 (HTTP 500, 주로 서버 시작/테스트 준비 단계)
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl AppError {
    /// 검증 에러를 간편하게 만드는 헬퍼
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    /// 이 에러가 SQLite 외래키(FOREIGN KEY) 위반인지 확인합니다.
    pub fn is_foreign_key_violation(&self) -> bool {
        match self {
            AppError::Database(sqlx::Error::Database(db_err)) => db_err.is_foreign_key_violation(),
            _ => false,
        }
    }

    /// 이 에러가 UNIQUE 제약 위반인지 확인합니다.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            AppError::Database(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }
}

// 요청 본문/쿼리/경로를 해석하지 못한 경우 (`middleware::extract`의 추출기가 사용)
// axum 기본 응답은 평문 텍스트라서, 검증 에러로 바꿔 JSON 에러 형식을 유지합니다.
// body_text(): "Failed to deserialize query string: ..." 같은 사람이 읽을 수 있는 설명

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    /// AppError를 HTTP 응답으로 변환합니다.
    ///
    /// 내부 에러(Database, Migration, Internal)는 실제 에러 내용을 로그에만 기록하고,
    /// 클라이언트에는 일반적인 메시지만 반환합니다.
    fn into_response(self) -> Response {
        let mut references = None;

        let (status, code, message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::Validation(ref msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", msg.clone())
            }
            AppError::Unauthorized(ref msg) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone())
            }
            AppError::Forbidden(ref msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            AppError::InUse {
                ref message,
                references: count,
            } => {
                tracing::warn!("Delete blocked: {}", message);
                references = Some(count);
                (StatusCode::CONFLICT, "conflict", message.clone())
            }
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Migration(ref e) => {
                tracing::error!("Migration error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "migration_error",
                    "A database error occurred".to_string(),
                )
            }
        };

        // 결과: { "error": "...", "code": "conflict", "references": 2 }
        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(count) = references {
            body["references"] = json!(count);
        }

        (status, Json(body)).into_response()
    }
}
