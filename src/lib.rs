//! # carematch
//!
//! PIN 사용자의 지원 요청, CSR 숏리스트, 완료 기록(match)을 다루는
//! 역할 기반 케이스 관리 백엔드입니다.
//!
//! 실행 파일(`main.rs`)과 통합 테스트(`tests/`)가 같은 라우터와 DB 계층을 쓰도록
//! 모듈을 라이브러리로 공개합니다.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use axum::Router;

pub use routes::AppState;

/// 모든 API를 `/api/v1` 아래에 둔 라우터 (CORS, 로깅, 정적 파일은 main에서 추가)
pub fn app(state: AppState) -> Router {
    Router::new().nest("/api/v1", routes::api_router(state))
}
