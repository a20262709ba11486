//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들과 `/api/v1` 아래의 라우터 구성입니다.
//!
//! 각 하위 모듈:
//! - `auth`: 로그인, 내 정보
//! - `categories`: 서비스 카테고리 (변경은 Platform_Manager)
//! - `health`: 서버 상태 확인
//! - `matches`: 과거 매치 조회/삭제/되돌리기
//! - `reports`: 활동 요약 (Platform_Manager)
//! - `requests`: 지원 요청 생명주기, CSR 탐색, `AppState`
//! - `shortlists`: CSR 숏리스트
//! - `users`: 사용자 관리 (Admin)

pub mod auth;
pub mod categories;
pub mod health;
pub mod matches;
pub mod reports;
pub mod requests;
pub mod shortlists;
pub mod users;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

pub use requests::AppState;

/// `/api/v1` 아래에 중첩(nest)될 API 라우터
///
/// 경로 파라미터는 axum 0.8 문법인 `{id}`를 씁니다.
/// `/matches/past` 같은 고정 경로는 `/matches/{id}`보다 먼저 매칭됩니다.
pub fn api_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me));

    let user_routes = Router::new()
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/{id}", patch(users::update_user).delete(users::delete_user));

    let category_routes = Router::new()
        .route(
            "/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/categories/{id}",
            get(categories::get_category)
                .patch(categories::rename_category)
                .delete(categories::delete_category),
        )
        .route(
            "/categories/{id}/matches",
            delete(categories::delete_category_matches),
        );

    let request_routes = Router::new()
        .route(
            "/requests",
            get(requests::list_requests)
                .post(requests::create_request)
                .put(requests::update_request)
                .delete(requests::delete_request),
        )
        .route("/requests/search", get(requests::search_requests))
        .route("/requests/active", get(requests::list_active_requests))
        .route("/requests/{id}", get(requests::read_request))
        .route(
            "/requests/{id}/shortlist-count",
            get(requests::shortlist_count),
        );

    let match_routes = Router::new()
        .route("/matches/past", get(matches::list_past_matches))
        .route("/matches/search", get(matches::search_past_matches))
        .route("/matches/undo-complete", post(matches::undo_complete))
        .route(
            "/matches/{id}",
            get(matches::get_match).delete(matches::delete_match),
        )
        .route("/matches/{id}/undo", post(matches::undo_match));

    let shortlist_routes = Router::new()
        .route(
            "/shortlist",
            get(shortlists::view_shortlist).post(shortlists::toggle_shortlist),
        )
        .route("/shortlist/search", get(shortlists::view_shortlist));

    Router::new()
        .merge(auth_routes)
        .merge(user_routes)
        .merge(category_routes)
        .merge(request_routes)
        .merge(match_routes)
        .merge(shortlist_routes)
        .route("/report", get(reports::report_summary))
        .route("/health", get(health::health_check))
        .with_state(state)
}
