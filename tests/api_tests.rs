mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::ServiceExt;

use carematch::middleware::auth::create_access_token;
use carematch::models::*;
use carematch::services::auth;
use carematch::AppState;
use common::*;

const SECRET: &str = "test-secret";

fn test_app(pool: &SqlitePool) -> Router {
    carematch::app(AppState {
        pool: pool.clone(),
        jwt_secret: SECRET.to_string(),
    })
}

fn token_for(user_id: i64, role: Role) -> String {
    create_access_token(user_id, role.as_str(), SECRET).unwrap()
}

/// 요청 하나를 보내고 (상태 코드, JSON 본문)을 돌려줍니다. 본문이 비어 있으면 Null.
async fn send(
    app: Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let body = match body {
        Some(value) => Body::from(value.to_string()),
        None => Body::empty(),
    };

    let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn health_reports_database_ok() {
    let pool = test_pool().await;
    let (status, body) = send(test_app(&pool), "GET", "/api/v1/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn create_request_returns_201_or_field_error() {
    let pool = test_pool().await;

    let (status, body) = send(
        test_app(&pool),
        "POST",
        "/api/v1/requests",
        None,
        Some(json!({
            "pin_user_id": 7,
            "title": "Groceries",
            "description": "Weekly run",
            "location": "Tampines"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "Open");
    assert_eq!(body["view_count"], 0);

    let (status, body) = send(
        test_app(&pool),
        "POST",
        "/api/v1/requests",
        None,
        Some(json!({ "pin_user_id": 7, "description": "d", "location": "l" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
    assert_eq!(body["error"], "title is required");
}

#[tokio::test]
async fn completing_over_http_creates_a_match_and_blocks_delete() {
    let pool = test_pool().await;
    let request = create_request(&pool, 7, "Ride to hospital", None).await;

    let (status, body) = send(
        test_app(&pool),
        "PUT",
        "/api/v1/requests",
        None,
        Some(json!({
            "pin_user_id": 7,
            "request_id": request.request_id,
            "status": "Completed",
            "csr_id": 3
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Completed");

    let (status, body) = send(
        test_app(&pool),
        "DELETE",
        "/api/v1/requests",
        None,
        Some(json!({ "pin_user_id": 7, "request_id": request.request_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");
    assert_eq!(body["references"], 1);

    let (status, body) = send(
        test_app(&pool),
        "GET",
        "/api/v1/matches/past?pin_user_id=7",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let matches = body["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["csr_user_id"], 3);
    let match_id = matches[0]["match_id"].as_i64().unwrap();

    // 다른 소유자에게는 존재하지 않는 것과 같음
    let (status, body) = send(
        test_app(&pool),
        "GET",
        &format!("/api/v1/matches/{}?pin_user_id=8", match_id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");

    let (status, body) = send(
        test_app(&pool),
        "POST",
        &format!("/api/v1/matches/{}/undo?pin_user_id=7", match_id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["match_deleted"], true);

    let (status, body) = send(
        test_app(&pool),
        "DELETE",
        "/api/v1/requests",
        None,
        Some(json!({ "pin_user_id": 7, "request_id": request.request_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], true);
}

#[tokio::test]
async fn undo_complete_over_http_reports_counts() {
    let pool = test_pool().await;
    let request = create_request(&pool, 7, "Groceries", None).await;
    complete(&pool, 7, request.request_id, 3).await;

    let (status, body) = send(
        test_app(&pool),
        "POST",
        "/api/v1/matches/undo-complete",
        None,
        Some(json!({
            "request_id": request.request_id,
            "pin_user_id": 7,
            "new_status": "Completed"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");

    let (status, body) = send(
        test_app(&pool),
        "POST",
        "/api/v1/matches/undo-complete",
        None,
        Some(json!({ "request_id": request.request_id, "pin_user_id": 7 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matches_deleted"], 1);
    assert_eq!(body["request_updated"], true);
    assert_eq!(body["status"], "Open");
}

#[tokio::test]
async fn csr_browse_read_and_shortlist() {
    let pool = test_pool().await;
    let request = create_request(&pool, 7, "Wheelchair repair", None).await;

    let (status, body) = send(
        test_app(&pool),
        "GET",
        "/api/v1/requests/active?search=WHEEL",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["requests"].as_array().unwrap().len(), 1);

    let (status, body) = send(
        test_app(&pool),
        "GET",
        &format!("/api/v1/requests/{}", request.request_id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["view_count"], 1);

    let (status, body) = send(
        test_app(&pool),
        "POST",
        "/api/v1/shortlist",
        None,
        Some(json!({ "csr_id": 3, "request_id": request.request_id, "notes": "weekend" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Shortlist saved");

    let (status, body) = send(
        test_app(&pool),
        "GET",
        "/api/v1/shortlist/search?csr_id=3&search=weekend",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["shortlist"].as_array().unwrap().len(), 1);

    let (status, body) = send(
        test_app(&pool),
        "GET",
        &format!("/api/v1/requests/{}/shortlist-count", request.request_id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["shortlist_count"], 1);

    let (status, _) = send(test_app(&pool), "GET", "/api/v1/requests/9999", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn login_requires_matching_role() {
    let pool = test_pool().await;
    auth::create_user(
        &pool,
        &CreateUserRequest {
            username: Some("pm".to_string()),
            password: Some("pm-password".to_string()),
            role: Some("Platform_Manager".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let (status, body) = send(
        test_app(&pool),
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({ "username": "pm", "password": "pm-password", "role": "Admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");

    let (status, body) = send(
        test_app(&pool),
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({ "username": "pm", "password": "pm-password", "role": "Platform_Manager" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["destination"], "role_page.Platform_Manager");
    assert_eq!(body["user"]["username"], "pm");
    assert!(body["user"].get("password_hash").is_none());

    let token = body["access_token"].as_str().unwrap().to_string();
    let (status, body) = send(test_app(&pool), "GET", "/api/v1/auth/me", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "Platform_Manager");

    let (status, body) = send(test_app(&pool), "GET", "/api/v1/auth/me", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "invalid_token");
}

#[tokio::test]
async fn category_mutations_require_platform_manager() {
    let pool = test_pool().await;
    let pm = token_for(1, Role::PlatformManager);
    let csr = token_for(2, Role::CsrRep);
    let admin = token_for(3, Role::Admin);
    let body = json!({ "name": "Shelter" });

    let (status, _) = send(test_app(&pool), "POST", "/api/v1/categories", None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        test_app(&pool),
        "POST",
        "/api/v1/categories",
        Some(csr.as_str()),
        Some(body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Admin도 PM 전용 API는 쓸 수 없음
    let (status, _) = send(
        test_app(&pool),
        "POST",
        "/api/v1/categories",
        Some(admin.as_str()),
        Some(body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) = send(
        test_app(&pool),
        "POST",
        "/api/v1/categories",
        Some(pm.as_str()),
        Some(body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Shelter");

    let (status, _) = send(test_app(&pool), "POST", "/api/v1/categories", Some(pm.as_str()), Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let id = created["id"].as_i64().unwrap();
    create_request(&pool, 7, "Night shelter", Some(id)).await;

    let (status, body) = send(
        test_app(&pool),
        "DELETE",
        &format!("/api/v1/categories/{}", id),
        Some(pm.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["references"], 1);

    let (status, body) = send(test_app(&pool), "GET", "/api/v1/categories", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["categories"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn users_and_reports_are_role_gated() {
    let pool = test_pool().await;
    let admin = token_for(1, Role::Admin);
    let pm = token_for(2, Role::PlatformManager);

    let (status, created) = send(
        test_app(&pool),
        "POST",
        "/api/v1/users",
        Some(admin.as_str()),
        Some(json!({
            "username": "csr.tan",
            "password": "pw",
            "role": "Csr_Rep",
            "email": "tan@example.com"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["role"], "Csr_Rep");

    let (status, _) = send(test_app(&pool), "GET", "/api/v1/users", Some(pm.as_str()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(test_app(&pool), "GET", "/api/v1/users?search=tan", Some(admin.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"].as_array().unwrap().len(), 1);

    let (status, body) = send(test_app(&pool), "GET", "/api/v1/report?days=30", Some(pm.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["new_csrs"], 1);
    assert_eq!(body["requests_created"], 0);

    let (status, _) = send(test_app(&pool), "GET", "/api/v1/report", Some(admin.as_str()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(test_app(&pool), "GET", "/api/v1/report?days=0", Some(pm.as_str()), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");

    let id = created["id"].as_i64().unwrap();
    let (status, _) = send(
        test_app(&pool),
        "DELETE",
        &format!("/api/v1/users/{}", id),
        Some(admin.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn malformed_input_keeps_json_error_shape() {
    let pool = test_pool().await;

    // 깨진 JSON 본문
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/requests")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"pin_user_id": 7, "title": "#))
        .unwrap();
    let response = test_app(&pool).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "validation_error");
    assert!(body["error"].is_string());

    // 타입이 맞지 않는 쿼리 값과 경로 값
    for uri in [
        "/api/v1/requests?pin_user_id=abc",
        "/api/v1/requests?pin_user_id=7&order=DESC",
        "/api/v1/matches/abc?pin_user_id=7",
    ] {
        let (status, body) = send(test_app(&pool), "GET", uri, None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["code"], "validation_error", "{}", uri);
        assert!(body["error"].is_string(), "{}", uri);
    }

    // 소문자는 정상
    let (status, _) = send(
        test_app(&pool),
        "GET",
        "/api/v1/requests?pin_user_id=7&order=asc",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
