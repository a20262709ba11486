#![allow(dead_code)]

use carematch::db;
use carematch::models::*;
use carematch::services::lifecycle;
use sqlx::SqlitePool;

/// 마이그레이션이 적용된 인메모리 DB (연결 1개)
///
/// 연결이 하나뿐이므로 테스트 안에서 `acquire()`한 연결은
/// 서비스 함수를 부르기 전에 drop해야 합니다.
pub async fn test_pool() -> SqlitePool {
    db::connect("sqlite::memory:", 1)
        .await
        .expect("in-memory database should open")
}

pub async fn create_category(pool: &SqlitePool, name: &str) -> Category {
    let mut conn = pool.acquire().await.unwrap();
    db::create_category(&mut conn, name).await.unwrap()
}

pub async fn create_request(
    pool: &SqlitePool,
    owner: i64,
    title: &str,
    category_id: Option<i64>,
) -> PinRequest {
    let input = CreateRequestInput {
        pin_user_id: Some(owner),
        title: Some(title.to_string()),
        description: Some(format!("{} - details", title)),
        location: Some("Tampines".to_string()),
        category_id,
    };
    lifecycle::create_request(pool, &input).await.unwrap()
}

pub fn status_change(owner: i64, request_id: i64, status: &str, csr: Option<i64>) -> UpdateRequestInput {
    UpdateRequestInput {
        pin_user_id: Some(owner),
        request_id: Some(request_id),
        csr_id: csr,
        status: Some(status.to_string()),
        ..Default::default()
    }
}

pub async fn complete(pool: &SqlitePool, owner: i64, request_id: i64, csr: i64) -> PinRequest {
    lifecycle::update_request(pool, &status_change(owner, request_id, "Completed", Some(csr)))
        .await
        .unwrap()
}

pub async fn matches_for(pool: &SqlitePool, request_id: i64) -> Vec<Match> {
    let mut conn = pool.acquire().await.unwrap();
    db::list_matches_for_request(&mut conn, request_id).await.unwrap()
}

pub fn past_query(owner: i64) -> PastMatchQuery {
    PastMatchQuery {
        pin_user_id: Some(owner),
        ..Default::default()
    }
}
