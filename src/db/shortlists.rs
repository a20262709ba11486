//! # 숏리스트 쿼리 모듈
//!
//! `shortlists` 테이블은 (csr_user_id, request_id) 복합키를 가집니다.
//! 같은 조합으로 다시 저장하면 항목이 지워지는 토글 방식입니다.

use sqlx::SqliteConnection;

use crate::db::contains_folded;
use crate::error::AppError;
use crate::models::ShortlistEntry;

/// 숏리스트 항목을 토글합니다.
///
/// ## 반환값
/// - `true`: 새로 추가됨
/// - `false`: 이미 있어서 제거됨
pub async fn toggle_shortlist(
    conn: &mut SqliteConnection,
    csr_user_id: i64,
    request_id: i64,
    notes: Option<&str>,
) -> Result<bool, AppError> {
    let removed = sqlx::query("DELETE FROM shortlists WHERE csr_user_id = ? AND request_id = ?")
        .bind(csr_user_id)
        .bind(request_id)
        .execute(&mut *conn)
        .await?;

    if removed.rows_affected() > 0 {
        return Ok(false);
    }

    sqlx::query("INSERT INTO shortlists (csr_user_id, request_id, notes) VALUES (?, ?, ?)")
        .bind(csr_user_id)
        .bind(request_id)
        .bind(notes)
        .execute(&mut *conn)
        .await?;

    Ok(true)
}

/// CSR의 숏리스트를 요청 정보와 함께 조회합니다.
///
/// `query`가 있으면 요청 제목, 설명, 메모 중 하나에 포함된 항목만 반환합니다
/// (유니코드 대소문자 무시). 요청 생성 시각 기준 최신순입니다.
pub async fn search_shortlist(
    conn: &mut SqliteConnection,
    csr_user_id: i64,
    query: Option<&str>,
) -> Result<Vec<ShortlistEntry>, AppError> {
    // shortlists ⋈ requests: 항목마다 요청의 제목/상태 등을 함께 돌려줍니다.
    let mut entries = sqlx::query_as::<_, ShortlistEntry>(
        r#"
        SELECT
            s.csr_user_id, s.request_id, s.notes, s.added_at,
            r.title, r.description, r.status, r.location, r.category_id, r.created_at
        FROM shortlists s
        JOIN requests r ON r.request_id = s.request_id
        WHERE s.csr_user_id = ?
        ORDER BY r.created_at DESC, r.request_id DESC
        "#,
    )
    .bind(csr_user_id)
    .fetch_all(&mut *conn)
    .await?;

    if let Some(query) = query {
        let needle = query.to_lowercase();
        entries.retain(|e| {
            contains_folded(&e.title, &needle)
                || contains_folded(&e.description, &needle)
                || e.notes.as_deref().is_some_and(|n| contains_folded(n, &needle))
        });
    }

    Ok(entries)
}

/// 요청을 숏리스트에 담은 CSR 수
pub async fn count_shortlists_for_request(
    conn: &mut SqliteConnection,
    request_id: i64,
) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM shortlists WHERE request_id = ?")
        .bind(request_id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(count)
}

/// 기간 내 추가된 숏리스트 항목 수 (리포트용)
pub async fn count_shortlists_added(
    conn: &mut SqliteConnection,
    from: &str,
    to: &str,
) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM shortlists WHERE added_at >= ? AND added_at <= ?",
    )
    .bind(from)
    .bind(to)
    .fetch_one(&mut *conn)
    .await?;

    Ok(count)
}
