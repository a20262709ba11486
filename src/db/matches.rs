//! # 완료 기록(Match) 쿼리 모듈
//!
//! ## 테이블 구조
//! ```text
//! matches ──▶ requests ──▶ service_categories
//!   (N)          (1)             (0..1)
//! ```
//! 조회 결과는 부모 요청의 제목/카테고리/위치를 JOIN으로 붙인 `Match`입니다.
//!
//! ## 요청당 Completed 매치는 최대 1개
//! `ensure_completed`는 "찾고 없으면 만든다"를 수행합니다.
//! 두 호출이 동시에 "없음"을 보고 INSERT하더라도 부분 유니크 인덱스
//! `uq_matches_completed (request_id, pin_user_id) WHERE status = 'Completed'`와
//! `INSERT OR IGNORE` 때문에 한 행만 남고, 둘 다 다시 조회해서 같은 ID를 받습니다.
//!
//! "찾기"는 조회 쪽과 같은 기준(`COMPLETED_STATUS_CLAUSE`)을 씁니다.
//! 과거 데이터의 `'complete'` 같은 행도 완료 매치로 보고 새로 만들지 않습니다.

use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::db::contains_folded;
use crate::error::AppError;
use crate::models::*;

const SELECT_MATCH: &str = r#"
    SELECT
        m.match_id, m.request_id, m.csr_user_id, m.pin_user_id,
        m.service_date, m.completion_date, m.status,
        r.title AS request_title, r.description AS request_description,
        r.category_id, sc.category_name, r.location
    FROM matches m
    JOIN requests r ON r.request_id = m.request_id
    LEFT JOIN service_categories sc ON sc.category_id = r.category_id
"#;

/// 상태 비교는 대소문자/공백을 무시합니다 (과거 데이터 호환).
const COMPLETED_STATUS_CLAUSE: &str = " AND TRIM(LOWER(m.status)) IN ('completed', 'complete')";

/// 요청의 Completed 매치를 보장하고 그 ID를 반환합니다.
///
/// - 이미 있으면 그 ID (비어 있는 `completion_date`는 현재 시각으로 채움)
/// - 없으면 새로 만듭니다. 이때는 `csr_user_id`가 필요합니다.
///   `service_date` 기본값은 오늘(UTC), `completion_date` 기본값은 현재 시각입니다.
pub async fn ensure_completed(
    conn: &mut SqliteConnection,
    request_id: i64,
    pin_user_id: i64,
    csr_user_id: Option<i64>,
    service_date: Option<&str>,
    completion_date: Option<&str>,
) -> Result<i64, AppError> {
    // 1단계: 이미 완료 매치가 있으면 그대로 사용 (멱등성)
    if let Some((match_id, completed_at)) = find_completed(conn, request_id, pin_user_id).await? {
        if completed_at.is_none() {
            // COALESCE(a, b): a가 NULL이면 b. 인자로 받은 완료 시각이 없으면 지금 시각
            sqlx::query(
                r#"
                UPDATE matches
                SET completion_date = COALESCE(?, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                WHERE match_id = ? AND completion_date IS NULL
                "#,
            )
            .bind(completion_date)
            .bind(match_id)
            .execute(&mut *conn)
            .await?;
        }
        return Ok(match_id);
    }

    let csr_user_id = csr_user_id.ok_or_else(|| {
        AppError::validation("csr_id is required to record a completed match")
    })?;

    // 2단계: 없으면 만든다. 1단계와 2단계 사이에 다른 호출이 먼저 넣었다면
    // 이 INSERT는 유니크 인덱스에 막혀 조용히 무시됩니다.
    insert_completed(
        conn,
        request_id,
        pin_user_id,
        csr_user_id,
        service_date,
        completion_date,
    )
    .await?;

    // 3단계: INSERT가 무시된 경우(동시 생성)에도 살아남은 행을 다시 읽습니다.
    // 그래서 경쟁한 두 호출이 같은 match_id를 받습니다.
    let (match_id, _) = find_completed(conn, request_id, pin_user_id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve completed match".to_string()))?;

    tracing::info!(
        "Completed match {} recorded for request {} (csr {})",
        match_id,
        request_id,
        csr_user_id
    );

    Ok(match_id)
}

/// Completed 매치 한 행을 넣습니다. `ensure_completed`의 생성 단계입니다.
///
/// `INSERT OR IGNORE`: 제약 위반(여기서는 `uq_matches_completed`)이면 에러 대신
/// 아무 행도 넣지 않고 성공으로 끝납니다.
///
/// ## 반환값
/// - `Ok(true)`: 새 행이 들어감
/// - `Ok(false)`: 이미 Completed 매치가 있어서 무시됨
pub async fn insert_completed(
    conn: &mut SqliteConnection,
    request_id: i64,
    pin_user_id: i64,
    csr_user_id: i64,
    service_date: Option<&str>,
    completion_date: Option<&str>,
) -> Result<bool, AppError> {
    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO matches
            (request_id, pin_user_id, csr_user_id, service_date, completion_date, status)
        VALUES (
            ?, ?, ?,
            COALESCE(?, date('now')),
            COALESCE(?, strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            ?
        )
        "#,
    )
    .bind(request_id)
    .bind(pin_user_id)
    .bind(csr_user_id)
    .bind(service_date)
    .bind(completion_date)
    .bind(MATCH_STATUS_COMPLETED)
    .execute(&mut *conn)
    .await?;

    // rows_affected(): 무시된 INSERT는 0
    Ok(result.rows_affected() > 0)
}

/// 요청의 완료 매치 (가장 먼저 만들어진 것)
///
/// 조회 쪽(`COMPLETED_STATUS_CLAUSE`)과 같은 기준으로 찾습니다.
/// 과거 데이터의 `' completed '`, `'complete'`도 이미 완료된 매치로 보므로
/// 그런 행이 있으면 새 매치를 만들지 않습니다.
async fn find_completed(
    conn: &mut SqliteConnection,
    request_id: i64,
    pin_user_id: i64,
) -> Result<Option<(i64, Option<String>)>, AppError> {
    // query_as::<_, (i64, Option<String>)>: 구조체 없이 튜플로 바로 받습니다.
    // fetch_optional: 0행이면 None (fetch_one은 0행일 때 에러)
    let row = sqlx::query_as::<_, (i64, Option<String>)>(&format!(
        r#"
        SELECT m.match_id, m.completion_date
        FROM matches m
        WHERE m.request_id = ? AND m.pin_user_id = ?{}
        ORDER BY m.match_id
        LIMIT 1
        "#,
        COMPLETED_STATUS_CLAUSE
    ))
    .bind(request_id)
    .bind(pin_user_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row)
}

/// 매치 하나를 조회합니다. `pin_user_id`가 주어지면 소유자가 같을 때만 반환합니다.
pub async fn get_match(
    conn: &mut SqliteConnection,
    match_id: i64,
    pin_user_id: Option<i64>,
) -> Result<Option<Match>, AppError> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_MATCH);
    qb.push(" WHERE m.match_id = ").push_bind(match_id);
    if let Some(owner) = pin_user_id {
        qb.push(" AND m.pin_user_id = ").push_bind(owner);
    }

    let found = qb
        .build_query_as::<Match>()
        .fetch_optional(&mut *conn)
        .await?;

    Ok(found)
}

/// 요청의 매치 목록 (테스트와 관리 화면에서 사용)
pub async fn list_matches_for_request(
    conn: &mut SqliteConnection,
    request_id: i64,
) -> Result<Vec<Match>, AppError> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_MATCH);
    qb.push(" WHERE m.request_id = ").push_bind(request_id);
    qb.push(" ORDER BY m.match_id");

    let matches = qb.build_query_as::<Match>().fetch_all(&mut *conn).await?;
    Ok(matches)
}

/// 소유자의 과거(완료) 매치 목록. 키워드 조건은 무시합니다.
pub async fn list_past_matches(
    conn: &mut SqliteConnection,
    pin_user_id: i64,
    filter: &PastMatchFilter,
) -> Result<Vec<Match>, AppError> {
    let filter = PastMatchFilter {
        keyword: None,
        ..filter.clone()
    };
    search_past_matches(conn, pin_user_id, &filter).await
}

/// 소유자의 과거(완료) 매치 검색
///
/// - `keyword`: 부모 요청의 제목 또는 설명에 포함 (유니코드 대소문자 무시)
/// - `service_from` / `service_to`: `service_date` 범위
/// - `completion_from` / `completion_to`: `completion_date` 범위
///
/// `completion_date` 기준으로 정렬합니다 (기본 최신순).
pub async fn search_past_matches(
    conn: &mut SqliteConnection,
    pin_user_id: i64,
    filter: &PastMatchFilter,
) -> Result<Vec<Match>, AppError> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_MATCH);
    qb.push(" WHERE m.pin_user_id = ").push_bind(pin_user_id);
    qb.push(COMPLETED_STATUS_CLAUSE);

    if let Some(category_id) = filter.category_id {
        qb.push(" AND r.category_id = ").push_bind(category_id);
    }
    if let Some(from) = &filter.service_from {
        qb.push(" AND m.service_date >= ").push_bind(from.clone());
    }
    if let Some(to) = &filter.service_to {
        qb.push(" AND m.service_date <= ").push_bind(to.clone());
    }
    if let Some(from) = &filter.completion_from {
        qb.push(" AND m.completion_date >= ").push_bind(from.clone());
    }
    if let Some(to) = &filter.completion_to {
        qb.push(" AND m.completion_date <= ").push_bind(to.clone());
    }

    let order = filter.order.as_sql();
    qb.push(format!(
        " ORDER BY m.completion_date {order}, m.match_id {order}"
    ));

    let mut matches = qb.build_query_as::<Match>().fetch_all(&mut *conn).await?;

    // 키워드는 유니코드 대소문자를 무시해야 해서 SQL 대신 여기서 거릅니다.
    if let Some(keyword) = &filter.keyword {
        let needle = keyword.to_lowercase();
        matches.retain(|m| {
            contains_folded(&m.request_title, &needle)
                || contains_folded(&m.request_description, &needle)
        });
    }

    Ok(matches)
}

/// 매치 하나를 삭제하고, 삭제 직전의 스냅샷을 반환합니다.
/// 없거나 소유자가 아니면 `Ok(None)`.
pub async fn delete_match(
    conn: &mut SqliteConnection,
    match_id: i64,
    pin_user_id: Option<i64>,
) -> Result<Option<Match>, AppError> {
    let Some(existing) = get_match(conn, match_id, pin_user_id).await? else {
        return Ok(None);
    };

    sqlx::query("DELETE FROM matches WHERE match_id = ?")
        .bind(match_id)
        .execute(&mut *conn)
        .await?;

    Ok(Some(existing))
}

/// 요청의 모든 매치를 삭제하고 삭제된 행 수를 반환합니다.
pub async fn delete_matches_by_request(
    conn: &mut SqliteConnection,
    request_id: i64,
    pin_user_id: Option<i64>,
) -> Result<u64, AppError> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("DELETE FROM matches WHERE request_id = ");
    qb.push_bind(request_id);
    if let Some(owner) = pin_user_id {
        qb.push(" AND pin_user_id = ").push_bind(owner);
    }

    let result = qb.build().execute(&mut *conn).await?;
    Ok(result.rows_affected())
}

/// 카테고리에 속한 요청들의 매치를 일괄 삭제합니다 (카테고리 삭제 전 정리용).
pub async fn delete_matches_by_category(
    conn: &mut SqliteConnection,
    category_id: i64,
    pin_user_id: Option<i64>,
) -> Result<u64, AppError> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        "DELETE FROM matches WHERE request_id IN (SELECT request_id FROM requests WHERE category_id = ",
    );
    qb.push_bind(category_id);
    qb.push(")");
    if let Some(owner) = pin_user_id {
        qb.push(" AND pin_user_id = ").push_bind(owner);
    }

    let result = qb.build().execute(&mut *conn).await?;
    Ok(result.rows_affected())
}

// ── 리포트 집계 ──

pub async fn count_matches_created(
    conn: &mut SqliteConnection,
    from: &str,
    to: &str,
) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM matches WHERE created_at >= ? AND created_at <= ?",
    )
    .bind(from)
    .bind(to)
    .fetch_one(&mut *conn)
    .await?;

    Ok(count)
}

pub async fn count_matches_completed(
    conn: &mut SqliteConnection,
    from: &str,
    to: &str,
) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM matches m
        WHERE m.completion_date >= ? AND m.completion_date <= ?
          AND TRIM(LOWER(m.status)) IN ('completed', 'complete')
        "#,
    )
    .bind(from)
    .bind(to)
    .fetch_one(&mut *conn)
    .await?;

    Ok(count)
}

/// 기간 내 완료된 매치의 (완료 시각 - 요청 생성 시각) 평균, 초 단위.
/// 완료 기록이 없으면 `None`.
pub async fn avg_completion_seconds(
    conn: &mut SqliteConnection,
    from: &str,
    to: &str,
) -> Result<Option<f64>, AppError> {
    let avg = sqlx::query_scalar::<_, Option<f64>>(
        r#"
        SELECT AVG((julianday(m.completion_date) - julianday(r.created_at)) * 86400.0)
        FROM matches m
        JOIN requests r ON r.request_id = m.request_id
        WHERE m.completion_date IS NOT NULL
          AND m.completion_date >= ? AND m.completion_date <= ?
        "#,
    )
    .bind(from)
    .bind(to)
    .fetch_one(&mut *conn)
    .await?;

    Ok(avg)
}
