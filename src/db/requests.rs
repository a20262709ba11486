//! # 지원 요청 쿼리 모듈
//!
//! `requests` 테이블의 CRUD, 소유자 범위 검색, CSR 탐색, 리포트 집계 쿼리입니다.
//!
//! `view_count`와 `shortlist_count`는 저장하지 않고 조회 때마다
//! `request_views` / `shortlists` 행 수를 서브쿼리로 셉니다.
//!
//! 동적 조건(검색 필터, 부분 수정)은 `sqlx::QueryBuilder`와 `push_bind`로 만듭니다.
//! 사용자 입력은 항상 바인딩되고 SQL 문자열에 직접 들어가는 것은
//! 컬럼 이름과 정렬 방향(`SortOrder::as_sql`)뿐입니다.
//!
//! 키워드 조건만은 SQL이 아니라 조회 후 Rust에서 적용합니다 (`db::contains_folded`).

use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::db::contains_folded;
use crate::error::AppError;
use crate::models::*;

const SELECT_REQUEST: &str = r#"
    SELECT
        r.request_id, r.pin_user_id, r.title, r.description, r.location,
        r.category_id, r.status, r.created_at, r.updated_at,
        (SELECT COUNT(*) FROM request_views v WHERE v.request_id = r.request_id) AS view_count,
        (SELECT COUNT(*) FROM shortlists s WHERE s.request_id = r.request_id) AS shortlist_count
    FROM requests r
"#;

/// 새 요청을 만듭니다. 상태는 항상 Open으로 시작합니다.
///
/// 입력값은 서비스 계층에서 이미 검증/정리(trim)된 상태여야 합니다.
/// 존재하지 않는 `category_id`는 외래키 위반으로 걸러져 검증 에러가 됩니다.
pub async fn create_request(
    conn: &mut SqliteConnection,
    pin_user_id: i64,
    title: &str,
    description: &str,
    location: &str,
    category_id: Option<i64>,
) -> Result<PinRequest, AppError> {
    let result = sqlx::query(
        r#"
        INSERT INTO requests (pin_user_id, title, description, location, category_id, status)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(pin_user_id)
    .bind(title)
    .bind(description)
    .bind(location)
    .bind(category_id)
    .bind(RequestStatus::Open.as_str())
    .execute(&mut *conn)
    .await
    .map_err(|e| unknown_category(e.into(), category_id))?;

    get_request(conn, result.last_insert_rowid(), None)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created request".to_string()))
}

/// 요청 하나를 조회합니다. `pin_user_id`가 주어지면 소유자가 같을 때만 반환합니다.
pub async fn get_request(
    conn: &mut SqliteConnection,
    request_id: i64,
    pin_user_id: Option<i64>,
) -> Result<Option<PinRequest>, AppError> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_REQUEST);
    qb.push(" WHERE r.request_id = ").push_bind(request_id);
    if let Some(owner) = pin_user_id {
        qb.push(" AND r.pin_user_id = ").push_bind(owner);
    }

    let request = qb
        .build_query_as::<PinRequest>()
        .fetch_optional(&mut *conn)
        .await?;

    Ok(request)
}

/// 소유자의 요청 목록 (상태 필터 선택)
pub async fn list_requests_by_owner(
    conn: &mut SqliteConnection,
    pin_user_id: i64,
    status: Option<RequestStatus>,
    order: SortOrder,
) -> Result<Vec<PinRequest>, AppError> {
    let filter = RequestFilter {
        status,
        order,
        ..Default::default()
    };
    search_requests(conn, pin_user_id, &filter).await
}

/// 소유자의 요청 검색
///
/// - `keyword`: 제목 또는 설명에 포함 (유니코드 대소문자 무시)
/// - `status`, `category_id`: 정확히 일치
/// - `created_from` / `created_to`: `created_at` 범위 (양 끝 포함)
///
/// 모든 조건은 AND로 결합되고, 다른 소유자의 행은 절대 반환하지 않습니다.
pub async fn search_requests(
    conn: &mut SqliteConnection,
    pin_user_id: i64,
    filter: &RequestFilter,
) -> Result<Vec<PinRequest>, AppError> {
    // QueryBuilder: 조건이 있을 때만 SQL 조각을 이어 붙입니다.
    // push_bind()는 값을 SQL 문자열에 넣지 않고 `?` 자리표시자 + 바인딩으로 처리하므로
    // 사용자 입력이 그대로 SQL이 되는 일(SQL 인젝션)이 없습니다.
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_REQUEST);
    qb.push(" WHERE r.pin_user_id = ").push_bind(pin_user_id);

    if let Some(status) = filter.status {
        qb.push(" AND r.status = ").push_bind(status.as_str());
    }
    if let Some(category_id) = filter.category_id {
        qb.push(" AND r.category_id = ").push_bind(category_id);
    }
    if let Some(from) = &filter.created_from {
        qb.push(" AND r.created_at >= ").push_bind(from.clone());
    }
    if let Some(to) = &filter.created_to {
        qb.push(" AND r.created_at <= ").push_bind(to.clone());
    }

    // 정렬 방향은 바인딩할 수 없어서 문자열로 넣습니다.
    // as_sql()은 "ASC" / "DESC" 둘 중 하나만 돌려주므로 안전합니다.
    let order = filter.order.as_sql();
    qb.push(format!(
        " ORDER BY r.created_at {order}, r.request_id {order}"
    ));

    // build_query_as::<PinRequest>(): 각 행을 FromRow로 구조체에 매핑
    let mut requests = qb
        .build_query_as::<PinRequest>()
        .fetch_all(&mut *conn)
        .await?;

    if let Some(keyword) = &filter.keyword {
        retain_keyword(&mut requests, keyword);
    }

    Ok(requests)
}

/// CSR 탐색용: Open / In Progress 상태의 모든 요청 (최신순)
pub async fn list_active_requests(
    conn: &mut SqliteConnection,
    keyword: Option<&str>,
) -> Result<Vec<PinRequest>, AppError> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_REQUEST);
    qb.push(" WHERE r.status IN (")
        .push_bind(RequestStatus::Open.as_str())
        .push(", ")
        .push_bind(RequestStatus::InProgress.as_str())
        .push(")");
    qb.push(" ORDER BY r.created_at DESC, r.request_id DESC");

    let mut requests = qb
        .build_query_as::<PinRequest>()
        .fetch_all(&mut *conn)
        .await?;

    if let Some(keyword) = keyword {
        retain_keyword(&mut requests, keyword);
    }

    Ok(requests)
}

/// 요청을 부분 수정합니다. 주어진 필드만 바뀌고 `updated_at`은 항상 갱신됩니다.
///
/// ## 반환값
/// - `Ok(Some(PinRequest))`: 수정된 요청 (변경 내용이 비어 있으면 현재 상태)
/// - `Ok(None)`: 없거나 소유자가 아님
pub async fn update_request(
    conn: &mut SqliteConnection,
    request_id: i64,
    pin_user_id: i64,
    changes: &RequestChanges,
) -> Result<Option<PinRequest>, AppError> {
    if changes.is_empty() {
        return get_request(conn, request_id, Some(pin_user_id)).await;
    }

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        "UPDATE requests SET updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
    );
    if let Some(title) = &changes.title {
        qb.push(", title = ").push_bind(title.clone());
    }
    if let Some(description) = &changes.description {
        qb.push(", description = ").push_bind(description.clone());
    }
    if let Some(location) = &changes.location {
        qb.push(", location = ").push_bind(location.clone());
    }
    if let Some(category_id) = changes.category_id {
        qb.push(", category_id = ").push_bind(category_id);
    }
    if let Some(status) = changes.status {
        qb.push(", status = ").push_bind(status.as_str());
    }
    qb.push(" WHERE request_id = ").push_bind(request_id);
    qb.push(" AND pin_user_id = ").push_bind(pin_user_id);

    let result = qb
        .build()
        .execute(&mut *conn)
        .await
        .map_err(|e| unknown_category(e.into(), changes.category_id))?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_request(conn, request_id, Some(pin_user_id)).await
}

/// 상태만 바꿉니다. 없거나 소유자가 아니면 `false`.
pub async fn set_request_status(
    conn: &mut SqliteConnection,
    request_id: i64,
    pin_user_id: Option<i64>,
    status: RequestStatus,
) -> Result<bool, AppError> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE requests SET status = ");
    qb.push_bind(status.as_str());
    qb.push(", updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')");
    qb.push(" WHERE request_id = ").push_bind(request_id);
    if let Some(owner) = pin_user_id {
        qb.push(" AND pin_user_id = ").push_bind(owner);
    }

    let result = qb.build().execute(&mut *conn).await?;
    Ok(result.rows_affected() > 0)
}

/// 요청을 참조하는 매치 수
pub async fn count_matches_for_request(
    conn: &mut SqliteConnection,
    request_id: i64,
) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM matches WHERE request_id = ?")
        .bind(request_id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(count)
}

/// 요청을 삭제합니다.
///
/// 매치가 하나라도 참조하고 있으면 삭제하지 않고 `AppError::InUse`를 반환합니다.
/// 숏리스트와 조회 기록은 `ON DELETE CASCADE`로 함께 지워집니다.
///
/// ## 반환값
/// - `Ok(true)`: 삭제됨
/// - `Ok(false)`: 없거나 소유자가 아님
pub async fn delete_request(
    conn: &mut SqliteConnection,
    request_id: i64,
    pin_user_id: i64,
) -> Result<bool, AppError> {
    if get_request(conn, request_id, Some(pin_user_id)).await?.is_none() {
        return Ok(false);
    }

    let references = count_matches_for_request(conn, request_id).await?;
    if references > 0 {
        return Err(request_in_use(request_id, references));
    }

    let result = sqlx::query("DELETE FROM requests WHERE request_id = ? AND pin_user_id = ?")
        .bind(request_id)
        .bind(pin_user_id)
        .execute(&mut *conn)
        .await;

    match result {
        Ok(done) => Ok(done.rows_affected() > 0),
        Err(e) => {
            let err = AppError::from(e);
            if err.is_foreign_key_violation() {
                let references = count_matches_for_request(conn, request_id).await?;
                return Err(request_in_use(request_id, references.max(1)));
            }
            Err(err)
        }
    }
}

// ── 리포트 집계 ──
// 기간 인자는 모두 저장 형식의 타임스탬프이며 양 끝을 포함합니다.

pub async fn count_requests_created(
    conn: &mut SqliteConnection,
    from: &str,
    to: &str,
) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM requests WHERE created_at >= ? AND created_at <= ?",
    )
    .bind(from)
    .bind(to)
    .fetch_one(&mut *conn)
    .await?;

    Ok(count)
}

/// 기간 내 생성된 요청의 상태별 개수
pub async fn request_status_snapshot(
    conn: &mut SqliteConnection,
    from: &str,
    to: &str,
) -> Result<StatusSnapshot, AppError> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT status, COUNT(*)
        FROM requests
        WHERE created_at >= ? AND created_at <= ?
        GROUP BY status
        "#,
    )
    .bind(from)
    .bind(to)
    .fetch_all(&mut *conn)
    .await?;

    let mut snapshot = StatusSnapshot::default();
    for (status, count) in rows {
        match status.trim().to_lowercase().as_str() {
            "open" => snapshot.open += count,
            "in progress" => snapshot.in_progress += count,
            "completed" | "complete" => snapshot.completed += count,
            "cancelled" | "canceled" => snapshot.cancelled += count,
            _ => {}
        }
    }

    Ok(snapshot)
}

pub async fn count_requests_by_location(
    conn: &mut SqliteConnection,
    from: &str,
    to: &str,
) -> Result<Vec<LocationCount>, AppError> {
    let rows = sqlx::query_as::<_, LocationCount>(
        r#"
        SELECT location, COUNT(*) AS count
        FROM requests
        WHERE created_at >= ? AND created_at <= ?
        GROUP BY location
        ORDER BY count DESC, location ASC
        "#,
    )
    .bind(from)
    .bind(to)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows)
}

/// 카테고리별 요청 수. `include_zero`면 요청이 없는 카테고리도 0으로 포함합니다.
pub async fn count_requests_by_category(
    conn: &mut SqliteConnection,
    from: &str,
    to: &str,
    include_zero: bool,
) -> Result<Vec<CategoryCount>, AppError> {
    let join = if include_zero { "LEFT JOIN" } else { "JOIN" };
    let sql = format!(
        r#"
        SELECT c.category_id, c.category_name AS category, COUNT(r.request_id) AS count
        FROM service_categories c
        {join} requests r
            ON r.category_id = c.category_id
           AND r.created_at >= ? AND r.created_at <= ?
        GROUP BY c.category_id, c.category_name
        ORDER BY count DESC, category ASC
        "#
    );

    let rows = sqlx::query_as::<_, CategoryCount>(&sql)
        .bind(from)
        .bind(to)
        .fetch_all(&mut *conn)
        .await?;

    Ok(rows)
}

/// 제목 또는 설명에 keyword가 포함된 행만 남깁니다 (순서는 유지).
fn retain_keyword(requests: &mut Vec<PinRequest>, keyword: &str) {
    let needle = keyword.to_lowercase();
    requests.retain(|r| {
        contains_folded(&r.title, &needle) || contains_folded(&r.description, &needle)
    });
}

fn request_in_use(request_id: i64, references: i64) -> AppError {
    AppError::InUse {
        message: format!(
            "Cannot delete: request {} is referenced by {} match record(s).",
            request_id, references
        ),
        references,
    }
}

fn unknown_category(err: AppError, category_id: Option<i64>) -> AppError {
    match category_id {
        Some(id) if err.is_foreign_key_violation() => {
            AppError::validation(format!("category_id {} does not exist", id))
        }
        _ => err,
    }
}
