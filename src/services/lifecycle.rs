//! # 요청 생명주기 컨트롤러
//!
//! 입력을 검증한 뒤 Request Store(`db::requests`)와 Match Store(`db::matches`)를
//! 조합해서 상태 전이를 수행합니다.
//!
//! ## 트랜잭션
//! 두 단계 이상인 연산은 하나의 트랜잭션 안에서 실행됩니다.
//! - `update_request`: 요청 수정 + (Completed일 때) 매치 보장
//! - `delete_request`: 참조 확인 + 삭제
//! - `undo_complete`: 매치 삭제 + 상태 복구
//! - `undo_match`: 상태 복구 + 매치 삭제
//!
//! 중간에 `?`로 빠져나가면 `Transaction`이 커밋 없이 drop되면서 롤백됩니다.
//! 그래서 매치 생성이 실패하면 요청 수정도 함께 취소됩니다.

use sqlx::SqlitePool;

use crate::db;
use crate::error::AppError;
use crate::models::*;
use crate::services::validation::{
    date_range, datetime_range, normalize_keyword, optional_positive_id, optional_status,
    optional_text, require_positive_id, require_text,
};

// ── 요청 (PIN) ──

/// 새 요청을 만듭니다. 상태는 Open, 텍스트는 앞뒤 공백을 제거해서 저장합니다.
pub async fn create_request(
    pool: &SqlitePool,
    input: &CreateRequestInput,
) -> Result<PinRequest, AppError> {
    let pin_user_id = require_positive_id(input.pin_user_id, "pin_user_id")?;
    let title = require_text(input.title.as_deref(), "title")?;
    let description = require_text(input.description.as_deref(), "description")?;
    let location = require_text(input.location.as_deref(), "location")?;
    let category_id = optional_positive_id(input.category_id, "category_id")?;

    let mut conn = pool.acquire().await?;
    if let Some(id) = category_id {
        require_category(&mut conn, id).await?;
    }

    let request = db::create_request(
        &mut conn,
        pin_user_id,
        &title,
        &description,
        &location,
        category_id,
    )
    .await?;

    tracing::info!(
        "Request {} created by PIN user {}",
        request.request_id,
        pin_user_id
    );

    Ok(request)
}

pub async fn list_my_requests(
    pool: &SqlitePool,
    query: &ListRequestsQuery,
) -> Result<Vec<PinRequest>, AppError> {
    let pin_user_id = require_positive_id(query.pin_user_id, "pin_user_id")?;
    let status = optional_status(non_blank(query.status.as_deref()))?;

    let mut conn = pool.acquire().await?;
    db::list_requests_by_owner(&mut conn, pin_user_id, status, query.order.unwrap_or_default())
        .await
}

pub async fn search_my_requests(
    pool: &SqlitePool,
    query: &SearchRequestsQuery,
) -> Result<Vec<PinRequest>, AppError> {
    let pin_user_id = require_positive_id(query.pin_user_id, "pin_user_id")?;
    let (created_from, created_to) =
        datetime_range(query.date_from.as_deref(), query.date_to.as_deref())?;

    let filter = RequestFilter {
        keyword: normalize_keyword(query.keyword.as_deref()),
        status: optional_status(non_blank(query.status.as_deref()))?,
        category_id: optional_positive_id(query.category_id, "category_id")?,
        created_from,
        created_to,
        order: query.order.unwrap_or_default(),
    };

    let mut conn = pool.acquire().await?;
    db::search_requests(&mut conn, pin_user_id, &filter).await
}

/// 요청을 수정합니다.
///
/// 새 상태가 "Completed"면 같은 트랜잭션 안에서 Completed 매치를 보장합니다.
/// 아직 매치가 없으면 `csr_id`가 필요하고, 없으면 검증 에러와 함께
/// 요청 수정까지 롤백됩니다.
pub async fn update_request(
    pool: &SqlitePool,
    input: &UpdateRequestInput,
) -> Result<PinRequest, AppError> {
    let pin_user_id = require_positive_id(input.pin_user_id, "pin_user_id")?;
    let request_id = require_positive_id(input.request_id, "request_id")?;
    let csr_id = optional_positive_id(input.csr_id, "csr_id")?;

    let changes = RequestChanges {
        title: optional_text(input.title.as_deref(), "title")?,
        description: optional_text(input.description.as_deref(), "description")?,
        location: optional_text(input.location.as_deref(), "location")?,
        category_id: optional_positive_id(input.category_id, "category_id")?,
        status: optional_status(input.status.as_deref())?,
    };

    // 트랜잭션 시작
    // `Transaction`은 `commit()` 없이 drop되면 자동으로 ROLLBACK 합니다.
    // 그래서 아래의 `?`로 중간에 빠져나가면 (카테고리 없음, 매치 생성 실패 등)
    // 요청 수정도 함께 취소됩니다. 따로 rollback()을 부를 필요가 없어요.
    let mut tx = pool.begin().await?;

    if let Some(id) = changes.category_id {
        require_category(&mut tx, id).await?;
    }

    // 0행 수정 = 없거나 남의 요청 → `Option::None` → `ok_or`로 404
    let updated = db::update_request(&mut tx, request_id, pin_user_id, &changes)
        .await?
        .ok_or(AppError::NotFound)?;

    if changes.status == Some(RequestStatus::Completed) {
        // csr_id가 없어 실패하면 여기서 return → tx drop → 위 UPDATE도 롤백
        db::ensure_completed(&mut tx, request_id, pin_user_id, csr_id, None, None).await?;
    }

    // 여기까지 와야 비로소 DB에 반영됩니다.
    tx.commit().await?;

    tracing::info!(
        "Request {} updated (status: {})",
        request_id,
        updated.status
    );

    Ok(updated)
}

/// 요청을 삭제합니다. 매치가 남아 있으면 `AppError::InUse` (HTTP 409).
///
/// ## 반환값
/// - `Ok(true)`: 삭제됨
/// - `Ok(false)`: 없거나 소유자가 아님
pub async fn delete_request(
    pool: &SqlitePool,
    input: &DeleteRequestInput,
) -> Result<bool, AppError> {
    let pin_user_id = require_positive_id(input.pin_user_id, "pin_user_id")?;
    let request_id = require_positive_id(input.request_id, "request_id")?;

    let mut tx = pool.begin().await?;
    let deleted = db::delete_request(&mut tx, request_id, pin_user_id).await?;
    tx.commit().await?;

    if deleted {
        tracing::info!("Request {} deleted by PIN user {}", request_id, pin_user_id);
    }

    Ok(deleted)
}

/// 요청 기준 완료 되돌리기
///
/// 요청의 매치를 모두 지우고 상태를 `new_status`(기본 Open)로 바꿉니다.
/// 매치가 없던 요청도 상태는 바뀌며, 이 경우 `matches_deleted`는 0입니다.
pub async fn undo_complete(
    pool: &SqlitePool,
    input: &UndoCompleteInput,
) -> Result<UndoCompleteSummary, AppError> {
    let request_id = require_positive_id(input.request_id, "request_id")?;
    let pin_user_id = require_positive_id(input.pin_user_id, "pin_user_id")?;
    let new_status =
        optional_status(non_blank(input.new_status.as_deref()))?.unwrap_or(RequestStatus::Open);
    if new_status == RequestStatus::Completed {
        return Err(AppError::validation(
            "new_status must be one of [\"Open\", \"In Progress\", \"Cancelled\"]",
        ));
    }

    let mut tx = pool.begin().await?;

    // 여기서 return해도 tx가 drop되며 롤백되므로 정리할 것이 없습니다.
    if db::get_request(&mut tx, request_id, Some(pin_user_id))
        .await?
        .is_none()
    {
        return Err(AppError::NotFound);
    }

    let matches_deleted =
        db::delete_matches_by_request(&mut tx, request_id, Some(pin_user_id)).await?;
    let request_updated =
        db::set_request_status(&mut tx, request_id, Some(pin_user_id), new_status).await?;

    tx.commit().await?;

    tracing::info!(
        "Completion undone for request {}: {} match(es) deleted, status -> {}",
        request_id,
        matches_deleted,
        new_status
    );

    Ok(UndoCompleteSummary {
        request_id,
        pin_user_id,
        matches_deleted,
        request_updated,
        status: new_status.as_str().to_string(),
    })
}

// ── 매치 (PIN 과거 기록) ──

/// 매치 기준 완료 되돌리기: 부모 요청을 In Progress로 되돌리고 매치를 지웁니다.
pub async fn undo_match(
    pool: &SqlitePool,
    match_id: i64,
    pin_user_id: Option<i64>,
) -> Result<UndoMatchSummary, AppError> {
    let match_id = require_positive_id(Some(match_id), "match_id")?;
    let pin_user_id = optional_positive_id(pin_user_id, "pin_user_id")?;

    let mut tx = pool.begin().await?;

    let existing = db::get_match(&mut tx, match_id, pin_user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let request_updated = db::set_request_status(
        &mut tx,
        existing.request_id,
        Some(existing.pin_user_id),
        RequestStatus::InProgress,
    )
    .await?;
    let match_deleted = db::delete_match(&mut tx, match_id, pin_user_id)
        .await?
        .is_some();

    tx.commit().await?;

    tracing::info!(
        "Match {} undone, request {} back to In Progress",
        match_id,
        existing.request_id
    );

    Ok(UndoMatchSummary {
        success: true,
        match_id,
        request_id: existing.request_id,
        pin_user_id: existing.pin_user_id,
        request_updated,
        match_deleted,
    })
}

pub async fn list_past_matches(
    pool: &SqlitePool,
    query: &PastMatchQuery,
) -> Result<Vec<Match>, AppError> {
    let (pin_user_id, filter) = past_match_filter(query)?;
    let mut conn = pool.acquire().await?;
    db::list_past_matches(&mut conn, pin_user_id, &filter).await
}

pub async fn search_past_matches(
    pool: &SqlitePool,
    query: &PastMatchQuery,
) -> Result<Vec<Match>, AppError> {
    let (pin_user_id, filter) = past_match_filter(query)?;
    let mut conn = pool.acquire().await?;
    db::search_past_matches(&mut conn, pin_user_id, &filter).await
}

pub async fn get_match(
    pool: &SqlitePool,
    match_id: i64,
    pin_user_id: Option<i64>,
) -> Result<Match, AppError> {
    let match_id = require_positive_id(Some(match_id), "match_id")?;
    let pin_user_id = optional_positive_id(pin_user_id, "pin_user_id")?;

    let mut conn = pool.acquire().await?;
    db::get_match(&mut conn, match_id, pin_user_id)
        .await?
        .ok_or(AppError::NotFound)
}

/// 매치 하나를 지우고 삭제 직전의 스냅샷을 돌려줍니다.
pub async fn delete_match(
    pool: &SqlitePool,
    match_id: i64,
    pin_user_id: Option<i64>,
) -> Result<Match, AppError> {
    let match_id = require_positive_id(Some(match_id), "match_id")?;
    let pin_user_id = optional_positive_id(pin_user_id, "pin_user_id")?;

    let mut tx = pool.begin().await?;
    let deleted = db::delete_match(&mut tx, match_id, pin_user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    tx.commit().await?;

    tracing::info!("Match {} deleted", match_id);
    Ok(deleted)
}

/// 카테고리에 속한 요청들의 매치를 일괄 삭제합니다.
pub async fn delete_matches_by_category(
    pool: &SqlitePool,
    category_id: i64,
    pin_user_id: Option<i64>,
) -> Result<u64, AppError> {
    let category_id = require_positive_id(Some(category_id), "category_id")?;
    let pin_user_id = optional_positive_id(pin_user_id, "pin_user_id")?;

    let mut conn = pool.acquire().await?;
    require_found_category(&mut conn, category_id).await?;
    let deleted = db::delete_matches_by_category(&mut conn, category_id, pin_user_id).await?;

    tracing::info!(
        "Deleted {} match(es) under category {}",
        deleted,
        category_id
    );
    Ok(deleted)
}

// ── CSR 탐색 ──

/// Open / In Progress 요청 목록 (검색어가 비어 있으면 전체)
pub async fn list_active_requests(
    pool: &SqlitePool,
    query: &ActiveRequestsQuery,
) -> Result<Vec<PinRequest>, AppError> {
    let keyword = normalize_keyword(query.search.as_deref());
    let mut conn = pool.acquire().await?;
    db::list_active_requests(&mut conn, keyword.as_deref()).await
}

/// CSR이 요청을 열어 봅니다. 조회 기록을 남긴 뒤 (조회 수가 반영된) 요청을 반환합니다.
pub async fn read_request(pool: &SqlitePool, request_id: i64) -> Result<PinRequest, AppError> {
    let request_id = require_positive_id(Some(request_id), "request_id")?;

    let mut tx = pool.begin().await?;
    if db::get_request(&mut tx, request_id, None).await?.is_none() {
        return Err(AppError::NotFound);
    }
    db::record_view(&mut tx, request_id).await?;
    let request = db::get_request(&mut tx, request_id, None)
        .await?
        .ok_or(AppError::NotFound)?;
    tx.commit().await?;

    Ok(request)
}

/// 요청을 숏리스트에 담은 CSR 수 (PIN 화면용)
pub async fn shortlist_count(pool: &SqlitePool, request_id: i64) -> Result<i64, AppError> {
    let request_id = require_positive_id(Some(request_id), "request_id")?;

    let mut conn = pool.acquire().await?;
    if db::get_request(&mut conn, request_id, None).await?.is_none() {
        return Err(AppError::NotFound);
    }
    db::count_shortlists_for_request(&mut conn, request_id).await
}

// ── 내부 헬퍼 ──

fn past_match_filter(query: &PastMatchQuery) -> Result<(i64, PastMatchFilter), AppError> {
    let pin_user_id = require_positive_id(query.pin_user_id, "pin_user_id")?;
    let (service_from, service_to) = date_range(
        query.service_date_from.as_deref(),
        query.service_date_to.as_deref(),
    )?;
    let (completion_from, completion_to) = datetime_range(
        query.completion_from.as_deref(),
        query.completion_to.as_deref(),
    )?;

    let filter = PastMatchFilter {
        category_id: optional_positive_id(query.category_id, "category_id")?,
        keyword: normalize_keyword(query.keyword.as_deref()),
        service_from,
        service_to,
        completion_from,
        completion_to,
        order: query.order.unwrap_or_default(),
    };

    Ok((pin_user_id, filter))
}

/// 존재하지 않는 카테고리를 가리키면 검증 에러 (요청 생성/수정용)
async fn require_category(
    conn: &mut sqlx::SqliteConnection,
    category_id: i64,
) -> Result<(), AppError> {
    if db::get_category(conn, category_id).await?.is_none() {
        return Err(AppError::validation(format!(
            "category_id {} does not exist",
            category_id
        )));
    }
    Ok(())
}

/// 존재하지 않는 카테고리면 404 (카테고리 자체를 대상으로 하는 연산용)
async fn require_found_category(
    conn: &mut sqlx::SqliteConnection,
    category_id: i64,
) -> Result<(), AppError> {
    db::get_category(conn, category_id)
        .await?
        .map(|_| ())
        .ok_or(AppError::NotFound)
}

/// 쿼리 파라미터 `?status=`처럼 빈 값은 "필터 없음"
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
