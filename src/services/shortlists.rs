use sqlx::SqlitePool;

use crate::db;
use crate::error::AppError;
use crate::models::{ShortlistEntry, ShortlistQuery, ToggleShortlistInput};
use crate::services::validation::{normalize_keyword, require_positive_id};

/// 숏리스트 토글: 있으면 지우고, 없으면 현재 시각으로 추가합니다.
/// 호출자에게는 어느 쪽이었는지 알려주지 않습니다.
pub async fn toggle(pool: &SqlitePool, input: &ToggleShortlistInput) -> Result<(), AppError> {
    let csr_id = require_positive_id(input.csr_id, "csr_id")?;
    let request_id = require_positive_id(input.request_id, "request_id")?;
    let notes = input
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let mut tx = pool.begin().await?;
    if db::get_request(&mut tx, request_id, None).await?.is_none() {
        return Err(AppError::NotFound);
    }
    let added = db::toggle_shortlist(&mut tx, csr_id, request_id, notes).await?;
    tx.commit().await?;

    tracing::debug!(
        "Shortlist toggled: csr {} request {} ({})",
        csr_id,
        request_id,
        if added { "added" } else { "removed" }
    );

    Ok(())
}

/// CSR의 숏리스트 (검색어가 있으면 제목, 설명, 메모로 거름)
pub async fn view(pool: &SqlitePool, query: &ShortlistQuery) -> Result<Vec<ShortlistEntry>, AppError> {
    let csr_id = require_positive_id(query.csr_id, "csr_id")?;
    let search = normalize_keyword(query.search.as_deref());

    let mut conn = pool.acquire().await?;
    db::search_shortlist(&mut conn, csr_id, search.as_deref()).await
}
