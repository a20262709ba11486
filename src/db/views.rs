//! 요청 조회 기록 (`request_views`)

use sqlx::SqliteConnection;

use crate::error::AppError;

/// 조회 한 건을 기록합니다.
pub async fn record_view(conn: &mut SqliteConnection, request_id: i64) -> Result<(), AppError> {
    sqlx::query("INSERT INTO request_views (request_id) VALUES (?)")
        .bind(request_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

pub async fn count_views(
    conn: &mut SqliteConnection,
    from: &str,
    to: &str,
) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM request_views WHERE viewed_at >= ? AND viewed_at <= ?",
    )
    .bind(from)
    .bind(to)
    .fetch_one(&mut *conn)
    .await?;

    Ok(count)
}
