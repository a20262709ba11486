//! # 서비스 카테고리 쿼리 모듈
//!
//! ## 테이블 구조
//! - `service_categories`: (category_id, category_name UNIQUE)
//! - `requests.category_id`가 카테고리를 참조하고 (`ON DELETE RESTRICT`),
//!   `matches`는 요청을 거쳐 간접적으로 참조합니다.
//!
//! 참조 중인 카테고리는 삭제할 수 없습니다. 삭제 전에 참조 수를 세어
//! `AppError::InUse`로 알려주고, 그 사이에 참조가 생긴 경우에는
//! 외래키 위반을 같은 에러로 바꿔서 돌려줍니다.

use sqlx::SqliteConnection;

use crate::error::AppError;
use crate::models::{Category, CategoryUsage};

/// 모든 카테고리를 이름순으로 조회합니다.
pub async fn list_categories(conn: &mut SqliteConnection) -> Result<Vec<Category>, AppError> {
    let categories = sqlx::query_as::<_, Category>(
        "SELECT category_id AS id, category_name AS name FROM service_categories ORDER BY category_name",
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(categories)
}

pub async fn get_category(
    conn: &mut SqliteConnection,
    category_id: i64,
) -> Result<Option<Category>, AppError> {
    let category = sqlx::query_as::<_, Category>(
        "SELECT category_id AS id, category_name AS name FROM service_categories WHERE category_id = ?",
    )
    .bind(category_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(category)
}

/// 새 카테고리를 만듭니다. 같은 이름이 이미 있으면 `Conflict`.
pub async fn create_category(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<Category, AppError> {
    let result = sqlx::query("INSERT INTO service_categories (category_name) VALUES (?)")
        .bind(name)
        .execute(&mut *conn)
        .await
        .map_err(|e| duplicate_name(e.into(), name))?;

    // last_insert_rowid(): 방금 INSERT한 행의 INTEGER PRIMARY KEY
    let id = result.last_insert_rowid();
    get_category(conn, id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created category".to_string()))
}

/// 카테고리 이름을 바꿉니다.
///
/// ## 반환값
/// - `Ok(Some(Category))`: 변경된 카테고리
/// - `Ok(None)`: 해당 ID가 없음
pub async fn rename_category(
    conn: &mut SqliteConnection,
    category_id: i64,
    name: &str,
) -> Result<Option<Category>, AppError> {
    let result = sqlx::query("UPDATE service_categories SET category_name = ? WHERE category_id = ?")
        .bind(name)
        .bind(category_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| duplicate_name(e.into(), name))?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_category(conn, category_id).await
}

/// 카테고리를 참조하는 요청 수와 (요청을 거쳐) 매치 수
pub async fn category_usage(
    conn: &mut SqliteConnection,
    category_id: i64,
) -> Result<CategoryUsage, AppError> {
    let (requests, matches) = sqlx::query_as::<_, (i64, i64)>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM requests WHERE category_id = ?1),
            (SELECT COUNT(*)
               FROM matches m
               JOIN requests r ON r.request_id = m.request_id
              WHERE r.category_id = ?1)
        "#,
    )
    .bind(category_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(CategoryUsage { requests, matches })
}

/// 카테고리를 삭제합니다.
///
/// ## 반환값
/// - `Ok(true)`: 삭제됨
/// - `Ok(false)`: 해당 ID가 없음
/// - `Err(AppError::InUse)`: 요청이나 매치가 참조 중
pub async fn delete_category(
    conn: &mut SqliteConnection,
    category_id: i64,
) -> Result<bool, AppError> {
    if get_category(conn, category_id).await?.is_none() {
        return Ok(false);
    }

    let usage = category_usage(conn, category_id).await?;
    if usage.total() > 0 {
        return Err(category_in_use(category_id, usage));
    }

    let result = sqlx::query("DELETE FROM service_categories WHERE category_id = ?")
        .bind(category_id)
        .execute(&mut *conn)
        .await;

    match result {
        Ok(done) => Ok(done.rows_affected() > 0),
        Err(e) => {
            let err = AppError::from(e);
            if err.is_foreign_key_violation() {
                let usage = category_usage(conn, category_id).await?;
                return Err(category_in_use(category_id, usage));
            }
            Err(err)
        }
    }
}

fn category_in_use(category_id: i64, usage: CategoryUsage) -> AppError {
    AppError::InUse {
        message: format!(
            "Cannot delete: category {} is used by {} request(s) and {} match(es).",
            category_id, usage.requests, usage.matches
        ),
        references: usage.total().max(1),
    }
}

fn duplicate_name(err: AppError, name: &str) -> AppError {
    if err.is_unique_violation() {
        AppError::Conflict(format!("category '{}' already exists", name))
    } else {
        err
    }
}
