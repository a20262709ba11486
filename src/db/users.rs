use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::db::contains_folded;
use crate::error::AppError;
use crate::models::user::{Role, User};

const SELECT_USER: &str =
    "SELECT user_id, username, password_hash, role, full_name, email, created_at FROM users";

pub async fn create_user(
    conn: &mut SqliteConnection,
    username: &str,
    password_hash: &str,
    role: Role,
    full_name: Option<&str>,
    email: Option<&str>,
) -> Result<User, AppError> {
    let result = sqlx::query(
        r#"
        INSERT INTO users (username, password_hash, role, full_name, email)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(username)
    .bind(password_hash)
    .bind(role.as_str())
    .bind(full_name)
    .bind(email)
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        let err = AppError::from(e);
        if err.is_unique_violation() {
            AppError::Conflict("Username already exists".to_string())
        } else {
            err
        }
    })?;

    find_by_id(conn, result.last_insert_rowid())
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created user".to_string()))
}

/// 로그인용 조회: 사용자 이름과 역할이 모두 정확히 일치해야 합니다.
pub async fn find_by_username_and_role(
    conn: &mut SqliteConnection,
    username: &str,
    role: &str,
) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "{} WHERE username = ? AND role = ?",
        SELECT_USER
    ))
    .bind(username)
    .bind(role)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(user)
}

pub async fn find_by_id(conn: &mut SqliteConnection, user_id: i64) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!("{} WHERE user_id = ?", SELECT_USER))
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(user)
}

/// 사용자 목록. `keyword`가 있으면 이름, 역할, 실명, 이메일 중 하나에 포함된 사용자만
/// (유니코드 대소문자 무시).
pub async fn search_users(
    conn: &mut SqliteConnection,
    keyword: Option<&str>,
) -> Result<Vec<User>, AppError> {
    let mut users = sqlx::query_as::<_, User>(&format!("{} ORDER BY user_id", SELECT_USER))
        .fetch_all(&mut *conn)
        .await?;

    if let Some(keyword) = keyword {
        let needle = keyword.to_lowercase();
        users.retain(|u| {
            contains_folded(&u.username, &needle)
                || contains_folded(&u.role, &needle)
                || u.full_name.as_deref().is_some_and(|f| contains_folded(f, &needle))
                || u.email.as_deref().is_some_and(|e| contains_folded(e, &needle))
        });
    }

    Ok(users)
}

/// 프로필 필드를 부분 수정합니다. 없는 사용자면 `Ok(None)`.
pub async fn update_user(
    conn: &mut SqliteConnection,
    user_id: i64,
    full_name: Option<&str>,
    email: Option<&str>,
    role: Option<Role>,
    password_hash: Option<&str>,
) -> Result<Option<User>, AppError> {
    if full_name.is_none() && email.is_none() && role.is_none() && password_hash.is_none() {
        return find_by_id(conn, user_id).await;
    }

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE users SET ");
    let mut fields = qb.separated(", ");
    if let Some(full_name) = full_name {
        fields.push("full_name = ").push_bind_unseparated(full_name.to_string());
    }
    if let Some(email) = email {
        fields.push("email = ").push_bind_unseparated(email.to_string());
    }
    if let Some(role) = role {
        fields.push("role = ").push_bind_unseparated(role.as_str());
    }
    if let Some(hash) = password_hash {
        fields.push("password_hash = ").push_bind_unseparated(hash.to_string());
    }
    qb.push(" WHERE user_id = ").push_bind(user_id);

    let result = qb.build().execute(&mut *conn).await?;
    if result.rows_affected() == 0 {
        return Ok(None);
    }

    find_by_id(conn, user_id).await
}

pub async fn delete_user(conn: &mut SqliteConnection, user_id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM users WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn count_users(conn: &mut SqliteConnection) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(&mut *conn)
        .await?;

    Ok(count)
}

/// 기간 내 새로 만들어진 CSR 계정 수
pub async fn count_new_csrs(
    conn: &mut SqliteConnection,
    from: &str,
    to: &str,
) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM users WHERE role = ? AND created_at >= ? AND created_at <= ?",
    )
    .bind(Role::CsrRep.as_str())
    .bind(from)
    .bind(to)
    .fetch_one(&mut *conn)
    .await?;

    Ok(count)
}

/// 기간 내 숏리스트에 담거나 매치를 완료한 CSR 수 (중복 제거)
pub async fn count_active_csrs(
    conn: &mut SqliteConnection,
    from: &str,
    to: &str,
) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(DISTINCT csr_user_id) FROM (
            SELECT csr_user_id FROM shortlists
             WHERE added_at >= ?1 AND added_at <= ?2
            UNION
            SELECT csr_user_id FROM matches
             WHERE completion_date >= ?1 AND completion_date <= ?2
        )
        "#,
    )
    .bind(from)
    .bind(to)
    .fetch_one(&mut *conn)
    .await?;

    Ok(count)
}
