//! # 사용자 인증과 계정 관리
//!
//! 비밀번호는 Argon2id 해시(PHC 문자열)로만 저장합니다.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand_core::OsRng;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db::users as db_users;
use crate::error::AppError;
use crate::models::user::*;
use crate::services::validation::{require_positive_id, require_text};

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(password_hash)
        .map_err(|e| AppError::Internal(format!("Password hash parse error: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// 사용자 이름, 비밀번호, 역할이 모두 맞으면 사용자를 반환합니다.
/// 하나라도 틀리면 `Ok(None)` (어느 것이 틀렸는지는 알려주지 않습니다).
pub async fn authenticate(
    pool: &SqlitePool,
    username: &str,
    password: &str,
    role: &str,
) -> Result<Option<User>, AppError> {
    let mut conn = pool.acquire().await?;
    let Some(user) = db_users::find_by_username_and_role(&mut conn, username.trim(), role).await?
    else {
        return Ok(None);
    };

    if verify_password(password, &user.password_hash)? {
        Ok(Some(user))
    } else {
        Ok(None)
    }
}

pub async fn create_user(pool: &SqlitePool, req: &CreateUserRequest) -> Result<User, AppError> {
    let username = require_text(req.username.as_deref(), "username")?;
    let password = req
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::validation("password is required"))?;
    let role: Role = require_text(req.role.as_deref(), "role")?.parse()?;
    let full_name = trimmed(req.full_name.as_deref());
    let email = trimmed(req.email.as_deref());
    if let Some(email) = email {
        if !email.contains('@') {
            return Err(AppError::validation("Invalid email address"));
        }
    }

    let password_hash = hash_password(password)?;

    let mut conn = pool.acquire().await?;
    let user = db_users::create_user(&mut conn, &username, &password_hash, role, full_name, email)
        .await?;

    tracing::info!("User {} created with role {}", user.username, user.role);
    Ok(user)
}

pub async fn list_users(pool: &SqlitePool, search: Option<&str>) -> Result<Vec<User>, AppError> {
    let search = search.map(str::trim).filter(|s| !s.is_empty());
    let mut conn = pool.acquire().await?;
    db_users::search_users(&mut conn, search).await
}

pub async fn update_user(
    pool: &SqlitePool,
    user_id: i64,
    req: &UpdateUserRequest,
) -> Result<User, AppError> {
    let user_id = require_positive_id(Some(user_id), "user_id")?;
    let role = req
        .role
        .as_deref()
        .map(|r| r.trim().parse::<Role>())
        .transpose()?;
    let password_hash = match req.password.as_deref().filter(|p| !p.is_empty()) {
        Some(password) => Some(hash_password(password)?),
        None => None,
    };

    let mut conn = pool.acquire().await?;
    db_users::update_user(
        &mut conn,
        user_id,
        req.full_name.as_deref().map(str::trim),
        req.email.as_deref().map(str::trim),
        role,
        password_hash.as_deref(),
    )
    .await?
    .ok_or(AppError::NotFound)
}

pub async fn delete_user(pool: &SqlitePool, user_id: i64) -> Result<(), AppError> {
    let mut conn = pool.acquire().await?;
    if !db_users::delete_user(&mut conn, user_id).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!("User {} deleted", user_id);
    Ok(())
}

/// 사용자 테이블이 비어 있고 ADMIN_USERNAME / ADMIN_PASSWORD가 설정되어 있으면
/// 첫 Admin 계정을 만듭니다.
pub async fn seed_admin(pool: &SqlitePool, config: &Config) -> Result<(), AppError> {
    let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) else {
        return Ok(());
    };

    let mut conn = pool.acquire().await?;
    if db_users::count_users(&mut conn).await? > 0 {
        return Ok(());
    }

    let password_hash = hash_password(password)?;
    db_users::create_user(&mut conn, username.trim(), &password_hash, Role::Admin, None, None)
        .await?;

    tracing::info!("Seeded initial Admin account '{}'", username.trim());
    Ok(())
}

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
