//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 데이터베이스와 직접 상호작용하는 함수들을 모아둔 모듈입니다.
//! 서비스 계층(services/)과 라우트 핸들러(routes/)에서 이 모듈의 함수를 호출합니다.
//!
//! 모든 함수는 `&mut SqliteConnection`을 받습니다.
//! - 단일 쿼리: `let mut conn = pool.acquire().await?;` 후 `&mut conn` 전달
//! - 여러 단계 연산: `let mut tx = pool.begin().await?;` 후 `&mut tx` 전달
//!
//! `PoolConnection`과 `Transaction` 모두 `SqliteConnection`으로 역참조(Deref)되므로
//! 같은 함수를 트랜잭션 안팎에서 그대로 재사용할 수 있습니다.
//!
//! 각 하위 모듈:
//! - `categories`: 서비스 카테고리 CRUD와 삭제 가드
//! - `matches`: 완료 기록(match) 생성/조회/삭제, 리포트용 집계
//! - `requests`: 지원 요청 CRUD, 검색, 리포트용 집계
//! - `shortlists`: CSR 숏리스트 토글/조회
//! - `users`: 사용자 계정
//! - `views`: 요청 조회 기록

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::error::AppError;

pub mod categories;
pub mod matches;
pub mod requests;
pub mod shortlists;
pub mod users;
pub mod views;

// `crate::db::get_request`처럼 바로 접근할 수 있게 재공개합니다.
// users는 이름 충돌을 피하기 위해 `db::users::...`로만 사용합니다.
pub use categories::*;
pub use matches::*;
pub use requests::*;
pub use shortlists::*;
pub use views::*;

/// SQLite 연결 풀을 만들고 `./migrations`의 마이그레이션을 적용합니다.
///
/// - 외래키 검사를 켭니다 (삭제 가드가 이에 의존).
/// - 파일이 없으면 새로 만듭니다.
/// - 유휴 연결을 닫지 않습니다. `sqlite::memory:`는 연결이 닫히면 데이터도 사라지기 때문입니다.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, AppError> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .foreign_keys(true)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// `haystack`에 `needle`이 포함되는지 확인합니다 (유니코드 대소문자 무시).
///
/// `needle`은 호출하는 쪽에서 `to_lowercase()`로 미리 접어 둔 값이어야 합니다.
/// SQLite의 `lower()`는 ASCII만 바꾸므로 "Ärztliche"와 "ärztliche"를 같게 보지 못합니다.
/// 그래서 키워드 조건은 SQL이 아니라 조회한 행에 이 함수로 적용합니다.
pub(crate) fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folded_match_handles_non_ascii_case() {
        assert!(contains_folded("Ärztliche Hilfe", "ärztliche"));
        assert!(contains_folded("ÉCOLE Primaire", "école"));
        assert!(!contains_folded("Groceries", "ärzt"));
    }
}
