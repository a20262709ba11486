//! # 숏리스트 모델 정의
//!
//! CSR이 관심 있는 요청을 북마크해 두는 목록입니다.
//! 같은 (CSR, 요청) 조합으로 두 번 저장하면 해제되는 토글 방식입니다.

use serde::{Deserialize, Serialize};

/// 숏리스트 항목 + 요청 정보 (목록/검색 응답용)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ShortlistEntry {
    pub csr_user_id: i64,
    pub request_id: i64,
    pub notes: Option<String>,
    pub added_at: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub location: String,
    pub category_id: Option<i64>,
    pub created_at: String,
}

/// 숏리스트 토글: `POST /api/v1/shortlist`
#[derive(Debug, Default, Deserialize)]
pub struct ToggleShortlistInput {
    pub csr_id: Option<i64>,
    pub request_id: Option<i64>,
    pub notes: Option<String>,
}

/// 숏리스트 조회/검색: `GET /api/v1/shortlist?csr_id=3&search=...`
#[derive(Debug, Default, Deserialize)]
pub struct ShortlistQuery {
    pub csr_id: Option<i64>,
    pub search: Option<String>,
}
