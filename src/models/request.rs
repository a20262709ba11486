//! # 지원 요청(Request) 모델 정의
//!
//! PIN 사용자가 등록하는 지원 요청과, 요청 생성/수정/검색/삭제 시
//! 클라이언트가 보내는 JSON 본문·쿼리 파라미터 구조체들을 정의합니다.
//!
//! ## 상태(status) 흐름
//! ```text
//! Open ──▶ In Progress ──▶ Completed
//!   ▲           │              │
//!   └───────────┴── Cancelled ◀┘   (어느 상태에서든 다른 상태로 이동 가능)
//! ```
//! Completed로 들어갈 때만 완료 기록(match)이 함께 만들어지고,
//! Completed에서 되돌릴 때는 별도의 undo-complete 연산을 사용합니다.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::SortOrder;

/// 요청 엔티티: `requests` 테이블 한 행 + 조회 시 집계되는 카운트
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PinRequest {
    pub request_id: i64,
    pub pin_user_id: i64,
    pub title: String,
    pub description: String,
    pub location: String,
    pub category_id: Option<i64>,
    /// "Open" | "In Progress" | "Completed" | "Cancelled"
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
    /// `request_views` 행 수 (저장 필드가 아님)
    pub view_count: i64,
    /// `shortlists` 행 수 (저장 필드가 아님)
    pub shortlist_count: i64,
}

/// 요청 상태
///
/// 문자열 표현은 DB와 JSON에서 그대로 쓰이며, 대소문자까지 정확히 일치해야 합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    #[serde(rename = "Open")]
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
    #[serde(rename = "Cancelled")]
    Cancelled,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 4] = [
        RequestStatus::Open,
        RequestStatus::InProgress,
        RequestStatus::Completed,
        RequestStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Open => "Open",
            RequestStatus::InProgress => "In Progress",
            RequestStatus::Completed => "Completed",
            RequestStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RequestStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                let allowed: Vec<&str> = RequestStatus::ALL.iter().map(|s| s.as_str()).collect();
                AppError::validation(format!("status must be one of {:?}", allowed))
            })
    }
}

/// 요청 생성: `POST /api/v1/requests`
///
/// 필수 필드도 `Option`으로 받아서, 누락 시 JSON 파싱 에러(422) 대신
/// 검증 에러(400)와 필드 이름을 돌려줍니다.
#[derive(Debug, Default, Deserialize)]
pub struct CreateRequestInput {
    pub pin_user_id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub category_id: Option<i64>,
}

/// 요청 수정: `PUT /api/v1/requests`
///
/// `status`가 "Completed"면 완료 기록(match)을 함께 보장하며,
/// 이때 `csr_id`가 서비스를 수행한 CSR로 기록됩니다.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateRequestInput {
    pub pin_user_id: Option<i64>,
    pub request_id: Option<i64>,
    pub csr_id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub category_id: Option<i64>,
    pub status: Option<String>,
}

/// 검증을 마친 부분 수정 내용 (None인 필드는 변경하지 않음)
#[derive(Debug, Default, Clone)]
pub struct RequestChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub category_id: Option<i64>,
    pub status: Option<RequestStatus>,
}

impl RequestChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.category_id.is_none()
            && self.status.is_none()
    }
}

/// 요청 삭제: `DELETE /api/v1/requests`
#[derive(Debug, Default, Deserialize)]
pub struct DeleteRequestInput {
    pub pin_user_id: Option<i64>,
    pub request_id: Option<i64>,
}

/// 내 요청 목록: `GET /api/v1/requests?pin_user_id=3&status=Open`
#[derive(Debug, Default, Deserialize)]
pub struct ListRequestsQuery {
    pub pin_user_id: Option<i64>,
    pub status: Option<String>,
    pub order: Option<SortOrder>,
}

/// 내 요청 검색: `GET /api/v1/requests/search?...`
#[derive(Debug, Default, Deserialize)]
pub struct SearchRequestsQuery {
    pub pin_user_id: Option<i64>,
    pub keyword: Option<String>,
    pub status: Option<String>,
    pub category_id: Option<i64>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub order: Option<SortOrder>,
}

/// 검증을 마친 검색 조건
///
/// 날짜는 DB에 저장된 형식(`YYYY-MM-DDTHH:MM:SS.sssZ`)으로 변환된 상태입니다.
#[derive(Debug, Default, Clone)]
pub struct RequestFilter {
    pub keyword: Option<String>,
    pub status: Option<RequestStatus>,
    pub category_id: Option<i64>,
    pub created_from: Option<String>,
    pub created_to: Option<String>,
    pub order: SortOrder,
}

/// CSR 요청 탐색: `GET /api/v1/requests/active?search=...`
#[derive(Debug, Default, Deserialize)]
pub struct ActiveRequestsQuery {
    pub search: Option<String>,
}

/// 완료 되돌리기: `POST /api/v1/matches/undo-complete`
#[derive(Debug, Default, Deserialize)]
pub struct UndoCompleteInput {
    pub request_id: Option<i64>,
    pub pin_user_id: Option<i64>,
    /// 되돌린 후의 상태 (기본값: "Open")
    pub new_status: Option<String>,
}

/// 완료 되돌리기 결과
///
/// `matches_deleted`와 `request_updated`를 따로 보고하므로,
/// 매치가 없던 요청을 되돌린 경우(0건 삭제)도 구분할 수 있습니다.
#[derive(Debug, Clone, Serialize)]
pub struct UndoCompleteSummary {
    pub request_id: i64,
    pub pin_user_id: i64,
    pub matches_deleted: u64,
    pub request_updated: bool,
    pub status: String,
}
