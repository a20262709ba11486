//! # 완료 기록(Match) 모델 정의
//!
//! Match는 "어떤 CSR이 어떤 PIN의 요청을 언제 완료했는지"를 남기는 기록입니다.
//! 조회할 때는 부모 요청의 제목·카테고리·위치를 JOIN으로 붙여서 반환합니다.

use serde::{Deserialize, Serialize};

use crate::models::SortOrder;

/// 매치 상태는 항상 이 값으로 생성됩니다.
pub const MATCH_STATUS_COMPLETED: &str = "Completed";

/// 매치 엔티티: `matches` 테이블 한 행 + 부모 요청의 표시용 필드 (제목, 설명, 카테고리, 위치)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Match {
    pub match_id: i64,
    pub request_id: i64,
    pub csr_user_id: i64,
    pub pin_user_id: i64,
    /// 서비스 제공일 (`YYYY-MM-DD`)
    pub service_date: String,
    /// 완료 시각: 과거 데이터에서는 비어 있을 수 있음
    pub completion_date: Option<String>,
    pub status: String,
    pub request_title: String,
    pub request_description: String,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub location: String,
}

/// 과거 매치 조회/검색: `GET /api/v1/matches/past`, `GET /api/v1/matches/search`
#[derive(Debug, Default, Deserialize)]
pub struct PastMatchQuery {
    pub pin_user_id: Option<i64>,
    pub category_id: Option<i64>,
    /// `/search`에서만 사용됩니다.
    pub keyword: Option<String>,
    pub service_date_from: Option<String>,
    pub service_date_to: Option<String>,
    pub completion_from: Option<String>,
    pub completion_to: Option<String>,
    pub order: Option<SortOrder>,
}

/// 검증을 마친 과거 매치 조건
#[derive(Debug, Default, Clone)]
pub struct PastMatchFilter {
    pub category_id: Option<i64>,
    pub keyword: Option<String>,
    /// `YYYY-MM-DD`
    pub service_from: Option<String>,
    pub service_to: Option<String>,
    /// 저장 형식의 타임스탬프
    pub completion_from: Option<String>,
    pub completion_to: Option<String>,
    pub order: SortOrder,
}

/// `?pin_user_id=3`: 매치 단건 조회/삭제/되돌리기의 소유자 범위
#[derive(Debug, Default, Deserialize)]
pub struct MatchOwnerQuery {
    pub pin_user_id: Option<i64>,
}

/// 매치 단위 되돌리기 결과 (`POST /api/v1/matches/{id}/undo`)
#[derive(Debug, Clone, Serialize)]
pub struct UndoMatchSummary {
    pub success: bool,
    pub match_id: i64,
    pub request_id: i64,
    pub pin_user_id: i64,
    pub request_updated: bool,
    pub match_deleted: bool,
}
