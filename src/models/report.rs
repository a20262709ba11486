//! # 리포트 모델 정의
//!
//! 최근 N일 동안의 요청/매치/숏리스트/조회 활동을 요약한 결과입니다.

use serde::{Deserialize, Serialize};

/// 요청 상태별 개수
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub open: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub cancelled: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LocationCount {
    pub location: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CategoryCount {
    pub category_id: i64,
    pub category: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub from_ts: String,
    pub to_ts: String,
    pub requests_created: i64,
    pub request_views: i64,
    pub request_shortlists: i64,
    pub matches_created: i64,
    pub matches_completed: i64,
    pub status_snapshot: StatusSnapshot,
    /// 매치 완료 시각 - 요청 생성 시각의 평균 (일 단위), 데이터가 없으면 null
    pub avg_time_to_completion_days: Option<f64>,
    pub by_location: Vec<LocationCount>,
    pub by_category: Vec<CategoryCount>,
    pub new_csrs: i64,
    pub active_csrs: i64,
}

/// `GET /api/v1/report?days=30&include_zero=true`
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub days: Option<i64>,
    pub include_zero: Option<bool>,
}
