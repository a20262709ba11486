//! # 서비스 카테고리 모델 정의
//!
//! 요청 분류용 라벨입니다 (예: "Shelter", "Hunger Relief").

use serde::{Deserialize, Serialize};

/// 카테고리 엔티티: JSON에서는 `{ "id": 1, "name": "Shelter" }` 형태입니다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// 카테고리 생성/이름 변경: `POST /categories`, `PATCH /categories/{id}`
#[derive(Debug, Default, Deserialize)]
pub struct CategoryInput {
    pub name: Option<String>,
}

/// 카테고리를 참조하는 레코드 수 (삭제 가드에 사용)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryUsage {
    pub requests: i64,
    /// 요청을 거쳐 간접적으로 참조하는 매치 수
    pub matches: i64,
}

impl CategoryUsage {
    pub fn total(&self) -> i64 {
        self.requests + self.matches
    }
}
