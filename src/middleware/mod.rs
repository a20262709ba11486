//! HTTP 미들웨어와 요청 추출기(Extractor)
//!
//! - `auth`: JWT 액세스 토큰 발급/검증, `AuthUser` 추출기, 역할 확인
//! - `extract`: 해석 실패를 JSON 검증 에러로 돌려주는 `AppJson` / `AppQuery` / `AppPath`

pub mod auth;
pub mod extract;
