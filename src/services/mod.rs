//! # 서비스 계층
//!
//! 라우트 핸들러와 DB 계층 사이에서 입력 검증과 여러 단계 연산(트랜잭션)을 담당합니다.
//!
//! - `auth`: 비밀번호 해싱, 로그인 확인, 사용자 관리, 첫 Admin 계정
//! - `lifecycle`: 요청 생명주기 (생성/수정/삭제/완료 되돌리기), 과거 매치, CSR 탐색
//! - `reports`: 기간별 활동 요약
//! - `shortlists`: CSR 숏리스트
//! - `validation`: 공통 입력 검증과 날짜 파싱

pub mod auth;
pub mod lifecycle;
pub mod reports;
pub mod shortlists;
pub mod validation;
