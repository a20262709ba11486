//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! - `request`: 지원 요청(PinRequest)과 상태(RequestStatus), 요청 관련 입력 구조체
//! - `match_record`: 완료 기록(Match)과 과거 매치 조회 조건
//! - `category`: 서비스 카테고리
//! - `shortlist`: CSR 숏리스트
//! - `user`: 사용자 계정, 역할(Role), 로그인
//! - `report`: 리포트 요약
//! - `query`: 여러 목록에서 공통으로 쓰는 정렬 방향
//!
//! `pub use X::*;`로 재공개하므로 `crate::models::PinRequest`처럼 짧게 접근할 수 있습니다.

pub mod category;
pub mod match_record;
pub mod query;
pub mod report;
pub mod request;
pub mod shortlist;
pub mod user;

pub use category::*;
pub use match_record::*;
pub use query::*;
pub use report::*;
pub use request::*;
pub use shortlist::*;
pub use user::*;
