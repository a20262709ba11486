//! # 입력 검증 헬퍼
//!
//! 요청/매치/숏리스트 연산이 공통으로 쓰는 검증 함수들입니다.
//! 모든 실패는 `AppError::Validation`(HTTP 400)으로 보고됩니다.
//!
//! ## 날짜 형식
//! 필터용 날짜/시각은 다음 형식을 모두 받습니다:
//! - `2025-10-20`
//! - `2025-10-20 14:30`, `2025-10-20 14:30:15`
//! - `2025-10-20T14:30:15`, `2025-10-20T14:30:15.250Z`, `2025-10-20T14:30:15+08:00`
//!
//! 파싱한 값은 DB 저장 형식(`%Y-%m-%dT%H:%M:%S%.3fZ`, UTC)으로 바꿔서 비교합니다.
//! 저장 형식이 고정 길이 ISO-8601이라 문자열 비교가 시간 순서와 같습니다.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::error::AppError;
use crate::models::RequestStatus;

/// DB에 저장되는 타임스탬프 형식 (`strftime('%Y-%m-%dT%H:%M:%fZ', 'now')`와 동일)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";
/// DB에 저장되는 날짜 형식 (`service_date`)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const NAIVE_DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// ID가 존재하고 양의 정수인지 확인합니다.
pub fn require_positive_id(value: Option<i64>, field: &str) -> Result<i64, AppError> {
    match value {
        Some(id) if id > 0 => Ok(id),
        _ => Err(AppError::validation(format!(
            "{} must be a positive integer",
            field
        ))),
    }
}

/// 값이 주어졌을 때만 양의 정수인지 확인합니다.
pub fn optional_positive_id(value: Option<i64>, field: &str) -> Result<Option<i64>, AppError> {
    value
        .map(|id| require_positive_id(Some(id), field))
        .transpose()
}

/// 필수 텍스트: 앞뒤 공백을 제거한 뒤 비어 있으면 에러, 아니면 정리된 값을 반환합니다.
pub fn require_text(value: Option<&str>, field: &str) -> Result<String, AppError> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(AppError::validation(format!("{} is required", field))),
    }
}

/// 부분 수정용 텍스트: None은 "변경 안 함", Some이면 필수 텍스트와 같은 규칙을 적용합니다.
pub fn optional_text(value: Option<&str>, field: &str) -> Result<Option<String>, AppError> {
    value.map(|v| require_text(Some(v), field)).transpose()
}

/// 상태 문자열이 허용된 네 가지 중 하나인지 확인합니다 (대소문자 정확히 일치).
pub fn parse_status(value: &str) -> Result<RequestStatus, AppError> {
    value.parse()
}

pub fn optional_status(value: Option<&str>) -> Result<Option<RequestStatus>, AppError> {
    value.map(parse_status).transpose()
}

/// 검색어: 공백만 있거나 비어 있으면 None
pub fn normalize_keyword(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
}

/// 날짜/시각 문자열을 파싱합니다. 오프셋이 있으면 UTC로 변환합니다.
pub fn parse_datetime(value: &str) -> Result<NaiveDateTime, AppError> {
    let trimmed = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_utc());
    }

    let spaced = trimmed.replacen('T', " ", 1);
    let spaced = spaced.strip_suffix('Z').unwrap_or(&spaced);
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(spaced, format) {
            return Ok(dt);
        }
    }

    // 날짜만 있으면 그날 0시
    if let Ok(date) = NaiveDate::parse_from_str(spaced, DATE_FORMAT) {
        return Ok(date.and_time(NaiveTime::MIN));
    }

    Err(AppError::validation(format!(
        "Invalid datetime format: {}",
        value
    )))
}

/// 날짜 문자열을 파싱합니다. 시각이 붙어 있으면 날짜 부분만 사용합니다.
pub fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        return Ok(date);
    }
    parse_datetime(trimmed)
        .map(|dt| dt.date())
        .map_err(|_| AppError::validation(format!("Invalid date format (expected YYYY-MM-DD): {}", value)))
}

/// 범위의 시작이 끝보다 늦으면 에러
pub fn require_order<T: PartialOrd>(from: Option<&T>, to: Option<&T>) -> Result<(), AppError> {
    match (from, to) {
        (Some(from), Some(to)) if from > to => Err(AppError::validation(
            "date range is invalid: start > end",
        )),
        _ => Ok(()),
    }
}

/// 선택적 시각 범위를 파싱하고 순서를 검사한 뒤 저장 형식으로 돌려줍니다.
/// 빈 문자열은 "필터 없음"으로 취급합니다.
pub fn datetime_range(
    from: Option<&str>,
    to: Option<&str>,
) -> Result<(Option<String>, Option<String>), AppError> {
    let from = non_empty(from).map(parse_datetime).transpose()?;
    let to = non_empty(to).map(parse_datetime).transpose()?;
    require_order(from.as_ref(), to.as_ref())?;
    Ok((
        from.as_ref().map(to_db_timestamp),
        to.as_ref().map(to_db_timestamp),
    ))
}

/// 선택적 날짜 범위 (`service_date` 필터용)
pub fn date_range(
    from: Option<&str>,
    to: Option<&str>,
) -> Result<(Option<String>, Option<String>), AppError> {
    let from = non_empty(from).map(parse_date).transpose()?;
    let to = non_empty(to).map(parse_date).transpose()?;
    require_order(from.as_ref(), to.as_ref())?;
    Ok((from.as_ref().map(to_db_date), to.as_ref().map(to_db_date)))
}

pub fn to_db_timestamp(dt: &NaiveDateTime) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

pub fn to_db_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// 현재 시각 (UTC, 저장 형식)
pub fn now_timestamp() -> String {
    to_db_timestamp(&Utc::now().naive_utc())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
