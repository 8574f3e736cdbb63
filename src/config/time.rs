use crate::utils::error::{Result, SniperError};
use chrono::{DateTime, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
    "%Y-%m-%d %H:%M:%S%:z",
    "%Y-%m-%dT%H:%M:%S%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| SniperError::InvalidConfigValueError {
            field: "default_timezone".to_string(),
            value: name.to_string(),
            reason: e.to_string(),
        })
}

/// 解析使用者輸入的時間。沒有時區的輸入會套用 `default_tz` 並記錄警告；
/// 夏令時間跳過的時刻視為錯誤，重複的時刻取較早者。
pub fn parse_zoned(field: &str, input: &str, default_tz: Tz) -> Result<DateTime<FixedOffset>> {
    let input = input.trim();
    let invalid = |reason: String| SniperError::InvalidConfigValueError {
        field: field.to_string(),
        value: input.to_string(),
        reason,
    };

    if let Ok(zoned) = DateTime::parse_from_rfc3339(input) {
        return Ok(zoned);
    }
    if let Some(zoned) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(input, fmt).ok())
    {
        return Ok(zoned);
    }

    let naive = parse_naive(input).ok_or_else(|| {
        invalid("expected an ISO 8601 datetime such as 2025-03-01T09:00:00+01:00".to_string())
    })?;

    tracing::warn!(
        "The datetime supplied for {} has no timezone, assuming {}",
        field,
        default_tz
    );

    match default_tz.from_local_datetime(&naive) {
        LocalResult::Single(local) => Ok(local.fixed_offset()),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.fixed_offset()),
        LocalResult::None => Err(invalid(format!("local time does not exist in {}", default_tz))),
    }
}

fn parse_naive(input: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
