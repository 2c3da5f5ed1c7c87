use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::error::{AppError, AppResult};

pub const DAY_MS: i64 = 86_400_000;

/// Parse a client-supplied timestamp into the canonical representation.
///
/// The upstream clients historically sent two shapes: a full RFC 3339
/// timestamp and a bare `YYYY-MM-DD` date string. Both are accepted here
/// and converted to UTC at the boundary; everything past this point works
/// with `DateTime<Utc>` only.
pub fn parse_timestamp(raw: &str) -> AppResult<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid timestamp: {}", raw)))
        .and_then(|date| {
            date.and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc())
                .ok_or_else(|| AppError::Validation(format!("Invalid timestamp: {}", raw)))
        })
}

/// Start of the calendar month containing `now` (day 1, midnight UTC).
pub fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .with_day(1)
        .expect("day 1 is always valid")
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
        .and_utc()
}

/// Chart label for a month bucket, e.g. "Jan 2024".
pub fn month_label(ts: DateTime<Utc>) -> String {
    ts.format("%b %Y").to_string()
}

/// Sortable month bucket key.
pub fn month_key(ts: DateTime<Utc>) -> (i32, u32) {
    (ts.year(), ts.month())
}

/// Whole days remaining until `target`, rounded up, clamped at zero.
pub fn days_until(target: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let remaining_ms = (target - now).num_milliseconds();
    if remaining_ms <= 0 {
        return 0;
    }
    (remaining_ms + DAY_MS - 1) / DAY_MS
}
