use crate::domain::model::TimeRange;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::HashMap;

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y"];

/// Parses the date-time forms accepted in query strings. Stored trip times are
/// UTC, so an explicit offset is converted to UTC and naive forms are read as
/// UTC already. Date-only values mean midnight.
pub fn parse_date_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.naive_utc());
    }

    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Reads the window from the request parameters named `start_param` and
/// `end_param`. `None` when either is missing, unparseable, or not ordered.
pub fn time_range_from_params(
    params: &HashMap<String, String>,
    start_param: &str,
    end_param: &str,
) -> Option<TimeRange> {
    let start = params.get(start_param).and_then(|raw| parse_date_time(raw))?;
    let end = params.get(end_param).and_then(|raw| parse_date_time(raw))?;
    TimeRange::new(start, end)
}
