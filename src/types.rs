use chrono::{NaiveDate, NaiveDateTime};
use rand::RngExt;

pub type SessionId = String;

/// A single recorded interval of work attributed to a calendar day.
///
/// `date` is the bucketing key for the calendar and the reports; the date
/// component of `start_time`/`end_time` is not consulted when grouping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct WorkSession {
    pub id: SessionId,
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    /// Minutes. Derived from the timestamps whenever both are known.
    pub duration: i64,
    pub project: Option<String>,
    /// Order preserved as entered, duplicates kept. Empty means unset.
    pub tags: Vec<String>,
}

/// One cell of the month grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct CalendarDay {
    pub date: NaiveDate,
    pub sessions: Vec<WorkSession>,
    pub is_current_month: bool,
    pub is_today: bool,
}

/// Outcome of decoding a CSV import. Errors are collected, never thrown
/// past the decode boundary; the caller decides whether to proceed.
#[derive(Clone, Debug, Default)]
pub(crate) struct ImportResult {
    pub success: bool,
    pub sessions: Vec<WorkSession>,
    pub errors: Vec<String>,
    pub imported: usize,
    pub skipped: usize,
}

/// Minutes between two timestamps, clamped to zero for inverted ranges.
pub fn duration_minutes(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    (end - start).num_minutes().max(0)
}

/// Generates a fresh session id: millisecond timestamp plus a short random
/// alphanumeric suffix. Good enough to avoid collisions within one profile.
pub fn new_session_id() -> SessionId {
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    let suffix: String = (0..9)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect();
    format!("{}{}", chrono::Local::now().timestamp_millis(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(date: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
        date.and_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn duration_is_minutes_between_timestamps() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
        assert_eq!(duration_minutes(at(date, 9, 0), at(date, 17, 30)), 510);
    }

    #[test]
    fn duration_clamps_inverted_ranges_to_zero() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
        assert_eq!(duration_minutes(at(date, 17, 0), at(date, 9, 0)), 0);
    }

    #[test]
    fn session_ids_are_unique() {
        let a = new_session_id();
        let b = new_session_id();
        assert_ne!(a, b);
    }
}
