/// Calendar grid and report grouping over a session collection.
///
/// Purely derived views, recomputed on every call; nothing here touches the
/// store or the system clock. The month grid starts weeks on Sunday, the
/// report weeks are anchored on Monday - the two views use different week
/// conventions on purpose.
use std::collections::HashMap;

use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::types::{CalendarDay, WorkSession};

/// Builds the month grid for the month containing `reference`: the month
/// widened outward to the Sunday before its first day and the Saturday after
/// its last, one `CalendarDay` per day, sessions attached by exact
/// calendar-day equality.
pub fn generate_calendar_days(
    reference: NaiveDate,
    today: NaiveDate,
    sessions: &[WorkSession],
) -> Vec<CalendarDay> {
    let month_start = reference
        .with_day(1)
        .expect("every month has a first day");
    let month_end = month_start + Months::new(1) - Duration::days(1);
    let grid_start =
        month_start - Duration::days(month_start.weekday().num_days_from_sunday() as i64);
    let grid_end =
        month_end + Duration::days(6 - month_end.weekday().num_days_from_sunday() as i64);

    let mut days = Vec::new();
    let mut day = grid_start;
    while day <= grid_end {
        days.push(CalendarDay {
            date: day,
            sessions: sessions
                .iter()
                .filter(|session| session.date == day)
                .cloned()
                .collect(),
            is_current_month: day.month() == reference.month() && day.year() == reference.year(),
            is_today: day == today,
        });
        day += Duration::days(1);
    }
    days
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Buckets sessions by Monday-anchored week, keyed by the Monday as
/// `dd/mm/yyyy`, newest-first by lexicographic key order (the fixed-width
/// key makes that the display order within a year).
pub fn group_by_week(sessions: &[WorkSession]) -> Vec<(String, Vec<WorkSession>)> {
    let mut buckets: HashMap<String, Vec<WorkSession>> = HashMap::new();
    for session in sessions {
        let key = week_start(session.date).format("%d/%m/%Y").to_string();
        buckets.entry(key).or_default().push(session.clone());
    }
    sorted_descending(buckets)
}

/// Buckets sessions by calendar month, keyed `mm/yyyy`, newest-first by
/// lexicographic key order.
pub fn group_by_month(sessions: &[WorkSession]) -> Vec<(String, Vec<WorkSession>)> {
    let mut buckets: HashMap<String, Vec<WorkSession>> = HashMap::new();
    for session in sessions {
        let key = session.date.format("%m/%Y").to_string();
        buckets.entry(key).or_default().push(session.clone());
    }
    sorted_descending(buckets)
}

fn sorted_descending(
    buckets: HashMap<String, Vec<WorkSession>>,
) -> Vec<(String, Vec<WorkSession>)> {
    let mut groups: Vec<_> = buckets.into_iter().collect();
    groups.sort_by(|a, b| b.0.cmp(&a.0));
    groups
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BucketSummary {
    pub total_minutes: i64,
    pub session_count: usize,
}

impl BucketSummary {
    pub fn total_hours(&self) -> f64 {
        self.total_minutes as f64 / 60.0
    }
}

/// Totals for one bucket (or any session slice).
pub fn summarize(sessions: &[WorkSession]) -> BucketSummary {
    BucketSummary {
        total_minutes: sessions.iter().map(|session| session.duration).sum(),
        session_count: sessions.len(),
    }
}

/// "dd/mm/yyyy → dd/mm/yyyy" range for a week bucket key.
pub fn week_range_label(key: &str) -> Option<String> {
    let start = NaiveDate::parse_from_str(key, "%d/%m/%Y").ok()?;
    let end = start + Duration::days(6);
    Some(format!("{key} → {}", end.format("%d/%m/%Y")))
}

/// Human month name for a month bucket key ("03/2026" -> "March 2026").
pub fn month_label(key: &str) -> Option<String> {
    let (month, year) = key.split_once('/')?;
    let month: u32 = month.parse().ok()?;
    let year: i32 = year.parse().ok()?;
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some(first.format("%B %Y").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{self, duration_minutes};
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn session(title: &str, day: NaiveDate, minutes: i64) -> WorkSession {
        let start_time = day.and_hms_opt(9, 0, 0).unwrap();
        let end_time = start_time + Duration::minutes(minutes);
        WorkSession {
            id: types::new_session_id(),
            title: title.to_string(),
            description: None,
            date: day,
            start_time,
            end_time,
            duration: duration_minutes(start_time, end_time),
            project: None,
            tags: Vec::new(),
        }
    }

    #[test]
    fn grid_is_a_whole_number_of_weeks_starting_sunday() {
        for (y, m) in [(2026, 2), (2026, 3), (2026, 8), (2024, 2), (2025, 12)] {
            let days = generate_calendar_days(date(y, m, 15), date(2026, 1, 1), &[]);
            assert_eq!(days.len() % 7, 0, "{y}-{m}");
            assert_eq!(days[0].date.weekday(), Weekday::Sun, "{y}-{m}");
            assert_eq!(
                days.last().unwrap().date.weekday(),
                Weekday::Sat,
                "{y}-{m}"
            );
        }
    }

    #[test]
    fn grid_contains_every_day_of_the_month_exactly_once() {
        let days = generate_calendar_days(date(2026, 2, 10), date(2026, 2, 10), &[]);
        let current: Vec<_> = days.iter().filter(|d| d.is_current_month).collect();
        assert_eq!(current.len(), 28);
        assert_eq!(current[0].date, date(2026, 2, 1));
        assert_eq!(current.last().unwrap().date, date(2026, 2, 28));
        assert!(days.iter().any(|d| d.is_today && d.date == date(2026, 2, 10)));
    }

    #[test]
    fn grid_buckets_sessions_on_their_exact_day() {
        let sessions = vec![
            session("a", date(2026, 3, 4), 60),
            session("b", date(2026, 3, 4), 30),
            session("c", date(2026, 3, 5), 45),
            // trailing overflow day from April, still shown in March's grid
            session("d", date(2026, 4, 1), 15),
        ];
        let days = generate_calendar_days(date(2026, 3, 15), date(2026, 3, 15), &sessions);
        for day in &days {
            for entry in &day.sessions {
                assert_eq!(entry.date, day.date);
            }
        }
        let fourth = days.iter().find(|d| d.date == date(2026, 3, 4)).unwrap();
        assert_eq!(fourth.sessions.len(), 2);
        let total: usize = days.iter().map(|d| d.sessions.len()).sum();
        assert_eq!(total, sessions.len());
    }

    #[test]
    fn week_buckets_partition_the_collection() {
        let sessions = vec![
            session("a", date(2026, 3, 2), 60),  // Monday
            session("b", date(2026, 3, 8), 60),  // Sunday, same week
            session("c", date(2026, 3, 9), 60),  // next Monday
            session("d", date(2026, 2, 27), 60), // earlier week
        ];
        let weeks = group_by_week(&sessions);
        let total: usize = weeks.iter().map(|(_, bucket)| bucket.len()).sum();
        assert_eq!(total, sessions.len());

        let first_week = weeks
            .iter()
            .find(|(key, _)| key == "02/03/2026")
            .expect("week of 2 March");
        assert_eq!(first_week.1.len(), 2);
    }

    #[test]
    fn month_buckets_partition_the_collection() {
        let sessions = vec![
            session("a", date(2026, 3, 2), 60),
            session("b", date(2026, 3, 30), 60),
            session("c", date(2026, 4, 1), 60),
        ];
        let months = group_by_month(&sessions);
        let total: usize = months.iter().map(|(_, bucket)| bucket.len()).sum();
        assert_eq!(total, sessions.len());
        assert_eq!(months.len(), 2);
    }

    #[test]
    fn buckets_come_newest_first_by_formatted_key() {
        let sessions = vec![
            session("a", date(2026, 3, 2), 60),
            session("b", date(2026, 4, 6), 60),
        ];
        let months = group_by_month(&sessions);
        assert_eq!(months[0].0, "04/2026");
        assert_eq!(months[1].0, "03/2026");

        let weeks = group_by_week(&sessions);
        assert_eq!(weeks[0].0, "06/04/2026");
        assert_eq!(weeks[1].0, "02/03/2026");
    }

    #[test]
    fn summary_totals_minutes_and_counts() {
        let sessions = vec![
            session("a", date(2026, 3, 2), 90),
            session("b", date(2026, 3, 2), 60),
        ];
        let summary = summarize(&sessions);
        assert_eq!(summary.total_minutes, 150);
        assert_eq!(summary.session_count, 2);
        assert_eq!(format!("{:.2}", summary.total_hours()), "2.50");
    }

    #[test]
    fn week_start_lands_on_monday() {
        assert_eq!(week_start(date(2026, 3, 8)), date(2026, 3, 2));
        assert_eq!(week_start(date(2026, 3, 2)), date(2026, 3, 2));
    }

    #[test]
    fn bucket_labels_render_ranges_and_month_names() {
        assert_eq!(
            week_range_label("02/03/2026").as_deref(),
            Some("02/03/2026 → 08/03/2026")
        );
        assert_eq!(month_label("03/2026").as_deref(), Some("March 2026"));
        assert_eq!(month_label("nonsense"), None);
    }
}
