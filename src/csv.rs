/// CSV export/import for work sessions.
///
/// Export emits a fixed header set; import accepts any header row containing
/// recognizable aliases for at least a title and a date column. Import is
/// best-effort: malformed rows are dropped with a message, only a missing
/// required column aborts before any row is processed.
use std::collections::HashSet;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::types::{self, ImportResult, WorkSession};

pub const EXPORT_HEADERS: [&str; 8] = [
    "Date",
    "Title",
    "Description",
    "Start Time",
    "End Time",
    "Duration (Hours)",
    "Project",
    "Tags",
];

/// Encodes sessions as CSV text, one row per session, every field quoted.
pub fn export_to_csv(sessions: &[WorkSession]) -> String {
    let mut lines = Vec::with_capacity(sessions.len() + 1);
    lines.push(format_row(EXPORT_HEADERS.iter().map(|h| h.to_string())));
    for session in sessions {
        lines.push(format_row([
            session.date.format("%Y-%m-%d").to_string(),
            session.title.clone(),
            session.description.clone().unwrap_or_default(),
            session.start_time.format("%H:%M:%S").to_string(),
            session.end_time.format("%H:%M:%S").to_string(),
            format!("{:.2}", session.duration as f64 / 60.0),
            session.project.clone().unwrap_or_default(),
            session.tags.join("; "),
        ]));
    }
    lines.join("\n")
}

/// Suggested filename for an export taken on `today`.
pub fn export_filename(today: NaiveDate) -> String {
    format!("time-tracking-{}.csv", today.format("%Y-%m-%d"))
}

fn format_row(fields: impl IntoIterator<Item = String>) -> String {
    fields
        .into_iter()
        .map(|field| format!("\"{field}\""))
        .collect::<Vec<_>>()
        .join(",")
}

/// The internal name a CSV column is mapped to regardless of header text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Date,
    Title,
    Description,
    StartTime,
    EndTime,
    Duration,
    Project,
    Tags,
}

/// Maps a normalized (quote-stripped, trimmed, lower-cased) header cell to
/// its canonical field. Unrecognized headers map to `None` and are ignored.
fn canonical_field(header: &str) -> Option<Field> {
    match header {
        "date" => Some(Field::Date),
        "title" | "task" | "work" => Some(Field::Title),
        "description" | "desc" | "notes" => Some(Field::Description),
        "start time" | "start" | "begin" => Some(Field::StartTime),
        "end time" | "end" | "finish" => Some(Field::EndTime),
        "duration" | "duration (hours)" | "hours" | "time" => Some(Field::Duration),
        "project" | "client" => Some(Field::Project),
        "tags" | "categories" | "labels" => Some(Field::Tags),
        _ => None,
    }
}

#[derive(Debug, Default)]
struct ColumnMap {
    date: Option<usize>,
    title: Option<usize>,
    description: Option<usize>,
    start_time: Option<usize>,
    end_time: Option<usize>,
    duration: Option<usize>,
    project: Option<usize>,
    tags: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &[String]) -> Self {
        let mut map = Self::default();
        for (index, header) in headers.iter().enumerate() {
            match canonical_field(header) {
                Some(Field::Date) => map.date = Some(index),
                Some(Field::Title) => map.title = Some(index),
                Some(Field::Description) => map.description = Some(index),
                Some(Field::StartTime) => map.start_time = Some(index),
                Some(Field::EndTime) => map.end_time = Some(index),
                Some(Field::Duration) => map.duration = Some(index),
                Some(Field::Project) => map.project = Some(index),
                Some(Field::Tags) => map.tags = Some(index),
                None => {}
            }
        }
        map
    }

    /// Highest mapped column index; rows shorter than this are rejected.
    fn max_index(&self) -> usize {
        [
            self.date,
            self.title,
            self.description,
            self.start_time,
            self.end_time,
            self.duration,
            self.project,
            self.tags,
        ]
        .into_iter()
        .flatten()
        .max()
        .unwrap_or(0)
    }
}

/// Parses a date cell against a fixed list of common formats, ISO first.
pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    const FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];
    let value = value.trim();
    for format in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }
    // Full timestamps are accepted too; only the date part is kept.
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|dt| dt.date())
}

/// Parses a time-of-day cell against the row's date. Colon-separated parts
/// are cleaned of non-digits before parsing ("9:00 AM" reads as 09:00).
/// Anything unparseable falls back to midnight on `date`, never an error.
pub(crate) fn parse_time(value: &str, date: NaiveDate) -> NaiveDateTime {
    if value.contains(':') {
        let mut parts = value.split(':');
        let hours = digits(parts.next());
        let minutes = digits(parts.next());
        if let (Some(hours), Some(minutes)) = (hours, minutes) {
            if let Some(time) = NaiveTime::from_hms_opt(hours, minutes, 0) {
                return date.and_time(time);
            }
        }
    }
    date.and_time(NaiveTime::MIN)
}

fn digits(part: Option<&str>) -> Option<u32> {
    let cleaned: String = part?.chars().filter(|c| c.is_ascii_digit()).collect();
    cleaned.parse().ok()
}

/// Parses a duration cell into minutes. Decimal hours first ("1.5" -> 90),
/// then an hours/minutes pattern scanned from the first digit ("8h 30m",
/// "2h", "8 30"). Unparseable cells yield 0.
pub(crate) fn parse_duration(value: &str) -> i64 {
    let value = value.trim();
    if let Ok(hours) = value.parse::<f64>() {
        if hours.is_finite() {
            return (hours * 60.0).round() as i64;
        }
    }
    let start = match value.find(|c: char| c.is_ascii_digit()) {
        Some(start) => start,
        None => return 0,
    };
    let (hours, rest) = leading_number(&value[start..]);
    let Some(hours) = hours else {
        return 0;
    };
    let rest = rest.strip_prefix(['h', 'H']).unwrap_or(rest).trim_start();
    let (minutes, _) = leading_number(rest);
    hours * 60 + minutes.unwrap_or(0)
}

fn leading_number(value: &str) -> (Option<i64>, &str) {
    let end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    if end == 0 {
        return (None, value);
    }
    (value[..end].parse().ok(), &value[end..])
}

fn parse_tags(value: &str) -> Vec<String> {
    value
        .split([';', ',', '|'])
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Composite duplicate key: calendar day + title + start time-of-day.
/// A heuristic, not a true identity; two real sessions sharing all three
/// are treated as the same record.
fn duplicate_key(date: NaiveDate, title: &str, start_time: NaiveDateTime) -> String {
    format!("{}-{}-{}", date, title, start_time.time())
}

fn cell_for<'a>(cells: &'a [String], column: Option<usize>) -> Option<&'a str> {
    let value = cells.get(column?)?.as_str();
    if value.is_empty() { None } else { Some(value) }
}

/// Decodes CSV text into staged sessions. `existing` is consulted only for
/// duplicate detection and never mutated; persisting the accepted sessions
/// is the caller's job.
pub fn import_from_csv(text: &str, existing: &[WorkSession]) -> ImportResult {
    let mut result = ImportResult::default();

    let lines: Vec<&str> = text.trim().lines().collect();
    if lines.len() < 2 {
        result
            .errors
            .push("CSV file appears to be empty or has no data rows".to_string());
        return result;
    }

    let headers: Vec<String> = lines[0]
        .split(',')
        .map(|header| header.replace('"', "").trim().to_lowercase())
        .collect();
    let columns = ColumnMap::from_headers(&headers);

    let Some(title_column) = columns.title else {
        result.errors.push(
            "Required column \"Title\" not found. Please ensure your CSV has a title/task column."
                .to_string(),
        );
        return result;
    };
    let Some(date_column) = columns.date else {
        result.errors.push(
            "Required column \"Date\" not found. Please ensure your CSV has a date column."
                .to_string(),
        );
        return result;
    };

    let mut seen: HashSet<String> = existing
        .iter()
        .map(|session| duplicate_key(session.date, &session.title, session.start_time))
        .collect();
    let min_columns = columns.max_index() + 1;

    for (index, line) in lines.iter().enumerate().skip(1) {
        let row_number = index + 1;
        let cells: Vec<String> = line
            .split(',')
            .map(|cell| cell.replace('"', "").trim().to_string())
            .collect();

        if cells.len() < min_columns {
            result
                .errors
                .push(format!("Row {row_number}: Insufficient columns"));
            continue;
        }

        let title = cells[title_column].clone();
        let date_cell = cells[date_column].clone();
        if title.is_empty() || date_cell.is_empty() {
            result
                .errors
                .push(format!("Row {row_number}: Missing required title or date"));
            continue;
        }

        let Some(date) = parse_date(&date_cell) else {
            result
                .errors
                .push(format!("Row {row_number}: Invalid date format \"{date_cell}\""));
            continue;
        };

        let start_time = match cell_for(&cells, columns.start_time) {
            Some(raw) => parse_time(raw, date),
            None => date.and_hms_opt(9, 0, 0).expect("valid time of day"),
        };

        let mut duration = 0;
        let end_time = if let Some(raw) = cell_for(&cells, columns.end_time) {
            parse_time(raw, date)
        } else if let Some(raw) = cell_for(&cells, columns.duration) {
            duration = parse_duration(raw);
            start_time + Duration::minutes(duration)
        } else {
            date.and_hms_opt(17, 0, 0).expect("valid time of day")
        };
        if duration == 0 {
            duration = types::duration_minutes(start_time, end_time);
        }

        let description = cell_for(&cells, columns.description).map(str::to_string);
        let project = cell_for(&cells, columns.project).map(str::to_string);
        let tags = cell_for(&cells, columns.tags)
            .map(parse_tags)
            .unwrap_or_default();

        // Not an error: the same day/title/start triple was already present
        // or accepted earlier in this import.
        if !seen.insert(duplicate_key(date, &title, start_time)) {
            result.skipped += 1;
            continue;
        }

        result.sessions.push(WorkSession {
            id: types::new_session_id(),
            title,
            description,
            date,
            start_time,
            end_time,
            duration,
            project,
            tags,
        });
        result.imported += 1;
    }

    result.success = result.imported > 0;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn session(title: &str, day: NaiveDate, start_h: u32, end_h: u32) -> WorkSession {
        let start_time = day.and_hms_opt(start_h, 0, 0).unwrap();
        let end_time = day.and_hms_opt(end_h, 0, 0).unwrap();
        WorkSession {
            id: types::new_session_id(),
            title: title.to_string(),
            description: None,
            date: day,
            start_time,
            end_time,
            duration: types::duration_minutes(start_time, end_time),
            project: None,
            tags: Vec::new(),
        }
    }

    #[test]
    fn export_emits_canonical_header_row() {
        let text = export_to_csv(&[]);
        assert_eq!(
            text,
            "\"Date\",\"Title\",\"Description\",\"Start Time\",\"End Time\",\"Duration (Hours)\",\"Project\",\"Tags\""
        );
    }

    #[test]
    fn export_renders_missing_optionals_as_empty_fields() {
        let entry = session("Standup", date(2026, 3, 4), 9, 10);
        let text = export_to_csv(&[entry]);
        let row = text.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "\"2026-03-04\",\"Standup\",\"\",\"09:00:00\",\"10:00:00\",\"1.00\",\"\",\"\""
        );
    }

    #[test]
    fn export_filename_uses_todays_date() {
        assert_eq!(
            export_filename(date(2026, 8, 23)),
            "time-tracking-2026-08-23.csv"
        );
    }

    #[test]
    fn round_trip_preserves_every_field() {
        let mut entry = session("Deep work", date(2026, 3, 4), 9, 17);
        entry.description = Some("writing".to_string());
        entry.project = Some("Atlas".to_string());
        entry.tags = vec!["focus".to_string(), "am".to_string()];
        let other = session("Review", date(2026, 3, 5), 13, 14);

        let text = export_to_csv(&[entry.clone(), other.clone()]);
        let result = import_from_csv(&text, &[]);

        assert!(result.success);
        assert_eq!(result.imported, 2);
        assert_eq!(result.skipped, 0);
        assert!(result.errors.is_empty());

        let first = &result.sessions[0];
        assert_eq!(first.title, entry.title);
        assert_eq!(first.date, entry.date);
        assert_eq!(first.start_time, entry.start_time);
        assert_eq!(first.end_time, entry.end_time);
        assert_eq!(first.duration, entry.duration);
        assert_eq!(first.description, entry.description);
        assert_eq!(first.project, entry.project);
        assert_eq!(first.tags, entry.tags);
        assert_ne!(first.id, entry.id);
    }

    #[test]
    fn reimport_skips_every_row_as_duplicate() {
        let sessions = vec![
            session("Standup", date(2026, 3, 4), 9, 10),
            session("Review", date(2026, 3, 5), 13, 14),
        ];
        let text = export_to_csv(&sessions);

        let first_pass = import_from_csv(&text, &[]);
        assert_eq!(first_pass.imported, 2);

        let second_pass = import_from_csv(&text, &first_pass.sessions);
        assert!(!second_pass.success);
        assert_eq!(second_pass.imported, 0);
        assert_eq!(second_pass.skipped, 2);
    }

    #[test]
    fn duplicate_rows_within_one_import_are_skipped() {
        let text = "\"Date\",\"Title\",\"Start Time\"\n\
                    \"2026-03-04\",\"Standup\",\"09:00\"\n\
                    \"2026-03-04\",\"Standup\",\"09:00\"";
        let result = import_from_csv(text, &[]);
        assert_eq!(result.imported, 1);
        assert_eq!(result.skipped, 1);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn aliased_headers_import_like_canonical_ones() {
        let canonical = "\"Date\",\"Title\",\"Project\"\n\"2026-03-04\",\"Standup\",\"Atlas\"";
        let aliased = "\"Date\",\"Task\",\"Client\"\n\"2026-03-04\",\"Standup\",\"Atlas\"";

        let a = import_from_csv(canonical, &[]);
        let b = import_from_csv(aliased, &[]);

        assert_eq!(a.imported, 1);
        assert_eq!(b.imported, 1);
        assert_eq!(a.sessions[0].title, b.sessions[0].title);
        assert_eq!(a.sessions[0].project, b.sessions[0].project);
    }

    #[test]
    fn unrecognized_headers_are_ignored() {
        let text = "\"Date\",\"Title\",\"Billing Code\"\n\"2026-03-04\",\"Standup\",\"X-42\"";
        let result = import_from_csv(text, &[]);
        assert_eq!(result.imported, 1);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn missing_title_column_is_a_structural_failure() {
        let text = "\"Date\",\"Notes\"\n\"2026-03-04\",\"no title anywhere\"";
        let result = import_from_csv(text, &[]);
        assert!(!result.success);
        assert!(result.sessions.is_empty());
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("\"Title\""));
    }

    #[test]
    fn missing_date_column_is_a_structural_failure() {
        let text = "\"Title\",\"Project\"\n\"Standup\",\"Atlas\"\n\"Review\",\"Atlas\"";
        let result = import_from_csv(text, &[]);
        assert!(!result.success);
        assert!(result.sessions.is_empty());
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("\"Date\""));
    }

    #[test]
    fn empty_input_is_a_structural_failure() {
        let result = import_from_csv("\n\n", &[]);
        assert!(!result.success);
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn short_rows_are_dropped_with_a_row_error() {
        let text = "\"Date\",\"Title\",\"Project\"\n\
                    \"2026-03-04\",\"Standup\"\n\
                    \"2026-03-05\",\"Review\",\"Atlas\"";
        let result = import_from_csv(text, &[]);
        assert_eq!(result.imported, 1);
        assert_eq!(result.errors, vec!["Row 2: Insufficient columns"]);
    }

    #[test]
    fn rows_missing_title_or_date_are_dropped() {
        let text = "\"Date\",\"Title\"\n\"\",\"Standup\"\n\"2026-03-04\",\"\"";
        let result = import_from_csv(text, &[]);
        assert_eq!(result.imported, 0);
        assert_eq!(
            result.errors,
            vec![
                "Row 2: Missing required title or date",
                "Row 3: Missing required title or date"
            ]
        );
    }

    #[test]
    fn unparseable_dates_are_dropped_with_the_offending_value() {
        let text = "\"Date\",\"Title\"\n\"someday\",\"Standup\"";
        let result = import_from_csv(text, &[]);
        assert_eq!(result.imported, 0);
        assert_eq!(result.errors, vec!["Row 2: Invalid date format \"someday\""]);
    }

    #[test]
    fn duration_is_derived_from_start_and_end() {
        let text = "\"Date\",\"Title\",\"Start Time\",\"End Time\"\n\
                    \"2026-03-04\",\"Standup\",\"09:00\",\"17:30\"";
        let result = import_from_csv(text, &[]);
        assert_eq!(result.sessions[0].duration, 510);
    }

    #[test]
    fn duration_only_row_defaults_start_and_derives_end() {
        let text = "\"Date\",\"Title\",\"Duration\"\n\"2026-03-04\",\"Standup\",\"2h 15m\"";
        let result = import_from_csv(text, &[]);
        let entry = &result.sessions[0];
        assert_eq!(entry.duration, 135);
        assert_eq!(
            entry.start_time,
            date(2026, 3, 4).and_hms_opt(9, 0, 0).unwrap()
        );
        assert_eq!(entry.end_time, entry.start_time + Duration::minutes(135));
    }

    #[test]
    fn row_without_times_defaults_to_nine_to_five() {
        let text = "\"Date\",\"Title\"\n\"2026-03-04\",\"Standup\"";
        let result = import_from_csv(text, &[]);
        let entry = &result.sessions[0];
        assert_eq!(
            entry.start_time,
            date(2026, 3, 4).and_hms_opt(9, 0, 0).unwrap()
        );
        assert_eq!(
            entry.end_time,
            date(2026, 3, 4).and_hms_opt(17, 0, 0).unwrap()
        );
        assert_eq!(entry.duration, 480);
    }

    #[test]
    fn end_before_start_clamps_duration_to_zero() {
        let text = "\"Date\",\"Title\",\"Start Time\",\"End Time\"\n\
                    \"2026-03-04\",\"Standup\",\"17:00\",\"09:00\"";
        let result = import_from_csv(text, &[]);
        assert_eq!(result.sessions[0].duration, 0);
    }

    #[test]
    fn tags_split_on_any_separator_and_drop_empties() {
        let text = "\"Date\",\"Title\",\"Tags\"\n\"2026-03-04\",\"Standup\",\"a; b|c;\"";
        let result = import_from_csv(text, &[]);
        assert_eq!(result.sessions[0].tags, vec!["a", "b", "c"]);
    }

    #[test]
    fn parse_date_accepts_common_formats() {
        assert_eq!(parse_date("2026-03-04"), Some(date(2026, 3, 4)));
        assert_eq!(parse_date("2026/03/04"), Some(date(2026, 3, 4)));
        assert_eq!(parse_date("03/04/2026"), Some(date(2026, 3, 4)));
        assert_eq!(parse_date("04.03.2026"), Some(date(2026, 3, 4)));
        assert_eq!(parse_date("2026-03-04T10:30:00"), Some(date(2026, 3, 4)));
        assert_eq!(parse_date("someday"), None);
    }

    #[test]
    fn parse_time_strips_non_digits_and_falls_back_to_midnight() {
        let day = date(2026, 3, 4);
        assert_eq!(
            parse_time("9:30 AM", day),
            day.and_hms_opt(9, 30, 0).unwrap()
        );
        assert_eq!(
            parse_time("\"17:05\"", day),
            day.and_hms_opt(17, 5, 0).unwrap()
        );
        assert_eq!(parse_time("noonish", day), day.and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(parse_time("99:99", day), day.and_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn parse_duration_handles_decimals_and_hour_minute_forms() {
        assert_eq!(parse_duration("1.5"), 90);
        assert_eq!(parse_duration("8"), 480);
        assert_eq!(parse_duration("8h 30m"), 510);
        assert_eq!(parse_duration("2h"), 120);
        assert_eq!(parse_duration("8:30"), 480);
        assert_eq!(parse_duration("gibberish"), 0);
    }
}
