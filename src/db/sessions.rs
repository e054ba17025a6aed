/// Work-session database queries.
///
/// Datetimes are stored as `%Y-%m-%dT%H:%M:%S` text, dates as `%Y-%m-%d`,
/// tags joined with `;`. Rows come back in insertion order.
use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;

use crate::types::{SessionId, WorkSession};

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn load_sessions(conn: &Connection) -> Result<Vec<WorkSession>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, description, date, start_time, end_time, duration, project, tags
         FROM sessions",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(WorkSession {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            date: parse_date(row.get(3)?)
                .expect("Expecting parsing of date to succeed, all Db entries should be parsable."),
            start_time: parse_datetime(row.get(4)?).expect(
                "Expecting parsing of start datetime to succeed, all Db entries should be parsable.",
            ),
            end_time: parse_datetime(row.get(5)?).expect(
                "Expecting parsing of end datetime to succeed, all Db entries should be parsable.",
            ),
            duration: row.get(6)?,
            project: row.get(7)?,
            tags: split_tags(row.get(8)?),
        })
    })?;
    let mut sessions = Vec::new();
    for row in rows {
        sessions.push(row?);
    }
    Ok(sessions)
}

/// Replaces the row with a matching id, otherwise appends a new one.
pub fn upsert_session(session: &WorkSession, conn: &Connection) -> Result<()> {
    let tags = if session.tags.is_empty() {
        None
    } else {
        Some(session.tags.join(";"))
    };
    let updated = conn.execute(
        "UPDATE sessions
         SET title = ?2, description = ?3, date = ?4, start_time = ?5, end_time = ?6,
             duration = ?7, project = ?8, tags = ?9
         WHERE id = ?1",
        rusqlite::params![
            session.id,
            session.title,
            session.description,
            session.date.format(DATE_FORMAT).to_string(),
            session.start_time.format(DATETIME_FORMAT).to_string(),
            session.end_time.format(DATETIME_FORMAT).to_string(),
            session.duration,
            session.project,
            tags,
        ],
    )?;
    if updated == 0 {
        conn.execute(
            "INSERT INTO sessions (id, title, description, date, start_time, end_time, duration, project, tags)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rusqlite::params![
                session.id,
                session.title,
                session.description,
                session.date.format(DATE_FORMAT).to_string(),
                session.start_time.format(DATETIME_FORMAT).to_string(),
                session.end_time.format(DATETIME_FORMAT).to_string(),
                session.duration,
                session.project,
                tags,
            ],
        )?;
    }
    Ok(())
}

pub fn delete_session(id: &SessionId, conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM sessions WHERE id = ?1", [id])?;
    Ok(())
}

pub fn clear_sessions(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM sessions", [])?;
    Ok(())
}

pub fn count_sessions(conn: &Connection) -> Result<usize> {
    let mut stmt = conn.prepare("SELECT COUNT(*) FROM sessions")?;
    let count: i64 = stmt.query_row([], |row| row.get(0))?;
    Ok(count as usize)
}

fn parse_date(value: String) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&value, DATE_FORMAT)
        .map_err(|err| anyhow::anyhow!("Failed to parse date '{value}': {err}"))
}

fn parse_datetime(value: String) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(&value, DATETIME_FORMAT)
        .map_err(|err| anyhow::anyhow!("Failed to parse datetime '{value}': {err}"))
}

fn split_tags(value: Option<String>) -> Vec<String> {
    value
        .map(|raw| raw.split(';').map(str::to_string).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::types;
    use chrono::NaiveDate;

    fn open_temp_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("worklog.db");
        let conn = db::init(path.to_str().unwrap()).unwrap();
        (dir, conn)
    }

    fn session(title: &str) -> WorkSession {
        let date = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
        let start_time = date.and_hms_opt(9, 0, 0).unwrap();
        let end_time = date.and_hms_opt(10, 30, 0).unwrap();
        WorkSession {
            id: types::new_session_id(),
            title: title.to_string(),
            description: Some("notes".to_string()),
            date,
            start_time,
            end_time,
            duration: 90,
            project: Some("Atlas".to_string()),
            tags: vec!["focus".to_string(), "am".to_string()],
        }
    }

    #[test]
    fn upsert_then_load_round_trips_every_field() {
        let (_dir, conn) = open_temp_db();
        let entry = session("Standup");
        upsert_session(&entry, &conn).unwrap();

        let loaded = load_sessions(&conn).unwrap();
        assert_eq!(loaded, vec![entry]);
    }

    #[test]
    fn upsert_with_existing_id_replaces_in_place() {
        let (_dir, conn) = open_temp_db();
        let first = session("Standup");
        let second = session("Review");
        upsert_session(&first, &conn).unwrap();
        upsert_session(&second, &conn).unwrap();

        let mut edited = first.clone();
        edited.title = "Standup (moved)".to_string();
        edited.tags = Vec::new();
        upsert_session(&edited, &conn).unwrap();

        let loaded = load_sessions(&conn).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0], edited);
        assert_eq!(loaded[1], second);
    }

    #[test]
    fn delete_removes_only_the_matching_id() {
        let (_dir, conn) = open_temp_db();
        let first = session("Standup");
        let second = session("Review");
        upsert_session(&first, &conn).unwrap();
        upsert_session(&second, &conn).unwrap();

        delete_session(&first.id, &conn).unwrap();
        let loaded = load_sessions(&conn).unwrap();
        assert_eq!(loaded, vec![second]);
    }

    #[test]
    fn clear_empties_the_store() {
        let (_dir, conn) = open_temp_db();
        upsert_session(&session("Standup"), &conn).unwrap();
        upsert_session(&session("Review"), &conn).unwrap();
        assert_eq!(count_sessions(&conn).unwrap(), 2);

        clear_sessions(&conn).unwrap();
        assert_eq!(count_sessions(&conn).unwrap(), 0);
        assert!(load_sessions(&conn).unwrap().is_empty());
    }
}
