/// Database module with the session store and migrations.
mod migrations;
mod sessions;

use anyhow::Result;
use rusqlite::Connection;

pub use sessions::{
    clear_sessions, count_sessions, delete_session, load_sessions, upsert_session,
};

/// Opens (or creates) the SQLite database and runs migrations.
pub fn init(db_path: &str) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    migrations::run_migrations(&conn)?;
    Ok(conn)
}

/// Returns the default database path inside the user's data directory.
/// Falls back to `./worklog.db` when no data dir is found.
pub fn default_db_path() -> String {
    if let Some(data_dir) = dirs::data_local_dir() {
        let worklog_dir = data_dir.join("worklog");
        std::fs::create_dir_all(&worklog_dir).ok();
        worklog_dir
            .join("worklog.db")
            .to_string_lossy()
            .into_owned()
    } else {
        "worklog.db".to_string()
    }
}
