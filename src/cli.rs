/// CLI argument parsing and command handling.
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{Duration, Local};
use clap::{Parser, Subcommand, ValueEnum};
use rusqlite::Connection;

use crate::{calendar, csv, db, types};
use crate::types::WorkSession;

#[derive(Parser)]
#[command(
    name = "worklog",
    version,
    about = "Worklog - a terminal-based work session tracker"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Record a work session.
    Add {
        title: String,
        /// Calendar day the session counts against (default: today).
        #[arg(short = 'd', long = "date")]
        date: Option<String>,
        /// Start time of day, e.g. 09:00 (default: 09:00).
        #[arg(short = 's', long = "start")]
        start: Option<String>,
        /// End time of day, e.g. 17:30. Wins over --duration.
        #[arg(short = 'e', long = "end")]
        end: Option<String>,
        /// Duration as decimal hours or "2h 15m". Used when no --end is given.
        #[arg(long = "duration")]
        duration: Option<String>,
        #[arg(short = 'p', long = "project")]
        project: Option<String>,
        /// Semicolon/comma separated tags.
        #[arg(short = 't', long = "tags")]
        tags: Option<String>,
        #[arg(long = "description")]
        description: Option<String>,
    },
    /// List all recorded sessions.
    List,
    /// Delete a session by id.
    Delete { id: String },
    /// Delete every session. Requires --yes.
    Clear {
        #[arg(long)]
        yes: bool,
    },
    /// Export all sessions to a CSV file.
    Export {
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
    /// Import sessions from a CSV file (preview, then confirm).
    Import {
        file: PathBuf,
        /// Show the preview and stop without writing anything.
        #[arg(long)]
        dry_run: bool,
        /// Skip the confirmation prompt.
        #[arg(short = 'y', long = "yes")]
        yes: bool,
    },
    /// Weekly or monthly totals.
    Report {
        #[arg(value_enum, default_value = "week")]
        period: ReportPeriod,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportPeriod {
    Week,
    Month,
}

/// Execute a CLI command.
pub fn run(command: Command, conn: &Connection) -> Result<()> {
    match command {
        Command::Add {
            title,
            date,
            start,
            end,
            duration,
            project,
            tags,
            description,
        } => handle_add(
            title,
            date,
            start,
            end,
            duration,
            project,
            tags,
            description,
            conn,
        )?,
        Command::List => handle_list(conn)?,
        Command::Delete { id } => handle_delete(id, conn)?,
        Command::Clear { yes } => handle_clear(yes, conn)?,
        Command::Export { output } => handle_export(output, conn)?,
        Command::Import { file, dry_run, yes } => handle_import(&file, dry_run, yes, conn)?,
        Command::Report { period } => handle_report(period, conn)?,
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn handle_add(
    title: String,
    date: Option<String>,
    start: Option<String>,
    end: Option<String>,
    duration: Option<String>,
    project: Option<String>,
    tags: Option<String>,
    description: Option<String>,
    conn: &Connection,
) -> Result<()> {
    if title.trim().is_empty() {
        println!("Title must not be empty.");
        return Ok(());
    }
    let date = match date {
        Some(raw) => match csv::parse_date(&raw) {
            Some(date) => date,
            None => {
                println!("Could not parse date '{raw}'.");
                return Ok(());
            }
        },
        None => Local::now().date_naive(),
    };
    let start_time = match start {
        Some(raw) => csv::parse_time(&raw, date),
        None => date.and_hms_opt(9, 0, 0).expect("valid time of day"),
    };
    let mut minutes = 0;
    let end_time = if let Some(raw) = end {
        csv::parse_time(&raw, date)
    } else if let Some(raw) = duration {
        minutes = csv::parse_duration(&raw);
        start_time + Duration::minutes(minutes)
    } else {
        date.and_hms_opt(17, 0, 0).expect("valid time of day")
    };
    if minutes == 0 {
        minutes = types::duration_minutes(start_time, end_time);
    }
    let tags = tags
        .map(|raw| {
            raw.split([';', ','])
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let session = WorkSession {
        id: types::new_session_id(),
        title,
        description,
        date,
        start_time,
        end_time,
        duration: minutes,
        project,
        tags,
    };
    db::upsert_session(&session, conn)?;
    println!(
        "Recorded '{}' on {} ({:.2}h), id {}",
        session.title,
        session.date.format("%Y-%m-%d"),
        session.duration as f64 / 60.0,
        session.id
    );
    Ok(())
}

fn handle_list(conn: &Connection) -> Result<()> {
    let sessions = db::load_sessions(conn)?;
    if sessions.is_empty() {
        println!("No sessions recorded.");
        return Ok(());
    }
    for session in &sessions {
        println!("{}", session_line(session));
    }
    let summary = calendar::summarize(&sessions);
    println!(
        "{} sessions, {:.2}h total",
        summary.session_count,
        summary.total_hours()
    );
    Ok(())
}

fn session_line(session: &WorkSession) -> String {
    let mut line = format!(
        "{}  {}  {}-{}  {:>6.2}h  {}",
        session.id,
        session.date.format("%Y-%m-%d"),
        session.start_time.format("%H:%M"),
        session.end_time.format("%H:%M"),
        session.duration as f64 / 60.0,
        session.title
    );
    if let Some(project) = &session.project {
        line.push_str(&format!("  [{project}]"));
    }
    if !session.tags.is_empty() {
        line.push_str(&format!("  #{}", session.tags.join(" #")));
    }
    line
}

fn handle_delete(id: String, conn: &Connection) -> Result<()> {
    let sessions = db::load_sessions(conn)?;
    if !sessions.iter().any(|session| session.id == id) {
        println!("No session with id '{id}'.");
        return Ok(());
    }
    db::delete_session(&id, conn)?;
    println!("Deleted session {id}.");
    Ok(())
}

fn handle_clear(yes: bool, conn: &Connection) -> Result<()> {
    let count = db::count_sessions(conn)?;
    if count == 0 {
        println!("No sessions recorded.");
        return Ok(());
    }
    if !yes {
        println!("This would delete all {count} sessions. Re-run with --yes to confirm.");
        return Ok(());
    }
    db::clear_sessions(conn)?;
    println!("Cleared {count} sessions.");
    Ok(())
}

fn handle_export(output: Option<PathBuf>, conn: &Connection) -> Result<()> {
    let sessions = db::load_sessions(conn)?;
    if sessions.is_empty() {
        println!("No sessions to export.");
        return Ok(());
    }
    let path = output.unwrap_or_else(|| {
        PathBuf::from(csv::export_filename(Local::now().date_naive()))
    });
    let text = csv::export_to_csv(&sessions);
    std::fs::write(&path, text)?;
    println!("Exported {} sessions to {}.", sessions.len(), path.display());
    Ok(())
}

fn handle_import(file: &Path, dry_run: bool, yes: bool, conn: &Connection) -> Result<()> {
    let is_csv = file
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    if !is_csv {
        println!("Please select a CSV file.");
        return Ok(());
    }
    let text = match std::fs::read_to_string(file) {
        Ok(text) => text,
        Err(err) => {
            println!("Failed to read {}: {err}", file.display());
            return Ok(());
        }
    };

    let existing = db::load_sessions(conn)?;
    let result = csv::import_from_csv(&text, &existing);

    for session in &result.sessions {
        println!("+ {}", session_line(session));
    }
    for error in &result.errors {
        println!("! {error}");
    }
    println!(
        "{} to import, {} skipped as duplicates, {} errors.",
        result.imported,
        result.skipped,
        result.errors.len()
    );
    if result.sessions.is_empty() {
        println!("Nothing to import.");
        return Ok(());
    }
    if dry_run {
        println!("Dry run, nothing written.");
        return Ok(());
    }
    if !yes && !confirm(&format!("Import {} sessions? [y/N] ", result.imported))? {
        println!("Import cancelled.");
        return Ok(());
    }
    for session in &result.sessions {
        db::upsert_session(session, conn)?;
    }
    println!("Imported {} sessions.", result.imported);
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn handle_report(period: ReportPeriod, conn: &Connection) -> Result<()> {
    let sessions = db::load_sessions(conn)?;
    if sessions.is_empty() {
        println!("No sessions recorded.");
        return Ok(());
    }
    let groups = match period {
        ReportPeriod::Week => calendar::group_by_week(&sessions),
        ReportPeriod::Month => calendar::group_by_month(&sessions),
    };
    for (key, bucket) in &groups {
        let label = match period {
            ReportPeriod::Week => calendar::week_range_label(key),
            ReportPeriod::Month => calendar::month_label(key),
        }
        .unwrap_or_else(|| key.clone());
        let summary = calendar::summarize(bucket);
        println!(
            "{label}: {} sessions, {:.2}h",
            summary.session_count,
            summary.total_hours()
        );
        for session in bucket {
            println!("  {}", session_line(session));
        }
    }
    Ok(())
}
