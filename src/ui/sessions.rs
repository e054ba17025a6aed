use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span, Text},
};

use super::helpers::{clamp_name, format_hours};
use super::theme::Theme;
use crate::app::{App, PAGE_SIZE};
use crate::calendar::summarize;
use crate::types::WorkSession;

pub fn build_sessions_text(app: &App) -> Text<'_> {
    let mut lines = Vec::new();

    if let Some(status) = &app.status {
        lines.push(Line::from(Span::styled(
            format!("  {status}"),
            Style::default().fg(Theme::warn()),
        )));
        lines.push(Line::from(""));
    }

    if app.sessions.is_empty() {
        lines.push(Line::from(
            "  No sessions recorded. Press 'n' to add one.",
        ));
        return Text::from(lines);
    }

    let summary = summarize(&app.sessions);
    let page = app.selected_session_index / PAGE_SIZE;
    let pages = app.sessions.len().div_ceil(PAGE_SIZE);
    lines.push(Line::from(vec![
        Span::styled(
            format!(
                "  {} sessions, {}",
                summary.session_count,
                format_hours(summary.total_minutes)
            ),
            Style::default().fg(Theme::accent()),
        ),
        Span::styled(
            format!("   page {}/{}", page + 1, pages),
            Style::default().fg(Theme::dim()),
        ),
    ]));
    lines.push(Line::from(""));

    let start = app.list_page_start();
    let end = (start + PAGE_SIZE).min(app.sessions.len());
    for (index, session) in app.sessions[start..end].iter().enumerate() {
        let selected = start + index == app.selected_session_index;
        lines.push(session_line(session, selected));
    }

    Text::from(lines)
}

pub fn session_line(session: &WorkSession, selected: bool) -> Line<'static> {
    let line_style = if selected {
        Style::default()
            .fg(Theme::highlight())
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Theme::text())
    };
    let marker_style = if selected {
        Style::default().fg(Theme::selection_marker())
    } else {
        Style::default().fg(Theme::dim())
    };
    let mut spans = vec![
        Span::styled(if selected { "> " } else { "  " }, marker_style),
        Span::styled(
            format!(
                "{}  {}-{}  {:>7}  ",
                session.date.format("%Y-%m-%d"),
                session.start_time.format("%H:%M"),
                session.end_time.format("%H:%M"),
                format_hours(session.duration)
            ),
            Style::default().fg(Theme::accent()),
        ),
        Span::styled(clamp_name(&session.title, 28), line_style),
    ];
    if let Some(project) = &session.project {
        spans.push(Span::styled(
            format!("  [{project}]"),
            Style::default().fg(Theme::highlight()),
        ));
    }
    if !session.tags.is_empty() {
        spans.push(Span::styled(
            format!("  #{}", session.tags.join(" #")),
            Style::default().fg(Theme::dim()),
        ));
    }
    Line::from(spans)
}
