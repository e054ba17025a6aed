use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span, Text},
};

use super::helpers::format_hours;
use super::sessions::session_line;
use super::theme::Theme;
use crate::app::{App, PAGE_SIZE, ReportRange};
use crate::calendar::{month_label, summarize, week_range_label};

pub fn build_report_text(app: &App) -> Text<'_> {
    let mut lines = Vec::new();

    if let Some(status) = &app.status {
        lines.push(Line::from(Span::styled(
            format!("  {status}"),
            Style::default().fg(Theme::warn()),
        )));
        lines.push(Line::from(""));
    }

    let range_name = match app.report_range {
        ReportRange::Week => "Weekly",
        ReportRange::Month => "Monthly",
    };
    let groups = app.report_groups();

    lines.push(Line::from(vec![
        Span::styled(
            format!("  {range_name} report"),
            Style::default()
                .fg(Theme::accent())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "   (Shift+Tab: weekly/monthly)",
            Style::default().fg(Theme::dim()),
        ),
    ]));
    lines.push(Line::from(""));

    if groups.is_empty() {
        lines.push(Line::from("  No sessions recorded."));
        return Text::from(lines);
    }

    let index = app.report_index.min(groups.len() - 1);
    let (key, bucket) = &groups[index];
    let label = match app.report_range {
        ReportRange::Week => week_range_label(key),
        ReportRange::Month => month_label(key),
    }
    .unwrap_or_else(|| key.clone());
    let summary = summarize(bucket);

    lines.push(Line::from(vec![
        Span::styled(
            format!("  {label}"),
            Style::default()
                .fg(Theme::secondary())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("   period {}/{}", index + 1, groups.len()),
            Style::default().fg(Theme::dim()),
        ),
    ]));
    lines.push(Line::from(Span::styled(
        format!(
            "  {} sessions, {}",
            summary.session_count,
            format_hours(summary.total_minutes)
        ),
        Style::default().fg(Theme::accent()),
    )));
    lines.push(Line::from(""));

    let pages = bucket.len().div_ceil(PAGE_SIZE).max(1);
    let page = app.report_page.min(pages - 1);
    let start = page * PAGE_SIZE;
    let end = (start + PAGE_SIZE).min(bucket.len());
    for session in &bucket[start..end] {
        lines.push(session_line(session, false));
    }
    if pages > 1 {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  page {}/{} (Up/Down)", page + 1, pages),
            Style::default().fg(Theme::dim()),
        )));
    }

    Text::from(lines)
}
