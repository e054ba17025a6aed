use chrono::Datelike;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
};

use super::helpers::{clamp_name, format_hours};
use super::theme::Theme;
use crate::app::App;
use crate::calendar::summarize;

const WEEKDAY_HEADER: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub fn build_calendar_text(app: &App) -> Text<'_> {
    let mut lines = Vec::new();

    if let Some(status) = &app.status {
        lines.push(Line::from(Span::styled(
            format!("  {status}"),
            Style::default().fg(Theme::warn()),
        )));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled(
        format!("  {}", app.reference_date.format("%B %Y")),
        Style::default()
            .fg(Theme::accent())
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));

    let header_spans: Vec<Span> = std::iter::once(Span::raw("  "))
        .chain(WEEKDAY_HEADER.iter().map(|name| {
            Span::styled(
                format!("{name:^8}"),
                Style::default()
                    .fg(Theme::secondary())
                    .add_modifier(Modifier::BOLD),
            )
        }))
        .collect();
    lines.push(Line::from(header_spans));

    for (week_index, week) in app.calendar_days.chunks(7).enumerate() {
        let mut spans = vec![Span::raw("  ")];
        for (day_index, day) in week.iter().enumerate() {
            let selected = week_index * 7 + day_index == app.selected_day_index;
            let badge = if day.sessions.is_empty() {
                "   ".to_string()
            } else {
                format!("·{:<2}", day.sessions.len())
            };
            let cell = format!(" {:>2} {badge} ", day.date.day());
            let style = if selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Theme::highlight())
                    .add_modifier(Modifier::BOLD)
            } else if day.is_today {
                Style::default()
                    .fg(Theme::today())
                    .add_modifier(Modifier::BOLD)
            } else if day.is_current_month {
                Style::default().fg(Theme::text())
            } else {
                Style::default().fg(Theme::dim())
            };
            spans.push(Span::styled(cell, style));
        }
        lines.push(Line::from(spans));
    }
    lines.push(Line::from(""));

    if let Some(day) = app.selected_day() {
        let summary = summarize(&day.sessions);
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {}", day.date.format("%A, %B %e, %Y")),
                Style::default()
                    .fg(Theme::secondary())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(
                    "  -  {} sessions, {}",
                    summary.session_count,
                    format_hours(summary.total_minutes)
                ),
                Style::default().fg(Theme::accent()),
            ),
        ]));
        if day.sessions.is_empty() {
            lines.push(Line::from(Span::styled(
                "  No sessions on this day. Press 'n' to add one.",
                Style::default().fg(Theme::dim()),
            )));
        }
        for session in &day.sessions {
            let mut spans = vec![
                Span::styled("  - ", Style::default().fg(Theme::dim())),
                Span::styled(
                    format!(
                        "{}-{}  ",
                        session.start_time.format("%H:%M"),
                        session.end_time.format("%H:%M")
                    ),
                    Style::default().fg(Theme::accent()),
                ),
                Span::styled(
                    clamp_name(&session.title, 32),
                    Style::default().fg(Theme::text()),
                ),
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
            lines.push(Line::from(spans));
        }
    }

    Text::from(lines)
}
