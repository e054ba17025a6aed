use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span, Text},
};

use super::theme::Theme;
use crate::app::App;

pub fn build_help_text(_app: &App) -> Text<'_> {
    let mut lines = Vec::new();

    lines.push(Line::from(Span::styled(
        "Key bindings",
        Style::default()
            .fg(Theme::accent())
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));

    lines.push(section_title("Global"));
    lines.extend(section_lines(&[
        "q: Quit",
        "?: Toggle help",
        "Tab: Next view",
        "c/l/p: Calendar / Sessions / Reports",
        "r: Reload from the database",
        "esc: Back",
    ]));

    lines.push(Line::from(""));
    lines.push(section_title("Calendar"));
    lines.extend(section_lines(&[
        "Left/Right: Previous/next day",
        "Up/Down: Previous/next week",
        "[ / ]: Previous/next month",
        "t: Jump to today",
        "n: New session on the selected day",
        "e: Edit the first session of the day",
        "d: Delete the first session of the day",
    ]));

    lines.push(Line::from(""));
    lines.push(section_title("Sessions"));
    lines.extend(section_lines(&[
        "Up/Down: Move selection",
        "Left/Right: Previous/next page",
        "n: New session  e: Edit  d: Delete",
        "x: Clear all sessions",
    ]));

    lines.push(Line::from(""));
    lines.push(section_title("Reports"));
    lines.extend(section_lines(&[
        "Left/Right: Older/newer period",
        "Up/Down: Page within the period",
        "Shift+Tab: Toggle weekly/monthly",
    ]));

    lines.push(Line::from(""));
    lines.push(section_title("Session form"));
    lines.extend(section_lines(&[
        "Tab/Shift+Tab: Switch field, Enter: Save, Esc: Cancel",
        "Times accept HH:MM; dates accept YYYY-MM-DD and common variants",
    ]));

    lines.push(Line::from(""));
    lines.push(section_title("CSV"));
    lines.extend(section_lines(&[
        "worklog export [-o file]: write all sessions as CSV",
        "worklog import <file>: preview and import a CSV",
    ]));

    Text::from(lines)
}

fn section_title(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!("  {title}"),
        Style::default()
            .fg(Theme::secondary())
            .add_modifier(Modifier::BOLD),
    ))
}

fn section_lines(items: &[&str]) -> Vec<Line<'static>> {
    items
        .iter()
        .map(|item| {
            Line::from(Span::styled(
                format!("  - {item}"),
                Style::default().fg(Theme::text()),
            ))
        })
        .collect()
}
