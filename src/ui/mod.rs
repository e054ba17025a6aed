mod calendar;
mod help;
mod helpers;
mod report;
mod sessions;
mod theme;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::app::{App, AppView, ConfirmAction, SessionField, SessionPopup, TABS};
use helpers::format_hours;
use theme::Theme;

/// Renders the entire UI for a single frame.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let (title, body_text) = match app.view {
        AppView::Calendar => (" Calendar ", calendar::build_calendar_text(app)),
        AppView::Sessions => (" Sessions ", sessions::build_sessions_text(app)),
        AppView::Report => (" Reports ", report::build_report_text(app)),
        AppView::Help => (" Help ", help::build_help_text(app)),
    };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(area);

    let header_lines = vec![Line::from(vec![
        Span::styled(
            "  Worklog  ",
            Style::default().fg(Color::Black).bg(Theme::primary()),
        ),
        Span::raw(" "),
        Span::styled(
            "work session tracker",
            Style::default()
                .fg(Theme::secondary())
                .add_modifier(Modifier::BOLD),
        ),
    ])];
    let header = Paragraph::new(Text::from(header_lines))
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .style(Style::default().fg(Theme::secondary())),
        );
    frame.render_widget(header, layout[0]);

    let mut body_lines = vec![
        tabs_line(app),
        Line::from(""),
        Line::from(Span::styled(
            format!("  {title}"),
            Style::default()
                .fg(Theme::accent())
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    body_lines.extend(body_text.lines);
    body_lines.push(Line::from(""));
    body_lines.push(Line::from(Span::styled(
        "----------------------------------------",
        Style::default().fg(Theme::dim()),
    )));
    body_lines.extend(keybinds_lines(app));
    let body = Paragraph::new(Text::from(body_lines))
        .style(Style::default().fg(Theme::text()))
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .style(Style::default().fg(Theme::secondary())),
        );
    frame.render_widget(body, layout[1]);

    let footer = Paragraph::new(Text::from(totals_line(app)))
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .style(Style::default().fg(Theme::secondary())),
        );
    frame.render_widget(footer, layout[2]);

    if let Some(popup) = &app.session_popup {
        render_session_popup(frame, popup);
    }
    if let Some(confirm) = &app.confirm {
        render_confirm_popup(frame, confirm);
    }
}

fn tabs_line(app: &App) -> Line<'_> {
    let mut spans = Vec::new();
    for (index, (name, view)) in TABS.iter().enumerate() {
        if index > 0 {
            spans.push(Span::raw("  "));
        }
        let active = *view == app.view;
        let style = if active {
            Style::default()
                .fg(Color::Black)
                .bg(Theme::highlight())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Theme::dim())
        };
        spans.push(Span::styled(format!(" {name} "), style));
    }
    Line::from(spans)
}

fn totals_line(app: &App) -> Line<'_> {
    let summary = crate::calendar::summarize(&app.sessions);
    Line::from(vec![
        Span::styled(
            format!(
                "{} sessions, {} tracked",
                summary.session_count,
                format_hours(summary.total_minutes)
            ),
            Style::default().fg(Theme::text()),
        ),
        Span::styled(
            format!("   {}", app.today.format("%A, %B %e, %Y")),
            Style::default().fg(Theme::dim()),
        ),
    ])
}

fn keybinds_lines(app: &App) -> Vec<Line<'static>> {
    let (primary, secondary) = match app.view {
        AppView::Calendar => (
            "←/→/↑/↓: Move day  [/]: Month  t: Today  n: New  e: Edit  d: Delete",
            "c/l/p: Views  r: Reload  ?: Help  q: Quit",
        ),
        AppView::Sessions => (
            "↑/↓: Select  ←/→: Page  n: New  e: Edit  d: Delete  x: Clear all",
            "c/l/p: Views  r: Reload  ?: Help  q: Quit",
        ),
        AppView::Report => (
            "←/→: Older/newer period  ↑/↓: Page  Shift+Tab: Weekly/Monthly",
            "c/l/p: Views  r: Reload  ?: Help  q: Quit",
        ),
        AppView::Help => ("esc: Back", "q: Quit"),
    };
    vec![
        Line::from(Span::styled(
            format!("  {primary}"),
            Style::default().fg(Theme::dim()),
        )),
        Line::from(Span::styled(
            format!("  {secondary}"),
            Style::default().fg(Theme::dim()),
        )),
    ]
}

fn render_session_popup(frame: &mut Frame, popup: &SessionPopup) {
    let area = centered_rect(60, 60, frame.area());
    frame.render_widget(Clear, area);

    let fields = [
        (SessionField::Title, "Title", &popup.title),
        (SessionField::Date, "Date", &popup.date),
        (SessionField::Start, "Start", &popup.start),
        (SessionField::End, "End", &popup.end),
        (SessionField::Project, "Project", &popup.project),
        (SessionField::Tags, "Tags", &popup.tags),
        (SessionField::Description, "Description", &popup.description),
    ];

    let mut lines = vec![Line::from("")];
    for (field, label, value) in fields {
        let active = popup.field == field;
        let label_style = if active {
            Style::default()
                .fg(Theme::highlight())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Theme::dim())
        };
        let mut spans = vec![
            Span::styled(format!("  {label:<12}"), label_style),
            Span::styled(value.clone(), Style::default().fg(Theme::text())),
        ];
        if active {
            spans.push(Span::styled("_", Style::default().fg(Theme::highlight())));
        }
        lines.push(Line::from(spans));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Tab: Next field  Enter: Save  Esc: Cancel",
        Style::default().fg(Theme::dim()),
    )));

    let title = if popup.session_id.is_some() {
        " Edit Session "
    } else {
        " New Session "
    };
    let popup_widget = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .style(Style::default().fg(Theme::secondary()))
                .title(title),
        );
    frame.render_widget(popup_widget, area);
}

fn render_confirm_popup(frame: &mut Frame, confirm: &ConfirmAction) {
    let area = centered_rect(50, 20, frame.area());
    frame.render_widget(Clear, area);

    let question = match confirm {
        ConfirmAction::DeleteSession(_, title) => {
            format!("  Delete session '{title}'?")
        }
        ConfirmAction::ClearAll => "  Delete ALL sessions?".to_string(),
    };
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            question,
            Style::default()
                .fg(Theme::warn())
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "  y: Yes  n/Esc: No",
            Style::default().fg(Theme::dim()),
        )),
    ];

    let popup_widget = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .style(Style::default().fg(Theme::warn()))
                .title(" Confirm "),
        );
    frame.render_widget(popup_widget, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}
