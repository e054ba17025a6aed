use chrono::{Datelike, Duration, Local, Months, NaiveDate};
use crossterm::event::KeyCode;
use rusqlite::Connection;

use crate::types::{CalendarDay, SessionId, WorkSession};
use crate::{calendar, csv, db, types};

use super::{AppEvent, AppView, PAGE_SIZE, ReportRange};

/// The top-level application state.
pub struct App {
    pub running: bool,
    pub db: Connection,
    pub view: AppView,
    view_history: Vec<AppView>,
    pub sessions: Vec<WorkSession>,
    pub status: Option<String>,
    pub today: NaiveDate,
    /// Month shown in the calendar view.
    pub reference_date: NaiveDate,
    pub calendar_days: Vec<CalendarDay>,
    pub selected_day_index: usize,
    pub selected_session_index: usize,
    pub report_range: ReportRange,
    /// Index into the bucket list, 0 = newest period.
    pub report_index: usize,
    pub report_page: usize,
    pub session_popup: Option<SessionPopup>,
    pub confirm: Option<ConfirmAction>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionField {
    Title,
    Date,
    Start,
    End,
    Project,
    Tags,
    Description,
}

impl SessionField {
    fn next(self) -> Self {
        match self {
            Self::Title => Self::Date,
            Self::Date => Self::Start,
            Self::Start => Self::End,
            Self::End => Self::Project,
            Self::Project => Self::Tags,
            Self::Tags => Self::Description,
            Self::Description => Self::Title,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Title => Self::Description,
            Self::Date => Self::Title,
            Self::Start => Self::Date,
            Self::End => Self::Start,
            Self::Project => Self::End,
            Self::Tags => Self::Project,
            Self::Description => Self::Tags,
        }
    }
}

/// Form popup for creating or editing a session. All fields are free text;
/// they go through the same parsing heuristics as CSV import on save.
#[derive(Clone, Debug)]
pub struct SessionPopup {
    /// `Some` when editing; save re-uses the id.
    pub session_id: Option<SessionId>,
    pub field: SessionField,
    pub title: String,
    pub date: String,
    pub start: String,
    pub end: String,
    pub project: String,
    pub tags: String,
    pub description: String,
}

impl SessionPopup {
    fn new(date: NaiveDate) -> Self {
        Self {
            session_id: None,
            field: SessionField::Title,
            title: String::new(),
            date: date.format("%Y-%m-%d").to_string(),
            start: "09:00".to_string(),
            end: "17:00".to_string(),
            project: String::new(),
            tags: String::new(),
            description: String::new(),
        }
    }

    fn for_session(session: &WorkSession) -> Self {
        Self {
            session_id: Some(session.id.clone()),
            field: SessionField::Title,
            title: session.title.clone(),
            date: session.date.format("%Y-%m-%d").to_string(),
            start: session.start_time.format("%H:%M").to_string(),
            end: session.end_time.format("%H:%M").to_string(),
            project: session.project.clone().unwrap_or_default(),
            tags: session.tags.join("; "),
            description: session.description.clone().unwrap_or_default(),
        }
    }

    fn active_field_mut(&mut self) -> &mut String {
        match self.field {
            SessionField::Title => &mut self.title,
            SessionField::Date => &mut self.date,
            SessionField::Start => &mut self.start,
            SessionField::End => &mut self.end,
            SessionField::Project => &mut self.project,
            SessionField::Tags => &mut self.tags,
            SessionField::Description => &mut self.description,
        }
    }
}

#[derive(Clone, Debug)]
pub enum ConfirmAction {
    DeleteSession(SessionId, String),
    ClearAll,
}

impl App {
    pub fn new(db: Connection) -> Self {
        let today = Local::now().date_naive();
        let mut app = Self {
            running: true,
            db,
            view: AppView::Calendar,
            view_history: Vec::new(),
            sessions: Vec::new(),
            status: None,
            today,
            reference_date: today,
            calendar_days: Vec::new(),
            selected_day_index: 0,
            selected_session_index: 0,
            report_range: ReportRange::Week,
            report_index: 0,
            report_page: 0,
            session_popup: None,
            confirm: None,
        };
        app.load_sessions();
        app.select_today();
        app
    }

    /// Central update function - process an event and mutate state.
    pub fn update(&mut self, event: AppEvent) {
        match event {
            AppEvent::Tick => {
                let today = Local::now().date_naive();
                if today != self.today {
                    self.today = today;
                    self.rebuild_calendar();
                }
            }
            AppEvent::KeyPress(key) => self.handle_key(key),
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        if self.session_popup.is_some() {
            self.handle_popup_key(key);
            return;
        }
        if self.confirm.is_some() {
            self.handle_confirm_key(key);
            return;
        }

        match key {
            KeyCode::Char('q') => self.running = false,
            KeyCode::Char('c') => self.navigate_to(AppView::Calendar),
            KeyCode::Char('l') => self.navigate_to(AppView::Sessions),
            KeyCode::Char('p') => self.navigate_to(AppView::Report),
            KeyCode::Char('?') => {
                if self.view == AppView::Help {
                    self.go_back();
                } else {
                    self.navigate_to(AppView::Help);
                }
            }
            KeyCode::Char('r') => self.load_sessions(),
            KeyCode::Tab => self.cycle_view(),
            KeyCode::BackTab => {
                if self.view == AppView::Report {
                    self.toggle_report_range();
                }
            }
            KeyCode::Left => match self.view {
                AppView::Calendar => self.move_day_selection(-1),
                AppView::Sessions => self.page_sessions(-1),
                AppView::Report => self.move_report_period(1), // older
                AppView::Help => {}
            },
            KeyCode::Right => match self.view {
                AppView::Calendar => self.move_day_selection(1),
                AppView::Sessions => self.page_sessions(1),
                AppView::Report => self.move_report_period(-1), // newer
                AppView::Help => {}
            },
            KeyCode::Up => match self.view {
                AppView::Calendar => self.move_day_selection(-7),
                AppView::Sessions => self.move_session_selection_up(),
                AppView::Report => self.page_report(-1),
                AppView::Help => {}
            },
            KeyCode::Down => match self.view {
                AppView::Calendar => self.move_day_selection(7),
                AppView::Sessions => self.move_session_selection_down(),
                AppView::Report => self.page_report(1),
                AppView::Help => {}
            },
            KeyCode::Char('[') => self.shift_month(-1),
            KeyCode::Char(']') => self.shift_month(1),
            KeyCode::Char('t') => {
                self.reference_date = self.today;
                self.rebuild_calendar();
                self.select_today();
            }
            KeyCode::Char('n') => self.open_new_session_popup(),
            KeyCode::Char('e') => self.open_edit_popup(),
            KeyCode::Char('d') => self.request_delete_selected(),
            KeyCode::Char('x') => {
                if !self.sessions.is_empty() {
                    self.confirm = Some(ConfirmAction::ClearAll);
                }
            }
            KeyCode::Esc => self.go_back(),
            _ => {}
        }
    }

    fn navigate_to(&mut self, view: AppView) {
        if self.view != view {
            self.view_history.push(self.view);
            self.view = view;
        }
    }

    fn go_back(&mut self) {
        if let Some(view) = self.view_history.pop() {
            self.view = view;
        }
    }

    fn cycle_view(&mut self) {
        let next = match self.view {
            AppView::Calendar => AppView::Sessions,
            AppView::Sessions => AppView::Report,
            AppView::Report | AppView::Help => AppView::Calendar,
        };
        self.navigate_to(next);
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn load_sessions(&mut self) {
        match db::load_sessions(&self.db) {
            Ok(sessions) => {
                self.sessions = sessions;
                self.clear_status();
                if self.selected_session_index >= self.sessions.len() {
                    self.selected_session_index = self.sessions.len().saturating_sub(1);
                }
                self.rebuild_calendar();
                self.clamp_report_index();
            }
            Err(err) => {
                self.status = Some(format!("Failed to load sessions: {err}"));
            }
        }
    }

    fn rebuild_calendar(&mut self) {
        self.calendar_days =
            calendar::generate_calendar_days(self.reference_date, self.today, &self.sessions);
        if self.selected_day_index >= self.calendar_days.len() {
            self.selected_day_index = self.calendar_days.len().saturating_sub(1);
        }
    }

    fn select_today(&mut self) {
        if let Some(index) = self.calendar_days.iter().position(|day| day.is_today) {
            self.selected_day_index = index;
        } else if let Some(index) = self
            .calendar_days
            .iter()
            .position(|day| day.is_current_month)
        {
            self.selected_day_index = index;
        }
    }

    /// Moving past the grid edges rolls the calendar into the adjacent month.
    fn move_day_selection(&mut self, offset: i64) {
        let Some(selected) = self.calendar_days.get(self.selected_day_index) else {
            return;
        };
        let target = selected.date + Duration::days(offset);
        if target.month() != self.reference_date.month()
            || target.year() != self.reference_date.year()
        {
            self.reference_date = target;
            self.rebuild_calendar();
        }
        if let Some(index) = self
            .calendar_days
            .iter()
            .position(|day| day.date == target)
        {
            self.selected_day_index = index;
        }
    }

    fn shift_month(&mut self, offset: i32) {
        if self.view != AppView::Calendar {
            return;
        }
        self.reference_date = if offset < 0 {
            self.reference_date - Months::new(1)
        } else {
            self.reference_date + Months::new(1)
        };
        self.rebuild_calendar();
        if let Some(index) = self
            .calendar_days
            .iter()
            .position(|day| day.is_current_month)
        {
            self.selected_day_index = index;
        }
    }

    pub fn selected_day(&self) -> Option<&CalendarDay> {
        self.calendar_days.get(self.selected_day_index)
    }

    pub fn selected_session(&self) -> Option<&WorkSession> {
        self.sessions.get(self.selected_session_index)
    }

    /// First session index shown on the current list page.
    pub fn list_page_start(&self) -> usize {
        (self.selected_session_index / PAGE_SIZE) * PAGE_SIZE
    }

    fn move_session_selection_up(&mut self) {
        if self.sessions.is_empty() {
            return;
        }
        if self.selected_session_index == 0 {
            self.selected_session_index = self.sessions.len() - 1;
        } else {
            self.selected_session_index -= 1;
        }
    }

    fn move_session_selection_down(&mut self) {
        if self.sessions.is_empty() {
            return;
        }
        self.selected_session_index = (self.selected_session_index + 1) % self.sessions.len();
    }

    fn page_sessions(&mut self, offset: i64) {
        if self.sessions.is_empty() {
            return;
        }
        let pages = self.sessions.len().div_ceil(PAGE_SIZE);
        let current = self.selected_session_index / PAGE_SIZE;
        let target = (current as i64 + offset).rem_euclid(pages as i64) as usize;
        self.selected_session_index = (target * PAGE_SIZE).min(self.sessions.len() - 1);
    }

    pub fn report_groups(&self) -> Vec<(String, Vec<WorkSession>)> {
        match self.report_range {
            ReportRange::Week => calendar::group_by_week(&self.sessions),
            ReportRange::Month => calendar::group_by_month(&self.sessions),
        }
    }

    fn toggle_report_range(&mut self) {
        self.report_range = match self.report_range {
            ReportRange::Week => ReportRange::Month,
            ReportRange::Month => ReportRange::Week,
        };
        self.report_index = 0;
        self.report_page = 0;
    }

    fn move_report_period(&mut self, offset: i64) {
        let count = self.report_groups().len();
        if count == 0 {
            return;
        }
        let target = self.report_index as i64 + offset;
        self.report_index = target.clamp(0, count as i64 - 1) as usize;
        self.report_page = 0;
    }

    fn page_report(&mut self, offset: i64) {
        let groups = self.report_groups();
        let Some((_, bucket)) = groups.get(self.report_index) else {
            return;
        };
        let pages = bucket.len().div_ceil(PAGE_SIZE).max(1);
        let target = (self.report_page as i64 + offset).rem_euclid(pages as i64);
        self.report_page = target as usize;
    }

    fn clamp_report_index(&mut self) {
        let count = self.report_groups().len();
        if self.report_index >= count {
            self.report_index = count.saturating_sub(1);
        }
        self.report_page = 0;
    }

    fn open_new_session_popup(&mut self) {
        let date = match self.view {
            AppView::Calendar => self
                .selected_day()
                .map(|day| day.date)
                .unwrap_or(self.today),
            _ => self.today,
        };
        self.session_popup = Some(SessionPopup::new(date));
    }

    fn open_edit_popup(&mut self) {
        let session = match self.view {
            AppView::Sessions => self.selected_session(),
            AppView::Calendar => self
                .selected_day()
                .and_then(|day| day.sessions.first())
                .and_then(|first| self.sessions.iter().find(|s| s.id == first.id)),
            _ => None,
        };
        if let Some(session) = session {
            self.session_popup = Some(SessionPopup::for_session(session));
        }
    }

    fn request_delete_selected(&mut self) {
        let session = match self.view {
            AppView::Sessions => self.selected_session(),
            AppView::Calendar => self.selected_day().and_then(|day| day.sessions.first()),
            _ => None,
        };
        if let Some(session) = session {
            self.confirm = Some(ConfirmAction::DeleteSession(
                session.id.clone(),
                session.title.clone(),
            ));
        }
    }

    fn handle_popup_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.session_popup = None;
                self.clear_status();
            }
            KeyCode::Enter => self.apply_session_popup(),
            KeyCode::Tab => {
                if let Some(popup) = self.session_popup.as_mut() {
                    popup.field = popup.field.next();
                }
            }
            KeyCode::BackTab => {
                if let Some(popup) = self.session_popup.as_mut() {
                    popup.field = popup.field.prev();
                }
            }
            KeyCode::Backspace | KeyCode::Delete => {
                if let Some(popup) = self.session_popup.as_mut() {
                    popup.active_field_mut().pop();
                }
            }
            KeyCode::Char(ch) => {
                if ch.is_control() {
                    return;
                }
                if let Some(popup) = self.session_popup.as_mut() {
                    popup.active_field_mut().push(ch);
                }
            }
            _ => {}
        }
    }

    fn apply_session_popup(&mut self) {
        let Some(popup) = self.session_popup.clone() else {
            return;
        };
        if popup.title.trim().is_empty() {
            self.status = Some("Title must not be empty".to_string());
            return;
        }
        let Some(date) = csv::parse_date(&popup.date) else {
            self.status = Some(format!("Could not parse date '{}'", popup.date));
            return;
        };
        let start_time = if popup.start.trim().is_empty() {
            date.and_hms_opt(9, 0, 0).expect("valid time of day")
        } else {
            csv::parse_time(&popup.start, date)
        };
        let end_time = if popup.end.trim().is_empty() {
            date.and_hms_opt(17, 0, 0).expect("valid time of day")
        } else {
            csv::parse_time(&popup.end, date)
        };
        let tags: Vec<String> = popup
            .tags
            .split([';', ','])
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect();

        let session = WorkSession {
            id: popup.session_id.clone().unwrap_or_else(types::new_session_id),
            title: popup.title.trim().to_string(),
            description: non_empty(&popup.description),
            date,
            start_time,
            end_time,
            duration: types::duration_minutes(start_time, end_time),
            project: non_empty(&popup.project),
            tags,
        };
        match db::upsert_session(&session, &self.db) {
            Ok(()) => {
                self.session_popup = None;
                self.load_sessions();
            }
            Err(err) => {
                self.status = Some(format!("Failed to save session: {err}"));
            }
        }
    }

    fn handle_confirm_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                let Some(action) = self.confirm.take() else {
                    return;
                };
                let result = match &action {
                    ConfirmAction::DeleteSession(id, _) => db::delete_session(id, &self.db),
                    ConfirmAction::ClearAll => db::clear_sessions(&self.db),
                };
                match result {
                    Ok(()) => self.load_sessions(),
                    Err(err) => self.status = Some(format!("Operation failed: {err}")),
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.confirm = None;
            }
            _ => {}
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
