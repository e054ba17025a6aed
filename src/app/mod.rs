mod state;

use crossterm::event::KeyCode;

pub use state::{App, ConfirmAction, SessionField, SessionPopup};

/// Possible input events the app reacts to.
pub enum AppEvent {
    Tick,
    KeyPress(KeyCode),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppView {
    Calendar,
    Sessions,
    Report,
    Help,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportRange {
    Week,
    Month,
}

/// Sessions shown per page in the list and report views.
pub const PAGE_SIZE: usize = 10;

pub const TABS: [(&str, AppView); 3] = [
    ("Calendar", AppView::Calendar),
    ("Sessions", AppView::Sessions),
    ("Reports", AppView::Report),
];
