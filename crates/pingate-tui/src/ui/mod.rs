//! UI rendering

pub mod layout;
pub mod screens;
pub mod theme;

pub use theme::Theme;

use ratatui::prelude::*;

use crate::app::{App, Screen};

/// Main render function - draws the current screen, then any gate on top
pub fn render(frame: &mut Frame, app: &App) {
    match app.screen() {
        Screen::Dashboard | Screen::ConfirmPin => screens::dashboard::render(frame, app),
        Screen::ResetWallet => screens::reset::render(frame, app),
    }

    if let Some((kind, view)) = app.gate_view() {
        screens::pin_entry::render(frame, kind, &view, &app.theme);
    }
}
