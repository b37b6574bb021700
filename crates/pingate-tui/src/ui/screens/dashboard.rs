//! Dashboard screen - wallet overview

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::App;
use crate::ui::layout::{render_footer, render_header, ScreenLayout};

const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

/// Render the dashboard
pub fn render(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let layout = ScreenLayout::new(frame.area());

    render_header(frame, layout.header, &app.router.breadcrumb().join(" > "), theme);

    let flags = app.store.snapshot();
    let history = if flags.history_load.active {
        let spin = SPINNER[(app.tick % SPINNER.len() as u64) as usize];
        Line::styled(format!("  History:        loading {}", spin), theme.warning())
    } else if flags.history_load.errored {
        Line::styled("  History:        failed to load", theme.danger())
    } else {
        Line::styled("  History:        up to date", theme.success())
    };

    let lock = if flags.locked {
        Line::styled("  Session:        locked", theme.warning())
    } else {
        Line::styled("  Session:        unlocked", theme.success())
    };

    let mut lines = vec![
        Line::default(),
        lock,
        history,
        Line::styled(
            format!("  Confirmations:  {}", app.state.confirmations),
            theme.text(),
        ),
        Line::default(),
    ];

    if let Some(error) = &app.state.error_message {
        lines.push(Line::styled(format!("  {}", error), theme.danger()));
    } else if let Some(status) = &app.state.status_message {
        lines.push(Line::styled(format!("  {}", status), theme.text_secondary()));
    }

    let overview = Paragraph::new(lines).block(
        Block::default()
            .title(" Wallet ")
            .title_style(theme.title())
            .borders(Borders::ALL)
            .border_style(theme.border()),
    );
    frame.render_widget(overview, layout.content);

    render_footer(
        frame,
        layout.footer,
        &[("p", "Confirm PIN"), ("l", "Lock"), ("q", "Quit")],
        theme,
    );
}
