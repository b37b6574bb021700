//! Wallet reset screen, reached from the lock screen's reset escape

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::app::App;
use crate::ui::layout::{render_footer, render_header, ScreenLayout};

/// Render the reset confirmation
pub fn render(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let layout = ScreenLayout::new(frame.area());

    render_header(frame, layout.header, &app.router.breadcrumb().join(" > "), theme);

    let mut lines = vec![
        Line::default(),
        Line::styled("  Forgot your PIN?", theme.title()),
        Line::default(),
        Line::styled(
            "  Resetting removes the stored PIN from this device. You will need \
             your recovery phrase to restore the wallet.",
            theme.text(),
        ),
    ];
    if let Some(error) = &app.state.error_message {
        lines.push(Line::default());
        lines.push(Line::styled(format!("  {}", error), theme.danger()));
    }

    let body = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(" Reset Wallet ")
            .title_style(theme.title())
            .borders(Borders::ALL)
            .border_style(theme.danger()),
    );
    frame.render_widget(body, layout.content);

    render_footer(
        frame,
        layout.footer,
        &[("b", "Back to lock screen"), ("y", "Reset wallet")],
        theme,
    );
}
