//! PIN entry overlay for the lock screen and confirmation requests

use pingate_core::{EntryPhase, FeedbackState, GateAction, GateView, PinColor};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::GateKind;
use crate::ui::layout::{centered_rect_fixed, hint_text};
use crate::ui::Theme;

/// Draw the gate as a dialog over whatever screen is below
pub fn render(frame: &mut Frame, kind: GateKind, view: &GateView, theme: &Theme) {
    let area = frame.area();
    let dialog = centered_rect_fixed(48, 13, area);

    let title = match kind {
        GateKind::Lock => " Wallet Locked ",
        GateKind::Confirm => " Confirm PIN ",
    };
    let block = Block::default()
        .title(title)
        .title_style(theme.title())
        .borders(Borders::ALL)
        .border_style(theme.border_focused());

    let inner = block.inner(dialog);
    frame.render_widget(Clear, dialog);
    frame.render_widget(block, dialog);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Prompt
            Constraint::Length(2), // PIN display
            Constraint::Length(2), // Feedback
            Constraint::Min(0),    // Spacer
            Constraint::Length(1), // Help
        ])
        .split(inner);

    let prompt = Paragraph::new(view.prompt.trim_end())
        .style(theme.text_secondary())
        .alignment(Alignment::Center);
    frame.render_widget(prompt, chunks[0]);

    let dots = Paragraph::new(pin_dots(view, theme)).alignment(Alignment::Center);
    frame.render_widget(dots, chunks[1]);

    let feedback = match (&view.feedback, view.phase) {
        (_, EntryPhase::Validating) => Some(("Checking...", theme.text_muted())),
        (FeedbackState::Rejected(message), _) => Some((message.as_str(), theme.danger())),
        (FeedbackState::Neutral, _) => None,
    };
    if let Some((text, style)) = feedback {
        let widget = Paragraph::new(text).style(style).alignment(Alignment::Center);
        frame.render_widget(widget, chunks[2]);
    }

    let help = Paragraph::new(hint_text(&hints(view.action)))
        .style(theme.text_muted())
        .alignment(Alignment::Center);
    frame.render_widget(help, chunks[4]);
}

fn pin_dots(view: &GateView, theme: &Theme) -> Line<'static> {
    let filled_style = match view.color {
        PinColor::Normal => theme.pin_dot(),
        PinColor::Error => theme.danger(),
    };

    let mut spans = Vec::with_capacity(view.capacity * 2);
    for i in 0..view.capacity {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        if i < view.filled {
            spans.push(Span::styled("●", filled_style));
        } else {
            spans.push(Span::styled("○", theme.pin_placeholder()));
        }
    }
    Line::from(spans)
}

fn hints(action: GateAction) -> [(&'static str, &'static str); 2] {
    match action {
        GateAction::Cancel => [("0-9", "Enter PIN"), ("r", "Cancel")],
        GateAction::ResetWallet => [("0-9", "Enter PIN"), ("r", "Forgot PIN")],
    }
}
