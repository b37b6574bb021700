//! Event handling for the TUI

use crossterm::event::KeyCode;
use pingate_core::{GateAction, GateEvent};

/// Events raised by background tasks and gate callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// A standalone confirmation gate accepted the PIN
    PinConfirmed,
    /// The simulated history load finished
    HistoryLoaded,
}

/// Translate a key press into a gate event while a gate has focus
///
/// `r` triggers whichever secondary action the gate offers.
pub fn gate_event_for_key(code: KeyCode, action: GateAction) -> Option<GateEvent> {
    match code {
        KeyCode::Char(c) if c.is_ascii_digit() => Some(GateEvent::Digit(c)),
        KeyCode::Backspace => Some(GateEvent::Delete),
        KeyCode::Esc => Some(GateEvent::Back),
        KeyCode::Char('r') => Some(match action {
            GateAction::Cancel => GateEvent::Cancel,
            GateAction::ResetWallet => GateEvent::Reset,
        }),
        _ => None,
    }
}
