//! Application state

/// Screens on the navigation stack
///
/// The lock screen is not listed: it is an overlay driven by the session
/// lock flag, not a navigation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    /// Wallet overview
    #[default]
    Dashboard,

    /// Standalone "confirm PIN" request
    ConfirmPin,

    /// Wallet reset flow (forgotten PIN)
    ResetWallet,
}

impl Screen {
    /// Title for breadcrumb
    pub fn title(&self) -> &'static str {
        match self {
            Screen::Dashboard => "Dashboard",
            Screen::ConfirmPin => "Confirm PIN",
            Screen::ResetWallet => "Reset Wallet",
        }
    }
}

/// Messages and counters shown on the dashboard
#[derive(Debug, Default)]
pub struct AppState {
    /// Status message to display
    pub status_message: Option<String>,

    /// Error message to display
    pub error_message: Option<String>,

    /// Successful PIN confirmations this session
    pub confirmations: u32,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.error_message = None;
        self.status_message = Some(message.into());
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.status_message = None;
        self.error_message = Some(message.into());
    }

    /// Clear status messages
    pub fn clear_messages(&mut self) {
        self.status_message = None;
        self.error_message = None;
    }
}
