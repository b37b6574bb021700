//! Navigation seam between the gate and its host
//!
//! The gate only needs to pop itself, jump to a couple of well-known routes,
//! and leave a hook behind for the reset flow to call on its way back.

use crate::error::Result;

/// Destinations the gate can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Wallet reset flow (forgotten PIN)
    ResetWallet,
    /// Main dashboard
    Dashboard,
}

/// Hook run by the host when the user leaves the reset flow without resetting
pub type ReturnCallback = Box<dyn FnOnce() -> Result<()> + Send>;

/// Host navigation system, consumed by the gate
pub trait NavigationController: Send + Sync {
    /// Pop the current screen
    fn go_back(&self) -> Result<()>;

    /// Push or switch to a route
    fn navigate(&self, route: Route) -> Result<()>;

    /// Register the hook the current route runs when its back action fires
    fn register_return_callback(&self, callback: ReturnCallback);
}
