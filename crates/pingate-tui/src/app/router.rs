//! Navigation router for screen transitions
//!
//! The router is the terminal host's [`NavigationController`]. Gates run on
//! their own tasks and call into it, so its state sits behind a mutex.

use std::sync::{Mutex, MutexGuard};

use pingate_core::{GateError, NavigationController, Result, ReturnCallback, Route};
use tracing::debug;

use super::state::Screen;

/// Maximum history depth
const MAX_DEPTH: usize = 20;

struct RouterState {
    /// Navigation history stack, never empty
    history: Vec<Screen>,
    /// Hook left behind by whoever navigated to the current screen
    return_hook: Option<ReturnCallback>,
}

/// Router manages navigation history
pub struct Router {
    inner: Mutex<RouterState>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("Router")
            .field("history", &state.history)
            .field("return_hook", &state.return_hook.is_some())
            .finish()
    }
}

impl Router {
    /// Create a router sitting on the dashboard
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RouterState {
                history: vec![Screen::Dashboard],
                return_hook: None,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, RouterState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Get the current screen
    pub fn current(&self) -> Screen {
        self.state()
            .history
            .last()
            .copied()
            .unwrap_or(Screen::Dashboard)
    }

    /// Push a new screen onto the history
    pub fn push(&self, screen: Screen) {
        let mut state = self.state();
        if state.history.len() >= MAX_DEPTH {
            state.history.remove(0);
        }
        state.history.push(screen);
        debug!("Navigated to {:?}", screen);
    }

    /// Take the return hook registered for the current screen
    pub fn take_return_hook(&self) -> Option<ReturnCallback> {
        self.state().return_hook.take()
    }

    /// Get the breadcrumb trail
    pub fn breadcrumb(&self) -> Vec<&'static str> {
        self.state().history.iter().map(Screen::title).collect()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationController for Router {
    fn go_back(&self) -> Result<()> {
        let mut state = self.state();
        if state.history.len() <= 1 {
            return Err(GateError::Navigation("Nothing to go back to".into()));
        }
        let left = state.history.pop();
        state.return_hook = None;
        debug!("Left {:?}", left);
        Ok(())
    }

    fn navigate(&self, route: Route) -> Result<()> {
        match route {
            Route::ResetWallet => self.push(Screen::ResetWallet),
            Route::Dashboard => {
                let mut state = self.state();
                state.history.clear();
                state.history.push(Screen::Dashboard);
                state.return_hook = None;
                debug!("Navigated to dashboard");
            }
        }
        Ok(())
    }

    fn register_return_callback(&self, callback: ReturnCallback) {
        self.state().return_hook = Some(callback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_push_and_back() {
        let router = Router::new();
        router.push(Screen::ConfirmPin);
        assert_eq!(router.current(), Screen::ConfirmPin);
        assert_eq!(router.breadcrumb(), vec!["Dashboard", "Confirm PIN"]);

        router.go_back().unwrap();
        assert_eq!(router.current(), Screen::Dashboard);
        assert!(router.go_back().is_err());
    }

    #[test]
    fn test_reset_route_and_return_hook() {
        let router = Router::new();
        router.navigate(Route::ResetWallet).unwrap();
        assert_eq!(router.current(), Screen::ResetWallet);

        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        router.register_return_callback(Box::new(move || {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        }));

        let hook = router.take_return_hook().unwrap();
        hook().unwrap();
        assert!(fired.load(Ordering::SeqCst));
        assert!(router.take_return_hook().is_none());
    }

    #[test]
    fn test_dashboard_route_clears_history() {
        let router = Router::new();
        router.push(Screen::ConfirmPin);
        router.navigate(Route::ResetWallet).unwrap();
        router.register_return_callback(Box::new(|| Ok(())));

        router.navigate(Route::Dashboard).unwrap();
        assert_eq!(router.breadcrumb(), vec!["Dashboard"]);
        assert!(router.take_return_hook().is_none());
    }

    #[test]
    fn test_history_depth_limited() {
        let router = Router::new();
        for _ in 0..50 {
            router.push(Screen::ConfirmPin);
        }
        assert_eq!(router.breadcrumb().len(), MAX_DEPTH);
    }
}
