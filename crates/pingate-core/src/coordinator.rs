//! Session lock coordination and the wallet-reset escape path

use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::flags::{HistoryLoadSnapshot, SessionStore};
use crate::navigation::{NavigationController, Route};

/// Mediates every write the gate makes to the session flags
#[derive(Clone)]
pub struct SessionLockCoordinator {
    store: SessionStore,
    navigator: Arc<dyn NavigationController>,
}

impl std::fmt::Debug for SessionLockCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionLockCoordinator")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl SessionLockCoordinator {
    pub fn new(store: SessionStore, navigator: Arc<dyn NavigationController>) -> Self {
        Self { store, navigator }
    }

    /// Dismiss the lock overlay after a successful unlock
    ///
    /// The overlay sits above the running app, so nothing is navigated.
    pub fn unlock(&self) {
        info!("Lock screen dismissed");
        self.store.unlock();
    }

    /// Leave the gate for the wallet-reset flow without authenticating
    ///
    /// Navigates first; if that fails nothing has been mutated. Otherwise the
    /// history load is suspended, a return hook holding the suspended status
    /// is registered with the navigator, and the overlay is dismissed so the
    /// reset flow is usable.
    pub fn go_to_reset(&self) -> Result<()> {
        self.navigator.navigate(Route::ResetWallet)?;

        let snapshot = self.store.suspend_history_load();

        let coordinator = self.clone();
        self.navigator.register_return_callback(Box::new(move || {
            coordinator.back_from_reset(snapshot)
        }));

        self.store.unlock();
        info!("Entered wallet reset flow");
        Ok(())
    }

    /// Come back from an aborted reset
    ///
    /// Restores the suspended history-load status, re-arms the lock, and
    /// navigates to the dashboard, which stays hidden under the overlay.
    pub fn back_from_reset(&self, snapshot: HistoryLoadSnapshot) -> Result<()> {
        self.store.restore_history_load(snapshot);
        self.store.lock();
        info!("Returned from wallet reset flow, lock re-armed");
        self.navigator.navigate(Route::Dashboard)
    }
}
