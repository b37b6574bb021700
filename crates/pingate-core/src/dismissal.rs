//! What happens when a gate is satisfied, canceled, or backed out of

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::OnComplete;
use crate::coordinator::SessionLockCoordinator;
use crate::error::Result;
use crate::navigation::NavigationController;
use crate::pin::Pin;

/// How a gate is being used, fixed at construction
pub enum GateMode {
    /// A one-off "confirm PIN" request from elsewhere in the app
    Standalone {
        cancelable: bool,
        on_complete: Option<OnComplete>,
    },
    /// The app-wide lock screen
    AppLock,
}

impl GateMode {
    pub fn is_cancelable(&self) -> bool {
        matches!(self, GateMode::Standalone { cancelable: true, .. })
    }
}

impl std::fmt::Debug for GateMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GateMode::Standalone {
                cancelable,
                on_complete,
            } => f
                .debug_struct("Standalone")
                .field("cancelable", cancelable)
                .field("on_complete", &on_complete.is_some())
                .finish(),
            GateMode::AppLock => f.write_str("AppLock"),
        }
    }
}

/// Secondary action the gate offers next to the PIN input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateAction {
    /// Leave without authenticating
    Cancel,
    /// Forgotten PIN: go to the wallet-reset flow
    ResetWallet,
}

/// Which path a successful dismissal took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dismissal {
    /// The lock flag was cleared
    Unlocked,
    /// The gate was popped and the callback (if any) ran
    Completed { callback_ran: bool },
}

/// Result of the platform back action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackAction {
    /// The gate was torn down
    Canceled,
    /// The action was swallowed; the gate stays up untouched
    Consumed,
}

/// Resolves a satisfied gate and polices cancel/back
pub struct DismissalPolicy {
    mode: GateMode,
    coordinator: SessionLockCoordinator,
    navigator: Arc<dyn NavigationController>,
}

impl std::fmt::Debug for DismissalPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DismissalPolicy")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl DismissalPolicy {
    pub fn new(
        mode: GateMode,
        coordinator: SessionLockCoordinator,
        navigator: Arc<dyn NavigationController>,
    ) -> Self {
        Self {
            mode,
            coordinator,
            navigator,
        }
    }

    pub fn mode(&self) -> &GateMode {
        &self.mode
    }

    pub fn coordinator(&self) -> &SessionLockCoordinator {
        &self.coordinator
    }

    /// The secondary action offered for this mode
    pub fn action(&self) -> GateAction {
        if self.mode.is_cancelable() {
            GateAction::Cancel
        } else {
            GateAction::ResetWallet
        }
    }

    /// Resolve the gate with a validated credential
    ///
    /// A standalone gate is popped before its callback runs, so navigation
    /// done by the callback lands on the caller's screen, not on the gate.
    pub fn dismiss(&mut self, pin: Pin) -> Result<Dismissal> {
        match &mut self.mode {
            GateMode::AppLock => {
                self.coordinator.unlock();
                Ok(Dismissal::Unlocked)
            }
            GateMode::Standalone { on_complete, .. } => {
                self.navigator.go_back()?;
                let callback = on_complete.take();
                let callback_ran = callback.is_some();
                if let Some(cb) = callback {
                    debug!("Running PIN confirmation callback");
                    cb(pin);
                }
                info!("PIN confirmation completed");
                Ok(Dismissal::Completed { callback_ran })
            }
        }
    }

    /// Explicit cancel button. Returns `Ok(false)` when the mode forbids it.
    ///
    /// Never consults the verifier and never runs the callback.
    pub fn cancel(&mut self) -> Result<bool> {
        if !self.mode.is_cancelable() {
            return Ok(false);
        }
        if let GateMode::Standalone { on_complete, .. } = &mut self.mode {
            on_complete.take();
        }
        self.navigator.go_back()?;
        info!("PIN confirmation canceled");
        Ok(true)
    }

    /// Platform back action
    pub fn back(&mut self) -> Result<BackAction> {
        if self.cancel()? {
            Ok(BackAction::Canceled)
        } else {
            debug!("Back action consumed by non-cancelable gate");
            Ok(BackAction::Consumed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::SessionStore;
    use crate::navigation::{ReturnCallback, Route};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Journal {
        entries: Mutex<Vec<String>>,
    }

    impl Journal {
        fn push(&self, entry: impl Into<String>) {
            self.entries.lock().unwrap().push(entry.into());
        }

        fn entries(&self) -> Vec<String> {
            self.entries.lock().unwrap().clone()
        }
    }

    impl NavigationController for Journal {
        fn go_back(&self) -> Result<()> {
            self.push("go_back");
            Ok(())
        }

        fn navigate(&self, route: Route) -> Result<()> {
            self.push(format!("navigate {:?}", route));
            Ok(())
        }

        fn register_return_callback(&self, _callback: ReturnCallback) {}
    }

    fn policy(mode: GateMode) -> (DismissalPolicy, Arc<Journal>, SessionStore) {
        let journal = Arc::new(Journal::default());
        let store = SessionStore::default();
        store.lock();
        let coordinator = SessionLockCoordinator::new(store.clone(), journal.clone());
        (
            DismissalPolicy::new(mode, coordinator, journal.clone()),
            journal,
            store,
        )
    }

    #[test]
    fn test_app_lock_dismiss_unlocks() {
        let (mut policy, journal, store) = policy(GateMode::AppLock);

        let outcome = policy.dismiss(Pin::parse("123456").unwrap()).unwrap();
        assert_eq!(outcome, Dismissal::Unlocked);
        assert!(!store.is_locked());
        assert!(journal.entries().is_empty());
    }

    #[test]
    fn test_standalone_pops_before_callback() {
        let journal = Arc::new(Journal::default());
        let cb_journal = journal.clone();
        let mode = GateMode::Standalone {
            cancelable: false,
            on_complete: Some(Box::new(move |pin: Pin| {
                cb_journal.push(format!("callback {}", pin.as_str()));
            })),
        };
        let coordinator =
            SessionLockCoordinator::new(SessionStore::default(), journal.clone());
        let mut policy = DismissalPolicy::new(mode, coordinator, journal.clone());

        let outcome = policy.dismiss(Pin::parse("123456").unwrap()).unwrap();
        assert_eq!(outcome, Dismissal::Completed { callback_ran: true });
        assert_eq!(journal.entries(), vec!["go_back", "callback 123456"]);
    }

    #[test]
    fn test_standalone_without_callback() {
        let (mut policy, journal, store) = policy(GateMode::Standalone {
            cancelable: true,
            on_complete: None,
        });

        let outcome = policy.dismiss(Pin::parse("123456").unwrap()).unwrap();
        assert_eq!(outcome, Dismissal::Completed { callback_ran: false });
        assert_eq!(journal.entries(), vec!["go_back"]);
        assert!(store.is_locked());
    }

    #[test]
    fn test_cancel_when_cancelable() {
        let (mut policy, journal, _) = policy(GateMode::Standalone {
            cancelable: true,
            on_complete: Some(Box::new(|_| panic!("callback must not run"))),
        });

        assert_eq!(policy.action(), GateAction::Cancel);
        assert_eq!(policy.back().unwrap(), BackAction::Canceled);
        assert_eq!(journal.entries(), vec!["go_back"]);
    }

    #[test]
    fn test_back_consumed_when_not_cancelable() {
        for mode in [
            GateMode::AppLock,
            GateMode::Standalone {
                cancelable: false,
                on_complete: None,
            },
        ] {
            let (mut policy, journal, _) = policy(mode);
            assert_eq!(policy.action(), GateAction::ResetWallet);
            assert_eq!(policy.back().unwrap(), BackAction::Consumed);
            assert!(!policy.cancel().unwrap());
            assert!(journal.entries().is_empty());
        }
    }
}
