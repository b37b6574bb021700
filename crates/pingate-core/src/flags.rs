//! Process-wide session flags
//!
//! The application owns one [`SessionStore`] and hands clones of it to every
//! gate it creates. All mutation goes through named operations; each one is
//! applied atomically under the watch channel's lock, so a suspend/restore
//! pair stays consistent even when hosts touch the store from several tasks.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

/// Progress of the background history load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryLoadStatus {
    /// A load-history screen is (or should be) active
    pub active: bool,
    /// The last load attempt failed
    pub errored: bool,
}

/// Flags shared between the gate and the rest of the application
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionFlags {
    /// The app-wide lock screen is armed
    pub locked: bool,
    /// History-load status
    pub history_load: HistoryLoadStatus,
}

/// History-load status captured by [`SessionStore::suspend_history_load`]
///
/// Handing it back to [`SessionStore::restore_history_load`] is the only way
/// to undo a suspension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a suspended history load must be restored with this snapshot"]
pub struct HistoryLoadSnapshot {
    active: bool,
}

impl HistoryLoadSnapshot {
    /// Whether the load was active when it was suspended
    pub fn was_active(&self) -> bool {
        self.active
    }
}

/// Owning handle to the session flags
#[derive(Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<SessionFlags>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SessionFlags::default())
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SessionStore").field(&self.snapshot()).finish()
    }
}

impl SessionStore {
    /// Create a store with initial flags
    pub fn new(flags: SessionFlags) -> Self {
        let (tx, _) = watch::channel(flags);
        Self { tx: Arc::new(tx) }
    }

    /// Current value of every flag
    pub fn snapshot(&self) -> SessionFlags {
        *self.tx.borrow()
    }

    /// Watch flag changes (only actual changes are signalled)
    pub fn subscribe(&self) -> watch::Receiver<SessionFlags> {
        self.tx.subscribe()
    }

    pub fn is_locked(&self) -> bool {
        self.tx.borrow().locked
    }

    pub fn set_locked(&self, locked: bool) {
        let changed = self.tx.send_if_modified(|flags| {
            let changed = flags.locked != locked;
            flags.locked = locked;
            changed
        });
        if changed {
            debug!("Session lock set to {}", locked);
        }
    }

    /// Arm the app-wide lock screen
    pub fn lock(&self) {
        self.set_locked(true);
    }

    /// Dismiss the app-wide lock screen
    pub fn unlock(&self) {
        self.set_locked(false);
    }

    pub fn history_load(&self) -> HistoryLoadStatus {
        self.tx.borrow().history_load
    }

    pub fn set_history_load(&self, active: bool, errored: bool) {
        let status = HistoryLoadStatus { active, errored };
        self.tx.send_if_modified(|flags| {
            let changed = flags.history_load != status;
            flags.history_load = status;
            changed
        });
    }

    /// Capture the history-load status and clear it in one step
    pub fn suspend_history_load(&self) -> HistoryLoadSnapshot {
        let mut captured = HistoryLoadStatus::default();
        self.tx.send_if_modified(|flags| {
            captured = flags.history_load;
            flags.history_load = HistoryLoadStatus::default();
            captured != flags.history_load
        });
        debug!("History load suspended (was active: {})", captured.active);
        HistoryLoadSnapshot {
            active: captured.active,
        }
    }

    /// Put back the status captured by a suspension, with the error cleared
    pub fn restore_history_load(&self, snapshot: HistoryLoadSnapshot) {
        debug!("History load restored (active: {})", snapshot.active);
        self.set_history_load(snapshot.active, false);
    }
}
