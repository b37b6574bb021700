//! PIN authentication gate for wallet lock screens
//!
//! This crate provides:
//! - A pure PIN entry state machine with debounced validation and
//!   progressive-deletion rejection feedback
//! - A one-shot biometric shortcut that never surfaces its failures
//! - Process-wide session flags with a save/restore contract for the
//!   wallet-reset escape path
//! - Dismissal policy for app-wide lock screens and standalone
//!   "confirm PIN" requests
//! - A tokio driver that runs a gate from host events
//!
//! # Example
//!
//! ```no_run
//! # async fn demo(ctx: pingate_core::GateContext) -> pingate_core::Result<()> {
//! use pingate_core::{GateConfig, GateEvent, GateParams, PinGate};
//!
//! let config = GateConfig::default();
//! let gate = PinGate::app_lock(&ctx, GateParams::app_lock(&config));
//! let (handle, task) = gate.spawn();
//! for c in "123456".chars() {
//!     handle.send(GateEvent::Digit(c)).await?;
//! }
//! let exit = task.await.map_err(|_| pingate_core::GateError::ChannelClosed)??;
//! # let _ = exit;
//! # Ok(())
//! # }
//! ```

pub mod biometric;
pub mod config;
pub mod coordinator;
pub mod dismissal;
pub mod error;
pub mod flags;
pub mod gate;
pub mod machine;
pub mod navigation;
pub mod pin;
pub mod verifier;

pub use biometric::{BiometricGate, BiometricOutcome, BiometricStore, BiometrySupport, NoBiometrics};
pub use config::{GateConfig, GateParams, OnComplete};
pub use coordinator::SessionLockCoordinator;
pub use dismissal::{BackAction, Dismissal, DismissalPolicy, GateAction, GateMode};
pub use error::{BiometricError, GateError, Result};
pub use flags::{HistoryLoadSnapshot, HistoryLoadStatus, SessionFlags, SessionStore};
pub use gate::{GateContext, GateEvent, GateExit, GateHandle, GateView, PinGate};
pub use machine::{
    EntryAction, EntryPhase, EntryTimings, FeedbackState, PinColor, PinEntryMachine,
    INCORRECT_PIN_MESSAGE,
};
pub use navigation::{NavigationController, ReturnCallback, Route};
pub use pin::{Pin, PinBuffer, PIN_LENGTH};
pub use verifier::{hash_pin, Argon2Verifier, CredentialStore, CredentialVerifier};
