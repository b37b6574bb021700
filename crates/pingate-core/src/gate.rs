//! Gate driver
//!
//! [`PinGate`] owns one entry machine, the biometric shortcut, and the
//! dismissal policy, and runs them as a single task fed by [`GateEvent`]s.
//! All timers are deadlines of the machine awaited inside the same
//! `select!` as the events, so once [`PinGate::run`] returns nothing the
//! gate scheduled can fire again.
//!
//! Lifecycle: `run` performs the first activation itself (reset plus the
//! one-shot biometric attempt). A later [`GateEvent::Activate`] is a focus
//! regain and only resets entry. [`GateEvent::Deactivate`] or dropping the
//! sender tears the gate down; events queued behind it are never seen.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::biometric::{BiometricGate, BiometricOutcome, BiometricStore, BiometrySupport};
use crate::config::GateParams;
use crate::coordinator::SessionLockCoordinator;
use crate::dismissal::{BackAction, Dismissal, DismissalPolicy, GateAction, GateMode};
use crate::error::{GateError, Result};
use crate::flags::SessionStore;
use crate::machine::{
    EntryAction, EntryPhase, EntryTimings, FeedbackState, PinColor, PinEntryMachine,
};
use crate::navigation::NavigationController;
use crate::pin::{Pin, PIN_LENGTH};
use crate::verifier::CredentialVerifier;

/// Capacity of the event channel created by [`PinGate::spawn`]
const EVENT_BUFFER: usize = 32;

/// Input and lifecycle events from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateEvent {
    /// A key press; non-digits are ignored
    Digit(char),
    /// Remove the last digit
    Delete,
    /// Platform back action
    Back,
    /// Cancel button
    Cancel,
    /// Reset-wallet button
    Reset,
    /// The gate regained focus
    Activate,
    /// The gate is being unmounted
    Deactivate,
}

/// How a gate run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateExit {
    /// Authenticated by PIN or biometry
    Dismissed(Dismissal),
    /// The user backed out of a cancelable gate
    Canceled,
    /// The user took the wallet-reset escape
    ResetRequested,
    /// The host unmounted the gate
    Deactivated,
}

/// Render snapshot; never carries the digits themselves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateView {
    pub prompt: String,
    pub filled: usize,
    pub capacity: usize,
    pub color: PinColor,
    pub feedback: FeedbackState,
    pub phase: EntryPhase,
    pub action: GateAction,
}

/// Collaborators shared by every gate the application creates
#[derive(Clone)]
pub struct GateContext {
    pub store: SessionStore,
    pub navigator: Arc<dyn NavigationController>,
    pub verifier: Arc<dyn CredentialVerifier>,
    pub biometric_store: Arc<dyn BiometricStore>,
    pub biometry: BiometrySupport,
    pub timings: EntryTimings,
}

impl std::fmt::Debug for GateContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GateContext")
            .field("store", &self.store)
            .field("biometry", &self.biometry)
            .field("timings", &self.timings)
            .finish_non_exhaustive()
    }
}

/// Host-side handle to a spawned gate
#[derive(Debug)]
pub struct GateHandle {
    events: mpsc::Sender<GateEvent>,
    view: watch::Receiver<GateView>,
}

impl GateHandle {
    /// Deliver an event to the gate
    pub async fn send(&self, event: GateEvent) -> Result<()> {
        self.events
            .send(event)
            .await
            .map_err(|_| GateError::ChannelClosed)
    }

    /// Deliver an event without waiting for channel capacity
    pub fn try_send(&self, event: GateEvent) -> Result<()> {
        self.events
            .try_send(event)
            .map_err(|_| GateError::ChannelClosed)
    }

    /// Latest render snapshot
    pub fn view(&self) -> GateView {
        self.view.borrow().clone()
    }

    /// Subscribe to render snapshots
    pub fn watch(&self) -> watch::Receiver<GateView> {
        self.view.clone()
    }
}

/// One authentication gate instance
pub struct PinGate {
    machine: PinEntryMachine,
    biometric: BiometricGate,
    policy: DismissalPolicy,
    verifier: Arc<dyn CredentialVerifier>,
    prompt_text: String,
    biometric_prompt_text: String,
    view_tx: watch::Sender<GateView>,
}

impl std::fmt::Debug for PinGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinGate")
            .field("machine", &self.machine)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl PinGate {
    /// Gate for the app-wide lock screen
    ///
    /// `cancelable` and `on_complete` in `params` do not apply and are ignored.
    pub fn app_lock(ctx: &GateContext, params: GateParams) -> Self {
        if params.cancelable || params.on_complete.is_some() {
            warn!("Lock screen gate ignores cancelable and completion callback");
        }
        Self::build(ctx, GateMode::AppLock, params.prompt_text, params.biometric_prompt_text)
    }

    /// Gate for an explicit "confirm PIN" request
    pub fn standalone(ctx: &GateContext, params: GateParams) -> Self {
        let mode = GateMode::Standalone {
            cancelable: params.cancelable,
            on_complete: params.on_complete,
        };
        Self::build(ctx, mode, params.prompt_text, params.biometric_prompt_text)
    }

    fn build(
        ctx: &GateContext,
        mode: GateMode,
        prompt_text: String,
        biometric_prompt_text: String,
    ) -> Self {
        let coordinator = SessionLockCoordinator::new(ctx.store.clone(), Arc::clone(&ctx.navigator));
        let policy = DismissalPolicy::new(mode, coordinator, Arc::clone(&ctx.navigator));
        let machine = PinEntryMachine::new(ctx.timings);

        let view = Self::render(&machine, &policy, &prompt_text);
        let (view_tx, _) = watch::channel(view);

        Self {
            machine,
            biometric: BiometricGate::new(ctx.biometry, Arc::clone(&ctx.biometric_store)),
            policy,
            verifier: Arc::clone(&ctx.verifier),
            prompt_text,
            biometric_prompt_text,
            view_tx,
        }
    }

    /// Subscribe to render snapshots
    pub fn view(&self) -> watch::Receiver<GateView> {
        self.view_tx.subscribe()
    }

    /// Run the gate on its own task
    pub fn spawn(self) -> (GateHandle, JoinHandle<Result<GateExit>>) {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let handle = GateHandle {
            events: tx,
            view: self.view(),
        };
        (handle, tokio::spawn(self.run(rx)))
    }

    /// Drive the gate until it is dismissed, canceled, reset, or deactivated
    pub async fn run(mut self, mut events: mpsc::Receiver<GateEvent>) -> Result<GateExit> {
        info!(mode = ?self.policy.mode(), "PIN gate started");

        self.machine.reset();
        let mut biometric = self
            .biometric
            .begin(&self.biometric_prompt_text)
            .map(FutureExt::boxed);
        self.publish();

        let exit = loop {
            let deadline = self.machine.deadline();

            tokio::select! {
                event = events.recv() => {
                    let event = match event {
                        Some(event) => event,
                        None => break GateExit::Deactivated,
                    };
                    if let Some(exit) = self.handle_event(event)? {
                        break exit;
                    }
                }
                _ = wait_until(deadline) => {
                    if let Some(exit) = self.handle_timer(&mut events).await? {
                        break exit;
                    }
                }
                outcome = biometric_attempt(&mut biometric) => {
                    biometric = None;
                    if let BiometricOutcome::Unlocked(pin) = outcome {
                        break self.dismiss(pin)?;
                    }
                }
            }

            self.publish();
        };

        info!(?exit, "PIN gate torn down");
        Ok(exit)
    }

    fn handle_event(&mut self, event: GateEvent) -> Result<Option<GateExit>> {
        match event {
            GateEvent::Digit(c) => {
                self.machine.input_digit(c, Instant::now());
            }
            GateEvent::Delete => {
                self.machine.delete_digit();
            }
            GateEvent::Back => {
                if self.policy.back()? == BackAction::Canceled {
                    return Ok(Some(GateExit::Canceled));
                }
            }
            GateEvent::Cancel => {
                if self.policy.cancel()? {
                    return Ok(Some(GateExit::Canceled));
                }
                debug!("Cancel ignored by non-cancelable gate");
            }
            GateEvent::Reset => {
                if self.policy.action() == GateAction::ResetWallet {
                    self.policy.coordinator().go_to_reset()?;
                    return Ok(Some(GateExit::ResetRequested));
                }
                debug!("Reset not offered by cancelable gate");
            }
            GateEvent::Activate => self.machine.reset(),
            GateEvent::Deactivate => return Ok(Some(GateExit::Deactivated)),
        }
        Ok(None)
    }

    async fn handle_timer(
        &mut self,
        events: &mut mpsc::Receiver<GateEvent>,
    ) -> Result<Option<GateExit>> {
        let Some(EntryAction::Verify(candidate)) = self.machine.poll(Instant::now()) else {
            return Ok(None);
        };

        // Publish the Validating state before the verifier runs
        self.publish();

        // Lifecycle events keep flowing while the verifier runs; digits are
        // ignored by the machine until the verdict lands or entry is reset.
        let verifier = Arc::clone(&self.verifier);
        let accepted = {
            let mut verdict = verifier.verify(&candidate);
            loop {
                tokio::select! {
                    accepted = &mut verdict => break accepted,
                    event = events.recv() => {
                        let Some(event) = event else {
                            return Ok(Some(GateExit::Deactivated));
                        };
                        if let Some(exit) = self.handle_event(event)? {
                            return Ok(Some(exit));
                        }
                        self.publish();
                    }
                }
            }
        };

        if !self.machine.resolve(accepted, Instant::now()) {
            debug!("Verdict discarded, entry was reset during verification");
            return Ok(None);
        }

        if self.machine.phase() == EntryPhase::Accepted {
            return self.dismiss(candidate).map(Some);
        }
        Ok(None)
    }

    fn dismiss(&mut self, pin: Pin) -> Result<GateExit> {
        self.machine.reset();
        let dismissal = self.policy.dismiss(pin)?;
        Ok(GateExit::Dismissed(dismissal))
    }

    fn publish(&self) {
        let view = Self::render(&self.machine, &self.policy, &self.prompt_text);
        self.view_tx.send_if_modified(|current| {
            if *current == view {
                return false;
            }
            *current = view;
            true
        });
    }

    fn render(machine: &PinEntryMachine, policy: &DismissalPolicy, prompt: &str) -> GateView {
        GateView {
            prompt: prompt.to_string(),
            filled: machine.len(),
            capacity: PIN_LENGTH,
            color: machine.color(),
            feedback: machine.feedback().clone(),
            phase: machine.phase(),
            action: policy.action(),
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn biometric_attempt(
    attempt: &mut Option<BoxFuture<'static, BiometricOutcome>>,
) -> BiometricOutcome {
    match attempt {
        Some(attempt) => attempt.await,
        None => std::future::pending().await,
    }
}
