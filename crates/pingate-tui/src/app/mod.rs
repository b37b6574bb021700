//! Application state and event handling

mod events;
mod router;
mod state;

pub use events::{gate_event_for_key, AppEvent};
pub use router::Router;
pub use state::{AppState, Screen};

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use pingate_core::{
    BiometrySupport, CredentialStore, Dismissal, EntryTimings, GateConfig, GateContext,
    GateEvent, GateExit, GateHandle, GateParams, GateView, NavigationController, NoBiometrics,
    PinGate, SessionFlags, SessionStore,
};
use ratatui::prelude::*;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::ui::{self, Theme};

/// Redraw interval
const TICK_RATE: Duration = Duration::from_millis(100);

/// How long the simulated transaction history load takes
const HISTORY_LOAD_TIME: Duration = Duration::from_secs(3);

/// Which gate is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateKind {
    /// App-wide lock overlay
    Lock,
    /// Standalone confirmation requested from the dashboard
    Confirm,
}

struct ActiveGate {
    kind: GateKind,
    handle: GateHandle,
    task: JoinHandle<pingate_core::Result<GateExit>>,
}

/// Main application struct
pub struct App {
    /// Application state
    pub state: AppState,

    /// Color palette
    pub theme: Theme,

    /// Process-wide session flags
    pub store: SessionStore,

    /// Screen stack, shared with running gates
    pub router: Arc<Router>,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Tick counter for animations
    pub tick: u64,

    ctx: GateContext,
    config: GateConfig,
    credentials: CredentialStore,
    gate: Option<ActiveGate>,
    app_tx: mpsc::UnboundedSender<AppEvent>,
    app_rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl App {
    /// Create the application around a provisioned credential
    pub fn new(config: GateConfig, credentials: CredentialStore) -> Result<Self> {
        let verifier = credentials
            .verifier()
            .context("Failed to load the stored PIN")?;

        let store = SessionStore::new(SessionFlags::default());
        let router = Arc::new(Router::new());
        let navigator: Arc<dyn NavigationController> = router.clone();

        let ctx = GateContext {
            store: store.clone(),
            navigator,
            verifier: Arc::new(verifier),
            // Terminals have no biometric store, so `biometry_enabled` only
            // matters to hosts embedding the gate with one
            biometric_store: Arc::new(NoBiometrics),
            biometry: BiometrySupport {
                supported: false,
                enabled: config.biometry_enabled,
            },
            timings: EntryTimings::from(&config),
        };

        let (app_tx, app_rx) = mpsc::unbounded_channel();

        Ok(Self {
            state: AppState::new(),
            theme: Theme::default(),
            store,
            router,
            should_quit: false,
            tick: 0,
            ctx,
            config,
            credentials,
            gate: None,
            app_tx,
            app_rx,
        })
    }

    /// Current screen beneath any overlay
    pub fn screen(&self) -> Screen {
        self.router.current()
    }

    /// Render snapshot and kind of the gate on screen, if any
    pub fn gate_view(&self) -> Option<(GateKind, GateView)> {
        self.gate
            .as_ref()
            .map(|active| (active.kind, active.handle.view()))
    }

    /// Run the application main loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        self.store.lock();
        self.start_history_load();

        let mut flags = self.store.subscribe();
        let mut terminal_events = EventStream::new();
        let mut ticker = tokio::time::interval(TICK_RATE);

        while !self.should_quit {
            self.sync_gate().await?;
            terminal.draw(|frame| ui::render(frame, self))?;

            let mut view = self.gate.as_ref().map(|active| active.handle.watch());

            tokio::select! {
                event = terminal_events.next() => match event {
                    Some(Ok(event)) => self.handle_terminal_event(event),
                    Some(Err(e)) => return Err(e).context("Failed to read terminal event"),
                    None => self.should_quit = true,
                },
                Some(event) = self.app_rx.recv() => self.handle_app_event(event),
                Ok(()) = flags.changed() => {
                    debug!(locked = flags.borrow().locked, "Session flags changed");
                }
                Ok(()) = view_changed(&mut view) => {}
                _ = ticker.tick() => {
                    self.tick = self.tick.wrapping_add(1);
                }
            }
        }

        self.close_gate().await;
        Ok(())
    }

    /// Reconcile the running gate with the session flags
    async fn sync_gate(&mut self) -> Result<()> {
        if self
            .gate
            .as_ref()
            .is_some_and(|active| active.task.is_finished())
        {
            if let Some(active) = self.gate.take() {
                let exit = active.task.await.context("PIN gate task failed")?;
                match exit {
                    Ok(exit) => self.on_gate_exit(active.kind, exit),
                    Err(e) => {
                        warn!("PIN gate ended with error: {}", e);
                        self.state.set_error(e.to_string());
                    }
                }
            }
        }

        if !self.store.is_locked() {
            return Ok(());
        }

        // A lock engaging takes the screen from any confirmation in progress
        if self
            .gate
            .as_ref()
            .is_some_and(|active| active.kind == GateKind::Confirm)
        {
            self.close_gate().await;
        }

        if self.gate.is_none() {
            let gate = PinGate::app_lock(&self.ctx, GateParams::app_lock(&self.config));
            self.install(GateKind::Lock, gate);
        }
        Ok(())
    }

    fn install(&mut self, kind: GateKind, gate: PinGate) {
        let (handle, task) = gate.spawn();
        debug!(?kind, "Gate mounted");
        self.gate = Some(ActiveGate { kind, handle, task });
    }

    /// Unmount the current gate and wait for it to finish
    async fn close_gate(&mut self) {
        let Some(active) = self.gate.take() else {
            return;
        };
        if let Err(e) = active.handle.send(GateEvent::Deactivate).await {
            debug!("Gate already stopped: {}", e);
        }
        match active.task.await {
            Ok(Ok(exit)) => self.on_gate_exit(active.kind, exit),
            Ok(Err(e)) => warn!("PIN gate ended with error: {}", e),
            Err(e) => warn!("PIN gate task failed: {}", e),
        }
    }

    fn on_gate_exit(&mut self, kind: GateKind, exit: GateExit) {
        info!(?kind, ?exit, "Gate finished");
        match (kind, exit) {
            (GateKind::Lock, GateExit::Dismissed(Dismissal::Unlocked)) => {
                self.state.set_status("Wallet unlocked");
            }
            (GateKind::Lock, GateExit::ResetRequested) => {
                self.state.clear_messages();
            }
            (GateKind::Confirm, GateExit::Dismissed(_)) => {}
            (GateKind::Confirm, GateExit::Canceled) => {
                self.state.set_status("PIN confirmation canceled");
            }
            (GateKind::Confirm, GateExit::Deactivated) => {
                // The gate never navigated away, so leave its screen here
                if let Err(e) = self.router.go_back() {
                    warn!("Could not leave confirmation screen: {}", e);
                }
            }
            _ => {}
        }
    }

    fn open_confirmation(&mut self) {
        let events = self.app_tx.clone();
        let params = GateParams::standalone(&self.config)
            .cancelable(true)
            .prompt("Confirm your PIN Code ")
            .on_complete(move |_pin| {
                let _ = events.send(AppEvent::PinConfirmed);
            });

        self.router.push(Screen::ConfirmPin);
        let gate = PinGate::standalone(&self.ctx, params);
        self.install(GateKind::Confirm, gate);
    }

    fn start_history_load(&self) {
        self.store.set_history_load(true, false);
        self.schedule_history_load();
    }

    fn schedule_history_load(&self) {
        let events = self.app_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(HISTORY_LOAD_TIME).await;
            let _ = events.send(AppEvent::HistoryLoaded);
        });
    }

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::PinConfirmed => {
                self.state.confirmations += 1;
                self.state.set_status("PIN confirmed");
            }
            AppEvent::HistoryLoaded => {
                if self.store.history_load().active {
                    self.store.set_history_load(false, false);
                    info!("Transaction history loaded");
                } else {
                    // Suspended by the reset flow; finish once it is restored
                    self.schedule_history_load();
                }
            }
        }
    }

    fn handle_terminal_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::FocusGained => self.forward(GateEvent::Activate),
            _ => {}
        }
    }

    fn forward(&self, event: GateEvent) {
        if let Some(active) = &self.gate {
            if let Err(e) = active.handle.try_send(event) {
                warn!("Dropped gate input: {}", e);
            }
        }
    }

    /// Handle key press events
    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if let Some(active) = &self.gate {
            if let Some(event) = gate_event_for_key(key.code, active.handle.view().action) {
                self.forward(event);
            }
            return;
        }

        match self.router.current() {
            Screen::Dashboard => self.handle_dashboard_key(key.code),
            Screen::ResetWallet => self.handle_reset_key(key.code),
            Screen::ConfirmPin => {
                if key.code == KeyCode::Esc {
                    let _ = self.router.go_back();
                }
            }
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('p') => {
                self.state.clear_messages();
                self.open_confirmation();
            }
            KeyCode::Char('l') => {
                self.state.clear_messages();
                self.store.lock();
            }
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_reset_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('b') | KeyCode::Esc => match self.router.take_return_hook() {
                Some(hook) => {
                    if let Err(e) = hook() {
                        warn!("Return from reset failed: {}", e);
                        self.state.set_error(e.to_string());
                    }
                }
                None => {
                    if let Err(e) = self.router.go_back() {
                        self.state.set_error(e.to_string());
                    }
                }
            },
            KeyCode::Char('y') => match self.credentials.clear() {
                Ok(()) => {
                    info!("Wallet reset, stored PIN removed");
                    self.should_quit = true;
                }
                Err(e) => self.state.set_error(format!("Reset failed: {}", e)),
            },
            _ => {}
        }
    }
}

async fn view_changed(
    view: &mut Option<watch::Receiver<GateView>>,
) -> std::result::Result<(), watch::error::RecvError> {
    match view {
        Some(rx) => rx.changed().await,
        None => std::future::pending().await,
    }
}
