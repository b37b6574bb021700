//! Shared test doubles for gate integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pingate_core::{
    BiometricError, BiometricStore, BiometrySupport, CredentialVerifier, EntryTimings,
    GateContext, NavigationController, NoBiometrics, Pin, Result, ReturnCallback, Route,
    SessionStore,
};
use tokio::time::Instant;

/// Ordered record of everything observable the gate did
#[derive(Default)]
pub struct Journal {
    entries: Mutex<Vec<String>>,
}

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }
}

/// Navigator that journals calls and keeps the registered return hook
#[derive(Default)]
pub struct TestNavigator {
    pub journal: Arc<Journal>,
    hook: Mutex<Option<ReturnCallback>>,
}

impl TestNavigator {
    pub fn with_journal(journal: Arc<Journal>) -> Self {
        Self {
            journal,
            hook: Mutex::new(None),
        }
    }

    /// Simulate the reset screen's back button
    pub fn press_back_on_reset(&self) -> Result<()> {
        let hook = self
            .hook
            .lock()
            .unwrap()
            .take()
            .expect("no return hook registered");
        hook()
    }

    pub fn has_return_hook(&self) -> bool {
        self.hook.lock().unwrap().is_some()
    }
}

impl NavigationController for TestNavigator {
    fn go_back(&self) -> Result<()> {
        self.journal.push("go_back");
        Ok(())
    }

    fn navigate(&self, route: Route) -> Result<()> {
        self.journal.push(format!("navigate {:?}", route));
        Ok(())
    }

    fn register_return_callback(&self, callback: ReturnCallback) {
        *self.hook.lock().unwrap() = Some(callback);
    }
}

/// Verifier accepting one PIN and recording when each call happened
pub struct TestVerifier {
    correct: String,
    delay: Duration,
    pub calls: Mutex<Vec<(String, Instant)>>,
}

impl TestVerifier {
    pub fn accepting(correct: &str) -> Self {
        Self {
            correct: correct.to_string(),
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Verifier that takes `delay` to reach its verdict
    pub fn slow(correct: &str, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::accepting(correct)
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }
}

#[async_trait]
impl CredentialVerifier for TestVerifier {
    async fn verify(&self, candidate: &Pin) -> bool {
        self.calls
            .lock()
            .unwrap()
            .push((candidate.as_str().to_string(), Instant::now()));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        candidate.as_str() == self.correct
    }
}

/// Biometric store returning a fixed credential
pub struct FixedBiometrics {
    pub credential: Option<String>,
    pub prompts: Mutex<Vec<String>>,
}

impl FixedBiometrics {
    pub fn returning(credential: &str) -> Self {
        Self {
            credential: Some(credential.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn declining() -> Self {
        Self {
            credential: None,
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl BiometricStore for FixedBiometrics {
    async fn retrieve(&self, prompt: &str) -> std::result::Result<Pin, BiometricError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.credential {
            Some(c) => Ok(Pin::parse(c).expect("test credential must be digits")),
            None => Err(BiometricError::Canceled),
        }
    }
}

/// Everything a scenario needs to inspect after running a gate
pub struct Harness {
    pub ctx: GateContext,
    pub store: SessionStore,
    pub navigator: Arc<TestNavigator>,
    pub verifier: Arc<TestVerifier>,
    pub journal: Arc<Journal>,
}

impl Harness {
    pub fn new(correct_pin: &str) -> Self {
        Self::with_biometrics(correct_pin, BiometrySupport::default(), Arc::new(NoBiometrics))
    }

    pub fn with_biometrics(
        correct_pin: &str,
        biometry: BiometrySupport,
        biometric_store: Arc<dyn BiometricStore>,
    ) -> Self {
        Self::build(TestVerifier::accepting(correct_pin), biometry, biometric_store)
    }

    pub fn with_slow_verifier(correct_pin: &str, delay: Duration) -> Self {
        Self::build(
            TestVerifier::slow(correct_pin, delay),
            BiometrySupport::default(),
            Arc::new(NoBiometrics),
        )
    }

    fn build(
        verifier: TestVerifier,
        biometry: BiometrySupport,
        biometric_store: Arc<dyn BiometricStore>,
    ) -> Self {
        let journal = Arc::new(Journal::default());
        let navigator = Arc::new(TestNavigator::with_journal(Arc::clone(&journal)));
        let verifier = Arc::new(verifier);
        let store = SessionStore::default();

        let ctx = GateContext {
            store: store.clone(),
            navigator: navigator.clone(),
            verifier: verifier.clone(),
            biometric_store,
            biometry,
            timings: EntryTimings::default(),
        };

        Self {
            ctx,
            store,
            navigator,
            verifier,
            journal,
        }
    }
}
