//! One-shot biometric unlock
//!
//! A biometric attempt is offered once when a gate starts. Anything other
//! than a retrieved credential falls through silently to manual PIN entry;
//! biometric failures are never shown as authentication errors.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::BiometricError;
use crate::pin::Pin;

/// Platform credential store guarded by biometry
#[async_trait]
pub trait BiometricStore: Send + Sync {
    /// Show the system prompt and return the stored credential
    async fn retrieve(&self, prompt: &str) -> Result<Pin, BiometricError>;
}

/// Store for platforms without biometry
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBiometrics;

#[async_trait]
impl BiometricStore for NoBiometrics {
    async fn retrieve(&self, _prompt: &str) -> Result<Pin, BiometricError> {
        Err(BiometricError::NotAvailable)
    }
}

/// Device capability and user preference, read once when a gate starts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BiometrySupport {
    /// The device has usable biometry
    pub supported: bool,
    /// The user opted in
    pub enabled: bool,
}

impl BiometrySupport {
    pub fn usable(&self) -> bool {
        self.supported && self.enabled
    }
}

/// Result of a biometric attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BiometricOutcome {
    /// The store returned the credential
    Unlocked(Pin),
    /// The user dismissed the prompt
    Declined,
    /// Biometry unusable, not attempted, or failed
    Unavailable,
}

/// Offers the biometric shortcut at most once per gate
pub struct BiometricGate {
    support: BiometrySupport,
    store: Arc<dyn BiometricStore>,
    attempted: bool,
}

impl std::fmt::Debug for BiometricGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BiometricGate")
            .field("support", &self.support)
            .field("attempted", &self.attempted)
            .finish_non_exhaustive()
    }
}

impl BiometricGate {
    pub fn new(support: BiometrySupport, store: Arc<dyn BiometricStore>) -> Self {
        Self {
            support,
            store,
            attempted: false,
        }
    }

    /// Claim the single attempt this gate is allowed
    ///
    /// Returns a detached future that runs the attempt, or `None` when
    /// biometry is unusable or the attempt was already claimed. The future
    /// owns everything it needs so a driver can race it against input.
    pub fn begin(
        &mut self,
        prompt: &str,
    ) -> Option<impl std::future::Future<Output = BiometricOutcome> + Send + 'static> {
        if self.attempted || !self.support.usable() {
            return None;
        }
        self.attempted = true;

        let store = Arc::clone(&self.store);
        let prompt = prompt.to_string();
        Some(async move { Self::attempt(store.as_ref(), &prompt).await })
    }

    /// Run the attempt to completion
    pub async fn try_unlock(&mut self, prompt: &str) -> BiometricOutcome {
        match self.begin(prompt) {
            Some(attempt) => attempt.await,
            None => BiometricOutcome::Unavailable,
        }
    }

    async fn attempt(store: &dyn BiometricStore, prompt: &str) -> BiometricOutcome {
        match store.retrieve(prompt).await {
            Ok(pin) => {
                debug!("Biometric unlock succeeded");
                BiometricOutcome::Unlocked(pin)
            }
            Err(BiometricError::Canceled) => {
                debug!("Biometric prompt declined, falling back to PIN entry");
                BiometricOutcome::Declined
            }
            Err(e) => {
                debug!("Biometric unlock unavailable: {}", e);
                BiometricOutcome::Unavailable
            }
        }
    }
}
