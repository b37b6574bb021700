//! Error types for the PIN gate

use thiserror::Error;

/// Result type alias for gate operations
pub type Result<T> = std::result::Result<T, GateError>;

/// Errors that can escape the gate
///
/// A wrong PIN is not an error: it is a `false` verdict that drives the
/// rejection feedback inside the entry machine.
#[derive(Debug, Error)]
pub enum GateError {
    /// The host navigation system failed to perform a transition
    #[error("Navigation error: {0}")]
    Navigation(String),

    /// The credential verifier could not run at all
    #[error("Verifier error: {0}")]
    Verifier(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The host dropped the event channel while an operation needed it
    #[error("Gate event channel closed")]
    ChannelClosed,
}

impl From<serde_json::Error> for GateError {
    fn from(e: serde_json::Error) -> Self {
        GateError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for GateError {
    fn from(e: toml::de::Error) -> Self {
        GateError::Serialization(e.to_string())
    }
}

impl From<toml::ser::Error> for GateError {
    fn from(e: toml::ser::Error) -> Self {
        GateError::Serialization(e.to_string())
    }
}

/// Failures reported by a biometric credential store
///
/// These never reach the user; the biometric gate folds them into a
/// silent fall-through to manual entry.
#[derive(Debug, Error)]
pub enum BiometricError {
    /// The user dismissed the system prompt
    #[error("Biometric prompt canceled")]
    Canceled,

    /// No enrolled biometry or no stored credential
    #[error("Biometry not available")]
    NotAvailable,

    /// Hardware or keystore failure
    #[error("Biometric store error: {0}")]
    Store(String),
}
