//! Credential verification
//!
//! The gate treats verification as an opaque yes/no check behind
//! [`CredentialVerifier`]. [`Argon2Verifier`] and [`CredentialStore`] are a
//! ready-made backend for hosts that keep the PIN hash on local disk.

use std::fs;
use std::path::{Path, PathBuf};

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::error::{GateError, Result};
use crate::pin::{Pin, PIN_LENGTH};

/// Opaque PIN check
///
/// Implementations must not retain or log the candidate.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, candidate: &Pin) -> bool;
}

#[async_trait]
impl<F> CredentialVerifier for F
where
    F: Fn(&Pin) -> bool + Send + Sync,
{
    async fn verify(&self, candidate: &Pin) -> bool {
        self(candidate)
    }
}

/// Hash a PIN into an Argon2id PHC string
pub fn hash_pin(pin: &Pin) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let pin_bytes = Zeroizing::new(pin.as_str().as_bytes().to_vec());
    Argon2::default()
        .hash_password(&pin_bytes, &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| GateError::Verifier(format!("Failed to hash PIN: {}", e)))
}

/// Verifies candidates against an Argon2id PHC hash
#[derive(Clone)]
pub struct Argon2Verifier {
    phc: String,
}

impl std::fmt::Debug for Argon2Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Argon2Verifier").finish_non_exhaustive()
    }
}

impl Argon2Verifier {
    /// Create a verifier from a PHC string, rejecting malformed hashes
    pub fn from_phc(phc: impl Into<String>) -> Result<Self> {
        let phc = phc.into();
        PasswordHash::new(&phc)
            .map_err(|e| GateError::Verifier(format!("Invalid stored hash: {}", e)))?;
        Ok(Self { phc })
    }

    fn check(phc: &str, candidate: &Pin) -> bool {
        let parsed = match PasswordHash::new(phc) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Stored PIN hash unreadable: {}", e);
                return false;
            }
        };
        let pin_bytes = Zeroizing::new(candidate.as_str().as_bytes().to_vec());
        Argon2::default()
            .verify_password(&pin_bytes, &parsed)
            .is_ok()
    }
}

#[async_trait]
impl CredentialVerifier for Argon2Verifier {
    async fn verify(&self, candidate: &Pin) -> bool {
        // Argon2 is memory-hard; keep it off the event loop
        let phc = self.phc.clone();
        let candidate = candidate.clone();
        match tokio::task::spawn_blocking(move || Self::check(&phc, &candidate)).await {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!("PIN verification task failed: {}", e);
                false
            }
        }
    }
}

/// On-disk credential format
#[derive(Serialize, Deserialize)]
struct StoredCredential {
    /// Argon2id hash of the PIN
    hash: String,
    /// Version for future migrations
    version: u32,
}

/// Local file holding the provisioned PIN hash
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Store at a specific path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the default credential path
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pingate")
            .join("pin.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if a PIN has been provisioned
    pub fn is_provisioned(&self) -> bool {
        self.path.exists()
    }

    /// Hash and persist a new PIN
    pub fn provision(&self, pin: &Pin) -> Result<()> {
        if pin.len() != PIN_LENGTH {
            return Err(GateError::Config(format!(
                "PIN must be exactly {} digits",
                PIN_LENGTH
            )));
        }

        let stored = StoredCredential {
            hash: hash_pin(pin)?,
            version: 1,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&stored)?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        info!("PIN provisioned at {:?}", self.path);
        Ok(())
    }

    /// Load a verifier for the provisioned PIN
    pub fn verifier(&self) -> Result<Argon2Verifier> {
        let contents = fs::read_to_string(&self.path)?;
        let stored: StoredCredential = serde_json::from_str(&contents)?;
        Argon2Verifier::from_phc(stored.hash)
    }

    /// Remove the provisioned PIN (wallet reset)
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            info!("Provisioned PIN removed");
        }
        Ok(())
    }
}
