//! Gate configuration
//!
//! `GateConfig` holds persisted user preferences and timings. `GateParams`
//! is the per-instance construction input a caller passes when it asks for
//! authentication.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GateError, Result};
use crate::pin::Pin;

/// Configuration file name
const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration directory under the platform config dir
const CONFIG_DIR_NAME: &str = "pingate";

/// Default prompt above the PIN dots
pub const DEFAULT_PROMPT: &str = "Enter your PIN Code ";

/// Default text for the system biometric prompt
pub const DEFAULT_BIOMETRIC_PROMPT: &str = "Unlock Wallet";

/// Persisted gate preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Delay between the last digit and validation (milliseconds)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Interval between removed characters after a rejection (milliseconds)
    #[serde(default = "default_drain_interval_ms")]
    pub drain_interval_ms: u64,

    /// Prompt shown above the PIN input
    #[serde(default = "default_prompt")]
    pub prompt_text: String,

    /// Prompt passed to the biometric store
    #[serde(default = "default_biometric_prompt")]
    pub biometric_prompt_text: String,

    /// Whether the user opted into biometric unlock
    #[serde(default)]
    pub biometry_enabled: bool,
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_drain_interval_ms() -> u64 {
    25
}

fn default_prompt() -> String {
    DEFAULT_PROMPT.to_string()
}

fn default_biometric_prompt() -> String {
    DEFAULT_BIOMETRIC_PROMPT.to_string()
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            drain_interval_ms: default_drain_interval_ms(),
            prompt_text: default_prompt(),
            biometric_prompt_text: default_biometric_prompt(),
            biometry_enabled: false,
        }
    }
}

impl GateConfig {
    /// Get the configuration directory path
    pub fn config_dir() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg_config).join(CONFIG_DIR_NAME));
        }
        dirs::config_dir().map(|p| p.join(CONFIG_DIR_NAME))
    }

    /// Get the full config file path
    pub fn config_file_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default location
    ///
    /// Returns defaults if the file doesn't exist or can't be parsed.
    pub fn load() -> Self {
        let path = match Self::config_file_path() {
            Some(p) => p,
            None => return Self::default(),
        };

        if !path.exists() {
            return Self::default();
        }

        Self::load_from(&path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config file {:?}: {}", path, e);
            Self::default()
        })
    }

    /// Load and validate configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()
            .ok_or_else(|| GateError::Config("Could not determine config directory".into()))?;
        self.save_to(&path)
    }

    /// Save configuration to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        tracing::debug!("Saved config to {:?}", path);
        Ok(())
    }

    /// Reject timings the entry machine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.debounce_ms == 0 {
            return Err(GateError::Config("debounce_ms must be greater than zero".into()));
        }
        if self.drain_interval_ms == 0 {
            return Err(GateError::Config(
                "drain_interval_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn drain_interval(&self) -> Duration {
        Duration::from_millis(self.drain_interval_ms)
    }
}

/// Callback receiving the validated PIN of a standalone gate
pub type OnComplete = Box<dyn FnOnce(Pin) + Send>;

/// Construction-time parameters of one gate instance
pub struct GateParams {
    /// Whether the user may back out of the gate
    pub cancelable: bool,
    /// Prompt shown above the PIN input
    pub prompt_text: String,
    /// Prompt passed to the biometric store
    pub biometric_prompt_text: String,
    /// Callback for standalone gates
    pub on_complete: Option<OnComplete>,
}

impl GateParams {
    /// Parameters for the app-wide lock screen
    ///
    /// The lock screen can never be canceled and takes no callback.
    pub fn app_lock(config: &GateConfig) -> Self {
        Self {
            cancelable: false,
            prompt_text: config.prompt_text.clone(),
            biometric_prompt_text: config.biometric_prompt_text.clone(),
            on_complete: None,
        }
    }

    /// Parameters for a standalone "confirm PIN" gate with config defaults
    pub fn standalone(config: &GateConfig) -> Self {
        Self::app_lock(config)
    }

    pub fn cancelable(mut self, cancelable: bool) -> Self {
        self.cancelable = cancelable;
        self
    }

    pub fn prompt(mut self, text: impl Into<String>) -> Self {
        self.prompt_text = text.into();
        self
    }

    pub fn biometric_prompt(mut self, text: impl Into<String>) -> Self {
        self.biometric_prompt_text = text.into();
        self
    }

    pub fn on_complete(mut self, cb: impl FnOnce(Pin) + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(cb));
        self
    }
}

impl fmt::Debug for GateParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateParams")
            .field("cancelable", &self.cancelable)
            .field("prompt_text", &self.prompt_text)
            .field("biometric_prompt_text", &self.biometric_prompt_text)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}
