use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ConciergeError, Result};

/// Top-level configuration for the Concierge client.
///
/// Loaded from `~/.concierge/config.toml` by default. Each section covers one
/// surface or cross-cutting concern. The backend base URL is mandatory: there
/// is no built-in placeholder, and `validate` rejects a configuration that
/// does not set it.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConciergeConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
}

impl ConciergeConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ConciergeConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    ///
    /// The defaults do not pass `validate` on their own: the backend base URL
    /// still has to come from the environment or the command line.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ConciergeError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Overlay settings from process environment variables.
    ///
    /// Recognized variables: `CONCIERGE_BASE_URL`, `CONCIERGE_LOG_LEVEL`,
    /// `CONCIERGE_VOICE_PUBLIC_KEY`, `CONCIERGE_VOICE_ASSISTANT_ID`.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Overlay settings from an arbitrary key lookup. Blank values are
    /// ignored so an empty exported variable cannot clobber a file setting.
    pub fn apply_overrides_from(&mut self, get: impl Fn(&str) -> Option<String>) {
        let mut set = |key: &str, target: &mut String| {
            if let Some(value) = get(key) {
                if !value.trim().is_empty() {
                    *target = value;
                }
            }
        };
        set("CONCIERGE_BASE_URL", &mut self.backend.base_url);
        set("CONCIERGE_LOG_LEVEL", &mut self.general.log_level);
        set("CONCIERGE_VOICE_PUBLIC_KEY", &mut self.voice.public_key);
        set("CONCIERGE_VOICE_ASSISTANT_ID", &mut self.voice.assistant_id);
    }

    /// Check that the configuration is usable.
    ///
    /// The backend base URL must be set and the request timeout must be
    /// non-zero. Voice credentials are intentionally not required here: the
    /// voice surface degrades to an error display on its own.
    pub fn validate(&self) -> Result<()> {
        if self.backend.base_url.trim().is_empty() {
            return Err(ConciergeError::Config(
                "backend.base_url must be set (config file, CONCIERGE_BASE_URL, or --base-url)"
                    .to_string(),
            ));
        }
        if self.backend.timeout_secs == 0 {
            return Err(ConciergeError::Config(
                "backend.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Support backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the support backend. Mandatory; no default value.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Additional attempts after a retryable failure (0 disables retry).
    pub retry_attempts: u32,
    /// Fixed delay between retry attempts, in milliseconds.
    pub retry_backoff_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_secs: 30,
            retry_attempts: 2,
            retry_backoff_ms: 500,
        }
    }
}

/// Chat surface settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Maximum user message length in characters.
    pub max_message_length: usize,
    /// Quick replies attached to every successful assistant turn.
    pub quick_replies: Vec<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_message_length: 2000,
            quick_replies: vec!["Raise a ticket".to_string(), "Talk to support".to_string()],
        }
    }
}

/// Voice session settings. Both identifiers must be present for a voice
/// session to start.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VoiceConfig {
    /// Public key for the embedded voice provider.
    pub public_key: String,
    /// Assistant identifier for the embedded voice provider.
    pub assistant_id: String,
}
