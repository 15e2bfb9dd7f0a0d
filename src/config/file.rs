//! Configuration file management for dicto.
//!
//! This module handles loading and saving application configuration from TOML
//! files. Configuration is stored in the user's config directory; API keys are
//! managed separately by the secrets module.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::transcription::{Backend, RelayModelTier, RetryPolicy};

/// Relay backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Relay endpoint URL (POST transcribes, GET probes health)
    #[serde(default = "default_relay_url")]
    pub url: String,
    /// Model tier sent with each upload: "small" or "medium"
    #[serde(default)]
    pub model_tier: RelayModelTier,
    /// Probe the endpoint with a GET before uploading
    #[serde(default = "default_true")]
    pub health_check: bool,
    /// Per-attempt timeout in seconds
    #[serde(default = "default_relay_timeout_secs")]
    pub timeout_secs: u64,
    /// Maximum upload attempts, including the first
    #[serde(default = "default_relay_max_attempts")]
    pub max_attempts: u32,
}

fn default_relay_url() -> String {
    "https://relay.example.com/api/whisper".to_string()
}

fn default_true() -> bool {
    true
}

fn default_relay_timeout_secs() -> u64 {
    60
}

fn default_relay_max_attempts() -> u32 {
    3
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            url: default_relay_url(),
            model_tier: RelayModelTier::default(),
            health_check: true,
            timeout_secs: default_relay_timeout_secs(),
            max_attempts: default_relay_max_attempts(),
        }
    }
}

/// Vendor (OpenAI) backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorConfig {
    /// Transcription endpoint URL
    #[serde(default = "default_vendor_url")]
    pub url: String,
    /// Chat-completions endpoint used for cleanup and summaries
    #[serde(default = "default_chat_url")]
    pub chat_url: String,
    /// Transcription language hint (ISO 639-1)
    #[serde(default = "default_language")]
    pub language: String,
    /// Sampling temperature passed to the transcription model
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Per-attempt timeout in seconds (large uploads take a while)
    #[serde(default = "default_vendor_timeout_secs")]
    pub timeout_secs: u64,
    /// Maximum upload attempts, including the first
    #[serde(default = "default_vendor_max_attempts")]
    pub max_attempts: u32,
    /// Run the punctuation/paragraphing cleanup pass after transcription
    #[serde(default = "default_true")]
    pub cleanup: bool,
    /// Chat model used for cleanup and summaries
    #[serde(default = "default_cleanup_model")]
    pub cleanup_model: String,
}

fn default_vendor_url() -> String {
    "https://api.openai.com/v1/audio/transcriptions".to_string()
}

fn default_chat_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_language() -> String {
    "fr".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_vendor_timeout_secs() -> u64 {
    600
}

fn default_vendor_max_attempts() -> u32 {
    2
}

fn default_cleanup_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self {
            url: default_vendor_url(),
            chat_url: default_chat_url(),
            language: default_language(),
            temperature: default_temperature(),
            timeout_secs: default_vendor_timeout_secs(),
            max_attempts: default_vendor_max_attempts(),
            cleanup: true,
            cleanup_model: default_cleanup_model(),
        }
    }
}

/// Backoff configuration shared by both backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Base delay for exponential backoff, in milliseconds
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    /// Upper bound on any single backoff delay, in milliseconds
    #[serde(default = "default_backoff_cap_ms")]
    pub backoff_cap_ms: u64,
}

fn default_backoff_base_ms() -> u64 {
    500
}

fn default_backoff_cap_ms() -> u64 {
    8000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            backoff_base_ms: default_backoff_base_ms(),
            backoff_cap_ms: default_backoff_cap_ms(),
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DictoConfig {
    /// Default backend when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<Backend>,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub vendor: VendorConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    /// Speaker names used by the gap-based tagging heuristic
    #[serde(default)]
    pub speakers: Vec<String>,
}

impl DictoConfig {
    /// Loads configuration from the user's config directory, falling back to
    /// defaults when no file exists yet.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If the file exists but cannot be read or parsed
    pub fn load() -> anyhow::Result<Self> {
        let config_path = get_config_path()?;
        if !config_path.exists() {
            tracing::debug!("No config file at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        let config_content = fs::read_to_string(&config_path)?;
        let config: DictoConfig = toml::from_str(&config_content)?;
        Ok(config)
    }

    /// Saves configuration to the user's config directory.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If the file cannot be written
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = get_config_path()?;
        let config_content = toml::to_string_pretty(self)?;
        fs::write(&config_path, config_content)?;
        tracing::info!("Configuration saved");
        Ok(())
    }

    /// Retry policy for the given backend, combining the per-backend attempt
    /// and timeout knobs with the shared backoff settings.
    pub fn retry_policy(&self, backend: Backend) -> RetryPolicy {
        let (max_attempts, timeout_secs) = match backend {
            Backend::RemoteRelay => (self.relay.max_attempts, self.relay.timeout_secs),
            Backend::VendorDirect => (self.vendor.max_attempts, self.vendor.timeout_secs),
        };
        RetryPolicy {
            max_attempts,
            attempt_timeout: std::time::Duration::from_secs(timeout_secs),
            backoff_base: std::time::Duration::from_millis(self.retry.backoff_base_ms),
            backoff_cap: std::time::Duration::from_millis(self.retry.backoff_cap_ms),
        }
    }
}

/// Retrieves the path to the dicto configuration file, creating the config
/// directory if needed.
///
/// # Errors
/// - If the home directory cannot be determined
pub fn get_config_path() -> anyhow::Result<PathBuf> {
    let config_dir = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?
        .join(".config")
        .join("dicto");

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create config directory: {e}"))?;

    Ok(config_dir.join("dicto.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: DictoConfig = toml::from_str("").unwrap();
        assert_eq!(config.backend, None);
        assert_eq!(config.relay.max_attempts, 3);
        assert_eq!(config.relay.timeout_secs, 60);
        assert!(config.relay.health_check);
        assert_eq!(config.vendor.max_attempts, 2);
        assert_eq!(config.vendor.timeout_secs, 600);
        assert_eq!(config.vendor.language, "fr");
        assert!(config.speakers.is_empty());
    }

    #[test]
    fn test_partial_toml_overrides_only_named_fields() {
        let config: DictoConfig = toml::from_str(
            r#"
backend = "relay"
speakers = ["Alice", "Bob"]

[relay]
url = "https://scribe.internal/api/whisper"
model_tier = "medium"
max_attempts = 2
"#,
        )
        .unwrap();
        assert_eq!(config.backend, Some(Backend::RemoteRelay));
        assert_eq!(config.relay.url, "https://scribe.internal/api/whisper");
        assert_eq!(config.relay.model_tier, RelayModelTier::Medium);
        assert_eq!(config.relay.max_attempts, 2);
        assert_eq!(config.relay.timeout_secs, 60);
        assert_eq!(config.speakers, vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_retry_policy_follows_backend() {
        let config = DictoConfig::default();
        let relay = config.retry_policy(Backend::RemoteRelay);
        let vendor = config.retry_policy(Backend::VendorDirect);
        assert_eq!(relay.max_attempts, 3);
        assert_eq!(relay.attempt_timeout.as_secs(), 60);
        assert_eq!(vendor.max_attempts, 2);
        assert_eq!(vendor.attempt_timeout.as_secs(), 600);
        assert_eq!(relay.backoff_base, vendor.backoff_base);
    }

    #[test]
    fn test_config_roundtrips_through_toml() {
        let mut config = DictoConfig::default();
        config.backend = Some(Backend::VendorDirect);
        config.speakers = vec!["Claire".to_string()];
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: DictoConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.backend, Some(Backend::VendorDirect));
        assert_eq!(parsed.speakers, vec!["Claire"]);
    }
}
