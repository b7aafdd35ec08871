//! Configuration Types
//!
//! All configuration structures with sensible defaults.

use serde::{Deserialize, Serialize};

use crate::ai::provider::gemini::{DEFAULT_API_BASE, DEFAULT_MODEL};
use crate::constants::network;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Model client settings
    pub model: ModelConfig,

    /// Task behavior settings
    pub tasks: TaskSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            model: ModelConfig::default(),
            tasks: TaskSettings::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `StudyError::Config` on validation failure.
    pub fn validate(&self) -> crate::types::Result<()> {
        if let Some(temperature) = self.model.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(crate::types::StudyError::Config(format!(
                "model temperature must be between 0.0 and 2.0, got {}",
                temperature
            )));
        }

        if self.model.timeout_secs == 0 {
            return Err(crate::types::StudyError::Config(
                "model timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.model.model.trim().is_empty() {
            return Err(crate::types::StudyError::Config(
                "model name must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Model Configuration
// =============================================================================

/// Settings for the generative model client
///
/// Note: the API key is handled securely - it is never serialized to output
/// and is redacted in debug output.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model name
    pub model: String,
    /// API base URL
    pub api_base: String,
    /// Operator-supplied API key (deploy-time). Takes precedence over the
    /// user-entered key in the credential store. Never serialized to output.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Sampling temperature; the provider's default when unset
    pub temperature: Option<f32>,
}

impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            temperature: None,
        }
    }
}

// =============================================================================
// Task Settings
// =============================================================================

/// Behavior knobs for the generation tasks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskSettings {
    /// Language for feedback explanations and corrections. Quoted questions
    /// and answers keep their original language regardless.
    pub feedback_language: String,
}

impl Default for TaskSettings {
    fn default() -> Self {
        Self {
            feedback_language: "Arabic".to_string(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
