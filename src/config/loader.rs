//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. User config (~/.config/studyweave/config.toml)
//! 3. Environment variables (STUDYWEAVE_* prefix, `__` as the section
//!    separator so keys with underscores stay addressable)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::{debug, info};

use super::types::Config;
use crate::types::{Result, StudyError};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → user config file → env vars
    pub fn load() -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(path) = Self::config_path()
            && path.exists()
        {
            debug!("Loading config from: {}", path.display());
            figment = figment.merge(Toml::file(&path));
        }

        // e.g. STUDYWEAVE_MODEL__API_KEY -> model.api_key
        figment = figment.merge(Env::prefixed("STUDYWEAVE_").split("__").lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| StudyError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| StudyError::Config(format!("Configuration error: {}", e)))
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Per-user config directory (~/.config/studyweave on Linux)
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "studyweave").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Path to the user config file
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Path to the stored user credential
    pub fn credential_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("credential"))
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Write a commented default config file if none exists
    pub fn init(force: bool) -> Result<PathBuf> {
        let dir = Self::config_dir()
            .ok_or_else(|| StudyError::Config("Cannot determine config directory".to_string()))?;

        fs::create_dir_all(&dir)?;

        let path = dir.join("config.toml");
        if !path.exists() || force {
            fs::write(&path, Self::default_config_file())?;
            info!("Created config: {}", path.display());
        } else {
            info!("Config exists: {}", path.display());
        }

        Ok(path)
    }

    /// Generate default config content (TOML)
    fn default_config_file() -> String {
        r#"# studyweave Configuration
# Environment variables with the STUDYWEAVE_ prefix override these values,
# e.g. STUDYWEAVE_MODEL__MODEL=gemini-2.5-pro

version = "1.0"

[model]
model = "gemini-2.5-flash"
api_base = "https://generativelanguage.googleapis.com/v1beta"
timeout_secs = 300

[tasks]
# Language used for feedback explanations and corrections.
feedback_language = "Arabic"
"#
        .to_string()
    }
}
