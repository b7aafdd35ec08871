//! Configuration command

use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::types::{Result, StudyError};

/// Show the current effective configuration
pub fn show(as_json: bool) -> Result<()> {
    let config = ConfigLoader::load()?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        println!(
            "{}",
            toml::to_string_pretty(&config).map_err(|e| StudyError::Config(e.to_string()))?
        );
    }

    Ok(())
}

/// Show configuration file paths
pub fn path() -> Result<()> {
    println!("Configuration paths:");
    println!();

    if let Some(config) = ConfigLoader::config_path() {
        let exists = if config.exists() { "✓" } else { "✗" };
        println!("  Config:     {} {}", exists, config.display());
    } else {
        println!("  Config:     (not available)");
    }

    if let Some(credential) = ConfigLoader::credential_path() {
        let exists = if credential.exists() { "✓" } else { "✗" };
        println!("  Credential: {} {}", exists, credential.display());
    }

    Ok(())
}

/// Write a default config file
pub fn init(force: bool) -> Result<()> {
    let output = Output::new();
    let path = ConfigLoader::init(force)?;
    output.success(&format!("config ready at {}", path.display()));
    Ok(())
}
