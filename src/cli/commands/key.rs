//! Credential management command

use crate::ai::keys::{FileCredentialStore, KeyManager, KeySource};
use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::types::Result;

fn manager() -> Result<KeyManager> {
    let config = ConfigLoader::load()?;
    Ok(KeyManager::new(
        config.model,
        Box::new(FileCredentialStore::open_default()?),
    ))
}

/// Store a user-entered API key
pub fn set(value: &str) -> Result<()> {
    let output = Output::new();
    let keys = manager()?;

    keys.set_user_credential(value)?;

    if keys.has_credential() {
        output.success("API key saved");
        if keys.credential_source() == Some(KeySource::Operator) {
            output.warning("an operator-supplied key is set and takes precedence");
        }
    } else {
        output.error("the key could not be used; it was not kept");
    }

    Ok(())
}

/// Show whether a credential is available and where it comes from
pub fn status() -> Result<()> {
    let output = Output::new();
    let keys = manager()?;

    match keys.credential_source() {
        Some(KeySource::Operator) => output.success("credential available (operator-supplied)"),
        Some(KeySource::User) => output.success("credential available (user-entered)"),
        None => output.warning(
            "no credential set. Use `studyweave key set <key>` or the GEMINI_API_KEY env var",
        ),
    }

    Ok(())
}

/// Remove the stored user credential
pub fn clear() -> Result<()> {
    let output = Output::new();
    manager()?.clear_user_credential()?;
    output.success("stored credential removed");
    Ok(())
}
