//! Shared CLI helpers

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::ai::keys::{FileCredentialStore, KeyManager};
use crate::config::ConfigLoader;
use crate::tasks::TaskEngine;
use crate::types::{PageText, Result};

/// Load document pages from a file.
///
/// A `.json` file is expected to hold extracted pages
/// (`[{"pageNumber": 1, "text": "…"}]`, as produced by the extraction
/// step); any other file is treated as a single page of plain text.
pub fn load_pages(path: &Path) -> Result<Vec<PageText>> {
    let raw = fs::read_to_string(path)?;

    if path.extension().is_some_and(|ext| ext == "json") {
        Ok(serde_json::from_str(&raw)?)
    } else {
        Ok(vec![PageText::new(1, raw)])
    }
}

/// Load a file as one flat block of text
pub fn load_text(path: &Path) -> Result<String> {
    let pages = load_pages(path)?;
    Ok(pages
        .into_iter()
        .map(|p| p.text)
        .collect::<Vec<_>>()
        .join("\n\n"))
}

/// Build the task engine from merged configuration and the default
/// credential store
pub fn build_engine() -> Result<TaskEngine> {
    let config = ConfigLoader::load()?;
    let keys = KeyManager::new(
        config.model.clone(),
        Box::new(FileCredentialStore::open_default()?),
    );
    Ok(TaskEngine::new(Arc::new(keys), config.tasks.clone()))
}

/// Print a value as pretty JSON to stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
