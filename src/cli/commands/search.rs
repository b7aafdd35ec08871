//! Study material search command

use crate::cli::ui::Output;
use crate::cli::util::{build_engine, print_json};
use crate::types::{Result, SearchFilter, StudyError};

pub async fn run(query: &str, filter: SearchFilter) -> Result<()> {
    let output = Output::new();
    let engine = build_engine()?;

    match engine.search_materials(query, filter).await {
        Ok(result) => {
            output.info(&format!("{} sources found", result.sources.len()));
            print_json(&result)
        }
        Err(StudyError::SafetyBlocked(_)) => {
            output.error(
                "your search was blocked by the provider's safety filters; \
                 try a different search term",
            );
            Ok(())
        }
        Err(err) => Err(err),
    }
}
