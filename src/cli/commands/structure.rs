//! Document structure detection command

use std::path::Path;

use crate::cli::ui::Output;
use crate::cli::util::{build_engine, load_pages, print_json};
use crate::types::Result;

pub async fn run(input: &Path) -> Result<()> {
    let output = Output::new();
    let engine = build_engine()?;
    let pages = load_pages(input)?;

    output.info(&format!("analyzing structure of {} pages", pages.len()));
    let chapters = engine.analyze_document_structure(&pages).await?;

    print_json(&chapters)
}
