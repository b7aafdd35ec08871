//! Interactive lesson generation command

use std::path::Path;

use crate::cli::ui::Output;
use crate::cli::util::{build_engine, load_pages, print_json};
use crate::types::Result;

pub async fn run(input: &Path, start: Option<u32>, end: Option<u32>) -> Result<()> {
    let output = Output::new();
    let engine = build_engine()?;

    let mut pages = load_pages(input)?;
    if let (Some(start), Some(end)) = (start, end) {
        pages.retain(|p| p.page_number >= start && p.page_number <= end);
    }

    if pages.is_empty() {
        output.warning("no pages in the selected range");
        return Ok(());
    }

    output.info(&format!("generating lesson from {} pages", pages.len()));
    match engine.generate_interactive_lesson(&pages).await? {
        Some(lesson) => print_json(&lesson),
        None => {
            output.error("the model did not produce a usable lesson; try again");
            Ok(())
        }
    }
}
