//! In-document smart search command

use std::path::Path;

use crate::cli::ui::Output;
use crate::cli::util::{build_engine, load_pages, print_json};
use crate::types::{Result, join_pages};

pub async fn run(input: &Path, query: &str) -> Result<()> {
    let output = Output::new();
    let engine = build_engine()?;

    let pages = load_pages(input)?;
    let context = join_pages(&pages);

    match engine.search_within_document(&context, query).await? {
        Some(result) => print_json(&result),
        None => {
            output.error("the model did not produce a usable answer; try again");
            Ok(())
        }
    }
}
