//! Proofreading command

use std::path::Path;

use crate::cli::ui::Output;
use crate::cli::util::{build_engine, load_pages, load_text, print_json};
use crate::types::Result;

/// Proofread a file. With `book`, the input's pages are corrected in one
/// request and re-split; otherwise the text is treated as a single page.
pub async fn run(input: &Path, book: bool) -> Result<()> {
    let output = Output::new();
    let engine = build_engine()?;

    if book {
        let pages = load_pages(input)?;
        match engine.proofread_book(&pages).await? {
            Some(corrected) => print_json(&corrected),
            None => {
                output.error("the model did not return a usable correction; try again");
                Ok(())
            }
        }
    } else {
        let text = load_text(input)?;
        let corrected = engine.proofread_page(&text).await?;
        println!("{}", corrected);
        Ok(())
    }
}
