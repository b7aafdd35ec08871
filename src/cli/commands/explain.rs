//! Page explanation command

use std::path::Path;

use crate::cli::ui::Output;
use crate::cli::util::{build_engine, load_pages, load_text};
use crate::types::Result;

/// Explain a page of the document, or re-explain a concept more simply with
/// `deeper`.
pub async fn run(input: &Path, page: Option<u32>, deeper: bool) -> Result<()> {
    let output = Output::new();
    let engine = build_engine()?;

    let text = match page {
        Some(number) => {
            let pages = load_pages(input)?;
            match pages.into_iter().find(|p| p.page_number == number) {
                Some(page) => page.text,
                None => {
                    output.error(&format!("page {} not found in input", number));
                    return Ok(());
                }
            }
        }
        None => load_text(input)?,
    };

    let explanation = if deeper {
        engine.deeper_explanation(&text).await?
    } else {
        engine.explain_page(&text).await?
    };

    println!("{}", explanation);
    Ok(())
}
