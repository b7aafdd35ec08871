//! Question generation command

use std::path::Path;

use crate::cli::ui::Output;
use crate::cli::util::{build_engine, load_pages, load_text, print_json};
use crate::types::Result;

/// Generate the initial lesson quiz, or a short per-page quiz when `page`
/// is given.
pub async fn run(input: &Path, page: Option<u32>) -> Result<()> {
    let output = Output::new();
    let engine = build_engine()?;

    let questions = match page {
        Some(number) => {
            let pages = load_pages(input)?;
            let Some(page) = pages.iter().find(|p| p.page_number == number) else {
                output.error(&format!("page {} not found in input", number));
                return Ok(());
            };
            engine.generate_questions_for_page(page).await?
        }
        None => {
            let text = load_text(input)?;
            engine.generate_initial_questions(&text).await?
        }
    };

    match questions {
        Some(questions) => {
            output.info(&format!("{} questions generated", questions.len()));
            print_json(&questions)
        }
        None => {
            output.error("the model did not produce usable questions; try again");
            Ok(())
        }
    }
}
