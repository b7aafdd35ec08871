//! Answer evaluation command

use std::fs;
use std::path::Path;

use crate::cli::ui::Output;
use crate::cli::util::{build_engine, print_json};
use crate::types::{ContentBlock, Result, UserAnswer};

/// Evaluate answers (JSON file of `UserAnswer`s) against their questions
/// (JSON file of content blocks, as produced by `quiz`).
pub async fn run(questions_path: &Path, answers_path: &Path) -> Result<()> {
    let output = Output::new();
    let engine = build_engine()?;

    let questions: Vec<ContentBlock> = serde_json::from_str(&fs::read_to_string(questions_path)?)?;
    let answers: Vec<UserAnswer> = serde_json::from_str(&fs::read_to_string(answers_path)?)?;

    match engine.evaluate_answers(&answers, &questions).await? {
        Some(feedback) => {
            let correct = feedback.iter().filter(|f| f.is_correct).count();
            output.info(&format!("{}/{} answers correct", correct, feedback.len()));
            print_json(&feedback)
        }
        None => {
            output.error("the model did not produce usable feedback; try again");
            Ok(())
        }
    }
}
