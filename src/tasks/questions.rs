//! Question Generation
//!
//! Quiz generation at three granularities: the big initial batch for a
//! lesson, a short per-page quiz, and incremental "more questions" rounds
//! that avoid repeating existing prompts.
//!
//! The initial batch is the most failure-prone task in the system (50
//! structured objects in one response), so it retries the entire round trip
//! — prompt, call, recovery — a fixed number of times rather than only the
//! HTTP request.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, warn};

use super::TaskEngine;
use crate::ai::prompt;
use crate::ai::recovery::recover;
use crate::constants::retry as retry_constants;
use crate::types::{ContentBlock, PageText, Result, accept_blocks};

impl TaskEngine {
    /// Generate the initial question batch for a lesson.
    ///
    /// Retries the whole round trip up to
    /// [`retry_constants::GENERATION_ROUND_TRIPS`] times; `Ok(None)` when
    /// every round failed.
    pub async fn generate_initial_questions(
        &self,
        lesson_text: &str,
    ) -> Result<Option<Vec<ContentBlock>>> {
        let model = self.model()?;
        let request = prompt::initial_questions(lesson_text);

        for attempt in 1..=retry_constants::GENERATION_ROUND_TRIPS {
            match model.generate(&request).await {
                Ok(raw) => match parse_blocks(&raw) {
                    Some(blocks) => return Ok(Some(blocks)),
                    None => warn!(attempt, "question batch not recoverable, retrying round trip"),
                },
                Err(err) => error!(attempt, "question batch call failed: {}", err),
            }

            if attempt < retry_constants::GENERATION_ROUND_TRIPS {
                sleep(Duration::from_millis(
                    retry_constants::GENERATION_ROUND_TRIP_DELAY_MS * attempt as u64,
                ))
                .await;
            }
        }

        error!("generating initial questions failed after all round trips");
        Ok(None)
    }

    /// Generate a short quiz for a single page
    pub async fn generate_questions_for_page(
        &self,
        page: &PageText,
    ) -> Result<Option<Vec<ContentBlock>>> {
        let model = self.model()?;
        let request = prompt::page_questions(&page.text);

        let raw = match self.generate_with(&model, &request).await {
            Ok(raw) => raw,
            Err(err) => {
                error!(page = page.page_number, "page quiz failed after retries: {}", err);
                return Ok(None);
            }
        };

        Ok(parse_blocks(&raw))
    }

    /// Generate additional questions, avoiding the prompts already asked
    pub async fn generate_more_questions(
        &self,
        lesson_text: &str,
        existing: &[ContentBlock],
    ) -> Result<Option<Vec<ContentBlock>>> {
        let model = self.model()?;

        let existing_prompts: Vec<String> = existing
            .iter()
            .filter_map(ContentBlock::prompt_text)
            .collect();
        let request = prompt::more_questions(lesson_text, &existing_prompts);

        let raw = match self.generate_with(&model, &request).await {
            Ok(raw) => raw,
            Err(err) => {
                error!("more-questions generation failed after retries: {}", err);
                return Ok(None);
            }
        };

        Ok(parse_blocks(&raw))
    }
}

/// Recover a block array from raw model text and accept it (fresh ids,
/// invariant filtering). `None` when recovery or deserialization fails.
fn parse_blocks(raw: &str) -> Option<Vec<ContentBlock>> {
    let value = recover(raw).ok()?;
    let blocks: Vec<ContentBlock> = serde_json::from_value(value).ok()?;
    Some(accept_blocks(blocks))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_blocks_accepts_and_stamps_ids() {
        let raw = r#"```json
[
  { "type": "true_false_question", "question": "The sky is green.", "correctAnswer": false },
  { "type": "fill_in_the_blank_question", "questionParts": ["A ", " B"], "correctAnswers": ["x"] }
]
```"#;

        let blocks = parse_blocks(raw).unwrap();
        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| !b.id().is_empty()));
    }

    #[test]
    fn test_parse_blocks_drops_bad_arity() {
        let raw = r#"[
  { "type": "fill_in_the_blank_question", "questionParts": ["only one part"], "correctAnswers": ["x", "y"] }
]"#;
        let blocks = parse_blocks(raw).unwrap();
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_parse_blocks_fails_on_prose() {
        assert!(parse_blocks("Sorry, I cannot help with that.").is_none());
    }

    #[test]
    fn test_parse_blocks_fails_on_wrong_shape() {
        // an object where an array of blocks is expected
        assert!(parse_blocks(r#"{"question": "?"}"#).is_none());
    }
}
