//! Lesson Generation & Explanations
//!
//! Turns page ranges into interactive lessons and produces prose
//! explanations and summaries of document text.

use tracing::error;

use super::TaskEngine;
use crate::ai::prompt;
use crate::ai::recovery::recover;
use crate::types::{InteractiveLesson, PageText, Result, accept_blocks, generate_unique_id};

/// Shown when a page has no extractable text to explain
const EMPTY_PAGE_NOTICE: &str = "This page appears to be empty or contains only images.";

impl TaskEngine {
    /// Generate a full interactive lesson from the given pages.
    ///
    /// `Ok(None)` when the model could not produce a usable lesson after
    /// retries. Accepted blocks get fresh local identifiers.
    pub async fn generate_interactive_lesson(
        &self,
        lesson_pages: &[PageText],
    ) -> Result<Option<InteractiveLesson>> {
        let model = self.model()?;
        let request = prompt::interactive_lesson(lesson_pages);

        let raw = match self.generate_with(&model, &request).await {
            Ok(raw) => raw,
            Err(err) => {
                error!("interactive lesson generation failed after retries: {}", err);
                return Ok(None);
            }
        };

        let Some(mut lesson) = recover(&raw)
            .ok()
            .and_then(|value| serde_json::from_value::<InteractiveLesson>(value).ok())
        else {
            return Ok(None);
        };

        lesson.id = generate_unique_id();
        lesson.content = accept_blocks(lesson.content);

        Ok(Some(lesson))
    }

    /// Summarize a chapter to roughly a quarter of its length, optionally in
    /// a caller-provided style. Empty input summarizes to an empty string.
    pub async fn summarize_chapter(
        &self,
        chapter_text: &str,
        style: Option<&str>,
    ) -> Result<String> {
        if chapter_text.trim().is_empty() {
            return Ok(String::new());
        }

        let model = self.model()?;
        let request = prompt::summarize_chapter(chapter_text, style);
        let raw = self.generate_with(&model, &request).await?;
        Ok(raw.trim().to_string())
    }

    /// Explain one page of the document in detail
    pub async fn explain_page(&self, page_text: &str) -> Result<String> {
        if page_text.trim().is_empty() {
            return Ok(EMPTY_PAGE_NOTICE.to_string());
        }

        let model = self.model()?;
        let request = prompt::explain_page(page_text);
        let raw = self.generate_with(&model, &request).await?;
        Ok(raw.trim().to_string())
    }

    /// Re-explain a concept more simply for a student who did not get it
    /// the first time
    pub async fn deeper_explanation(&self, text: &str) -> Result<String> {
        let model = self.model()?;
        let request = prompt::deeper_explanation(text);
        let raw = self.generate_with(&model, &request).await?;
        Ok(raw.trim().to_string())
    }
}
