//! Document Structure Detection
//!
//! Detects high-level chapters across the document and splits individual
//! chapters into lessons. Chapter boundaries proposed by the model are
//! repaired locally: overlapping adjacent chapters are resolved by shrinking
//! the earlier one, and the final chapter is always extended to the last
//! page so the whole document stays covered.

use tracing::{error, warn};

use super::TaskEngine;
use crate::ai::prompt;
use crate::ai::recovery::recover;
use crate::types::{Chapter, Lesson, PageText, Result, generate_unique_id};

/// Title used when no structure could be detected
const FALLBACK_TITLE: &str = "Full document";

impl TaskEngine {
    /// Detect the document's chapter structure.
    ///
    /// Never fails for model reasons: recovery failures, empty results, and
    /// exhausted retries all fall back to a single chapter spanning the
    /// whole document. Only a missing credential surfaces as an error.
    pub async fn analyze_document_structure(&self, pages: &[PageText]) -> Result<Vec<Chapter>> {
        let total_pages = pages.len() as u32;
        let model = self.model()?;
        let request = prompt::document_structure(pages, total_pages);

        let raw = match self.generate_with(&model, &request).await {
            Ok(raw) => raw,
            Err(err) => {
                error!("structure detection failed after retries: {}", err);
                return Ok(vec![fallback_chapter(total_pages)]);
            }
        };

        let mut chapters: Vec<Chapter> = match recover(&raw) {
            Ok(value) => serde_json::from_value(value).unwrap_or_default(),
            Err(err) => {
                warn!("structure response not recoverable: {}", err);
                Vec::new()
            }
        };

        if chapters.is_empty() {
            return Ok(vec![fallback_chapter(total_pages)]);
        }

        normalize_chapter_bounds(&mut chapters, total_pages);

        for chapter in &mut chapters {
            chapter.id = generate_unique_id();
        }

        Ok(chapters
            .into_iter()
            .filter(|c| c.start_page > 0 && c.start_page <= total_pages && c.end_page >= c.start_page)
            .collect())
    }

    /// Split one chapter's text into teaching lessons.
    ///
    /// `Ok(None)` when the model call failed after retries; an unrecoverable
    /// response yields an empty lesson list (the chapter simply stays
    /// unsplit).
    pub async fn analyze_chapter_for_lessons(
        &self,
        chapter_text: &str,
        chapter: &Chapter,
    ) -> Result<Option<Vec<Lesson>>> {
        let model = self.model()?;
        let request = prompt::chapter_lessons(chapter_text, chapter);

        let raw = match self.generate_with(&model, &request).await {
            Ok(raw) => raw,
            Err(err) => {
                error!(
                    chapter = %chapter.title,
                    "lesson detection failed after retries: {}", err
                );
                return Ok(None);
            }
        };

        let mut lessons: Vec<Lesson> = recover(&raw)
            .ok()
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default();

        for lesson in &mut lessons {
            lesson.id = generate_unique_id();
        }

        Ok(Some(lessons))
    }
}

/// Resolve overlaps between adjacent chapters by clamping the earlier one to
/// end just before its successor, then force the last chapter to the final
/// page. A single adjacent-pair scan, on purpose: no re-validation pass.
pub(crate) fn normalize_chapter_bounds(chapters: &mut [Chapter], total_pages: u32) {
    for i in 0..chapters.len().saturating_sub(1) {
        if chapters[i].end_page >= chapters[i + 1].start_page {
            chapters[i].end_page = chapters[i + 1].start_page.saturating_sub(1);
        }
    }
    if let Some(last) = chapters.last_mut() {
        last.end_page = total_pages;
    }
}

fn fallback_chapter(total_pages: u32) -> Chapter {
    Chapter {
        id: generate_unique_id(),
        title: FALLBACK_TITLE.to_string(),
        start_page: 1,
        end_page: total_pages,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter(title: &str, start: u32, end: u32) -> Chapter {
        Chapter {
            id: String::new(),
            title: title.to_string(),
            start_page: start,
            end_page: end,
        }
    }

    #[test]
    fn test_overlap_resolved_by_shrinking_earlier() {
        let mut chapters = vec![chapter("a", 1, 10), chapter("b", 8, 20)];
        normalize_chapter_bounds(&mut chapters, 20);

        assert_eq!(chapters[0].end_page, 7);
        assert_eq!(chapters[1].start_page, 8);
        assert_eq!(chapters[1].end_page, 20);
    }

    #[test]
    fn test_last_end_forced_to_total_pages() {
        let mut short = vec![chapter("a", 1, 5), chapter("b", 6, 12)];
        normalize_chapter_bounds(&mut short, 30);
        assert_eq!(short[1].end_page, 30);

        let mut long = vec![chapter("a", 1, 99)];
        normalize_chapter_bounds(&mut long, 30);
        assert_eq!(long[0].end_page, 30);
    }

    #[test]
    fn test_touching_bounds_are_separated() {
        // end == next start counts as overlap too
        let mut chapters = vec![chapter("a", 1, 8), chapter("b", 8, 16)];
        normalize_chapter_bounds(&mut chapters, 16);
        assert_eq!(chapters[0].end_page, 7);
    }

    #[test]
    fn test_empty_and_single_lists_are_safe() {
        let mut empty: Vec<Chapter> = Vec::new();
        normalize_chapter_bounds(&mut empty, 10);
        assert!(empty.is_empty());

        let mut single = vec![chapter("only", 1, 3)];
        normalize_chapter_bounds(&mut single, 10);
        assert_eq!(single[0].end_page, 10);
    }

    #[test]
    fn test_fallback_chapter_covers_document() {
        let fallback = fallback_chapter(42);
        assert_eq!(fallback.start_page, 1);
        assert_eq!(fallback.end_page, 42);
        assert!(!fallback.id.is_empty());
    }
}
