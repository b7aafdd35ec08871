//! Proofreading
//!
//! Spelling and grammar correction, never translation. The single-page
//! variant degrades to the original text on any failure so the reading flow
//! is never blocked. The full-book variant keeps the page separators intact
//! and re-splits the corrected text back onto the original pages, keeping a
//! page's original text whenever its marker went missing in the response.

use regex::Regex;
use tracing::error;

use super::TaskEngine;
use crate::ai::prompt;
use crate::types::{PageText, Result};

impl TaskEngine {
    /// Proofread one page of text. Falls back to the input text on any
    /// failure after retries (a missing credential still surfaces).
    pub async fn proofread_page(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let model = self.model()?;
        let request = prompt::proofread_page(text);

        match self.generate_with(&model, &request).await {
            Ok(corrected) => {
                let trimmed = corrected.trim();
                if trimmed.is_empty() {
                    Ok(text.to_string())
                } else {
                    Ok(trimmed.to_string())
                }
            }
            Err(err) => {
                error!("proofreading failed after retries: {}", err);
                Ok(text.to_string())
            }
        }
    }

    /// Proofread the whole book in one request. `Ok(None)` when the model
    /// produced nothing usable after retries.
    pub async fn proofread_book(&self, pages: &[PageText]) -> Result<Option<Vec<PageText>>> {
        if pages.is_empty() {
            return Ok(Some(Vec::new()));
        }

        let model = self.model()?;
        let request = prompt::proofread_book(pages);

        let corrected = match self.generate_with(&model, &request).await {
            Ok(corrected) => corrected,
            Err(err) => {
                error!("book proofreading failed after retries: {}", err);
                return Ok(None);
            }
        };

        if corrected.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(merge_corrected_pages(pages, &corrected)))
    }
}

/// Re-split corrected text onto the original pages by their `--- PAGE N ---`
/// markers. Pages whose marker or body is missing keep their original text.
pub(crate) fn merge_corrected_pages(pages: &[PageText], corrected: &str) -> Vec<PageText> {
    pages
        .iter()
        .map(|page| {
            let text = extract_page(corrected, page.page_number)
                .unwrap_or_else(|| page.text.clone());
            PageText::new(page.page_number, text)
        })
        .collect()
}

fn extract_page(corrected: &str, page_number: u32) -> Option<String> {
    let pattern = format!(
        r"--- PAGE {} ---\n([\s\S]*?)(?:--- PAGE|\z)",
        page_number
    );
    let re = Regex::new(&pattern).ok()?;
    let captured = re.captures(corrected)?.get(1)?.as_str().trim();
    if captured.is_empty() {
        None
    } else {
        Some(captured.to_string())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pages() -> Vec<PageText> {
        vec![
            PageText::new(1, "first pge"),
            PageText::new(2, "secnd page"),
            PageText::new(3, "third page"),
        ]
    }

    #[test]
    fn test_merge_replaces_corrected_pages() {
        let corrected = "--- PAGE 1 ---\nfirst page\n\n--- PAGE 2 ---\nsecond page\n\n--- PAGE 3 ---\nthird page";
        let merged = merge_corrected_pages(&pages(), corrected);

        assert_eq!(merged[0].text, "first page");
        assert_eq!(merged[1].text, "second page");
        assert_eq!(merged[2].text, "third page");
    }

    #[test]
    fn test_merge_keeps_original_when_marker_missing() {
        // the model dropped page 2's separator
        let corrected = "--- PAGE 1 ---\nfirst page\n\n--- PAGE 3 ---\nthird page";
        let merged = merge_corrected_pages(&pages(), corrected);

        assert_eq!(merged[0].text, "first page");
        assert_eq!(merged[1].text, "secnd page");
        assert_eq!(merged[2].text, "third page");
    }

    #[test]
    fn test_merge_keeps_original_when_body_empty() {
        let corrected = "--- PAGE 1 ---\n\n--- PAGE 2 ---\nsecond page";
        let merged = merge_corrected_pages(&pages(), corrected);
        assert_eq!(merged[0].text, "first pge");
        assert_eq!(merged[1].text, "second page");
    }

    #[test]
    fn test_merge_preserves_page_numbers() {
        let merged = merge_corrected_pages(&pages(), "unrelated response");
        assert_eq!(
            merged.iter().map(|p| p.page_number).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(merged[0].text, "first pge");
    }
}
