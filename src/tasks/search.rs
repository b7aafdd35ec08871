//! Search Tasks
//!
//! External study-material search over the provider's web-search tool, smart
//! search inside the document context, and library categorization.

use tracing::error;

use super::TaskEngine;
use crate::ai::prompt;
use crate::ai::recovery::recover;
use crate::types::{
    BookCategory, BookTitle, Result, SearchFilter, SearchResult, SearchSource, SmartSearchResult,
};

impl TaskEngine {
    /// Search the web for study materials about `query`.
    ///
    /// Unlike the structured-generation tasks this one propagates failures:
    /// a safety decline surfaces as `StudyError::SafetyBlocked` so the UI
    /// can suggest a different search term, and exhausted transport errors
    /// surface typed.
    pub async fn search_materials(
        &self,
        query: &str,
        filter: SearchFilter,
    ) -> Result<SearchResult> {
        let model = self.model()?;
        let request = prompt::search_materials(query, filter);
        let raw = self.generate_with(&model, &request).await?;
        Ok(parse_search_sources(&raw))
    }

    /// Answer a query from the document context only. `Ok(None)` when the
    /// model could not produce a usable structured answer after retries.
    pub async fn search_within_document(
        &self,
        context: &str,
        query: &str,
    ) -> Result<Option<SmartSearchResult>> {
        let model = self.model()?;
        let request = prompt::document_search(context, query);

        let raw = match self.generate_with(&model, &request).await {
            Ok(raw) => raw,
            Err(err) => {
                error!("in-document search failed after retries: {}", err);
                return Ok(None);
            }
        };

        Ok(recover(&raw)
            .ok()
            .and_then(|value| serde_json::from_value(value).ok()))
    }

    /// Categorize saved book titles into a two-level category tree.
    /// `Ok(None)` when the model could not produce a usable tree.
    pub async fn categorize_books(
        &self,
        titles: &[BookTitle],
    ) -> Result<Option<Vec<BookCategory>>> {
        let model = self.model()?;

        if titles.is_empty() {
            return Ok(Some(Vec::new()));
        }

        let request = prompt::categorize_books(titles);
        let raw = match self.generate_with(&model, &request).await {
            Ok(raw) => raw,
            Err(err) => {
                error!("book categorization failed after retries: {}", err);
                return Ok(None);
            }
        };

        Ok(recover(&raw)
            .ok()
            .and_then(|value| serde_json::from_value(value).ok()))
    }
}

/// Parse `url - title` lines out of the search response, dropping anything
/// that is not a well-formed entry.
pub(crate) fn parse_search_sources(text: &str) -> SearchResult {
    let sources = text
        .lines()
        .map(str::trim)
        .filter(|line| {
            line.contains(" - ") && (line.starts_with("http://") || line.starts_with("https://"))
        })
        .filter_map(|line| {
            let (uri, title) = line.split_once(" - ")?;
            let uri = uri.trim();
            let title = title.trim();
            if uri.is_empty() || title.is_empty() {
                return None;
            }
            Some(SearchSource {
                uri: uri.to_string(),
                title: title.to_string(),
            })
        })
        .collect();

    SearchResult { sources }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_well_formed_lines() {
        let text = "\
https://example.edu/physics - Full explanation of the physics course basics.
Here are some results I found:
https://www.youtube.com/watch?v=abc - Final exam review for organic chemistry.
not a link - missing scheme";

        let result = parse_search_sources(text);
        assert_eq!(result.sources.len(), 2);
        assert_eq!(result.sources[0].uri, "https://example.edu/physics");
        assert_eq!(
            result.sources[1].title,
            "Final exam review for organic chemistry."
        );
    }

    #[test]
    fn test_title_keeps_inner_separators() {
        let text = "https://a.example - part one - part two";
        let result = parse_search_sources(text);
        assert_eq!(result.sources[0].title, "part one - part two");
    }

    #[test]
    fn test_empty_response_yields_no_sources() {
        assert!(parse_search_sources("").sources.is_empty());
        assert!(parse_search_sources("no links at all").sources.is_empty());
    }

    #[test]
    fn test_line_without_title_is_dropped() {
        let result = parse_search_sources("https://a.example - ");
        assert!(result.sources.is_empty());
    }
}
