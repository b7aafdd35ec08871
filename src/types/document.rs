//! Document Structure Types
//!
//! Pages as delivered by the external extraction step, and the chapter/lesson
//! boundaries detected on top of them. Page numbers are 1-based and
//! contiguous.

use serde::{Deserialize, Serialize};

use super::block::ContentBlock;

/// One page of extracted text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    #[serde(rename = "pageNumber")]
    pub page_number: u32,
    pub text: String,
}

impl PageText {
    pub fn new(page_number: u32, text: impl Into<String>) -> Self {
        Self {
            page_number,
            text: text.into(),
        }
    }
}

/// A top-level structural unit of the document (part or chapter), spanning an
/// inclusive page range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(rename = "startPage")]
    pub start_page: u32,
    #[serde(rename = "endPage")]
    pub end_page: u32,
}

/// A teaching unit within a chapter, spanning an inclusive page range inside
/// the chapter's own range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(rename = "startPage")]
    pub start_page: u32,
    #[serde(rename = "endPage")]
    pub end_page: u32,
}

/// A generated interactive lesson: a titled ordered sequence of content
/// blocks (explanations and formulas; questions are generated separately).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractiveLesson {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub content: Vec<ContentBlock>,
}

/// Concatenate pages into a single prompt payload with per-page separators.
/// The separator format is load-bearing: proofreading re-splits on it and the
/// in-document search task cites page numbers from it.
pub fn join_pages(pages: &[PageText]) -> String {
    pages
        .iter()
        .map(|p| format!("--- PAGE {} ---\n{}", p.page_number, p.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_pages_separators() {
        let pages = vec![PageText::new(1, "alpha"), PageText::new(2, "beta")];
        let joined = join_pages(&pages);
        assert_eq!(joined, "--- PAGE 1 ---\nalpha\n\n--- PAGE 2 ---\nbeta");
    }

    #[test]
    fn test_chapter_wire_names() {
        let chapter: Chapter =
            serde_json::from_str(r#"{"title": "Intro", "startPage": 1, "endPage": 9}"#).unwrap();
        assert_eq!(chapter.title, "Intro");
        assert_eq!(chapter.start_page, 1);
        assert_eq!(chapter.end_page, 9);
        assert!(chapter.id.is_empty());
    }
}
