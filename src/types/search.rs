//! Search Types
//!
//! Results of the web-search task, the in-document smart search, and the
//! library categorization task.

use serde::{Deserialize, Serialize};

/// Which sources the external-materials search should favor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchFilter {
    #[default]
    All,
    /// Video platforms only
    Video,
    /// Educational sites, excluding video platforms
    Sites,
}

impl std::fmt::Display for SearchFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Video => write!(f, "video"),
            Self::Sites => write!(f, "sites"),
        }
    }
}

impl std::str::FromStr for SearchFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "video" => Ok(Self::Video),
            "sites" => Ok(Self::Sites),
            _ => Err(format!(
                "Unknown search filter: {}. Valid values: all, video, sites",
                s
            )),
        }
    }
}

/// One external study resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSource {
    pub uri: String,
    pub title: String,
}

/// Result of the external-materials search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub sources: Vec<SearchSource>,
}

/// Result of the in-document smart search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmartSearchResult {
    /// Answer formulated from the document context
    pub answer: String,
    /// Exact supporting quote from the context, untranslated
    pub quote: String,
    /// Page citation rendered as "p. X" / "pp. X-Y", or "N/A"
    pub pages: String,
    /// Suggested follow-up questions
    pub follow_ups: Vec<String>,
}

/// A sub-category with the book titles filed under it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSubCategory {
    #[serde(rename = "subCategory")]
    pub sub_category: String,
    pub books: Vec<String>,
}

/// A main library category with its sub-categories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookCategory {
    pub category: String,
    #[serde(rename = "subCategories")]
    pub sub_categories: Vec<BookSubCategory>,
}

/// A saved book title with its stable identifier, as input to categorization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookTitle {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_search_filter_round_trip() {
        for filter in [SearchFilter::All, SearchFilter::Video, SearchFilter::Sites] {
            assert_eq!(SearchFilter::from_str(&filter.to_string()).unwrap(), filter);
        }
        assert!(SearchFilter::from_str("podcasts").is_err());
    }

    #[test]
    fn test_smart_search_wire_shape() {
        let result: SmartSearchResult = serde_json::from_str(
            r#"{"answer": "42", "quote": "it is 42", "pages": "p. 7", "follow_ups": ["why?"]}"#,
        )
        .unwrap();
        assert_eq!(result.pages, "p. 7");
        assert_eq!(result.follow_ups.len(), 1);
    }
}
