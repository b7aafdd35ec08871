//! Content Blocks
//!
//! The closed set of lesson/question units produced by the generation tasks.
//! The set of kinds is fixed by the prompt schemas; adding a kind means adding
//! a prompt builder and a renderer as well, so an open/dynamic representation
//! buys nothing here.
//!
//! Identifiers are assigned locally when blocks are accepted into application
//! state. The model never supplies them (and is not trusted when it tries).

use chrono::Utc;
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Length of the random suffix in generated identifiers
const ID_SUFFIX_LEN: usize = 7;

/// Generate a session-unique identifier: millisecond timestamp plus a short
/// random alphanumeric suffix. Collision-free enough for per-session block
/// identity; no global counter required.
pub fn generate_unique_id() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ID_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("{}-{}", Utc::now().timestamp_millis(), suffix.to_lowercase())
}

// =============================================================================
// Content Block
// =============================================================================

/// One tagged unit of lesson material or one question.
///
/// Wire field names (`correctAnswerIndex`, `questionParts`, ...) match the
/// output schemas the prompt builders dictate to the model. The `id` field is
/// defaulted on deserialization and overwritten at acceptance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Free-text explanation
    Explanation {
        #[serde(default)]
        id: String,
        text: String,
    },
    /// LaTeX formula
    MathFormula {
        #[serde(default)]
        id: String,
        latex: String,
    },
    /// Prompt with ordered options and the index of the correct one
    MultipleChoiceQuestion {
        #[serde(default)]
        id: String,
        question: String,
        options: Vec<String>,
        #[serde(rename = "correctAnswerIndex")]
        correct_answer_index: usize,
    },
    TrueFalseQuestion {
        #[serde(default)]
        id: String,
        question: String,
        #[serde(rename = "correctAnswer")]
        correct_answer: bool,
    },
    /// Ordered text segments with one blank between each adjacent pair, so
    /// there is always exactly one more segment than expected answers.
    FillInTheBlankQuestion {
        #[serde(default)]
        id: String,
        #[serde(rename = "questionParts")]
        question_parts: Vec<String>,
        #[serde(rename = "correctAnswers")]
        correct_answers: Vec<String>,
    },
    /// Prompt only; no canonical answer
    OpenEndedQuestion {
        #[serde(default)]
        id: String,
        question: String,
    },
}

impl ContentBlock {
    pub fn id(&self) -> &str {
        match self {
            Self::Explanation { id, .. }
            | Self::MathFormula { id, .. }
            | Self::MultipleChoiceQuestion { id, .. }
            | Self::TrueFalseQuestion { id, .. }
            | Self::FillInTheBlankQuestion { id, .. }
            | Self::OpenEndedQuestion { id, .. } => id,
        }
    }

    fn set_id(&mut self, new_id: String) {
        match self {
            Self::Explanation { id, .. }
            | Self::MathFormula { id, .. }
            | Self::MultipleChoiceQuestion { id, .. }
            | Self::TrueFalseQuestion { id, .. }
            | Self::FillInTheBlankQuestion { id, .. }
            | Self::OpenEndedQuestion { id, .. } => *id = new_id,
        }
    }

    pub fn is_question(&self) -> bool {
        !matches!(self, Self::Explanation { .. } | Self::MathFormula { .. })
    }

    /// The question prompt as display text, for "avoid repeating these"
    /// listings. Content blocks that are not questions yield `None`.
    pub fn prompt_text(&self) -> Option<String> {
        match self {
            Self::MultipleChoiceQuestion { question, .. }
            | Self::TrueFalseQuestion { question, .. }
            | Self::OpenEndedQuestion { question, .. } => Some(question.clone()),
            Self::FillInTheBlankQuestion { question_parts, .. } => {
                Some(question_parts.join(" ___ "))
            }
            Self::Explanation { .. } | Self::MathFormula { .. } => None,
        }
    }

    /// Structural acceptance check. Fill-in-the-blank blocks must carry one
    /// fewer expected answer than text segments.
    fn is_well_formed(&self) -> bool {
        match self {
            Self::FillInTheBlankQuestion {
                question_parts,
                correct_answers,
                ..
            } => {
                question_parts.len() >= 2
                    && correct_answers.len() == question_parts.len() - 1
            }
            _ => true,
        }
    }
}

/// Accept model-produced blocks into application state: drop structurally
/// invalid blocks and stamp every survivor with a fresh local identifier.
pub fn accept_blocks(blocks: Vec<ContentBlock>) -> Vec<ContentBlock> {
    blocks
        .into_iter()
        .filter(|block| {
            let ok = block.is_well_formed();
            if !ok {
                warn!("dropping malformed content block: {:?}", block);
            }
            ok
        })
        .map(|mut block| {
            block.set_id(generate_unique_id());
            block
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_blank(parts: &[&str], answers: &[&str]) -> ContentBlock {
        ContentBlock::FillInTheBlankQuestion {
            id: String::new(),
            question_parts: parts.iter().map(|s| s.to_string()).collect(),
            correct_answers: answers.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_unique_ids_do_not_collide() {
        let ids: Vec<String> = (0..1000).map(|_| generate_unique_id()).collect();
        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(ids.len(), unique.len());
    }

    #[test]
    fn test_accept_assigns_fresh_ids() {
        let blocks = vec![
            ContentBlock::OpenEndedQuestion {
                id: "model-supplied".to_string(),
                question: "Why?".to_string(),
            },
            ContentBlock::Explanation {
                id: String::new(),
                text: "Because.".to_string(),
            },
        ];

        let accepted = accept_blocks(blocks);
        assert_eq!(accepted.len(), 2);
        assert_ne!(accepted[0].id(), "model-supplied");
        assert!(!accepted[0].id().is_empty());
        assert!(!accepted[1].id().is_empty());
        assert_ne!(accepted[0].id(), accepted[1].id());
    }

    #[test]
    fn test_accept_enforces_fill_blank_arity() {
        let good = fill_blank(&["The capital of France is ", "."], &["Paris"]);
        let too_many = fill_blank(&["A ", " B"], &["x", "y"]);
        let too_few = fill_blank(&["A ", " B ", " C"], &["x"]);

        let accepted = accept_blocks(vec![good, too_many, too_few]);
        assert_eq!(accepted.len(), 1);

        for block in &accepted {
            if let ContentBlock::FillInTheBlankQuestion {
                question_parts,
                correct_answers,
                ..
            } = block
            {
                assert_eq!(correct_answers.len(), question_parts.len() - 1);
            }
        }
    }

    #[test]
    fn test_wire_format_round_trip() {
        let json = r#"{
            "type": "multiple_choice_question",
            "question": "2 + 2 = ?",
            "options": ["3", "4", "5"],
            "correctAnswerIndex": 1
        }"#;

        let block: ContentBlock = serde_json::from_str(json).unwrap();
        match &block {
            ContentBlock::MultipleChoiceQuestion {
                id,
                question,
                options,
                correct_answer_index,
            } => {
                assert!(id.is_empty());
                assert_eq!(question, "2 + 2 = ?");
                assert_eq!(options.len(), 3);
                assert_eq!(*correct_answer_index, 1);
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_prompt_text() {
        let block = fill_blank(&["Water boils at ", " degrees."], &["100"]);
        assert_eq!(
            block.prompt_text().unwrap(),
            "Water boils at  ___  degrees."
        );

        let expl = ContentBlock::Explanation {
            id: String::new(),
            text: "t".to_string(),
        };
        assert!(expl.prompt_text().is_none());
        assert!(!expl.is_question());
    }
}
