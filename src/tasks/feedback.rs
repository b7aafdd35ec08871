//! Answer Evaluation
//!
//! Renders submitted answers into display-text comparison pairs, sends them
//! to the model in one request, and joins the feedback back onto the
//! original pairs by question identifier. The model's echo of question or
//! answer text is never trusted.

use tracing::error;

use super::TaskEngine;
use crate::ai::prompt;
use crate::ai::recovery::recover;
use crate::types::{
    AiCorrection, AnswerValue, ContentBlock, FeedbackItem, IncorrectAnswer, QaPair, Result,
    UserAnswer,
};

/// Stand-in comparison text for open-ended questions, which have no
/// canonical answer
const OPEN_ENDED_RUBRIC: &str =
    "This is an open-ended question; judge whether the answer is reasonable and relevant \
     to the question.";

/// Rendered value when an answer's shape does not match its question
const UNANSWERED: &str = "N/A";

impl TaskEngine {
    /// Evaluate the user's answers against their questions.
    ///
    /// Answers without a matching question are skipped. `Ok(Some(vec![]))`
    /// when there was nothing to evaluate; `Ok(None)` when the model could
    /// not produce usable feedback after retries.
    pub async fn evaluate_answers(
        &self,
        user_answers: &[UserAnswer],
        all_questions: &[ContentBlock],
    ) -> Result<Option<Vec<FeedbackItem>>> {
        let model = self.model()?;

        let pairs = build_qa_pairs(user_answers, all_questions);
        if pairs.is_empty() {
            return Ok(Some(Vec::new()));
        }

        let request = prompt::evaluate_answers(&pairs, &self.settings().feedback_language);
        let raw = match self.generate_with(&model, &request).await {
            Ok(raw) => raw,
            Err(err) => {
                error!("answer evaluation failed after retries: {}", err);
                return Ok(None);
            }
        };

        let Some(feedback) = recover(&raw)
            .ok()
            .and_then(|value| serde_json::from_value::<Vec<FeedbackItem>>(value).ok())
        else {
            return Ok(None);
        };

        // Re-attach display text from the original pairs by id join.
        let joined = feedback
            .into_iter()
            .map(|mut item| {
                if let Some(pair) = pairs.iter().find(|p| p.question_id == item.question_id) {
                    item.question = Some(pair.question.clone());
                    item.user_answer = Some(pair.user_answer.clone());
                }
                item
            })
            .collect();

        Ok(Some(joined))
    }

    /// Produce detailed corrections for answers already known to be wrong.
    /// `Ok(None)` when the model could not produce usable corrections.
    pub async fn get_corrections(
        &self,
        incorrect: &[IncorrectAnswer],
    ) -> Result<Option<Vec<AiCorrection>>> {
        let model = self.model()?;

        if incorrect.is_empty() {
            return Ok(Some(Vec::new()));
        }

        let request = prompt::corrections(incorrect, &self.settings().feedback_language);
        let raw = match self.generate_with(&model, &request).await {
            Ok(raw) => raw,
            Err(err) => {
                error!("corrections request failed after retries: {}", err);
                return Ok(None);
            }
        };

        Ok(recover(&raw)
            .ok()
            .and_then(|value| serde_json::from_value(value).ok()))
    }
}

/// Render each submitted answer with its question into a comparison pair.
/// Answers whose question cannot be found, or that target a non-question
/// block, are dropped.
pub(crate) fn build_qa_pairs(
    user_answers: &[UserAnswer],
    questions: &[ContentBlock],
) -> Vec<QaPair> {
    user_answers
        .iter()
        .filter_map(|ua| {
            let question = questions.iter().find(|q| q.id() == ua.question_id)?;
            render_pair(ua, question)
        })
        .collect()
}

fn render_pair(ua: &UserAnswer, block: &ContentBlock) -> Option<QaPair> {
    let (question, user_answer, correct_answer) = match block {
        ContentBlock::MultipleChoiceQuestion {
            question,
            options,
            correct_answer_index,
            ..
        } => {
            let user = match &ua.answer {
                AnswerValue::Choice(index) => options
                    .get(*index)
                    .cloned()
                    .unwrap_or_else(|| UNANSWERED.to_string()),
                _ => UNANSWERED.to_string(),
            };
            let correct = options
                .get(*correct_answer_index)
                .cloned()
                .unwrap_or_else(|| UNANSWERED.to_string());
            (question.clone(), user, correct)
        }
        ContentBlock::TrueFalseQuestion {
            question,
            correct_answer,
            ..
        } => {
            let user = match &ua.answer {
                AnswerValue::Flag(value) => render_bool(*value),
                _ => UNANSWERED.to_string(),
            };
            (question.clone(), user, render_bool(*correct_answer))
        }
        ContentBlock::FillInTheBlankQuestion {
            question_parts,
            correct_answers,
            ..
        } => {
            let user = match &ua.answer {
                AnswerValue::Blanks(values) => values
                    .iter()
                    .map(|v| if v.is_empty() { "empty" } else { v.as_str() })
                    .collect::<Vec<_>>()
                    .join(", "),
                _ => UNANSWERED.to_string(),
            };
            (
                question_parts.join(" [blank] "),
                user,
                correct_answers.join(", "),
            )
        }
        ContentBlock::OpenEndedQuestion { question, .. } => {
            let user = match &ua.answer {
                AnswerValue::Text(text) => text.clone(),
                AnswerValue::Choice(index) => index.to_string(),
                AnswerValue::Flag(value) => value.to_string(),
                AnswerValue::Blanks(values) => values.join(", "),
            };
            (question.clone(), user, OPEN_ENDED_RUBRIC.to_string())
        }
        ContentBlock::Explanation { .. } | ContentBlock::MathFormula { .. } => return None,
    };

    Some(QaPair {
        question_id: ua.question_id.clone(),
        question,
        user_answer,
        correct_answer,
    })
}

fn render_bool(value: bool) -> String {
    if value { "True" } else { "False" }.to_string()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn questions() -> Vec<ContentBlock> {
        vec![
            ContentBlock::MultipleChoiceQuestion {
                id: "mc".to_string(),
                question: "Pick one".to_string(),
                options: vec!["red".to_string(), "green".to_string(), "blue".to_string()],
                correct_answer_index: 2,
            },
            ContentBlock::TrueFalseQuestion {
                id: "tf".to_string(),
                question: "Water is wet".to_string(),
                correct_answer: true,
            },
            ContentBlock::FillInTheBlankQuestion {
                id: "fb".to_string(),
                question_parts: vec!["The sun rises in the ".to_string(), ".".to_string()],
                correct_answers: vec!["east".to_string()],
            },
            ContentBlock::OpenEndedQuestion {
                id: "oe".to_string(),
                question: "Explain gravity".to_string(),
            },
        ]
    }

    fn answer(id: &str, value: AnswerValue) -> UserAnswer {
        UserAnswer {
            question_id: id.to_string(),
            answer: value,
        }
    }

    #[test]
    fn test_multiple_choice_renders_option_text_not_index() {
        let pairs = build_qa_pairs(&[answer("mc", AnswerValue::Choice(1))], &questions());
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].user_answer, "green");
        assert_eq!(pairs[0].correct_answer, "blue");
    }

    #[test]
    fn test_out_of_range_choice_renders_unanswered() {
        let pairs = build_qa_pairs(&[answer("mc", AnswerValue::Choice(9))], &questions());
        assert_eq!(pairs[0].user_answer, "N/A");
    }

    #[test]
    fn test_true_false_rendering() {
        let pairs = build_qa_pairs(&[answer("tf", AnswerValue::Flag(false))], &questions());
        assert_eq!(pairs[0].user_answer, "False");
        assert_eq!(pairs[0].correct_answer, "True");
    }

    #[test]
    fn test_fill_blank_rendering() {
        let pairs = build_qa_pairs(
            &[answer("fb", AnswerValue::Blanks(vec![String::new()]))],
            &questions(),
        );
        assert_eq!(pairs[0].question, "The sun rises in the  [blank] .");
        assert_eq!(pairs[0].user_answer, "empty");
        assert_eq!(pairs[0].correct_answer, "east");
    }

    #[test]
    fn test_open_ended_uses_rubric() {
        let pairs = build_qa_pairs(
            &[answer("oe", AnswerValue::Text("It pulls things".to_string()))],
            &questions(),
        );
        assert_eq!(pairs[0].user_answer, "It pulls things");
        assert_eq!(pairs[0].correct_answer, OPEN_ENDED_RUBRIC);
    }

    #[test]
    fn test_unknown_question_id_is_skipped() {
        let pairs = build_qa_pairs(
            &[answer("missing", AnswerValue::Text("?".to_string()))],
            &questions(),
        );
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_answer_against_non_question_block_is_skipped() {
        let blocks = vec![ContentBlock::Explanation {
            id: "ex".to_string(),
            text: "context".to_string(),
        }];
        let pairs = build_qa_pairs(&[answer("ex", AnswerValue::Text("hm".to_string()))], &blocks);
        assert!(pairs.is_empty());
    }
}
