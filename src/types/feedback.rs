//! Answer Evaluation Types
//!
//! User answers submitted against generated questions, and the feedback the
//! evaluation task produces for them.

use serde::{Deserialize, Serialize};

/// The value a user submitted for one question. Untagged: the JSON shape
/// (number, bool, string, array) selects the variant, mirroring what each
/// question kind collects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    /// Selected option index (multiple choice)
    Choice(usize),
    /// True/false selection
    Flag(bool),
    /// One value per blank (fill in the blank)
    Blanks(Vec<String>),
    /// Free text (open-ended)
    Text(String),
}

/// One submitted answer, keyed by the question's local identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAnswer {
    #[serde(rename = "questionId")]
    pub question_id: String,
    pub answer: AnswerValue,
}

/// A question/answer comparison pair as sent to the model: everything
/// rendered to display text so the evaluator never sees raw indices.
#[derive(Debug, Clone, Serialize)]
pub struct QaPair {
    #[serde(rename = "questionId")]
    pub question_id: String,
    pub question: String,
    #[serde(rename = "userAnswer")]
    pub user_answer: String,
    #[serde(rename = "correctAnswer")]
    pub correct_answer: String,
}

/// Per-question evaluation result. `question` and `user_answer` are
/// re-attached locally from the original pair after recovery; the model is
/// not trusted to echo them back verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackItem {
    #[serde(rename = "questionId")]
    pub question_id: String,
    #[serde(rename = "isCorrect")]
    pub is_correct: bool,
    pub explanation: String,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default, rename = "userAnswer")]
    pub user_answer: Option<String>,
}

/// A detailed correction for one incorrectly answered question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiCorrection {
    #[serde(rename = "questionId")]
    pub question_id: String,
    pub correction: String,
}

/// Input to the correction task: the wrong answer with its rendered context
#[derive(Debug, Clone, Serialize)]
pub struct IncorrectAnswer {
    #[serde(rename = "questionId")]
    pub question_id: String,
    pub question: String,
    #[serde(rename = "userAnswer")]
    pub user_answer: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_value_untagged_shapes() {
        let choice: UserAnswer =
            serde_json::from_str(r#"{"questionId": "q1", "answer": 2}"#).unwrap();
        assert_eq!(choice.answer, AnswerValue::Choice(2));

        let flag: UserAnswer =
            serde_json::from_str(r#"{"questionId": "q2", "answer": false}"#).unwrap();
        assert_eq!(flag.answer, AnswerValue::Flag(false));

        let blanks: UserAnswer =
            serde_json::from_str(r#"{"questionId": "q3", "answer": ["a", "b"]}"#).unwrap();
        assert_eq!(
            blanks.answer,
            AnswerValue::Blanks(vec!["a".to_string(), "b".to_string()])
        );

        let text: UserAnswer =
            serde_json::from_str(r#"{"questionId": "q4", "answer": "because"}"#).unwrap();
        assert_eq!(text.answer, AnswerValue::Text("because".to_string()));
    }

    #[test]
    fn test_feedback_item_optional_display_fields() {
        let item: FeedbackItem = serde_json::from_str(
            r#"{"questionId": "q1", "isCorrect": true, "explanation": "Well done"}"#,
        )
        .unwrap();
        assert!(item.question.is_none());
        assert!(item.user_answer.is_none());
    }
}
