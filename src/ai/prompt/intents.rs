//! Per-Intent Prompt Builders
//!
//! One pure function per task. Each truncates its input to the task's
//! character/page budget, assembles the instruction text, and — where the
//! task requires strict shape — attaches the output schema. Source-language
//! fidelity is part of every instruction that touches document text: the
//! model explains, corrects, and quotes in the document's own language.

use serde_json::json;

use super::{PromptBuilder, truncate_chars};
use crate::ai::provider::ModelRequest;
use crate::constants::{budget, generation};
use crate::types::{
    BookTitle, Chapter, IncorrectAnswer, PageText, QaPair, SearchFilter, join_pages,
};

/// In-prompt schema for the question-generation tasks
const QUESTION_SCHEMA: &str = r#"[
  { "type": "multiple_choice_question", "question": "string", "options": ["string"], "correctAnswerIndex": number },
  { "type": "true_false_question", "question": "string", "correctAnswer": boolean },
  { "type": "fill_in_the_blank_question", "questionParts": ["string"], "correctAnswers": ["string"] },
  { "type": "open_ended_question", "question": "string" }
]"#;

/// In-prompt schema for structure detection (chapters and lessons)
const BOUNDARY_SCHEMA: &str = r#"[
  {
    "title": "string",
    "startPage": number,
    "endPage": number
  }
]"#;

// =============================================================================
// Proofreading
// =============================================================================

pub fn proofread_page(text: &str) -> ModelRequest {
    let prompt = PromptBuilder::new()
        .role(
            "proofreading agent",
            "review the following text and correct any spelling or grammar mistakes",
        )
        .text("Very important: work in the text's original language and do not translate it.")
        .source("The text", text)
        .text("Return only the corrected text, with no preamble, headings, or markdown.")
        .build();
    ModelRequest::text(prompt)
}

pub fn proofread_book(pages: &[PageText]) -> ModelRequest {
    let full_text = join_pages(pages);
    let prompt = PromptBuilder::new()
        .role(
            "proofreading agent",
            "review the following text, which is split by page numbers, and correct any \
             spelling or grammar mistakes",
        )
        .requirements(vec![
            "Preserve the page structure using the exact same separators (--- PAGE X ---).",
            "Do not translate the text; correct it in its original language.",
        ])
        .source("Text to correct", &full_text)
        .text(
            "Return the complete corrected text with the page separators untouched, with no \
             preamble, headings, or markdown.",
        )
        .build();
    ModelRequest::text(prompt)
}

// =============================================================================
// Summarization & Explanation
// =============================================================================

pub fn summarize_chapter(chapter_text: &str, style: Option<&str>) -> ModelRequest {
    let word_count = chapter_text.split_whitespace().count();
    let target_words =
        ((word_count as f64) * generation::SUMMARY_RATIO).round() as usize;

    let mut builder = PromptBuilder::new()
        .role(
            "summarizer",
            "produce a detailed summary of one chapter of a book, following the steps below \
             exactly",
        )
        .text(&format!(
            "**Step 1: word count.** The full chapter text is below; it contains {} words.\n\
             **Step 2: summary size.** Produce a detailed summary that is exactly one quarter \
             (25%) of the original length, around {} words. Meeting this size is mandatory.",
            word_count, target_words
        ));

    if let Some(style) = style {
        builder = builder.text(&format!(
            "**Step 2.5: apply the requested style.** In addition to the rules above, the \
             summary must follow this style directive: \"{}\". This directive is mandatory \
             and takes priority for how the content is presented.",
            style
        ));
    }

    let prompt = builder
        .source("Full chapter text", chapter_text)
        .requirements(vec![
            "Focus on detail: this is a condensed version of the original, not a blurb; keep \
             every important idea, argument, piece of evidence, and example.",
            "Stick to the target size to guarantee the level of detail.",
            "No preamble: start with the summary itself, never with phrases like \"This text \
             summarizes...\".",
            "Keep the original author's tone and style (unless a style directive says \
             otherwise).",
            "Add no conclusions that are not in the original text.",
            "Work in the text's original language and never translate it.",
        ])
        .text(
            "Return only the detailed summary, as plain text with no headings or markdown \
             formatting.",
        )
        .build();
    ModelRequest::text(prompt)
}

pub fn explain_page(page_text: &str) -> ModelRequest {
    let prompt = PromptBuilder::new()
        .role(
            "educator",
            "give a thorough, detailed explanation of the following page of a document",
        )
        .text(
            "The explanation must go deep and cover the main points in detail while staying \
             clear and simple. Very important: work in the text's original language and do \
             not translate it.",
        )
        .source(
            "The text",
            truncate_chars(page_text, budget::PAGE_TASK_MAX_CHARS),
        )
        .text("Return only the detailed explanation, as plain text with no preamble, headings, or markdown.")
        .build();
    ModelRequest::text(prompt)
}

pub fn deeper_explanation(text: &str) -> ModelRequest {
    let prompt = PromptBuilder::new()
        .role(
            "educator who excels at simplifying difficult concepts",
            "re-explain the following concept, in more detail and more simply, for a student \
             who did not understand it the first time",
        )
        .source("The concept to explain", text)
        .requirements(vec![
            "Re-explain the concept in the same language as the original text; do not \
             translate it. Keep the explanation simple and clear.",
            "Use analogies or real-world examples to bring the idea closer.",
            "Break the explanation into small, easy-to-follow points where possible.",
            "Respond with the explanation only, with no preamble or extra phrases.",
        ])
        .build();
    ModelRequest::text(prompt)
}

// =============================================================================
// Structure Detection
// =============================================================================

pub fn document_structure(pages: &[PageText], total_pages: u32) -> ModelRequest {
    let window = &pages[..pages.len().min(budget::STRUCTURE_MAX_PAGES)];
    let text_for_analysis = join_pages(window);

    let prompt = PromptBuilder::new()
        .role(
            "assistant specializing in document structure analysis",
            "examine the following text extracted from a document and identify only its \
             high-level structural units, such as parts or chapters",
        )
        .source("Extracted text", &text_for_analysis)
        .text(&format!(
            "The total number of pages in the document is: {}.",
            total_pages
        ))
        .requirements(vec![
            "Identify the main structural units (chapters or parts) of the document.",
            "Do not split these units into sub-lessons or smaller sections at this stage.",
            "Estimate the start and end page numbers of each unit.",
            "The final unit must extend to the end of the document (the last page).",
            "If no clear units can be identified, produce a single unit covering the whole \
             document.",
            "Unit titles must be in the same language as the document. Do not translate \
             them.",
        ])
        .output_contract(BOUNDARY_SCHEMA)
        .build();
    ModelRequest::json(prompt)
}

pub fn chapter_lessons(chapter_text: &str, chapter: &Chapter) -> ModelRequest {
    let preview = truncate_chars(chapter_text, budget::LESSON_SPLIT_MAX_CHARS);

    let prompt = PromptBuilder::new()
        .role(
            "curriculum designer",
            &format!(
                "split the text of the unit titled \"{}\" (pages {} to {}) into smaller, \
                 logical teaching lessons",
                chapter.title, chapter.start_page, chapter.end_page
            ),
        )
        .source("Text preview", preview)
        .requirements(vec![
            "Identify the logical lessons within the text.",
            "Give each lesson a descriptive title.",
            "Estimate each lesson's start and end pages; they must stay within the unit's \
             own page range.",
            "If no clear lessons can be identified, return an empty array.",
            "Lesson titles must be in the same language as the document. Do not translate \
             them.",
        ])
        .output_contract(BOUNDARY_SCHEMA)
        .build();
    ModelRequest::json(prompt)
}

// =============================================================================
// Lesson Generation
// =============================================================================

pub fn interactive_lesson(lesson_pages: &[PageText]) -> ModelRequest {
    let lesson_text = join_pages(lesson_pages);
    let limited = truncate_chars(&lesson_text, budget::LESSON_MAX_CHARS);

    let prompt = PromptBuilder::new()
        .role(
            "educator",
            "turn the following document text into a comprehensive teaching unit by \
             explaining it fully and in detail",
        )
        .source("Text extracted from the document", limited)
        .requirements(vec![
            "Comprehensive explanation, never a summary: explain the content in full \
             detail; the goal is deeper understanding, not brevity.",
            "Stay faithful to the source: every explanation must be grounded in the \
             provided text. The only exception is the mandatory worked examples below.",
            "Worked examples: if the topic involves mathematics, physics, chemistry, or \
             statistics, include a section titled \"Worked examples\" with exactly two (2) \
             practical examples solved step by step.",
            "Do not create any quiz questions at this stage; focus only on the explanation.",
            "Do not include images or diagrams of any kind; text and formulas only.",
            "Explain the content in the same language as the original text. Do not \
             translate anything.",
        ])
        .output_contract(
            r#"{
  "title": "string",
  "content": [
    { "type": "explanation", "text": "string" },
    { "type": "math_formula", "latex": "string" }
  ]
}"#,
        )
        .build();
    ModelRequest::json(prompt)
}

// =============================================================================
// Question Generation
// =============================================================================

pub fn initial_questions(lesson_text: &str) -> ModelRequest {
    let limited = truncate_chars(lesson_text, budget::QUESTION_SOURCE_MAX_CHARS);

    let prompt = PromptBuilder::new()
        .role(
            "creator of educational assessments",
            "create quiz questions based on the following lesson text",
        )
        .source("Lesson text", limited)
        .requirements(vec![
            format!(
                "Create a comprehensive, varied quiz of {} questions based on the lesson \
                 text.",
                generation::INITIAL_QUESTION_COUNT
            )
            .as_str(),
            "Use a mix of question types (multiple choice, true/false, fill in the blank, \
             open-ended) to test understanding in depth.",
            "Make sure every object in the array is complete and follows its schema \
             exactly; property names such as 'question', 'options' and \
             'correctAnswerIndex' must be spelled correctly and double-quoted.",
            "All questions and options must be in the same language as the lesson text. Do \
             not translate.",
        ])
        .output_contract(QUESTION_SCHEMA)
        .build();
    ModelRequest::json(prompt)
}

pub fn page_questions(page_text: &str) -> ModelRequest {
    let limited = truncate_chars(page_text, budget::PAGE_TASK_MAX_CHARS);

    let prompt = PromptBuilder::new()
        .role(
            "creator of educational assessments",
            &format!(
                "generate {} diverse questions based on the following page text",
                generation::PAGE_QUESTION_COUNT
            ),
        )
        .source("Page text", limited)
        .requirements(vec![
            format!(
                "Create a short quiz of {} diverse questions.",
                generation::PAGE_QUESTION_COUNT
            )
            .as_str(),
            "Use different question types (multiple_choice_question, true_false_question, \
             fill_in_the_blank_question, open_ended_question).",
            "All questions and options must be in the same language as the page text. Do \
             not translate.",
        ])
        .output_contract(QUESTION_SCHEMA)
        .build();
    ModelRequest::json(prompt)
}

pub fn more_questions(lesson_text: &str, existing_prompts: &[String]) -> ModelRequest {
    let limited = truncate_chars(lesson_text, budget::QUESTION_SOURCE_MAX_CHARS);
    let existing = existing_prompts.join("\n - ");

    let prompt = PromptBuilder::new()
        .role(
            "curriculum designer",
            "create additional quiz questions based on the following lesson text",
        )
        .source("Lesson text", limited)
        .source("Existing questions (avoid repeating them)", &format!(" - {}", existing))
        .requirements(vec![
            format!(
                "Create {} new, diverse questions.",
                generation::MORE_QUESTION_COUNT
            )
            .as_str(),
            "The new questions must be different from the existing ones.",
            "Use different question types.",
            "All new questions and options must be in the same language as the lesson \
             text. Do not translate.",
        ])
        .output_contract(QUESTION_SCHEMA)
        .build();
    ModelRequest::json(prompt)
}

// =============================================================================
// Answer Evaluation
// =============================================================================

pub fn evaluate_answers(pairs: &[QaPair], feedback_language: &str) -> ModelRequest {
    let rendered = serde_json::to_string_pretty(pairs).unwrap_or_else(|_| "[]".to_string());

    let prompt = PromptBuilder::new()
        .text(&format!(
            "Important note: the \"explanation\" field must be written in {}. However, when \
             quoting the question or the correct answer inside the explanation, keep their \
             original language and do not translate them.",
            feedback_language
        ))
        .role(
            "teacher",
            "evaluate a student's answers and give constructive feedback",
        )
        .source(
            "The questions and the student's answers, with the correct answers for comparison",
            &rendered,
        )
        .requirements(vec![
            "For each item, compare `userAnswer` against `correctAnswer`.",
            "Set `isCorrect` to `true` when the answer is right and `false` when it is \
             wrong.",
            "In the `explanation` field: when the answer is correct, give brief \
             encouragement such as \"Great answer!\"; when it is wrong, start by saying the \
             answer is incorrect, then state the correct answer clearly.",
        ])
        .output_contract(
            r#"[
  {
    "questionId": "string",
    "isCorrect": boolean,
    "explanation": "string"
  }
]
Return the exact same `questionId` you were given for each item."#,
        )
        .build();
    ModelRequest::json(prompt)
}

pub fn corrections(incorrect: &[IncorrectAnswer], feedback_language: &str) -> ModelRequest {
    let rendered = serde_json::to_string_pretty(incorrect).unwrap_or_else(|_| "[]".to_string());

    let prompt = PromptBuilder::new()
        .text(&format!(
            "Important note: the \"correction\" field must be written in {}. However, when \
             quoting the question or the correct answer inside the explanation, keep their \
             original language and do not translate them.",
            feedback_language
        ))
        .role(
            "patient, understanding teacher",
            "review a student's incorrect answers and give a detailed, constructive \
             correction for each one",
        )
        .source("The questions and incorrect answers", &rendered)
        .requirements(vec![
            "For each question, clearly explain why the student's answer was wrong.",
            "Then give the correct answer with a complete, simple explanation of the \
             reasoning behind it.",
            "Keep the explanation easy to follow and encouraging.",
        ])
        .output_contract(
            r#"[
  {
    "questionId": "string",
    "correction": "string"
  }
]
Return the exact same `questionId` you were given for each item."#,
        )
        .build();
    ModelRequest::json(prompt)
}

// =============================================================================
// Search
// =============================================================================

pub fn search_materials(query: &str, filter: SearchFilter) -> ModelRequest {
    let filter_instruction = match filter {
        SearchFilter::Video => "Focus your search primarily on video platforms.",
        SearchFilter::Sites => {
            "Exclude video platforms from your results and focus on other educational sites."
        }
        SearchFilter::All => "Search both educational websites and video platforms.",
    };

    let prompt = PromptBuilder::new()
        .role(
            "search engine specializing in educational content",
            &format!("find study resources about: \"{}\"", query),
        )
        .requirements(vec![
            format!(
                "Search only educational websites and educational video channels. {}",
                filter_instruction
            )
            .as_str(),
            "No summaries: write no introduction, summary, or closing; present only the \
             list of links.",
            "Exact output format: every line of your response must follow exactly this \
             shape: [direct link to the site or video] - [description of exactly 7 words, \
             in the document's language]",
            "Ordering: list website links first, then video links.",
            "Quantity: find as many results as possible (up to 100).",
        ])
        .text(
            "Example of the required format:\n\
             https://www.example.edu/physics101 - Best full explanation of introductory \
             physics course.\n\
             https://www.youtube.com/watch?v=example - Final exam review for organic \
             chemistry basics.",
        )
        .build();
    ModelRequest::text(prompt).with_web_search()
}

pub fn document_search(context: &str, query: &str) -> ModelRequest {
    let limited = truncate_chars(context, budget::CHAT_CONTEXT_MAX_CHARS);

    let prompt = PromptBuilder::new()
        .role(
            "research assistant",
            "answer the user's query based ONLY on the provided text context",
        )
        .source("Context", limited)
        .text(&format!("User query: \"{}\"", query))
        .requirements(vec![
            "Find the most relevant information in the context to answer the query.",
            "If the answer is found, formulate a clear and concise answer.",
            "Extract the exact quote(s) from the context that support your answer.",
            "Identify the page number(s) from the context. Page numbers are denoted by \
             \"--- PAGE [number] ---\". Format this as \"p. X\" or \"pp. X-Y\"; use \
             \"N/A\" when the page cannot be determined.",
            format!(
                "Generate {} insightful follow-up questions the user might ask next.",
                generation::FOLLOW_UP_COUNT
            )
            .as_str(),
            "If the answer cannot be found in the context, say so clearly in the answer \
             field and leave the other fields empty or marked as unavailable.",
            "The \"quote\" field must be an exact extraction from the text, without \
             translation.",
        ])
        .output_contract(
            r#"{
  "answer": "string",
  "quote": "string",
  "pages": "string",
  "follow_ups": ["string", "string", "string"]
}"#,
        )
        .build();

    ModelRequest::json(prompt).with_schema(json!({
        "type": "OBJECT",
        "properties": {
            "answer": { "type": "STRING" },
            "quote": { "type": "STRING" },
            "pages": { "type": "STRING" },
            "follow_ups": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            }
        },
        "required": ["answer", "quote", "pages", "follow_ups"]
    }))
}

pub fn categorize_books(titles: &[BookTitle]) -> ModelRequest {
    let listing = titles
        .iter()
        .map(|book| format!("- {} (id: {})", book.name, book.id))
        .collect::<Vec<_>>()
        .join("\n");

    let prompt = PromptBuilder::new()
        .role(
            "librarian",
            "categorize the following list of book titles into main categories and \
             relevant sub-categories",
        )
        .source("Book titles (with their original IDs)", &listing)
        .requirements(vec![
            "Analyze each title to determine its subject matter.",
            "Group books under appropriate main categories (e.g. \"Computer Science\", \
             \"History\", \"Literature\").",
            "Within each main category, group books into more specific sub-categories \
             (e.g. \"Web Development\", \"Roman History\", \"Modernist Novels\").",
            "Every book title from the input list must appear in exactly one \
             sub-category. Respond with the book's title only, not its ID.",
        ])
        .output_contract(
            r#"An array of main category objects. Each object has:
- "category": string (the main category name)
- "subCategories": an array of sub-category objects, each with:
  - "subCategory": string (the sub-category name)
  - "books": an array of strings, each a book title in this sub-category"#,
        )
        .build();

    ModelRequest::json(prompt).with_schema(json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "category": { "type": "STRING" },
                "subCategories": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "subCategory": { "type": "STRING" },
                            "books": { "type": "ARRAY", "items": { "type": "STRING" } }
                        },
                        "required": ["subCategory", "books"]
                    }
                }
            },
            "required": ["category", "subCategories"]
        }
    }))
}

// =============================================================================
// Chat
// =============================================================================

/// System instruction for the general academic chat assistant
pub fn chat_system_instruction() -> String {
    "You are a specialized academic assistant. Your job is to discuss scientific, \
     educational, and knowledge-related content only, including analysis of files the \
     user uploads. Politely decline small talk or anything unrelated to academic topics. \
     Always answer in the same language as the user's question."
        .to_string()
}

/// System instruction for a chat grounded in document context
pub fn chat_context_instruction(context: &str) -> String {
    let limited = truncate_chars(context, budget::CHAT_CONTEXT_MAX_CHARS);
    format!(
        "You are a specialized assistant. Answer the user's questions relying ONLY on the \
         following context. Use no outside information. Always answer in the same language \
         as the user's question. If the answer is not in the context, tell the user so \
         clearly.\n\nContext:\n---\n{}\n---",
        limited
    )
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(n: usize) -> Vec<PageText> {
        (1..=n)
            .map(|i| PageText::new(i as u32, format!("page {} body", i)))
            .collect()
    }

    #[test]
    fn test_structure_request_caps_pages() {
        let many = pages(budget::STRUCTURE_MAX_PAGES + 50);
        let request = document_structure(&many, many.len() as u32);

        assert!(request.expect_json);
        assert!(request.prompt.contains(&format!(
            "--- PAGE {} ---",
            budget::STRUCTURE_MAX_PAGES
        )));
        assert!(!request.prompt.contains(&format!(
            "--- PAGE {} ---",
            budget::STRUCTURE_MAX_PAGES + 1
        )));
        assert!(request.prompt.contains("total number of pages in the document is: 650"));
    }

    #[test]
    fn test_lesson_request_truncates_to_budget() {
        let big_page = PageText::new(1, "x".repeat(budget::LESSON_MAX_CHARS * 2));
        let request = interactive_lesson(std::slice::from_ref(&big_page));

        assert!(request.prompt.len() < budget::LESSON_MAX_CHARS + 4_000);
        assert!(request.prompt.contains("math_formula"));
    }

    #[test]
    fn test_question_requests_state_counts_and_schema() {
        let initial = initial_questions("lesson body");
        assert!(initial.prompt.contains("50 questions"));
        assert!(initial.prompt.contains("correctAnswerIndex"));
        assert!(initial.expect_json);
        assert!(initial.response_schema.is_none());

        let per_page = page_questions("page body");
        assert!(per_page.prompt.contains("10 diverse questions"));
    }

    #[test]
    fn test_more_questions_lists_existing() {
        let existing = vec!["What is ohm's law?".to_string()];
        let request = more_questions("lesson", &existing);
        assert!(request.prompt.contains("What is ohm's law?"));
        assert!(request.prompt.contains("avoid repeating"));
    }

    #[test]
    fn test_evaluation_embeds_pairs_and_language() {
        let pairs = vec![QaPair {
            question_id: "q-1".to_string(),
            question: "2+2?".to_string(),
            user_answer: "4".to_string(),
            correct_answer: "4".to_string(),
        }];
        let request = evaluate_answers(&pairs, "Arabic");
        assert!(request.prompt.contains("\"questionId\": \"q-1\""));
        assert!(request.prompt.contains("must be written in Arabic"));
        assert!(request.expect_json);
    }

    #[test]
    fn test_search_request_uses_web_tool() {
        let request = search_materials("thermodynamics", SearchFilter::Video);
        assert!(request.web_search);
        assert!(!request.expect_json);
        assert!(request.prompt.contains("video platforms"));

        let sites = search_materials("thermodynamics", SearchFilter::Sites);
        assert!(sites.prompt.contains("Exclude video platforms"));
    }

    #[test]
    fn test_document_search_has_strict_schema() {
        let request = document_search("--- PAGE 1 ---\nbody", "what is this?");
        let schema = request.response_schema.unwrap();
        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(schema["properties"]["follow_ups"]["type"], "ARRAY");
        assert!(request.prompt.contains("what is this?"));
    }

    #[test]
    fn test_categorize_books_lists_ids() {
        let titles = vec![BookTitle {
            id: "b1".to_string(),
            name: "Calculus I".to_string(),
        }];
        let request = categorize_books(&titles);
        assert!(request.prompt.contains("Calculus I (id: b1)"));
        assert!(request.response_schema.is_some());
    }

    #[test]
    fn test_chat_context_is_trimmed() {
        let huge = "c".repeat(budget::CHAT_CONTEXT_MAX_CHARS * 2);
        let instruction = chat_context_instruction(&huge);
        assert!(instruction.len() < budget::CHAT_CONTEXT_MAX_CHARS + 1_000);
    }

    #[test]
    fn test_proofread_book_keeps_separators() {
        let request = proofread_book(&pages(2));
        assert!(request.prompt.contains("--- PAGE 1 ---"));
        assert!(request.prompt.contains("--- PAGE 2 ---"));
        assert!(!request.expect_json);
    }

    #[test]
    fn test_summary_targets_quarter_length() {
        let text = (0..400).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ");
        let request = summarize_chapter(&text, Some("bullet points"));
        assert!(request.prompt.contains("400 words"));
        assert!(request.prompt.contains("around 100 words"));
        assert!(request.prompt.contains("bullet points"));
    }
}
