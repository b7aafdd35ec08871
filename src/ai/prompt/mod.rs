//! Prompt Builder System
//!
//! Standardized prompt construction for model interactions: one pure builder
//! per task intent, all sharing the same section structure.
//!
//! ## Design Principles
//!
//! 1. **Role Definition**: Clear role for each task
//! 2. **Delimited Sources**: Input text fenced between `---` markers
//! 3. **Numbered Requirements**: Explicit, checkable rules
//! 4. **Output Contract**: JSON shape spelled out when the task needs one
//! 5. **Language Fidelity**: Tasks that must not translate say so explicitly
//!
//! Builders only assemble `ModelRequest` values; they never call the model.

mod intents;

pub use intents::*;

/// Prompt section types
#[derive(Debug, Clone)]
enum PromptSection {
    /// Role definition with the task it performs
    Role { expertise: String, task: String },
    /// Free paragraph
    Text(String),
    /// Labeled source material between `---` delimiters
    Source { label: String, content: String },
    /// Numbered requirement list
    Requirements(Vec<String>),
    /// JSON output contract with the schema rendered in-prompt
    OutputContract(String),
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a role definition section
    pub fn role(mut self, expertise: &str, task: &str) -> Self {
        self.sections.push(PromptSection::Role {
            expertise: expertise.to_string(),
            task: task.to_string(),
        });
        self
    }

    /// Add a free text paragraph
    pub fn text(mut self, content: &str) -> Self {
        self.sections.push(PromptSection::Text(content.to_string()));
        self
    }

    /// Add delimited source material
    pub fn source(mut self, label: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Source {
            label: label.to_string(),
            content: content.to_string(),
        });
        self
    }

    /// Add a numbered requirements section
    pub fn requirements(mut self, rules: Vec<&str>) -> Self {
        self.sections.push(PromptSection::Requirements(
            rules.into_iter().map(String::from).collect(),
        ));
        self
    }

    /// Add the strict-JSON output contract with an in-prompt schema
    pub fn output_contract(mut self, schema: &str) -> Self {
        self.sections
            .push(PromptSection::OutputContract(schema.to_string()));
        self
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        let mut prompt = String::new();

        for section in self.sections {
            match section {
                PromptSection::Role { expertise, task } => {
                    prompt.push_str(&format!(
                        "You are an expert {}. Your task is to {}.\n\n",
                        expertise, task
                    ));
                }
                PromptSection::Text(content) => {
                    prompt.push_str(&content);
                    prompt.push_str("\n\n");
                }
                PromptSection::Source { label, content } => {
                    prompt.push_str(&format!("{}:\n---\n{}\n---\n\n", label, content));
                }
                PromptSection::Requirements(rules) => {
                    prompt.push_str("**Requirements:**\n");
                    for (i, rule) in rules.iter().enumerate() {
                        prompt.push_str(&format!("{}. {}\n", i + 1, rule));
                    }
                    prompt.push('\n');
                }
                PromptSection::OutputContract(schema) => {
                    prompt.push_str(
                        "**Output format (JSON):**\n\
                         IMPORTANT: Respond with ONLY a single valid JSON value that follows \
                         this schema exactly. Do not include any text, markdown, or explanations \
                         before or after the JSON. Double-check for common mistakes such as \
                         trailing commas or missing commas between objects.\n",
                    );
                    prompt.push_str(&schema);
                    prompt.push_str("\n\n");
                }
            }
        }

        prompt.trim_end().to_string()
    }
}

/// Truncate to a character budget on a character boundary. Byte slicing
/// would panic mid-codepoint on non-ASCII study material.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_prompt() {
        let prompt = PromptBuilder::new()
            .role("teacher", "explain the text")
            .requirements(vec!["Be clear", "Do not translate"])
            .build();

        assert!(prompt.contains("You are an expert teacher."));
        assert!(prompt.contains("1. Be clear"));
        assert!(prompt.contains("2. Do not translate"));
    }

    #[test]
    fn test_source_delimiters() {
        let prompt = PromptBuilder::new().source("The text", "page body").build();
        assert!(prompt.contains("The text:\n---\npage body\n---"));
    }

    #[test]
    fn test_output_contract() {
        let prompt = PromptBuilder::new()
            .output_contract(r#"{ "title": "string" }"#)
            .build();
        assert!(prompt.contains("ONLY a single valid JSON value"));
        assert!(prompt.contains(r#"{ "title": "string" }"#));
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("abc", 10), "abc");
        // multi-byte text must not split a codepoint
        assert_eq!(truncate_chars("مرحبا بالعالم", 5), "مرحبا");
    }
}
