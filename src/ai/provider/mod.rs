//! Model Invocation Boundary
//!
//! Defines the `GenerativeModel` trait: one call shape for plain-text or
//! JSON-constrained generation, plus a streaming variant that yields a
//! finite, non-restartable, ordered sequence of text fragments.

pub mod gemini;

pub use gemini::GeminiModel;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::types::Result;

// =============================================================================
// Model Request
// =============================================================================

/// Speaker role in a multi-turn exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

/// One prior turn of a chat exchange
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

/// A fully assembled model request, produced by a prompt builder.
///
/// Builders never call the model; orchestrators hand the descriptor to a
/// `GenerativeModel` implementation.
#[derive(Debug, Clone, Default)]
pub struct ModelRequest {
    /// The current user prompt
    pub prompt: String,
    /// Session-level instruction (chat tasks)
    pub system_instruction: Option<String>,
    /// Prior turns preceding `prompt` (chat tasks)
    pub history: Vec<ChatTurn>,
    /// Ask the model for a JSON media type response
    pub expect_json: bool,
    /// Strict output schema, for tasks that constrain shape server-side
    pub response_schema: Option<Value>,
    /// Enable the provider's web-search tool
    pub web_search: bool,
}

impl ModelRequest {
    /// Plain text-in, text-out request
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    /// Request constrained to a JSON response (schema described in-prompt)
    pub fn json(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            expect_json: true,
            ..Self::default()
        }
    }

    /// Attach a strict response schema enforced by the provider
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.expect_json = true;
        self.response_schema = Some(schema);
        self
    }

    /// Enable the provider's web-search tool
    pub fn with_web_search(mut self) -> Self {
        self.web_search = true;
        self
    }
}

// =============================================================================
// Fragment Stream
// =============================================================================

/// Ordered, finite stream of response text fragments.
///
/// Fragments arrive in emission order and the stream cannot be restarted;
/// `None` marks the end of the response.
pub struct FragmentStream {
    rx: mpsc::Receiver<Result<String>>,
}

impl FragmentStream {
    pub(crate) fn new(rx: mpsc::Receiver<Result<String>>) -> Self {
        Self { rx }
    }

    /// Await the next fragment; `None` when the response is complete
    pub async fn next_fragment(&mut self) -> Option<Result<String>> {
        self.rx.recv().await
    }

    /// Drain the remaining fragments into one string
    pub async fn collect_text(mut self) -> Result<String> {
        let mut text = String::new();
        while let Some(fragment) = self.next_fragment().await {
            text.push_str(&fragment?);
        }
        Ok(text)
    }
}

// =============================================================================
// Generative Model Trait
// =============================================================================

/// The upstream generative service, as seen by the orchestrators
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Generate a complete response and return its text
    async fn generate(&self, request: &ModelRequest) -> Result<String>;

    /// Generate a response as an ordered stream of text fragments
    async fn generate_stream(&self, request: &ModelRequest) -> Result<FragmentStream>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Shared model handle used across concurrently running tasks
pub type SharedModel = Arc<dyn GenerativeModel>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builders() {
        let req = ModelRequest::text("hello");
        assert!(!req.expect_json);
        assert!(req.response_schema.is_none());

        let req = ModelRequest::json("give me JSON");
        assert!(req.expect_json);

        let req = ModelRequest::text("search").with_web_search();
        assert!(req.web_search);

        let req = ModelRequest::text("strict").with_schema(serde_json::json!({"type": "OBJECT"}));
        assert!(req.expect_json);
        assert!(req.response_schema.is_some());
    }

    #[tokio::test]
    async fn test_fragment_stream_collect() {
        let (tx, rx) = mpsc::channel(4);
        let mut stream = FragmentStream::new(rx);

        tx.send(Ok("Hel".to_string())).await.unwrap();
        tx.send(Ok("lo".to_string())).await.unwrap();
        drop(tx);

        assert_eq!(stream.next_fragment().await.unwrap().unwrap(), "Hel");
        assert_eq!(stream.next_fragment().await.unwrap().unwrap(), "lo");
        assert!(stream.next_fragment().await.is_none());
    }
}
