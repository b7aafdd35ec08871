//! Streaming Chat
//!
//! Multi-turn chat with the academic assistant, optionally grounded in
//! document context. Responses stream as ordered text fragments; the session
//! accumulates the in-progress assistant message by strict append-only
//! concatenation and records it in the transcript when the stream ends.
//!
//! Exactly one response may be in flight per session: the transcript update
//! replaces "the last message", so a concurrent send is rejected with
//! `StudyError::ChatBusy` instead of corrupting the exchange.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;
use tracing::debug;

use crate::ai::keys::KeyManager;
use crate::ai::prompt;
use crate::ai::provider::{ChatTurn, FragmentStream, ModelRequest};
use crate::constants::network;
use crate::types::{Result, StudyError};

use super::TaskEngine;

impl TaskEngine {
    /// Start a general academic chat session
    pub fn create_chat(&self) -> ChatSession {
        ChatSession::new(
            Arc::clone(self.key_manager()),
            prompt::chat_system_instruction(),
        )
    }

    /// Start a chat session grounded in document context
    pub fn create_chat_with_context(&self, context: &str) -> ChatSession {
        ChatSession::new(
            Arc::clone(self.key_manager()),
            prompt::chat_context_instruction(context),
        )
    }
}

// =============================================================================
// Streaming Message
// =============================================================================

/// The in-progress assistant message: fragments are applied in emission
/// order with no reordering or coalescing.
#[derive(Debug, Clone, Default)]
pub struct StreamingMessage {
    text: String,
}

impl StreamingMessage {
    pub fn push_fragment(&mut self, fragment: &str) {
        self.text.push_str(fragment);
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

// =============================================================================
// Chat Session
// =============================================================================

/// One conversation with the assistant. The client is re-resolved through
/// the Key Manager on every send, so a credential entered after the session
/// was created is picked up.
pub struct ChatSession {
    keys: Arc<KeyManager>,
    system_instruction: String,
    history: Arc<std::sync::Mutex<Vec<ChatTurn>>>,
    in_flight: Arc<AtomicBool>,
}

impl ChatSession {
    fn new(keys: Arc<KeyManager>, system_instruction: String) -> Self {
        Self {
            keys,
            system_instruction,
            history: Arc::new(std::sync::Mutex::new(Vec::new())),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The conversation so far, completed turns only
    pub fn transcript(&self) -> Vec<ChatTurn> {
        self.history.lock().expect("chat history poisoned").clone()
    }

    /// Send a user message and stream the assistant's reply.
    ///
    /// Fails with `ChatBusy` while a previous reply is still streaming. The
    /// user turn is recorded immediately; the assistant turn is recorded
    /// once the stream completes.
    pub async fn send(&self, message: &str) -> Result<FragmentStream> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(StudyError::ChatBusy);
        }

        match self.start_stream(message).await {
            Ok(stream) => Ok(stream),
            Err(err) => {
                self.in_flight.store(false, Ordering::SeqCst);
                Err(err)
            }
        }
    }

    async fn start_stream(&self, message: &str) -> Result<FragmentStream> {
        let model = self.keys.client()?;

        let request = ModelRequest {
            prompt: message.to_string(),
            system_instruction: Some(self.system_instruction.clone()),
            history: self.transcript(),
            ..ModelRequest::default()
        };

        let mut upstream = model.generate_stream(&request).await?;

        self.history
            .lock()
            .expect("chat history poisoned")
            .push(ChatTurn::user(message));

        let (tx, rx) = mpsc::channel(network::STREAM_CHANNEL_CAPACITY);
        let history = Arc::clone(&self.history);
        let in_flight = Arc::clone(&self.in_flight);

        tokio::spawn(async move {
            let mut accumulated = StreamingMessage::default();

            while let Some(fragment) = upstream.next_fragment().await {
                match fragment {
                    Ok(text) => {
                        accumulated.push_fragment(&text);
                        // A receiver that went away must not lose the turn;
                        // keep draining so the transcript stays complete.
                        let _ = tx.send(Ok(text)).await;
                    }
                    Err(err) => {
                        let _ = tx.send(Err(err)).await;
                        break;
                    }
                }
            }

            if !accumulated.text().is_empty() {
                history
                    .lock()
                    .expect("chat history poisoned")
                    .push(ChatTurn::model(accumulated.into_text()));
            }

            debug!("chat stream finished");
            in_flight.store(false, Ordering::SeqCst);
        });

        Ok(FragmentStream::new(rx))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::keys::MemoryCredentialStore;
    use crate::config::ModelConfig;

    #[test]
    fn test_streaming_message_appends_in_order() {
        let mut message = StreamingMessage::default();
        for fragment in ["Hel", "lo, ", "world"] {
            message.push_fragment(fragment);
        }
        assert_eq!(message.text(), "Hello, world");
        assert_eq!(message.into_text(), "Hello, world");
    }

    #[test]
    fn test_streaming_message_keeps_empty_fragments_harmless() {
        let mut message = StreamingMessage::default();
        message.push_fragment("a");
        message.push_fragment("");
        message.push_fragment("b");
        assert_eq!(message.text(), "ab");
    }

    fn session_without_credential() -> ChatSession {
        let keys = KeyManager::new(
            ModelConfig {
                api_key: Some(String::new()),
                ..ModelConfig::default()
            },
            Box::new(MemoryCredentialStore::default()),
        );
        ChatSession::new(Arc::new(keys), "test".to_string())
    }

    #[tokio::test]
    async fn test_send_without_credential_resets_in_flight() {
        let session = session_without_credential();

        let first = session.send("hi").await;
        assert!(matches!(first, Err(StudyError::CredentialMissing)));

        // The failed send must not leave the session stuck busy.
        let second = session.send("hi again").await;
        assert!(matches!(second, Err(StudyError::CredentialMissing)));
    }

    #[tokio::test]
    async fn test_concurrent_send_is_rejected() {
        let session = session_without_credential();
        session.in_flight.store(true, Ordering::SeqCst);

        let result = session.send("while busy").await;
        assert!(matches!(result, Err(StudyError::ChatBusy)));
    }

    #[test]
    fn test_transcript_starts_empty() {
        let session = session_without_credential();
        assert!(session.transcript().is_empty());
    }
}
