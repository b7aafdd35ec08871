//! Task Orchestrators
//!
//! The public operations the host application calls. Every task follows the
//! same skeleton: build request → call model with bounded retry → recover the
//! response → repair/validate domain invariants → return.
//!
//! ## Result contracts
//!
//! - Credential and safety failures are always typed errors.
//! - Operations with a documented deterministic fallback never fail for
//!   model reasons (`analyze_document_structure`, `proofread_page`).
//! - Structured-generation operations return `Ok(None)` when the model could
//!   not produce usable output after retries; callers match on the value,
//!   never on error text.

mod chat;
mod feedback;
mod lesson;
mod proofread;
mod questions;
mod search;
mod structure;

pub use chat::{ChatSession, StreamingMessage};

use std::sync::Arc;

use crate::ai::keys::KeyManager;
use crate::ai::provider::{ModelRequest, SharedModel};
use crate::ai::retry::{RetryPolicy, with_retry};
use crate::config::TaskSettings;
use crate::types::Result;

/// Orchestrates all generation tasks against the active model client.
///
/// Cheap to share; concurrent tasks only contend on the Key Manager's
/// idempotent credential resolution.
pub struct TaskEngine {
    keys: Arc<KeyManager>,
    settings: TaskSettings,
    retry: RetryPolicy,
}

impl TaskEngine {
    pub fn new(keys: Arc<KeyManager>, settings: TaskSettings) -> Self {
        Self {
            keys,
            settings,
            retry: RetryPolicy::default(),
        }
    }

    /// Override the retry policy (tests, latency-sensitive hosts)
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn key_manager(&self) -> &Arc<KeyManager> {
        &self.keys
    }

    pub(crate) fn settings(&self) -> &TaskSettings {
        &self.settings
    }

    /// Resolve the model client; fails typed when no credential is usable
    pub(crate) fn model(&self) -> Result<SharedModel> {
        self.keys.client()
    }

    /// One model call under the engine's retry policy
    pub(crate) async fn generate_with(
        &self,
        model: &SharedModel,
        request: &ModelRequest,
    ) -> Result<String> {
        with_retry(self.retry, || {
            let model = Arc::clone(model);
            async move { model.generate(request).await }
        })
        .await
    }
}
