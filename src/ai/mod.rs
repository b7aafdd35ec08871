//! AI Integration Layer
//!
//! Credential management, retry execution, prompt construction, response
//! recovery, and the model invocation boundary.

pub mod keys;
pub mod prompt;
pub mod provider;
pub mod recovery;
pub mod retry;

pub use keys::{
    CredentialStore, FileCredentialStore, KeyManager, KeySource, MemoryCredentialStore,
};
pub use provider::{
    ChatRole, ChatTurn, FragmentStream, GeminiModel, GenerativeModel, ModelRequest, SharedModel,
};
pub use recovery::recover;
pub use retry::{RetryPolicy, with_retry};
