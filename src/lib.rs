//! studyweave - AI-Driven Interactive Lesson Generator
//!
//! Turns extracted document text into AI-generated study aids: chapter
//! structure, interactive lessons, quizzes, answer feedback, summaries,
//! proofreading, search-augmented materials, and streaming chat.
//!
//! ## Pipeline
//!
//! caller → task orchestrator → prompt builder → retry executor → model
//! client → response recovery → domain repair → caller
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use studyweave::{ConfigLoader, FileCredentialStore, KeyManager, TaskEngine};
//!
//! let config = ConfigLoader::load()?;
//! let keys = Arc::new(KeyManager::new(
//!     config.model.clone(),
//!     Box::new(FileCredentialStore::open_default()?),
//! ));
//! let engine = TaskEngine::new(keys, config.tasks.clone());
//! let chapters = engine.analyze_document_structure(&pages).await?;
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: credential management, retry, prompts, recovery, model client
//! - [`tasks`]: the public task orchestrators
//! - [`types`]: transient domain model and the unified error type
//! - [`config`]: figment-merged configuration

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod tasks;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, ModelConfig, TaskSettings};

// Error Types
pub use types::error::{RecoveryError, Result, StudyError};

// Domain Types
pub use types::{
    AiCorrection, AnswerValue, BookCategory, BookTitle, Chapter, ContentBlock, FeedbackItem,
    IncorrectAnswer, InteractiveLesson, Lesson, PageText, SearchFilter, SearchResult,
    SmartSearchResult, UserAnswer,
};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{
    CredentialStore,
    FileCredentialStore,
    FragmentStream,
    GeminiModel,
    GenerativeModel,
    // Key management
    KeyManager,
    KeySource,
    MemoryCredentialStore,
    ModelRequest,
    // Retry
    RetryPolicy,
    // Recovery
    recover,
    with_retry,
};

// =============================================================================
// Task Re-exports
// =============================================================================

pub use tasks::{ChatSession, StreamingMessage, TaskEngine};
