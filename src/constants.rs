//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Retry executor constants
pub mod retry {
    /// Maximum attempts per model call
    pub const MAX_ATTEMPTS: u32 = 3;

    /// Base delay for linear backoff (milliseconds); attempt N waits N * base
    pub const BASE_DELAY_MS: u64 = 1_000;

    /// Whole-round-trip attempts for the large question-generation batch
    /// (prompt + call + recovery, not just the HTTP request)
    pub const GENERATION_ROUND_TRIPS: u32 = 3;

    /// Base delay between question-generation round trips (milliseconds)
    pub const GENERATION_ROUND_TRIP_DELAY_MS: u64 = 500;
}

/// Per-task input budgets. Different tasks see different slices of the
/// document; oversized input is truncated on a character boundary before the
/// prompt is assembled.
pub mod budget {
    /// Pages fed to document-structure detection
    pub const STRUCTURE_MAX_PAGES: usize = 600;

    /// Chapter preview for lesson-boundary detection (characters)
    pub const LESSON_SPLIT_MAX_CHARS: usize = 50_000;

    /// Lesson text for interactive-lesson generation (characters)
    pub const LESSON_MAX_CHARS: usize = 40_000;

    /// Lesson text for question generation (characters)
    pub const QUESTION_SOURCE_MAX_CHARS: usize = 25_000;

    /// Single-page tasks: per-page questions and page explanation (characters)
    pub const PAGE_TASK_MAX_CHARS: usize = 15_000;

    /// Document context attached to chat sessions and in-document search
    /// (characters)
    pub const CHAT_CONTEXT_MAX_CHARS: usize = 30_000;
}

/// Generation batch sizes
pub mod generation {
    /// Questions in the initial full-lesson quiz
    pub const INITIAL_QUESTION_COUNT: usize = 50;

    /// Questions per single page
    pub const PAGE_QUESTION_COUNT: usize = 10;

    /// Additional questions per "more questions" request
    pub const MORE_QUESTION_COUNT: usize = 10;

    /// Target summary length as a fraction of the source word count
    pub const SUMMARY_RATIO: f64 = 0.25;

    /// Follow-up questions suggested by in-document search
    pub const FOLLOW_UP_COUNT: usize = 3;
}

/// Network constants
pub mod network {
    /// Default model request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

    /// Buffered fragments in a streaming-chat channel before backpressure
    pub const STREAM_CHANNEL_CAPACITY: usize = 16;
}
