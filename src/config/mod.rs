//! Configuration
//!
//! Figment-merged settings: built-in defaults, the user config file, and
//! `STUDYWEAVE_*` environment variables, validated after load.

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{Config, ModelConfig, TaskSettings};
