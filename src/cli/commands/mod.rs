//! CLI Subcommands

pub mod ask;
pub mod chat;
pub mod config;
pub mod evaluate;
pub mod explain;
pub mod key;
pub mod lesson;
pub mod proofread;
pub mod quiz;
pub mod search;
pub mod structure;
pub mod summarize;
