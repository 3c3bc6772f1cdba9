//! AI integration module
//!
//! This module provides the OpenAI-compatible completion client and
//! everything built on top of it:
//! - Commit message suggestions
//! - Personality-driven commit feedback
//! - Weekly summaries and on-demand commit analysis
//! - Issue and comment drafting

pub mod client;
pub mod context;
pub mod diff;
pub mod extract;
pub mod feedback;
pub mod personality;
pub mod prompts;
pub mod trimmer;

pub use client::{ChatClient, CompletionProvider, CompletionRequest, ProviderConfig, ProviderTable};
pub use context::CommitContext;
pub use feedback::{Assistant, FeedbackEngine, LocalFeedback};
pub use personality::{Personality, PersonalitySet};
