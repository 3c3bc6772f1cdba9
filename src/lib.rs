//! noidea - a Git companion with a judgmental Moai
//!
//! This library provides AI commit message suggestions, post-commit feedback,
//! activity summaries, GitHub issue management and Git hook installation.

pub mod ai;
pub mod cli;
pub mod core;
pub mod error;
pub mod github;

pub use error::{NoideaError, Result};
