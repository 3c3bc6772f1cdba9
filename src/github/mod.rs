//! GitHub API integration module
//!
//! This module provides all GitHub-related functionality:
//! - Authenticated client construction
//! - Issue listing, creation, comments and closing
//! - Error classification

pub mod client;
pub mod error_handler;
pub mod issues;

pub use client::GitHubClient;
pub use error_handler::{classify_github_error, open_browser};
pub use issues::{CreateIssueParams, Issue, IssueFilter, IssueHandler};
