//! Custom error types for noidea
//!
//! User-friendly error messages for all failure scenarios.

use thiserror::Error;

/// Main error type for the noidea application
#[derive(Error, Debug)]
pub enum NoideaError {
    /// Not running in a git repository
    #[error("This directory is not a git repository.\n\n  → Run 'git init' to create one, or navigate to an existing git project.")]
    NotGitRepository,

    /// No GitHub remote found
    #[error("No GitHub remote found in this repository.\n\n  → Make sure 'origin' points to a GitHub URL.\n  → Run 'git remote -v' to check your remotes.")]
    NoGitHubRemote,

    /// Invalid GitHub URL format
    #[error("Cannot parse GitHub URL: {0}\n\n  → Expected format: https://github.com/owner/repo or git@github.com:owner/repo")]
    InvalidGitHubUrl(String),

    /// No GitHub token available
    #[error("GitHub authentication is not configured.\n\n  → Run 'noidea github-auth login' or set GITHUB_TOKEN.")]
    NotAuthenticated,

    /// Token validation failed
    #[error("GitHub authentication failed: {0}\n\n  → Try running 'noidea github-auth login' again.")]
    AuthenticationFailed(String),

    /// GitHub API error
    #[error("GitHub API request failed: {0}\n\n  → Check your internet connection.\n  → Your token may lack the 'repo' scope - try 'noidea github-auth logout' then 'noidea github-auth login'.")]
    GitHubApi(String),

    /// Issue does not exist
    #[error("Issue #{0} does not exist.\n\n  → Run 'noidea issue list' to see available issues.")]
    IssueNotFound(u64),

    /// LLM provider call failed
    #[error("{provider} API error: {message}")]
    Provider {
        /// Display name of the provider
        provider: String,
        /// Underlying failure
        message: String,
    },

    /// No API key for the configured provider
    #[error("No API key configured for {0}.\n\n  → Run 'noidea config set api-key YOUR_KEY' or set NOIDEA_API_KEY.")]
    ApiKeyMissing(String),

    /// Git operation error
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    /// Hook installation error
    #[error("Cannot install git hook: {0}\n\n  → Check that the hooks directory is writable.")]
    Hook(String),

    /// Credential storage error
    #[error("Cannot access secure storage: {0}\n\n  → On macOS: Make sure Keychain Access is available.\n  → On Linux: Ensure a secret service (like gnome-keyring) is running.")]
    Credential(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),

    /// Network request error
    #[error("Network request failed: {0}\n\n  → Check your internet connection.")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("Failed to parse response: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML serialization/deserialization error
    #[error("Configuration file is invalid: {0}")]
    Toml(String),

    /// Invalid input from user
    #[error("{0}")]
    InvalidInput(String),

    /// Operation cancelled by user
    #[error("Operation cancelled.")]
    Cancelled,

    /// Generic error with custom message
    #[error("{0}")]
    Custom(String),
}

impl NoideaError {
    /// Build a provider error from any displayable failure
    pub fn provider(provider: impl Into<String>, message: impl std::fmt::Display) -> Self {
        NoideaError::Provider {
            provider: provider.into(),
            message: message.to_string(),
        }
    }
}

impl From<keyring::Error> for NoideaError {
    fn from(err: keyring::Error) -> Self {
        NoideaError::Credential(err.to_string())
    }
}

impl From<toml::de::Error> for NoideaError {
    fn from(err: toml::de::Error) -> Self {
        NoideaError::Toml(err.to_string())
    }
}

impl From<toml::ser::Error> for NoideaError {
    fn from(err: toml::ser::Error) -> Self {
        NoideaError::Toml(err.to_string())
    }
}

impl From<octocrab::Error> for NoideaError {
    fn from(err: octocrab::Error) -> Self {
        crate::github::error_handler::classify_github_error(err)
    }
}

/// Result type alias using NoideaError
pub type Result<T> = std::result::Result<T, NoideaError>;
