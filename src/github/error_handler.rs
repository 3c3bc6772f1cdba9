//! GitHub API error detection and classification
//!
//! Parses octocrab errors to provide actionable user guidance.

use once_cell::sync::Lazy;
use regex::Regex;
use std::process::Command;

use crate::error::NoideaError;

/// Pulls the human-readable message out of a GitHub error body
static GITHUB_MESSAGE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"message: "([^"]+)""#).expect("Invalid regex pattern for GitHub error message")
});

/// Classifies an octocrab error into a more specific NoideaError if possible
pub fn classify_github_error(err: octocrab::Error) -> NoideaError {
    // Display only returns "GitHub", the details are in Debug
    let error_message = format!("{:?}", err);
    classify_message(&error_message)
}

fn classify_message(error_message: &str) -> NoideaError {
    if is_bad_credentials(error_message) {
        return NoideaError::AuthenticationFailed(
            "GitHub rejected the token (bad credentials).".to_string(),
        );
    }

    if is_rate_limit_error(error_message) {
        return NoideaError::GitHubApi(
            "API rate limit exceeded. Please wait a few minutes and try again.".to_string(),
        );
    }

    if is_not_found_error(error_message) {
        return NoideaError::GitHubApi(
            "Not found. The repository may be private or you may not have access.".to_string(),
        );
    }

    let summary = GITHUB_MESSAGE_PATTERN
        .captures(error_message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| error_message.to_string());

    NoideaError::GitHubApi(summary)
}

/// Whether an octocrab error is a 404
pub fn is_not_found(err: &octocrab::Error) -> bool {
    is_not_found_error(&format!("{:?}", err))
}

fn is_bad_credentials(error_message: &str) -> bool {
    error_message.contains("Bad credentials")
}

/// Check if error is a rate limit error
fn is_rate_limit_error(error_message: &str) -> bool {
    error_message.contains("rate limit")
        || (error_message.contains("403") && error_message.contains("limit exceeded"))
}

/// Check if error is a 404 not found
fn is_not_found_error(error_message: &str) -> bool {
    error_message.contains("404") || error_message.contains("Not Found")
}

/// Attempt to open a URL in the default browser
///
/// Returns true if the browser was successfully launched, false otherwise.
#[allow(unused_variables)]
pub fn open_browser(url: &str) -> bool {
    #[cfg(target_os = "macos")]
    {
        Command::new("open").arg(url).spawn().is_ok()
    }
    #[cfg(target_os = "linux")]
    {
        Command::new("xdg-open").arg(url).spawn().is_ok()
    }
    #[cfg(target_os = "windows")]
    {
        Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .is_ok()
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_detection() {
        assert!(is_rate_limit_error("API rate limit exceeded"));
        assert!(is_rate_limit_error("403 limit exceeded"));
        assert!(!is_rate_limit_error("Some other error"));
    }

    #[test]
    fn test_not_found_detection() {
        assert!(is_not_found_error("404 Not Found"));
        assert!(is_not_found_error("Resource Not Found"));
        assert!(!is_not_found_error("Some other error"));
    }

    #[test]
    fn test_bad_credentials_is_auth_failure() {
        let err = classify_message(r#"GitHub { source: GitHubError { message: "Bad credentials" } }"#);
        assert!(matches!(err, NoideaError::AuthenticationFailed(_)));
    }

    #[test]
    fn test_message_extracted_from_debug_output() {
        let err = classify_message(
            r#"GitHub { source: GitHubError { status_code: 422, message: "Validation Failed", errors: None } }"#,
        );
        match err {
            NoideaError::GitHubApi(msg) => assert_eq!(msg, "Validation Failed"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
