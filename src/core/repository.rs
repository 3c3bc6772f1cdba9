//! Repository context detection
//!
//! This module handles detecting the GitHub repository from the current
//! git repository's remote URL and extracting owner/repo information.

use url::Url;

use crate::core::git::GitRepository;
use crate::error::{NoideaError, Result};

/// Hosts accepted as GitHub remotes
const GITHUB_HOST: &str = "github.com";

/// Repository context containing owner and repo name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryContext {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl RepositoryContext {
    /// Detect repository context from the current directory
    pub fn detect() -> Result<Self> {
        Self::from_git(&GitRepository::open_current_dir()?)
    }

    /// Detect repository context from an opened repository's origin
    pub fn from_git(git_repo: &GitRepository) -> Result<Self> {
        let remote_url = git_repo
            .origin_url()
            .map_err(|_| NoideaError::NoGitHubRemote)?;
        let (owner, name) = parse_github_url(&remote_url)?;
        Ok(Self { owner, name })
    }

    /// Get the full repository name (owner/name)
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Get the GitHub URL for this repository
    pub fn github_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.name)
    }
}

/// Parse a GitHub URL to extract owner and repository name
///
/// Supports HTTPS, SSH and bare host formats:
/// - `https://github.com/owner/repo.git`
/// - `http://github.com/owner/repo`
/// - `git@github.com:owner/repo.git`
/// - `ssh://git@github.com/owner/repo.git`
/// - `github.com/owner/repo`
pub fn parse_github_url(url: &str) -> Result<(String, String)> {
    let url = url.trim();

    if let Some(path) = url.strip_prefix("git@github.com:") {
        return parse_owner_repo_path(path);
    }

    if let Some(path) = url.strip_prefix("github.com/") {
        return parse_owner_repo_path(path);
    }

    if let Ok(parsed) = Url::parse(url) {
        if parsed.host_str() == Some(GITHUB_HOST) {
            return parse_owner_repo_path(parsed.path().trim_start_matches('/'));
        }
    }

    Err(NoideaError::InvalidGitHubUrl(url.to_string()))
}

/// Parse owner/repo from a path string
fn parse_owner_repo_path(path: &str) -> Result<(String, String)> {
    let path = path.trim_end_matches('/').trim_end_matches(".git");
    let mut parts = path.split('/');
    match (parts.next(), parts.next()) {
        (Some(owner), Some(repo)) if !owner.is_empty() && !repo.is_empty() => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(NoideaError::InvalidGitHubUrl(path.to_string())),
    }
}
