//! GitHub API client wrapper using octocrab

use octocrab::Octocrab;
use secrecy::{ExposeSecret, SecretString};

use crate::core::credentials::CredentialStore;
use crate::core::repository::RepositoryContext;
use crate::error::Result;

/// GitHub API client wrapper
pub struct GitHubClient {
    /// The octocrab instance
    inner: Octocrab,
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
}

impl GitHubClient {
    /// Create a new GitHub client for the given repository
    ///
    /// The token comes from `GITHUB_TOKEN` or the system keyring.
    pub fn new(owner: String, repo: String) -> Result<Self> {
        let token = CredentialStore::require_github_token()?;
        Self::with_token(&token, owner, repo)
    }

    /// Create a client for the repository detected from the current directory
    pub fn for_context(context: &RepositoryContext) -> Result<Self> {
        Self::new(context.owner.clone(), context.name.clone())
    }

    /// Create a client with an explicit token
    pub fn with_token(token: &SecretString, owner: String, repo: String) -> Result<Self> {
        let octocrab = Octocrab::builder()
            .personal_token(token.expose_secret().to_string())
            .build()?;

        Ok(Self {
            inner: octocrab,
            owner,
            repo,
        })
    }

    /// Get the inner octocrab instance
    pub fn octocrab(&self) -> &Octocrab {
        &self.inner
    }

    /// Get issues handler for this repository
    pub fn issues(&self) -> octocrab::issues::IssueHandler<'_> {
        self.inner.issues(&self.owner, &self.repo)
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}
