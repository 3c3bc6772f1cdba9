//! Issue operations

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use octocrab::models::issues::Issue as GhIssue;
use octocrab::models::IssueState;
use octocrab::params;

use crate::error::{NoideaError, Result};
use crate::github::client::GitHubClient;
use crate::github::error_handler::{classify_github_error, is_not_found};

/// Issue list filter state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IssueFilter {
    #[default]
    Open,
    Closed,
    All,
}

impl From<IssueFilter> for params::State {
    fn from(state: IssueFilter) -> Self {
        match state {
            IssueFilter::Open => params::State::Open,
            IssueFilter::Closed => params::State::Closed,
            IssueFilter::All => params::State::All,
        }
    }
}

impl FromStr for IssueFilter {
    type Err = NoideaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(IssueFilter::Open),
            "closed" => Ok(IssueFilter::Closed),
            "all" => Ok(IssueFilter::All),
            other => Err(NoideaError::InvalidInput(format!(
                "Invalid state '{}'. Use open, closed or all.",
                other
            ))),
        }
    }
}

impl fmt::Display for IssueFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IssueFilter::Open => "open",
            IssueFilter::Closed => "closed",
            IssueFilter::All => "all",
        };
        f.write_str(s)
    }
}

/// The parts of a GitHub issue noidea displays
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub is_open: bool,
    pub url: String,
    pub author: String,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
    pub milestone: Option<String>,
    pub comments: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Issue {
    pub fn state(&self) -> &'static str {
        if self.is_open {
            "open"
        } else {
            "closed"
        }
    }
}

impl From<GhIssue> for Issue {
    fn from(issue: GhIssue) -> Self {
        Self {
            number: issue.number,
            title: issue.title,
            body: issue.body.unwrap_or_default(),
            is_open: issue.state == IssueState::Open,
            url: issue.html_url.to_string(),
            author: issue.user.login,
            labels: issue.labels.into_iter().map(|l| l.name).collect(),
            assignees: issue.assignees.into_iter().map(|a| a.login).collect(),
            milestone: issue.milestone.map(|m| m.title),
            comments: issue.comments,
            created_at: issue.created_at,
            updated_at: issue.updated_at,
        }
    }
}

/// Parameters for creating an issue
#[derive(Debug, Clone, Default)]
pub struct CreateIssueParams {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
}

/// Issue operations handler
pub struct IssueHandler<'a> {
    client: &'a GitHubClient,
}

impl<'a> IssueHandler<'a> {
    /// Create a new handler
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// List issues, most recently updated first; pull requests are skipped
    pub async fn list(&self, state: IssueFilter, limit: u8) -> Result<Vec<Issue>> {
        let page = self
            .client
            .issues()
            .list()
            .state(state.into())
            .sort(params::issues::Sort::Updated)
            .direction(params::Direction::Descending)
            .per_page(limit)
            .send()
            .await?;

        Ok(page
            .items
            .into_iter()
            .filter(|issue| issue.pull_request.is_none())
            .map(Issue::from)
            .collect())
    }

    /// Get a specific issue by number
    pub async fn get(&self, number: u64) -> Result<Issue> {
        match self.client.issues().get(number).await {
            Ok(issue) => Ok(issue.into()),
            Err(e) if is_not_found(&e) => Err(NoideaError::IssueNotFound(number)),
            Err(e) => Err(classify_github_error(e)),
        }
    }

    /// Create a new issue
    pub async fn create(&self, params: CreateIssueParams) -> Result<Issue> {
        let issues = self.client.issues();
        let mut builder = issues.create(&params.title).body(&params.body);

        if !params.labels.is_empty() {
            builder = builder.labels(params.labels.clone());
        }

        let issue = builder.send().await?;
        tracing::debug!("Created issue #{} in {}", issue.number, self.client.full_name());
        Ok(issue.into())
    }

    /// Add a comment to an issue
    pub async fn comment(&self, number: u64, body: &str) -> Result<()> {
        self.client
            .issues()
            .create_comment(number, body)
            .await
            .map_err(|e| {
                if is_not_found(&e) {
                    NoideaError::IssueNotFound(number)
                } else {
                    classify_github_error(e)
                }
            })?;
        Ok(())
    }

    /// Close an issue, posting `comment` first when given
    pub async fn close(&self, number: u64, comment: Option<&str>) -> Result<Issue> {
        if let Some(body) = comment.filter(|c| !c.trim().is_empty()) {
            self.comment(number, body).await?;
        }

        match self
            .client
            .issues()
            .update(number)
            .state(IssueState::Closed)
            .send()
            .await
        {
            Ok(issue) => Ok(issue.into()),
            Err(e) if is_not_found(&e) => Err(NoideaError::IssueNotFound(number)),
            Err(e) => Err(classify_github_error(e)),
        }
    }
}
