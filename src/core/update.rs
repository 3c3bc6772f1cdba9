//! Release checking for noidea
//!
//! Looks up the latest GitHub release and compares it with the running
//! version. Checks are throttled through a small JSON state file so the
//! background check runs at most once a day.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::core::config::Config;
use crate::error::{NoideaError, Result};

/// GitHub repository for noidea releases
const GITHUB_REPO: &str = "AccursedGalaxy/noidea";

const GITHUB_API_BASE: &str = "https://api.github.com";

/// Minimum time between background checks
const CHECK_INTERVAL_HOURS: i64 = 24;

/// Persistent update state stored between sessions
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdatePersistentState {
    /// Last time we checked for updates (RFC 3339)
    pub last_check: Option<String>,
}

impl UpdatePersistentState {
    /// Load state from update state file
    pub fn load() -> Result<Self> {
        let path = Self::state_path()?;
        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let state: Self = serde_json::from_str(&contents)?;
            Ok(state)
        } else {
            Ok(Self::default())
        }
    }

    /// Save state to update state file
    pub fn save(&self) -> Result<()> {
        let path = Self::state_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(&path, contents)?;
        Ok(())
    }

    fn state_path() -> Result<PathBuf> {
        Ok(Config::config_dir()?.join("update-state.json"))
    }

    /// Mark last check time as now
    pub fn mark_checked(&mut self) {
        self.last_check = Some(Utc::now().to_rfc3339());
    }

    /// Check if we should check for updates (throttle: once per day)
    pub fn should_check(&self) -> bool {
        let Some(last) = &self.last_check else {
            return true;
        };

        let Ok(last_dt) = DateTime::parse_from_rfc3339(last) else {
            return true;
        };

        let elapsed = Utc::now().signed_duration_since(last_dt.with_timezone(&Utc));
        elapsed.num_hours() >= CHECK_INTERVAL_HOURS
    }
}

/// Get the current application version from Cargo.toml
pub fn current_version() -> Version {
    Version::parse(env!("CARGO_PKG_VERSION")).unwrap_or_else(|_| Version::new(0, 0, 0))
}

/// Check if a version is a pre-release (skip these)
pub fn is_prerelease(version: &Version) -> bool {
    !version.pre.is_empty()
}

/// GitHub release information
#[derive(Debug, Deserialize)]
pub struct GitHubRelease {
    pub tag_name: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub draft: bool,
}

/// Result of checking for updates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateCheckResult {
    /// No update available
    UpToDate,
    /// Newer release with its page URL
    Available { version: Version, url: String },
}

/// Compare a release against the running version
pub fn evaluate_release(release: &GitHubRelease, current: &Version) -> Result<UpdateCheckResult> {
    if release.draft || release.prerelease {
        return Ok(UpdateCheckResult::UpToDate);
    }

    let version_str = release.tag_name.trim().trim_start_matches('v');
    let latest = Version::parse(version_str)
        .map_err(|e| NoideaError::Custom(format!("Invalid version in release: {}", e)))?;

    if is_prerelease(&latest) || latest <= *current {
        return Ok(UpdateCheckResult::UpToDate);
    }

    Ok(UpdateCheckResult::Available {
        version: latest,
        url: release.html_url.clone(),
    })
}

/// Check GitHub for the latest release
pub async fn check_for_update() -> Result<UpdateCheckResult> {
    check_for_update_at(GITHUB_API_BASE, &current_version()).await
}

/// Check a GitHub-compatible API at `api_base` for a release newer than `current`
pub async fn check_for_update_at(api_base: &str, current: &Version) -> Result<UpdateCheckResult> {
    let client = Client::builder()
        .user_agent(format!("noidea/{}", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(10))
        .build()?;

    let url = format!(
        "{}/repos/{}/releases/latest",
        api_base.trim_end_matches('/'),
        GITHUB_REPO
    );

    let response = client
        .get(&url)
        .header("Accept", "application/vnd.github.v3+json")
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(NoideaError::Custom(format!(
            "Failed to fetch release info (status {})",
            response.status()
        )));
    }

    let release: GitHubRelease = response.json().await?;
    tracing::debug!("Latest release tag: {}", release.tag_name);
    evaluate_release(&release, current)
}
