//! Commit context handed to prompt construction

use std::collections::BTreeMap;

use chrono::{DateTime, Local, Timelike};

/// Marker in the context message that selects on-demand analysis over a weekly summary
pub const ON_DEMAND_MARKER: &str = "On-Demand";

/// Named counters describing a range of commits
pub mod stats {
    pub const TOTAL_COMMITS: &str = "total_commits";
    pub const UNIQUE_AUTHORS: &str = "unique_authors";
    pub const TOTAL_FILES_CHANGED: &str = "total_files_changed";
    pub const TOTAL_INSERTIONS: &str = "total_insertions";
    pub const TOTAL_DELETIONS: &str = "total_deletions";
}

/// Everything known about the commit (or commit range) being discussed
#[derive(Debug, Clone)]
pub struct CommitContext {
    pub message: String,
    pub timestamp: DateTime<Local>,
    pub diff: Option<String>,
    /// Prior commit messages, most recent first
    pub commit_history: Vec<String>,
    pub commit_stats: BTreeMap<String, u64>,
}

impl CommitContext {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timestamp: Local::now(),
            diff: None,
            commit_history: Vec::new(),
            commit_stats: BTreeMap::new(),
        }
    }

    pub fn with_diff(mut self, diff: impl Into<String>) -> Self {
        let diff = diff.into();
        self.diff = if diff.trim().is_empty() { None } else { Some(diff) };
        self
    }

    pub fn with_history(mut self, history: Vec<String>) -> Self {
        self.commit_history = history;
        self
    }

    pub fn with_stats(mut self, stats: BTreeMap<String, u64>) -> Self {
        self.commit_stats = stats;
        self
    }

    /// Counter value, zero when absent
    pub fn stat(&self, key: &str) -> u64 {
        self.commit_stats.get(key).copied().unwrap_or(0)
    }

    pub fn is_on_demand(&self) -> bool {
        self.message.contains(ON_DEMAND_MARKER)
    }

    pub fn time_of_day(&self) -> &'static str {
        time_of_day(self.timestamp.hour())
    }
}

/// Coarse description of an hour of the day
pub fn time_of_day(hour: u32) -> &'static str {
    match hour {
        5..=11 => "morning",
        12..=16 => "afternoon",
        17..=20 => "evening",
        _ => "night",
    }
}

/// Number commit messages as `1. msg` lines
pub fn format_commit_list(commits: &[String]) -> String {
    commits
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}. {}\n", i + 1, c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_of_day() {
        assert_eq!(time_of_day(3), "night");
        assert_eq!(time_of_day(9), "morning");
        assert_eq!(time_of_day(13), "afternoon");
        assert_eq!(time_of_day(19), "evening");
        assert_eq!(time_of_day(23), "night");
    }

    #[test]
    fn test_on_demand_marker() {
        assert!(CommitContext::new("On-Demand Analysis").is_on_demand());
        assert!(!CommitContext::new("Weekly Summary").is_on_demand());
    }

    #[test]
    fn test_blank_diff_is_none() {
        let ctx = CommitContext::new("x").with_diff("  \n");
        assert!(ctx.diff.is_none());
    }

    #[test]
    fn test_format_commit_list() {
        let list = format_commit_list(&["feat: a".to_string(), "fix: b".to_string()]);
        assert_eq!(list, "1. feat: a\n2. fix: b\n");
        assert_eq!(format_commit_list(&[]), "");
    }

    #[test]
    fn test_missing_stat_is_zero() {
        let ctx = CommitContext::new("x");
        assert_eq!(ctx.stat(stats::TOTAL_COMMITS), 0);
    }
}
