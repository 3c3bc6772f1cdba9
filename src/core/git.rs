//! Local git repository operations
//!
//! This module provides a wrapper around git2 for the reads noidea needs:
//! - Repository discovery and validation
//! - Remote URL lookup
//! - Staged and per-commit diffs
//! - Commit history and statistics for summaries
//! - Hook directory resolution

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Local, TimeZone};
use git2::{Commit, DiffFormat, DiffOptions, DiffStatsFormat, Repository, Sort, StatusOptions};

use crate::ai::context::stats;
use crate::error::{NoideaError, Result};

/// Width used when rendering `--stat` style output
const STAT_WIDTH: usize = 80;

/// One commit from the history
#[derive(Debug, Clone)]
pub struct CommitInfo {
    /// Full commit id
    pub id: String,
    /// First line of the message
    pub summary: String,
    /// Full message
    pub message: String,
    pub author: String,
    pub time: DateTime<Local>,
}

/// Wrapper for local git repository operations
pub struct GitRepository {
    repo: Repository,
}

impl GitRepository {
    /// Open the git repository in the current directory
    pub fn open_current_dir() -> Result<Self> {
        Self::discover(".")
    }

    /// Discover a git repository from the given path
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::discover(path).map_err(|_| NoideaError::NotGitRepository)?;
        Ok(Self { repo })
    }

    /// Check if the current directory is a git repository
    pub fn is_git_repository() -> bool {
        Repository::discover(".").is_ok()
    }

    /// Get the remote URL for a given remote name
    pub fn remote_url(&self, remote_name: &str) -> Result<String> {
        let remote = self.repo.find_remote(remote_name)?;
        remote
            .url()
            .map(|s| s.to_string())
            .ok_or(NoideaError::NoGitHubRemote)
    }

    /// Get the origin remote URL
    pub fn origin_url(&self) -> Result<String> {
        self.remote_url("origin")
    }

    /// Get the repository root directory
    pub fn root_dir(&self) -> Result<PathBuf> {
        self.repo
            .workdir()
            .map(|p| p.to_path_buf())
            .ok_or(NoideaError::NotGitRepository)
    }

    /// Name of the repository's root directory
    pub fn repo_name(&self) -> String {
        self.root_dir()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "repository".to_string())
    }

    /// Configured `user.name`, or "User"
    pub fn user_name(&self) -> String {
        self.repo
            .config()
            .and_then(|c| c.get_string("user.name"))
            .ok()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| "User".to_string())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Config
    // ─────────────────────────────────────────────────────────────────────────

    /// Read a boolean from the repository config
    pub fn config_bool(&self, key: &str) -> Option<bool> {
        self.repo.config().ok()?.get_bool(key).ok()
    }

    /// Write a boolean to the repository's local config
    pub fn set_local_config_bool(&self, key: &str, value: bool) -> Result<()> {
        let mut config = self.repo.config()?.open_level(git2::ConfigLevel::Local)?;
        config.set_bool(key, value)?;
        Ok(())
    }

    /// Directory hooks are installed into
    ///
    /// Respects `core.hooksPath`; a relative path is resolved from the
    /// repository root. Falls back to `<git dir>/hooks`.
    pub fn hooks_dir(&self) -> Result<PathBuf> {
        let configured = self
            .repo
            .config()
            .and_then(|c| c.get_path("core.hooksPath"))
            .ok();

        match configured {
            Some(path) if path.is_absolute() => Ok(path),
            Some(path) if !path.as_os_str().is_empty() => Ok(self.root_dir()?.join(path)),
            _ => Ok(self.repo.path().join("hooks")),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Diffs
    // ─────────────────────────────────────────────────────────────────────────

    /// Get the diff of staged changes
    ///
    /// Works before the first commit by diffing against an empty tree.
    pub fn staged_diff(&self) -> Result<String> {
        let head = match self.repo.head() {
            Ok(head) => Some(head.peel_to_tree()?),
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => None,
            Err(e) => return Err(e.into()),
        };
        let index = self.repo.index()?;

        let diff = self.repo.diff_tree_to_index(
            head.as_ref(),
            Some(&index),
            Some(&mut DiffOptions::new()),
        )?;

        patch_text(&diff)
    }

    /// Patch of a single commit against its first parent
    pub fn commit_diff(&self, id: &str) -> Result<String> {
        let commit = self.repo.revparse_single(id)?.peel_to_commit()?;
        let diff = self.commit_tree_diff(&commit)?;
        patch_text(&diff)
    }

    /// `--stat` summary of the last commit
    pub fn last_commit_stat(&self) -> Result<String> {
        let commit = self.repo.head()?.peel_to_commit()?;
        let diff = self.commit_tree_diff(&commit)?;
        let buf = diff
            .stats()?
            .to_buf(DiffStatsFormat::FULL, STAT_WIDTH)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn commit_tree_diff(&self, commit: &Commit<'_>) -> Result<git2::Diff<'_>> {
        let tree = commit.tree()?;
        let parent_tree = match commit.parent(0) {
            Ok(parent) => Some(parent.tree()?),
            Err(_) => None,
        };
        Ok(self.repo.diff_tree_to_tree(
            parent_tree.as_ref(),
            Some(&tree),
            Some(&mut DiffOptions::new()),
        )?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // History
    // ─────────────────────────────────────────────────────────────────────────

    /// Full message of the last commit
    pub fn last_commit_message(&self) -> Result<String> {
        let commit = self.repo.head()?.peel_to_commit()?;
        Ok(commit.message().unwrap_or("").trim().to_string())
    }

    /// Up to `limit` commits reachable from HEAD, newest first
    ///
    /// An empty repository yields no commits.
    pub fn recent_commits(&self, limit: usize) -> Result<Vec<CommitInfo>> {
        self.walk(|_| true, Some(limit))
    }

    /// Commits from the last `days` days, newest first
    pub fn commits_since(&self, days: i64) -> Result<Vec<CommitInfo>> {
        let cutoff = Local::now() - Duration::days(days);
        self.walk(|info| info.time >= cutoff, None)
    }

    fn walk(
        &self,
        keep: impl Fn(&CommitInfo) -> bool,
        limit: Option<usize>,
    ) -> Result<Vec<CommitInfo>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;
        match revwalk.push_head() {
            Ok(()) => {}
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => return Ok(Vec::new()),
            Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        }

        let mut commits = Vec::new();
        for oid in revwalk {
            if limit.is_some_and(|n| commits.len() >= n) {
                break;
            }
            let commit = self.repo.find_commit(oid?)?;
            let info = commit_info(&commit);
            if keep(&info) {
                commits.push(info);
            } else if limit.is_none() {
                // Time-sorted walk: everything after is older
                break;
            }
        }

        Ok(commits)
    }

    /// Aggregate statistics for a set of commits
    pub fn commit_stats(&self, commits: &[CommitInfo]) -> Result<BTreeMap<String, u64>> {
        let mut authors = BTreeSet::new();
        let mut files = 0u64;
        let mut insertions = 0u64;
        let mut deletions = 0u64;

        for info in commits {
            authors.insert(info.author.clone());
            let commit = self.repo.revparse_single(&info.id)?.peel_to_commit()?;
            let diff_stats = self.commit_tree_diff(&commit)?.stats()?;
            files += diff_stats.files_changed() as u64;
            insertions += diff_stats.insertions() as u64;
            deletions += diff_stats.deletions() as u64;
        }

        let mut map = BTreeMap::new();
        map.insert(stats::TOTAL_COMMITS.to_string(), commits.len() as u64);
        map.insert(stats::UNIQUE_AUTHORS.to_string(), authors.len() as u64);
        map.insert(stats::TOTAL_FILES_CHANGED.to_string(), files);
        map.insert(stats::TOTAL_INSERTIONS.to_string(), insertions);
        map.insert(stats::TOTAL_DELETIONS.to_string(), deletions);
        Ok(map)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Working tree
    // ─────────────────────────────────────────────────────────────────────────

    /// Paths with staged, unstaged or untracked changes, deduplicated
    pub fn changed_files(&self) -> Result<Vec<String>> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true);
        opts.recurse_untracked_dirs(true);
        opts.include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut opts))?;
        let mut seen = BTreeSet::new();
        let mut files = Vec::new();

        for entry in statuses.iter() {
            if entry.status().is_wt_deleted() || entry.status().is_index_deleted() {
                continue;
            }
            if let Some(path) = entry.path() {
                if seen.insert(path.to_string()) {
                    files.push(path.to_string());
                }
            }
        }

        Ok(files)
    }
}

fn commit_info(commit: &Commit<'_>) -> CommitInfo {
    let message = commit.message().unwrap_or("").trim().to_string();
    let summary = message.lines().next().unwrap_or("").trim().to_string();
    let time = Local
        .timestamp_opt(commit.time().seconds(), 0)
        .single()
        .unwrap_or_else(Local::now);

    CommitInfo {
        id: commit.id().to_string(),
        summary,
        message,
        author: commit.author().name().unwrap_or("unknown").to_string(),
        time,
    }
}

fn patch_text(diff: &git2::Diff<'_>) -> Result<String> {
    let mut diff_text = String::new();
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        match line.origin() {
            '+' | '-' | ' ' => diff_text.push(line.origin()),
            _ => {}
        }
        diff_text.push_str(&String::from_utf8_lossy(line.content()));
        true
    })?;
    Ok(diff_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;
    use std::fs;

    fn init_repo() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        {
            let mut config = repo.config().unwrap();
            config.set_str("user.name", "Test Dev").unwrap();
            config.set_str("user.email", "dev@example.com").unwrap();
        }
        (dir, repo)
    }

    fn commit_file(repo: &Repository, dir: &Path, name: &str, content: &str, message: &str) {
        fs::write(dir.join(name), content).unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = Signature::now("Test Dev", "dev@example.com").unwrap();
        let parents: Vec<Commit<'_>> = repo
            .head()
            .ok()
            .and_then(|h| h.peel_to_commit().ok())
            .into_iter()
            .collect();
        let parent_refs: Vec<&Commit<'_>> = parents.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
            .unwrap();
    }

    #[test]
    fn test_staged_diff_before_first_commit() {
        let (dir, repo) = init_repo();
        fs::write(dir.path().join("README.md"), "# Hello\n").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("README.md")).unwrap();
        index.write().unwrap();

        let git = GitRepository::discover(dir.path()).unwrap();
        let diff = git.staged_diff().unwrap();
        assert!(diff.contains("diff --git a/README.md b/README.md"));
        assert!(diff.contains("+# Hello"));
        assert!(git.recent_commits(5).unwrap().is_empty());
    }

    #[test]
    fn test_staged_diff_keeps_non_utf8_lines() {
        let (dir, repo) = init_repo();
        fs::write(dir.path().join("a.txt"), b"caf\xe9\nsecond\nthird\n").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("a.txt")).unwrap();
        index.write().unwrap();

        let git = GitRepository::discover(dir.path()).unwrap();
        let diff = git.staged_diff().unwrap();
        assert!(diff.contains("+caf\u{FFFD}\n+second\n+third\n"));
        assert_eq!(crate::ai::diff::analyze_diff(&diff).additions, 3);
    }

    #[test]
    fn test_history_and_stats() {
        let (dir, repo) = init_repo();
        commit_file(&repo, dir.path(), "a.txt", "one\n", "feat: add a");
        commit_file(&repo, dir.path(), "b.txt", "two\nthree\n", "docs: add b\n\nbody");

        let git = GitRepository::discover(dir.path()).unwrap();
        assert_eq!(git.last_commit_message().unwrap(), "docs: add b\n\nbody");
        assert_eq!(git.user_name(), "Test Dev");

        let commits = git.recent_commits(10).unwrap();
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].summary, "docs: add b");

        let week = git.commits_since(7).unwrap();
        let map = git.commit_stats(&week).unwrap();
        assert_eq!(map[stats::TOTAL_COMMITS], 2);
        assert_eq!(map[stats::UNIQUE_AUTHORS], 1);
        assert_eq!(map[stats::TOTAL_FILES_CHANGED], 2);
        assert_eq!(map[stats::TOTAL_INSERTIONS], 3);

        assert!(git.last_commit_stat().unwrap().contains("b.txt"));
        assert!(git.commit_diff(&commits[1].id).unwrap().contains("+one"));
    }

    #[test]
    fn test_hooks_dir_resolution() {
        let (dir, repo) = init_repo();
        let git = GitRepository::discover(dir.path()).unwrap();
        assert!(git.hooks_dir().unwrap().ends_with("hooks"));

        repo.config()
            .unwrap()
            .set_str("core.hooksPath", ".husky")
            .unwrap();
        let git = GitRepository::discover(dir.path()).unwrap();
        let hooks = git.hooks_dir().unwrap();
        assert!(hooks.ends_with(".husky"));
        assert!(hooks.starts_with(git.root_dir().unwrap()));
    }

    #[test]
    fn test_local_config_bool() {
        let (dir, _repo) = init_repo();
        let git = GitRepository::discover(dir.path()).unwrap();
        assert_eq!(git.config_bool("noidea.suggest"), None);
        git.set_local_config_bool("noidea.suggest", true).unwrap();
        assert_eq!(git.config_bool("noidea.suggest"), Some(true));
    }

    #[test]
    fn test_changed_files() {
        let (dir, repo) = init_repo();
        commit_file(&repo, dir.path(), "a.txt", "one\n", "init");
        fs::write(dir.path().join("a.txt"), "changed\n").unwrap();
        fs::write(dir.path().join("new.rs"), "fn main() {}\n").unwrap();

        let git = GitRepository::discover(dir.path()).unwrap();
        let files = git.changed_files().unwrap();
        assert!(files.contains(&"a.txt".to_string()));
        assert!(files.contains(&"new.rs".to_string()));
    }
}
