//! Prompt construction for every AI task
//!
//! [`build`] turns a [`CommitContext`], a [`Personality`] and a [`Task`] into
//! the system/user prompt pair plus decoding parameters. The context message
//! carries the user's input for every task: the commit message for feedback,
//! the description for a new issue, the requested topic for a comment.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use crate::ai::context::{format_commit_list, stats, CommitContext};
use crate::ai::diff::{analyze_diff, smart_truncate_diff};
use crate::ai::personality::{Personality, PromptVars};
use crate::ai::trimmer::trim_content;

/// Largest diff embedded verbatim in a prompt
pub const MAX_DIFF_CHARS: usize = 8000;

/// Largest file excerpt embedded in an issue prompt
const MAX_FILE_EXCERPT_CHARS: usize = 1000;

const COMMIT_SYSTEM_PROMPT: &str = "\
You are a Git expert who writes clear, concise, and descriptive commit messages.
Your task is to suggest a high-quality commit message based on the staged changes.
Follow these guidelines:
1. IMPORTANT: Focus primarily on the ACTUAL CHANGES in the diff, not on past commit patterns
2. When changes span MULTIPLE CATEGORIES (docs, code, build files, etc.), reflect ALL major aspects
3. Use the conventional commits format (type: description) when appropriate
   - docs: for documentation changes
   - feat: for new features
   - fix: for bug fixes
   - refactor: for code restructuring without behavior changes
   - style: for formatting/style changes
   - test: for adding or fixing tests
   - chore: for routine maintenance tasks
   - build: for changes to build system or dependencies
4. For mixed changes, choose the most significant type or use a broader type like \"feat\" or \"chore\"
5. When changes involve multiple components use a scope that covers all of them (e.g., \"build+docs\")
6. Be specific about what changed
7. Keep the first line under 72 characters
8. Use present tense (e.g., \"add feature\" not \"added feature\")
9. IMPORTANT: Respond with ONLY the commit message itself, with no explanations, reasoning, or markdown formatting";

const ISSUE_SYSTEM_PROMPT: &str = "\
You are a helpful assistant that writes clear, well-structured GitHub issues.
Given a short description, write an issue consisting of:
1. A concise, descriptive title on the first line
2. A line containing only ---
3. A Markdown body with these sections:
## Description
## Expected Behavior
## Current Behavior
## Possible Solution
## Steps to Reproduce
Use any referenced code to make the issue specific. Do not invent details the input does not support.";

const COMMENT_SYSTEM_PROMPT: &str = "\
You are a helpful assistant that writes clear, professional GitHub issue comments.
Keep the comment focused on the request and relevant to the issue.
Use Markdown where it helps readability. Do not restate the whole issue description.";

const ON_DEMAND_SYSTEM_PROMPT: &str = "\
You are an insightful Git expert who analyzes code practices and commit patterns.
Your task is to provide targeted, actionable feedback on the specific set of commits being reviewed.
Focus on identifying patterns, potential issues, and specific suggestions for improvement.
Consider commit message quality, code organization, and development workflow.
Your response should be 2-4 paragraphs with useful observations and actionable recommendations.
If diffs are provided, focus your analysis on the actual code changes too.";

const WEEKLY_SYSTEM_PROMPT: &str = "\
You are an insightful Git expert who analyzes commit patterns.
Provide a thoughtful, detailed analysis of the commit history.
Focus on patterns, trends, and actionable insights.
Your response should be 3-5 paragraphs with useful observations and suggestions.";

/// Kind of prompt being built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    CommitSuggestion,
    Feedback,
    WeeklySummary,
    OnDemandAnalysis,
    IssueCreate,
    IssueComment,
}

/// Extra inputs for issue creation
#[derive(Debug, Clone, Default)]
pub struct IssueDraft {
    pub owner: String,
    pub repo: String,
    /// Referenced file contents keyed by path
    pub files: BTreeMap<String, String>,
    pub additional_context: Option<String>,
}

/// Extra inputs for an issue comment
#[derive(Debug, Clone, Default)]
pub struct CommentDraft {
    pub issue_number: u64,
    pub issue_title: String,
    pub issue_body: String,
    pub files: BTreeMap<String, String>,
}

/// Task to build a prompt for
#[derive(Debug, Clone)]
pub enum Task<'a> {
    /// `max_diff_chars` bounds only the embedded diff, not the analysis
    CommitSuggestion {
        max_diff_chars: usize,
    },
    Feedback {
        username: &'a str,
        repo_name: &'a str,
    },
    /// Weekly summary or on-demand analysis, chosen by the context marker
    Summary,
    IssueCreate(&'a IssueDraft),
    IssueComment(&'a CommentDraft),
}

/// System and user prompts with decoding parameters
#[derive(Debug, Clone, PartialEq)]
pub struct PromptPair {
    pub kind: TaskKind,
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Build the prompt pair for a task
pub fn build(task: &Task<'_>, ctx: &CommitContext, personality: &Personality) -> PromptPair {
    match task {
        Task::CommitSuggestion { max_diff_chars } => commit_suggestion(ctx, *max_diff_chars),
        Task::Feedback {
            username,
            repo_name,
        } => feedback(ctx, personality, username, repo_name),
        Task::Summary => summary(ctx, personality),
        Task::IssueCreate(draft) => issue_create(ctx, draft),
        Task::IssueComment(draft) => issue_comment(ctx, draft),
    }
}

/// Commit suggestions ignore the personality entirely
fn commit_suggestion(ctx: &CommitContext, max_diff_chars: usize) -> PromptPair {
    let diff = ctx.diff.as_deref().unwrap_or("");
    let analysis = analyze_diff(diff);

    let diff_context = format!(
        "Here's the current diff of staged changes:\n\n{}\n\nAnalysis of changes:\n{}",
        smart_truncate_diff(diff, max_diff_chars.min(MAX_DIFF_CHARS)),
        analysis.render()
    );

    let user = format!(
        "I need a commit message for these staged changes.\n\n\
         {}\n\
         Past commit messages for limited context (do not rely heavily on these patterns):\n\
         {}\n\
         Based primarily on the ACTUAL CHANGES shown above, suggest a concise, descriptive \
         commit message that accurately describes what was modified:",
        diff_context,
        format_commit_list(&ctx.commit_history)
    );

    PromptPair {
        kind: TaskKind::CommitSuggestion,
        system: COMMIT_SYSTEM_PROMPT.to_string(),
        user,
        temperature: 0.3,
        max_tokens: 150,
    }
}

fn feedback(
    ctx: &CommitContext,
    personality: &Personality,
    username: &str,
    repo_name: &str,
) -> PromptPair {
    let diff = ctx
        .diff
        .as_deref()
        .map(|d| smart_truncate_diff(d, MAX_DIFF_CHARS))
        .unwrap_or_default();
    let history = format_commit_list(&ctx.commit_history);

    let user = personality.render_user_prompt(&PromptVars {
        message: &ctx.message,
        time_of_day: ctx.time_of_day(),
        diff: &diff,
        username,
        repo_name,
        commit_history: &history,
    });

    PromptPair {
        kind: TaskKind::Feedback,
        system: personality.system_prompt.clone(),
        user,
        temperature: personality.temperature,
        max_tokens: personality.max_tokens,
    }
}

fn summary(ctx: &CommitContext, personality: &Personality) -> PromptPair {
    let on_demand = ctx.is_on_demand();
    let kind = if on_demand {
        TaskKind::OnDemandAnalysis
    } else {
        TaskKind::WeeklySummary
    };

    // One-liner personalities cannot carry a multi-paragraph analysis
    let system = if personality.is_one_liner() {
        if on_demand {
            ON_DEMAND_SYSTEM_PROMPT.to_string()
        } else {
            WEEKLY_SYSTEM_PROMPT.to_string()
        }
    } else {
        personality.system_prompt.clone()
    };

    let commits = format_commit_list(&ctx.commit_history);
    let user = if on_demand {
        let diff_section = ctx
            .diff
            .as_deref()
            .map(|d| {
                format!(
                    "Code changes (diff context):\n{}",
                    smart_truncate_diff(d, MAX_DIFF_CHARS)
                )
            })
            .unwrap_or_default();
        format!(
            "I'd like you to analyze this specific set of Git commits.\n\n\
             Commit messages:\n{}\n\
             Commit statistics:\n\
             - Total commits: {}\n\
             - Files changed: {}\n\
             - Lines added: {}\n\
             - Lines deleted: {}\n\n\
             {}\n\n\
             Please provide targeted feedback about:\n\
             1. Code quality patterns visible in these commits\n\
             2. Commit message quality and clarity\n\
             3. Specific suggestions for improvement\n\
             4. Best practices that could be applied\n\n\
             Focus on giving actionable, specific feedback for these particular commits:",
            commits,
            ctx.stat(stats::TOTAL_COMMITS),
            ctx.stat(stats::TOTAL_FILES_CHANGED),
            ctx.stat(stats::TOTAL_INSERTIONS),
            ctx.stat(stats::TOTAL_DELETIONS),
            diff_section
        )
    } else {
        format!(
            "I'd like you to analyze my Git commit history from the past week.\n\n\
             Commit messages:\n{}\n\
             Commit statistics:\n\
             - Total commits: {}\n\
             - Unique authors: {}\n\
             - Files changed: {}\n\
             - Lines added: {}\n\
             - Lines deleted: {}\n\n\
             Please provide insights about:\n\
             1. Commit message patterns and quality\n\
             2. Work focus areas (based on commit messages)\n\
             3. Time distribution patterns\n\
             4. Suggestions for improving workflow or commit habits\n\n\
             Respond with thoughtful analysis and actionable suggestions:",
            commits,
            ctx.stat(stats::TOTAL_COMMITS),
            ctx.stat(stats::UNIQUE_AUTHORS),
            ctx.stat(stats::TOTAL_FILES_CHANGED),
            ctx.stat(stats::TOTAL_INSERTIONS),
            ctx.stat(stats::TOTAL_DELETIONS)
        )
    };

    PromptPair {
        kind,
        system,
        user,
        temperature: personality.temperature,
        max_tokens: 800,
    }
}

fn issue_create(ctx: &CommitContext, draft: &IssueDraft) -> PromptPair {
    let mut user = format!(
        "Create a GitHub issue based on this description:\n\n{}\n\n",
        ctx.message
    );

    if !draft.files.is_empty() {
        user.push_str("Referenced files:\n\n");
        push_file_excerpts(&mut user, &draft.files);
    }

    if let Some(extra) = draft.additional_context.as_deref() {
        if !extra.trim().is_empty() {
            let _ = write!(user, "Additional context:\n{}\n\n", extra.trim());
        }
    }

    let _ = write!(
        user,
        "For repository: {}/{}\n\n\
         Write the title on the first line. Separate the title and body with '---' on its own line.",
        draft.owner, draft.repo
    );

    PromptPair {
        kind: TaskKind::IssueCreate,
        system: ISSUE_SYSTEM_PROMPT.to_string(),
        user,
        temperature: 0.7,
        max_tokens: 2000,
    }
}

fn issue_comment(ctx: &CommitContext, draft: &CommentDraft) -> PromptPair {
    let body = if draft.issue_body.trim().is_empty() {
        "(no description)"
    } else {
        draft.issue_body.trim()
    };

    let mut user = format!(
        "Create a GitHub issue comment based on this input:\n\n{}\n\n\
         This comment is for Issue #{}: {}\n\n\
         Issue description:\n{}\n\n",
        ctx.message, draft.issue_number, draft.issue_title, body
    );

    if !draft.files.is_empty() {
        user.push_str("Referenced files:\n\n");
        push_file_excerpts(&mut user, &draft.files);
    }

    user.push_str(
        "Create a well-structured comment that addresses the input and is relevant to the issue.",
    );

    PromptPair {
        kind: TaskKind::IssueComment,
        system: COMMENT_SYSTEM_PROMPT.to_string(),
        user,
        temperature: 0.7,
        max_tokens: 1000,
    }
}

fn push_file_excerpts(out: &mut String, files: &BTreeMap<String, String>) {
    for (path, content) in files {
        let lang = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        let excerpt = truncate_chars(&trim_content(content, path), MAX_FILE_EXCERPT_CHARS);
        let _ = write!(out, "File: {}\n```{}\n{}\n```\n\n", path, lang, excerpt);
    }
}

/// Cut a string to at most `max` characters, marking the cut
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}\n... (truncated)", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::personality::PersonalitySet;

    const DIFF: &str = "\
diff --git a/README.md b/README.md
new file mode 100644
--- /dev/null
+++ b/README.md
@@ -0,0 +1 @@
+# Hello
diff --git a/main.go b/main.go
--- a/main.go
+++ b/main.go
@@ -1 +1 @@
-package old
+package main
";

    fn personalities() -> PersonalitySet {
        PersonalitySet::builtin()
    }

    #[test]
    fn test_commit_suggestion_bypasses_personality() {
        let set = personalities();
        let ctx = CommitContext::new("")
            .with_diff(DIFF)
            .with_history(vec!["feat: earlier".to_string()]);

        let task = Task::CommitSuggestion {
            max_diff_chars: MAX_DIFF_CHARS,
        };
        let a = build(&task, &ctx, set.get("snarky_reviewer"));
        let b = build(&task, &ctx, set.get("git_expert"));
        assert_eq!(a, b);
        assert_eq!(a.system, COMMIT_SYSTEM_PROMPT);
        assert_eq!(a.temperature, 0.3);
        assert_eq!(a.max_tokens, 150);
    }

    #[test]
    fn test_commit_suggestion_embeds_analysis_and_history() {
        let set = personalities();
        let ctx = CommitContext::new("")
            .with_diff(DIFF)
            .with_history(vec!["feat: earlier".to_string()]);
        let pair = build(
            &Task::CommitSuggestion {
                max_diff_chars: MAX_DIFF_CHARS,
            },
            &ctx,
            set.get(""),
        );

        assert!(pair.user.contains("+# Hello"));
        assert!(pair
            .user
            .contains("- Total files changed: 2 (1 added, 1 modified, 0 deleted)"));
        assert!(pair.user.contains("1. feat: earlier"));
        assert!(pair.user.contains("do not rely heavily on these patterns"));
    }

    #[test]
    fn test_commit_suggestion_analysis_counts_summarized_files() {
        let mut diff = String::from(
            "diff --git a/README.md b/README.md\nnew file mode 100644\n--- /dev/null\n+++ b/README.md\n@@ -0,0 +1 @@\n+# Hello\n",
        );
        diff.push_str("diff --git a/big.go b/big.go\n--- a/big.go\n+++ b/big.go\n@@ -1,200 +1,200 @@\n");
        for i in 0..200 {
            diff.push_str(&format!("-old line number {}\n+new line number {}\n", i, i));
        }

        let set = personalities();
        let ctx = CommitContext::new("").with_diff(diff.clone());
        let pair = build(
            &Task::CommitSuggestion {
                max_diff_chars: 3000,
            },
            &ctx,
            set.get(""),
        );

        assert!(!pair.user.contains("+new line number 199"));
        assert!(pair
            .user
            .contains("- Total files changed: 2 (1 added, 1 modified, 0 deleted)"));
        assert_eq!(analyze_diff(&diff).changed(), 2);
    }

    #[test]
    fn test_feedback_uses_personality() {
        let set = personalities();
        let personality = set.get("git_expert");
        let ctx = CommitContext::new("fix: null check");
        let pair = build(
            &Task::Feedback {
                username: "dev",
                repo_name: "noidea",
            },
            &ctx,
            personality,
        );
        assert_eq!(pair.kind, TaskKind::Feedback);
        assert_eq!(pair.system, personality.system_prompt);
        assert!(pair.user.contains("fix: null check"));
        assert!(pair.user.contains("Repository: noidea"));
        assert_eq!(pair.max_tokens, personality.max_tokens);
    }

    #[test]
    fn test_summary_selection_by_marker() {
        let set = personalities();
        let mut stats_map = BTreeMap::new();
        stats_map.insert(stats::TOTAL_COMMITS.to_string(), 4);
        stats_map.insert(stats::UNIQUE_AUTHORS.to_string(), 2);

        let weekly = CommitContext::new("Weekly Summary").with_stats(stats_map.clone());
        let pair = build(&Task::Summary, &weekly, set.get("snarky_reviewer"));
        assert_eq!(pair.kind, TaskKind::WeeklySummary);
        assert_eq!(pair.system, WEEKLY_SYSTEM_PROMPT);
        assert!(pair.user.contains("- Unique authors: 2"));
        assert_eq!(pair.max_tokens, 800);

        let on_demand = CommitContext::new("On-Demand Analysis")
            .with_stats(stats_map)
            .with_diff("+x");
        let pair = build(&Task::Summary, &on_demand, set.get("snarky_reviewer"));
        assert_eq!(pair.kind, TaskKind::OnDemandAnalysis);
        assert_eq!(pair.system, ON_DEMAND_SYSTEM_PROMPT);
        assert!(!pair.user.contains("Unique authors"));
        assert!(pair.user.contains("Code changes (diff context):\n+x"));
    }

    #[test]
    fn test_summary_keeps_multi_line_personality_prompt() {
        let set = personalities();
        let ctx = CommitContext::new("Weekly Summary");
        let pair = build(&Task::Summary, &ctx, set.get("git_expert"));
        assert_eq!(pair.system, set.get("git_expert").system_prompt);
    }

    #[test]
    fn test_issue_create_prompt() {
        let set = personalities();
        let mut files = BTreeMap::new();
        files.insert("src/lib.rs".to_string(), "pub fn x() {}".to_string());
        let draft = IssueDraft {
            owner: "octo".to_string(),
            repo: "hello".to_string(),
            files,
            additional_context: Some("Only on Linux".to_string()),
        };
        let ctx = CommitContext::new("Login button does nothing");
        let pair = build(&Task::IssueCreate(&draft), &ctx, set.get(""));

        assert!(pair.system.contains("## Expected Behavior"));
        assert!(pair.user.contains("Login button does nothing"));
        assert!(pair.user.contains("File: src/lib.rs\n```rs\npub fn x() {}\n```"));
        assert!(pair.user.contains("Additional context:\nOnly on Linux"));
        assert!(pair.user.contains("For repository: octo/hello"));
        assert!(pair.user.contains("'---' on its own line"));
        assert_eq!(pair.max_tokens, 2000);
    }

    #[test]
    fn test_issue_comment_prompt() {
        let set = personalities();
        let draft = CommentDraft {
            issue_number: 7,
            issue_title: "Crash on start".to_string(),
            issue_body: String::new(),
            files: BTreeMap::new(),
        };
        let ctx = CommitContext::new("Fixed in the latest release");
        let pair = build(&Task::IssueComment(&draft), &ctx, set.get(""));
        assert!(pair.user.contains("Issue #7: Crash on start"));
        assert!(pair.user.contains("(no description)"));
        assert_eq!(pair.max_tokens, 1000);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abc", 5), "abc");
        assert_eq!(truncate_chars("abcdef", 3), "abc\n... (truncated)");
        assert_eq!(truncate_chars("ééé", 2), "éé\n... (truncated)");
    }
}
