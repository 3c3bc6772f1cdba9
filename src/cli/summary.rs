//! Activity summary handler
//!
//! Summarizes the commits of the last N days, or analyzes the last N commits
//! when `--last` is given.

use crate::ai::context::{stats, CommitContext, ON_DEMAND_MARKER};
use crate::cli::build_assistant;
use crate::cli::commands::SummaryArgs;
use crate::core::config::Config;
use crate::core::git::{CommitInfo, GitRepository};
use crate::error::Result;

/// Handle the summary command
pub async fn handle_summary(args: SummaryArgs) -> Result<()> {
    let config = Config::load()?;
    let repo = GitRepository::open_current_dir()?;

    let (commits, heading) = match args.last {
        Some(n) => (repo.recent_commits(n)?, format!("last {} commits", n)),
        None => (repo.commits_since(args.days)?, format!("last {} days", args.days)),
    };

    if commits.is_empty() {
        println!("No commits found in the {}.", heading);
        return Ok(());
    }

    let stats = repo.commit_stats(&commits)?;
    let mut ctx = CommitContext::new(context_title(args.last))
        .with_history(commits.iter().map(|c| c.message.clone()).collect())
        .with_stats(stats);

    if args.last.is_some() {
        ctx = ctx.with_diff(combined_diff(&repo, &commits));
    }

    println!("📊 Git activity for the {}", heading);
    println!();
    print_stats(&ctx);
    println!();
    print_commits(&commits);

    if !(args.ai || config.llm.enabled) {
        return Ok(());
    }

    println!();
    let result = match build_assistant(&config, None) {
        Ok(assistant) => assistant.summarize(&ctx).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(text) => {
            println!("🧠 Insights:");
            println!();
            for line in text.lines() {
                println!("  {}", line);
            }
        }
        Err(e) => println!("❌ AI Error: {}", e),
    }

    Ok(())
}

/// Context message; the marker selects the on-demand prompt
fn context_title(last: Option<usize>) -> String {
    match last {
        Some(n) => format!("{} Analysis of the last {} commits", ON_DEMAND_MARKER, n),
        None => "Weekly Summary".to_string(),
    }
}

fn combined_diff(repo: &GitRepository, commits: &[CommitInfo]) -> String {
    let mut out = String::new();
    for commit in commits {
        match repo.commit_diff(&commit.id) {
            Ok(diff) => out.push_str(&diff),
            Err(e) => tracing::debug!("Skipping diff for {}: {}", commit.id, e),
        }
    }
    out
}

fn print_stats(ctx: &CommitContext) {
    println!("  Commits:       {}", ctx.stat(stats::TOTAL_COMMITS));
    println!("  Authors:       {}", ctx.stat(stats::UNIQUE_AUTHORS));
    println!("  Files changed: {}", ctx.stat(stats::TOTAL_FILES_CHANGED));
    println!(
        "  Lines:         +{} / -{}",
        ctx.stat(stats::TOTAL_INSERTIONS),
        ctx.stat(stats::TOTAL_DELETIONS)
    );
}

fn print_commits(commits: &[CommitInfo]) {
    for commit in commits {
        let short_id: String = commit.id.chars().take(7).collect();
        println!(
            "  {} {} ({}, {})",
            short_id,
            commit.summary,
            commit.author,
            commit.time.format("%b %-d %H:%M")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_title_selects_prompt() {
        assert!(CommitContext::new(context_title(Some(5))).is_on_demand());
        assert!(!CommitContext::new(context_title(None)).is_on_demand());
    }
}
