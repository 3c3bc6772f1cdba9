//! Moai CLI command handler
//!
//! Prints a moai face next to the commit message, then local or AI feedback.

use std::io::{self, IsTerminal, Write};

use secrecy::ExposeSecret;

use crate::ai::context::CommitContext;
use crate::ai::{FeedbackEngine, LocalFeedback, PersonalitySet};
use crate::cli::commands::MoaiArgs;
use crate::cli::{build_assistant, configured_provider};
use crate::core::config::Config;
use crate::core::credentials::CredentialStore;
use crate::core::git::GitRepository;
use crate::error::{NoideaError, Result};

/// Commits read for `--history`, including the one being judged
const HISTORY_DEPTH: usize = 6;

/// Handle the moai command
pub async fn handle_moai(args: MoaiArgs) -> Result<()> {
    let config = Config::load()?;

    if args.list_personalities {
        show_personalities(&config);
        return Ok(());
    }

    let repo = GitRepository::open_current_dir().ok();
    let message = commit_message(&args.message, repo.as_ref());
    let local = LocalFeedback;

    println!("  {}  {}", local.face(), message);
    println!();

    if !(args.ai || config.llm.enabled) {
        println!("  {}", local.feedback(&message));
        println!();
        return Ok(());
    }

    let mut ctx = CommitContext::new(message.clone());
    if let Some(repo) = repo.as_ref() {
        if args.diff {
            match repo.last_commit_stat() {
                Ok(stat) => ctx = ctx.with_diff(stat),
                Err(e) => tracing::debug!("No diff for last commit: {}", e),
            }
        }
        if args.history {
            ctx = with_history_context(ctx, repo);
        }
    }

    let engine = match build_assistant(&config, args.personality.as_deref()) {
        Ok(assistant) => FeedbackEngine::Ai {
            assistant,
            username: repo
                .as_ref()
                .map(GitRepository::user_name)
                .unwrap_or_else(|| "User".to_string()),
            repo_name: repo
                .as_ref()
                .map(GitRepository::repo_name)
                .unwrap_or_else(|| "unknown".to_string()),
        },
        Err(e) => {
            report_ai_failure(&local, &message, &e, &config, args.debug);
            return Ok(());
        }
    };

    let interactive = io::stdout().is_terminal();
    if interactive {
        print!("  Generating AI feedback...");
        io::stdout().flush().ok();
    }

    let result = engine.generate_feedback(&ctx).await;

    if interactive {
        print!("\r\x1b[K");
        io::stdout().flush().ok();
    }

    match result {
        Ok(text) => {
            for line in text.lines() {
                if line.is_empty() {
                    println!();
                } else {
                    println!("  {}", line);
                }
            }
            println!();
        }
        Err(e) => report_ai_failure(&local, &message, &e, &config, args.debug),
    }

    Ok(())
}

/// Message from the arguments, else the last commit, else "unknown commit"
fn commit_message(words: &[String], repo: Option<&GitRepository>) -> String {
    if !words.is_empty() {
        return words.join(" ");
    }

    repo.and_then(|r| r.last_commit_message().ok())
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| "unknown commit".to_string())
}

/// Previous commits (excluding the one being judged) and their stats
fn with_history_context(ctx: CommitContext, repo: &GitRepository) -> CommitContext {
    let commits = match repo.recent_commits(HISTORY_DEPTH) {
        Ok(commits) if commits.len() > 1 => commits,
        Ok(_) => return ctx,
        Err(e) => {
            tracing::debug!("Could not read commit history: {}", e);
            return ctx;
        }
    };

    let previous = &commits[1..];
    let messages = previous
        .iter()
        .map(|c| c.message.trim().to_string())
        .collect();

    let ctx = ctx.with_history(messages);
    match repo.commit_stats(previous) {
        Ok(stats) => ctx.with_stats(stats),
        Err(e) => {
            tracing::debug!("Could not compute commit stats: {}", e);
            ctx
        }
    }
}

fn report_ai_failure(
    local: &LocalFeedback,
    message: &str,
    err: &NoideaError,
    config: &Config,
    debug: bool,
) {
    println!("  {}", local.feedback(message));
    println!();
    println!("  ❌ AI Error: {}", err);

    if debug {
        let provider = configured_provider(config);
        println!();
        println!("  🔍 Debug information:");
        println!("    Provider: {} ({})", provider.display_name, provider.base_url);
        println!(
            "    Model: {}",
            config.model().unwrap_or(&provider.default_model)
        );
        match CredentialStore::get_api_key(&provider) {
            Ok(Some(key)) => println!("    API key length: {}", key.expose_secret().len()),
            _ => println!("    API key length: 0 (no API key found)"),
        }
    }
}

fn show_personalities(config: &Config) {
    let set = match PersonalitySet::load(config.moai.personality_file.as_deref()) {
        Ok(set) => set,
        Err(e) => {
            println!("Error loading personalities: {}", e);
            return;
        }
    };

    println!("🧠 Available personalities:");
    println!();

    for (name, personality) in &set.personalities {
        let marker = if *name == set.default { " (default)" } else { "" };
        println!("{}{}: {}", name, marker, personality.description);
    }

    println!();
    println!("To use a specific personality:");
    println!("  noidea moai --ai --personality=<name>");
    println!();
    println!("To set a default personality:");
    println!("  noidea config set personality <name>");
    println!("  or export NOIDEA_PERSONALITY=<name>");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_message_from_words() {
        let words = vec!["fix".to_string(), "login".to_string()];
        assert_eq!(commit_message(&words, None), "fix login");
    }

    #[test]
    fn test_commit_message_without_repo() {
        assert_eq!(commit_message(&[], None), "unknown commit");
    }
}
