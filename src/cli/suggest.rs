//! Commit message suggestion handler

use std::fs;
use std::path::Path;

use crate::ai::context::CommitContext;
use crate::ai::diff::{analyze_diff, DiffAnalysis, FileCategory, FileOperation};
use crate::ai::prompts::MAX_DIFF_CHARS;
use crate::cli::build_assistant;
use crate::cli::commands::SuggestArgs;
use crate::core::config::Config;
use crate::core::git::GitRepository;
use crate::error::Result;

/// Diff budget when `--full-diff` is not set
const SHORT_DIFF_CHARS: usize = 3000;

/// Handle the suggest command
pub async fn handle_suggest(args: SuggestArgs) -> Result<()> {
    let config = Config::load()?;
    let repo = GitRepository::open_current_dir()?;

    let diff = repo.staged_diff()?;
    if diff.trim().is_empty() {
        if !args.quiet {
            println!("No staged changes found. Stage files with `git add` first.");
        }
        return Ok(());
    }

    let history_len = args.history.unwrap_or(config.suggest.history);
    let full_diff = args.full_diff || config.suggest.full_diff;

    if !args.quiet {
        println!("🧠 Analyzing staged changes...");
    }

    let budget = if full_diff { MAX_DIFF_CHARS } else { SHORT_DIFF_CHARS };
    let history = if history_len == 0 {
        Vec::new()
    } else {
        repo.recent_commits(history_len)
            .map(|commits| commits.into_iter().map(|c| c.summary).collect())
            .unwrap_or_default()
    };

    let ctx = CommitContext::new("")
        .with_diff(diff.clone())
        .with_history(history);

    let message = if args.no_ai {
        local_suggestion(&analyze_diff(&diff))
    } else {
        match generate(&config, &ctx, budget).await {
            Ok(message) if !message.trim().is_empty() => message,
            Ok(_) => local_suggestion(&analyze_diff(&diff)),
            Err(e) => {
                if !args.quiet {
                    eprintln!("Warning: AI suggestion unavailable: {}", e);
                }
                local_suggestion(&analyze_diff(&diff))
            }
        }
    };

    match args.file {
        Some(path) => {
            write_commit_file(&path, &message)?;
            if !args.quiet {
                println!("✓ Commit message written to {}", path.display());
            }
        }
        None if args.quiet => println!("{}", message),
        None => {
            println!();
            println!("✨ Suggested commit message:");
            println!();
            for line in message.lines() {
                println!("  {}", line);
            }
            println!();
            println!("Use it with: git commit -m \"{}\"", first_line(&message));
        }
    }

    Ok(())
}

async fn generate(config: &Config, ctx: &CommitContext, max_diff_chars: usize) -> Result<String> {
    let assistant = build_assistant(config, None)?;
    tracing::debug!(
        "Suggesting commit message with {} ({})",
        assistant.provider_name(),
        assistant.model()
    );
    assistant.suggest_commit(ctx, max_diff_chars).await
}

fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or("")
}

/// Write `message` into a commit message file, keeping its comment lines
fn write_commit_file(path: &Path, message: &str) -> Result<()> {
    let existing = fs::read_to_string(path).unwrap_or_default();
    fs::write(path, render_commit_file(message, &existing))?;
    Ok(())
}

fn render_commit_file(message: &str, existing: &str) -> String {
    let comments: Vec<&str> = existing
        .lines()
        .filter(|line| line.starts_with('#'))
        .collect();

    let mut out = message.trim_end().to_string();
    out.push('\n');
    if !comments.is_empty() {
        out.push('\n');
        out.push_str(&comments.join("\n"));
        out.push('\n');
    }
    out
}

/// Conventional commit message derived from the diff alone
fn local_suggestion(analysis: &DiffAnalysis) -> String {
    if analysis.files.is_empty() {
        return "chore: update files".to_string();
    }

    let subject = if analysis.changed() == 1 {
        analysis.files[0].path.clone()
    } else {
        format!("{} files", analysis.changed())
    };

    let all_in = |category: FileCategory| {
        analysis
            .files
            .iter()
            .all(|f| f.category == Some(category))
    };

    if all_in(FileCategory::Doc) {
        return format!("docs: update {}", subject);
    }
    if all_in(FileCategory::Test) {
        return format!("test: update {}", subject);
    }
    if all_in(FileCategory::Build) || all_in(FileCategory::Config) {
        return format!("chore: update {}", subject);
    }

    if analysis.deleted() == analysis.changed() {
        format!("chore: remove {}", subject)
    } else if analysis.added() == analysis.changed() {
        format!("feat: add {}", subject)
    } else if analysis
        .files
        .iter()
        .any(|f| f.operation == FileOperation::Added)
    {
        format!("feat: update {}", subject)
    } else {
        format!("refactor: update {}", subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_commit_file_keeps_comments() {
        let existing = "\n# Please enter the commit message\n# On branch main\n";
        let out = render_commit_file("feat: add login", existing);
        assert_eq!(
            out,
            "feat: add login\n\n# Please enter the commit message\n# On branch main\n"
        );
    }

    #[test]
    fn test_render_commit_file_without_template() {
        assert_eq!(render_commit_file("fix: typo\n\n", ""), "fix: typo\n");
    }

    #[test]
    fn test_write_commit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("COMMIT_EDITMSG");
        fs::write(&path, "# comment\n").unwrap();

        write_commit_file(&path, "docs: update README.md").unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("docs: update README.md\n"));
        assert!(written.contains("# comment"));
    }

    #[test]
    fn test_local_suggestion_docs_only() {
        let diff = "diff --git a/README.md b/README.md\n\
                    new file mode 100644\n\
                    --- /dev/null\n\
                    +++ b/README.md\n\
                    +# Title\n";
        assert_eq!(local_suggestion(&analyze_diff(diff)), "docs: update README.md");
    }

    #[test]
    fn test_local_suggestion_empty() {
        assert_eq!(
            local_suggestion(&DiffAnalysis::default()),
            "chore: update files"
        );
    }
}
