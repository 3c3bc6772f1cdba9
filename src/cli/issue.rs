//! GitHub issue CLI command handlers
//!
//! Failures are printed as `Error: ...` and the command still exits 0.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, BufRead};
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};

use crate::ai::extract::{fallback_issue, IssueText};
use crate::ai::prompts::{CommentDraft, IssueDraft};
use crate::ai::trimmer::{expand_file_references, referenced_paths};
use crate::ai::Assistant;
use crate::cli::commands::IssueCommand;
use crate::cli::{build_assistant, confirm, prompt_line};
use crate::core::config::Config;
use crate::core::git::GitRepository;
use crate::core::repository::RepositoryContext;
use crate::error::{NoideaError, Result};
use crate::github::{CreateIssueParams, GitHubClient, Issue, IssueFilter, IssueHandler};

/// Files picked up by `--scan`
const MAX_SCANNED_FILES: usize = 3;

/// Title width in `issue list`
const TITLE_WIDTH: usize = 60;

/// Handle issue commands
pub async fn handle_issue(command: IssueCommand) -> Result<()> {
    match run(command).await {
        Ok(()) | Err(NoideaError::Cancelled) => {}
        Err(e) => println!("Error: {}", e),
    }
    Ok(())
}

async fn run(command: IssueCommand) -> Result<()> {
    let context = RepositoryContext::detect()?;
    let client = GitHubClient::for_context(&context)?;
    let handler = IssueHandler::new(&client);

    match command {
        IssueCommand::List {
            state,
            limit,
            open,
            closed,
        } => {
            let filter = if open {
                IssueFilter::Open
            } else if closed {
                IssueFilter::Closed
            } else {
                state.into()
            };
            handle_list(&handler, &context, filter, limit).await
        }
        IssueCommand::View { number } => handle_view(&handler, number).await,
        IssueCommand::Create {
            title,
            body,
            labels,
            ai,
            files,
            context: extra,
            scan,
            personality,
        } => {
            let labels = labels.as_deref().map(split_labels).unwrap_or_default();
            if ai {
                let request = AiIssueRequest {
                    description: body,
                    labels,
                    files,
                    additional_context: extra,
                    scan,
                    personality,
                };
                handle_create_ai(&handler, &context, request).await
            } else {
                handle_create(&handler, title, body, labels, &files).await
            }
        }
        IssueCommand::Close {
            number,
            comment,
            ai,
            quiet,
        } => handle_close(&handler, &context, number, comment, ai, quiet).await,
        IssueCommand::Comment {
            number,
            body,
            ai,
            files,
        } => handle_comment(&handler, &context, number, body, ai, &files).await,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// List / View
// ─────────────────────────────────────────────────────────────────────────────

async fn handle_list(
    handler: &IssueHandler<'_>,
    context: &RepositoryContext,
    filter: IssueFilter,
    limit: u8,
) -> Result<()> {
    let issues = handler.list(filter, limit).await?;

    if issues.is_empty() {
        println!("No issues found");
        return Ok(());
    }

    println!("Issues ({}) for {}:", filter, context.full_name());
    println!();

    let width = issues
        .iter()
        .map(|i| i.number.to_string().len())
        .max()
        .unwrap_or(1);
    let now = Utc::now();

    for issue in &issues {
        println!(
            "#{:<width$} {} {} {}",
            issue.number,
            truncate(&issue.title, TITLE_WIDTH),
            issue.state(),
            time_ago(issue.updated_at, now),
            width = width
        );
    }

    Ok(())
}

async fn handle_view(handler: &IssueHandler<'_>, number: u64) -> Result<()> {
    let issue = handler.get(number).await?;
    print_issue(&issue);
    Ok(())
}

fn print_issue(issue: &Issue) {
    println!("Issue #{}: {}", issue.number, issue.title);
    println!("State: {}", issue.state());
    println!("Author: {}", issue.author);
    println!("Created: {}", issue.created_at.format("%Y-%m-%d %H:%M:%S"));
    println!("Updated: {}", issue.updated_at.format("%Y-%m-%d %H:%M:%S"));
    if !issue.labels.is_empty() {
        println!("Labels: {}", issue.labels.join(", "));
    }
    if !issue.assignees.is_empty() {
        println!("Assignees: {}", issue.assignees.join(", "));
    }
    if let Some(milestone) = &issue.milestone {
        println!("Milestone: {}", milestone);
    }
    if issue.comments > 0 {
        println!("Comments: {}", issue.comments);
    }
    println!();
    println!("{}", issue.body);
    println!();
    println!("URL: {}", issue.url);
}

// ─────────────────────────────────────────────────────────────────────────────
// Create
// ─────────────────────────────────────────────────────────────────────────────

async fn handle_create(
    handler: &IssueHandler<'_>,
    title: Option<String>,
    body: Option<String>,
    labels: Vec<String>,
    files: &[PathBuf],
) -> Result<()> {
    let (title, body, labels) = match title.filter(|t| !t.trim().is_empty()) {
        Some(title) => (title, body.unwrap_or_default(), labels),
        None => {
            let title = prompt_line("Issue title: ")?;
            if title.is_empty() {
                return Err(NoideaError::InvalidInput("Issue title is required".into()));
            }
            println!("Issue body (end with an empty line):");
            let body = read_paragraph()?;
            let labels = split_labels(&prompt_line("Labels (comma-separated): ")?);
            (title, body, labels)
        }
    };

    let refs = load_file_refs(files);
    let body = render_body(body, &refs);

    let issue = handler
        .create(CreateIssueParams {
            title,
            body,
            labels,
        })
        .await?;

    println!("✓ Issue #{} created successfully: {}", issue.number, issue.title);
    println!("URL: {}", issue.url);
    Ok(())
}

struct AiIssueRequest {
    description: Option<String>,
    labels: Vec<String>,
    files: Vec<PathBuf>,
    additional_context: Option<String>,
    scan: bool,
    personality: Option<String>,
}

async fn handle_create_ai(
    handler: &IssueHandler<'_>,
    context: &RepositoryContext,
    request: AiIssueRequest,
) -> Result<()> {
    println!("Creating issue with AI assistance");

    let description = match request.description.filter(|d| !d.trim().is_empty()) {
        Some(description) => description,
        None => {
            println!("Describe the issue or feature you want to create:");
            read_paragraph()?
        }
    };
    if description.trim().is_empty() {
        return Err(NoideaError::InvalidInput(
            "Issue description is required".into(),
        ));
    }

    let mut refs = if request.files.is_empty() {
        BTreeMap::new()
    } else {
        println!("Processing file references...");
        load_file_refs(&request.files)
    };

    if request.scan {
        println!("Scanning for code context...");
        let scanned = GitRepository::open_current_dir()
            .and_then(|repo| repo.changed_files())
            .unwrap_or_default();
        for path in scanned.into_iter().take(MAX_SCANNED_FILES) {
            if let Ok(content) = fs::read_to_string(&path) {
                refs.insert(path, content);
            }
        }
    }

    let description = with_placeholders(description.trim().to_string(), &refs);
    let draft = IssueDraft {
        owner: context.owner.clone(),
        repo: context.name.clone(),
        files: refs.clone(),
        additional_context: request.additional_context.filter(|c| !c.trim().is_empty()),
    };

    println!("Generating issue...");
    let config = Config::load()?;
    let generated = match ai_assistant(&config, request.personality.as_deref()) {
        Some(assistant) => assistant.draft_issue(&description, &draft).await,
        None => fallback_issue(&description, &draft.owner, &draft.repo),
    };
    let IssueText { title, body } = generated;

    println!();
    println!("Generated Issue:");
    println!("Title: {}", title);
    println!("Body:");
    println!("{}", body);
    println!();

    if !confirm("Create this issue?")? {
        println!("Issue creation cancelled");
        return Err(NoideaError::Cancelled);
    }

    let issue = handler
        .create(CreateIssueParams {
            title,
            body: render_body(body, &refs),
            labels: request.labels,
        })
        .await?;

    println!("✓ Issue #{} created successfully: {}", issue.number, issue.title);
    println!("URL: {}", issue.url);
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Close / Comment
// ─────────────────────────────────────────────────────────────────────────────

async fn handle_close(
    handler: &IssueHandler<'_>,
    context: &RepositoryContext,
    number: u64,
    comment: Option<String>,
    ai: bool,
    quiet: bool,
) -> Result<()> {
    let mut comment = comment.filter(|c| !c.trim().is_empty());

    if ai {
        let description = match comment.take() {
            Some(c) => c,
            None => {
                println!("What would you like to comment about? (end with an empty line)");
                read_paragraph()?
            }
        };
        if description.trim().is_empty() {
            return Err(NoideaError::InvalidInput(
                "Comment description is required".into(),
            ));
        }
        let generated =
            generate_comment(handler, context, number, &description, &BTreeMap::new()).await?;
        if !confirm_comment(&generated)? {
            return Err(NoideaError::Cancelled);
        }
        comment = Some(generated);
    }

    if comment.is_some() && !quiet {
        println!("Adding closing comment...");
    }

    handler.close(number, comment.as_deref()).await?;

    if !quiet {
        println!("✓ Issue #{} closed successfully", number);
    }
    Ok(())
}

async fn handle_comment(
    handler: &IssueHandler<'_>,
    context: &RepositoryContext,
    number: u64,
    body: Option<String>,
    ai: bool,
    files: &[PathBuf],
) -> Result<()> {
    let refs = load_file_refs(files);
    let mut body = body.filter(|b| !b.trim().is_empty());

    if ai {
        let description = match body.take() {
            Some(b) => b,
            None => {
                println!("What would you like to comment about? (end with an empty line)");
                read_paragraph()?
            }
        };
        if description.trim().is_empty() {
            return Err(NoideaError::InvalidInput(
                "Comment description is required".into(),
            ));
        }
        let generated = generate_comment(handler, context, number, &description, &refs).await?;
        let generated = with_placeholders(generated, &refs);
        if !confirm_comment(&generated)? {
            return Err(NoideaError::Cancelled);
        }
        body = Some(generated);
    }

    let body = match body {
        Some(b) => b,
        None => {
            println!("Enter your comment (end with an empty line):");
            let text = read_paragraph()?;
            if text.trim().is_empty() {
                return Err(NoideaError::InvalidInput("Comment body is required".into()));
            }
            with_placeholders(text, &refs)
        }
    };

    handler
        .comment(number, &render_body(body, &refs))
        .await?;
    println!("✓ Comment added successfully to issue #{}", number);
    Ok(())
}

/// Comment text from the model, or the description itself when AI is off
async fn generate_comment(
    handler: &IssueHandler<'_>,
    context: &RepositoryContext,
    number: u64,
    description: &str,
    refs: &BTreeMap<String, String>,
) -> Result<String> {
    println!("Generating comment...");
    let config = Config::load()?;
    let Some(assistant) = ai_assistant(&config, None) else {
        return Ok(description.trim().to_string());
    };

    let issue = match handler.get(number).await {
        Ok(issue) => issue,
        Err(e) => {
            tracing::warn!("Could not load issue #{} in {}: {}", number, context.full_name(), e);
            return Ok(description.trim().to_string());
        }
    };

    let draft = CommentDraft {
        issue_number: number,
        issue_title: issue.title,
        issue_body: issue.body,
        files: refs.clone(),
    };
    Ok(assistant.draft_comment(description, &draft).await)
}

fn confirm_comment(comment: &str) -> Result<bool> {
    println!();
    println!("Generated Comment:");
    println!("{}", comment);
    println!();
    let accepted = confirm("Add this comment?")?;
    if !accepted {
        println!("Comment cancelled");
    }
    Ok(accepted)
}

/// Assistant for issue text, or `None` when AI is disabled or unconfigured
fn ai_assistant(config: &Config, personality: Option<&str>) -> Option<Assistant> {
    if !config.llm.enabled {
        return None;
    }
    match build_assistant(config, personality) {
        Ok(assistant) => Some(assistant),
        Err(e) => {
            println!("Warning: {}", e);
            println!("Falling back to template...");
            None
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Read lines from stdin until an empty line
fn read_paragraph() -> Result<String> {
    read_paragraph_from(io::stdin().lock())
}

fn read_paragraph_from(reader: impl BufRead) -> Result<String> {
    let mut text = String::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            break;
        }
        text.push_str(line);
        text.push('\n');
    }
    Ok(text)
}

fn split_labels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read referenced files, warning about the ones that can't be read
fn load_file_refs(files: &[PathBuf]) -> BTreeMap<String, String> {
    let mut refs = BTreeMap::new();
    for path in files {
        match fs::read_to_string(path) {
            Ok(content) => {
                refs.insert(path.to_string_lossy().into_owned(), content);
            }
            Err(e) => println!("Warning: Could not read file {}: {}", path.display(), e),
        }
    }
    refs
}

/// Append a `{file:<path>}` placeholder for each reference the text lacks
fn with_placeholders(mut text: String, refs: &BTreeMap<String, String>) -> String {
    let present = referenced_paths(&text);
    for path in refs.keys() {
        if !present.contains(path) {
            text = format!("{}\n\n{{file:{}}}", text.trim_end(), path);
        }
    }
    text
}

/// Final issue or comment body with every attached file rendered
fn render_body(body: String, refs: &BTreeMap<String, String>) -> String {
    expand_file_references(&with_placeholders(body, refs), refs)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max.saturating_sub(3)).collect::<String>())
    }
}

/// "5 minutes ago" within a day, otherwise the date ("Jan 2")
fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    if elapsed < Duration::hours(24) {
        format!("{} ago", format_duration(elapsed))
    } else {
        then.format("%b %-d").to_string()
    }
}

fn format_duration(d: Duration) -> String {
    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {}", unit)
        } else {
            format!("{} {}s", n, unit)
        }
    };

    if d < Duration::minutes(1) {
        format!("{} seconds", d.num_seconds().max(0))
    } else if d < Duration::hours(1) {
        plural(d.num_minutes(), "minute")
    } else {
        plural(d.num_hours(), "hour")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 60), "short");
        let long = "x".repeat(70);
        let out = truncate(&long, 60);
        assert_eq!(out.chars().count(), 60);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn test_time_ago_recent() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        assert_eq!(time_ago(now - Duration::seconds(30), now), "30 seconds ago");
        assert_eq!(time_ago(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(time_ago(now - Duration::minutes(45), now), "45 minutes ago");
        assert_eq!(time_ago(now - Duration::hours(5), now), "5 hours ago");
    }

    #[test]
    fn test_time_ago_older_shows_date() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let then = Utc.with_ymd_and_hms(2024, 1, 2, 8, 0, 0).unwrap();
        assert_eq!(time_ago(then, now), "Jan 2");
    }

    #[test]
    fn test_split_labels() {
        assert_eq!(split_labels("bug, ui ,,docs"), vec!["bug", "ui", "docs"]);
        assert!(split_labels("  ").is_empty());
    }

    #[test]
    fn test_read_paragraph_stops_at_blank_line() {
        let input = b"first line\r\nsecond line\n\nignored\n" as &[u8];
        assert_eq!(
            read_paragraph_from(input).unwrap(),
            "first line\nsecond line\n"
        );
    }

    #[test]
    fn test_with_placeholders_adds_missing_only() {
        let mut refs = BTreeMap::new();
        refs.insert("src/a.rs".to_string(), "fn a() {}".to_string());
        refs.insert("src/b.rs".to_string(), "fn b() {}".to_string());

        let text = with_placeholders("See {file:src/a.rs}".to_string(), &refs);
        assert_eq!(text, "See {file:src/a.rs}\n\n{file:src/b.rs}");
    }

    #[test]
    fn test_render_body_keeps_files_the_model_dropped() {
        let mut refs = BTreeMap::new();
        refs.insert("src/a.rs".to_string(), "fn a() {}".to_string());

        let body = render_body("The parser panics on empty input.".to_string(), &refs);
        assert!(body.starts_with("The parser panics on empty input."));
        assert!(body.contains("Reference to file `src/a.rs`"));
        assert!(body.contains("fn a() {}"));
        assert!(!body.contains("{file:"));

        let echoed = render_body("See {file:src/a.rs}".to_string(), &refs);
        assert_eq!(echoed.matches("Reference to file").count(), 1);
    }

    #[test]
    fn test_load_file_refs_skips_missing() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("present.txt");
        fs::write(&present, "hello").unwrap();
        let missing = dir.path().join("missing.txt");

        let refs = load_file_refs(&[present.clone(), missing]);
        assert_eq!(refs.len(), 1);
        assert_eq!(
            refs.get(&present.to_string_lossy().into_owned()).map(String::as_str),
            Some("hello")
        );
    }
}
