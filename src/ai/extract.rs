//! Turning raw model output into commit messages and issues
//!
//! Nothing here fails: every path ends in a usable string, with a
//! deterministic template when the model output is unusable.

/// Conventional commit types accepted as a message prefix
const COMMIT_TYPES: &[&str] = &[
    "feat", "fix", "docs", "style", "refactor", "perf", "test", "build", "ci", "chore", "revert",
];

/// Lines at or over this length are not considered commit subjects
const MAX_SUBJECT_CHARS: usize = 100;

/// Last-resort truncation length
const FALLBACK_SUBJECT_CHARS: usize = 72;

/// Footer appended to AI-generated issue bodies and comments
pub const GENERATED_FOOTER: &str = "_Generated with noidea CLI_";

/// Title and body of an issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueText {
    pub title: String,
    pub body: String,
}

/// Extract a single commit message from a model response
pub fn extract_commit_message(raw: &str) -> String {
    let mut text = raw.trim();

    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        text = text[1..text.len() - 1].trim();
    }

    if text.contains("```") {
        let parts: Vec<&str> = text.split("```").collect();
        if parts.len() >= 3 {
            text = strip_fence_language(parts[1]).trim();
        }
    }

    let lines: Vec<&str> = text.lines().map(str::trim).collect();

    if let Some(line) = lines
        .iter()
        .find(|l| char_len(l) < MAX_SUBJECT_CHARS && is_conventional(l))
    {
        return line.to_string();
    }

    if let Some(line) = lines
        .iter()
        .find(|l| !l.is_empty() && char_len(l) < MAX_SUBJECT_CHARS && !l.starts_with('#'))
    {
        return line.to_string();
    }

    let first = lines.first().copied().unwrap_or("");
    first.chars().take(FALLBACK_SUBJECT_CHARS).collect()
}

/// `<type>: ...`, `<type>(scope): ...` or `<type>!: ...` with a known type
fn is_conventional(line: &str) -> bool {
    let Some((prefix, _)) = line.split_once(':') else {
        return false;
    };
    let prefix = prefix.trim_end_matches('!');
    let kind = match prefix.split_once('(') {
        Some((kind, scope)) if scope.ends_with(')') => kind,
        Some(_) => return false,
        None => prefix,
    };
    COMMIT_TYPES.contains(&kind)
}

/// Drop a language tag such as `text` from the first fenced line
fn strip_fence_language(block: &str) -> &str {
    match block.split_once('\n') {
        Some((first, rest)) if !first.trim().is_empty() && !first.contains(' ') && !first.contains(':') => rest,
        _ => block,
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split a model response into title and body on the first `---` line
///
/// Returns `None` when the delimiter is missing or either side is empty,
/// in which case the caller should use [`fallback_issue`].
pub fn split_title_body(raw: &str) -> Option<IssueText> {
    let (title, body) = raw.split_once("---")?;

    let title = clean_title(title);
    let body = body.trim();
    if title.is_empty() || body.is_empty() {
        return None;
    }

    Some(IssueText {
        title,
        body: body.to_string(),
    })
}

/// Strip Markdown heading marks and labels from a generated title
fn clean_title(raw: &str) -> String {
    let line = raw
        .lines()
        .map(str::trim)
        .rfind(|l| !l.is_empty())
        .unwrap_or("");
    let line = line.trim_start_matches('#').trim();
    let line = line
        .strip_prefix("Title:")
        .or_else(|| line.strip_prefix("**Title:**"))
        .unwrap_or(line)
        .trim();
    line.trim_matches('"').trim_matches('*').trim().to_string()
}

/// Deterministic issue built from the user's description
pub fn fallback_issue(description: &str, owner: &str, repo: &str) -> IssueText {
    let first_line = description.lines().next().unwrap_or("").trim();
    let title = if char_len(first_line) > 60 {
        format!("{}...", first_line.chars().take(57).collect::<String>())
    } else if first_line.is_empty() {
        "New issue".to_string()
    } else {
        first_line.to_string()
    };

    let body = format!(
        "## Description\n\n{}\n\n\
         ## Expected Behavior\n\n[What should happen]\n\n\
         ## Current Behavior\n\n[What happens instead]\n\n\
         ## Possible Solution\n\n[Ideas for implementing this feature or fixing the issue]\n\n\
         ## Steps to Reproduce\n\n1. [Step one]\n2. [Step two]\n3. [Step three]\n\n\
         ## Environment\n\n- Repository: {}/{}\n- Generated with noidea CLI",
        description.trim(),
        owner,
        repo
    );

    IssueText { title, body }
}

/// Append the generated-by footer to an AI issue body
pub fn with_issue_footer(body: &str) -> String {
    format!("{}\n\n---\n{}", body.trim_end(), GENERATED_FOOTER)
}

/// Append the generated-by footer to an AI comment
pub fn with_comment_footer(body: &str) -> String {
    format!("{}\n\n{}", body.trim_end(), GENERATED_FOOTER)
}

/// Comment text used when AI generation failed
pub fn fallback_comment(description: &str) -> String {
    format!(
        "{}\n\n_Note: AI comment generation was attempted but failed._",
        description.trim_end()
    )
}
