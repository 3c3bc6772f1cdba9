//! Commit feedback and the AI assistant behind every generated text
//!
//! [`FeedbackEngine`] picks between canned local feedback and the model.
//! [`Assistant`] runs each AI task end to end: prompt, completion, extraction.

use rand::seq::IndexedRandom;

use crate::ai::client::{CompletionProvider, CompletionRequest};
use crate::ai::context::CommitContext;
use crate::ai::extract::{
    extract_commit_message, fallback_comment, fallback_issue, split_title_body,
    with_comment_footer, with_issue_footer, IssueText,
};
use crate::ai::personality::PersonalitySet;
use crate::ai::prompts::{self, CommentDraft, IssueDraft, Task};
use crate::error::Result;

// ─────────────────────────────────────────────────────────────────────────────
// Local feedback
// ─────────────────────────────────────────────────────────────────────────────

const MOAI_FACES: &[&str] = &[
    "🗿",
    "🗿 (¬_¬)",
    "🗿 (ಠ_ಠ)",
    "🗿 (•_•)",
    "🗿 ( ͡° ͜ʖ ͡°)",
    "🗿 (⊙_⊙)",
    "🗿 (－‸ლ)",
];

const GENERAL_FEEDBACK: &[&str] = &[
    "Another commit for the history books. Or at least the git log.",
    "Bold of you to push this on a weekday.",
    "The moai has seen many commits. This is one of them.",
    "Committed. Whether it should have been is another question.",
    "Your future self will read this message and wonder.",
    "Solid work. The moai nods, slowly.",
    "Git accepted it. That's the bar, right?",
];

const FIX_FEEDBACK: &[&str] = &[
    "A fix! Let's pretend the bug was never there.",
    "Fixed it. For now.",
    "The bug is dead. Long live the next bug.",
];

const VAGUE_FEEDBACK: &[&str] = &[
    "That commit message is doing a lot of heavy lifting with very few words.",
    "Descriptive. If you already know what changed.",
    "The moai would like a few more words next time.",
];

/// Canned feedback with no network access
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFeedback;

impl LocalFeedback {
    /// Random moai face
    pub fn face(&self) -> &'static str {
        MOAI_FACES.choose(&mut rand::rng()).copied().unwrap_or("🗿")
    }

    /// Random line suited to the commit message
    pub fn feedback(&self, message: &str) -> &'static str {
        let pool = Self::pool_for(message);
        pool.choose(&mut rand::rng())
            .copied()
            .unwrap_or(GENERAL_FEEDBACK[0])
    }

    fn pool_for(message: &str) -> &'static [&'static str] {
        let lower = message.to_lowercase();
        let subject = lower.lines().next().unwrap_or("").trim();
        if subject.starts_with("fix") || subject.contains("bug") {
            FIX_FEEDBACK
        } else if subject.split_whitespace().count() <= 2 {
            VAGUE_FEEDBACK
        } else {
            GENERAL_FEEDBACK
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AI assistant
// ─────────────────────────────────────────────────────────────────────────────

/// Runs prompts for every AI task against one completion provider
pub struct Assistant {
    provider: Box<dyn CompletionProvider>,
    model: String,
    personalities: PersonalitySet,
    personality: String,
}

impl Assistant {
    /// Create an assistant; an empty `model` uses the provider's default
    pub fn new(
        provider: Box<dyn CompletionProvider>,
        model: Option<String>,
        personalities: PersonalitySet,
        personality: impl Into<String>,
    ) -> Self {
        let model = model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| provider.default_model());
        Self {
            provider,
            model,
            personalities,
            personality: personality.into(),
        }
    }

    pub fn provider_name(&self) -> String {
        self.provider.provider_name()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn run(&self, task: &Task<'_>, ctx: &CommitContext) -> Result<String> {
        let personality = self.personalities.get(&self.personality);
        let prompt = prompts::build(task, ctx, personality);
        tracing::debug!("Running {:?} prompt", prompt.kind);
        let request = CompletionRequest::from_prompt(prompt, self.model.clone());
        self.provider.complete(&request).await
    }

    /// Personality-styled feedback on a commit
    pub async fn feedback(&self, ctx: &CommitContext, username: &str, repo_name: &str) -> Result<String> {
        let text = self
            .run(
                &Task::Feedback {
                    username,
                    repo_name,
                },
                ctx,
            )
            .await?;
        Ok(text.trim().to_string())
    }

    /// Commit message for the staged diff in `ctx`, embedding at most `max_diff_chars` of it
    pub async fn suggest_commit(&self, ctx: &CommitContext, max_diff_chars: usize) -> Result<String> {
        let raw = self
            .run(&Task::CommitSuggestion { max_diff_chars }, ctx)
            .await?;
        Ok(extract_commit_message(&raw))
    }

    /// Weekly summary or on-demand analysis, depending on the context marker
    pub async fn summarize(&self, ctx: &CommitContext) -> Result<String> {
        let text = self.run(&Task::Summary, ctx).await?;
        Ok(text.trim().to_string())
    }

    /// Issue title and body; falls back to the template on any failure
    pub async fn draft_issue(&self, description: &str, draft: &IssueDraft) -> IssueText {
        let ctx = CommitContext::new(description);
        match self.run(&Task::IssueCreate(draft), &ctx).await {
            Ok(raw) => match split_title_body(&raw) {
                Some(issue) => IssueText {
                    title: issue.title,
                    body: with_issue_footer(&issue.body),
                },
                None => {
                    tracing::warn!("AI issue response had no title/body delimiter");
                    fallback_issue(description, &draft.owner, &draft.repo)
                }
            },
            Err(e) => {
                tracing::warn!("AI issue generation failed: {}", e);
                fallback_issue(description, &draft.owner, &draft.repo)
            }
        }
    }

    /// Issue comment; falls back to the raw description on failure
    pub async fn draft_comment(&self, description: &str, draft: &CommentDraft) -> String {
        let ctx = CommitContext::new(description);
        match self.run(&Task::IssueComment(draft), &ctx).await {
            Ok(text) if !text.trim().is_empty() => with_comment_footer(text.trim()),
            Ok(_) => fallback_comment(description),
            Err(e) => {
                tracing::warn!("AI comment generation failed: {}", e);
                fallback_comment(description)
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Feedback engine
// ─────────────────────────────────────────────────────────────────────────────

/// Where commit feedback comes from
pub enum FeedbackEngine {
    Local(LocalFeedback),
    Ai {
        assistant: Assistant,
        username: String,
        repo_name: String,
    },
}

impl FeedbackEngine {
    /// Feedback text for the commit in `ctx`
    ///
    /// The local engine never fails. AI failures are returned so the caller
    /// can report them and fall back to [`LocalFeedback`].
    pub async fn generate_feedback(&self, ctx: &CommitContext) -> Result<String> {
        match self {
            FeedbackEngine::Local(local) => Ok(local.feedback(&ctx.message).to_string()),
            FeedbackEngine::Ai {
                assistant,
                username,
                repo_name,
            } => assistant.feedback(ctx, username, repo_name).await,
        }
    }

    pub fn is_ai(&self) -> bool {
        matches!(self, FeedbackEngine::Ai { .. })
    }
}
