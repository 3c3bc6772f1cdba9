//! CLI command definitions using clap
//!
//! Defines the command structure for the `noidea` CLI tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::github::IssueFilter;

/// noidea - the Git extension you never knew you needed
///
/// Every time you commit, a mysterious Moai appears to judge your code.
#[derive(Parser, Debug)]
#[command(name = "noidea", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show feedback about your most recent commit
    Moai(MoaiArgs),

    /// Suggest a commit message for the staged changes
    Suggest(SuggestArgs),

    /// Summarize recent Git activity
    Summary(SummaryArgs),

    /// Manage GitHub issues
    Issue(IssueArgs),

    /// Authenticate with GitHub
    #[command(name = "github-auth")]
    GithubAuth(GithubAuthArgs),

    /// Manage configuration
    Config(ConfigArgs),

    /// Install noidea Git hooks in the current repository
    Init(InitArgs),

    /// Check for new releases
    Update(UpdateArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Moai
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug, Default)]
pub struct MoaiArgs {
    /// Commit message to judge (defaults to the last commit)
    pub message: Vec<String>,

    /// Use AI to generate feedback
    #[arg(short, long)]
    pub ai: bool,

    /// Include the last commit's diff
    #[arg(short, long)]
    pub diff: bool,

    /// Personality to use for AI feedback
    #[arg(short, long)]
    pub personality: Option<String>,

    /// List available personalities
    #[arg(short, long)]
    pub list_personalities: bool,

    /// Include recent commit history as context
    #[arg(short = 'H', long)]
    pub history: bool,

    /// Print provider details while generating feedback
    #[arg(short = 'D', long)]
    pub debug: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Suggest
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug, Default)]
pub struct SuggestArgs {
    /// Number of recent commit messages to send as context
    #[arg(short = 'n', long)]
    pub history: Option<usize>,

    /// Send the full diff instead of a truncated one
    #[arg(short = 'f', long)]
    pub full_diff: bool,

    /// Write the suggestion into a commit message file
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Only print the message itself
    #[arg(short, long)]
    pub quiet: bool,

    /// Skip the model and use a generic message
    #[arg(long)]
    pub no_ai: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Summary
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
pub struct SummaryArgs {
    /// Number of days to include
    #[arg(short, long, default_value = "7")]
    pub days: i64,

    /// Analyze the last N commits instead of a time window
    #[arg(short, long)]
    pub last: Option<usize>,

    /// Generate the summary with AI
    #[arg(short, long)]
    pub ai: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Issue Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Issue commands
#[derive(Parser, Debug)]
pub struct IssueArgs {
    #[command(subcommand)]
    pub command: IssueCommand,
}

#[derive(Subcommand, Debug)]
pub enum IssueCommand {
    /// List issues
    List {
        /// Filter by state
        #[arg(short, long, default_value = "open")]
        state: IssueState,

        /// Maximum number of issues to show
        #[arg(short = 'n', long, default_value = "10")]
        limit: u8,

        /// Show only open issues
        #[arg(long, conflicts_with = "closed")]
        open: bool,

        /// Show only closed issues
        #[arg(long)]
        closed: bool,
    },

    /// View an issue
    View {
        /// Issue number
        number: u64,
    },

    /// Create an issue
    Create {
        /// Issue title
        #[arg(short, long)]
        title: Option<String>,

        /// Issue body
        #[arg(short, long)]
        body: Option<String>,

        /// Comma-separated labels
        #[arg(short, long)]
        labels: Option<String>,

        /// Generate title and body with AI from a description
        #[arg(long)]
        ai: bool,

        /// Files to reference in the issue
        #[arg(short, long, value_delimiter = ',')]
        files: Vec<PathBuf>,

        /// Additional context for the AI
        #[arg(short, long)]
        context: Option<String>,

        /// Reference the files changed in the working tree
        #[arg(long)]
        scan: bool,

        /// Personality used for AI generation
        #[arg(short, long)]
        personality: Option<String>,
    },

    /// Close an issue
    Close {
        /// Issue number
        number: u64,

        /// Closing comment
        #[arg(short, long)]
        comment: Option<String>,

        /// Generate the closing comment with AI
        #[arg(long)]
        ai: bool,

        /// Don't print the closed issue URL
        #[arg(short, long)]
        quiet: bool,
    },

    /// Comment on an issue
    Comment {
        /// Issue number
        number: u64,

        /// Comment body
        #[arg(short, long)]
        body: Option<String>,

        /// Generate the comment with AI
        #[arg(long)]
        ai: bool,

        /// Files to reference in the comment
        #[arg(short, long, value_delimiter = ',')]
        files: Vec<PathBuf>,
    },
}

/// Issue state for filtering
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum IssueState {
    #[default]
    Open,
    Closed,
    All,
}

impl From<IssueState> for IssueFilter {
    fn from(state: IssueState) -> Self {
        match state {
            IssueState::Open => IssueFilter::Open,
            IssueState::Closed => IssueFilter::Closed,
            IssueState::All => IssueFilter::All,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// GitHub Auth Commands
// ─────────────────────────────────────────────────────────────────────────────

/// GitHub authentication commands
#[derive(Parser, Debug)]
pub struct GithubAuthArgs {
    #[command(subcommand)]
    pub command: GithubAuthCommand,
}

#[derive(Subcommand, Debug)]
pub enum GithubAuthCommand {
    /// Store a GitHub Personal Access Token
    Login,
    /// Show current authentication status
    Status,
    /// Remove the stored token
    Logout,
}

// ─────────────────────────────────────────────────────────────────────────────
// Config Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration commands
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Set a configuration value
    Set {
        /// Key: api-key, provider, model, personality, ai-enabled
        key: String,
        /// Value to set
        value: String,
    },
    /// Get a configuration value
    Get {
        /// Key to read
        key: String,
    },
    /// Reset a configuration value to its default
    Remove {
        /// Key to reset
        key: String,
    },
    /// Show the configuration file location and contents
    Show,
}

// ─────────────────────────────────────────────────────────────────────────────
// Init
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug, Default)]
pub struct InitArgs {
    /// Don't enable commit message suggestions
    #[arg(long)]
    pub no_suggest: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Update Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Update commands
#[derive(Parser, Debug)]
pub struct UpdateArgs {
    #[command(subcommand)]
    pub command: UpdateCommand,
}

#[derive(Subcommand, Debug)]
pub enum UpdateCommand {
    /// Check whether a newer release exists
    Check,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_moai_parses_message_words() {
        let cli = Cli::try_parse_from(["noidea", "moai", "--ai", "fix", "the", "bug"]).unwrap();
        match cli.command {
            Commands::Moai(args) => {
                assert!(args.ai);
                assert_eq!(args.message.join(" "), "fix the bug");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_issue_create_splits_files() {
        let cli = Cli::try_parse_from([
            "noidea", "issue", "create", "--ai", "--files", "a.rs,b.rs",
        ])
        .unwrap();
        match cli.command {
            Commands::Issue(IssueArgs {
                command: IssueCommand::Create { files, ai, .. },
            }) => {
                assert!(ai);
                assert_eq!(files, vec![PathBuf::from("a.rs"), PathBuf::from("b.rs")]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_github_auth_name() {
        let cli = Cli::try_parse_from(["noidea", "github-auth", "status"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::GithubAuth(GithubAuthArgs {
                command: GithubAuthCommand::Status
            })
        ));
    }

    #[test]
    fn test_issue_list_defaults() {
        let cli = Cli::try_parse_from(["noidea", "issue", "list"]).unwrap();
        match cli.command {
            Commands::Issue(IssueArgs {
                command: IssueCommand::List { state, limit, .. },
            }) => {
                assert_eq!(state, IssueState::Open);
                assert_eq!(limit, 10);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
