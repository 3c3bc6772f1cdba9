//! noidea - the Git extension you never knew you needed
//!
//! Every time you commit, a mysterious Moai appears to judge your code.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use noidea::cli::commands::{Cli, Commands};
use noidea::cli::{auth, config, init, issue, moai, suggest, summary, update};
use noidea::core::config::Config;
use noidea::core::git::GitRepository;
use noidea::error::{NoideaError, Result};

#[tokio::main]
async fn main() {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    start_background_checks(&cli.command);

    match cli.command {
        Commands::Moai(args) => moai::handle_moai(args).await,
        Commands::Issue(args) => issue::handle_issue(args.command).await,
        Commands::GithubAuth(args) => auth::handle_github_auth(args.command).await,
        Commands::Config(args) => config::handle_config(args.command),
        Commands::Update(args) => update::handle_update(args.command).await,
        Commands::Suggest(args) => {
            ensure_git_repository()?;
            suggest::handle_suggest(args).await
        }
        Commands::Summary(args) => {
            ensure_git_repository()?;
            summary::handle_summary(args).await
        }
        Commands::Init(args) => {
            ensure_git_repository()?;
            init::handle_init(args)
        }
    }
}

/// Detached update and API key checks; quiet hook runs skip them
fn start_background_checks(command: &Commands) {
    let (run_checks, validate_key) = match command {
        Commands::Suggest(args) => (!args.quiet, !args.quiet),
        Commands::Moai(_) | Commands::Summary(_) => (true, true),
        Commands::Update(_) => (false, false),
        _ => (true, false),
    };

    if !run_checks {
        return;
    }

    match Config::load() {
        Ok(config) => update::spawn_background_checks(&config, validate_key),
        Err(e) => tracing::debug!("Skipping background checks: {}", e),
    }
}

/// Ensure we're in a git repository
fn ensure_git_repository() -> Result<()> {
    if !GitRepository::is_git_repository() {
        return Err(NoideaError::NotGitRepository);
    }
    Ok(())
}
