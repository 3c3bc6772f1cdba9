//! Update CLI command handlers and startup background checks

use crate::ai::ChatClient;
use crate::cli::commands::UpdateCommand;
use crate::cli::configured_provider;
use crate::core::config::Config;
use crate::core::credentials::CredentialStore;
use crate::core::update::{check_for_update, current_version, UpdateCheckResult, UpdatePersistentState};
use crate::error::Result;

/// Handle update commands
pub async fn handle_update(command: UpdateCommand) -> Result<()> {
    match command {
        UpdateCommand::Check => handle_check().await,
    }
}

/// Check for available updates
async fn handle_check() -> Result<()> {
    let current = current_version();
    println!("noidea v{}", current);
    println!();
    println!("Checking for updates...");

    let mut state = UpdatePersistentState::load().unwrap_or_default();

    match check_for_update().await {
        Ok(UpdateCheckResult::UpToDate) => {
            state.mark_checked();
            let _ = state.save();
            println!("You are running the latest version.");
        }
        Ok(UpdateCheckResult::Available { version, url }) => {
            state.mark_checked();
            let _ = state.save();

            println!();
            println!("New version available: v{}", version);
            println!("  {}", url);
        }
        Err(e) => {
            eprintln!("Failed to check for updates: {}", e);
        }
    }

    Ok(())
}

/// Spawn the startup checks as detached tasks
///
/// Results are printed to stderr if they arrive before the command finishes.
pub fn spawn_background_checks(config: &Config, validate_api_key: bool) {
    spawn_update_check();
    if validate_api_key && config.llm.enabled {
        spawn_key_validation(config);
    }
}

fn spawn_update_check() {
    tokio::spawn(async {
        let mut state = UpdatePersistentState::load().unwrap_or_default();
        if !state.should_check() {
            return;
        }

        match check_for_update().await {
            Ok(UpdateCheckResult::Available { version, url }) => {
                eprintln!();
                eprintln!("🔔 Update available! v{} → v{}", current_version(), version);
                eprintln!("   {}", url);
                eprintln!("   Run: noidea update check");
            }
            Ok(UpdateCheckResult::UpToDate) => {}
            Err(e) => {
                tracing::debug!("Background update check failed: {}", e);
                return;
            }
        }

        state.mark_checked();
        let _ = state.save();
    });
}

fn spawn_key_validation(config: &Config) {
    let provider = configured_provider(config);
    let Ok(Some(api_key)) = CredentialStore::get_api_key(&provider) else {
        return;
    };

    tokio::spawn(async move {
        let display_name = provider.display_name.clone();
        let client = match ChatClient::new(provider, api_key, None) {
            Ok(client) => client,
            Err(e) => {
                tracing::debug!("Could not build validation client: {}", e);
                return;
            }
        };

        match client.validate_key().await {
            Ok(true) => {}
            Ok(false) => {
                eprintln!();
                eprintln!("❌ Warning: Your API key for {} appears to be invalid.", display_name);
                eprintln!("      Please update it with 'noidea config set api-key <key>'");
                eprintln!();
            }
            Err(e) => {
                eprintln!();
                eprintln!("⚠️  Warning: {}", e);
                eprintln!("      You may want to check your API key with 'noidea config get api-key'");
                eprintln!();
            }
        }
    });
}
