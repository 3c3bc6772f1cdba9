//! GitHub authentication CLI command handlers

use octocrab::Octocrab;
use secrecy::{ExposeSecret, SecretString};

use crate::cli::commands::GithubAuthCommand;
use crate::cli::prompt_line;
use crate::core::credentials::CredentialStore;
use crate::error::{NoideaError, Result};
use crate::github::open_browser;

const TOKEN_URL: &str =
    "https://github.com/settings/tokens/new?scopes=repo&description=noidea";

/// Handle github-auth commands
pub async fn handle_github_auth(command: GithubAuthCommand) -> Result<()> {
    match command {
        GithubAuthCommand::Login => handle_login().await,
        GithubAuthCommand::Status => handle_status().await,
        GithubAuthCommand::Logout => handle_logout(),
    }
}

/// Store a Personal Access Token after checking it against the API
async fn handle_login() -> Result<()> {
    if CredentialStore::github_token_from_env() {
        println!("✓ Using GITHUB_TOKEN from the environment.");
        println!();
        println!("  Unset it to store a token in the system keyring instead.");
        return Ok(());
    }

    println!("GitHub Personal Access Token");
    println!("============================");
    println!();
    println!("To create a token:");
    println!("  1. Go to: https://github.com/settings/tokens/new");
    println!("  2. Give it a name (e.g., 'noidea')");
    println!("  3. Select the 'repo' scope");
    println!("  4. Click 'Generate token' and copy it");
    println!();

    if open_browser(TOKEN_URL) {
        println!("✓ Browser opened to token creation page.");
        println!();
    }

    let token = prompt_line("Paste your token here: ")?;
    if token.is_empty() {
        return Err(NoideaError::InvalidInput("No token provided".to_string()));
    }

    println!();
    println!("Validating token...");
    let login = validate_token(&SecretString::from(token.clone())).await?;
    println!("✓ Token valid! Logged in as @{}", login);

    CredentialStore::store_github_token(&token)?;

    println!();
    println!("✓ GitHub token stored securely.");
    Ok(())
}

/// Check a token by fetching the authenticated user; returns the login
async fn validate_token(token: &SecretString) -> Result<String> {
    let octocrab = Octocrab::builder()
        .personal_token(token.expose_secret().to_string())
        .build()
        .map_err(|e| NoideaError::AuthenticationFailed(e.to_string()))?;

    let user = octocrab.current().user().await.map_err(|_| {
        NoideaError::AuthenticationFailed(
            "Invalid token. Please check the token and try again.".to_string(),
        )
    })?;

    Ok(user.login)
}

fn handle_logout() -> Result<()> {
    if CredentialStore::get_github_token()?.is_none() {
        println!("Not currently authenticated.");
        return Ok(());
    }

    CredentialStore::delete_github_token()?;
    println!("Successfully logged out.");

    if CredentialStore::github_token_from_env() {
        println!("  GITHUB_TOKEN is still set in the environment.");
    }
    Ok(())
}

async fn handle_status() -> Result<()> {
    let Some(token) = CredentialStore::get_github_token()? else {
        println!("GitHub: Not authenticated");
        println!();
        println!("  Run: noidea github-auth login");
        return Ok(());
    };

    let source = if CredentialStore::github_token_from_env() {
        "GITHUB_TOKEN"
    } else {
        "system keyring"
    };

    println!("GitHub: Authenticated");
    println!("  Token: {} (from {})", CredentialStore::mask_token(&token), source);

    match validate_token(&token).await {
        Ok(login) => println!("  User: @{}", login),
        Err(e) => println!("  ❌ {}", e),
    }

    Ok(())
}
