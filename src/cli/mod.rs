//! CLI module for noidea
//!
//! This module contains all CLI command definitions and handlers using clap.

pub mod auth;
pub mod commands;
pub mod config;
pub mod init;
pub mod issue;
pub mod moai;
pub mod suggest;
pub mod summary;
pub mod update;

use std::io::{self, BufRead, Write};

use crate::ai::{Assistant, ChatClient, PersonalitySet, ProviderConfig, ProviderTable};
use crate::core::config::Config;
use crate::core::credentials::CredentialStore;
use crate::error::Result;

pub use commands::{Cli, Commands};

/// Provider selected by the configuration, with any endpoint override applied
pub(crate) fn configured_provider(config: &Config) -> ProviderConfig {
    let table = ProviderTable::builtin();
    let provider = table.resolve(&config.llm.provider).clone();
    match &config.llm.base_url {
        Some(url) if !url.trim().is_empty() => provider.with_base_url(url.trim()),
        _ => provider,
    }
}

/// Build an assistant from the configuration and stored credentials
///
/// Fails with `ApiKeyMissing` when no key is available for the provider.
pub(crate) fn build_assistant(config: &Config, personality: Option<&str>) -> Result<Assistant> {
    let provider = configured_provider(config);
    let api_key = CredentialStore::require_api_key(&provider)?;
    let client = ChatClient::new(provider, api_key, config.model())?;

    let personalities = PersonalitySet::load_or_builtin(config.moai.personality_file.as_deref());
    let personality = personality
        .filter(|p| !p.trim().is_empty())
        .unwrap_or(&config.moai.personality)
        .to_string();

    Ok(Assistant::new(
        Box::new(client),
        config.model().map(str::to_string),
        personalities,
        personality,
    ))
}

/// Print `label` and read one trimmed line from stdin
pub(crate) fn prompt_line(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Ask a `[Y/n]` question; an empty answer means yes
pub(crate) fn confirm(question: &str) -> Result<bool> {
    let answer = prompt_line(&format!("{} [Y/n] ", question))?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    let choice = answer.trim().to_lowercase();
    choice.is_empty() || choice == "y" || choice == "yes"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        assert!(is_yes(""));
        assert!(is_yes("Y"));
        assert!(is_yes(" yes "));
        assert!(!is_yes("n"));
        assert!(!is_yes("nope"));
    }

    #[test]
    fn test_configured_provider_applies_base_url() {
        let mut config = Config::default();
        config.llm.provider = "deepseek".to_string();
        config.llm.base_url = Some("http://localhost:9999/v1".to_string());

        let provider = configured_provider(&config);
        assert_eq!(provider.id, "deepseek");
        assert_eq!(provider.base_url, "http://localhost:9999/v1");
    }

    #[test]
    fn test_configured_provider_unknown_falls_back() {
        let mut config = Config::default();
        config.llm.provider = "mystery".to_string();
        assert_eq!(configured_provider(&config).id, "openai");
    }
}
