//! Secure credential storage using the system keyring
//!
//! This module handles secure storage of sensitive credentials:
//! - The GitHub personal access token
//! - One LLM API key per provider
//!
//! Uses the system keyring (macOS Keychain, Linux Secret Service) with
//! in-memory caching to minimize keychain prompts.
//!
//! ## Environment Variable Fallback
//!
//! For development and CI, you can set credentials via environment variables:
//! - `GITHUB_TOKEN` - GitHub token
//! - `NOIDEA_API_KEY` - API key for whichever provider is configured
//! - `OPENAI_API_KEY`, `XAI_API_KEY`, `DEEPSEEK_API_KEY` - provider specific
//!
//! Priority: env var > cache > keyring

use std::collections::HashMap;
use std::sync::RwLock;

use keyring::Entry;
use once_cell::sync::Lazy;
use secrecy::{ExposeSecret, SecretString};

use crate::ai::client::ProviderConfig;
use crate::error::{NoideaError, Result};

const SERVICE_NAME: &str = "noidea";
const GITHUB_TOKEN_KEY: &str = "github_token";
const API_KEY_PREFIX: &str = "api_key_";

// Environment variable names
const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";
const NOIDEA_API_KEY_ENV: &str = "NOIDEA_API_KEY";

// In-memory credential cache
// Option<Option<T>>:
//   - None = not yet fetched from keyring
//   - Some(None) = fetched, but no credential exists
//   - Some(Some(value)) = fetched and cached
static GITHUB_TOKEN_CACHE: Lazy<RwLock<Option<Option<SecretString>>>> =
    Lazy::new(|| RwLock::new(None));

// Keyed by provider id; a missing entry means not yet fetched
static API_KEY_CACHE: Lazy<RwLock<HashMap<String, Option<SecretString>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Credential store for secure token management
pub struct CredentialStore;

impl CredentialStore {
    // ─────────────────────────────────────────────────────────────────────────
    // Keyring primitives
    // ─────────────────────────────────────────────────────────────────────────

    fn store(account: &str, secret: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, account)?;
        entry.set_password(secret)?;
        Ok(())
    }

    fn fetch(account: &str) -> Result<Option<SecretString>> {
        let entry = Entry::new(SERVICE_NAME, account)?;
        match entry.get_password() {
            Ok(password) => Ok(Some(SecretString::from(password))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(NoideaError::Credential(format!(
                "Cannot access system keychain. Make sure your keyring is unlocked. ({})",
                e
            ))),
        }
    }

    fn delete(account: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, account)?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()), // Already deleted
            Err(e) => Err(NoideaError::Credential(e.to_string())),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // GitHub Token
    // ─────────────────────────────────────────────────────────────────────────

    /// Store the GitHub token securely
    ///
    /// Updates both the keyring and the in-memory cache.
    pub fn store_github_token(token: &str) -> Result<()> {
        Self::store(GITHUB_TOKEN_KEY, token)?;

        if let Ok(mut cache) = GITHUB_TOKEN_CACHE.write() {
            *cache = Some(Some(SecretString::from(token.to_string())));
        }

        Ok(())
    }

    /// Retrieve the stored GitHub token
    ///
    /// Priority: environment variable > cache > keyring
    pub fn get_github_token() -> Result<Option<SecretString>> {
        if let Some(token) = non_empty_env(GITHUB_TOKEN_ENV) {
            return Ok(Some(token));
        }

        if let Ok(cache) = GITHUB_TOKEN_CACHE.read() {
            if let Some(cached_value) = cache.as_ref() {
                return Ok(cached_value.clone());
            }
        }

        let result = Self::fetch(GITHUB_TOKEN_KEY)?;

        if let Ok(mut cache) = GITHUB_TOKEN_CACHE.write() {
            *cache = Some(result.clone());
        }

        Ok(result)
    }

    /// Delete the stored GitHub token
    ///
    /// Clears both the keyring and the in-memory cache.
    pub fn delete_github_token() -> Result<()> {
        let result = Self::delete(GITHUB_TOKEN_KEY);

        if let Ok(mut cache) = GITHUB_TOKEN_CACHE.write() {
            *cache = Some(None);
        }

        result
    }

    /// Whether the GitHub token comes from the environment
    pub fn github_token_from_env() -> bool {
        non_empty_env(GITHUB_TOKEN_ENV).is_some()
    }

    /// Get the GitHub token, returning an error if not authenticated
    pub fn require_github_token() -> Result<SecretString> {
        Self::get_github_token()?.ok_or(NoideaError::NotAuthenticated)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // LLM API keys
    // ─────────────────────────────────────────────────────────────────────────

    fn api_key_account(provider: &ProviderConfig) -> String {
        format!("{}{}", API_KEY_PREFIX, provider.id)
    }

    /// Store the API key for a provider
    pub fn store_api_key(provider: &ProviderConfig, key: &str) -> Result<()> {
        Self::store(&Self::api_key_account(provider), key)?;

        if let Ok(mut cache) = API_KEY_CACHE.write() {
            cache.insert(
                provider.id.clone(),
                Some(SecretString::from(key.to_string())),
            );
        }

        Ok(())
    }

    /// Retrieve the API key for a provider
    ///
    /// Priority: `NOIDEA_API_KEY` > provider env var > cache > keyring
    pub fn get_api_key(provider: &ProviderConfig) -> Result<Option<SecretString>> {
        if let Some(key) = api_key_from_env(provider, |name| std::env::var(name).ok()) {
            return Ok(Some(key));
        }

        if let Ok(cache) = API_KEY_CACHE.read() {
            if let Some(cached_value) = cache.get(&provider.id) {
                return Ok(cached_value.clone());
            }
        }

        let result = Self::fetch(&Self::api_key_account(provider))?;

        if let Ok(mut cache) = API_KEY_CACHE.write() {
            cache.insert(provider.id.clone(), result.clone());
        }

        Ok(result)
    }

    /// Delete the stored API key for a provider
    pub fn delete_api_key(provider: &ProviderConfig) -> Result<()> {
        let result = Self::delete(&Self::api_key_account(provider));

        if let Ok(mut cache) = API_KEY_CACHE.write() {
            cache.insert(provider.id.clone(), None);
        }

        result
    }

    /// Get the API key, returning an error naming the provider if missing
    pub fn require_api_key(provider: &ProviderConfig) -> Result<SecretString> {
        Self::get_api_key(provider)?
            .ok_or_else(|| NoideaError::ApiKeyMissing(provider.display_name.clone()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Utility Methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Get a masked version of a token for display (shows first 4 and last 4 chars)
    pub fn mask_token(token: &SecretString) -> String {
        let exposed = token.expose_secret();
        if exposed.chars().count() <= 8 {
            "*".repeat(exposed.chars().count())
        } else {
            let head: String = exposed.chars().take(4).collect();
            let tail: String = exposed
                .chars()
                .rev()
                .take(4)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            format!("{}...{}", head, tail)
        }
    }
}

fn non_empty_env(name: &str) -> Option<SecretString> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(SecretString::from)
}

/// API key from the environment: the generic variable wins over the provider one
fn api_key_from_env(
    provider: &ProviderConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<SecretString> {
    [NOIDEA_API_KEY_ENV.to_string(), provider.api_key_env()]
        .iter()
        .filter_map(|name| lookup(name))
        .find(|v| !v.trim().is_empty())
        .map(|v| SecretString::from(v.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::client::ProviderTable;

    #[test]
    fn test_mask_token() {
        let short = SecretString::from("abc");
        assert_eq!(CredentialStore::mask_token(&short), "***");

        let long = SecretString::from("sk-1234567890abcdef");
        assert_eq!(CredentialStore::mask_token(&long), "sk-1...cdef");
    }

    #[test]
    fn test_generic_env_key_wins() {
        let table = ProviderTable::builtin();
        let xai = table.resolve("xai");

        let key = api_key_from_env(xai, |name| match name {
            "NOIDEA_API_KEY" => Some("generic".to_string()),
            "XAI_API_KEY" => Some("specific".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(key.expose_secret(), "generic");
    }

    #[test]
    fn test_provider_env_key() {
        let table = ProviderTable::builtin();
        let deepseek = table.resolve("deepseek");

        let key = api_key_from_env(deepseek, |name| match name {
            "NOIDEA_API_KEY" => Some("  ".to_string()),
            "DEEPSEEK_API_KEY" => Some("ds-key".to_string()),
            "OPENAI_API_KEY" => Some("wrong".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(key.expose_secret(), "ds-key");

        assert!(api_key_from_env(deepseek, |_| None).is_none());
    }
}
