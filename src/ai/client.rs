//! OpenAI-compatible chat completion client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::ai::prompts::PromptPair;
use crate::error::{NoideaError, Result};

/// Timeout for completion requests
const COMPLETION_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for API key validation
const VALIDATION_TIMEOUT: Duration = Duration::from_secs(5);

// ─────────────────────────────────────────────────────────────────────────────
// Providers
// ─────────────────────────────────────────────────────────────────────────────

/// Connection details for one provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Short identifier used in configuration (`openai`, `xai`, ...)
    pub id: String,
    pub base_url: String,
    pub default_model: String,
    pub display_name: String,
}

impl ProviderConfig {
    fn new(id: &str, base_url: &str, default_model: &str, display_name: &str) -> Self {
        Self {
            id: id.to_string(),
            base_url: base_url.to_string(),
            default_model: default_model.to_string(),
            display_name: display_name.to_string(),
        }
    }

    /// Same provider at a different endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Environment variable holding this provider's API key
    pub fn api_key_env(&self) -> String {
        format!("{}_API_KEY", self.id.to_uppercase())
    }
}

/// Known providers; the first entry is the default
#[derive(Debug, Clone)]
pub struct ProviderTable {
    providers: Vec<ProviderConfig>,
}

impl Default for ProviderTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProviderTable {
    pub fn builtin() -> Self {
        Self {
            providers: vec![
                ProviderConfig::new("openai", "https://api.openai.com/v1", "gpt-3.5-turbo", "OpenAI"),
                ProviderConfig::new("xai", "https://api.x.ai/v1", "grok-2-1212", "xAI"),
                ProviderConfig::new(
                    "deepseek",
                    "https://api.deepseek.com/v1",
                    "deepseek-chat",
                    "DeepSeek",
                ),
            ],
        }
    }

    /// Resolve a provider by id, falling back to the default for unknown names
    pub fn resolve(&self, name: &str) -> &ProviderConfig {
        let name = name.trim().to_lowercase();
        self.providers
            .iter()
            .find(|p| p.id == name)
            .unwrap_or_else(|| self.default_provider())
    }

    pub fn default_provider(&self) -> &ProviderConfig {
        &self.providers[0]
    }

    /// Whether `name` is a known provider id
    pub fn contains(&self, name: &str) -> bool {
        let name = name.trim().to_lowercase();
        self.providers.iter().any(|p| p.id == name)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.providers.iter().map(|p| p.id.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Completion seam
// ─────────────────────────────────────────────────────────────────────────────

/// A single chat completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn from_prompt(prompt: PromptPair, model: impl Into<String>) -> Self {
        Self {
            system: prompt.system,
            user: prompt.user,
            model: model.into(),
            temperature: prompt.temperature,
            max_tokens: prompt.max_tokens,
        }
    }
}

/// Anything that can answer a chat completion request
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Run one non-streaming completion and return the first candidate's text
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// Display name used in error messages
    fn provider_name(&self) -> String;

    /// Model used when the caller has no preference
    fn default_model(&self) -> String;
}

// ─────────────────────────────────────────────────────────────────────────────
// HTTP client
// ─────────────────────────────────────────────────────────────────────────────

/// Chat completion client for one provider
pub struct ChatClient {
    client: Client,
    provider: ProviderConfig,
    api_key: SecretString,
    model: String,
}

impl ChatClient {
    /// Create a client; an empty `model` selects the provider's default
    pub fn new(provider: ProviderConfig, api_key: SecretString, model: Option<&str>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(format!("noidea/{}", env!("CARGO_PKG_VERSION")))
            .timeout(COMPLETION_TIMEOUT)
            .build()?;

        let model = model
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| provider.default_model.clone());

        Ok(Self {
            client,
            provider,
            api_key,
            model,
        })
    }

    /// Model this client sends requests for
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider(&self) -> &ProviderConfig {
        &self.provider
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.provider.base_url.trim_end_matches('/'), path)
    }

    fn error(&self, message: impl std::fmt::Display) -> NoideaError {
        NoideaError::provider(&self.provider.display_name, message)
    }

    /// Check the API key against the provider's model listing
    pub async fn validate_key(&self) -> Result<bool> {
        let response = self
            .client
            .get(self.endpoint("models"))
            .bearer_auth(self.api_key.expose_secret())
            .timeout(VALIDATION_TIMEOUT)
            .send()
            .await
            .map_err(|e| self.error(e))?;

        Ok(response.status().is_success())
    }
}

#[async_trait]
impl CompletionProvider for ChatClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let model = if request.model.is_empty() {
            self.model.as_str()
        } else {
            request.model.as_str()
        };

        let body = ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            n: 1,
            stream: false,
        };

        tracing::debug!(
            "Requesting completion from {} (model {})",
            self.provider.display_name,
            model
        );

        let response = self
            .client
            .post(self.endpoint("chat/completions"))
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(self.error(format!("status {}: {}", status, detail.trim())));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| self.error(e))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| self.error("no response choices returned"))
    }

    fn provider_name(&self) -> String {
        self.provider.display_name.clone()
    }

    fn default_model(&self) -> String {
        self.model.clone()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    n: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider_resolves_to_default() {
        let table = ProviderTable::builtin();
        let p = table.resolve("mystery-llm");
        assert_eq!(p.base_url, "https://api.openai.com/v1");
        assert_eq!(p.default_model, "gpt-3.5-turbo");
        assert_eq!(p, table.default_provider());
    }

    #[test]
    fn test_known_providers() {
        let table = ProviderTable::builtin();
        assert_eq!(table.resolve("xai").default_model, "grok-2-1212");
        assert_eq!(table.resolve("DeepSeek").base_url, "https://api.deepseek.com/v1");
        assert!(table.contains("xai"));
        assert!(!table.contains("gemini"));
        assert_eq!(table.ids().collect::<Vec<_>>(), vec!["openai", "xai", "deepseek"]);
    }

    #[test]
    fn test_api_key_env_name() {
        let table = ProviderTable::builtin();
        assert_eq!(table.resolve("xai").api_key_env(), "XAI_API_KEY");
        assert_eq!(table.resolve("openai").api_key_env(), "OPENAI_API_KEY");
    }

    #[test]
    fn test_empty_model_uses_provider_default() {
        let provider = ProviderTable::builtin().resolve("xai").clone();
        let client = ChatClient::new(provider.clone(), SecretString::from("k"), Some("  ")).unwrap();
        assert_eq!(client.model(), "grok-2-1212");

        let client = ChatClient::new(provider, SecretString::from("k"), Some("grok-beta")).unwrap();
        assert_eq!(client.model(), "grok-beta");
    }

    #[test]
    fn test_request_serialization() {
        let body = ChatRequest {
            model: "m",
            messages: vec![ChatMessage {
                role: "system",
                content: "s",
            }],
            temperature: 0.5,
            max_tokens: 10,
            n: 1,
            stream: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["n"], 1);
        assert_eq!(json["max_tokens"], 10);
        assert_eq!(json["messages"][0]["role"], "system");
    }
}
