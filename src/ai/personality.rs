//! Feedback personalities
//!
//! A personality bundles the prompt wording and decoding parameters used for
//! commit feedback. Built-in personalities can be extended or overridden by a
//! TOML file:
//!
//! ```toml
//! default = "snarky_reviewer"
//!
//! [personalities.pirate]
//! name = "Pirate"
//! description = "Reviews commits like a salty sea dog"
//! system_prompt = "You are a pirate. Reply with a one-liner."
//! user_prompt_template = "Commit: {message}"
//! max_tokens = 120
//! temperature = 0.9
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Name of the built-in default personality
pub const DEFAULT_PERSONALITY: &str = "snarky_reviewer";

/// Prompt wording and decoding parameters for feedback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    pub name: String,
    pub description: String,
    pub system_prompt: String,
    /// Template with `{message}`, `{time_of_day}`, `{diff}`, `{username}`,
    /// `{repo_name}` and `{commit_history}` placeholders
    #[serde(alias = "user_prompt_format")]
    pub user_prompt_template: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_max_tokens() -> u32 {
    150
}

fn default_temperature() -> f32 {
    0.7
}

/// Values substituted into a personality's user prompt template
#[derive(Debug, Clone, Default)]
pub struct PromptVars<'a> {
    pub message: &'a str,
    pub time_of_day: &'a str,
    pub diff: &'a str,
    pub username: &'a str,
    pub repo_name: &'a str,
    pub commit_history: &'a str,
}

impl Personality {
    /// Render the user prompt for this personality
    pub fn render_user_prompt(&self, vars: &PromptVars<'_>) -> String {
        self.user_prompt_template
            .replace("{message}", vars.message)
            .replace("{time_of_day}", vars.time_of_day)
            .replace("{diff}", vars.diff)
            .replace("{username}", vars.username)
            .replace("{repo_name}", vars.repo_name)
            .replace("{commit_history}", vars.commit_history)
    }

    /// Whether the system prompt asks for a single short line
    pub fn is_one_liner(&self) -> bool {
        self.system_prompt.contains("one-liner") || self.system_prompt.contains("one sentence")
    }
}

/// Immutable set of personalities with a default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalitySet {
    pub default: String,
    pub personalities: BTreeMap<String, Personality>,
}

#[derive(Debug, Deserialize)]
struct PersonalityFile {
    default: Option<String>,
    #[serde(default)]
    personalities: BTreeMap<String, Personality>,
}

impl Default for PersonalitySet {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PersonalitySet {
    /// Load built-ins merged with an optional personality file
    ///
    /// A missing file yields the built-ins. A file that fails to parse is an
    /// error so the caller can warn before falling back.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut set = Self::builtin();
        let Some(path) = path else {
            return Ok(set);
        };
        if !path.exists() {
            tracing::debug!("Personality file {} not found, using built-ins", path.display());
            return Ok(set);
        }

        let contents = fs::read_to_string(path)?;
        let file: PersonalityFile = toml::from_str(&contents)?;
        set.personalities.extend(file.personalities);

        if let Some(default) = file.default {
            if set.personalities.contains_key(&default) {
                set.default = default;
            } else {
                tracing::warn!(
                    "Default personality '{}' is not defined, keeping '{}'",
                    default,
                    set.default
                );
            }
        }

        Ok(set)
    }

    /// Load, falling back to the built-ins on any error
    pub fn load_or_builtin(path: Option<&Path>) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load personalities: {}", e);
            Self::builtin()
        })
    }

    /// Look up a personality by name, falling back to the default
    pub fn get(&self, name: &str) -> &Personality {
        self.personalities
            .get(name)
            .or_else(|| self.personalities.get(&self.default))
            .unwrap_or_else(|| builtin_default())
    }

    /// Personality names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.personalities.keys().map(String::as_str)
    }

    /// The built-in personalities
    pub fn builtin() -> Self {
        let personalities = [
            builtin_default().clone(),
            Personality {
                name: "Supportive Mentor".to_string(),
                description: "Encouraging feedback that celebrates progress".to_string(),
                system_prompt: "You are a supportive and encouraging programming mentor. \
                    Give one-liner feedback on the commit that is positive and motivating, \
                    with at most a gentle suggestion. Keep it under 100 characters."
                    .to_string(),
                user_prompt_template: "Commit message: \"{message}\"\n\
                    Time of day: {time_of_day}\n\
                    Recent commits:\n{commit_history}\n\
                    Give a supportive one-liner about this commit."
                    .to_string(),
                max_tokens: 150,
                temperature: 0.6,
            },
            Personality {
                name: "Git Expert".to_string(),
                description: "Professional review of commit quality and practices".to_string(),
                system_prompt: "You are a senior engineer who reviews commits for clarity \
                    and good Git practice. Give short, specific, professional feedback \
                    about the commit message and the change it describes."
                    .to_string(),
                user_prompt_template: "Commit message: \"{message}\"\n\
                    Repository: {repo_name}\n\
                    Author: {username}\n\
                    Changes:\n{diff}\n\
                    Recent commits:\n{commit_history}\n\
                    Review this commit in two or three sentences."
                    .to_string(),
                max_tokens: 250,
                temperature: 0.4,
            },
            Personality {
                name: "Motivational Speaker".to_string(),
                description: "Over-the-top enthusiasm for every commit".to_string(),
                system_prompt: "You are an extremely enthusiastic motivational speaker. \
                    Respond with a one-liner that hypes up the developer's commit with \
                    energy and exclamation marks. Keep it under 100 characters."
                    .to_string(),
                user_prompt_template: "Commit message: \"{message}\"\n\
                    It is {time_of_day} and {username} just committed to {repo_name}.\n\
                    Give an energetic one-liner."
                    .to_string(),
                max_tokens: 100,
                temperature: 0.9,
            },
        ];
        let keys = [
            DEFAULT_PERSONALITY,
            "supportive_mentor",
            "git_expert",
            "motivational_speaker",
        ];

        Self {
            default: DEFAULT_PERSONALITY.to_string(),
            personalities: keys
                .iter()
                .map(|k| k.to_string())
                .zip(personalities)
                .collect(),
        }
    }
}

static BUILTIN_DEFAULT: Lazy<Personality> = Lazy::new(|| Personality {
    name: "Snarky Code Reviewer".to_string(),
    description: "A sarcastic reviewer with dry wit".to_string(),
    system_prompt: "You are a snarky but insightful code reviewer. Respond with a witty \
        one-liner about the commit message. Be sarcastic but not mean, and keep it \
        under 100 characters."
        .to_string(),
    user_prompt_template: "Commit message: \"{message}\"\n\
        Time of day: {time_of_day}\n\
        Recent commits:\n{commit_history}\n\
        Give a snarky one-liner about this commit."
        .to_string(),
    max_tokens: 150,
    temperature: 0.8,
});

fn builtin_default() -> &'static Personality {
    &BUILTIN_DEFAULT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_name_falls_back_to_default() {
        let set = PersonalitySet::builtin();
        assert_eq!(set.get("does-not-exist").name, "Snarky Code Reviewer");
        assert_eq!(set.get("git_expert").name, "Git Expert");
    }

    #[test]
    fn test_render_user_prompt() {
        let p = PersonalitySet::builtin().get("git_expert").clone();
        let out = p.render_user_prompt(&PromptVars {
            message: "fix: typo",
            repo_name: "noidea",
            username: "dev",
            diff: "+a",
            commit_history: "1. feat: x\n",
            time_of_day: "morning",
        });
        assert!(out.contains("\"fix: typo\""));
        assert!(out.contains("Repository: noidea"));
        assert!(!out.contains('{'));
    }

    #[test]
    fn test_one_liner_detection() {
        let set = PersonalitySet::builtin();
        assert!(set.get(DEFAULT_PERSONALITY).is_one_liner());
        assert!(!set.get("git_expert").is_one_liner());
    }

    #[test]
    fn test_load_file_extends_and_sets_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("personalities.toml");
        fs::write(
            &path,
            r#"
default = "pirate"

[personalities.pirate]
name = "Pirate"
description = "Arr"
system_prompt = "You are a pirate. Reply with a one-liner."
user_prompt_format = "Commit: {message}"
"#,
        )
        .unwrap();

        let set = PersonalitySet::load(Some(&path)).unwrap();
        assert_eq!(set.default, "pirate");
        assert_eq!(set.get("unknown").name, "Pirate");
        assert_eq!(set.get("pirate").max_tokens, 150);
        assert!(set.personalities.contains_key("git_expert"));
    }

    #[test]
    fn test_load_unknown_default_keeps_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.toml");
        fs::write(&path, "default = \"ghost\"\n").unwrap();
        let set = PersonalitySet::load(Some(&path)).unwrap();
        assert_eq!(set.default, DEFAULT_PERSONALITY);
    }

    #[test]
    fn test_missing_file_and_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert_eq!(
            PersonalitySet::load(Some(&missing)).unwrap(),
            PersonalitySet::builtin()
        );

        let bad = dir.path().join("bad.toml");
        fs::write(&bad, "default = [").unwrap();
        assert!(PersonalitySet::load(Some(&bad)).is_err());
        assert_eq!(
            PersonalitySet::load_or_builtin(Some(&bad)),
            PersonalitySet::builtin()
        );
    }
}
