//! Configuration CLI command handlers

use crate::ai::ProviderTable;
use crate::cli::commands::ConfigCommand;
use crate::cli::configured_provider;
use crate::core::config::{Config, ConfigKey};
use crate::core::credentials::CredentialStore;
use crate::error::{NoideaError, Result};

/// Handle configuration commands
pub fn handle_config(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Set { key, value } => handle_set(ConfigKey::parse(&key)?, &value),
        ConfigCommand::Get { key } => handle_get(ConfigKey::parse(&key)?),
        ConfigCommand::Remove { key } => handle_remove(ConfigKey::parse(&key)?),
        ConfigCommand::Show => handle_show(),
    }
}

/// The file contents only, so environment overrides are never written back
fn load_file_config() -> Result<Config> {
    Config::load_from(&Config::config_path()?)
}

fn handle_set(key: ConfigKey, value: &str) -> Result<()> {
    if key == ConfigKey::ApiKey {
        let provider = configured_provider(&Config::load()?);
        CredentialStore::store_api_key(&provider, value.trim())?;
        println!("✓ {} API key has been stored securely.", provider.display_name);
        return Ok(());
    }

    if key == ConfigKey::Provider {
        let table = ProviderTable::builtin();
        if !table.contains(value) {
            return Err(NoideaError::InvalidInput(format!(
                "Unknown provider '{}'. Available providers: {}",
                value,
                table.ids().collect::<Vec<_>>().join(", ")
            )));
        }
    }

    let mut config = load_file_config()?;
    config.set(key, value)?;
    config.save()?;

    println!(
        "✓ {} set to: {}",
        key_label(key),
        config.get(key).unwrap_or_default()
    );
    Ok(())
}

fn handle_get(key: ConfigKey) -> Result<()> {
    let config = Config::load()?;

    if key == ConfigKey::ApiKey {
        let provider = configured_provider(&config);
        match CredentialStore::get_api_key(&provider)? {
            Some(api_key) => println!(
                "{} API key: {}",
                provider.display_name,
                CredentialStore::mask_token(&api_key)
            ),
            None => println!("{} API key: Not configured", provider.display_name),
        }
        return Ok(());
    }

    match config.get(key) {
        Some(value) => println!("{}: {}", key_label(key), value),
        None => println!("{}: (provider default)", key_label(key)),
    }
    Ok(())
}

fn handle_remove(key: ConfigKey) -> Result<()> {
    if key == ConfigKey::ApiKey {
        let provider = configured_provider(&Config::load()?);
        CredentialStore::delete_api_key(&provider)?;
        println!("{} API key has been removed.", provider.display_name);
        return Ok(());
    }

    let mut config = load_file_config()?;
    config.remove(key);
    config.save()?;

    println!(
        "{} reset to default: {}",
        key_label(key),
        config.get(key).unwrap_or_else(|| "(provider default)".to_string())
    );
    Ok(())
}

fn handle_show() -> Result<()> {
    let path = Config::config_path()?;
    let config = Config::load()?;

    println!("Config file: {}", path.display());
    println!();
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn key_label(key: ConfigKey) -> &'static str {
    match key {
        ConfigKey::ApiKey => "API key",
        ConfigKey::Provider => "Provider",
        ConfigKey::Model => "Model",
        ConfigKey::Personality => "Personality",
        ConfigKey::AiEnabled => "AI enabled",
    }
}
