use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE_NAME: &str = "bookstamp.toml";
pub const DEFAULT_USER_AGENT: &str = "bookstamp/0.2";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct StampConfig {
    #[serde(default)]
    pub bookstack: BookstackSection,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct BookstackSection {
    pub url: Option<String>,
    pub token_id: Option<String>,
    pub token_secret: Option<String>,
    pub user_agent: Option<String>,
    pub timeout_ms: Option<u64>,
}

impl StampConfig {
    /// Resolve the Bookstack base URL: env BOOKSTACK_URL > config > None.
    pub fn base_url(&self) -> Option<String> {
        env_value("BOOKSTACK_URL").or_else(|| self.bookstack.url.clone())
    }

    /// Resolve the API token id: env BOOKSTACK_TOKEN_ID > config > None.
    pub fn token_id(&self) -> Option<String> {
        env_value("BOOKSTACK_TOKEN_ID").or_else(|| self.bookstack.token_id.clone())
    }

    /// Resolve the API token secret: env BOOKSTACK_TOKEN_SECRET > config > None.
    pub fn token_secret(&self) -> Option<String> {
        env_value("BOOKSTACK_TOKEN_SECRET").or_else(|| self.bookstack.token_secret.clone())
    }

    /// Resolve user agent: env BOOKSTACK_USER_AGENT > config > default.
    pub fn user_agent(&self) -> String {
        env_value("BOOKSTACK_USER_AGENT")
            .or_else(|| self.bookstack.user_agent.clone())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string())
    }

    /// Resolve request timeout: env BOOKSTACK_HTTP_TIMEOUT_MS > config > default.
    pub fn timeout_ms(&self) -> u64 {
        env_value("BOOKSTACK_HTTP_TIMEOUT_MS")
            .and_then(|value| value.parse::<u64>().ok())
            .or(self.bookstack.timeout_ms)
            .unwrap_or(DEFAULT_TIMEOUT_MS)
    }
}

fn env_value(key: &str) -> Option<String> {
    let value = env::var(key).ok()?;
    let trimmed = value.trim().to_string();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

/// Load a StampConfig from a TOML file. Returns default if the file
/// doesn't exist.
pub fn load_config(config_path: &Path) -> Result<StampConfig> {
    if !config_path.exists() {
        return Ok(StampConfig::default());
    }
    let content = fs::read_to_string(config_path)
        .with_context(|| format!("failed to read {}", config_path.display()))?;
    let parsed: StampConfig = toml::from_str(&content)
        .with_context(|| format!("failed to parse {}", config_path.display()))?;
    Ok(parsed)
}
