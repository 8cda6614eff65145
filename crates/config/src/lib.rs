//! Configuration for the AgentOS client
//!
//! Holds the endpoint and credential the command layer reads before every
//! call. Nothing below the binary reads this crate directly.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod paths;

pub use paths::{config_path, data_dir};

/// Environment fallback for the bearer token
pub const TOKEN_ENV_VAR: &str = "OS_SECURITY_KEY";

/// Shown in place of an absent token
pub const NO_TOKEN_LABEL: &str = "NO TOKEN SET";

const MASK_WIDTH: usize = 20;

/// Errors in configuration handling
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Where the AgentOS service lives and how to authenticate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default)]
    pub auth_token: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            auth_token: String::new(),
        }
    }
}

fn default_url() -> String {
    "http://localhost:7777".to_string()
}

/// Root configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub endpoint: EndpointConfig,
}

impl Config {
    pub async fn load() -> Result<Self> {
        let path = config_path();
        Self::load_from(&path).await
    }

    /// Load from a specific location; a missing file yields defaults
    pub async fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("◆ no config at {:?}, using defaults", path);
            return Ok(Config::default());
        }

        debug!("◆ loading config from {:?}", path);
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub async fn save(&self) -> Result<()> {
        let path = config_path();
        self.save_to(&path).await
    }

    pub async fn save_to(&self, path: &Path) -> Result<()> {
        debug!("◆ saving config to {:?}", path);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    /// Configured endpoint URL, `None` when blank
    pub fn endpoint_url(&self) -> Option<&str> {
        let url = self.endpoint.url.trim();
        if url.is_empty() {
            None
        } else {
            Some(url)
        }
    }

    pub fn set_endpoint_url(&mut self, url: &str) {
        self.endpoint.url = url.trim().trim_end_matches('/').to_string();
    }

    /// Stored token, else the `OS_SECURITY_KEY` environment variable
    pub fn auth_token(&self) -> Option<String> {
        resolve_token(&self.endpoint.auth_token, std::env::var(TOKEN_ENV_VAR).ok())
    }

    pub fn set_auth_token(&mut self, token: &str) {
        self.endpoint.auth_token = token.trim().to_string();
    }

    pub fn clear_auth_token(&mut self) {
        self.endpoint.auth_token.clear();
    }

    pub fn has_auth_token(&self) -> bool {
        self.auth_token().is_some()
    }
}

/// Pick the stored token over the environment; blank values count as absent
pub fn resolve_token(stored: &str, env: Option<String>) -> Option<String> {
    let stored = stored.trim();
    if !stored.is_empty() {
        return Some(stored.to_string());
    }
    env.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

/// Mask a token for display
///
/// One `*` per character up to 20, with `...` appended for longer tokens.
pub fn mask_token(token: Option<&str>) -> String {
    match token {
        None | Some("") => NO_TOKEN_LABEL.to_string(),
        Some(token) => {
            let len = token.chars().count();
            let mut masked = "*".repeat(len.min(MASK_WIDTH));
            if len > MASK_WIDTH {
                masked.push_str("...");
            }
            masked
        }
    }
}

/// Write the default config unless one exists, then load it
pub async fn init() -> Result<Config> {
    init_at(&config_path()).await
}

pub async fn init_at(path: &Path) -> Result<Config> {
    if path.exists() {
        warn!("◆ config already exists at {:?}", path);
    } else {
        Config::default().save_to(path).await?;
        info!("◆ config created at {:?}", path);
    }

    Config::load_from(path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token(None), "NO TOKEN SET");
        assert_eq!(mask_token(Some("")), "NO TOKEN SET");
        assert_eq!(mask_token(Some("abc")), "***");
        assert_eq!(mask_token(Some(&"x".repeat(20))), "*".repeat(20));
        assert_eq!(
            mask_token(Some(&"x".repeat(21))),
            format!("{}...", "*".repeat(20))
        );
    }

    #[test]
    fn test_resolve_token_prefers_stored() {
        assert_eq!(
            resolve_token("  stored ", Some("env".into())),
            Some("stored".to_string())
        );
        assert_eq!(resolve_token("", Some(" env ".into())), Some("env".to_string()));
        assert_eq!(resolve_token("   ", Some("  ".into())), None);
        assert_eq!(resolve_token("", None), None);
    }

    #[test]
    fn test_endpoint_url_blank_is_none() {
        let mut config = Config::default();
        assert_eq!(config.endpoint_url(), Some("http://localhost:7777"));

        config.set_endpoint_url("  ");
        assert_eq!(config.endpoint_url(), None);

        config.set_endpoint_url(" https://os.example.com/ ");
        assert_eq!(config.endpoint_url(), Some("https://os.example.com"));
    }
}
