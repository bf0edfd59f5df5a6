//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.decaf/config.json`) and environment.
//! Credentials are resolved once at startup and passed into the clients; nothing
//! reads the environment after that.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Slack API credentials and endpoint.
    #[serde(default)]
    pub slack: SlackConfig,

    /// Vision (OCR) API settings.
    #[serde(default)]
    pub vision: VisionConfig,
}

/// Webhook server bind and port settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Port the webhook listens on (default 3000). Overridden by PORT env when set.
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Bind address (default "0.0.0.0" — the platform must reach the webhook).
    #[serde(default = "default_server_bind")]
    pub bind: String,
}

fn default_server_port() -> u16 {
    3000
}

fn default_server_bind() -> String {
    "0.0.0.0".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
            bind: default_server_bind(),
        }
    }
}

/// Slack credentials: a user token for file APIs and a bot token for messaging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlackConfig {
    /// User-level token for files.info, private downloads, and files.delete.
    /// Overridden by SLACK_USER_TOKEN env when set.
    pub user_token: Option<String>,

    /// Bot token for chat.postMessage. Overridden by SLACK_BOT_TOKEN env when set.
    pub bot_token: Option<String>,

    /// API base URL override (e.g. a stub server in tests). Default https://slack.com.
    pub api_base: Option<String>,
}

/// Vision API settings for text recognition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionConfig {
    /// API key sent as a query parameter. Overridden by VISION_API_KEY env when set.
    pub api_key: Option<String>,

    /// Endpoint base URL override. Default https://vision.googleapis.com.
    pub endpoint: Option<String>,
}

fn env_or(name: &str, fallback: Option<&String>) -> Option<String> {
    std::env::var(name)
        .ok()
        .and_then(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .or_else(|| {
            fallback
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// Resolve the Slack user token: env SLACK_USER_TOKEN overrides config.
pub fn resolve_user_token(config: &Config) -> Option<String> {
    env_or("SLACK_USER_TOKEN", config.slack.user_token.as_ref())
}

/// Resolve the Slack bot token: env SLACK_BOT_TOKEN overrides config.
pub fn resolve_bot_token(config: &Config) -> Option<String> {
    env_or("SLACK_BOT_TOKEN", config.slack.bot_token.as_ref())
}

/// Resolve the vision API key: env VISION_API_KEY overrides config.
pub fn resolve_vision_key(config: &Config) -> Option<String> {
    env_or("VISION_API_KEY", config.vision.api_key.as_ref())
}

/// Resolve the listen port: env PORT overrides config when it parses as u16.
pub fn resolve_port(config: &Config) -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(config.server.port)
}

/// Resolve config path from env or default (~/.decaf/config.json).
pub fn default_config_path() -> PathBuf {
    std::env::var("DECAF_CONFIG_PATH").map(PathBuf::from).unwrap_or_else(|_| {
        dirs::home_dir()
            .map(|h| h.join(".decaf").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    })
}

/// Load config from the default path (or DECAF_CONFIG_PATH). Missing file => default config.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(default_config_path);
    if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        return Ok(Config::default());
    }
    let s = std::fs::read_to_string(&path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parsing config from {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_server_port_and_bind() {
        let s = ServerConfig::default();
        assert_eq!(s.port, 3000);
        assert_eq!(s.bind, "0.0.0.0");
    }

    #[test]
    fn config_parses_camel_case_fields() {
        let config: Config = serde_json::from_str(
            r#"{
                "server": { "port": 8080, "bind": "127.0.0.1" },
                "slack": { "userToken": "xoxp-1", "botToken": "xoxb-2" },
                "vision": { "apiKey": "k" }
            }"#,
        )
        .expect("parse config");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.slack.user_token.as_deref(), Some("xoxp-1"));
        assert_eq!(config.slack.bot_token.as_deref(), Some("xoxb-2"));
        assert_eq!(config.vision.api_key.as_deref(), Some("k"));
        assert!(config.slack.api_base.is_none());
    }

    #[test]
    fn resolver_falls_back_to_config_and_trims() {
        let mut config = Config::default();
        config.slack.user_token = Some("  xoxp-3  ".to_string());
        assert_eq!(resolve_user_token(&config).as_deref(), Some("xoxp-3"));
        assert_eq!(resolve_bot_token(&config), None);
    }

    #[test]
    fn empty_config_token_resolves_to_none() {
        let mut config = Config::default();
        config.vision.api_key = Some("   ".to_string());
        assert_eq!(resolve_vision_key(&config), None);
    }
}
