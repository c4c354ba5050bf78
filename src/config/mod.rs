//! Application configuration
//!
//! Loaded from a TOML file in the platform config directory, with
//! `RC_*` environment variables taking precedence so deployments can stay
//! file-less. The client secret is required config, not data, and lives
//! here rather than in the token store.

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_SERVER_URL: &str = "https://platform.ringcentral.com";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OAuth2 application client ID
    #[serde(default)]
    pub client_id: String,
    /// OAuth2 application client secret
    #[serde(default)]
    pub client_secret: String,
    /// Provider REST base URL
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// OAuth2 redirect URI registered with the provider
    #[serde(default)]
    pub redirect_uri: String,
    /// Token store location; defaults to the platform data directory
    pub token_store_path: Option<PathBuf>,
    /// Result cache TTL in seconds
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_cache_ttl() -> u64 {
    300
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            server_url: default_server_url(),
            redirect_uri: String::new(),
            token_store_path: None,
            cache_ttl_secs: default_cache_ttl(),
        }
    }
}

impl Config {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("com", "chatcount", "chatcount")
            .context("Could not determine config directory")
    }

    fn config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Load configuration: file first, environment overrides on top.
    /// Fails when a required credential is missing from both.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Ok(path) if path.exists() => {
                let content =
                    fs::read_to_string(&path).context("Failed to read config file")?;
                toml::from_str(&content).context("Failed to parse config file")?
            }
            _ => Self::default(),
        };

        if let Ok(v) = std::env::var("RC_CLIENT_ID") {
            config.client_id = v;
        }
        if let Ok(v) = std::env::var("RC_CLIENT_SECRET") {
            config.client_secret = v;
        }
        if let Ok(v) = std::env::var("RC_SERVER_URL") {
            config.server_url = v;
        }
        if let Ok(v) = std::env::var("RC_REDIRECT_URI") {
            config.redirect_uri = v;
        }

        if config.client_id.is_empty() || config.client_secret.is_empty() {
            bail!(
                "Missing provider credentials. Set RC_CLIENT_ID and RC_CLIENT_SECRET \
                 or fill in {}.",
                Self::config_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|_| "the config file".to_string())
            );
        }
        if config.redirect_uri.is_empty() {
            bail!("Missing redirect URI. Set RC_REDIRECT_URI or fill in the config file.");
        }

        Ok(config)
    }

    /// Where the token store lives: explicit config, else the platform
    /// data directory.
    pub fn token_store_path(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.token_store_path {
            return Ok(path.clone());
        }
        Ok(Self::project_dirs()?.data_dir().join("token_store.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert_eq!(config.cache_ttl_secs, 300);
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            client_id = "cid"
            client_secret = "secret"
            redirect_uri = "https://app.example.com/cb"
            "#,
        )
        .unwrap();
        assert_eq!(config.client_id, "cid");
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert!(config.token_store_path.is_none());
    }

    #[test]
    fn test_explicit_token_store_path() {
        let config = Config {
            token_store_path: Some(PathBuf::from("/tmp/tokens.json")),
            ..Config::default()
        };
        assert_eq!(
            config.token_store_path().unwrap(),
            PathBuf::from("/tmp/tokens.json")
        );
    }
}
