//! Configuration file support for gitbak.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `GITBAK_`, e.g.
//!    `GITBAK_GITLAB__TOKEN`), plus the classic un-prefixed names
//!    `GITLAB_URL`, `GITLAB_USERNAME`, `GITLAB_PRIVATE_TOKEN`, `GITHUB_TOKEN`
//! 3. Config file (~/.config/gitbak/config.toml or ./gitbak.toml)
//! 4. Built-in defaults
//!
//! Example config file:
//! ```toml
//! [gitlab]
//! url = "https://gitlab.com"  # optional, this is the default
//! username = "backup-bot"
//! token = "glpat-..."
//!
//! [github]
//! token = "ghp_..."
//!
//! [sync]
//! recency_days = 7
//! ```

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;

/// Default GitLab instance.
const DEFAULT_GITLAB_URL: &str = "https://gitlab.com";

/// Default recency window in days for batch mode.
const DEFAULT_RECENCY_DAYS: i64 = 7;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GitLab destination configuration.
    pub gitlab: GitLabConfig,
    /// GitHub source configuration.
    pub github: GitHubConfig,
    /// Batch-mode defaults.
    pub sync: SyncConfig,
}

/// GitLab destination configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GitLabConfig {
    /// Instance base URL. Defaults to gitlab.com.
    pub url: Option<String>,
    /// Account username; also the fallback destination namespace.
    pub username: Option<String>,
    /// Private access token.
    pub token: Option<String>,
}

/// GitHub source configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Personal access token for the GraphQL API.
    pub token: Option<String>,
}

/// Batch-mode defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Recency window in days; destinations active within it are skipped.
    pub recency_days: Option<i64>,
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Failures fall back to defaults with a warning rather than aborting;
    /// missing required values are reported where they are first needed.
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(dirs) = ProjectDirs::from("", "", "gitbak") {
            let path = dirs.config_dir().join("config.toml");
            builder = builder
                .add_source(File::new(&path.to_string_lossy(), FileFormat::Toml).required(false));
        }

        builder = builder
            .add_source(File::new("gitbak.toml", FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix("GITBAK").separator("__"));

        match builder.build().and_then(|c| c.try_deserialize()) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load configuration, using defaults");
                Self::default()
            }
        }
    }

    /// GitLab instance base URL.
    pub fn gitlab_url(&self) -> String {
        self.gitlab
            .url
            .clone()
            .or_else(|| std::env::var("GITLAB_URL").ok())
            .unwrap_or_else(|| DEFAULT_GITLAB_URL.to_string())
    }

    /// GitLab account username.
    pub fn gitlab_username(&self) -> Option<String> {
        self.gitlab
            .username
            .clone()
            .or_else(|| std::env::var("GITLAB_USERNAME").ok())
    }

    /// GitLab private access token.
    pub fn gitlab_token(&self) -> Option<String> {
        self.gitlab
            .token
            .clone()
            .or_else(|| std::env::var("GITLAB_PRIVATE_TOKEN").ok())
    }

    /// GitHub personal access token.
    pub fn github_token(&self) -> Option<String> {
        self.github
            .token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
    }

    /// Recency window in days for batch mode.
    pub fn recency_days(&self) -> i64 {
        self.sync.recency_days.unwrap_or(DEFAULT_RECENCY_DAYS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.gitlab_url(), DEFAULT_GITLAB_URL);
        assert_eq!(config.recency_days(), DEFAULT_RECENCY_DAYS);
    }

    #[test]
    fn explicit_values_win_over_env_fallbacks() {
        let config = Config {
            gitlab: GitLabConfig {
                url: Some("https://git.internal".into()),
                username: Some("bot".into()),
                token: Some("tok".into()),
            },
            ..Config::default()
        };
        assert_eq!(config.gitlab_url(), "https://git.internal");
        assert_eq!(config.gitlab_username().as_deref(), Some("bot"));
        assert_eq!(config.gitlab_token().as_deref(), Some("tok"));
    }
}
