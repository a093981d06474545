use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::errors::Result;

/// Environment variable consulted for the API token when none is configured.
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::load_from_path(".")
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(
                File::with_name(
                    path.as_ref()
                        .join("config/default")
                        .to_string_lossy()
                        .as_ref(),
                )
                .required(false),
            )
            .add_source(
                File::with_name(
                    path.as_ref()
                        .join("config/local")
                        .to_string_lossy()
                        .as_ref(),
                )
                .required(false),
            )
            .add_source(Environment::default().separator("__"))
            .build()?
            .try_deserialize()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubConfig {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "GithubConfig::default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "GithubConfig::default_user_agent")]
    pub user_agent: String,
    #[serde(default = "GithubConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl GithubConfig {
    fn default_api_base_url() -> String {
        "https://api.github.com/".to_string()
    }

    fn default_user_agent() -> String {
        "bounty-fetcher".to_string()
    }

    const fn default_timeout_secs() -> u64 {
        30
    }

    /// Token from config, else from `GITHUB_TOKEN`. Blank values count as unset.
    pub fn resolved_token(&self) -> Option<String> {
        resolve_token(self.token.as_deref(), std::env::var(TOKEN_ENV_VAR).ok())
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base_url: Self::default_api_base_url(),
            user_agent: Self::default_user_agent(),
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

fn resolve_token(configured: Option<&str>, from_env: Option<String>) -> Option<String> {
    let non_blank = |token: &str| {
        let token = token.trim();
        (!token.is_empty()).then(|| token.to_string())
    };
    configured
        .and_then(non_blank)
        .or_else(|| from_env.as_deref().and_then(non_blank))
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    #[serde(default = "FetcherConfig::default_org")]
    pub org: String,
    #[serde(default = "FetcherConfig::default_label")]
    pub label: String,
    #[serde(default = "FetcherConfig::default_output_path")]
    pub output_path: PathBuf,
    #[serde(default = "FetcherConfig::default_page_size")]
    pub page_size: u32,
    #[serde(default = "FetcherConfig::default_request_delay_ms")]
    pub request_delay_ms: u64,
    #[serde(default)]
    pub metrics_path: Option<PathBuf>,
}

impl FetcherConfig {
    fn default_org() -> String {
        "projectdiscovery".to_string()
    }

    fn default_label() -> String {
        "💎 Bounty".to_string()
    }

    fn default_output_path() -> PathBuf {
        PathBuf::from("bounty_issues.json")
    }

    const fn default_page_size() -> u32 {
        100
    }

    const fn default_request_delay_ms() -> u64 {
        500
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            org: Self::default_org(),
            label: Self::default_label(),
            output_path: Self::default_output_path(),
            page_size: Self::default_page_size(),
            request_delay_ms: Self::default_request_delay_ms(),
            metrics_path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "RetryConfig::default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "RetryConfig::default_backoff_unit_ms")]
    pub backoff_unit_ms: u64,
    #[serde(default = "RetryConfig::default_max_wait_secs")]
    pub max_wait_secs: u64,
}

impl RetryConfig {
    const fn default_max_attempts() -> u32 {
        3
    }

    const fn default_backoff_unit_ms() -> u64 {
        5_000
    }

    const fn default_max_wait_secs() -> u64 {
        60
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: Self::default_max_attempts(),
            backoff_unit_ms: Self::default_backoff_unit_ms(),
            max_wait_secs: Self::default_max_wait_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            format: LogFormat::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.fetcher.org, "projectdiscovery");
        assert_eq!(config.fetcher.label, "💎 Bounty");
        assert_eq!(config.fetcher.page_size, 100);
        assert_eq!(config.fetcher.request_delay_ms, 500);
        assert_eq!(config.github.timeout_secs, 30);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.backoff_unit_ms, 5_000);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn logging_section_is_read_from_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("config")).unwrap();
        std::fs::write(
            dir.path().join("config/default.toml"),
            "[logging]\nlevel = \"debug\"\nformat = \"json\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from_path(dir.path()).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("config")).unwrap();
        std::fs::write(
            dir.path().join("config/default.toml"),
            "[fetcher]\norg = \"acme\"\nlabel = \"bounty\"\n\n[retry]\nmax_attempts = 5\n",
        )
        .unwrap();

        let config = AppConfig::load_from_path(dir.path()).unwrap();
        assert_eq!(config.fetcher.org, "acme");
        assert_eq!(config.fetcher.label, "bounty");
        assert_eq!(config.fetcher.page_size, 100);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.backoff_unit_ms, 5_000);
    }

    #[test]
    fn local_file_wins_over_default() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("config")).unwrap();
        std::fs::write(
            dir.path().join("config/default.toml"),
            "[fetcher]\noutput_path = \"a.json\"\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("config/local.toml"),
            "[fetcher]\noutput_path = \"b.json\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from_path(dir.path()).unwrap();
        assert_eq!(config.fetcher.output_path, PathBuf::from("b.json"));
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("config")).unwrap();
        std::fs::write(
            dir.path().join("config/default.toml"),
            "[retry]\nmax_attempts = \"many\"\n",
        )
        .unwrap();

        let err = AppConfig::load_from_path(dir.path()).unwrap_err();
        assert!(matches!(err, crate::AppError::Config(_)));
    }

    #[test]
    fn configured_token_takes_precedence() {
        let token = resolve_token(Some("from-config"), Some("from-env".into()));
        assert_eq!(token.as_deref(), Some("from-config"));
    }

    #[test]
    fn env_token_used_when_unconfigured() {
        let token = resolve_token(None, Some(" from-env \n".into()));
        assert_eq!(token.as_deref(), Some("from-env"));
    }

    #[test]
    fn blank_token_is_absent() {
        assert_eq!(resolve_token(Some("   "), None), None);
        assert_eq!(resolve_token(None, Some(String::new())), None);
        assert_eq!(resolve_token(None, None), None);
    }
}
