//! Configuration management for Supafork
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (SUPAFORK_*)
//! 3. Config file (~/.config/supafork/config.toml)
//! 4. Default values

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Error, Result};

/// GitHub-related configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Base URL of the GitHub REST API
    pub api_base: String,

    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Fork pipeline configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ForkConfig {
    /// Maximum number of migration files fetched concurrently
    pub fetch_concurrency: usize,
}

impl Default for ForkConfig {
    fn default() -> Self {
        Self {
            fetch_concurrency: 8,
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// GitHub configuration
    pub github: GitHubConfig,

    /// Fork pipeline configuration
    pub fork: ForkConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/supafork/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("supafork").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - SUPAFORK_GITHUB_API: Base URL of the GitHub REST API
    /// - SUPAFORK_FETCH_CONCURRENCY: Maximum concurrent content fetches
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(api_base) = std::env::var("SUPAFORK_GITHUB_API") {
            self.github.api_base = api_base;
        }

        if let Ok(concurrency) = std::env::var("SUPAFORK_FETCH_CONCURRENCY") {
            match concurrency.parse() {
                Ok(n) => self.fork.fetch_concurrency = n,
                Err(_) => {
                    warn!(
                        value = %concurrency,
                        "Ignoring non-numeric SUPAFORK_FETCH_CONCURRENCY"
                    );
                }
            }
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(
        mut self,
        api_base: Option<String>,
        fetch_concurrency: Option<usize>,
    ) -> Self {
        if let Some(base) = api_base {
            self.github.api_base = base;
        }

        if let Some(n) = fetch_concurrency {
            self.fork.fetch_concurrency = n;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(
        api_base: Option<String>,
        fetch_concurrency: Option<usize>,
    ) -> Result<Self> {
        Ok(Self::load()?
            .with_env_overrides()
            .with_cli_overrides(api_base, fetch_concurrency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.github.api_base, "https://api.github.com");
        assert_eq!(config.github.request_timeout, Duration::from_secs(30));
        assert_eq!(config.fork.fetch_concurrency, 8);
    }

    #[test]
    fn test_cli_overrides() {
        let config = Config::default()
            .with_cli_overrides(Some("https://ghe.example.com/api/v3".to_string()), Some(2));

        assert_eq!(config.github.api_base, "https://ghe.example.com/api/v3");
        assert_eq!(config.fork.fetch_concurrency, 2);
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[github]
api_base = "https://ghe.example.com/api/v3"
request_timeout = "10s"

[fork]
fetch_concurrency = 4
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.github.api_base, "https://ghe.example.com/api/v3");
        assert_eq!(config.github.request_timeout, Duration::from_secs(10));
        assert_eq!(config.fork.fetch_concurrency, 4);
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
[fork]
fetch_concurrency = 1
"#;
        let config: Config = toml::from_str(toml).unwrap();
        // github section should use defaults
        assert_eq!(config.github.api_base, "https://api.github.com");
        assert_eq!(config.fork.fetch_concurrency, 1);
    }
}
