use crate::core::client::DEFAULT_USER_AGENT;
use crate::core::download::DEFAULT_CONCURRENT_DOWNLOADS;
use crate::core::request::DEFAULT_TIMEOUT_SECONDS;
use crate::core::url::GITHUB_API_URL;
use crate::core::ClientSettings;
use crate::utils::error::{Result, ViewerError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_DOWNLOAD_DIRECTORY: &str = "downloads";
pub const DEFAULT_THREADS: usize = 4;
/// Upper bound accepted for `timeout_seconds`.
pub const MAX_TIMEOUT_SECONDS: u64 = 300;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api_url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub user_agent: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DownloadConfig {
    pub directory: Option<String>,
    pub concurrent_downloads: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub threads: Option<usize>,
}

impl TomlConfig {
    /// Loads and parses a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ViewerError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ViewerError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value. Unset variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ViewerError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn download_directory(&self) -> &str {
        self.download
            .directory
            .as_deref()
            .unwrap_or(DEFAULT_DOWNLOAD_DIRECTORY)
    }

    pub fn threads(&self) -> usize {
        self.runtime.threads.unwrap_or(DEFAULT_THREADS)
    }
}

/// A token still spelled `${VAR}` means the variable was not set.
pub(crate) fn effective_token(token: Option<&str>) -> Option<&str> {
    token
        .map(str::trim)
        .filter(|t| !t.is_empty() && !(t.starts_with("${") && t.ends_with('}')))
}

impl ClientSettings for TomlConfig {
    fn api_url(&self) -> &str {
        self.client.api_url.as_deref().unwrap_or(GITHUB_API_URL)
    }

    /// `0` falls back to the default like an absent value.
    fn timeout_seconds(&self) -> u64 {
        self.client
            .timeout_seconds
            .filter(|&seconds| seconds > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    fn user_agent(&self) -> &str {
        self.client.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    fn token(&self) -> Option<&str> {
        effective_token(self.client.token.as_deref())
    }

    fn concurrent_downloads(&self) -> usize {
        self.download
            .concurrent_downloads
            .unwrap_or(DEFAULT_CONCURRENT_DOWNLOADS)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("client.api_url", self.api_url())?;
        validation::validate_range(
            "client.timeout_seconds",
            self.timeout_seconds(),
            1,
            MAX_TIMEOUT_SECONDS,
        )?;
        validation::validate_non_empty_string("client.user_agent", self.user_agent())?;
        validation::validate_path("download.directory", self.download_directory())?;
        validation::validate_positive_number(
            "download.concurrent_downloads",
            self.concurrent_downloads(),
            1,
        )?;
        validation::validate_positive_number("runtime.threads", self.threads(), 1)?;
        Ok(())
    }
}
