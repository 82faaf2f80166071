use crate::config::toml_config::{
    effective_token, TomlConfig, DEFAULT_DOWNLOAD_DIRECTORY, DEFAULT_THREADS, MAX_TIMEOUT_SECONDS,
};
use crate::core::client::DEFAULT_USER_AGENT;
use crate::core::download::DEFAULT_CONCURRENT_DOWNLOADS;
use crate::core::request::DEFAULT_TIMEOUT_SECONDS;
use crate::core::url::{GITHUB_API_URL, LATEST_RELEASE};
use crate::core::ClientSettings;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "repo-viewer")]
#[command(about = "View GitHub repositories and releases, and download release assets")]
#[command(version)]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Base URL of the GitHub REST API
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Request timeout in seconds, 0 for the default
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Personal access token sent as a bearer token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Worker threads of the async runtime
    #[arg(long, global = true)]
    pub threads: Option<usize>,

    /// Assets downloaded at the same time by `download`
    #[arg(long, global = true)]
    pub concurrent_downloads: Option<usize>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,

    #[arg(skip)]
    pub user_agent: Option<String>,

    #[arg(skip)]
    pub download_directory: Option<String>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show a repository
    Repo { owner: String, repo: String },

    /// Show a release and its assets
    Release {
        owner: String,
        repo: String,
        #[arg(long, default_value = LATEST_RELEASE)]
        tag: String,
    },

    /// Download one asset (by its 1-based index) or every asset of a release
    Download {
        owner: String,
        repo: String,
        #[arg(long, default_value = LATEST_RELEASE)]
        tag: String,
        #[arg(long)]
        index: Option<usize>,
        #[arg(long)]
        dir: Option<String>,
    },

    /// Check `<version> <operator> <release version>`, e.g. `compare owner repo "<" v1.2.0`
    Compare {
        owner: String,
        repo: String,
        operator: String,
        version: String,
        #[arg(long, default_value = LATEST_RELEASE)]
        tag: String,
    },
}

impl CliConfig {
    /// Fills every value not given on the command line from `file`.
    pub fn apply_file(&mut self, file: &TomlConfig) {
        if self.api_url.is_none() {
            self.api_url = file.client.api_url.clone();
        }
        if self.timeout.is_none() {
            self.timeout = file.client.timeout_seconds;
        }
        if effective_token(self.token.as_deref()).is_none() {
            self.token = effective_token(file.client.token.as_deref()).map(str::to_string);
        }
        if self.user_agent.is_none() {
            self.user_agent = file.client.user_agent.clone();
        }
        if self.threads.is_none() {
            self.threads = file.runtime.threads;
        }
        if self.concurrent_downloads.is_none() {
            self.concurrent_downloads = file.download.concurrent_downloads;
        }
        if self.download_directory.is_none() {
            self.download_directory = file.download.directory.clone();
        }
    }

    pub fn threads(&self) -> usize {
        self.threads.unwrap_or(DEFAULT_THREADS)
    }

    /// `--dir` of the download command wins over the configured directory.
    pub fn download_directory(&self) -> &str {
        if let Command::Download { dir: Some(dir), .. } = &self.command {
            return dir;
        }
        self.download_directory
            .as_deref()
            .unwrap_or(DEFAULT_DOWNLOAD_DIRECTORY)
    }
}

impl ClientSettings for CliConfig {
    fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(GITHUB_API_URL)
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout
            .filter(|&seconds| seconds > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    fn token(&self) -> Option<&str> {
        effective_token(self.token.as_deref())
    }

    fn concurrent_downloads(&self) -> usize {
        self.concurrent_downloads
            .unwrap_or(DEFAULT_CONCURRENT_DOWNLOADS)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api_url", self.api_url())?;
        validation::validate_range("timeout", self.timeout_seconds(), 1, MAX_TIMEOUT_SECONDS)?;
        validation::validate_positive_number("threads", self.threads(), 1)?;
        validation::validate_positive_number(
            "concurrent_downloads",
            self.concurrent_downloads(),
            1,
        )?;
        validation::validate_path("dir", self.download_directory())?;

        match &self.command {
            Command::Repo { owner, repo }
            | Command::Release { owner, repo, .. }
            | Command::Download { owner, repo, .. }
            | Command::Compare { owner, repo, .. } => {
                validation::validate_repository_segment("owner", owner)?;
                validation::validate_repository_segment("repo", repo)?;
            }
        }

        if let Command::Download { index: Some(index), .. } = &self.command {
            validation::validate_positive_number("index", *index, 1)?;
        }
        Ok(())
    }
}
