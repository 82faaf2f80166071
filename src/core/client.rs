use crate::core::request::DEFAULT_TIMEOUT_SECONDS;
use crate::domain::ports::ClientSettings;
use crate::utils::error::{Result, ViewerError};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::redirect::Policy;
use std::sync::OnceLock;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = concat!("repo-viewer/", env!("CARGO_PKG_VERSION"));
const GITHUB_JSON: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "x-github-api-version";
const API_VERSION: &str = "2022-11-28";
const MAX_DOWNLOAD_REDIRECTS: usize = 10;

static DEFAULT_CLIENT: OnceLock<HttpClient> = OnceLock::new();

/// Thin wrapper over a shared `reqwest::Client`; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    /// Client for API calls. Redirects are not followed so that a moved
    /// repository surfaces as a 301 status.
    pub fn api(user_agent: &str, token: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_JSON));
        headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.trim())).map_err(|_| {
                ViewerError::InvalidConfigValueError {
                    field: "token".to_string(),
                    value: "<redacted>".to_string(),
                    reason: "Token contains characters not allowed in a header".to_string(),
                }
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let inner = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .redirect(Policy::none())
            .build()?;
        Ok(Self { inner })
    }

    /// Client for asset downloads. Asset URLs redirect to a storage host, so
    /// redirects are followed here.
    ///
    /// Assets may take longer than `timeout` in total; the limit applies to
    /// connecting and to each read, so only a stalled transfer fails.
    pub fn downloads(user_agent: &str, timeout: Duration) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(Policy::limited(MAX_DOWNLOAD_REDIRECTS))
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()?;
        Ok(Self { inner })
    }

    pub fn from_settings<C: ClientSettings + ?Sized>(settings: &C) -> Result<Self> {
        Self::api(settings.user_agent(), settings.token())
    }

    pub fn downloads_from_settings<C: ClientSettings + ?Sized>(settings: &C) -> Result<Self> {
        Self::downloads(
            settings.user_agent(),
            Duration::from_secs(settings.timeout_seconds()),
        )
    }

    /// Download client with the default user agent and timeout.
    pub fn default_downloads() -> Result<Self> {
        Self::downloads(
            DEFAULT_USER_AGENT,
            Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        )
    }

    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }
}

impl From<reqwest::Client> for HttpClient {
    fn from(inner: reqwest::Client) -> Self {
        Self { inner }
    }
}

/// Unauthenticated API client shared by every request built without a client.
pub fn default_client() -> Result<HttpClient> {
    if let Some(client) = DEFAULT_CLIENT.get() {
        return Ok(client.clone());
    }
    let client = HttpClient::api(DEFAULT_USER_AGENT, None)?;
    Ok(DEFAULT_CLIENT.get_or_init(|| client).clone())
}
