use crate::core::client::{default_client, HttpClient};
use crate::core::codec::JsonDecode;
use crate::core::status::ResponseStatus;
use crate::domain::model::{Release, Repository};
use crate::utils::error::{Result, ViewerError};
use std::marker::PhantomData;
use std::time::Duration;
use url::Url;

/// Timeout used when a request is built without one, or with zero.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 5;

pub type ReleaseRequest = ApiRequest<Release>;
pub type RepositoryRequest = ApiRequest<Repository>;

/// Status code and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

/// Builder for [`ReleaseRequest`] and [`RepositoryRequest`].
///
/// ```no_run
/// # async fn run() -> repo_viewer::Result<()> {
/// use repo_viewer::core::{request::Request, url};
///
/// let request = Request::create()
///     .url(url::for_release("aivruu", "repo-viewer", "latest")?)
///     .timeout(10)
///     .release()?;
/// let status = request.request_and_handle().await;
/// if let Some(release) = status.result() {
///     println!("{}", release);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Request {
    url: Option<String>,
    client: Option<HttpClient>,
    timeout: Option<u64>,
}

impl Request {
    pub fn create() -> Self {
        Self::default()
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Without a client the shared default client is used.
    pub fn client(mut self, client: HttpClient) -> Self {
        self.client = Some(client);
        self
    }

    /// Timeout in seconds.
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout = Some(seconds);
        self
    }

    pub fn release(self) -> Result<ReleaseRequest> {
        self.build()
    }

    pub fn repository(self) -> Result<RepositoryRequest> {
        self.build()
    }

    fn build<A: JsonDecode>(self) -> Result<ApiRequest<A>> {
        let url = self.validate_and_provide_url()?;
        let client = match self.client {
            Some(client) => client,
            None => default_client()?,
        };
        let seconds = match self.timeout {
            None | Some(0) => DEFAULT_TIMEOUT_SECONDS,
            Some(seconds) => seconds,
        };
        Ok(ApiRequest {
            url,
            client,
            timeout: Duration::from_secs(seconds),
            _model: PhantomData,
        })
    }

    fn validate_and_provide_url(&self) -> Result<Url> {
        let raw = self.url.as_deref().ok_or_else(|| ViewerError::MissingConfigError {
            field: "url".to_string(),
        })?;
        Url::parse(raw).map_err(|e| ViewerError::InvalidConfigValueError {
            field: "url".to_string(),
            value: raw.to_string(),
            reason: e.to_string(),
        })
    }
}

/// A GET request whose 200 body decodes into `A`.
#[derive(Debug, Clone)]
pub struct ApiRequest<A> {
    url: Url,
    client: HttpClient,
    timeout: Duration,
    _model: PhantomData<fn() -> A>,
}

impl<A: JsonDecode> ApiRequest<A> {
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn request(&self) -> Result<ApiResponse> {
        tracing::debug!("GET {} (timeout {:?})", self.url, self.timeout);
        let response = self
            .client
            .inner()
            .get(self.url.clone())
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        tracing::debug!("{} answered {} ({} bytes)", self.url, status, body.len());
        Ok(ApiResponse { status, body })
    }

    /// Maps the status code and, for a 200, decodes the body.
    pub fn validate_and_provide_response(
        &self,
        response: Option<ApiResponse>,
    ) -> ResponseStatus<A> {
        let Some(response) = response else {
            return ResponseStatus::Invalid;
        };

        let status = ResponseStatus::from_status_code(response.status);
        if !status.was_pending() {
            tracing::debug!("{} finished as {}", self.url, status);
            return status;
        }

        match A::decode(&response.body) {
            Ok(aggregate) => ResponseStatus::Valid(aggregate),
            Err(e) => {
                tracing::warn!("Could not decode response from {}: {}", self.url, e);
                ResponseStatus::Invalid
            }
        }
    }

    pub async fn request_and_handle(&self) -> ResponseStatus<A> {
        let response = match self.request().await {
            Ok(response) => Some(response),
            Err(e) => {
                tracing::error!(
                    "Unexpected error when making request to {}: {}",
                    self.url,
                    e
                );
                None
            }
        };
        self.validate_and_provide_response(response)
    }
}
