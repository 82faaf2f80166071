use crate::utils::error::{Result, ViewerError};
use crate::utils::validation::{
    validate_non_empty_string, validate_repository_segment, validate_url,
};
use url::Url;

/// Base of GitHub's REST API.
pub const GITHUB_API_URL: &str = "https://api.github.com";
/// Base of GitHub's web pages.
pub const GITHUB_URL: &str = "https://github.com";
/// Release name that selects the most recent published release.
pub const LATEST_RELEASE: &str = "latest";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlBuilder {
    api_base: Url,
}

impl UrlBuilder {
    pub fn new(api_base: &str) -> Result<Self> {
        validate_url("api_url", api_base)?;
        let api_base = Url::parse(api_base).map_err(|e| ViewerError::InvalidConfigValueError {
            field: "api_url".to_string(),
            value: api_base.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { api_base })
    }

    pub fn api_base(&self) -> &str {
        self.api_base.as_str()
    }

    /// `{base}/repos/{owner}/{repository}`
    pub fn for_repository(&self, owner: &str, repository: &str) -> Result<String> {
        validate_repository_segment("owner", owner)?;
        validate_repository_segment("repository", repository)?;
        self.join(&["repos", owner, repository])
    }

    /// `{base}/repos/{owner}/{repository}/releases/tags/{release}`, or
    /// `.../releases/latest` when `release` is `latest`.
    pub fn for_release(&self, owner: &str, repository: &str, release: &str) -> Result<String> {
        validate_repository_segment("owner", owner)?;
        validate_repository_segment("repository", repository)?;
        validate_non_empty_string("release", release)?;

        if release == LATEST_RELEASE {
            self.join(&["repos", owner, repository, "releases", LATEST_RELEASE])
        } else {
            self.join(&["repos", owner, repository, "releases", "tags", release])
        }
    }

    /// Browser URL of the repository on github.com.
    pub fn html_url(owner: &str, repository: &str) -> Result<String> {
        validate_repository_segment("owner", owner)?;
        validate_repository_segment("repository", repository)?;
        Ok(format!("{}/{}/{}", GITHUB_URL, owner, repository))
    }

    fn join(&self, segments: &[&str]) -> Result<String> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| ViewerError::InvalidConfigValueError {
                field: "api_url".to_string(),
                value: self.api_base.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url.to_string())
    }
}

impl Default for UrlBuilder {
    fn default() -> Self {
        Self {
            api_base: Url::parse(GITHUB_API_URL).expect("GITHUB_API_URL is a valid URL"),
        }
    }
}

pub fn for_repository(owner: &str, repository: &str) -> Result<String> {
    UrlBuilder::default().for_repository(owner, repository)
}

pub fn for_release(owner: &str, repository: &str, release: &str) -> Result<String> {
    UrlBuilder::default().for_release(owner, repository, release)
}
