pub mod config;
pub mod core;
pub mod domain;
pub mod runtime;
pub mod utils;

#[cfg(feature = "cli")]
pub use self::config::CliConfig;
pub use self::config::{LocalStorage, TomlConfig};

pub use self::core::client::HttpClient;
pub use self::core::download::{AssetDownloaderService, DownloadOperationStatus, DownloaderService};
pub use self::core::request::{ReleaseRequest, RepositoryRequest, Request};
pub use self::core::status::ResponseStatus;
pub use self::core::url::UrlBuilder;
pub use self::domain::model::{Release, ReleaseAsset, Repository};
pub use self::domain::version::ComparisonOperator;
pub use self::utils::error::{Result, ViewerError};
