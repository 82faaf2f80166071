pub mod client;
pub mod codec;
pub mod download;
pub mod request;
pub mod status;
pub mod url;

pub use crate::domain::model::{
    AggregateRoot, Release, ReleaseAsset, Repository, RepositoryProperties,
};
pub use crate::domain::ports::{ClientSettings, Storage};
pub use crate::domain::version::ComparisonOperator;
pub use crate::utils::error::Result;
