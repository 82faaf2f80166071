use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// License name used when GitHub detects no license for a repository.
pub const UNKNOWN_LICENSE: &str = "unknown";

/// An entity identified by its GitHub id.
pub trait AggregateRoot {
    fn id(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: String,
    pub owner: String,
    pub name: String,
    pub description: String,
    pub license: String,
    pub properties: RepositoryProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryProperties {
    pub is_fork: bool,
    /// Owner of the upstream repository, only set for forks.
    pub parent: Option<String>,
    pub can_be_forked: bool,
    pub stars: u64,
    pub forks: u64,
    pub is_public: bool,
    pub is_archived: bool,
    pub is_disabled: bool,
    pub language: Option<String>,
    pub topics: Vec<String>,
}

impl Repository {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    pub fn has_license(&self) -> bool {
        self.license != UNKNOWN_LICENSE
    }
}

impl AggregateRoot for Repository {
    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let props = &self.properties;
        writeln!(f, "{} (id {})", self.full_name(), self.id)?;
        if !self.description.is_empty() {
            writeln!(f, "  {}", self.description)?;
        }
        writeln!(f, "  license:  {}", self.license)?;
        writeln!(
            f,
            "  language: {}",
            props.language.as_deref().unwrap_or("none")
        )?;
        writeln!(f, "  stars:    {}", props.stars)?;
        writeln!(
            f,
            "  forks:    {}{}",
            props.forks,
            if props.can_be_forked { "" } else { " (forking disabled)" }
        )?;
        if let Some(parent) = &props.parent {
            writeln!(f, "  fork of:  {}", parent)?;
        }
        let mut flags = vec![if props.is_public { "public" } else { "private" }];
        if props.is_archived {
            flags.push("archived");
        }
        if props.is_disabled {
            flags.push("disabled");
        }
        write!(f, "  status:   {}", flags.join(", "))?;
        if !props.topics.is_empty() {
            write!(f, "\n  topics:   {}", props.topics.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub download_url: String,
    pub size: u64,
}

impl ReleaseAsset {
    pub fn new(name: impl Into<String>, download_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            download_url: download_url.into(),
            size: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub id: String,
    pub author: String,
    pub tag: String,
    pub name: String,
    pub assets: Vec<ReleaseAsset>,
    pub published_at: Option<DateTime<Utc>>,
}

impl AggregateRoot for Release {
    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Release {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] by {}", self.name, self.tag, self.author)?;
        if let Some(published) = self.published_at {
            write!(f, ", published {}", published.format("%Y-%m-%d"))?;
        }
        if self.assets.is_empty() {
            return write!(f, "\n  no assets");
        }
        for (index, asset) in self.assets.iter().enumerate() {
            write!(f, "\n  {}. {} ({} bytes)", index + 1, asset.name, asset.size)?;
        }
        Ok(())
    }
}
