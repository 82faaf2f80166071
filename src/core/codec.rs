use crate::domain::model::{
    AggregateRoot, Release, ReleaseAsset, Repository, RepositoryProperties, UNKNOWN_LICENSE,
};
use crate::utils::error::{Result, ViewerError};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// Builds an aggregate from a GitHub API JSON document.
pub trait JsonDecode: AggregateRoot + Sized {
    fn from_value(value: &Value) -> Result<Self>;

    fn decode(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }
}

fn object<'a>(value: &'a Value, context: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| ViewerError::decode(format!("'{}' is not a JSON object", context)))
}

fn field<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<&'a Value> {
    obj.get(key)
        .ok_or_else(|| ViewerError::decode(format!("missing field '{}'", key)))
}

fn string(obj: &Map<String, Value>, key: &str) -> Result<String> {
    field(obj, key)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ViewerError::decode(format!("field '{}' is not a string", key)))
}

fn optional_string(obj: &Map<String, Value>, key: &str) -> Result<Option<String>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ViewerError::decode(format!("field '{}' is not a string", key))),
    }
}

fn boolean(obj: &Map<String, Value>, key: &str) -> Result<bool> {
    field(obj, key)?
        .as_bool()
        .ok_or_else(|| ViewerError::decode(format!("field '{}' is not a boolean", key)))
}

fn count(obj: &Map<String, Value>, key: &str) -> Result<u64> {
    field(obj, key)?
        .as_u64()
        .ok_or_else(|| ViewerError::decode(format!("field '{}' is not a count", key)))
}

/// GitHub ids are numbers; older payloads and fixtures sometimes quote them.
fn id(obj: &Map<String, Value>) -> Result<String> {
    match field(obj, "id")? {
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(s.clone()),
        _ => Err(ViewerError::decode("field 'id' is not a number")),
    }
}

fn login(obj: &Map<String, Value>, key: &str) -> Result<String> {
    string(object(field(obj, key)?, key)?, "login")
}

/// Error documents look like `{"message": "Not Found", "documentation_url": ...}`.
fn reject_error_document(obj: &Map<String, Value>) -> Result<()> {
    if obj.contains_key("id") {
        return Ok(());
    }
    match obj.get("message").and_then(Value::as_str) {
        Some(message) => Err(ViewerError::decode(format!("GitHub API error: {}", message))),
        None => Ok(()),
    }
}

impl JsonDecode for Repository {
    fn from_value(value: &Value) -> Result<Self> {
        let obj = object(value, "repository")?;
        reject_error_document(obj)?;

        let license = match obj.get("license") {
            None | Some(Value::Null) => UNKNOWN_LICENSE.to_string(),
            Some(node) => string(object(node, "license")?, "name")?,
        };

        Ok(Repository {
            id: id(obj)?,
            owner: login(obj, "owner")?,
            name: string(obj, "name")?,
            description: optional_string(obj, "description")?.unwrap_or_default(),
            license,
            properties: properties(obj)?,
        })
    }
}

fn properties(obj: &Map<String, Value>) -> Result<RepositoryProperties> {
    let is_fork = boolean(obj, "fork")?;
    // The repository endpoint only embeds `parent` for forks.
    let parent = if is_fork {
        match obj.get("parent") {
            Some(parent) if !parent.is_null() => Some(login(object(parent, "parent")?, "owner")?),
            _ => None,
        }
    } else {
        None
    };

    let topics = match obj.get("topics") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|topic| {
                topic
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| ViewerError::decode("topic is not a string"))
            })
            .collect::<Result<Vec<_>>>()?,
        Some(_) => return Err(ViewerError::decode("field 'topics' is not an array")),
    };

    Ok(RepositoryProperties {
        is_fork,
        parent,
        can_be_forked: boolean(obj, "allow_forking")?,
        stars: count(obj, "stargazers_count")?,
        forks: count(obj, "forks_count")?,
        is_public: !boolean(obj, "private")?,
        is_archived: boolean(obj, "archived")?,
        is_disabled: boolean(obj, "disabled")?,
        language: optional_string(obj, "language")?,
        topics,
    })
}

impl JsonDecode for Release {
    fn from_value(value: &Value) -> Result<Self> {
        let obj = object(value, "release")?;
        reject_error_document(obj)?;

        let assets = field(obj, "assets")?
            .as_array()
            .ok_or_else(|| ViewerError::decode("field 'assets' is not an array"))?
            .iter()
            .map(asset)
            .collect::<Result<Vec<_>>>()?;

        let tag = string(obj, "tag_name")?;
        let name = optional_string(obj, "name")?
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| tag.clone());

        let published_at = optional_string(obj, "published_at")?
            .map(|raw| {
                DateTime::parse_from_rfc3339(&raw)
                    .map(|date| date.with_timezone(&Utc))
                    .map_err(|e| ViewerError::decode(format!("invalid 'published_at': {}", e)))
            })
            .transpose()?;

        Ok(Release {
            id: id(obj)?,
            author: login(obj, "author")?,
            tag,
            name,
            assets,
            published_at,
        })
    }
}

fn asset(value: &Value) -> Result<ReleaseAsset> {
    let obj = object(value, "asset")?;
    Ok(ReleaseAsset {
        name: string(obj, "name")?,
        download_url: string(obj, "browser_download_url")?,
        size: obj.get("size").and_then(Value::as_u64).unwrap_or(0),
    })
}
