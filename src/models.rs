//! Persisted records.
//!
//! These mirror the rows of the SQLite schema in [`crate::db`]. Client-facing
//! shapes live in [`crate::types`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub type CategoryId = i64;
pub type TagId = i64;
pub type LinkId = i64;
pub type SetId = i64;

/// Where a resource link points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LinkType {
    /// The `url` column holds the target.
    External,
    /// The `file` column holds a storage path.
    Upload,
}

impl LinkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkType::External => "EXTERNAL",
            LinkType::Upload => "UPLOAD",
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown link type: {0}")]
pub struct UnknownLinkType(pub String);

impl FromStr for LinkType {
    type Err = UnknownLinkType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EXTERNAL" => Ok(LinkType::External),
            "UPLOAD" => Ok(LinkType::Upload),
            other => Err(UnknownLinkType(other.to_string())),
        }
    }
}

impl TryFrom<String> for LinkType {
    type Error = UnknownLinkType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ResourceLink {
    pub id: LinkId,
    pub title: String,
    /// Markdown, passed through verbatim.
    pub description: String,
    pub category_id: Option<CategoryId>,
    pub created_at: DateTime<Utc>,
    #[sqlx(try_from = "String")]
    pub link_type: LinkType,
    pub url: String,
    pub file: String,
}

impl ResourceLink {
    /// The storage path, if this is an upload and a file is attached.
    pub fn stored_file(&self) -> Option<&str> {
        match self.link_type {
            LinkType::Upload if !self.file.is_empty() => Some(self.file.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ResourceSet {
    pub id: SetId,
    pub title: String,
    pub description: String,
    pub version: String,
    pub published_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ResourceSetMembership {
    pub id: i64,
    pub resource_set_id: SetId,
    pub resource_link_id: LinkId,
    #[sqlx(rename = "sort_order")]
    pub order: i64,
}
