use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{LinkId, LinkType, SetId};

/// Minimal shape used for previous/next navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavLink {
    pub id: LinkId,
    pub title: String,
}

// Representation for /api/links/ and /api/links/{id}/
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkDto {
    pub id: LinkId,
    pub title: String,
    pub description: String,
    /// Category name
    pub category: Option<String>,
    /// Effective URL (storage URL for uploads, stored URL otherwise)
    pub url: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub link_type: LinkType,
    pub file_type: Option<String>,
    pub set_id: Option<SetId>,
    pub set_title: Option<String>,
    pub next_resource: Option<NavLink>,
    pub previous_resource: Option<NavLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetSummary {
    pub id: SetId,
    pub title: String,
    pub description: String,
    pub version: String,
    pub published_date: NaiveDate,
    pub first_resource_id: Option<LinkId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetMember {
    pub id: LinkId,
    pub title: String,
    pub order: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetDetail {
    pub id: SetId,
    pub title: String,
    pub description: String,
    pub version: String,
    pub published_date: NaiveDate,
    /// Members in navigation order
    pub resources: Vec<SetMember>,
}
