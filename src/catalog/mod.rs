//! Read-only queries over links and sets, shaped into client representations.
//!
//! Nothing in here writes to the database; see [`crate::admin`] for that.

pub mod file_type;
pub mod navigation;

use std::collections::HashMap;
use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::instrument;

use crate::error::{AppResult, OptionExt};
use crate::models::{LinkId, ResourceLink, ResourceSet, SetId};
use crate::storage::{Storage, StorageResult};
use crate::types::{LinkDto, NavLink, SetDetail, SetMember, SetSummary};

pub use file_type::FileTypeClassifier;
pub use navigation::{MemberRow, MembershipIndex, Placement};

const LINK_COLUMNS: &str = "l.id, l.title, l.description, l.category_id, l.created_at, l.link_type, l.url, l.file";

const MEMBER_COLUMNS: &str = "m.resource_set_id AS set_id, s.title AS set_title, \
     m.resource_link_id AS link_id, l.title AS link_title, m.sort_order AS \"order\"";

#[derive(Debug, sqlx::FromRow)]
struct LinkRow {
    #[sqlx(flatten)]
    link: ResourceLink,
    category_name: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct TagRow {
    resource_link_id: LinkId,
    name: String,
}

#[derive(Debug, sqlx::FromRow)]
struct SetRow {
    #[sqlx(flatten)]
    set: ResourceSet,
    first_resource_id: Option<LinkId>,
}

/// The link/set query and transform service.
#[derive(Clone)]
pub struct ResourceCatalog {
    db: SqlitePool,
    storage: Arc<dyn Storage>,
    file_types: Arc<FileTypeClassifier>,
}

impl ResourceCatalog {
    pub fn new(db: SqlitePool, storage: Arc<dyn Storage>, file_types: FileTypeClassifier) -> Self {
        Self { db, storage, file_types: Arc::new(file_types) }
    }

    /// Storage URL for uploads with a file attached, the stored URL otherwise.
    pub fn effective_url(&self, link: &ResourceLink) -> StorageResult<String> {
        match link.stored_file() {
            Some(path) => self.storage.url(path),
            None => Ok(link.url.clone()),
        }
    }

    /// `image`, `pdf`, ... for uploads with a recognised extension.
    pub fn file_type(&self, link: &ResourceLink) -> Option<String> {
        link.stored_file().and_then(|f| self.file_types.classify(f)).map(str::to_string)
    }

    /// Raw link record, without any of the derived fields.
    #[instrument(skip(self))]
    pub async fn find_link(&self, id: LinkId) -> AppResult<Option<ResourceLink>> {
        let link = sqlx::query_as::<_, ResourceLink>(
            "SELECT id, title, description, category_id, created_at, link_type, url, file \
             FROM resource_links WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(link)
    }

    /// Every link, newest first, with all derived fields.
    #[instrument(skip(self))]
    pub async fn list_links(&self) -> AppResult<Vec<LinkDto>> {
        let rows: Vec<LinkRow> = sqlx::query_as(&format!(
            "SELECT {LINK_COLUMNS}, c.name AS category_name \
             FROM resource_links l LEFT JOIN categories c ON c.id = l.category_id \
             ORDER BY l.created_at DESC, l.id DESC"
        ))
        .fetch_all(&self.db)
        .await?;

        let tag_rows: Vec<TagRow> = sqlx::query_as(
            "SELECT lt.resource_link_id, t.name \
             FROM resource_link_tags lt JOIN tags t ON t.id = lt.tag_id \
             ORDER BY t.name, t.id",
        )
        .fetch_all(&self.db)
        .await?;

        let members: Vec<MemberRow> = sqlx::query_as(&format!(
            "SELECT {MEMBER_COLUMNS} \
             FROM resource_set_memberships m \
             JOIN resource_sets s ON s.id = m.resource_set_id \
             JOIN resource_links l ON l.id = m.resource_link_id"
        ))
        .fetch_all(&self.db)
        .await?;

        let mut tags = group_tags(tag_rows);
        let index = MembershipIndex::new(members);
        rows.into_iter()
            .map(|row| {
                let link_tags = tags.remove(&row.link.id).unwrap_or_default();
                self.to_dto(row, link_tags, &index)
            })
            .collect()
    }

    /// A single link with all derived fields.
    #[instrument(skip(self))]
    pub async fn get_link(&self, id: LinkId) -> AppResult<LinkDto> {
        let row: LinkRow = sqlx::query_as(&format!(
            "SELECT {LINK_COLUMNS}, c.name AS category_name \
             FROM resource_links l LEFT JOIN categories c ON c.id = l.category_id \
             WHERE l.id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_not_found("Resource link")?;

        let link_tags: Vec<String> = sqlx::query_scalar(
            "SELECT t.name FROM resource_link_tags lt JOIN tags t ON t.id = lt.tag_id \
             WHERE lt.resource_link_id = ?1 ORDER BY t.name, t.id",
        )
        .bind(id)
        .fetch_all(&self.db)
        .await?;

        // Only the sets this link is part of matter for its neighbours
        let members: Vec<MemberRow> = sqlx::query_as(&format!(
            "SELECT {MEMBER_COLUMNS} \
             FROM resource_set_memberships m \
             JOIN resource_sets s ON s.id = m.resource_set_id \
             JOIN resource_links l ON l.id = m.resource_link_id \
             WHERE m.resource_set_id IN \
                 (SELECT resource_set_id FROM resource_set_memberships WHERE resource_link_id = ?1)"
        ))
        .bind(id)
        .fetch_all(&self.db)
        .await?;

        self.to_dto(row, link_tags, &MembershipIndex::new(members))
    }

    /// Every set, most recently published first.
    #[instrument(skip(self))]
    pub async fn list_sets(&self) -> AppResult<Vec<SetSummary>> {
        let rows: Vec<SetRow> = sqlx::query_as(
            "SELECT s.id, s.title, s.description, s.version, s.published_date, \
                 (SELECT m.resource_link_id FROM resource_set_memberships m \
                  WHERE m.resource_set_id = s.id \
                  ORDER BY m.sort_order, m.resource_link_id LIMIT 1) AS first_resource_id \
             FROM resource_sets s \
             ORDER BY s.published_date DESC, s.id DESC",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| SetSummary {
                id: row.set.id,
                title: row.set.title,
                description: row.set.description,
                version: row.set.version,
                published_date: row.set.published_date,
                first_resource_id: row.first_resource_id,
            })
            .collect())
    }

    /// Set metadata plus all members in navigation order.
    #[instrument(skip(self))]
    pub async fn get_set(&self, id: SetId) -> AppResult<SetDetail> {
        let set: ResourceSet = sqlx::query_as(
            "SELECT id, title, description, version, published_date FROM resource_sets WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_not_found("Resource set")?;

        let members: Vec<MemberRow> = sqlx::query_as(&format!(
            "SELECT {MEMBER_COLUMNS} \
             FROM resource_set_memberships m \
             JOIN resource_sets s ON s.id = m.resource_set_id \
             JOIN resource_links l ON l.id = m.resource_link_id \
             WHERE m.resource_set_id = ?1 \
             ORDER BY m.sort_order, m.resource_link_id"
        ))
        .bind(id)
        .fetch_all(&self.db)
        .await?;

        Ok(SetDetail {
            id: set.id,
            title: set.title,
            description: set.description,
            version: set.version,
            published_date: set.published_date,
            resources: members
                .into_iter()
                .map(|m| SetMember { id: m.link_id, title: m.link_title, order: m.order })
                .collect(),
        })
    }

    fn to_dto(&self, row: LinkRow, tags: Vec<String>, index: &MembershipIndex) -> AppResult<LinkDto> {
        let url = self.effective_url(&row.link)?;
        let file_type = self.file_type(&row.link);
        let placement = index.placement(row.link.id);
        let nav = |m: &MemberRow| NavLink { id: m.link_id, title: m.link_title.clone() };

        let link = row.link;
        Ok(LinkDto {
            id: link.id,
            title: link.title,
            description: link.description,
            category: row.category_name,
            url,
            tags,
            created_at: link.created_at,
            link_type: link.link_type,
            file_type,
            set_id: placement.map(|p| p.set_id),
            set_title: placement.map(|p| p.set_title.to_string()),
            next_resource: placement.and_then(|p| p.next).map(nav),
            previous_resource: placement.and_then(|p| p.previous).map(nav),
        })
    }
}

fn group_tags(rows: Vec<TagRow>) -> HashMap<LinkId, Vec<String>> {
    let mut tags: HashMap<LinkId, Vec<String>> = HashMap::new();
    for row in rows {
        tags.entry(row.resource_link_id).or_default().push(row.name);
    }
    tags
}
