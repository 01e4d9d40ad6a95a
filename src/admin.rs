//! Administrative write path.
//!
//! Categories, tags, links, sets and memberships are created and edited here.
//! The HTTP API never calls into this module; it only reads the rows it
//! leaves behind.

use std::sync::Arc;

use chrono::NaiveDate;
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::error::{
    validation::{validate_http_url, validate_max_len, validate_text},
    AppError, AppResult, OptionExt,
};
use crate::models::{
    Category, CategoryId, LinkId, LinkType, ResourceLink, ResourceSet, ResourceSetMembership, SetId, Tag,
    TagId,
};
use crate::storage::{normalize_path, Storage};

const MAX_TITLE_LEN: usize = 200;
const MAX_NAME_LEN: usize = 100;
const MAX_VERSION_LEN: usize = 20;
const MAX_URL_LEN: usize = 500;
/// Directory uploads are stored under.
pub const UPLOAD_DIR: &str = "resources";

/// What a link points at. Exactly one of `url`/`file` ends up non-blank.
#[derive(Debug, Clone)]
pub enum LinkTarget {
    External(String),
    Upload { filename: String, bytes: Vec<u8> },
}

#[derive(Debug, Clone)]
pub struct NewLink {
    pub title: String,
    pub description: String,
    pub category_id: Option<CategoryId>,
    pub tag_ids: Vec<TagId>,
    pub target: LinkTarget,
}

/// Partial update; `None` leaves the field alone.
#[derive(Debug, Clone, Default)]
pub struct LinkUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Option<CategoryId>>,
    pub tag_ids: Option<Vec<TagId>>,
    pub target: Option<LinkTarget>,
}

#[derive(Debug, Clone, Default)]
pub struct NewSet {
    pub title: String,
    pub description: String,
    pub version: String,
    /// Defaults to today. Never changed afterwards.
    pub published_date: Option<NaiveDate>,
}

/// Column values of a link row about to be written.
struct LinkFields<'a> {
    title: &'a str,
    description: &'a str,
    category_id: Option<CategoryId>,
    link_type: LinkType,
    url: &'a str,
    file: &'a str,
}

/// The administrative write-service.
#[derive(Clone)]
pub struct AdminStore {
    db: SqlitePool,
    storage: Arc<dyn Storage>,
}

impl AdminStore {
    pub fn new(db: SqlitePool, storage: Arc<dyn Storage>) -> Self {
        Self { db, storage }
    }

    // ---- categories ----

    pub async fn create_category(&self, name: &str, description: &str) -> AppResult<Category> {
        validate_text(name, "name", MAX_NAME_LEN)?;
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, description) VALUES (?1, ?2) RETURNING id, name, description",
        )
        .bind(name.trim())
        .bind(description)
        .fetch_one(&self.db)
        .await?;
        tracing::info!("Created category {} ({})", category.id, category.name);
        Ok(category)
    }

    pub async fn update_category(&self, id: CategoryId, name: &str, description: &str) -> AppResult<Category> {
        validate_text(name, "name", MAX_NAME_LEN)?;
        sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = ?2, description = ?3 WHERE id = ?1 RETURNING id, name, description",
        )
        .bind(id)
        .bind(name.trim())
        .bind(description)
        .fetch_optional(&self.db)
        .await?
        .ok_or_not_found("Category")
    }

    /// Links in this category keep existing with no category.
    pub async fn delete_category(&self, id: CategoryId) -> AppResult<()> {
        let res = sqlx::query("DELETE FROM categories WHERE id = ?1").bind(id).execute(&self.db).await?;
        if res.rows_affected() == 0 {
            return Err(AppError::NotFound("Category not found".to_string()));
        }
        Ok(())
    }

    // ---- tags ----

    pub async fn create_tag(&self, name: &str) -> AppResult<Tag> {
        validate_text(name, "name", MAX_NAME_LEN)?;
        let tag = sqlx::query_as::<_, Tag>("INSERT INTO tags (name) VALUES (?1) RETURNING id, name")
            .bind(name.trim())
            .fetch_one(&self.db)
            .await?;
        Ok(tag)
    }

    pub async fn delete_tag(&self, id: TagId) -> AppResult<()> {
        let res = sqlx::query("DELETE FROM tags WHERE id = ?1").bind(id).execute(&self.db).await?;
        if res.rows_affected() == 0 {
            return Err(AppError::NotFound("Tag not found".to_string()));
        }
        Ok(())
    }

    // ---- links ----

    pub async fn create_link(&self, new: NewLink) -> AppResult<ResourceLink> {
        validate_text(&new.title, "title", MAX_TITLE_LEN)?;
        let (link_type, url, file) = self.store_target(new.target).await?;

        let fields = LinkFields {
            title: &new.title,
            description: &new.description,
            category_id: new.category_id,
            link_type,
            url: &url,
            file: &file,
        };
        let created = self.insert_link(&fields, &new.tag_ids).await;
        match created {
            Ok(link) => {
                tracing::info!("Created {} link {} ({})", link.link_type, link.id, link.title);
                Ok(link)
            }
            Err(e) => {
                // Row never landed: do not leave an orphaned upload behind
                if !file.is_empty() {
                    if let Err(cleanup) = self.storage.delete(&file).await {
                        tracing::warn!("Failed to remove orphaned upload {}: {}", file, cleanup);
                    }
                }
                Err(e)
            }
        }
    }

    async fn insert_link(&self, fields: &LinkFields<'_>, tag_ids: &[TagId]) -> AppResult<ResourceLink> {
        let mut tx = self.db.begin().await?;
        let link = sqlx::query_as::<_, ResourceLink>(
            "INSERT INTO resource_links (title, description, category_id, link_type, url, file) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
             RETURNING id, title, description, category_id, created_at, link_type, url, file",
        )
        .bind(fields.title.trim())
        .bind(fields.description)
        .bind(fields.category_id)
        .bind(fields.link_type.as_str())
        .bind(fields.url)
        .bind(fields.file)
        .fetch_one(&mut *tx)
        .await?;
        replace_tags(&mut tx, link.id, tag_ids).await?;
        tx.commit().await?;
        Ok(link)
    }

    pub async fn update_link(&self, id: LinkId, update: LinkUpdate) -> AppResult<ResourceLink> {
        let current = self.fetch_link(id).await?.ok_or_not_found("Resource link")?;

        let title = update.title.unwrap_or_else(|| current.title.clone());
        validate_text(&title, "title", MAX_TITLE_LEN)?;
        let description = update.description.unwrap_or_else(|| current.description.clone());
        let category_id = update.category_id.unwrap_or(current.category_id);

        let replaced_target = update.target.is_some();
        let (link_type, url, file) = match update.target {
            Some(target) => self.store_target(target).await?,
            None => (current.link_type, current.url.clone(), current.file.clone()),
        };

        let fields = LinkFields {
            title: &title,
            description: &description,
            category_id,
            link_type,
            url: &url,
            file: &file,
        };
        let link = match self.write_link_update(id, &fields, update.tag_ids.as_deref()).await {
            Ok(link) => link,
            Err(e) => {
                // The row still points at the old target; drop the upload stored for the new one
                if replaced_target && !file.is_empty() && file != current.file {
                    self.remove_stored_file(&file).await;
                }
                return Err(e);
            }
        };

        // The previous upload is unreachable once the row points elsewhere
        if replaced_target && !current.file.is_empty() && current.file != link.file {
            self.remove_stored_file(&current.file).await;
        }
        Ok(link)
    }

    async fn write_link_update(
        &self,
        id: LinkId,
        fields: &LinkFields<'_>,
        tag_ids: Option<&[TagId]>,
    ) -> AppResult<ResourceLink> {
        let mut tx = self.db.begin().await?;
        let link = sqlx::query_as::<_, ResourceLink>(
            "UPDATE resource_links SET title = ?2, description = ?3, category_id = ?4, \
                 link_type = ?5, url = ?6, file = ?7 \
             WHERE id = ?1 \
             RETURNING id, title, description, category_id, created_at, link_type, url, file",
        )
        .bind(id)
        .bind(fields.title.trim())
        .bind(fields.description)
        .bind(fields.category_id)
        .bind(fields.link_type.as_str())
        .bind(fields.url)
        .bind(fields.file)
        .fetch_one(&mut *tx)
        .await?;
        if let Some(tag_ids) = tag_ids {
            replace_tags(&mut tx, id, tag_ids).await?;
        }
        tx.commit().await?;
        Ok(link)
    }

    /// Removes the link, its tag assignments, its set memberships and its uploaded file.
    pub async fn delete_link(&self, id: LinkId) -> AppResult<()> {
        let current = self.fetch_link(id).await?.ok_or_not_found("Resource link")?;
        sqlx::query("DELETE FROM resource_links WHERE id = ?1").bind(id).execute(&self.db).await?;
        if !current.file.is_empty() {
            self.remove_stored_file(&current.file).await;
        }
        tracing::info!("Deleted link {} ({})", id, current.title);
        Ok(())
    }

    // ---- sets ----

    pub async fn create_set(&self, new: NewSet) -> AppResult<ResourceSet> {
        validate_text(&new.title, "title", MAX_TITLE_LEN)?;
        validate_max_len(&new.version, "version", MAX_VERSION_LEN)?;
        let set = sqlx::query_as::<_, ResourceSet>(
            "INSERT INTO resource_sets (title, description, version, published_date) \
             VALUES (?1, ?2, ?3, COALESCE(?4, date('now'))) \
             RETURNING id, title, description, version, published_date",
        )
        .bind(new.title.trim())
        .bind(&new.description)
        .bind(&new.version)
        .bind(new.published_date)
        .fetch_one(&self.db)
        .await?;
        tracing::info!("Created set {} ({})", set.id, set.title);
        Ok(set)
    }

    /// Updates title, description and version; the published date stays as created.
    pub async fn update_set(&self, id: SetId, title: &str, description: &str, version: &str) -> AppResult<ResourceSet> {
        validate_text(title, "title", MAX_TITLE_LEN)?;
        validate_max_len(version, "version", MAX_VERSION_LEN)?;
        sqlx::query_as::<_, ResourceSet>(
            "UPDATE resource_sets SET title = ?2, description = ?3, version = ?4 WHERE id = ?1 \
             RETURNING id, title, description, version, published_date",
        )
        .bind(id)
        .bind(title.trim())
        .bind(description)
        .bind(version)
        .fetch_optional(&self.db)
        .await?
        .ok_or_not_found("Resource set")
    }

    /// Removes the set and its memberships; the member links stay.
    pub async fn delete_set(&self, id: SetId) -> AppResult<()> {
        let res = sqlx::query("DELETE FROM resource_sets WHERE id = ?1").bind(id).execute(&self.db).await?;
        if res.rows_affected() == 0 {
            return Err(AppError::NotFound("Resource set not found".to_string()));
        }
        Ok(())
    }

    // ---- memberships ----

    /// Adds a link to a set at `order`. A link can be in a set only once.
    pub async fn add_to_set(&self, set_id: SetId, link_id: LinkId, order: i64) -> AppResult<ResourceSetMembership> {
        if order < 0 {
            return Err(AppError::ValidationError {
                field: "order".to_string(),
                message: format!("Order must not be negative, got {}", order),
            });
        }
        self.ensure_exists("resource_sets", set_id, "Resource set").await?;
        self.ensure_exists("resource_links", link_id, "Resource link").await?;

        let membership = sqlx::query_as::<_, ResourceSetMembership>(
            "INSERT INTO resource_set_memberships (resource_set_id, resource_link_id, sort_order) \
             VALUES (?1, ?2, ?3) \
             RETURNING id, resource_set_id, resource_link_id, sort_order",
        )
        .bind(set_id)
        .bind(link_id)
        .bind(order)
        .fetch_one(&self.db)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => {
                AppError::Conflict(format!("Link {} is already part of set {}", link_id, set_id))
            }
            other => other,
        })?;
        Ok(membership)
    }

    pub async fn set_order(&self, set_id: SetId, link_id: LinkId, order: i64) -> AppResult<ResourceSetMembership> {
        if order < 0 {
            return Err(AppError::ValidationError {
                field: "order".to_string(),
                message: format!("Order must not be negative, got {}", order),
            });
        }
        sqlx::query_as::<_, ResourceSetMembership>(
            "UPDATE resource_set_memberships SET sort_order = ?3 \
             WHERE resource_set_id = ?1 AND resource_link_id = ?2 \
             RETURNING id, resource_set_id, resource_link_id, sort_order",
        )
        .bind(set_id)
        .bind(link_id)
        .bind(order)
        .fetch_optional(&self.db)
        .await?
        .ok_or_not_found("Membership")
    }

    pub async fn remove_from_set(&self, set_id: SetId, link_id: LinkId) -> AppResult<()> {
        let res = sqlx::query(
            "DELETE FROM resource_set_memberships WHERE resource_set_id = ?1 AND resource_link_id = ?2",
        )
        .bind(set_id)
        .bind(link_id)
        .execute(&self.db)
        .await?;
        if res.rows_affected() == 0 {
            return Err(AppError::NotFound("Membership not found".to_string()));
        }
        Ok(())
    }

    // ---- helpers ----

    async fn fetch_link(&self, id: LinkId) -> AppResult<Option<ResourceLink>> {
        let link = sqlx::query_as::<_, ResourceLink>(
            "SELECT id, title, description, category_id, created_at, link_type, url, file \
             FROM resource_links WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(link)
    }

    async fn ensure_exists(&self, table: &str, id: i64, entity: &str) -> AppResult<()> {
        // table names are compile-time constants from this module
        let found: Option<i64> = sqlx::query_scalar(&format!("SELECT id FROM {} WHERE id = ?1", table))
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        found.map(|_| ()).ok_or_not_found(entity)
    }

    /// Validates the target and saves upload bytes. Returns `(type, url, file)`.
    async fn store_target(&self, target: LinkTarget) -> AppResult<(LinkType, String, String)> {
        match target {
            LinkTarget::External(url) => {
                validate_http_url(&url, "url", MAX_URL_LEN)?;
                Ok((LinkType::External, url, String::new()))
            }
            LinkTarget::Upload { filename, bytes } => {
                let filename = filename.trim();
                if filename.contains('/') {
                    return Err(AppError::ValidationError {
                        field: "file".to_string(),
                        message: format!("Filename must not contain directories: {}", filename),
                    });
                }
                let path = format!("{}/{}", UPLOAD_DIR, filename);
                normalize_path(&path)?;
                let stored = self.storage.save(&path, &bytes).await?;
                Ok((LinkType::Upload, String::new(), stored))
            }
        }
    }

    async fn remove_stored_file(&self, path: &str) {
        // Row changes are already committed; a leftover file is only logged
        if let Err(e) = self.storage.delete(path).await {
            tracing::warn!("Failed to delete stored file {}: {}", path, e);
        }
    }
}

async fn replace_tags(tx: &mut Transaction<'_, Sqlite>, link_id: LinkId, tag_ids: &[TagId]) -> AppResult<()> {
    sqlx::query("DELETE FROM resource_link_tags WHERE resource_link_id = ?1")
        .bind(link_id)
        .execute(&mut **tx)
        .await?;
    for tag_id in tag_ids {
        sqlx::query("INSERT OR IGNORE INTO resource_link_tags (resource_link_id, tag_id) VALUES (?1, ?2)")
            .bind(link_id)
            .bind(tag_id)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}
