//! File storage abstraction.
//!
//! Uploaded files are written through a [`Storage`] backend and referenced from
//! `resource_links.file` by the path the backend returned. The read path only
//! ever calls [`Storage::url`].

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::config::StorageConfig;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("invalid storage path: {0}")]
    InvalidPath(String),
    #[error("storage I/O failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Stores `bytes` at (or near, on name collision) `path` and returns the path actually used.
    async fn save(&self, path: &str, bytes: &[u8]) -> StorageResult<String>;

    /// Public URL for a stored path. May be relative to the serving host.
    fn url(&self, path: &str) -> StorageResult<String>;

    async fn delete(&self, path: &str) -> StorageResult<()>;
}

/// Filesystem backend: files live below `root`, URLs are `url_prefix + path`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    url_prefix: String,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self { root: root.into(), url_prefix: url_prefix.into() }
    }

    pub fn from_config(cfg: &StorageConfig) -> Self {
        Self::new(&cfg.media_root, &cfg.media_url)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> StorageResult<PathBuf> {
        let rel = normalize_path(path)?;
        Ok(self.root.join(rel))
    }
}

/// Validates a storage path: relative, `/`-separated, no `..`, no empty segments.
pub fn normalize_path(path: &str) -> StorageResult<&Path> {
    if path.is_empty() || path.contains('\0') || path.contains('\\') {
        return Err(StorageError::InvalidPath(path.to_string()));
    }
    let p = Path::new(path);
    let all_normal = p.components().all(|c| matches!(c, Component::Normal(_)));
    if !all_normal || path.split('/').any(|seg| seg.is_empty() || seg == ".") {
        return Err(StorageError::InvalidPath(path.to_string()));
    }
    Ok(p)
}

/// `resources/report.pdf` -> `resources/report_1a2b3c4d.pdf`
fn with_suffix(path: &str, suffix: &str) -> String {
    let (dir, name) = match path.rfind('/') {
        Some(idx) => (&path[..=idx], &path[idx + 1..]),
        None => ("", path),
    };
    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{}{}_{}{}", dir, &name[..dot], suffix, &name[dot..]),
        _ => format!("{}{}_{}", dir, name, suffix),
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn save(&self, path: &str, bytes: &[u8]) -> StorageResult<String> {
        let mut candidate = path.to_string();
        let mut target = self.resolve(&candidate)?;
        while fs::try_exists(&target)
            .await
            .map_err(|source| StorageError::Io { path: candidate.clone(), source })?
        {
            let suffix = uuid::Uuid::new_v4().simple().to_string();
            candidate = with_suffix(path, &suffix[..8]);
            target = self.resolve(&candidate)?;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| StorageError::Io { path: candidate.clone(), source })?;
        }
        fs::write(&target, bytes)
            .await
            .map_err(|source| StorageError::Io { path: candidate.clone(), source })?;
        tracing::debug!("Stored {} bytes at {}", bytes.len(), target.display());
        Ok(candidate)
    }

    fn url(&self, path: &str) -> StorageResult<String> {
        normalize_path(path)?;
        Ok(format!("{}/{}", self.url_prefix.trim_end_matches('/'), path))
    }

    async fn delete(&self, path: &str) -> StorageResult<()> {
        let target = self.resolve(path)?;
        match fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            // Already gone counts as deleted
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { path: path.to_string(), source }),
        }
    }
}

/// Save -> url -> delete round trip against the configured backend.
///
/// Returns the URL the check file resolved to so it can be logged.
pub async fn verify(storage: &dyn Storage) -> StorageResult<String> {
    let content = b"resource-hub storage check";
    let saved = storage.save("storage-check/write-check.txt", content).await?;
    let url = storage.url(&saved);
    // Clean up even when URL resolution failed
    let deleted = storage.delete(&saved).await;
    let url = url?;
    deleted?;
    tracing::info!("Storage check passed (check file resolved to {})", url);
    Ok(url)
}
