//! QR code rendering for link targets.

use std::io::Cursor;
use std::num::NonZeroUsize;
use std::sync::Arc;

use axum::body::Bytes;
use image::{ImageFormat, Luma};
use lru::LruCache;
use qrcode::QrCode;
use tokio::sync::Mutex;

use crate::models::LinkId;

#[derive(Debug, thiserror::Error)]
pub enum QrError {
    #[error("QR encoding failed: {0}")]
    Encode(#[from] qrcode::types::QrError),
    #[error("PNG encoding failed: {0}")]
    Png(#[from] image::ImageError),
}

/// Renders `data` as a black-on-white QR code PNG, `module_size` pixels per
/// module, with the standard four-module quiet zone.
pub fn render_png(data: &str, module_size: u32) -> Result<Vec<u8>, QrError> {
    let code = QrCode::new(data.as_bytes())?;
    let img = code
        .render::<Luma<u8>>()
        .quiet_zone(true)
        .module_dimensions(module_size, module_size)
        .build();

    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

/// Turns a storage URL that is relative to the serving host into an absolute one.
///
/// Absolute URLs (anything not starting with `/`) are returned unchanged.
pub fn absolutize(url: &str, base: &str) -> String {
    if url.starts_with('/') {
        format!("{}{}", base.trim_end_matches('/'), url)
    } else {
        url.to_string()
    }
}

/// Download filename for a link's QR code.
///
/// Keeps letters, digits and whitespace of the title, drops trailing
/// whitespace, turns the remaining whitespace into `_` and appends `_qr.png`.
pub fn qr_filename(title: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    let safe: String = kept
        .trim_end()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    format!("{}_qr.png", safe)
}

/// `Content-Disposition` value carrying the derived filename.
pub fn attachment_disposition(filename: &str) -> String {
    format!("attachment; filename=\"{}\"", filename)
}

type CacheKey = (LinkId, String);

/// Recently rendered PNGs, keyed by link id and the exact URL encoded.
///
/// Keying on the URL means an edited link never serves a stale code.
#[derive(Clone)]
pub struct QrCache {
    inner: Option<Arc<Mutex<LruCache<CacheKey, Bytes>>>>,
}

impl QrCache {
    /// A capacity of 0 disables caching.
    pub fn new(capacity: usize) -> Self {
        let inner = NonZeroUsize::new(capacity).map(|cap| Arc::new(Mutex::new(LruCache::new(cap))));
        Self { inner }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    pub async fn get(&self, link_id: LinkId, url: &str) -> Option<Bytes> {
        let cache = self.inner.as_ref()?;
        let mut guard = cache.lock().await;
        guard.get(&(link_id, url.to_string())).cloned()
    }

    pub async fn insert(&self, link_id: LinkId, url: &str, png: Bytes) {
        if let Some(cache) = self.inner.as_ref() {
            cache.lock().await.put((link_id, url.to_string()), png);
        }
    }
}
