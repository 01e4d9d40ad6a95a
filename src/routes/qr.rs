use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};

use crate::{
    error::{AppError, AppResult, OptionExt},
    qr,
    routes::{parse_id, record_not_found},
    state::AppState,
};

// GET /api/qr/{id}/ - PNG download encoding the link's (absolute) target URL
pub async fn link_qr_code(State(state): State<AppState>, Path(raw_id): Path<String>) -> AppResult<Response> {
    let result = render_link_qr(&state, &raw_id).await;
    record_not_found(&state.metrics, result)
}

async fn render_link_qr(state: &AppState, raw_id: &str) -> AppResult<Response> {
    let id = parse_id(raw_id, "Resource link")?;
    let link = state.catalog.find_link(id).await?.ok_or_not_found("Resource link")?;

    // Storage backends may hand out host-relative URLs; a scanned code needs an absolute one
    let url = qr::absolutize(&state.catalog.effective_url(&link)?, &state.config.storage.public_base_url);

    let png = match state.qr_cache.get(id, &url).await {
        Some(png) => {
            state.metrics.inc_qr_cache_hits();
            png
        }
        None => {
            let module_size = state.config.qr.module_size;
            let data = url.clone();
            let rendered = tokio::task::spawn_blocking(move || qr::render_png(&data, module_size))
                .await
                .map_err(|e| AppError::Internal(anyhow::anyhow!("QR render task failed: {}", e)))??;
            let png = Bytes::from(rendered);
            state.qr_cache.insert(id, &url, png.clone()).await;
            png
        }
    };
    state.metrics.inc_qr_generated();
    tracing::debug!("QR code for link {} ({} bytes) -> {}", id, png.len(), url);

    let filename = qr::qr_filename(&link.title);
    // from_bytes: titles may carry non-ASCII letters
    let disposition = HeaderValue::from_bytes(qr::attachment_disposition(&filename).as_bytes()).map_err(|e| {
        AppError::Internal(anyhow::anyhow!("invalid Content-Disposition for {:?}: {}", filename, e))
    })?;

    let mut response = png.into_response();
    response.headers_mut().insert(header::CONTENT_TYPE, HeaderValue::from_static("image/png"));
    response.headers_mut().insert(header::CONTENT_DISPOSITION, disposition);
    Ok(response)
}
