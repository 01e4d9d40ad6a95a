//! HTTP route handlers for the Resource Hub API.
//!
//! All routes are read-only:
//!
//! - `links`: resource links with derived URL, file type and set navigation
//! - `sets`: resource set summaries and ordered set details
//! - `qr`: QR code PNGs for a link's target URL
//! - `health`: health, readiness, metrics and version endpoints

pub mod health;
pub mod links;
pub mod qr;
pub mod sets;

use axum::{middleware::from_fn, middleware::from_fn_with_state, routing::get, Router};

use crate::error::{AppError, AppResult};
use crate::metrics::Metrics;
use crate::middleware;
use crate::state::AppState;

/// API router with security middleware, without transport layers (tracing,
/// compression, CORS, static files) which the binary adds on top.
pub fn router(state: AppState) -> Router {
    let cfg_arc = state.config.clone();

    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .route("/metrics", get(health::metrics))
        .route("/metrics/prometheus", get(health::metrics_prometheus))
        .route("/version", get(health::version))
        .route("/api/links", get(links::list_links))
        .route("/api/links/", get(links::list_links))
        .route("/api/links/{id}", get(links::get_link))
        .route("/api/links/{id}/", get(links::get_link))
        .route("/api/sets", get(sets::list_sets))
        .route("/api/sets/", get(sets::list_sets))
        .route("/api/sets/{id}", get(sets::get_set))
        .route("/api/sets/{id}/", get(sets::get_set))
        .route("/api/qr/{id}", get(qr::link_qr_code))
        .route("/api/qr/{id}/", get(qr::link_qr_code))
        .with_state(state)
        .layer(from_fn(middleware::validation::validate_request_middleware))
        .layer(from_fn_with_state(cfg_arc, middleware::security_headers::security_headers_middleware))
}

/// Parses a path id. Anything that is not a positive integer cannot name a
/// row, so it is reported as not found rather than as a bad request.
pub(crate) fn parse_id(raw: &str, entity: &str) -> AppResult<i64> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::NotFound(format!("{} not found", entity))),
    }
}

pub(crate) fn record_not_found<T>(metrics: &Metrics, result: AppResult<T>) -> AppResult<T> {
    if let Err(AppError::NotFound(_)) = &result {
        metrics.inc_not_found();
    }
    result
}
