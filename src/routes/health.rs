use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

// Health check endpoint - lightweight, no DB access
pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

// Readiness check: checks DB connectivity with timeout protection
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let query = sqlx::query("SELECT 1").fetch_one(&state.db);
    match tokio::time::timeout(std::time::Duration::from_secs(5), query).await {
        Ok(Ok(_)) => (StatusCode::OK, "ready").into_response(),
        Ok(Err(e)) => (StatusCode::SERVICE_UNAVAILABLE, format!("not ready: {}", e)).into_response(),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "not ready: timeout").into_response(),
    }
}

// Metrics endpoint: returns JSON snapshot
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.metrics.get_snapshot();
    Json(snapshot)
}

// Prometheus-compatible text exposition format
pub async fn metrics_prometheus(State(state): State<AppState>) -> impl IntoResponse {
    let m = state.metrics.get_snapshot();
    let body = format!(
        "# HELP resource_hub_links_listed Link list requests\n# TYPE resource_hub_links_listed counter\nresource_hub_links_listed {}\n\
# HELP resource_hub_link_lookups Single link requests\n# TYPE resource_hub_link_lookups counter\nresource_hub_link_lookups {}\n\
# HELP resource_hub_sets_listed Set list requests\n# TYPE resource_hub_sets_listed counter\nresource_hub_sets_listed {}\n\
# HELP resource_hub_set_lookups Set detail requests\n# TYPE resource_hub_set_lookups counter\nresource_hub_set_lookups {}\n\
# HELP resource_hub_qr_generated QR codes served\n# TYPE resource_hub_qr_generated counter\nresource_hub_qr_generated {}\n\
# HELP resource_hub_qr_cache_hits QR codes served from cache\n# TYPE resource_hub_qr_cache_hits counter\nresource_hub_qr_cache_hits {}\n\
# HELP resource_hub_not_found Requests for unknown ids\n# TYPE resource_hub_not_found counter\nresource_hub_not_found {}\n\
# HELP resource_hub_uptime_seconds Uptime seconds\n# TYPE resource_hub_uptime_seconds gauge\nresource_hub_uptime_seconds {}\n",
        m.links_listed,
        m.link_lookups,
        m.sets_listed,
        m.set_lookups,
        m.qr_generated,
        m.qr_cache_hits,
        m.not_found,
        m.uptime_seconds,
    );
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}

// Version/Build info endpoint (JSON)
pub async fn version() -> impl IntoResponse {
    let body = serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "package": {
            "description": env!("CARGO_PKG_DESCRIPTION"),
            "authors": env!("CARGO_PKG_AUTHORS"),
            "license": env!("CARGO_PKG_LICENSE"),
        },
        "build": {
            "profile": if cfg!(debug_assertions) { "debug" } else { "release" },
            "os": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
        }
    });
    (StatusCode::OK, Json(body))
}
