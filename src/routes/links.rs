use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::AppResult,
    routes::{parse_id, record_not_found},
    state::AppState,
    types::LinkDto,
};

// GET /api/links/
pub async fn list_links(State(state): State<AppState>) -> AppResult<Json<Vec<LinkDto>>> {
    state.metrics.inc_links_listed();
    let links = state.catalog.list_links().await?;
    Ok(Json(links))
}

// GET /api/links/{id}/
pub async fn get_link(State(state): State<AppState>, Path(raw_id): Path<String>) -> AppResult<Json<LinkDto>> {
    state.metrics.inc_link_lookups();
    let result = match parse_id(&raw_id, "Resource link") {
        Ok(id) => state.catalog.get_link(id).await,
        Err(e) => Err(e),
    };
    record_not_found(&state.metrics, result).map(Json)
}
