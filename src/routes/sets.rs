use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::AppResult,
    routes::{parse_id, record_not_found},
    state::AppState,
    types::{SetDetail, SetSummary},
};

// GET /api/sets/
pub async fn list_sets(State(state): State<AppState>) -> AppResult<Json<Vec<SetSummary>>> {
    state.metrics.inc_sets_listed();
    let sets = state.catalog.list_sets().await?;
    Ok(Json(sets))
}

// GET /api/sets/{id}/
pub async fn get_set(State(state): State<AppState>, Path(raw_id): Path<String>) -> AppResult<Json<SetDetail>> {
    state.metrics.inc_set_lookups();
    let result = match parse_id(&raw_id, "Resource set") {
        Ok(id) => state.catalog.get_set(id).await,
        Err(e) => Err(e),
    };
    record_not_found(&state.metrics, result).map(Json)
}
