//! Unit routes
//!
//! Lookup of the selected unit and manual stage updates. Every handler
//! resolves the unit id against the latest snapshot.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::api::DataResponse;
use crate::app::AppState;
use crate::domain::UnitUpdateRequest;
use crate::error::{ApiError, ApiResult};

/// GET /units/:unit_id
pub async fn get_unit(
    State(state): State<Arc<AppState>>,
    Path(unit_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let snapshot = state.store.snapshot();
    let unit = snapshot
        .unit(&unit_id)
        .ok_or_else(|| ApiError::unit_not_found(&unit_id))?;

    Ok(DataResponse::new(unit.clone()))
}

/// GET /units/:unit_id/timeline
///
/// Construction milestones from Foundation to Handover Ready.
pub async fn get_unit_timeline(
    State(state): State<Arc<AppState>>,
    Path(unit_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let snapshot = state.store.snapshot();
    let unit = snapshot
        .unit(&unit_id)
        .ok_or_else(|| ApiError::unit_not_found(&unit_id))?;

    Ok(DataResponse::new(unit.timeline()))
}

/// POST /units/:unit_id/updates
///
/// Move a unit to a new stage and log the change.
pub async fn update_unit(
    State(state): State<Arc<AppState>>,
    Path(unit_id): Path<String>,
    Json(req): Json<UnitUpdateRequest>,
) -> ApiResult<impl IntoResponse> {
    let (snapshot, found) = state.store.update(|building| {
        if !building.contains_unit(&unit_id) {
            return (building.clone(), false);
        }
        let next = building.apply_update(&unit_id, req.stage, &req.note, req.image_url.as_deref());
        (next, true)
    });

    if !found {
        return Err(ApiError::unit_not_found(&unit_id));
    }

    tracing::info!(unit_id = %unit_id, stage = %req.stage, "Unit updated manually");

    let unit = snapshot
        .unit(&unit_id)
        .cloned()
        .ok_or_else(|| ApiError::unit_not_found(&unit_id))?;

    Ok(DataResponse::new(unit))
}
