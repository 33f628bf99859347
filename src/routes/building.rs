//! Building routes
//!
//! Whole-building snapshot, regeneration and dashboard statistics.

use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

use crate::api::DataResponse;
use crate::app::AppState;
use crate::domain::{BuildingStats, ConfigureBuildingRequest};
use crate::error::{ApiError, ApiResult};
use crate::services::generator::generate_building;

/// GET /building
///
/// The current snapshot, top floor first.
pub async fn get_building(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.store.snapshot();
    DataResponse::new(snapshot.as_ref().clone())
}

/// PUT /building
///
/// Regenerate the building. Every unit's progress and history is discarded,
/// so the request must carry `"confirm": true`.
pub async fn configure_building(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ConfigureBuildingRequest>,
) -> ApiResult<impl IntoResponse> {
    if !req.confirm {
        return Err(ApiError::BadRequest(
            "Regenerating the building resets all unit progress; resend with \"confirm\": true"
                .to_string(),
        ));
    }

    let building = generate_building(&req.config, &mut rand::thread_rng())?;
    let snapshot = state.store.replace(building);

    tracing::info!(
        name = %snapshot.name,
        floors = snapshot.total_floors,
        units_per_floor = req.config.units_per_floor,
        prefix = %req.config.unit_prefix,
        "Building regenerated"
    );

    Ok(DataResponse::new(BuildingStats::from(snapshot.as_ref())))
}

/// GET /building/stats
///
/// Casting progress and per-stage unit counts, recomputed from the latest
/// snapshot on every call.
pub async fn get_building_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.store.snapshot();
    DataResponse::new(BuildingStats::from(snapshot.as_ref()))
}
