pub mod ai;
pub mod building;
pub mod health;
pub mod stages;
pub mod units;

use axum::{extract::DefaultBodyLimit, routing::get, routing::post, Router};
use std::sync::Arc;

use crate::app::AppState;
use crate::config::Settings;

/// Build the API router with all routes
pub fn api_router(settings: &Settings) -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        // Stage taxonomy
        .route("/stages", get(stages::list_stages))
        // Building snapshot
        .route(
            "/building",
            get(building::get_building).put(building::configure_building),
        )
        .route("/building/stats", get(building::get_building_stats))
        // Units
        .route("/units/:unit_id", get(units::get_unit))
        .route("/units/:unit_id/timeline", get(units::get_unit_timeline))
        .route("/units/:unit_id/updates", post(units::update_unit))
        // Model-assisted updates
        .route(
            "/ai/analyze",
            post(ai::analyze_update)
                .layer(DefaultBodyLimit::max(settings.ai_max_upload_bytes)),
        )
}
