//! Model-assisted site updates.
//!
//! The admin posts free text and/or a photo; the model suggests a stage and
//! the units it concerns, and every matched unit goes through the normal
//! update transaction. Only one analysis runs at a time.

use axum::{extract::State, http::HeaderMap, response::IntoResponse, Json};
use std::sync::Arc;

use crate::api::DataResponse;
use crate::app::AppState;
use crate::domain::ai::{AnalyzeRequest, AnalyzeResponse};
use crate::domain::BuildingStats;
use crate::error::{ApiError, ApiResult};
use crate::middleware::request_id::RequestIdExt;
use crate::services::analysis::apply_analysis;

/// POST /ai/analyze
///
/// Model failures are not errors here: they come back as the fallback
/// analysis and update nothing.
pub async fn analyze_update(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> ApiResult<impl IntoResponse> {
    let image = req.image.as_deref().filter(|s| !s.trim().is_empty());
    if req.text.trim().is_empty() && image.is_none() {
        return Err(ApiError::BadRequest(
            "Provide a description or a photo of the update".to_string(),
        ));
    }

    let _permit = state.analysis_gate.try_acquire().ok_or_else(|| {
        ApiError::Conflict("Another update is still being analyzed".to_string())
    })?;

    tracing::info!(
        request_id = headers.request_id().unwrap_or("-"),
        has_image = image.is_some(),
        "Analyzing site update"
    );

    let analysis = state.ai_client.analyze(&req.text, image).await;

    // Applied to whatever snapshot is current once the model answers.
    let (snapshot, outcome) =
        state
            .store
            .update(|building| apply_analysis(building, &analysis, image));

    if !outcome.unmatched_ids.is_empty() {
        tracing::warn!(
            unmatched = ?outcome.unmatched_ids,
            "Detected unit ids did not match any unit"
        );
    }
    tracing::info!(
        stage = %analysis.suggested_stage,
        confidence = analysis.confidence,
        updated = outcome.updated_unit_ids.len(),
        unmatched = outcome.unmatched_ids.len(),
        "Site update analyzed"
    );

    Ok(DataResponse::new(AnalyzeResponse {
        stats: BuildingStats::from(snapshot.as_ref()),
        analysis,
        outcome,
    }))
}
