use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::app::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub building: String,
    /// False means every analysis returns the fallback result
    pub ai_configured: bool,
    pub analysis_in_flight: bool,
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        building: state.store.snapshot().name.clone(),
        ai_configured: state.ai_client.is_configured(),
        analysis_in_flight: state.analysis_gate.is_busy(),
    })
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};

    use crate::routes::test_support::{body_json, send, test_app, test_state};

    #[tokio::test]
    async fn health_reports_building_and_model_status() {
        let app = test_app(test_state(3, 2));
        let response = send(app, Method::GET, "/health", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("x-request-id").is_some());

        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["building"], "Tower");
        assert_eq!(json["aiConfigured"], true);
        assert_eq!(json["analysisInFlight"], false);
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let app = test_app(test_state(3, 2));
        let response = send(app, Method::GET, "/nope", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
