//! Stage taxonomy endpoint

use axum::response::IntoResponse;

use crate::api::DataResponse;
use crate::domain::stage_catalog;

/// GET /stages
///
/// Every construction stage in build order, with progress and chart colour.
pub async fn list_stages() -> impl IntoResponse {
    DataResponse::new(stage_catalog())
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};

    use crate::routes::test_support::{body_json, send, test_app, test_state};

    #[tokio::test]
    async fn lists_stages_in_build_order() {
        let app = test_app(test_state(2, 2));
        let response = send(app, Method::GET, "/stages", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let stages = json["data"].as_array().unwrap();
        assert_eq!(stages.len(), 17);
        assert_eq!(stages[0]["stage"], "Not Started");
        assert_eq!(stages[0]["progress"], 0);
        assert_eq!(stages[16]["stage"], "Handover Ready");
        assert_eq!(stages[16]["progress"], 100);
        assert_eq!(stages[16]["color"], "#22c55e");
    }
}
