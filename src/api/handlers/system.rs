use axum::{extract::State, Json};

use crate::api::{state::AppState, types::*};

/// GET /health -- liveness probe with a summary of the loaded model
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let network = state.classifier.network();
    let classes = match network.metadata.get("classes").and_then(|v| v.as_array()) {
        Some(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        None => crate::domain::IrisClass::labels()
            .into_iter()
            .map(str::to_string)
            .collect(),
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs: state.uptime_seconds(),
        model: ModelInfo {
            input_dim: network.input_dim,
            classes,
            trained_at: network
                .metadata
                .get("trained_at")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            test_accuracy: network
                .metadata
                .get("test_accuracy")
                .and_then(|v| v.as_f64()),
        },
    })
}
