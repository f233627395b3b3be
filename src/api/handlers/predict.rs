use axum::{extract::State, http::StatusCode, Json};
use tracing::{debug, error};

use crate::api::state::AppState;
use crate::domain::{IrisClass, IrisFeatures};

/// POST /predict-iris
///
/// Body is a JSON array of feature records; the response holds one label
/// per record in the same order. Records missing a field never reach this
/// handler: the `Json` extractor rejects the whole batch.
pub async fn predict_iris(
    State(state): State<AppState>,
    Json(records): Json<Vec<IrisFeatures>>,
) -> std::result::Result<Json<Vec<IrisClass>>, (StatusCode, String)> {
    let classes = state.classifier.predict(&records).map_err(|e| {
        error!("Prediction failed for batch of {}: {}", records.len(), e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    debug!("Predicted {} records", classes.len());
    Ok(Json(classes))
}
