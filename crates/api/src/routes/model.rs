//! Model Configuration Routes

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use fault_classifier::ModelConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::{ApiError, SharedState};

#[derive(Debug, Serialize)]
pub struct ModelResponse {
    pub success: bool,
    pub model: ModelConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateModelRequest {
    pub model: ModelConfig,
}

/// Get the active model configuration
pub async fn get_model(State(state): State<SharedState>) -> Json<ModelResponse> {
    let service = state.read().await.classifier();

    Json(ModelResponse {
        success: true,
        model: *service.model(),
        message: None,
    })
}

/// Replace the model, rebuilding the classifier
pub async fn update_model(
    State(state): State<SharedState>,
    payload: Result<Json<UpdateModelRequest>, JsonRejection>,
) -> Result<Json<ModelResponse>, ApiError> {
    let Json(request) = payload?;
    let current = state.read().await.classifier();

    let rebuilt = current.reconfigured(request.model).map_err(|e| {
        warn!("Rejected model update: {}", e);
        e
    })?;

    state.write().await.service = Arc::new(rebuilt);
    info!(
        "Model updated: {} estimators",
        request.model.parameters.n_estimators
    );

    Ok(Json(ModelResponse {
        success: true,
        model: request.model,
        message: Some("Model updated successfully".into()),
    }))
}
