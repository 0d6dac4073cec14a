//! Analysis Routes

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use fault_classifier::{DetectionResult, FaultStatistics};
use ring_buffer::{now_ms, SensorReading};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{ApiError, SharedState};
use storage::DetectionRecord;

/// Upper bound on readings accepted in one batch
pub const MAX_BATCH_SIZE: usize = 10_000;

/// Request body for single analysis
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub current_data: SensorReading,
    /// Earlier readings, oldest first
    #[serde(default)]
    pub historical_data: Vec<SensorReading>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub success: bool,
    pub results: Vec<DetectionResult>,
    pub timestamp_ms: u64,
}

/// Analyze one reading and persist every result
pub async fn analyze(
    State(state): State<SharedState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Json(request) = payload?;
    let (service, repository) = {
        let state = state.read().await;
        (state.classifier(), state.repository())
    };

    let results = service.analyze(&request.current_data, &request.historical_data);
    repository.insert_results(&results)?;

    Ok(Json(AnalyzeResponse {
        success: true,
        results,
        timestamp_ms: now_ms(),
    }))
}

/// Query parameters for stored detections
#[derive(Debug, Deserialize)]
pub struct DetectionQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Filter by parameter name
    pub parameter: Option<String>,
}

fn default_limit() -> usize {
    50
}

#[derive(Debug, Serialize)]
pub struct DetectionResponse {
    pub success: bool,
    pub results: Vec<DetectionRecord>,
    pub count: usize,
}

/// Get stored detections, newest first
pub async fn get_detections(
    State(state): State<SharedState>,
    query: Result<Query<DetectionQuery>, QueryRejection>,
) -> Result<Json<DetectionResponse>, ApiError> {
    let Query(params) = query?;
    let repository = state.read().await.repository();
    let limit = params.limit.min(500);

    let results = repository.get_detections(params.parameter.as_deref(), None, limit)?;

    Ok(Json(DetectionResponse {
        success: true,
        count: results.len(),
        results,
    }))
}

/// Request body for batch analysis
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    /// Readings in time order
    pub data_points: Vec<SensorReading>,
    #[serde(default)]
    pub save_results: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    pub success: bool,
    pub batch_results: Vec<Vec<DetectionResult>>,
    pub statistics: FaultStatistics,
    pub total_data_points: usize,
    pub total_detections: usize,
    pub timestamp_ms: u64,
}

/// Analyze a time-ordered sequence of readings
pub async fn batch_analyze(
    State(state): State<SharedState>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<BatchResponse>, ApiError> {
    let Json(request) = payload?;

    if request.data_points.is_empty() {
        return Err(ApiError::BadRequest(
            "Data points array is required and must not be empty".into(),
        ));
    }
    if request.data_points.len() > MAX_BATCH_SIZE {
        return Err(ApiError::BadRequest(format!(
            "At most {MAX_BATCH_SIZE} data points per batch, got {}",
            request.data_points.len()
        )));
    }

    let (service, repository) = {
        let state = state.read().await;
        (state.classifier(), state.repository())
    };

    let batch_results = service.batch_analyze(&request.data_points);
    let all: Vec<DetectionResult> = batch_results.iter().flatten().cloned().collect();

    if request.save_results {
        repository.insert_results(&all)?;
        debug!("Saved {} batch detections", all.len());
    }

    let statistics = service.fault_statistics(&all);
    info!(
        "Batch of {} readings: {} critical, {} warning",
        request.data_points.len(),
        statistics.critical_faults,
        statistics.warning_faults
    );

    Ok(Json(BatchResponse {
        success: true,
        total_data_points: request.data_points.len(),
        total_detections: all.len(),
        batch_results,
        statistics,
        timestamp_ms: now_ms(),
    }))
}
