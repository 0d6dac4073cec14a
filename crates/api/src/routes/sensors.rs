//! Sensor Routes

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use data_validator::ValidationReport;
use ring_buffer::SensorReading;

use crate::{ApiError, SharedState};

/// Validate a reading against the configured sensor ranges
pub async fn validate(
    State(state): State<SharedState>,
    payload: Result<Json<SensorReading>, JsonRejection>,
) -> Result<Json<ValidationReport>, ApiError> {
    let Json(reading) = payload?;
    let state = state.read().await;

    Ok(Json(state.validator.validate_reading(&reading)))
}
