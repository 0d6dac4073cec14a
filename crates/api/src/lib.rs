//! Engine Fault Detection API Server
//!
//! REST API for rule-ensemble fault analysis, model configuration and
//! detection statistics.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use data_validator::Validator;
use fault_classifier::{ClassifierError, FaultDetectionService, ModelConfig};
use ring_buffer::now_ms;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod error;
pub mod routes;
pub mod settings;

pub use error::ApiError;
pub use settings::Settings;

use storage::Repository;

/// State shared by every handler
pub type SharedState = Arc<RwLock<AppState>>;

/// Application state shared across handlers
pub struct AppState {
    /// Active classifier, replaced wholesale on model update
    pub service: Arc<FaultDetectionService>,
    /// Detection history
    pub repository: Arc<Repository>,
    /// Reading validator
    pub validator: Validator,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create application state with default model and retention
    pub fn new() -> Self {
        Self::with_parts(FaultDetectionService::default(), Repository::new())
    }

    /// Create application state from loaded settings
    pub fn from_settings(settings: &Settings) -> Result<Self, ClassifierError> {
        let service = FaultDetectionService::new(settings.model_config())?;
        let repository = Repository::with_max_records(settings.storage.max_records);
        Ok(Self::with_parts(service, repository))
    }

    fn with_parts(service: FaultDetectionService, repository: Repository) -> Self {
        let validator = Validator::new(service.ranges().clone());
        Self {
            service: Arc::new(service),
            repository: Arc::new(repository),
            validator,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }

    /// Handle to the active classifier
    pub fn classifier(&self) -> Arc<FaultDetectionService> {
        Arc::clone(&self.service)
    }

    /// Handle to the detection history
    pub fn repository(&self) -> Arc<Repository> {
        Arc::clone(&self.repository)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Health response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp_ms: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub model: ModelConfig,
    pub detection_count: usize,
}

/// Create the application router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route(
            "/api/ai/analyze",
            post(routes::analyze::analyze).get(routes::analyze::get_detections),
        )
        .route("/api/ai/batch-analyze", post(routes::analyze::batch_analyze))
        .route(
            "/api/ai/model",
            get(routes::model::get_model).put(routes::model::update_model),
        )
        .route("/api/ai/statistics", get(routes::statistics::get_statistics))
        .route("/api/sensors/validate", post(routes::sensors::validate))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    let state = state.read().await;

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp_ms: now_ms(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        model: *state.service.model(),
        detection_count: state.repository.detection_count(),
    })
}

/// Initialize logging. `RUST_LOG` takes precedence over `default_level`.
pub fn init_logging(
    default_level: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    }
}

/// Run the server until it fails
pub async fn run_server(settings: &Settings) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let state = Arc::new(RwLock::new(AppState::from_settings(settings)?));
    let app = create_router(state);

    info!("Starting API server on {}", settings.server.addr);

    let listener = tokio::net::TcpListener::bind(&settings.server.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn shared() -> SharedState {
        Arc::new(RwLock::new(AppState::new()))
    }

    async fn send(
        state: &SharedState,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = create_router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn critical() -> Value {
        json!({
            "engineTemp": 115.0,
            "oilPressure": 0.8,
            "batteryVoltage": 10.5,
            "engineVibration": 35.0,
            "engineRPM": 2000.0
        })
    }

    fn normal() -> Value {
        json!({
            "engineTemp": 85.0,
            "oilPressure": 4.0,
            "batteryVoltage": 12.6,
            "engineVibration": 12.0,
            "rpm": 1800.0
        })
    }

    #[tokio::test]
    async fn test_health() {
        let state = shared();
        let (status, body) = send(&state, Method::GET, "/api/v1/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["model"]["parameters"]["nEstimators"], 100);
        assert_eq!(body["detectionCount"], 0);
    }

    #[tokio::test]
    async fn test_analyze_persists_results() {
        let state = shared();
        let (status, body) = send(
            &state,
            Method::POST,
            "/api/ai/analyze",
            Some(json!({ "currentData": critical() })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|r| r["status"] == "critical"));

        let (status, body) = send(&state, Method::GET, "/api/ai/analyze?limit=2", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        assert_eq!(body["results"][0]["parameter"], "engine_vibration");
        assert_eq!(body["results"][0]["id"], 4);

        let (_, body) = send(
            &state,
            Method::GET,
            "/api/ai/analyze?parameter=oil_pressure",
            None,
        )
        .await;
        assert_eq!(body["count"], 1);
    }

    #[tokio::test]
    async fn test_analyze_rejects_missing_field() {
        let state = shared();
        let (status, body) = send(
            &state,
            Method::POST,
            "/api/ai/analyze",
            Some(json!({ "currentData": { "engineTemp": 90.0 } })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
        assert_eq!(state.read().await.repository.detection_count(), 0);
    }

    #[tokio::test]
    async fn test_batch_analyze() {
        let state = shared();
        let (status, body) = send(
            &state,
            Method::POST,
            "/api/ai/batch-analyze",
            Some(json!({ "dataPoints": [critical(), normal()] })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalDataPoints"], 2);
        assert_eq!(body["totalDetections"], 8);
        assert_eq!(body["statistics"]["criticalFaults"], 4);
        assert_eq!(body["batchResults"].as_array().unwrap().len(), 2);
        // Not saved unless requested
        assert_eq!(state.read().await.repository.detection_count(), 0);

        let (status, _) = send(
            &state,
            Method::POST,
            "/api/ai/batch-analyze",
            Some(json!({ "dataPoints": [normal()], "saveResults": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state.read().await.repository.detection_count(), 4);
    }

    #[tokio::test]
    async fn test_batch_rejects_empty() {
        let state = shared();
        let (status, body) = send(
            &state,
            Method::POST,
            "/api/ai/batch-analyze",
            Some(json!({ "dataPoints": [] })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Data points array is required and must not be empty"
        );
    }

    #[tokio::test]
    async fn test_model_update() {
        let state = shared();
        let update = json!({
            "model": {
                "type": "RandomForest",
                "parameters": { "nEstimators": 8, "maxDepth": 5, "threshold": 0.5 }
            }
        });

        let (status, body) = send(&state, Method::PUT, "/api/ai/model", Some(update)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["model"]["parameters"]["nEstimators"], 8);

        let (_, body) = send(&state, Method::GET, "/api/ai/model", None).await;
        assert_eq!(body["model"]["parameters"]["nEstimators"], 8);
        assert_eq!(state.read().await.service.ensemble().len(), 8);
    }

    #[tokio::test]
    async fn test_model_update_rejects_invalid() {
        let state = shared();
        let invalid = json!({
            "model": {
                "type": "RandomForest",
                "parameters": { "nEstimators": 0, "maxDepth": 5, "threshold": 0.5 }
            }
        });

        let (status, body) = send(&state, Method::PUT, "/api/ai/model", Some(invalid)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "nEstimators must be a number between 1 and 1000, got 0"
        );

        let unsupported = json!({
            "model": {
                "type": "GradientBoosting",
                "parameters": { "nEstimators": 10, "maxDepth": 5, "threshold": 0.5 }
            }
        });
        let (status, _) = send(&state, Method::PUT, "/api/ai/model", Some(unsupported)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(state.read().await.service.ensemble().len(), 100);
    }

    #[tokio::test]
    async fn test_statistics() {
        let state = shared();
        send(
            &state,
            Method::POST,
            "/api/ai/analyze",
            Some(json!({ "currentData": critical() })),
        )
        .await;

        let (status, body) = send(&state, Method::GET, "/api/ai/statistics", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalRecords"], 4);
        assert_eq!(body["statistics"]["criticalFaults"], 4);
        assert_eq!(body["parameterTrends"]["engine_temp"]["trend"], "increasing");
        assert_eq!(body["dateRange"]["days"], 7);
        assert_eq!(body["dailyStats"].as_array().unwrap().len(), 7);
        assert_eq!(body["dailyStats"][6]["totalFaults"], 4);
        assert_eq!(body["dailyStats"][0]["totalFaults"], 0);
        assert_eq!(body["trendDirection"], "increasing");

        let (_, body) = send(&state, Method::GET, "/api/ai/statistics?days=2", None).await;
        assert_eq!(body["trendDirection"], "insufficient_data");
        assert_eq!(body["averageFaultsPerDay"], 2.0);

        let (status, _) = send(&state, Method::GET, "/api/ai/statistics?days=400", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = send(
            &state,
            Method::GET,
            "/api/ai/statistics?status=normal",
            None,
        )
        .await;
        assert_eq!(body["totalRecords"], 0);

        let (status, _) = send(&state, Method::GET, "/api/ai/statistics?status=bogus", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_validate_reading() {
        let state = shared();
        let (status, body) = send(
            &state,
            Method::POST,
            "/api/sensors/validate",
            Some(json!({
                "engineTemp": 200.0,
                "oilPressure": 4.0,
                "batteryVoltage": 12.6,
                "engineVibration": 12.0,
                "rpm": 1800.0
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isValid"], false);
        assert!(body["summary"]["errors"].as_u64().unwrap() >= 1);

        let (_, body) = send(&state, Method::POST, "/api/sensors/validate", Some(normal())).await;
        assert_eq!(body["isValid"], true);
    }
}
