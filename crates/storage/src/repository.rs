//! Repository Implementation

use crate::StorageError;
use fault_classifier::{DetectionResult, DetectionStatus};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// Default retention cap
pub const DEFAULT_MAX_RECORDS: usize = 10_000;

/// Stored detection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionRecord {
    /// Assigned on insert; ignored on the way in
    pub id: i64,
    pub timestamp_ms: u64,
    pub parameter: String,
    pub confidence: f64,
    pub status: DetectionStatus,
    pub recommendation: String,
}

impl DetectionRecord {
    /// Unsaved record for a classifier result
    pub fn from_result(result: &DetectionResult) -> Self {
        Self {
            id: 0,
            timestamp_ms: result.timestamp_ms,
            parameter: result.parameter.clone(),
            confidence: result.confidence,
            status: result.status,
            recommendation: result.recommendation.clone(),
        }
    }

    pub fn into_result(self) -> DetectionResult {
        DetectionResult {
            parameter: self.parameter,
            confidence: self.confidence,
            status: self.status,
            recommendation: self.recommendation,
            timestamp_ms: self.timestamp_ms,
        }
    }
}

#[derive(Debug)]
struct Detections {
    records: VecDeque<DetectionRecord>,
    next_id: i64,
}

/// Repository for detection history (in-memory)
#[derive(Debug)]
pub struct Repository {
    detections: Mutex<Detections>,
    /// Oldest records are evicted past this count
    max_records: usize,
}

impl Repository {
    /// Create a repository with the default retention
    pub fn new() -> Self {
        Self::with_max_records(DEFAULT_MAX_RECORDS)
    }

    /// Create a repository keeping at most `max_records` detections
    pub fn with_max_records(max_records: usize) -> Self {
        let max_records = max_records.max(1);
        info!("Creating in-memory repository (retention {})", max_records);
        Self {
            detections: Mutex::new(Detections {
                records: VecDeque::with_capacity(max_records.min(1024)),
                next_id: 1,
            }),
            max_records,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Detections>, StorageError> {
        self.detections
            .lock()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))
    }

    /// Insert a detection, returning its assigned ID
    pub fn insert_detection(&self, mut record: DetectionRecord) -> Result<i64, StorageError> {
        let mut detections = self.lock()?;

        record.id = detections.next_id;
        detections.next_id += 1;

        // Enforce retention
        while detections.records.len() >= self.max_records {
            detections.records.pop_front();
        }

        let id = record.id;
        detections.records.push_back(record);
        debug!("Inserted detection with ID {}", id);

        Ok(id)
    }

    /// Insert every result of one analysis, returning the assigned IDs
    pub fn insert_results(&self, results: &[DetectionResult]) -> Result<Vec<i64>, StorageError> {
        results
            .iter()
            .map(|r| self.insert_detection(DetectionRecord::from_result(r)))
            .collect()
    }

    /// Look up one detection by ID
    pub fn get_detection(&self, id: i64) -> Result<DetectionRecord, StorageError> {
        let detections = self.lock()?;
        detections
            .records
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    /// Get detections with optional filters, newest first
    pub fn get_detections(
        &self,
        parameter: Option<&str>,
        status: Option<DetectionStatus>,
        limit: usize,
    ) -> Result<Vec<DetectionRecord>, StorageError> {
        let detections = self.lock()?;

        Ok(detections
            .records
            .iter()
            .rev()
            .filter(|r| parameter.map_or(true, |p| r.parameter == p))
            .filter(|r| status.map_or(true, |s| r.status == s))
            .take(limit)
            .cloned()
            .collect())
    }

    /// Get detections at or after a timestamp, oldest first
    pub fn get_detections_since(&self, since_ms: u64) -> Result<Vec<DetectionRecord>, StorageError> {
        let detections = self.lock()?;

        Ok(detections
            .records
            .iter()
            .filter(|r| r.timestamp_ms >= since_ms)
            .cloned()
            .collect())
    }

    /// Number of retained detections
    pub fn detection_count(&self) -> usize {
        self.lock().map(|d| d.records.len()).unwrap_or(0)
    }

    /// Clear all data (IDs keep increasing)
    pub fn clear(&self) {
        if let Ok(mut detections) = self.lock() {
            detections.records.clear();
        }
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}
