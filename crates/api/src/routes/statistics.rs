//! Statistics Routes

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use chrono::DateTime;
use fault_classifier::{round_confidence, Channel, DetectionResult, DetectionStatus, FaultStatistics};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{ApiError, SharedState};
use storage::DetectionRecord;

const DAY_MS: u64 = 24 * 60 * 60 * 1000;

/// Longest window the statistics route accepts
pub const MAX_DAYS: u64 = 365;

/// Query parameters for statistics endpoint
#[derive(Debug, Deserialize)]
pub struct StatisticsQuery {
    /// Maximum number of stored detections considered
    #[serde(default = "default_limit")]
    pub limit: usize,
    pub parameter: Option<String>,
    /// `normal`, `warning` or `critical`
    pub status: Option<String>,
    /// Window length in days
    #[serde(default = "default_days")]
    pub days: u64,
}

fn default_limit() -> usize {
    100
}

fn default_days() -> u64 {
    7
}

/// Direction of a fault rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
    /// Fewer than three days to compare
    InsufficientData,
}

impl Trend {
    /// Above 1.2x the baseline is increasing, below 0.8x decreasing
    fn compare(recent: f64, baseline: f64) -> Self {
        if recent > baseline * 1.2 {
            Trend::Increasing
        } else if recent < baseline * 0.8 {
            Trend::Decreasing
        } else {
            Trend::Stable
        }
    }
}

/// Fault trend of one parameter over the last two days
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterTrend {
    pub trend: Trend,
    /// Mean confidence, two decimals
    pub confidence: f64,
    /// Faults in the last 24 hours
    pub recent_faults: usize,
    pub total_detections: usize,
    pub critical_count: usize,
    pub warning_count: usize,
}

/// Aggregate of one day in the window
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    /// UTC date of the day's start, `YYYY-MM-DD`
    pub date: String,
    pub start_ms: u64,
    #[serde(flatten)]
    pub statistics: FaultStatistics,
}

/// Per-day breakdown of the window, oldest day first
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeStats {
    pub daily_stats: Vec<DailyStats>,
    pub average_faults_per_day: f64,
    /// Mean faults of the last three days against the first three
    pub trend_direction: Trend,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_ms: u64,
    pub end_ms: u64,
    pub days: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsResponse {
    pub success: bool,
    pub statistics: FaultStatistics,
    pub parameter_trends: BTreeMap<String, ParameterTrend>,
    #[serde(flatten)]
    pub time: TimeStats,
    pub date_range: DateRange,
    pub total_records: usize,
}

/// Aggregate stored detections within the requested window
pub async fn get_statistics(
    State(state): State<SharedState>,
    query: Result<Query<StatisticsQuery>, QueryRejection>,
) -> Result<Json<StatisticsResponse>, ApiError> {
    let Query(params) = query?;

    let status = params
        .status
        .as_deref()
        .map(|s| {
            DetectionStatus::parse(s)
                .ok_or_else(|| ApiError::BadRequest(format!("Unknown status: {s}")))
        })
        .transpose()?;

    if params.days > MAX_DAYS {
        return Err(ApiError::BadRequest(format!(
            "At most {MAX_DAYS} days, got {}",
            params.days
        )));
    }

    let end_ms = ring_buffer::now_ms();
    let start_ms = end_ms.saturating_sub(params.days.saturating_mul(DAY_MS));

    let repository = state.read().await.repository();
    let results: Vec<DetectionResult> = repository
        .get_detections(params.parameter.as_deref(), status, params.limit.min(10_000))?
        .into_iter()
        .filter(|r| r.timestamp_ms >= start_ms && r.timestamp_ms <= end_ms)
        .map(DetectionRecord::into_result)
        .collect();

    Ok(Json(StatisticsResponse {
        success: true,
        statistics: FaultStatistics::from_results(&results),
        parameter_trends: parameter_trends(&results, end_ms),
        time: time_based_stats(&results, params.days, end_ms),
        date_range: DateRange {
            start_ms,
            end_ms,
            days: params.days,
        },
        total_records: results.len(),
    }))
}

/// Compare each parameter's faults in the last day against the day before
pub fn parameter_trends(results: &[DetectionResult], now_ms: u64) -> BTreeMap<String, ParameterTrend> {
    let last_day = now_ms.saturating_sub(DAY_MS);
    let day_before = now_ms.saturating_sub(2 * DAY_MS);

    Channel::CLASSIFIED
        .iter()
        .map(|channel| {
            let own: Vec<&DetectionResult> = results
                .iter()
                .filter(|r| r.parameter == channel.as_str())
                .collect();

            let faults_between = |from: u64, to: u64| {
                own.iter()
                    .filter(|r| r.status.is_fault() && r.timestamp_ms > from && r.timestamp_ms <= to)
                    .count()
            };
            let recent = faults_between(last_day, now_ms);
            let previous = faults_between(day_before, last_day);

            let trend = Trend::compare(recent as f64, previous as f64);

            let count = |status: DetectionStatus| own.iter().filter(|r| r.status == status).count();
            let confidence = match own.len() {
                0 => 0.0,
                n => round_confidence(own.iter().map(|r| r.confidence).sum::<f64>() / n as f64),
            };

            let trend = ParameterTrend {
                trend,
                confidence,
                recent_faults: recent,
                total_detections: own.len(),
                critical_count: count(DetectionStatus::Critical),
                warning_count: count(DetectionStatus::Warning),
            };
            (channel.as_str().to_string(), trend)
        })
        .collect()
}

/// Split results into `days` day-long buckets ending at `now_ms`
///
/// Bucket `i` (counting back from now) holds results aged
/// `[i * day, (i + 1) * day)`, so a result stamped exactly `now_ms` lands in
/// the newest day. Results from the future or older than the window are
/// skipped.
pub fn time_based_stats(results: &[DetectionResult], days: u64, now_ms: u64) -> TimeStats {
    let len = days as usize;
    let mut buckets: Vec<Vec<DetectionResult>> = vec![Vec::new(); len];

    for result in results {
        let Some(age) = now_ms.checked_sub(result.timestamp_ms) else {
            continue;
        };
        let back = (age / DAY_MS) as usize;
        if back < len {
            buckets[len - 1 - back].push(result.clone());
        }
    }

    let daily_stats: Vec<DailyStats> = buckets
        .iter()
        .enumerate()
        .map(|(index, day)| {
            let start_ms = now_ms.saturating_sub((days - index as u64) * DAY_MS);
            DailyStats {
                date: utc_date(start_ms),
                start_ms,
                statistics: FaultStatistics::from_results(day),
            }
        })
        .collect();

    let total_faults: usize = daily_stats.iter().map(|d| d.statistics.total_faults).sum();
    let average_faults_per_day = match days {
        0 => 0.0,
        n => total_faults as f64 / n as f64,
    };

    TimeStats {
        trend_direction: trend_direction(&daily_stats),
        daily_stats,
        average_faults_per_day,
    }
}

fn trend_direction(daily: &[DailyStats]) -> Trend {
    if daily.len() < 3 {
        return Trend::InsufficientData;
    }
    let mean = |days: &[DailyStats]| {
        days.iter().map(|d| d.statistics.total_faults).sum::<usize>() as f64 / days.len() as f64
    };
    Trend::compare(mean(&daily[daily.len() - 3..]), mean(&daily[..3]))
}

fn utc_date(ms: u64) -> String {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
