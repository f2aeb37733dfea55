use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::InsufficientDataWarning;
use crate::models::{DetectionMethod, Deviation, MetricType, Severity, TrendDirection, TrendStrength};

/// One projected future value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub recorded_at: NaiveDateTime,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub metric: MetricType,
    pub direction: TrendDirection,
    pub strength: TrendStrength,
    /// Regression slope in metric units per point.
    pub slope: f64,
    /// Slope as a percentage of the regression window mean.
    pub normalized_slope: f64,
    /// Percent change between the means of the first and last thirds.
    pub change_rate: f64,
    /// Aligned with the input series.
    pub moving_average: Vec<f64>,
    pub forecast: Vec<ForecastPoint>,
    pub summary: String,
    pub warnings: Vec<InsufficientDataWarning>,
}

/// Outcome of comparing one value against the medical threshold table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MedicalFinding {
    pub severity: Severity,
    pub direction: Deviation,
    /// The threshold that was crossed.
    pub threshold: f64,
}

/// One flagged point, merged across every pass that flagged it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRecord {
    pub index: usize,
    pub date: String,
    pub value: f64,
    /// Worst severity across the passes.
    pub severity: Severity,
    pub direction: Deviation,
    pub methods: Vec<DetectionMethod>,
    /// Smoothed value at this point.
    pub baseline: f64,
    pub message: String,
}

/// Medical status of the most recent reading when it is not normal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestStatus {
    pub recorded_at: NaiveDateTime,
    pub value: f64,
    pub finding: MedicalFinding,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub metric: MetricType,
    pub has_anomaly: bool,
    pub count: usize,
    pub anomalies: Vec<AnomalyRecord>,
    pub latest_status: Option<LatestStatus>,
    pub summary: String,
    pub warnings: Vec<InsufficientDataWarning>,
}

impl AnomalyReport {
    pub fn critical_count(&self) -> usize {
        self.anomalies
            .iter()
            .filter(|a| a.severity == Severity::Critical)
            .count()
    }
}
