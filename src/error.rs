use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{MetricType, ProfileField};

// ---------------------------------------------------------------------------
// InvalidProfileError
// ---------------------------------------------------------------------------

/// A profile cannot feed the requested calculator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidProfileError {
    #[error("Required profile field missing: {0}")]
    MissingField(ProfileField),

    #[error("Profile field {field} out of range: {value} (expected {min}..={max})")]
    OutOfRange {
        field: ProfileField,
        value: f64,
        min: f64,
        max: f64,
    },
}

impl InvalidProfileError {
    /// The field the caller has to supply or correct.
    pub fn field(&self) -> ProfileField {
        match self {
            Self::MissingField(field) => *field,
            Self::OutOfRange { field, .. } => *field,
        }
    }
}

// ---------------------------------------------------------------------------
// InvalidSeriesError
// ---------------------------------------------------------------------------

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidSeriesError {
    #[error("Series is empty")]
    Empty,

    #[error("Timestamps out of order at index {index}: {timestamp}")]
    NotAscending {
        index: usize,
        timestamp: NaiveDateTime,
    },

    #[error("Duplicate timestamp at index {index}: {timestamp}")]
    DuplicateTimestamp {
        index: usize,
        timestamp: NaiveDateTime,
    },

    #[error("Non-finite value at index {0}")]
    NonFiniteValue(usize),

    #[error("Unknown metric type: {0}")]
    UnknownMetricType(String),

    #[error("Date labels ({labels}) do not match series length ({points})")]
    LabelCountMismatch { labels: usize, points: usize },
}

// ---------------------------------------------------------------------------
// AnalyticsError
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Invalid profile: {0}")]
    Profile(#[from] InvalidProfileError),

    #[error("Invalid series: {0}")]
    Series(#[from] InvalidSeriesError),

    #[error("No scorable metrics supplied")]
    NoScorableMetrics,

    #[error("Non-finite value supplied for {0}")]
    NonFiniteMetric(MetricType),

    #[error("Reference data load failed ({0}): {1}")]
    ReferenceDataLoad(String, String),

    #[error("Reference data parse failed ({0}): {1}")]
    ReferenceDataParse(String, String),

    #[error("Reference data invalid: {0}")]
    ReferenceDataInvalid(String),

    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

// ---------------------------------------------------------------------------
// InsufficientDataWarning
// ---------------------------------------------------------------------------

/// Low-confidence marker carried on a result. Never raised as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InsufficientDataWarning {
    /// Age lies outside the range the formula was validated on.
    AgeOutsideValidatedRange { age: u32, min: u32, max: u32 },
    /// An absent flag was read as its safe default.
    AssumedDefault { field: ProfileField, value: bool },
    /// Z-score pass not run (too few points or zero variance).
    ZScoreSkipped { points: usize, min_points: usize, zero_variance: bool },
    /// IQR pass not run.
    IqrSkipped { points: usize, min_points: usize },
    /// Series shorter than the smoothing window; the window shrank.
    ShortSeries { points: usize, window: usize },
    /// Score computed over a subset of the categories.
    MissingCategories { missing: Vec<String> },
}
