//! Time-series analytics: smoothing, regression, forecasting and anomaly
//! detection over one `MetricSeries` at a time.

mod analyzer;
mod anomaly;
pub mod stats;
mod types;

pub use analyzer::{analyze_trend, change_rate};
pub(crate) use analyzer::classify_values;
pub use anomaly::{classify_medical, detect_anomalies};
pub use stats::SeriesStatistics;
pub use types::*;
