use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::InvalidSeriesError;

/// Type of health metric carried by a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MetricType {
    #[serde(rename = "heart_rate")]
    HeartRate,
    #[serde(rename = "blood_pressure_sys")]
    SystolicBp,
    #[serde(rename = "blood_pressure_dia")]
    DiastolicBp,
    #[serde(rename = "blood_sugar")]
    BloodSugar,
    #[serde(rename = "sleep_duration")]
    SleepDuration,
    #[serde(rename = "steps")]
    Steps,
    #[serde(rename = "spo2")]
    Spo2,
    #[serde(rename = "bmi")]
    Bmi,
    #[serde(rename = "weight")]
    Weight,
}

impl MetricType {
    pub const ALL: [MetricType; 9] = [
        MetricType::HeartRate,
        MetricType::SystolicBp,
        MetricType::DiastolicBp,
        MetricType::BloodSugar,
        MetricType::SleepDuration,
        MetricType::Steps,
        MetricType::Spo2,
        MetricType::Bmi,
        MetricType::Weight,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MetricType::HeartRate => "heart_rate",
            MetricType::SystolicBp => "blood_pressure_sys",
            MetricType::DiastolicBp => "blood_pressure_dia",
            MetricType::BloodSugar => "blood_sugar",
            MetricType::SleepDuration => "sleep_duration",
            MetricType::Steps => "steps",
            MetricType::Spo2 => "spo2",
            MetricType::Bmi => "bmi",
            MetricType::Weight => "weight",
        }
    }

    /// Parse a metric-type tag. Unknown tags are a series error.
    pub fn parse_tag(tag: &str) -> Result<Self, InvalidSeriesError> {
        MetricType::ALL
            .into_iter()
            .find(|m| m.as_str() == tag)
            .ok_or_else(|| InvalidSeriesError::UnknownMetricType(tag.to_string()))
    }

    /// Default unit for this metric type.
    pub fn default_unit(self) -> &'static str {
        match self {
            MetricType::HeartRate => "bpm",
            MetricType::SystolicBp | MetricType::DiastolicBp => "mmHg",
            MetricType::BloodSugar => "mmol/L",
            MetricType::SleepDuration => "h",
            MetricType::Steps => "steps",
            MetricType::Spo2 => "%",
            MetricType::Bmi => "kg/m2",
            MetricType::Weight => "kg",
        }
    }
}

impl std::fmt::Display for MetricType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MetricType {
    type Err = InvalidSeriesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_tag(s)
    }
}

/// A single timestamped measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub recorded_at: NaiveDateTime,
    pub value: f64,
}

impl MetricPoint {
    pub fn new(recorded_at: NaiveDateTime, value: f64) -> Self {
        Self { recorded_at, value }
    }
}

/// Time-ordered measurements of one metric.
///
/// Invariant: timestamps strictly ascending, values finite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSeries {
    points: Vec<MetricPoint>,
}

impl MetricSeries {
    /// Validate ordering and values. An empty series is allowed here; the
    /// analyzers reject it when they need at least one point.
    pub fn new(points: Vec<MetricPoint>) -> Result<Self, InvalidSeriesError> {
        for (index, point) in points.iter().enumerate() {
            if !point.value.is_finite() {
                return Err(InvalidSeriesError::NonFiniteValue(index));
            }
            if index > 0 {
                let prev = points[index - 1].recorded_at;
                if point.recorded_at == prev {
                    return Err(InvalidSeriesError::DuplicateTimestamp {
                        index,
                        timestamp: point.recorded_at,
                    });
                }
                if point.recorded_at < prev {
                    return Err(InvalidSeriesError::NotAscending {
                        index,
                        timestamp: point.recorded_at,
                    });
                }
            }
        }
        Ok(Self { points })
    }

    /// One point per calendar day starting at `start`, recorded at midnight.
    pub fn from_daily_values(start: NaiveDate, values: &[f64]) -> Result<Self, InvalidSeriesError> {
        let base = start.and_time(NaiveTime::MIN);
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &value)| MetricPoint::new(base + Duration::days(i as i64), value))
            .collect();
        Self::new(points)
    }

    pub fn points(&self) -> &[MetricPoint] {
        &self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn latest(&self) -> Option<&MetricPoint> {
        self.points.last()
    }

    /// `YYYY-MM-DD` label for every point.
    pub fn date_labels(&self) -> Vec<String> {
        self.points
            .iter()
            .map(|p| p.recorded_at.format("%Y-%m-%d").to_string())
            .collect()
    }

    /// Median gap between consecutive points; one day for a single point.
    pub fn typical_interval(&self) -> Duration {
        if self.points.len() < 2 {
            return Duration::days(1);
        }
        let mut gaps: Vec<i64> = self
            .points
            .windows(2)
            .map(|w| (w[1].recorded_at - w[0].recorded_at).num_seconds())
            .collect();
        gaps.sort_unstable();
        Duration::seconds(gaps[gaps.len() / 2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, d)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    #[test]
    fn parse_known_and_unknown_tags() {
        assert_eq!(MetricType::parse_tag("heart_rate").unwrap(), MetricType::HeartRate);
        assert_eq!(
            "blood_pressure_dia".parse::<MetricType>().unwrap(),
            MetricType::DiastolicBp
        );
        assert_eq!(
            MetricType::parse_tag("cholesterol").unwrap_err(),
            InvalidSeriesError::UnknownMetricType("cholesterol".into())
        );
    }

    #[test]
    fn serde_tag_matches_as_str() {
        for metric in MetricType::ALL {
            let json = serde_json::to_string(&metric).unwrap();
            assert_eq!(json, format!("\"{}\"", metric.as_str()));
        }
    }

    #[test]
    fn rejects_out_of_order_points() {
        let err = MetricSeries::new(vec![
            MetricPoint::new(day(2), 70.0),
            MetricPoint::new(day(1), 71.0),
        ])
        .unwrap_err();
        assert!(matches!(err, InvalidSeriesError::NotAscending { index: 1, .. }));
    }

    #[test]
    fn rejects_duplicate_timestamps() {
        let err = MetricSeries::new(vec![
            MetricPoint::new(day(1), 70.0),
            MetricPoint::new(day(1), 71.0),
        ])
        .unwrap_err();
        assert!(matches!(err, InvalidSeriesError::DuplicateTimestamp { index: 1, .. }));
    }

    #[test]
    fn rejects_nan() {
        let err = MetricSeries::new(vec![MetricPoint::new(day(1), f64::NAN)]).unwrap_err();
        assert_eq!(err, InvalidSeriesError::NonFiniteValue(0));
    }

    #[test]
    fn daily_values_and_labels() {
        let start = NaiveDate::from_ymd_opt(2026, 1, 30).unwrap();
        let series = MetricSeries::from_daily_values(start, &[70.0, 72.0, 74.0]).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.date_labels(), vec!["2026-01-30", "2026-01-31", "2026-02-01"]);
        assert_eq!(series.typical_interval(), Duration::days(1));
        assert_eq!(series.latest().unwrap().value, 74.0);
    }

    #[test]
    fn typical_interval_uses_median_gap() {
        let series = MetricSeries::new(vec![
            MetricPoint::new(day(1), 1.0),
            MetricPoint::new(day(3), 1.0),
            MetricPoint::new(day(5), 1.0),
            MetricPoint::new(day(20), 1.0),
        ])
        .unwrap();
        assert_eq!(series.typical_interval(), Duration::days(2));
    }
}
