//! Per-metric medical thresholds, plausibility ranges, scoring curves and
//! the statistical parameters of the trend and anomaly passes.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::models::{MetricType, ProfileField, ScoreCategory};

/// Closed interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Four-level medical table. Absent levels are never triggered.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MedicalThresholds {
    pub critical_low: Option<f64>,
    pub low: Option<f64>,
    pub high: Option<f64>,
    pub critical_high: Option<f64>,
}

impl MedicalThresholds {
    const fn full(critical_low: f64, low: f64, high: f64, critical_high: f64) -> Self {
        Self {
            critical_low: Some(critical_low),
            low: Some(low),
            high: Some(high),
            critical_high: Some(critical_high),
        }
    }

    /// Present levels, low to high. Must be non-decreasing.
    pub fn levels(&self) -> Vec<f64> {
        [self.critical_low, self.low, self.high, self.critical_high]
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Read a map as per-key overrides on top of `base`; keys absent from the
/// document keep their `base` entry.
pub(crate) fn merge_map<'de, D, K, V>(
    deserializer: D,
    mut base: BTreeMap<K, V>,
) -> Result<BTreeMap<K, V>, D::Error>
where
    D: Deserializer<'de>,
    K: Deserialize<'de> + Ord,
    V: Deserialize<'de>,
{
    base.extend(BTreeMap::<K, V>::deserialize(deserializer)?);
    Ok(base)
}

pub(crate) fn merge_medical_thresholds<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<BTreeMap<MetricType, MedicalThresholds>, D::Error> {
    merge_map(d, default_medical_thresholds())
}

pub(crate) fn merge_plausible_ranges<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<BTreeMap<MetricType, ValueRange>, D::Error> {
    merge_map(d, default_plausible_ranges())
}

pub(crate) fn merge_profile_ranges<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<BTreeMap<ProfileField, ValueRange>, D::Error> {
    merge_map(d, default_profile_ranges())
}

fn merge_score_ranges<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<BTreeMap<MetricType, ScoreRange>, D::Error> {
    merge_map(d, default_score_ranges())
}

fn merge_score_weights<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<BTreeMap<ScoreCategory, f64>, D::Error> {
    merge_map(d, default_score_weights())
}

pub fn default_medical_thresholds() -> BTreeMap<MetricType, MedicalThresholds> {
    BTreeMap::from([
        (MetricType::HeartRate, MedicalThresholds::full(40.0, 50.0, 100.0, 120.0)),
        (MetricType::SystolicBp, MedicalThresholds::full(80.0, 90.0, 140.0, 180.0)),
        (MetricType::DiastolicBp, MedicalThresholds::full(50.0, 60.0, 90.0, 120.0)),
        (MetricType::BloodSugar, MedicalThresholds::full(3.0, 3.9, 6.1, 11.1)),
        (
            MetricType::Spo2,
            MedicalThresholds {
                critical_low: Some(90.0),
                low: Some(94.0),
                high: None,
                critical_high: None,
            },
        ),
        (MetricType::SleepDuration, MedicalThresholds::full(4.0, 5.0, 10.0, 12.0)),
        (MetricType::Bmi, MedicalThresholds::full(16.0, 18.5, 28.0, 35.0)),
    ])
}

/// Physiologically plausible values; forecasts are clipped into these.
pub fn default_plausible_ranges() -> BTreeMap<MetricType, ValueRange> {
    BTreeMap::from([
        (MetricType::HeartRate, ValueRange::new(25.0, 220.0)),
        (MetricType::SystolicBp, ValueRange::new(60.0, 260.0)),
        (MetricType::DiastolicBp, ValueRange::new(30.0, 160.0)),
        (MetricType::BloodSugar, ValueRange::new(1.5, 35.0)),
        (MetricType::SleepDuration, ValueRange::new(0.0, 24.0)),
        (MetricType::Steps, ValueRange::new(0.0, 100_000.0)),
        (MetricType::Spo2, ValueRange::new(50.0, 100.0)),
        (MetricType::Bmi, ValueRange::new(10.0, 70.0)),
        (MetricType::Weight, ValueRange::new(2.0, 350.0)),
    ])
}

/// Accepted ranges for numeric profile fields.
pub fn default_profile_ranges() -> BTreeMap<ProfileField, ValueRange> {
    BTreeMap::from([
        (ProfileField::Age, ValueRange::new(0.0, 120.0)),
        (ProfileField::HeightCm, ValueRange::new(50.0, 250.0)),
        (ProfileField::WeightKg, ValueRange::new(2.0, 350.0)),
        (ProfileField::Bmi, ValueRange::new(10.0, 70.0)),
        (ProfileField::WaistCm, ValueRange::new(30.0, 200.0)),
        (ProfileField::SystolicBp, ValueRange::new(60.0, 260.0)),
        (ProfileField::DiastolicBp, ValueRange::new(30.0, 160.0)),
        (ProfileField::TotalCholesterol, ValueRange::new(50.0, 500.0)),
        (ProfileField::HdlCholesterol, ValueRange::new(10.0, 150.0)),
        (ProfileField::LdlCholesterol, ValueRange::new(10.0, 400.0)),
        (ProfileField::Triglycerides, ValueRange::new(20.0, 2000.0)),
        (ProfileField::FastingGlucose, ValueRange::new(1.5, 35.0)),
        (ProfileField::Hba1c, ValueRange::new(3.0, 20.0)),
        (ProfileField::SmokingYears, ValueRange::new(0.0, 100.0)),
        (ProfileField::ExerciseMinutesPerWeek, ValueRange::new(0.0, 5040.0)),
    ])
}

// ---------------------------------------------------------------------------
// Health score
// ---------------------------------------------------------------------------

/// Scoring curve anchors for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub optimal: ValueRange,
    pub normal: ValueRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreTable {
    #[serde(deserialize_with = "merge_score_ranges")]
    pub ranges: BTreeMap<MetricType, ScoreRange>,
    #[serde(deserialize_with = "merge_score_weights")]
    pub weights: BTreeMap<ScoreCategory, f64>,
    /// Score at the edge of the normal range.
    pub normal_edge_score: f64,
    pub excellent_from: u8,
    pub good_from: u8,
    pub fair_from: u8,
}

impl ScoreTable {
    pub fn weight(&self, category: ScoreCategory) -> f64 {
        self.weights.get(&category).copied().unwrap_or(0.0)
    }
}

pub fn default_score_ranges() -> BTreeMap<MetricType, ScoreRange> {
    let range = |o: (f64, f64), n: (f64, f64)| ScoreRange {
        optimal: ValueRange::new(o.0, o.1),
        normal: ValueRange::new(n.0, n.1),
    };
    BTreeMap::from([
        (MetricType::HeartRate, range((60.0, 80.0), (50.0, 100.0))),
        (MetricType::SystolicBp, range((100.0, 120.0), (90.0, 140.0))),
        (MetricType::DiastolicBp, range((60.0, 80.0), (60.0, 90.0))),
        (MetricType::BloodSugar, range((4.0, 5.5), (3.9, 6.1))),
        (MetricType::Spo2, range((97.0, 100.0), (94.0, 100.0))),
        (MetricType::SleepDuration, range((7.0, 8.0), (6.0, 9.0))),
        (MetricType::Steps, range((8000.0, 12000.0), (5000.0, 15000.0))),
        (MetricType::Bmi, range((18.5, 24.0), (18.5, 28.0))),
    ])
}

pub fn default_score_weights() -> BTreeMap<ScoreCategory, f64> {
    BTreeMap::from([
        (ScoreCategory::HeartRate, 0.15),
        (ScoreCategory::BloodPressure, 0.20),
        (ScoreCategory::BloodSugar, 0.15),
        (ScoreCategory::Sleep, 0.15),
        (ScoreCategory::Activity, 0.15),
        (ScoreCategory::Bmi, 0.10),
        (ScoreCategory::Spo2, 0.10),
    ])
}

impl Default for ScoreTable {
    fn default() -> Self {
        Self {
            ranges: default_score_ranges(),
            weights: default_score_weights(),
            normal_edge_score: 70.0,
            excellent_from: 90,
            good_from: 75,
            fair_from: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// Trend & anomaly parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Trailing moving-average window (points).
    pub moving_average_window: usize,
    /// Most recent points used for the regression line.
    pub regression_window: usize,
    pub forecast_steps: usize,
    /// Normalized slope (% of window mean per step) below which a series is stable.
    pub stable_epsilon: f64,
    pub moderate_from: f64,
    pub strong_from: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            moving_average_window: 7,
            regression_window: 14,
            forecast_steps: 7,
            stable_epsilon: 0.1,
            moderate_from: 0.5,
            strong_from: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    pub z_threshold: f64,
    pub z_min_points: usize,
    pub iqr_multiplier: f64,
    pub iqr_min_points: usize,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            z_threshold: 2.5,
            z_min_points: 5,
            iqr_multiplier: 1.5,
            iqr_min_points: 4,
        }
    }
}
