//! Reference tables: every coefficient, threshold and breakpoint the engine uses.
//!
//! Tables are immutable once built. `ReferenceTables::default()` carries the
//! published constants; `ReferenceTables::load` overlays a JSON file on top of
//! them. Callers build the tables once at startup and pass them by reference
//! to every calculator.

mod metrics;
mod risk;

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;
use crate::models::{MetricType, ProfileField, ScoreCategory};

pub use metrics::*;
pub use risk::*;

/// File name looked up inside the reference directory.
pub const REFERENCE_FILE: &str = "reference_tables.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceTables {
    pub cardiovascular: CardiovascularTable,
    pub findrisc: FindriscTable,
    pub metabolic: MetabolicTable,
    #[serde(deserialize_with = "merge_profile_ranges")]
    pub profile_ranges: BTreeMap<ProfileField, ValueRange>,
    #[serde(deserialize_with = "merge_medical_thresholds")]
    pub medical_thresholds: BTreeMap<MetricType, MedicalThresholds>,
    #[serde(deserialize_with = "merge_plausible_ranges")]
    pub plausible_ranges: BTreeMap<MetricType, ValueRange>,
    pub score: ScoreTable,
    pub trend: TrendConfig,
    pub anomaly: AnomalyConfig,
}

impl Default for ReferenceTables {
    fn default() -> Self {
        Self {
            cardiovascular: CardiovascularTable::default(),
            findrisc: FindriscTable::default(),
            metabolic: MetabolicTable::default(),
            profile_ranges: default_profile_ranges(),
            medical_thresholds: default_medical_thresholds(),
            plausible_ranges: default_plausible_ranges(),
            score: ScoreTable::default(),
            trend: TrendConfig::default(),
            anomaly: AnomalyConfig::default(),
        }
    }
}

impl ReferenceTables {
    /// Load `reference_tables.json` from `dir`. Sections absent from the file
    /// keep their published defaults; map sections merge key by key.
    pub fn load(dir: &Path) -> Result<Self, AnalyticsError> {
        let path = dir.join(REFERENCE_FILE);
        let json = std::fs::read_to_string(&path).map_err(|e| {
            AnalyticsError::ReferenceDataLoad(path.display().to_string(), e.to_string())
        })?;
        let tables = Self::from_json(&json)?;
        tracing::info!(path = %path.display(), "reference tables loaded");
        Ok(tables)
    }

    /// Parse and validate tables from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, AnalyticsError> {
        let tables: Self = serde_json::from_str(json)
            .map_err(|e| AnalyticsError::ReferenceDataParse(REFERENCE_FILE.into(), e.to_string()))?;
        tables.validate()?;
        Ok(tables)
    }

    pub fn medical(&self, metric: MetricType) -> Option<&MedicalThresholds> {
        self.medical_thresholds.get(&metric)
    }

    pub fn plausible(&self, metric: MetricType) -> Option<&ValueRange> {
        self.plausible_ranges.get(&metric)
    }

    pub fn profile_range(&self, field: ProfileField) -> Option<&ValueRange> {
        self.profile_ranges.get(&field)
    }

    /// Structural checks: ascending bands, ordered thresholds, positive weights.
    pub fn validate(&self) -> Result<(), AnalyticsError> {
        let invalid = |msg: String| Err(AnalyticsError::ReferenceDataInvalid(msg));

        let f = &self.findrisc;
        for (name, bands) in [
            ("findrisc.age", &f.age),
            ("findrisc.bmi", &f.bmi),
            ("findrisc.waist.male", &f.waist.male),
            ("findrisc.waist.female", &f.waist.female),
        ] {
            if !bands.windows(2).all(|w| w[0].from < w[1].from) {
                return invalid(format!("{name} bands must be strictly ascending"));
            }
        }
        match f.buckets.first() {
            Some(first) if first.min_score == 0 => {}
            _ => return invalid("findrisc.buckets must start at score 0".into()),
        }
        if !f.buckets.windows(2).all(|w| w[0].min_score < w[1].min_score) {
            return invalid("findrisc.buckets must be strictly ascending".into());
        }

        let cv = &self.cardiovascular;
        if cv.validated_age_min == 0 || cv.validated_age_min > cv.validated_age_max {
            return invalid("cardiovascular validated age range is empty".into());
        }
        if cv.medium_from > cv.high_from {
            return invalid("cardiovascular medium_from exceeds high_from".into());
        }

        for (metric, t) in &self.medical_thresholds {
            let levels = t.levels();
            if !levels.windows(2).all(|w| w[0] <= w[1]) {
                return invalid(format!("medical thresholds for {metric} are not ordered"));
            }
        }

        for (metric, r) in &self.score.ranges {
            if r.optimal.min < r.normal.min || r.optimal.max > r.normal.max {
                return invalid(format!("optimal range for {metric} exceeds normal range"));
            }
        }
        for category in [
            ScoreCategory::HeartRate,
            ScoreCategory::BloodPressure,
            ScoreCategory::BloodSugar,
            ScoreCategory::Sleep,
            ScoreCategory::Activity,
            ScoreCategory::Bmi,
            ScoreCategory::Spo2,
        ] {
            if self.score.weight(category) <= 0.0 {
                return invalid(format!("score weight for {category} must be positive"));
            }
        }

        let t = &self.trend;
        if t.moving_average_window == 0 || t.regression_window < 2 {
            return invalid("trend windows too small".into());
        }
        if !(t.stable_epsilon <= t.moderate_from && t.moderate_from <= t.strong_from) {
            return invalid("trend breakpoints must be non-decreasing".into());
        }
        if t.forecast_steps == 0 {
            return invalid("trend.forecast_steps must be at least 1".into());
        }

        let a = &self.anomaly;
        if !(a.z_threshold > 0.0) {
            return invalid("anomaly.z_threshold must be positive".into());
        }
        if !(a.iqr_multiplier >= 0.0) {
            return invalid("anomaly.iqr_multiplier must not be negative".into());
        }
        if a.z_min_points < 2 || a.iqr_min_points < 1 {
            return invalid("anomaly minimum point counts too small".into());
        }

        Ok(())
    }
}
