//! Composite 0-100 wellness score over the latest value of each category.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, InsufficientDataWarning, InvalidSeriesError};
use crate::models::{MetricType, ScoreCategory, ScoreLevel};
use crate::reference::{MedicalThresholds, ReferenceTables, ScoreRange};

const CATEGORIES: [ScoreCategory; 7] = [
    ScoreCategory::HeartRate,
    ScoreCategory::BloodPressure,
    ScoreCategory::BloodSugar,
    ScoreCategory::Sleep,
    ScoreCategory::Activity,
    ScoreCategory::Bmi,
    ScoreCategory::Spo2,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthScoreResult {
    pub overall_score: u8,
    pub category_scores: BTreeMap<ScoreCategory, u8>,
    pub level: ScoreLevel,
    pub summary: String,
    pub warnings: Vec<InsufficientDataWarning>,
}

/// Category a metric contributes to. Weight is not scored.
pub fn category_of(metric: MetricType) -> Option<ScoreCategory> {
    match metric {
        MetricType::HeartRate => Some(ScoreCategory::HeartRate),
        MetricType::SystolicBp | MetricType::DiastolicBp => Some(ScoreCategory::BloodPressure),
        MetricType::BloodSugar => Some(ScoreCategory::BloodSugar),
        MetricType::SleepDuration => Some(ScoreCategory::Sleep),
        MetricType::Steps => Some(ScoreCategory::Activity),
        MetricType::Bmi => Some(ScoreCategory::Bmi),
        MetricType::Spo2 => Some(ScoreCategory::Spo2),
        MetricType::Weight => None,
    }
}

/// Parse tag-keyed latest values (`"heart_rate" -> 72.0`).
pub fn parse_latest_values(
    raw: &BTreeMap<String, f64>,
) -> Result<BTreeMap<MetricType, f64>, InvalidSeriesError> {
    raw.iter()
        .map(|(tag, value)| Ok((MetricType::parse_tag(tag)?, *value)))
        .collect()
}

/// Piecewise-linear curve: 100 inside the optimal range, down to
/// `edge` at the normal-range boundary, then down to 0 at the critical
/// medical threshold (or 0 / twice the normal maximum when none is set).
fn curve(value: f64, range: &ScoreRange, medical: Option<&MedicalThresholds>, edge: f64) -> f64 {
    let (opt, norm) = (range.optimal, range.normal);
    if opt.contains(value) {
        return 100.0;
    }
    if value < opt.min {
        if value >= norm.min {
            let span = opt.min - norm.min;
            if span <= 0.0 {
                return edge;
            }
            return 100.0 - (opt.min - value) / span * (100.0 - edge);
        }
        let floor = medical
            .and_then(|m| m.critical_low)
            .filter(|cl| *cl < norm.min)
            .unwrap_or(0.0);
        if value <= floor {
            return 0.0;
        }
        return edge * (value - floor) / (norm.min - floor);
    }
    if value <= norm.max {
        let span = norm.max - opt.max;
        if span <= 0.0 {
            return edge;
        }
        return 100.0 - (value - opt.max) / span * (100.0 - edge);
    }
    let ceiling = medical
        .and_then(|m| m.critical_high)
        .filter(|ch| *ch > norm.max)
        .unwrap_or(norm.max * 2.0);
    if value >= ceiling {
        return 0.0;
    }
    edge * (ceiling - value) / (ceiling - norm.max)
}

/// 0-100 score for one metric value, or `None` when the metric has no curve.
pub fn metric_score(metric: MetricType, value: f64, tables: &ReferenceTables) -> Option<f64> {
    let range = tables.score.ranges.get(&metric)?;
    Some(curve(value, range, tables.medical(metric), tables.score.normal_edge_score).clamp(0.0, 100.0))
}

fn level_for(score: u8, tables: &ReferenceTables) -> ScoreLevel {
    let t = &tables.score;
    if score >= t.excellent_from {
        ScoreLevel::Excellent
    } else if score >= t.good_from {
        ScoreLevel::Good
    } else if score >= t.fair_from {
        ScoreLevel::Fair
    } else {
        ScoreLevel::Poor
    }
}

fn summary_for(level: ScoreLevel) -> &'static str {
    match level {
        ScoreLevel::Excellent => "Excellent health readings. Keep it up.",
        ScoreLevel::Good => "Good health readings. Keep up your healthy habits.",
        ScoreLevel::Fair => "Fair health readings. Some lifestyle changes would help.",
        ScoreLevel::Poor => "Several readings need attention. Consider a medical check-up.",
    }
}

/// Weighted composite over the categories present in `latest`.
///
/// Absent categories drop out of both the sum and the normalization. Blood
/// pressure averages the systolic and diastolic scores that are present.
pub fn health_score(
    latest: &BTreeMap<MetricType, f64>,
    tables: &ReferenceTables,
) -> Result<HealthScoreResult, AnalyticsError> {
    let mut per_category: BTreeMap<ScoreCategory, Vec<f64>> = BTreeMap::new();
    for (&metric, &value) in latest {
        if !value.is_finite() {
            return Err(AnalyticsError::NonFiniteMetric(metric));
        }
        let Some(category) = category_of(metric) else {
            continue;
        };
        if let Some(score) = metric_score(metric, value, tables) {
            per_category.entry(category).or_default().push(score);
        }
    }
    if per_category.is_empty() {
        return Err(AnalyticsError::NoScorableMetrics);
    }

    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    let mut category_scores = BTreeMap::new();
    for (category, scores) in &per_category {
        let score = scores.iter().sum::<f64>() / scores.len() as f64;
        let weight = tables.score.weight(*category);
        weighted_sum += score * weight;
        total_weight += weight;
        category_scores.insert(*category, score.round() as u8);
    }
    if total_weight <= 0.0 {
        return Err(AnalyticsError::NoScorableMetrics);
    }

    let overall_score = (weighted_sum / total_weight).round().clamp(0.0, 100.0) as u8;
    let level = level_for(overall_score, tables);

    let missing: Vec<String> = CATEGORIES
        .iter()
        .filter(|c| !per_category.contains_key(*c))
        .map(|c| c.as_str().to_string())
        .collect();
    let mut warnings = Vec::new();
    if !missing.is_empty() {
        warnings.push(InsufficientDataWarning::MissingCategories { missing });
    }

    tracing::debug!(
        overall_score,
        level = %level,
        categories = category_scores.len(),
        "health score calculated"
    );

    Ok(HealthScoreResult {
        overall_score,
        category_scores,
        level,
        summary: summary_for(level).to_string(),
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> ReferenceTables {
        ReferenceTables::default()
    }

    fn score(metric: MetricType, value: f64) -> f64 {
        metric_score(metric, value, &tables()).unwrap()
    }

    #[test]
    fn single_category_equals_its_subscore() {
        let latest = BTreeMap::from([(MetricType::HeartRate, 72.0)]);
        let result = health_score(&latest, &tables()).unwrap();
        assert_eq!(result.overall_score, result.category_scores[&ScoreCategory::HeartRate]);
        assert_eq!(result.overall_score, 100);
        assert_eq!(result.level, ScoreLevel::Excellent);

        let latest = BTreeMap::from([(MetricType::HeartRate, 90.0)]);
        let result = health_score(&latest, &tables()).unwrap();
        assert_eq!(result.overall_score, 85);
        assert_eq!(result.category_scores[&ScoreCategory::HeartRate], 85);
        assert_eq!(result.level, ScoreLevel::Good);
    }

    #[test]
    fn curve_anchors() {
        assert_eq!(score(MetricType::HeartRate, 60.0), 100.0);
        assert_eq!(score(MetricType::HeartRate, 100.0), 70.0);
        assert_eq!(score(MetricType::HeartRate, 50.0), 70.0);
        // past the critical threshold
        assert_eq!(score(MetricType::HeartRate, 125.0), 0.0);
        assert_eq!(score(MetricType::HeartRate, 35.0), 0.0);
        // halfway between normal max and critical high
        assert!((score(MetricType::HeartRate, 110.0) - 35.0).abs() < 1e-9);
    }

    #[test]
    fn curve_without_medical_floor() {
        assert_eq!(score(MetricType::Steps, 10_000.0), 100.0);
        assert_eq!(score(MetricType::Steps, 5_000.0), 70.0);
        assert!((score(MetricType::Steps, 2_500.0) - 35.0).abs() < 1e-9);
        assert_eq!(score(MetricType::Steps, 0.0), 0.0);
    }

    #[test]
    fn curve_with_shared_optimal_and_normal_edge() {
        // BMI optimal and normal both start at 18.5
        assert_eq!(score(MetricType::Bmi, 18.5), 100.0);
        assert!(score(MetricType::Bmi, 17.0) < 70.0);
        assert_eq!(score(MetricType::Bmi, 16.0), 0.0);
    }

    #[test]
    fn weights_renormalize_over_present_categories() {
        let latest = BTreeMap::from([
            (MetricType::HeartRate, 72.0),
            (MetricType::SleepDuration, 6.0),
        ]);
        let result = health_score(&latest, &tables()).unwrap();
        // both weigh 0.15: (100 + 70) / 2
        assert_eq!(result.overall_score, 85);
        match &result.warnings[0] {
            InsufficientDataWarning::MissingCategories { missing } => {
                assert_eq!(missing.len(), 5);
                assert!(missing.contains(&"blood_pressure".to_string()));
            }
            other => panic!("unexpected warning {other:?}"),
        }
    }

    #[test]
    fn blood_pressure_averages_components() {
        let latest = BTreeMap::from([
            (MetricType::SystolicBp, 115.0),
            (MetricType::DiastolicBp, 90.0),
        ]);
        let result = health_score(&latest, &tables()).unwrap();
        assert_eq!(result.category_scores[&ScoreCategory::BloodPressure], 85);
    }

    #[test]
    fn all_categories_no_warning() {
        let latest = BTreeMap::from([
            (MetricType::HeartRate, 70.0),
            (MetricType::SystolicBp, 115.0),
            (MetricType::DiastolicBp, 75.0),
            (MetricType::BloodSugar, 5.0),
            (MetricType::SleepDuration, 7.5),
            (MetricType::Steps, 9000.0),
            (MetricType::Bmi, 22.0),
            (MetricType::Spo2, 98.0),
        ]);
        let result = health_score(&latest, &tables()).unwrap();
        assert_eq!(result.overall_score, 100);
        assert!(result.warnings.is_empty());
        assert_eq!(result.category_scores.len(), 7);
    }

    #[test]
    fn poor_level() {
        let latest = BTreeMap::from([(MetricType::BloodSugar, 12.0), (MetricType::Spo2, 88.0)]);
        let result = health_score(&latest, &tables()).unwrap();
        assert_eq!(result.overall_score, 0);
        assert_eq!(result.level, ScoreLevel::Poor);
    }

    #[test]
    fn nothing_scorable_is_error() {
        let err = health_score(&BTreeMap::new(), &tables()).unwrap_err();
        assert!(matches!(err, AnalyticsError::NoScorableMetrics));
        let only_weight = BTreeMap::from([(MetricType::Weight, 70.0)]);
        assert!(matches!(
            health_score(&only_weight, &tables()).unwrap_err(),
            AnalyticsError::NoScorableMetrics
        ));
    }

    #[test]
    fn non_finite_value_is_error() {
        let latest = BTreeMap::from([(MetricType::HeartRate, f64::NAN)]);
        let err = health_score(&latest, &tables()).unwrap_err();
        assert!(matches!(err, AnalyticsError::NonFiniteMetric(MetricType::HeartRate)));
    }

    #[test]
    fn parse_tags() {
        let raw = BTreeMap::from([("heart_rate".to_string(), 72.0)]);
        let parsed = parse_latest_values(&raw).unwrap();
        assert_eq!(parsed[&MetricType::HeartRate], 72.0);

        let raw = BTreeMap::from([("mood".to_string(), 3.0)]);
        assert!(parse_latest_values(&raw).is_err());
    }
}
