use std::collections::BTreeMap;

use crate::error::{InsufficientDataWarning, InvalidSeriesError};
use crate::models::{DetectionMethod, Deviation, MetricSeries, MetricType, Severity};
use crate::reference::{AnomalyConfig, MedicalThresholds, ReferenceTables};

use super::stats::{mean, moving_average, population_std, quartiles};
use super::types::{AnomalyRecord, AnomalyReport, LatestStatus, MedicalFinding};

/// Compare one value against a four-level table. Low levels trigger at or
/// below the threshold, high levels at or above it; critical wins.
pub fn classify_medical(value: f64, t: &MedicalThresholds) -> Option<MedicalFinding> {
    let finding = |severity, direction, threshold| MedicalFinding {
        severity,
        direction,
        threshold,
    };
    if let Some(cl) = t.critical_low.filter(|cl| value <= *cl) {
        return Some(finding(Severity::Critical, Deviation::Low, cl));
    }
    if let Some(ch) = t.critical_high.filter(|ch| value >= *ch) {
        return Some(finding(Severity::Critical, Deviation::High, ch));
    }
    if let Some(l) = t.low.filter(|l| value <= *l) {
        return Some(finding(Severity::Warning, Deviation::Low, l));
    }
    if let Some(h) = t.high.filter(|h| value >= *h) {
        return Some(finding(Severity::Warning, Deviation::High, h));
    }
    None
}

/// Per-point flag before merging.
struct Flag {
    method: DetectionMethod,
    severity: Severity,
    direction: Deviation,
}

#[derive(Default)]
struct Merged {
    flags: Vec<Flag>,
    medical: Option<MedicalFinding>,
}

fn z_score_pass(
    values: &[f64],
    cfg: &AnomalyConfig,
    warnings: &mut Vec<InsufficientDataWarning>,
) -> Vec<(usize, Flag)> {
    let n = values.len();
    let std = population_std(values).unwrap_or(0.0);
    if n < cfg.z_min_points || std == 0.0 {
        warnings.push(InsufficientDataWarning::ZScoreSkipped {
            points: n,
            min_points: cfg.z_min_points,
            zero_variance: n >= cfg.z_min_points && std == 0.0,
        });
        return Vec::new();
    }
    let m = mean(values).unwrap_or(0.0);
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| ((*v - m) / std).abs() > cfg.z_threshold)
        .map(|(i, v)| {
            let direction = if *v > m { Deviation::High } else { Deviation::Low };
            (
                i,
                Flag {
                    method: DetectionMethod::ZScore,
                    severity: Severity::Warning,
                    direction,
                },
            )
        })
        .collect()
}

fn iqr_pass(
    values: &[f64],
    cfg: &AnomalyConfig,
    warnings: &mut Vec<InsufficientDataWarning>,
) -> Vec<(usize, Flag)> {
    let n = values.len();
    let Some((q1, q3)) = quartiles(values).filter(|_| n >= cfg.iqr_min_points) else {
        warnings.push(InsufficientDataWarning::IqrSkipped {
            points: n,
            min_points: cfg.iqr_min_points,
        });
        return Vec::new();
    };
    let iqr = q3 - q1;
    let lower = q1 - cfg.iqr_multiplier * iqr;
    let upper = q3 + cfg.iqr_multiplier * iqr;
    values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| {
            let direction = if *v < lower {
                Deviation::Low
            } else if *v > upper {
                Deviation::High
            } else {
                return None;
            };
            Some((
                i,
                Flag {
                    method: DetectionMethod::Iqr,
                    severity: Severity::Warning,
                    direction,
                },
            ))
        })
        .collect()
}

fn describe_direction(severity: Severity, direction: Deviation) -> &'static str {
    match (severity, direction) {
        (Severity::Critical, Deviation::High) => "critically high",
        (Severity::Critical, Deviation::Low) => "critically low",
        (Severity::Warning, Deviation::High) => "above the normal range",
        (Severity::Warning, Deviation::Low) => "below the normal range",
    }
}

fn medical_message(metric: MetricType, value: f64, finding: &MedicalFinding) -> String {
    format!(
        "{metric} {value} {} is {} (threshold {})",
        metric.default_unit(),
        describe_direction(finding.severity, finding.direction),
        finding.threshold,
    )
}

fn statistical_message(metric: MetricType, value: f64, direction: Deviation, baseline: f64) -> String {
    let word = match direction {
        Deviation::High => "high",
        Deviation::Low => "low",
    };
    format!(
        "{metric} {value} {} is unusually {word} against a recent average of {baseline:.1}",
        metric.default_unit(),
    )
}

/// Flag abnormal points with the z-score, IQR and medical-threshold passes.
///
/// All three passes run; a point flagged by several keeps one record with the
/// worst severity. Statistical passes only ever raise warnings and are
/// skipped, with a warning on the report, when the series is too short. The
/// medical pass runs at any length. `labels`, when given, must have one entry
/// per point; otherwise dates come from the timestamps.
pub fn detect_anomalies(
    series: &MetricSeries,
    metric: MetricType,
    labels: Option<&[String]>,
    tables: &ReferenceTables,
) -> Result<AnomalyReport, InvalidSeriesError> {
    if series.is_empty() {
        return Err(InvalidSeriesError::Empty);
    }
    let values = series.values();
    let n = values.len();

    let dates = match labels {
        Some(labels) if labels.len() != n => {
            return Err(InvalidSeriesError::LabelCountMismatch {
                labels: labels.len(),
                points: n,
            });
        }
        Some(labels) => labels.to_vec(),
        None => series.date_labels(),
    };

    let cfg = &tables.anomaly;
    let mut warnings = Vec::new();
    let mut merged: BTreeMap<usize, Merged> = BTreeMap::new();

    let statistical = z_score_pass(&values, cfg, &mut warnings)
        .into_iter()
        .chain(iqr_pass(&values, cfg, &mut warnings));
    for (i, flag) in statistical {
        merged.entry(i).or_default().flags.push(flag);
    }

    let thresholds = tables.medical(metric);
    if let Some(t) = thresholds {
        for (i, v) in values.iter().enumerate() {
            if let Some(finding) = classify_medical(*v, t) {
                let entry = merged.entry(i).or_default();
                entry.flags.push(Flag {
                    method: DetectionMethod::MedicalThreshold,
                    severity: finding.severity,
                    direction: finding.direction,
                });
                entry.medical = Some(finding);
            }
        }
    }

    let baseline = moving_average(&values, tables.trend.moving_average_window);
    let anomalies: Vec<AnomalyRecord> = merged
        .into_iter()
        .filter_map(|(index, m)| {
            let severity = m.flags.iter().map(|f| f.severity).max()?;
            let direction = m
                .medical
                .map(|f| f.direction)
                .or_else(|| m.flags.first().map(|f| f.direction))?;
            let value = values[index];
            let message = match &m.medical {
                Some(finding) => medical_message(metric, value, finding),
                None => statistical_message(metric, value, direction, baseline[index]),
            };
            let mut methods: Vec<DetectionMethod> = m.flags.iter().map(|f| f.method).collect();
            methods.sort();
            methods.dedup();
            Some(AnomalyRecord {
                index,
                date: dates[index].clone(),
                value,
                severity,
                direction,
                methods,
                baseline: baseline[index],
                message,
            })
        })
        .collect();

    let latest_status = series.latest().and_then(|p| {
        let finding = classify_medical(p.value, thresholds?)?;
        Some(LatestStatus {
            recorded_at: p.recorded_at,
            value: p.value,
            message: medical_message(metric, p.value, &finding),
            finding,
        })
    });

    let count = anomalies.len();
    let critical = anomalies
        .iter()
        .filter(|a| a.severity == Severity::Critical)
        .count();
    let summary = if count == 0 {
        format!("No anomalies in {n} {metric} readings")
    } else {
        let noun = if count == 1 { "anomaly" } else { "anomalies" };
        format!("{count} {noun} in {n} {metric} readings, {critical} critical")
    };

    tracing::debug!(metric = %metric, points = n, count, critical, "anomalies detected");

    Ok(AnomalyReport {
        metric,
        has_anomaly: count > 0,
        count,
        anomalies,
        latest_status,
        summary,
        warnings,
    })
}
