use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::InvalidSeriesError;
use crate::models::{MetricPoint, MetricSeries, MetricType, TrendDirection, TrendStrength};
use crate::reference::ReferenceTables;
use crate::trend::stats::{mean, round_to};
use crate::trend::{analyze_trend, change_rate, classify_values, TrendResult};

/// Nights shorter than this many hours are flagged.
pub const SHORT_SLEEP_HOURS: f64 = 5.0;
/// More wake-ups than this in one night are flagged.
pub const FREQUENT_WAKING: u32 = 5;

/// One night as reported by a wearable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepNight {
    pub date: NaiveDate,
    pub duration_hours: f64,
    /// 0-100 device quality score.
    pub quality_score: Option<u8>,
    pub deep_sleep_hours: Option<f64>,
    pub awake_count: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepAnomalyKind {
    ShortSleep,
    FrequentWaking,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepAnomaly {
    pub date: NaiveDate,
    pub kind: SleepAnomalyKind,
    pub value: f64,
    pub message: String,
}

/// Quality scores have no metric tag, so only the shape of the trend is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityTrend {
    pub direction: TrendDirection,
    pub strength: TrendStrength,
    pub change_rate: f64,
    pub average: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepReport {
    pub nights: usize,
    pub duration_trend: TrendResult,
    /// Hours, one decimal.
    pub average_duration: f64,
    pub quality: Option<QualityTrend>,
    pub average_deep_sleep: Option<f64>,
    /// Deep sleep as a percentage of average duration.
    pub deep_sleep_ratio: Option<f64>,
    pub anomalies: Vec<SleepAnomaly>,
    pub summary: String,
}

fn night_anomalies(night: &SleepNight) -> Vec<SleepAnomaly> {
    let mut found = Vec::new();
    if night.duration_hours < SHORT_SLEEP_HOURS {
        found.push(SleepAnomaly {
            date: night.date,
            kind: SleepAnomalyKind::ShortSleep,
            value: night.duration_hours,
            message: format!("Short sleep ({:.1} h)", night.duration_hours),
        });
    }
    if let Some(count) = night.awake_count.filter(|c| *c > FREQUENT_WAKING) {
        found.push(SleepAnomaly {
            date: night.date,
            kind: SleepAnomalyKind::FrequentWaking,
            value: f64::from(count),
            message: format!("Frequent waking ({count} times)"),
        });
    }
    found
}

fn summarize(average_duration: f64, quality: Option<&QualityTrend>, anomalies: usize) -> String {
    let mut parts = vec![if average_duration >= 7.0 {
        format!("Average sleep {average_duration:.1} h, sufficient")
    } else if average_duration >= 6.0 {
        format!("Average sleep {average_duration:.1} h, slightly short")
    } else {
        format!("Average sleep {average_duration:.1} h, insufficient")
    }];
    if let Some(q) = quality {
        parts.push(
            match q.average {
                80..=u8::MAX => "quality good",
                60..=79 => "quality fair",
                _ => "quality poor",
            }
            .to_string(),
        );
    }
    if anomalies > 0 {
        let noun = if anomalies == 1 { "irregularity" } else { "irregularities" };
        parts.push(format!("{anomalies} sleep {noun} recently"));
    }
    parts.join(", ")
}

/// Duration and quality trends plus per-night flags over consecutive nights.
pub fn sleep_report(
    nights: &[SleepNight],
    tables: &ReferenceTables,
) -> Result<SleepReport, InvalidSeriesError> {
    let points = nights
        .iter()
        .map(|n| MetricPoint::new(n.date.and_time(NaiveTime::MIN), n.duration_hours))
        .collect();
    let series = MetricSeries::new(points)?;
    let duration_trend = analyze_trend(&series, MetricType::SleepDuration, tables)?;

    let durations = series.values();
    let average_duration = round_to(mean(&durations).unwrap_or(0.0), 1);

    let scores: Vec<f64> = nights
        .iter()
        .filter_map(|n| n.quality_score.map(f64::from))
        .collect();
    let quality = mean(&scores).map(|avg| {
        let (direction, strength) = classify_values(&scores, &tables.trend);
        QualityTrend {
            direction,
            strength,
            change_rate: change_rate(&scores),
            average: avg.round().clamp(0.0, 100.0) as u8,
        }
    });

    let deep: Vec<f64> = nights.iter().filter_map(|n| n.deep_sleep_hours).collect();
    let deep_mean = mean(&deep);
    let average_deep_sleep = deep_mean.map(|d| round_to(d, 1));
    let raw_duration = mean(&durations).unwrap_or(0.0);
    let deep_sleep_ratio = deep_mean
        .filter(|_| raw_duration > 0.0)
        .map(|d| round_to(d / raw_duration * 100.0, 1));

    let anomalies: Vec<SleepAnomaly> = nights.iter().flat_map(night_anomalies).collect();
    let summary = summarize(average_duration, quality.as_ref(), anomalies.len());

    tracing::debug!(
        nights = nights.len(),
        average_duration,
        anomalies = anomalies.len(),
        "sleep report built"
    );

    Ok(SleepReport {
        nights: nights.len(),
        duration_trend,
        average_duration,
        quality,
        average_deep_sleep,
        deep_sleep_ratio,
        anomalies,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn nights(durations: &[f64]) -> Vec<SleepNight> {
        let start = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        durations
            .iter()
            .enumerate()
            .map(|(i, &d)| SleepNight {
                date: start + Duration::days(i as i64),
                duration_hours: d,
                quality_score: Some(80),
                deep_sleep_hours: Some(1.6),
                awake_count: Some(2),
            })
            .collect()
    }

    #[test]
    fn steady_sleep() {
        let report = sleep_report(&nights(&[8.0; 7]), &ReferenceTables::default()).unwrap();
        assert_eq!(report.nights, 7);
        assert_eq!(report.average_duration, 8.0);
        assert_eq!(report.average_deep_sleep, Some(1.6));
        assert_eq!(report.deep_sleep_ratio, Some(20.0));
        let quality = report.quality.unwrap();
        assert_eq!(quality.average, 80);
        assert_eq!(quality.direction, TrendDirection::Stable);
        assert!(report.anomalies.is_empty());
        assert_eq!(report.summary, "Average sleep 8.0 h, sufficient, quality good");
    }

    #[test]
    fn short_and_restless_nights_flagged() {
        let mut input = nights(&[7.0, 4.5, 6.0, 6.0]);
        input[2].awake_count = Some(7);
        let report = sleep_report(&input, &ReferenceTables::default()).unwrap();

        assert_eq!(report.anomalies.len(), 2);
        assert_eq!(report.anomalies[0].kind, SleepAnomalyKind::ShortSleep);
        assert_eq!(report.anomalies[0].message, "Short sleep (4.5 h)");
        assert_eq!(report.anomalies[1].kind, SleepAnomalyKind::FrequentWaking);
        assert_eq!(report.anomalies[1].value, 7.0);
        assert_eq!(report.average_duration, 5.9);
        assert_eq!(
            report.summary,
            "Average sleep 5.9 h, insufficient, quality good, 2 sleep irregularities recently"
        );
    }

    #[test]
    fn missing_device_fields() {
        let mut input = nights(&[7.6, 7.0]);
        for night in &mut input {
            night.quality_score = None;
            night.deep_sleep_hours = None;
        }
        let report = sleep_report(&input, &ReferenceTables::default()).unwrap();
        assert!(report.quality.is_none());
        assert!(report.deep_sleep_ratio.is_none());
        assert_eq!(report.summary, "Average sleep 7.3 h, sufficient");
    }

    #[test]
    fn nights_out_of_order_rejected() {
        let mut input = nights(&[7.0, 7.0]);
        input.swap(0, 1);
        let err = sleep_report(&input, &ReferenceTables::default()).unwrap_err();
        assert!(matches!(err, InvalidSeriesError::NotAscending { index: 1, .. }));
    }

    #[test]
    fn no_nights_rejected() {
        let err = sleep_report(&[], &ReferenceTables::default()).unwrap_err();
        assert_eq!(err, InvalidSeriesError::Empty);
    }
}
