use serde::{Deserialize, Serialize};

use crate::error::InvalidSeriesError;
use crate::models::{MetricSeries, MetricType};
use crate::reference::ReferenceTables;
use crate::trend::{analyze_trend, detect_anomalies, stats, AnomalyReport, SeriesStatistics, TrendResult};

/// Trend, anomalies and descriptive statistics for one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricReport {
    pub metric: MetricType,
    pub unit: String,
    pub trend: TrendResult,
    pub anomalies: AnomalyReport,
    pub statistics: SeriesStatistics,
}

pub fn metric_report(
    series: &MetricSeries,
    metric: MetricType,
    tables: &ReferenceTables,
) -> Result<MetricReport, InvalidSeriesError> {
    let trend = analyze_trend(series, metric, tables)?;
    let anomalies = detect_anomalies(series, metric, None, tables)?;
    let statistics = stats::describe(&series.values()).ok_or(InvalidSeriesError::Empty)?;

    Ok(MetricReport {
        metric,
        unit: metric.default_unit().to_string(),
        trend,
        anomalies,
        statistics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TrendDirection;
    use chrono::NaiveDate;

    #[test]
    fn report_combines_passes() {
        let start = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let values = [70.0, 71.0, 72.0, 73.0, 74.0, 75.0, 76.0, 77.0, 78.0, 126.0];
        let series = MetricSeries::from_daily_values(start, &values).unwrap();
        let report = metric_report(&series, MetricType::HeartRate, &ReferenceTables::default()).unwrap();

        assert_eq!(report.unit, "bpm");
        assert_eq!(report.statistics.count, 10);
        assert_eq!(report.statistics.max, 126.0);
        assert_eq!(report.trend.direction, TrendDirection::Rising);
        assert!(report.anomalies.has_anomaly);
        assert_eq!(report.anomalies.critical_count(), 1);
        assert_eq!(report.anomalies.anomalies.last().unwrap().index, 9);
    }

    #[test]
    fn empty_series_rejected() {
        let series = MetricSeries::new(vec![]).unwrap();
        let err = metric_report(&series, MetricType::Steps, &ReferenceTables::default()).unwrap_err();
        assert_eq!(err, InvalidSeriesError::Empty);
    }
}
