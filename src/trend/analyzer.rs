use crate::error::{InsufficientDataWarning, InvalidSeriesError};
use crate::models::{MetricSeries, MetricType, TrendDirection, TrendStrength};
use crate::reference::{ReferenceTables, TrendConfig};

use super::stats::{linear_fit, mean, moving_average, round_to};
use super::types::{ForecastPoint, TrendResult};

/// Smooth, fit and extrapolate one series.
///
/// The regression runs over the most recent `regression_window` points. Its
/// slope, expressed as a percentage of that window's mean per step, decides
/// direction and strength. The metric tag only selects the plausible range
/// forecasts are clipped into.
pub fn analyze_trend(
    series: &MetricSeries,
    metric: MetricType,
    tables: &ReferenceTables,
) -> Result<TrendResult, InvalidSeriesError> {
    if series.is_empty() {
        return Err(InvalidSeriesError::Empty);
    }
    let cfg = &tables.trend;
    let values = series.values();
    let n = values.len();

    let mut warnings = Vec::new();
    if n < cfg.moving_average_window {
        warnings.push(InsufficientDataWarning::ShortSeries {
            points: n,
            window: cfg.moving_average_window,
        });
    }

    let smoothed = moving_average(&values, cfg.moving_average_window);

    let RecentFit {
        slope,
        intercept,
        normalized_slope,
        points: fitted,
    } = fit_recent(&values, cfg);

    let (direction, strength) = classify(normalized_slope, cfg);
    let change_rate = change_rate(&values);

    let plausible = tables.plausible(metric);
    let interval = series.typical_interval();
    let mut at = series
        .latest()
        .map(|p| p.recorded_at)
        .ok_or(InvalidSeriesError::Empty)?;
    let last_x = fitted.saturating_sub(1) as f64;
    let mut forecast = Vec::with_capacity(cfg.forecast_steps);
    for step in 1..=cfg.forecast_steps {
        at += interval;
        let raw = intercept + slope * (last_x + step as f64);
        let value = plausible.map_or(raw, |r| r.clamp(raw));
        forecast.push(ForecastPoint {
            recorded_at: at,
            value: round_to(value, 2),
        });
    }

    let summary = format!(
        "{metric} {direction} ({strength}), {change_rate:+}% over {n} readings"
    );

    tracing::debug!(
        metric = %metric,
        points = n,
        direction = %direction,
        strength = %strength,
        normalized_slope,
        "trend analyzed"
    );

    Ok(TrendResult {
        metric,
        direction,
        strength,
        slope,
        normalized_slope,
        change_rate,
        moving_average: smoothed,
        forecast,
        summary,
        warnings,
    })
}

struct RecentFit {
    slope: f64,
    intercept: f64,
    /// Slope as a percentage of the window mean.
    normalized_slope: f64,
    points: usize,
}

/// OLS over the last `regression_window` values.
fn fit_recent(values: &[f64], cfg: &TrendConfig) -> RecentFit {
    let n = values.len();
    let tail = &values[n.saturating_sub(cfg.regression_window.max(1))..];
    let fallback = tail.last().copied().unwrap_or(0.0);
    let (slope, intercept) = linear_fit(tail).unwrap_or((0.0, fallback));
    let tail_mean = mean(tail).unwrap_or(0.0);
    let normalized_slope = if tail_mean != 0.0 {
        slope / tail_mean.abs() * 100.0
    } else {
        slope
    };
    RecentFit {
        slope,
        intercept,
        normalized_slope,
        points: tail.len(),
    }
}

/// Direction and strength of a plain value sequence, for scores that have
/// no `MetricType` (sleep quality).
pub(crate) fn classify_values(values: &[f64], cfg: &TrendConfig) -> (TrendDirection, TrendStrength) {
    classify(fit_recent(values, cfg).normalized_slope, cfg)
}

fn classify(normalized_slope: f64, cfg: &TrendConfig) -> (TrendDirection, TrendStrength) {
    let direction = if normalized_slope > cfg.stable_epsilon {
        TrendDirection::Rising
    } else if normalized_slope < -cfg.stable_epsilon {
        TrendDirection::Falling
    } else {
        TrendDirection::Stable
    };
    let magnitude = normalized_slope.abs();
    let strength = if direction == TrendDirection::Stable {
        TrendStrength::Weak
    } else if magnitude >= cfg.strong_from {
        TrendStrength::Strong
    } else if magnitude >= cfg.moderate_from {
        TrendStrength::Moderate
    } else {
        TrendStrength::Weak
    };
    (direction, strength)
}

/// Percent difference between the mean of the last third and the first third.
pub fn change_rate(values: &[f64]) -> f64 {
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    let third = (n / 3).max(1);
    let first = mean(&values[..third]).unwrap_or(0.0);
    let last = mean(&values[n - third..]).unwrap_or(0.0);
    if first == 0.0 {
        return 0.0;
    }
    round_to((last - first) / first.abs() * 100.0, 2)
}
