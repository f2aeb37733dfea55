//! Descriptive statistics over plain value slices.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStatistics {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// Population standard deviation.
    pub std_dev: f64,
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divides by `n`).
pub fn population_std(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let s = sorted(values);
    let mid = s.len() / 2;
    if s.len() % 2 == 0 {
        Some((s[mid - 1] + s[mid]) / 2.0)
    } else {
        Some(s[mid])
    }
}

/// Lower and upper quartiles by index: `sorted[n/4]` and `sorted[3n/4]`.
pub fn quartiles(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let s = sorted(values);
    let n = s.len();
    Some((s[n / 4], s[(3 * n / 4).min(n - 1)]))
}

/// Trailing moving average aligned with the input. The first `window - 1`
/// points average over the prefix available so far.
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut out = Vec::with_capacity(values.len());
    let mut running = 0.0;
    for (i, v) in values.iter().enumerate() {
        running += v;
        if i >= window {
            running -= values[i - window];
        }
        let len = (i + 1).min(window);
        out.push(running / len as f64);
    }
    out
}

/// Ordinary least squares over `(index, value)`. Returns `(slope, intercept)`.
/// Fewer than two points give a flat line through the single value.
pub fn linear_fit(values: &[f64]) -> Option<(f64, f64)> {
    let n = values.len();
    if n == 0 {
        return None;
    }
    if n == 1 {
        return Some((0.0, values[0]));
    }
    let nf = n as f64;
    let x_mean = (nf - 1.0) / 2.0;
    let y_mean = mean(values)?;
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        sxy += dx * (y - y_mean);
        sxx += dx * dx;
    }
    let slope = sxy / sxx;
    Some((slope, y_mean - slope * x_mean))
}

pub fn describe(values: &[f64]) -> Option<SeriesStatistics> {
    let mean = mean(values)?;
    let s = sorted(values);
    Some(SeriesStatistics {
        count: values.len(),
        mean,
        median: median(values)?,
        min: s[0],
        max: s[s.len() - 1],
        std_dev: population_std(values)?,
    })
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_inputs_yield_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(median(&[]), None);
        assert_eq!(quartiles(&[]), None);
        assert_eq!(linear_fit(&[]), None);
        assert!(describe(&[]).is_none());
        assert!(moving_average(&[], 7).is_empty());
    }

    #[test]
    fn population_std_divides_by_n() {
        let std = population_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!(close(std, 2.0));
    }

    #[test]
    fn median_even_and_odd() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn quartiles_by_index() {
        let values: Vec<f64> = (1..=8).map(f64::from).collect();
        assert_eq!(quartiles(&values), Some((3.0, 7.0)));
        assert_eq!(quartiles(&[5.0]), Some((5.0, 5.0)));
    }

    #[test]
    fn moving_average_expands_then_slides() {
        let ma = moving_average(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(ma.len(), 5);
        assert!(close(ma[0], 1.0));
        assert!(close(ma[1], 1.5));
        assert!(close(ma[2], 2.0));
        assert!(close(ma[3], 3.0));
        assert!(close(ma[4], 4.0));
    }

    #[test]
    fn moving_average_window_longer_than_series() {
        let ma = moving_average(&[10.0, 20.0], 7);
        assert!(close(ma[1], 15.0));
    }

    #[test]
    fn linear_fit_recovers_line() {
        let values: Vec<f64> = (0..10).map(|i| 3.0 + 2.0 * f64::from(i)).collect();
        let (slope, intercept) = linear_fit(&values).unwrap();
        assert!(close(slope, 2.0));
        assert!(close(intercept, 3.0));
    }

    #[test]
    fn linear_fit_single_point_is_flat() {
        assert_eq!(linear_fit(&[72.0]), Some((0.0, 72.0)));
    }

    #[test]
    fn describe_summary() {
        let stats = describe(&[70.0, 80.0, 75.0]).unwrap();
        assert_eq!(stats.count, 3);
        assert!(close(stats.mean, 75.0));
        assert_eq!(stats.median, 75.0);
        assert_eq!(stats.min, 70.0);
        assert_eq!(stats.max, 80.0);
    }

    #[test]
    fn round_to_decimals() {
        assert_eq!(round_to(31.254, 2), 31.25);
        assert_eq!(round_to(2.25, 1), 2.3);
    }
}
