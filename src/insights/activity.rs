use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::InvalidSeriesError;
use crate::models::{MetricPoint, MetricSeries, MetricType, TrendDirection};
use crate::reference::ReferenceTables;
use crate::trend::stats::{mean, round_to};
use crate::trend::{analyze_trend, TrendResult};

pub const DEFAULT_STEP_GOAL: u32 = 8000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityDay {
    pub date: NaiveDate,
    pub steps: u32,
    pub calories: Option<f64>,
    pub active_minutes: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityReport {
    pub days: usize,
    pub step_trend: TrendResult,
    pub average_steps: u32,
    pub max_steps: u32,
    pub goal: u32,
    /// Percentage of days at or above the goal, one decimal.
    pub goal_reach_rate: f64,
    pub average_calories: Option<u32>,
    pub average_active_minutes: Option<u32>,
    pub summary: String,
}

fn summarize(average_steps: u32, reach_rate: f64, direction: TrendDirection) -> String {
    let mut parts = vec![if average_steps >= 10_000 {
        format!("Averaging {average_steps} steps a day, activity is sufficient")
    } else if average_steps >= 6_000 {
        format!("Averaging {average_steps} steps a day, activity is moderate")
    } else {
        format!("Averaging {average_steps} steps a day, try to move more")
    }];
    parts.push(format!("goal reached on {reach_rate:.0}% of days"));
    match direction {
        TrendDirection::Rising => parts.push("activity is trending up".to_string()),
        TrendDirection::Falling => parts.push("activity is trending down".to_string()),
        TrendDirection::Stable => {}
    }
    parts.join(", ")
}

fn rounded_mean(values: &[f64]) -> Option<u32> {
    mean(values).map(|m| m.round().max(0.0) as u32)
}

/// Step trend and goal attainment over consecutive days.
pub fn activity_report(
    days: &[ActivityDay],
    goal: Option<u32>,
    tables: &ReferenceTables,
) -> Result<ActivityReport, InvalidSeriesError> {
    let goal = goal.unwrap_or(DEFAULT_STEP_GOAL);
    let points = days
        .iter()
        .map(|d| MetricPoint::new(d.date.and_time(NaiveTime::MIN), f64::from(d.steps)))
        .collect();
    let series = MetricSeries::new(points)?;
    let step_trend = analyze_trend(&series, MetricType::Steps, tables)?;

    let steps = series.values();
    let average_steps = rounded_mean(&steps).unwrap_or(0);
    let max_steps = days.iter().map(|d| d.steps).max().unwrap_or(0);
    let reached = days.iter().filter(|d| d.steps >= goal).count();
    let goal_reach_rate = round_to(reached as f64 / days.len() as f64 * 100.0, 1);

    let calories: Vec<f64> = days.iter().filter_map(|d| d.calories).collect();
    let minutes: Vec<f64> = days
        .iter()
        .filter_map(|d| d.active_minutes.map(f64::from))
        .collect();

    let summary = summarize(average_steps, goal_reach_rate, step_trend.direction);

    tracing::debug!(
        days = days.len(),
        average_steps,
        goal_reach_rate,
        "activity report built"
    );

    Ok(ActivityReport {
        days: days.len(),
        step_trend,
        average_steps,
        max_steps,
        goal,
        goal_reach_rate,
        average_calories: rounded_mean(&calories),
        average_active_minutes: rounded_mean(&minutes),
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn days(steps: &[u32]) -> Vec<ActivityDay> {
        let start = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        steps
            .iter()
            .enumerate()
            .map(|(i, &s)| ActivityDay {
                date: start + Duration::days(i as i64),
                steps: s,
                calories: Some(300.0 + i as f64),
                active_minutes: Some(30),
            })
            .collect()
    }

    #[test]
    fn goal_reach_rate_and_averages() {
        let input = days(&[6000, 9000, 8000, 12000]);
        let report = activity_report(&input, None, &ReferenceTables::default()).unwrap();
        assert_eq!(report.goal, DEFAULT_STEP_GOAL);
        assert_eq!(report.average_steps, 8750);
        assert_eq!(report.max_steps, 12000);
        assert_eq!(report.goal_reach_rate, 75.0);
        assert_eq!(report.average_calories, Some(302));
        assert_eq!(report.average_active_minutes, Some(30));
        assert!(report
            .summary
            .starts_with("Averaging 8750 steps a day, activity is moderate, goal reached on 75% of days"));
    }

    #[test]
    fn custom_goal() {
        let input = days(&[6000, 9000, 8000, 12000]);
        let report = activity_report(&input, Some(10_000), &ReferenceTables::default()).unwrap();
        assert_eq!(report.goal_reach_rate, 25.0);
    }

    #[test]
    fn declining_activity_mentioned() {
        let steps: Vec<u32> = (0..10).map(|i| 12_000 - 800 * i).collect();
        let report = activity_report(&days(&steps), None, &ReferenceTables::default()).unwrap();
        assert_eq!(report.step_trend.direction, TrendDirection::Falling);
        assert!(report.summary.ends_with("activity is trending down"));
    }

    #[test]
    fn constant_low_activity() {
        let report = activity_report(&days(&[3000; 5]), None, &ReferenceTables::default()).unwrap();
        assert_eq!(
            report.summary,
            "Averaging 3000 steps a day, try to move more, goal reached on 0% of days"
        );
    }

    #[test]
    fn no_days_rejected() {
        let err = activity_report(&[], None, &ReferenceTables::default()).unwrap_err();
        assert_eq!(err, InvalidSeriesError::Empty);
    }
}
