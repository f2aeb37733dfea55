use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::error::AnalyticsError;
use crate::models::{
    AssessmentKind, HealthProfile, MetricPoint, MetricSeries, MetricType, ProfileField, RiskLevel,
    Severity,
};
use crate::reference::ReferenceTables;
use crate::risk::{assess, RiskAssessmentResult};
use crate::score::{health_score, HealthScoreResult};

use super::activity::{activity_report, ActivityDay, ActivityReport};
use super::metric::{metric_report, MetricReport};
use super::sleep::{sleep_report, SleepNight, SleepReport};

/// Anomalies shown on the dashboard; `anomaly_count` keeps the full total.
pub const MAX_DASHBOARD_ANOMALIES: usize = 10;
pub const MAX_DASHBOARD_RECOMMENDATIONS: usize = 6;

const LOW_SCORE_FROM: u8 = 60;
const SHORT_SLEEP_AVERAGE: f64 = 6.0;
const POOR_SLEEP_QUALITY: u8 = 60;
const LOW_ACTIVITY_STEPS: u32 = 5000;
const LOW_GOAL_REACH_RATE: f64 = 50.0;
const HEART_RATE_ANOMALY_LIMIT: usize = 3;

const REC_LOW_SCORE: &str = "Your health score is low. Consider a full medical check-up.";
const REC_SHORT_SLEEP: &str = "You are sleeping too little. Aim for 7-8 hours a night.";
const REC_POOR_SLEEP: &str =
    "Sleep quality is poor. Keep a regular bedtime and avoid screens before sleep.";
const REC_LOW_ACTIVITY: &str = "Daily activity is low. Walk at least 6000 steps a day.";
const REC_LOW_GOAL: &str = "Your step goal is rarely reached. Set a goal you can keep and build up.";
const REC_HEART_RATE: &str =
    "Your heart rate has varied a lot recently. Keep a note of unusual readings.";
const REC_KEEP_GOING: &str = "Keep up your healthy habits.";
const REC_CHECK_UP: &str = "Have regular health check-ups.";

/// Everything known about one user at dashboard time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSnapshot {
    pub profile: HealthProfile,
    /// Latest representative values; they take precedence over the last
    /// point of the matching series.
    pub latest_values: BTreeMap<MetricType, f64>,
    pub series: BTreeMap<MetricType, Vec<MetricPoint>>,
    pub sleep: Vec<SleepNight>,
    pub activity: Vec<ActivityDay>,
    pub step_goal: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AssessmentOutcome {
    Complete { result: RiskAssessmentResult },
    /// The profile cannot feed this calculator yet.
    Incomplete { field: ProfileField, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardAnomaly {
    /// Metric tag, or `sleep` for per-night flags.
    pub source: String,
    pub date: String,
    pub value: f64,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub assessments: BTreeMap<AssessmentKind, AssessmentOutcome>,
    /// Absent when no scorable metric was supplied.
    pub health_score: Option<HealthScoreResult>,
    pub metrics: BTreeMap<MetricType, MetricReport>,
    pub sleep: Option<SleepReport>,
    pub activity: Option<ActivityReport>,
    pub anomalies: Vec<DashboardAnomaly>,
    pub anomaly_count: usize,
    pub recommendations: Vec<String>,
    pub generated_at: NaiveDateTime,
}

async fn join<T>(handle: JoinHandle<T>) -> Result<T, AnalyticsError> {
    handle
        .await
        .map_err(|e| AnalyticsError::TaskFailed(e.to_string()))
}

/// Explicit latest values first, then the last point of each series, the
/// last night and the last day.
fn latest_values(
    explicit: &BTreeMap<MetricType, f64>,
    series: &BTreeMap<MetricType, MetricSeries>,
    sleep: &[SleepNight],
    activity: &[ActivityDay],
) -> BTreeMap<MetricType, f64> {
    let mut latest = explicit.clone();
    for (metric, s) in series {
        if let Some(point) = s.latest() {
            latest.entry(*metric).or_insert(point.value);
        }
    }
    if let Some(night) = sleep.last() {
        latest
            .entry(MetricType::SleepDuration)
            .or_insert(night.duration_hours);
    }
    if let Some(day) = activity.last() {
        latest
            .entry(MetricType::Steps)
            .or_insert(f64::from(day.steps));
    }
    latest
}

fn collect_anomalies(
    metrics: &BTreeMap<MetricType, MetricReport>,
    sleep: Option<&SleepReport>,
) -> Vec<DashboardAnomaly> {
    let mut all: Vec<DashboardAnomaly> = metrics
        .values()
        .flat_map(|report| {
            report.anomalies.anomalies.iter().map(|a| DashboardAnomaly {
                source: report.metric.as_str().to_string(),
                date: a.date.clone(),
                value: a.value,
                severity: a.severity,
                message: a.message.clone(),
            })
        })
        .collect();
    if let Some(sleep) = sleep {
        all.extend(sleep.anomalies.iter().map(|a| DashboardAnomaly {
            source: "sleep".to_string(),
            date: a.date.format("%Y-%m-%d").to_string(),
            value: a.value,
            severity: Severity::Warning,
            message: a.message.clone(),
        }));
    }
    all
}

fn push_unique(out: &mut Vec<String>, text: &str) {
    if !out.iter().any(|r| r == text) {
        out.push(text.to_string());
    }
}

fn recommendations(
    score: Option<&HealthScoreResult>,
    assessments: &BTreeMap<AssessmentKind, AssessmentOutcome>,
    metrics: &BTreeMap<MetricType, MetricReport>,
    sleep: Option<&SleepReport>,
    activity: Option<&ActivityReport>,
) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();

    if score.is_some_and(|s| s.overall_score < LOW_SCORE_FROM) {
        push_unique(&mut out, REC_LOW_SCORE);
    }
    for outcome in assessments.values() {
        if let AssessmentOutcome::Complete { result } = outcome {
            if result.risk_level == RiskLevel::High {
                if let Some(first) = result.recommendations.first() {
                    push_unique(&mut out, first.as_str());
                }
            }
        }
    }
    if let Some(sleep) = sleep {
        if sleep.average_duration < SHORT_SLEEP_AVERAGE {
            push_unique(&mut out, REC_SHORT_SLEEP);
        }
        if sleep
            .quality
            .as_ref()
            .is_some_and(|q| q.average < POOR_SLEEP_QUALITY)
        {
            push_unique(&mut out, REC_POOR_SLEEP);
        }
    }
    if let Some(activity) = activity {
        if activity.average_steps < LOW_ACTIVITY_STEPS {
            push_unique(&mut out, REC_LOW_ACTIVITY);
        }
        if activity.goal_reach_rate < LOW_GOAL_REACH_RATE {
            push_unique(&mut out, REC_LOW_GOAL);
        }
    }
    if metrics
        .get(&MetricType::HeartRate)
        .is_some_and(|r| r.anomalies.count > HEART_RATE_ANOMALY_LIMIT)
    {
        push_unique(&mut out, REC_HEART_RATE);
    }
    if out.is_empty() {
        push_unique(&mut out, REC_KEEP_GOING);
    }
    push_unique(&mut out, REC_CHECK_UP);

    out.truncate(MAX_DASHBOARD_RECOMMENDATIONS);
    out
}

/// Run every assessment, the health score and every report concurrently on
/// blocking worker tasks.
///
/// Profile problems are reported per assessment and never fail the run.
/// Malformed series do, as does a worker task that panics.
pub async fn analyze_dashboard(
    snapshot: DashboardSnapshot,
    tables: Arc<ReferenceTables>,
) -> Result<Dashboard, AnalyticsError> {
    let started = Instant::now();
    let DashboardSnapshot {
        profile,
        latest_values: explicit,
        series,
        sleep,
        activity,
        step_goal,
    } = snapshot;

    let mut validated = BTreeMap::new();
    for (metric, points) in series {
        if points.is_empty() {
            continue;
        }
        validated.insert(metric, MetricSeries::new(points)?);
    }
    let latest = latest_values(&explicit, &validated, &sleep, &activity);

    let profile = Arc::new(profile);
    let assessment_tasks: Vec<_> = [
        AssessmentKind::Cardiovascular,
        AssessmentKind::Diabetes,
        AssessmentKind::Metabolic,
    ]
    .into_iter()
    .map(|kind| {
        let profile = Arc::clone(&profile);
        let tables = Arc::clone(&tables);
        (kind, tokio::task::spawn_blocking(move || assess(kind, &profile, &tables)))
    })
    .collect();

    let score_task = {
        let tables = Arc::clone(&tables);
        tokio::task::spawn_blocking(move || health_score(&latest, &tables))
    };

    let metric_tasks: Vec<_> = validated
        .into_iter()
        .map(|(metric, s)| {
            let tables = Arc::clone(&tables);
            (metric, tokio::task::spawn_blocking(move || metric_report(&s, metric, &tables)))
        })
        .collect();

    let sleep_task = (!sleep.is_empty()).then(|| {
        let tables = Arc::clone(&tables);
        tokio::task::spawn_blocking(move || sleep_report(&sleep, &tables))
    });

    let activity_task = (!activity.is_empty()).then(|| {
        let tables = Arc::clone(&tables);
        tokio::task::spawn_blocking(move || activity_report(&activity, step_goal, &tables))
    });

    let mut assessments = BTreeMap::new();
    for (kind, task) in assessment_tasks {
        let outcome = match join(task).await? {
            Ok(result) => AssessmentOutcome::Complete { result },
            Err(e) => AssessmentOutcome::Incomplete {
                field: e.field(),
                reason: e.to_string(),
            },
        };
        assessments.insert(kind, outcome);
    }

    let health_score = match join(score_task).await? {
        Ok(score) => Some(score),
        Err(AnalyticsError::NoScorableMetrics) => None,
        Err(e) => return Err(e),
    };

    let mut metrics = BTreeMap::new();
    for (metric, task) in metric_tasks {
        metrics.insert(metric, join(task).await??);
    }

    let sleep = match sleep_task {
        Some(task) => Some(join(task).await??),
        None => None,
    };
    let activity = match activity_task {
        Some(task) => Some(join(task).await??),
        None => None,
    };

    let mut anomalies = collect_anomalies(&metrics, sleep.as_ref());
    let anomaly_count = anomalies.len();
    anomalies.truncate(MAX_DASHBOARD_ANOMALIES);

    let recommendations = recommendations(
        health_score.as_ref(),
        &assessments,
        &metrics,
        sleep.as_ref(),
        activity.as_ref(),
    );

    let complete = assessments
        .values()
        .filter(|o| matches!(o, AssessmentOutcome::Complete { .. }))
        .count();
    tracing::info!(
        assessments = complete,
        metrics = metrics.len(),
        anomalies = anomaly_count,
        score = health_score.as_ref().map(|s| s.overall_score),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "dashboard analyzed"
    );

    Ok(Dashboard {
        assessments,
        health_score,
        metrics,
        sleep,
        activity,
        anomalies,
        anomaly_count,
        recommendations,
        generated_at: Local::now().naive_local(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvalidSeriesError;
    use crate::models::{ExerciseFrequency, FamilyHistory, Sex, SmokingStatus};
    use chrono::{Duration, NaiveDate, NaiveTime};

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 7, 1).unwrap()
    }

    fn points(values: &[f64]) -> Vec<MetricPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                MetricPoint::new(
                    (start() + Duration::days(i as i64)).and_time(NaiveTime::MIN),
                    v,
                )
            })
            .collect()
    }

    fn profile() -> HealthProfile {
        HealthProfile {
            age: Some(55),
            sex: Some(Sex::Male),
            height_cm: Some(175.0),
            weight_kg: Some(80.0),
            waist_cm: Some(92.0),
            systolic_bp: Some(140.0),
            diastolic_bp: Some(88.0),
            on_bp_medication: Some(true),
            on_lipid_medication: Some(false),
            on_glucose_medication: Some(false),
            total_cholesterol: Some(240.0),
            hdl_cholesterol: Some(45.0),
            triglycerides: Some(130.0),
            fasting_glucose: Some(5.2),
            smoking_status: Some(SmokingStatus::Never),
            has_diabetes: Some(false),
            history_high_glucose: Some(false),
            daily_fruit_vegetable: Some(true),
            exercise_frequency: Some(ExerciseFrequency::Occasional),
            family_diabetes: Some(FamilyHistory::None),
            ..Default::default()
        }
    }

    fn tables() -> Arc<ReferenceTables> {
        Arc::new(ReferenceTables::default())
    }

    #[tokio::test]
    async fn full_snapshot() {
        let snapshot = DashboardSnapshot {
            profile: profile(),
            series: BTreeMap::from([(
                MetricType::HeartRate,
                points(&[70.0, 72.0, 71.0, 73.0, 72.0, 74.0, 73.0]),
            )]),
            sleep: (0..7)
                .map(|i| SleepNight {
                    date: start() + Duration::days(i),
                    duration_hours: 7.5,
                    quality_score: Some(85),
                    deep_sleep_hours: Some(1.5),
                    awake_count: Some(1),
                })
                .collect(),
            activity: (0..7)
                .map(|i| ActivityDay {
                    date: start() + Duration::days(i),
                    steps: 9000,
                    calories: None,
                    active_minutes: Some(40),
                })
                .collect(),
            ..Default::default()
        };
        let dashboard = analyze_dashboard(snapshot, tables()).await.unwrap();

        assert_eq!(dashboard.assessments.len(), 3);
        match &dashboard.assessments[&AssessmentKind::Cardiovascular] {
            AssessmentOutcome::Complete { result } => assert_eq!(result.risk_level, RiskLevel::High),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(matches!(
            dashboard.assessments[&AssessmentKind::Metabolic],
            AssessmentOutcome::Complete { .. }
        ));

        let score = dashboard.health_score.as_ref().unwrap();
        assert_eq!(score.category_scores.len(), 3);
        assert_eq!(score.overall_score, 100);

        assert!(dashboard.metrics.contains_key(&MetricType::HeartRate));
        assert!(dashboard.sleep.is_some());
        assert_eq!(dashboard.activity.as_ref().unwrap().goal_reach_rate, 100.0);
        assert_eq!(dashboard.anomaly_count, 0);

        // the high cardiovascular result contributes its lead recommendation
        assert_eq!(dashboard.recommendations.len(), 2);
        assert_eq!(dashboard.recommendations[1], REC_CHECK_UP);
    }

    #[tokio::test]
    async fn empty_profile_is_incomplete_not_fatal() {
        let dashboard = analyze_dashboard(DashboardSnapshot::default(), tables())
            .await
            .unwrap();
        let fields: Vec<ProfileField> = dashboard
            .assessments
            .values()
            .map(|o| match o {
                AssessmentOutcome::Incomplete { field, .. } => *field,
                other => panic!("unexpected outcome {other:?}"),
            })
            .collect();
        // cardiovascular, diabetes, metabolic
        assert_eq!(
            fields,
            vec![ProfileField::Age, ProfileField::Age, ProfileField::WaistCm]
        );
        assert!(dashboard.health_score.is_none());
        assert!(dashboard.metrics.is_empty());
        assert_eq!(dashboard.recommendations, vec![REC_KEEP_GOING, REC_CHECK_UP]);
    }

    #[tokio::test]
    async fn anomalies_capped_for_display() {
        let snapshot = DashboardSnapshot {
            series: BTreeMap::from([(MetricType::HeartRate, points(&[130.0; 12]))]),
            ..Default::default()
        };
        let dashboard = analyze_dashboard(snapshot, tables()).await.unwrap();
        assert_eq!(dashboard.anomaly_count, 12);
        assert_eq!(dashboard.anomalies.len(), MAX_DASHBOARD_ANOMALIES);
        assert!(dashboard
            .anomalies
            .iter()
            .all(|a| a.source == "heart_rate" && a.severity == Severity::Critical));
        assert!(dashboard.recommendations.contains(&REC_HEART_RATE.to_string()));
        assert!(dashboard.recommendations.contains(&REC_LOW_SCORE.to_string()));
    }

    #[tokio::test]
    async fn explicit_latest_value_wins() {
        let snapshot = DashboardSnapshot {
            latest_values: BTreeMap::from([(MetricType::HeartRate, 90.0)]),
            series: BTreeMap::from([(MetricType::HeartRate, points(&[70.0, 72.0]))]),
            ..Default::default()
        };
        let dashboard = analyze_dashboard(snapshot, tables()).await.unwrap();
        assert_eq!(dashboard.health_score.unwrap().overall_score, 85);
    }

    #[tokio::test]
    async fn malformed_series_fails() {
        let mut bad = points(&[70.0, 71.0]);
        bad.swap(0, 1);
        let snapshot = DashboardSnapshot {
            series: BTreeMap::from([(MetricType::HeartRate, bad)]),
            ..Default::default()
        };
        let err = analyze_dashboard(snapshot, tables()).await.unwrap_err();
        assert!(matches!(
            err,
            AnalyticsError::Series(InvalidSeriesError::NotAscending { index: 1, .. })
        ));
    }
}
