//! Type 2 diabetes risk over ten years (FINDRISC).
//!
//! Additive ordinal scoring; the total maps onto a fixed bucket whose
//! representative percentage is reported as-is.

use serde::{Deserialize, Serialize};

use crate::error::{InsufficientDataWarning, InvalidProfileError};
use crate::models::{AssessmentKind, FamilyHistory, FindriscBand, HealthProfile, ProfileField, RiskLevel, Sex};
use crate::profile::{check_range, is_present, validate_profile};
use crate::reference::{points_for, FindriscBucket, FindriscTable, ReferenceTables};

use super::assess::flag_or_default;
use super::messages::Advice;
use super::types::{FindriscItem, RecommendationList, RiskAssessmentResult, RiskDetail, RiskFactor};

pub const DIABETES_FIELDS: &[ProfileField] = &[
    ProfileField::Age,
    ProfileField::Sex,
    ProfileField::Bmi,
    ProfileField::WaistCm,
];

/// Weekly minutes that count as daily activity when no frequency is recorded.
const ACTIVE_MINUTES_PER_WEEK: u32 = 210;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiabetesInput {
    pub age: u32,
    pub sex: Sex,
    pub bmi: f64,
    pub waist_cm: f64,
    pub on_bp_medication: bool,
    pub history_high_glucose: bool,
    pub daily_physical_activity: bool,
    pub daily_fruit_vegetable: bool,
    pub family_history: FamilyHistory,
}

const FALLBACK_BUCKET: FindriscBucket = FindriscBucket {
    min_score: 0,
    level: RiskLevel::Low,
    band: FindriscBand::Low,
    percentage: 1.0,
};

/// Bucket for a FINDRISC total.
pub fn findrisc_bucket(total: u8, table: &FindriscTable) -> &FindriscBucket {
    table.bucket_for(total).unwrap_or(&FALLBACK_BUCKET)
}

pub fn calculate_diabetes(
    input: &DiabetesInput,
    tables: &ReferenceTables,
) -> Result<RiskAssessmentResult, InvalidProfileError> {
    calculate_with_warnings(input, tables, Vec::new())
}

/// Validate `profile` and score it. Prior hyperglycemia falls back to the
/// fasting glucose reading; activity falls back to weekly exercise minutes.
pub fn assess_diabetes(
    profile: &HealthProfile,
    tables: &ReferenceTables,
) -> Result<RiskAssessmentResult, InvalidProfileError> {
    let p = validate_profile(profile, DIABETES_FIELDS, tables)?;
    let mut warnings = Vec::new();

    let (Some(age), Some(sex), Some(bmi), Some(waist_cm)) = (p.age, p.sex, p.bmi, p.waist_cm) else {
        let field = DIABETES_FIELDS
            .iter()
            .copied()
            .find(|f| !is_present(&p, *f))
            .unwrap_or(ProfileField::Age);
        return Err(InvalidProfileError::MissingField(field));
    };

    let history_high_glucose = p.history_high_glucose.or_else(|| {
        p.fasting_glucose
            .map(|g| g >= tables.metabolic.fasting_glucose_from)
    });

    let daily_physical_activity = match (p.exercise_frequency, p.exercise_minutes_per_week) {
        (None, None) => None,
        (freq, minutes) => Some(
            freq.is_some_and(|f| f.is_active())
                || minutes.is_some_and(|m| m >= ACTIVE_MINUTES_PER_WEEK),
        ),
    };

    let family_history = match p.family_diabetes {
        Some(history) => history,
        None => {
            warnings.push(InsufficientDataWarning::AssumedDefault {
                field: ProfileField::FamilyDiabetes,
                value: false,
            });
            FamilyHistory::None
        }
    };

    let input = DiabetesInput {
        age,
        sex,
        bmi,
        waist_cm,
        on_bp_medication: flag_or_default(
            p.on_bp_medication,
            ProfileField::OnBpMedication,
            false,
            &mut warnings,
        ),
        history_high_glucose: flag_or_default(
            history_high_glucose,
            ProfileField::HistoryHighGlucose,
            false,
            &mut warnings,
        ),
        daily_physical_activity: flag_or_default(
            daily_physical_activity,
            ProfileField::ExerciseFrequency,
            false,
            &mut warnings,
        ),
        daily_fruit_vegetable: flag_or_default(
            p.daily_fruit_vegetable,
            ProfileField::DailyFruitVegetable,
            true,
            &mut warnings,
        ),
        family_history,
    };

    calculate_with_warnings(&input, tables, warnings)
}

fn calculate_with_warnings(
    input: &DiabetesInput,
    tables: &ReferenceTables,
    warnings: Vec<InsufficientDataWarning>,
) -> Result<RiskAssessmentResult, InvalidProfileError> {
    check_range(ProfileField::Age, f64::from(input.age), tables)?;
    check_range(ProfileField::Bmi, input.bmi, tables)?;
    check_range(ProfileField::WaistCm, input.waist_cm, tables)?;

    let t = &tables.findrisc;
    let breakdown = score_items(input, t);
    let total = breakdown
        .iter()
        .map(|i| u32::from(i.points))
        .sum::<u32>()
        .min(u32::from(t.max_score)) as u8;

    let bucket = findrisc_bucket(total, t);
    let risk_index = if t.max_score == 0 {
        0
    } else {
        (u32::from(total) * 100 / u32::from(t.max_score)).min(100) as u8
    };

    tracing::debug!(
        kind = "diabetes",
        total,
        band = %bucket.band,
        level = %bucket.level,
        "risk calculated"
    );

    Ok(RiskAssessmentResult {
        kind: AssessmentKind::Diabetes,
        risk_level: bucket.level,
        score: bucket.percentage,
        risk_percentage: Some(bucket.percentage),
        risk_index,
        factors: factors(input, &breakdown, tables),
        recommendations: recommendations(input, bucket.level, &breakdown),
        detail: RiskDetail::Findrisc {
            total_score: total,
            max_score: t.max_score,
            band: bucket.band,
            breakdown,
        },
        warnings,
    })
}

fn item(name: &str, value: impl Into<String>, points: u8) -> FindriscItem {
    FindriscItem {
        item: name.to_string(),
        value: value.into(),
        points,
    }
}

fn points_of(breakdown: &[FindriscItem], name: &str) -> u8 {
    breakdown
        .iter()
        .find(|i| i.item == name)
        .map(|i| i.points)
        .unwrap_or(0)
}

fn score_items(input: &DiabetesInput, t: &FindriscTable) -> Vec<FindriscItem> {
    let family_points = match input.family_history {
        FamilyHistory::None => 0,
        FamilyHistory::SecondDegree => t.family_second_degree,
        FamilyHistory::FirstDegree => t.family_first_degree,
    };
    vec![
        item("age", input.age.to_string(), points_for(&t.age, f64::from(input.age))),
        item("bmi", format!("{:.1}", input.bmi), points_for(&t.bmi, input.bmi)),
        item(
            "waist",
            format!("{:.0} cm", input.waist_cm),
            points_for(t.waist.get(input.sex), input.waist_cm),
        ),
        item(
            "physical_activity",
            input.daily_physical_activity.to_string(),
            if input.daily_physical_activity { 0 } else { t.physical_inactivity },
        ),
        item(
            "fruit_vegetable",
            input.daily_fruit_vegetable.to_string(),
            if input.daily_fruit_vegetable { 0 } else { t.low_fruit_vegetable },
        ),
        item(
            "bp_medication",
            input.on_bp_medication.to_string(),
            if input.on_bp_medication { t.bp_medication } else { 0 },
        ),
        item(
            "high_glucose_history",
            input.history_high_glucose.to_string(),
            if input.history_high_glucose { t.high_glucose_history } else { 0 },
        ),
        item("family_history", input.family_history.as_str(), family_points),
    ]
}

fn factors(input: &DiabetesInput, breakdown: &[FindriscItem], tables: &ReferenceTables) -> Vec<RiskFactor> {
    let t = &tables.findrisc;
    let mut factors = Vec::with_capacity(8);

    if input.age >= tables.cardiovascular.factor_bounds.age_concern_from {
        factors.push(RiskFactor::adverse("age_elevated", Advice::years(input.age)));
    } else {
        factors.push(RiskFactor::protective("age_moderate", Advice::years(input.age)));
    }

    let bmi_points = points_of(breakdown, "bmi");
    let bmi_top = t.bmi.iter().map(|b| b.points).max().unwrap_or(0);
    if bmi_points > 0 && bmi_points == bmi_top {
        factors.push(RiskFactor::adverse("bmi_obese", Advice::bmi_target(input.bmi)));
    } else if bmi_points > 0 {
        factors.push(RiskFactor::adverse("bmi_overweight", Advice::bmi_target(input.bmi)));
    } else {
        factors.push(RiskFactor::protective("bmi_normal", Advice::bmi(input.bmi)));
    }

    let waist_limit = t
        .waist
        .get(input.sex)
        .iter()
        .find(|b| b.points > 0)
        .map(|b| b.from)
        .unwrap_or(f64::INFINITY);
    if points_of(breakdown, "waist") > 0 {
        factors.push(RiskFactor::adverse("waist_large", Advice::waist(input.waist_cm, waist_limit)));
    } else {
        factors.push(RiskFactor::protective("waist_normal", format!("{:.0} cm", input.waist_cm)));
    }

    if input.daily_physical_activity {
        factors.push(RiskFactor::protective("physically_active", "at least 30 minutes daily"));
    } else {
        factors.push(RiskFactor::adverse("physically_inactive", "aim for 30 minutes daily"));
    }

    if input.daily_fruit_vegetable {
        factors.push(RiskFactor::protective("fruit_vegetable_daily", "eats vegetables or fruit daily"));
    } else {
        factors.push(RiskFactor::adverse("fruit_vegetable_low", "aim for vegetables or fruit daily"));
    }

    if input.history_high_glucose {
        factors.push(RiskFactor::adverse("high_glucose_history", "elevated blood sugar found before"));
    } else {
        factors.push(RiskFactor::protective("no_high_glucose_history", ""));
    }

    match input.family_history {
        FamilyHistory::FirstDegree => factors.push(RiskFactor::adverse(
            "family_diabetes_first_degree",
            "parent, sibling or child",
        )),
        FamilyHistory::SecondDegree => factors.push(RiskFactor::adverse(
            "family_diabetes_second_degree",
            "grandparent, aunt, uncle or cousin",
        )),
        FamilyHistory::None => factors.push(RiskFactor::protective("no_family_diabetes", "")),
    }

    if input.on_bp_medication {
        factors.push(RiskFactor::adverse("bp_medication", "hypertension is linked to diabetes risk"));
    }

    factors
}

fn recommendations(input: &DiabetesInput, level: RiskLevel, breakdown: &[FindriscItem]) -> Vec<String> {
    let mut list = RecommendationList::default();

    match level {
        RiskLevel::High => list.extend(Advice::DM_HIGH),
        RiskLevel::Medium => list.extend(Advice::DM_MEDIUM),
        RiskLevel::Low => {}
    }
    if points_of(breakdown, "bmi") > 0 {
        list.extend(Advice::WEIGHT);
    }
    if points_of(breakdown, "waist") > 0 {
        list.push(Advice::WAIST);
    }
    if !input.daily_physical_activity {
        list.extend(Advice::ACTIVITY);
    }
    if !input.daily_fruit_vegetable {
        list.push(Advice::FRUIT_VEG);
    }
    if input.history_high_glucose {
        list.push(Advice::GLUCOSE_HISTORY);
    }
    list.extend(Advice::DM_GENERAL);

    list.finish()
}
