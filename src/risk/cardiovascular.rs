//! 10-year general cardiovascular risk (Framingham, D'Agostino 2008).
//!
//! `p = 1 - S0^exp(L - M)` where `L` sums the sex-specific coefficients times
//! the log-transformed age, total cholesterol, HDL and systolic pressure, plus
//! the smoking and diabetes indicator terms.

use serde::{Deserialize, Serialize};

use crate::error::{InsufficientDataWarning, InvalidProfileError};
use crate::models::{AssessmentKind, HealthProfile, ProfileField, RiskLevel, Sex};
use crate::profile::{check_range, validate_profile};
use crate::reference::ReferenceTables;

use super::assess::flag_or_default;
use super::messages::Advice;
use super::types::{RecommendationList, RiskAssessmentResult, RiskDetail, RiskFactor};

/// Fields without which the formula cannot run.
pub const CARDIOVASCULAR_FIELDS: &[ProfileField] = &[
    ProfileField::Age,
    ProfileField::Sex,
    ProfileField::TotalCholesterol,
    ProfileField::HdlCholesterol,
    ProfileField::SystolicBp,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardiovascularInput {
    pub age: u32,
    pub sex: Sex,
    /// mg/dL
    pub total_cholesterol: f64,
    /// mg/dL
    pub hdl_cholesterol: f64,
    /// mmHg
    pub systolic_bp: f64,
    pub on_bp_medication: bool,
    pub is_smoker: bool,
    pub has_diabetes: bool,
}

/// Run the Framingham formula over a typed input.
pub fn calculate_cardiovascular(
    input: &CardiovascularInput,
    tables: &ReferenceTables,
) -> Result<RiskAssessmentResult, InvalidProfileError> {
    calculate_with_warnings(input, tables, Vec::new())
}

/// Validate `profile`, map it onto `CardiovascularInput` and score it.
pub fn assess_cardiovascular(
    profile: &HealthProfile,
    tables: &ReferenceTables,
) -> Result<RiskAssessmentResult, InvalidProfileError> {
    let p = validate_profile(profile, CARDIOVASCULAR_FIELDS, tables)?;
    let mut warnings = Vec::new();

    let (Some(age), Some(sex), Some(tc), Some(hdl), Some(sbp)) = (
        p.age,
        p.sex,
        p.total_cholesterol,
        p.hdl_cholesterol,
        p.systolic_bp,
    ) else {
        return Err(missing_field(&p));
    };

    let input = CardiovascularInput {
        age,
        sex,
        total_cholesterol: tc,
        hdl_cholesterol: hdl,
        systolic_bp: sbp,
        on_bp_medication: flag_or_default(
            p.on_bp_medication,
            ProfileField::OnBpMedication,
            false,
            &mut warnings,
        ),
        is_smoker: flag_or_default(
            p.is_current_smoker(),
            ProfileField::SmokingStatus,
            false,
            &mut warnings,
        ),
        has_diabetes: flag_or_default(p.has_diabetes, ProfileField::HasDiabetes, false, &mut warnings),
    };

    calculate_with_warnings(&input, tables, warnings)
}

fn missing_field(p: &HealthProfile) -> InvalidProfileError {
    let field = CARDIOVASCULAR_FIELDS
        .iter()
        .copied()
        .find(|f| !crate::profile::is_present(p, *f))
        .unwrap_or(ProfileField::Age);
    InvalidProfileError::MissingField(field)
}

fn calculate_with_warnings(
    input: &CardiovascularInput,
    tables: &ReferenceTables,
    mut warnings: Vec<InsufficientDataWarning>,
) -> Result<RiskAssessmentResult, InvalidProfileError> {
    check_range(ProfileField::Age, f64::from(input.age), tables)?;
    check_range(ProfileField::TotalCholesterol, input.total_cholesterol, tables)?;
    check_range(ProfileField::HdlCholesterol, input.hdl_cholesterol, tables)?;
    check_range(ProfileField::SystolicBp, input.systolic_bp, tables)?;

    let table = &tables.cardiovascular;
    let c = table.coefficients.get(input.sex);

    let age_used = input
        .age
        .clamp(table.validated_age_min, table.validated_age_max);
    if age_used != input.age {
        warnings.push(InsufficientDataWarning::AgeOutsideValidatedRange {
            age: input.age,
            min: table.validated_age_min,
            max: table.validated_age_max,
        });
    }

    let sbp_coefficient = if input.on_bp_medication {
        c.ln_sbp_treated
    } else {
        c.ln_sbp_untreated
    };

    let mut l = c.ln_age * f64::from(age_used).ln()
        + c.ln_total_cholesterol * input.total_cholesterol.ln()
        + c.ln_hdl * input.hdl_cholesterol.ln()
        + sbp_coefficient * input.systolic_bp.ln();
    if input.is_smoker {
        l += c.smoker;
    }
    if input.has_diabetes {
        l += c.diabetes;
    }

    let probability = 1.0 - c.baseline_survival.powf((l - c.mean_coefficient_sum).exp());
    let percentage = round1((probability * 100.0).clamp(0.0, 100.0));

    let risk_level = if percentage >= table.high_from {
        RiskLevel::High
    } else if percentage >= table.medium_from {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };
    let risk_index = (percentage * 3.0).round().min(100.0) as u8;

    tracing::debug!(
        kind = "cardiovascular",
        percentage,
        level = %risk_level,
        low_confidence = !warnings.is_empty(),
        "risk calculated"
    );

    Ok(RiskAssessmentResult {
        kind: AssessmentKind::Cardiovascular,
        risk_level,
        score: percentage,
        risk_percentage: Some(percentage),
        risk_index,
        factors: factors(input, tables),
        recommendations: recommendations(input, risk_level, tables),
        detail: RiskDetail::Framingham {
            coefficient_sum: l,
            mean_coefficient_sum: c.mean_coefficient_sum,
            baseline_survival: c.baseline_survival,
            age_used,
            treated_bp: input.on_bp_medication,
        },
        warnings,
    })
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn factors(input: &CardiovascularInput, tables: &ReferenceTables) -> Vec<RiskFactor> {
    let b = &tables.cardiovascular.factor_bounds;
    let mut factors = Vec::with_capacity(7);

    if input.age >= b.age_concern_from {
        factors.push(RiskFactor::adverse("age_elevated", Advice::years(input.age)));
    } else {
        factors.push(RiskFactor::protective("age_moderate", Advice::years(input.age)));
    }

    let tc = input.total_cholesterol;
    let tc_target = format!("< {}", b.total_cholesterol_borderline);
    if tc >= b.total_cholesterol_high {
        factors.push(RiskFactor::adverse(
            "total_cholesterol_high",
            Advice::mg_dl_target(tc, &tc_target),
        ));
    } else if tc >= b.total_cholesterol_borderline {
        factors.push(RiskFactor::adverse("total_cholesterol_borderline", Advice::mg_dl(tc)));
    } else {
        factors.push(RiskFactor::protective("total_cholesterol_normal", Advice::mg_dl(tc)));
    }

    let hdl = input.hdl_cholesterol;
    if hdl < b.hdl_low_below {
        factors.push(RiskFactor::adverse(
            "hdl_low",
            Advice::mg_dl_target(hdl, &format!(">= {}", b.hdl_low_below)),
        ));
    } else if hdl >= b.hdl_good_from {
        factors.push(RiskFactor::protective("hdl_good", Advice::mg_dl(hdl)));
    } else {
        factors.push(RiskFactor::protective("hdl_normal", Advice::mg_dl(hdl)));
    }

    let sbp = input.systolic_bp;
    if sbp >= b.systolic_high {
        factors.push(RiskFactor::adverse(
            "blood_pressure_high",
            Advice::mmhg_target(sbp, &format!("< {}", b.systolic_high)),
        ));
    } else if sbp >= b.systolic_borderline {
        factors.push(RiskFactor::adverse("blood_pressure_borderline", Advice::mmhg(sbp)));
    } else {
        factors.push(RiskFactor::protective("blood_pressure_normal", Advice::mmhg(sbp)));
    }

    if input.is_smoker {
        factors.push(RiskFactor::adverse("smoker", "smoking markedly raises cardiovascular risk"));
    } else {
        factors.push(RiskFactor::protective("non_smoker", ""));
    }

    if input.has_diabetes {
        factors.push(RiskFactor::adverse("diabetes", "diabetes raises cardiovascular risk"));
    } else {
        factors.push(RiskFactor::protective("no_diabetes", ""));
    }

    if input.on_bp_medication {
        factors.push(RiskFactor::adverse("bp_medication", "indicates a history of hypertension"));
    }

    factors
}

fn recommendations(
    input: &CardiovascularInput,
    level: RiskLevel,
    tables: &ReferenceTables,
) -> Vec<String> {
    let b = &tables.cardiovascular.factor_bounds;
    let mut list = RecommendationList::default();

    match level {
        RiskLevel::High => list.extend(Advice::CV_HIGH),
        RiskLevel::Medium => list.extend(Advice::CV_MEDIUM),
        RiskLevel::Low => {}
    }
    if input.total_cholesterol >= b.total_cholesterol_borderline {
        list.extend(Advice::CHOLESTEROL);
    }
    if input.hdl_cholesterol < b.hdl_low_below {
        list.extend(Advice::LOW_HDL);
    }
    if input.systolic_bp >= b.systolic_borderline {
        list.extend(Advice::BLOOD_PRESSURE);
    }
    if input.is_smoker {
        list.push(Advice::QUIT_SMOKING);
    }
    if input.has_diabetes {
        list.push(Advice::DIABETES_CONTROL);
    }
    list.extend(Advice::CV_GENERAL);

    list.finish()
}
