//! Metabolic syndrome (harmonized IDF / NCEP ATP III criteria, Asian waist
//! cut-offs). Five independent criteria; three or more is a diagnosis.

use serde::{Deserialize, Serialize};

use crate::error::{InsufficientDataWarning, InvalidProfileError};
use crate::models::{AssessmentKind, HealthProfile, ProfileField, RiskLevel, Sex};
use crate::profile::{check_range, is_present, validate_profile};
use crate::reference::ReferenceTables;

use super::assess::flag_or_default;
use super::messages::Advice;
use super::types::{MetabolicCriterion, RecommendationList, RiskAssessmentResult, RiskDetail, RiskFactor};

pub const METABOLIC_FIELDS: &[ProfileField] = &[
    ProfileField::WaistCm,
    ProfileField::Sex,
    ProfileField::Triglycerides,
    ProfileField::HdlCholesterol,
    ProfileField::SystolicBp,
    ProfileField::DiastolicBp,
    ProfileField::FastingGlucose,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetabolicInput {
    pub waist_cm: f64,
    pub sex: Sex,
    /// mg/dL
    pub triglycerides: f64,
    /// mg/dL
    pub hdl_cholesterol: f64,
    pub systolic_bp: f64,
    pub diastolic_bp: f64,
    /// mmol/L
    pub fasting_glucose: f64,
    pub on_bp_medication: bool,
    pub on_lipid_medication: bool,
    pub on_glucose_medication: bool,
}

// Criterion keys, also used to pick recommendations.
const CENTRAL_OBESITY: &str = "central_obesity";
const TRIGLYCERIDES: &str = "triglycerides_elevated";
const HDL: &str = "hdl_reduced";
const BLOOD_PRESSURE: &str = "blood_pressure_elevated";
const GLUCOSE: &str = "fasting_glucose_elevated";

pub fn calculate_metabolic(
    input: &MetabolicInput,
    tables: &ReferenceTables,
) -> Result<RiskAssessmentResult, InvalidProfileError> {
    calculate_with_warnings(input, tables, Vec::new())
}

/// Validate `profile` and evaluate it. A recorded diabetes diagnosis counts
/// as glucose treatment.
pub fn assess_metabolic(
    profile: &HealthProfile,
    tables: &ReferenceTables,
) -> Result<RiskAssessmentResult, InvalidProfileError> {
    let p = validate_profile(profile, METABOLIC_FIELDS, tables)?;
    let mut warnings = Vec::new();

    let (Some(waist_cm), Some(sex), Some(tg), Some(hdl), Some(sbp), Some(dbp), Some(fg)) = (
        p.waist_cm,
        p.sex,
        p.triglycerides,
        p.hdl_cholesterol,
        p.systolic_bp,
        p.diastolic_bp,
        p.fasting_glucose,
    ) else {
        let field = METABOLIC_FIELDS
            .iter()
            .copied()
            .find(|f| !is_present(&p, *f))
            .unwrap_or(ProfileField::WaistCm);
        return Err(InvalidProfileError::MissingField(field));
    };

    let glucose_treated = match (p.on_glucose_medication, p.has_diabetes) {
        (None, None) => None,
        (medication, diagnosis) => Some(medication == Some(true) || diagnosis == Some(true)),
    };

    let input = MetabolicInput {
        waist_cm,
        sex,
        triglycerides: tg,
        hdl_cholesterol: hdl,
        systolic_bp: sbp,
        diastolic_bp: dbp,
        fasting_glucose: fg,
        on_bp_medication: flag_or_default(
            p.on_bp_medication,
            ProfileField::OnBpMedication,
            false,
            &mut warnings,
        ),
        on_lipid_medication: flag_or_default(
            p.on_lipid_medication,
            ProfileField::OnLipidMedication,
            false,
            &mut warnings,
        ),
        on_glucose_medication: flag_or_default(
            glucose_treated,
            ProfileField::OnGlucoseMedication,
            false,
            &mut warnings,
        ),
    };

    calculate_with_warnings(&input, tables, warnings)
}

fn calculate_with_warnings(
    input: &MetabolicInput,
    tables: &ReferenceTables,
    warnings: Vec<InsufficientDataWarning>,
) -> Result<RiskAssessmentResult, InvalidProfileError> {
    check_range(ProfileField::WaistCm, input.waist_cm, tables)?;
    check_range(ProfileField::Triglycerides, input.triglycerides, tables)?;
    check_range(ProfileField::HdlCholesterol, input.hdl_cholesterol, tables)?;
    check_range(ProfileField::SystolicBp, input.systolic_bp, tables)?;
    check_range(ProfileField::DiastolicBp, input.diastolic_bp, tables)?;
    check_range(ProfileField::FastingGlucose, input.fasting_glucose, tables)?;

    let t = &tables.metabolic;
    let criteria = evaluate_criteria(input, tables);
    let criteria_met = criteria.iter().filter(|c| c.met).count() as u8;
    let has_metabolic_syndrome = criteria_met >= t.diagnosis_threshold;

    let risk_level = if criteria_met == 0 {
        RiskLevel::Low
    } else if has_metabolic_syndrome {
        RiskLevel::High
    } else {
        RiskLevel::Medium
    };

    tracing::debug!(
        kind = "metabolic",
        criteria_met,
        has_metabolic_syndrome,
        level = %risk_level,
        "risk calculated"
    );

    Ok(RiskAssessmentResult {
        kind: AssessmentKind::Metabolic,
        risk_level,
        score: f64::from(criteria_met),
        risk_percentage: None,
        risk_index: (u32::from(criteria_met) * 20).min(100) as u8,
        factors: factors(&criteria),
        recommendations: recommendations(&criteria, has_metabolic_syndrome),
        detail: RiskDetail::MetabolicSyndrome {
            criteria_met,
            has_metabolic_syndrome,
            criteria,
        },
        warnings,
    })
}

fn criterion(
    name: &str,
    value: String,
    threshold: String,
    abnormal: bool,
    on_treatment: bool,
) -> MetabolicCriterion {
    MetabolicCriterion {
        name: name.to_string(),
        value,
        threshold,
        abnormal,
        on_treatment,
        met: abnormal || on_treatment,
    }
}

fn evaluate_criteria(input: &MetabolicInput, tables: &ReferenceTables) -> Vec<MetabolicCriterion> {
    let t = &tables.metabolic;
    let waist_limit = *t.waist_cm.get(input.sex);
    let hdl_limit = *t.hdl_below.get(input.sex);

    vec![
        criterion(
            CENTRAL_OBESITY,
            format!("{:.0} cm", input.waist_cm),
            format!(">= {waist_limit} cm"),
            input.waist_cm >= waist_limit,
            false,
        ),
        criterion(
            TRIGLYCERIDES,
            format!("{:.0} mg/dL", input.triglycerides),
            format!(">= {} mg/dL or treated", t.triglycerides_from),
            input.triglycerides >= t.triglycerides_from,
            input.on_lipid_medication,
        ),
        criterion(
            HDL,
            format!("{:.0} mg/dL", input.hdl_cholesterol),
            format!("< {hdl_limit} mg/dL or treated"),
            input.hdl_cholesterol < hdl_limit,
            input.on_lipid_medication,
        ),
        criterion(
            BLOOD_PRESSURE,
            format!("{:.0}/{:.0} mmHg", input.systolic_bp, input.diastolic_bp),
            format!(">= {}/{} mmHg or treated", t.systolic_from, t.diastolic_from),
            input.systolic_bp >= t.systolic_from || input.diastolic_bp >= t.diastolic_from,
            input.on_bp_medication,
        ),
        criterion(
            GLUCOSE,
            format!("{:.1} mmol/L", input.fasting_glucose),
            format!(">= {} mmol/L or treated", t.fasting_glucose_from),
            input.fasting_glucose >= t.fasting_glucose_from,
            input.on_glucose_medication,
        ),
    ]
}

fn factors(criteria: &[MetabolicCriterion]) -> Vec<RiskFactor> {
    criteria
        .iter()
        .map(|c| {
            if c.met {
                RiskFactor::adverse(&c.name, format!("{} ({})", c.value, c.threshold))
            } else {
                RiskFactor::protective(&format!("{}_normal", c.name), c.value.clone())
            }
        })
        .collect()
}

fn recommendations(criteria: &[MetabolicCriterion], has_syndrome: bool) -> Vec<String> {
    let mut list = RecommendationList::default();

    if has_syndrome {
        list.extend(Advice::MS_POSITIVE);
    }
    for c in criteria.iter().filter(|c| c.met) {
        match c.name.as_str() {
            CENTRAL_OBESITY => list.extend(Advice::MS_WAIST),
            TRIGLYCERIDES => list.extend(Advice::MS_TRIGLYCERIDES),
            HDL => list.extend(Advice::MS_HDL),
            BLOOD_PRESSURE => list.extend(Advice::MS_BLOOD_PRESSURE),
            GLUCOSE => list.extend(Advice::MS_GLUCOSE),
            _ => {}
        }
    }
    if !has_syndrome {
        list.push(Advice::MS_PREVENT);
    }
    list.push(Advice::MS_GENERAL);

    list.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> ReferenceTables {
        ReferenceTables::default()
    }

    fn healthy_male() -> MetabolicInput {
        MetabolicInput {
            waist_cm: 84.0,
            sex: Sex::Male,
            triglycerides: 110.0,
            hdl_cholesterol: 55.0,
            systolic_bp: 118.0,
            diastolic_bp: 76.0,
            fasting_glucose: 5.0,
            on_bp_medication: false,
            on_lipid_medication: false,
            on_glucose_medication: false,
        }
    }

    fn detail(result: &RiskAssessmentResult) -> (u8, bool) {
        match &result.detail {
            RiskDetail::MetabolicSyndrome {
                criteria_met,
                has_metabolic_syndrome,
                ..
            } => (*criteria_met, *has_metabolic_syndrome),
            other => panic!("unexpected detail {other:?}"),
        }
    }

    #[test]
    fn no_criteria_is_low() {
        let result = calculate_metabolic(&healthy_male(), &tables()).unwrap();
        assert_eq!(detail(&result), (0, false));
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert_eq!(result.risk_percentage, None);
        assert_eq!(result.risk_index, 0);
        assert!(result.factors.iter().all(|f| f.positive));
    }

    #[test]
    fn two_criteria_is_medium_without_diagnosis() {
        let input = MetabolicInput {
            waist_cm: 92.0,
            triglycerides: 160.0,
            ..healthy_male()
        };
        let result = calculate_metabolic(&input, &tables()).unwrap();
        assert_eq!(detail(&result), (2, false));
        assert_eq!(result.risk_level, RiskLevel::Medium);
        assert_eq!(result.score, 2.0);
    }

    #[test]
    fn three_criteria_is_diagnosis() {
        let input = MetabolicInput {
            waist_cm: 92.0,
            triglycerides: 160.0,
            diastolic_bp: 85.0,
            ..healthy_male()
        };
        let result = calculate_metabolic(&input, &tables()).unwrap();
        assert_eq!(detail(&result), (3, true));
        assert_eq!(result.risk_level, RiskLevel::High);
        assert_eq!(result.risk_index, 60);
        assert_eq!(result.recommendations[0], Advice::MS_POSITIVE[0]);
    }

    #[test]
    fn diagnosis_iff_three_or_more() {
        let toggles: [fn(&mut MetabolicInput); 5] = [
            |i| i.waist_cm = 100.0,
            |i| i.triglycerides = 200.0,
            |i| i.hdl_cholesterol = 30.0,
            |i| i.systolic_bp = 140.0,
            |i| i.fasting_glucose = 6.0,
        ];
        for mask in 0u32..32 {
            let mut input = healthy_male();
            for (bit, toggle) in toggles.iter().enumerate() {
                if mask & (1 << bit) != 0 {
                    toggle(&mut input);
                }
            }
            let result = calculate_metabolic(&input, &tables()).unwrap();
            let (met, diagnosed) = detail(&result);
            assert_eq!(u32::from(met), mask.count_ones());
            assert!(met <= 5);
            assert_eq!(diagnosed, met >= 3);
        }
    }

    #[test]
    fn female_thresholds_are_stricter() {
        let female = MetabolicInput {
            sex: Sex::Female,
            waist_cm: 82.0,
            hdl_cholesterol: 45.0,
            ..healthy_male()
        };
        let result = calculate_metabolic(&female, &tables()).unwrap();
        assert_eq!(detail(&result), (2, false));
    }

    #[test]
    fn treatment_counts_even_with_normal_values() {
        let input = MetabolicInput {
            on_lipid_medication: true,
            on_bp_medication: true,
            ..healthy_male()
        };
        let result = calculate_metabolic(&input, &tables()).unwrap();
        // lipid treatment satisfies both the triglyceride and HDL criteria
        assert_eq!(detail(&result), (3, true));
        match &result.detail {
            RiskDetail::MetabolicSyndrome { criteria, .. } => {
                let tg = &criteria[1];
                assert!(!tg.abnormal);
                assert!(tg.on_treatment);
                assert!(tg.met);
            }
            other => panic!("unexpected detail {other:?}"),
        }
    }

    #[test]
    fn profile_adapter_treats_diabetes_as_glucose_treatment() {
        let profile = HealthProfile {
            waist_cm: Some(84.0),
            sex: Some(Sex::Male),
            triglycerides: Some(110.0),
            hdl_cholesterol: Some(55.0),
            systolic_bp: Some(118.0),
            diastolic_bp: Some(76.0),
            fasting_glucose: Some(5.0),
            on_bp_medication: Some(false),
            on_lipid_medication: Some(false),
            has_diabetes: Some(true),
            ..Default::default()
        };
        let result = assess_metabolic(&profile, &tables()).unwrap();
        assert_eq!(detail(&result), (1, false));
        assert!(result.warnings.is_empty());
        assert!(result.factors.iter().any(|f| f.name == GLUCOSE && !f.positive));
    }

    #[test]
    fn profile_adapter_requires_triglycerides() {
        let profile = HealthProfile {
            waist_cm: Some(84.0),
            sex: Some(Sex::Male),
            ..Default::default()
        };
        let err = assess_metabolic(&profile, &tables()).unwrap_err();
        assert_eq!(err, InvalidProfileError::MissingField(ProfileField::Triglycerides));
    }
}
