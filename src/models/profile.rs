use serde::{Deserialize, Serialize};

use super::enums::{AlcoholFrequency, ExerciseFrequency, FamilyHistory, Sex, SmokingStatus};

/// Baseline clinical attributes of one user, as supplied by the profile store.
///
/// Every field is optional: an absent value means "not recorded", never zero.
/// Units: centimetres, kilograms, mmHg, mg/dL for lipids, mmol/L for fasting
/// glucose, percent for HbA1c.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthProfile {
    pub age: Option<u32>,
    pub sex: Option<Sex>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub bmi: Option<f64>,
    pub waist_cm: Option<f64>,

    pub systolic_bp: Option<f64>,
    pub diastolic_bp: Option<f64>,
    pub on_bp_medication: Option<bool>,
    pub on_lipid_medication: Option<bool>,
    pub on_glucose_medication: Option<bool>,

    pub total_cholesterol: Option<f64>,
    pub hdl_cholesterol: Option<f64>,
    pub ldl_cholesterol: Option<f64>,
    pub triglycerides: Option<f64>,
    pub fasting_glucose: Option<f64>,
    pub hba1c: Option<f64>,

    pub smoking_status: Option<SmokingStatus>,
    pub smoking_years: Option<u32>,
    pub alcohol_frequency: Option<AlcoholFrequency>,
    pub exercise_frequency: Option<ExerciseFrequency>,
    pub exercise_minutes_per_week: Option<u32>,

    pub has_diabetes: Option<bool>,
    pub has_hypertension: Option<bool>,
    pub has_heart_disease: Option<bool>,
    pub history_high_glucose: Option<bool>,
    pub family_diabetes: Option<FamilyHistory>,
    pub family_hypertension: Option<bool>,
    pub family_heart_disease: Option<bool>,

    pub daily_fruit_vegetable: Option<bool>,
    pub high_salt_diet: Option<bool>,
}

impl HealthProfile {
    /// `true` only when a current smoker is recorded.
    pub fn is_current_smoker(&self) -> Option<bool> {
        self.smoking_status.map(|s| s == SmokingStatus::Current)
    }
}

/// A profile that passed validation for a specific calculator.
///
/// Fields keep their `Option` shape; the validator guarantees that every
/// field in the requested set is present and every present field is in range.
/// BMI is derived from height and weight when it was not recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedProfile {
    pub(crate) inner: HealthProfile,
    pub bmi_derived: bool,
}

impl ValidatedProfile {
    pub fn profile(&self) -> &HealthProfile {
        &self.inner
    }

    pub fn into_inner(self) -> HealthProfile {
        self.inner
    }
}

impl std::ops::Deref for ValidatedProfile {
    type Target = HealthProfile;

    fn deref(&self) -> &HealthProfile {
        &self.inner
    }
}
