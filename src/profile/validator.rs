use crate::error::InvalidProfileError;
use crate::models::{HealthProfile, ProfileField, ValidatedProfile};
use crate::reference::ReferenceTables;

/// Numeric fields checked against `ReferenceTables::profile_ranges`.
fn numeric_fields(p: &HealthProfile) -> [(ProfileField, Option<f64>); 15] {
    [
        (ProfileField::Age, p.age.map(f64::from)),
        (ProfileField::HeightCm, p.height_cm),
        (ProfileField::WeightKg, p.weight_kg),
        (ProfileField::Bmi, p.bmi),
        (ProfileField::WaistCm, p.waist_cm),
        (ProfileField::SystolicBp, p.systolic_bp),
        (ProfileField::DiastolicBp, p.diastolic_bp),
        (ProfileField::TotalCholesterol, p.total_cholesterol),
        (ProfileField::HdlCholesterol, p.hdl_cholesterol),
        (ProfileField::LdlCholesterol, p.ldl_cholesterol),
        (ProfileField::Triglycerides, p.triglycerides),
        (ProfileField::FastingGlucose, p.fasting_glucose),
        (ProfileField::Hba1c, p.hba1c),
        (ProfileField::SmokingYears, p.smoking_years.map(f64::from)),
        (
            ProfileField::ExerciseMinutesPerWeek,
            p.exercise_minutes_per_week.map(f64::from),
        ),
    ]
}

/// Whether `field` carries a value in `p`.
pub fn is_present(p: &HealthProfile, field: ProfileField) -> bool {
    match field {
        ProfileField::Age => p.age.is_some(),
        ProfileField::Sex => p.sex.is_some(),
        ProfileField::HeightCm => p.height_cm.is_some(),
        ProfileField::WeightKg => p.weight_kg.is_some(),
        ProfileField::Bmi => p.bmi.is_some(),
        ProfileField::WaistCm => p.waist_cm.is_some(),
        ProfileField::SystolicBp => p.systolic_bp.is_some(),
        ProfileField::DiastolicBp => p.diastolic_bp.is_some(),
        ProfileField::OnBpMedication => p.on_bp_medication.is_some(),
        ProfileField::OnLipidMedication => p.on_lipid_medication.is_some(),
        ProfileField::OnGlucoseMedication => p.on_glucose_medication.is_some(),
        ProfileField::TotalCholesterol => p.total_cholesterol.is_some(),
        ProfileField::HdlCholesterol => p.hdl_cholesterol.is_some(),
        ProfileField::LdlCholesterol => p.ldl_cholesterol.is_some(),
        ProfileField::Triglycerides => p.triglycerides.is_some(),
        ProfileField::FastingGlucose => p.fasting_glucose.is_some(),
        ProfileField::Hba1c => p.hba1c.is_some(),
        ProfileField::SmokingStatus => p.smoking_status.is_some(),
        ProfileField::SmokingYears => p.smoking_years.is_some(),
        ProfileField::AlcoholFrequency => p.alcohol_frequency.is_some(),
        ProfileField::ExerciseFrequency => p.exercise_frequency.is_some(),
        ProfileField::ExerciseMinutesPerWeek => p.exercise_minutes_per_week.is_some(),
        ProfileField::HasDiabetes => p.has_diabetes.is_some(),
        ProfileField::HasHypertension => p.has_hypertension.is_some(),
        ProfileField::HasHeartDisease => p.has_heart_disease.is_some(),
        ProfileField::FamilyDiabetes => p.family_diabetes.is_some(),
        ProfileField::FamilyHypertension => p.family_hypertension.is_some(),
        ProfileField::FamilyHeartDisease => p.family_heart_disease.is_some(),
        ProfileField::DailyFruitVegetable => p.daily_fruit_vegetable.is_some(),
        ProfileField::HighSaltDiet => p.high_salt_diet.is_some(),
        ProfileField::HistoryHighGlucose => p.history_high_glucose.is_some(),
    }
}

/// BMI from height (cm) and weight (kg), one decimal.
pub fn derive_bmi(height_cm: f64, weight_kg: f64) -> f64 {
    let height_m = height_cm / 100.0;
    ((weight_kg / (height_m * height_m)) * 10.0).round() / 10.0
}

/// Reject a non-finite value or one outside the field's configured range.
pub fn check_range(
    field: ProfileField,
    value: f64,
    tables: &ReferenceTables,
) -> Result<(), InvalidProfileError> {
    let range = tables.profile_range(field);
    if value.is_finite() && range.map_or(true, |r| r.contains(value)) {
        return Ok(());
    }
    Err(InvalidProfileError::OutOfRange {
        field,
        value,
        min: range.map_or(f64::MIN, |r| r.min),
        max: range.map_or(f64::MAX, |r| r.max),
    })
}

/// Validate `raw` for a calculator that needs every field in `required`.
///
/// Present fields are range-checked whether required or not. Absent optional
/// fields stay absent. BMI is derived from height and weight when missing.
pub fn validate_profile(
    raw: &HealthProfile,
    required: &[ProfileField],
    tables: &ReferenceTables,
) -> Result<ValidatedProfile, InvalidProfileError> {
    let result = validate_inner(raw, required, tables);
    if let Err(ref e) = result {
        tracing::warn!(field = %e.field(), error = %e, "profile rejected");
    }
    result
}

fn validate_inner(
    raw: &HealthProfile,
    required: &[ProfileField],
    tables: &ReferenceTables,
) -> Result<ValidatedProfile, InvalidProfileError> {
    for (field, value) in numeric_fields(raw) {
        if let Some(v) = value {
            check_range(field, v, tables)?;
        }
    }

    if let (Some(sys), Some(dia)) = (raw.systolic_bp, raw.diastolic_bp) {
        if dia >= sys {
            let min = tables
                .profile_range(ProfileField::DiastolicBp)
                .map(|r| r.min)
                .unwrap_or(0.0);
            return Err(InvalidProfileError::OutOfRange {
                field: ProfileField::DiastolicBp,
                value: dia,
                min,
                max: sys,
            });
        }
    }

    let mut profile = raw.clone();
    let mut bmi_derived = false;
    if profile.bmi.is_none() {
        if let (Some(h), Some(w)) = (profile.height_cm, profile.weight_kg) {
            let bmi = derive_bmi(h, w);
            check_range(ProfileField::Bmi, bmi, tables)?;
            profile.bmi = Some(bmi);
            bmi_derived = true;
        }
    }

    if let Some(missing) = required.iter().find(|f| !is_present(&profile, **f)) {
        return Err(InvalidProfileError::MissingField(*missing));
    }

    Ok(ValidatedProfile {
        inner: profile,
        bmi_derived,
    })
}
