use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Parse failure for a string-keyed enum.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(UnknownVariant {
                        kind: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Sex {
    Male => "male",
    Female => "female",
});

str_enum!(SmokingStatus {
    Never => "never",
    Former => "former",
    Current => "current",
});

str_enum!(ExerciseFrequency {
    Never => "never",
    Occasional => "occasional",
    Regular => "regular",
    Daily => "daily",
});

str_enum!(AlcoholFrequency {
    Never => "never",
    Occasional => "occasional",
    Regular => "regular",
    Heavy => "heavy",
});

str_enum!(
    /// Closest relative with a diabetes diagnosis.
    FamilyHistory {
        None => "none",
        SecondDegree => "second_degree",
        FirstDegree => "first_degree",
    }
);

str_enum!(AssessmentKind {
    Cardiovascular => "cardiovascular",
    Diabetes => "diabetes",
    Metabolic => "metabolic",
});

str_enum!(RiskLevel {
    Low => "low",
    Medium => "medium",
    High => "high",
});

str_enum!(
    /// Published FINDRISC risk bands.
    FindriscBand {
        Low => "low",
        SlightlyElevated => "slightly_elevated",
        Moderate => "moderate",
        High => "high",
        VeryHigh => "very_high",
    }
);

str_enum!(TrendDirection {
    Rising => "rising",
    Falling => "falling",
    Stable => "stable",
});

str_enum!(TrendStrength {
    Weak => "weak",
    Moderate => "moderate",
    Strong => "strong",
});

str_enum!(
    /// Ordered: `Warning < Critical`.
    Severity {
        Warning => "warning",
        Critical => "critical",
    }
);

str_enum!(Deviation {
    Low => "low",
    High => "high",
});

str_enum!(DetectionMethod {
    ZScore => "z_score",
    Iqr => "iqr",
    MedicalThreshold => "medical_threshold",
});

str_enum!(ScoreLevel {
    Excellent => "excellent",
    Good => "good",
    Fair => "fair",
    Poor => "poor",
});

str_enum!(ScoreCategory {
    HeartRate => "heart_rate",
    BloodPressure => "blood_pressure",
    BloodSugar => "blood_sugar",
    Sleep => "sleep",
    Activity => "activity",
    Bmi => "bmi",
    Spo2 => "spo2",
});

str_enum!(
    /// Every field a calculator can require from a `HealthProfile`.
    ProfileField {
        Age => "age",
        Sex => "sex",
        HeightCm => "height_cm",
        WeightKg => "weight_kg",
        Bmi => "bmi",
        WaistCm => "waist_cm",
        SystolicBp => "systolic_bp",
        DiastolicBp => "diastolic_bp",
        OnBpMedication => "on_bp_medication",
        OnLipidMedication => "on_lipid_medication",
        OnGlucoseMedication => "on_glucose_medication",
        TotalCholesterol => "total_cholesterol",
        HdlCholesterol => "hdl_cholesterol",
        LdlCholesterol => "ldl_cholesterol",
        Triglycerides => "triglycerides",
        FastingGlucose => "fasting_glucose",
        Hba1c => "hba1c",
        SmokingStatus => "smoking_status",
        SmokingYears => "smoking_years",
        AlcoholFrequency => "alcohol_frequency",
        ExerciseFrequency => "exercise_frequency",
        ExerciseMinutesPerWeek => "exercise_minutes_per_week",
        HasDiabetes => "has_diabetes",
        HasHypertension => "has_hypertension",
        HasHeartDisease => "has_heart_disease",
        FamilyDiabetes => "family_diabetes",
        FamilyHypertension => "family_hypertension",
        FamilyHeartDisease => "family_heart_disease",
        DailyFruitVegetable => "daily_fruit_vegetable",
        HighSaltDiet => "high_salt_diet",
        HistoryHighGlucose => "history_high_glucose",
    }
);

impl ExerciseFrequency {
    /// Regular or daily exercise counts as "physically active" for FINDRISC.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Regular | Self::Daily)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn str_enum_roundtrip_through_as_str() {
        assert_eq!(Sex::from_str("female").unwrap(), Sex::Female);
        assert_eq!(ExerciseFrequency::Regular.as_str(), "regular");
        assert_eq!(
            ExerciseFrequency::from_str("occasional").unwrap(),
            ExerciseFrequency::Occasional
        );
        assert!(ExerciseFrequency::from_str("1-2/week").is_err());
        let parsed: ExerciseFrequency = serde_json::from_str("\"regular\"").unwrap();
        assert_eq!(parsed, ExerciseFrequency::Regular);
        assert_eq!(ProfileField::HdlCholesterol.to_string(), "hdl_cholesterol");
    }

    #[test]
    fn str_enum_rejects_unknown() {
        let err = RiskLevel::from_str("severe").unwrap_err();
        assert_eq!(err.kind, "RiskLevel");
        assert_eq!(err.value, "severe");
    }

    #[test]
    fn serde_uses_semantic_keys() {
        let json = serde_json::to_string(&FamilyHistory::SecondDegree).unwrap();
        assert_eq!(json, "\"second_degree\"");
        let parsed: DetectionMethod = serde_json::from_str("\"z_score\"").unwrap();
        assert_eq!(parsed, DetectionMethod::ZScore);
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::Warning < Severity::Critical);
        assert_eq!(
            [Severity::Warning, Severity::Critical, Severity::Warning]
                .into_iter()
                .max(),
            Some(Severity::Critical)
        );
    }

    #[test]
    fn exercise_activity() {
        assert!(ExerciseFrequency::Daily.is_active());
        assert!(ExerciseFrequency::Regular.is_active());
        assert!(!ExerciseFrequency::Occasional.is_active());
        assert!(!ExerciseFrequency::Never.is_active());
    }
}
