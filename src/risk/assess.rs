use crate::error::{InsufficientDataWarning, InvalidProfileError};
use crate::models::{AssessmentKind, HealthProfile, ProfileField};
use crate::reference::ReferenceTables;

use super::cardiovascular::{assess_cardiovascular, CARDIOVASCULAR_FIELDS};
use super::diabetes::{assess_diabetes, DIABETES_FIELDS};
use super::metabolic::{assess_metabolic, METABOLIC_FIELDS};
use super::types::RiskAssessmentResult;

/// Read an optional flag, falling back to `default` and recording that the
/// value was assumed.
pub(crate) fn flag_or_default(
    value: Option<bool>,
    field: ProfileField,
    default: bool,
    warnings: &mut Vec<InsufficientDataWarning>,
) -> bool {
    match value {
        Some(v) => v,
        None => {
            warnings.push(InsufficientDataWarning::AssumedDefault {
                field,
                value: default,
            });
            default
        }
    }
}

/// Fields `kind` cannot run without.
pub fn required_fields(kind: AssessmentKind) -> &'static [ProfileField] {
    match kind {
        AssessmentKind::Cardiovascular => CARDIOVASCULAR_FIELDS,
        AssessmentKind::Diabetes => DIABETES_FIELDS,
        AssessmentKind::Metabolic => METABOLIC_FIELDS,
    }
}

/// Run the calculator for `kind` against a raw profile.
pub fn assess(
    kind: AssessmentKind,
    profile: &HealthProfile,
    tables: &ReferenceTables,
) -> Result<RiskAssessmentResult, InvalidProfileError> {
    match kind {
        AssessmentKind::Cardiovascular => assess_cardiovascular(profile, tables),
        AssessmentKind::Diabetes => assess_diabetes(profile, tables),
        AssessmentKind::Metabolic => assess_metabolic(profile, tables),
    }
}
