use serde::{Deserialize, Serialize};

use crate::error::InsufficientDataWarning;
use crate::models::{AssessmentKind, FindriscBand, RiskLevel};

/// Cap on recommendations carried by one assessment.
pub const MAX_RECOMMENDATIONS: usize = 8;

/// One named contributor to an assessment.
///
/// `name` is a semantic key (`total_cholesterol_high`); `detail` is a short
/// human-readable reading such as `240 mg/dL (target < 200)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub name: String,
    pub positive: bool,
    pub detail: String,
}

impl RiskFactor {
    pub fn protective(name: &str, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            positive: true,
            detail: detail.into(),
        }
    }

    pub fn adverse(name: &str, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            positive: false,
            detail: detail.into(),
        }
    }
}

/// Points awarded by one FINDRISC item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindriscItem {
    pub item: String,
    pub value: String,
    pub points: u8,
}

/// One of the five metabolic-syndrome criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetabolicCriterion {
    pub name: String,
    pub value: String,
    pub threshold: String,
    /// The measured value crosses the threshold.
    pub abnormal: bool,
    /// Treatment for this condition is recorded.
    pub on_treatment: bool,
    /// Counted toward the total: `abnormal || on_treatment`.
    pub met: bool,
}

/// Calculator-specific data behind the headline numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum RiskDetail {
    Framingham {
        /// L: the linear predictor before centring.
        coefficient_sum: f64,
        mean_coefficient_sum: f64,
        baseline_survival: f64,
        /// Age fed to the formula after clamping into the validated range.
        age_used: u32,
        treated_bp: bool,
    },
    Findrisc {
        total_score: u8,
        max_score: u8,
        band: FindriscBand,
        breakdown: Vec<FindriscItem>,
    },
    MetabolicSyndrome {
        criteria_met: u8,
        has_metabolic_syndrome: bool,
        criteria: Vec<MetabolicCriterion>,
    },
}

/// Output of one risk calculator. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessmentResult {
    pub kind: AssessmentKind,
    pub risk_level: RiskLevel,
    /// Percentage for cardiovascular and diabetes, criteria count for metabolic.
    pub score: f64,
    pub risk_percentage: Option<f64>,
    /// 0-100 index comparable across kinds.
    pub risk_index: u8,
    pub factors: Vec<RiskFactor>,
    pub recommendations: Vec<String>,
    pub detail: RiskDetail,
    pub warnings: Vec<InsufficientDataWarning>,
}

impl RiskAssessmentResult {
    pub fn is_low_confidence(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn adverse_factors(&self) -> impl Iterator<Item = &RiskFactor> {
        self.factors.iter().filter(|f| !f.positive)
    }
}

/// Ordered, de-duplicated recommendation list capped at `MAX_RECOMMENDATIONS`.
#[derive(Debug, Default)]
pub(crate) struct RecommendationList(Vec<String>);

impl RecommendationList {
    pub fn push(&mut self, text: &str) {
        if !self.0.iter().any(|r| r == text) {
            self.0.push(text.to_string());
        }
    }

    pub fn extend<'a>(&mut self, texts: impl IntoIterator<Item = &'a str>) {
        for text in texts {
            self.push(text);
        }
    }

    pub fn finish(mut self) -> Vec<String> {
        self.0.truncate(MAX_RECOMMENDATIONS);
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommendation_list_dedups_and_caps() {
        let mut list = RecommendationList::default();
        list.push("a");
        list.push("a");
        list.extend(["b", "c", "d", "e", "f", "g", "h", "i", "j"]);
        let out = list.finish();
        assert_eq!(out.len(), MAX_RECOMMENDATIONS);
        assert_eq!(out[0], "a");
        assert_eq!(out[1], "b");
    }

    #[test]
    fn detail_serializes_with_model_tag() {
        let detail = RiskDetail::MetabolicSyndrome {
            criteria_met: 0,
            has_metabolic_syndrome: false,
            criteria: vec![],
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["model"], "metabolic_syndrome");
        assert_eq!(json["criteria_met"], 0);
    }
}
