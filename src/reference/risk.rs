//! Coefficient and threshold tables for the three risk calculators.

use serde::{Deserialize, Serialize};

use crate::models::{FindriscBand, RiskLevel, Sex};

/// A pair of values keyed by biological sex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SexSpecific<T> {
    pub male: T,
    pub female: T,
}

impl<T> SexSpecific<T> {
    pub fn get(&self, sex: Sex) -> &T {
        match sex {
            Sex::Male => &self.male,
            Sex::Female => &self.female,
        }
    }
}

// ---------------------------------------------------------------------------
// Cardiovascular (Framingham general CVD, D'Agostino 2008)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraminghamCoefficients {
    pub ln_age: f64,
    pub ln_total_cholesterol: f64,
    pub ln_hdl: f64,
    pub ln_sbp_untreated: f64,
    pub ln_sbp_treated: f64,
    pub smoker: f64,
    pub diabetes: f64,
    /// S0: 10-year baseline survival.
    pub baseline_survival: f64,
    /// M: mean of the linear predictor in the derivation cohort.
    pub mean_coefficient_sum: f64,
}

/// Bounds used to label individual cardiovascular factors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardiovascularFactorBounds {
    pub age_concern_from: u32,
    pub total_cholesterol_borderline: f64,
    pub total_cholesterol_high: f64,
    pub hdl_low_below: f64,
    pub hdl_good_from: f64,
    pub systolic_borderline: f64,
    pub systolic_high: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardiovascularTable {
    pub coefficients: SexSpecific<FraminghamCoefficients>,
    pub validated_age_min: u32,
    pub validated_age_max: u32,
    /// Percentages at or above this are medium.
    pub medium_from: f64,
    /// Percentages at or above this are high.
    pub high_from: f64,
    pub factor_bounds: CardiovascularFactorBounds,
}

impl Default for CardiovascularTable {
    fn default() -> Self {
        Self {
            coefficients: SexSpecific {
                male: FraminghamCoefficients {
                    ln_age: 3.06117,
                    ln_total_cholesterol: 1.12370,
                    ln_hdl: -0.93263,
                    ln_sbp_untreated: 1.93303,
                    ln_sbp_treated: 1.99881,
                    smoker: 0.65451,
                    diabetes: 0.57367,
                    baseline_survival: 0.88936,
                    mean_coefficient_sum: 23.9802,
                },
                female: FraminghamCoefficients {
                    ln_age: 2.32888,
                    ln_total_cholesterol: 1.20904,
                    ln_hdl: -0.70833,
                    ln_sbp_untreated: 2.76157,
                    ln_sbp_treated: 2.82263,
                    smoker: 0.52873,
                    diabetes: 0.69154,
                    baseline_survival: 0.95012,
                    mean_coefficient_sum: 26.1931,
                },
            },
            validated_age_min: 30,
            validated_age_max: 79,
            medium_from: 10.0,
            high_from: 20.0,
            factor_bounds: CardiovascularFactorBounds {
                age_concern_from: 55,
                total_cholesterol_borderline: 200.0,
                total_cholesterol_high: 240.0,
                hdl_low_below: 40.0,
                hdl_good_from: 60.0,
                systolic_borderline: 130.0,
                systolic_high: 140.0,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Diabetes (FINDRISC, Lindström & Tuomilehto 2003)
// ---------------------------------------------------------------------------

/// One row of an ordinal lookup: values at or above `from` score `points`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointBand {
    pub from: f64,
    pub points: u8,
}

/// Score the value against ascending bands; values below the first band score 0.
pub fn points_for(bands: &[PointBand], value: f64) -> u8 {
    bands
        .iter()
        .rev()
        .find(|b| value >= b.from)
        .map(|b| b.points)
        .unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindriscBucket {
    pub min_score: u8,
    pub level: RiskLevel,
    pub band: FindriscBand,
    /// Representative 10-year risk for the whole bucket.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FindriscTable {
    pub age: Vec<PointBand>,
    pub bmi: Vec<PointBand>,
    pub waist: SexSpecific<Vec<PointBand>>,
    pub physical_inactivity: u8,
    pub low_fruit_vegetable: u8,
    pub bp_medication: u8,
    pub high_glucose_history: u8,
    pub family_second_degree: u8,
    pub family_first_degree: u8,
    /// Ascending by `min_score`; the first bucket starts at 0.
    pub buckets: Vec<FindriscBucket>,
    pub max_score: u8,
}

impl FindriscTable {
    pub fn bucket_for(&self, total: u8) -> Option<&FindriscBucket> {
        self.buckets.iter().rev().find(|b| total >= b.min_score)
    }
}

impl Default for FindriscTable {
    fn default() -> Self {
        let band = |from: f64, points: u8| PointBand { from, points };
        Self {
            age: vec![band(0.0, 0), band(45.0, 2), band(55.0, 3), band(65.0, 4)],
            bmi: vec![band(0.0, 0), band(25.0, 1), band(30.0, 3)],
            waist: SexSpecific {
                male: vec![band(0.0, 0), band(94.0, 3), band(102.0, 4)],
                female: vec![band(0.0, 0), band(80.0, 3), band(88.0, 4)],
            },
            physical_inactivity: 2,
            low_fruit_vegetable: 1,
            bp_medication: 2,
            high_glucose_history: 5,
            family_second_degree: 3,
            family_first_degree: 5,
            buckets: vec![
                FindriscBucket {
                    min_score: 0,
                    level: RiskLevel::Low,
                    band: FindriscBand::Low,
                    percentage: 1.0,
                },
                FindriscBucket {
                    min_score: 7,
                    level: RiskLevel::Low,
                    band: FindriscBand::SlightlyElevated,
                    percentage: 4.0,
                },
                FindriscBucket {
                    min_score: 12,
                    level: RiskLevel::Medium,
                    band: FindriscBand::Moderate,
                    percentage: 17.0,
                },
                FindriscBucket {
                    min_score: 15,
                    level: RiskLevel::High,
                    band: FindriscBand::High,
                    percentage: 33.0,
                },
                FindriscBucket {
                    min_score: 21,
                    level: RiskLevel::High,
                    band: FindriscBand::VeryHigh,
                    percentage: 50.0,
                },
            ],
            max_score: 26,
        }
    }
}

// ---------------------------------------------------------------------------
// Metabolic syndrome (IDF / NCEP ATP III harmonized, Asian waist cut-offs)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetabolicTable {
    /// Waist at or above this is central obesity.
    pub waist_cm: SexSpecific<f64>,
    pub triglycerides_from: f64,
    /// HDL strictly below this is reduced.
    pub hdl_below: SexSpecific<f64>,
    pub systolic_from: f64,
    pub diastolic_from: f64,
    /// mmol/L.
    pub fasting_glucose_from: f64,
    /// Criteria count that constitutes a diagnosis.
    pub diagnosis_threshold: u8,
}

impl Default for MetabolicTable {
    fn default() -> Self {
        Self {
            waist_cm: SexSpecific {
                male: 90.0,
                female: 80.0,
            },
            triglycerides_from: 150.0,
            hdl_below: SexSpecific {
                male: 40.0,
                female: 50.0,
            },
            systolic_from: 130.0,
            diastolic_from: 85.0,
            fasting_glucose_from: 5.6,
            diagnosis_threshold: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_for_picks_highest_band_reached() {
        let table = FindriscTable::default();
        assert_eq!(points_for(&table.age, 44.0), 0);
        assert_eq!(points_for(&table.age, 45.0), 2);
        assert_eq!(points_for(&table.age, 64.9), 3);
        assert_eq!(points_for(&table.age, 80.0), 4);
        assert_eq!(points_for(&table.bmi, 29.9), 1);
        assert_eq!(points_for(&table.bmi, 30.0), 3);
    }

    #[test]
    fn points_for_empty_table_is_zero() {
        assert_eq!(points_for(&[], 100.0), 0);
    }

    #[test]
    fn sex_specific_lookup() {
        let table = MetabolicTable::default();
        assert_eq!(*table.waist_cm.get(Sex::Male), 90.0);
        assert_eq!(*table.hdl_below.get(Sex::Female), 50.0);
    }

    #[test]
    fn default_findrisc_max_score_is_reachable() {
        let t = FindriscTable::default();
        let max = t.age.iter().map(|b| b.points).max().unwrap()
            + t.bmi.iter().map(|b| b.points).max().unwrap()
            + t.waist.male.iter().map(|b| b.points).max().unwrap()
            + t.physical_inactivity
            + t.low_fruit_vegetable
            + t.bp_medication
            + t.high_glucose_history
            + t.family_first_degree;
        assert_eq!(max, t.max_score);
    }
}
