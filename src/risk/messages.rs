/// Recommendation and factor-detail text for the risk calculators.
/// Plain, non-alarming wording. Never states a diagnosis.
pub struct Advice;

impl Advice {
    // -- cardiovascular ---------------------------------------------------

    pub const CV_HIGH: [&'static str; 2] = [
        "Arrange a cardiovascular check-up with your doctor soon.",
        "Take prescribed medication as directed and keep follow-up appointments.",
    ];
    pub const CV_MEDIUM: [&'static str; 2] = [
        "Have a cardiovascular health check once a year.",
        "Lifestyle changes now can keep this risk from rising.",
    ];
    pub const CHOLESTEROL: [&'static str; 2] = [
        "Cut back on saturated fat and dietary cholesterol.",
        "Add soluble fibre such as oats and beans.",
    ];
    pub const LOW_HDL: [&'static str; 2] = [
        "Aim for at least 150 minutes of aerobic exercise per week.",
        "Favour healthy fats such as olive oil and nuts.",
    ];
    pub const BLOOD_PRESSURE: [&'static str; 2] = [
        "Keep salt intake under 6 g per day.",
        "Maintain a healthy body weight.",
    ];
    pub const QUIT_SMOKING: &'static str =
        "Stopping smoking steadily lowers cardiovascular risk.";
    pub const DIABETES_CONTROL: &'static str =
        "Keep blood sugar well controlled and check HbA1c regularly.";
    pub const CV_GENERAL: [&'static str; 2] = [
        "Keep a regular sleep schedule.",
        "Manage stress and stay positive.",
    ];

    // -- diabetes ---------------------------------------------------------

    pub const DM_HIGH: [&'static str; 2] = [
        "Ask your doctor about an oral glucose tolerance test.",
        "Monitor fasting glucose and HbA1c regularly.",
    ];
    pub const DM_MEDIUM: [&'static str; 2] = [
        "Check fasting glucose once a year.",
        "Lifestyle changes now can help prevent diabetes.",
    ];
    pub const WEIGHT: [&'static str; 2] = [
        "Work toward a BMI below 25.",
        "Losing 5% of body weight can halve diabetes risk.",
    ];
    pub const WAIST: &'static str = "Focus on reducing abdominal fat.";
    pub const ACTIVITY: [&'static str; 2] = [
        "Get at least 30 minutes of moderate activity every day.",
        "Brisk walking, swimming and cycling all count.",
    ];
    pub const FRUIT_VEG: &'static str = "Eat at least 500 g of vegetables and fruit daily.";
    pub const GLUCOSE_HISTORY: &'static str =
        "With a history of high blood sugar, monitor glucose closely.";
    pub const DM_GENERAL: [&'static str; 2] = [
        "Limit refined carbohydrates and sugary drinks.",
        "Keep a regular sleep schedule.",
    ];

    // -- metabolic syndrome -----------------------------------------------

    pub const MS_POSITIVE: [&'static str; 3] = [
        "Your readings meet the metabolic syndrome criteria. Please see your doctor.",
        "Metabolic syndrome raises the risk of heart disease and diabetes.",
        "Treatment works best when planned with your doctor.",
    ];
    pub const MS_WAIST: [&'static str; 2] = [
        "Reducing abdominal fat is key to metabolic health.",
        "Combine diet and exercise to lose weight.",
    ];
    pub const MS_TRIGLYCERIDES: [&'static str; 2] = [
        "Cut back on refined carbohydrates and alcohol.",
        "Eat omega-3 rich foods such as oily fish.",
    ];
    pub const MS_HDL: [&'static str; 2] = [
        "Aerobic exercise raises HDL cholesterol.",
        "Stopping smoking helps raise HDL cholesterol.",
    ];
    pub const MS_BLOOD_PRESSURE: [&'static str; 2] = [
        "Keep salt intake under 6 g per day.",
        "Eat potassium-rich vegetables and fruit.",
    ];
    pub const MS_GLUCOSE: [&'static str; 2] = [
        "Choose low glycaemic index carbohydrates.",
        "A short walk after meals helps control blood sugar.",
    ];
    pub const MS_PREVENT: &'static str = "Keep up a healthy lifestyle to prevent metabolic syndrome.";
    pub const MS_GENERAL: &'static str = "Have regular check-ups to track metabolic markers.";

    // -- factor details ---------------------------------------------------

    pub fn years(age: u32) -> String {
        format!("{age} years")
    }

    pub fn mg_dl(value: f64) -> String {
        format!("{value} mg/dL")
    }

    pub fn mg_dl_target(value: f64, target: &str) -> String {
        format!("{value} mg/dL (target {target})")
    }

    pub fn mmhg(value: f64) -> String {
        format!("{value} mmHg")
    }

    pub fn mmhg_target(value: f64, target: &str) -> String {
        format!("{value} mmHg (target {target})")
    }

    pub fn bmi(value: f64) -> String {
        format!("BMI {value:.1}")
    }

    pub fn bmi_target(value: f64) -> String {
        format!("BMI {value:.1} (target < 25)")
    }

    pub fn waist(value: f64, limit: f64) -> String {
        format!("{value:.0} cm (target < {limit:.0} cm)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn details_format_units() {
        assert_eq!(Advice::years(55), "55 years");
        assert_eq!(Advice::mg_dl_target(240.0, "< 200"), "240 mg/dL (target < 200)");
        assert_eq!(Advice::bmi(27.345), "BMI 27.3");
        assert_eq!(Advice::waist(95.4, 94.0), "95 cm (target < 94 cm)");
    }
}
