//! Body metrics - BMI, BMR, TDEE, body fat, ideal weight, water and exercise
//!
//! Every function returns `None` on missing or non-positive inputs instead of
//! failing.

use serde::{Deserialize, Serialize};

use crate::plan::{Gender, Language};

/// Energy stored in one kg of body fat
pub const KCAL_PER_KG: f64 = 7700.0;

/// Above this daily deficit a weight-loss plan is flagged as unhealthy
pub const MAX_HEALTHY_DEFICIT: f64 = 1000.0;

pub const WATER_ML_PER_KG: f64 = 35.0;
pub const WATER_MIN_ML: i32 = 1500;
pub const WATER_MAX_ML: i32 = 4000;

const BODY_FAT_MIN: f64 = 6.0;
const BODY_FAT_MAX: f64 = 50.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum ActivityLevel {
    Sedentary,
    #[default]
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "sedentary" | "sedentario" => Some(ActivityLevel::Sedentary),
            "light" | "ligero" => Some(ActivityLevel::Light),
            "moderate" | "moderado" => Some(ActivityLevel::Moderate),
            "active" | "activo" => Some(ActivityLevel::Active),
            "veryactive" | "muyactivo" => Some(ActivityLevel::VeryActive),
            _ => None,
        }
    }

    pub fn tdee_multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }

    pub fn water_multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.0,
            ActivityLevel::Light => 1.1,
            ActivityLevel::Moderate => 1.2,
            ActivityLevel::Active => 1.3,
            ActivityLevel::VeryActive => 1.4,
        }
    }
}

/// Workout intensity, drives the MET value
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Low,
    #[default]
    Moderate,
    High,
}

impl Intensity {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "low" | "baja" | "suave" => Some(Intensity::Low),
            "moderate" | "medium" | "media" | "moderada" => Some(Intensity::Moderate),
            "high" | "alta" | "intensa" => Some(Intensity::High),
            _ => None,
        }
    }

    pub fn met(&self) -> f64 {
        match self {
            Intensity::Low => 3.5,
            Intensity::Moderate => 5.0,
            Intensity::High => 8.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Intensity::Low => "low",
            Intensity::Moderate => "moderate",
            Intensity::High => "high",
        }
    }
}

/// Biometric inputs, any of which may be unknown
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub age: Option<u32>,
}

impl Metrics {
    pub fn is_complete(&self) -> bool {
        positive(self.height_cm).is_some()
            && positive(self.weight_kg).is_some()
            && self.age.is_some_and(|a| a > 0)
    }

    pub fn bmi(&self) -> Option<f64> {
        calculate_bmi(self.height_cm?, self.weight_kg?)
    }

    pub fn bmr(&self, gender: Gender) -> Option<i32> {
        calculate_bmr(self.height_cm?, self.weight_kg?, self.age?, gender.is_male())
    }

    pub fn tdee(&self, gender: Gender, activity: ActivityLevel) -> Option<i32> {
        calculate_tdee(self.bmr(gender)?, activity)
    }

    pub fn body_fat(&self, gender: Gender) -> Option<f64> {
        estimate_body_fat(self.height_cm?, self.weight_kg?, self.age?, gender)
    }
}

fn positive(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite() && *x > 0.0)
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Truncate to one decimal, as BMI is shown
fn trunc1(v: f64) -> f64 {
    ((v * 10.0) + 1e-9).floor() / 10.0
}

fn raw_bmi(height_cm: f64, weight_kg: f64) -> Option<f64> {
    let h = positive(Some(height_cm))? / 100.0;
    let w = positive(Some(weight_kg))?;
    Some(w / (h * h))
}

/// Body mass index, truncated to one decimal
pub fn calculate_bmi(height_cm: f64, weight_kg: f64) -> Option<f64> {
    raw_bmi(height_cm, weight_kg).map(trunc1)
}

/// Localized BMI band
pub fn get_bmi_category(bmi: f64, lang: Language) -> &'static str {
    let band = if bmi < 18.5 {
        0
    } else if bmi < 25.0 {
        1
    } else if bmi < 30.0 {
        2
    } else {
        3
    };

    match (band, lang) {
        (0, Language::Es) => "Bajo peso",
        (0, Language::En) => "Underweight",
        (1, _) => "Normal",
        (2, Language::Es) => "Sobrepeso",
        (2, Language::En) => "Overweight",
        (_, Language::Es) => "Obesidad",
        (_, Language::En) => "Obese",
    }
}

/// Mifflin-St Jeor basal metabolic rate, kcal/day
pub fn calculate_bmr(height_cm: f64, weight_kg: f64, age: u32, is_male: bool) -> Option<i32> {
    let h = positive(Some(height_cm))?;
    let w = positive(Some(weight_kg))?;
    if age == 0 {
        return None;
    }

    let sex_term = if is_male { 5.0 } else { -161.0 };
    let bmr = 10.0 * w + 6.25 * h - 5.0 * age as f64 + sex_term;
    (bmr > 0.0).then(|| bmr.round() as i32)
}

/// Total daily energy expenditure
pub fn calculate_tdee(bmr: i32, activity: ActivityLevel) -> Option<i32> {
    if bmr <= 0 {
        return None;
    }
    Some((bmr as f64 * activity.tdee_multiplier()).round() as i32)
}

/// Linear body-fat approximation from BMI, clamped to [6, 50] %
pub fn estimate_body_fat(height_cm: f64, weight_kg: f64, age: u32, gender: Gender) -> Option<f64> {
    if age == 0 {
        return None;
    }
    let bmi = raw_bmi(height_cm, weight_kg)?;
    let male = if gender.is_male() { 1.0 } else { 0.0 };

    let bf = 1.2 * bmi + 0.23 * age as f64 - 10.8 * male - 5.4;
    Some(round1(bf.clamp(BODY_FAT_MIN, BODY_FAT_MAX)))
}

/// Devine ideal weight in kg, never below the formula's base
pub fn calculate_ideal_weight(height_cm: f64, gender: Gender) -> Option<f64> {
    let h = positive(Some(height_cm))?;
    let inches = h / 2.54;
    let base = match gender {
        Gender::Male => 50.0,
        Gender::Female => 45.5,
    };

    let ideal = base + 2.3 * (inches - 60.0);
    Some(round1(ideal.max(base)))
}

/// Daily water goal in ml
pub fn calculate_water_goal(weight_kg: f64, activity: ActivityLevel) -> Option<i32> {
    let w = positive(Some(weight_kg))?;
    let ml = (w * WATER_ML_PER_KG * activity.water_multiplier()).round() as i32;
    Some(ml.clamp(WATER_MIN_ML, WATER_MAX_ML))
}

/// MET-based energy burned by a workout
pub fn estimate_exercise_calories(
    weight_kg: f64,
    minutes: u32,
    intensity: Intensity,
) -> Option<i32> {
    let w = positive(Some(weight_kg))?;
    if minutes == 0 {
        return None;
    }
    let hours = minutes as f64 / 60.0;
    Some((intensity.met() * w * hours).round() as i32)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeficitPlan {
    pub kg_to_lose: f64,
    pub total_kcal: i32,
    pub daily_deficit: i32,
    pub weekly_loss_kg: f64,
    pub healthy: bool,
}

/// Deficit needed to reach `target_kg` in `weeks`
pub fn calculate_deficit_for_weight_loss(
    current_kg: f64,
    target_kg: f64,
    weeks: u32,
) -> Option<DeficitPlan> {
    let current = positive(Some(current_kg))?;
    let target = positive(Some(target_kg))?;
    if weeks == 0 || target >= current {
        return None;
    }

    let kg = current - target;
    let total = kg * KCAL_PER_KG;
    let daily = total / (weeks as f64 * 7.0);

    Some(DeficitPlan {
        kg_to_lose: round1(kg),
        total_kcal: total.round() as i32,
        daily_deficit: daily.round() as i32,
        weekly_loss_kg: round1(kg / weeks as f64),
        healthy: daily <= MAX_HEALTHY_DEFICIT,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightProgress {
    pub lost_kg: f64,
    pub remaining_kg: f64,
    /// 0..=100
    pub percent: f64,
}

pub fn calculate_weight_progress(
    start_kg: f64,
    current_kg: f64,
    target_kg: f64,
) -> Option<WeightProgress> {
    let start = positive(Some(start_kg))?;
    let current = positive(Some(current_kg))?;
    let target = positive(Some(target_kg))?;

    let goal_delta = start - target;
    if goal_delta.abs() < f64::EPSILON {
        return None;
    }

    let lost = start - current;
    let percent = (lost / goal_delta * 100.0).clamp(0.0, 100.0);

    Some(WeightProgress {
        lost_kg: round1(lost),
        remaining_kg: round1((current - target).max(0.0)),
        percent: round1(percent),
    })
}
