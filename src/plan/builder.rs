//! Plan builder - expands the 14-day rotation into an N-week plan

use crate::plan::{Gender, Language, PlanDay};
use crate::templates::template_days;

/// Used when a template day carries no kcal
pub const DEFAULT_KCAL: i32 = 1600;

/// Female plans run at 90% of the template energy
pub const FEMALE_KCAL_FACTOR: f64 = 0.9;

pub const DAYS_PER_WEEK: usize = 7;

/// Build `weeks * 7` plan days, cycling the template rotation.
///
/// `weeks <= 0` yields an empty plan.
pub fn build_plan(weeks: i32, gender: Gender, language: Language) -> Vec<PlanDay> {
    if weeks <= 0 {
        return Vec::new();
    }

    let templates = template_days();
    let total = weeks as usize * DAYS_PER_WEEK;

    (0..total)
        .map(|i| {
            let mut day = templates[i % templates.len()].localized(language);
            day.day_label = day_label(i, language);
            day.kcal = scale_kcal(day.kcal, gender);
            day
        })
        .collect()
}

/// Sequential label for a zero-based day offset
pub fn day_label(day: usize, language: Language) -> String {
    match language {
        Language::Es => format!("Día {}", day + 1),
        Language::En => format!("Day {}", day + 1),
    }
}

/// Apply the gender factor, substituting the default for missing kcal
pub fn scale_kcal(template_kcal: i32, gender: Gender) -> i32 {
    let base = if template_kcal > 0 { template_kcal } else { DEFAULT_KCAL };
    match gender {
        Gender::Female => (base as f64 * FEMALE_KCAL_FACTOR).round() as i32,
        Gender::Male => base,
    }
}

/// Zero-based week index of a day offset
pub fn week_of(day: usize) -> usize {
    day / DAYS_PER_WEEK
}

/// Day offsets of a week, truncated to the plan length
pub fn days_of_week(week: usize, total_days: usize) -> std::ops::Range<usize> {
    let start = (week * DAYS_PER_WEEK).min(total_days);
    let end = (start + DAYS_PER_WEEK).min(total_days);
    start..end
}
