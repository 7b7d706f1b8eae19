//! Calorie engine - daily goal, consumed calories and day reconciliation

use serde::{Deserialize, Serialize};

use crate::metrics::{ActivityLevel, Metrics};
use crate::plan::{Gender, Language, MealKey};

/// Share of the daily goal assigned to each meal slot, in `MealKey::ALL` order
pub const MEAL_WEIGHTS: [(MealKey, f64); 5] = [
    (MealKey::Desayuno, 0.25),
    (MealKey::SnackAm, 0.10),
    (MealKey::Almuerzo, 0.35),
    (MealKey::SnackPm, 0.10),
    (MealKey::Cena, 0.20),
];

/// Fraction of a cheat meal's kcal added on top of the day's goal
pub const CHEAT_CREDIT: f64 = 0.6;

pub fn meal_weight(key: MealKey) -> f64 {
    MEAL_WEIGHTS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, w)| *w)
        .unwrap_or(0.0)
}

/// Completion flag per meal slot
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MealFlags {
    #[serde(default)]
    pub desayuno: bool,
    #[serde(default, rename = "snackAM")]
    pub snack_am: bool,
    #[serde(default)]
    pub almuerzo: bool,
    #[serde(default, rename = "snackPM")]
    pub snack_pm: bool,
    #[serde(default)]
    pub cena: bool,
}

impl MealFlags {
    pub fn all_done() -> Self {
        Self {
            desayuno: true,
            snack_am: true,
            almuerzo: true,
            snack_pm: true,
            cena: true,
        }
    }

    pub fn get(&self, key: MealKey) -> bool {
        match key {
            MealKey::Desayuno => self.desayuno,
            MealKey::SnackAm => self.snack_am,
            MealKey::Almuerzo => self.almuerzo,
            MealKey::SnackPm => self.snack_pm,
            MealKey::Cena => self.cena,
        }
    }

    pub fn set(&mut self, key: MealKey, done: bool) {
        let flag = match key {
            MealKey::Desayuno => &mut self.desayuno,
            MealKey::SnackAm => &mut self.snack_am,
            MealKey::Almuerzo => &mut self.almuerzo,
            MealKey::SnackPm => &mut self.snack_pm,
            MealKey::Cena => &mut self.cena,
        };
        *flag = done;
    }

    pub fn toggle(&mut self, key: MealKey) -> bool {
        let done = !self.get(key);
        self.set(key, done);
        done
    }

    pub fn count_done(&self) -> usize {
        MealKey::ALL.iter().filter(|k| self.get(**k)).count()
    }
}

/// One slot's share of a goal
pub fn planned_meal_kcal(goal_kcal: i32, key: MealKey) -> i32 {
    (goal_kcal as f64 * meal_weight(key)).round() as i32
}

/// Calories eaten from the plan, counted per completed slot
pub fn calculate_consumed_calories(meals: &MealFlags, goal_kcal: i32) -> i32 {
    MealKey::ALL
        .iter()
        .filter(|k| meals.get(**k))
        .map(|k| planned_meal_kcal(goal_kcal, *k))
        .sum()
}

/// Inputs to the dynamic daily goal
#[derive(Debug, Clone, Copy, Default)]
pub struct GoalInputs {
    /// Plan kcal for the day, already gender-scaled
    pub base_kcal: i32,
    pub gender: Gender,
    pub metrics: Metrics,
    pub activity: ActivityLevel,
    /// Estimated kcal of the day's cheat meal, 0 if none
    pub cheat_kcal: i32,
}

/// Clamp the plan's kcal between BMR and TDEE when biometrics are known
pub fn personalized_base(
    base_kcal: i32,
    gender: Gender,
    metrics: &Metrics,
    activity: ActivityLevel,
) -> i32 {
    if !metrics.is_complete() {
        return base_kcal;
    }

    match (metrics.bmr(gender), metrics.tdee(gender, activity)) {
        (Some(bmr), Some(tdee)) if bmr <= tdee => base_kcal.clamp(bmr, tdee),
        _ => base_kcal,
    }
}

pub fn cheat_allowance(cheat_kcal: i32) -> i32 {
    if cheat_kcal <= 0 {
        return 0;
    }
    (cheat_kcal as f64 * CHEAT_CREDIT).round() as i32
}

/// Daily goal: personalized plan kcal plus a partial cheat-meal credit
pub fn calculate_dynamic_daily_kcal(inputs: &GoalInputs) -> i32 {
    personalized_base(inputs.base_kcal, inputs.gender, &inputs.metrics, inputs.activity)
        + cheat_allowance(inputs.cheat_kcal)
}

/// UI copy explaining the cheat credit
pub fn cheat_credit_note(lang: Language) -> &'static str {
    match lang {
        Language::Es => "Se suma el 60% de las kcal de tu comida libre al objetivo del día.",
        Language::En => "60% of your cheat meal's kcal is added to today's goal.",
    }
}

/// Cheat meal as seen by the reconciler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheatSlot {
    pub meal: MealKey,
    pub kcal: i32,
}

/// Everything needed to reconcile one day
#[derive(Debug, Clone, Default)]
pub struct DayInputs {
    /// Plan kcal before the cheat credit, used for slot shares
    pub base_kcal: i32,
    /// Goal the day is measured against
    pub goal_kcal: i32,
    pub meals: MealFlags,
    pub cheat: Option<CheatSlot>,
    pub extras_kcal: Vec<i32>,
    pub exercise_kcal: Vec<i32>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DayTotals {
    pub goal: i32,
    pub from_meals: i32,
    pub from_cheat: i32,
    pub from_extras: i32,
    pub consumed: i32,
    pub burned: i32,
    pub net: i32,
    /// Can go negative when over goal
    pub remaining: i32,
    /// Net intake as percent of goal
    pub percent: i32,
}

/// Sum of the non-negative entries, capped at `i32::MAX`
fn saturating_total(values: &[i32]) -> i32 {
    values.iter().fold(0i32, |acc, k| acc.saturating_add((*k).max(0)))
}

/// Fold plan meals, cheat meal, extras and exercise into one running total.
///
/// A cheat meal replaces its slot's planned share and only counts once that
/// slot is marked done.
pub fn reconcile_day(inputs: &DayInputs) -> DayTotals {
    let cheat_meal = inputs.cheat.map(|c| c.meal);

    let from_meals: i32 = MealKey::ALL
        .iter()
        .filter(|k| inputs.meals.get(**k) && Some(**k) != cheat_meal)
        .map(|k| planned_meal_kcal(inputs.base_kcal, *k))
        .sum();

    let from_cheat = match inputs.cheat {
        Some(c) if inputs.meals.get(c.meal) => c.kcal.max(0),
        _ => 0,
    };

    let from_extras = saturating_total(&inputs.extras_kcal);
    let burned = saturating_total(&inputs.exercise_kcal);

    let consumed = from_meals.saturating_add(from_cheat).saturating_add(from_extras);
    let net = consumed.saturating_sub(burned);
    let percent = if inputs.goal_kcal > 0 {
        (net as f64 / inputs.goal_kcal as f64 * 100.0).round() as i32
    } else {
        0
    };

    DayTotals {
        goal: inputs.goal_kcal,
        from_meals,
        from_cheat,
        from_extras,
        consumed,
        burned,
        net,
        remaining: inputs.goal_kcal.saturating_sub(net),
        percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_one() {
        let total: f64 = MEAL_WEIGHTS.iter().map(|(_, w)| w).sum();
        assert!((total - 1.0).abs() < 1e-9, "weights sum to {}", total);
    }

    #[test]
    fn test_weights_cover_every_slot_once() {
        for (i, key) in MealKey::ALL.iter().enumerate() {
            assert_eq!(MEAL_WEIGHTS[i].0, *key);
        }
    }

    #[test]
    fn test_full_completion_matches_goal() {
        for goal in [1200, 1440, 1555, 1600, 1733, 2049] {
            let consumed = calculate_consumed_calories(&MealFlags::all_done(), goal);
            assert!((consumed - goal).abs() <= 2, "goal {} consumed {}", goal, consumed);
        }
    }

    #[test]
    fn test_partial_completion() {
        let mut meals = MealFlags::default();
        assert_eq!(calculate_consumed_calories(&meals, 1600), 0);

        meals.set(MealKey::Desayuno, true);
        assert_eq!(calculate_consumed_calories(&meals, 1600), 400);

        meals.set(MealKey::Almuerzo, true);
        assert_eq!(calculate_consumed_calories(&meals, 1600), 960);
    }

    #[test]
    fn test_toggle() {
        let mut meals = MealFlags::default();
        assert!(meals.toggle(MealKey::Cena));
        assert!(meals.cena);
        assert!(!meals.toggle(MealKey::Cena));
        assert_eq!(meals.count_done(), 0);
    }

    #[test]
    fn test_meal_flags_json_tolerates_missing_keys() {
        let flags: MealFlags = serde_json::from_str(r#"{"desayuno":true,"snackPM":true}"#).unwrap();
        assert!(flags.desayuno);
        assert!(flags.snack_pm);
        assert!(!flags.cena);
    }

    #[test]
    fn test_dynamic_goal_without_biometrics() {
        let inputs = GoalInputs { base_kcal: 1600, cheat_kcal: 1000, ..Default::default() };
        assert_eq!(calculate_dynamic_daily_kcal(&inputs), 2200);

        let no_cheat = GoalInputs { base_kcal: 1440, gender: Gender::Female, ..Default::default() };
        assert_eq!(calculate_dynamic_daily_kcal(&no_cheat), 1440);
    }

    #[test]
    fn test_dynamic_goal_clamped_to_bmr() {
        // BMR 1705, TDEE (sedentary) 2046
        let metrics = Metrics { height_cm: Some(170.0), weight_kg: Some(75.0), age: Some(30) };
        let inputs = GoalInputs {
            base_kcal: 1600,
            gender: Gender::Male,
            metrics,
            activity: ActivityLevel::Sedentary,
            cheat_kcal: 0,
        };
        assert_eq!(calculate_dynamic_daily_kcal(&inputs), 1705);

        let high = GoalInputs { base_kcal: 2500, ..inputs };
        assert_eq!(calculate_dynamic_daily_kcal(&high), 2046);

        let within = GoalInputs { base_kcal: 1800, cheat_kcal: 500, ..inputs };
        assert_eq!(calculate_dynamic_daily_kcal(&within), 2100);
    }

    #[test]
    fn test_negative_cheat_ignored() {
        assert_eq!(cheat_allowance(-300), 0);
    }

    #[test]
    fn test_reconcile_plain_day() {
        let mut meals = MealFlags::default();
        meals.set(MealKey::Desayuno, true);
        meals.set(MealKey::Cena, true);

        let totals = reconcile_day(&DayInputs {
            base_kcal: 1600,
            goal_kcal: 1600,
            meals,
            extras_kcal: vec![150],
            exercise_kcal: vec![200],
            ..Default::default()
        });

        assert_eq!(totals.from_meals, 720);
        assert_eq!(totals.from_extras, 150);
        assert_eq!(totals.consumed, 870);
        assert_eq!(totals.burned, 200);
        assert_eq!(totals.net, 670);
        assert_eq!(totals.remaining, 930);
        assert_eq!(totals.percent, 42);
    }

    #[test]
    fn test_reconcile_cheat_replaces_slot() {
        let mut meals = MealFlags::default();
        meals.set(MealKey::Cena, true);
        meals.set(MealKey::Almuerzo, true);

        let totals = reconcile_day(&DayInputs {
            base_kcal: 1600,
            goal_kcal: 2200,
            meals,
            cheat: Some(CheatSlot { meal: MealKey::Cena, kcal: 1000 }),
            ..Default::default()
        });

        assert_eq!(totals.from_meals, 560);
        assert_eq!(totals.from_cheat, 1000);
        assert_eq!(totals.consumed, 1560);
        assert_eq!(totals.remaining, 640);
    }

    #[test]
    fn test_reconcile_cheat_not_eaten_yet() {
        let totals = reconcile_day(&DayInputs {
            base_kcal: 1600,
            goal_kcal: 2200,
            cheat: Some(CheatSlot { meal: MealKey::Cena, kcal: 1000 }),
            ..Default::default()
        });
        assert_eq!(totals.consumed, 0);
        assert_eq!(totals.remaining, 2200);
    }

    #[test]
    fn test_reconcile_zero_goal() {
        let totals = reconcile_day(&DayInputs { extras_kcal: vec![300], ..Default::default() });
        assert_eq!(totals.percent, 0);
        assert_eq!(totals.remaining, -300);
    }

    #[test]
    fn test_reconcile_huge_entries_saturate() {
        let totals = reconcile_day(&DayInputs {
            base_kcal: 1600,
            goal_kcal: 1600,
            extras_kcal: vec![i32::MAX, i32::MAX, -50],
            ..Default::default()
        });
        assert_eq!(totals.from_extras, i32::MAX);
        assert_eq!(totals.consumed, i32::MAX);
        assert_eq!(totals.remaining, 1600 - i32::MAX);
        assert!(totals.percent > 100);

        let totals = reconcile_day(&DayInputs {
            goal_kcal: 1600,
            extras_kcal: vec![100],
            exercise_kcal: vec![i32::MAX, i32::MAX],
            ..Default::default()
        });
        assert_eq!(totals.burned, i32::MAX);
        assert_eq!(totals.net, 100 - i32::MAX);
    }
}
