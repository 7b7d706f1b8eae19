//! Typed repository over the key-value database
//!
//! Each record lives under a key built by `db::keys`. Reads fall back to
//! defaults, writes report success as `bool`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::calories::MealFlags;
use crate::db::Database;
use crate::db::keys::{self, Entity};
use crate::metrics::{ActivityLevel, Intensity, Metrics};
use crate::plan::builder::{days_of_week, week_of};
use crate::plan::{DayOverride, Gender, Language, MealKey, MealOverride, MealSlot};

pub const DEFAULT_WATER_GOAL: i32 = 2000;
pub const DEFAULT_PLAN_WEEKS: i32 = 4;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CalorieState {
    pub goal: i32,
    #[serde(default)]
    pub meals: MealFlags,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct WaterState {
    pub goal: i32,
    pub ml: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheatMeal {
    pub meal_key: MealKey,
    pub description: String,
    pub kcal_estimate: i32,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExtraIntake {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub portion: String,
    pub kcal_estimate: i32,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub estimated_by_ai: bool,
    pub created_at: DateTime<Utc>,
}

impl ExtraIntake {
    pub fn new(description: impl Into<String>, portion: impl Into<String>, kcal: i32) -> Self {
        Self {
            id: new_id(),
            description: description.into(),
            portion: portion.into(),
            kcal_estimate: kcal,
            note: String::new(),
            estimated_by_ai: false,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseEntry {
    pub id: String,
    pub activity: String,
    pub minutes: u32,
    pub intensity: Intensity,
    pub kcal: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingItem {
    pub name: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub checked: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    System,
    Light,
    Dark,
}

/// Global user settings and biometrics
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub gender: Gender,
    pub language: Language,
    pub plan_weeks: i32,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub age: Option<u32>,
    pub target_weight_kg: Option<f64>,
    pub water_goal: Option<i32>,
    pub activity: ActivityLevel,
    pub workout_intensity: Intensity,
    pub theme: Theme,
    pub ai_user: Option<String>,
    pub ai_pass: Option<String>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: String::new(),
            start_date: None,
            gender: Gender::default(),
            language: Language::default(),
            plan_weeks: DEFAULT_PLAN_WEEKS,
            height_cm: None,
            weight_kg: None,
            age: None,
            target_weight_kg: None,
            water_goal: None,
            activity: ActivityLevel::default(),
            workout_intensity: Intensity::default(),
            theme: Theme::default(),
            ai_user: None,
            ai_pass: None,
        }
    }
}

impl UserProfile {
    pub fn metrics(&self) -> Metrics {
        Metrics {
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            age: self.age,
        }
    }
}

/// Result of trying to schedule a cheat meal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheatOutcome {
    Saved,
    /// Another day of the same week already holds one
    WeekTaken(usize),
    /// Storage rejected the write
    Failed,
}

/// Timestamp-based id with a random suffix
pub fn new_id() -> String {
    format!("{}-{:04x}", Utc::now().timestamp_millis(), rand::random::<u16>())
}

/// Typed accessors over a `Database`
pub struct Store<'a> {
    db: &'a Database,
}

impl<'a> Store<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    // --- calorie state ---

    pub fn calorie_state(&self, day: usize, default_goal: i32) -> CalorieState {
        self.db.get_json(
            &keys::day(Entity::Calories, day),
            CalorieState { goal: default_goal, meals: MealFlags::default() },
        )
    }

    pub fn set_calorie_goal(&self, day: usize, goal: i32) -> Option<CalorieState> {
        self.db.update_json(
            &keys::day(Entity::Calories, day),
            CalorieState { goal, meals: MealFlags::default() },
            |state| state.goal = goal,
        )
    }

    /// Flip one meal flag atomically, returning the new state
    pub fn toggle_meal(
        &self,
        day: usize,
        meal: MealKey,
        default_goal: i32,
    ) -> Option<CalorieState> {
        self.db.update_json(
            &keys::day(Entity::Calories, day),
            CalorieState { goal: default_goal, meals: MealFlags::default() },
            |state| {
                state.meals.toggle(meal);
            },
        )
    }

    pub fn set_meal_done(
        &self,
        day: usize,
        meal: MealKey,
        done: bool,
        default_goal: i32,
    ) -> Option<CalorieState> {
        self.db.update_json(
            &keys::day(Entity::Calories, day),
            CalorieState { goal: default_goal, meals: MealFlags::default() },
            |state| state.meals.set(meal, done),
        )
    }

    // --- water ---

    pub fn water_state(&self, day: usize, default_goal: i32) -> WaterState {
        self.db.get_json(&keys::day(Entity::Water, day), WaterState { goal: default_goal, ml: 0 })
    }

    /// Add (or subtract) ml, never going below zero
    pub fn add_water(&self, day: usize, delta_ml: i32, default_goal: i32) -> Option<WaterState> {
        self.db.update_json(
            &keys::day(Entity::Water, day),
            WaterState { goal: default_goal, ml: 0 },
            |state| state.ml = state.ml.saturating_add(delta_ml).max(0),
        )
    }

    pub fn reset_water(&self, day: usize, goal: i32) -> Option<WaterState> {
        let state = WaterState { goal, ml: 0 };
        self.db.set_json(&keys::day(Entity::Water, day), &state).then_some(state)
    }

    /// Push a new global goal into every day's water record
    pub fn sync_water_goal(&self, goal: i32, total_days: usize) -> usize {
        let updated = (0..total_days)
            .filter(|day| {
                let key = keys::day(Entity::Water, *day);
                self.db
                    .update_json(&key, WaterState { goal, ml: 0 }, |s| s.goal = goal)
                    .is_some()
            })
            .count();
        info!("water goal {} ml synced to {} days", goal, updated);
        updated
    }

    // --- meal overrides ---

    pub fn day_override(&self, day: usize) -> Option<DayOverride> {
        self.db.get_json_opt(&keys::day(Entity::Meals, day))
    }

    pub fn save_day_override(&self, day: usize, ov: &DayOverride) -> bool {
        self.db.set_json(&keys::day(Entity::Meals, day), ov)
    }

    /// Store a whole slot on top of the template
    pub fn save_meal(&self, day: usize, meal: MealKey, slot: &MealSlot) -> bool {
        self.db
            .update_json(&keys::day(Entity::Meals, day), DayOverride::default(), |ov| {
                ov.set_meal(meal, MealOverride::from_slot(slot))
            })
            .is_some()
    }

    /// Drop a slot override, falling back to the template
    pub fn reset_meal(&self, day: usize, meal: MealKey) -> bool {
        let key = keys::day(Entity::Meals, day);
        self.db
            .update_json(&key, DayOverride::default(), |ov| ov.clear_meal(meal))
            .is_some()
    }

    /// Layer an incoming override (e.g. a generated day) onto the stored one
    pub fn apply_override(&self, day: usize, incoming: &DayOverride) -> Option<DayOverride> {
        self.db.update_json(&keys::day(Entity::Meals, day), DayOverride::default(), |ov| {
            if incoming.day_label.is_some() {
                ov.day_label = incoming.day_label.clone();
            }
            if incoming.kcal.is_some() {
                ov.kcal = incoming.kcal;
            }
            if incoming.macros.is_some() {
                ov.macros = incoming.macros;
            }
            for key in MealKey::ALL {
                if let Some(meal) = incoming.meal(key) {
                    ov.set_meal(key, meal.clone());
                }
            }
        })
    }

    pub fn clear_override(&self, day: usize) -> bool {
        self.db.remove(&keys::day(Entity::Meals, day))
    }

    // --- cheat meals ---

    pub fn cheat_meal(&self, day: usize) -> Option<CheatMeal> {
        self.db.get_json_opt(&keys::day(Entity::Cheat, day))
    }

    /// Day of `day`'s week (other than `day`) that already has a cheat meal
    pub fn cheat_in_week(&self, day: usize, total_days: usize) -> Option<usize> {
        days_of_week(week_of(day), total_days.max(day + 1))
            .filter(|d| *d != day)
            .find(|d| self.cheat_meal(*d).is_some())
    }

    /// At most one cheat meal per 7-day week
    pub fn set_cheat_meal(&self, day: usize, meal: &CheatMeal, total_days: usize) -> CheatOutcome {
        if let Some(other) = self.cheat_in_week(day, total_days) {
            return CheatOutcome::WeekTaken(other);
        }
        if !self.db.set_json(&keys::day(Entity::Cheat, day), meal) {
            return CheatOutcome::Failed;
        }
        CheatOutcome::Saved
    }

    pub fn remove_cheat_meal(&self, day: usize) -> bool {
        self.db.remove(&keys::day(Entity::Cheat, day))
    }

    // --- extras ---

    pub fn extras(&self, day: usize) -> Vec<ExtraIntake> {
        self.db.get_json(&keys::day(Entity::Extras, day), Vec::new())
    }

    /// The day's list after the append, `None` if it was not stored
    pub fn add_extra(&self, day: usize, extra: ExtraIntake) -> Option<Vec<ExtraIntake>> {
        let key = keys::day(Entity::Extras, day);
        self.db
            .update_json(&key, Vec::new(), |list: &mut Vec<ExtraIntake>| list.push(extra))
    }

    /// Returns whether an entry with `id` was removed and the change stored
    pub fn remove_extra(&self, day: usize, id: &str) -> bool {
        let mut removed = false;
        let key = keys::day(Entity::Extras, day);
        let saved = self.db.update_json(&key, Vec::new(), |list: &mut Vec<ExtraIntake>| {
            let before = list.len();
            list.retain(|e| e.id != id);
            removed = list.len() != before;
        });
        saved.is_some() && removed
    }

    // --- exercise ---

    pub fn exercises(&self, day: usize) -> Vec<ExerciseEntry> {
        self.db.get_json(&keys::day(Entity::Exercise, day), Vec::new())
    }

    pub fn add_exercise(&self, day: usize, entry: ExerciseEntry) -> Option<Vec<ExerciseEntry>> {
        let key = keys::day(Entity::Exercise, day);
        self.db
            .update_json(&key, Vec::new(), |list: &mut Vec<ExerciseEntry>| list.push(entry))
    }

    pub fn remove_exercise(&self, day: usize, id: &str) -> bool {
        let mut removed = false;
        let key = keys::day(Entity::Exercise, day);
        let saved = self.db.update_json(&key, Vec::new(), |list: &mut Vec<ExerciseEntry>| {
            let before = list.len();
            list.retain(|e| e.id != id);
            removed = list.len() != before;
        });
        saved.is_some() && removed
    }

    // --- completion ---

    pub fn is_day_completed(&self, day: usize) -> bool {
        self.db.get(&keys::day(Entity::Done, day), "0") == "1"
    }

    pub fn set_day_completed(&self, day: usize, done: bool) -> bool {
        self.db.set(&keys::day(Entity::Done, day), if done { "1" } else { "0" })
    }

    /// Days that have a stored record of `entity`, ascending
    pub fn logged_days(&self, entity: Entity) -> Vec<usize> {
        let mut days: Vec<usize> = self
            .db
            .keys_with_prefix(&keys::day_prefix(entity))
            .iter()
            .filter_map(|k| keys::parse_day(entity, k))
            .collect();
        days.sort_unstable();
        days
    }

    /// Drop everything stored for one day
    pub fn reset_day(&self, day: usize) -> bool {
        Entity::PER_DAY
            .iter()
            .map(|e| self.db.remove(&keys::day(*e, day)))
            .fold(true, |ok, removed| ok && removed)
    }

    /// Drop day records at or past `first_day`, e.g. after the plan shrank
    pub fn purge_days_from(&self, first_day: usize) -> usize {
        let mut purged = 0;
        for entity in Entity::PER_DAY {
            for day in self.logged_days(entity).into_iter().filter(|d| *d >= first_day) {
                if self.db.remove(&keys::day(entity, day)) {
                    purged += 1;
                }
            }
        }
        if purged > 0 {
            info!("purged {} day records from day {}", purged, first_day);
        }
        purged
    }

    // --- profile ---

    pub fn profile(&self) -> UserProfile {
        self.db.get_json(&keys::profile(), UserProfile::default())
    }

    pub fn save_profile(&self, profile: &UserProfile) -> bool {
        self.db.set_json(&keys::profile(), profile)
    }

    // --- shopping lists ---

    pub fn shopping_list(&self, week: usize) -> Vec<ShoppingItem> {
        self.db.get_json(&keys::week(Entity::Shopping, week), Vec::new())
    }

    pub fn save_shopping_list(&self, week: usize, items: &[ShoppingItem]) -> bool {
        self.db.set_json(&keys::week(Entity::Shopping, week), &items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        Database::open(":memory:").unwrap()
    }

    fn cheat(meal: MealKey, kcal: i32) -> CheatMeal {
        CheatMeal {
            meal_key: meal,
            description: "pizza".to_string(),
            kcal_estimate: kcal,
            saved_at: Utc::now(),
        }
    }

    #[test]
    fn test_calorie_state_default() {
        let db = db();
        let store = Store::new(&db);
        let state = store.calorie_state(3, 1600);
        assert_eq!(state.goal, 1600);
        assert_eq!(state.meals.count_done(), 0);
    }

    #[test]
    fn test_toggle_meal_persists() {
        let db = db();
        let store = Store::new(&db);

        let s = store.toggle_meal(0, MealKey::Almuerzo, 1600).unwrap();
        assert!(s.meals.almuerzo);
        assert!(store.calorie_state(0, 1).meals.almuerzo);

        let s = store.toggle_meal(0, MealKey::Almuerzo, 1600).unwrap();
        assert!(!s.meals.almuerzo);
    }

    #[test]
    fn test_goal_update_keeps_flags() {
        let db = db();
        let store = Store::new(&db);
        store.set_meal_done(1, MealKey::Cena, true, 1600);
        let s = store.set_calorie_goal(1, 2200).unwrap();
        assert_eq!(s.goal, 2200);
        assert!(s.meals.cena);
    }

    #[test]
    fn test_add_water_exact_and_clamped() {
        let db = db();
        let store = Store::new(&db);

        let before = store.water_state(2, 2000).ml;
        let s = store.add_water(2, 250, 2000).unwrap();
        assert_eq!(s.ml, before + 250);
        let s = store.add_water(2, 500, 2000).unwrap();
        assert_eq!(s.ml, 750);

        let s = store.add_water(2, -1000, 2000).unwrap();
        assert_eq!(s.ml, 0);
    }

    #[test]
    fn test_reset_water() {
        let db = db();
        let store = Store::new(&db);
        store.add_water(0, 800, 2000);

        let s = store.reset_water(0, 2500).unwrap();
        assert_eq!(s, WaterState { goal: 2500, ml: 0 });
        assert_eq!(store.water_state(0, 1).ml, 0);
        assert_eq!(store.water_state(0, 1).goal, 2500);
    }

    #[test]
    fn test_sync_water_goal_keeps_intake() {
        let db = db();
        let store = Store::new(&db);
        store.add_water(4, 600, 2000);

        assert_eq!(store.sync_water_goal(2800, 14), 14);
        assert_eq!(store.water_state(4, 0), WaterState { goal: 2800, ml: 600 });
        assert_eq!(store.water_state(13, 0).goal, 2800);
    }

    #[test]
    fn test_save_meal_merges_into_override() {
        let db = db();
        let store = Store::new(&db);

        store.save_meal(5, MealKey::Desayuno, &MealSlot::new("Tortilla", "3 huevos"));
        store.save_meal(5, MealKey::Cena, &MealSlot::new("Sopa", "caldo"));

        let ov = store.day_override(5).unwrap();
        assert_eq!(ov.meal(MealKey::Desayuno).unwrap().name.as_deref(), Some("Tortilla"));
        assert_eq!(ov.meal(MealKey::Cena).unwrap().qty.as_deref(), Some("caldo"));

        store.reset_meal(5, MealKey::Cena);
        assert!(store.day_override(5).unwrap().meal(MealKey::Cena).is_none());

        store.clear_override(5);
        assert!(store.day_override(5).is_none());
    }

    #[test]
    fn test_apply_override_keeps_untouched_slots() {
        let db = db();
        let store = Store::new(&db);
        store.save_meal(0, MealKey::Desayuno, &MealSlot::new("Manual", "x"));

        let mut incoming = DayOverride { kcal: Some(1700), ..Default::default() };
        let generated = MealOverride { name: Some("IA".into()), ..Default::default() };
        incoming.set_meal(MealKey::Cena, generated);

        let ov = store.apply_override(0, &incoming).unwrap();
        assert_eq!(ov.kcal, Some(1700));
        assert_eq!(ov.meal(MealKey::Desayuno).unwrap().name.as_deref(), Some("Manual"));
        assert_eq!(ov.meal(MealKey::Cena).unwrap().name.as_deref(), Some("IA"));
    }

    #[test]
    fn test_reset_and_purge_days() {
        let db = db();
        let store = Store::new(&db);
        store.add_water(3, 500, 2000);
        store.add_water(20, 500, 2000);
        store.add_extra(20, ExtraIntake::new("queso", "", 120));
        store.set_day_completed(3, true);

        assert_eq!(store.logged_days(Entity::Water), vec![3, 20]);

        assert!(store.reset_day(3));
        assert_eq!(store.water_state(3, 2000).ml, 0);
        assert!(!store.is_day_completed(3));

        assert_eq!(store.purge_days_from(14), 2);
        assert!(store.logged_days(Entity::Water).is_empty());
        assert!(store.extras(20).is_empty());
    }

    #[test]
    fn test_one_cheat_meal_per_week() {
        let db = db();
        let store = Store::new(&db);

        assert_eq!(store.set_cheat_meal(2, &cheat(MealKey::Cena, 900), 28), CheatOutcome::Saved);
        assert_eq!(
            store.set_cheat_meal(5, &cheat(MealKey::Cena, 700), 28),
            CheatOutcome::WeekTaken(2)
        );
        // next week is free
        assert_eq!(
            store.set_cheat_meal(8, &cheat(MealKey::Almuerzo, 700), 28),
            CheatOutcome::Saved
        );
        // replacing the same day is allowed
        assert_eq!(
            store.set_cheat_meal(2, &cheat(MealKey::Almuerzo, 800), 28),
            CheatOutcome::Saved
        );
        assert_eq!(store.cheat_meal(2).unwrap().kcal_estimate, 800);

        store.remove_cheat_meal(2);
        assert_eq!(store.set_cheat_meal(5, &cheat(MealKey::Cena, 700), 28), CheatOutcome::Saved);
    }

    #[test]
    fn test_failed_writes_are_reported() {
        let db = db();
        let store = Store::new(&db);
        store.add_water(0, 400, 2000);
        let extra = ExtraIntake::new("nueces", "20 g", 130);
        let extra_id = extra.id.clone();
        store.add_extra(0, extra);
        db.make_read_only();

        assert_eq!(store.set_cheat_meal(2, &cheat(MealKey::Cena, 900), 28), CheatOutcome::Failed);
        assert!(store.cheat_meal(2).is_none());

        assert!(store.reset_water(0, 2000).is_none());
        assert_eq!(store.water_state(0, 2000).ml, 400);

        assert!(store.add_extra(0, ExtraIntake::new("queso", "30 g", 120)).is_none());
        assert!(!store.remove_extra(0, &extra_id));
        assert_eq!(store.extras(0).len(), 1);
        assert!(!store.save_shopping_list(0, &[]));
    }

    #[test]
    fn test_extras_add_remove() {
        let db = db();
        let store = Store::new(&db);

        let a = ExtraIntake::new("queso", "30 g", 120);
        let b = ExtraIntake::new("nueces", "20 g", 130);
        let a_id = a.id.clone();

        store.add_extra(0, a);
        let list = store.add_extra(0, b).unwrap();
        assert_eq!(list.len(), 2);

        assert!(store.remove_extra(0, &a_id));
        assert!(!store.remove_extra(0, "missing"));
        let list = store.extras(0);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].description, "nueces");
    }

    #[test]
    fn test_exercise_log() {
        let db = db();
        let store = Store::new(&db);
        let entry = ExerciseEntry {
            id: "run-1".to_string(),
            activity: "run".to_string(),
            minutes: 30,
            intensity: Intensity::High,
            kcal: 300,
            created_at: Utc::now(),
        };
        store.add_exercise(1, entry);
        assert_eq!(store.exercises(1).len(), 1);
        assert!(store.remove_exercise(1, "run-1"));
        assert!(store.exercises(1).is_empty());
    }

    #[test]
    fn test_completion_flag_is_string() {
        let db = db();
        let store = Store::new(&db);
        assert!(!store.is_day_completed(0));
        store.set_day_completed(0, true);
        assert!(store.is_day_completed(0));
        assert_eq!(db.get(&keys::day(Entity::Done, 0), ""), "1");
        store.set_day_completed(0, false);
        assert_eq!(db.get(&keys::day(Entity::Done, 0), ""), "0");
    }

    #[test]
    fn test_profile_defaults_and_partial_json() {
        let db = db();
        let store = Store::new(&db);
        assert_eq!(store.profile().plan_weeks, DEFAULT_PLAN_WEEKS);

        db.set(&keys::profile(), r#"{"name":"Ana","gender":"female","heightCm":165.0}"#);
        let p = store.profile();
        assert_eq!(p.name, "Ana");
        assert_eq!(p.gender, Gender::Female);
        assert_eq!(p.plan_weeks, DEFAULT_PLAN_WEEKS);
        assert_eq!(p.metrics().height_cm, Some(165.0));
    }

    #[test]
    fn test_shopping_list() {
        let db = db();
        let store = Store::new(&db);
        let items = vec![ShoppingItem {
            name: "huevos".into(),
            quantity: "24".into(),
            category: "proteína".into(),
            checked: false,
        }];
        assert!(store.save_shopping_list(1, &items));
        assert_eq!(store.shopping_list(1), items);
        assert!(store.shopping_list(0).is_empty());
    }
}
