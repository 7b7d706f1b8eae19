//! Application state - database, profile and the built plan in one place
//!
//! Every screen and CLI command goes through a `Tracker`. The plan is rebuilt
//! whenever a profile change affects it (weeks, gender, language).

use chrono::{Local, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::calories::{self, CheatSlot, DayInputs, DayTotals, GoalInputs, MealFlags};
use crate::db::Database;
use crate::metrics::{self, Intensity, Metrics};
use crate::plan::{self, DayOverride, MealKey, MealSlot, MealSource, PlanDay};
use crate::store::{
    CalorieState, CheatMeal, CheatOutcome, DEFAULT_WATER_GOAL, ExerciseEntry, ExtraIntake, Store,
    UserProfile, WaterState, new_id,
};

/// Everything a day screen shows
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub day: usize,
    pub plan: PlanDay,
    pub meals: MealFlags,
    pub totals: DayTotals,
    pub water: WaterState,
    pub cheat: Option<CheatMeal>,
    pub extras: Vec<ExtraIntake>,
    pub exercises: Vec<ExerciseEntry>,
    pub completed: bool,
}

pub struct Tracker {
    db: Database,
    profile: UserProfile,
    plan: Vec<PlanDay>,
}

impl Tracker {
    /// Load the saved profile and build its plan
    pub fn open(db: Database) -> Self {
        let profile = Store::new(&db).profile();
        let plan = plan::build_plan(profile.plan_weeks, profile.gender, profile.language);
        info!("plan built: {} days ({} weeks)", plan.len(), profile.plan_weeks);
        Self { db, profile, plan }
    }

    pub fn store(&self) -> Store<'_> {
        Store::new(&self.db)
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn plan(&self) -> &[PlanDay] {
        &self.plan
    }

    pub fn total_days(&self) -> usize {
        self.plan.len()
    }

    /// Rebuild after a profile change; records past the new end are dropped
    pub fn rebuild_plan(&mut self) {
        let p = &self.profile;
        self.plan = plan::build_plan(p.plan_weeks, p.gender, p.language);
        info!("plan rebuilt: {} days", self.plan.len());
        self.store().purge_days_from(self.plan.len());
    }

    /// Apply `f` to the profile and persist it. Rebuilds the plan and
    /// re-syncs water goals when the change requires it.
    pub fn update_profile<F: FnOnce(&mut UserProfile)>(&mut self, f: F) -> bool {
        let before = self.profile.clone();
        f(&mut self.profile);

        let saved = self.store().save_profile(&self.profile);
        if !saved {
            warn!("profile could not be saved");
        }

        if before.plan_weeks != self.profile.plan_weeks
            || before.gender != self.profile.gender
            || before.language != self.profile.language
        {
            self.rebuild_plan();
        }

        let old_water = water_goal_of(&before);
        let new_water = self.water_goal();
        if old_water != new_water {
            self.store().sync_water_goal(new_water, self.total_days());
        }

        saved
    }

    pub fn set_water_goal(&mut self, goal: i32) -> bool {
        let goal = goal.max(0);
        self.update_profile(|p| p.water_goal = Some(goal))
    }

    /// Explicit goal, else one derived from weight and activity, else the default
    pub fn water_goal(&self) -> i32 {
        water_goal_of(&self.profile)
    }

    pub fn metrics(&self) -> Metrics {
        self.profile.metrics()
    }

    /// Plan day index for a calendar date, counted from the start date
    pub fn day_index_for(&self, date: NaiveDate) -> usize {
        let Some(start) = self.profile.start_date else {
            return 0;
        };
        let last = self.total_days().saturating_sub(1);
        let offset = (date - start).num_days().max(0) as usize;
        offset.min(last)
    }

    pub fn today(&self) -> usize {
        self.day_index_for(Local::now().date_naive())
    }

    pub fn base_day(&self, day: usize) -> Option<&PlanDay> {
        self.plan.get(day)
    }

    /// Plan day with the stored override merged in
    pub fn effective_day(&self, day: usize) -> Option<PlanDay> {
        let base = self.plan.get(day)?;
        let stored = self.store().day_override(day);
        Some(plan::merge_day(base, stored.as_ref()))
    }

    /// Personalized plan kcal for a day, before any cheat credit
    pub fn base_goal_for(&self, day: usize) -> i32 {
        let kcal = self.effective_day(day).map(|d| d.kcal).unwrap_or(plan::builder::DEFAULT_KCAL);
        let p = &self.profile;
        calories::personalized_base(kcal, p.gender, &self.metrics(), p.activity)
    }

    /// Dynamic daily goal including the cheat meal credit
    pub fn goal_for(&self, day: usize) -> i32 {
        let kcal = self.effective_day(day).map(|d| d.kcal).unwrap_or(plan::builder::DEFAULT_KCAL);
        calories::calculate_dynamic_daily_kcal(&GoalInputs {
            base_kcal: kcal,
            gender: self.profile.gender,
            metrics: self.metrics(),
            activity: self.profile.activity,
            cheat_kcal: self.store().cheat_meal(day).map(|c| c.kcal_estimate).unwrap_or(0),
        })
    }

    /// Recompute the goal and store it in the day's calorie record
    pub fn refresh_goal(&self, day: usize) -> i32 {
        let goal = self.goal_for(day);
        self.store().set_calorie_goal(day, goal);
        goal
    }

    /// Start the day over: meals, water, extras, exercise and overrides
    pub fn reset_day(&self, day: usize) -> bool {
        self.store().reset_day(day)
    }

    pub fn toggle_meal(&self, day: usize, meal: MealKey) -> Option<CalorieState> {
        let state = self.store().toggle_meal(day, meal, self.goal_for(day))?;
        if state.meals == MealFlags::all_done() {
            self.store().set_day_completed(day, true);
        }
        Some(state)
    }

    pub fn add_water(&self, day: usize, delta_ml: i32) -> Option<WaterState> {
        self.store().add_water(day, delta_ml, self.water_goal())
    }

    pub fn reset_water(&self, day: usize) -> Option<WaterState> {
        self.store().reset_water(day, self.water_goal())
    }

    /// Schedule a cheat meal; the day's goal picks up the credit
    pub fn set_cheat_meal(
        &self,
        day: usize,
        meal: MealKey,
        description: &str,
        kcal: i32,
    ) -> CheatOutcome {
        let cheat = CheatMeal {
            meal_key: meal,
            description: description.trim().to_string(),
            kcal_estimate: kcal.max(0),
            saved_at: Utc::now(),
        };
        let outcome = self.store().set_cheat_meal(day, &cheat, self.total_days());
        if outcome == CheatOutcome::Saved {
            self.refresh_goal(day);
        }
        outcome
    }

    pub fn remove_cheat_meal(&self, day: usize) -> bool {
        let removed = self.store().remove_cheat_meal(day);
        self.refresh_goal(day);
        removed
    }

    pub fn add_extra(&self, day: usize, extra: ExtraIntake) -> Option<Vec<ExtraIntake>> {
        self.store().add_extra(day, extra)
    }

    /// Log exercise with a MET-based kcal estimate (0 without a body weight)
    pub fn log_exercise(
        &self,
        day: usize,
        activity: &str,
        minutes: u32,
        intensity: Intensity,
    ) -> Option<ExerciseEntry> {
        let kcal = self
            .profile
            .weight_kg
            .and_then(|w| metrics::estimate_exercise_calories(w, minutes, intensity))
            .unwrap_or_else(|| {
                warn!("no body weight in profile, exercise logged without kcal");
                0
            });

        let entry = ExerciseEntry {
            id: new_id(),
            activity: activity.trim().to_string(),
            minutes,
            intensity,
            kcal,
            created_at: Utc::now(),
        };
        self.store().add_exercise(day, entry.clone())?;
        Some(entry)
    }

    /// Store a generated meal on top of the template slot
    pub fn apply_ai_meal(&self, day: usize, meal: MealKey, mut slot: MealSlot) -> bool {
        slot.is_ai = true;
        slot.source = Some(MealSource::Ai);
        self.store().save_meal(day, meal, &slot)
    }

    /// Store a generated day; slots it leaves out keep their current content
    pub fn apply_ai_day(&self, day: usize, mut generated: DayOverride) -> Option<PlanDay> {
        for key in MealKey::ALL {
            if let Some(meal) = generated.meal(key) {
                let mut meal = meal.clone();
                meal.is_ai = Some(true);
                meal.source = Some(MealSource::Ai);
                generated.set_meal(key, meal);
            }
        }
        self.store().apply_override(day, &generated)?;
        self.refresh_goal(day);
        self.effective_day(day)
    }

    pub fn summary(&self, day: usize) -> Option<DaySummary> {
        let plan = self.effective_day(day)?;
        let store = self.store();

        let goal = self.goal_for(day);
        let state = store.calorie_state(day, goal);
        let cheat = store.cheat_meal(day);
        let extras = store.extras(day);
        let exercises = store.exercises(day);

        let totals = calories::reconcile_day(&DayInputs {
            base_kcal: self.base_goal_for(day),
            goal_kcal: goal,
            meals: state.meals,
            cheat: cheat.as_ref().map(|c| CheatSlot { meal: c.meal_key, kcal: c.kcal_estimate }),
            extras_kcal: extras.iter().map(|e| e.kcal_estimate).collect(),
            exercise_kcal: exercises.iter().map(|e| e.kcal).collect(),
        });

        Some(DaySummary {
            day,
            plan,
            meals: state.meals,
            totals,
            water: store.water_state(day, self.water_goal()),
            cheat,
            extras,
            exercises,
            completed: store.is_day_completed(day),
        })
    }

    /// Plain-text recap used as the AI review input
    pub fn review_text(&self, day: usize) -> Option<String> {
        let s = self.summary(day)?;
        let lang = self.profile.language;
        let mut lines = vec![format!(
            "{}: {} kcal goal, {} consumed, {} burned, {} remaining",
            s.plan.day_label, s.totals.goal, s.totals.consumed, s.totals.burned, s.totals.remaining
        )];
        for (key, slot) in s.plan.meals.iter() {
            let mark = if s.meals.get(key) { "x" } else { " " };
            lines.push(format!("[{}] {}: {}", mark, key.label(lang), slot.name));
        }
        if let Some(cheat) = &s.cheat {
            lines.push(format!("cheat: {} (~{} kcal)", cheat.description, cheat.kcal_estimate));
        }
        for extra in &s.extras {
            lines.push(format!("extra: {} (~{} kcal)", extra.description, extra.kcal_estimate));
        }
        for ex in &s.exercises {
            lines.push(format!("exercise: {} {} min ({} kcal)", ex.activity, ex.minutes, ex.kcal));
        }
        lines.push(format!("water: {}/{} ml", s.water.ml, s.water.goal));
        Some(lines.join("\n"))
    }
}

fn water_goal_of(profile: &UserProfile) -> i32 {
    profile
        .water_goal
        .filter(|g| *g > 0)
        .or_else(|| {
            profile
                .weight_kg
                .and_then(|w| metrics::calculate_water_goal(w, profile.activity))
        })
        .unwrap_or(DEFAULT_WATER_GOAL)
}
