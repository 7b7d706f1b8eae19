//! ketoday - keto meal plan and daily tracker

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ketoday::ai::{self, AiError, MealRequest};
use ketoday::calories;
use ketoday::config::Config;
use ketoday::metrics::{self, ActivityLevel, Intensity};
use ketoday::plan::builder::{DAYS_PER_WEEK, days_of_week, week_of};
use ketoday::plan::{Gender, Language, MealKey};
use ketoday::progress;
use ketoday::store::{CheatOutcome, ExtraIntake};
use ketoday::tui::App;
use ketoday::{Database, Tracker};

#[derive(Parser)]
#[command(name = "ketoday")]
#[command(author, version, about = "Keto meal plan and daily tracker")]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open TUI dashboard
    Tui,

    /// Show the meal plan
    Plan {
        /// Week number (1-based); whole plan if omitted
        #[arg(short, long)]
        week: Option<usize>,
    },

    /// Show one day: meals, calories, water
    Day {
        /// Day number (1-based); today if omitted
        day: Option<usize>,

        /// Print as JSON
        #[arg(long)]
        json: bool,

        /// Clear everything logged for the day
        #[arg(long)]
        reset: bool,
    },

    /// Mark a meal done / not done
    Toggle {
        /// desayuno, snackAM, almuerzo, snackPM, cena (or 1-5)
        meal: String,

        #[arg(short, long)]
        day: Option<usize>,
    },

    /// Log water intake
    Water {
        /// ml to add (negative to subtract)
        #[arg(allow_hyphen_values = true, default_value = "250")]
        ml: i32,

        #[arg(short, long)]
        day: Option<usize>,

        /// Reset the day's intake to zero
        #[arg(long)]
        reset: bool,

        /// Set the daily goal for every day
        #[arg(long)]
        goal: Option<i32>,
    },

    /// Schedule (or remove) the week's cheat meal
    Cheat {
        /// Meal slot it replaces
        meal: Option<String>,

        /// What you will eat
        description: Option<String>,

        /// Estimated kcal; asked to the AI when omitted
        #[arg(short, long)]
        kcal: Option<i32>,

        #[arg(short, long)]
        day: Option<usize>,

        #[arg(long)]
        remove: bool,
    },

    /// Log food outside the plan
    Extra {
        description: Option<String>,

        #[arg(short, long, default_value = "")]
        portion: String,

        /// kcal; asked to the AI when omitted
        #[arg(short, long)]
        kcal: Option<i32>,

        #[arg(short, long)]
        day: Option<usize>,

        /// Remove the entry with this id
        #[arg(long)]
        remove: Option<String>,
    },

    /// Log exercise
    Exercise {
        activity: Option<String>,

        #[arg(short, long, default_value = "30")]
        minutes: u32,

        /// low, moderate, high (profile setting if omitted)
        #[arg(short, long)]
        intensity: Option<String>,

        #[arg(short, long)]
        day: Option<usize>,

        /// Remove the entry with this id
        #[arg(long)]
        remove: Option<String>,
    },

    /// Body metrics from the profile
    Metrics,

    /// Show or update the profile
    Profile {
        #[arg(long)]
        name: Option<String>,
        /// Plan start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        gender: Option<String>,
        /// es | en
        #[arg(long)]
        lang: Option<String>,
        #[arg(long)]
        weeks: Option<i32>,
        #[arg(long)]
        height: Option<f64>,
        #[arg(long)]
        weight: Option<f64>,
        #[arg(long)]
        age: Option<u32>,
        #[arg(long)]
        target: Option<f64>,
        /// sedentary, light, moderate, active, veryActive
        #[arg(long)]
        activity: Option<String>,
        /// low, moderate, high
        #[arg(long)]
        intensity: Option<String>,
        /// Store AI credentials in the profile
        #[arg(long)]
        save_ai_user: Option<String>,
        #[arg(long)]
        save_ai_pass: Option<String>,
    },

    /// AI helpers
    Ai {
        #[command(subcommand)]
        command: AiCommand,
    },

    /// Progress report
    Report {
        /// Week number (1-based); whole plan if omitted
        #[arg(short, long)]
        week: Option<usize>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum AiCommand {
    /// Replace one meal with a generated one
    Meal {
        meal: String,
        #[arg(short, long)]
        day: Option<usize>,
        #[arg(short, long, default_value = "")]
        prefs: String,
    },
    /// Generate a whole day
    Day {
        #[arg(short, long)]
        day: Option<usize>,
        #[arg(short, long, default_value = "")]
        prefs: String,
    },
    /// Generate a home workout
    Workout {
        #[arg(short, long, default_value = "30")]
        minutes: u32,
        #[arg(short, long)]
        intensity: Option<String>,
        #[arg(short, long, default_value = "")]
        prefs: String,
    },
    /// Shopping list for a week
    Shopping {
        #[arg(short, long)]
        week: Option<usize>,
    },
    /// Feedback on a day
    Review {
        #[arg(short, long)]
        day: Option<usize>,
    },
    /// Estimate kcal of a food
    Kcal {
        description: String,
        #[arg(short, long, default_value = "")]
        portion: String,
    },
}

/// 1-based CLI day to plan index, defaulting to today
fn resolve_day(tracker: &Tracker, day: Option<usize>) -> Result<usize> {
    let Some(day) = day else {
        return Ok(tracker.today());
    };
    if day == 0 || day > tracker.total_days() {
        bail!("day must be between 1 and {}", tracker.total_days());
    }
    Ok(day - 1)
}

fn resolve_week(tracker: &Tracker, week: Option<usize>) -> Result<usize> {
    let weeks = tracker.total_days().div_ceil(DAYS_PER_WEEK);
    match week {
        None => Ok(week_of(tracker.today())),
        Some(w) if w >= 1 && w <= weeks => Ok(w - 1),
        Some(_) => bail!("week must be between 1 and {}", weeks),
    }
}

fn parse_meal(value: &str) -> Result<MealKey> {
    MealKey::parse(value).with_context(|| format!("unknown meal '{}'", value))
}

fn parse_intensity(tracker: &Tracker, value: Option<&str>) -> Result<Intensity> {
    match value {
        None => Ok(tracker.profile().workout_intensity),
        Some(v) => Intensity::parse(v).with_context(|| format!("unknown intensity '{}'", v)),
    }
}

fn ai_failure(e: AiError, lang: Language) -> anyhow::Error {
    tracing::warn!("AI call failed: {}", e);
    anyhow::anyhow!("{}", ai::error_message(&e, lang))
}

fn print_day(tracker: &Tracker, day: usize) -> Result<()> {
    let s = tracker.summary(day).context("day outside the plan")?;
    let lang = tracker.profile().language;

    println!("{} · {} kcal · {}", s.plan.day_label, s.totals.goal, s.plan.macros);
    println!("{:-<60}", "");
    for (i, (key, slot)) in s.plan.meals.iter().enumerate() {
        let mark = if s.meals.get(key) { "x" } else { " " };
        let ai = if slot.is_ai { " (AI)" } else { "" };
        println!(
            "{} [{}] {:10} {}{} ({} kcal)",
            i + 1,
            mark,
            key.label(lang),
            slot.name,
            ai,
            calories::planned_meal_kcal(tracker.base_goal_for(day), key)
        );
        println!("         {}", slot.qty);
    }
    if let Some(c) = &s.cheat {
        println!(
            "cheat: {} · {} (~{} kcal)",
            c.meal_key.label(lang),
            c.description,
            c.kcal_estimate
        );
        println!("       {}", calories::cheat_credit_note(lang));
    }
    for e in &s.extras {
        println!("extra [{}]: {} {} (~{} kcal)", e.id, e.description, e.portion, e.kcal_estimate);
    }
    for e in &s.exercises {
        println!(
            "exercise [{}]: {} {} min {} ({} kcal)",
            e.id,
            e.activity,
            e.minutes,
            e.intensity.as_str(),
            e.kcal
        );
    }
    println!("{:-<60}", "");
    println!(
        "consumed {} · burned {} · net {} · remaining {} ({}%)",
        s.totals.consumed, s.totals.burned, s.totals.net, s.totals.remaining, s.totals.percent
    );
    println!("water {} / {} ml", s.water.ml, s.water.goal);
    if s.completed {
        println!("day completed");
    }
    Ok(())
}

fn print_metrics(tracker: &Tracker) {
    let p = tracker.profile();
    let m = p.metrics();
    let lang = p.language;

    match m.bmi() {
        Some(bmi) => println!(
            "BMI:          {:.1} ({})",
            bmi,
            metrics::get_bmi_category(bmi, lang)
        ),
        None => println!("BMI:          - (set height and weight)"),
    }
    if let Some(bmr) = m.bmr(p.gender) {
        println!("BMR:          {} kcal", bmr);
    }
    if let Some(tdee) = m.tdee(p.gender, p.activity) {
        println!("TDEE:         {} kcal", tdee);
    }
    if let Some(bf) = m.body_fat(p.gender) {
        println!("Body fat:     {:.1}%", bf);
    }
    if let Some(ideal) = p.height_cm.and_then(|h| metrics::calculate_ideal_weight(h, p.gender)) {
        println!("Ideal weight: {:.1} kg", ideal);
    }
    println!("Water goal:   {} ml", tracker.water_goal());

    if let (Some(current), Some(target)) = (p.weight_kg, p.target_weight_kg) {
        let weeks = p.plan_weeks.max(1) as u32;
        match metrics::calculate_deficit_for_weight_loss(current, target, weeks) {
            Some(plan) => {
                println!(
                    "To lose {:.1} kg in {} weeks: {} kcal/day deficit, {:.1} kg/week{}",
                    plan.kg_to_lose,
                    p.plan_weeks,
                    plan.daily_deficit,
                    plan.weekly_loss_kg,
                    if plan.healthy { "" } else { " (too aggressive)" }
                );
            }
            None => println!("Target weight reached"),
        }
    }
}

fn print_profile(tracker: &Tracker) -> Result<()> {
    let mut p = tracker.profile().clone();
    if p.ai_pass.is_some() {
        p.ai_pass = Some("***".to_string());
    }
    println!("{}", serde_json::to_string_pretty(&p)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db = Database::open(&cli.config.db).with_context(|| format!("opening {}", cli.config.db))?;
    let mut tracker = Tracker::open(db);
    let lang = tracker.profile().language;

    match cli.command {
        Some(Commands::Tui) | None => {
            let mut app = App::new(tracker);
            app.run()?;
        }

        Some(Commands::Plan { week }) => {
            let range = match week {
                Some(_) => days_of_week(resolve_week(&tracker, week)?, tracker.total_days()),
                None => 0..tracker.total_days(),
            };
            for day in range {
                let Some(d) = tracker.effective_day(day) else { continue };
                println!("{:10} {:>5} kcal  {}", d.day_label, d.kcal, d.macros);
                for (key, slot) in d.meals.iter() {
                    println!("    {:10} {}", key.label(lang), slot.name);
                }
            }
        }

        Some(Commands::Day { day, json, reset }) => {
            let day = resolve_day(&tracker, day)?;
            if reset && !tracker.reset_day(day) {
                bail!("could not reset day {}", day + 1);
            }
            if json {
                let summary = tracker.summary(day).context("day outside the plan")?;
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_day(&tracker, day)?;
            }
        }

        Some(Commands::Toggle { meal, day }) => {
            let day = resolve_day(&tracker, day)?;
            let meal = parse_meal(&meal)?;
            let state = tracker.toggle_meal(day, meal).context("could not save meal state")?;
            println!(
                "{}: {} ({}/5)",
                meal.label(lang),
                if state.meals.get(meal) { "done" } else { "not done" },
                state.meals.count_done()
            );
        }

        Some(Commands::Water { ml, day, reset, goal }) => {
            if let Some(goal) = goal {
                if !tracker.set_water_goal(goal) {
                    bail!("could not save water goal");
                }
                println!("Water goal: {} ml", tracker.water_goal());
            } else {
                let day = resolve_day(&tracker, day)?;
                let state = if reset {
                    tracker.reset_water(day).context("could not reset water")?
                } else {
                    tracker.add_water(day, ml).context("could not save water")?
                };
                println!("Water: {} / {} ml", state.ml, state.goal);
            }
        }

        Some(Commands::Cheat { meal, description, kcal, day, remove }) => {
            let day = resolve_day(&tracker, day)?;
            if remove {
                if !tracker.remove_cheat_meal(day) {
                    bail!("could not remove cheat meal for day {}", day + 1);
                }
                println!("Cheat meal removed");
            } else {
                let meal = parse_meal(meal.as_deref().context("meal is required")?)?;
                let description = description.context("description is required")?;
                let kcal = match kcal {
                    Some(k) => k,
                    None => cli
                        .config
                        .ai_client(tracker.profile())
                        .map_err(|e| ai_failure(e, lang))?
                        .estimate_kcal(&description, "")
                        .await
                        .map_err(|e| ai_failure(e, lang))?,
                };
                match tracker.set_cheat_meal(day, meal, &description, kcal) {
                    CheatOutcome::Saved => {
                        println!("Cheat meal saved: {} (~{} kcal)", description, kcal);
                        println!("New goal: {} kcal", tracker.goal_for(day));
                    }
                    CheatOutcome::WeekTaken(other) => {
                        bail!("day {} already has this week's cheat meal", other + 1);
                    }
                    CheatOutcome::Failed => bail!("could not save cheat meal"),
                }
            }
        }

        Some(Commands::Extra { description, portion, kcal, day, remove }) => {
            let day = resolve_day(&tracker, day)?;
            if let Some(id) = remove {
                if !tracker.store().remove_extra(day, &id) {
                    bail!("no extra with id {}", id);
                }
                println!("Removed {}", id);
            } else {
                let description = description.context("description is required")?;
                let mut extra =
                    ExtraIntake::new(description.trim(), portion.trim(), kcal.unwrap_or(0));
                if kcal.is_none() {
                    let client = cli
                        .config
                        .ai_client(tracker.profile())
                        .map_err(|e| ai_failure(e, lang))?;
                    extra.kcal_estimate = client
                        .estimate_kcal(&extra.description, &extra.portion)
                        .await
                        .map_err(|e| ai_failure(e, lang))?;
                    extra.estimated_by_ai = true;
                }
                let logged = format!(
                    "Logged [{}]: {} (~{} kcal)",
                    extra.id, extra.description, extra.kcal_estimate
                );
                tracker.add_extra(day, extra).context("could not save extra")?;
                println!("{}", logged);
            }
        }

        Some(Commands::Exercise { activity, minutes, intensity, day, remove }) => {
            let day = resolve_day(&tracker, day)?;
            if let Some(id) = remove {
                if !tracker.store().remove_exercise(day, &id) {
                    bail!("no exercise with id {}", id);
                }
                println!("Removed {}", id);
            } else {
                let activity = activity.context("activity is required")?;
                let intensity = parse_intensity(&tracker, intensity.as_deref())?;
                let entry = tracker
                    .log_exercise(day, &activity, minutes, intensity)
                    .context("could not save exercise")?;
                println!(
                    "Logged [{}]: {} {} min ({} kcal)",
                    entry.id, entry.activity, entry.minutes, entry.kcal
                );
            }
        }

        Some(Commands::Metrics) => print_metrics(&tracker),

        Some(Commands::Profile {
            name,
            start,
            gender,
            lang: language,
            weeks,
            height,
            weight,
            age,
            target,
            activity,
            intensity,
            save_ai_user,
            save_ai_pass,
        }) => {
            let activity = match activity.as_deref() {
                Some(a) => Some(
                    ActivityLevel::parse(a).with_context(|| format!("unknown activity '{}'", a))?,
                ),
                None => None,
            };
            let intensity = match intensity.as_deref() {
                Some(i) => Some(
                    Intensity::parse(i).with_context(|| format!("unknown intensity '{}'", i))?,
                ),
                None => None,
            };

            let changed = name.is_some()
                || start.is_some()
                || gender.is_some()
                || language.is_some()
                || weeks.is_some()
                || height.is_some()
                || weight.is_some()
                || age.is_some()
                || target.is_some()
                || activity.is_some()
                || intensity.is_some()
                || save_ai_user.is_some()
                || save_ai_pass.is_some();

            if changed {
                let saved = tracker.update_profile(|p| {
                    if let Some(v) = name {
                        p.name = v;
                    }
                    if start.is_some() {
                        p.start_date = start;
                    }
                    if let Some(v) = gender {
                        p.gender = Gender::parse(&v);
                    }
                    if let Some(v) = language {
                        p.language = Language::parse(&v);
                    }
                    if let Some(v) = weeks {
                        p.plan_weeks = v.max(1);
                    }
                    if height.is_some() {
                        p.height_cm = height;
                    }
                    if weight.is_some() {
                        p.weight_kg = weight;
                    }
                    if age.is_some() {
                        p.age = age;
                    }
                    if target.is_some() {
                        p.target_weight_kg = target;
                    }
                    if let Some(v) = activity {
                        p.activity = v;
                    }
                    if let Some(v) = intensity {
                        p.workout_intensity = v;
                    }
                    if save_ai_user.is_some() {
                        p.ai_user = save_ai_user;
                    }
                    if save_ai_pass.is_some() {
                        p.ai_pass = save_ai_pass;
                    }
                });
                if !saved {
                    bail!("could not save profile");
                }
            }
            print_profile(&tracker)?;
        }

        Some(Commands::Ai { command }) => {
            let client = cli.config.ai_client(tracker.profile()).map_err(|e| ai_failure(e, lang))?;

            match command {
                AiCommand::Meal { meal, day, prefs } => {
                    let day = resolve_day(&tracker, day)?;
                    let meal = parse_meal(&meal)?;
                    let current = tracker.effective_day(day).context("day outside the plan")?;
                    let req = MealRequest {
                        meal,
                        kcal: calories::planned_meal_kcal(tracker.base_goal_for(day), meal),
                        current: Some(current.meals.get(meal)),
                        prefs: &prefs,
                    };
                    let slot = client.generate_meal(&req).await.map_err(|e| ai_failure(e, lang))?;
                    if !tracker.apply_ai_meal(day, meal, slot.clone()) {
                        bail!("could not save generated meal");
                    }
                    println!("{}: {}\n    {}", meal.label(lang), slot.name, slot.qty);
                    if let Some(note) = &slot.note {
                        println!("    {}", note);
                    }
                }

                AiCommand::Day { day, prefs } => {
                    let day = resolve_day(&tracker, day)?;
                    let generated = client
                        .generate_full_day(tracker.base_goal_for(day), &prefs)
                        .await
                        .map_err(|e| ai_failure(e, lang))?;
                    if generated.is_empty() {
                        bail!("{}", ai::error_message(&AiError::Malformed(String::new()), lang));
                    }
                    tracker.apply_ai_day(day, generated).context("could not save generated day")?;
                    print_day(&tracker, day)?;
                }

                AiCommand::Workout { minutes, intensity, prefs } => {
                    let intensity = parse_intensity(&tracker, intensity.as_deref())?;
                    let workout = client
                        .generate_workout(intensity, minutes, &prefs)
                        .await
                        .map_err(|e| ai_failure(e, lang))?;
                    println!(
                        "{} ({} min, {})",
                        workout.title,
                        workout.minutes,
                        workout.intensity.as_str()
                    );
                    for ex in &workout.exercises {
                        match ex.sets {
                            Some(sets) => println!("  - {} {}x{}", ex.name, sets, ex.reps),
                            None => println!("  - {} {}", ex.name, ex.reps),
                        }
                    }
                    if !workout.notes.is_empty() {
                        println!("{}", workout.notes);
                    }
                }

                AiCommand::Shopping { week } => {
                    let week = resolve_week(&tracker, week)?;
                    let days: Vec<_> = days_of_week(week, tracker.total_days())
                        .filter_map(|d| tracker.effective_day(d))
                        .collect();
                    let items = client.shopping_list(&days).await.map_err(|e| ai_failure(e, lang))?;
                    if !tracker.store().save_shopping_list(week, &items) {
                        bail!("could not save shopping list");
                    }

                    let mut category = String::new();
                    for item in &items {
                        if item.category != category {
                            category = item.category.clone();
                            let heading = if category.is_empty() { "-" } else { category.as_str() };
                            println!("{}", heading);
                        }
                        println!("  [ ] {} {}", item.name, item.quantity);
                    }
                }

                AiCommand::Review { day } => {
                    let day = resolve_day(&tracker, day)?;
                    let text = tracker.review_text(day).context("day outside the plan")?;
                    let review = client.review_day(&text).await.map_err(|e| ai_failure(e, lang))?;
                    println!("{}", review);
                }

                AiCommand::Kcal { description, portion } => {
                    let kcal = client
                        .estimate_kcal(&description, &portion)
                        .await
                        .map_err(|e| ai_failure(e, lang))?;
                    println!("~{} kcal", kcal);
                }
            }
        }

        Some(Commands::Report { week, json }) => {
            let range = match week {
                Some(_) => days_of_week(resolve_week(&tracker, week)?, tracker.total_days()),
                None => 0..tracker.total_days(),
            };
            let points = progress::progress_series(&tracker, range);
            if json {
                let weeks = progress::summarize_weeks(&points);
                let report = serde_json::json!({ "days": points, "weeks": weeks });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", progress::render_report(tracker.profile(), &points, lang));
            }
        }
    }

    Ok(())
}
