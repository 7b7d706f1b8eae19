//! Progress series and the plain-text report

use std::fmt::Write;
use std::ops::Range;

use serde::Serialize;

use crate::metrics;
use crate::plan::Language;
use crate::plan::builder::{DAYS_PER_WEEK, week_of};
use crate::store::UserProfile;
use crate::tracker::{DaySummary, Tracker};

/// A day counts as on target when net kcal is within this share of the goal
pub const ON_TARGET_TOLERANCE: f64 = 0.10;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressPoint {
    pub day: usize,
    pub label: String,
    pub goal: i32,
    pub consumed: i32,
    pub burned: i32,
    pub net: i32,
    pub water_ml: i32,
    pub water_goal: i32,
    pub completed: bool,
    pub cheat: bool,
}

impl ProgressPoint {
    pub fn on_target(&self) -> bool {
        if self.goal <= 0 || self.consumed == 0 {
            return false;
        }
        let diff = (self.net - self.goal).abs() as f64;
        diff <= self.goal as f64 * ON_TARGET_TOLERANCE
    }
}

impl From<&DaySummary> for ProgressPoint {
    fn from(s: &DaySummary) -> Self {
        Self {
            day: s.day,
            label: s.plan.day_label.clone(),
            goal: s.totals.goal,
            consumed: s.totals.consumed,
            burned: s.totals.burned,
            net: s.totals.net,
            water_ml: s.water.ml,
            water_goal: s.water.goal,
            completed: s.completed,
            cheat: s.cheat.is_some(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeekSummary {
    pub week: usize,
    pub days: usize,
    pub completed_days: usize,
    pub avg_consumed: i32,
    pub total_burned: i32,
    pub cheat_day: Option<usize>,
    /// Percent of days on target
    pub adherence: f64,
}

pub fn progress_series(tracker: &Tracker, days: Range<usize>) -> Vec<ProgressPoint> {
    days.filter_map(|d| tracker.summary(d)).map(|s| ProgressPoint::from(&s)).collect()
}

/// Group points by 7-day week, in order
pub fn summarize_weeks(points: &[ProgressPoint]) -> Vec<WeekSummary> {
    let mut weeks: Vec<WeekSummary> = Vec::new();
    let mut on_target: Vec<usize> = Vec::new();

    for p in points {
        let week = week_of(p.day);
        if weeks.last().is_none_or(|w| w.week != week) {
            weeks.push(WeekSummary {
                week,
                days: 0,
                completed_days: 0,
                avg_consumed: 0,
                total_burned: 0,
                cheat_day: None,
                adherence: 0.0,
            });
            on_target.push(0);
        }

        let (Some(w), Some(hits)) = (weeks.last_mut(), on_target.last_mut()) else {
            continue;
        };
        w.days += 1;
        // running sum, averaged below
        w.avg_consumed += p.consumed;
        w.total_burned += p.burned;
        if p.completed {
            w.completed_days += 1;
        }
        if p.cheat && w.cheat_day.is_none() {
            w.cheat_day = Some(p.day);
        }
        if p.on_target() {
            *hits += 1;
        }
    }

    for (w, hits) in weeks.iter_mut().zip(on_target) {
        if w.days > 0 {
            w.avg_consumed = (w.avg_consumed as f64 / w.days as f64).round() as i32;
            w.adherence = (hits as f64 / w.days as f64 * 1000.0).round() / 10.0;
        }
    }
    weeks
}

fn heading(lang: Language) -> [&'static str; 6] {
    match lang {
        Language::Es => ["Día", "Objetivo", "Consumido", "Quemado", "Agua", "Hecho"],
        Language::En => ["Day", "Goal", "Consumed", "Burned", "Water", "Done"],
    }
}

/// Profile header, per-day table and weekly totals
pub fn render_report(profile: &UserProfile, points: &[ProgressPoint], lang: Language) -> String {
    let mut out = String::new();
    let title = match lang {
        Language::Es => "Informe de progreso keto",
        Language::En => "Keto progress report",
    };
    let _ = writeln!(out, "{}", title);
    if !profile.name.trim().is_empty() {
        let _ = writeln!(out, "{}", profile.name.trim());
    }
    let _ = writeln!(out, "{:=<64}", "");

    let m = profile.metrics();
    if let Some(bmi) = m.bmi() {
        let _ = writeln!(out, "BMI {:.1} ({})", bmi, metrics::get_bmi_category(bmi, lang));
    }
    let weeks = profile.plan_weeks.max(1) as u32;
    if let (Some(current), Some(target)) = (profile.weight_kg, profile.target_weight_kg)
        && let Some(plan) = metrics::calculate_deficit_for_weight_loss(current, target, weeks)
    {
        let _ = match lang {
            Language::Es => writeln!(
                out,
                "Meta: {:.1} kg → {:.1} kg, déficit diario {} kcal",
                current, target, plan.daily_deficit
            ),
            Language::En => writeln!(
                out,
                "Target: {:.1} kg → {:.1} kg, daily deficit {} kcal",
                current, target, plan.daily_deficit
            ),
        };
    }

    let h = heading(lang);
    let _ = writeln!(
        out,
        "{:<10} {:>8} {:>10} {:>8} {:>11} {:>6}",
        h[0], h[1], h[2], h[3], h[4], h[5]
    );
    let _ = writeln!(out, "{:-<64}", "");
    for p in points {
        let _ = writeln!(
            out,
            "{:<10} {:>8} {:>10} {:>8} {:>11} {:>6}",
            p.label,
            p.goal,
            p.consumed,
            p.burned,
            format!("{}/{}", p.water_ml, p.water_goal),
            if p.completed { "✓" } else { "" }
        );
        if p.day % DAYS_PER_WEEK == DAYS_PER_WEEK - 1 {
            let _ = writeln!(out, "{:-<64}", "");
        }
    }

    let _ = writeln!(out);
    for w in summarize_weeks(points) {
        let _ = match lang {
            Language::Es => writeln!(
                out,
                "Semana {}: {}/{} días completos, media {} kcal, {} kcal quemadas, adherencia {:.1}%",
                w.week + 1,
                w.completed_days,
                w.days,
                w.avg_consumed,
                w.total_burned,
                w.adherence
            ),
            Language::En => writeln!(
                out,
                "Week {}: {}/{} days complete, avg {} kcal, {} kcal burned, adherence {:.1}%",
                w.week + 1,
                w.completed_days,
                w.days,
                w.avg_consumed,
                w.total_burned,
                w.adherence
            ),
        };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::plan::MealKey;

    fn point(day: usize, goal: i32, consumed: i32) -> ProgressPoint {
        ProgressPoint {
            day,
            label: format!("Día {}", day + 1),
            goal,
            consumed,
            burned: 0,
            net: consumed,
            water_ml: 0,
            water_goal: 2000,
            completed: false,
            cheat: false,
        }
    }

    #[test]
    fn test_on_target_tolerance() {
        assert!(point(0, 1600, 1600).on_target());
        assert!(point(0, 1600, 1760).on_target());
        assert!(!point(0, 1600, 1761).on_target());
        assert!(!point(0, 1600, 0).on_target());
    }

    #[test]
    fn test_weeks_grouped_and_averaged() {
        let mut points: Vec<ProgressPoint> = (0..10).map(|d| point(d, 1600, 1600)).collect();
        points[2].completed = true;
        points[3].cheat = true;
        points[8].consumed = 800;
        points[8].net = 800;
        points[9].burned = 300;

        let weeks = summarize_weeks(&points);
        assert_eq!(weeks.len(), 2);

        assert_eq!(weeks[0].week, 0);
        assert_eq!(weeks[0].days, 7);
        assert_eq!(weeks[0].completed_days, 1);
        assert_eq!(weeks[0].cheat_day, Some(3));
        assert_eq!(weeks[0].avg_consumed, 1600);
        assert_eq!(weeks[0].adherence, 100.0);

        assert_eq!(weeks[1].days, 3);
        assert_eq!(weeks[1].avg_consumed, 1333);
        assert_eq!(weeks[1].total_burned, 300);
        assert_eq!(weeks[1].adherence, 66.7);
    }

    #[test]
    fn test_series_from_tracker() {
        let t = Tracker::open(Database::open(":memory:").unwrap());
        t.toggle_meal(0, MealKey::Almuerzo);
        t.add_water(1, 750);

        let series = progress_series(&t, 0..7);
        assert_eq!(series.len(), 7);
        assert!(series[0].consumed > 0);
        assert_eq!(series[1].water_ml, 750);
        assert_eq!(series[2].consumed, 0);

        // out-of-plan days are skipped
        assert_eq!(progress_series(&t, 27..40).len(), 1);
    }

    #[test]
    fn test_render_report() {
        let profile = UserProfile {
            name: "Ana".into(),
            height_cm: Some(170.0),
            weight_kg: Some(75.0),
            target_weight_kg: Some(70.0),
            ..Default::default()
        };
        let points: Vec<ProgressPoint> = (0..3).map(|d| point(d, 1600, 1500)).collect();

        let es = render_report(&profile, &points, Language::Es);
        assert!(es.starts_with("Informe de progreso keto\nAna\n"));
        assert!(es.contains("BMI 25.9"));
        assert!(es.contains("Meta: 75.0 kg"));
        assert!(es.contains("Día 3"));
        assert!(es.contains("Semana 1: 0/3 días completos"));

        let en = render_report(&UserProfile::default(), &[], Language::En);
        assert!(en.starts_with("Keto progress report\n"));
        assert!(!en.contains("BMI"));
        assert!(!en.contains("Week 1"));
    }
}
