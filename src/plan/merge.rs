//! Day merger - template day + stored override = effective day

use crate::plan::{DayOverride, MealKey, MealOverride, MealSlot, PlanDay};

/// Merge a stored override onto a base plan day.
///
/// Top-level fields and meal slot fields are merged independently; a field
/// the override leaves empty keeps the base value.
pub fn merge_day(base: &PlanDay, stored: Option<&DayOverride>) -> PlanDay {
    let Some(ov) = stored else {
        return base.clone();
    };

    let mut day = PlanDay {
        day_label: ov.day_label.clone().unwrap_or_else(|| base.day_label.clone()),
        kcal: ov.kcal.unwrap_or(base.kcal),
        macros: ov.macros.unwrap_or(base.macros),
        meals: base.meals.clone(),
    };

    for key in MealKey::ALL {
        if let Some(meal) = ov.meal(key) {
            let merged = merge_slot(base.meals.get(key), meal);
            *day.meals.get_mut(key) = merged;
        }
    }

    day
}

/// Field-level slot merge, override wins
pub fn merge_slot(base: &MealSlot, ov: &MealOverride) -> MealSlot {
    MealSlot {
        name: ov.name.clone().unwrap_or_else(|| base.name.clone()),
        qty: ov.qty.clone().unwrap_or_else(|| base.qty.clone()),
        note: ov.note.clone().or_else(|| base.note.clone()),
        is_ai: ov.is_ai.unwrap_or(base.is_ai),
        source: ov.source.or(base.source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{DayMeals, Macros, MealSource};

    fn base_day() -> PlanDay {
        PlanDay {
            day_label: "Día 1".to_string(),
            kcal: 1600,
            macros: Macros { carbs: 7, protein: 25, fat: 68 },
            meals: DayMeals {
                desayuno: MealSlot::new("A", "x"),
                snack_am: MealSlot::new("B", "y"),
                almuerzo: MealSlot::new("C", "z"),
                snack_pm: MealSlot::new("D", "w"),
                cena: MealSlot::new("E", "v"),
            },
        }
    }

    #[test]
    fn test_no_override_returns_base() {
        let base = base_day();
        assert_eq!(merge_day(&base, None), base);
    }

    #[test]
    fn test_override_name_keeps_base_qty() {
        let base = base_day();
        let mut ov = DayOverride::default();
        let named = MealOverride { name: Some("B".into()), ..Default::default() };
        ov.set_meal(MealKey::Desayuno, named);

        let merged = merge_day(&base, Some(&ov));
        assert_eq!(merged.meals.desayuno.name, "B");
        assert_eq!(merged.meals.desayuno.qty, "x");
        // untouched slots stay as they were
        assert_eq!(merged.meals.cena, base.meals.cena);
    }

    #[test]
    fn test_top_level_fallbacks() {
        let base = base_day();
        let ov = DayOverride { kcal: Some(1800), ..Default::default() };

        let merged = merge_day(&base, Some(&ov));
        assert_eq!(merged.kcal, 1800);
        assert_eq!(merged.day_label, "Día 1");
        assert_eq!(merged.macros, base.macros);
    }

    #[test]
    fn test_whole_slot_replacement() {
        let base = base_day();
        let ai = MealSlot {
            name: "Pollo al pesto".into(),
            qty: "180 g pollo, 15 g pesto".into(),
            note: Some("sin piñones".into()),
            is_ai: true,
            source: Some(MealSource::Ai),
        };
        let mut ov = DayOverride::default();
        ov.set_meal(MealKey::Almuerzo, MealOverride::from_slot(&ai));

        let merged = merge_day(&base, Some(&ov));
        assert_eq!(merged.meals.almuerzo, ai);
    }

    #[test]
    fn test_base_note_survives_when_override_has_none() {
        let mut base = base_day();
        base.meals.cena.note = Some("template note".into());
        let mut ov = DayOverride::default();
        let qty_only = MealOverride { qty: Some("200 g".into()), ..Default::default() };
        ov.set_meal(MealKey::Cena, qty_only);

        let merged = merge_day(&base, Some(&ov));
        assert_eq!(merged.meals.cena.note.as_deref(), Some("template note"));
        assert_eq!(merged.meals.cena.qty, "200 g");
        assert_eq!(merged.meals.cena.name, "E");
    }
}
