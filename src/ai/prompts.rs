//! Prompt builders, one per AI feature

use std::fmt::Write;

use crate::ai::MealRequest;
use crate::metrics::Intensity;
use crate::plan::{Language, PlanDay};

const MEAL_JSON_HINT: &str = r#"{"nombre": "...", "qty": "...", "note": "..."}"#;

fn prefs_line(prefs: &str, lang: Language) -> String {
    let prefs = prefs.trim();
    if prefs.is_empty() {
        return String::new();
    }
    match lang {
        Language::Es => format!("Preferencias y restricciones: {}.\n", prefs),
        Language::En => format!("Preferences and restrictions: {}.\n", prefs),
    }
}

pub fn meal_prompt(req: &MealRequest<'_>, lang: Language) -> String {
    let label = req.meal.label(lang);
    let mut out = match lang {
        Language::Es => format!(
            "Propón un {} cetogénico de unas {} kcal (menos de 10% de carbohidratos).\n",
            label.to_lowercase(),
            req.kcal
        ),
        Language::En => format!(
            "Suggest a ketogenic {} of about {} kcal (under 10% carbs).\n",
            label.to_lowercase(),
            req.kcal
        ),
    };

    if let Some(current) = req.current {
        let _ = match lang {
            Language::Es => {
                writeln!(out, "Debe ser distinto de: {} ({}).", current.name, current.qty)
            }
            Language::En => {
                writeln!(out, "It must differ from: {} ({}).", current.name, current.qty)
            }
        };
    }

    out.push_str(&prefs_line(req.prefs, lang));
    let _ = match lang {
        Language::Es => write!(out, "Responde solo con JSON: {}", MEAL_JSON_HINT),
        Language::En => write!(out, "Reply with JSON only: {}", MEAL_JSON_HINT),
    };
    out
}

pub fn full_day_prompt(kcal: i32, prefs: &str, lang: Language) -> String {
    let mut out = match lang {
        Language::Es => format!(
            "Diseña un día completo de dieta cetogénica de {} kcal con desayuno, snackAM, almuerzo, snackPM y cena.\n",
            kcal
        ),
        Language::En => format!(
            "Design a full ketogenic day of {} kcal with desayuno, snackAM, almuerzo, snackPM and cena.\n",
            kcal
        ),
    };
    out.push_str(&prefs_line(prefs, lang));
    let _ = match lang {
        Language::Es => write!(
            out,
            "Responde solo con JSON: {{\"kcal\": n, \"macros\": {{\"carbs\": \"7%\", \"prot\": \"25%\", \"fat\": \"68%\"}}, \"desayuno\": {}, ...}}",
            MEAL_JSON_HINT
        ),
        Language::En => write!(
            out,
            "Reply with JSON only: {{\"kcal\": n, \"macros\": {{\"carbs\": \"7%\", \"prot\": \"25%\", \"fat\": \"68%\"}}, \"desayuno\": {}, ...}}",
            MEAL_JSON_HINT
        ),
    };
    out
}

pub fn workout_prompt(intensity: Intensity, minutes: u32, prefs: &str, lang: Language) -> String {
    let mut out = match lang {
        Language::Es => format!(
            "Crea una rutina de ejercicio en casa de {} minutos, intensidad {}.\n",
            minutes,
            match intensity {
                Intensity::Low => "baja",
                Intensity::Moderate => "moderada",
                Intensity::High => "alta",
            }
        ),
        Language::En => format!(
            "Create a {}-minute home workout, {} intensity.\n",
            minutes,
            intensity.as_str()
        ),
    };
    out.push_str(&prefs_line(prefs, lang));
    out.push_str(match lang {
        Language::Es => "Responde solo con JSON: {\"title\": \"...\", \"exercises\": [{\"name\": \"...\", \"sets\": 3, \"reps\": \"12\"}], \"notes\": \"...\"}",
        Language::En => "Reply with JSON only: {\"title\": \"...\", \"exercises\": [{\"name\": \"...\", \"sets\": 3, \"reps\": \"12\"}], \"notes\": \"...\"}",
    });
    out
}

pub fn review_prompt(summary: &str, lang: Language) -> String {
    match lang {
        Language::Es => format!(
            "Eres un coach de dieta cetogénica. Revisa este resumen del día y da 3 consejos breves y concretos:\n{}",
            summary
        ),
        Language::En => format!(
            "You are a keto diet coach. Review this day summary and give 3 short, concrete tips:\n{}",
            summary
        ),
    }
}

/// Lists every meal of the given days so the model can aggregate ingredients
pub fn shopping_prompt(days: &[PlanDay], lang: Language) -> String {
    let mut out = match lang {
        Language::Es => String::from("Genera una lista de la compra agrupada por categoría para estas comidas:\n"),
        Language::En => String::from("Build a shopping list grouped by category for these meals:\n"),
    };

    for day in days {
        let _ = writeln!(out, "{}:", day.day_label);
        for (_, slot) in day.meals.iter() {
            let _ = writeln!(out, "- {}: {}", slot.name, slot.qty);
        }
    }

    out.push_str(match lang {
        Language::Es => "Responde solo con JSON: [{\"name\": \"...\", \"quantity\": \"...\", \"category\": \"...\"}]",
        Language::En => "Reply with JSON only: [{\"name\": \"...\", \"quantity\": \"...\", \"category\": \"...\"}]",
    });
    out
}

pub fn kcal_prompt(description: &str, portion: &str, lang: Language) -> String {
    let portion = portion.trim();
    match (lang, portion.is_empty()) {
        (Language::Es, true) => format!(
            "¿Cuántas kcal tiene: {}? Responde solo con JSON: {{\"kcal\": n}}",
            description
        ),
        (Language::Es, false) => format!(
            "¿Cuántas kcal tiene: {} ({})? Responde solo con JSON: {{\"kcal\": n}}",
            description, portion
        ),
        (Language::En, true) => format!(
            "How many kcal are in: {}? Reply with JSON only: {{\"kcal\": n}}",
            description
        ),
        (Language::En, false) => format!(
            "How many kcal are in: {} ({})? Reply with JSON only: {{\"kcal\": n}}",
            description, portion
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{Gender, MealKey, MealSlot, build_plan};

    #[test]
    fn test_meal_prompt_mentions_target_and_current() {
        let current = MealSlot::new("Huevos", "3 huevos");
        let req = MealRequest {
            meal: MealKey::Desayuno,
            kcal: 400,
            current: Some(&current),
            prefs: "sin lácteos",
        };

        let es = meal_prompt(&req, Language::Es);
        assert!(es.contains("400 kcal"));
        assert!(es.contains("desayuno"));
        assert!(es.contains("Huevos"));
        assert!(es.contains("sin lácteos"));

        let en = meal_prompt(&MealRequest { current: None, prefs: "", ..req }, Language::En);
        assert!(en.contains("breakfast"));
        assert!(!en.contains("Preferences"));
    }

    #[test]
    fn test_shopping_prompt_lists_meals() {
        let days = build_plan(1, Gender::Male, Language::Es);
        let prompt = shopping_prompt(&days[..2], Language::Es);
        assert!(prompt.contains("Día 1:"));
        assert!(prompt.contains("Día 2:"));
        assert!(prompt.contains(&days[0].meals.almuerzo.name));
        assert!(!prompt.contains("Día 3:"));
    }

    #[test]
    fn test_kcal_prompt_portion() {
        assert!(kcal_prompt("pan", "1 rebanada", Language::Es).contains("(1 rebanada)"));
        assert!(!kcal_prompt("bread", " ", Language::En).contains("("));
    }

    #[test]
    fn test_workout_prompt_intensity() {
        assert!(workout_prompt(Intensity::High, 25, "", Language::Es).contains("intensidad alta"));
        assert!(workout_prompt(Intensity::Low, 25, "", Language::En).contains("low intensity"));
    }
}
