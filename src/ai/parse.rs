//! Best-effort parsing of AI replies into typed records
//!
//! Nothing here fails: unusable input gives `None` or an empty structure.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::ai::{Workout, WorkoutExercise};
use crate::metrics::Intensity;
use crate::plan::{DayOverride, Macros, MealKey, MealOverride, MealSlot, MealSource};
use crate::store::ShoppingItem;

static FENCED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)```").expect("valid regex"));
static OBJECT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));
static ARRAY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\[.*\]").expect("valid regex"));
static KCAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:[.,]\d+)*)\s*(?:kcal|cal)").expect("valid regex"));
static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:[.,]\d+)*").expect("valid regex"));
static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*•]|\d+[.)])\s+(.+)$").expect("valid regex"));

/// Pull the first JSON value out of free text
pub fn extract_json(text: &str) -> Option<Value> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(v) = serde_json::from_str::<Value>(text)
        && (v.is_object() || v.is_array())
    {
        return Some(v);
    }

    for caps in FENCED.captures_iter(text) {
        if let Ok(v) = serde_json::from_str::<Value>(caps[1].trim()) {
            return Some(v);
        }
    }

    // whichever bracket opens first decides object vs array
    let obj_start = text.find('{');
    let arr_start = text.find('[');
    let order: [&Regex; 2] = match (obj_start, arr_start) {
        (Some(o), Some(a)) if a < o => [&*ARRAY, &*OBJECT],
        _ => [&*OBJECT, &*ARRAY],
    };

    order
        .iter()
        .filter_map(|re| re.find(text))
        .find_map(|m| serde_json::from_str::<Value>(m.as_str()).ok())
}

fn first_str(obj: &Value, names: &[&str]) -> Option<String> {
    names.iter().find_map(|n| match obj.get(*n)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(|i| match i {
                    Value::String(s) => Some(s.trim().to_string()),
                    Value::Object(_) => first_str(i, &["name", "nombre", "item"]).map(|name| {
                        match first_str(i, &["quantity", "qty", "cantidad"]) {
                            Some(q) => format!("{} {}", q, name),
                            None => name,
                        }
                    }),
                    _ => None,
                })
                .filter(|s| !s.is_empty())
                .collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Reads `1.200` and `1,200` as 1200 and `450,5` as 450.5.
///
/// A separator followed by exactly three digits groups thousands; any other
/// separator starts the fraction.
fn parse_amount(raw: &str) -> Option<f64> {
    let mut parts = raw.split(['.', ',']);
    let mut number = parts.next()?.to_string();
    for part in parts {
        if part.len() == 3 && number != "0" {
            number.push_str(part);
        } else {
            number.push('.');
            number.push_str(part);
            break;
        }
    }
    number.parse().ok()
}

fn rounded_amount(raw: &str) -> Option<i32> {
    parse_amount(raw).map(|f| f.round() as i32)
}

fn as_int(v: &Value) -> Option<i32> {
    match v {
        Value::Number(n) => n.as_f64().map(|f| f.round() as i32),
        Value::String(s) => NUMBER.find(s).and_then(|m| rounded_amount(m.as_str())),
        _ => None,
    }
}

/// `7`, `"7%"`, `"7 %"` -> 7
pub fn parse_percent(v: &Value) -> Option<u8> {
    let n = as_int(v)?;
    u8::try_from(n).ok().filter(|p| *p <= 100)
}

fn pick_percent(obj: &Value, names: &[&str]) -> Option<u8> {
    names.iter().find_map(|n| obj.get(*n).and_then(parse_percent))
}

/// Meal slot from a JSON object, tagged as AI-generated
pub fn slot_from_value(v: &Value) -> Option<MealSlot> {
    if !v.is_object() {
        return None;
    }
    let name = first_str(v, &["nombre", "name", "title", "meal", "plato"])?;
    let qty = first_str(v, &["qty", "ingredients", "ingredientes", "cantidad", "quantity"])
        .unwrap_or_default();
    let note = first_str(v, &["note", "notes", "nota", "tips", "notas"]);

    Some(MealSlot {
        name,
        qty,
        note,
        is_ai: true,
        source: Some(MealSource::Ai),
    })
}

/// Plain text fallback: first line is the name, then at least one ingredient
/// line (a bullet or a line starting with a quantity)
fn slot_from_text(text: &str) -> Option<MealSlot> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    let name = lines
        .next()?
        .trim_start_matches(['#', '*', '-'])
        .trim()
        .trim_end_matches(':')
        .to_string();
    let items: Vec<String> = lines
        .filter_map(|l| match LIST_ITEM.captures(l) {
            Some(c) => Some(c[1].trim().to_string()),
            None => l.starts_with(|c: char| c.is_ascii_digit()).then(|| l.to_string()),
        })
        .collect();
    if name.is_empty() || items.is_empty() {
        return None;
    }
    let qty = items.join(", ");

    Some(MealSlot {
        name,
        qty,
        note: None,
        is_ai: true,
        source: Some(MealSource::Ai),
    })
}

pub fn meal_from_reply(structured: Option<&Value>, text: &str) -> Option<MealSlot> {
    if let Some(slot) = structured.and_then(slot_from_value) {
        return Some(slot);
    }
    if let Some(v) = extract_json(text) {
        // some replies wrap the meal: {"meal": {...}} or [{...}]
        let candidate = match &v {
            Value::Array(items) => items.first().cloned(),
            Value::Object(map) if map.len() == 1 => {
                map.values().next().filter(|inner| inner.is_object()).cloned()
            }
            _ => None,
        };
        let slot = slot_from_value(&v).or_else(|| candidate.as_ref().and_then(slot_from_value));
        if let Some(slot) = slot {
            return Some(slot);
        }
    }
    slot_from_text(text)
}

fn english_alias(key: MealKey) -> &'static str {
    match key {
        MealKey::Desayuno => "breakfast",
        MealKey::SnackAm => "morningSnack",
        MealKey::Almuerzo => "lunch",
        MealKey::SnackPm => "afternoonSnack",
        MealKey::Cena => "dinner",
    }
}

/// Day override from a JSON object; unrecognized slots are left unset
pub fn day_from_value(v: &Value) -> DayOverride {
    let mut ov = DayOverride::default();
    if !v.is_object() {
        return ov;
    }

    let meals_root = v.get("meals").filter(|m| m.is_object()).unwrap_or(v);
    for key in MealKey::ALL {
        let slot = meals_root
            .get(key.as_str())
            .or_else(|| meals_root.get(english_alias(key)))
            .and_then(slot_from_value);
        if let Some(slot) = slot {
            ov.set_meal(key, MealOverride::from_slot(&slot));
        }
    }

    ov.kcal = v.get("kcal").and_then(as_int).filter(|k| *k > 0);

    if let Some(m) = v.get("macros").filter(|m| m.is_object()) {
        if let (Some(carbs), Some(protein), Some(fat)) = (
            pick_percent(m, &["carbs", "carbohidratos"]),
            pick_percent(m, &["prot", "protein", "proteina"]),
            pick_percent(m, &["fat", "grasa"]),
        ) {
            ov.macros = Some(Macros { carbs, protein, fat });
        }
    }

    ov
}

pub fn day_from_reply(structured: Option<&Value>, text: &str) -> DayOverride {
    structured
        .cloned()
        .or_else(|| extract_json(text))
        .map(|v| day_from_value(&v))
        .unwrap_or_default()
}

fn exercise_from_value(v: &Value) -> Option<WorkoutExercise> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(WorkoutExercise {
            name: s.trim().to_string(),
            sets: None,
            reps: String::new(),
        }),
        Value::Object(_) => Some(WorkoutExercise {
            name: first_str(v, &["name", "nombre", "exercise", "ejercicio"])?,
            sets: v
                .get("sets")
                .or_else(|| v.get("series"))
                .and_then(as_int)
                .and_then(|n| u32::try_from(n).ok()),
            reps: first_str(v, &["reps", "repeticiones", "duration", "time", "tiempo"])
                .unwrap_or_default(),
        }),
        _ => None,
    }
}

pub fn workout_from_reply(
    structured: Option<&Value>,
    text: &str,
    intensity: Intensity,
    minutes: u32,
) -> Workout {
    let mut workout = Workout {
        intensity,
        minutes,
        ..Default::default()
    };

    let value = structured.cloned().or_else(|| extract_json(text));
    match value {
        Some(v) => {
            workout.title =
                first_str(&v, &["title", "titulo", "name", "nombre"]).unwrap_or_default();
            workout.notes = first_str(&v, &["notes", "notas", "tips"]).unwrap_or_default();
            let list = v
                .get("exercises")
                .or_else(|| v.get("ejercicios"))
                .or(if v.is_array() { Some(&v) } else { None });
            if let Some(Value::Array(items)) = list {
                workout.exercises = items.iter().filter_map(exercise_from_value).collect();
            }
            if let Some(m) = v.get("minutes").or_else(|| v.get("minutos")).and_then(as_int)
                && m > 0
            {
                workout.minutes = m as u32;
            }
        }
        None => {
            let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
            workout.title = lines
                .next()
                .unwrap_or_default()
                .trim_start_matches('#')
                .trim()
                .to_string();
            workout.exercises = lines
                .filter_map(|l| LIST_ITEM.captures(l).map(|c| c[1].trim().to_string()))
                .map(|name| WorkoutExercise { name, sets: None, reps: String::new() })
                .collect();
        }
    }

    workout
}

fn shopping_item(v: &Value) -> Option<ShoppingItem> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(ShoppingItem {
            name: s.trim().to_string(),
            quantity: String::new(),
            category: String::new(),
            checked: false,
        }),
        Value::Object(_) => Some(ShoppingItem {
            name: first_str(v, &["name", "nombre", "item", "producto"])?,
            quantity: first_str(v, &["quantity", "qty", "cantidad"]).unwrap_or_default(),
            category: first_str(v, &["category", "categoria", "categoría"]).unwrap_or_default(),
            checked: false,
        }),
        _ => None,
    }
}

fn shopping_from_value(v: &Value) -> Vec<ShoppingItem> {
    match v {
        Value::Array(items) => items.iter().filter_map(shopping_item).collect(),
        Value::Object(map) => {
            if let Some(items) = map.get("items").or_else(|| map.get("list")) {
                return shopping_from_value(items);
            }
            // {"Proteínas": ["huevos", ...], "Verduras": [...]}
            map.iter()
                .filter_map(|(category, items)| items.as_array().map(|list| (category, list)))
                .flat_map(|(category, list)| {
                    list.iter().filter_map(shopping_item).map(move |mut item| {
                        if item.category.is_empty() {
                            item.category = category.clone();
                        }
                        item
                    })
                })
                .collect()
        }
        _ => Vec::new(),
    }
}

pub fn shopping_from_reply(structured: Option<&Value>, text: &str) -> Vec<ShoppingItem> {
    if let Some(v) = structured.cloned().or_else(|| extract_json(text)) {
        let items = shopping_from_value(&v);
        if !items.is_empty() {
            return items;
        }
    }

    text.lines()
        .filter_map(|l| LIST_ITEM.captures(l).map(|c| c[1].trim().to_string()))
        .map(|name| ShoppingItem {
            name,
            quantity: String::new(),
            category: String::new(),
            checked: false,
        })
        .collect()
}

pub fn kcal_from_reply(structured: Option<&Value>, text: &str) -> Option<i32> {
    let from_json = |v: &Value| {
        v.get("kcal")
            .or_else(|| v.get("kcalEstimate"))
            .or_else(|| v.get("calories"))
            .and_then(as_int)
    };

    structured
        .and_then(from_json)
        .or_else(|| extract_json(text).as_ref().and_then(from_json))
        .or_else(|| KCAL.captures(text).and_then(|c| rounded_amount(&c[1])))
        .or_else(|| NUMBER.find(text).and_then(|m| rounded_amount(m.as_str())))
        .filter(|k| *k > 0)
}
