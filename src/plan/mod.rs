//! Plan data model - days, meal slots and per-day overrides

pub mod builder;
pub mod merge;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use builder::build_plan;
pub use merge::merge_day;

/// UI / content language
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Es,
    En,
}

impl Language {
    /// Parse a language code, anything unknown falls back to Spanish
    pub fn parse(code: &str) -> Self {
        match code.trim().to_lowercase().as_str() {
            "en" | "english" => Language::En,
            _ => Language::Es,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::Es => "es",
            Language::En => "en",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    /// Unknown values behave as male
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "female" | "f" | "mujer" | "femenino" => Gender::Female,
            _ => Gender::Male,
        }
    }

    pub fn is_male(&self) -> bool {
        matches!(self, Gender::Male)
    }
}

/// The five meal slots of a plan day, in eating order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MealKey {
    #[serde(rename = "desayuno")]
    Desayuno,
    #[serde(rename = "snackAM")]
    SnackAm,
    #[serde(rename = "almuerzo")]
    Almuerzo,
    #[serde(rename = "snackPM")]
    SnackPm,
    #[serde(rename = "cena")]
    Cena,
}

impl MealKey {
    pub const ALL: [MealKey; 5] = [
        MealKey::Desayuno,
        MealKey::SnackAm,
        MealKey::Almuerzo,
        MealKey::SnackPm,
        MealKey::Cena,
    ];

    /// Storage / wire key
    pub fn as_str(&self) -> &'static str {
        match self {
            MealKey::Desayuno => "desayuno",
            MealKey::SnackAm => "snackAM",
            MealKey::Almuerzo => "almuerzo",
            MealKey::SnackPm => "snackPM",
            MealKey::Cena => "cena",
        }
    }

    /// Accepts wire keys, English names and 1-based positions
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "desayuno" | "breakfast" | "1" => Some(MealKey::Desayuno),
            "snackam" | "snack_am" | "morning-snack" | "2" => Some(MealKey::SnackAm),
            "almuerzo" | "lunch" | "comida" | "3" => Some(MealKey::Almuerzo),
            "snackpm" | "snack_pm" | "afternoon-snack" | "merienda" | "4" => Some(MealKey::SnackPm),
            "cena" | "dinner" | "5" => Some(MealKey::Cena),
            _ => None,
        }
    }

    pub fn label(&self, lang: Language) -> &'static str {
        match (self, lang) {
            (MealKey::Desayuno, Language::Es) => "Desayuno",
            (MealKey::SnackAm, Language::Es) => "Snack AM",
            (MealKey::Almuerzo, Language::Es) => "Almuerzo",
            (MealKey::SnackPm, Language::Es) => "Snack PM",
            (MealKey::Cena, Language::Es) => "Cena",
            (MealKey::Desayuno, Language::En) => "Breakfast",
            (MealKey::SnackAm, Language::En) => "AM snack",
            (MealKey::Almuerzo, Language::En) => "Lunch",
            (MealKey::SnackPm, Language::En) => "PM snack",
            (MealKey::Cena, Language::En) => "Dinner",
        }
    }
}

impl fmt::Display for MealKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Macro split as whole percentages of daily energy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Macros {
    pub carbs: u8,
    pub protein: u8,
    pub fat: u8,
}

impl fmt::Display for Macros {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C {}% · P {}% · F {}%", self.carbs, self.protein, self.fat)
    }
}

/// Where a meal slot came from when it is not the template's
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MealSource {
    Manual,
    Ai,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MealSlot {
    pub name: String,
    /// Free-text ingredient list
    pub qty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub is_ai: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<MealSource>,
}

impl MealSlot {
    pub fn new(name: impl Into<String>, qty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qty: qty.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DayMeals {
    pub desayuno: MealSlot,
    #[serde(rename = "snackAM")]
    pub snack_am: MealSlot,
    pub almuerzo: MealSlot,
    #[serde(rename = "snackPM")]
    pub snack_pm: MealSlot,
    pub cena: MealSlot,
}

impl DayMeals {
    pub fn get(&self, key: MealKey) -> &MealSlot {
        match key {
            MealKey::Desayuno => &self.desayuno,
            MealKey::SnackAm => &self.snack_am,
            MealKey::Almuerzo => &self.almuerzo,
            MealKey::SnackPm => &self.snack_pm,
            MealKey::Cena => &self.cena,
        }
    }

    pub fn get_mut(&mut self, key: MealKey) -> &mut MealSlot {
        match key {
            MealKey::Desayuno => &mut self.desayuno,
            MealKey::SnackAm => &mut self.snack_am,
            MealKey::Almuerzo => &mut self.almuerzo,
            MealKey::SnackPm => &mut self.snack_pm,
            MealKey::Cena => &mut self.cena,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (MealKey, &MealSlot)> {
        MealKey::ALL.into_iter().map(move |k| (k, self.get(k)))
    }
}

/// One day of the plan, produced by the builder and never mutated afterwards
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanDay {
    pub day_label: String,
    pub kcal: i32,
    pub macros: Macros,
    pub meals: DayMeals,
}

/// Partial meal slot stored on top of a template slot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MealOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_ai: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<MealSource>,
}

impl MealOverride {
    /// Whole-slot replacement (AI result or manual entry)
    pub fn from_slot(slot: &MealSlot) -> Self {
        Self {
            name: Some(slot.name.clone()),
            qty: Some(slot.qty.clone()),
            note: slot.note.clone(),
            is_ai: Some(slot.is_ai),
            source: slot.source,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.qty.is_none()
            && self.note.is_none()
            && self.is_ai.is_none()
            && self.source.is_none()
    }
}

/// Persisted per-day override record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DayOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kcal: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macros: Option<Macros>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desayuno: Option<MealOverride>,
    #[serde(default, rename = "snackAM", skip_serializing_if = "Option::is_none")]
    pub snack_am: Option<MealOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub almuerzo: Option<MealOverride>,
    #[serde(default, rename = "snackPM", skip_serializing_if = "Option::is_none")]
    pub snack_pm: Option<MealOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cena: Option<MealOverride>,
}

impl DayOverride {
    pub fn meal(&self, key: MealKey) -> Option<&MealOverride> {
        match key {
            MealKey::Desayuno => self.desayuno.as_ref(),
            MealKey::SnackAm => self.snack_am.as_ref(),
            MealKey::Almuerzo => self.almuerzo.as_ref(),
            MealKey::SnackPm => self.snack_pm.as_ref(),
            MealKey::Cena => self.cena.as_ref(),
        }
    }

    fn meal_slot_mut(&mut self, key: MealKey) -> &mut Option<MealOverride> {
        match key {
            MealKey::Desayuno => &mut self.desayuno,
            MealKey::SnackAm => &mut self.snack_am,
            MealKey::Almuerzo => &mut self.almuerzo,
            MealKey::SnackPm => &mut self.snack_pm,
            MealKey::Cena => &mut self.cena,
        }
    }

    pub fn set_meal(&mut self, key: MealKey, meal: MealOverride) {
        *self.meal_slot_mut(key) = Some(meal);
    }

    pub fn clear_meal(&mut self, key: MealKey) {
        *self.meal_slot_mut(key) = None;
    }

    pub fn is_empty(&self) -> bool {
        self.day_label.is_none()
            && self.kcal.is_none()
            && self.macros.is_none()
            && MealKey::ALL.iter().all(|k| self.meal(*k).is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meal_key_wire_names() {
        let json = serde_json::to_string(&MealKey::SnackAm).unwrap();
        assert_eq!(json, "\"snackAM\"");
        let key: MealKey = serde_json::from_str("\"snackPM\"").unwrap();
        assert_eq!(key, MealKey::SnackPm);
    }

    #[test]
    fn test_meal_key_parse() {
        assert_eq!(MealKey::parse("breakfast"), Some(MealKey::Desayuno));
        assert_eq!(MealKey::parse("SnackAM"), Some(MealKey::SnackAm));
        assert_eq!(MealKey::parse("5"), Some(MealKey::Cena));
        assert_eq!(MealKey::parse("brunch"), None);
    }

    #[test]
    fn test_gender_parse_falls_back_to_male() {
        assert_eq!(Gender::parse("female"), Gender::Female);
        assert_eq!(Gender::parse("Mujer"), Gender::Female);
        assert_eq!(Gender::parse("other"), Gender::Male);
        assert_eq!(Gender::parse(""), Gender::Male);
    }

    #[test]
    fn test_language_parse() {
        assert_eq!(Language::parse("EN"), Language::En);
        assert_eq!(Language::parse("fr"), Language::Es);
    }

    #[test]
    fn test_day_override_set_and_clear_meal() {
        let mut ov = DayOverride::default();
        assert!(ov.is_empty());

        let salmon = MealOverride { name: Some("Salmón".into()), ..Default::default() };
        ov.set_meal(MealKey::Cena, salmon);
        assert!(!ov.is_empty());
        assert_eq!(ov.meal(MealKey::Cena).unwrap().name.as_deref(), Some("Salmón"));

        ov.clear_meal(MealKey::Cena);
        assert!(ov.is_empty());
    }

    #[test]
    fn test_day_override_json_uses_slot_keys() {
        let mut ov = DayOverride::default();
        let nuts = MealOverride { qty: Some("30 g nueces".into()), ..Default::default() };
        ov.set_meal(MealKey::SnackPm, nuts);
        let json = serde_json::to_value(&ov).unwrap();
        assert_eq!(json["snackPM"]["qty"], "30 g nueces");
        assert!(json.get("kcal").is_none());
    }

    #[test]
    fn test_macros_display() {
        let m = Macros { carbs: 7, protein: 25, fat: 68 };
        assert_eq!(m.to_string(), "C 7% · P 25% · F 68%");
    }
}
