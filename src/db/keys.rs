//! Storage keys: `keto:` + entity + `:day:`/`:week:` + index

pub const PREFIX: &str = "keto:";

/// Per-day and per-week record kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Calories,
    Water,
    Meals,
    Cheat,
    Extras,
    Exercise,
    Done,
    Shopping,
}

impl Entity {
    /// Entities stored per plan day
    pub const PER_DAY: [Entity; 7] = [
        Entity::Calories,
        Entity::Water,
        Entity::Meals,
        Entity::Cheat,
        Entity::Extras,
        Entity::Exercise,
        Entity::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::Calories => "calories",
            Entity::Water => "water",
            Entity::Meals => "meals",
            Entity::Cheat => "cheat",
            Entity::Extras => "extras",
            Entity::Exercise => "exercise",
            Entity::Done => "done",
            Entity::Shopping => "shopping",
        }
    }
}

pub fn day(entity: Entity, day: usize) -> String {
    format!("{}{}:day:{}", PREFIX, entity.as_str(), day)
}

pub fn week(entity: Entity, week: usize) -> String {
    format!("{}{}:week:{}", PREFIX, entity.as_str(), week)
}

/// Prefix shared by every day record of one entity
pub fn day_prefix(entity: Entity) -> String {
    format!("{}{}:day:", PREFIX, entity.as_str())
}

/// Day index back out of a day key
pub fn parse_day(entity: Entity, key: &str) -> Option<usize> {
    key.strip_prefix(&day_prefix(entity))?.parse().ok()
}

pub fn profile() -> String {
    format!("{}user:profile", PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_keys() {
        assert_eq!(day(Entity::Calories, 0), "keto:calories:day:0");
        assert_eq!(day(Entity::Water, 27), "keto:water:day:27");
        assert_eq!(day(Entity::Done, 3), "keto:done:day:3");
    }

    #[test]
    fn test_week_keys() {
        assert_eq!(week(Entity::Shopping, 1), "keto:shopping:week:1");
    }

    #[test]
    fn test_prefix_matches_day_key() {
        assert!(day(Entity::Extras, 12).starts_with(&day_prefix(Entity::Extras)));
        assert!(!day(Entity::Exercise, 12).starts_with(&day_prefix(Entity::Extras)));
    }

    #[test]
    fn test_parse_day() {
        assert_eq!(parse_day(Entity::Water, &day(Entity::Water, 14)), Some(14));
        assert_eq!(parse_day(Entity::Water, &day(Entity::Cheat, 14)), None);
        assert_eq!(parse_day(Entity::Water, "keto:water:day:x"), None);
    }

    #[test]
    fn test_profile_key() {
        assert_eq!(profile(), "keto:user:profile");
    }
}
