use std::fmt;

/// Unique identifier for any entity in the ownership graph.
///
/// Identifiers must be unique across everything a [`crate::EntityLookup`]
/// can reach; the resolution cache is scoped by them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The six ability scores.
///
/// The string form (`strength`, `dexterity`, ...) is also the prefix of the
/// `<ability>Bonus` attribute key that items use to raise a score.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum Ability {
    #[strum(to_string = "strength", serialize = "str")]
    Strength,
    #[strum(to_string = "dexterity", serialize = "dex")]
    Dexterity,
    #[strum(to_string = "constitution", serialize = "con")]
    Constitution,
    #[strum(to_string = "intelligence", serialize = "int")]
    Intelligence,
    #[strum(to_string = "wisdom", serialize = "wis")]
    Wisdom,
    #[strum(to_string = "charisma", serialize = "cha")]
    Charisma,
}

impl Ability {
    /// Score assumed when a profile does not list the ability.
    pub const DEFAULT_SCORE: i64 = 10;

    /// Attribute key whose summed values raise this ability.
    pub fn bonus_key(self) -> String {
        format!("{}Bonus", self.as_ref())
    }
}

/// Character sex, as checked by `Sex` prerequisites.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Sex {
    Male,
    Female,
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn ability_parses_short_and_long_names() {
        assert_eq!(Ability::from_str("Str").unwrap(), Ability::Strength);
        assert_eq!(Ability::from_str("WISDOM").unwrap(), Ability::Wisdom);
        assert_eq!(Ability::Charisma.to_string(), "charisma");
        assert_eq!(Ability::Dexterity.bonus_key(), "dexterityBonus");
    }

    #[test]
    fn entity_id_display() {
        assert_eq!(EntityId(42).to_string(), "#42");
    }
}
