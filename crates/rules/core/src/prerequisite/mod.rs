//! Prerequisite expressions and their evaluation.
//!
//! A prerequisite is a small tree: leaves name one concrete condition on a
//! character, `And`/`Or` combine them. Evaluation reads the character through
//! the [`crate::CharacterSheet`] accessor trait and never mutates anything.
//!
//! Absent prerequisites (`Option::None`) are inert and always pass.

mod evaluate;
pub mod graph;
mod report;

use std::fmt;

pub use evaluate::{Evaluator, meets_prerequisites};
pub use report::{Failure, PrerequisiteReport, Success};

use crate::model::{Ability, EntityKind, Sex};

/// Category of owned entity an ownership leaf looks for.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::AsRefStr,
)]
#[strum(serialize_all = "title_case")]
pub enum Holding {
    Item,
    Feat,
    Talent,
    Class,
    Trait,
    ForceTradition,
}

impl Holding {
    /// Whether an entity of `kind` belongs to this category.
    pub const fn accepts(self, kind: EntityKind) -> bool {
        match self {
            Self::Item => kind.is_gear(),
            Self::Feat => matches!(kind, EntityKind::Feat),
            Self::Talent => matches!(kind, EntityKind::Talent),
            Self::Class => matches!(kind, EntityKind::Class),
            Self::Trait => matches!(kind, EntityKind::Trait),
            Self::ForceTradition => matches!(kind, EntityKind::ForceTradition),
        }
    }
}

#[cfg(feature = "serde")]
fn default_or_count() -> u32 {
    1
}

/// One node of a prerequisite tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Prerequisite {
    /// Every child must pass.
    And { children: Vec<Prerequisite> },
    /// The passing children's success counts must sum to at least `count`.
    Or {
        #[cfg_attr(feature = "serde", serde(default = "default_or_count"))]
        count: u32,
        children: Vec<Prerequisite>,
    },
    /// Age within `low..=high` (open-ended when `high` is absent).
    Age { low: u32, high: Option<u32> },
    CharacterLevel(u32),
    BaseAttackBonus(i64),
    DarkSideScore(i64),
    Item(String),
    Feat(String),
    Talent(String),
    Class(String),
    Trait(String),
    ForceTradition(String),
    TrainedSkill(String),
    Attribute { ability: Ability, minimum: i64 },
    Proficiency(String),
    Equipped(String),
    Species(String),
    Sex(Sex),
    /// `Droid(true)` requires a droid, `Droid(false)` a non-droid.
    Droid(bool),
    /// Free-text condition. "is a droid" / "is not a droid" are checked;
    /// anything else is GM-adjudicated and never blocks.
    Special(String),
    /// Condition the engine knows it cannot check. Always fails.
    Unsupported(String),
}

impl Prerequisite {
    pub fn and(children: impl IntoIterator<Item = Prerequisite>) -> Self {
        Self::And {
            children: children.into_iter().collect(),
        }
    }

    pub fn or(count: u32, children: impl IntoIterator<Item = Prerequisite>) -> Self {
        Self::Or {
            count,
            children: children.into_iter().collect(),
        }
    }

    /// Ownership leaves: the category and name they look for.
    pub fn holding(&self) -> Option<(Holding, &str)> {
        match self {
            Self::Item(name) => Some((Holding::Item, name)),
            Self::Feat(name) => Some((Holding::Feat, name)),
            Self::Talent(name) => Some((Holding::Talent, name)),
            Self::Class(name) => Some((Holding::Class, name)),
            Self::Trait(name) => Some((Holding::Trait, name)),
            Self::ForceTradition(name) => Some((Holding::ForceTradition, name)),
            _ => None,
        }
    }

    pub fn children(&self) -> &[Prerequisite] {
        match self {
            Self::And { children } | Self::Or { children, .. } => children,
            _ => &[],
        }
    }

    /// Visits this node and every descendant, pre-order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Prerequisite)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, children: &[Prerequisite]) -> fmt::Result {
    for (index, child) in children.iter().enumerate() {
        if index > 0 {
            f.write_str("; ")?;
        }
        write!(f, "{child}")?;
    }
    Ok(())
}

impl fmt::Display for Prerequisite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And { children } => {
                f.write_str("All of: ")?;
                write_list(f, children)
            }
            Self::Or { count, children } => {
                write!(f, "At least {count} of: ")?;
                write_list(f, children)
            }
            Self::Age { low, high: Some(high) } => write!(f, "Age {low}-{high}"),
            Self::Age { low, high: None } => write!(f, "Age {low}+"),
            Self::CharacterLevel(level) => write!(f, "Character Level {level}"),
            Self::BaseAttackBonus(bonus) => write!(f, "Base Attack Bonus +{bonus}"),
            Self::DarkSideScore(score) => write!(f, "Dark Side Score {score}"),
            Self::TrainedSkill(skill) => write!(f, "Trained in {skill}"),
            Self::Attribute { ability, minimum } => write!(f, "{ability} {minimum}"),
            Self::Proficiency(name) => write!(f, "Proficient with {name}"),
            Self::Equipped(name) => write!(f, "{name} equipped"),
            Self::Species(name) => write!(f, "Species: {name}"),
            Self::Sex(sex) => write!(f, "Sex: {sex}"),
            Self::Droid(true) => f.write_str("Is a droid"),
            Self::Droid(false) => f.write_str("Is not a droid"),
            Self::Special(text) => f.write_str(text),
            Self::Unsupported(text) => write!(f, "Unsupported prerequisite: {text}"),
            other => match other.holding() {
                Some((holding, name)) => write!(f, "{holding}: {name}"),
                None => Ok(()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_reads_like_a_rulebook() {
        let prerequisite = Prerequisite::and([
            Prerequisite::BaseAttackBonus(5),
            Prerequisite::Feat("Weapon Focus".into()),
            Prerequisite::or(
                1,
                [
                    Prerequisite::ForceTradition("Jedi".into()),
                    Prerequisite::Droid(false),
                ],
            ),
        ]);
        assert_eq!(
            prerequisite.to_string(),
            "All of: Base Attack Bonus +5; Feat: Weapon Focus; At least 1 of: Force Tradition: Jedi; Is not a droid"
        );
    }

    #[test]
    fn walk_visits_every_node() {
        let prerequisite = Prerequisite::and([
            Prerequisite::Talent("Block".into()),
            Prerequisite::or(1, [Prerequisite::Feat("Dodge".into())]),
        ]);
        let mut names = Vec::new();
        prerequisite.walk(&mut |node| {
            if let Some((_, name)) = node.holding() {
                names.push(name.to_owned());
            }
        });
        assert_eq!(names, vec!["Block", "Dodge"]);
    }
}
