//! Character accessors read by the prerequisite evaluator.
//!
//! [`CharacterSheet`] is the only thing the evaluator knows about a target.
//! [`ActorSheet`] implements it over an [`Entity`], deriving level, base
//! attack bonus, ability scores and proficiencies through the attribute
//! resolver with full gating, so a prerequisite sees the same values
//! `get_inheritable_attribute` reports. A change whose own gate triggered the
//! lookup is left out of it.

use crate::attribute::{AttributeQuery, Reduce, Resolver};
use crate::model::{Ability, Entity, EntityKind, Sex};
use crate::prerequisite::Holding;

/// Attribute keys read by [`ActorSheet`].
pub mod keys {
    pub const BASE_ATTACK_BONUS: &str = "baseAttackBonus";
    pub const TRAINED_SKILL: &str = "trainedSkill";
    pub const WEAPON_PROFICIENCY: &str = "weaponProficiency";
    pub const ARMOR_PROFICIENCY: &str = "armorProficiency";
    pub const IS_DROID: &str = "isDroid";
}

/// Derived state of a character, as seen by prerequisites.
pub trait CharacterSheet {
    fn age(&self) -> Option<u32>;

    fn character_level(&self) -> u32;

    fn base_attack_bonus(&self) -> i64;

    fn dark_side_score(&self) -> i64;

    /// Owned entities of the given category.
    fn holdings(&self, holding: Holding) -> Vec<&Entity>;

    fn trained_skills(&self) -> Vec<String>;

    fn ability_score(&self, ability: Ability) -> i64;

    /// Weapon and armor proficiencies.
    fn proficiencies(&self) -> Vec<String>;

    fn equipped_items(&self) -> Vec<&Entity>;

    fn species(&self) -> Option<&str>;

    fn sex(&self) -> Option<Sex>;

    fn is_droid(&self) -> bool;
}

/// [`CharacterSheet`] over an entity of the ownership graph.
#[derive(Clone, Copy)]
pub struct ActorSheet<'a> {
    resolver: Resolver<'a>,
    entity: &'a Entity,
}

impl<'a> ActorSheet<'a> {
    pub fn new(resolver: Resolver<'a>, entity: &'a Entity) -> Self {
        Self { resolver, entity }
    }

    pub fn entity(&self) -> &'a Entity {
        self.entity
    }

    fn query(&self, keys: &[&str]) -> AttributeQuery<'a> {
        AttributeQuery::new()
            .entity(self.entity)
            .keys(keys.iter().copied())
    }

    fn sum(&self, key: &str) -> i64 {
        self.resolver
            .get_inheritable_attribute(&self.query(&[key]).reduce(Reduce::Sum))
            .as_number()
    }

    fn text_values(&self, keys: &[&str]) -> Vec<String> {
        self.resolver
            .get_inheritable_attribute(&self.query(keys).reduce(Reduce::Values))
            .into_values()
            .iter()
            .map(ToString::to_string)
            .collect()
    }
}

impl CharacterSheet for ActorSheet<'_> {
    fn age(&self) -> Option<u32> {
        self.entity.profile.as_ref().and_then(|profile| profile.age)
    }

    fn character_level(&self) -> u32 {
        let levels = self
            .entity
            .items
            .iter()
            .filter(|item| item.kind == EntityKind::Class)
            .count();
        u32::try_from(levels).unwrap_or(u32::MAX)
    }

    fn base_attack_bonus(&self) -> i64 {
        self.sum(keys::BASE_ATTACK_BONUS)
    }

    fn dark_side_score(&self) -> i64 {
        self.entity
            .profile
            .as_ref()
            .map_or(0, |profile| profile.dark_side_score)
    }

    fn holdings(&self, holding: Holding) -> Vec<&Entity> {
        self.entity
            .descendants()
            .into_iter()
            .filter(|entity| holding.accepts(entity.kind))
            .collect()
    }

    fn trained_skills(&self) -> Vec<String> {
        let mut skills = self
            .entity
            .profile
            .as_ref()
            .map(|profile| profile.trained_skills.clone())
            .unwrap_or_default();
        skills.extend(self.text_values(&[keys::TRAINED_SKILL]));
        skills
    }

    fn ability_score(&self, ability: Ability) -> i64 {
        let base = self
            .entity
            .profile
            .as_ref()
            .and_then(|profile| profile.abilities.get(&ability).copied())
            .unwrap_or(Ability::DEFAULT_SCORE);
        base + self.sum(&ability.bonus_key())
    }

    fn proficiencies(&self) -> Vec<String> {
        self.text_values(&[keys::WEAPON_PROFICIENCY, keys::ARMOR_PROFICIENCY])
    }

    fn equipped_items(&self) -> Vec<&Entity> {
        self.entity.items.iter().filter(|item| item.equipped).collect()
    }

    fn species(&self) -> Option<&str> {
        self.entity
            .items
            .iter()
            .find(|item| item.kind == EntityKind::Species)
            .map(|item| item.name.as_str())
    }

    fn sex(&self) -> Option<Sex> {
        self.entity.profile.as_ref().and_then(|profile| profile.sex)
    }

    fn is_droid(&self) -> bool {
        let flagged = self
            .entity
            .profile
            .as_ref()
            .is_some_and(|profile| profile.droid);
        flagged
            || self
                .resolver
                .get_inheritable_attribute(&self.query(&[keys::IS_DROID]).reduce(Reduce::Or))
                .as_bool()
    }
}
