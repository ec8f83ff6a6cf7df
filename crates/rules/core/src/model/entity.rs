//! Entities of the ownership graph.
//!
//! A character owns items (classes, feats, gear, species...), items own
//! nested items such as modes or upgrades, class items own per-level records,
//! and any item may carry active effects. Ownership is a tree: an entity is
//! stored inside its owner, so cycles are impossible by construction.

use std::collections::BTreeMap;

use super::change::DeclaredChange;
use super::common::{Ability, EntityId, Sex};
use crate::prerequisite::Prerequisite;

/// What an entity represents.
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
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum EntityKind {
    Character,
    Npc,
    Vehicle,
    Species,
    /// One level of a class. A character with three Soldier levels owns
    /// three `Class` entities named "Soldier".
    Class,
    Feat,
    Talent,
    Trait,
    ForceTradition,
    ForcePower,
    Weapon,
    Armor,
    Equipment,
    Upgrade,
    /// Alternate configuration of an item (e.g. a weapon's autofire mode).
    Mode,
}

impl EntityKind {
    /// Player characters and NPCs; these get the root-level prerequisite gate.
    pub const fn is_actor(self) -> bool {
        matches!(self, Self::Character | Self::Npc)
    }

    pub const fn is_class(self) -> bool {
        matches!(self, Self::Class)
    }

    /// Physical inventory items.
    pub const fn is_gear(self) -> bool {
        matches!(
            self,
            Self::Weapon | Self::Armor | Self::Equipment | Self::Upgrade
        )
    }
}

/// An effect attached to an entity.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveEffect {
    pub id: EntityId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub disabled: bool,
    /// Item-modifier effects apply even while flagged disabled.
    #[cfg_attr(feature = "serde", serde(default))]
    pub item_modifier: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub changes: Vec<DeclaredChange>,
}

impl ActiveEffect {
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            disabled: false,
            item_modifier: false,
            changes: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.disabled || self.item_modifier
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    #[must_use]
    pub fn item_modifier(mut self) -> Self {
        self.item_modifier = true;
        self
    }

    #[must_use]
    pub fn with_change(mut self, change: DeclaredChange) -> Self {
        self.changes.push(change);
        self
    }
}

/// Changes granted by a specific level of a class.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelRecord {
    /// 1-based class level.
    pub level: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub changes: Vec<DeclaredChange>,
}

impl LevelRecord {
    pub fn new(level: u32) -> Self {
        Self {
            level,
            changes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_change(mut self, change: DeclaredChange) -> Self {
        self.changes.push(change);
        self
    }
}

/// Stored (non-derived) facts about a character.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Profile {
    pub age: Option<u32>,
    pub sex: Option<Sex>,
    pub droid: bool,
    pub dark_side_score: i64,
    /// Base ability scores before item bonuses.
    pub abilities: BTreeMap<Ability, i64>,
    pub trained_skills: Vec<String>,
}

/// Any node of the ownership graph.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub kind: EntityKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub changes: Vec<DeclaredChange>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub effects: Vec<ActiveEffect>,
    /// Per-level records; only meaningful on `Class` entities.
    #[cfg_attr(feature = "serde", serde(default))]
    pub levels: Vec<LevelRecord>,
    /// Owned children.
    #[cfg_attr(feature = "serde", serde(default))]
    pub items: Vec<Entity>,
    /// Requirement for owning this entity at all.
    #[cfg_attr(feature = "serde", serde(default))]
    pub prerequisite: Option<Prerequisite>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub equipped: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub profile: Option<Profile>,
}

impl Entity {
    pub fn new(id: EntityId, name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            changes: Vec::new(),
            effects: Vec::new(),
            levels: Vec::new(),
            items: Vec::new(),
            prerequisite: None,
            equipped: false,
            profile: None,
        }
    }

    #[must_use]
    pub fn with_change(mut self, change: DeclaredChange) -> Self {
        self.changes.push(change);
        self
    }

    #[must_use]
    pub fn with_effect(mut self, effect: ActiveEffect) -> Self {
        self.effects.push(effect);
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: LevelRecord) -> Self {
        self.levels.push(level);
        self
    }

    #[must_use]
    pub fn with_item(mut self, item: Entity) -> Self {
        self.items.push(item);
        self
    }

    #[must_use]
    pub fn with_prerequisite(mut self, prerequisite: Prerequisite) -> Self {
        self.prerequisite = Some(prerequisite);
        self
    }

    #[must_use]
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = Some(profile);
        self
    }

    #[must_use]
    pub fn equipped(mut self) -> Self {
        self.equipped = true;
        self
    }

    /// Per-level record for a 1-based class level.
    pub fn level(&self, level: u32) -> Option<&LevelRecord> {
        self.levels.iter().find(|record| record.level == level)
    }

    /// Finds this entity or a descendant by id (depth-first).
    pub fn find(&self, id: EntityId) -> Option<&Entity> {
        if self.id == id {
            return Some(self);
        }
        self.items.iter().find_map(|item| item.find(id))
    }

    /// The entity directly holding `id` somewhere below `self`.
    pub fn owner_of(&self, id: EntityId) -> Option<&Entity> {
        if self.items.iter().any(|item| item.id == id) {
            return Some(self);
        }
        self.items.iter().find_map(|item| item.owner_of(id))
    }

    /// All descendants in depth-first pre-order, excluding `self`.
    pub fn descendants(&self) -> Vec<&Entity> {
        let mut out = Vec::new();
        let mut stack: Vec<&Entity> = self.items.iter().rev().collect();
        while let Some(entity) = stack.pop() {
            out.push(entity);
            stack.extend(entity.items.iter().rev());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Entity {
        Entity::new(EntityId(1), "Hero", EntityKind::Character)
            .with_item(
                Entity::new(EntityId(2), "Blaster", EntityKind::Weapon)
                    .with_item(Entity::new(EntityId(3), "Stun", EntityKind::Mode)),
            )
            .with_item(Entity::new(EntityId(4), "Toughness", EntityKind::Feat))
    }

    #[test]
    fn find_reaches_nested_items() {
        let hero = sample();
        assert_eq!(hero.find(EntityId(3)).map(|e| e.name.as_str()), Some("Stun"));
        assert!(hero.find(EntityId(9)).is_none());
    }

    #[test]
    fn owner_is_the_direct_holder() {
        let hero = sample();
        assert_eq!(hero.owner_of(EntityId(3)).map(|e| e.name.as_str()), Some("Blaster"));
        assert_eq!(hero.owner_of(EntityId(4)).map(|e| e.name.as_str()), Some("Hero"));
        assert!(hero.owner_of(EntityId(1)).is_none());
    }

    #[test]
    fn descendants_are_pre_ordered() {
        let hero = sample();
        let names: Vec<_> = hero.descendants().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Blaster", "Stun", "Toughness"]);
    }

    #[test]
    fn effect_enablement() {
        let effect = ActiveEffect::new(EntityId(5), "Scope");
        assert!(effect.is_enabled());
        assert!(!effect.clone().disabled().is_enabled());
        assert!(effect.disabled().item_modifier().is_enabled());
    }
}
