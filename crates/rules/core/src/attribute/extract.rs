//! Local change extraction: what one entity declares, without its children.

use crate::model::{AttributeChange, ChangeSource, DeclaredChange, Entity};

fn source(entity: &Entity, description: Option<String>) -> ChangeSource {
    ChangeSource {
        id: entity.id,
        name: entity.name.clone(),
        description,
    }
}

fn stamp<'d>(
    declared: impl IntoIterator<Item = &'d DeclaredChange>,
    source: &ChangeSource,
    entity: &Entity,
    out: &mut Vec<AttributeChange>,
) {
    out.extend(declared.into_iter().map(|change| {
        AttributeChange::from_declared(change, source.clone(), entity.prerequisite.as_ref())
    }));
}

/// Changes `entity` declares itself, in declaration order.
///
/// Plain entities contribute their own changes followed by those of every
/// enabled effect. A class entity stands for one character level: its
/// class-wide changes come only from the first occurrence of the class
/// (`duplicates < 2`), and every occurrence adds the record of level
/// `duplicates` (level 1 when `duplicates` is 0).
///
/// `skip_local` leaves out everything but per-level records.
pub fn local_changes(entity: &Entity, duplicates: u32, skip_local: bool) -> Vec<AttributeChange> {
    let mut out = Vec::new();
    let include_local = !skip_local && (!entity.kind.is_class() || duplicates < 2);

    if include_local {
        stamp(&entity.changes, &source(entity, None), entity, &mut out);
        for effect in entity.effects.iter().filter(|effect| effect.is_enabled()) {
            stamp(
                &effect.changes,
                &source(entity, Some(effect.name.clone())),
                entity,
                &mut out,
            );
        }
    }

    if entity.kind.is_class() {
        let level = duplicates.max(1);
        if let Some(record) = entity.level(level) {
            stamp(
                &record.changes,
                &source(entity, Some(format!("Level {level}"))),
                entity,
                &mut out,
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ActiveEffect, EntityId, EntityKind, LevelRecord};
    use crate::prerequisite::Prerequisite;

    fn soldier(id: u32) -> Entity {
        Entity::new(EntityId(id), "Soldier", EntityKind::Class)
            .with_change(DeclaredChange::new("classSkill", "Mechanics"))
            .with_level(LevelRecord::new(1).with_change(DeclaredChange::new("baseAttackBonus", 1)))
            .with_level(LevelRecord::new(2).with_change(DeclaredChange::new("baseAttackBonus", 1)))
    }

    #[test]
    fn plain_entity_includes_enabled_effects() {
        let blaster = Entity::new(EntityId(1), "Blaster", EntityKind::Weapon)
            .with_change(DeclaredChange::new("damage", "3d6"))
            .with_effect(
                ActiveEffect::new(EntityId(2), "Scope")
                    .with_change(DeclaredChange::new("toHitModifier", 1)),
            )
            .with_effect(
                ActiveEffect::new(EntityId(3), "Broken")
                    .disabled()
                    .with_change(DeclaredChange::new("toHitModifier", -5)),
            );

        let changes = local_changes(&blaster, 0, false);
        let keys: Vec<_> = changes.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["damage", "toHitModifier"]);
        assert_eq!(changes[1].source.to_string(), "Blaster (Scope)");
        assert!(changes.iter().all(|c| c.source.id == EntityId(1)));
    }

    #[test]
    fn first_class_level_declares_class_wide_changes() {
        let changes = local_changes(&soldier(1), 1, false);
        let keys: Vec<_> = changes.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["classSkill", "baseAttackBonus"]);
        assert_eq!(
            changes[1].source.description.as_deref(),
            Some("Level 1")
        );
    }

    #[test]
    fn later_class_levels_only_add_their_record() {
        let changes = local_changes(&soldier(2), 2, false);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].key, "baseAttackBonus");
        assert_eq!(changes[0].source.description.as_deref(), Some("Level 2"));
    }

    #[test]
    fn skip_local_keeps_level_records() {
        let changes = local_changes(&soldier(1), 1, true);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].key, "baseAttackBonus");
    }

    #[test]
    fn entity_prerequisite_is_stamped_on_changes() {
        let feat = Entity::new(EntityId(4), "Armor Training", EntityKind::Feat)
            .with_prerequisite(Prerequisite::CharacterLevel(3))
            .with_change(DeclaredChange::new("armorProficiency", "Heavy"));
        let changes = local_changes(&feat, 0, false);
        assert_eq!(
            changes[0].parent_prerequisite,
            Some(Prerequisite::CharacterLevel(3))
        );
        assert_eq!(changes[0].owning_id(), EntityId(4));
    }
}
