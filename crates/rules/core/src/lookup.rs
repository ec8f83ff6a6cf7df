//! Resolving entities from the bare ids stamped on changes.

use std::collections::HashMap;

use crate::error::CatalogError;
use crate::model::{Entity, EntityId};

/// Finds the entity that produced a given source id, and who holds it.
///
/// Typically backed by the character roster plus the reference catalog.
pub trait EntityLookup {
    fn entity(&self, id: EntityId) -> Option<&Entity>;

    /// The entity directly owning `id`; `None` for roots and unknown ids.
    fn owner_of(&self, _id: EntityId) -> Option<&Entity> {
        None
    }
}

/// Lookup that knows nothing; owners then resolve only within the queried
/// entity's own subtree.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoLookup;

impl EntityLookup for NoLookup {
    fn entity(&self, _id: EntityId) -> Option<&Entity> {
        None
    }
}

impl EntityLookup for Vec<Entity> {
    fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.iter().find_map(|entity| entity.find(id))
    }

    fn owner_of(&self, id: EntityId) -> Option<&Entity> {
        self.iter().find_map(|entity| entity.owner_of(id))
    }
}

/// Indexes `roots` and all their descendants by id.
///
/// # Errors
///
/// Returns `CatalogError::DuplicateEntityId` when two entities share an id.
pub fn index_entities<'a>(
    roots: impl IntoIterator<Item = &'a Entity>,
) -> Result<HashMap<EntityId, &'a Entity>, CatalogError> {
    let mut index: HashMap<EntityId, &'a Entity> = HashMap::new();
    for root in roots {
        for entity in std::iter::once(root).chain(root.descendants()) {
            if let Some(existing) = index.insert(entity.id, entity) {
                return Err(CatalogError::DuplicateEntityId {
                    id: entity.id,
                    first: existing.name.clone(),
                    second: entity.name.clone(),
                });
            }
        }
    }
    Ok(index)
}
