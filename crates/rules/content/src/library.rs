//! Catalog + roster, validated and indexed by entity id.

use std::collections::HashMap;

use rules_core::error::CatalogError;
use rules_core::prerequisite::graph::{self, UnresolvedReference};
use rules_core::{Entity, EntityId, EntityLookup, index_entities};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Shelf {
    Catalog,
    Roster,
}

/// Where an entity sits: its shelf, root index, then child indices.
#[derive(Clone, Debug)]
struct Location {
    shelf: Shelf,
    path: Vec<usize>,
}

/// Validated content: the reference catalog and the character roster.
///
/// Ids must be unique across both; characters own their items by value, so
/// an owned copy of a catalog feat needs its own id.
#[derive(Debug)]
pub struct Library {
    catalog: Vec<Entity>,
    roster: Vec<Entity>,
    index: HashMap<EntityId, Location>,
}

impl Library {
    /// Validates and indexes content.
    ///
    /// # Errors
    ///
    /// - `CatalogError::DuplicateEntityId` when two entities share an id
    /// - `CatalogError::PrerequisiteCycle` when ownership prerequisites of
    ///   catalog entries (or of a character's items) reference each other
    ///   in a loop
    pub fn new(catalog: Vec<Entity>, roster: Vec<Entity>) -> Result<Self, CatalogError> {
        index_entities(catalog.iter().chain(&roster))?;
        graph::detect_cycles(&catalog)?;
        graph::detect_cycles(&roster)?;

        let mut index = HashMap::new();
        for (shelf, roots) in [(Shelf::Catalog, &catalog), (Shelf::Roster, &roster)] {
            for (position, root) in roots.iter().enumerate() {
                record(&mut index, shelf, vec![position], root);
            }
        }

        tracing::debug!(
            catalog = catalog.len(),
            roster = roster.len(),
            entities = index.len(),
            "library indexed"
        );
        Ok(Self {
            catalog,
            roster,
            index,
        })
    }

    pub fn catalog(&self) -> &[Entity] {
        &self.catalog
    }

    pub fn roster(&self) -> &[Entity] {
        &self.roster
    }

    /// Roster character by name, ignoring case.
    pub fn character(&self, name: &str) -> Option<&Entity> {
        find_named(&self.roster, name)
    }

    /// Catalog entry by name, ignoring case.
    pub fn entry(&self, name: &str) -> Option<&Entity> {
        find_named(&self.catalog, name)
    }

    /// Ownership references naming nothing in the catalog or the roster.
    pub fn unresolved_references(&self) -> Vec<UnresolvedReference> {
        let everything: Vec<Entity> = self.catalog.iter().chain(&self.roster).cloned().collect();
        graph::unresolved_references(&everything)
    }

    fn locate(&self, shelf: Shelf, path: &[usize]) -> Option<&Entity> {
        let roots = match shelf {
            Shelf::Catalog => &self.catalog,
            Shelf::Roster => &self.roster,
        };
        let (first, rest) = path.split_first()?;
        let mut entity = roots.get(*first)?;
        for position in rest {
            entity = entity.items.get(*position)?;
        }
        Some(entity)
    }
}

fn record(index: &mut HashMap<EntityId, Location>, shelf: Shelf, path: Vec<usize>, entity: &Entity) {
    for (position, item) in entity.items.iter().enumerate() {
        let mut child = path.clone();
        child.push(position);
        record(index, shelf, child, item);
    }
    index.insert(entity.id, Location { shelf, path });
}

fn find_named<'a>(entities: &'a [Entity], name: &str) -> Option<&'a Entity> {
    entities
        .iter()
        .find(|entity| entity.name.trim().eq_ignore_ascii_case(name.trim()))
}

impl EntityLookup for Library {
    fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.index
            .get(&id)
            .and_then(|location| self.locate(location.shelf, &location.path))
    }

    fn owner_of(&self, id: EntityId) -> Option<&Entity> {
        let location = self.index.get(&id)?;
        let (_, owner) = location.path.split_last()?;
        if owner.is_empty() {
            return None;
        }
        self.locate(location.shelf, owner)
    }
}
