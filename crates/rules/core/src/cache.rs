//! Memoization of extracted and gathered changes.
//!
//! The cache decorates the pure extraction and gathering steps of the
//! [`crate::Resolver`]; it is never consulted for filtering or reduction.
//! Entries are keyed by entity (id and address) plus every call parameter
//! that changes the result, so two entities never share a slot even when
//! separately built trees reuse ids.
//!
//! Nothing here notices edits. Whoever mutates an entity, or rebuilds one in
//! place, must call [`ResolutionCache::invalidate`] with its id before the
//! next resolution.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::model::{AttributeChange, Entity, EntityId};

/// Hit and miss counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Cache identity of one entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct Slot {
    pub id: EntityId,
    pub addr: usize,
}

impl Slot {
    pub fn of(entity: &Entity) -> Self {
        Self {
            id: entity.id,
            addr: std::ptr::from_ref(entity).addr(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct ExtractKey {
    pub entity: Slot,
    pub duplicates: u32,
    pub skip_local: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct GatherKey {
    pub entity: Slot,
    pub parent: Option<Slot>,
    pub keys: Vec<String>,
    pub duplicates: u32,
    pub item_filter: Option<String>,
    pub embedded_items: Option<Vec<Slot>>,
    pub skip_local: bool,
    pub recursive: bool,
}

#[derive(Default)]
struct CacheState {
    extracted: HashMap<ExtractKey, Vec<AttributeChange>>,
    gathered: HashMap<GatherKey, Vec<AttributeChange>>,
    /// Owner of every entity seen as a child during gathering.
    parents: HashMap<EntityId, EntityId>,
    stats: CacheStats,
}

impl CacheState {
    fn top(&self, id: EntityId) -> EntityId {
        let mut seen = HashSet::from([id]);
        let mut current = id;
        while let Some(&parent) = self.parents.get(&current) {
            if !seen.insert(parent) {
                break;
            }
            current = parent;
        }
        current
    }

    /// `id`'s outermost known owner and everything recorded beneath it.
    fn family(&self, id: EntityId) -> HashSet<EntityId> {
        let top = self.top(id);
        let mut family = HashSet::from([top, id]);
        for &child in self.parents.keys() {
            if self.top(child) == top {
                family.insert(child);
            }
        }
        family
    }
}

/// Single-threaded resolution cache shared by every [`crate::Resolver`]
/// built with it.
#[derive(Default)]
pub struct ResolutionCache {
    state: RefCell<CacheState>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> CacheStats {
        self.state.borrow().stats
    }

    /// Number of cached entries of either kind.
    pub fn len(&self) -> usize {
        let state = self.state.borrow();
        state.extracted.len() + state.gathered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops everything derived from `id`.
    ///
    /// Gathered results depend on the whole ownership family (an item's
    /// gated changes are checked against its owner), so every gathered entry
    /// of the family `id` belongs to is evicted. Extracted entries only
    /// depend on the entity itself.
    pub fn invalidate(&self, id: EntityId) {
        let mut state = self.state.borrow_mut();
        let family = state.family(id);

        let before = state.extracted.len() + state.gathered.len();
        state.extracted.retain(|key, _| key.entity.id != id);
        state.gathered.retain(|key, _| {
            !family.contains(&key.entity.id) && !key.parent.is_some_and(|p| family.contains(&p.id))
        });
        let evicted = before - state.extracted.len() - state.gathered.len();

        tracing::debug!(target: "rules::cache", entity = %id, evicted, "invalidated");
    }

    pub fn invalidate_all(&self) {
        let mut state = self.state.borrow_mut();
        state.extracted.clear();
        state.gathered.clear();
        state.parents.clear();
        tracing::debug!(target: "rules::cache", "cleared");
    }

    pub(crate) fn extracted(
        &self,
        key: ExtractKey,
        compute: impl FnOnce() -> Vec<AttributeChange>,
    ) -> Vec<AttributeChange> {
        if let Some(hit) = self.hit(|state| state.extracted.get(&key).cloned()) {
            return hit;
        }
        tracing::trace!(target: "rules::cache", entity = %key.entity.id, "extract miss");
        let changes = compute();
        self.state
            .borrow_mut()
            .extracted
            .insert(key, changes.clone());
        changes
    }

    /// `compute` may itself go through the cache; no borrow is held while
    /// it runs.
    pub(crate) fn gathered(
        &self,
        key: GatherKey,
        compute: impl FnOnce() -> Vec<AttributeChange>,
    ) -> Vec<AttributeChange> {
        if let Some(hit) = self.hit(|state| state.gathered.get(&key).cloned()) {
            return hit;
        }
        tracing::trace!(target: "rules::cache", entity = %key.entity.id, "gather miss");
        let changes = compute();
        let mut state = self.state.borrow_mut();
        if let Some(parent) = key.parent {
            state.parents.insert(key.entity.id, parent.id);
        }
        state.gathered.insert(key, changes.clone());
        changes
    }

    fn hit(
        &self,
        probe: impl FnOnce(&CacheState) -> Option<Vec<AttributeChange>>,
    ) -> Option<Vec<AttributeChange>> {
        let mut state = self.state.borrow_mut();
        let found = probe(&state);
        if found.is_some() {
            state.stats.hits += 1;
        } else {
            state.stats.misses += 1;
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(id: u32) -> Slot {
        Slot {
            id: EntityId(id),
            addr: 0,
        }
    }

    fn gather_key(entity: u32, parent: Option<u32>) -> GatherKey {
        GatherKey {
            entity: slot(entity),
            parent: parent.map(slot),
            keys: Vec::new(),
            duplicates: 0,
            item_filter: None,
            embedded_items: None,
            skip_local: false,
            recursive: false,
        }
    }

    #[test]
    fn second_lookup_hits() {
        let cache = ResolutionCache::new();
        let key = ExtractKey {
            entity: slot(1),
            duplicates: 0,
            skip_local: false,
        };
        cache.extracted(key.clone(), Vec::new);
        cache.extracted(key, || panic!("should be cached"));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[test]
    fn invalidating_a_child_evicts_the_family() {
        let cache = ResolutionCache::new();
        cache.gathered(gather_key(2, Some(1)), Vec::new);
        cache.gathered(gather_key(3, Some(2)), Vec::new);
        cache.gathered(gather_key(1, None), Vec::new);
        cache.gathered(gather_key(9, None), Vec::new);
        assert_eq!(cache.len(), 4);

        cache.invalidate(EntityId(3));
        assert_eq!(cache.len(), 1);
        cache.gathered(gather_key(9, None), || panic!("unrelated entity evicted"));
    }

    #[test]
    fn same_id_at_another_address_misses() {
        let cache = ResolutionCache::new();
        let first = Entity::new(EntityId(1), "Unit", crate::model::EntityKind::Character);
        let second = first.clone();
        let key = |entity: &Entity| ExtractKey {
            entity: Slot::of(entity),
            duplicates: 0,
            skip_local: false,
        };
        cache.extracted(key(&first), Vec::new);
        cache.extracted(key(&second), Vec::new);
        assert_eq!(cache.stats(), CacheStats { hits: 0, misses: 2 });

        cache.invalidate(EntityId(1));
        assert!(cache.is_empty());
    }

    #[test]
    fn invalidate_all_empties() {
        let cache = ResolutionCache::new();
        cache.gathered(gather_key(1, None), Vec::new);
        cache.invalidate_all();
        assert!(cache.is_empty());
    }
}
