//! Attribute aggregation over the ownership graph.

use std::collections::{HashMap, HashSet};

use super::extract;
use super::query::{AttributeFilter, AttributeQuery};
use super::reduce::{Resolved, reduce};
use crate::cache::{ExtractKey, GatherKey, ResolutionCache, Slot};
use crate::config::RulesConfig;
use crate::lookup::EntityLookup;
use crate::model::{AttributeChange, Entity, EntityId};
use crate::prerequisite::{Evaluator, Prerequisite, PrerequisiteReport};
use crate::sheet::{ActorSheet, CharacterSheet};

/// Resolution context: the owner lookup, the static rules configuration and
/// an optional cache.
///
/// Cheap to copy; sheets and nested resolutions carry it along.
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    lookup: &'a dyn EntityLookup,
    config: &'a RulesConfig,
    cache: Option<&'a ResolutionCache>,
    /// Changes whose gates are being evaluated by callers up the stack.
    pending: Option<&'a PendingGate<'a>>,
}

/// One change whose gate is under evaluation. Lookups made by that
/// evaluation leave the change out, which keeps gate evaluation finite.
struct PendingGate<'a> {
    change: &'a AttributeChange,
    outer: Option<&'a PendingGate<'a>>,
}

impl PendingGate<'_> {
    fn matches(&self, change: &AttributeChange) -> bool {
        let pending = self.change;
        pending.source == change.source
            && pending.key == change.key
            && pending.value == change.value
            && pending.prerequisite == change.prerequisite
    }
}

impl<'a> Resolver<'a> {
    pub fn new(lookup: &'a dyn EntityLookup, config: &'a RulesConfig) -> Self {
        Self {
            lookup,
            config,
            cache: None,
            pending: None,
        }
    }

    #[must_use]
    pub fn with_cache(mut self, cache: &'a ResolutionCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn config(&self) -> &'a RulesConfig {
        self.config
    }

    /// Prerequisite view of `entity`.
    pub fn sheet(&self, entity: &'a Entity) -> ActorSheet<'a> {
        ActorSheet::new(*self, entity)
    }

    /// Evaluates `prerequisites` against `target` with the configured depth
    /// limit.
    pub fn meets_prerequisites(
        &self,
        target: Option<&'a Entity>,
        prerequisites: &[Prerequisite],
        notify_on_failure: bool,
    ) -> PrerequisiteReport {
        let sheet = target.map(|entity| self.sheet(entity));
        Evaluator::new(sheet.as_ref().map(|sheet| sheet as &dyn CharacterSheet))
            .with_max_depth(self.config.max_prerequisite_depth)
            .evaluate(prerequisites, notify_on_failure)
    }

    /// Resolves an attribute.
    ///
    /// Roots are resolved independently and concatenated. For every root,
    /// changes are gathered from the root and its children, filtered by key
    /// and attribute filter, and gated by their prerequisites (unless the
    /// query is `recursive`). Per key, override changes then replace every
    /// non-override change, and the result is reduced.
    ///
    /// A query without roots yields an empty (or zero) result.
    pub fn get_inheritable_attribute(&self, query: &AttributeQuery<'a>) -> Resolved {
        reduce(self.changes(query), query.reduce.as_ref())
    }

    /// The surviving changes of a query, before reduction.
    pub fn changes(&self, query: &AttributeQuery<'a>) -> Vec<AttributeChange> {
        let mut changes = Vec::new();
        for &root in &query.entities {
            changes.extend(self.collect(query, root));
        }
        collapse_overrides(changes)
    }

    /// Gathered changes of one root after attribute filtering and the root
    /// gate.
    fn collect(&self, query: &AttributeQuery<'a>, root: &'a Entity) -> Vec<AttributeChange> {
        let mut changes = self.gather(query, root);
        if let Some(filter) = &query.attribute_filter {
            changes.retain(|change| self.keeps(filter, change));
        }

        if root.kind.is_actor() && !query.recursive {
            // Changes owned directly by the root were gated against it already.
            changes.retain(|change| {
                change.owning_id() == root.id
                    || change.parent_prerequisite.is_none()
                    || (!self.is_pending(change)
                        && self.passes(Some(root), change, change.parent_prerequisite.as_ref()))
            });
        }
        changes
    }

    fn keeps(&self, filter: &AttributeFilter, change: &AttributeChange) -> bool {
        match filter {
            AttributeFilter::ActorInheritable => !self.config.is_item_only(&change.key),
            AttributeFilter::Custom(predicate) => predicate.test(change),
        }
    }

    /// Root's own gated changes followed by every child's contribution.
    ///
    /// Gathering under a pending gate depends on that gate, so it bypasses
    /// the cache.
    fn gather(&self, query: &AttributeQuery<'a>, root: &'a Entity) -> Vec<AttributeChange> {
        let Some(cache) = self.cache.filter(|_| self.pending.is_none()) else {
            return self.walk(query, root);
        };
        let key = GatherKey {
            entity: Slot::of(root),
            parent: query.parent.map(Slot::of),
            keys: query.attribute_keys.clone(),
            duplicates: query.duplicates,
            item_filter: query.item_filter.as_ref().map(|p| p.id().to_owned()),
            embedded_items: query
                .embedded_item_override
                .as_ref()
                .map(|items| items.iter().map(|item| Slot::of(item)).collect()),
            skip_local: query.skip_local,
            recursive: query.recursive,
        };
        cache.gathered(key, || self.walk(query, root))
    }

    fn walk(&self, query: &AttributeQuery<'a>, root: &'a Entity) -> Vec<AttributeChange> {
        let owner = query.parent.map(|parent| parent.id);
        let mut changes = self.local(root, query.duplicates, query.skip_local);
        changes.retain(|change| query.matches_key(&change.key));
        if owner.is_some() {
            for change in &mut changes {
                change.owner = owner;
            }
        }
        if !query.recursive {
            changes.retain(|change| self.gate(query, root, change));
        }

        let children: Vec<&'a Entity> = match &query.embedded_item_override {
            Some(items) => items.clone(),
            None => root.items.iter().collect(),
        };

        let mut seen: HashMap<&str, u32> = HashMap::new();
        for child in children {
            if query.item_filter.as_ref().is_some_and(|filter| !filter.test(child)) {
                continue;
            }
            let name = child.name.trim();
            if name.is_empty() {
                continue;
            }
            let occurrence = seen.entry(name).or_insert(0);
            *occurrence += 1;

            let child_query = AttributeQuery {
                entities: vec![child],
                attribute_keys: query.attribute_keys.clone(),
                duplicates: *occurrence,
                recursive: query.recursive,
                parent: Some(root),
                ..AttributeQuery::default()
            };
            changes.extend(self.collect(&child_query, child));
        }
        changes
    }

    fn local(&self, entity: &Entity, duplicates: u32, skip_local: bool) -> Vec<AttributeChange> {
        match self.cache {
            Some(cache) => cache.extracted(
                ExtractKey {
                    entity: Slot::of(entity),
                    duplicates,
                    skip_local,
                },
                || extract::local_changes(entity, duplicates, skip_local),
            ),
            None => extract::local_changes(entity, duplicates, skip_local),
        }
    }

    /// Checks a change's own and parent prerequisites against its owner.
    fn gate(&self, query: &AttributeQuery<'a>, root: &'a Entity, change: &AttributeChange) -> bool {
        if change.prerequisite.is_none() && change.parent_prerequisite.is_none() {
            return true;
        }
        if self.is_pending(change) {
            tracing::trace!(
                key = %change.key,
                source = %change.source,
                "left out while its gate is evaluated"
            );
            return false;
        }
        let owner = self.owner(query, root, change.owning_id());
        self.passes(owner, change, change.prerequisite.as_ref())
            && self.passes(owner, change, change.parent_prerequisite.as_ref())
    }

    /// The entity `id`'s gates run against: the walking parent, else its
    /// holder in the lookup, else (for unowned roots) the entity itself.
    fn owner(
        &self,
        query: &AttributeQuery<'a>,
        root: &'a Entity,
        id: EntityId,
    ) -> Option<&'a Entity> {
        query
            .parent
            .or_else(|| self.lookup.owner_of(id))
            .or_else(|| root.find(id))
            .or_else(|| self.lookup.entity(id))
    }

    fn is_pending(&self, change: &AttributeChange) -> bool {
        let mut frame = self.pending;
        while let Some(gate) = frame {
            if gate.matches(change) {
                return true;
            }
            frame = gate.outer;
        }
        false
    }

    /// Evaluates `prerequisite` for `change` with the change marked pending.
    fn passes(
        &self,
        target: Option<&'a Entity>,
        change: &AttributeChange,
        prerequisite: Option<&Prerequisite>,
    ) -> bool {
        let Some(prerequisite) = prerequisite else {
            return true;
        };
        let frame = PendingGate {
            change,
            outer: self.pending,
        };
        let nested = Resolver {
            lookup: self.lookup,
            config: self.config,
            cache: self.cache,
            pending: Some(&frame),
        };
        !nested
            .meets_prerequisites(target, std::slice::from_ref(prerequisite), false)
            .does_fail
    }
}

/// Per key: if any change overrides, only overriding changes survive.
fn collapse_overrides(changes: Vec<AttributeChange>) -> Vec<AttributeChange> {
    let overridden: HashSet<&str> = changes
        .iter()
        .filter(|change| change.is_override)
        .map(|change| change.key.as_str())
        .collect();
    if overridden.is_empty() {
        return changes;
    }
    let overridden: HashSet<String> = overridden.into_iter().map(str::to_owned).collect();
    changes
        .into_iter()
        .filter(|change| change.is_override || !overridden.contains(&change.key))
        .collect()
}
