//! Request type for [`super::Resolver::get_inheritable_attribute`].

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use super::Reduce;
use crate::model::{AttributeChange, Entity, EntityId};

/// A named predicate.
///
/// The id takes part in cache keys, so two predicates with the same id must
/// behave the same.
pub struct Predicate<T> {
    id: Cow<'static, str>,
    test: Arc<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T> Predicate<T> {
    pub fn new(
        id: impl Into<Cow<'static, str>>,
        test: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            test: Arc::new(test),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn test(&self, value: &T) -> bool {
        (self.test)(value)
    }
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            test: Arc::clone(&self.test),
        }
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&self.id).finish()
    }
}

impl Predicate<Entity> {
    /// Only equipped items.
    pub fn equipped() -> Self {
        Self::new("equipped", |entity: &Entity| entity.equipped)
    }
}

/// Filter applied to changes after key filtering.
#[derive(Clone, Debug)]
pub enum AttributeFilter {
    /// Drops keys on the configured item-only deny-list.
    ActorInheritable,
    Custom(Predicate<AttributeChange>),
}

impl AttributeFilter {
    /// Drops changes declared by `id`, e.g. to ask what *other* sources say
    /// about an item.
    pub fn excluding_source(id: EntityId) -> Self {
        Self::Custom(Predicate::new(
            format!("exclude-source-{}", id.0),
            move |change: &AttributeChange| change.source.id != id,
        ))
    }
}

/// Parameters of one attribute resolution.
///
/// Built fluently:
///
/// ```
/// # use rules_core::{AttributeQuery, Entity, EntityId, EntityKind, Reduce};
/// let hero = Entity::new(EntityId(1), "Hero", EntityKind::Character);
/// let query = AttributeQuery::new()
///     .entity(&hero)
///     .key("baseAttackBonus")
///     .reduce(Reduce::Sum);
/// assert_eq!(query.attribute_keys, vec!["baseAttackBonus".to_string()]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct AttributeQuery<'e> {
    /// Roots to resolve. Several roots are resolved independently and their
    /// changes concatenated before reduction. No roots → empty result.
    pub entities: Vec<&'e Entity>,
    /// Keep only these keys; empty keeps everything.
    pub attribute_keys: Vec<String>,
    pub attribute_filter: Option<AttributeFilter>,
    /// Restricts which direct children of the root are walked.
    pub item_filter: Option<Predicate<Entity>>,
    /// 1-based occurrence of the root's name among its siblings; selects the
    /// class level a class entity contributes.
    pub duplicates: u32,
    /// `None` returns the filtered changes themselves.
    pub reduce: Option<Reduce>,
    /// Skip prerequisite gating entirely.
    pub recursive: bool,
    /// Entity the root's changes are gated against.
    pub parent: Option<&'e Entity>,
    /// Walk these children instead of the root's own.
    pub embedded_item_override: Option<Vec<&'e Entity>>,
    /// Leave out the root's own declared changes; children still contribute.
    pub skip_local: bool,
}

impl<'e> AttributeQuery<'e> {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entity(mut self, entity: &'e Entity) -> Self {
        self.entities.push(entity);
        self
    }

    #[must_use]
    pub fn entities(mut self, entities: impl IntoIterator<Item = &'e Entity>) -> Self {
        self.entities.extend(entities);
        self
    }

    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.attribute_keys.push(key.into());
        self
    }

    #[must_use]
    pub fn keys<K: Into<String>>(mut self, keys: impl IntoIterator<Item = K>) -> Self {
        self.attribute_keys.extend(keys.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn filter(mut self, filter: AttributeFilter) -> Self {
        self.attribute_filter = Some(filter);
        self
    }

    #[must_use]
    pub fn actor_inheritable(self) -> Self {
        self.filter(AttributeFilter::ActorInheritable)
    }

    #[must_use]
    pub fn item_filter(mut self, predicate: Predicate<Entity>) -> Self {
        self.item_filter = Some(predicate);
        self
    }

    #[must_use]
    pub fn duplicates(mut self, duplicates: u32) -> Self {
        self.duplicates = duplicates;
        self
    }

    #[must_use]
    pub fn reduce(mut self, reduce: Reduce) -> Self {
        self.reduce = Some(reduce);
        self
    }

    #[must_use]
    pub fn recursive(mut self) -> Self {
        self.recursive = true;
        self
    }

    #[must_use]
    pub fn parent(mut self, parent: &'e Entity) -> Self {
        self.parent = Some(parent);
        self
    }

    #[must_use]
    pub fn embedded_items(mut self, items: impl IntoIterator<Item = &'e Entity>) -> Self {
        self.embedded_item_override = Some(items.into_iter().collect());
        self
    }

    #[must_use]
    pub fn skip_local(mut self) -> Self {
        self.skip_local = true;
        self
    }

    pub(crate) fn matches_key(&self, key: &str) -> bool {
        self.attribute_keys.is_empty() || self.attribute_keys.iter().any(|wanted| wanted == key)
    }
}
