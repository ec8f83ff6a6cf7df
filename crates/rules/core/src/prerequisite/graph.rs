//! Load-time checks on the name-reference graph between catalog entries.
//!
//! Ownership leaves (`Feat("Dodge")`, ...) make the evaluator check the
//! matched entity's own prerequisite. If those references loop, evaluation
//! would loop too, so catalogs are checked for cycles before use.

use std::collections::{BTreeMap, BTreeSet};

use super::Holding;
use crate::error::CatalogError;
use crate::model::{Entity, EntityKind};

/// A prerequisite reference to a name no catalog entry carries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnresolvedReference {
    pub from: String,
    pub to: String,
}

/// An entity of the graph: its kind and normalized name.
type Node = (EntityKind, String);

/// A reference made by an ownership leaf: category and normalized name.
type Reference = (Holding, String);

/// Display name and outgoing references per node.
struct ReferenceGraph {
    names: BTreeMap<Node, String>,
    edges: BTreeMap<Node, BTreeSet<Reference>>,
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

impl ReferenceGraph {
    fn build(catalog: &[Entity]) -> Self {
        let mut graph = Self {
            names: BTreeMap::new(),
            edges: BTreeMap::new(),
        };
        for entity in catalog {
            graph.add(entity);
            for descendant in entity.descendants() {
                graph.add(descendant);
            }
        }
        graph
    }

    fn add(&mut self, entity: &Entity) {
        let name = normalize(&entity.name);
        if name.is_empty() {
            return;
        }
        let node = (entity.kind, name);
        self.names
            .entry(node.clone())
            .or_insert_with(|| entity.name.trim().to_owned());
        let edges = self.edges.entry(node).or_default();
        if let Some(prerequisite) = &entity.prerequisite {
            prerequisite.walk(&mut |leaf| {
                if let Some((holding, name)) = leaf.holding() {
                    edges.insert((holding, normalize(name)));
                }
            });
        }
    }

    /// Nodes a reference can be satisfied by.
    fn targets<'g>(&'g self, reference: &'g Reference) -> impl Iterator<Item = &'g Node> + 'g {
        let (holding, name) = reference;
        self.names
            .keys()
            .filter(move |(kind, candidate)| holding.accepts(*kind) && candidate == name)
    }

    fn display(&self, node: &Node) -> String {
        self.names.get(node).cloned().unwrap_or_else(|| node.1.clone())
    }

    fn find_cycle(&self) -> Option<Vec<String>> {
        let mut done = BTreeSet::new();
        for start in self.edges.keys() {
            let mut path = Vec::new();
            if let Some(cycle) = self.visit(start, &mut path, &mut done) {
                return Some(cycle);
            }
        }
        None
    }

    fn visit<'g>(
        &'g self,
        node: &'g Node,
        path: &mut Vec<&'g Node>,
        done: &mut BTreeSet<&'g Node>,
    ) -> Option<Vec<String>> {
        if let Some(position) = path.iter().position(|entry| *entry == node) {
            let mut cycle: Vec<String> = path[position..].iter().map(|n| self.display(n)).collect();
            cycle.push(self.display(node));
            return Some(cycle);
        }
        if done.contains(node) {
            return None;
        }

        path.push(node);
        for reference in self.edges.get(node).into_iter().flatten() {
            for target in self.targets(reference) {
                if let Some(cycle) = self.visit(target, path, done) {
                    return Some(cycle);
                }
            }
        }
        path.pop();
        done.insert(node);
        None
    }
}

/// Fails with the first prerequisite cycle found among `catalog` entries
/// and their nested items.
pub fn detect_cycles(catalog: &[Entity]) -> Result<(), CatalogError> {
    match ReferenceGraph::build(catalog).find_cycle() {
        Some(path) => Err(CatalogError::PrerequisiteCycle { path }),
        None => Ok(()),
    }
}

/// Lists ownership references to names that no catalog entry carries.
pub fn unresolved_references(catalog: &[Entity]) -> Vec<UnresolvedReference> {
    let graph = ReferenceGraph::build(catalog);
    let mut missing = Vec::new();
    for (from, references) in &graph.edges {
        for reference in references {
            if graph.targets(reference).next().is_none() {
                missing.push(UnresolvedReference {
                    from: graph.display(from),
                    to: reference.1.clone(),
                });
            }
        }
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityId;
    use crate::prerequisite::Prerequisite;

    fn feat(id: u32, name: &str, requires: Option<&str>) -> Entity {
        let entity = Entity::new(EntityId(id), name, EntityKind::Feat);
        match requires {
            Some(other) => entity.with_prerequisite(Prerequisite::Feat(other.into())),
            None => entity,
        }
    }

    #[test]
    fn acyclic_catalog_passes() {
        let catalog = vec![
            feat(1, "Dodge", None),
            feat(2, "Mobility", Some("Dodge")),
            feat(3, "Spring Attack", Some("Mobility")),
        ];
        assert_eq!(detect_cycles(&catalog), Ok(()));
        assert!(unresolved_references(&catalog).is_empty());
    }

    #[test]
    fn cycle_is_reported_with_path() {
        let catalog = vec![
            feat(1, "Alpha", Some("Beta")),
            feat(2, "Beta", Some("Gamma")),
            feat(3, "Gamma", Some("alpha")),
        ];
        assert_eq!(
            detect_cycles(&catalog),
            Err(CatalogError::PrerequisiteCycle {
                path: vec!["Alpha".into(), "Beta".into(), "Gamma".into(), "Alpha".into()],
            })
        );
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let catalog = vec![feat(1, "Ouroboros", Some("Ouroboros"))];
        assert!(detect_cycles(&catalog).is_err());
    }

    #[test]
    fn references_only_match_their_category() {
        let catalog = vec![
            Entity::new(EntityId(1), "Jedi", EntityKind::Class)
                .with_prerequisite(Prerequisite::ForceTradition("Jedi".into())),
            Entity::new(EntityId(2), "Jedi", EntityKind::ForceTradition),
        ];
        assert_eq!(detect_cycles(&catalog), Ok(()));
        assert!(unresolved_references(&catalog).is_empty());

        let feat_only = vec![
            Entity::new(EntityId(1), "Jedi", EntityKind::Class)
                .with_prerequisite(Prerequisite::Feat("Jedi".into())),
        ];
        assert_eq!(detect_cycles(&feat_only), Ok(()));
        assert_eq!(unresolved_references(&feat_only).len(), 1);
    }

    #[test]
    fn missing_targets_are_listed() {
        let catalog = vec![feat(1, "Mobility", Some("Dodge"))];
        assert_eq!(
            unresolved_references(&catalog),
            vec![UnresolvedReference {
                from: "Mobility".into(),
                to: "dodge".into()
            }]
        );
    }
}
