//! Tree-walk evaluation of prerequisites.
//!
//! Each leaf ends in one of three outcomes: success (with a repeat count),
//! hard failure, or soft failure. Composite nodes fold their children's
//! outcomes; nothing short-circuits, so reports always list every unmet leaf.

use std::slice;

use super::report::{Failure, Outcome, PrerequisiteReport, Success};
use super::{Holding, Prerequisite};
use crate::config::RulesConfig;
use crate::sheet::CharacterSheet;

/// Free-text requirements that are really the droid check.
const DROID_PHRASE: &str = "is a droid";
const NOT_DROID_PHRASE: &str = "is not a droid";

enum Leaf {
    Pass(u32),
    Fail(String),
    Soft(String),
}

/// Evaluates prerequisites against one target.
///
/// The evaluator remembers which owned entities it is currently checking.
/// Meeting an entity already on that chain means the data contains a
/// prerequisite cycle; the leaf fails closed instead of recursing forever.
pub struct Evaluator<'a> {
    target: Option<&'a dyn CharacterSheet>,
    max_depth: usize,
    chain: Vec<String>,
}

impl<'a> Evaluator<'a> {
    pub fn new(target: Option<&'a dyn CharacterSheet>) -> Self {
        Self {
            target,
            max_depth: RulesConfig::DEFAULT_MAX_PREREQUISITE_DEPTH,
            chain: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Evaluates a list of prerequisites as an implicit conjunction.
    pub fn evaluate(
        &mut self,
        prerequisites: &[Prerequisite],
        notify_on_failure: bool,
    ) -> PrerequisiteReport {
        let mut outcome = Outcome::default();
        self.evaluate_all(prerequisites, &mut outcome);
        let report = outcome.into_report();

        if notify_on_failure && report.does_fail {
            tracing::warn!(
                target: "rules::prerequisite",
                unmet = ?report.blocking_messages(),
                "prerequisites not met"
            );
        }
        report
    }

    fn evaluate_all(&mut self, prerequisites: &[Prerequisite], out: &mut Outcome) {
        for prerequisite in prerequisites {
            self.evaluate_node(prerequisite, out);
        }
    }

    fn evaluate_node(&mut self, prerequisite: &Prerequisite, out: &mut Outcome) {
        match prerequisite {
            Prerequisite::And { children } => {
                let mut inner = Outcome::default();
                self.evaluate_all(children, &mut inner);
                if inner.blocks() {
                    out.absorb_failures(inner);
                    out.failures.push(Failure::hard(prerequisite.to_string()));
                } else {
                    // Soft failures stay visible even when the node passes.
                    out.absorb_failures(inner);
                    out.successes.push(success(prerequisite, 1));
                }
            }
            Prerequisite::Or { count, children } => {
                let mut satisfied = 0;
                let mut unmet = Outcome::default();
                for child in children {
                    let mut inner = Outcome::default();
                    self.evaluate_node(child, &mut inner);
                    if inner.blocks() {
                        unmet.absorb_failures(inner);
                    } else {
                        satisfied += inner.success_count();
                    }
                }
                if satisfied >= *count {
                    out.successes.push(success(prerequisite, 1));
                } else {
                    out.absorb_failures(unmet);
                    out.failures.push(Failure::hard(prerequisite.to_string()));
                }
            }
            leaf => match self.evaluate_leaf(leaf, out) {
                Leaf::Pass(count) => out.successes.push(success(leaf, count)),
                Leaf::Fail(message) => out.failures.push(Failure::hard(message)),
                Leaf::Soft(message) => out.failures.push(Failure::soft(message)),
            },
        }
    }

    fn evaluate_leaf(&mut self, prerequisite: &Prerequisite, out: &mut Outcome) -> Leaf {
        let label = prerequisite.to_string();

        match prerequisite {
            Prerequisite::Unsupported(text) => {
                tracing::warn!(
                    target: "rules::prerequisite",
                    requirement = %text,
                    "unsupported prerequisite; failing closed"
                );
                return Leaf::Fail(label);
            }
            Prerequisite::Special(text) => {
                let phrase = text.trim().to_ascii_lowercase();
                let expected = if phrase == DROID_PHRASE {
                    true
                } else if phrase == NOT_DROID_PHRASE {
                    false
                } else {
                    return Leaf::Soft(label);
                };
                return self.evaluate_leaf(&Prerequisite::Droid(expected), out);
            }
            _ => {}
        }

        let Some(target) = self.target else {
            return Leaf::Fail(format!("{label} (no character to check)"));
        };

        let met = match prerequisite {
            Prerequisite::Age { low, high } => target
                .age()
                .is_some_and(|age| age >= *low && high.is_none_or(|high| age <= high)),
            Prerequisite::CharacterLevel(level) => target.character_level() >= *level,
            Prerequisite::BaseAttackBonus(bonus) => target.base_attack_bonus() >= *bonus,
            Prerequisite::DarkSideScore(score) => target.dark_side_score() >= *score,
            Prerequisite::TrainedSkill(skill) => contains_name(&target.trained_skills(), skill),
            Prerequisite::Attribute { ability, minimum } => {
                target.ability_score(*ability) >= *minimum
            }
            Prerequisite::Proficiency(name) => contains_name(&target.proficiencies(), name),
            Prerequisite::Equipped(name) => target
                .equipped_items()
                .iter()
                .any(|item| same_name(&item.name, name)),
            Prerequisite::Species(name) => target.species().is_some_and(|s| same_name(s, name)),
            Prerequisite::Sex(sex) => target.sex() == Some(*sex),
            Prerequisite::Droid(expected) => target.is_droid() == *expected,
            other => match other.holding() {
                Some((holding, name)) => return self.evaluate_holding(target, holding, name, label, out),
                None => false,
            },
        };

        if met { Leaf::Pass(1) } else { Leaf::Fail(label) }
    }

    /// Ownership leaves pass once per owned match whose own prerequisites
    /// currently pass.
    fn evaluate_holding(
        &mut self,
        target: &'a dyn CharacterSheet,
        holding: Holding,
        name: &str,
        label: String,
        out: &mut Outcome,
    ) -> Leaf {
        let mut qualifying = 0;
        let mut reasons = Outcome::default();

        for owned in target.holdings(holding) {
            if !same_name(&owned.name, name) {
                continue;
            }
            let Some(own) = &owned.prerequisite else {
                qualifying += 1;
                continue;
            };

            let key = owned.name.trim().to_ascii_lowercase();
            if self.chain.contains(&key) {
                tracing::error!(
                    target: "rules::prerequisite",
                    chain = ?self.chain,
                    entity = %owned.name,
                    "circular prerequisite"
                );
                reasons
                    .silent_failures
                    .push(Failure::hard(format!("circular prerequisite through {}", owned.name)));
                continue;
            }
            if self.chain.len() >= self.max_depth {
                tracing::error!(
                    target: "rules::prerequisite",
                    depth = self.chain.len(),
                    entity = %owned.name,
                    "prerequisite nesting too deep"
                );
                reasons
                    .silent_failures
                    .push(Failure::hard(format!("prerequisites of {} nest too deeply", owned.name)));
                continue;
            }

            self.chain.push(key);
            let mut nested = Outcome::default();
            self.evaluate_all(slice::from_ref(own), &mut nested);
            self.chain.pop();

            if nested.blocks() {
                reasons.silent_failures.extend(nested.failures);
                reasons.silent_failures.extend(nested.silent_failures);
            } else {
                qualifying += 1;
            }
        }

        if qualifying > 0 {
            Leaf::Pass(qualifying)
        } else {
            out.silent_failures.extend(reasons.silent_failures);
            Leaf::Fail(label)
        }
    }
}

fn success(prerequisite: &Prerequisite, count: u32) -> Success {
    Success {
        prerequisite: prerequisite.to_string(),
        count,
    }
}

fn same_name(left: &str, right: &str) -> bool {
    left.trim().eq_ignore_ascii_case(right.trim())
}

fn contains_name(names: &[String], wanted: &str) -> bool {
    names.iter().any(|name| same_name(name, wanted))
}

/// Evaluates `prerequisites` against `target` with default limits.
///
/// An empty list always passes. A missing target fails every leaf that needs
/// to look something up.
pub fn meets_prerequisites(
    target: Option<&dyn CharacterSheet>,
    prerequisites: &[Prerequisite],
    notify_on_failure: bool,
) -> PrerequisiteReport {
    Evaluator::new(target).evaluate(prerequisites, notify_on_failure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Ability, Entity, EntityId, EntityKind, Sex};

    /// Fixed-answer sheet for exercising the evaluator alone.
    #[derive(Default)]
    struct StubSheet {
        age: Option<u32>,
        level: u32,
        bab: i64,
        dark_side: i64,
        owned: Vec<Entity>,
        skills: Vec<String>,
        strength: i64,
        proficiencies: Vec<String>,
        species: Option<String>,
        sex: Option<Sex>,
        droid: bool,
    }

    impl CharacterSheet for StubSheet {
        fn age(&self) -> Option<u32> {
            self.age
        }
        fn character_level(&self) -> u32 {
            self.level
        }
        fn base_attack_bonus(&self) -> i64 {
            self.bab
        }
        fn dark_side_score(&self) -> i64 {
            self.dark_side
        }
        fn holdings(&self, holding: Holding) -> Vec<&Entity> {
            self.owned
                .iter()
                .filter(|entity| holding.accepts(entity.kind))
                .collect()
        }
        fn trained_skills(&self) -> Vec<String> {
            self.skills.clone()
        }
        fn ability_score(&self, ability: Ability) -> i64 {
            match ability {
                Ability::Strength => self.strength,
                _ => Ability::DEFAULT_SCORE,
            }
        }
        fn proficiencies(&self) -> Vec<String> {
            self.proficiencies.clone()
        }
        fn equipped_items(&self) -> Vec<&Entity> {
            self.owned.iter().filter(|entity| entity.equipped).collect()
        }
        fn species(&self) -> Option<&str> {
            self.species.as_deref()
        }
        fn sex(&self) -> Option<Sex> {
            self.sex
        }
        fn is_droid(&self) -> bool {
            self.droid
        }
    }

    fn feat(id: u32, name: &str) -> Entity {
        Entity::new(EntityId(id), name, EntityKind::Feat)
    }

    fn check(sheet: &StubSheet, prerequisites: &[Prerequisite]) -> PrerequisiteReport {
        meets_prerequisites(Some(sheet), prerequisites, false)
    }

    #[test]
    fn empty_prerequisites_pass() {
        let sheet = StubSheet::default();
        assert!(!check(&sheet, &[]).does_fail);
        assert!(!meets_prerequisites(None, &[], false).does_fail);
        assert!(!check(&sheet, &[Prerequisite::and([])]).does_fail);
    }

    #[test]
    fn missing_target_fails_closed() {
        let report = meets_prerequisites(None, &[Prerequisite::BaseAttackBonus(1)], true);
        assert!(report.does_fail);
        assert_eq!(
            report.failures[0].message,
            "Base Attack Bonus +1 (no character to check)"
        );
    }

    #[test]
    fn numeric_thresholds() {
        let sheet = StubSheet {
            age: Some(30),
            level: 4,
            bab: 3,
            dark_side: 2,
            strength: 13,
            ..StubSheet::default()
        };
        assert!(!check(&sheet, &[Prerequisite::CharacterLevel(4)]).does_fail);
        assert!(check(&sheet, &[Prerequisite::CharacterLevel(5)]).does_fail);
        assert!(!check(&sheet, &[Prerequisite::BaseAttackBonus(3)]).does_fail);
        assert!(check(&sheet, &[Prerequisite::DarkSideScore(3)]).does_fail);
        assert!(
            !check(
                &sheet,
                &[Prerequisite::Attribute {
                    ability: Ability::Strength,
                    minimum: 13
                }]
            )
            .does_fail
        );
        assert!(
            !check(
                &sheet,
                &[Prerequisite::Age {
                    low: 18,
                    high: Some(40)
                }]
            )
            .does_fail
        );
        assert!(check(&sheet, &[Prerequisite::Age { low: 31, high: None }]).does_fail);
    }

    #[test]
    fn name_matches_ignore_case_and_whitespace() {
        let sheet = StubSheet {
            skills: vec!["Use the Force".into()],
            proficiencies: vec!["Pistols".into()],
            species: Some("Wookiee".into()),
            sex: Some(Sex::Female),
            ..StubSheet::default()
        };
        let report = check(
            &sheet,
            &[
                Prerequisite::TrainedSkill(" use the force".into()),
                Prerequisite::Proficiency("PISTOLS".into()),
                Prerequisite::Species("wookiee".into()),
                Prerequisite::Sex(Sex::Female),
            ],
        );
        assert!(!report.does_fail, "{report:?}");
        assert_eq!(report.success_count(), 4);
    }

    #[test]
    fn or_counts_successes() {
        let sheet = StubSheet {
            owned: vec![feat(1, "Dodge"), feat(2, "Mobility"), feat(3, "Cleave")],
            ..StubSheet::default()
        };
        let two_of = |names: [&str; 3]| {
            Prerequisite::or(2, names.map(|name| Prerequisite::Feat(name.into())))
        };

        assert!(!check(&sheet, &[two_of(["Dodge", "Mobility", "Cleave"])]).does_fail);

        let report = check(&sheet, &[two_of(["Dodge", "Power Attack", "Spring Attack"])]);
        assert!(report.does_fail);
        assert!(report.failures.iter().any(|f| f.message == "Feat: Power Attack"));
    }

    #[test]
    fn repeated_holdings_count_separately() {
        let sheet = StubSheet {
            owned: vec![feat(1, "Skill Focus"), feat(2, "Skill Focus")],
            ..StubSheet::default()
        };
        let report = check(
            &sheet,
            &[Prerequisite::or(2, [Prerequisite::Feat("Skill Focus".into())])],
        );
        assert!(!report.does_fail);
    }

    #[test]
    fn and_reports_every_failing_child() {
        let sheet = StubSheet::default();
        let report = check(
            &sheet,
            &[Prerequisite::and([
                Prerequisite::Feat("Dodge".into()),
                Prerequisite::Talent("Block".into()),
            ])],
        );
        assert!(report.does_fail);
        let messages: Vec<_> = report.failures.iter().map(|f| f.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["Feat: Dodge", "Talent: Block", "All of: Feat: Dodge; Talent: Block"]
        );
    }

    #[test]
    fn special_requirements_are_informational() {
        let sheet = StubSheet::default();
        let report = check(
            &sheet,
            &[Prerequisite::Special("GM approval".into())],
        );
        assert!(!report.does_fail);
        assert_eq!(report.failures, vec![Failure::soft("GM approval")]);
    }

    #[test]
    fn droid_special_is_checked() {
        let droid = StubSheet {
            droid: true,
            ..StubSheet::default()
        };
        let organic = StubSheet::default();
        let is_droid = [Prerequisite::Special("Is a Droid".into())];
        assert!(!check(&droid, &is_droid).does_fail);
        assert!(check(&organic, &is_droid).does_fail);
        assert!(!check(&organic, &[Prerequisite::Special("is not a droid".into())]).does_fail);
    }

    #[test]
    fn unsupported_fails_closed() {
        let sheet = StubSheet::default();
        let report = check(&sheet, &[Prerequisite::Unsupported("built a lightsaber".into())]);
        assert!(report.does_fail);
    }

    #[test]
    fn owned_entity_must_meet_its_own_prerequisites() {
        let sheet = StubSheet {
            bab: 0,
            owned: vec![
                feat(1, "Power Attack")
                    .with_prerequisite(Prerequisite::BaseAttackBonus(1)),
            ],
            ..StubSheet::default()
        };
        let report = check(&sheet, &[Prerequisite::Feat("Power Attack".into())]);
        assert!(report.does_fail);
        assert_eq!(
            report.silent_failures,
            vec![Failure::hard("Base Attack Bonus +1")]
        );
    }

    #[test]
    fn prerequisite_cycles_fail_closed() {
        let sheet = StubSheet {
            owned: vec![
                feat(1, "Alpha").with_prerequisite(Prerequisite::Feat("Beta".into())),
                feat(2, "Beta").with_prerequisite(Prerequisite::Feat("Alpha".into())),
            ],
            ..StubSheet::default()
        };
        let report = check(&sheet, &[Prerequisite::Feat("Alpha".into())]);
        assert!(report.does_fail);
        assert!(
            report
                .silent_failures
                .iter()
                .any(|f| f.message.starts_with("circular prerequisite"))
        );
    }
}
