//! Attribute changes: the atomic key/value contributions entities declare.
//!
//! Data files declare [`DeclaredChange`]s. The extractor turns them into
//! [`AttributeChange`]s by stamping the source metadata every downstream
//! consumer relies on (explanations, self-exclusion filters, owner lookup).

use std::fmt;

use super::common::EntityId;
use crate::prerequisite::Prerequisite;

/// Raw value carried by a change.
///
/// Values are primitives or flat lists of primitives. Numeric coercion
/// follows tabletop conventions: `"+2"` reads as `2`, booleans as `0`/`1`,
/// anything else unparsable as `0`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Text(String),
    List(Vec<AttributeValue>),
}

impl AttributeValue {
    /// Numeric reading of the value. Lists sum their elements.
    pub fn as_number(&self) -> i64 {
        match self {
            Self::Bool(flag) => i64::from(*flag),
            Self::Int(value) => *value,
            Self::Text(text) => parse_signed(text).unwrap_or(0),
            Self::List(values) => values
                .iter()
                .map(Self::as_number)
                .fold(0, i64::saturating_add),
        }
    }

    /// Boolean reading of the value.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(flag) => *flag,
            Self::Int(value) => *value != 0,
            Self::Text(text) => {
                let text = text.trim();
                !text.is_empty() && !text.eq_ignore_ascii_case("false") && text != "0"
            }
            Self::List(values) => !values.is_empty(),
        }
    }

    /// Flattens nested lists into their primitive elements, in order.
    pub fn flatten(&self) -> Vec<AttributeValue> {
        match self {
            Self::List(values) => values.iter().flat_map(Self::flatten).collect(),
            other => vec![other.clone()],
        }
    }
}

fn parse_signed(text: &str) -> Option<i64> {
    let text = text.trim();
    let text = text.strip_prefix('+').unwrap_or(text);
    text.parse().ok()
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(flag) => write!(f, "{flag}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
            Self::List(values) => {
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<AttributeValue>> From<Vec<T>> for AttributeValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// A change as authored on an entity, before extraction.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeclaredChange {
    pub key: String,
    pub value: AttributeValue,
    /// Overrides discard every non-override change sharing the key.
    #[cfg_attr(feature = "serde", serde(default, rename = "override"))]
    pub is_override: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub modifier: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub prerequisite: Option<Prerequisite>,
}

impl DeclaredChange {
    pub fn new(key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            is_override: false,
            modifier: None,
            prerequisite: None,
        }
    }

    /// Marks the change as an override (builder pattern).
    #[must_use]
    pub fn overriding(mut self) -> Self {
        self.is_override = true;
        self
    }

    /// Gates the change behind a prerequisite (builder pattern).
    #[must_use]
    pub fn with_prerequisite(mut self, prerequisite: Prerequisite) -> Self {
        self.prerequisite = Some(prerequisite);
        self
    }

    /// Attaches a modifier tag such as a damage type (builder pattern).
    #[must_use]
    pub fn with_modifier(mut self, modifier: impl Into<String>) -> Self {
        self.modifier = Some(modifier.into());
        self
    }
}

/// Where an extracted change came from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChangeSource {
    /// Entity that declared the change (the item for effect changes).
    pub id: EntityId,
    pub name: String,
    /// Extra detail, e.g. the effect name or `Level 3`.
    pub description: Option<String>,
}

impl fmt::Display for ChangeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(description) => write!(f, "{} ({})", self.name, description),
            None => f.write_str(&self.name),
        }
    }
}

/// An extracted change, stamped with its origin.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeChange {
    pub key: String,
    pub value: AttributeValue,
    pub is_override: bool,
    pub modifier: Option<String>,
    pub prerequisite: Option<Prerequisite>,
    /// Prerequisite of the declaring entity itself.
    pub parent_prerequisite: Option<Prerequisite>,
    pub source: ChangeSource,
    /// Entity the change was gathered on behalf of, when gathered as a child.
    pub owner: Option<EntityId>,
}

impl AttributeChange {
    /// Stamps a declared change with source metadata.
    pub fn from_declared(
        declared: &DeclaredChange,
        source: ChangeSource,
        parent_prerequisite: Option<&Prerequisite>,
    ) -> Self {
        Self {
            key: declared.key.clone(),
            value: declared.value.clone(),
            is_override: declared.is_override,
            modifier: declared.modifier.clone(),
            prerequisite: declared.prerequisite.clone(),
            parent_prerequisite: parent_prerequisite.cloned(),
            source,
            owner: None,
        }
    }

    /// Id of the entity the change's gates are checked against when no
    /// explicit parent is known.
    pub fn owning_id(&self) -> EntityId {
        self.owner.unwrap_or(self.source.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_coercion() {
        assert_eq!(AttributeValue::from("+2").as_number(), 2);
        assert_eq!(AttributeValue::from(" -3 ").as_number(), -3);
        assert_eq!(AttributeValue::from("Dexterity").as_number(), 0);
        assert_eq!(AttributeValue::from(true).as_number(), 1);
        assert_eq!(AttributeValue::from(vec![1, 2, 3]).as_number(), 6);
        assert_eq!(
            AttributeValue::from(vec![i64::MIN, -1]).as_number(),
            i64::MIN
        );
    }

    #[test]
    fn truthiness() {
        assert!(AttributeValue::from("yes").is_truthy());
        assert!(!AttributeValue::from("false").is_truthy());
        assert!(!AttributeValue::from("0").is_truthy());
        assert!(!AttributeValue::from(0).is_truthy());
        assert!(!AttributeValue::List(Vec::new()).is_truthy());
    }

    #[test]
    fn flatten_preserves_order() {
        let value = AttributeValue::List(vec![
            AttributeValue::from("a"),
            AttributeValue::from(vec!["b", "c"]),
        ]);
        assert_eq!(
            value.flatten(),
            vec![
                AttributeValue::from("a"),
                AttributeValue::from("b"),
                AttributeValue::from("c")
            ]
        );
        assert_eq!(value.to_string(), "a, b, c");
    }

    #[test]
    fn source_display_includes_description() {
        let source = ChangeSource {
            id: EntityId(3),
            name: "Soldier".into(),
            description: Some("Level 2".into()),
        };
        assert_eq!(source.to_string(), "Soldier (Level 2)");
    }
}
