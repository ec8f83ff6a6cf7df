//! Reduction strategies collapsing a change list into one value.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{ErrorSeverity, RulesError};
use crate::model::{AttributeChange, AttributeValue};

/// How a filtered list of changes collapses into a final value.
///
/// Textual names are `SUM`, `MAX`, `MIN`, `FIRST`, `OR`, `AND`, `VALUES`,
/// `UNIQUE`, `SUMMARY` and `MAPPED:<inner>` (bare `MAPPED` groups values).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Reduce {
    /// Numeric total; text that does not parse counts as 0, `true` as 1.
    Sum,
    Max,
    Min,
    /// Value of the first change, in discovery order.
    First,
    /// Any value truthy.
    Or,
    /// Every value truthy; false when there are none.
    And,
    /// All values in discovery order, lists flattened.
    Values,
    /// Like `Values` with repeats removed, first occurrence kept.
    Unique,
    /// `source: value` pairs joined for display.
    Summary,
    /// Groups changes by key and reduces every group with the inner strategy.
    Mapped(Box<Reduce>),
}

impl fmt::Display for Reduce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sum => f.write_str("SUM"),
            Self::Max => f.write_str("MAX"),
            Self::Min => f.write_str("MIN"),
            Self::First => f.write_str("FIRST"),
            Self::Or => f.write_str("OR"),
            Self::And => f.write_str("AND"),
            Self::Values => f.write_str("VALUES"),
            Self::Unique => f.write_str("UNIQUE"),
            Self::Summary => f.write_str("SUMMARY"),
            Self::Mapped(inner) => write!(f, "MAPPED:{inner}"),
        }
    }
}

/// Unknown reduction name.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown reduction strategy '{0}'")]
pub struct ParseReduceError(pub String);

impl RulesError for ParseReduceError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        "REDUCE_UNKNOWN_STRATEGY"
    }
}

impl FromStr for Reduce {
    type Err = ParseReduceError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        if let Some((head, inner)) = text.split_once(':') {
            if head.trim().eq_ignore_ascii_case("MAPPED") {
                return Ok(Self::Mapped(Box::new(inner.parse()?)));
            }
            return Err(ParseReduceError(text.to_owned()));
        }
        match text.to_ascii_uppercase().as_str() {
            "SUM" => Ok(Self::Sum),
            "MAX" => Ok(Self::Max),
            "MIN" => Ok(Self::Min),
            "FIRST" => Ok(Self::First),
            "OR" => Ok(Self::Or),
            "AND" => Ok(Self::And),
            "VALUES" => Ok(Self::Values),
            "UNIQUE" => Ok(Self::Unique),
            "SUMMARY" => Ok(Self::Summary),
            "MAPPED" => Ok(Self::Mapped(Box::new(Self::Values))),
            _ => Err(ParseReduceError(text.to_owned())),
        }
    }
}

/// Outcome of a resolution.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Resolved {
    /// No reduction requested.
    Changes(Vec<AttributeChange>),
    Number(i64),
    Flag(bool),
    Value(Option<AttributeValue>),
    Values(Vec<AttributeValue>),
    Summary(String),
    Mapped(BTreeMap<String, Resolved>),
}

impl Resolved {
    /// Numeric reading; non-numeric results coerce like change values do.
    pub fn as_number(&self) -> i64 {
        match self {
            Self::Number(value) => *value,
            Self::Flag(flag) => i64::from(*flag),
            Self::Value(value) => value.as_ref().map_or(0, AttributeValue::as_number),
            Self::Values(values) => values
                .iter()
                .map(AttributeValue::as_number)
                .fold(0, i64::saturating_add),
            Self::Changes(changes) => changes
                .iter()
                .map(|c| c.value.as_number())
                .fold(0, i64::saturating_add),
            Self::Summary(_) | Self::Mapped(_) => 0,
        }
    }

    pub fn as_bool(&self) -> bool {
        match self {
            Self::Flag(flag) => *flag,
            Self::Number(value) => *value != 0,
            Self::Value(value) => value.as_ref().is_some_and(AttributeValue::is_truthy),
            Self::Values(values) => values.iter().any(AttributeValue::is_truthy),
            Self::Changes(changes) => changes.iter().any(|c| c.value.is_truthy()),
            Self::Summary(text) => !text.is_empty(),
            Self::Mapped(groups) => !groups.is_empty(),
        }
    }

    /// Flat value list of any result shape.
    pub fn into_values(self) -> Vec<AttributeValue> {
        match self {
            Self::Values(values) => values,
            Self::Value(value) => value.into_iter().collect(),
            Self::Changes(changes) => changes.iter().flat_map(|c| c.value.flatten()).collect(),
            Self::Number(value) => vec![AttributeValue::Int(value)],
            Self::Flag(flag) => vec![AttributeValue::Bool(flag)],
            Self::Summary(text) => vec![AttributeValue::Text(text)],
            Self::Mapped(groups) => groups.into_values().flat_map(Self::into_values).collect(),
        }
    }
}

fn flattened(changes: &[AttributeChange]) -> impl Iterator<Item = AttributeValue> + '_ {
    changes.iter().flat_map(|change| change.value.flatten())
}

/// Applies `strategy` to `changes`; `None` returns the changes unchanged.
pub fn reduce(changes: Vec<AttributeChange>, strategy: Option<&Reduce>) -> Resolved {
    let Some(strategy) = strategy else {
        return Resolved::Changes(changes);
    };

    match strategy {
        Reduce::Sum => Resolved::Number(
            flattened(&changes)
                .map(|v| v.as_number())
                .fold(0, i64::saturating_add),
        ),
        Reduce::Max => Resolved::Number(
            flattened(&changes)
                .map(|v| v.as_number())
                .max()
                .unwrap_or(0),
        ),
        Reduce::Min => Resolved::Number(
            flattened(&changes)
                .map(|v| v.as_number())
                .min()
                .unwrap_or(0),
        ),
        Reduce::First => Resolved::Value(changes.into_iter().next().map(|change| change.value)),
        Reduce::Or => Resolved::Flag(flattened(&changes).any(|v| v.is_truthy())),
        Reduce::And => {
            let mut values = flattened(&changes).peekable();
            Resolved::Flag(values.peek().is_some() && values.all(|v| v.is_truthy()))
        }
        Reduce::Values => Resolved::Values(flattened(&changes).collect()),
        Reduce::Unique => {
            let mut unique: Vec<AttributeValue> = Vec::new();
            for value in flattened(&changes) {
                if !unique.contains(&value) {
                    unique.push(value);
                }
            }
            Resolved::Values(unique)
        }
        Reduce::Summary => Resolved::Summary(
            changes
                .iter()
                .map(|change| format!("{}: {}", change.source, change.value))
                .collect::<Vec<_>>()
                .join(", "),
        ),
        Reduce::Mapped(inner) => {
            let mut groups: BTreeMap<String, Vec<AttributeChange>> = BTreeMap::new();
            for change in changes {
                groups.entry(change.key.clone()).or_default().push(change);
            }
            Resolved::Mapped(
                groups
                    .into_iter()
                    .map(|(key, group)| (key, reduce(group, Some(inner))))
                    .collect(),
            )
        }
    }
}
