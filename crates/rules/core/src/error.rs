//! Common error infrastructure for rules-core.
//!
//! Resolution itself never fails: missing entities resolve to empty results
//! and unmet or unsupported prerequisites are reported, not raised. Errors
//! exist for validating content before it is handed to the resolver, and for
//! parsing textual configuration such as reduction names.

use crate::model::EntityId;

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Invalid input; reject it and fix the data.
    ///
    /// Examples: unknown reduction name, duplicate entity id
    Validation,

    /// Content that would make resolution misbehave.
    ///
    /// Examples: prerequisite cycle between catalog entries
    Fatal,
}

/// Common trait for all rules-core errors.
pub trait RulesError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Problems found while validating a catalog of entities.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Two entities share an id, which would let them share cache slots.
    #[error("entity id {id} is used by both '{first}' and '{second}'")]
    DuplicateEntityId {
        id: EntityId,
        first: String,
        second: String,
    },

    /// Entries require each other through their prerequisites.
    #[error("prerequisite cycle: {}", .path.join(" -> "))]
    PrerequisiteCycle { path: Vec<String> },
}

impl RulesError for CatalogError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::DuplicateEntityId { .. } => ErrorSeverity::Validation,
            Self::PrerequisiteCycle { .. } => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateEntityId { .. } => "CATALOG_DUPLICATE_ENTITY_ID",
            Self::PrerequisiteCycle { .. } => "CATALOG_PREREQUISITE_CYCLE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_message_lists_path() {
        let error = CatalogError::PrerequisiteCycle {
            path: vec!["A".into(), "B".into(), "A".into()],
        };
        assert_eq!(error.to_string(), "prerequisite cycle: A -> B -> A");
        assert_eq!(error.severity(), ErrorSeverity::Fatal);
        assert_eq!(error.error_code(), "CATALOG_PREREQUISITE_CYCLE");
    }
}
