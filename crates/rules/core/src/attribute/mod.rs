//! Attribute resolution
//!
//! ```text
//! [ extract ]  one entity's local changes (+ enabled effects, class levels)
//!      ↓
//! [ walk ]     children in order, each resolved as its own query
//!      ↓
//! [ filter ]   attribute keys, attribute filter, prerequisite gates
//!      ↓
//! [ collapse ] overrides win per key
//!      ↓
//! [ reduce ]   SUM / MAX / VALUES / ...
//! ```
//!
//! Extraction and gathering are pure; the optional [`crate::ResolutionCache`]
//! memoizes them without touching the later stages.

mod aggregate;
mod extract;
mod query;
mod reduce;

pub use aggregate::Resolver;
pub use extract::local_changes;
pub use query::{AttributeFilter, AttributeQuery, Predicate};
pub use reduce::{ParseReduceError, Reduce, Resolved, reduce};
