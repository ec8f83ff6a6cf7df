//! Command implementations for xtask
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod check;
mod resolve;
mod validate;

pub use check::Check;
pub use resolve::Resolve;
pub use validate::Validate;
