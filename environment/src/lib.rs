//! Loom Environment
//!
//! The registry a graph is validated against:
//! - Type bindings: per node type, a field schema and an optional custom check
//! - Annotation schemas keyed by annotation name
//! - Whole-graph constraints, run in registration order
//! - Display aliases for types
//!
//! An environment is built once with [`EnvironmentBuilder`] and is read-only
//! afterwards. [`LoomEnvironment::validate`] runs the per-node checks and then
//! every constraint, collecting all issues into one report.

mod builder;
mod constraint;
mod environment;
mod schema;

pub use builder::*;
pub use constraint::*;
pub use environment::*;
pub use schema::*;
