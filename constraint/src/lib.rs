//! Loom Constraints
//!
//! Built-in whole-graph rules and the environment they are usually run in.
//!
//! Responsibilities:
//! - Restrict which node and annotation types may appear
//! - Apply extra body schemas to selected node types
//! - Reject feedback loops between tensors and operations
//! - Check tensor dtypes, tensor sources, and application selections
//! - Check that operations agree with their tensors and application shards
//! - Assemble the tensor-ops dialect environment, optionally from YAML

mod agreement;
mod config;
mod coverage;
mod cycles;
mod dialect;
mod dtypes;
mod operations;
mod schema;
mod selections;
mod sources;
mod support;
mod tensor;
mod types;

pub use agreement::*;
pub use config::*;
pub use coverage::*;
pub use cycles::*;
pub use dialect::*;
pub use dtypes::*;
pub use operations::*;
pub use schema::*;
pub use selections::*;
pub use sources::*;
pub use tensor::*;
pub use types::*;
