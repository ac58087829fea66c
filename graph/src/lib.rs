//! Loom Graph Model
//!
//! This crate provides the node arena that validation runs over:
//! - Nodes: identified, typed entities with a kind-specific body
//! - Graph: owns nodes by id, enforces single-graph membership
//! - Type index: enumerate nodes by type in insertion order
//! - Wire format: the `{"nodes": [...]}` JSON document
//! - Traversal: the tensor/operation link graph and its simple cycles

mod body;
mod graph;
mod index;
mod node;
pub mod traversal;
mod wire;

pub use body::*;
pub use graph::*;
pub use node::*;
