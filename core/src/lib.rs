//! Loom Core Types
//!
//! This crate provides the foundational types used throughout the Loom system:
//! - Identity types (NodeId, GraphId)
//! - The programming-error taxonomy (LoomError)
//! - JSON path helpers used to address diagnostics

mod error;
mod id;
pub mod jsonpath;

pub use error::*;
pub use id::*;
