//! Discrete coordinate space types.
//!
//! Tensor bodies and tensor selections describe regions of an integer lattice:
//! - `ZPoint`: a coordinate with one entry per dimension
//! - `ZRange`: a half-open box `[start, end)` between two points

mod error;
mod point;
mod range;

pub use error::*;
pub use point::*;
pub use range::*;
