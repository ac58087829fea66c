use crate::{ZSpaceError, ZSpaceResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in a discrete coordinate space.
///
/// Serialized as a plain integer array.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZPoint(Vec<i64>);

impl ZPoint {
    /// Create a point from its coordinates.
    pub fn new(coords: impl Into<Vec<i64>>) -> Self {
        Self(coords.into())
    }

    /// The origin of an `ndim`-dimensional space.
    pub fn zeros(ndim: usize) -> Self {
        Self(vec![0; ndim])
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        self.0.len()
    }

    pub fn coords(&self) -> &[i64] {
        &self.0
    }

    /// True if every coordinate is > 0 and there is at least one dimension.
    pub fn is_strictly_positive(&self) -> bool {
        !self.0.is_empty() && self.0.iter().all(|&c| c > 0)
    }

    /// Fail unless `other` has the same number of dimensions.
    pub fn assert_same_ndim(&self, other: &ZPoint) -> ZSpaceResult<()> {
        if self.ndim() != other.ndim() {
            return Err(ZSpaceError::DimensionMismatch {
                left: self.ndim(),
                right: other.ndim(),
            });
        }
        Ok(())
    }

    /// Component-wise `self <= other`.
    pub fn le(&self, other: &ZPoint) -> bool {
        self.ndim() == other.ndim() && self.0.iter().zip(&other.0).all(|(a, b)| a <= b)
    }

    /// Component-wise `self < other`.
    pub fn lt(&self, other: &ZPoint) -> bool {
        self.ndim() == other.ndim() && self.0.iter().zip(&other.0).all(|(a, b)| a < b)
    }

    pub(crate) fn zip_with(&self, other: &ZPoint, f: impl Fn(i64, i64) -> i64) -> ZPoint {
        ZPoint(self.0.iter().zip(&other.0).map(|(&a, &b)| f(a, b)).collect())
    }

    /// Component-wise `self + other`, failing if any coordinate leaves `i64`.
    pub fn checked_add(&self, other: &ZPoint) -> ZSpaceResult<ZPoint> {
        self.assert_same_ndim(other)?;
        self.0
            .iter()
            .zip(&other.0)
            .map(|(&a, &b)| {
                a.checked_add(b)
                    .ok_or_else(|| ZSpaceError::Overflow(format!("{self} + {other}")))
            })
            .collect::<ZSpaceResult<Vec<_>>>()
            .map(ZPoint)
    }
}

impl From<Vec<i64>> for ZPoint {
    fn from(coords: Vec<i64>) -> Self {
        Self(coords)
    }
}

impl<const N: usize> From<[i64; N]> for ZPoint {
    fn from(coords: [i64; N]) -> Self {
        Self(coords.to_vec())
    }
}

impl fmt::Display for ZPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{c}")?;
        }
        write!(f, "]")
    }
}
