use crate::{ZPoint, ZSpaceError, ZSpaceResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A half-open box `[start, end)` in a discrete coordinate space.
///
/// Wire form is `{"start": [...], "end": [...]}`. Construction guarantees
/// `start.ndim() == end.ndim()` and `start <= end` component-wise, and that
/// every extent and the total size fit in an `i64`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRange")]
pub struct ZRange {
    start: ZPoint,
    end: ZPoint,
}

#[derive(Deserialize)]
struct RawRange {
    start: ZPoint,
    end: ZPoint,
}

impl TryFrom<RawRange> for ZRange {
    type Error = ZSpaceError;

    fn try_from(raw: RawRange) -> Result<Self, Self::Error> {
        ZRange::new(raw.start, raw.end)
    }
}

impl ZRange {
    /// Construct `[start, end)`.
    pub fn new(start: ZPoint, end: ZPoint) -> ZSpaceResult<Self> {
        start.assert_same_ndim(&end)?;
        if !start.le(&end) {
            return Err(ZSpaceError::StartAfterEnd {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        let overflow = || ZSpaceError::Overflow(format!("{start}..{end}"));
        let mut size: i64 = 1;
        for (&s, &e) in start.coords().iter().zip(end.coords()) {
            let extent = e.checked_sub(s).ok_or_else(overflow)?;
            size = size.checked_mul(extent).ok_or_else(overflow)?;
        }
        Ok(Self { start, end })
    }

    /// The range `[0, shape)`.
    pub fn from_shape(shape: ZPoint) -> ZSpaceResult<Self> {
        Self::new(ZPoint::zeros(shape.ndim()), shape)
    }

    /// The range `[start, start + shape)`.
    pub fn from_start_with_shape(start: ZPoint, shape: ZPoint) -> ZSpaceResult<Self> {
        let end = start.checked_add(&shape)?;
        Self::new(start, end)
    }

    /// Minimum range covering every range in `ranges`.
    ///
    /// Returns `None` for an empty input.
    pub fn bounding_range<'a>(
        ranges: impl IntoIterator<Item = &'a ZRange>,
    ) -> ZSpaceResult<Option<ZRange>> {
        let mut acc: Option<ZRange> = None;
        for r in ranges {
            acc = Some(match acc {
                None => r.clone(),
                Some(cur) => {
                    cur.start.assert_same_ndim(&r.start)?;
                    ZRange::new(
                        cur.start.zip_with(&r.start, i64::min),
                        cur.end.zip_with(&r.end, i64::max),
                    )?
                }
            });
        }
        Ok(acc)
    }

    pub fn start(&self) -> &ZPoint {
        &self.start
    }

    pub fn end(&self) -> &ZPoint {
        &self.end
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        self.start.ndim()
    }

    /// Extent along every dimension. Cannot overflow; `new` checks it.
    pub fn shape(&self) -> ZPoint {
        self.end.zip_with(&self.start, |e, s| e - s)
    }

    /// Number of lattice points in the range.
    pub fn size(&self) -> i64 {
        self.shape().coords().iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Does this range entirely contain `other`?
    ///
    /// All 0-dim ranges contain each other.
    pub fn contains(&self, other: &ZRange) -> bool {
        if self.ndim() != other.ndim() {
            return false;
        }
        self.ndim() == 0 || (self.start.le(&other.start) && other.end.le(&self.end))
    }

    /// Does this range contain the point `p`?
    pub fn contains_point(&self, p: &ZPoint) -> bool {
        if self.is_empty() || self.ndim() != p.ndim() {
            return false;
        }
        self.ndim() == 0 || (self.start.le(p) && p.lt(&self.end))
    }

    /// Shift the range by `delta`.
    pub fn translate(&self, delta: &ZPoint) -> ZSpaceResult<ZRange> {
        ZRange::new(self.start.checked_add(delta)?, self.end.checked_add(delta)?)
    }

    /// Intersection with `other`, or `None` if they are disjoint.
    pub fn intersection(&self, other: &ZRange) -> Option<ZRange> {
        if self.ndim() != other.ndim() {
            return None;
        }
        let start = self.start.zip_with(&other.start, i64::max);
        let end = self.end.zip_with(&other.end, i64::min);
        ZRange::new(start, end).ok()
    }
}

impl fmt::Display for ZRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zr[")?;
        for i in 0..self.ndim() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}:{}", self.start.coords()[i], self.end.coords()[i])?;
        }
        write!(f, "]")
    }
}

impl FromStr for ZRange {
    type Err = ZSpaceError;

    /// Parse the `zr[0:2, 1:3]` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_err = || ZSpaceError::Parse(s.to_string());

        let inner = s
            .strip_prefix("zr[")
            .and_then(|t| t.strip_suffix(']'))
            .ok_or_else(parse_err)?
            .trim();
        if inner.is_empty() {
            return ZRange::new(ZPoint::default(), ZPoint::default());
        }

        let mut start = Vec::new();
        let mut end = Vec::new();
        for part in inner.split(',') {
            let (a, b) = part.split_once(':').ok_or_else(parse_err)?;
            start.push(a.trim().parse().map_err(|_| parse_err())?);
            end.push(b.trim().parse().map_err(|_| parse_err())?);
        }
        ZRange::new(ZPoint::new(start), ZPoint::new(end))
    }
}
