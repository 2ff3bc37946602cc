//! Geometry primitives: [`Pos`], [`Range`] and [`WorldPos`].
//!
//! Grid space is addressed by `(row, col)`; rows grow downwards and columns
//! grow to the right. World space is continuous pixel space.

use std::fmt;
use std::ops::{Add, Sub};

use crate::dir::Dir;

// ---------------------------------------------------------------------------
// Pos
// ---------------------------------------------------------------------------

/// A grid coordinate. Ordering is row-major.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pos {
    pub row: i32,
    pub col: i32,
}

impl Pos {
    /// Origin (0, 0).
    pub const ZERO: Self = Self { row: 0, col: 0 };

    /// Create a new position.
    #[inline]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Return a position shifted by (drow, dcol).
    #[inline]
    pub const fn shift(self, drow: i32, dcol: i32) -> Self {
        Self {
            row: self.row + drow,
            col: self.col + dcol,
        }
    }

    /// The neighbour one step away in direction `d`.
    #[inline]
    pub const fn step(self, d: Dir) -> Self {
        let (dr, dc) = d.delta();
        self.shift(dr, dc)
    }

    /// The four cardinal neighbours (top, right, bottom, left).
    #[inline]
    pub const fn neighbors_4(self) -> [Pos; 4] {
        [
            self.step(Dir::Top),
            self.step(Dir::Right),
            self.step(Dir::Bottom),
            self.step(Dir::Left),
        ]
    }

    /// Direction of travel from `self` to an orthogonally adjacent `to`.
    ///
    /// Returns `None` when the two positions are not exactly one cardinal
    /// step apart.
    #[inline]
    pub fn dir_to(self, to: Pos) -> Option<Dir> {
        Dir::from_delta(to.row - self.row, to.col - self.col)
    }

    /// Manhattan (L1) distance to `other`.
    #[inline]
    pub const fn manhattan(self, other: Pos) -> i32 {
        (self.row - other.row).abs() + (self.col - other.col).abs()
    }
}

impl PartialOrd for Pos {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pos {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.row.cmp(&other.row).then(self.col.cmp(&other.col))
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl Add for Pos {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.row + rhs.row, self.col + rhs.col)
    }
}

impl Sub for Pos {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.row - rhs.row, self.col - rhs.col)
    }
}

impl From<(i32, i32)> for Pos {
    fn from((row, col): (i32, i32)) -> Self {
        Self::new(row, col)
    }
}

// ---------------------------------------------------------------------------
// Range
// ---------------------------------------------------------------------------

/// A half-open rectangle of grid cells \[min, max).
///
/// All empty ranges are considered equal.
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    pub min: Pos,
    pub max: Pos,
}

impl PartialEq for Range {
    fn eq(&self, other: &Self) -> bool {
        (self.min == other.min && self.max == other.max) || (self.is_empty() && other.is_empty())
    }
}

impl Eq for Range {}

impl Range {
    /// Create a range from two corners, canonicalised so that `min` ≤ `max`
    /// on each axis. `(row1, col1)` is exclusive.
    #[inline]
    pub fn new(row0: i32, col0: i32, row1: i32, col1: i32) -> Self {
        Self {
            min: Pos::new(row0.min(row1), col0.min(col1)),
            max: Pos::new(row0.max(row1), col0.max(col1)),
        }
    }

    /// Create a range from **inclusive** row and column bounds, in either
    /// order. An upper bound of `i32::MAX` saturates.
    #[inline]
    pub fn inclusive(row_start: i32, row_end: i32, col_start: i32, col_end: i32) -> Self {
        Self {
            min: Pos::new(row_start.min(row_end), col_start.min(col_end)),
            max: Pos::new(
                row_start.max(row_end).saturating_add(1),
                col_start.max(col_end).saturating_add(1),
            ),
        }
    }

    /// Number of rows.
    #[inline]
    pub fn height(self) -> i32 {
        self.max.row.saturating_sub(self.min.row)
    }

    /// Number of columns.
    #[inline]
    pub fn width(self) -> i32 {
        self.max.col.saturating_sub(self.min.col)
    }

    /// Total number of cells in the range.
    #[inline]
    pub fn len(self) -> usize {
        if self.is_empty() {
            return 0;
        }
        (self.width() as usize) * (self.height() as usize)
    }

    /// Whether the range has zero or negative area.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.min.row >= self.max.row || self.min.col >= self.max.col
    }

    /// Whether `p` is inside the half-open range.
    #[inline]
    pub fn contains(self, p: Pos) -> bool {
        p.row >= self.min.row && p.row < self.max.row && p.col >= self.min.col && p.col < self.max.col
    }

    /// Whether `self` lies entirely inside `r`. Empty ranges are inside
    /// every range.
    #[inline]
    pub fn in_range(self, r: Range) -> bool {
        if self.is_empty() {
            return true;
        }
        self.intersect(r) == self
    }

    /// Intersection of two ranges. Non-overlapping ranges give the zero range.
    #[inline]
    pub fn intersect(self, other: Range) -> Self {
        let r = Self {
            min: Pos::new(self.min.row.max(other.min.row), self.min.col.max(other.min.col)),
            max: Pos::new(self.max.row.min(other.max.row), self.max.col.min(other.max.col)),
        };
        if r.is_empty() { Self::default() } else { r }
    }

    /// Row-major iterator over every position in the range.
    #[inline]
    pub fn iter(self) -> RangeIter {
        RangeIter {
            range: self,
            cur: self.min,
        }
    }
}

impl IntoIterator for Range {
    type Item = Pos;
    type IntoIter = RangeIter;
    #[inline]
    fn into_iter(self) -> RangeIter {
        self.iter()
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}-{})", self.min, self.max)
    }
}

/// Row-major iterator over the positions in a [`Range`].
#[derive(Clone, Debug)]
pub struct RangeIter {
    range: Range,
    cur: Pos,
}

impl Iterator for RangeIter {
    type Item = Pos;

    #[inline]
    fn next(&mut self) -> Option<Pos> {
        if self.cur.row >= self.range.max.row || self.range.is_empty() {
            return None;
        }
        let p = self.cur;
        self.cur.col += 1;
        if self.cur.col >= self.range.max.col {
            self.cur.col = self.range.min.col;
            self.cur.row += 1;
        }
        Some(p)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.range.is_empty() || self.cur.row >= self.range.max.row {
            return (0, Some(0));
        }
        let w = self.range.width() as usize;
        let remaining_in_row = (self.range.max.col - self.cur.col) as usize;
        let remaining_rows = (self.range.max.row - self.cur.row - 1) as usize;
        let total = remaining_in_row + remaining_rows * w;
        (total, Some(total))
    }
}

impl ExactSizeIterator for RangeIter {}

// ---------------------------------------------------------------------------
// WorldPos
// ---------------------------------------------------------------------------

/// A point in world (pixel) space.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
}

impl WorldPos {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for WorldPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}
