//! Cardinal directions: [`Dir`] and the packed [`DirMask`].

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

// ---------------------------------------------------------------------------
// Dir
// ---------------------------------------------------------------------------

/// One of the four cardinal directions, in grid space.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum Dir {
    Top,
    Right,
    Bottom,
    Left,
}

impl Dir {
    /// All directions in neighbour-enumeration order.
    pub const ALL: [Dir; 4] = [Dir::Top, Dir::Right, Dir::Bottom, Dir::Left];

    /// `(drow, dcol)` of one step in this direction.
    #[inline]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Dir::Top => (-1, 0),
            Dir::Right => (0, 1),
            Dir::Bottom => (1, 0),
            Dir::Left => (0, -1),
        }
    }

    /// The direction pointing the other way.
    #[inline]
    pub const fn opposite(self) -> Dir {
        match self {
            Dir::Top => Dir::Bottom,
            Dir::Right => Dir::Left,
            Dir::Bottom => Dir::Top,
            Dir::Left => Dir::Right,
        }
    }

    /// Inverse of [`delta`](Self::delta). `None` for anything other than a
    /// single cardinal step.
    #[inline]
    pub const fn from_delta(drow: i32, dcol: i32) -> Option<Dir> {
        match (drow, dcol) {
            (-1, 0) => Some(Dir::Top),
            (0, 1) => Some(Dir::Right),
            (1, 0) => Some(Dir::Bottom),
            (0, -1) => Some(Dir::Left),
            _ => None,
        }
    }

    /// The single-bit mask for this direction.
    #[inline]
    pub const fn mask(self) -> DirMask {
        match self {
            Dir::Top => DirMask::TOP,
            Dir::Right => DirMask::RIGHT,
            Dir::Bottom => DirMask::BOTTOM,
            Dir::Left => DirMask::LEFT,
        }
    }
}

impl fmt::Display for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Dir::Top => "top",
            Dir::Right => "right",
            Dir::Bottom => "bottom",
            Dir::Left => "left",
        })
    }
}

// ---------------------------------------------------------------------------
// DirMask
// ---------------------------------------------------------------------------

/// Bitmask of open directions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirMask(pub u8);

impl DirMask {
    pub const NONE: Self = Self(0);
    pub const TOP: Self = Self(1 << 0);
    pub const RIGHT: Self = Self(1 << 1);
    pub const BOTTOM: Self = Self(1 << 2);
    pub const LEFT: Self = Self(1 << 3);
    pub const ALL: Self = Self(0b1111);

    /// Whether this mask contains all the bits from `other`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Whether direction `d` is open.
    #[inline]
    pub const fn allows(self, d: Dir) -> bool {
        self.contains(d.mask())
    }

    /// Return the mask with `d` opened or closed.
    #[inline]
    pub const fn with(self, d: Dir, open: bool) -> Self {
        if open {
            Self(self.0 | d.mask().0)
        } else {
            Self(self.0 & !d.mask().0 & Self::ALL.0)
        }
    }

    /// Whether no direction is open.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 & Self::ALL.0 == 0
    }
}

impl Default for DirMask {
    /// All directions open.
    fn default() -> Self {
        Self::ALL
    }
}

impl BitOr for DirMask {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for DirMask {
    type Output = Self;
    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl Not for DirMask {
    type Output = Self;
    #[inline]
    fn not(self) -> Self {
        Self(!self.0 & Self::ALL.0)
    }
}
