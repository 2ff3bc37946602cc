//! Memoised passability lookups.
//!
//! Both tables are pure functions of grid state, keyed by flat cell index
//! (`row * cols + col`). They only make lookups faster: a cleared cache
//! answers every query the same way a warm one does.

use std::collections::HashMap;

use tribune_core::Pos;
use tribune_grid::GridModel;

/// Hit/miss counters of a [`PassCache`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries currently held by both tables.
    pub entries: usize,
    /// Number of times the cache was emptied.
    pub clears: u64,
}

#[derive(Debug, Default)]
pub(crate) struct PassCache {
    passable: HashMap<usize, bool>,
    directional: HashMap<(usize, usize), bool>,
    hits: u64,
    misses: u64,
    clears: u64,
}

impl PassCache {
    /// Plain passability of `p`; `false` out of bounds (never cached).
    pub(crate) fn passable(&mut self, grid: &GridModel, p: Pos) -> bool {
        let Some(i) = grid.index(p) else {
            return false;
        };
        if let Some(&v) = self.passable.get(&i) {
            self.hits += 1;
            return v;
        }
        self.misses += 1;
        let v = grid.is_passable(p.row, p.col);
        self.passable.insert(i, v);
        v
    }

    /// Whether the single step `from → to` is legal.
    pub(crate) fn passable_direction(&mut self, grid: &GridModel, from: Pos, to: Pos) -> bool {
        let (Some(fi), Some(ti)) = (grid.index(from), grid.index(to)) else {
            return false;
        };
        if let Some(&v) = self.directional.get(&(fi, ti)) {
            self.hits += 1;
            return v;
        }
        self.misses += 1;
        let v = grid.is_passable_direction(from.row, from.col, to.row, to.col);
        self.directional.insert((fi, ti), v);
        v
    }

    pub(crate) fn clear(&mut self) {
        self.passable.clear();
        self.directional.clear();
        self.clears += 1;
    }

    pub(crate) fn len(&self) -> usize {
        self.passable.len() + self.directional.len()
    }

    pub(crate) fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.len(),
            clears: self.clears,
        }
    }
}
