//! Precomputed `TransitionType → positions` lookup.

use std::collections::HashMap;

use tribune_core::Pos;

use crate::cell::Cell;
use crate::zone::TransitionType;

/// Positions of every cell carrying a transition marker, grouped by type.
///
/// Each list is in row-major order and holds each position once.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BoundaryIndex {
    by_type: HashMap<TransitionType, Vec<Pos>>,
}

impl BoundaryIndex {
    /// Build the index from a row-major cell slice.
    pub(crate) fn build(cells: &[Cell]) -> Self {
        let mut by_type: HashMap<TransitionType, Vec<Pos>> = HashMap::new();
        for cell in cells {
            if let Some(t) = cell.transition_type {
                by_type.entry(t).or_default().push(cell.pos);
            }
        }
        Self { by_type }
    }

    /// Positions marked with `t`. Empty if none.
    #[inline]
    pub fn get(&self, t: TransitionType) -> &[Pos] {
        self.by_type.get(&t).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of indexed cells across all types.
    pub fn len(&self) -> usize {
        self.by_type.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keep the index in step with a single-cell marker change.
    pub(crate) fn update(&mut self, pos: Pos, old: Option<TransitionType>, new: Option<TransitionType>) {
        if old == new {
            return;
        }
        if let Some(t) = old {
            if let Some(list) = self.by_type.get_mut(&t) {
                list.retain(|&p| p != pos);
            }
        }
        if let Some(t) = new {
            let list = self.by_type.entry(t).or_default();
            let at = list.partition_point(|&p| p < pos);
            list.insert(at, pos);
        }
    }
}
