use std::cmp::Ordering;

use tribune_core::{Pos, Range};

// ---------------------------------------------------------------------------
// Internal node for the A* priority-queue search
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub(crate) struct Node {
    pub(crate) g: f32,
    pub(crate) parent: usize,
    pub(crate) generation: u32,
    pub(crate) open: bool,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            g: 0.0,
            parent: usize::MAX,
            generation: 0,
            open: false,
        }
    }
}

/// Reference into the node array, ordered for use in `BinaryHeap`.
///
/// Smallest `f` pops first; ties go to the smaller heuristic (closer to the
/// goal), then to the smaller flat index, so equal-cost searches always
/// expand in the same order.
#[derive(Clone, Copy)]
pub(crate) struct NodeRef {
    pub(crate) idx: usize,
    pub(crate) f: f32,
    pub(crate) h: f32,
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for NodeRef {}

impl Ord for NodeRef {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap (max-heap) pops the best node first.
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.h.total_cmp(&self.h))
            .then_with(|| other.idx.cmp(&self.idx))
    }
}

impl PartialOrd for NodeRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ---------------------------------------------------------------------------
// SearchSpace
// ---------------------------------------------------------------------------

/// Reusable per-grid search state.
///
/// Owns the node array and neighbour buffer so that repeated searches do
/// not allocate after warm-up. Nodes are invalidated lazily by bumping a
/// generation counter instead of being cleared.
pub struct SearchSpace {
    pub(crate) rng: Range,
    pub(crate) width: usize,
    pub(crate) nodes: Vec<Node>,
    pub(crate) generation: u32,
    pub(crate) nbuf: Vec<Pos>,
}

impl SearchSpace {
    /// Create a search space covering `rng`.
    pub fn new(rng: Range) -> Self {
        Self {
            rng,
            width: rng.width().max(0) as usize,
            nodes: vec![Node::default(); rng.len()],
            generation: 0,
            nbuf: Vec::with_capacity(4),
        }
    }

    /// Replace the covered range, reallocating only when it grows.
    pub fn set_range(&mut self, rng: Range) {
        self.rng = rng;
        self.width = rng.width().max(0) as usize;
        if rng.len() > self.nodes.len() {
            self.nodes.clear();
            self.nodes.resize(rng.len(), Node::default());
            self.generation = 0;
        } else {
            self.next_generation();
        }
    }

    /// The grid rectangle being searched.
    #[inline]
    pub fn range(&self) -> Range {
        self.rng
    }

    /// Start a new generation, resetting all stamps on wrap-around so that
    /// a node from 2^32 searches ago can never look current.
    pub(crate) fn next_generation(&mut self) -> u32 {
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            for n in &mut self.nodes {
                n.generation = 0;
            }
            self.generation = 1;
        }
        self.generation
    }

    /// Convert a `Pos` to a flat index. Returns `None` if out of range.
    #[inline]
    pub(crate) fn idx(&self, p: Pos) -> Option<usize> {
        if !self.rng.contains(p) {
            return None;
        }
        let c = (p.col - self.rng.min.col) as usize;
        let r = (p.row - self.rng.min.row) as usize;
        Some(r * self.width + c)
    }

    /// Convert a flat index back to a `Pos`.
    #[inline]
    pub(crate) fn pos(&self, idx: usize) -> Pos {
        let c = (idx % self.width) as i32 + self.rng.min.col;
        let r = (idx / self.width) as i32 + self.rng.min.row;
        Pos::new(r, c)
    }
}
