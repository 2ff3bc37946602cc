use std::collections::BinaryHeap;

use tribune_core::Pos;

use crate::search::{NodeRef, SearchSpace};
use crate::traits::AstarPather;

/// Raw outcome of one A* run over a [`SearchSpace`].
#[derive(Clone, Debug, PartialEq)]
pub enum SearchResult {
    /// Full path including both endpoints, and its total cost.
    Found {
        path: Vec<Pos>,
        cost: f32,
        expanded: usize,
    },
    /// The open set ran dry before reaching the goal.
    Unreachable { expanded: usize },
    /// The expansion cap was hit before the search settled.
    Exhausted { expanded: usize },
    /// An endpoint lies outside the search range.
    OutOfRange,
}

impl SearchSpace {
    /// Compute a minimum-cost path from `from` to `to` using A*.
    ///
    /// At most `max_expansions` nodes are expanded; the goal being popped
    /// from the open set does not count as an expansion.
    pub fn astar_path<P: AstarPather>(
        &mut self,
        pather: &P,
        from: Pos,
        to: Pos,
        max_expansions: usize,
    ) -> SearchResult {
        let (Some(start_idx), Some(goal_idx)) = (self.idx(from), self.idx(to)) else {
            return SearchResult::OutOfRange;
        };

        if start_idx == goal_idx {
            return SearchResult::Found {
                path: vec![from],
                cost: 0.0,
                expanded: 0,
            };
        }

        let cur_gen = self.next_generation();

        {
            let node = &mut self.nodes[start_idx];
            node.g = 0.0;
            node.parent = usize::MAX;
            node.generation = cur_gen;
            node.open = true;
        }

        let h0 = pather.estimate(from, to);
        let mut open: BinaryHeap<NodeRef> = BinaryHeap::new();
        open.push(NodeRef {
            idx: start_idx,
            f: h0,
            h: h0,
        });

        let mut nbuf = std::mem::take(&mut self.nbuf);
        let mut expanded = 0usize;

        let found = 'search: loop {
            let Some(current) = open.pop() else {
                break 'search Some(false);
            };

            let ci = current.idx;

            // Skip stale entries.
            if self.nodes[ci].generation != cur_gen || !self.nodes[ci].open {
                continue;
            }

            if ci == goal_idx {
                break 'search Some(true);
            }

            if expanded >= max_expansions {
                break 'search None;
            }
            expanded += 1;

            self.nodes[ci].open = false;
            let current_g = self.nodes[ci].g;
            let current_pos = self.pos(ci);

            nbuf.clear();
            pather.neighbors(current_pos, &mut nbuf);

            for &np in nbuf.iter() {
                let Some(ni) = self.idx(np) else {
                    continue;
                };
                let tentative_g = current_g + pather.cost(current_pos, np);

                let n = &mut self.nodes[ni];
                if n.generation == cur_gen {
                    // Already reached this generation; closed nodes are
                    // reopened only by a strictly cheaper route.
                    if tentative_g >= n.g {
                        continue;
                    }
                } else {
                    n.generation = cur_gen;
                }

                n.g = tentative_g;
                n.parent = ci;
                n.open = true;

                let h = pather.estimate(np, to);
                open.push(NodeRef {
                    idx: ni,
                    f: tentative_g + h,
                    h,
                });
            }
        };

        self.nbuf = nbuf;

        match found {
            Some(true) => {}
            Some(false) => return SearchResult::Unreachable { expanded },
            None => return SearchResult::Exhausted { expanded },
        }

        // Reconstruct path.
        let mut path = Vec::new();
        let mut ci = goal_idx;
        while ci != usize::MAX {
            path.push(self.pos(ci));
            ci = self.nodes[ci].parent;
        }
        path.reverse();
        SearchResult::Found {
            path,
            cost: self.nodes[goal_idx].g,
            expanded,
        }
    }
}
