use tribune_core::Pos;

/// A directed graph over grid cells.
///
/// Edges are one-way: `b` appearing among the neighbours of `a` says nothing
/// about `a` being reachable from `b`.
pub trait Pather {
    /// Push every cell one legal step away from `p` onto `buf`, which arrives
    /// empty.
    fn neighbors(&self, p: Pos, buf: &mut Vec<Pos>);
}

/// A [`Pather`] whose edges carry a strictly positive cost.
pub trait WeightedPather: Pather {
    fn cost(&self, from: Pos, to: Pos) -> f32;
}

/// A [`WeightedPather`] that can guess the remaining cost to a target.
pub trait AstarPather: WeightedPather {
    /// Lower bound on the cost of reaching `to` from `from`, give or take a
    /// tie-break bias smaller than any difference between two route costs.
    /// A larger overshoot lets the search settle on a dearer route.
    fn estimate(&self, from: Pos, to: Pos) -> f32;
}
