//! Zone-aware pathfinding over a [`tribune_grid::GridModel`].
//!
//! The entry point is [`Pathfinder`], which answers world-space route
//! queries with a fully materialised list of [`PathCell`]s. Moves are
//! strictly four-directional and must satisfy the grid's directional
//! passability rule for every ordered pair of cells, so the search graph is
//! directed. Step costs scale with the destination zone (see
//! [`ZoneCosts`]).
//!
//! An empty path is the only "could not route" signal. Whether the endpoint
//! was off the grid, the goal unreachable, or the iteration cap exhausted is
//! reported separately through [`PathEvent::PathCalculated`] and the `log`
//! facade.
//!
//! # Layers
//!
//! | Item | Role |
//! |---|---|
//! | [`Pather`] / [`WeightedPather`] / [`AstarPather`] | graph interface |
//! | [`SearchSpace`] | reusable node arrays, generic A* |
//! | [`Pathfinder`] | grid binding, caches, costs, events |

mod astar;
mod cache;
mod cost;
mod pathfinder;
mod search;
mod traits;

pub use astar::SearchResult;
pub use cache::CacheStats;
pub use cost::{PathfinderConfig, TIE_BREAK_CAP, ZoneCosts};
pub use pathfinder::{
    CacheClearReason, PathCell, PathError, PathEvent, PathQuery, Pathfinder, SearchOutcome, check_path, path_cost,
};
pub use search::SearchSpace;
pub use traits::{AstarPather, Pather, WeightedPather};
