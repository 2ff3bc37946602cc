//! The [`Pathfinder`] facade: world-space queries, cache coherence with the
//! grid, and diagnostic events.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tribune_core::{EventBus, ListenerId, Pos, WorldPos};
use tribune_grid::{GridEvent, GridId, GridModel};

use crate::astar::SearchResult;
use crate::cache::{CacheStats, PassCache};
use crate::cost::{CostModel, PathfinderConfig};
use crate::search::SearchSpace;
use crate::traits::{AstarPather, Pather, WeightedPather};

// ---------------------------------------------------------------------------
// Public data types
// ---------------------------------------------------------------------------

/// One step of a computed route.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathCell {
    pub row: i32,
    pub col: i32,
    /// World-space centre of the cell.
    pub x: f32,
    pub y: f32,
    /// Cost of the step from the previous cell; 0 for the first cell.
    pub cost: f32,
}

impl PathCell {
    #[inline]
    pub fn pos(&self) -> Pos {
        Pos::new(self.row, self.col)
    }

    #[inline]
    pub fn world(&self) -> WorldPos {
        WorldPos::new(self.x, self.y)
    }
}

/// Total cost of a path.
pub fn path_cost(path: &[PathCell]) -> f32 {
    path.iter().map(|c| c.cost).sum()
}

/// A path request as the caller made it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PathQuery {
    pub from: WorldPos,
    pub to: WorldPos,
    /// Grid cells the endpoints resolved to, if they did.
    pub start: Option<Pos>,
    pub goal: Option<Pos>,
}

/// Why a search ended. Callers only ever see an empty path for every
/// variant except `Found`; this exists for logs and debug overlays.
#[derive(Clone, Debug, PartialEq)]
pub enum SearchOutcome {
    Found { cost: f32, expanded: usize },
    /// An endpoint lies outside the grid.
    InvalidEndpoint,
    /// No legal route exists under current passability.
    Unreachable { expanded: usize },
    /// The expansion cap ran out first.
    Exhausted { expanded: usize, limit: usize },
    /// The reconstructed path broke a step invariant and was discarded.
    Rejected(PathError),
}

impl SearchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found { .. })
    }
}

/// A path step that is not a legal single move.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("step {index} from {from} to {to} is not a single cardinal move")]
    NotAdjacent { index: usize, from: Pos, to: Pos },

    #[error("step {index} from {from} to {to} is not directionally passable")]
    IllegalMove { index: usize, from: Pos, to: Pos },
}

/// Why the pathfinder's cache was emptied.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CacheClearReason {
    GridChanged,
    ZonesLoaded,
    /// The pathfinder was pointed at a different grid.
    GridSwapped,
    Manual,
}

/// Diagnostic notifications emitted by a [`Pathfinder`].
#[derive(Clone, Debug, PartialEq)]
pub enum PathEvent {
    PathCalculated {
        query: PathQuery,
        outcome: SearchOutcome,
        path: Vec<PathCell>,
    },
    CacheCleared { reason: CacheClearReason },
}

/// Check that every consecutive pair of `path` is one cardinal step apart
/// and directionally passable on `grid`.
pub fn check_path(grid: &GridModel, path: &[PathCell]) -> Result<(), PathError> {
    for (index, pair) in path.windows(2).enumerate() {
        let (from, to) = (pair[0].pos(), pair[1].pos());
        if from.dir_to(to).is_none() {
            return Err(PathError::NotAdjacent { index, from, to });
        }
        if !grid.is_passable_direction(from.row, from.col, to.row, to.col) {
            return Err(PathError::IllegalMove { index, from, to });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Shared state reachable from the grid's listener
// ---------------------------------------------------------------------------

struct Shared {
    /// The grid whose events may clear `cache`.
    bound: Cell<GridId>,
    /// Bumped on every bind; only the newest grid listener is live.
    epoch: Cell<u64>,
    cache: RefCell<PassCache>,
    events: EventBus<PathEvent>,
}

impl Shared {
    fn new(grid: GridId) -> Self {
        Self {
            bound: Cell::new(grid),
            epoch: Cell::new(0),
            cache: RefCell::default(),
            events: EventBus::new(),
        }
    }

    fn clear(&self, reason: CacheClearReason) {
        let dropped = {
            let mut cache = self.cache.borrow_mut();
            let n = cache.len();
            cache.clear();
            n
        };
        log::debug!("path cache cleared ({reason:?}), {dropped} entries dropped");
        self.events.emit(&PathEvent::CacheCleared { reason });
    }
}

/// Subscribe `shared` to `grid`. The listener lapses once the pathfinder is
/// dropped or rebound to another grid.
fn bind(grid: &GridModel, shared: &Rc<Shared>) -> ListenerId {
    let epoch = shared.epoch.get() + 1;
    shared.epoch.set(epoch);
    let probe: Weak<Shared> = Rc::downgrade(shared);
    let weak: Weak<Shared> = Rc::downgrade(shared);
    let alive = move || probe.upgrade().is_some_and(|s| s.epoch.get() == epoch);
    grid.subscribe_while(alive, move |event| {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        if shared.epoch.get() != epoch {
            return;
        }
        let reason = match event {
            GridEvent::GridChanged { .. } => CacheClearReason::GridChanged,
            GridEvent::ZonesLoaded { .. } => CacheClearReason::ZonesLoaded,
        };
        shared.clear(reason);
    })
}

// ---------------------------------------------------------------------------
// Pather adapter
// ---------------------------------------------------------------------------

struct ZonePather<'a> {
    grid: &'a GridModel,
    cache: &'a RefCell<PassCache>,
    costs: CostModel<'a>,
    start: Pos,
}

impl Pather for ZonePather<'_> {
    fn neighbors(&self, p: Pos, buf: &mut Vec<Pos>) {
        let mut cache = self.cache.borrow_mut();
        for n in p.neighbors_4() {
            if cache.passable_direction(self.grid, p, n) {
                buf.push(n);
            }
        }
    }
}

impl WeightedPather for ZonePather<'_> {
    fn cost(&self, from: Pos, to: Pos) -> f32 {
        self.costs.step(from, to)
    }
}

impl AstarPather for ZonePather<'_> {
    fn estimate(&self, from: Pos, to: Pos) -> f32 {
        self.costs.estimate(from, self.start, to)
    }
}

// ---------------------------------------------------------------------------
// Pathfinder
// ---------------------------------------------------------------------------

/// Zone-aware four-directional A* over one [`GridModel`].
///
/// The pathfinder keeps private passability caches and reusable search
/// buffers. On construction it subscribes to the grid's events and empties
/// its caches on every `GridChanged` / `ZonesLoaded`, so results always
/// reflect the current grid. Searches are synchronous and bounded by
/// [`PathfinderConfig::max_iterations`].
pub struct Pathfinder {
    grid_listener: ListenerId,
    config: PathfinderConfig,
    space: SearchSpace,
    shared: Rc<Shared>,
}

impl Pathfinder {
    pub fn new(grid: &GridModel) -> Self {
        Self::with_config(grid, PathfinderConfig::default())
    }

    pub fn with_config(grid: &GridModel, config: PathfinderConfig) -> Self {
        let shared = Rc::new(Shared::new(grid.id()));
        let grid_listener = bind(grid, &shared);
        Self {
            grid_listener,
            config,
            space: SearchSpace::new(grid.bounds()),
            shared,
        }
    }

    pub fn config(&self) -> &PathfinderConfig {
        &self.config
    }

    /// Find a route between two world-space points.
    ///
    /// Returns an empty vector when either point is off the grid, when no
    /// legal route exists, or when the search hits its iteration cap. The
    /// reason is reported through [`PathEvent::PathCalculated`] and the log.
    pub fn find_path(&mut self, grid: &GridModel, from: WorldPos, to: WorldPos) -> Vec<PathCell> {
        let query = PathQuery {
            from,
            to,
            start: grid.world_to_grid(from.x, from.y),
            goal: grid.world_to_grid(to.x, to.y),
        };
        self.route(grid, query)
    }

    /// Same as [`find_path`](Self::find_path) with grid-space endpoints.
    pub fn find_path_cells(&mut self, grid: &GridModel, start: Pos, goal: Pos) -> Vec<PathCell> {
        let query = PathQuery {
            from: grid.grid_to_world(start.row, start.col),
            to: grid.grid_to_world(goal.row, goal.col),
            start: grid.index(start).map(|_| start),
            goal: grid.index(goal).map(|_| goal),
        };
        self.route(grid, query)
    }

    /// Drop every memoised passability result.
    pub fn clear_cache(&self) {
        self.shared.clear(CacheClearReason::Manual);
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.shared.cache.borrow().stats()
    }

    /// Register a listener for [`PathEvent`]s.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: FnMut(&PathEvent) + 'static,
    {
        self.shared.events.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.shared.events.unsubscribe(id)
    }

    /// Id of the grid whose changes this pathfinder tracks.
    pub fn grid(&self) -> GridId {
        self.shared.bound.get()
    }

    /// Stop listening to `grid` right away and drop the pathfinder.
    ///
    /// Dropping without this is fine too; the grid prunes the lapsed
    /// listener the next time it emits or registers one.
    pub fn detach(self, grid: &GridModel) {
        if grid.id() == self.grid() {
            grid.unsubscribe(self.grid_listener);
        }
    }

    /// Track `grid` instead of the current one. The old grid's listener
    /// lapses and is pruned there.
    fn rebind(&mut self, grid: &GridModel) {
        log::warn!("pathfinder bound to {:?} used with {:?}; rebinding", self.grid(), grid.id());
        self.shared.bound.set(grid.id());
        self.grid_listener = bind(grid, &self.shared);
        self.space.set_range(grid.bounds());
        self.shared.clear(CacheClearReason::GridSwapped);
    }

    fn route(&mut self, grid: &GridModel, query: PathQuery) -> Vec<PathCell> {
        if grid.id() != self.grid() {
            self.rebind(grid);
        }

        let (Some(start), Some(goal)) = (query.start, query.goal) else {
            log::debug!("path {} -> {}: endpoint outside grid", query.from, query.to);
            return self.finish(query, SearchOutcome::InvalidEndpoint, Vec::new());
        };

        let limit = self.config.max_iterations(grid);
        let shared = Rc::clone(&self.shared);
        let pather = ZonePather {
            grid,
            cache: &shared.cache,
            costs: CostModel::new(grid, &self.config),
            start,
        };

        if start != goal && !shared.cache.borrow_mut().passable(grid, goal) {
            log::debug!("path {start} -> {goal}: goal cell is impassable");
            return self.finish(query, SearchOutcome::Unreachable { expanded: 0 }, Vec::new());
        }

        let (outcome, path) = match self.space.astar_path(&pather, start, goal, limit) {
            SearchResult::Found { path, cost, expanded } => {
                let cells = materialize(grid, &pather, &path);
                match check_path(grid, &cells) {
                    Ok(()) => {
                        log::debug!(
                            "path {start} -> {goal}: {} cells, cost {cost:.2}, {expanded} expanded",
                            cells.len()
                        );
                        (SearchOutcome::Found { cost, expanded }, cells)
                    }
                    Err(e) => {
                        log::error!("path {start} -> {goal} discarded: {e}");
                        (SearchOutcome::Rejected(e), Vec::new())
                    }
                }
            }
            SearchResult::Unreachable { expanded } => {
                log::debug!("path {start} -> {goal}: unreachable after {expanded} expansions");
                (SearchOutcome::Unreachable { expanded }, Vec::new())
            }
            SearchResult::Exhausted { expanded } => {
                log::warn!("path {start} -> {goal}: iteration cap {limit} exhausted");
                (SearchOutcome::Exhausted { expanded, limit }, Vec::new())
            }
            SearchResult::OutOfRange => (SearchOutcome::InvalidEndpoint, Vec::new()),
        };
        self.finish(query, outcome, path)
    }

    fn finish(&self, query: PathQuery, outcome: SearchOutcome, path: Vec<PathCell>) -> Vec<PathCell> {
        if !self.shared.events.is_empty() {
            self.shared.events.emit(&PathEvent::PathCalculated {
                query,
                outcome,
                path: path.clone(),
            });
        }
        path
    }
}

fn materialize<P: WeightedPather>(grid: &GridModel, pather: &P, path: &[Pos]) -> Vec<PathCell> {
    let mut prev: Option<Pos> = None;
    path.iter()
        .map(|&p| {
            let cost = prev.map_or(0.0, |q| pather.cost(q, p));
            prev = Some(p);
            let w = grid.grid_to_world(p.row, p.col);
            PathCell {
                row: p.row,
                col: p.col,
                x: w.x,
                y: w.y,
                cost,
            }
        })
        .collect()
}

impl std::fmt::Debug for Pathfinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pathfinder")
            .field("grid", &self.grid())
            .field("config", &self.config)
            .field("cache", &self.cache_stats())
            .finish()
    }
}
