//! The [`GridModel`]: authoritative cell state, coordinate conversion and
//! change notification.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};

use tribune_core::{DirMask, EventBus, ListenerId, Pos, Range, WorldPos};

use crate::boundary::BoundaryIndex;
use crate::cell::{Cell, OccupantId};
use crate::config::{ConfigError, ZoneConfig};
use crate::loader::{LoadPlan, LoadReport, LoadWarning};
use crate::zone::{TransitionType, ZoneType};

/// Process-unique identity of a [`GridModel`] instance.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GridId(u64);

impl GridId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// What a runtime mutation changed in a single cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CellChange {
    Passable(bool),
    Zone(ZoneType),
    Directions {
        incoming: DirMask,
        outgoing: DirMask,
    },
    OccupantAdded(OccupantId),
    OccupantRemoved(OccupantId),
    OccupantsCleared,
}

/// Notifications emitted by a [`GridModel`].
///
/// These are the only signals consumers should use to invalidate state
/// derived from the grid.
#[derive(Clone, Debug, PartialEq)]
pub enum GridEvent {
    /// One cell changed outside of a full reload.
    GridChanged {
        grid: GridId,
        pos: Pos,
        change: CellChange,
    },
    /// A zone configuration was (re)loaded; every cell may have changed.
    ZonesLoaded { grid: GridId, report: LoadReport },
}

impl GridEvent {
    pub fn grid(&self) -> GridId {
        match self {
            GridEvent::GridChanged { grid, .. } | GridEvent::ZonesLoaded { grid, .. } => *grid,
        }
    }
}

/// A fixed-size stadium grid of zone-typed cells.
///
/// Only the grid writes to its cells. Every mutation is followed by a
/// synchronous [`GridEvent`] to all subscribers, in subscription order.
#[derive(Debug)]
pub struct GridModel {
    id: GridId,
    rows: i32,
    cols: i32,
    cell_size: f32,
    origin: WorldPos,
    cells: Vec<Cell>,
    boundaries: BoundaryIndex,
    events: EventBus<GridEvent>,
}

impl GridModel {
    /// Create a `rows` × `cols` grid of unassigned (corridor) cells.
    ///
    /// Negative dimensions are treated as zero and a non-positive cell size
    /// as 1.
    pub fn new(rows: i32, cols: i32, cell_size: f32) -> Self {
        let rows = rows.max(0);
        let cols = cols.max(0);
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            log::warn!("invalid cell size {cell_size}; using 1.0");
            1.0
        };
        let bounds = Range::new(0, 0, rows, cols);
        Self {
            id: GridId::next(),
            rows,
            cols,
            cell_size,
            origin: WorldPos::ZERO,
            cells: bounds.iter().map(Cell::new).collect(),
            boundaries: BoundaryIndex::default(),
            events: EventBus::new(),
        }
    }

    /// Set the world-space position of the grid's top-left corner (builder).
    pub fn with_origin(mut self, origin: WorldPos) -> Self {
        self.origin = origin;
        self
    }

    /// Build a grid sized by `config.grid_config` and load `config` into it.
    pub fn from_config(config: &ZoneConfig) -> Result<Self, ConfigError> {
        let gc = &config.grid_config;
        gc.validate()?;
        let mut grid =
            Self::new(gc.rows, gc.cols, gc.cell_size).with_origin(WorldPos::new(gc.origin_x, gc.origin_y));
        grid.load_zone_config(config);
        Ok(grid)
    }

    // -----------------------------------------------------------------------
    // Geometry
    // -----------------------------------------------------------------------

    #[inline]
    pub fn id(&self) -> GridId {
        self.id
    }

    #[inline]
    pub fn rows(&self) -> i32 {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> i32 {
        self.cols
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    pub fn origin(&self) -> WorldPos {
        self.origin
    }

    /// Grid-space bounds.
    #[inline]
    pub fn bounds(&self) -> Range {
        Range::new(0, 0, self.rows, self.cols)
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Flat row-major index of `p`, or `None` if out of bounds.
    #[inline]
    pub fn index(&self, p: Pos) -> Option<usize> {
        if p.row < 0 || p.col < 0 || p.row >= self.rows || p.col >= self.cols {
            return None;
        }
        Some((p.row * self.cols + p.col) as usize)
    }

    /// Inverse of [`index`](Self::index).
    #[inline]
    pub fn pos_of(&self, idx: usize) -> Pos {
        let cols = self.cols.max(1) as usize;
        Pos::new((idx / cols) as i32, (idx % cols) as i32)
    }

    /// The grid cell containing world point `(x, y)`, or `None` if the point
    /// is outside the grid. Cells own their top and left edges.
    pub fn world_to_grid(&self, x: f32, y: f32) -> Option<Pos> {
        let lx = (x - self.origin.x) / self.cell_size;
        let ly = (y - self.origin.y) / self.cell_size;
        if !(lx.is_finite() && ly.is_finite()) || lx < 0.0 || ly < 0.0 {
            return None;
        }
        let p = Pos::new(ly.floor() as i32, lx.floor() as i32);
        self.index(p).map(|_| p)
    }

    /// World-space centre of cell `(row, col)`.
    ///
    /// Actors must be placed with this rather than `row * cell_size`, which
    /// ignores the grid origin.
    pub fn grid_to_world(&self, row: i32, col: i32) -> WorldPos {
        WorldPos::new(
            self.origin.x + (col as f32 + 0.5) * self.cell_size,
            self.origin.y + (row as f32 + 0.5) * self.cell_size,
        )
    }

    /// World-space rectangle covered by the grid as `(top_left, bottom_right)`.
    pub fn world_bounds(&self) -> (WorldPos, WorldPos) {
        (
            self.origin,
            WorldPos::new(
                self.origin.x + self.cols as f32 * self.cell_size,
                self.origin.y + self.rows as f32 * self.cell_size,
            ),
        )
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The cell at `(row, col)`, or `None` out of bounds.
    #[inline]
    pub fn cell(&self, row: i32, col: i32) -> Option<&Cell> {
        self.cell_at(Pos::new(row, col))
    }

    #[inline]
    pub fn cell_at(&self, p: Pos) -> Option<&Cell> {
        self.index(p).map(|i| &self.cells[i])
    }

    #[inline]
    pub fn zone_type(&self, row: i32, col: i32) -> Option<ZoneType> {
        self.cell(row, col).map(Cell::zone_type)
    }

    /// Plain passability; `false` out of bounds.
    #[inline]
    pub fn is_passable(&self, row: i32, col: i32) -> bool {
        self.cell(row, col).is_some_and(Cell::is_passable)
    }

    /// Whether a single step from `(from_row, from_col)` to the orthogonally
    /// adjacent `(to_row, to_col)` is legal.
    ///
    /// The target must exist and be passable, the source must allow leaving
    /// in the travel direction, and the target must allow entry from the side
    /// the step arrives on. Not symmetric in general.
    pub fn is_passable_direction(&self, from_row: i32, from_col: i32, to_row: i32, to_col: i32) -> bool {
        let from = Pos::new(from_row, from_col);
        let to = Pos::new(to_row, to_col);
        let Some(dir) = from.dir_to(to) else {
            return false;
        };
        let (Some(src), Some(dst)) = (self.cell_at(from), self.cell_at(to)) else {
            return false;
        };
        dst.passable && src.allowed_outgoing.allows(dir) && dst.allowed_incoming.allows(dir.opposite())
    }

    /// Cells carrying transition marker `t`, in row-major order.
    pub fn boundary_set(&self, t: TransitionType) -> Vec<&Cell> {
        self.boundaries
            .get(t)
            .iter()
            .filter_map(|&p| self.cell_at(p))
            .collect()
    }

    /// Positions carrying transition marker `t`, in row-major order.
    #[inline]
    pub fn boundary_positions(&self, t: TransitionType) -> &[Pos] {
        self.boundaries.get(t)
    }

    pub fn boundaries(&self) -> &BoundaryIndex {
        &self.boundaries
    }

    /// All cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Cells of zone `zone`, in row-major order.
    pub fn cells_in_zone(&self, zone: ZoneType) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(move |c| c.zone_type == zone)
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    /// Replace all cell state with the contents of `config`.
    ///
    /// The configuration is validated and painted into a fresh cell array
    /// before the live one is swapped out, so a load is never half applied.
    /// Occupants are dropped. Loading the same config twice yields the same
    /// state. Emits [`GridEvent::ZonesLoaded`].
    pub fn load_zone_config(&mut self, config: &ZoneConfig) -> LoadReport {
        let bounds = self.bounds();
        let mut plan = LoadPlan::sanitize(config, bounds);

        let gc = &config.grid_config;
        if gc.cell_size != self.cell_size {
            plan.warn(LoadWarning::CellSizeMismatch {
                expected: self.cell_size,
                found: gc.cell_size,
            });
        }
        if (gc.rows, gc.cols) != (self.rows, self.cols) {
            plan.warn(LoadWarning::DimensionMismatch {
                expected: (self.rows, self.cols),
                found: (gc.rows, gc.cols),
            });
        }

        let (cells, report) = plan.paint(bounds);
        self.cells = cells;
        self.boundaries = BoundaryIndex::build(&self.cells);

        for w in &report.warnings {
            log::warn!("zone config: {w}");
        }
        log::debug!(
            "loaded zones into {}x{} grid: {} ranges, {} cells, {} boundary cells",
            self.rows,
            self.cols,
            report.ranges_applied,
            report.cells_applied,
            self.boundaries.len()
        );

        self.events.emit(&GridEvent::ZonesLoaded {
            grid: self.id,
            report: report.clone(),
        });
        report
    }

    // -----------------------------------------------------------------------
    // Runtime mutation
    // -----------------------------------------------------------------------

    /// Mark a cell passable or blocked (e.g. a dropped obstacle).
    ///
    /// Returns whether anything changed; emits `GridChanged` if so.
    pub fn set_passable(&mut self, row: i32, col: i32, passable: bool) -> bool {
        self.mutate(Pos::new(row, col), |cell| {
            if cell.passable == passable {
                return None;
            }
            cell.passable = passable;
            Some(CellChange::Passable(passable))
        })
    }

    /// Repaint a single cell with `zone` and that zone's defaults.
    pub fn set_zone_type(&mut self, row: i32, col: i32, zone: ZoneType) -> bool {
        let pos = Pos::new(row, col);
        let Some(i) = self.index(pos) else {
            log::warn!("ignoring zone change of out-of-bounds cell {pos}");
            return false;
        };
        let before = self.cells[i].clone();
        self.cells[i].repaint(zone);
        if self.cells[i] == before {
            return false;
        }
        self.boundaries.update(pos, before.transition_type, None);
        self.emit_changed(pos, CellChange::Zone(zone));
        true
    }

    /// Replace a cell's directional masks.
    pub fn set_directions(&mut self, row: i32, col: i32, incoming: DirMask, outgoing: DirMask) -> bool {
        self.mutate(Pos::new(row, col), |cell| {
            if cell.allowed_incoming == incoming && cell.allowed_outgoing == outgoing {
                return None;
            }
            cell.allowed_incoming = incoming;
            cell.allowed_outgoing = outgoing;
            Some(CellChange::Directions { incoming, outgoing })
        })
    }

    /// Record that `occupant` now stands in the cell.
    pub fn add_occupant(&mut self, row: i32, col: i32, occupant: OccupantId) -> bool {
        self.mutate(Pos::new(row, col), |cell| {
            cell.occupants
                .insert(occupant)
                .then_some(CellChange::OccupantAdded(occupant))
        })
    }

    pub fn remove_occupant(&mut self, row: i32, col: i32, occupant: OccupantId) -> bool {
        self.mutate(Pos::new(row, col), |cell| {
            cell.occupants
                .remove(&occupant)
                .then_some(CellChange::OccupantRemoved(occupant))
        })
    }

    pub fn clear_occupants(&mut self, row: i32, col: i32) -> bool {
        self.mutate(Pos::new(row, col), |cell| {
            if cell.occupants.is_empty() {
                return None;
            }
            cell.occupants.clear();
            Some(CellChange::OccupantsCleared)
        })
    }

    fn mutate(&mut self, pos: Pos, f: impl FnOnce(&mut Cell) -> Option<CellChange>) -> bool {
        let Some(i) = self.index(pos) else {
            log::warn!("ignoring mutation of out-of-bounds cell {pos}");
            return false;
        };
        let Some(change) = f(&mut self.cells[i]) else {
            return false;
        };
        self.emit_changed(pos, change);
        true
    }

    fn emit_changed(&self, pos: Pos, change: CellChange) {
        self.events.emit(&GridEvent::GridChanged {
            grid: self.id,
            pos,
            change,
        });
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Register a listener for [`GridEvent`]s.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: FnMut(&GridEvent) + 'static,
    {
        self.events.subscribe(listener)
    }

    /// Register a listener that is dropped once `alive` returns `false`.
    ///
    /// Suited to listeners that forward to state owned elsewhere through a
    /// `Weak` reference.
    pub fn subscribe_while<A, F>(&self, alive: A, listener: F) -> ListenerId
    where
        A: Fn() -> bool + 'static,
        F: FnMut(&GridEvent) + 'static,
    {
        self.events.subscribe_while(alive, listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn listener_count(&self) -> usize {
        self.events.len()
    }

    // -----------------------------------------------------------------------
    // Debug
    // -----------------------------------------------------------------------

    /// One line per row, one glyph per cell: the zone glyph, or `X` for a
    /// zone that is normally passable but blocked here.
    pub fn dump(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.rows as usize);
        for row in self.cells.chunks(self.cols.max(1) as usize) {
            for c in row {
                let glyph = if !c.passable && c.zone_type.default_passable() {
                    'X'
                } else {
                    c.zone_type.glyph()
                };
                let _ = out.write_char(glyph);
            }
            out.push('\n');
        }
        out
    }
}
