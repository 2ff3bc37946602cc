//! Zone-aware movement costs and search tuning.

use tribune_core::Pos;
use tribune_grid::{GridModel, ZoneType};

/// Upper bound of the tie-break term, in cell widths. Route costs differ in
/// steps of at least 0.05 cell widths, so a capped tie-break never makes the
/// search prefer a dearer route.
pub const TIE_BREAK_CAP: f32 = 0.04;

/// Multiplier applied to the base step cost when entering a zone.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ZoneCosts {
    pub ground: f32,
    pub corridor: f32,
    pub seat: f32,
    pub row_entry: f32,
    pub stair: f32,
    /// Only used for sky cells explicitly overridden to passable.
    pub sky: f32,
}

impl ZoneCosts {
    #[inline]
    pub fn factor(&self, zone: ZoneType) -> f32 {
        match zone {
            ZoneType::Ground => self.ground,
            ZoneType::Corridor => self.corridor,
            ZoneType::Seat => self.seat,
            ZoneType::RowEntry => self.row_entry,
            ZoneType::Stair => self.stair,
            ZoneType::Sky => self.sky,
        }
    }

    /// Cheapest factor of any zone; scales the heuristic so it never
    /// overestimates.
    pub fn min_factor(&self) -> f32 {
        ZoneType::ALL
            .iter()
            .map(|&z| self.factor(z))
            .fold(f32::INFINITY, f32::min)
    }
}

impl Default for ZoneCosts {
    fn default() -> Self {
        Self {
            ground: 0.8,
            corridor: 0.9,
            seat: 2.5,
            row_entry: 1.2,
            stair: 1.8,
            sky: 3.0,
        }
    }
}

/// Tuning knobs of a [`Pathfinder`](crate::Pathfinder).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct PathfinderConfig {
    pub zone_costs: ZoneCosts,
    /// Extra cost, in cell widths, of a step that changes zone type.
    pub zone_transition_penalty: f32,
    /// Weight, in cell widths per cell of drift from the straight line, of
    /// the tie-breaker. The term is capped at [`TIE_BREAK_CAP`].
    pub tie_break_weight: f32,
    /// Expansion cap as a multiple of `rows + cols`.
    pub iteration_multiplier: usize,
}

impl Default for PathfinderConfig {
    fn default() -> Self {
        Self {
            zone_costs: ZoneCosts::default(),
            zone_transition_penalty: 0.25,
            tie_break_weight: 0.001,
            iteration_multiplier: 10,
        }
    }
}

impl PathfinderConfig {
    /// Maximum number of node expansions for one search on `grid`.
    pub fn max_iterations(&self, grid: &GridModel) -> usize {
        let span = (grid.rows() + grid.cols()).max(1) as usize;
        span.saturating_mul(self.iteration_multiplier.max(1))
    }
}

/// Cost model for one grid, shared by the search and path reconstruction.
pub(crate) struct CostModel<'a> {
    grid: &'a GridModel,
    config: &'a PathfinderConfig,
    min_step: f32,
}

impl<'a> CostModel<'a> {
    pub(crate) fn new(grid: &'a GridModel, config: &'a PathfinderConfig) -> Self {
        Self {
            grid,
            config,
            min_step: grid.cell_size() * config.zone_costs.min_factor(),
        }
    }

    /// Cost of the single step `from → to`: one cell width scaled by the
    /// destination zone, plus a penalty when the zone type changes.
    pub(crate) fn step(&self, from: Pos, to: Pos) -> f32 {
        let base = self.grid.cell_size();
        let to_zone = self.grid.cell_at(to).map(|c| c.zone_type()).unwrap_or_default();
        let from_zone = self.grid.cell_at(from).map(|c| c.zone_type()).unwrap_or_default();
        let mut c = base * self.config.zone_costs.factor(to_zone);
        if from_zone != to_zone {
            c += base * self.config.zone_transition_penalty;
        }
        c
    }

    /// Manhattan distance in cheapest-step units, plus a tie-breaker
    /// proportional to how far `p` strays from the `start → goal` line,
    /// capped at [`TIE_BREAK_CAP`] cell widths.
    pub(crate) fn estimate(&self, p: Pos, start: Pos, goal: Pos) -> f32 {
        let h = p.manhattan(goal) as f32 * self.min_step;
        let (d1r, d1c) = ((p.row - goal.row) as f32, (p.col - goal.col) as f32);
        let (d2r, d2c) = ((start.row - goal.row) as f32, (start.col - goal.col) as f32);
        let cross = (d1c * d2r - d2c * d1r).abs();
        let len = (d2r * d2r + d2c * d2c).sqrt().max(1.0);
        let drift = cross / len;
        h + (drift * self.config.tie_break_weight).min(TIE_BREAK_CAP) * self.grid.cell_size()
    }
}
