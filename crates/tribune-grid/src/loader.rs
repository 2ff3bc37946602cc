//! Zone loader: sanitises a [`ZoneConfig`] against the grid bounds and
//! materialises per-cell state from it.
//!
//! Loading runs in two phases. [`LoadPlan::sanitize`] checks every
//! descriptor and decides what will be painted, recording a [`LoadWarning`]
//! for anything it had to clamp, reorder or drop. [`LoadPlan::paint`] then
//! builds a complete fresh cell array. The live grid is only replaced once
//! the new array exists.

use std::fmt;

use tribune_core::{Pos, Range};

use crate::cell::Cell;
use crate::config::{CellDescriptor, CellRangeDescriptor, ZoneConfig};

/// Something the loader had to correct in the configuration.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadWarning {
    /// `gridConfig` disagrees with the fixed dimensions of the live grid.
    DimensionMismatch {
        expected: (i32, i32),
        found: (i32, i32),
    },
    /// `gridConfig.cellSize` disagrees with the live grid.
    CellSizeMismatch { expected: f32, found: f32 },
    /// A range had `start > end` on at least one axis; bounds were swapped.
    ReversedRange { index: usize },
    /// A range extended past the grid and was clipped.
    ClampedRange {
        index: usize,
        requested: Range,
        clamped: Range,
    },
    /// A range lies entirely outside the grid and was skipped.
    RangeOutsideGrid { index: usize, requested: Range },
    /// A cell descriptor lies outside the grid and was skipped.
    CellOutsideGrid { index: usize, pos: Pos },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DimensionMismatch { expected, found } => write!(
                f,
                "config declares a {}x{} grid but the grid is {}x{}; keeping the grid's size",
                found.0, found.1, expected.0, expected.1
            ),
            Self::CellSizeMismatch { expected, found } => write!(
                f,
                "config declares cell size {found} but the grid uses {expected}; keeping the grid's"
            ),
            Self::ReversedRange { index } => {
                write!(f, "cell range #{index} has reversed bounds; swapped")
            }
            Self::ClampedRange {
                index,
                requested,
                clamped,
            } => write!(f, "cell range #{index} {requested} clamped to {clamped}"),
            Self::RangeOutsideGrid { index, requested } => {
                write!(f, "cell range #{index} {requested} lies outside the grid; skipped")
            }
            Self::CellOutsideGrid { index, pos } => {
                write!(f, "cell override #{index} at {pos} lies outside the grid; skipped")
            }
        }
    }
}

/// Summary of a completed load.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadReport {
    /// Range descriptors that painted at least one cell.
    pub ranges_applied: usize,
    /// Cell descriptors that were applied.
    pub cells_applied: usize,
    pub warnings: Vec<LoadWarning>,
}

impl LoadReport {
    /// Whether the configuration loaded without any correction.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// A validated configuration: every entry is known to lie inside the grid.
pub(crate) struct LoadPlan<'a> {
    ranges: Vec<(Range, &'a CellRangeDescriptor)>,
    cells: Vec<(Pos, &'a CellDescriptor)>,
    warnings: Vec<LoadWarning>,
}

impl<'a> LoadPlan<'a> {
    /// Validate `config` against `bounds` without touching any cell.
    pub(crate) fn sanitize(config: &'a ZoneConfig, bounds: Range) -> Self {
        let mut warnings = Vec::new();
        let mut ranges = Vec::with_capacity(config.cell_ranges.len());

        for (index, d) in config.cell_ranges.iter().enumerate() {
            if d.row_start > d.row_end || d.col_start > d.col_end {
                warnings.push(LoadWarning::ReversedRange { index });
            }
            let requested = Range::inclusive(d.row_start, d.row_end, d.col_start, d.col_end);
            let clamped = requested.intersect(bounds);
            if clamped.is_empty() {
                warnings.push(LoadWarning::RangeOutsideGrid { index, requested });
                continue;
            }
            if clamped != requested {
                warnings.push(LoadWarning::ClampedRange {
                    index,
                    requested,
                    clamped,
                });
            }
            ranges.push((clamped, d));
        }

        let mut cells = Vec::with_capacity(config.cells.len());
        for (index, d) in config.cells.iter().enumerate() {
            let pos = Pos::new(d.row, d.col);
            if !bounds.contains(pos) {
                warnings.push(LoadWarning::CellOutsideGrid { index, pos });
                continue;
            }
            cells.push((pos, d));
        }

        Self {
            ranges,
            cells,
            warnings,
        }
    }

    /// Record a warning found outside descriptor validation.
    pub(crate) fn warn(&mut self, w: LoadWarning) {
        self.warnings.insert(0, w);
    }

    /// Paint a fresh row-major cell array of size `bounds`.
    ///
    /// Ranges go first in declaration order, then single cells in
    /// declaration order, so later entries and cell overrides win.
    pub(crate) fn paint(self, bounds: Range) -> (Vec<Cell>, LoadReport) {
        let width = bounds.width() as usize;
        let mut cells: Vec<Cell> = bounds.iter().map(Cell::new).collect();
        let index = |p: Pos| (p.row - bounds.min.row) as usize * width + (p.col - bounds.min.col) as usize;

        for (rng, d) in &self.ranges {
            for p in rng.iter() {
                let cell = &mut cells[index(p)];
                cell.repaint(d.zone_type);
                cell.apply_overrides(&d.overrides);
            }
        }

        for (p, d) in &self.cells {
            let cell = &mut cells[index(*p)];
            if let Some(zone) = d.zone_type {
                cell.repaint(zone);
            }
            cell.apply_overrides(&d.overrides);
        }

        let report = LoadReport {
            ranges_applied: self.ranges.len(),
            cells_applied: self.cells.len(),
            warnings: self.warnings,
        };
        (cells, report)
    }
}
