//! Declarative zone configuration document.
//!
//! The document is JSON with camelCase keys:
//!
//! ```json
//! {
//!   "gridConfig": { "rows": 12, "cols": 16, "cellSize": 32 },
//!   "cellRanges": [
//!     { "rowStart": 0, "rowEnd": 11, "colStart": 0, "colEnd": 15, "zoneType": "ground" }
//!   ],
//!   "cells": [ { "row": 4, "col": 4, "zoneType": "rowEntry" } ]
//! }
//! ```
//!
//! `sections`, `stairs` and `fans` belong to other subsystems and are kept
//! verbatim.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tribune_core::Dir;

use crate::zone::{TransitionType, ZoneType};

/// Errors raised while reading a zone document.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read zone config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse zone config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("grid dimensions {rows}x{cols} must both be positive")]
    InvalidDimensions { rows: i32, cols: i32 },

    #[error("cell size {0} must be a positive finite number")]
    InvalidCellSize(f32),
}

/// Fixed geometry of the grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridConfig {
    pub rows: i32,
    pub cols: i32,
    pub cell_size: f32,
    /// World-space position of the grid's top-left corner.
    #[serde(default)]
    pub origin_x: f32,
    #[serde(default)]
    pub origin_y: f32,
}

impl GridConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.rows <= 0 || self.cols <= 0 {
            return Err(ConfigError::InvalidDimensions {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(ConfigError::InvalidCellSize(self.cell_size));
        }
        Ok(())
    }
}

/// Per-side open/closed overrides. Sides left as `None` are not touched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionFlags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<bool>,
}

impl DirectionFlags {
    /// Flags that close exactly the given sides.
    pub fn closed(dirs: &[Dir]) -> Self {
        let mut f = Self::default();
        for &d in dirs {
            f.set(d, false);
        }
        f
    }

    pub fn get(&self, d: Dir) -> Option<bool> {
        match d {
            Dir::Top => self.top,
            Dir::Right => self.right,
            Dir::Bottom => self.bottom,
            Dir::Left => self.left,
        }
    }

    pub fn set(&mut self, d: Dir, open: bool) {
        let slot = match d {
            Dir::Top => &mut self.top,
            Dir::Right => &mut self.right,
            Dir::Bottom => &mut self.bottom,
            Dir::Left => &mut self.left,
        };
        *slot = Some(open);
    }
}

/// Optional overrides shared by range and cell descriptors.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_type: Option<TransitionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_incoming: Option<DirectionFlags>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_outgoing: Option<DirectionFlags>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_level: Option<i32>,
}

/// A rectangle of cells painted with one zone. Bounds are inclusive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellRangeDescriptor {
    pub row_start: i32,
    pub row_end: i32,
    pub col_start: i32,
    pub col_end: i32,
    pub zone_type: ZoneType,
    #[serde(flatten)]
    pub overrides: CellOverrides,
}

impl CellRangeDescriptor {
    pub fn new(zone_type: ZoneType, row_start: i32, row_end: i32, col_start: i32, col_end: i32) -> Self {
        Self {
            row_start,
            row_end,
            col_start,
            col_end,
            zone_type,
            overrides: CellOverrides::default(),
        }
    }

    pub fn passable(mut self, passable: bool) -> Self {
        self.overrides.passable = Some(passable);
        self
    }

    pub fn transition(mut self, t: TransitionType) -> Self {
        self.overrides.transition_type = Some(t);
        self
    }

    pub fn incoming(mut self, flags: DirectionFlags) -> Self {
        self.overrides.allowed_incoming = Some(flags);
        self
    }

    pub fn outgoing(mut self, flags: DirectionFlags) -> Self {
        self.overrides.allowed_outgoing = Some(flags);
        self
    }

    pub fn height(mut self, level: i32) -> Self {
        self.overrides.height_level = Some(level);
        self
    }
}

/// A single-cell override. Without a `zoneType` only the explicit overrides
/// are layered onto whatever the ranges painted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellDescriptor {
    pub row: i32,
    pub col: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_type: Option<ZoneType>,
    #[serde(flatten)]
    pub overrides: CellOverrides,
}

impl CellDescriptor {
    pub fn new(row: i32, col: i32) -> Self {
        Self {
            row,
            col,
            zone_type: None,
            overrides: CellOverrides::default(),
        }
    }

    pub fn zone(mut self, zone: ZoneType) -> Self {
        self.zone_type = Some(zone);
        self
    }

    pub fn passable(mut self, passable: bool) -> Self {
        self.overrides.passable = Some(passable);
        self
    }

    pub fn transition(mut self, t: TransitionType) -> Self {
        self.overrides.transition_type = Some(t);
        self
    }

    pub fn incoming(mut self, flags: DirectionFlags) -> Self {
        self.overrides.allowed_incoming = Some(flags);
        self
    }

    pub fn outgoing(mut self, flags: DirectionFlags) -> Self {
        self.overrides.allowed_outgoing = Some(flags);
        self
    }

    pub fn height(mut self, level: i32) -> Self {
        self.overrides.height_level = Some(level);
        self
    }
}

/// The whole zone document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneConfig {
    pub grid_config: GridConfig,
    #[serde(default)]
    pub cell_ranges: Vec<CellRangeDescriptor>,
    #[serde(default)]
    pub cells: Vec<CellDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stairs: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fans: Vec<serde_json::Value>,
}

impl ZoneConfig {
    /// An empty document for a `rows` × `cols` grid.
    pub fn new(rows: i32, cols: i32, cell_size: f32) -> Self {
        Self {
            grid_config: GridConfig {
                rows,
                cols,
                cell_size,
                origin_x: 0.0,
                origin_y: 0.0,
            },
            cell_ranges: Vec::new(),
            cells: Vec::new(),
            sections: Vec::new(),
            stairs: Vec::new(),
            fans: Vec::new(),
        }
    }

    /// Append a range descriptor (builder).
    pub fn with_range(mut self, range: CellRangeDescriptor) -> Self {
        self.cell_ranges.push(range);
        self
    }

    /// Append a cell descriptor (builder).
    pub fn with_cell(mut self, cell: CellDescriptor) -> Self {
        self.cells.push(cell);
        self
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
