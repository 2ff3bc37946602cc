//! Closed zone and transition enumerations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Movement zone assigned to every cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ZoneType {
    Ground,
    /// Unassigned cells fall back to this zone.
    #[default]
    Corridor,
    Seat,
    RowEntry,
    Stair,
    Sky,
}

impl ZoneType {
    pub const ALL: [ZoneType; 6] = [
        ZoneType::Ground,
        ZoneType::Corridor,
        ZoneType::Seat,
        ZoneType::RowEntry,
        ZoneType::Stair,
        ZoneType::Sky,
    ];

    /// Passability a cell gets when painted with this zone and no override.
    #[inline]
    pub const fn default_passable(self) -> bool {
        !matches!(self, ZoneType::Sky)
    }

    /// Elevation band a cell gets when painted with this zone.
    #[inline]
    pub const fn default_height(self) -> i32 {
        match self {
            ZoneType::Ground | ZoneType::Corridor => 0,
            ZoneType::Seat | ZoneType::RowEntry | ZoneType::Stair => 1,
            ZoneType::Sky => 2,
        }
    }

    /// Single-character glyph used by debug dumps.
    pub const fn glyph(self) -> char {
        match self {
            ZoneType::Ground => '.',
            ZoneType::Corridor => ',',
            ZoneType::Seat => 's',
            ZoneType::RowEntry => 'r',
            ZoneType::Stair => '=',
            ZoneType::Sky => '#',
        }
    }
}

impl fmt::Display for ZoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ZoneType::Ground => "ground",
            ZoneType::Corridor => "corridor",
            ZoneType::Seat => "seat",
            ZoneType::RowEntry => "rowEntry",
            ZoneType::Stair => "stair",
            ZoneType::Sky => "sky",
        })
    }
}

/// Boundary marker used for indexing special cells. Never affects passability.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransitionType {
    RowBoundary,
    StairLanding,
    CorridorEntry,
}

impl TransitionType {
    pub const ALL: [TransitionType; 3] = [
        TransitionType::RowBoundary,
        TransitionType::StairLanding,
        TransitionType::CorridorEntry,
    ];
}

impl fmt::Display for TransitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransitionType::RowBoundary => "rowBoundary",
            TransitionType::StairLanding => "stairLanding",
            TransitionType::CorridorEntry => "corridorEntry",
        })
    }
}
