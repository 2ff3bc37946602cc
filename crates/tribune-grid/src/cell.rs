//! The [`Cell`] type: per-position state of the stadium grid.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tribune_core::{Dir, DirMask, Pos};

use crate::config::{CellOverrides, DirectionFlags};
use crate::zone::{TransitionType, ZoneType};

/// Identifier of an object standing in a cell (fan, vendor, mascot…).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OccupantId(pub u64);

/// State of one grid cell.
///
/// Cells are only mutated through [`GridModel`](crate::GridModel); consumers
/// get shared references.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub(crate) pos: Pos,
    pub(crate) zone_type: ZoneType,
    pub(crate) passable: bool,
    pub(crate) transition_type: Option<TransitionType>,
    pub(crate) allowed_incoming: DirMask,
    pub(crate) allowed_outgoing: DirMask,
    pub(crate) occupants: BTreeSet<OccupantId>,
    pub(crate) height_level: i32,
}

impl Cell {
    /// A fresh, unassigned cell: corridor zone, all directions open.
    pub(crate) fn new(pos: Pos) -> Self {
        let zone = ZoneType::default();
        Self {
            pos,
            zone_type: zone,
            passable: zone.default_passable(),
            transition_type: None,
            allowed_incoming: DirMask::ALL,
            allowed_outgoing: DirMask::ALL,
            occupants: BTreeSet::new(),
            height_level: zone.default_height(),
        }
    }

    #[inline]
    pub fn pos(&self) -> Pos {
        self.pos
    }

    #[inline]
    pub fn row(&self) -> i32 {
        self.pos.row
    }

    #[inline]
    pub fn col(&self) -> i32 {
        self.pos.col
    }

    #[inline]
    pub fn zone_type(&self) -> ZoneType {
        self.zone_type
    }

    #[inline]
    pub fn is_passable(&self) -> bool {
        self.passable
    }

    #[inline]
    pub fn transition_type(&self) -> Option<TransitionType> {
        self.transition_type
    }

    /// Sides through which the cell may be entered.
    #[inline]
    pub fn allowed_incoming(&self) -> DirMask {
        self.allowed_incoming
    }

    /// Directions in which the cell may be left.
    #[inline]
    pub fn allowed_outgoing(&self) -> DirMask {
        self.allowed_outgoing
    }

    #[inline]
    pub fn height_level(&self) -> i32 {
        self.height_level
    }

    pub fn occupants(&self) -> &BTreeSet<OccupantId> {
        &self.occupants
    }

    pub fn is_occupied(&self) -> bool {
        !self.occupants.is_empty()
    }

    /// Replace every zone-derived field with the defaults of `zone`.
    /// Occupants are left alone.
    pub(crate) fn repaint(&mut self, zone: ZoneType) {
        self.zone_type = zone;
        self.passable = zone.default_passable();
        self.transition_type = None;
        self.allowed_incoming = DirMask::ALL;
        self.allowed_outgoing = DirMask::ALL;
        self.height_level = zone.default_height();
    }

    /// Layer the explicit fields of `ov` on top of the current state.
    pub(crate) fn apply_overrides(&mut self, ov: &CellOverrides) {
        if let Some(p) = ov.passable {
            self.passable = p;
        }
        if let Some(t) = ov.transition_type {
            self.transition_type = Some(t);
        }
        if let Some(flags) = &ov.allowed_incoming {
            self.allowed_incoming = flags.apply(self.allowed_incoming);
        }
        if let Some(flags) = &ov.allowed_outgoing {
            self.allowed_outgoing = flags.apply(self.allowed_outgoing);
        }
        if let Some(h) = ov.height_level {
            self.height_level = h;
        }
    }
}

impl DirectionFlags {
    /// Apply the explicitly set directions onto `base`; unset ones keep
    /// their current value.
    pub fn apply(&self, base: DirMask) -> DirMask {
        let mut m = base;
        for d in Dir::ALL {
            if let Some(open) = self.get(d) {
                m = m.with(d, open);
            }
        }
        m
    }
}
