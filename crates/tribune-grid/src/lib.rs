//! **tribune-grid**: the stadium grid model and its zone loader.
//!
//! A [`GridModel`] owns a fixed `rows` × `cols` array of [`Cell`]s, each
//! tagged with a [`ZoneType`], plain passability, per-direction entry/exit
//! masks and an optional [`TransitionType`] marker. Cell state is painted
//! from a declarative [`ZoneConfig`]: ranges first, then single-cell
//! overrides, later entries winning.
//!
//! Every mutation is announced on the grid's event bus as a [`GridEvent`],
//! which is how derived state (such as pathfinding caches) stays coherent.

mod boundary;
mod cell;
pub mod config;
mod loader;
mod model;
mod zone;

pub use boundary::BoundaryIndex;
pub use cell::{Cell, OccupantId};
pub use config::{
    CellDescriptor, CellOverrides, CellRangeDescriptor, ConfigError, DirectionFlags, GridConfig, ZoneConfig,
};
pub use loader::{LoadReport, LoadWarning};
pub use model::{CellChange, GridEvent, GridId, GridModel};
pub use zone::{TransitionType, ZoneType};
