//! **tribune-core**: shared types for the stadium grid engine.
//!
//! Geometry primitives in grid and world space, cardinal directions with a
//! packed direction mask, and the synchronous [`EventBus`] used for change
//! notification between the grid model and its consumers.

pub mod dir;
pub mod events;
pub mod geom;

pub use dir::{Dir, DirMask};
pub use events::{EventBus, ListenerId};
pub use geom::{Pos, Range, RangeIter, WorldPos};
