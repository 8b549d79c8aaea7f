//! A small hex-grid world for exercising the combat planner.
//!
//! [`GridWorld`] implements every collaborator trait of `combat-core` with
//! plain in-memory maps: axial hex geometry with walls and breadth-first
//! pathing, perception by distance and line of sight, a deterministic hit
//! roll, inventories, ground items, ammunition and drugs. Every command the
//! planner issues is logged as a [`Command`].
mod inventory;
mod rules;

pub mod grid;
pub mod presets;
pub mod sink;
pub mod world;

pub use grid::HexGrid;
pub use sink::{FixedRng, RecordingSink};
pub use world::{Command, GridWorld};
