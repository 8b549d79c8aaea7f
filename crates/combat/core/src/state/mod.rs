//! Runtime state shared between the world and the planner.
mod combatant;
mod common;
mod flags;

pub use combatant::{AiMemory, BodyType, CombatantState, CombatantStats};
pub use common::{CombatantId, ItemId, ProtoId, ResourceMeter, Rotation, TeamId, Tile};
pub use flags::{DamageFlags, ManeuverFlags};
