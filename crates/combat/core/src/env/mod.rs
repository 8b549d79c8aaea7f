//! Collaborator traits ("oracles") the planner consumes.
//!
//! The world implements all of them; [`World`] is the bundle the planner
//! is generic over. Read-only queries and commands are split so a world
//! can be tested or replaced one concern at a time.
mod battlefield;
mod combatants;
mod inventory;
mod items;
mod messages;
mod perception;
mod rng;
mod rules;
mod spatial;

pub use battlefield::Battlefield;
pub use combatants::CombatantOracle;
pub use inventory::{AmmoState, InventoryOracle};
pub use items::{ItemDefinition, ItemFlags, ItemKind, ItemOracle, WeaponData};
pub use messages::{SilentSink, TauntEvent, TauntSink};
pub use perception::PerceptionOracle;
pub use rng::{PcgRng, RngOracle, compute_seed};
pub use rules::RulesOracle;
pub use spatial::SpatialOracle;

/// Everything the planner needs from the surrounding game.
pub trait World:
    CombatantOracle + SpatialOracle + PerceptionOracle + RulesOracle + ItemOracle + InventoryOracle
    + Battlefield
{
}

impl<T> World for T where
    T: CombatantOracle
        + SpatialOracle
        + PerceptionOracle
        + RulesOracle
        + ItemOracle
        + InventoryOracle
        + Battlefield
{
}
