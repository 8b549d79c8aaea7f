//! Turn-by-turn decision engine for computer-controlled combatants.
//!
//! `combat-ai` decides, once per combatant turn, whom to attack, with which
//! weapon and mode, where to stand, whether to heal or reload, and when to
//! break and run. It never touches the world directly: every query and every
//! action goes through the oracles of [`combat_core::World`], and all tunable
//! behavior comes from the [`BehaviorRegistry`].
//!
//! An [`Encounter`] owns the roster of one fight and drives the decision
//! cycle for each member; the remaining modules are the components it
//! consults.
pub mod context;
pub mod coordinator;
pub mod error;
pub mod position;
pub mod rating;
pub mod registry;
pub mod resources;
pub mod retreat;
pub mod roster;
pub mod target;
pub mod taunt;
pub mod weapon;

pub use context::{AiContext, WorldExt};
pub use coordinator::{Encounter, TurnReport};
pub use error::{Infeasible, PlanResult, RegistryError};
pub use position::Positioner;
pub use rating::combat_rating;
pub use registry::BehaviorRegistry;
pub use resources::{DrugOutcome, ResourceManager};
pub use retreat::{MoraleController, MoraleState};
pub use roster::CombatRoster;
pub use target::{Candidates, TargetSelector, find_attackers, ignores_fleeing};
pub use taunt::emit_taunt;
pub use weapon::WeaponSelector;
