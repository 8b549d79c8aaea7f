//! Data model and collaborator contracts of the combat decision engine.
//!
//! `combat-core` holds behavior profiles, per-combatant runtime state, the
//! attack vocabulary and the traits through which the planner talks to the
//! world. It performs no I/O and keeps no global state; the planner in
//! `combat-ai` and the loaders in `combat-content` build on these types.
pub mod combat;
pub mod config;
pub mod env;
pub mod error;
pub mod profile;
pub mod state;

pub use combat::{AttackIntent, HitLocation, HitMode, ShotAssessment, WeaponSafety};
pub use config::{CombatConfig, CombatSettings, Difficulty};
pub use env::{
    AmmoState, Battlefield, CombatantOracle, InventoryOracle, ItemDefinition, ItemFlags, ItemKind,
    ItemOracle, PcgRng, PerceptionOracle, RngOracle, RulesOracle, SilentSink, SpatialOracle,
    TauntEvent, TauntSink, WeaponData, World, compute_seed,
};
pub use error::{ErrorSeverity, GameError, SettingError};
pub use profile::{
    AreaAttackMode, AttackType, AttackWho, BehaviorProfile, BestWeapon, ChemUse, Disposition,
    DistancePref, HurtTooMuch, MessageKind, MessageRange, ProfileId, ProfileOverride,
    ProfileSetting, RunAwayMode, TauntRanges,
};
pub use state::{
    AiMemory, BodyType, CombatantId, CombatantState, CombatantStats, DamageFlags, ItemId,
    ManeuverFlags, ProtoId, ResourceMeter, Rotation, TeamId, Tile,
};
