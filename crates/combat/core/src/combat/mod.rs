//! Attack vocabulary shared by the planner and the rules oracle.
mod hit;
mod intent;
mod shot;

pub use hit::{HitLocation, HitMode};
pub use intent::AttackIntent;
pub use shot::{ShotAssessment, WeaponSafety};
