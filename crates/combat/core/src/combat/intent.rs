use super::{HitLocation, HitMode};
use crate::state::{CombatantId, ItemId};

/// One planned strike, handed to the attack-resolution collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackIntent {
    pub target: CombatantId,
    /// `None` attacks unarmed.
    pub weapon: Option<ItemId>,
    pub mode: HitMode,
    pub location: HitLocation,
    /// Distance to open before firing an otherwise unsafe weapon.
    pub safe_distance: Option<u32>,
}

impl AttackIntent {
    pub fn unarmed(target: CombatantId) -> Self {
        Self {
            target,
            weapon: None,
            mode: HitMode::Punch,
            location: HitLocation::Torso,
            safe_distance: None,
        }
    }

    #[must_use]
    pub fn at(mut self, location: HitLocation) -> Self {
        self.location = location;
        self
    }
}
