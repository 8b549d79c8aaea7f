use crate::combat::{HitLocation, HitMode, ShotAssessment, WeaponSafety};
use crate::state::{CombatantId, ItemId, Tile};

/// Read-only combat arithmetic.
///
/// Modes refer to the attacker's currently wielded weapon; `HitMode::Punch`
/// always means bare hands.
pub trait RulesOracle {
    /// Hit chance in percent.
    fn to_hit(
        &self,
        attacker: CombatantId,
        defender: CombatantId,
        location: HitLocation,
        mode: HitMode,
    ) -> i32;

    /// Hit chance as if the defender stood adjacent.
    fn to_hit_ignoring_range(
        &self,
        attacker: CombatantId,
        defender: CombatantId,
        mode: HitMode,
    ) -> i32;

    /// Hit chance if the attacker stood on `tile`.
    fn to_hit_from_tile(
        &self,
        attacker: CombatantId,
        tile: Tile,
        defender: CombatantId,
        mode: HitMode,
    ) -> i32;

    fn classify_shot(
        &self,
        attacker: CombatantId,
        defender: CombatantId,
        mode: HitMode,
    ) -> ShotAssessment;

    /// Action points for one attack; `aimed` adds the called-shot surcharge.
    fn attack_cost(&self, attacker: CombatantId, mode: HitMode, aimed: bool) -> u32;

    /// Same, for a weapon that is not wielded yet.
    fn weapon_cost(&self, attacker: CombatantId, weapon: ItemId, mode: HitMode) -> u32;

    fn attack_range(&self, attacker: CombatantId, mode: HitMode) -> u32;

    /// Range of an arbitrary weapon in `holder`'s hands.
    fn weapon_range(&self, holder: CombatantId, weapon: ItemId, mode: HitMode) -> u32;

    fn weapon_safety(
        &self,
        attacker: CombatantId,
        weapon: ItemId,
        mode: HitMode,
        defender: CombatantId,
    ) -> WeaponSafety;

    /// Extra bodies an area attack on `defender` would catch.
    fn area_extra_targets(
        &self,
        attacker: CombatantId,
        weapon: ItemId,
        defender: CombatantId,
    ) -> u32;

    /// Whether a shot at `target` would also hit something standing on `tile`.
    fn incidental_hit(
        &self,
        shooter: CombatantId,
        target: CombatantId,
        tile: Tile,
        weapon: ItemId,
    ) -> bool;

    fn supports_called_shot(&self, attacker: CombatantId, mode: HitMode) -> bool;

    fn has_attack_animation(&self, critter: CombatantId, weapon: ItemId, mode: HitMode) -> bool;

    /// Skill percent governing a weapon mode.
    fn skill_for(&self, critter: CombatantId, weapon: ItemId, mode: HitMode) -> i32;

    /// Range of bare-handed attacks.
    fn punch_range(&self, critter: CombatantId) -> u32 {
        let _ = critter;
        1
    }
}
