//! Combat arithmetic of the sandbox.
//!
//! Hit chance is `skill - 4 × distance - location penalty - armor class`,
//! clamped to `0..=95`. Ranges and costs come from the attack type.

use combat_core::{
    AttackIntent, AttackType, CombatantId, HitLocation, HitMode, ItemId, RulesOracle,
    ShotAssessment, SpatialOracle, Tile, WeaponData, WeaponSafety,
};

use crate::world::GridWorld;

const MAX_TO_HIT: i32 = 95;

fn range_of(attack_type: AttackType) -> u32 {
    match attack_type {
        AttackType::Melee | AttackType::Unarmed => 1,
        AttackType::Throw => 6,
        AttackType::Ranged => 12,
    }
}

fn cost_of(mode: HitMode, attack_type: AttackType) -> u32 {
    match (mode, attack_type) {
        (HitMode::Punch, _) | (_, AttackType::Melee | AttackType::Unarmed) => 3,
        (HitMode::Primary, _) => 4,
        (HitMode::Secondary, _) => 5,
    }
}

fn location_penalty(location: HitLocation) -> i32 {
    match location {
        HitLocation::Torso | HitLocation::Uncalled => 0,
        HitLocation::RightLeg | HitLocation::LeftLeg => 20,
        HitLocation::LeftArm | HitLocation::RightArm | HitLocation::Groin => 30,
        HitLocation::Head => 40,
        HitLocation::Eyes => 60,
    }
}

impl GridWorld {
    fn weapon_data(&self, weapon: ItemId) -> Option<WeaponData> {
        self.items.get(&weapon)?.definition.weapon
    }

    /// Attack type of `mode` for `weapon`; `None` when the weapon lacks it.
    pub(crate) fn attack_type(&self, weapon: Option<ItemId>, mode: HitMode) -> Option<AttackType> {
        match (mode, weapon.and_then(|weapon| self.weapon_data(weapon))) {
            (HitMode::Punch, _) | (_, None) => Some(AttackType::Unarmed),
            (HitMode::Primary, Some(data)) => Some(data.primary),
            (HitMode::Secondary, Some(data)) => data.secondary,
        }
    }

    fn weapon_for(&self, attacker: CombatantId, mode: HitMode) -> Option<ItemId> {
        match mode {
            HitMode::Punch => None,
            HitMode::Primary | HitMode::Secondary => self.wielded.get(&attacker).copied(),
        }
    }

    fn to_hit_at(
        &self,
        attacker: CombatantId,
        distance: u32,
        defender: CombatantId,
        location: HitLocation,
    ) -> i32 {
        let armor = self
            .combatants
            .get(&defender)
            .map_or(0, |state| state.stats.armor_class);
        let chance = self.skill(attacker)
            - 4 * distance as i32
            - location_penalty(location)
            - armor;
        chance.clamp(0, MAX_TO_HIT)
    }

    fn is_area(&self, weapon: ItemId) -> Option<u32> {
        self.weapon_data(weapon)
            .filter(WeaponData::is_area)
            .map(|data| data.area_radius)
    }

    fn aim_blocked(&self, attacker: CombatantId, from: Tile, to: Tile) -> bool {
        self.grid
            .line(from, to)
            .into_iter()
            .take_while(|tile| *tile != to)
            .any(|tile| {
                self.grid.is_wall(tile)
                    || self.occupant(tile).is_some_and(|other| other != attacker)
            })
    }

    pub(crate) fn damage_of(&self, attacker: CombatantId, intent: &AttackIntent) -> u32 {
        let damage = match intent.weapon.and_then(|weapon| self.weapon_data(weapon)) {
            Some(data) => data.average_damage(),
            None => self
                .combatants
                .get(&attacker)
                .map_or(1, |state| state.stats.melee_damage),
        };
        damage.max(1) as u32
    }

    /// Everyone besides the target caught in an area attack.
    pub(crate) fn splash_victims(&self, intent: &AttackIntent) -> Vec<CombatantId> {
        let Some(radius) = intent.weapon.and_then(|weapon| self.is_area(weapon)) else {
            return Vec::new();
        };
        let Some(center) = self.combatants.get(&intent.target).map(|state| state.tile) else {
            return Vec::new();
        };
        self.combatants
            .values()
            .filter(|state| state.id != intent.target && state.is_alive())
            .filter(|state| self.grid.distance(center, state.tile) <= radius)
            .map(|state| state.id)
            .collect()
    }
}

impl RulesOracle for GridWorld {
    fn to_hit(
        &self,
        attacker: CombatantId,
        defender: CombatantId,
        location: HitLocation,
        _mode: HitMode,
    ) -> i32 {
        let (Some(me), Some(them)) = (self.combatants.get(&attacker), self.combatants.get(&defender))
        else {
            return 0;
        };
        self.to_hit_at(attacker, self.grid.distance(me.tile, them.tile), defender, location)
    }

    fn to_hit_ignoring_range(
        &self,
        attacker: CombatantId,
        defender: CombatantId,
        _mode: HitMode,
    ) -> i32 {
        self.to_hit_at(attacker, 1, defender, HitLocation::Uncalled)
    }

    fn to_hit_from_tile(
        &self,
        attacker: CombatantId,
        tile: Tile,
        defender: CombatantId,
        _mode: HitMode,
    ) -> i32 {
        let Some(them) = self.combatants.get(&defender) else {
            return 0;
        };
        self.to_hit_at(attacker, self.grid.distance(tile, them.tile), defender, HitLocation::Uncalled)
    }

    fn classify_shot(
        &self,
        attacker: CombatantId,
        defender: CombatantId,
        mode: HitMode,
    ) -> ShotAssessment {
        let (Some(me), Some(them)) = (self.combatants.get(&attacker), self.combatants.get(&defender))
        else {
            return ShotAssessment::TargetDead;
        };
        if them.is_dead() {
            return ShotAssessment::TargetDead;
        }

        let weapon = self.weapon_for(attacker, mode);
        let Some(attack_type) = self.attack_type(weapon, mode) else {
            return ShotAssessment::NotEnoughAp;
        };
        if let Some(record) = weapon.and_then(|weapon| self.items.get(&weapon)) {
            if record.ammo.is_empty() {
                return ShotAssessment::NoAmmo;
            }
        }

        let distance = self.grid.distance(me.tile, them.tile);
        if distance > range_of(attack_type) {
            return ShotAssessment::OutOfRange;
        }
        if me.ap.current < cost_of(mode, attack_type) {
            return ShotAssessment::NotEnoughAp;
        }
        if me.damage.both_arms_crippled() {
            return ShotAssessment::BothArmsCrippled;
        }
        let two_handed = weapon
            .and_then(|weapon| self.items.get(&weapon))
            .is_some_and(|record| record.definition.is_two_handed());
        if two_handed && me.damage.any_arm_crippled() {
            return ShotAssessment::ArmCrippled;
        }
        if distance > 1 && self.aim_blocked(attacker, me.tile, them.tile) {
            return ShotAssessment::AimBlocked;
        }
        ShotAssessment::Ok
    }

    fn attack_cost(&self, attacker: CombatantId, mode: HitMode, aimed: bool) -> u32 {
        let weapon = self.weapon_for(attacker, mode);
        let base = self
            .attack_type(weapon, mode)
            .map_or(u32::MAX / 2, |attack_type| cost_of(mode, attack_type));
        base + u32::from(aimed)
    }

    fn weapon_cost(&self, _attacker: CombatantId, weapon: ItemId, mode: HitMode) -> u32 {
        self.attack_type(Some(weapon), mode)
            .map_or(u32::MAX / 2, |attack_type| cost_of(mode, attack_type))
    }

    fn attack_range(&self, attacker: CombatantId, mode: HitMode) -> u32 {
        match self.weapon_for(attacker, mode) {
            None => self.punch_range(attacker),
            weapon => self.attack_type(weapon, mode).map_or(0, range_of),
        }
    }

    fn weapon_range(&self, _holder: CombatantId, weapon: ItemId, mode: HitMode) -> u32 {
        self.attack_type(Some(weapon), mode).map_or(0, range_of)
    }

    fn weapon_safety(
        &self,
        attacker: CombatantId,
        weapon: ItemId,
        _mode: HitMode,
        defender: CombatantId,
    ) -> WeaponSafety {
        let Some(radius) = self.is_area(weapon) else {
            return WeaponSafety::Safe;
        };
        let (Some(me), Some(them)) = (self.combatants.get(&attacker), self.combatants.get(&defender))
        else {
            return WeaponSafety::Safe;
        };
        if self.grid.distance(me.tile, them.tile) <= radius {
            WeaponSafety::Unsafe {
                distance: radius + 1,
            }
        } else {
            WeaponSafety::Safe
        }
    }

    fn area_extra_targets(
        &self,
        attacker: CombatantId,
        weapon: ItemId,
        defender: CombatantId,
    ) -> u32 {
        let Some(radius) = self.is_area(weapon) else {
            return 0;
        };
        let Some(center) = self.combatants.get(&defender).map(|state| state.tile) else {
            return 0;
        };
        self.combatants
            .values()
            .filter(|state| state.id != defender && state.id != attacker && state.is_alive())
            .filter(|state| self.grid.distance(center, state.tile) <= radius)
            .count() as u32
    }

    fn incidental_hit(
        &self,
        _shooter: CombatantId,
        target: CombatantId,
        tile: Tile,
        weapon: ItemId,
    ) -> bool {
        let (Some(radius), Some(them)) = (self.is_area(weapon), self.combatants.get(&target)) else {
            return false;
        };
        self.distance(tile, them.tile) <= radius
    }

    fn supports_called_shot(&self, attacker: CombatantId, mode: HitMode) -> bool {
        let weapon = self.weapon_for(attacker, mode);
        if weapon.and_then(|weapon| self.is_area(weapon)).is_some() {
            return false;
        }
        match self.attack_type(weapon, mode) {
            Some(AttackType::Throw) | None => false,
            Some(_) => mode != HitMode::Secondary,
        }
    }

    fn has_attack_animation(&self, _critter: CombatantId, weapon: ItemId, mode: HitMode) -> bool {
        self.attack_type(Some(weapon), mode).is_some()
    }

    fn skill_for(&self, critter: CombatantId, _weapon: ItemId, _mode: HitMode) -> i32 {
        self.skill(critter)
    }
}
