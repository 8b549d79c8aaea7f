//! Party-member profile overrides persisted with a save.
//!
//! Only the numeric subset of a profile is saved. Field order is the wire
//! order; every field is one 32-bit integer and enums use `-1` for unset.

use super::enums::{ProfileSetting, raw_index};
use super::{
    AreaAttackMode, AttackWho, BehaviorProfile, BestWeapon, ChemUse, DistancePref, MessageRange,
    ProfileId, RunAwayMode,
};
use crate::combat::HitLocation;
use crate::config::CombatConfig;
use crate::state::{DamageFlags, ProtoId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProfileOverride {
    pub packet_num: i32,
    pub max_dist: i32,
    pub min_to_hit: i32,
    pub min_hp: i32,
    pub aggression: i32,
    pub hurt_too_much: i32,
    pub secondary_freq: i32,
    pub called_freq: i32,
    pub font: i32,
    pub color: i32,
    pub outline_color: i32,
    pub chance: i32,
    pub run: MessageRange,
    pub movement: MessageRange,
    pub attack: MessageRange,
    pub miss: MessageRange,
    pub hit: [MessageRange; HitLocation::SPECIFIC_COUNT],
    pub area_attack_mode: i32,
    pub best_weapon: i32,
    pub distance: i32,
    pub attack_who: i32,
    pub chem_use: i32,
    pub run_away_mode: i32,
    pub chem_primary_desire: [i32; CombatConfig::MAX_PRIMARY_DESIRES],
}

impl ProfileOverride {
    /// Number of 32-bit words in one record.
    pub const WORDS: usize = 12 + 2 * 4 + 2 * HitLocation::SPECIFIC_COUNT + 6
        + CombatConfig::MAX_PRIMARY_DESIRES;

    pub fn id(&self) -> ProfileId {
        ProfileId(self.packet_num)
    }
}

impl From<&BehaviorProfile> for ProfileOverride {
    fn from(profile: &BehaviorProfile) -> Self {
        let mut desires = [-1; CombatConfig::MAX_PRIMARY_DESIRES];
        for (slot, proto) in desires.iter_mut().zip(&profile.chem_primary_desire) {
            *slot = proto.0;
        }

        Self {
            packet_num: profile.id.0,
            max_dist: profile.max_dist,
            min_to_hit: profile.min_to_hit,
            min_hp: profile.min_hp,
            aggression: profile.aggression,
            hurt_too_much: i32::from(profile.hurt_too_much.bits()),
            secondary_freq: profile.secondary_freq,
            called_freq: profile.called_freq,
            font: profile.font,
            color: profile.color,
            outline_color: profile.outline_color,
            chance: profile.chance,
            run: profile.taunts.run,
            movement: profile.taunts.movement,
            attack: profile.taunts.attack,
            miss: profile.taunts.miss,
            hit: profile.taunts.hit,
            area_attack_mode: raw_index(profile.area_attack_mode),
            best_weapon: raw_index(profile.best_weapon),
            distance: raw_index(profile.distance),
            attack_who: raw_index(profile.attack_who),
            chem_use: raw_index(profile.chem_use),
            run_away_mode: raw_index(profile.run_away_mode),
            chem_primary_desire: desires,
        }
    }
}

impl BehaviorProfile {
    /// Overwrites the persisted subset with a saved record.
    ///
    /// Name, disposition and type strings are configuration-only and kept.
    pub fn apply_override(&mut self, record: &ProfileOverride) {
        self.id = record.id();
        self.max_dist = record.max_dist;
        self.min_to_hit = record.min_to_hit;
        self.min_hp = record.min_hp;
        self.aggression = record.aggression;
        self.hurt_too_much = DamageFlags::from_bits_truncate(record.hurt_too_much as u16);
        self.secondary_freq = record.secondary_freq;
        self.called_freq = record.called_freq;
        self.font = record.font;
        self.color = record.color;
        self.outline_color = record.outline_color;
        self.chance = record.chance;
        self.taunts.run = record.run;
        self.taunts.movement = record.movement;
        self.taunts.attack = record.attack;
        self.taunts.miss = record.miss;
        self.taunts.hit = record.hit;
        self.area_attack_mode = AreaAttackMode::from_index(record.area_attack_mode);
        self.best_weapon = BestWeapon::from_index(record.best_weapon);
        self.distance = DistancePref::from_index(record.distance);
        self.attack_who = AttackWho::from_index(record.attack_who);
        self.chem_use = ChemUse::from_index(record.chem_use);
        self.run_away_mode = RunAwayMode::from_index(record.run_away_mode);
        self.chem_primary_desire.clear();
        for proto in record.chem_primary_desire.iter().filter(|proto| **proto >= 0) {
            self.chem_primary_desire.push(ProtoId(*proto));
        }
    }
}
