//! Data-driven behavior profiles ("AI packets").
//!
//! A [`BehaviorProfile`] is pure data: ranges, thresholds and policy enums
//! that tune the shared planner for one class of combatant. Profiles are
//! loaded once and looked up by [`ProfileId`].
mod enums;
mod overrides;

use std::fmt;

use arrayvec::ArrayVec;

pub use enums::{
    AreaAttackMode, AttackType, AttackWho, BestWeapon, ChemUse, Disposition, DistancePref,
    HurtTooMuch, ProfileSetting, RunAwayMode, raw_index,
};
pub use overrides::ProfileOverride;

use crate::combat::HitLocation;
use crate::config::CombatConfig;
use crate::state::{DamageFlags, ProtoId};

/// Stable numeric profile identifier ("packet number").
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProfileId(pub i32);

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "packet {}", self.0)
    }
}

/// Inclusive range of message-catalog ids. `end < start` means no message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MessageRange {
    pub start: i32,
    pub end: i32,
}

impl MessageRange {
    pub const EMPTY: Self = Self { start: 0, end: -1 };

    pub const fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub const fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

impl Default for MessageRange {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Situations that may trigger a taunt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MessageKind {
    Run,
    Move,
    Attack,
    Miss,
    Hit(HitLocation),
}

/// Message ranges per taunt situation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TauntRanges {
    pub run: MessageRange,
    pub movement: MessageRange,
    pub attack: MessageRange,
    pub miss: MessageRange,
    pub hit: [MessageRange; HitLocation::SPECIFIC_COUNT],
}

impl TauntRanges {
    pub fn range(&self, kind: MessageKind) -> MessageRange {
        match kind {
            MessageKind::Run => self.run,
            MessageKind::Move => self.movement,
            MessageKind::Attack => self.attack,
            MessageKind::Miss => self.miss,
            MessageKind::Hit(location) => self.hit[location.message_slot()],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BehaviorProfile {
    /// Section name in the configuration source.
    pub name: String,
    pub id: ProfileId,
    /// Engagement radius; beyond it a fleeing combatant stops running.
    pub max_dist: i32,
    /// Minimum acceptable hit chance.
    pub min_to_hit: i32,
    /// Flee when current HP drops below this.
    pub min_hp: i32,
    pub aggression: i32,
    pub hurt_too_much: DamageFlags,
    /// 1-in-N chance of an opportunistic secondary attack.
    pub secondary_freq: i32,
    /// 1-in-N chance of a called shot.
    pub called_freq: i32,
    pub font: i32,
    pub color: i32,
    pub outline_color: i32,
    /// Percent chance that a taunt is spoken at all.
    pub chance: i32,
    pub taunts: TauntRanges,
    pub area_attack_mode: Option<AreaAttackMode>,
    pub run_away_mode: Option<RunAwayMode>,
    pub best_weapon: Option<BestWeapon>,
    pub distance: Option<DistancePref>,
    pub attack_who: Option<AttackWho>,
    pub chem_use: Option<ChemUse>,
    pub chem_primary_desire: ArrayVec<ProtoId, { CombatConfig::MAX_PRIMARY_DESIRES }>,
    pub disposition: Option<Disposition>,
    pub body_type: Option<String>,
    pub general_type: Option<String>,
}

impl BehaviorProfile {
    /// A profile with neutral numbers and every policy unset.
    pub fn new(name: impl Into<String>, id: ProfileId) -> Self {
        Self {
            name: name.into(),
            id,
            max_dist: 8,
            min_to_hit: 30,
            min_hp: 0,
            aggression: 0,
            hurt_too_much: DamageFlags::empty(),
            secondary_freq: 1,
            called_freq: 1,
            font: 0,
            color: 0,
            outline_color: 0,
            chance: 0,
            taunts: TauntRanges::default(),
            area_attack_mode: None,
            run_away_mode: None,
            best_weapon: None,
            distance: None,
            attack_who: None,
            chem_use: None,
            chem_primary_desire: ArrayVec::new(),
            disposition: None,
            body_type: None,
            general_type: None,
        }
    }

    /// Weapon classes this profile accepts, best first.
    pub fn weapon_preferences(&self) -> &'static [AttackType] {
        BestWeapon::preference_order(self.best_weapon)
    }

    pub fn prefers(&self, attack_type: AttackType) -> bool {
        self.weapon_preferences().contains(&attack_type)
    }

    /// Rank of an attack type in the preference order, if accepted.
    pub fn preference_rank(&self, attack_type: AttackType) -> Option<usize> {
        self.weapon_preferences()
            .iter()
            .position(|preferred| *preferred == attack_type)
    }

    pub fn is_hurt_too_much(&self, damage: DamageFlags) -> bool {
        damage.intersects(self.hurt_too_much)
    }

    pub fn desires(&self, proto: ProtoId) -> bool {
        self.chem_primary_desire.contains(&proto)
    }

    /// Configured run-away bucket, else one derived from `min_hp`.
    pub fn effective_run_away_mode(&self, max_hp: u32) -> Option<RunAwayMode> {
        self.run_away_mode
            .or_else(|| RunAwayMode::from_min_hp(self.min_hp, max_hp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_taunts_for_uncalled_use_torso_range() {
        let mut taunts = TauntRanges::default();
        taunts.hit[HitLocation::Torso.message_slot()] = MessageRange::new(100, 104);
        assert_eq!(
            taunts.range(MessageKind::Hit(HitLocation::Uncalled)),
            MessageRange::new(100, 104)
        );
    }

    #[test]
    fn preference_rank_follows_order() {
        let mut profile = BehaviorProfile::new("Raider", ProfileId(3));
        profile.best_weapon = Some(BestWeapon::RangedOverMelee);
        assert_eq!(profile.preference_rank(AttackType::Ranged), Some(0));
        assert_eq!(profile.preference_rank(AttackType::Melee), Some(1));
        assert_eq!(profile.preference_rank(AttackType::Throw), None);
    }

    #[test]
    fn unset_run_away_mode_derives_from_min_hp() {
        let mut profile = BehaviorProfile::new("Guard", ProfileId(1));
        profile.min_hp = 15;
        assert_eq!(
            profile.effective_run_away_mode(50),
            Some(RunAwayMode::NotFeelingGood)
        );
        profile.run_away_mode = Some(RunAwayMode::Coward);
        assert_eq!(profile.effective_run_away_mode(50), Some(RunAwayMode::Coward));
    }
}
