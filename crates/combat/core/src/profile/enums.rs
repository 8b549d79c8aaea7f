//! Closed value sets of a behavior profile.
//!
//! Every enum parses from its configuration key (snake_case, case
//! insensitive) and converts to and from the raw index used by scripts and
//! by the party-override records. `-1` is the raw form of "unset".

use strum::VariantArray;

use crate::state::DamageFlags;

/// Raw index conversions shared by every profile setting.
pub trait ProfileSetting: Copy + PartialEq + VariantArray + 'static {
    /// Number of valid values; setters reject anything at or above it.
    fn count() -> i32 {
        Self::VARIANTS.len() as i32
    }

    /// Resolves a raw index, `None` when out of range.
    fn from_index(index: i32) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|index| Self::VARIANTS.get(index).copied())
    }

    fn index(self) -> i32 {
        Self::VARIANTS
            .iter()
            .position(|variant| *variant == self)
            .map_or(-1, |index| index as i32)
    }
}

/// Raw form of an optional setting.
pub fn raw_index<T: ProfileSetting>(value: Option<T>) -> i32 {
    value.map_or(-1, ProfileSetting::index)
}

macro_rules! profile_setting {
    ($($name:ident),* $(,)?) => {
        $(impl ProfileSetting for $name {})*
    };
}

/// When to use a weapon's area (burst) mode.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::VariantArray,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AreaAttackMode {
    Always,
    /// Rolled against the profile's secondary frequency.
    Sometimes,
    BeSure,
    BeCareful,
    BeAbsolutelySure,
}

impl AreaAttackMode {
    /// Minimum secondary-mode hit chance for the "be sure" tiers.
    pub const fn hit_threshold(self) -> Option<u32> {
        match self {
            Self::BeSure => Some(85),
            Self::BeCareful => Some(50),
            Self::BeAbsolutelySure => Some(95),
            Self::Always | Self::Sometimes => None,
        }
    }
}

/// Morale bucket; each maps to a percentage of maximum HP that may be lost
/// before fleeing.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::VariantArray,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum RunAwayMode {
    Coward,
    FingerHurts,
    Bleeding,
    NotFeelingGood,
    Tourniquet,
    Never,
}

impl RunAwayMode {
    /// Percent of maximum HP a combatant tolerates losing, by bucket.
    pub const HP_LOSS_PERCENT: [u32; 6] = [0, 25, 40, 60, 75, 100];

    pub fn hp_loss_percent(self) -> u32 {
        Self::HP_LOSS_PERCENT[self.index() as usize]
    }

    /// Absolute HP below which a combatant of `max_hp` flees.
    pub fn min_hp(self, max_hp: u32) -> u32 {
        max_hp - max_hp * self.hp_loss_percent() / 100
    }

    /// Bucket whose threshold best matches an explicit `min_hp`.
    pub fn from_min_hp(min_hp: i32, max_hp: u32) -> Option<Self> {
        if max_hp == 0 {
            return None;
        }
        let tolerated = 100 - (min_hp.max(0) as i64 * 100 / max_hp as i64).min(100);
        Self::VARIANTS
            .iter()
            .copied()
            .filter(|mode| i64::from(mode.hp_loss_percent()) <= tolerated)
            .last()
    }
}

/// Weapon class preference.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::VariantArray,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum BestWeapon {
    NoPref,
    Melee,
    MeleeOverRanged,
    RangedOverMelee,
    Ranged,
    Unarmed,
    UnarmedOverThrown,
    /// Coin flip between candidates instead of scoring.
    Random,
}

impl BestWeapon {
    /// Ordered attack-type classes accepted by a preference; earlier is
    /// better. An unset preference uses the `NoPref` ordering. `Random`
    /// accepts nothing by rank and is resolved by a coin flip upstream.
    pub fn preference_order(preference: Option<Self>) -> &'static [AttackType] {
        use AttackType::{Melee, Ranged, Throw, Unarmed};
        match preference {
            None | Some(Self::NoPref) => &[Ranged, Throw, Melee, Unarmed],
            Some(Self::Melee) => &[Melee],
            Some(Self::MeleeOverRanged) => &[Melee, Ranged],
            Some(Self::RangedOverMelee) => &[Ranged, Melee],
            Some(Self::Ranged) => &[Ranged],
            Some(Self::Unarmed) => &[Unarmed],
            Some(Self::UnarmedOverThrown) => &[Unarmed, Throw],
            Some(Self::Random) => &[],
        }
    }

    /// Preferences that let a clearly stronger weapon override class order.
    pub fn damage_overrides_class(preference: Option<Self>) -> bool {
        matches!(
            preference,
            None | Some(Self::NoPref) | Some(Self::UnarmedOverThrown) | Some(Self::Random)
        )
    }
}

/// Preferred engagement distance.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::VariantArray,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DistancePref {
    StayClose,
    Charge,
    Snipe,
    OnYourOwn,
    Stay,
}

impl DistancePref {
    /// How far a party member may trail the player, by preference.
    pub const fn follow_distance(preference: Option<Self>) -> u32 {
        match preference {
            None | Some(Self::StayClose) => 5,
            Some(Self::Charge) | Some(Self::Snipe) | Some(Self::OnYourOwn) => 7,
            Some(Self::Stay) => 50_000,
        }
    }
}

/// Target ranking policy.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::VariantArray,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AttackWho {
    WhomeverAttackingMe,
    Strongest,
    Weakest,
    Whomever,
    Closest,
}

/// Drug habits.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::VariantArray,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ChemUse {
    Clean,
    StimsWhenHurtLittle,
    StimsWhenHurtLots,
    Sometimes,
    Anytime,
    Always,
}

impl ChemUse {
    /// Percent of maximum HP below which healing is sought. `None` for clean.
    pub const fn heal_threshold(preference: Option<Self>) -> Option<u32> {
        match preference {
            Some(Self::Clean) => None,
            Some(Self::StimsWhenHurtLittle) => Some(60),
            Some(Self::StimsWhenHurtLots) => Some(30),
            _ => Some(50),
        }
    }

    /// Chance of recreational use this turn.
    pub const fn opportunistic_chance(preference: Option<Self>, turn: u32) -> u32 {
        match preference {
            Some(Self::Sometimes) if turn % 3 == 0 => 25,
            Some(Self::Anytime) if turn % 3 == 0 => 75,
            Some(Self::Always) => 100,
            _ => 0,
        }
    }

    /// How many recreational doses may be taken in one turn.
    pub const fn dose_limit(preference: Option<Self>) -> Option<u32> {
        match preference {
            Some(Self::Sometimes) => Some(1),
            Some(Self::Anytime) => Some(2),
            _ => None,
        }
    }
}

/// Party-member behavior tier. Tiers of one companion are sibling profiles
/// with consecutive ids.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::VariantArray,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Disposition {
    Custom,
    Coward,
    Defensive,
    Aggressive,
    Berserk,
}

impl Disposition {
    /// Whether a companion with this tier leaves fleeing enemies alone.
    pub fn spares_fleeing(disposition: Option<Self>) -> bool {
        matches!(
            disposition,
            Some(Self::Custom) | Some(Self::Coward) | Some(Self::Defensive) | Some(Self::Aggressive)
        )
    }
}

/// Injuries that make a combatant give up, configured as a comma list.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::VariantArray,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum HurtTooMuch {
    Blind,
    /// Any limb.
    Crippled,
    CrippledLegs,
    CrippledArms,
}

impl HurtTooMuch {
    pub const fn mask(self) -> DamageFlags {
        match self {
            Self::Blind => DamageFlags::BLIND,
            Self::Crippled => DamageFlags::CRIP_ANY,
            Self::CrippledLegs => DamageFlags::CRIP_LEGS,
            Self::CrippledArms => DamageFlags::CRIP_ARMS,
        }
    }
}

/// Attack-type class of a weapon mode.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AttackType {
    Melee,
    Unarmed,
    Throw,
    Ranged,
}

profile_setting!(
    AreaAttackMode,
    RunAwayMode,
    BestWeapon,
    DistancePref,
    AttackWho,
    ChemUse,
    Disposition,
);
