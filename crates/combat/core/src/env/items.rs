use bitflags::bitflags;

use crate::profile::AttackType;
use crate::state::{ItemId, ProtoId};

/// Read-only item catalog.
pub trait ItemOracle {
    /// Definition of an item instance; `None` for unknown ids.
    fn definition(&self, item: ItemId) -> Option<ItemDefinition>;
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ItemKind {
    Weapon,
    Ammo,
    Drug,
    Armor,
    Misc,
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ItemFlags: u8 {
        const TWO_HANDED   = 1 << 0;
        /// Claws, fangs and other body weapons; never dropped or swapped.
        const NATURAL      = 1 << 1;
        /// Flares and similar; lights the area when used.
        const LIGHT_SOURCE = 1 << 2;
        const HEALING      = 1 << 3;
    }
}

/// Weapon-specific data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeaponData {
    pub damage_min: i32,
    pub damage_max: i32,
    pub primary: AttackType,
    pub secondary: Option<AttackType>,
    /// Blast radius; `0` for single-target weapons.
    pub area_radius: u32,
    /// Carries a special perk that doubles its worth.
    pub special_perk: bool,
    /// Ammunition prototype accepted, `None` for weapons that take none.
    pub ammo: Option<ProtoId>,
}

impl WeaponData {
    pub fn average_damage(&self) -> i32 {
        (self.damage_min + self.damage_max) / 2
    }

    pub fn is_area(&self) -> bool {
        self.area_radius > 0
    }
}

/// Item definition: common fields plus optional weapon data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemDefinition {
    pub proto: ProtoId,
    pub kind: ItemKind,
    /// Trade value, used to break near-ties between weapons.
    pub cost: i32,
    pub flags: ItemFlags,
    pub weapon: Option<WeaponData>,
}

impl ItemDefinition {
    pub fn new(proto: ProtoId, kind: ItemKind, cost: i32) -> Self {
        Self {
            proto,
            kind,
            cost,
            flags: ItemFlags::empty(),
            weapon: None,
        }
    }

    #[must_use]
    pub fn with_flags(mut self, flags: ItemFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn with_weapon(mut self, weapon: WeaponData) -> Self {
        self.kind = ItemKind::Weapon;
        self.weapon = Some(weapon);
        self
    }

    pub fn is_healing(&self) -> bool {
        self.flags.contains(ItemFlags::HEALING)
    }

    pub fn is_light_source(&self) -> bool {
        self.flags.contains(ItemFlags::LIGHT_SOURCE)
    }

    pub fn is_natural(&self) -> bool {
        self.flags.contains(ItemFlags::NATURAL)
    }

    pub fn is_two_handed(&self) -> bool {
        self.flags.contains(ItemFlags::TWO_HANDED)
    }
}
