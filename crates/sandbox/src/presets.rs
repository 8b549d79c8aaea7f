//! Stock items for scenarios.

use combat_core::{AttackType, ItemDefinition, ItemFlags, ItemKind, ProtoId, WeaponData};

pub const PISTOL: ProtoId = ProtoId(8);
pub const RIFLE: ProtoId = ProtoId(9);
pub const SMG: ProtoId = ProtoId(10);
pub const KNIFE: ProtoId = ProtoId(4);
pub const CLAWS: ProtoId = ProtoId(5);
pub const GRENADE: ProtoId = ProtoId(25);
pub const FLARE: ProtoId = ProtoId(79);
pub const STIMPAK: ProtoId = ProtoId(40);
pub const BUFFOUT: ProtoId = ProtoId(87);
pub const PISTOL_AMMO: ProtoId = ProtoId(29);
pub const RIFLE_AMMO: ProtoId = ProtoId(30);

fn weapon(damage: (i32, i32), primary: AttackType) -> WeaponData {
    WeaponData {
        damage_min: damage.0,
        damage_max: damage.1,
        primary,
        secondary: None,
        area_radius: 0,
        special_perk: false,
        ammo: None,
    }
}

pub fn pistol() -> ItemDefinition {
    let data = WeaponData {
        ammo: Some(PISTOL_AMMO),
        ..weapon((5, 12), AttackType::Ranged)
    };
    ItemDefinition::new(PISTOL, ItemKind::Weapon, 250).with_weapon(data)
}

pub fn rifle() -> ItemDefinition {
    let data = WeaponData {
        ammo: Some(RIFLE_AMMO),
        ..weapon((8, 20), AttackType::Ranged)
    };
    ItemDefinition::new(RIFLE, ItemKind::Weapon, 800)
        .with_weapon(data)
        .with_flags(ItemFlags::TWO_HANDED)
}

/// Single shot or burst.
pub fn smg() -> ItemDefinition {
    let data = WeaponData {
        secondary: Some(AttackType::Ranged),
        ammo: Some(PISTOL_AMMO),
        ..weapon((5, 12), AttackType::Ranged)
    };
    ItemDefinition::new(SMG, ItemKind::Weapon, 1000)
        .with_weapon(data)
        .with_flags(ItemFlags::TWO_HANDED)
}

/// Stab or throw.
pub fn knife() -> ItemDefinition {
    let data = WeaponData {
        secondary: Some(AttackType::Throw),
        ..weapon((1, 6), AttackType::Melee)
    };
    ItemDefinition::new(KNIFE, ItemKind::Weapon, 40).with_weapon(data)
}

pub fn claws() -> ItemDefinition {
    ItemDefinition::new(CLAWS, ItemKind::Weapon, 0)
        .with_weapon(weapon((4, 10), AttackType::Unarmed))
        .with_flags(ItemFlags::NATURAL)
}

pub fn grenade() -> ItemDefinition {
    let data = WeaponData {
        area_radius: 2,
        ..weapon((15, 30), AttackType::Throw)
    };
    ItemDefinition::new(GRENADE, ItemKind::Weapon, 150).with_weapon(data)
}

pub fn flare() -> ItemDefinition {
    ItemDefinition::new(FLARE, ItemKind::Weapon, 35)
        .with_weapon(weapon((1, 1), AttackType::Throw))
        .with_flags(ItemFlags::LIGHT_SOURCE)
}

pub fn stimpak() -> ItemDefinition {
    ItemDefinition::new(STIMPAK, ItemKind::Drug, 175).with_flags(ItemFlags::HEALING)
}

pub fn buffout() -> ItemDefinition {
    ItemDefinition::new(BUFFOUT, ItemKind::Drug, 200)
}

pub fn pistol_ammo() -> ItemDefinition {
    ItemDefinition::new(PISTOL_AMMO, ItemKind::Ammo, 100)
}

pub fn rifle_ammo() -> ItemDefinition {
    ItemDefinition::new(RIFLE_AMMO, ItemKind::Ammo, 150)
}

/// Rounds a weapon holds; `0` for weapons without ammunition.
pub fn magazine(definition: &ItemDefinition) -> u32 {
    match definition.weapon.and_then(|data| data.ammo) {
        Some(_) if definition.proto == SMG => 30,
        Some(_) if definition.proto == RIFLE => 6,
        Some(_) => 12,
        None => 0,
    }
}
