//! Weapon choice with the sandbox's stock items.

use combat_ai::{AiContext, BehaviorRegistry, WeaponSelector};
use combat_core::{
    AreaAttackMode, BehaviorProfile, BestWeapon, CombatSettings, CombatantId, CombatantOracle,
    CombatantState, CombatantStats, HitLocation, HitMode, InventoryOracle, ItemId, ProfileId,
    ResourceMeter, TeamId,
};
use combat_sandbox::{Command, FixedRng, GridWorld, RecordingSink, presets};

const RAIDER: CombatantId = CombatantId(1);
const PLAYER: CombatantId = CombatantId::PLAYER;

fn registry(best_weapon: Option<BestWeapon>) -> BehaviorRegistry {
    let mut raider = BehaviorProfile::new("Raider", ProfileId(10));
    raider.best_weapon = best_weapon;
    BehaviorRegistry::new(vec![BehaviorProfile::new("Default", ProfileId(0)), raider]).unwrap()
}

/// Raider and player four tiles apart on open ground.
fn range() -> GridWorld {
    let mut world = GridWorld::new(20, 16);
    let (player_tile, raider_tile) = (world.tile(12, 8), world.tile(8, 8));
    world.add_combatant(CombatantState::new(PLAYER, TeamId::PLAYER, ProfileId(0), player_tile));
    world.add_combatant(CombatantState::new(RAIDER, TeamId(1), ProfileId(10), raider_tile));
    world
}

#[test]
fn selection_ignores_argument_order() {
    let preferences = [
        None,
        Some(BestWeapon::NoPref),
        Some(BestWeapon::Melee),
        Some(BestWeapon::MeleeOverRanged),
        Some(BestWeapon::RangedOverMelee),
        Some(BestWeapon::Ranged),
        Some(BestWeapon::Unarmed),
        Some(BestWeapon::UnarmedOverThrown),
        Some(BestWeapon::Random),
    ];
    let mut world = range();
    let mut arsenal: Vec<Option<ItemId>> = vec![None];
    for definition in [
        presets::pistol(),
        presets::rifle(),
        presets::smg(),
        presets::knife(),
        presets::grenade(),
        presets::flare(),
    ] {
        arsenal.push(Some(world.give(RAIDER, definition)));
    }

    let settings = CombatSettings::new();
    let (rng, sink) = (FixedRng(0), RecordingSink::new());
    for preference in preferences {
        let registry = registry(preference);
        let ctx = AiContext::new(&registry, &settings, &rng, &sink);
        for first in &arsenal {
            for second in &arsenal {
                let forward =
                    WeaponSelector::select(&ctx, &world, RAIDER, *first, *second, Some(PLAYER));
                let backward =
                    WeaponSelector::select(&ctx, &world, RAIDER, *second, *first, Some(PLAYER));
                assert_eq!(
                    forward, backward,
                    "{preference:?}: {first:?} vs {second:?}"
                );
            }
        }
    }
}

#[test]
fn equal_damage_goes_to_the_pricier_gun() {
    let mut world = range();
    let pistol = world.give(RAIDER, presets::pistol());
    let smg = world.give(RAIDER, presets::smg());
    let rifle = world.give(RAIDER, presets::rifle());
    let registry = registry(None);
    let settings = CombatSettings::new();
    let (rng, sink) = (FixedRng(0), RecordingSink::new());
    let ctx = AiContext::new(&registry, &settings, &rng, &sink);

    let pick = |a, b| WeaponSelector::select(&ctx, &world, RAIDER, Some(a), Some(b), Some(PLAYER));
    assert_eq!(pick(pistol, smg), Some(smg));
    assert_eq!(pick(pistol, rifle), Some(rifle));
}

#[test]
fn class_preference_and_its_damage_override() {
    let mut world = range();
    let pistol = world.give(RAIDER, presets::pistol());
    let rifle = world.give(RAIDER, presets::rifle());
    let knife = world.give(RAIDER, presets::knife());
    let grenade = world.give(RAIDER, presets::grenade());
    let settings = CombatSettings::new();
    let (rng, sink) = (FixedRng(0), RecordingSink::new());

    let choose = |preference, a, b| {
        let registry = registry(preference);
        let ctx = AiContext::new(&registry, &settings, &rng, &sink);
        WeaponSelector::select(&ctx, &world, RAIDER, Some(a), Some(b), Some(PLAYER))
    };

    assert_eq!(choose(Some(BestWeapon::MeleeOverRanged), knife, rifle), Some(knife));
    assert_eq!(choose(None, knife, rifle), Some(rifle));
    // The grenade outscores the pistol by far more than the band.
    assert_eq!(choose(None, pistol, grenade), Some(grenade));
    assert_eq!(choose(Some(BestWeapon::RangedOverMelee), pistol, grenade), Some(pistol));
}

#[test]
fn draws_a_better_weapon_from_the_pack() {
    let mut world = range();
    let knife = world.equip(RAIDER, presets::knife());
    let rifle = world.give(RAIDER, presets::rifle());
    let settings = CombatSettings::new();
    let (rng, sink) = (FixedRng(0), RecordingSink::new());

    let brawler = registry(Some(BestWeapon::MeleeOverRanged));
    let ctx = AiContext::new(&brawler, &settings, &rng, &sink);
    let kept = WeaponSelector::ensure_best_weapon(&ctx, &mut world, RAIDER, PLAYER).unwrap();
    assert_eq!(kept, Some(knife));
    assert!(world.commands().is_empty());

    let shooter = registry(None);
    let ctx = AiContext::new(&shooter, &settings, &rng, &sink);
    let drawn = WeaponSelector::ensure_best_weapon(&ctx, &mut world, RAIDER, PLAYER).unwrap();
    assert_eq!(drawn, Some(rifle));
    assert_eq!(world.wielded(RAIDER), Some(rifle));
    assert_eq!(
        world.commands(),
        &[Command::Wield {
            critter: RAIDER,
            item: rifle
        }]
    );
}

#[test]
fn a_drawn_flare_is_lit_at_once() {
    let mut world = range();
    world.equip(RAIDER, presets::pistol());
    let flare = world.give(RAIDER, presets::flare());
    let registry = registry(None);
    let settings = CombatSettings::new();
    let (rng, sink) = (FixedRng(0), RecordingSink::new());
    let ctx = AiContext::new(&registry, &settings, &rng, &sink);

    let drawn = WeaponSelector::ensure_best_weapon(&ctx, &mut world, RAIDER, PLAYER).unwrap();

    assert_eq!(drawn, Some(flare));
    assert!(world.commands().contains(&Command::UseItem {
        critter: RAIDER,
        item: flare
    }));
    assert_eq!(world.wielded(RAIDER), None);
}

/// `FixedRng(99)` fails the coin flip that would throw the knife away.
#[test]
fn empty_gun_is_swapped_for_a_knife_then_fists() {
    let mut world = range();
    let pistol = world.equip(RAIDER, presets::pistol());
    world.set_ammo(pistol, 0, 12);
    let knife = world.give(RAIDER, presets::knife());
    let registry = registry(None);
    let settings = CombatSettings::new();
    let (rng, sink) = (FixedRng(99), RecordingSink::new());
    let ctx = AiContext::new(&registry, &settings, &rng, &sink);

    let mode = WeaponSelector::switch_weapons(&ctx, &mut world, RAIDER, PLAYER).unwrap();
    assert_eq!(mode, HitMode::Primary);
    assert_eq!(world.wielded(RAIDER), Some(knife));

    let mut unarmed = range();
    let pistol = unarmed.equip(RAIDER, presets::pistol());
    unarmed.set_ammo(pistol, 0, 12);
    let mode = WeaponSelector::switch_weapons(&ctx, &mut unarmed, RAIDER, PLAYER).unwrap();
    assert_eq!(mode, HitMode::Punch);
    assert_eq!(unarmed.wielded(RAIDER), None);
}

fn area_registry(mode: Option<AreaAttackMode>) -> BehaviorRegistry {
    let mut raider = BehaviorProfile::new("Raider", ProfileId(10));
    raider.area_attack_mode = mode;
    BehaviorRegistry::new(vec![BehaviorProfile::new("Default", ProfileId(0)), raider]).unwrap()
}

/// The SMG bursts at 44% from four tiles, well short of the "be sure" bar.
#[test]
fn burst_fire_follows_the_area_attack_policy() {
    let mut world = range();
    let settings = CombatSettings::new();
    let (rng, sink) = (FixedRng(0), RecordingSink::new());
    let mode_with = |world: &GridWorld, policy| {
        let registry = area_registry(policy);
        let ctx = AiContext::new(&registry, &settings, &rng, &sink);
        WeaponSelector::pick_hit_mode(&ctx, world, RAIDER, PLAYER)
    };

    assert_eq!(mode_with(&world, None), HitMode::Punch);
    world.equip(RAIDER, presets::pistol());
    assert_eq!(mode_with(&world, Some(AreaAttackMode::Always)), HitMode::Primary);

    let mut world = range();
    world.equip(RAIDER, presets::smg());
    assert_eq!(mode_with(&world, Some(AreaAttackMode::Always)), HitMode::Secondary);
    assert_eq!(mode_with(&world, Some(AreaAttackMode::BeSure)), HitMode::Primary);

    world.set_skill(RAIDER, 150);
    assert_eq!(mode_with(&world, Some(AreaAttackMode::BeSure)), HitMode::Secondary);

    // A burst costs 5 AP.
    world.combatant_mut(RAIDER).unwrap().ap = ResourceMeter::new(4, 8);
    assert_eq!(mode_with(&world, Some(AreaAttackMode::Always)), HitMode::Primary);
}

/// `FixedRng(0)` always rolls the head: 40 points off the hit chance.
#[test]
fn called_shot_falls_back_to_the_torso_when_too_hard() {
    let mut world = range();
    world.equip(RAIDER, presets::pistol());
    world.combatant_mut(RAIDER).unwrap().stats = CombatantStats {
        intelligence: 5,
        ..CombatantStats::default()
    };
    let registry = registry(None);
    let settings = CombatSettings::new();
    let (rng, sink) = (FixedRng(0), RecordingSink::new());
    let ctx = AiContext::new(&registry, &settings, &rng, &sink);
    let aim = |world: &GridWorld| {
        WeaponSelector::called_shot(&ctx, world, RAIDER, PLAYER, HitMode::Primary)
    };

    // 60 - 16 - 40 leaves 4%, under the profile's 30% floor.
    assert_eq!(aim(&world), HitLocation::Torso);

    world.set_skill(RAIDER, 100);
    assert_eq!(aim(&world), HitLocation::Head);

    // An aimed pistol shot costs 5 AP.
    world.combatant_mut(RAIDER).unwrap().ap = ResourceMeter::new(4, 8);
    assert_eq!(aim(&world), HitLocation::Torso);

    world.combatant_mut(RAIDER).unwrap().ap = ResourceMeter::new(8, 8);
    world.combatant_mut(RAIDER).unwrap().stats.intelligence = 4;
    assert_eq!(aim(&world), HitLocation::Torso);
}
