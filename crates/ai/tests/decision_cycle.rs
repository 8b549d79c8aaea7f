//! Single decision cycles against the sandbox world.
//!
//! Every scenario starts from the same standoff: a raider at (8, 8) that
//! the player, four tiles east, has already shot at.

use combat_ai::{
    AiContext, BehaviorRegistry, CombatRoster, Encounter, MoraleState, Positioner,
    ResourceManager, TargetSelector, WorldExt,
};
use combat_core::{
    AttackWho, BehaviorProfile, ChemUse, CombatSettings, CombatantId, CombatantOracle,
    CombatantState, CombatantStats, DamageFlags, DistancePref, HitLocation, InventoryOracle,
    ItemKind, MessageKind, MessageRange, ProfileId, ResourceMeter, RunAwayMode, SpatialOracle,
    TeamId,
};
use combat_sandbox::{Command, FixedRng, GridWorld, RecordingSink, presets};

const RAIDER: CombatantId = CombatantId(1);
const PLAYER: CombatantId = CombatantId::PLAYER;

fn raider_profile() -> BehaviorProfile {
    BehaviorProfile::new("Raider", ProfileId(10))
}

fn registry(raider: BehaviorProfile) -> BehaviorRegistry {
    BehaviorRegistry::new(vec![BehaviorProfile::new("Default", ProfileId(0)), raider]).unwrap()
}

/// Intelligence 4 keeps the raider from aiming at body parts, so every
/// attack goes for the torso.
fn standoff() -> GridWorld {
    let mut world = GridWorld::new(20, 16);
    let player = CombatantState::new(PLAYER, TeamId::PLAYER, ProfileId(0), world.tile(12, 8));
    let mut raider = CombatantState::new(RAIDER, TeamId(1), ProfileId(10), world.tile(8, 8))
        .with_stats(CombatantStats {
            intelligence: 4,
            ..CombatantStats::default()
        });
    raider.who_hit_me = Some(PLAYER);
    world.add_combatant(player);
    world.add_combatant(raider);
    world
}

fn place(world: &mut GridWorld, id: CombatantId, team: TeamId, (q, r): (i32, i32)) {
    let tile = world.tile(q, r);
    world.add_combatant(CombatantState::new(id, team, ProfileId(10), tile));
}

fn wound(world: &mut GridWorld, id: CombatantId, current: u32, maximum: u32) {
    world.combatant_mut(id).unwrap().hp = ResourceMeter::new(current, maximum);
}

fn attacks(world: &GridWorld) -> usize {
    world
        .commands()
        .iter()
        .filter(|command| matches!(command, Command::Attack { .. }))
        .count()
}

// ============================================================================
// Morale
// ============================================================================

#[test]
fn below_min_hp_runs_from_the_threat_and_taunts() {
    let mut profile = raider_profile();
    profile.min_hp = 10;
    profile.chance = 100;
    profile.taunts.run = MessageRange::new(100, 102);
    let registry = registry(profile);
    let settings = CombatSettings::new();
    let (rng, sink) = (FixedRng(0), RecordingSink::new());
    let mut world = standoff();
    wound(&mut world, RAIDER, 5, 30);

    let mut encounter = Encounter::new(AiContext::new(&registry, &settings, &rng, &sink));
    encounter.begin([PLAYER, RAIDER]);
    let report = encounter.take_turn(&mut world, RAIDER);

    assert_eq!(report.morale, MoraleState::Fleeing);
    assert_eq!(report.attacks, 0);
    assert_eq!(report.steps, 8);
    assert!(world.combatant(RAIDER).unwrap().is_fleeing());
    assert_eq!(world.distance_between(RAIDER, PLAYER), Some(12));
    assert_eq!(attacks(&world), 0);

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, MessageKind::Run);
    assert_eq!(events[0].message_id, 100);
}

#[test]
fn bleeding_bucket_raises_the_flee_threshold() {
    let mut registry = registry(raider_profile());
    let mut world = standoff();
    wound(&mut world, RAIDER, 29, 50);

    let raider = world.combatant(RAIDER).unwrap();
    registry.set_run_away_mode(raider, 2).unwrap();
    assert_eq!(registry.run_away_mode(raider), Some(RunAwayMode::Bleeding));
    assert_eq!(registry.get(ProfileId(10)).min_hp, 30);
    assert!(registry.set_run_away_mode(raider, 6).is_err());

    let settings = CombatSettings::new();
    let (rng, sink) = (FixedRng(0), RecordingSink::new());
    let mut encounter = Encounter::new(AiContext::new(&registry, &settings, &rng, &sink));
    encounter.begin([PLAYER, RAIDER]);
    let report = encounter.take_turn(&mut world, RAIDER);

    assert_eq!(report.morale, MoraleState::Fleeing);
    assert_eq!(attacks(&world), 0);
}

// ============================================================================
// Attacking
// ============================================================================

#[test]
fn without_action_points_nothing_happens() {
    let mut profile = raider_profile();
    profile.chance = 100;
    profile.taunts.attack = MessageRange::new(105, 107);
    let registry = registry(profile);
    let settings = CombatSettings::new();
    let (rng, sink) = (FixedRng(0), RecordingSink::new());
    let mut world = standoff();
    world.equip(RAIDER, presets::pistol());
    world.combatant_mut(RAIDER).unwrap().ap = ResourceMeter::new(0, 8);

    let mut encounter = Encounter::new(AiContext::new(&registry, &settings, &rng, &sink));
    encounter.begin([PLAYER, RAIDER]);
    let report = encounter.take_turn(&mut world, RAIDER);

    assert_eq!(report.target, Some(PLAYER));
    assert_eq!((report.attacks, report.steps, report.doses), (0, 0, 0));
    assert!(world.commands().is_empty());
    assert!(sink.is_empty());
}

/// Skill 60 at four tiles gives a 44% shot. The sandbox rolls 11 and then
/// 48, so the first shot lands and the second misses.
#[test]
fn shoots_until_action_points_run_out() {
    let mut profile = raider_profile();
    profile.chance = 100;
    profile.taunts.attack = MessageRange::new(105, 107);
    profile.taunts.miss = MessageRange::new(108, 109);
    profile.taunts.hit[HitLocation::Torso.message_slot()] = MessageRange::new(113, 113);
    let registry = registry(profile);
    let settings = CombatSettings::new();
    let (rng, sink) = (FixedRng(0), RecordingSink::new());
    let mut world = standoff();
    let pistol = world.equip(RAIDER, presets::pistol());

    let mut encounter = Encounter::new(AiContext::new(&registry, &settings, &rng, &sink));
    encounter.begin([PLAYER, RAIDER]);
    let report = encounter.take_turn(&mut world, RAIDER);

    assert_eq!(report.target, Some(PLAYER));
    assert_eq!(report.morale, MoraleState::Engaged);
    assert_eq!((report.attacks, report.attempts), (2, 2));
    assert_eq!(world.ap_of(RAIDER), 0);
    assert_eq!(world.hp_of(PLAYER), 22);
    assert_eq!(world.ammo(pistol).loaded, 10);

    let hits: Vec<bool> = world
        .commands()
        .iter()
        .filter_map(|command| match command {
            Command::Attack { hit, .. } => Some(*hit),
            _ => None,
        })
        .collect();
    assert_eq!(hits, vec![true, false]);

    let raider = world.combatant(RAIDER).unwrap();
    assert_eq!(raider.memory.last_target, Some(PLAYER));
    assert_eq!(world.combatant(PLAYER).unwrap().who_hit_me, Some(RAIDER));

    let kinds: Vec<MessageKind> = sink.events().iter().map(|event| event.kind).collect();
    assert_eq!(
        kinds,
        vec![
            MessageKind::Attack,
            MessageKind::Hit(HitLocation::Torso),
            MessageKind::Attack,
            MessageKind::Miss,
        ]
    );
}

#[test]
fn empty_magazine_reloads_from_the_pack() {
    let registry = registry(raider_profile());
    let settings = CombatSettings::new();
    let (rng, sink) = (FixedRng(0), RecordingSink::new());
    let mut world = standoff();
    let pistol = world.equip(RAIDER, presets::pistol());
    world.give(RAIDER, presets::pistol_ammo());
    world.set_ammo(pistol, 0, 12);

    let mut encounter = Encounter::new(AiContext::new(&registry, &settings, &rng, &sink));
    encounter.begin([PLAYER, RAIDER]);
    let report = encounter.take_turn(&mut world, RAIDER);

    assert!(matches!(
        world.commands().first(),
        Some(Command::Reload { rounds: 12, .. })
    ));
    assert_eq!(report.attacks, 1);
    assert_eq!(world.ammo(pistol).loaded, 11);
    assert_eq!(world.ap_of(RAIDER), 2);
}

// ============================================================================
// Targeting
// ============================================================================

#[test]
fn whomever_attacking_me_keeps_its_last_target() {
    let mut profile = raider_profile();
    profile.attack_who = Some(AttackWho::WhomeverAttackingMe);
    let registry = registry(profile);
    let settings = CombatSettings::new();
    let (rng, sink) = (FixedRng(0), RecordingSink::new());
    let mut world = standoff();
    world.equip(RAIDER, presets::pistol());
    let guard = CombatantId(2);
    place(&mut world, guard, TeamId::PLAYER, (9, 10));
    world.combatant_mut(RAIDER).unwrap().memory.last_target = Some(guard);
    world.combatant_mut(PLAYER).unwrap().memory.last_target = Some(RAIDER);

    let mut encounter = Encounter::new(AiContext::new(&registry, &settings, &rng, &sink));
    encounter.begin([PLAYER, RAIDER, guard]);
    let select = |world: &GridWorld| {
        TargetSelector::select(encounter.context(), encounter.roster(), world, RAIDER)
    };

    assert_eq!(select(&world), Some(guard));

    world.combatant_mut(guard).unwrap().damage.insert(DamageFlags::DEAD);
    assert_eq!(select(&world), Some(PLAYER));
}

/// Only party members rank targets. Everyone else answers whoever hit
/// them, whatever the profile says.
#[test]
fn ranking_by_strength_is_for_party_members() {
    let mut profile = raider_profile();
    profile.attack_who = Some(AttackWho::Strongest);
    let registry = registry(profile);
    let settings = CombatSettings::new();
    let (rng, sink) = (FixedRng(0), RecordingSink::new());
    let mut world = standoff();
    world.equip(RAIDER, presets::pistol());
    let guard = CombatantId(2);
    place(&mut world, guard, TeamId::PLAYER, (9, 8));
    world.equip(guard, presets::rifle());
    world.combatant_mut(guard).unwrap().memory.last_target = Some(RAIDER);
    world.combatant_mut(PLAYER).unwrap().memory.last_target = Some(RAIDER);

    let mut encounter = Encounter::new(AiContext::new(&registry, &settings, &rng, &sink));
    encounter.begin([PLAYER, RAIDER, guard]);
    let select = |world: &GridWorld| {
        TargetSelector::select(encounter.context(), encounter.roster(), world, RAIDER)
    };

    assert_eq!(select(&world), Some(PLAYER));

    world.combatant_mut(RAIDER).unwrap().party_member = true;
    assert_eq!(select(&world), Some(guard));

    let report = encounter.take_turn(&mut world, RAIDER);
    assert_eq!(report.target, Some(guard));
    assert_eq!(world.combatant(RAIDER).unwrap().who_hit_me, None);
}

/// A stronger teammate is firing along row 8; the planned tile sits on that
/// line and one of the two side-steps is taken.
#[test]
fn retargeting_steps_out_of_the_line_of_fire_onto_a_free_tile() {
    let registry = registry(raider_profile());
    let settings = CombatSettings::new();
    let (rng, sink) = (FixedRng(0), RecordingSink::new());
    let mut world = GridWorld::new(20, 16);
    let shooter = CombatantId(3);
    let blocker = CombatantId(4);
    place(&mut world, PLAYER, TeamId::PLAYER, (14, 8));
    place(&mut world, RAIDER, TeamId(1), (11, 10));
    place(&mut world, shooter, TeamId(1), (8, 8));
    place(&mut world, blocker, TeamId(1), (11, 9));
    world.equip(shooter, presets::rifle());
    world.combatant_mut(shooter).unwrap().memory.last_target = Some(PLAYER);

    let mut encounter = Encounter::new(AiContext::new(&registry, &settings, &rng, &sink));
    encounter.begin([PLAYER, RAIDER, shooter, blocker]);
    let planned = world.tile(11, 8);

    let tile = Positioner::retarget_tile(encounter.roster(), &world, RAIDER, PLAYER, planned);
    assert_eq!(tile, world.tile(12, 7));
    assert!(!world.is_tile_blocked(tile));

    let second_blocker = CombatantId(5);
    place(&mut world, second_blocker, TeamId(1), (12, 7));
    encounter.add_combatant(second_blocker);
    let tile = Positioner::retarget_tile(encounter.roster(), &world, RAIDER, PLAYER, planned);
    assert_eq!(tile, planned);
}

// ============================================================================
// Positioning
// ============================================================================

fn move_with(world: &mut GridWorld, preference: DistancePref, target: Option<CombatantId>) -> u32 {
    let mut profile = raider_profile();
    profile.distance = Some(preference);
    let registry = registry(profile);
    let settings = CombatSettings::new();
    let (rng, sink) = (FixedRng(0), RecordingSink::new());
    let ctx = AiContext::new(&registry, &settings, &rng, &sink);
    let roster: CombatRoster = world.combatant_ids().into_iter().collect();
    Positioner::apply_distance_preference(&ctx, &roster, world, RAIDER, target).unwrap()
}

#[test]
fn charging_closes_to_melee_range() {
    let mut world = standoff();

    assert_eq!(move_with(&mut world, DistancePref::Charge, None), 0);
    assert_eq!(move_with(&mut world, DistancePref::Charge, Some(PLAYER)), 3);
    assert_eq!(world.distance_between(RAIDER, PLAYER), Some(1));
    assert_eq!(world.ap_of(RAIDER), 5);
}

#[test]
fn snipers_back_off_from_stronger_targets() {
    let mut world = standoff();
    world.equip(RAIDER, presets::pistol());
    assert_eq!(move_with(&mut world, DistancePref::Snipe, Some(PLAYER)), 0);

    world.equip(PLAYER, presets::rifle());
    assert_eq!(move_with(&mut world, DistancePref::Snipe, Some(PLAYER)), 6);
    assert_eq!(world.distance_between(RAIDER, PLAYER), Some(10));

    // Far enough already.
    assert_eq!(move_with(&mut world, DistancePref::Snipe, Some(PLAYER)), 0);
}

#[test]
fn companions_stay_within_five_tiles_of_the_player() {
    let mut world = standoff();
    let far = world.tile(3, 8);
    world.combatant_mut(RAIDER).unwrap().tile = far;

    assert_eq!(move_with(&mut world, DistancePref::StayClose, None), 0);
    assert_eq!(world.distance_between(RAIDER, PLAYER), Some(9));

    world.combatant_mut(RAIDER).unwrap().party_member = true;
    assert_eq!(move_with(&mut world, DistancePref::StayClose, None), 4);
    assert_eq!(world.distance_between(RAIDER, PLAYER), Some(5));

    assert_eq!(move_with(&mut world, DistancePref::StayClose, None), 0);
}

// ============================================================================
// Drugs
// ============================================================================

/// Only drugs and misc items are worth going back for.
#[test]
fn remembered_ammo_is_not_a_drug_errand() {
    let mut profile = raider_profile();
    profile.chem_use = Some(ChemUse::StimsWhenHurtLittle);
    let registry = registry(profile);
    let settings = CombatSettings::new();
    let (rng, sink) = (FixedRng(0), RecordingSink::new());
    let mut world = standoff();
    let ammo = world.drop_item(world.tile(7, 8), presets::pistol_ammo());
    world.combatant_mut(RAIDER).unwrap().memory.last_item = Some(ammo);

    let ctx = AiContext::new(&registry, &settings, &rng, &sink);
    let outcome = ResourceManager::check_drugs(&ctx, &mut world, RAIDER).unwrap();

    assert_eq!(outcome.doses, 0);
    assert!(!outcome.needs_drugs);
    assert_eq!(world.ap_of(RAIDER), 8);
    assert!(world.commands().is_empty());
}

#[test]
fn clean_profile_never_touches_drugs() {
    let mut profile = raider_profile();
    profile.chem_use = Some(ChemUse::Clean);
    let registry = registry(profile);
    let settings = CombatSettings::new();
    let (rng, sink) = (FixedRng(0), RecordingSink::new());
    let mut world = standoff();
    wound(&mut world, RAIDER, 5, 30);
    let stim = world.give(RAIDER, presets::stimpak());

    let ctx = AiContext::new(&registry, &settings, &rng, &sink);
    let outcome = ResourceManager::check_drugs(&ctx, &mut world, RAIDER).unwrap();

    assert_eq!(outcome.doses, 0);
    assert!(!outcome.needs_drugs);
    assert_eq!(world.inventory(RAIDER, ItemKind::Drug), vec![stim]);
    assert_eq!(world.ap_of(RAIDER), 8);
}

#[test]
fn heals_with_carried_stimpaks_until_out() {
    let mut profile = raider_profile();
    profile.chem_use = Some(ChemUse::StimsWhenHurtLittle);
    let registry = registry(profile);
    let settings = CombatSettings::new();
    let (rng, sink) = (FixedRng(0), RecordingSink::new());
    let mut world = standoff();
    wound(&mut world, RAIDER, 5, 30);
    world.give(RAIDER, presets::stimpak());
    world.give(RAIDER, presets::stimpak());

    let ctx = AiContext::new(&registry, &settings, &rng, &sink);
    let outcome = ResourceManager::check_drugs(&ctx, &mut world, RAIDER).unwrap();

    assert_eq!(outcome.doses, 2);
    assert!(!outcome.needs_drugs);
    assert_eq!(world.hp_of(RAIDER), 25);
    assert_eq!(world.ap_of(RAIDER), 4);
    assert!(world.inventory(RAIDER, ItemKind::Drug).is_empty());
}

#[test]
fn scavenges_a_stimpak_from_the_floor() {
    let mut profile = raider_profile();
    profile.chem_use = Some(ChemUse::StimsWhenHurtLittle);
    let registry = registry(profile);
    let settings = CombatSettings::new();
    let (rng, sink) = (FixedRng(0), RecordingSink::new());
    let mut world = standoff();
    wound(&mut world, RAIDER, 5, 30);
    let stim = world.drop_item(world.tile(6, 8), presets::stimpak());

    let ctx = AiContext::new(&registry, &settings, &rng, &sink);
    let outcome = ResourceManager::check_drugs(&ctx, &mut world, RAIDER).unwrap();

    assert_eq!(outcome.doses, 1);
    assert_eq!(world.hp_of(RAIDER), 15);
    assert!(world.commands().contains(&Command::PickUp {
        critter: RAIDER,
        item: stim
    }));
    assert!(world.commands().contains(&Command::TakeDrug {
        critter: RAIDER,
        drug: stim
    }));
    assert_eq!(world.combatant(RAIDER).unwrap().memory.last_item, None);
}

#[test]
fn hurt_with_nothing_to_take_flees() {
    let mut profile = raider_profile();
    profile.chem_use = Some(ChemUse::StimsWhenHurtLittle);
    let registry = registry(profile);
    let settings = CombatSettings::new();
    let (rng, sink) = (FixedRng(0), RecordingSink::new());
    let mut world = standoff();
    wound(&mut world, RAIDER, 10, 30);
    world.equip(RAIDER, presets::pistol());

    let mut encounter = Encounter::new(AiContext::new(&registry, &settings, &rng, &sink));
    encounter.begin([PLAYER, RAIDER]);
    let report = encounter.take_turn(&mut world, RAIDER);

    assert_eq!(report.morale, MoraleState::Fleeing);
    assert_eq!(report.doses, 0);
    assert_eq!(attacks(&world), 0);
    assert!(world.distance_between(RAIDER, PLAYER).unwrap() > 4);
}
