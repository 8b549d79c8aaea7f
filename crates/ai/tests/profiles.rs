//! Profile lookup, runtime setters and save overrides over the bundled
//! content.

use combat_ai::BehaviorRegistry;
use combat_content::{ContentFactory, OverrideCodec};
use combat_core::{
    AttackWho, CombatantId, CombatantState, Disposition, DistancePref, ProfileId, RunAwayMode,
    TeamId, Tile,
};

const DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../combat/content/data");
const DOGMEAT: ProfileId = ProfileId(1600);

fn bundled() -> BehaviorRegistry {
    let profiles = ContentFactory::new(DATA_DIR).load_profiles().unwrap();
    BehaviorRegistry::new(profiles).unwrap()
}

fn dogmeat() -> CombatantState {
    CombatantState::new(CombatantId(7), TeamId::PLAYER, DOGMEAT, Tile(0)).in_party()
}

#[test]
fn unknown_packet_uses_the_first_section() {
    let registry = bundled();
    let stray = CombatantState::new(CombatantId(3), TeamId(4), ProfileId(999), Tile(0));

    let profile = registry.for_combatant(&stray);
    assert_eq!(profile.id, ProfileId(0));
    assert_eq!(profile.name, "Generic Critter");
    assert_eq!(registry.fallback().id, ProfileId(0));
    assert_eq!(registry.get(ProfileId(10)).name, "Raider Brute");
}

#[test]
fn disposition_walks_the_companion_tiers() {
    let registry = bundled();
    let mut dog = dogmeat();

    registry
        .set_disposition(&mut dog, Disposition::Berserk as i32)
        .unwrap();
    assert_eq!(dog.profile, ProfileId(1596));
    assert_eq!(registry.distance(&dog), Some(DistancePref::Charge));

    registry
        .set_disposition(&mut dog, Disposition::Coward as i32)
        .unwrap();
    assert_eq!(dog.profile, ProfileId(1599));
    assert_eq!(registry.disposition(&dog), Some(Disposition::Coward));
}

#[test]
fn custom_tier_edits_survive_a_save() {
    let mut registry = bundled();
    let dog = dogmeat().with_hp(40, 40);
    registry
        .set_attack_who(&dog, AttackWho::Strongest as i32)
        .unwrap();
    registry.set_run_away_mode(&dog, RunAwayMode::Coward as i32).unwrap();
    registry
        .set_distance(&dog, DistancePref::OnYourOwn as i32)
        .unwrap();
    let edited = registry.get(DOGMEAT).clone();

    let party = [DOGMEAT, ProfileId(1598)];
    let records = registry.party_overrides(&party);
    assert_eq!(records.len(), 1);
    let bytes = OverrideCodec::encode(&records).unwrap();
    assert_eq!(bytes.len(), OverrideCodec::RECORD_LEN);

    let mut restored = bundled();
    assert_ne!(restored.get(DOGMEAT), &edited);
    let decoded = OverrideCodec::decode(&bytes, records.len()).unwrap();
    assert_eq!(restored.apply_overrides(&decoded), 1);

    let profile = restored.get(DOGMEAT);
    assert_eq!(profile.attack_who, Some(AttackWho::Strongest));
    assert_eq!(profile.run_away_mode, Some(RunAwayMode::Coward));
    assert_eq!(profile.min_hp, 40);
    assert_eq!(profile.distance, Some(DistancePref::OnYourOwn));
    assert_eq!(profile, &edited);
}
