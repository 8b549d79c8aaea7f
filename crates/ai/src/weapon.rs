//! Weapon & Attack-Mode Selector.
//!
//! [`WeaponSelector::select`] compares two candidates, where `None` stands
//! for bare hands. The comparison is symmetric: candidates are put in a
//! canonical order first, so swapping the arguments never changes the
//! outcome for a fixed world state.

use std::cmp::Ordering;

use combat_core::{
    AreaAttackMode, AttackIntent, AttackType, BehaviorProfile, BestWeapon, CombatConfig, CombatantId,
    HitLocation, HitMode, ItemId, ItemKind, WeaponSafety, World,
};

use crate::context::{AiContext, WorldExt};
use crate::error::{Infeasible, PlanResult};
use crate::resources::ResourceManager;

pub struct WeaponSelector;

/// What the comparison needs to know about one candidate.
#[derive(Clone, Copy, Debug)]
struct Candidate {
    item: Option<ItemId>,
    class: Option<AttackType>,
    score: i32,
    cost: i32,
    natural: bool,
    light: bool,
    safe: bool,
}

impl WeaponSelector {
    /// Whether `id` can attack with `weapon` in `mode` at all.
    ///
    /// Checks arm injuries against handedness, the attack animation, the
    /// profile's minimum skill, and the profile's weapon-class preference.
    pub fn can_use_weapon<W: World + ?Sized>(
        ctx: &AiContext<'_>,
        world: &W,
        id: CombatantId,
        weapon: ItemId,
        mode: HitMode,
    ) -> bool {
        let Some(me) = world.combatant(id) else {
            return false;
        };
        let Some(definition) = world.definition(weapon) else {
            return false;
        };
        let Some(data) = definition.weapon else {
            return false;
        };

        if me.damage.both_arms_crippled() {
            return false;
        }
        if me.damage.any_arm_crippled() && definition.is_two_handed() {
            return false;
        }
        if !world.has_attack_animation(id, weapon, mode) {
            return false;
        }

        let profile = ctx.profile(me);
        if world.skill_for(id, weapon, mode) < profile.min_to_hit {
            return false;
        }
        accepts_class(profile, data.primary)
    }

    /// Expected worth of a weapon against `defender`.
    ///
    /// Average damage, times the bodies an area attack would catch, doubled
    /// for a special perk. Bare hands score the attacker's melee damage.
    pub fn score<W: World + ?Sized>(
        world: &W,
        attacker: CombatantId,
        weapon: Option<ItemId>,
        defender: Option<CombatantId>,
    ) -> i32 {
        let Some(weapon) = weapon else {
            return world
                .combatant(attacker)
                .map_or(0, |state| state.stats.melee_damage);
        };
        let Some(data) = world.definition(weapon).and_then(|definition| definition.weapon) else {
            return 0;
        };

        let mut score = data.average_damage();
        if data.is_area() {
            if let Some(defender) = defender {
                let extras = world.area_extra_targets(attacker, weapon, defender);
                score *= 1 + extras as i32;
            }
        }
        if data.special_perk {
            score *= 2;
        }
        score
    }

    /// Picks the better of two weapons for `attacker`, `None` meaning bare
    /// hands. Returns `None` when neither is usable against `defender`.
    pub fn select<W: World + ?Sized>(
        ctx: &AiContext<'_>,
        world: &W,
        attacker: CombatantId,
        first: Option<ItemId>,
        second: Option<ItemId>,
        defender: Option<CombatantId>,
    ) -> Option<ItemId> {
        let me = world.combatant(attacker)?;
        let profile = ctx.profile(me);
        if first == second {
            return first;
        }

        let (low, high) = if first <= second {
            (first, second)
        } else {
            (second, first)
        };

        if profile.best_weapon == Some(BestWeapon::Random) {
            return if ctx.chance(attacker, 50) { low } else { high };
        }

        let a = describe(world, attacker, low, defender);
        let b = describe(world, attacker, high, defender);
        let chosen = compare(profile, &a, &b);
        tracing::debug!(
            "{} weighs {:?} ({}) against {:?} ({}): {:?}",
            attacker,
            a.item,
            a.score,
            b.item,
            b.score,
            chosen
        );
        chosen
    }

    /// Best carried weapon other than the wielded one.
    ///
    /// With `affordable`, weapons costing more than the remaining action
    /// points are skipped. Ranged weapons that are empty with no matching
    /// ammunition carried are skipped.
    pub fn best_in_inventory<W: World + ?Sized>(
        ctx: &AiContext<'_>,
        world: &W,
        id: CombatantId,
        defender: Option<CombatantId>,
        affordable: bool,
    ) -> Option<ItemId> {
        let me = world.combatant(id)?;
        if !me.body.handles_items() {
            return None;
        }
        let wielded = world.wielded(id);

        let mut best = None;
        for weapon in world.inventory(id, ItemKind::Weapon) {
            if Some(weapon) == wielded {
                continue;
            }
            if affordable && world.weapon_cost(id, weapon, HitMode::Primary) > me.ap.current {
                continue;
            }
            if !Self::can_use_weapon(ctx, world, id, weapon, HitMode::Primary) {
                continue;
            }
            let ranged = world
                .definition(weapon)
                .and_then(|definition| definition.weapon)
                .is_some_and(|data| data.primary == AttackType::Ranged);
            if ranged
                && world.ammo(weapon).is_empty()
                && ResourceManager::carried_ammo(world, id, weapon).is_none()
            {
                continue;
            }

            best = match best {
                None => Some(weapon),
                Some(current) => Self::select(ctx, world, id, Some(current), Some(weapon), defender),
            };
        }
        best
    }

    /// Swaps the wielded weapon for a carried one when that compares better.
    ///
    /// Returns the weapon in hand afterwards. A freshly drawn light source
    /// is lit straight away by anyone bright enough to think of it.
    pub fn ensure_best_weapon<W: World + ?Sized>(
        ctx: &AiContext<'_>,
        world: &mut W,
        id: CombatantId,
        defender: CombatantId,
    ) -> PlanResult<Option<ItemId>> {
        let me = world.state(id)?.clone();
        if me.ap.is_empty() {
            return Err(Infeasible::OutOfActionPoints(id));
        }
        let current = world.wielded(id);
        let natural = current
            .and_then(|item| world.definition(item))
            .is_some_and(|definition| definition.is_natural());
        if natural {
            return Ok(current);
        }

        let Some(candidate) = Self::best_in_inventory(ctx, world, id, Some(defender), true) else {
            return Ok(current);
        };
        if Self::select(ctx, world, id, current, Some(candidate), Some(defender)) != Some(candidate) {
            return Ok(current);
        }

        if !world.wield(id, candidate) {
            return Ok(current);
        }
        tracing::debug!("{} draws {} over {:?}", id, candidate, current);
        Self::light_if_flare(world, id, candidate);
        Ok(Some(candidate))
    }

    /// Replaces an unusable weapon: the best affordable carried weapon,
    /// else one found nearby, else bare hands.
    ///
    /// Returns the hit mode to attack with, or
    /// [`Infeasible::OutOfActionPoints`] if even that cannot be afforded.
    pub fn switch_weapons<W: World + ?Sized>(
        ctx: &AiContext<'_>,
        world: &mut W,
        id: CombatantId,
        defender: CombatantId,
    ) -> PlanResult<HitMode> {
        let mut weapon = Self::best_in_inventory(ctx, world, id, Some(defender), true);
        if weapon.is_none() {
            if let Some(found) = ResourceManager::search_environment(ctx, world, id, ItemKind::Weapon)
            {
                weapon = ResourceManager::retrieve(world, id, found)?;
            }
        }

        let drawn = match weapon {
            Some(weapon) => world.wield(id, weapon).then_some(weapon),
            None => None,
        };
        let mode = match drawn {
            Some(weapon) => {
                tracing::debug!("{} switches to {}", id, weapon);
                Self::light_if_flare(world, id, weapon);
                Self::pick_hit_mode(ctx, world, id, defender)
            }
            None => {
                if world.wielded(id).is_some() {
                    world.unwield(id);
                }
                HitMode::Punch
            }
        };

        let ap = world.state(id)?.ap.current;
        if world.attack_cost(id, mode, false) <= ap {
            Ok(mode)
        } else {
            Err(Infeasible::OutOfActionPoints(id))
        }
    }

    /// Primary or secondary use of the wielded weapon; bare hands punch.
    pub fn pick_hit_mode<W: World + ?Sized>(
        ctx: &AiContext<'_>,
        world: &W,
        id: CombatantId,
        defender: CombatantId,
    ) -> HitMode {
        let Some(weapon) = world.wielded(id) else {
            return HitMode::Punch;
        };
        let Some(data) = world.definition(weapon).and_then(|definition| definition.weapon) else {
            return HitMode::Punch;
        };
        let Some(secondary) = data.secondary else {
            return HitMode::Primary;
        };
        if !Self::can_use_weapon(ctx, world, id, weapon, HitMode::Secondary) {
            return HitMode::Primary;
        }
        let Some(me) = world.combatant(id) else {
            return HitMode::Punch;
        };
        let profile = ctx.profile(me);
        let distance = world.distance_between(id, defender).unwrap_or(u32::MAX);

        let wanted = match profile.area_attack_mode {
            Some(AreaAttackMode::Always) => true,
            Some(AreaAttackMode::Sometimes) => ctx.one_in(id, profile.secondary_freq),
            Some(mode) => mode.hit_threshold().is_some_and(|threshold| {
                world.to_hit(id, defender, HitLocation::Torso, HitMode::Secondary)
                    >= threshold as i32
                    && world
                        .weapon_safety(id, weapon, HitMode::Secondary, defender)
                        .is_safe()
            }),
            None => {
                (me.stats.intelligence < CombatConfig::AREA_ATTACK_INTELLIGENCE
                    || distance < CombatConfig::AREA_ATTACK_DISTANCE)
                    && ctx.one_in(id, profile.secondary_freq)
            }
        };
        if !wanted || !accepts_class(profile, secondary) {
            return HitMode::Primary;
        }
        if world.attack_cost(id, HitMode::Secondary, false) > me.ap.current {
            return HitMode::Primary;
        }
        if world.attack_range(id, HitMode::Secondary) < distance {
            return HitMode::Primary;
        }

        if secondary == AttackType::Throw {
            let has_backup = Self::best_in_inventory(ctx, world, id, Some(defender), false).is_some();
            if !has_backup && !ctx.chance(id, throw_away_chance(me.stats.intelligence)) {
                return HitMode::Primary;
            }
        }
        HitMode::Secondary
    }

    /// Body location to aim for. Anything that rules out a called shot
    /// falls back to the torso without comment.
    pub fn called_shot<W: World + ?Sized>(
        ctx: &AiContext<'_>,
        world: &W,
        id: CombatantId,
        defender: CombatantId,
        mode: HitMode,
    ) -> HitLocation {
        let Some(me) = world.combatant(id) else {
            return HitLocation::Torso;
        };
        if world.attack_cost(id, mode, true) > me.ap.current {
            return HitLocation::Torso;
        }
        if !world.supports_called_shot(id, mode) {
            return HitLocation::Torso;
        }
        let profile = ctx.profile(me);
        if !ctx.one_in(id, profile.called_freq) {
            return HitLocation::Torso;
        }
        if me.stats.intelligence < ctx.settings.difficulty.called_shot_intelligence() {
            return HitLocation::Torso;
        }

        let location = HitLocation::from_roll(ctx.range(id, 0, HitLocation::SPECIFIC_COUNT as u32));
        if world.to_hit(id, defender, location, mode) < profile.min_to_hit {
            tracing::debug!("{} gives up aiming for {} at {}", id, location, defender);
            return HitLocation::Torso;
        }
        location
    }

    /// Packs the strike for the attack-resolution collaborator.
    pub fn plan_attack<W: World + ?Sized>(
        ctx: &AiContext<'_>,
        world: &W,
        id: CombatantId,
        defender: CombatantId,
        mode: HitMode,
    ) -> AttackIntent {
        let location = Self::called_shot(ctx, world, id, defender, mode);
        let weapon = match mode {
            HitMode::Punch => None,
            HitMode::Primary | HitMode::Secondary => world.wielded(id),
        };
        let Some(weapon) = weapon else {
            return AttackIntent::unarmed(defender).at(location);
        };

        let safe_distance = match world.weapon_safety(id, weapon, mode, defender) {
            WeaponSafety::Safe => None,
            WeaponSafety::Unsafe { distance } => Some(distance),
        };
        AttackIntent {
            target: defender,
            weapon: Some(weapon),
            mode,
            location,
            safe_distance,
        }
    }

    fn light_if_flare<W: World + ?Sized>(world: &mut W, id: CombatantId, item: ItemId) {
        let light = world
            .definition(item)
            .is_some_and(|definition| definition.is_light_source());
        let bright = world
            .combatant(id)
            .is_some_and(|state| state.stats.intelligence >= CombatConfig::MIN_ITEM_INTELLIGENCE);
        if light && bright && world.use_item(id, item) {
            tracing::debug!("{} lights {}", id, item);
        }
    }
}

/// A random preference takes any class; otherwise the class must appear in
/// the preference order.
fn accepts_class(profile: &BehaviorProfile, class: AttackType) -> bool {
    profile.best_weapon == Some(BestWeapon::Random) || profile.prefers(class)
}

/// Percent chance to throw a last thrown weapon anyway; duller combatants
/// part with it more readily.
fn throw_away_chance(intelligence: i32) -> u32 {
    ((10 - intelligence.clamp(0, 10)) * 10) as u32
}

fn describe<W: World + ?Sized>(
    world: &W,
    attacker: CombatantId,
    item: Option<ItemId>,
    defender: Option<CombatantId>,
) -> Candidate {
    let score = WeaponSelector::score(world, attacker, item, defender);
    let Some(weapon) = item else {
        let reach = world.punch_range(attacker);
        let in_reach = defender
            .and_then(|defender| world.distance_between(attacker, defender))
            .is_none_or(|distance| distance <= reach);
        return Candidate {
            item: None,
            class: in_reach.then_some(AttackType::Unarmed),
            score,
            cost: 0,
            natural: false,
            light: false,
            safe: true,
        };
    };

    let definition = world.definition(weapon);
    let safe = defender.is_none_or(|defender| {
        world
            .weapon_safety(attacker, weapon, HitMode::Primary, defender)
            .is_safe()
    });
    Candidate {
        item,
        class: definition
            .and_then(|definition| definition.weapon)
            .map(|data| data.primary),
        score,
        cost: definition.map_or(0, |definition| definition.cost),
        natural: definition.is_some_and(|definition| definition.is_natural()),
        light: definition.is_some_and(|definition| definition.is_light_source()),
        safe,
    }
}

/// `a` holds the lower item id (bare hands first).
fn compare(profile: &BehaviorProfile, a: &Candidate, b: &Candidate) -> Option<ItemId> {
    match (a.light, b.light) {
        (true, false) => return a.item,
        (false, true) => return b.item,
        _ => {}
    }
    match (a.natural, b.natural) {
        (true, false) => return a.item,
        (false, true) => return b.item,
        _ => {}
    }
    match (a.safe, b.safe) {
        (true, false) => return a.item,
        (false, true) => return b.item,
        (false, false) => return None,
        (true, true) => {}
    }

    let rank_a = a.class.and_then(|class| profile.preference_rank(class));
    let rank_b = b.class.and_then(|class| profile.preference_rank(class));
    let band = CombatConfig::WEAPON_SCORE_BAND;

    match (rank_a, rank_b) {
        (None, None) => None,
        (Some(_), None) => a.item,
        (None, Some(_)) => b.item,
        (Some(ra), Some(rb)) if ra != rb => {
            let (better, worse) = if ra < rb { (a, b) } else { (b, a) };
            if BestWeapon::damage_overrides_class(profile.best_weapon)
                && worse.score - better.score > band
            {
                worse.item
            } else {
                better.item
            }
        }
        (Some(_), Some(_)) => {
            if (a.score - b.score).abs() <= band {
                let order = a
                    .cost
                    .cmp(&b.cost)
                    .then(a.score.cmp(&b.score))
                    .then(Ordering::Greater);
                if order == Ordering::Greater { a.item } else { b.item }
            } else if a.score > b.score {
                a.item
            } else {
                b.item
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use combat_core::ProfileId;

    use super::*;

    fn candidate(item: u32, class: AttackType, score: i32, cost: i32) -> Candidate {
        Candidate {
            item: Some(ItemId(item)),
            class: Some(class),
            score,
            cost,
            natural: false,
            light: false,
            safe: true,
        }
    }

    fn profile(best_weapon: Option<BestWeapon>) -> BehaviorProfile {
        let mut profile = BehaviorProfile::new("Tester", ProfileId(0));
        profile.best_weapon = best_weapon;
        profile
    }

    #[test]
    fn close_scores_prefer_the_valuable_item() {
        let profile = profile(None);
        let cheap = candidate(1, AttackType::Ranged, 14, 100);
        let pricey = candidate(2, AttackType::Ranged, 10, 900);
        assert_eq!(compare(&profile, &cheap, &pricey), Some(ItemId(2)));
    }

    #[test]
    fn clear_score_gap_wins_within_a_class() {
        let profile = profile(None);
        let strong = candidate(1, AttackType::Ranged, 20, 100);
        let pricey = candidate(2, AttackType::Ranged, 10, 900);
        assert_eq!(compare(&profile, &strong, &pricey), Some(ItemId(1)));
    }

    #[test]
    fn class_order_beats_score_unless_damage_overrides() {
        let strict = profile(Some(BestWeapon::MeleeOverRanged));
        let blade = candidate(1, AttackType::Melee, 4, 10);
        let rifle = candidate(2, AttackType::Ranged, 30, 10);
        assert_eq!(compare(&strict, &blade, &rifle), Some(ItemId(1)));

        let loose = profile(Some(BestWeapon::NoPref));
        assert_eq!(compare(&loose, &blade, &rifle), Some(ItemId(2)));
    }

    #[test]
    fn light_source_and_natural_weapons_win_outright() {
        let profile = profile(None);
        let mut flare = candidate(1, AttackType::Throw, 1, 1);
        flare.light = true;
        let rifle = candidate(2, AttackType::Ranged, 30, 500);
        assert_eq!(compare(&profile, &rifle, &flare), Some(ItemId(1)));

        let mut claws = candidate(3, AttackType::Melee, 2, 0);
        claws.natural = true;
        assert_eq!(compare(&profile, &claws, &rifle), Some(ItemId(3)));
    }

    #[test]
    fn unsafe_weapons_lose_and_two_unsafe_yield_nothing() {
        let profile = profile(None);
        let mut grenade = candidate(1, AttackType::Throw, 40, 50);
        grenade.safe = false;
        let knife = candidate(2, AttackType::Melee, 3, 5);
        assert_eq!(compare(&profile, &grenade, &knife), Some(ItemId(2)));

        let mut rocket = candidate(3, AttackType::Ranged, 60, 50);
        rocket.safe = false;
        assert_eq!(compare(&profile, &grenade, &rocket), None);
    }

    #[test]
    fn unaccepted_classes_are_never_chosen() {
        let profile = profile(Some(BestWeapon::Melee));
        let rifle = candidate(1, AttackType::Ranged, 30, 500);
        let club = candidate(2, AttackType::Melee, 2, 1);
        assert_eq!(compare(&profile, &rifle, &club), Some(ItemId(2)));
        let pistol = candidate(3, AttackType::Ranged, 10, 1);
        assert_eq!(compare(&profile, &rifle, &pistol), None);
    }

    #[test]
    fn thrown_weapon_fallback_favors_the_dull() {
        assert_eq!(throw_away_chance(0), 100);
        assert_eq!(throw_away_chance(4), 60);
        assert_eq!(throw_away_chance(10), 0);
        assert_eq!(throw_away_chance(14), 0);
    }
}
