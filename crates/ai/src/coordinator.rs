//! Encounter Coordinator.
//!
//! Drives one combatant's decision cycle:
//!
//! ```text
//! SelectTarget -> CheckMorale -> ResourceTopUp -> Position -> SelectWeaponAndMode -> Attack
//!                      |                                                              |
//!                      +-> run away                        repeat while AP and attempts remain
//! ```
//!
//! and owns the roster-wide bookkeeping: who joins, who notices a death,
//! and who retaliates against whom.

use combat_core::{
    CombatConfig, CombatantId, DistancePref, HitLocation, HitMode, ManeuverFlags, MessageKind,
    ShotAssessment, TeamId, World,
};

use crate::context::{AiContext, WorldExt};
use crate::error::{Infeasible, PlanResult};
use crate::position::Positioner;
use crate::rating::combat_rating;
use crate::resources::ResourceManager;
use crate::retreat::{MoraleController, MoraleState, set_flag};
use crate::roster::CombatRoster;
use crate::target::{TargetSelector, drops_grudge};
use crate::taunt::emit_taunt;
use crate::weapon::WeaponSelector;

/// What one decision cycle did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TurnReport {
    pub combatant: CombatantId,
    pub target: Option<CombatantId>,
    pub morale: MoraleState,
    /// Attacks carried out.
    pub attacks: u32,
    /// Passes through the attack loop.
    pub attempts: u32,
    /// Tiles moved.
    pub steps: u32,
    pub doses: u32,
}

impl TurnReport {
    fn new(combatant: CombatantId) -> Self {
        Self {
            combatant,
            ..Self::default()
        }
    }
}

/// How the attack loop ended.
enum Engagement {
    Continue,
    Done,
    Flee,
}

pub struct Encounter<'a> {
    ctx: AiContext<'a>,
    roster: CombatRoster,
    fallen: Vec<CombatantId>,
}

impl<'a> Encounter<'a> {
    pub fn new(ctx: AiContext<'a>) -> Self {
        Self {
            ctx,
            roster: CombatRoster::new(),
            fallen: Vec::new(),
        }
    }

    pub fn context(&self) -> &AiContext<'a> {
        &self.ctx
    }

    pub fn roster(&self) -> &CombatRoster {
        &self.roster
    }

    /// Starts a fresh encounter with `combatants`.
    pub fn begin(&mut self, combatants: impl IntoIterator<Item = CombatantId>) {
        self.roster = combatants.into_iter().collect();
        self.fallen.clear();
        tracing::info!("encounter begins with {} combatants", self.roster.len());
    }

    pub fn add_combatant(&mut self, id: CombatantId) -> bool {
        self.roster.insert(id)
    }

    /// Ends the encounter: weapons are topped up and maneuver flags reset.
    pub fn finish<W: World + ?Sized>(&mut self, world: &mut W) {
        for id in self.roster.iter().collect::<Vec<_>>() {
            ResourceManager::top_up_ammo(world, id);
            if let Some(state) = world.combatant_mut(id) {
                state.maneuver = ManeuverFlags::empty();
            }
        }
        tracing::info!("encounter over after {} turns", self.ctx.turn());
        self.roster.clear();
        self.fallen.clear();
    }

    // ========================================================================
    // Turns
    // ========================================================================

    /// One round: every non-player member acts once with full action
    /// points, in roster order.
    pub fn run_round<W: World + ?Sized>(&mut self, world: &mut W) -> Vec<TurnReport> {
        let order: Vec<CombatantId> = self.roster.iter().collect();
        let mut reports = Vec::with_capacity(order.len());

        for id in order {
            if id.is_player() || !self.roster.contains(id) {
                continue;
            }
            let Some(state) = world.combatant_mut(id) else {
                continue;
            };
            if state.is_dead() {
                continue;
            }
            state.ap.current = state.ap.maximum;

            reports.push(self.take_turn(world, id));

            if let Some(state) = world.combatant_mut(id) {
                state.damage_last_turn = 0;
            }
            self.collect_dead(world);
        }

        self.ctx.advance_turn();
        reports
    }

    /// Runs one decision cycle for `id` with its current action points.
    pub fn take_turn<W: World + ?Sized>(&mut self, world: &mut W, id: CombatantId) -> TurnReport {
        let mut report = TurnReport::new(id);
        let Ok(me) = world.state(id).cloned() else {
            tracing::warn!("{} took a turn but is not in the world", id);
            return report;
        };
        report.morale = MoraleState::of(&me);
        if !me.can_act() {
            return report;
        }

        if drops_grudge(&me, self.ctx.profile(&me)) {
            if let Some(state) = world.combatant_mut(id) {
                state.who_hit_me = None;
            }
        }
        let target = TargetSelector::select(&self.ctx, &self.roster, world, id);
        report.target = target;
        self.reengage(world, id, target);

        let morale = match MoraleController::assess(&self.ctx, world, id, false) {
            Ok(morale) => morale,
            Err(error) => {
                tracing::warn!("{} morale check failed: {}", id, error);
                return report;
            }
        };
        report.morale = morale;
        if me.ap.is_empty() {
            tracing::debug!("{} has no action points", id);
            return report;
        }

        if morale == MoraleState::Fleeing {
            tracing::debug!("{} flees", id);
            self.flee(world, id, target, &mut report);
            return report;
        }

        match ResourceManager::check_drugs(&self.ctx, world, id) {
            Ok(drugs) => {
                report.doses = drugs.doses;
                if drugs.needs_drugs {
                    tracing::debug!("{} flees to find drugs", id);
                    if let Ok(morale) = MoraleController::assess(&self.ctx, world, id, true) {
                        report.morale = morale;
                    }
                    self.flee(world, id, target, &mut report);
                    self.end_of_turn(world, id, target, &mut report);
                    return report;
                }
            }
            Err(error) => tracing::debug!("{} skips drugs: {}", id, error),
        }

        let engaged = morale == MoraleState::Engaged;
        let target = target.filter(|_| engaged);

        self.track(
            Positioner::apply_distance_preference(&self.ctx, &self.roster, world, id, target),
            &mut report,
        );
        self.track(Positioner::step_aside(&self.roster, world, id, target), &mut report);

        if let Some(target) = target {
            match self.attack(world, id, target, &mut report) {
                Ok(Engagement::Flee) => {
                    self.flee(world, id, Some(target), &mut report);
                }
                Ok(_) => {}
                Err(error) => tracing::debug!("{} stops attacking: {}", id, error),
            }
        }

        self.end_of_turn(world, id, target, &mut report);
        if let Some(state) = world.combatant(id) {
            report.morale = MoraleState::of(state);
        }
        tracing::debug!(
            "{} turn: target {:?}, {} attacks in {} attempts, {} steps, {} doses, {}",
            id,
            report.target,
            report.attacks,
            report.attempts,
            report.steps,
            report.doses,
            report.morale
        );
        report
    }

    fn track(&self, moved: PlanResult<u32>, report: &mut TurnReport) {
        match moved {
            Ok(steps) => report.steps += steps,
            Err(error) => tracing::debug!("{} does not move: {}", report.combatant, error),
        }
    }

    fn flee<W: World + ?Sized>(
        &self,
        world: &mut W,
        id: CombatantId,
        threat: Option<CombatantId>,
        report: &mut TurnReport,
    ) {
        let before = world.tile_of(id);
        report.morale = MoraleController::run_away(&self.ctx, world, id, threat)
            .unwrap_or(MoraleState::Fleeing);
        if let (Some(before), Some(after)) = (before, world.tile_of(id)) {
            report.steps += world.distance(before, after);
        }
    }

    /// A disengaged combatant rejoins once its threat closes back in.
    fn reengage<W: World + ?Sized>(
        &self,
        world: &mut W,
        id: CombatantId,
        threat: Option<CombatantId>,
    ) {
        let Some(state) = world.combatant(id) else {
            return;
        };
        if !state.maneuver.contains(ManeuverFlags::DISENGAGING) {
            return;
        }
        let max_dist = self.ctx.profile(state).max_dist;
        let close = threat
            .and_then(|threat| world.distance_between(id, threat))
            .is_some_and(|distance| i64::from(distance) <= i64::from(max_dist));
        if close {
            tracing::debug!("{} re-engages", id);
            if let Some(state) = world.combatant_mut(id) {
                state.maneuver.remove(ManeuverFlags::DISENGAGING);
            }
        }
    }

    // ========================================================================
    // Attack loop
    // ========================================================================

    fn attack<W: World + ?Sized>(
        &mut self,
        world: &mut W,
        id: CombatantId,
        target: CombatantId,
        report: &mut TurnReport,
    ) -> PlanResult<Engagement> {
        if let Some(state) = world.combatant_mut(id) {
            state.memory.last_target = Some(target);
        }
        if let Err(error) = WeaponSelector::ensure_best_weapon(&self.ctx, world, id, target) {
            tracing::debug!("{} keeps its weapon: {}", id, error);
        }
        let mut mode = WeaponSelector::pick_hit_mode(&self.ctx, world, id, target);

        for _ in 0..self.ctx.settings.max_attack_attempts {
            report.attempts += 1;
            let me = world.state(id)?;
            if !me.can_act() || me.ap.is_empty() {
                return Ok(Engagement::Done);
            }
            let min_to_hit = self.ctx.profile(me).min_to_hit;

            let assessment = world.classify_shot(id, target, mode);
            tracing::debug!("{} -> {} with {}: {}", id, target, mode, assessment);
            match assessment {
                ShotAssessment::NoAmmo => {
                    if !ResourceManager::reload_weapon(&self.ctx, world, id)? {
                        mode = WeaponSelector::switch_weapons(&self.ctx, world, id, target)?;
                    }
                }
                ShotAssessment::NotEnoughAp
                | ShotAssessment::ArmCrippled
                | ShotAssessment::BothArmsCrippled => {
                    mode = WeaponSelector::switch_weapons(&self.ctx, world, id, target)?;
                }
                ShotAssessment::OutOfRange => {
                    if world.to_hit_ignoring_range(id, target, mode) < min_to_hit {
                        tracing::debug!("{} can't possibly hit {}", id, target);
                        return Ok(Engagement::Flee);
                    }
                    if mode == HitMode::Punch {
                        mode = match WeaponSelector::switch_weapons(&self.ctx, world, id, target) {
                            Ok(mode) => mode,
                            Err(_) => HitMode::Punch,
                        };
                        if mode != HitMode::Punch {
                            continue;
                        }
                    }
                    let ap = world.state(id)?.ap.current;
                    report.steps +=
                        Positioner::move_steps_closer(&self.ctx, &self.roster, world, id, target, ap)?;
                }
                ShotAssessment::AimBlocked => {
                    let ap = world.state(id)?.ap.current;
                    report.steps +=
                        Positioner::move_steps_closer(&self.ctx, &self.roster, world, id, target, ap)?;
                }
                ShotAssessment::TargetDead => return Ok(Engagement::Done),
                ShotAssessment::Ok => match self.strike(world, id, target, mode, min_to_hit, report)? {
                    Engagement::Continue => {}
                    other => return Ok(other),
                },
            }
        }
        Ok(Engagement::Done)
    }

    /// A shot the rules allow. Closes in first when the odds are poor.
    fn strike<W: World + ?Sized>(
        &mut self,
        world: &mut W,
        id: CombatantId,
        target: CombatantId,
        mode: HitMode,
        min_to_hit: i32,
        report: &mut TurnReport,
    ) -> PlanResult<Engagement> {
        let ctx = &self.ctx;
        let intent = WeaponSelector::plan_attack(ctx, world, id, target, mode);
        if let Some(keep) = intent.safe_distance {
            let from = world
                .tile_of(target)
                .ok_or(Infeasible::UnknownCombatant(target))?;
            report.steps += Positioner::move_away(ctx, world, id, from, keep)?;
        }

        if world.to_hit(id, target, HitLocation::Uncalled, mode) < min_to_hit {
            if world.to_hit_ignoring_range(id, target, mode) < min_to_hit {
                tracing::debug!("{} can't possibly hit {}", id, target);
                return Ok(Engagement::Flee);
            }
            let steps = steps_to_good_odds(world, id, target, mode, min_to_hit);
            match Positioner::move_steps_closer(ctx, &self.roster, world, id, target, steps) {
                Ok(moved) => report.steps += moved,
                Err(error) => {
                    tracing::debug!("{} can't get closer to {}: {}", id, target, error);
                    return Ok(Engagement::Flee);
                }
            }
        }

        emit_taunt(ctx, world, id, MessageKind::Attack);
        let hp_before = world.combatant(target).map(|state| state.hp.current);
        if !world.resolve_attack(id, &intent) {
            return Err(Infeasible::AttackFailed {
                attacker: id,
                target,
            });
        }
        report.attacks += 1;
        let hp_after = world.combatant(target).map(|state| state.hp.current);
        let outcome = if hp_after < hp_before {
            MessageKind::Hit(intent.location)
        } else {
            MessageKind::Miss
        };
        emit_taunt(ctx, world, id, outcome);

        let attacker_team = world.state(id)?.team;
        let down = world
            .combatant(target)
            .is_some_and(|state| state.damage.is_incapacitated());
        if down {
            if let Some(defender) = world.combatant_mut(target) {
                defender.remember_attacker(id, attacker_team);
            }
        } else {
            self.check_retaliation(world, target, id);
        }
        if world.combatant(target).is_some_and(|state| state.is_dead()) {
            self.handle_death(world, target);
            return Ok(Engagement::Done);
        }

        let ap = world.state(id)?.ap.current;
        if world.attack_cost(id, mode, false) > ap {
            return Ok(Engagement::Done);
        }
        Ok(Engagement::Continue)
    }

    // ========================================================================
    // End of turn
    // ========================================================================

    fn end_of_turn<W: World + ?Sized>(
        &mut self,
        world: &mut W,
        id: CombatantId,
        target: Option<CombatantId>,
        report: &mut TurnReport,
    ) {
        let Ok(me) = world.state(id).cloned() else {
            return;
        };
        if me.is_dead() {
            return;
        }
        let ctx = &self.ctx;
        let profile = ctx.profile(&me);
        let keep = CombatConfig::CORPSE_AVOID_DISTANCE;

        if let Some(target) = target {
            let far = world
                .distance_between(id, target)
                .is_some_and(|distance| i64::from(distance) > i64::from(profile.max_dist));
            if far && !me.ap.is_empty() {
                if let Some(corpse) = me.memory.friendly_dead {
                    self.avoid_corpse(world, id, corpse, report);
                    forget_corpse(world, id);
                } else if !self.find_friend(world, id, report) {
                    tracing::debug!("{} is alone and far from {}, disengaging", id, target);
                    set_flag(world, id, ManeuverFlags::DISENGAGING);
                }
            }
        }

        if target.is_none() && !me.party_member {
            let shot_at = me
                .who_hit_me
                .and_then(|hitter| world.combatant(hitter))
                .is_some_and(|hitter| hitter.is_alive())
                && me.damage_last_turn > 0;
            if shot_at {
                if let Some(corpse) = me.memory.friendly_dead {
                    self.avoid_corpse(world, id, corpse, report);
                    forget_corpse(world, id);
                } else {
                    tracing::debug!("{} is shot at by someone it can't see", id);
                    self.flee(world, id, None, report);
                }
            }
        }

        let corpse = world.combatant(id).and_then(|state| state.memory.friendly_dead);
        if let Some(corpse) = corpse {
            self.avoid_corpse(world, id, corpse, report);
            let clear = world
                .distance_between(id, corpse)
                .is_none_or(|distance| distance >= keep);
            if clear {
                forget_corpse(world, id);
            }
        }

        let (leader, limit) = if me.team != TeamId::PLAYER {
            (self.nearest_teammate_in_combat(world, id), CombatConfig::STAY_CLOSE_DISTANCE)
        } else if me.party_member {
            (Some(CombatantId::PLAYER), DistancePref::follow_distance(profile.distance))
        } else {
            (Some(CombatantId::PLAYER), CombatConfig::STAY_CLOSE_DISTANCE)
        };
        let leader = leader.filter(|leader| *leader != id);
        let trailing = leader
            .and_then(|leader| world.distance_between(id, leader).map(|distance| (leader, distance)))
            .filter(|(_, distance)| *distance > limit);

        let has_ap = world.combatant(id).is_some_and(|state| !state.ap.is_empty());
        match (target, trailing) {
            (None, Some((leader, distance))) => {
                if has_ap {
                    self.track(
                        Positioner::move_steps_closer(
                            ctx,
                            &self.roster,
                            world,
                            id,
                            leader,
                            distance - limit,
                        ),
                        report,
                    );
                }
            }
            _ => {
                if has_ap {
                    self.track(
                        Positioner::apply_distance_preference(ctx, &self.roster, world, id, target),
                        report,
                    );
                }
            }
        }
    }

    fn avoid_corpse<W: World + ?Sized>(
        &self,
        world: &mut W,
        id: CombatantId,
        corpse: CombatantId,
        report: &mut TurnReport,
    ) {
        let Some(from) = world.tile_of(corpse) else {
            return;
        };
        tracing::debug!("{} backs away from the body of {}", id, corpse);
        self.track(
            Positioner::move_away(&self.ctx, world, id, from, CombatConfig::CORPSE_AVOID_DISTANCE),
            report,
        );
    }

    /// Regroups with the nearest teammate within twice the perception
    /// radius. `false` when nobody is that close.
    fn find_friend<W: World + ?Sized>(
        &self,
        world: &mut W,
        id: CombatantId,
        report: &mut TurnReport,
    ) -> bool {
        let Some(me) = world.combatant(id) else {
            return false;
        };
        let team = me.team;
        let radius = (me.stats.perception * 2).max(0) as u32;
        let friend = self.roster.by_distance(world, me.tile).into_iter().find(|other| {
            *other != id
                && world
                    .combatant(*other)
                    .is_some_and(|state| state.is_alive() && state.team == team)
        });
        let Some(friend) = friend else {
            return false;
        };
        let Some(distance) = world.distance_between(id, friend) else {
            return false;
        };
        if distance > radius {
            return false;
        }

        let keep = CombatConfig::STAY_CLOSE_DISTANCE;
        if distance > keep {
            self.track(
                Positioner::move_steps_closer(
                    &self.ctx,
                    &self.roster,
                    world,
                    id,
                    friend,
                    distance - keep,
                ),
                report,
            );
        }
        true
    }

    /// Nearest living teammate that is in the fight.
    fn nearest_teammate_in_combat<W: World + ?Sized>(
        &self,
        world: &W,
        id: CombatantId,
    ) -> Option<CombatantId> {
        let me = world.combatant(id)?;
        self.roster
            .by_distance(world, me.tile)
            .into_iter()
            .find(|other| {
                *other != id
                    && world.combatant(*other).is_some_and(|state| {
                        state.is_alive() && state.team == me.team && state.who_hit_me.is_some()
                    })
            })
    }

    // ========================================================================
    // Roster bookkeeping
    // ========================================================================

    /// Scripted team fight: everyone on either team targets the nearest
    /// member of the other, and every non-player combatant engages.
    pub fn setup_team_combat<W: World + ?Sized>(
        &mut self,
        world: &mut W,
        attackers: TeamId,
        defenders: TeamId,
    ) {
        let members: Vec<CombatantId> = self.roster.iter().collect();
        for id in &members {
            let Some(state) = world.combatant(*id) else {
                continue;
            };
            let opposing = if state.team == attackers {
                defenders
            } else if state.team == defenders {
                attackers
            } else {
                continue;
            };
            let tile = state.tile;
            let nearest = self.roster.by_distance(world, tile).into_iter().find(|other| {
                world
                    .combatant(*other)
                    .is_some_and(|other| other.is_alive() && other.team == opposing)
            });
            if let Some(state) = world.combatant_mut(*id) {
                state.who_hit_me = nearest;
            }
        }

        for id in members {
            if id.is_player() {
                continue;
            }
            set_flag(world, id, ManeuverFlags::ENGAGING);
        }
        tracing::info!("{} and {} go to war", attackers, defenders);
    }

    /// Everyone who notices `subject` joins the fight. Witnesses of a death
    /// who cannot see their own attacker remember the corpse.
    pub fn notify_onlookers<W: World + ?Sized>(&mut self, world: &mut W, subject: CombatantId) {
        let Some(subject_state) = world.combatant(subject) else {
            return;
        };
        let died = subject_state.is_dead();
        let subject_team = subject_state.team;

        for id in self.roster.iter().collect::<Vec<_>>() {
            if id == subject {
                continue;
            }
            let Some(state) = world.combatant(id) else {
                continue;
            };
            if state.maneuver.contains(ManeuverFlags::ENGAGING) || !world.can_perceive(id, subject) {
                continue;
            }
            let unseen_killer = died
                && state.team == subject_team
                && state
                    .who_hit_me
                    .is_none_or(|hitter| !world.can_perceive(id, hitter));

            if let Some(state) = world.combatant_mut(id) {
                state.maneuver.insert(ManeuverFlags::ENGAGING);
                if unseen_killer {
                    tracing::debug!("{} saw {} die and doesn't know why", id, subject);
                    state.memory.friendly_dead = Some(subject);
                }
            }
        }
    }

    /// Teammates of `subject` who notice it join the fight.
    pub fn notify_friends<W: World + ?Sized>(&mut self, world: &mut W, subject: CombatantId) {
        let Some(team) = world.combatant(subject).map(|state| state.team) else {
            return;
        };
        for id in self.roster.iter().collect::<Vec<_>>() {
            let joins = world.combatant(id).is_some_and(|state| {
                id != subject
                    && state.team == team
                    && !state.maneuver.contains(ManeuverFlags::ENGAGING)
            }) && world.can_perceive(id, subject);
            if joins {
                set_flag(world, id, ManeuverFlags::ENGAGING);
            }
        }
    }

    /// Whether `id` wants into the fight.
    pub fn want_to_join<W: World + ?Sized>(&self, world: &W, id: CombatantId) -> bool {
        let Some(state) = world.combatant(id) else {
            return false;
        };
        if state.damage.is_incapacitated() {
            return false;
        }
        if state.damage_last_turn > 0 || state.maneuver.contains(ManeuverFlags::ENGAGING) {
            return true;
        }
        state
            .maneuver
            .intersects(ManeuverFlags::DISENGAGING | ManeuverFlags::FLEEING)
            && TargetSelector::select(&self.ctx, &self.roster, world, id).is_some()
    }

    /// Whether `id` is done with the fight.
    pub fn want_to_stop<W: World + ?Sized>(&self, world: &W, id: CombatantId) -> bool {
        let Some(state) = world.combatant(id) else {
            return true;
        };
        if state.maneuver.contains(ManeuverFlags::DISENGAGING)
            || state.damage.is_incapacitated()
            || state.is_fleeing()
        {
            return true;
        }
        match TargetSelector::select(&self.ctx, &self.roster, world, id) {
            Some(danger) => !world.can_perceive(id, danger),
            None => true,
        }
    }

    /// Moves `id` to `team`, dropping relations that would now point at a
    /// teammate.
    pub fn set_team<W: World + ?Sized>(&mut self, world: &mut W, id: CombatantId, team: TeamId) {
        let hitter_team = world
            .combatant(id)
            .and_then(|state| state.who_hit_me)
            .and_then(|hitter| world.combatant(hitter))
            .map(|hitter| hitter.team);
        let Some(state) = world.combatant_mut(id) else {
            return;
        };
        state.team = team;
        if hitter_team == Some(team) {
            state.who_hit_me = None;
        }
        state.memory.last_target = None;

        for other in self.roster.iter().collect::<Vec<_>>() {
            if other == id {
                continue;
            }
            if let Some(holder) = world.combatant_mut(other) {
                if holder.team == team {
                    holder.forget(id);
                }
            }
        }
        tracing::debug!("{} joins {}", id, team);
    }

    /// `defender` turns on `attacker` unless its current attacker rates
    /// at least as dangerous.
    pub fn check_retaliation<W: World + ?Sized>(
        &self,
        world: &mut W,
        defender: CombatantId,
        attacker: CombatantId,
    ) {
        let current = world.combatant(defender).and_then(|state| state.who_hit_me);
        if let Some(current) = current {
            if current != attacker && combat_rating(world, attacker) <= combat_rating(world, current) {
                return;
            }
        }
        let Some(attacker_team) = world.combatant(attacker).map(|state| state.team) else {
            return;
        };
        if let Some(state) = world.combatant_mut(defender) {
            state.remember_attacker(attacker, attacker_team);
        }
    }

    /// Bystander caught by a critical miss: scanning from a random member,
    /// the first one the attacker can see, other than both parties, whose
    /// shot the rules would not allow.
    pub fn random_target<W: World + ?Sized>(
        &self,
        world: &W,
        attacker: CombatantId,
        defender: CombatantId,
        mode: HitMode,
    ) -> Option<CombatantId> {
        let members: Vec<CombatantId> = self.roster.iter().collect();
        if members.is_empty() {
            return None;
        }
        let start = self.ctx.range(attacker, 0, members.len() as u32 - 1) as usize;
        members
            .iter()
            .cycle()
            .skip(start)
            .take(members.len())
            .copied()
            .find(|candidate| {
                *candidate != attacker
                    && *candidate != defender
                    && world.can_perceive(attacker, *candidate)
                    && !world.classify_shot(attacker, *candidate, mode).is_ok()
            })
    }

    /// Drops `id` from the encounter along with every relation to it.
    pub fn remove_combatant<W: World + ?Sized>(&mut self, world: &mut W, id: CombatantId) {
        self.roster.remove(id);
        for other in self.roster.iter().collect::<Vec<_>>() {
            if let Some(state) = world.combatant_mut(other) {
                state.forget(id);
            }
        }
    }

    /// Death bookkeeping: witnesses react, attackers of the dead look for
    /// its nearest living teammate, and the corpse leaves the roster.
    pub fn handle_death<W: World + ?Sized>(&mut self, world: &mut W, dead: CombatantId) {
        if self.fallen.contains(&dead) {
            return;
        }
        tracing::info!("{} dies", dead);
        self.notify_onlookers(world, dead);

        let Some(dead_state) = world.combatant(dead) else {
            return;
        };
        let (dead_team, dead_tile) = (dead_state.team, dead_state.tile);
        self.roster.remove(dead);
        self.fallen.push(dead);

        let successor = self
            .roster
            .by_distance(world, dead_tile)
            .into_iter()
            .find(|other| {
                world
                    .combatant(*other)
                    .is_some_and(|state| state.is_alive() && state.team == dead_team)
            });

        for id in self.roster.iter().collect::<Vec<_>>() {
            let Some(state) = world.combatant_mut(id) else {
                continue;
            };
            if state.memory.last_target == Some(dead) {
                state.memory.last_target = None;
            }
            if state.who_hit_me == Some(dead) {
                let hostile = state.team != dead_team;
                state.who_hit_me = successor.filter(|_| hostile);
            }
        }
    }

    /// Bystanders who see a live fight, or a teammate's body with no
    /// visible killer, join the roster. Returns who joined.
    pub fn refresh_awareness<W: World + ?Sized>(
        &mut self,
        world: &mut W,
        bystanders: &[CombatantId],
    ) -> Vec<CombatantId> {
        let fighting: Vec<CombatantId> = self
            .roster
            .iter()
            .filter(|id| {
                world
                    .combatant(*id)
                    .is_some_and(|state| state.is_alive() && state.memory.last_target.is_some())
            })
            .collect();

        let mut joined = Vec::new();
        for &id in bystanders {
            if self.roster.contains(id) {
                continue;
            }
            let Some(state) = world.combatant(id) else {
                continue;
            };
            if state.damage.is_incapacitated() {
                continue;
            }
            let team = state.team;
            let sees_fight = fighting.iter().any(|other| world.can_perceive(id, *other));
            let corpse = self.fallen.iter().copied().find(|body| {
                world.combatant(*body).is_some_and(|body| {
                    body.team == team
                        && body
                            .who_hit_me
                            .is_none_or(|killer| !world.can_perceive(id, killer))
                })
                    && world.can_perceive(id, *body)
            });
            if !sees_fight && corpse.is_none() {
                continue;
            }

            if let Some(state) = world.combatant_mut(id) {
                state.maneuver.insert(ManeuverFlags::ENGAGING);
                if !sees_fight {
                    state.memory.friendly_dead = corpse;
                }
            }
            if self.roster.insert(id) {
                tracing::debug!("{} notices the fight", id);
                joined.push(id);
            }
        }
        joined
    }

    fn collect_dead<W: World + ?Sized>(&mut self, world: &mut W) {
        let dead: Vec<CombatantId> = self
            .roster
            .iter()
            .filter(|id| world.combatant(*id).is_some_and(|state| state.is_dead()))
            .collect();
        for id in dead {
            self.handle_death(world, id);
        }
    }
}

fn forget_corpse<W: World + ?Sized>(world: &mut W, id: CombatantId) {
    if let Some(state) = world.combatant_mut(id) {
        state.memory.friendly_dead = None;
    }
}

/// Steps along the path to `target` until the hit chance reaches
/// `min_to_hit`, capped at the remaining action points.
fn steps_to_good_odds<W: World + ?Sized>(
    world: &W,
    id: CombatantId,
    target: CombatantId,
    mode: HitMode,
    min_to_hit: i32,
) -> u32 {
    let (Some(me), Some(to)) = (world.combatant(id), world.tile_of(target)) else {
        return 0;
    };
    let budget = me.ap.current;
    let Some(path) = world.find_path(id, me.tile, to) else {
        return budget;
    };

    let mut tile = me.tile;
    for (walked, rotation) in path.iter().take(budget as usize).enumerate() {
        tile = world.tile_in_direction(tile, *rotation, 1);
        if world.to_hit_from_tile(id, tile, target, mode) >= min_to_hit {
            return walked as u32 + 1;
        }
    }
    budget
}
