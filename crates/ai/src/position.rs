//! Tactical Positioner.
//!
//! Movement is expressed as a destination tile handed to
//! [`combat_core::Battlefield::move_to`]; the world walks the path and
//! debits action points. Every move helper refuses to act with zero action
//! points, so a combatant without AP never issues a movement command.

use arrayvec::ArrayVec;
use combat_core::{
    CombatConfig, CombatantId, DistancePref, HitMode, MessageKind, Rotation, Tile, World,
};

use crate::context::{AiContext, WorldExt};
use crate::error::{Infeasible, PlanResult};
use crate::rating::combat_rating;
use crate::roster::CombatRoster;
use crate::taunt::emit_taunt;

pub struct Positioner;

impl Positioner {
    /// Applies the profile's distance preference. Returns tiles moved.
    pub fn apply_distance_preference<W: World + ?Sized>(
        ctx: &AiContext<'_>,
        roster: &CombatRoster,
        world: &mut W,
        id: CombatantId,
        target: Option<CombatantId>,
    ) -> PlanResult<u32> {
        let me = world.state(id)?.clone();
        let profile = ctx.profile(&me);

        match profile.distance {
            Some(DistancePref::StayClose) => {
                if !me.party_member || me.is_player() {
                    return Ok(0);
                }
                let engaged_by_target = target
                    .and_then(|target| world.combatant(target))
                    .is_some_and(|state| state.memory.last_target == Some(id));
                if engaged_by_target {
                    return Ok(0);
                }
                let Some(distance) = world.distance_between(id, CombatantId::PLAYER) else {
                    return Ok(0);
                };
                if distance <= CombatConfig::STAY_CLOSE_DISTANCE {
                    return Ok(0);
                }
                Self::move_steps_closer(
                    ctx,
                    roster,
                    world,
                    id,
                    CombatantId::PLAYER,
                    distance - CombatConfig::STAY_CLOSE_DISTANCE,
                )
            }
            Some(DistancePref::Charge) => match target {
                Some(target) => {
                    Self::move_steps_closer(ctx, roster, world, id, target, me.ap.current)
                }
                None => Ok(0),
            },
            Some(DistancePref::Snipe) => {
                let Some(target) = target else {
                    return Ok(0);
                };
                let Some(target_tile) = world.tile_of(target) else {
                    return Ok(0);
                };
                let distance = world.distance(me.tile, target_tile);
                if distance < CombatConfig::SNIPE_DISTANCE
                    && combat_rating(world, id) < combat_rating(world, target)
                {
                    tracing::debug!("{} backs off from stronger {}", id, target);
                    Self::move_away(ctx, world, id, target_tile, CombatConfig::SNIPE_DISTANCE)
                } else {
                    Ok(0)
                }
            }
            Some(DistancePref::OnYourOwn) | Some(DistancePref::Stay) | None => Ok(0),
        }
    }

    /// Moves up to `steps` tiles toward `target`, stopping adjacent to it.
    ///
    /// The destination is run through [`Self::retarget_tile`] so the mover
    /// does not end up in a teammate's line of fire.
    pub fn move_steps_closer<W: World + ?Sized>(
        ctx: &AiContext<'_>,
        roster: &CombatRoster,
        world: &mut W,
        id: CombatantId,
        target: CombatantId,
        steps: u32,
    ) -> PlanResult<u32> {
        let me = world.state(id)?.clone();
        if me.ap.is_empty() {
            return Err(Infeasible::OutOfActionPoints(id));
        }
        if steps == 0 {
            return Ok(0);
        }

        let profile = ctx.profile(&me);
        match profile.distance {
            Some(DistancePref::Stay) => return Err(Infeasible::Stationary(id)),
            Some(DistancePref::StayClose) if me.party_member && !target.is_player() => {
                let from_player = world.distance_between(id, CombatantId::PLAYER);
                let target_from_player = world.distance_between(target, CombatantId::PLAYER);
                if let (Some(mine), Some(theirs)) = (from_player, target_from_player) {
                    let limit = CombatConfig::STAY_CLOSE_DISTANCE;
                    if mine > limit && theirs > limit && mine + steps > limit {
                        return Err(Infeasible::Stationary(id));
                    }
                }
            }
            _ => {}
        }

        let target_tile = world
            .tile_of(target)
            .ok_or(Infeasible::UnknownCombatant(target))?;
        if world.distance(me.tile, target_tile) <= 1 {
            return Ok(0);
        }

        let path = world
            .find_path(id, me.tile, target_tile)
            .ok_or(Infeasible::NoPath(id))?;
        let budget = steps.min(me.ap.current);
        let walk = (budget as usize).min(path.len().saturating_sub(1));
        if walk == 0 {
            return Ok(0);
        }

        let planned = follow(world, me.tile, &path[..walk]);
        let destination = Self::retarget_tile(roster, world, id, target, planned);

        emit_taunt(ctx, world, id, MessageKind::Move);
        let run = budget >= me.ap.maximum / 2;
        let moved = world.move_to(id, destination, budget, run);
        tracing::debug!(
            "{} closes on {}: {} -> {} ({} steps)",
            id,
            target,
            me.tile,
            destination,
            moved
        );
        Ok(moved)
    }

    /// Clears a stronger teammate's line of fire without otherwise moving.
    pub fn step_aside<W: World + ?Sized>(
        roster: &CombatRoster,
        world: &mut W,
        id: CombatantId,
        target: Option<CombatantId>,
    ) -> PlanResult<u32> {
        let Some(target) = target else {
            return Ok(0);
        };
        let me = world.state(id)?.clone();
        if me.ap.is_empty() {
            return Err(Infeasible::OutOfActionPoints(id));
        }
        let tile = Self::retarget_tile(roster, world, id, target, me.tile);
        if tile == me.tile || world.find_path(id, me.tile, tile).is_none() {
            return Ok(0);
        }
        Ok(world.move_to(id, tile, me.ap.current, false))
    }

    /// Backs away from `from` until `keep` tiles separate them.
    pub fn move_away<W: World + ?Sized>(
        ctx: &AiContext<'_>,
        world: &mut W,
        id: CombatantId,
        from: Tile,
        keep: u32,
    ) -> PlanResult<u32> {
        let me = world.state(id)?.clone();
        if me.ap.is_empty() {
            return Err(Infeasible::OutOfActionPoints(id));
        }
        if ctx.profile(&me).distance == Some(DistancePref::Stay) {
            return Err(Infeasible::Stationary(id));
        }

        let distance = world.distance(from, me.tile);
        if distance >= keep {
            return Ok(0);
        }
        step_away(world, id, from, (keep - distance).min(me.ap.current), false)
    }

    /// Runs from `from` with every action point left. Fleeing ignores the
    /// `stay` preference.
    pub fn run_from<W: World + ?Sized>(
        world: &mut W,
        id: CombatantId,
        from: Tile,
    ) -> PlanResult<u32> {
        let me = world.state(id)?;
        if me.ap.is_empty() {
            return Err(Infeasible::OutOfActionPoints(id));
        }
        let steps = me.ap.current;
        step_away(world, id, from, steps, true)
    }

    /// Friendly-fire retargeting.
    ///
    /// Stronger teammates already shooting at `target` must keep a clear
    /// line of fire. While the mover's intelligence budget lasts, each
    /// round finds a teammate whose shot would cross the planned tile and
    /// shifts the plan to the nearest free tile one facing to either side
    /// of that line. The result is never a blocked tile unless the plan
    /// itself was.
    pub fn retarget_tile<W: World + ?Sized>(
        roster: &CombatRoster,
        world: &W,
        id: CombatantId,
        target: CombatantId,
        planned: Tile,
    ) -> Tile {
        let (Some(me), Some(target_tile)) = (world.combatant(id), world.tile_of(target)) else {
            return planned;
        };

        let my_rating = combat_rating(world, id);
        let shooters: Vec<CombatantId> = roster
            .by_distance(world, me.tile)
            .into_iter()
            .filter(|ally| *ally != id)
            .filter(|ally| {
                world.combatant(*ally).is_some_and(|state| {
                    state.is_alive()
                        && state.team == me.team
                        && state.memory.last_target == Some(target)
                })
            })
            .filter(|ally| combat_rating(world, *ally) >= my_rating)
            .collect();
        if shooters.is_empty() {
            return planned;
        }

        let mut budget = me.stats.intelligence;
        let mut current = planned;
        let mut tried: ArrayVec<Tile, { CombatConfig::MAX_RETARGET_TILES }> = ArrayVec::new();

        while budget > 0 {
            let crossing = shooters.iter().find_map(|ally| {
                line_of_fire_spread(world, *ally, target, current).map(|spread| (*ally, spread))
            });
            let Some((ally, spread)) = crossing else {
                break;
            };
            budget -= CombatConfig::RETARGET_INTELLIGENCE_COST;

            let Some(ally_tile) = world.tile_of(ally) else {
                break;
            };
            let facing = world.rotation_towards(ally_tile, target_tile);
            let alternates = [
                world.tile_in_direction(current, facing.clockwise(), spread),
                world.tile_in_direction(current, facing.counter_clockwise(), spread),
            ];

            let best = alternates
                .iter()
                .copied()
                .filter(|tile| *tile != current && !tried.contains(tile))
                .filter(|tile| !world.is_tile_blocked(*tile))
                .min_by_key(|tile| world.distance(planned, *tile));
            for tile in alternates {
                let _ = tried.try_push(tile);
            }

            match best {
                Some(tile) => {
                    tracing::debug!("{} steps out of {}'s line of fire to {}", id, ally, tile);
                    current = tile;
                }
                None => break,
            }
        }

        current
    }
}

/// Tile reached by following `path` from `from`.
fn follow<W: World + ?Sized>(world: &W, from: Tile, path: &[Rotation]) -> Tile {
    path.iter()
        .fold(from, |tile, rotation| world.tile_in_direction(tile, *rotation, 1))
}

/// If `shooter`'s shot at `target` would pass through or incidentally hit
/// `tile`, how far a bystander must step aside.
fn line_of_fire_spread<W: World + ?Sized>(
    world: &W,
    shooter: CombatantId,
    target: CombatantId,
    tile: Tile,
) -> Option<u32> {
    let weapon = world.wielded(shooter)?;
    let range = world.weapon_range(shooter, weapon, HitMode::Primary);
    if range < 1 {
        return None;
    }
    let from = world.tile_of(shooter)?;
    let to = world.tile_of(target)?;

    let crosses = world
        .straight_line(from, to)
        .into_iter()
        .take(range as usize)
        .any(|step| step == tile);
    if !crosses && !world.incidental_hit(shooter, target, tile, weapon) {
        return None;
    }

    let area = world
        .definition(weapon)
        .and_then(|definition| definition.weapon)
        .map_or(0, |weapon| weapon.area_radius);
    Some(1 + area)
}

/// Moves directly away from `from`, trying the opposite facing and then
/// one facing to either side, with shorter distances as needed.
fn step_away<W: World + ?Sized>(
    world: &mut W,
    id: CombatantId,
    from: Tile,
    steps: u32,
    run: bool,
) -> PlanResult<u32> {
    let tile = world.state(id)?.tile;
    let away = world.rotation_towards(from, tile);
    let facings = [away, away.clockwise(), away.counter_clockwise()];

    for distance in (1..=steps).rev() {
        for facing in facings {
            let destination = world.tile_in_direction(tile, facing, distance);
            if destination == tile || world.is_tile_blocked(destination) {
                continue;
            }
            if world.find_path(id, tile, destination).is_some() {
                let moved = world.move_to(id, destination, distance, run);
                tracing::debug!("{} backs away to {} ({} steps)", id, destination, moved);
                return Ok(moved);
            }
        }
    }
    Err(Infeasible::NoPath(id))
}
