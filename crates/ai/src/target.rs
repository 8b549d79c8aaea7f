//! Target Selector.
//!
//! Picks one hostile focus per decision cycle:
//!
//! 1. `whomever_attacking_me` combatants keep fighting last cycle's target
//!    while it stays valid; party members then help whoever is attacking
//!    the player.
//! 2. A living attacker is returned outright unless a party member's
//!    profile ranks targets. A dead attacker points at the nearest living
//!    member of its team. Party members ranking by strength or distance
//!    ignore the attacker altogether.
//! 3. Up to three more candidates come from [`find_attackers`].
//! 4. Candidates are ranked by the party member's policy, or by distance
//!    for everyone else, and the first one that
//!    can be perceived, reached and shot at wins.

use std::cmp::Reverse;

use arrayvec::ArrayVec;
use combat_core::{
    AttackWho, BehaviorProfile, CombatConfig, CombatantId, CombatantState, Disposition,
    DistancePref, HitMode, TeamId, World,
};

use crate::context::{AiContext, WorldExt};
use crate::rating::combat_rating;
use crate::roster::CombatRoster;

pub type Candidates = ArrayVec<CombatantId, { CombatConfig::MAX_ATTACKER_CANDIDATES }>;

pub struct TargetSelector;

impl TargetSelector {
    /// Chooses this cycle's target for `id`, if any. Read-only.
    pub fn select<W: World + ?Sized>(
        ctx: &AiContext<'_>,
        roster: &CombatRoster,
        world: &W,
        id: CombatantId,
    ) -> Option<CombatantId> {
        let me = world.combatant(id)?;
        let profile = ctx.profile(me);
        let spares_fleeing = ignores_fleeing(me, profile);

        if profile.attack_who == Some(AttackWho::WhomeverAttackingMe) {
            if let Some(target) = me.memory.last_target {
                if is_engageable(world, me, target, spares_fleeing) {
                    tracing::debug!("{} keeps fighting {}", id, target);
                    return Some(target);
                }
            }
            if me.party_member {
                if let Some(target) = Self::defend_player(roster, world, me, spares_fleeing) {
                    tracing::debug!("{} helps the player against {}", id, target);
                    return Some(target);
                }
            }
        }

        let policy = ranking_policy(me, profile);
        let grudge = me.who_hit_me.filter(|_| !drops_grudge(me, profile));
        let mut candidates = Candidates::new();
        if let Some(hitter) = grudge.and_then(|hitter| world.combatant(hitter)) {
            if hitter.is_alive() {
                if matches!(policy, None | Some(AttackWho::Whomever)) {
                    tracing::debug!("{} answers {}", id, hitter.id);
                    return Some(hitter.id);
                }
            } else if hitter.team != me.team {
                if let Some(avenger) = nearest_of_team(roster, world, me, hitter.team) {
                    candidates.push(avenger);
                }
            }
        }

        for candidate in find_attackers(roster, world, me) {
            if !candidates.contains(&candidate) && !candidates.is_full() {
                candidates.push(candidate);
            }
        }
        if spares_fleeing {
            candidates.retain(|candidate| {
                world
                    .combatant(*candidate)
                    .is_some_and(|state| !state.is_fleeing())
            });
        }

        rank(policy, world, me, &mut candidates);

        let mode = if world.wielded(id).is_some() {
            HitMode::Primary
        } else {
            HitMode::Punch
        };
        let chosen = candidates.iter().copied().find(|candidate| {
            world.can_perceive(id, *candidate)
                && world
                    .tile_of(*candidate)
                    .is_some_and(|tile| world.has_path(id, tile))
                && !world.classify_shot(id, *candidate, mode).rules_out_target()
        });

        tracing::debug!("{} candidates {:?} -> {:?}", id, candidates, chosen);
        chosen
    }

    /// Nearest hostile that is attacking the player and can be fought.
    fn defend_player<W: World + ?Sized>(
        roster: &CombatRoster,
        world: &W,
        me: &CombatantState,
        spares_fleeing: bool,
    ) -> Option<CombatantId> {
        let mode = if world.wielded(me.id).is_some() {
            HitMode::Primary
        } else {
            HitMode::Punch
        };

        roster
            .by_distance(world, me.tile)
            .into_iter()
            .filter(|candidate| *candidate != me.id)
            .find(|candidate| {
                world
                    .combatant(*candidate)
                    .is_some_and(|state| state.memory.last_target == Some(CombatantId::PLAYER))
                    && is_engageable(world, me, *candidate, spares_fleeing)
                    && !world.classify_shot(me.id, *candidate, mode).rules_out_target()
            })
    }
}

/// Companions on a non-berserk tier leave fleeing enemies alone, unless
/// they are set to charge.
pub fn ignores_fleeing(me: &CombatantState, profile: &BehaviorProfile) -> bool {
    me.party_member
        && Disposition::spares_fleeing(profile.disposition)
        && profile.distance != Some(DistancePref::Charge)
}

/// Whom-to-attack policy `me` actually follows. Only party members rank
/// targets; everyone else answers a living attacker and picks the nearest.
pub fn ranking_policy(me: &CombatantState, profile: &BehaviorProfile) -> Option<AttackWho> {
    profile.attack_who.filter(|_| me.party_member)
}

/// Party members ranking by strength or distance let go of whoever hit them.
pub fn drops_grudge(me: &CombatantState, profile: &BehaviorProfile) -> bool {
    matches!(
        ranking_policy(me, profile),
        Some(AttackWho::Strongest | AttackWho::Weakest | AttackWho::Closest)
    )
}

/// Alive, conscious, hostile, reachable, and not a spared fleer.
fn is_engageable<W: World + ?Sized>(
    world: &W,
    me: &CombatantState,
    target: CombatantId,
    spares_fleeing: bool,
) -> bool {
    let Some(state) = world.combatant(target) else {
        return false;
    };
    !state.damage.is_incapacitated()
        && state.team != me.team
        && !(spares_fleeing && state.is_fleeing())
        && world.has_path(me.id, state.tile)
}

fn nearest_of_team<W: World + ?Sized>(
    roster: &CombatRoster,
    world: &W,
    me: &CombatantState,
    team: TeamId,
) -> Option<CombatantId> {
    roster
        .by_distance(world, me.tile)
        .into_iter()
        .find(|candidate| {
            *candidate != me.id
                && world
                    .combatant(*candidate)
                    .is_some_and(|state| state.is_alive() && state.team == team)
        })
}

/// Up to three hostiles involved in fights around `me`, nearest first:
/// one fighting `me`, one that hit a teammate, and one engaged with the
/// team.
pub fn find_attackers<W: World + ?Sized>(
    roster: &CombatRoster,
    world: &W,
    me: &CombatantState,
) -> Candidates {
    let mut against_me = None;
    let mut against_friend = None;
    let mut against_team = None;

    let on_my_team = |id: Option<CombatantId>| {
        id.and_then(|id| world.combatant(id))
            .is_some_and(|state| state.team == me.team)
    };

    for id in roster.by_distance(world, me.tile) {
        if against_me.is_some() && against_friend.is_some() && against_team.is_some() {
            break;
        }
        if id == me.id {
            continue;
        }
        let Some(candidate) = world.combatant(id) else {
            continue;
        };

        if candidate.team == me.team {
            if against_friend.is_none() {
                against_friend = candidate
                    .who_hit_me
                    .filter(|hitter| *hitter != me.id)
                    .filter(|hitter| {
                        world
                            .combatant(*hitter)
                            .is_some_and(|state| state.is_alive() && state.team != me.team)
                    });
            }
            continue;
        }
        if candidate.is_dead() {
            continue;
        }

        if against_me.is_none()
            && (candidate.memory.last_target == Some(me.id) || candidate.who_hit_me == Some(me.id))
        {
            against_me = Some(id);
        } else if against_team.is_none()
            && (on_my_team(candidate.who_hit_me) || on_my_team(candidate.memory.last_target))
        {
            against_team = Some(id);
        }
    }

    let mut found = Candidates::new();
    for id in [against_me, against_friend, against_team].into_iter().flatten() {
        if !found.contains(&id) {
            found.push(id);
        }
    }
    found
}

fn rank<W: World + ?Sized>(
    policy: Option<AttackWho>,
    world: &W,
    me: &CombatantState,
    candidates: &mut Candidates,
) {
    match policy {
        Some(AttackWho::Strongest) => {
            candidates.sort_by_key(|id| Reverse(combat_rating(world, *id)));
        }
        Some(AttackWho::Weakest) => {
            candidates.sort_by_key(|id| combat_rating(world, *id));
        }
        _ => {
            candidates.sort_by_key(|id| {
                world
                    .tile_of(*id)
                    .map_or(u32::MAX, |tile| world.distance(me.tile, tile))
            });
        }
    }
}
