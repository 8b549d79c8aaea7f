//! Retreat/Morale Controller.
//!
//! Morale lives in the combatant's maneuver flags so it persists across
//! cycles: `FLEEING` once the combatant breaks, `DISENGAGING` once it is
//! far enough from the threat to stop attacking.

use combat_core::{
    BehaviorProfile, CombatantId, CombatantState, ManeuverFlags, MessageKind, World,
};

use crate::context::{AiContext, WorldExt};
use crate::error::PlanResult;
use crate::position::Positioner;
use crate::taunt::emit_taunt;

/// Effective morale of a combatant for one cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum MoraleState {
    #[default]
    Engaged,
    Fleeing,
    Disengaging,
}

impl MoraleState {
    pub fn of(state: &CombatantState) -> Self {
        if state.maneuver.contains(ManeuverFlags::DISENGAGING) {
            Self::Disengaging
        } else if state.maneuver.contains(ManeuverFlags::FLEEING) {
            Self::Fleeing
        } else {
            Self::Engaged
        }
    }
}

pub struct MoraleController;

impl MoraleController {
    /// Whether `state` breaks this cycle.
    ///
    /// Already fleeing, hurt in a way the profile cannot bear, below the
    /// morale threshold, or out of drugs it needs.
    pub fn should_flee(profile: &BehaviorProfile, state: &CombatantState, needs_drugs: bool) -> bool {
        state.is_fleeing()
            || profile.is_hurt_too_much(state.damage)
            || i64::from(state.hp.current) < i64::from(profile.min_hp)
            || needs_drugs
    }

    /// Flags the combatant as fleeing when its morale breaks and reports
    /// the resulting state.
    pub fn assess<W: World + ?Sized>(
        ctx: &AiContext<'_>,
        world: &mut W,
        id: CombatantId,
        needs_drugs: bool,
    ) -> PlanResult<MoraleState> {
        let state = world.state(id)?;
        let profile = ctx.profile(state);
        if !Self::should_flee(profile, state, needs_drugs) {
            return Ok(MoraleState::of(state));
        }

        tracing::debug!(
            "{} breaks: hp {}/{} (min {}), damage {:?}, needs drugs {}",
            id,
            state.hp.current,
            state.hp.maximum,
            profile.min_hp,
            state.damage,
            needs_drugs
        );
        if let Some(state) = world.combatant_mut(id) {
            state.maneuver.insert(ManeuverFlags::FLEEING);
        }
        Ok(MoraleState::of(world.state(id)?))
    }

    /// Runs from `threat`, or from the player when there is none.
    ///
    /// Within the profile's engagement radius the combatant spends every
    /// action point getting away; beyond it, it simply disengages.
    pub fn run_away<W: World + ?Sized>(
        ctx: &AiContext<'_>,
        world: &mut W,
        id: CombatantId,
        threat: Option<CombatantId>,
    ) -> PlanResult<MoraleState> {
        let me = world.state(id)?.clone();
        let profile = ctx.profile(&me);

        let anchor = threat
            .filter(|threat| *threat != id)
            .or((!me.is_player()).then_some(CombatantId::PLAYER));
        let distance = anchor.and_then(|anchor| world.distance_between(id, anchor));
        let anchor_tile = anchor.and_then(|anchor| world.tile_of(anchor));

        match (distance, anchor_tile) {
            (Some(distance), Some(from)) if i64::from(distance) < i64::from(profile.max_dist) => {
                set_flag(world, id, ManeuverFlags::FLEEING);
                emit_taunt(ctx, world, id, MessageKind::Run);
                match Positioner::run_from(world, id, from) {
                    Ok(steps) => tracing::debug!("{} runs {} tiles from {}", id, steps, from),
                    Err(error) => tracing::debug!("{} cannot run: {}", id, error),
                }
            }
            _ => {
                tracing::debug!("{} is far enough away and stops attacking", id);
                set_flag(world, id, ManeuverFlags::DISENGAGING);
            }
        }
        Ok(MoraleState::of(world.state(id)?))
    }
}

pub(crate) fn set_flag<W: World + ?Sized>(world: &mut W, id: CombatantId, flag: ManeuverFlags) {
    if let Some(state) = world.combatant_mut(id) {
        state.maneuver.insert(flag);
    }
}

#[cfg(test)]
mod tests {
    use combat_core::{DamageFlags, ProfileId, TeamId, Tile};

    use super::*;

    fn guard() -> (BehaviorProfile, CombatantState) {
        let mut profile = BehaviorProfile::new("Guard", ProfileId(1));
        profile.min_hp = 15;
        profile.hurt_too_much = DamageFlags::BLIND;
        let state = CombatantState::new(CombatantId(4), TeamId(1), ProfileId(1), Tile(0))
            .with_hp(40, 50);
        (profile, state)
    }

    #[test]
    fn breaks_strictly_below_min_hp() {
        let (profile, state) = guard();
        assert!(!MoraleController::should_flee(&profile, &state.clone().with_hp(15, 50), false));
        assert!(MoraleController::should_flee(&profile, &state.with_hp(14, 50), false));
    }

    #[test]
    fn hurt_mask_and_missing_drugs_break_morale() {
        let (profile, mut state) = guard();
        assert!(MoraleController::should_flee(&profile, &state, true));
        state.damage |= DamageFlags::BLIND;
        assert!(MoraleController::should_flee(&profile, &state, false));
    }

    #[test]
    fn flags_map_to_morale_state() {
        let (_, mut state) = guard();
        assert_eq!(MoraleState::of(&state), MoraleState::Engaged);
        state.maneuver.insert(ManeuverFlags::FLEEING);
        assert_eq!(MoraleState::of(&state), MoraleState::Fleeing);
        state.maneuver.insert(ManeuverFlags::DISENGAGING);
        assert_eq!(MoraleState::of(&state), MoraleState::Disengaging);
        assert_eq!(MoraleState::Disengaging.to_string(), "disengaging");
    }
}
