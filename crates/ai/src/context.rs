//! Shared blackboard for one encounter.
//!
//! [`AiContext`] bundles the read-only inputs every component consults:
//! the profile registry, the engine settings, the random source and the
//! taunt sink. It also owns the roll counter, so every roll in an encounter
//! draws from a distinct, reproducible seed.

use std::cell::Cell;

use combat_core::{
    BehaviorProfile, CombatSettings, CombatantId, CombatantOracle, CombatantState, RngOracle,
    SpatialOracle, TauntEvent, TauntSink, Tile, compute_seed,
};

use crate::error::{Infeasible, PlanResult};
use crate::registry::BehaviorRegistry;

pub struct AiContext<'a> {
    pub registry: &'a BehaviorRegistry,
    pub settings: &'a CombatSettings,
    rng: &'a dyn RngOracle,
    taunts: &'a dyn TauntSink,
    turn: Cell<u32>,
    rolls: Cell<u64>,
}

impl<'a> AiContext<'a> {
    pub fn new(
        registry: &'a BehaviorRegistry,
        settings: &'a CombatSettings,
        rng: &'a dyn RngOracle,
        taunts: &'a dyn TauntSink,
    ) -> Self {
        Self {
            registry,
            settings,
            rng,
            taunts,
            turn: Cell::new(0),
            rolls: Cell::new(0),
        }
    }

    /// Current combat turn, starting at zero.
    pub fn turn(&self) -> u32 {
        self.turn.get()
    }

    pub fn advance_turn(&self) {
        self.turn.set(self.turn.get().wrapping_add(1));
    }

    pub fn profile(&self, combatant: &CombatantState) -> &'a BehaviorProfile {
        self.registry.for_combatant(combatant)
    }

    // ========================================================================
    // Rolls
    // ========================================================================

    fn next_seed(&self, actor: CombatantId) -> u64 {
        let roll = self.rolls.get();
        self.rolls.set(roll.wrapping_add(1));
        compute_seed(self.settings.game_seed, self.turn(), actor.0, roll)
    }

    /// 1..=100.
    pub fn roll_d100(&self, actor: CombatantId) -> u32 {
        self.rng.roll_d100(self.next_seed(actor))
    }

    /// True with `percent` chance.
    pub fn chance(&self, actor: CombatantId, percent: u32) -> bool {
        percent > 0 && self.roll_d100(actor) <= percent
    }

    /// True one time in `n`; always true for `n <= 1`.
    pub fn one_in(&self, actor: CombatantId, n: i32) -> bool {
        self.rng.one_in(self.next_seed(actor), n)
    }

    /// Uniform draw from `min..=max`.
    pub fn range(&self, actor: CombatantId, min: u32, max: u32) -> u32 {
        self.rng.range(self.next_seed(actor), min, max)
    }

    pub fn range_i32(&self, actor: CombatantId, min: i32, max: i32) -> i32 {
        self.rng.range_i32(self.next_seed(actor), min, max)
    }

    pub(crate) fn emit(&self, event: TauntEvent) {
        self.taunts.taunt(event);
    }
}

/// Lookup helpers over the world's combatant and spatial oracles.
pub trait WorldExt: CombatantOracle + SpatialOracle {
    /// The combatant's state, or [`Infeasible::UnknownCombatant`].
    fn state(&self, id: CombatantId) -> PlanResult<&CombatantState> {
        self.combatant(id).ok_or(Infeasible::UnknownCombatant(id))
    }

    fn tile_of(&self, id: CombatantId) -> Option<Tile> {
        self.combatant(id).map(|state| state.tile)
    }

    fn distance_between(&self, a: CombatantId, b: CombatantId) -> Option<u32> {
        Some(self.distance(self.tile_of(a)?, self.tile_of(b)?))
    }

    /// On different teams. Unknown combatants are never hostile.
    fn is_hostile(&self, a: CombatantId, b: CombatantId) -> bool {
        match (self.combatant(a), self.combatant(b)) {
            (Some(a), Some(b)) => a.team != b.team,
            _ => false,
        }
    }

    /// Whether `mover` can walk from its tile to `to`.
    fn has_path(&self, mover: CombatantId, to: Tile) -> bool {
        self.tile_of(mover)
            .is_some_and(|from| from == to || self.find_path(mover, from, to).is_some())
    }
}

impl<T: CombatantOracle + SpatialOracle + ?Sized> WorldExt for T {}

#[cfg(test)]
mod tests {
    use combat_core::{BehaviorProfile, PcgRng, ProfileId, SilentSink};

    use super::*;

    #[test]
    fn rolls_are_reproducible_per_encounter() {
        let registry = BehaviorRegistry::new(vec![BehaviorProfile::new("A", ProfileId(0))])
            .unwrap();
        let settings = CombatSettings::new().with_seed(42);

        let first = AiContext::new(&registry, &settings, &PcgRng, &SilentSink);
        let second = AiContext::new(&registry, &settings, &PcgRng, &SilentSink);
        let a: Vec<u32> = (0..8).map(|_| first.roll_d100(CombatantId(3))).collect();
        let b: Vec<u32> = (0..8).map(|_| second.roll_d100(CombatantId(3))).collect();
        assert_eq!(a, b);
        assert!(a.iter().all(|roll| (1..=100).contains(roll)));
    }

    #[test]
    fn zero_percent_never_fires() {
        let registry = BehaviorRegistry::new(vec![BehaviorProfile::new("A", ProfileId(0))])
            .unwrap();
        let settings = CombatSettings::new();
        let ctx = AiContext::new(&registry, &settings, &PcgRng, &SilentSink);
        assert!((0..50).all(|_| !ctx.chance(CombatantId(1), 0)));
        assert!((0..50).all(|_| ctx.chance(CombatantId(1), 100)));
    }
}
