use crate::combat::AttackIntent;
use crate::state::{CombatantId, Tile};

/// Commands that change the battlefield.
///
/// Commands apply instantly from the planner's point of view and debit the
/// actor's action points; playback is the presentation layer's concern.
pub trait Battlefield {
    /// Walks (or runs) towards `tile`, spending at most `ap_budget`.
    /// Returns the number of steps taken.
    fn move_to(&mut self, mover: CombatantId, tile: Tile, ap_budget: u32, run: bool) -> u32;

    /// Resolves one attack; `true` when it was carried out.
    fn resolve_attack(&mut self, attacker: CombatantId, intent: &AttackIntent) -> bool;
}
