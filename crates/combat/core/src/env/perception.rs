use crate::state::CombatantId;

/// Awareness between combatants.
pub trait PerceptionOracle {
    /// Whether `observer` sees or hears `target`.
    ///
    /// Range scales with the observer's perception, the target's sneaking,
    /// and whether combat is under way.
    fn can_perceive(&self, observer: CombatantId, target: CombatantId) -> bool;
}
