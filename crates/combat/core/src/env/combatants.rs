use crate::state::{CombatantId, CombatantState};

/// Owner of every [`CombatantState`].
pub trait CombatantOracle {
    fn combatant(&self, id: CombatantId) -> Option<&CombatantState>;

    fn combatant_mut(&mut self, id: CombatantId) -> Option<&mut CombatantState>;
}
