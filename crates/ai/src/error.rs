//! Planner errors.
//!
//! None of these reach the caller of a decision cycle as failures: an
//! [`Infeasible`] makes the planner try its next fallback, and a cycle that
//! runs out of fallbacks simply ends.

use combat_core::{CombatantId, ErrorSeverity, GameError, ProfileId};

/// Why a planned step could not be carried out.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Infeasible {
    #[error("{0} is not in the world")]
    UnknownCombatant(CombatantId),

    #[error("{0} has no action points left")]
    OutOfActionPoints(CombatantId),

    #[error("{0} stays put")]
    Stationary(CombatantId),

    #[error("no path for {0}")]
    NoPath(CombatantId),

    #[error("{0} has no usable weapon")]
    NoWeapon(CombatantId),

    #[error("{attacker} cannot attack {target}")]
    AttackFailed {
        attacker: CombatantId,
        target: CombatantId,
    },
}

impl GameError for Infeasible {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownCombatant(_) => ErrorSeverity::Internal,
            _ => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownCombatant(_) => "UNKNOWN_COMBATANT",
            Self::OutOfActionPoints(_) => "OUT_OF_ACTION_POINTS",
            Self::Stationary(_) => "STATIONARY",
            Self::NoPath(_) => "NO_PATH",
            Self::NoWeapon(_) => "NO_WEAPON",
            Self::AttackFailed { .. } => "ATTACK_FAILED",
        }
    }
}

/// Building a [`crate::BehaviorRegistry`] failed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("behavior registry needs at least one profile")]
    Empty,

    #[error("profile {0} is defined twice")]
    Duplicate(ProfileId),
}

impl GameError for RegistryError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Empty => "REGISTRY_EMPTY",
            Self::Duplicate(_) => "REGISTRY_DUPLICATE",
        }
    }
}

pub type PlanResult<T> = Result<T, Infeasible>;
