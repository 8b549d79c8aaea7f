//! Common error infrastructure for combat-core.
//!
//! Errors carry a severity so callers can decide between retrying with a
//! fallback strategy, rejecting input, or aborting. Nothing the planner
//! does for a single combatant is ever fatal; only configuration loading
//! produces [`ErrorSeverity::Fatal`] errors.

use crate::state::CombatantId;

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// The planner tries the next fallback (switch weapon, move closer, flee).
    Recoverable,

    /// Invalid input rejected with caller state unchanged.
    Validation,

    /// World state contradicts itself (e.g. an unknown combatant id).
    Internal,

    /// Startup cannot continue.
    Fatal,
}

impl ErrorSeverity {
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Common trait for all combat errors.
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Stable SCREAMING_SNAKE code for logs and telemetry.
    fn error_code(&self) -> &'static str;
}

/// A profile setter was handed a value outside the setting's range.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SettingError {
    #[error("{setting} value {value} is out of range 0..{limit}")]
    OutOfRange {
        setting: &'static str,
        value: i32,
        limit: i32,
    },

    #[error("{combatant} has no disposition family")]
    NotAPartyMember { combatant: CombatantId },
}

impl GameError for SettingError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::OutOfRange { .. } => "SETTING_OUT_OF_RANGE",
            Self::NotAPartyMember { .. } => "SETTING_NOT_PARTY_MEMBER",
        }
    }
}
