//! Taunt emission.
//!
//! Taunts are best effort. Every failure mode here (switched off, silenced,
//! empty range, lost roll) is silent and never affects the decision flow.

use combat_core::{CombatantId, CombatantOracle, MessageKind, TauntEvent};

use crate::context::AiContext;

/// Rolls and emits a taunt for `speaker`. Returns whether one was emitted.
pub fn emit_taunt<W: CombatantOracle + ?Sized>(
    ctx: &AiContext<'_>,
    world: &W,
    speaker: CombatantId,
    kind: MessageKind,
) -> bool {
    if !ctx.settings.taunts {
        return false;
    }
    if speaker.is_player() && ctx.settings.silence_player {
        return false;
    }
    let Some(state) = world.combatant(speaker) else {
        return false;
    };
    if state.damage.is_incapacitated() {
        return false;
    }

    let profile = ctx.profile(state);
    let range = profile.taunts.range(kind);
    if range.is_empty() {
        return false;
    }
    if !ctx.chance(speaker, profile.chance.clamp(0, 100) as u32) {
        return false;
    }

    let event = TauntEvent {
        speaker,
        kind,
        message_id: ctx.range_i32(speaker, range.start, range.end),
        font: profile.font,
        color: profile.color,
        outline_color: profile.outline_color,
        filtered: ctx.settings.language_filter,
    };
    tracing::debug!("{} taunts {:?} with message {}", speaker, kind, event.message_id);
    ctx.emit(event);
    true
}
