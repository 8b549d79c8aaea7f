use crate::profile::MessageKind;
use crate::state::CombatantId;

/// A line to speak; the presentation layer renders `message_id`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TauntEvent {
    pub speaker: CombatantId,
    pub kind: MessageKind,
    pub message_id: i32,
    pub font: i32,
    pub color: i32,
    pub outline_color: i32,
    /// Whether the renderer should censor the text.
    pub filtered: bool,
}

/// Fire-and-forget receiver of taunts.
pub trait TauntSink {
    fn taunt(&self, event: TauntEvent);
}

/// Discards every taunt.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentSink;

impl TauntSink for SilentSink {
    fn taunt(&self, _event: TauntEvent) {}
}
