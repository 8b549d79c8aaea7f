//! Per-combatant runtime state.
//!
//! The world owns one [`CombatantState`] per critter and keeps it across
//! encounters; the planner reads it through
//! [`crate::env::CombatantOracle`] and writes only the planner-owned fields
//! (maneuver flags, `who_hit_me`, [`AiMemory`], drug/reload action points).

use super::common::{CombatantId, ItemId, ResourceMeter, TeamId, Tile};
use super::flags::{DamageFlags, ManeuverFlags};
use crate::profile::ProfileId;

/// Body plan; only bipeds handle items and drugs.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum BodyType {
    #[default]
    Biped,
    Quadruped,
    Robotic,
}

impl BodyType {
    /// Whether this body can pick up and wield items.
    pub fn handles_items(self) -> bool {
        matches!(self, Self::Biped | Self::Robotic)
    }
}

/// Attributes the planner consults. Skills live behind the rules oracle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantStats {
    pub intelligence: i32,
    pub perception: i32,
    pub armor_class: i32,
    pub melee_damage: i32,
}

impl Default for CombatantStats {
    fn default() -> Self {
        Self {
            intelligence: 5,
            perception: 5,
            armor_class: 0,
            melee_damage: 1,
        }
    }
}

/// Decision memory carried from one cycle to the next.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AiMemory {
    /// Whoever this combatant attacked most recently.
    pub last_target: Option<CombatantId>,
    /// Item being fetched from the ground; resumed next cycle.
    pub last_item: Option<ItemId>,
    /// An ally whose corpse this combatant saw with no visible killer.
    pub friendly_dead: Option<CombatantId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantState {
    pub id: CombatantId,
    pub team: TeamId,
    pub profile: ProfileId,
    pub tile: Tile,
    pub hp: ResourceMeter,
    pub ap: ResourceMeter,
    pub stats: CombatantStats,
    pub body: BodyType,
    pub party_member: bool,
    pub maneuver: ManeuverFlags,
    pub damage: DamageFlags,
    /// Weak relation to the last attacker. Never points at a teammate.
    pub who_hit_me: Option<CombatantId>,
    pub memory: AiMemory,
    /// Hit points lost since this combatant's previous turn.
    pub damage_last_turn: u32,
}

impl CombatantState {
    pub fn new(id: CombatantId, team: TeamId, profile: ProfileId, tile: Tile) -> Self {
        Self {
            id,
            team,
            profile,
            tile,
            hp: ResourceMeter::full(30),
            ap: ResourceMeter::full(8),
            stats: CombatantStats::default(),
            body: BodyType::default(),
            party_member: false,
            maneuver: ManeuverFlags::empty(),
            damage: DamageFlags::empty(),
            who_hit_me: None,
            memory: AiMemory::default(),
            damage_last_turn: 0,
        }
    }

    #[must_use]
    pub fn with_hp(mut self, current: u32, maximum: u32) -> Self {
        self.hp = ResourceMeter::new(current, maximum);
        self
    }

    #[must_use]
    pub fn with_ap(mut self, current: u32, maximum: u32) -> Self {
        self.ap = ResourceMeter::new(current, maximum);
        self
    }

    #[must_use]
    pub fn with_stats(mut self, stats: CombatantStats) -> Self {
        self.stats = stats;
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: BodyType) -> Self {
        self.body = body;
        self
    }

    #[must_use]
    pub fn in_party(mut self) -> Self {
        self.party_member = true;
        self.team = TeamId::PLAYER;
        self
    }

    pub fn is_dead(&self) -> bool {
        self.damage.contains(DamageFlags::DEAD)
    }

    pub fn is_alive(&self) -> bool {
        !self.is_dead()
    }

    /// Alive, conscious and not skipping this turn.
    pub fn can_act(&self) -> bool {
        !self.damage.is_incapacitated() && !self.damage.contains(DamageFlags::LOSE_TURN)
    }

    pub fn is_fleeing(&self) -> bool {
        self.maneuver.contains(ManeuverFlags::FLEEING)
    }

    pub fn is_player(&self) -> bool {
        self.id.is_player()
    }

    /// Records an attacker, refusing teammates.
    pub fn remember_attacker(&mut self, attacker: CombatantId, attacker_team: TeamId) {
        if attacker_team != self.team {
            self.who_hit_me = Some(attacker);
        }
    }

    /// Drops every relation pointing at `other`.
    pub fn forget(&mut self, other: CombatantId) {
        if self.who_hit_me == Some(other) {
            self.who_hit_me = None;
        }
        if self.memory.last_target == Some(other) {
            self.memory.last_target = None;
        }
        if self.memory.friendly_dead == Some(other) {
            self.memory.friendly_dead = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raider(id: u32) -> CombatantState {
        CombatantState::new(CombatantId(id), TeamId(2), ProfileId(10), Tile(0))
    }

    #[test]
    fn remember_attacker_ignores_teammates() {
        let mut state = raider(1);
        state.remember_attacker(CombatantId(2), TeamId(2));
        assert_eq!(state.who_hit_me, None);
        state.remember_attacker(CombatantId::PLAYER, TeamId::PLAYER);
        assert_eq!(state.who_hit_me, Some(CombatantId::PLAYER));
    }

    #[test]
    fn forget_clears_all_relations() {
        let mut state = raider(1);
        state.who_hit_me = Some(CombatantId(7));
        state.memory.last_target = Some(CombatantId(7));
        state.memory.friendly_dead = Some(CombatantId(7));
        state.forget(CombatantId(7));
        assert_eq!(state.who_hit_me, None);
        assert_eq!(state.memory, AiMemory::default());
    }

    #[test]
    fn knocked_out_combatant_cannot_act() {
        let mut state = raider(1);
        assert!(state.can_act());
        state.damage |= DamageFlags::KNOCKED_OUT;
        assert!(!state.can_act());
        assert!(state.is_alive());
    }
}
