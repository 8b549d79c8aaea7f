//! Combat Roster: the bounded working set of one encounter.
//!
//! Slots keep insertion order. Removal leaves a tombstone so that an index
//! held by the lookup table never shifts, which keeps both lookup and
//! removal O(1). Algorithms that need a different order take a snapshot
//! (see [`CombatRoster::by_distance`]) and never reorder the roster itself.

use std::collections::HashMap;

use arrayvec::ArrayVec;
use combat_core::{CombatConfig, CombatantId, CombatantOracle, SpatialOracle, Tile};

#[derive(Clone, Debug, Default)]
pub struct CombatRoster {
    slots: ArrayVec<Option<CombatantId>, { CombatConfig::MAX_ROSTER }>,
    index: HashMap<CombatantId, usize>,
}

impl CombatRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a combatant. Returns `false` for duplicates or a full roster.
    pub fn insert(&mut self, id: CombatantId) -> bool {
        if self.index.contains_key(&id) {
            return false;
        }
        if self.slots.is_full() {
            self.compact();
        }
        if self.slots.try_push(Some(id)).is_err() {
            tracing::warn!("roster is full, {} left out", id);
            return false;
        }
        self.index.insert(id, self.slots.len() - 1);
        true
    }

    pub fn remove(&mut self, id: CombatantId) -> bool {
        match self.index.remove(&id) {
            Some(slot) => {
                self.slots[slot] = None;
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: CombatantId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.index.clear();
    }

    /// Members in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = CombatantId> + '_ {
        self.slots.iter().flatten().copied()
    }

    /// Snapshot of the members sorted by distance from `origin`, nearest
    /// first. Ties keep insertion order. Members unknown to the world are
    /// left out.
    pub fn by_distance<W>(&self, world: &W, origin: Tile) -> Vec<CombatantId>
    where
        W: CombatantOracle + SpatialOracle + ?Sized,
    {
        let mut ranked: Vec<(u32, CombatantId)> = self
            .iter()
            .filter_map(|id| {
                let state = world.combatant(id)?;
                Some((world.distance(origin, state.tile), id))
            })
            .collect();
        ranked.sort_by_key(|(distance, _)| *distance);
        ranked.into_iter().map(|(_, id)| id).collect()
    }

    /// Drops tombstones and rebuilds the index.
    fn compact(&mut self) {
        self.slots.retain(|slot| slot.is_some());
        self.index = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(slot, id)| id.map(|id| (id, slot)))
            .collect();
    }
}

impl FromIterator<CombatantId> for CombatRoster {
    fn from_iter<I: IntoIterator<Item = CombatantId>>(iter: I) -> Self {
        let mut roster = Self::new();
        for id in iter {
            roster.insert(id);
        }
        roster
    }
}
