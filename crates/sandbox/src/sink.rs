use std::cell::RefCell;

use combat_core::{RngOracle, TauntEvent, TauntSink};

/// Keeps every taunt for inspection.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: RefCell<Vec<TauntEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TauntEvent> {
        self.events.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl TauntSink for RecordingSink {
    fn taunt(&self, event: TauntEvent) {
        tracing::debug!("{} says message {}", event.speaker, event.message_id);
        self.events.borrow_mut().push(event);
    }
}

/// Returns the same value for every seed.
///
/// `FixedRng(0)` makes every percentage roll succeed, every one-in-n roll
/// fire, and every range draw its minimum. `FixedRng(99)` makes
/// percentage rolls below 100 fail.
#[derive(Clone, Copy, Debug, Default)]
pub struct FixedRng(pub u32);

impl RngOracle for FixedRng {
    fn next_u32(&self, _seed: u64) -> u32 {
        self.0
    }
}
