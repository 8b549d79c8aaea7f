use super::items::ItemKind;
use crate::state::{CombatantId, ItemId, Tile};

/// Rounds loaded in a weapon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AmmoState {
    pub loaded: u32,
    pub capacity: u32,
}

impl AmmoState {
    pub fn is_empty(&self) -> bool {
        self.capacity > 0 && self.loaded == 0
    }

    pub fn is_full(&self) -> bool {
        self.loaded >= self.capacity
    }
}

/// Inventory, equipment and loose items.
pub trait InventoryOracle {
    /// Item in the attacking hand.
    fn wielded(&self, critter: CombatantId) -> Option<ItemId>;

    fn inventory(&self, critter: CombatantId, kind: ItemKind) -> Vec<ItemId>;

    fn ammo(&self, weapon: ItemId) -> AmmoState;

    fn can_reload_with(&self, weapon: ItemId, ammo: ItemId) -> bool;

    /// Items lying within `radius` tiles of `critter`.
    fn items_near(&self, critter: CombatantId, radius: u32) -> Vec<ItemId>;

    /// Ground position of a loose item.
    fn item_tile(&self, item: ItemId) -> Option<Tile>;

    fn wield(&mut self, critter: CombatantId, item: ItemId) -> bool;

    fn unwield(&mut self, critter: CombatantId) -> bool;

    /// Loads rounds from `ammo`; returns how many were loaded.
    fn reload(&mut self, weapon: ItemId, ammo: ItemId) -> u32;

    /// Swallows a drug from the inventory.
    fn take_drug(&mut self, critter: CombatantId, drug: ItemId) -> bool;

    /// Walks to and picks up a loose item, spending action points.
    ///
    /// `None` when it could not be reached this turn.
    fn pick_up(&mut self, critter: CombatantId, item: ItemId) -> Option<ItemId>;

    /// Activates an item in place (lighting a flare).
    fn use_item(&mut self, critter: CombatantId, item: ItemId) -> bool;
}
