use combat_core::{
    AmmoState, Battlefield, CombatantId, InventoryOracle, ItemDefinition, ItemId, ItemKind,
    ItemOracle, Tile,
};

use crate::world::{Command, GridWorld, Place};

impl GridWorld {
    fn carried_by(&self, item: ItemId, critter: CombatantId) -> bool {
        self.items
            .get(&item)
            .is_some_and(|record| record.place == Place::Carried(critter))
    }

    fn discard(&mut self, item: ItemId) {
        self.items.remove(&item);
        self.wielded.retain(|_, wielded| *wielded != item);
    }
}

impl ItemOracle for GridWorld {
    fn definition(&self, item: ItemId) -> Option<ItemDefinition> {
        self.items.get(&item).map(|record| record.definition)
    }
}

impl InventoryOracle for GridWorld {
    fn wielded(&self, critter: CombatantId) -> Option<ItemId> {
        self.wielded.get(&critter).copied()
    }

    fn inventory(&self, critter: CombatantId, kind: ItemKind) -> Vec<ItemId> {
        self.items
            .iter()
            .filter(|(_, record)| {
                record.place == Place::Carried(critter) && record.definition.kind == kind
            })
            .map(|(id, _)| *id)
            .collect()
    }

    fn ammo(&self, weapon: ItemId) -> AmmoState {
        self.items
            .get(&weapon)
            .map(|record| record.ammo)
            .unwrap_or_default()
    }

    fn can_reload_with(&self, weapon: ItemId, ammo: ItemId) -> bool {
        let accepted = self
            .definition(weapon)
            .and_then(|definition| definition.weapon)
            .and_then(|data| data.ammo);
        match (accepted, self.definition(ammo)) {
            (Some(proto), Some(definition)) => {
                definition.kind == ItemKind::Ammo && definition.proto == proto
            }
            _ => false,
        }
    }

    fn items_near(&self, critter: CombatantId, radius: u32) -> Vec<ItemId> {
        let Some(origin) = self.combatants.get(&critter).map(|state| state.tile) else {
            return Vec::new();
        };
        self.items
            .iter()
            .filter_map(|(id, record)| match record.place {
                Place::Ground(tile) if self.grid.distance(origin, tile) <= radius => Some(*id),
                _ => None,
            })
            .collect()
    }

    fn item_tile(&self, item: ItemId) -> Option<Tile> {
        match self.items.get(&item)?.place {
            Place::Ground(tile) => Some(tile),
            Place::Carried(_) => None,
        }
    }

    fn wield(&mut self, critter: CombatantId, item: ItemId) -> bool {
        let is_weapon = self
            .definition(item)
            .is_some_and(|definition| definition.kind == ItemKind::Weapon);
        if !is_weapon || !self.carried_by(item, critter) {
            return false;
        }
        self.wielded.insert(critter, item);
        self.log(Command::Wield { critter, item });
        true
    }

    fn unwield(&mut self, critter: CombatantId) -> bool {
        if self.wielded.remove(&critter).is_none() {
            return false;
        }
        self.log(Command::Unwield { critter });
        true
    }

    fn reload(&mut self, weapon: ItemId, ammo: ItemId) -> u32 {
        if !self.can_reload_with(weapon, ammo) {
            return 0;
        }
        let (Some(gun), Some(stack)) = (self.items.get(&weapon), self.items.get(&ammo)) else {
            return 0;
        };
        let rounds = gun
            .ammo
            .capacity
            .saturating_sub(gun.ammo.loaded)
            .min(stack.rounds);
        if rounds == 0 {
            return 0;
        }

        if let Some(gun) = self.items.get_mut(&weapon) {
            gun.ammo.loaded += rounds;
        }
        let spent = match self.items.get_mut(&ammo) {
            Some(stack) => {
                stack.rounds -= rounds;
                stack.rounds == 0
            }
            None => false,
        };
        if spent {
            self.discard(ammo);
        }
        self.log(Command::Reload {
            weapon,
            ammo,
            rounds,
        });
        rounds
    }

    fn take_drug(&mut self, critter: CombatantId, drug: ItemId) -> bool {
        let Some(definition) = self.definition(drug) else {
            return false;
        };
        if definition.kind != ItemKind::Drug || !self.carried_by(drug, critter) {
            return false;
        }
        self.discard(drug);
        if definition.is_healing() {
            if let Some(state) = self.combatants.get_mut(&critter) {
                state.hp.restore(Self::HEAL_AMOUNT);
            }
        }
        self.log(Command::TakeDrug { critter, drug });
        true
    }

    fn pick_up(&mut self, critter: CombatantId, item: ItemId) -> Option<ItemId> {
        let tile = self.item_tile(item)?;
        let state = self.combatants.get(&critter)?;
        if self.grid.distance(state.tile, tile) > 1 {
            let budget = state.ap.current;
            self.move_to(critter, tile, budget, false);
        }
        let here = self.combatants.get(&critter)?.tile;
        if self.grid.distance(here, tile) > 1 {
            return None;
        }

        let record = self.items.get_mut(&item)?;
        record.place = Place::Carried(critter);
        self.log(Command::PickUp { critter, item });
        Some(item)
    }

    /// Only light sources can be used; lighting one consumes it.
    fn use_item(&mut self, critter: CombatantId, item: ItemId) -> bool {
        let light = self
            .definition(item)
            .is_some_and(|definition| definition.is_light_source());
        if !light || !self.carried_by(item, critter) {
            return false;
        }
        self.discard(item);
        self.log(Command::UseItem { critter, item });
        true
    }
}
