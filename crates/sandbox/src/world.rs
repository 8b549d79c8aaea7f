//! [`GridWorld`]: every collaborator of the planner backed by plain maps.
//!
//! Commands apply immediately and are appended to a log, so tests can
//! assert on exactly what a decision cycle asked the world to do.

use std::collections::{BTreeMap, HashMap};

use combat_core::{
    AmmoState, AttackIntent, AttackType, Battlefield, CombatantId, CombatantOracle, CombatantState,
    DamageFlags, HitLocation, HitMode, ItemDefinition, ItemId, PerceptionOracle, Rotation,
    RulesOracle, ShotAssessment, SpatialOracle, TeamId, Tile,
};

use crate::grid::HexGrid;

/// Something the planner made the world do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Move {
        mover: CombatantId,
        from: Tile,
        to: Tile,
        steps: u32,
    },
    Attack {
        attacker: CombatantId,
        intent: AttackIntent,
        hit: bool,
    },
    Wield {
        critter: CombatantId,
        item: ItemId,
    },
    Unwield {
        critter: CombatantId,
    },
    Reload {
        weapon: ItemId,
        ammo: ItemId,
        rounds: u32,
    },
    TakeDrug {
        critter: CombatantId,
        drug: ItemId,
    },
    PickUp {
        critter: CombatantId,
        item: ItemId,
    },
    UseItem {
        critter: CombatantId,
        item: ItemId,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Place {
    Carried(CombatantId),
    Ground(Tile),
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct ItemRecord {
    pub definition: ItemDefinition,
    pub place: Place,
    pub ammo: AmmoState,
    /// Rounds left in an ammunition stack.
    pub rounds: u32,
}

/// Hex-grid encounter map.
#[derive(Clone, Debug)]
pub struct GridWorld {
    pub(crate) grid: HexGrid,
    pub(crate) combatants: BTreeMap<CombatantId, CombatantState>,
    pub(crate) items: BTreeMap<ItemId, ItemRecord>,
    pub(crate) wielded: HashMap<CombatantId, ItemId>,
    pub(crate) skills: HashMap<CombatantId, i32>,
    pub(crate) attacks_resolved: u32,
    next_item: u32,
    commands: Vec<Command>,
}

impl GridWorld {
    /// Skill used when none is set for a combatant.
    pub const DEFAULT_SKILL: i32 = 60;
    /// Hit points restored by a healing drug.
    pub const HEAL_AMOUNT: u32 = 10;
    /// Rounds in a fresh ammunition stack.
    pub const AMMO_STACK: u32 = 24;

    pub fn new(width: u32, height: u32) -> Self {
        Self {
            grid: HexGrid::new(width, height),
            combatants: BTreeMap::new(),
            items: BTreeMap::new(),
            wielded: HashMap::new(),
            skills: HashMap::new(),
            attacks_resolved: 0,
            next_item: 1,
            commands: Vec::new(),
        }
    }

    pub fn tile(&self, q: i32, r: i32) -> Tile {
        self.grid.tile(q, r)
    }

    pub fn coords(&self, tile: Tile) -> (i32, i32) {
        self.grid.coords(tile)
    }

    #[must_use]
    pub fn with_combatant(mut self, state: CombatantState) -> Self {
        self.add_combatant(state);
        self
    }

    #[must_use]
    pub fn with_wall(mut self, q: i32, r: i32) -> Self {
        let tile = self.grid.tile(q, r);
        self.grid.add_wall(tile);
        self
    }

    pub fn add_combatant(&mut self, state: CombatantState) {
        self.combatants.insert(state.id, state);
    }

    pub fn combatant_ids(&self) -> Vec<CombatantId> {
        self.combatants.keys().copied().collect()
    }

    pub fn set_skill(&mut self, id: CombatantId, skill: i32) {
        self.skills.insert(id, skill);
    }

    /// Puts a new item in `owner`'s pack.
    pub fn give(&mut self, owner: CombatantId, definition: ItemDefinition) -> ItemId {
        self.spawn(definition, Place::Carried(owner))
    }

    /// Puts a new item in `owner`'s hand, fully loaded.
    pub fn equip(&mut self, owner: CombatantId, definition: ItemDefinition) -> ItemId {
        let item = self.give(owner, definition);
        self.wielded.insert(owner, item);
        item
    }

    /// Leaves a new item on the ground.
    pub fn drop_item(&mut self, tile: Tile, definition: ItemDefinition) -> ItemId {
        self.spawn(definition, Place::Ground(tile))
    }

    pub fn set_ammo(&mut self, weapon: ItemId, loaded: u32, capacity: u32) {
        if let Some(record) = self.items.get_mut(&weapon) {
            record.ammo = AmmoState { loaded, capacity };
        }
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    pub fn hp_of(&self, id: CombatantId) -> u32 {
        self.combatants.get(&id).map_or(0, |state| state.hp.current)
    }

    pub fn ap_of(&self, id: CombatantId) -> u32 {
        self.combatants.get(&id).map_or(0, |state| state.ap.current)
    }

    /// Living members of `team`.
    pub fn survivors(&self, team: TeamId) -> usize {
        self.combatants
            .values()
            .filter(|state| state.team == team && state.is_alive())
            .count()
    }

    fn spawn(&mut self, definition: ItemDefinition, place: Place) -> ItemId {
        let id = ItemId(self.next_item);
        self.next_item += 1;
        let capacity = crate::presets::magazine(&definition);
        self.items.insert(
            id,
            ItemRecord {
                definition,
                place,
                ammo: AmmoState {
                    loaded: capacity,
                    capacity,
                },
                rounds: Self::AMMO_STACK,
            },
        );
        id
    }

    pub(crate) fn log(&mut self, command: Command) {
        tracing::trace!("{:?}", command);
        self.commands.push(command);
    }

    pub(crate) fn occupant(&self, tile: Tile) -> Option<CombatantId> {
        self.combatants
            .values()
            .find(|state| state.tile == tile && state.is_alive())
            .map(|state| state.id)
    }

    pub(crate) fn skill(&self, id: CombatantId) -> i32 {
        self.skills.get(&id).copied().unwrap_or(Self::DEFAULT_SKILL)
    }

    /// Applies damage and marks the dead.
    pub(crate) fn wound(&mut self, id: CombatantId, damage: u32) {
        let Some(state) = self.combatants.get_mut(&id) else {
            return;
        };
        state.hp.spend(damage);
        state.damage_last_turn += damage;
        if state.hp.is_empty() {
            state.damage.insert(DamageFlags::DEAD);
            tracing::debug!("{} is killed", id);
        }
    }
}

impl CombatantOracle for GridWorld {
    fn combatant(&self, id: CombatantId) -> Option<&CombatantState> {
        self.combatants.get(&id)
    }

    fn combatant_mut(&mut self, id: CombatantId) -> Option<&mut CombatantState> {
        self.combatants.get_mut(&id)
    }
}

impl SpatialOracle for GridWorld {
    fn distance(&self, from: Tile, to: Tile) -> u32 {
        self.grid.distance(from, to)
    }

    fn rotation_towards(&self, from: Tile, to: Tile) -> Rotation {
        self.grid.rotation_towards(from, to)
    }

    fn tile_in_direction(&self, tile: Tile, rotation: Rotation, distance: u32) -> Tile {
        self.grid.tile_in_direction(tile, rotation, distance)
    }

    fn find_path(&self, mover: CombatantId, from: Tile, to: Tile) -> Option<Vec<Rotation>> {
        self.grid.path(from, to, |tile| {
            self.occupant(tile).is_some_and(|other| other != mover)
        })
    }

    fn is_tile_blocked(&self, tile: Tile) -> bool {
        self.grid.is_wall(tile) || self.occupant(tile).is_some()
    }

    fn is_sight_blocked(&self, from: Tile, to: Tile) -> bool {
        self.grid
            .line(from, to)
            .into_iter()
            .take_while(|tile| *tile != to)
            .any(|tile| self.grid.is_wall(tile))
    }

    fn straight_line(&self, from: Tile, to: Tile) -> Vec<Tile> {
        self.grid.line(from, to)
    }
}

impl PerceptionOracle for GridWorld {
    /// `perception × 5` tiles with a clear view, `perception × 2` without.
    fn can_perceive(&self, observer: CombatantId, target: CombatantId) -> bool {
        if observer == target {
            return true;
        }
        let (Some(me), Some(other)) = (self.combatant(observer), self.combatant(target)) else {
            return false;
        };
        let perception = me.stats.perception.max(0) as u32;
        let distance = self.grid.distance(me.tile, other.tile);
        if self.is_sight_blocked(me.tile, other.tile) {
            distance <= perception * 2
        } else {
            distance <= perception * 5
        }
    }
}

impl Battlefield for GridWorld {
    fn move_to(&mut self, mover: CombatantId, tile: Tile, ap_budget: u32, run: bool) -> u32 {
        let Some(state) = self.combatants.get(&mover) else {
            return 0;
        };
        let from = state.tile;
        let budget = ap_budget.min(state.ap.current);
        let Some(path) = self.find_path(mover, from, tile) else {
            return 0;
        };

        let mut current = from;
        let mut steps = 0;
        for rotation in path.iter().take(budget as usize) {
            let next = self.grid.tile_in_direction(current, *rotation, 1);
            if self.occupant(next).is_some_and(|other| other != mover) {
                break;
            }
            current = next;
            steps += 1;
        }
        if steps == 0 {
            return 0;
        }

        if let Some(state) = self.combatants.get_mut(&mover) {
            state.tile = current;
            state.ap.spend(steps);
        }
        tracing::trace!("{} {} to {}", mover, if run { "runs" } else { "walks" }, current);
        self.log(Command::Move {
            mover,
            from,
            to: current,
            steps,
        });
        steps
    }

    /// Hits when a deterministic 0..100 roll lands under the hit chance.
    fn resolve_attack(&mut self, attacker: CombatantId, intent: &AttackIntent) -> bool {
        let wielded = self.wielded.get(&attacker).copied();
        let weapon_ok = match intent.mode {
            HitMode::Punch => intent.weapon.is_none(),
            HitMode::Primary | HitMode::Secondary => {
                intent.weapon.is_some() && intent.weapon == wielded
            }
        };
        if !weapon_ok {
            return false;
        }
        if self.classify_shot(attacker, intent.target, intent.mode) != ShotAssessment::Ok {
            return false;
        }

        let aimed = !matches!(intent.location, HitLocation::Torso | HitLocation::Uncalled);
        let cost = self.attack_cost(attacker, intent.mode, aimed);
        let chance = self.to_hit(attacker, intent.target, intent.location, intent.mode);
        let roll = (self.attacks_resolved * 37 + 11) % 100;
        self.attacks_resolved += 1;
        let hit = (roll as i32) < chance;

        if let Some(state) = self.combatants.get_mut(&attacker) {
            state.ap.spend(cost);
        }
        if let Some(weapon) = intent.weapon {
            if let Some(record) = self.items.get_mut(&weapon) {
                record.ammo.loaded = record.ammo.loaded.saturating_sub(1);
            }
        }
        if self.attack_type(intent.weapon, intent.mode) == Some(AttackType::Throw) {
            let landing = self.combatants.get(&intent.target).map(|state| state.tile);
            if let (Some(weapon), Some(landing)) = (intent.weapon, landing) {
                self.wielded.remove(&attacker);
                if let Some(record) = self.items.get_mut(&weapon) {
                    record.place = Place::Ground(landing);
                }
            }
        }

        if hit {
            let damage = self.damage_of(attacker, intent);
            self.wound(intent.target, damage);
            for bystander in self.splash_victims(intent) {
                self.wound(bystander, damage / 2);
            }
        }
        self.log(Command::Attack {
            attacker,
            intent: *intent,
            hit,
        });
        true
    }
}
