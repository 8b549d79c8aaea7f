//! Resource Manager: drugs, ammunition and scavenging.
//!
//! Item use costs [`CombatConfig::ITEM_USE_AP`] action points, charged by the
//! planner. Walking to a loose item is charged by the world.

use combat_core::{BodyType, ChemUse, CombatConfig, CombatantId, HitMode, ItemId, ItemKind, World};

use crate::context::{AiContext, WorldExt};
use crate::error::{Infeasible, PlanResult};
use crate::weapon::WeaponSelector;

/// Result of one drug check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrugOutcome {
    /// Drugs swallowed this cycle.
    pub doses: u32,
    /// Still hurt past the healing threshold with nothing left to take.
    pub needs_drugs: bool,
}

pub struct ResourceManager;

impl ResourceManager {
    /// Heals when hurt past the profile's threshold, indulges when the
    /// habit says so, and falls back to scavenging nearby.
    ///
    /// A `clean` profile never takes anything. Only bipeds use drugs.
    pub fn check_drugs<W: World + ?Sized>(
        ctx: &AiContext<'_>,
        world: &mut W,
        id: CombatantId,
    ) -> PlanResult<DrugOutcome> {
        let me = world.state(id)?.clone();
        let mut outcome = DrugOutcome::default();
        if me.body != BodyType::Biped {
            return Ok(outcome);
        }

        let profile = ctx.profile(&me);
        let Some(threshold) = ChemUse::heal_threshold(profile.chem_use) else {
            return Ok(outcome);
        };
        let heal_below = me.hp.fraction(threshold);
        let mut pending = me.memory.last_item.filter(|item| {
            world
                .definition(*item)
                .is_some_and(|definition| matches!(definition.kind, ItemKind::Drug | ItemKind::Misc))
        });
        let mut missing = false;

        if pending.is_none() {
            while hp_of(world, id) < heal_below && ap_of(world, id) >= CombatConfig::ITEM_USE_AP {
                let healing = world.inventory(id, ItemKind::Drug).into_iter().find(|drug| {
                    world
                        .definition(*drug)
                        .is_some_and(|definition| definition.is_healing())
                });
                let Some(drug) = healing else {
                    missing = true;
                    break;
                };
                if !Self::swallow(world, id, drug, &mut outcome) {
                    break;
                }
            }

            let chance = ChemUse::opportunistic_chance(profile.chem_use, ctx.turn());
            if outcome.doses == 0 && chance > 0 && ctx.chance(id, chance) {
                Self::indulge(ctx, world, id, &mut outcome);
            }
        }

        if pending.is_some() || (outcome.doses == 0 && missing) {
            let found = pending
                .take()
                .or_else(|| Self::search_environment(ctx, world, id, ItemKind::Drug))
                .or_else(|| Self::search_environment(ctx, world, id, ItemKind::Misc));
            if let Some(found) = found {
                if let Some(item) = Self::retrieve(world, id, found)? {
                    if ap_of(world, id) > 0 {
                        Self::swallow(world, id, item, &mut outcome);
                    }
                }
            }
        }

        outcome.needs_drugs = missing && outcome.doses == 0 && hp_of(world, id) < heal_below;
        if outcome.doses > 0 || outcome.needs_drugs {
            tracing::debug!(
                "{} drug check: {} doses, needs more: {}",
                id,
                outcome.doses,
                outcome.needs_drugs
            );
        }
        Ok(outcome)
    }

    /// Recreational use, favourite drugs first, up to the habit's limit.
    fn indulge<W: World + ?Sized>(
        ctx: &AiContext<'_>,
        world: &mut W,
        id: CombatantId,
        outcome: &mut DrugOutcome,
    ) {
        let Some(me) = world.combatant(id) else {
            return;
        };
        let profile = ctx.profile(me);
        let limit = ChemUse::dose_limit(profile.chem_use);

        while ap_of(world, id) >= CombatConfig::ITEM_USE_AP {
            let mut desired = None;
            let mut others = Vec::new();
            for drug in world.inventory(id, ItemKind::Drug) {
                let Some(definition) = world.definition(drug) else {
                    continue;
                };
                if definition.is_healing() {
                    continue;
                }
                if profile.desires(definition.proto) {
                    desired.get_or_insert(drug);
                } else {
                    others.push(drug);
                }
            }

            let pick = desired.or_else(|| {
                if others.is_empty() {
                    None
                } else {
                    let index = ctx.range(id, 0, others.len() as u32 - 1) as usize;
                    others.get(index).copied()
                }
            });
            let Some(drug) = pick else {
                break;
            };
            if !Self::swallow(world, id, drug, outcome) {
                break;
            }

            if limit.is_some_and(|limit| outcome.doses >= limit) {
                break;
            }
        }
    }

    fn swallow<W: World + ?Sized>(
        world: &mut W,
        id: CombatantId,
        drug: ItemId,
        outcome: &mut DrugOutcome,
    ) -> bool {
        if !world.take_drug(id, drug) {
            tracing::debug!("{} can't take {}", id, drug);
            return false;
        }
        outcome.doses += 1;
        charge(world, id, CombatConfig::ITEM_USE_AP);
        tracing::debug!("{} takes {}", id, drug);
        true
    }

    /// Reloads the wielded weapon after an empty-chamber shot.
    ///
    /// Tries carried ammunition, then ammunition lying nearby. When both
    /// fail the weapon is put away and `Ok(false)` tells the caller to pick
    /// another one.
    pub fn reload_weapon<W: World + ?Sized>(
        ctx: &AiContext<'_>,
        world: &mut W,
        id: CombatantId,
    ) -> PlanResult<bool> {
        let Some(weapon) = world.wielded(id) else {
            return Err(Infeasible::NoWeapon(id));
        };
        if world.state(id)?.ap.is_empty() {
            return Err(Infeasible::OutOfActionPoints(id));
        }

        let mut ammo = Self::carried_ammo(world, id, weapon);
        if ammo.is_none() {
            if let Some(found) = Self::search_environment(ctx, world, id, ItemKind::Ammo) {
                ammo = Self::retrieve(world, id, found)?;
            }
        }

        if let Some(ammo) = ammo {
            let loaded = world.reload(weapon, ammo);
            charge(world, id, CombatConfig::ITEM_USE_AP);
            if loaded > 0 {
                tracing::debug!("{} reloads {} with {} rounds", id, weapon, loaded);
                return Ok(true);
            }
        }

        tracing::debug!("{} is out of ammo for {}", id, weapon);
        world.unwield(id);
        Ok(false)
    }

    /// Tops up a partly spent weapon from carried ammunition, free of
    /// charge. Used once a fight is over.
    pub fn top_up_ammo<W: World + ?Sized>(world: &mut W, id: CombatantId) -> bool {
        let Some(weapon) = world.wielded(id) else {
            return false;
        };
        let state = world.ammo(weapon);
        if state.capacity == 0 || state.is_full() {
            return false;
        }
        let Some(ammo) = Self::carried_ammo(world, id, weapon) else {
            return false;
        };
        world.reload(weapon, ammo) > 0
    }

    /// Carried ammunition that fits `weapon`.
    pub fn carried_ammo<W: World + ?Sized>(
        world: &W,
        id: CombatantId,
        weapon: ItemId,
    ) -> Option<ItemId> {
        world
            .inventory(id, ItemKind::Ammo)
            .into_iter()
            .find(|ammo| world.can_reload_with(weapon, *ammo))
    }

    /// Nearest loose item of `kind` that `id` can use and reach.
    ///
    /// Only bipeds scavenge, within perception plus five tiles.
    pub fn search_environment<W: World + ?Sized>(
        ctx: &AiContext<'_>,
        world: &W,
        id: CombatantId,
        kind: ItemKind,
    ) -> Option<ItemId> {
        let me = world.combatant(id)?;
        if me.body != BodyType::Biped {
            return None;
        }
        let radius = (me.stats.perception + CombatConfig::ENVIRONMENT_SEARCH_BONUS).max(0) as u32;
        let wielded = world.wielded(id);

        let mut nearby: Vec<(u32, ItemId)> = world
            .items_near(id, radius)
            .into_iter()
            .filter_map(|item| {
                let tile = world.item_tile(item)?;
                Some((world.distance(me.tile, tile), item))
            })
            .collect();
        nearby.sort_by_key(|(distance, item)| (*distance, *item));

        nearby.into_iter().map(|(_, item)| item).find(|item| {
            let Some(definition) = world.definition(*item) else {
                return false;
            };
            if definition.kind != kind {
                return false;
            }
            let usable = match kind {
                ItemKind::Weapon => {
                    WeaponSelector::can_use_weapon(ctx, world, id, *item, HitMode::Primary)
                }
                ItemKind::Ammo => wielded.is_some_and(|weapon| world.can_reload_with(weapon, *item)),
                ItemKind::Drug | ItemKind::Misc => Self::can_use_item(ctx, world, id, *item),
                ItemKind::Armor => false,
            };
            usable
                && world
                    .item_tile(*item)
                    .is_some_and(|tile| world.has_path(id, tile))
        })
    }

    /// Walks to and picks up a loose item.
    ///
    /// `Ok(None)` when it could not be reached this turn; the item is then
    /// remembered and fetched again next cycle.
    pub fn retrieve<W: World + ?Sized>(
        world: &mut W,
        id: CombatantId,
        item: ItemId,
    ) -> PlanResult<Option<ItemId>> {
        if world.state(id)?.ap.is_empty() {
            return Err(Infeasible::OutOfActionPoints(id));
        }

        let carried = world
            .definition(item)
            .is_some_and(|definition| world.inventory(id, definition.kind).contains(&item));
        if carried {
            remember_item(world, id, None);
            return Ok(Some(item));
        }
        if world.item_tile(item).is_none() {
            tracing::debug!("{} lost track of {}", id, item);
            remember_item(world, id, None);
            return Ok(None);
        }

        match world.pick_up(id, item) {
            Some(picked) => {
                remember_item(world, id, None);
                tracing::debug!("{} picks up {}", id, picked);
                Ok(Some(picked))
            }
            None => {
                remember_item(world, id, Some(item));
                tracing::debug!("{} heads for {}", id, item);
                Ok(None)
            }
        }
    }

    /// Favourite drugs always; otherwise healing items, for bright enough
    /// bipeds.
    pub fn can_use_item<W: World + ?Sized>(
        ctx: &AiContext<'_>,
        world: &W,
        id: CombatantId,
        item: ItemId,
    ) -> bool {
        let (Some(me), Some(definition)) = (world.combatant(id), world.definition(item)) else {
            return false;
        };
        if ctx.profile(me).desires(definition.proto) {
            return true;
        }
        me.body == BodyType::Biped
            && me.stats.intelligence >= CombatConfig::MIN_ITEM_INTELLIGENCE
            && definition.is_healing()
    }
}

fn hp_of<W: World + ?Sized>(world: &W, id: CombatantId) -> u32 {
    world.combatant(id).map_or(0, |state| state.hp.current)
}

fn ap_of<W: World + ?Sized>(world: &W, id: CombatantId) -> u32 {
    world.combatant(id).map_or(0, |state| state.ap.current)
}

pub(crate) fn charge<W: World + ?Sized>(world: &mut W, id: CombatantId, amount: u32) {
    if let Some(state) = world.combatant_mut(id) {
        state.ap.spend(amount);
    }
}

fn remember_item<W: World + ?Sized>(world: &mut W, id: CombatantId, item: Option<ItemId>) {
    if let Some(state) = world.combatant_mut(id) {
        state.memory.last_item = item;
    }
}
