//! Combat strength rating used for target ranking, sniping and
//! friendly-fire deference.

use combat_core::{CombatantId, World};

/// Best of unarmed and wielded-weapon maximum damage (doubled for a
/// special perk), plus armor class. Dead or unconscious combatants rate 0.
pub fn combat_rating<W: World + ?Sized>(world: &W, id: CombatantId) -> i32 {
    let Some(state) = world.combatant(id) else {
        return 0;
    };
    if state.damage.is_incapacitated() {
        return 0;
    }

    let weapon_damage = world
        .wielded(id)
        .and_then(|item| world.definition(item))
        .and_then(|definition| definition.weapon)
        .map_or(0, |weapon| {
            if weapon.special_perk {
                weapon.damage_max * 2
            } else {
                weapon.damage_max
            }
        });

    state.stats.melee_damage.max(weapon_damage) + state.stats.armor_class
}
