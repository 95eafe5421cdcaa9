// ═══════════════════════════════════════════════════════════════════════
// Ability selection — which special ability a unit reaches for, and on whom
// ═══════════════════════════════════════════════════════════════════════

use crate::profile::{AiProfile, Stance};
use gambit_engine::abilities::{get_ability, preferred_abilities, AbilityCategory, AbilityDef, Targeting};
use gambit_engine::types::*;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

/// Minimum energy before a unit considers any ability.
pub const MIN_ABILITY_ENERGY: u32 = 3;

/// Category search order for a profile.
pub fn category_order(profile: &AiProfile) -> [AbilityCategory; 3] {
    use AbilityCategory::*;
    match profile.stance() {
        Stance::Attack => [Offensive, Support, Defensive],
        Stance::Defense => [Defensive, Support, Offensive],
        Stance::Neutral => [Support, Defensive, Offensive],
    }
}

/// Usable abilities of `category` for `unit`: owned, preferred by its role,
/// in the catalog, off cooldown and affordable.
fn candidates(unit: &Unit, category: AbilityCategory) -> Vec<&'static AbilityDef> {
    preferred_abilities(unit.unit_type, category)
        .iter()
        .filter(|name| unit.ability_ready(name))
        .filter_map(|name| get_ability(name))
        .filter(|def| def.category == category && unit.energy >= def.energy_cost)
        .collect()
}

/// Try each category in profile order. The first category with a usable ability
/// picks one at random; if it finds no target the search moves on.
pub fn select_ability<R: Rng>(
    unit: &Unit,
    profile: &AiProfile,
    friendly: &[Unit],
    opposing: &[Unit],
    rng: &mut R,
) -> Option<Action> {
    for category in category_order(profile) {
        let pool = candidates(unit, category);
        let Some(def) = pool.choose(rng) else {
            continue;
        };
        match resolve_target(def, unit, friendly, opposing, rng) {
            Some(target) => {
                debug!(unit = %unit.id, ability = def.name, target = %target, "ability chosen");
                return Some(Action::ability(unit.id, def.name, target));
            }
            None => continue,
        }
    }
    None
}

/// First unit maximising `key`, ties kept in slice order.
fn first_max_by<'a, F>(units: impl Iterator<Item = &'a Unit>, key: F) -> Option<&'a Unit>
where
    F: Fn(&Unit) -> i64,
{
    units.fold(None, |best: Option<&Unit>, u| match best {
        Some(b) if key(b) >= key(u) => Some(b),
        _ => Some(u),
    })
}

pub fn resolve_target<R: Rng>(
    def: &AbilityDef,
    caster: &Unit,
    friendly: &[Unit],
    opposing: &[Unit],
    rng: &mut R,
) -> Option<UnitId> {
    let allies = friendly
        .iter()
        .filter(|a| a.id != caster.id && a.is_alive() && caster.in_range(a, def.range));
    let enemies = opposing
        .iter()
        .filter(|e| e.is_alive() && caster.in_range(e, def.range));

    match def.targeting {
        Targeting::SelfOnly => Some(caster.id),
        Targeting::WoundedAlly => allies
            .filter(|a| a.health < a.max_health)
            .min_by_key(|a| a.health)
            .map(|a| a.id),
        Targeting::StrongestAlly => first_max_by(allies, |a| a.attack as i64).map(|a| a.id),
        Targeting::RichestEnemy => first_max_by(enemies, |e| e.energy as i64).map(|e| e.id),
        Targeting::AnyEnemy => {
            let pool: Vec<&Unit> = enemies.collect();
            pool.choose(rng).map(|e| e.id)
        }
    }
}
