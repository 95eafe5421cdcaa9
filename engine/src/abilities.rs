// ═══════════════════════════════════════════════════════════════════════
// Abilities — static catalog and per-role preference tables
// ═══════════════════════════════════════════════════════════════════════

use crate::types::UnitType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityCategory {
    Offensive,
    Defensive,
    Support,
}

/// How an ability picks its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Targeting {
    /// Pure self-buff.
    SelfOnly,
    /// Lowest-health wounded ally within `range`.
    WoundedAlly,
    /// Highest-attack ally (buff transfer).
    StrongestAlly,
    /// Opposing unit with the most energy.
    RichestEnemy,
    /// Any opposing unit, chosen at random.
    AnyEnemy,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AbilityEffect {
    /// Damage with the caster's attack scaled by a multiplier.
    Strike { multiplier: f64 },
    DrainEnergy(u32),
    Heal(i32),
    BuffAttack(i32),
    BuffDefense(i32),
}

/// Static description of an ability (compile-time constant).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbilityDef {
    pub name: &'static str,
    pub category: AbilityCategory,
    pub targeting: Targeting,
    pub energy_cost: u32,
    pub cooldown: u32,
    /// Manhattan reach from the caster. Ignored for self-targeted abilities.
    pub range: u32,
    pub effect: AbilityEffect,
}

use AbilityCategory::*;
use Targeting::*;

pub const ABILITIES: [AbilityDef; 12] = [
    // Offensive
    AbilityDef { name: "charge",  category: Offensive, targeting: AnyEnemy,      energy_cost: 3, cooldown: 2, range: 2, effect: AbilityEffect::Strike { multiplier: 1.5 } },
    AbilityDef { name: "fork",    category: Offensive, targeting: AnyEnemy,      energy_cost: 4, cooldown: 3, range: 3, effect: AbilityEffect::Strike { multiplier: 1.2 } },
    AbilityDef { name: "smite",   category: Offensive, targeting: AnyEnemy,      energy_cost: 4, cooldown: 2, range: 3, effect: AbilityEffect::Strike { multiplier: 2.0 } },
    AbilityDef { name: "bombard", category: Offensive, targeting: AnyEnemy,      energy_cost: 5, cooldown: 3, range: 4, effect: AbilityEffect::Strike { multiplier: 1.8 } },
    AbilityDef { name: "drain",   category: Offensive, targeting: RichestEnemy,  energy_cost: 3, cooldown: 2, range: 3, effect: AbilityEffect::DrainEnergy(3) },
    // Defensive
    AbilityDef { name: "fortify", category: Defensive, targeting: SelfOnly,      energy_cost: 3, cooldown: 3, range: 0, effect: AbilityEffect::BuffDefense(3) },
    AbilityDef { name: "ward",    category: Defensive, targeting: SelfOnly,      energy_cost: 3, cooldown: 2, range: 0, effect: AbilityEffect::BuffDefense(2) },
    // Support
    AbilityDef { name: "heal",    category: Support,   targeting: WoundedAlly,   energy_cost: 4, cooldown: 2, range: 2, effect: AbilityEffect::Heal(5) },
    AbilityDef { name: "mend",    category: Support,   targeting: WoundedAlly,   energy_cost: 3, cooldown: 1, range: 2, effect: AbilityEffect::Heal(3) },
    AbilityDef { name: "inspire", category: Support,   targeting: StrongestAlly, energy_cost: 3, cooldown: 3, range: 3, effect: AbilityEffect::BuffAttack(2) },
    AbilityDef { name: "empower", category: Support,   targeting: StrongestAlly, energy_cost: 4, cooldown: 3, range: 3, effect: AbilityEffect::BuffAttack(3) },
    AbilityDef { name: "rally",   category: Support,   targeting: StrongestAlly, energy_cost: 3, cooldown: 2, range: 2, effect: AbilityEffect::BuffAttack(1) },
];

/// Look up an ability by name. Unknown names are simply not in the catalog.
pub fn get_ability(name: &str) -> Option<&'static AbilityDef> {
    ABILITIES.iter().find(|a| a.name == name)
}

pub fn is_healing(name: &str) -> bool {
    get_ability(name).is_some_and(|a| matches!(a.effect, AbilityEffect::Heal(_)))
}

// ── Per-role preferences ───────────────────────────────────────────────
// Which catalog abilities each role reaches for, per category.

pub fn preferred_abilities(unit_type: UnitType, category: AbilityCategory) -> &'static [&'static str] {
    match (unit_type, category) {
        (UnitType::Pawn, Offensive) => &["charge"],
        (UnitType::Pawn, Defensive) => &["fortify"],
        (UnitType::Pawn, Support) => &["rally"],

        (UnitType::Knight, Offensive) => &["charge", "fork"],
        (UnitType::Knight, Defensive) => &["fortify"],
        (UnitType::Knight, Support) => &["inspire"],

        (UnitType::Bishop, Offensive) => &["drain", "smite"],
        (UnitType::Bishop, Defensive) => &["ward"],
        (UnitType::Bishop, Support) => &["heal", "mend", "inspire"],

        (UnitType::Rook, Offensive) => &["bombard"],
        (UnitType::Rook, Defensive) => &["fortify", "ward"],
        (UnitType::Rook, Support) => &["rally"],

        (UnitType::Queen, Offensive) => &["smite", "drain", "fork"],
        (UnitType::Queen, Defensive) => &["ward"],
        (UnitType::Queen, Support) => &["heal", "empower"],

        (UnitType::King, Offensive) => &["smite"],
        (UnitType::King, Defensive) => &["fortify", "ward"],
        (UnitType::King, Support) => &["rally", "empower", "heal"],
    }
}
