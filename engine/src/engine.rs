// ═══════════════════════════════════════════════════════════════════════
// Encounter Engine — applies decided actions to the board
//
// Architecture:
//   Agents only decide. They read a snapshot of the units and the grid
//   and return a list of actions. This module is the executor: it
//   validates each action against the live state, applies movement,
//   damage, ability effects and cooldowns, and reports what happened.
//
// Flow:
//   1. `begin_side_turn()` refreshes action points, cooldowns and energy
//   2. The side's agent returns its ordered action list
//   3. Runner feeds each one to `apply_action()` and collects outcomes
//   4. `end_side_turn()` checks victory and hands over to the other side
// ═══════════════════════════════════════════════════════════════════════

use crate::abilities::{self, AbilityEffect, Targeting};
use crate::error::{EngineError, Result};
use crate::grid::Grid;
use crate::navigation;
use crate::types::*;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Critical hits deal this much extra damage.
pub const CRIT_MULTIPLIER: f64 = 1.5;

/// Energy each unit regains at the start of its side's turn.
pub const ENERGY_REGEN: u32 = 1;

// ── State ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncounterState {
    pub grid: Grid,
    /// All units, dead ones included (health 0, off the grid).
    pub units: Vec<Unit>,
    /// Full rounds completed + 1. A round is a player turn then an enemy turn.
    pub round: u32,
    pub to_move: Faction,
    pub winner: Option<Faction>,
    /// Scales damage dealt by enemy units (difficulty).
    pub enemy_damage_multiplier: f64,

    // Deterministic RNG
    pub seed: u64,
    pub rng_counter: u64,
}

impl EncounterState {
    /// Build an encounter and put every living unit on the board.
    pub fn new(mut grid: Grid, units: Vec<Unit>, seed: u64) -> Result<Self> {
        let mut seen = HashSet::new();
        for unit in &units {
            if !seen.insert(unit.id) {
                return Err(EngineError::DuplicateUnit(unit.id));
            }
            if unit.is_alive() {
                grid.place(unit.id, unit.pos)?;
            }
        }
        Ok(EncounterState {
            grid,
            units,
            round: 1,
            to_move: Faction::Player,
            winner: None,
            enemy_damage_multiplier: 1.0,
            seed,
            rng_counter: 0,
        })
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|u| u.id == id)
    }

    /// Snapshot of a faction's living units, in roster order.
    pub fn living(&self, faction: Faction) -> Vec<Unit> {
        self.units
            .iter()
            .filter(|u| u.faction == faction && u.is_alive())
            .cloned()
            .collect()
    }

    pub fn living_count(&self, faction: Faction) -> usize {
        self.units.iter().filter(|u| u.faction == faction && u.is_alive()).count()
    }

    fn damage_multiplier(&self, faction: Faction) -> f64 {
        match faction {
            Faction::Enemy => self.enemy_damage_multiplier,
            Faction::Player => 1.0,
        }
    }

    /// Fresh RNG per draw, derived from the seed so replays are exact.
    fn next_rng(&mut self) -> ChaCha8Rng {
        self.rng_counter += 1;
        ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(self.rng_counter.wrapping_mul(999_961)))
    }
}

// ── Outcomes ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    UnknownActor,
    ActorDead,
    NoActionPoints,
    WrongSide,
    UnknownTarget,
    InvalidTarget,
    OutOfRange,
    Blocked,
    UnknownAbility,
    AbilityNotReady,
    NotEnoughEnergy,
}

/// What applying one action actually did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionOutcome {
    Moved { actor: UnitId, from: Pos, to: Pos },
    Hit { actor: UnitId, target: UnitId, damage: i32, crit: bool, killed: bool },
    AbilityUsed { actor: UnitId, ability: String, target: UnitId, amount: i32, killed: bool },
    Waited { actor: UnitId },
    Rejected { actor: UnitId, reason: RejectReason },
}

impl ActionOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, ActionOutcome::Rejected { .. })
    }
}

// ── Turn structure ─────────────────────────────────────────────────────

/// Refresh a side at the start of its turn: action points, cooldowns, energy.
pub fn begin_side_turn(state: &mut EncounterState, faction: Faction) {
    state.to_move = faction;
    for unit in state.units.iter_mut().filter(|u| u.faction == faction && u.is_alive()) {
        unit.action_points = unit.max_action_points;
        for remaining in unit.cooldowns.values_mut() {
            *remaining = remaining.saturating_sub(1);
        }
        unit.cooldowns.retain(|_, remaining| *remaining > 0);
        unit.energy = (unit.energy + ENERGY_REGEN).min(unit.max_energy);
    }
}

/// Check victory and pass the move. A round ends after the enemy side.
pub fn end_side_turn(state: &mut EncounterState) {
    check_victory(state);
    if state.to_move == Faction::Enemy {
        state.round += 1;
    }
    state.to_move = state.to_move.opponent();
}

/// A faction with no living units has lost.
pub fn check_victory(state: &mut EncounterState) {
    if state.winner.is_some() {
        return;
    }
    let players = state.living_count(Faction::Player);
    let enemies = state.living_count(Faction::Enemy);
    state.winner = match (players, enemies) {
        (0, 0) => None,
        (0, _) => Some(Faction::Enemy),
        (_, 0) => Some(Faction::Player),
        _ => None,
    };
}

// ── Action application ─────────────────────────────────────────────────

/// Validate and apply one action. Invalid actions are rejected, never panic.
pub fn apply_action(state: &mut EncounterState, action: &Action) -> ActionOutcome {
    let outcome = match validate_actor(state, action.actor) {
        Err(reason) => ActionOutcome::Rejected { actor: action.actor, reason },
        Ok(()) => match &action.kind {
            ActionKind::Wait => ActionOutcome::Waited { actor: action.actor },
            ActionKind::Move { to, .. } => apply_move(state, action.actor, *to),
            ActionKind::Attack { target } => apply_attack(state, action.actor, *target),
            ActionKind::UseAbility { ability, target } => {
                apply_ability(state, action.actor, ability, *target)
            }
        },
    };

    match &outcome {
        ActionOutcome::Rejected { reason, .. } => {
            warn!(action = %action, ?reason, "action rejected");
        }
        other => {
            if let Some(unit) = state.unit_mut(action.actor) {
                unit.action_points = unit.action_points.saturating_sub(1);
            }
            debug!(?other, "action applied");
        }
    }
    outcome
}

fn validate_actor(state: &EncounterState, actor: UnitId) -> std::result::Result<(), RejectReason> {
    let unit = state.unit(actor).ok_or(RejectReason::UnknownActor)?;
    if !unit.is_alive() {
        return Err(RejectReason::ActorDead);
    }
    if unit.faction != state.to_move {
        return Err(RejectReason::WrongSide);
    }
    if unit.action_points == 0 {
        return Err(RejectReason::NoActionPoints);
    }
    Ok(())
}

fn apply_move(state: &mut EncounterState, actor: UnitId, to: Pos) -> ActionOutcome {
    let Some(unit) = state.unit(actor) else {
        return ActionOutcome::Rejected { actor, reason: RejectReason::UnknownActor };
    };
    let from = unit.pos;
    if !state.grid.is_tile_walkable(to) {
        return ActionOutcome::Rejected { actor, reason: RejectReason::Blocked };
    }

    // Far destinations (formation cells) are approached along the shortest path.
    let dest = navigation::step_toward(&state.grid, from, to, unit.move_range);
    if dest == from {
        return ActionOutcome::Rejected { actor, reason: RejectReason::Blocked };
    }
    if state.grid.move_entity(from, dest).is_err() {
        return ActionOutcome::Rejected { actor, reason: RejectReason::Blocked };
    }
    if let Some(unit) = state.unit_mut(actor) {
        unit.pos = dest;
    }
    ActionOutcome::Moved { actor, from, to: dest }
}

/// Raw damage before variance: attack minus defense, at least 1, scaled.
pub fn base_damage(attacker: &Unit, defender: &Unit, multiplier: f64) -> f64 {
    (attacker.attack - defender.defense).max(1) as f64 * multiplier
}

fn apply_attack(state: &mut EncounterState, actor: UnitId, target: UnitId) -> ActionOutcome {
    let (attacker, defender) = match (state.unit(actor), state.unit(target)) {
        (Some(a), Some(d)) => (a.clone(), d.clone()),
        _ => return ActionOutcome::Rejected { actor, reason: RejectReason::UnknownTarget },
    };
    if !defender.is_alive() || defender.faction == attacker.faction {
        return ActionOutcome::Rejected { actor, reason: RejectReason::InvalidTarget };
    }
    if !attacker.in_range(&defender, attacker.attack_range) {
        return ActionOutcome::Rejected { actor, reason: RejectReason::OutOfRange };
    }

    let mut rng = state.next_rng();
    let crit = rng.gen_bool(attacker.crit_probability());
    let mut damage = base_damage(&attacker, &defender, state.damage_multiplier(attacker.faction));
    if crit {
        damage *= CRIT_MULTIPLIER;
    }
    let damage = (damage.round() as i32).max(1);
    let killed = deal_damage(state, target, damage);
    ActionOutcome::Hit { actor, target, damage, crit, killed }
}

/// Subtract health; a unit at 0 leaves the board. Returns whether it died.
fn deal_damage(state: &mut EncounterState, target: UnitId, damage: i32) -> bool {
    let Some(unit) = state.unit_mut(target) else {
        return false;
    };
    unit.health = (unit.health - damage).max(0);
    if unit.is_alive() {
        return false;
    }
    let pos = unit.pos;
    state.grid.vacate(pos);
    true
}

fn apply_ability(state: &mut EncounterState, actor: UnitId, name: &str, target: UnitId) -> ActionOutcome {
    let Some(def) = abilities::get_ability(name) else {
        return ActionOutcome::Rejected { actor, reason: RejectReason::UnknownAbility };
    };
    let (caster, subject) = match (state.unit(actor), state.unit(target)) {
        (Some(c), Some(s)) => (c.clone(), s.clone()),
        _ => return ActionOutcome::Rejected { actor, reason: RejectReason::UnknownTarget },
    };
    if !caster.ability_ready(name) {
        return ActionOutcome::Rejected { actor, reason: RejectReason::AbilityNotReady };
    }
    if caster.energy < def.energy_cost {
        return ActionOutcome::Rejected { actor, reason: RejectReason::NotEnoughEnergy };
    }

    let target_ok = subject.is_alive()
        && match def.targeting {
            Targeting::SelfOnly => subject.id == caster.id,
            Targeting::WoundedAlly | Targeting::StrongestAlly => subject.faction == caster.faction,
            Targeting::RichestEnemy | Targeting::AnyEnemy => subject.faction != caster.faction,
        };
    if !target_ok {
        return ActionOutcome::Rejected { actor, reason: RejectReason::InvalidTarget };
    }
    if def.targeting != Targeting::SelfOnly && !caster.in_range(&subject, def.range) {
        return ActionOutcome::Rejected { actor, reason: RejectReason::OutOfRange };
    }

    let mut killed = false;
    let amount = match def.effect {
        AbilityEffect::Strike { multiplier } => {
            let scaled = caster.attack as f64 * multiplier;
            let raw = (scaled - subject.defense as f64).max(1.0)
                * state.damage_multiplier(caster.faction);
            let damage = (raw.round() as i32).max(1);
            killed = deal_damage(state, target, damage);
            damage
        }
        AbilityEffect::DrainEnergy(n) => {
            let drained = subject.energy.min(n);
            if let Some(s) = state.unit_mut(target) {
                s.energy -= drained;
            }
            if let Some(c) = state.unit_mut(actor) {
                c.energy = (c.energy + drained).min(c.max_energy);
            }
            drained as i32
        }
        AbilityEffect::Heal(n) => {
            let healed = n.min(subject.max_health - subject.health).max(0);
            if let Some(s) = state.unit_mut(target) {
                s.health += healed;
            }
            healed
        }
        AbilityEffect::BuffAttack(n) => {
            if let Some(s) = state.unit_mut(target) {
                s.attack += n;
            }
            n
        }
        AbilityEffect::BuffDefense(n) => {
            if let Some(s) = state.unit_mut(target) {
                s.defense += n;
            }
            n
        }
    };

    if let Some(c) = state.unit_mut(actor) {
        c.energy = c.energy.saturating_sub(def.energy_cost);
        c.cooldowns.insert(def.name.to_string(), def.cooldown);
    }

    ActionOutcome::AbilityUsed {
        actor,
        ability: def.name.to_string(),
        target,
        amount,
        killed,
    }
}
