// ═══════════════════════════════════════════════════════════════════════
// Turn orchestrator — the per-turn entry point of the decision engine
//
// process_turn:
//   1. snapshot both sides (fog of war trims the opposing list)
//   2. threat field, then opportunity field
//   3. formation plans (not on easy)
//   4. units by initiative, highest first (stable on ties)
//   5. per unit with action points: profile, plan move or decision
//   6. trim memory, return the action list
//
// Nothing here mutates units or the grid. The caller applies the actions.
// ═══════════════════════════════════════════════════════════════════════

use crate::agent::{Agent, Observation};
use crate::config::AiConfig;
use crate::decision::{decide, Decision, DecisionContext, DecisionPath};
use crate::difficulty::{Difficulty, DifficultyModifier};
use crate::error::Result;
use crate::fields::{build_opportunity_field, build_threat_field};
use crate::memory::*;
use crate::profile::{resolve_profile_kind, ProfileBook};
use crate::tactics::{generate_plans, PlanBook, TacticalPattern, PATTERNS};
use gambit_engine::abilities::{get_ability, AbilityEffect};
use gambit_engine::engine::ActionOutcome;
use gambit_engine::types::*;
use gambit_engine::visibility::FactionVisibility;
use gambit_engine::Grid;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::cmp::Reverse;
use tracing::{debug, info, warn};

/// Counts from the most recent turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TurnSummary {
    pub enemy_units: usize,
    pub player_units: usize,
    pub plan_count: usize,
    pub tactical: usize,
    pub scored: usize,
    pub fallback: usize,
}

/// Observability snapshot, not part of the decision contract.
#[derive(Debug, Clone, Serialize)]
pub struct DebugInfo {
    pub turn: u32,
    pub difficulty: Difficulty,
    pub decision_quality: f64,
    pub fog_of_war: bool,
    pub last_turn: TurnSummary,
    pub memory: MemorySizes,
    pub player_tendency: PlayerTendency,
}

pub struct TacticalAi {
    faction: Faction,
    config: AiConfig,
    difficulty: Difficulty,
    modifier: DifficultyModifier,
    profiles: ProfileBook,
    patterns: Vec<TacticalPattern>,
    memory: AiMemory,
    turn: u32,
    rng: ChaCha8Rng,
    last_turn: TurnSummary,
}

impl TacticalAi {
    /// Build from a validated config. Plays the enemy side.
    pub fn new(config: AiConfig) -> Result<Self> {
        config.validate()?;
        let profiles = ProfileBook::with_overrides(&config.profiles)?;
        Ok(Self::assemble(config, profiles))
    }

    /// Default config with a given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::assemble(AiConfig { seed, ..AiConfig::default() }, ProfileBook::default())
    }

    fn assemble(config: AiConfig, profiles: ProfileBook) -> Self {
        let mut ai = TacticalAi {
            faction: Faction::Enemy,
            difficulty: config.difficulty,
            modifier: config.difficulty.modifier(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            profiles,
            patterns: PATTERNS.to_vec(),
            memory: AiMemory::default(),
            turn: 0,
            last_turn: TurnSummary::default(),
        };
        ai.apply_difficulty(ai.difficulty);
        ai
    }

    /// Play the other side instead.
    pub fn for_faction(mut self, faction: Faction) -> Self {
        self.faction = faction;
        self
    }

    fn apply_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.modifier = difficulty.modifier();
        if let Some(q) = self.config.decision_quality {
            self.modifier.decision_quality = q;
        }
    }

    /// Switch difficulty by name. Unknown names leave it unchanged.
    pub fn set_difficulty(&mut self, name: &str) -> bool {
        match name.parse::<Difficulty>() {
            Ok(difficulty) => {
                self.apply_difficulty(difficulty);
                info!(difficulty = %difficulty, "difficulty set");
                true
            }
            Err(e) => {
                warn!(error = %e, "difficulty not changed");
                false
            }
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn modifier(&self) -> &DifficultyModifier {
        &self.modifier
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn memory(&self) -> &AiMemory {
        &self.memory
    }

    /// Decide one turn with the engine's own seeded RNG.
    pub fn process_turn(&mut self, own: &[Unit], opposing: &[Unit], grid: &Grid) -> Vec<Action> {
        let mut rng = self.rng.clone();
        let actions = self.process_turn_with_rng(own, opposing, grid, &mut rng);
        self.rng = rng;
        actions
    }

    /// Decide one turn drawing every random value from `rng`.
    pub fn process_turn_with_rng<R: Rng>(
        &mut self,
        own: &[Unit],
        opposing: &[Unit],
        grid: &Grid,
        rng: &mut R,
    ) -> Vec<Action> {
        self.turn += 1;
        let turn = self.turn;

        let friendly: Vec<Unit> = own.iter().filter(|u| u.is_alive()).cloned().collect();
        let mut foes: Vec<Unit> = opposing.iter().filter(|u| u.is_alive()).cloned().collect();
        if self.config.fog_of_war {
            let sight = FactionVisibility::compute(grid, self.faction, &friendly, self.config.sight_radius);
            foes.retain(|u| sight.is_visible(u.pos));
        }

        let threat = build_threat_field(grid, &foes);
        let opportunity = build_opportunity_field(grid, &threat, &friendly, &foes);
        let mut plans = PlanBook::new(generate_plans(
            &self.patterns,
            &friendly,
            &foes,
            grid,
            self.difficulty,
            &self.modifier,
        ));

        let modifier = self.modifier;
        let ctx = DecisionContext {
            grid,
            friendly: &friendly,
            opposing: &foes,
            opportunity: &opportunity,
            modifier: &modifier,
        };

        let mut order: Vec<&Unit> = friendly.iter().collect();
        order.sort_by_key(|u| Reverse(u.initiative));

        let mut summary = TurnSummary {
            enemy_units: friendly.len(),
            player_units: foes.len(),
            plan_count: plans.len(),
            ..TurnSummary::default()
        };
        let mut actions = Vec::with_capacity(order.len());

        for unit in order {
            if unit.action_points == 0 {
                continue;
            }
            if !grid.is_in_bounds(unit.pos) {
                warn!(unit = %unit.id, pos = %unit.pos, "unit off the board, waiting");
                actions.push(Action::wait(unit.id));
                continue;
            }

            let kind = resolve_profile_kind(unit, &friendly);
            let decision = match plans.check_and_consume(unit) {
                Some(action) => Decision { action, path: DecisionPath::Tactical },
                None => decide(unit, self.profiles.get(kind), &ctx, rng),
            };
            match decision.path {
                DecisionPath::Tactical => summary.tactical += 1,
                DecisionPath::Scored => summary.scored += 1,
                DecisionPath::Fallback => summary.fallback += 1,
            }
            debug!(
                turn,
                unit = %unit.id,
                role = %unit.unit_type,
                profile = %kind,
                path = ?decision.path,
                action = %decision.action,
                "unit decided"
            );
            actions.push(decision.action);
        }

        self.memory.trim();
        self.last_turn = summary;
        info!(
            turn,
            difficulty = %self.difficulty,
            units = summary.enemy_units,
            foes = summary.player_units,
            plans = summary.plan_count,
            actions = actions.len(),
            "turn planned"
        );
        actions
    }

    // ── Feedback hooks ─────────────────────────────────────────────────

    pub fn record_player_action(&mut self, actor: UnitId, tag: ActionTag) {
        self.memory.record_player_action(PlayerActionRecord { turn: self.turn, actor, tag });
    }

    pub fn record_successful_attack(&mut self, attacker: UnitId, target: UnitId, damage: i32) {
        self.memory.record_successful_attack(AttackRecord { turn: self.turn, attacker, target, damage });
    }

    pub fn record_failed_attack(&mut self, attacker: UnitId, target: UnitId) {
        self.memory.record_failed_attack(AttackRecord { turn: self.turn, attacker, target, damage: 0 });
    }

    pub fn record_damage_taken(&mut self, unit: UnitId, amount: i32) {
        self.memory.record_damage_taken(DamageRecord { turn: self.turn, unit, amount });
    }

    pub fn record_unit_lost(&mut self, unit: UnitId, unit_type: UnitType) {
        self.memory.record_unit_lost(LossRecord { turn: self.turn, unit, unit_type });
    }

    pub fn debug_info(&self) -> DebugInfo {
        DebugInfo {
            turn: self.turn,
            difficulty: self.difficulty,
            decision_quality: self.modifier.decision_quality,
            fog_of_war: self.config.fog_of_war,
            last_turn: self.last_turn,
            memory: self.memory.sizes(),
            player_tendency: self.memory.tendency(),
        }
    }
}

/// Damage dealt by an applied action, if it was a hit on the other side.
fn hostile_damage(obs: &Observation<'_>) -> Option<(UnitId, i32, bool)> {
    let target = obs.target?;
    if target.faction == obs.actor_faction {
        return None;
    }
    match obs.outcome {
        ActionOutcome::Hit { target, damage, killed, .. } => Some((*target, *damage, *killed)),
        ActionOutcome::AbilityUsed { ability, target, amount, killed, .. } => {
            let strike = get_ability(ability).is_some_and(|d| matches!(d.effect, AbilityEffect::Strike { .. }));
            strike.then_some((*target, *amount, *killed))
        }
        _ => None,
    }
}

impl Agent for TacticalAi {
    fn name(&self) -> &str { "Tactical" }
    fn faction(&self) -> Faction { self.faction }

    fn take_turn(&mut self, own: &[Unit], opposing: &[Unit], grid: &Grid) -> Vec<Action> {
        self.process_turn(own, opposing, grid)
    }

    fn observe(&mut self, obs: &Observation<'_>) {
        let ours = obs.actor_faction == self.faction;

        if obs.outcome.is_rejected() {
            if let (true, ActionKind::Attack { target }) = (ours, &obs.action.kind) {
                self.record_failed_attack(obs.action.actor, *target);
            }
            return;
        }
        if !ours {
            self.record_player_action(obs.action.actor, obs.action.tag());
        }

        if let Some((target, amount, killed)) = hostile_damage(obs) {
            if ours {
                self.record_successful_attack(obs.action.actor, target, amount);
            } else {
                self.record_damage_taken(target, amount);
                if killed {
                    if let Some(unit) = obs.target {
                        self.record_unit_lost(target, unit.unit_type);
                    }
                }
            }
        }
    }
}
