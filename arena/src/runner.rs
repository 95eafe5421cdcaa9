// ═══════════════════════════════════════════════════════════════════════
// Encounter runner — plays a complete headless encounter
//
// The tactical AI plays the enemy side against a random baseline on a
// seeded skirmish board. Every applied action is fed back to both agents
// so the AI memory sees what happened.
// ═══════════════════════════════════════════════════════════════════════

use crate::error::Result;
use gambit_agents::{Agent, AiConfig, Difficulty, Observation, RandomAgent, TacticalAi};
use gambit_engine::engine::{self, ActionOutcome, EncounterState};
use gambit_engine::setup::{create_skirmish, SkirmishConfig};
use gambit_engine::types::*;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct ArenaConfig {
    pub ai: AiConfig,
    pub width: i32,
    pub height: i32,
    /// Encounters still undecided after this many rounds are draws.
    pub max_rounds: u32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        ArenaConfig {
            ai: AiConfig::default(),
            width: 10,
            height: 10,
            max_rounds: 60,
        }
    }
}

/// How many of each action the AI emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActionCounts {
    pub moves: u32,
    pub attacks: u32,
    pub abilities: u32,
    pub waits: u32,
    pub rejected: u32,
}

impl ActionCounts {
    fn count(&mut self, action: &Action, outcome: &ActionOutcome) {
        match action.tag() {
            ActionTag::Move => self.moves += 1,
            ActionTag::Attack => self.attacks += 1,
            ActionTag::Ability => self.abilities += 1,
            ActionTag::Wait => self.waits += 1,
        }
        if outcome.is_rejected() {
            self.rejected += 1;
        }
    }

    pub fn total(&self) -> u32 {
        self.moves + self.attacks + self.abilities + self.waits
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EncounterResult {
    pub seed: u64,
    pub difficulty: Difficulty,
    /// `None` when the round cap was hit.
    pub winner: Option<Faction>,
    pub rounds: u32,
    pub enemy_survivors: usize,
    pub player_survivors: usize,
    pub ai_actions: ActionCounts,
}

/// One applied action, for action logs.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub round: u32,
    pub side: Faction,
    pub action: Action,
    pub outcome: ActionOutcome,
}

fn target_of(action: &Action) -> Option<UnitId> {
    match &action.kind {
        ActionKind::Attack { target } | ActionKind::UseAbility { target, .. } => Some(*target),
        ActionKind::Move { .. } | ActionKind::Wait => None,
    }
}

/// Set up the board for `seed`, with enemy stats scaled by the AI's difficulty.
pub fn setup_encounter(config: &ArenaConfig, seed: u64) -> Result<(TacticalAi, EncounterState)> {
    let ai = TacticalAi::new(AiConfig { seed, ..config.ai.clone() })?;
    let modifier = *ai.modifier();
    let skirmish = SkirmishConfig {
        width: config.width,
        height: config.height,
        enemy_health_multiplier: modifier.health_multiplier,
        enemy_damage_multiplier: modifier.damage_multiplier,
        ..SkirmishConfig::default()
    };
    let state = create_skirmish(&skirmish, seed)?;
    Ok((ai, state))
}

/// Play one encounter, calling `on_action` after every applied action.
pub fn play_encounter<F>(config: &ArenaConfig, seed: u64, mut on_action: F) -> Result<EncounterResult>
where
    F: FnMut(&LogEntry),
{
    let (mut enemy, mut state) = setup_encounter(config, seed)?;
    let mut player = RandomAgent::new(Faction::Player, seed.wrapping_mul(31).wrapping_add(7));
    let mut counts = ActionCounts::default();

    while state.winner.is_none() && state.round <= config.max_rounds {
        let side = state.to_move;
        engine::begin_side_turn(&mut state, side);

        let own = state.living(side);
        let opposing = state.living(side.opponent());
        let agent: &mut dyn Agent = match side {
            Faction::Enemy => &mut enemy,
            Faction::Player => &mut player,
        };
        let actions = agent.take_turn(&own, &opposing, &state.grid);

        for action in &actions {
            let outcome = engine::apply_action(&mut state, action);
            if side == Faction::Enemy {
                counts.count(action, &outcome);
            }

            let observation = Observation {
                action,
                outcome: &outcome,
                actor_faction: side,
                target: target_of(action).and_then(|id| state.unit(id)),
            };
            enemy.observe(&observation);
            player.observe(&observation);

            on_action(&LogEntry { round: state.round, side, action: action.clone(), outcome });

            engine::check_victory(&mut state);
            if state.winner.is_some() {
                break;
            }
        }
        debug!(round = state.round, side = %side, actions = actions.len(), "side turn done");
        engine::end_side_turn(&mut state);
    }

    if state.winner.is_none() {
        warn!(seed, rounds = config.max_rounds, "encounter hit the round cap");
    }

    let result = EncounterResult {
        seed,
        difficulty: enemy.difficulty(),
        winner: state.winner,
        rounds: state.round.min(config.max_rounds),
        enemy_survivors: state.living_count(Faction::Enemy),
        player_survivors: state.living_count(Faction::Player),
        ai_actions: counts,
    };
    info!(
        seed,
        winner = ?result.winner,
        rounds = result.rounds,
        enemy_left = result.enemy_survivors,
        player_left = result.player_survivors,
        "encounter finished"
    );
    Ok(result)
}

pub fn run_encounter(config: &ArenaConfig, seed: u64) -> Result<EncounterResult> {
    play_encounter(config, seed, |_| {})
}

/// Run encounters for every seed in parallel. Results keep seed order.
pub fn run_batch(config: &ArenaConfig, seeds: &[u64]) -> Vec<Result<EncounterResult>> {
    seeds.par_iter().map(|&seed| run_encounter(config, seed)).collect()
}
