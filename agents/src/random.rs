// ═══════════════════════════════════════════════════════════════════════
// Random play — the low-quality fallback decision and a baseline agent.
// The agent stands in for the player side in arena runs.
// ═══════════════════════════════════════════════════════════════════════

use crate::agent::Agent;
use gambit_engine::movement::{legal_moves, threatened_units};
use gambit_engine::types::*;
use gambit_engine::Grid;
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// "Bad AI" decision: half the time wait, else maybe wander, else maybe
/// swing at whoever is in range, else wait.
pub fn random_decision<R: Rng>(unit: &Unit, grid: &Grid, opposing: &[Unit], rng: &mut R) -> Action {
    if rng.gen_bool(0.5) {
        return Action::wait(unit.id);
    }

    if rng.gen_bool(0.3) {
        let moves: Vec<Pos> = grid
            .cells_within(unit.pos, unit.move_range)
            .into_iter()
            .filter(|&c| c != unit.pos && grid.is_walkable(c))
            .collect();
        if let Some(&to) = moves.choose(rng) {
            return Action::move_to(unit.id, to);
        }
    }

    let targets: Vec<&Unit> = opposing
        .iter()
        .filter(|u| u.is_alive() && unit.in_range(u, unit.attack_range))
        .collect();
    match targets.choose(rng) {
        Some(target) => Action::attack(unit.id, target.id),
        None => Action::wait(unit.id),
    }
}

/// Plays by the chess movement patterns with no judgement at all.
pub struct RandomAgent {
    faction: Faction,
    rng: ChaCha8Rng,
}

impl RandomAgent {
    pub fn new(faction: Faction, seed: u64) -> Self {
        RandomAgent {
            faction,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn act(&mut self, unit: &Unit, opposing: &[Unit], grid: &Grid) -> Action {
        // Pattern strikes that the executor's range check will also accept.
        let struck = threatened_units(grid, unit);
        let mut targets: Vec<&Unit> = opposing
            .iter()
            .filter(|u| u.is_alive() && struck.contains(&u.id) && unit.in_range(u, unit.attack_range))
            .collect();
        if targets.is_empty() {
            targets = opposing
                .iter()
                .filter(|u| u.is_alive() && unit.in_range(u, unit.attack_range))
                .collect();
        }
        if !targets.is_empty() && self.rng.gen_bool(0.7) {
            if let Some(target) = targets.choose(&mut self.rng) {
                return Action::attack(unit.id, target.id);
            }
        }

        if self.rng.gen_bool(0.6) {
            if let Some(&to) = legal_moves(grid, unit).choose(&mut self.rng) {
                return Action::move_to(unit.id, to);
            }
        }
        Action::wait(unit.id)
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str { "Random" }
    fn faction(&self) -> Faction { self.faction }

    fn take_turn(&mut self, own: &[Unit], opposing: &[Unit], grid: &Grid) -> Vec<Action> {
        own.iter()
            .filter(|u| u.is_alive() && u.action_points > 0)
            .map(|u| self.act(u, opposing, grid))
            .collect()
    }
}
