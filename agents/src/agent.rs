// ═══════════════════════════════════════════════════════════════════════
// Agent trait — anything that can play one side of an encounter
//
// Agents read unit snapshots and the grid and return intents. They never
// mutate game state; the encounter executor applies what they return and
// reports back through `observe`.
// ═══════════════════════════════════════════════════════════════════════

use gambit_engine::engine::ActionOutcome;
use gambit_engine::types::*;
use gambit_engine::Grid;

/// One applied action as seen by the agents after the executor ran it.
#[derive(Debug, Clone)]
pub struct Observation<'a> {
    pub action: &'a Action,
    pub outcome: &'a ActionOutcome,
    pub actor_faction: Faction,
    /// The unit the action was aimed at, as it stood after the action.
    pub target: Option<&'a Unit>,
}

pub trait Agent: Send {
    /// Human-readable name for this agent (e.g., "Tactical", "Random").
    fn name(&self) -> &str;

    /// The side this agent plays.
    fn faction(&self) -> Faction;

    /// Decide one side turn. `own` and `opposing` are snapshots for the turn.
    fn take_turn(&mut self, own: &[Unit], opposing: &[Unit], grid: &Grid) -> Vec<Action>;

    /// Feedback after each applied action, from either side. Default: ignore.
    fn observe(&mut self, _observation: &Observation<'_>) {}
}
