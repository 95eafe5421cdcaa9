// ═══════════════════════════════════════════════════════════════════════
// Unit decision engine — one action for one unit not covered by a plan
//
// Quality gate first: a failed draw hands the unit to the random fallback.
// Otherwise the scored path runs: maybe an ability, else the best reachable
// cell by weighted opportunity, else an attack from where it stands.
// ═══════════════════════════════════════════════════════════════════════

use crate::abilities::{select_ability, MIN_ABILITY_ENERGY};
use crate::difficulty::DifficultyModifier;
use crate::fields::OpportunityField;
use crate::profile::AiProfile;
use crate::random::random_decision;
use gambit_engine::engine::{base_damage, CRIT_MULTIPLIER};
use gambit_engine::types::*;
use gambit_engine::Grid;
use rand::Rng;
use serde::Serialize;

/// Flat bonus for a cell from which some target is in attack range.
pub const IN_RANGE_BONUS: f64 = 20.0;
/// Flat bonus for a target the attacker expects to finish off.
pub const LETHAL_BONUS: f64 = 100.0;

/// Everything a decision reads. Built once per turn, shared by all units.
#[derive(Clone, Copy)]
pub struct DecisionContext<'a> {
    pub grid: &'a Grid,
    pub friendly: &'a [Unit],
    pub opposing: &'a [Unit],
    pub opportunity: &'a OpportunityField,
    pub modifier: &'a DifficultyModifier,
}

impl<'a> DecisionContext<'a> {
    /// Living opposing units within `range` of `pos`.
    pub fn targets_from(&self, pos: Pos, range: u32) -> Vec<&'a Unit> {
        self.opposing
            .iter()
            .filter(|u| u.is_alive() && pos.manhattan(u.pos) <= range)
            .collect()
    }
}

/// Which branch produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DecisionPath {
    Scored,
    Fallback,
    Tactical,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub action: Action,
    pub path: DecisionPath,
}

/// Decide for one unit under the difficulty's quality gate.
pub fn decide<R: Rng>(unit: &Unit, profile: &AiProfile, ctx: &DecisionContext, rng: &mut R) -> Decision {
    let draw: f64 = rng.gen();
    if draw >= ctx.modifier.decision_quality {
        return Decision {
            action: random_decision(unit, ctx.grid, ctx.opposing, rng),
            path: DecisionPath::Fallback,
        };
    }
    Decision {
        action: scored_decision(unit, profile, ctx, rng),
        path: DecisionPath::Scored,
    }
}

pub fn scored_decision<R: Rng>(unit: &Unit, profile: &AiProfile, ctx: &DecisionContext, rng: &mut R) -> Action {
    let roll: f64 = rng.gen();
    if roll < profile.use_ability_chance
        && !unit.abilities.is_empty()
        && unit.energy >= MIN_ABILITY_ENERGY
        && unit.action_points >= 1
    {
        if let Some(action) = select_ability(unit, profile, ctx.friendly, ctx.opposing, rng) {
            return action;
        }
    }

    let best = best_reachable_cell(unit, profile, ctx);
    if best != unit.pos {
        return Action::move_to(unit.id, best);
    }

    let in_range = ctx.targets_from(unit.pos, unit.attack_range);
    match select_attack_target(unit, &in_range, profile, ctx.modifier, rng) {
        Some(target) => Action::attack(unit.id, target),
        None => Action::wait(unit.id),
    }
}

/// Weighted value of standing on `pos`, with the in-range bonus.
fn cell_value(unit: &Unit, pos: Pos, profile: &AiProfile, ctx: &DecisionContext) -> f64 {
    let mut value = ctx.opportunity.total_at(pos, profile);
    if !ctx.targets_from(pos, unit.attack_range).is_empty() {
        value += IN_RANGE_BONUS;
    }
    value
}

/// Best cell within `move_range`; the current cell is the baseline and wins ties.
pub fn best_reachable_cell(unit: &Unit, profile: &AiProfile, ctx: &DecisionContext) -> Pos {
    if !ctx.grid.is_in_bounds(unit.pos) {
        return unit.pos;
    }
    let mut best = unit.pos;
    let mut best_value = cell_value(unit, unit.pos, profile, ctx);

    for cell in ctx.grid.cells_within(unit.pos, unit.move_range) {
        if cell == unit.pos || !ctx.grid.is_walkable(cell) {
            continue;
        }
        let value = cell_value(unit, cell, profile, ctx);
        if value > best_value {
            best = cell;
            best_value = value;
        }
    }
    best
}

/// Score one candidate target. The lethal check rolls for a crit, so two calls
/// on the same state can differ when `crit_chance > 0`.
pub fn score_target<R: Rng>(
    attacker: &Unit,
    target: &Unit,
    profile: &AiProfile,
    modifier: &DifficultyModifier,
    rng: &mut R,
) -> f64 {
    let mut score = (1.0 - target.health_ratio()) * 50.0;
    if let Some(rank) = profile.priority_rank(target.unit_type) {
        score += (7 - rank as i64) as f64 * 10.0;
    }
    score += target.attack as f64 * 2.0;

    let mut estimate = base_damage(attacker, target, modifier.damage_multiplier);
    if rng.gen_bool(attacker.crit_probability()) {
        estimate *= CRIT_MULTIPLIER;
    }
    if estimate >= target.health as f64 {
        score += LETHAL_BONUS;
    }
    score
}

/// Highest-scoring candidate; ties keep the first.
pub fn select_attack_target<R: Rng>(
    attacker: &Unit,
    candidates: &[&Unit],
    profile: &AiProfile,
    modifier: &DifficultyModifier,
    rng: &mut R,
) -> Option<UnitId> {
    let mut best: Option<(UnitId, f64)> = None;
    for target in candidates {
        let score = score_target(attacker, target, profile, modifier, rng);
        match best {
            Some((_, s)) if s >= score => {}
            _ => best = Some((target.id, score)),
        }
    }
    best.map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::Difficulty;
    use crate::fields::{build_opportunity_field, build_threat_field};
    use crate::profile::ProfileKind;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn unit(id: u32, faction: Faction, unit_type: UnitType, x: i32, y: i32) -> Unit {
        Unit::new(UnitId(id), faction, unit_type, Pos::new(x, y))
    }

    #[test]
    fn test_lethal_target_outranks_equal_priority_survivor() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut attacker = unit(1, Faction::Enemy, UnitType::Knight, 4, 4);
        attacker.attack = 10;
        attacker.crit_chance = 0.0;

        let mut fragile = unit(10, Faction::Player, UnitType::Rook, 4, 5);
        fragile.defense = 2;
        fragile.health = 5;
        fragile.max_health = 20;
        let mut sturdy = unit(11, Faction::Player, UnitType::Rook, 5, 4);
        sturdy.defense = 2;
        sturdy.health = 20;
        sturdy.max_health = 20;

        let profile = AiProfile::builtin(ProfileKind::Aggressive);
        let modifier = Difficulty::Normal.modifier();
        let lethal = score_target(&attacker, &fragile, &profile, &modifier, &mut rng);
        let survivor = score_target(&attacker, &sturdy, &profile, &modifier, &mut rng);
        assert!(lethal >= survivor + LETHAL_BONUS);
        assert_eq!(
            select_attack_target(&attacker, &[&sturdy, &fragile], &profile, &modifier, &mut rng),
            Some(UnitId(10))
        );
    }

    #[test]
    fn test_priority_rank_scoring() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut attacker = unit(1, Faction::Enemy, UnitType::Pawn, 4, 4);
        attacker.crit_chance = 0.0;
        let profile = AiProfile::builtin(ProfileKind::Aggressive);
        let modifier = Difficulty::Normal.modifier();
        // queen is rank 1: (7-1)*10 + attack 7 * 2, untouched, not lethal
        let queen = unit(10, Faction::Player, UnitType::Queen, 4, 5);
        let score = score_target(&attacker, &queen, &profile, &modifier, &mut rng);
        assert!((score - (60.0 + 14.0)).abs() < 1e-9);

        let mut no_priority = profile.clone();
        no_priority.target_priority.clear();
        let score = score_target(&attacker, &queen, &no_priority, &modifier, &mut rng);
        assert!((score - 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_ties_keep_first_target() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut attacker = unit(1, Faction::Enemy, UnitType::Pawn, 4, 4);
        attacker.crit_chance = 0.0;
        let a = unit(10, Faction::Player, UnitType::Pawn, 4, 5);
        let b = unit(11, Faction::Player, UnitType::Pawn, 5, 4);
        let profile = AiProfile::builtin(ProfileKind::Balanced);
        let modifier = Difficulty::Normal.modifier();
        assert_eq!(select_attack_target(&attacker, &[&a, &b], &profile, &modifier, &mut rng), Some(UnitId(10)));
        assert_eq!(select_attack_target(&attacker, &[&b, &a], &profile, &modifier, &mut rng), Some(UnitId(11)));
        assert_eq!(select_attack_target(&attacker, &[], &profile, &modifier, &mut rng), None);
    }

    #[test]
    fn test_quality_gate_extremes() {
        let mut grid = Grid::new(8, 8);
        let me = unit(1, Faction::Enemy, UnitType::Knight, 2, 2);
        let foe = unit(10, Faction::Player, UnitType::Pawn, 6, 6);
        grid.place(me.id, me.pos).unwrap();
        grid.place(foe.id, foe.pos).unwrap();
        let friendly = vec![me.clone()];
        let opposing = vec![foe];
        let threat = build_threat_field(&grid, &opposing);
        let opportunity = build_opportunity_field(&grid, &threat, &friendly, &opposing);
        let profile = AiProfile::builtin(ProfileKind::Aggressive);
        let mut rng = ChaCha8Rng::seed_from_u64(77);

        let mut modifier = Difficulty::Normal.modifier();
        for (quality, expected) in [(0.0, DecisionPath::Fallback), (1.0, DecisionPath::Scored)] {
            modifier.decision_quality = quality;
            let ctx = DecisionContext {
                grid: &grid,
                friendly: &friendly,
                opposing: &opposing,
                opportunity: &opportunity,
                modifier: &modifier,
            };
            for _ in 0..1000 {
                assert_eq!(decide(&me, &profile, &ctx, &mut rng).path, expected);
            }
        }
    }

    /// Enemy pawn pinned at (4,4) with a player pawn adjacent at (4,5).
    fn pinned_duel() -> (Grid, Unit, Vec<Unit>) {
        let mut grid = Grid::new(8, 8);
        let mut me = unit(1, Faction::Enemy, UnitType::Pawn, 4, 4);
        me.move_range = 0;
        me.energy = 5;
        me.crit_chance = 0.0;
        let foe = unit(10, Faction::Player, UnitType::Pawn, 4, 5);
        grid.place(me.id, me.pos).unwrap();
        grid.place(foe.id, foe.pos).unwrap();
        (grid, me, vec![foe])
    }

    fn decide_pinned(me: &Unit, grid: &Grid, opposing: &[Unit], ability_chance: f64) -> Action {
        let friendly = vec![me.clone()];
        let threat = build_threat_field(grid, opposing);
        let opportunity = build_opportunity_field(grid, &threat, &friendly, opposing);
        let modifier = Difficulty::Normal.modifier();
        let ctx = DecisionContext {
            grid,
            friendly: &friendly,
            opposing,
            opportunity: &opportunity,
            modifier: &modifier,
        };
        let mut profile = AiProfile::builtin(ProfileKind::Aggressive);
        profile.use_ability_chance = ability_chance;
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        scored_decision(me, &profile, &ctx, &mut rng)
    }

    #[test]
    fn test_ability_preempts_attack_when_roll_passes() {
        let (grid, me, opposing) = pinned_duel();
        for _ in 0..50 {
            assert_eq!(
                decide_pinned(&me, &grid, &opposing, 1.0),
                Action::ability(me.id, "charge", UnitId(10))
            );
        }
    }

    #[test]
    fn test_zero_ability_chance_attacks_instead() {
        let (grid, me, opposing) = pinned_duel();
        assert_eq!(decide_pinned(&me, &grid, &opposing, 0.0), Action::attack(me.id, UnitId(10)));
    }

    #[test]
    fn test_ability_gate_conditions() {
        let (grid, me, opposing) = pinned_duel();

        let mut tired = me.clone();
        tired.energy = MIN_ABILITY_ENERGY - 1;
        assert_eq!(decide_pinned(&tired, &grid, &opposing, 1.0), Action::attack(me.id, UnitId(10)));

        let mut spent = me.clone();
        spent.action_points = 0;
        assert_eq!(decide_pinned(&spent, &grid, &opposing, 1.0), Action::attack(me.id, UnitId(10)));

        let mut plain = me.clone();
        plain.abilities.clear();
        assert_eq!(decide_pinned(&plain, &grid, &opposing, 1.0), Action::attack(me.id, UnitId(10)));
    }

    #[test]
    fn test_nan_crit_chance_scores_without_crit() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut attacker = unit(1, Faction::Enemy, UnitType::Pawn, 4, 4);
        attacker.crit_chance = f64::NAN;
        let target = unit(10, Faction::Player, UnitType::Queen, 4, 5);
        let profile = AiProfile::builtin(ProfileKind::Aggressive);
        let modifier = Difficulty::Normal.modifier();
        let score = score_target(&attacker, &target, &profile, &modifier, &mut rng);
        assert!((score - 74.0).abs() < 1e-9);
    }

    #[test]
    fn test_moves_toward_opportunity() {
        let mut grid = Grid::new(8, 8);
        let mut me = unit(1, Faction::Enemy, UnitType::Rook, 1, 1);
        me.abilities.clear();
        let foe = unit(10, Faction::Player, UnitType::Pawn, 1, 5);
        grid.place(me.id, me.pos).unwrap();
        grid.place(foe.id, foe.pos).unwrap();
        let friendly = vec![me.clone()];
        let opposing = vec![foe];
        let threat = build_threat_field(&grid, &opposing);
        let opportunity = build_opportunity_field(&grid, &threat, &friendly, &opposing);
        let modifier = Difficulty::Hard.modifier();
        let ctx = DecisionContext {
            grid: &grid,
            friendly: &friendly,
            opposing: &opposing,
            opportunity: &opportunity,
            modifier: &modifier,
        };
        let profile = AiProfile::builtin(ProfileKind::Aggressive);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let best = best_reachable_cell(&me, &profile, &ctx);
        assert_eq!(best, Pos::new(1, 3));
        assert_eq!(scored_decision(&me, &profile, &ctx, &mut rng), Action::move_to(me.id, Pos::new(1, 3)));
    }
}
