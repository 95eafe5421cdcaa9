// ═══════════════════════════════════════════════════════════════════════
// Tactical planner — multi-unit formations around a target unit
//
// Each turn the planner matches the formation catalog against the current
// snapshot and emits plans: unit -> formation cell. The decision pass then
// consumes them one unit at a time; a unit is handed at most one move.
// ═══════════════════════════════════════════════════════════════════════

use crate::difficulty::{Difficulty, DifficultyModifier};
use gambit_engine::types::*;
use gambit_engine::Grid;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TacticKind {
    Surround,
    Protect,
    CoordAttack,
    AttackLine,
    KnightFlank,
}

impl TacticKind {
    pub fn name(self) -> &'static str {
        match self {
            TacticKind::Surround => "surround",
            TacticKind::Protect => "protect",
            TacticKind::CoordAttack => "coordAttack",
            TacticKind::AttackLine => "attackLine",
            TacticKind::KnightFlank => "knightFlank",
        }
    }
}

impl std::fmt::Display for TacticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Who a formation forms up around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TargetClass {
    EnemyOfAi,
    /// A friendly king or queen.
    AllyOfAi,
}

/// Static formation template. `eligible: None` accepts any role.
#[derive(Debug, Clone, Copy)]
pub struct TacticalPattern {
    pub kind: TacticKind,
    pub required_units: usize,
    pub eligible: Option<&'static [UnitType]>,
    pub target: TargetClass,
    /// Cell offsets relative to the target's position.
    pub offsets: &'static [(i32, i32)],
}

impl TacticalPattern {
    pub fn accepts(&self, unit_type: UnitType) -> bool {
        self.eligible.map_or(true, |types| types.contains(&unit_type))
    }
}

pub const PATTERNS: [TacticalPattern; 5] = [
    TacticalPattern {
        kind: TacticKind::Surround,
        required_units: 3,
        eligible: None,
        target: TargetClass::EnemyOfAi,
        offsets: &[(0, -1), (1, 0), (0, 1), (-1, 0)],
    },
    TacticalPattern {
        kind: TacticKind::Protect,
        required_units: 2,
        eligible: Some(&[UnitType::Pawn, UnitType::Rook, UnitType::Knight]),
        target: TargetClass::AllyOfAi,
        offsets: &[(-1, 1), (0, 1), (1, 1), (-1, 0), (1, 0)],
    },
    TacticalPattern {
        kind: TacticKind::CoordAttack,
        required_units: 2,
        eligible: Some(&[UnitType::Knight, UnitType::Bishop, UnitType::Rook, UnitType::Queen]),
        target: TargetClass::EnemyOfAi,
        offsets: &[(0, -2), (2, 0), (0, 2), (-2, 0)],
    },
    TacticalPattern {
        kind: TacticKind::AttackLine,
        required_units: 3,
        eligible: Some(&[UnitType::Pawn]),
        target: TargetClass::EnemyOfAi,
        offsets: &[(-1, -1), (0, -1), (1, -1)],
    },
    TacticalPattern {
        kind: TacticKind::KnightFlank,
        required_units: 2,
        eligible: Some(&[UnitType::Knight]),
        target: TargetClass::EnemyOfAi,
        offsets: &[(1, 2), (-1, 2), (2, 1), (-2, 1), (1, -2), (-1, -2), (2, -1), (-2, -1)],
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub unit: UnitId,
    pub cell: Pos,
}

/// One matched formation for this turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TacticalPlan {
    pub tactic: TacticKind,
    pub target: UnitId,
    pub assignments: Vec<Assignment>,
}

impl TacticalPlan {
    pub fn cell_for(&self, unit: UnitId) -> Option<Pos> {
        self.assignments.iter().find(|a| a.unit == unit).map(|a| a.cell)
    }
}

/// Match every pattern against every target and assign units to formation cells.
/// Returns nothing when the difficulty does not coordinate.
pub fn generate_plans(
    patterns: &[TacticalPattern],
    friendly: &[Unit],
    opposing: &[Unit],
    grid: &Grid,
    difficulty: Difficulty,
    modifier: &DifficultyModifier,
) -> Vec<TacticalPlan> {
    if !difficulty.plans_formations(modifier) {
        return Vec::new();
    }

    let on_board = |u: &&Unit| {
        let ok = u.is_alive() && grid.is_in_bounds(u.pos);
        if u.is_alive() && !ok {
            warn!(unit = %u.id, pos = %u.pos, "unit off the board, left out of planning");
        }
        ok
    };
    let friendly: Vec<&Unit> = friendly.iter().filter(on_board).collect();
    let opposing: Vec<&Unit> = opposing.iter().filter(on_board).collect();

    let mut plans = Vec::new();
    for pattern in patterns {
        let eligible: Vec<&Unit> = friendly
            .iter()
            .copied()
            .filter(|u| pattern.accepts(u.unit_type))
            .collect();
        if eligible.len() < pattern.required_units {
            continue;
        }

        let targets: Vec<&Unit> = match pattern.target {
            TargetClass::EnemyOfAi => opposing.clone(),
            TargetClass::AllyOfAi => friendly
                .iter()
                .copied()
                .filter(|u| u.unit_type.is_high_value())
                .collect(),
        };

        for target in targets {
            // A unit never forms up around itself.
            let units: Vec<&Unit> = eligible.iter().copied().filter(|u| u.id != target.id).collect();
            if units.len() < pattern.required_units {
                continue;
            }
            if let Some(plan) = plan_formation(pattern, target, &units, grid) {
                debug!(tactic = %plan.tactic, target = %plan.target, units = plan.assignments.len(), "formation planned");
                plans.push(plan);
            }
        }
    }
    plans
}

fn plan_formation(
    pattern: &TacticalPattern,
    target: &Unit,
    units: &[&Unit],
    grid: &Grid,
) -> Option<TacticalPlan> {
    let cells: Vec<Pos> = pattern
        .offsets
        .iter()
        .map(|&(dx, dy)| target.pos.offset(dx, dy))
        .filter(|&c| grid.is_tile_walkable(c))
        .collect();
    if cells.len() < pattern.required_units {
        return None;
    }

    // Nearest pairs first; the stable sort keeps unit then cell order on ties.
    let mut pairs: Vec<(u32, usize, usize)> = Vec::with_capacity(units.len() * cells.len());
    for (ui, unit) in units.iter().enumerate() {
        for (ci, &cell) in cells.iter().enumerate() {
            pairs.push((unit.pos.manhattan(cell), ui, ci));
        }
    }
    pairs.sort_by_key(|&(d, _, _)| d);

    let mut used_units = HashSet::new();
    let mut used_cells = HashSet::new();
    let mut assignments = Vec::with_capacity(pattern.required_units);
    for (_, ui, ci) in pairs {
        if assignments.len() == pattern.required_units {
            break;
        }
        if used_units.contains(&ui) || used_cells.contains(&ci) {
            continue;
        }
        used_units.insert(ui);
        used_cells.insert(ci);
        assignments.push(Assignment { unit: units[ui].id, cell: cells[ci] });
    }

    (assignments.len() >= pattern.required_units).then(|| TacticalPlan {
        tactic: pattern.kind,
        target: target.id,
        assignments,
    })
}

/// This turn's plans, consumed unit by unit during the decision pass.
#[derive(Debug, Clone, Default)]
pub struct PlanBook {
    plans: Vec<TacticalPlan>,
}

impl PlanBook {
    pub fn new(plans: Vec<TacticalPlan>) -> Self {
        PlanBook { plans }
    }

    pub fn plans(&self) -> &[TacticalPlan] {
        &self.plans
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// Take `unit`'s formation move, if any plan lists it. The first plan in
    /// generation order wins, and the unit is struck from every plan so it is
    /// never handed a second move this turn. A unit already on its cell gets
    /// `None` and is left to the decision engine.
    pub fn check_and_consume(&mut self, unit: &Unit) -> Option<Action> {
        let (tactic, cell) = self
            .plans
            .iter()
            .find_map(|p| p.cell_for(unit.id).map(|c| (p.tactic, c)))?;

        for plan in &mut self.plans {
            plan.assignments.retain(|a| a.unit != unit.id);
        }

        if cell == unit.pos {
            return None;
        }
        Some(Action::tactical_move(unit.id, cell, tactic.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enemy(id: u32, unit_type: UnitType, x: i32, y: i32) -> Unit {
        Unit::new(UnitId(id), Faction::Enemy, unit_type, Pos::new(x, y))
    }

    fn player(id: u32, unit_type: UnitType, x: i32, y: i32) -> Unit {
        Unit::new(UnitId(id), Faction::Player, unit_type, Pos::new(x, y))
    }

    fn normal() -> (Difficulty, DifficultyModifier) {
        (Difficulty::Normal, Difficulty::Normal.modifier())
    }

    #[test]
    fn test_easy_returns_no_plans() {
        let grid = Grid::new(8, 8);
        let friendly = vec![enemy(1, UnitType::Pawn, 1, 1), enemy(2, UnitType::Pawn, 2, 1), enemy(3, UnitType::Pawn, 3, 1)];
        let opposing = vec![player(10, UnitType::Pawn, 4, 4)];
        let plans = generate_plans(&PATTERNS, &friendly, &opposing, &grid, Difficulty::Easy, &Difficulty::Easy.modifier());
        assert!(plans.is_empty());
    }

    #[test]
    fn test_knight_flank_assigns_nearest_distinct_cells() {
        let grid = Grid::new(8, 8);
        let friendly = vec![enemy(1, UnitType::Knight, 1, 1), enemy(2, UnitType::Knight, 8, 1)];
        let opposing = vec![player(10, UnitType::Queen, 4, 4)];
        let (d, m) = normal();
        let plans = generate_plans(&[PATTERNS[4]], &friendly, &opposing, &grid, d, &m);
        assert_eq!(plans.len(), 1);
        let plan = &plans[0];
        assert_eq!(plan.tactic, TacticKind::KnightFlank);
        assert_eq!(plan.assignments.len(), 2);
        let cells: HashSet<Pos> = plan.assignments.iter().map(|a| a.cell).collect();
        assert_eq!(cells.len(), 2);
        // each knight is sent to a jump cell on its own side of the target
        assert!(plan.cell_for(UnitId(1)).unwrap().x < 4);
        assert!(plan.cell_for(UnitId(2)).unwrap().x > 4);
    }

    #[test]
    fn test_assignment_is_injective_when_one_cell_is_closest_for_all() {
        let grid = Grid::new(8, 8);
        let friendly = vec![
            enemy(1, UnitType::Pawn, 4, 1),
            enemy(2, UnitType::Pawn, 4, 1),
            enemy(3, UnitType::Pawn, 4, 2),
        ];
        let opposing = vec![player(10, UnitType::Rook, 4, 5)];
        let (d, m) = normal();
        let plans = generate_plans(&[PATTERNS[3]], &friendly, &opposing, &grid, d, &m);
        assert_eq!(plans.len(), 1);
        let units: HashSet<UnitId> = plans[0].assignments.iter().map(|a| a.unit).collect();
        let cells: HashSet<Pos> = plans[0].assignments.iter().map(|a| a.cell).collect();
        assert_eq!(units.len(), 3);
        assert_eq!(cells.len(), 3);
    }

    #[test]
    fn test_too_few_cells_discards_target() {
        let mut grid = Grid::new(8, 8);
        // wall off three of the four neighbours
        grid.set_walkable(Pos::new(4, 3), false);
        grid.set_walkable(Pos::new(5, 4), false);
        grid.set_walkable(Pos::new(3, 4), false);
        let friendly = vec![enemy(1, UnitType::Pawn, 1, 1), enemy(2, UnitType::Rook, 2, 1), enemy(3, UnitType::Bishop, 3, 1)];
        let opposing = vec![player(10, UnitType::Pawn, 4, 4)];
        let (d, m) = normal();
        let plans = generate_plans(&[PATTERNS[0]], &friendly, &opposing, &grid, d, &m);
        assert!(plans.is_empty());
    }

    #[test]
    fn test_too_few_eligible_units_skips_pattern() {
        let grid = Grid::new(8, 8);
        let friendly = vec![enemy(1, UnitType::Knight, 1, 1), enemy(2, UnitType::Pawn, 2, 1)];
        let opposing = vec![player(10, UnitType::Pawn, 4, 4)];
        let (d, m) = normal();
        assert!(generate_plans(&[PATTERNS[4]], &friendly, &opposing, &grid, d, &m).is_empty());
    }

    #[test]
    fn test_protect_targets_friendly_high_value() {
        let grid = Grid::new(8, 8);
        let friendly = vec![
            enemy(1, UnitType::King, 4, 2),
            enemy(2, UnitType::Rook, 1, 1),
            enemy(3, UnitType::Pawn, 7, 1),
        ];
        let (d, m) = normal();
        let plans = generate_plans(&[PATTERNS[1]], &friendly, &[], &grid, d, &m);
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].target, UnitId(1));
        assert!(plans[0].cell_for(UnitId(1)).is_none());
    }

    #[test]
    fn test_consume_is_at_most_once_across_plans() {
        let plan = |tactic, cell| TacticalPlan {
            tactic,
            target: UnitId(10),
            assignments: vec![Assignment { unit: UnitId(1), cell }],
        };
        let mut book = PlanBook::new(vec![
            plan(TacticKind::Surround, Pos::new(3, 3)),
            plan(TacticKind::CoordAttack, Pos::new(5, 5)),
        ]);
        let unit = enemy(1, UnitType::Knight, 1, 1);

        let first = book.check_and_consume(&unit).unwrap();
        assert_eq!(first.kind, ActionKind::Move { to: Pos::new(3, 3), tactic: Some("surround".into()) });
        assert!(book.check_and_consume(&unit).is_none());
        assert!(book.plans().iter().all(|p| p.assignments.is_empty()));
    }

    #[test]
    fn test_unit_already_in_place_is_released() {
        let mut book = PlanBook::new(vec![TacticalPlan {
            tactic: TacticKind::Surround,
            target: UnitId(10),
            assignments: vec![Assignment { unit: UnitId(1), cell: Pos::new(2, 2) }],
        }]);
        let unit = enemy(1, UnitType::Pawn, 2, 2);
        assert!(book.check_and_consume(&unit).is_none());
        assert!(book.plans()[0].assignments.is_empty());
    }
}
