// ═══════════════════════════════════════════════════════════════════════
// Movement patterns — which cells a chess role may move to or strike
//
// Pure functions of (pattern, origin, grid, unit). Sliding roles stop at
// the first blocked cell and never travel further than the unit's range.
// ═══════════════════════════════════════════════════════════════════════

use crate::error::EngineError;
use crate::grid::Grid;
use crate::types::{Faction, Pos, Unit, UnitId, UnitType};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementPattern {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

const ORTHOGONAL: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];
const DIAGONAL: [(i32, i32); 4] = [(1, -1), (1, 1), (-1, 1), (-1, -1)];
const KNIGHT_JUMPS: [(i32, i32); 8] = [
    (1, 2), (2, 1), (2, -1), (1, -2),
    (-1, -2), (-2, -1), (-2, 1), (-1, 2),
];

impl MovementPattern {
    pub fn for_unit_type(unit_type: UnitType) -> Self {
        match unit_type {
            UnitType::Pawn => MovementPattern::Pawn,
            UnitType::Knight => MovementPattern::Knight,
            UnitType::Bishop => MovementPattern::Bishop,
            UnitType::Rook => MovementPattern::Rook,
            UnitType::Queen => MovementPattern::Queen,
            UnitType::King => MovementPattern::King,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MovementPattern::Pawn => "pawn",
            MovementPattern::Knight => "knight",
            MovementPattern::Bishop => "bishop",
            MovementPattern::Rook => "rook",
            MovementPattern::Queen => "queen",
            MovementPattern::King => "king",
        }
    }

    fn directions(self) -> &'static [(i32, i32)] {
        match self {
            MovementPattern::Bishop => &DIAGONAL,
            MovementPattern::Rook => &ORTHOGONAL,
            _ => &[],
        }
    }
}

impl FromStr for MovementPattern {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pawn" => Ok(MovementPattern::Pawn),
            "knight" => Ok(MovementPattern::Knight),
            "bishop" => Ok(MovementPattern::Bishop),
            "rook" => Ok(MovementPattern::Rook),
            "queen" => Ok(MovementPattern::Queen),
            "king" => Ok(MovementPattern::King),
            _ => Err(EngineError::UnknownPattern(s.to_string())),
        }
    }
}

/// Pawns advance toward the opposing side: enemies down the board (+y), players up.
fn forward(faction: Faction) -> i32 {
    match faction {
        Faction::Enemy => 1,
        Faction::Player => -1,
    }
}

/// Walk a ray, collecting empty cells. Stops before the first blocked cell.
fn slide(grid: &Grid, origin: Pos, (dx, dy): (i32, i32), steps: u32, out: &mut Vec<Pos>) {
    let mut pos = origin;
    for _ in 0..steps {
        pos = pos.offset(dx, dy);
        if !grid.is_walkable(pos) {
            break;
        }
        out.push(pos);
    }
}

/// Walk a ray of threatened cells. The first occupied cell is included, then the ray ends.
fn strike_ray(grid: &Grid, origin: Pos, (dx, dy): (i32, i32), steps: u32, out: &mut Vec<Pos>) {
    let mut pos = origin;
    for _ in 0..steps {
        pos = pos.offset(dx, dy);
        if !grid.is_tile_walkable(pos) {
            break;
        }
        out.push(pos);
        if grid.entity_at(pos).is_some() {
            break;
        }
    }
}

/// Legal destination cells for `unit` moving with `pattern` from `origin`.
pub fn move_cells(pattern: MovementPattern, origin: Pos, grid: &Grid, unit: &Unit) -> Vec<Pos> {
    let mut out = Vec::new();
    match pattern {
        MovementPattern::Pawn => {
            slide(grid, origin, (0, forward(unit.faction)), unit.move_range.max(1), &mut out);
        }
        MovementPattern::Knight => {
            out.extend(
                KNIGHT_JUMPS
                    .iter()
                    .map(|&(dx, dy)| origin.offset(dx, dy))
                    .filter(|&p| grid.is_walkable(p)),
            );
        }
        MovementPattern::King => {
            out.extend(
                ORTHOGONAL
                    .iter()
                    .chain(DIAGONAL.iter())
                    .map(|&(dx, dy)| origin.offset(dx, dy))
                    .filter(|&p| grid.is_walkable(p)),
            );
        }
        MovementPattern::Queen => {
            for &dir in ORTHOGONAL.iter().chain(DIAGONAL.iter()) {
                slide(grid, origin, dir, unit.move_range, &mut out);
            }
        }
        MovementPattern::Bishop | MovementPattern::Rook => {
            for &dir in pattern.directions() {
                slide(grid, origin, dir, unit.move_range, &mut out);
            }
        }
    }
    out
}

/// Cells `unit` threatens with `pattern` from `origin`, empty or not.
pub fn attack_cells(pattern: MovementPattern, origin: Pos, grid: &Grid, unit: &Unit) -> Vec<Pos> {
    let mut out = Vec::new();
    match pattern {
        MovementPattern::Pawn => {
            let fy = forward(unit.faction);
            out.extend(
                [origin.offset(-1, fy), origin.offset(1, fy)]
                    .into_iter()
                    .filter(|&p| grid.is_tile_walkable(p)),
            );
        }
        MovementPattern::Knight => {
            out.extend(
                KNIGHT_JUMPS
                    .iter()
                    .map(|&(dx, dy)| origin.offset(dx, dy))
                    .filter(|&p| grid.is_tile_walkable(p)),
            );
        }
        MovementPattern::King => {
            out.extend(
                ORTHOGONAL
                    .iter()
                    .chain(DIAGONAL.iter())
                    .map(|&(dx, dy)| origin.offset(dx, dy))
                    .filter(|&p| grid.is_tile_walkable(p)),
            );
        }
        MovementPattern::Queen => {
            for &dir in ORTHOGONAL.iter().chain(DIAGONAL.iter()) {
                strike_ray(grid, origin, dir, unit.attack_range, &mut out);
            }
        }
        MovementPattern::Bishop | MovementPattern::Rook => {
            for &dir in pattern.directions() {
                strike_ray(grid, origin, dir, unit.attack_range, &mut out);
            }
        }
    }
    out
}

/// Legal moves for a unit using its own role's pattern.
pub fn legal_moves(grid: &Grid, unit: &Unit) -> Vec<Pos> {
    move_cells(MovementPattern::for_unit_type(unit.unit_type), unit.pos, grid, unit)
}

/// Occupants of the cells a unit threatens. Faction filtering is up to the caller.
pub fn threatened_units(grid: &Grid, unit: &Unit) -> Vec<UnitId> {
    attack_cells(MovementPattern::for_unit_type(unit.unit_type), unit.pos, grid, unit)
        .into_iter()
        .filter_map(|p| grid.entity_at(p))
        .filter(|&id| id != unit.id)
        .collect()
}
