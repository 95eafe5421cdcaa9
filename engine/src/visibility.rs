// ═══════════════════════════════════════════════════════════════════════
// Visibility — Bresenham line of sight and per-faction fog of war
//
// Unwalkable tiles block sight; units do not. The two end cells of a
// line never block it.
// ═══════════════════════════════════════════════════════════════════════

use crate::grid::Grid;
use crate::types::{Faction, Pos, Unit};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Default sight radius (Manhattan) when a caller does not supply one.
pub const DEFAULT_SIGHT_RADIUS: u32 = 6;

/// Cells on the Bresenham line from `a` to `b`, both ends included.
pub fn bresenham_line(a: Pos, b: Pos) -> Vec<Pos> {
    let dx = (b.x - a.x).abs();
    let dy = -(b.y - a.y).abs();
    let sx = if a.x < b.x { 1 } else { -1 };
    let sy = if a.y < b.y { 1 } else { -1 };
    let mut err = dx + dy;

    let mut cells = Vec::with_capacity((dx - dy + 1) as usize);
    let (mut x, mut y) = (a.x, a.y);
    loop {
        cells.push(Pos::new(x, y));
        if x == b.x && y == b.y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    cells
}

/// True if nothing opaque stands strictly between `from` and `to`.
pub fn has_line_of_sight(grid: &Grid, from: Pos, to: Pos) -> bool {
    if !grid.is_in_bounds(from) || !grid.is_in_bounds(to) {
        return false;
    }
    let line = bresenham_line(from, to);
    let inner = line.len().saturating_sub(1);
    line.iter()
        .take(inner)
        .skip(1)
        .all(|&p| grid.is_tile_walkable(p))
}

/// Cells visible from `origin` within Manhattan `radius`.
pub fn visible_cells(grid: &Grid, origin: Pos, radius: u32) -> HashSet<Pos> {
    grid.cells_within(origin, radius)
        .into_iter()
        .filter(|&p| has_line_of_sight(grid, origin, p))
        .collect()
}

/// What one faction can currently see: the union over its living units.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactionVisibility {
    pub faction: Option<Faction>,
    pub visible: HashSet<Pos>,
}

impl FactionVisibility {
    pub fn compute(grid: &Grid, faction: Faction, units: &[Unit], radius: u32) -> Self {
        let mut visible = HashSet::new();
        for unit in units.iter().filter(|u| u.faction == faction && u.is_alive()) {
            visible.extend(visible_cells(grid, unit.pos, radius));
        }
        FactionVisibility { faction: Some(faction), visible }
    }

    pub fn is_visible(&self, pos: Pos) -> bool {
        self.visible.contains(&pos)
    }

    /// Keep only the units standing on visible cells.
    pub fn filter_visible<'a>(&self, units: &'a [Unit]) -> Vec<&'a Unit> {
        units.iter().filter(|u| self.is_visible(u.pos)).collect()
    }
}
