// ═══════════════════════════════════════════════════════════════════════
// Spatial fields — per-cell threat and opportunity, rebuilt every turn
//
// Both fields are plain snapshots: built once from the grid and unit lists,
// then only read. Profile weighting happens at query time in
// `OpportunityCell::weighted_total`, so nothing profile-specific is stored.
// ═══════════════════════════════════════════════════════════════════════

use crate::profile::AiProfile;
use gambit_engine::types::*;
use gambit_engine::Grid;
use serde::Serialize;
use tracing::warn;

/// Opportunity looks this far (Manhattan) for targets and allies.
pub const OPPORTUNITY_HORIZON: u32 = 2;
/// Bonus per nearby ally under half health.
const WOUNDED_ALLY_BONUS: f64 = 15.0;

/// Row-major cell storage shared by both fields, matching `Grid::index`.
#[derive(Debug, Clone, PartialEq, Serialize)]
struct CellTable<T> {
    width: i32,
    height: i32,
    cells: Vec<T>,
}

impl<T: Clone + Default> CellTable<T> {
    fn new(grid: &Grid) -> Self {
        CellTable {
            width: grid.width,
            height: grid.height,
            cells: vec![T::default(); grid.area()],
        }
    }

    fn index(&self, pos: Pos) -> Option<usize> {
        if pos.x < 1 || pos.y < 1 || pos.x > self.width || pos.y > self.height {
            return None;
        }
        Some(((pos.y - 1) * self.width + (pos.x - 1)) as usize)
    }

    fn get(&self, pos: Pos) -> Option<&T> {
        self.index(pos).and_then(|i| self.cells.get(i))
    }

    fn get_mut(&mut self, pos: Pos) -> Option<&mut T> {
        self.index(pos).and_then(move |i| self.cells.get_mut(i))
    }
}

// ── Threat ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ThreatCell {
    pub threat_level: f64,
    pub contributors: Vec<UnitId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreatField {
    table: CellTable<ThreatCell>,
}

impl ThreatField {
    pub fn get(&self, pos: Pos) -> Option<&ThreatCell> {
        self.table.get(pos)
    }

    /// Threat at `pos`; 0 outside the board.
    pub fn threat_at(&self, pos: Pos) -> f64 {
        self.get(pos).map_or(0.0, |c| c.threat_level)
    }

    pub fn max_threat(&self) -> f64 {
        self.table.cells.iter().map(|c| c.threat_level).fold(0.0, f64::max)
    }
}

/// Danger each cell is in from `opposing` units that could move then strike into it.
pub fn build_threat_field(grid: &Grid, opposing: &[Unit]) -> ThreatField {
    let mut table = CellTable::<ThreatCell>::new(grid);

    for unit in opposing.iter().filter(|u| u.is_alive()) {
        if !grid.is_in_bounds(unit.pos) {
            warn!(unit = %unit.id, pos = %unit.pos, "threat source off the board, skipped");
            continue;
        }
        let reach = unit.attack_range.saturating_add(unit.move_range);
        for cell in grid.cells_within(unit.pos, reach) {
            let d = unit.pos.manhattan(cell) as f64;
            let contribution = unit.attack.max(0) as f64 * (1.0 - d / (reach as f64 + 1.0));
            if let Some(tc) = table.get_mut(cell) {
                tc.threat_level += contribution;
                tc.contributors.push(unit.id);
            }
        }
    }
    ThreatField { table }
}

// ── Opportunity ────────────────────────────────────────────────────────

/// Base components of a cell's value. Unwalkable cells stay at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OpportunityCell {
    pub attack_value: f64,
    pub defense_value: f64,
    pub support_value: f64,
}

impl OpportunityCell {
    /// Profile-weighted value. Computed per query, never stored.
    pub fn weighted_total(&self, profile: &AiProfile) -> f64 {
        self.attack_value * profile.attack_weight
            + self.defense_value * profile.defense_weight
            + self.support_value * profile.support_weight
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpportunityField {
    table: CellTable<OpportunityCell>,
}

impl OpportunityField {
    pub fn get(&self, pos: Pos) -> Option<&OpportunityCell> {
        self.table.get(pos)
    }

    /// Weighted value of `pos` for `profile`; 0 outside the board.
    pub fn total_at(&self, pos: Pos, profile: &AiProfile) -> f64 {
        self.get(pos).map_or(0.0, |c| c.weighted_total(profile))
    }
}

pub fn build_opportunity_field(
    grid: &Grid,
    threat: &ThreatField,
    friendly: &[Unit],
    opposing: &[Unit],
) -> OpportunityField {
    let mut table = CellTable::<OpportunityCell>::new(grid);
    let targets: Vec<&Unit> = opposing
        .iter()
        .filter(|u| u.is_alive() && grid.is_in_bounds(u.pos))
        .collect();
    let allies: Vec<&Unit> = friendly
        .iter()
        .filter(|u| u.is_alive() && grid.is_in_bounds(u.pos))
        .collect();

    for cell in grid.cells() {
        if !grid.is_tile_walkable(cell) {
            continue;
        }

        let attack_value: f64 = targets
            .iter()
            .map(|p| p.pos.manhattan(cell))
            .filter(|&d| d <= OPPORTUNITY_HORIZON)
            .map(|d| (3 - d) as f64 * 10.0)
            .sum();

        let defense_value = (100.0 - threat.threat_at(cell) * 10.0).max(0.0);

        let support_value: f64 = allies
            .iter()
            .filter_map(|a| {
                let d = a.pos.manhattan(cell);
                if d == 0 || d > OPPORTUNITY_HORIZON {
                    return None;
                }
                let bonus = if a.health_ratio() < 0.5 { WOUNDED_ALLY_BONUS } else { 0.0 };
                Some((3 - d) as f64 * 5.0 + bonus)
            })
            .sum();

        if let Some(oc) = table.get_mut(cell) {
            *oc = OpportunityCell { attack_value, defense_value, support_value };
        }
    }
    OpportunityField { table }
}
