// ═══════════════════════════════════════════════════════════════════════
// Encounter setup — seeded skirmish boards
// ═══════════════════════════════════════════════════════════════════════

use crate::engine::EncounterState;
use crate::error::Result;
use crate::grid::Grid;
use crate::types::*;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Chance that an interior tile becomes an obstacle.
const OBSTACLE_DENSITY: f64 = 0.08;

/// Back rank then front rank, left to right.
const PLAYER_ROSTER: [&[UnitType]; 2] = [
    &[UnitType::Rook, UnitType::Knight, UnitType::Bishop, UnitType::Queen,
      UnitType::King, UnitType::Bishop, UnitType::Knight, UnitType::Rook],
    &[UnitType::Pawn, UnitType::Pawn, UnitType::Pawn, UnitType::Pawn],
];

const ENEMY_ROSTER: [&[UnitType]; 2] = [
    &[UnitType::Rook, UnitType::Knight, UnitType::Bishop, UnitType::Queen,
      UnitType::King, UnitType::Knight],
    &[UnitType::Pawn, UnitType::Pawn, UnitType::Pawn, UnitType::Pawn, UnitType::Pawn],
];

/// Parameters for a generated skirmish.
#[derive(Debug, Clone)]
pub struct SkirmishConfig {
    pub width: i32,
    pub height: i32,
    /// Difficulty scaling of enemy max/current health.
    pub enemy_health_multiplier: f64,
    /// Difficulty scaling of enemy damage, stored on the encounter.
    pub enemy_damage_multiplier: f64,
    /// Promote the enemy queen to a boss.
    pub enemy_boss: bool,
}

impl Default for SkirmishConfig {
    fn default() -> Self {
        SkirmishConfig {
            width: 10,
            height: 10,
            enemy_health_multiplier: 1.0,
            enemy_damage_multiplier: 1.0,
            enemy_boss: true,
        }
    }
}

/// Lay one roster row out centred on `y`, clipped to the board width.
fn spawn_row(
    units: &mut Vec<Unit>,
    next_id: &mut u32,
    faction: Faction,
    roster: &[UnitType],
    y: i32,
    width: i32,
) {
    let count = (roster.len() as i32).min(width);
    let start = (width - count) / 2 + 1;
    for (i, &unit_type) in roster.iter().take(count as usize).enumerate() {
        units.push(Unit::new(UnitId(*next_id), faction, unit_type, Pos::new(start + i as i32, y)));
        *next_id += 1;
    }
}

/// Create a seeded skirmish: enemies on the top two rows, players on the bottom two,
/// scattered obstacles in between.
pub fn create_skirmish(config: &SkirmishConfig, seed: u64) -> Result<EncounterState> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut grid = Grid::new(config.width, config.height);

    // Obstacles only between the two deployment zones
    for y in 3..=(config.height - 2) {
        for x in 1..=config.width {
            if rng.gen_bool(OBSTACLE_DENSITY) {
                grid.set_walkable(Pos::new(x, y), false);
            }
        }
    }

    let mut units = Vec::new();
    let mut next_id = 1;
    spawn_row(&mut units, &mut next_id, Faction::Enemy, ENEMY_ROSTER[0], 1, config.width);
    spawn_row(&mut units, &mut next_id, Faction::Enemy, ENEMY_ROSTER[1], 2, config.width);
    spawn_row(&mut units, &mut next_id, Faction::Player, PLAYER_ROSTER[1], config.height - 1, config.width);
    spawn_row(&mut units, &mut next_id, Faction::Player, PLAYER_ROSTER[0], config.height, config.width);

    for unit in units.iter_mut().filter(|u| u.faction == Faction::Enemy) {
        let scaled = ((unit.max_health as f64) * config.enemy_health_multiplier).round() as i32;
        unit.max_health = scaled.max(1);
        unit.health = unit.max_health;
        if config.enemy_boss && unit.unit_type == UnitType::Queen {
            unit.boss = true;
        }
    }

    let mut state = EncounterState::new(grid, units, seed)?;
    state.enemy_damage_multiplier = config.enemy_damage_multiplier;
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skirmish_places_both_sides() {
        let state = create_skirmish(&SkirmishConfig::default(), 7).unwrap();
        assert_eq!(state.living_count(Faction::Player), 12);
        assert_eq!(state.living_count(Faction::Enemy), 11);
        for unit in &state.units {
            assert_eq!(state.grid.entity_at(unit.pos), Some(unit.id));
        }
    }

    #[test]
    fn test_deterministic_seed() {
        let a = create_skirmish(&SkirmishConfig::default(), 99).unwrap();
        let b = create_skirmish(&SkirmishConfig::default(), 99).unwrap();
        let blocked = |s: &EncounterState| -> Vec<Pos> {
            s.grid.cells().filter(|&p| !s.grid.is_tile_walkable(p)).collect()
        };
        assert_eq!(blocked(&a), blocked(&b));
    }

    #[test]
    fn test_health_multiplier_scales_enemies_only() {
        let config = SkirmishConfig { enemy_health_multiplier: 2.0, ..SkirmishConfig::default() };
        let state = create_skirmish(&config, 1).unwrap();
        let enemy_pawn = state.units.iter()
            .find(|u| u.faction == Faction::Enemy && u.unit_type == UnitType::Pawn)
            .unwrap();
        let player_pawn = state.units.iter()
            .find(|u| u.faction == Faction::Player && u.unit_type == UnitType::Pawn)
            .unwrap();
        assert_eq!(enemy_pawn.max_health, 20);
        assert_eq!(player_pawn.max_health, 10);
    }

    #[test]
    fn test_narrow_board_clips_rosters() {
        let config = SkirmishConfig { width: 4, height: 6, ..SkirmishConfig::default() };
        let state = create_skirmish(&config, 3).unwrap();
        assert!(state.units.iter().all(|u| state.grid.is_in_bounds(u.pos)));
        assert_eq!(state.living_count(Faction::Player), 8);
    }
}
