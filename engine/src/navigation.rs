// ═══════════════════════════════════════════════════════════════════════
// Navigation — A* over the 4-neighbourhood of the board
//
// Open/closed bookkeeping is keyed by `Pos` directly. Occupied cells are
// impassable, except the goal, which only needs walkable terrain.
// ═══════════════════════════════════════════════════════════════════════

use crate::grid::Grid;
use crate::types::Pos;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// Node in the A* open set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PathNode {
    pos: Pos,
    f_cost: u32,
}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap; break ties on position for a stable expansion order
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| other.pos.cmp(&self.pos))
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest path from `start` to `goal`, both ends included.
/// Returns None if the goal is off the board, on blocked terrain, or unreachable.
pub fn find_path(grid: &Grid, start: Pos, goal: Pos) -> Option<Vec<Pos>> {
    if !grid.is_in_bounds(start) || !grid.is_tile_walkable(goal) {
        return None;
    }
    if start == goal {
        return Some(vec![start]);
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: HashMap<Pos, Pos> = HashMap::new();
    let mut g_scores: HashMap<Pos, u32> = HashMap::new();

    g_scores.insert(start, 0);
    open_set.push(PathNode { pos: start, f_cost: start.manhattan(goal) });

    while let Some(current) = open_set.pop() {
        if current.pos == goal {
            return Some(reconstruct_path(&came_from, goal));
        }

        let current_g = *g_scores.get(&current.pos).unwrap_or(&u32::MAX);

        for neighbor in current.pos.neighbors() {
            let passable = if neighbor == goal {
                grid.is_tile_walkable(neighbor)
            } else {
                grid.is_walkable(neighbor)
            };
            if !passable {
                continue;
            }

            let tentative_g = current_g + 1;
            if tentative_g < *g_scores.get(&neighbor).unwrap_or(&u32::MAX) {
                came_from.insert(neighbor, current.pos);
                g_scores.insert(neighbor, tentative_g);
                open_set.push(PathNode {
                    pos: neighbor,
                    f_cost: tentative_g + neighbor.manhattan(goal),
                });
            }
        }
    }

    None
}

fn reconstruct_path(came_from: &HashMap<Pos, Pos>, goal: Pos) -> Vec<Pos> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// Furthest cell along the shortest path to `goal` reachable in `max_steps`,
/// never ending on an occupied cell. Returns `from` when no progress is possible.
pub fn step_toward(grid: &Grid, from: Pos, goal: Pos, max_steps: u32) -> Pos {
    let Some(path) = find_path(grid, from, goal) else {
        return from;
    };
    path.iter()
        .skip(1)
        .take(max_steps as usize)
        .take_while(|&&p| grid.is_walkable(p))
        .last()
        .copied()
        .unwrap_or(from)
}
