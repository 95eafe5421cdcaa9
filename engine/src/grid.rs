// ═══════════════════════════════════════════════════════════════════════
// Grid — the tactical board: tile walkability plus unit occupancy
//
// Cells are addressed 1-based: x in 1..=width, y in 1..=height.
// Tiles are stored row-major, `tiles[y-1][x-1]`.
// ═══════════════════════════════════════════════════════════════════════

use crate::error::{EngineError, Result};
use crate::types::{Pos, UnitId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Static description of one board tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub walkable: bool,
}

impl Default for Tile {
    fn default() -> Self {
        Tile { walkable: true }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    tiles: Vec<Vec<Tile>>,
    occupants: HashMap<Pos, UnitId>,
}

impl Grid {
    /// An open board with every tile walkable. Negative sizes collapse to an empty board.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Grid {
            width,
            height,
            tiles: vec![vec![Tile::default(); width as usize]; height as usize],
            occupants: HashMap::new(),
        }
    }

    /// Number of cells on the board.
    pub fn area(&self) -> usize {
        (self.width * self.height) as usize
    }

    pub fn is_in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 1 && pos.y >= 1 && pos.x <= self.width && pos.y <= self.height
    }

    pub fn tile(&self, pos: Pos) -> Option<&Tile> {
        if !self.is_in_bounds(pos) {
            return None;
        }
        self.tiles
            .get((pos.y - 1) as usize)
            .and_then(|row| row.get((pos.x - 1) as usize))
    }

    pub fn set_walkable(&mut self, pos: Pos, walkable: bool) {
        if !self.is_in_bounds(pos) {
            return;
        }
        if let Some(tile) = self
            .tiles
            .get_mut((pos.y - 1) as usize)
            .and_then(|row| row.get_mut((pos.x - 1) as usize))
        {
            tile.walkable = walkable;
        }
    }

    /// Terrain check only: in bounds and the tile itself can be stood on.
    pub fn is_tile_walkable(&self, pos: Pos) -> bool {
        self.tile(pos).is_some_and(|t| t.walkable)
    }

    /// In bounds, walkable terrain, and nobody standing there.
    pub fn is_walkable(&self, pos: Pos) -> bool {
        self.is_tile_walkable(pos) && !self.occupants.contains_key(&pos)
    }

    pub fn entity_at(&self, pos: Pos) -> Option<UnitId> {
        self.occupants.get(&pos).copied()
    }

    /// Put a unit on an empty walkable cell.
    pub fn place(&mut self, id: UnitId, pos: Pos) -> Result<()> {
        if !self.is_in_bounds(pos) {
            return Err(EngineError::OutOfBounds(pos));
        }
        if !self.is_tile_walkable(pos) {
            return Err(EngineError::Blocked(pos));
        }
        if let Some(occupant) = self.entity_at(pos) {
            return Err(EngineError::Occupied { pos, occupant });
        }
        self.occupants.insert(pos, id);
        Ok(())
    }

    /// Clear a cell. Returns whoever stood there.
    pub fn vacate(&mut self, pos: Pos) -> Option<UnitId> {
        self.occupants.remove(&pos)
    }

    /// Relocate the occupant of `from` to `to`, keeping occupancy consistent.
    pub fn move_entity(&mut self, from: Pos, to: Pos) -> Result<()> {
        let Some(id) = self.entity_at(from) else {
            return Ok(());
        };
        if from == to {
            return Ok(());
        }
        self.place(id, to)?;
        self.occupants.remove(&from);
        Ok(())
    }

    /// Every in-bounds cell, row by row.
    pub fn cells(&self) -> impl Iterator<Item = Pos> + '_ {
        (1..=self.height).flat_map(move |y| (1..=self.width).map(move |x| Pos::new(x, y)))
    }

    /// In-bounds cells within Manhattan distance `radius` of `center`, row by row.
    /// Rows and columns are clipped to the board before iterating, so the cost
    /// never exceeds the board area however large `radius` is.
    pub fn cells_within(&self, center: Pos, radius: u32) -> Vec<Pos> {
        let r = i64::from(radius);
        let (cx, cy) = (i64::from(center.x), i64::from(center.y));
        let mut out = Vec::new();
        for y in (cy - r).max(1)..=(cy + r).min(i64::from(self.height)) {
            let span = r - (y - cy).abs();
            for x in (cx - span).max(1)..=(cx + span).min(i64::from(self.width)) {
                out.push(Pos::new(x as i32, y as i32));
            }
        }
        out
    }

    /// Flat index for per-cell storage; `None` when out of bounds.
    pub fn index(&self, pos: Pos) -> Option<usize> {
        if !self.is_in_bounds(pos) {
            return None;
        }
        Some(((pos.y - 1) * self.width + (pos.x - 1)) as usize)
    }
}
