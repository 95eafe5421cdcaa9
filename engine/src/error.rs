// ═══════════════════════════════════════════════════════════════════════
// Engine errors — parsing and scenario validation failures
// ═══════════════════════════════════════════════════════════════════════

use crate::types::{Pos, UnitId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("unknown unit type: {0}")]
    UnknownUnitType(String),

    #[error("unknown movement pattern: {0}")]
    UnknownPattern(String),

    #[error("cell {0} is outside the board")]
    OutOfBounds(Pos),

    #[error("cell {pos} is already occupied by unit {occupant}")]
    Occupied { pos: Pos, occupant: UnitId },

    #[error("cell {0} is not walkable")]
    Blocked(Pos),

    #[error("duplicate unit id {0}")]
    DuplicateUnit(UnitId),
}

pub type Result<T> = std::result::Result<T, EngineError>;
