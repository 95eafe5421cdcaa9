// ═══════════════════════════════════════════════════════════════════════
// Arena errors
// ═══════════════════════════════════════════════════════════════════════

use gambit_agents::AiError;
use gambit_engine::EngineError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArenaError {
    #[error("encounter setup failed: {0}")]
    Engine(#[from] EngineError),

    #[error("AI configuration: {0}")]
    Ai(#[from] AiError),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("stored record is malformed: {0}")]
    Corrupt(String),
}

pub type Result<T> = std::result::Result<T, ArenaError>;
