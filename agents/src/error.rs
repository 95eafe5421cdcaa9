// ═══════════════════════════════════════════════════════════════════════
// Decision engine errors — configuration and lookup failures only.
// A turn never fails: bad input inside `process_turn` is skipped.
// ═══════════════════════════════════════════════════════════════════════

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AiError {
    #[error("unknown difficulty '{0}' (expected easy, normal or hard)")]
    UnknownDifficulty(String),

    #[error("unknown AI profile '{0}'")]
    UnknownProfile(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, AiError>;
