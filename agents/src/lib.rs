pub mod error;
pub mod difficulty;
pub mod profile;
pub mod fields;
pub mod tactics;
pub mod abilities;
pub mod decision;
pub mod random;
pub mod memory;
pub mod config;
pub mod agent;
pub mod orchestrator;

pub use agent::{Agent, Observation};
pub use config::AiConfig;
pub use difficulty::{Difficulty, DifficultyModifier};
pub use error::AiError;
pub use orchestrator::{DebugInfo, TacticalAi};
pub use profile::{AiProfile, ProfileKind};
pub use random::RandomAgent;
