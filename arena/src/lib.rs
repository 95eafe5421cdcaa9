pub mod error;
pub mod runner;
pub mod database;
mod tests;

pub use error::ArenaError;
pub use runner::{run_batch, run_encounter, ArenaConfig, EncounterResult};
