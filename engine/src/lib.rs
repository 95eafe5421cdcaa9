pub mod error;
pub mod types;
pub mod grid;
pub mod abilities;
pub mod movement;
pub mod navigation;
pub mod visibility;
pub mod setup;
pub mod engine;

pub use types::*;
pub use error::EngineError;
pub use grid::Grid;
