//! Decision engine configuration loaded from TOML
//!
//! Every field has a default, so an empty file is a valid config.
//!
//! ```toml
//! difficulty = "hard"
//! seed = 42
//! fog_of_war = true
//! sight_radius = 5
//!
//! [profiles.aggressive]
//! use_ability_chance = 0.1
//! target_priority = ["king", "queen"]
//! ```

use crate::difficulty::Difficulty;
use crate::error::{AiError, Result};
use crate::profile::{ProfileKind, ProfileOverride};
use gambit_engine::visibility::DEFAULT_SIGHT_RADIUS;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub difficulty: Difficulty,
    /// Seed of the engine's own RNG.
    pub seed: u64,
    /// Only reason about player units some enemy unit can see.
    pub fog_of_war: bool,
    pub sight_radius: u32,
    /// Replaces the difficulty's decision quality when set.
    pub decision_quality: Option<f64>,
    /// Patches to built-in profiles, keyed by profile name.
    pub profiles: HashMap<String, ProfileOverride>,
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig {
            difficulty: Difficulty::Normal,
            seed: 0,
            fog_of_war: false,
            sight_radius: DEFAULT_SIGHT_RADIUS,
            decision_quality: None,
            profiles: HashMap::new(),
        }
    }
}

impl AiConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(q) = self.decision_quality {
            if !(0.0..=1.0).contains(&q) {
                return Err(AiError::InvalidConfig(format!("decision_quality {} outside [0,1]", q)));
            }
        }
        for (name, patch) in &self.profiles {
            name.parse::<ProfileKind>()?;
            if let Some(chance) = patch.use_ability_chance {
                if !(0.0..=1.0).contains(&chance) {
                    return Err(AiError::InvalidConfig(format!(
                        "profile {}: use_ability_chance {} outside [0,1]",
                        name, chance
                    )));
                }
            }
        }
        Ok(())
    }
}

pub fn parse_config(contents: &str) -> Result<AiConfig> {
    let config: AiConfig = toml::from_str(contents)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<AiConfig> {
    let contents = fs::read_to_string(path)?;
    parse_config(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gambit_engine::types::UnitType;

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(parse_config("").unwrap(), AiConfig::default());
    }

    #[test]
    fn test_full_config() {
        let config = parse_config(
            r#"
            difficulty = "hard"
            seed = 42
            fog_of_war = true
            sight_radius = 5
            decision_quality = 1.0

            [profiles.aggressive]
            use_ability_chance = 0.1
            target_priority = ["king", "queen"]
            "#,
        )
        .unwrap();
        assert_eq!(config.difficulty, Difficulty::Hard);
        assert_eq!(config.seed, 42);
        assert!(config.fog_of_war);
        assert_eq!(config.decision_quality, Some(1.0));
        let patch = &config.profiles["aggressive"];
        assert_eq!(patch.use_ability_chance, Some(0.1));
        assert_eq!(patch.target_priority, Some(vec![UnitType::King, UnitType::Queen]));
        assert_eq!(patch.attack_weight, None);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(parse_config("difficulty = \"brutal\""), Err(AiError::Parse(_))));
        assert!(matches!(parse_config("decision_quality = 1.5"), Err(AiError::InvalidConfig(_))));
        assert!(matches!(parse_config("[profiles.berserk]\nattack_weight = 2.0"), Err(AiError::UnknownProfile(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/gambit.toml")).unwrap_err();
        assert!(matches!(err, AiError::Io(_)));
    }
}
