// ═══════════════════════════════════════════════════════════════════════
// Difficulty — selects the scaling record the decision engine runs under
// ═══════════════════════════════════════════════════════════════════════

use crate::error::AiError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

/// Scaling applied to enemy stats and to the quality of enemy decisions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyModifier {
    pub damage_multiplier: f64,
    pub health_multiplier: f64,
    /// Probability in [0,1] that a unit takes the scored path.
    pub decision_quality: f64,
    /// Formations are only planned when this is above zero.
    pub coordination_level: f64,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    pub fn modifier(self) -> DifficultyModifier {
        match self {
            Difficulty::Easy => DifficultyModifier {
                damage_multiplier: 0.8,
                health_multiplier: 0.8,
                decision_quality: 0.5,
                coordination_level: 0.0,
            },
            Difficulty::Normal => DifficultyModifier {
                damage_multiplier: 1.0,
                health_multiplier: 1.0,
                decision_quality: 0.75,
                coordination_level: 0.5,
            },
            Difficulty::Hard => DifficultyModifier {
                damage_multiplier: 1.2,
                health_multiplier: 1.2,
                decision_quality: 0.95,
                coordination_level: 1.0,
            },
        }
    }

    /// Whether the tactical planner runs at all.
    pub fn plans_formations(self, modifier: &DifficultyModifier) -> bool {
        self != Difficulty::Easy && modifier.coordination_level > 0.0
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = AiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .iter()
            .copied()
            .find(|d| d.name() == s)
            .ok_or_else(|| AiError::UnknownDifficulty(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("easy".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!("hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        for loose in ["Hard", " hard", "NORMAL", ""] {
            assert!(matches!(loose.parse::<Difficulty>(), Err(AiError::UnknownDifficulty(_))));
        }
        assert!(matches!("nightmare".parse::<Difficulty>(), Err(AiError::UnknownDifficulty(_))));
    }

    #[test]
    fn test_modifiers_scale_with_difficulty() {
        let easy = Difficulty::Easy.modifier();
        let normal = Difficulty::Normal.modifier();
        let hard = Difficulty::Hard.modifier();
        assert!(easy.decision_quality < normal.decision_quality);
        assert!(normal.decision_quality < hard.decision_quality);
        assert_eq!(normal.damage_multiplier, 1.0);
        assert!(hard.health_multiplier > 1.0);
    }

    #[test]
    fn test_easy_never_plans() {
        let mut forced = Difficulty::Easy.modifier();
        forced.coordination_level = 1.0;
        assert!(!Difficulty::Easy.plans_formations(&forced));
        assert!(Difficulty::Normal.plans_formations(&Difficulty::Normal.modifier()));
    }
}
