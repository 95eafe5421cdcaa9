// ═══════════════════════════════════════════════════════════════════════
// AI profiles — named weighting records and per-unit profile resolution
// ═══════════════════════════════════════════════════════════════════════

use crate::error::AiError;
use gambit_engine::abilities::is_healing;
use gambit_engine::types::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    Aggressive,
    Defensive,
    Support,
    Balanced,
    Boss,
}

impl ProfileKind {
    pub const ALL: [ProfileKind; 5] = [
        ProfileKind::Aggressive,
        ProfileKind::Defensive,
        ProfileKind::Support,
        ProfileKind::Balanced,
        ProfileKind::Boss,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ProfileKind::Aggressive => "aggressive",
            ProfileKind::Defensive => "defensive",
            ProfileKind::Support => "support",
            ProfileKind::Balanced => "balanced",
            ProfileKind::Boss => "boss",
        }
    }
}

impl std::fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProfileKind {
    type Err = AiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProfileKind::ALL
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| AiError::UnknownProfile(s.to_string()))
    }
}

/// Which opportunity component a profile leans on; drives ability category order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stance {
    Attack,
    Defense,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiProfile {
    pub attack_weight: f64,
    pub defense_weight: f64,
    pub support_weight: f64,
    pub risk_tolerance: f64,
    /// Most-preferred target first.
    pub target_priority: Vec<UnitType>,
    pub flee_threshold: f64,
    pub use_ability_chance: f64,
}

impl AiProfile {
    pub fn builtin(kind: ProfileKind) -> Self {
        use UnitType::*;
        match kind {
            ProfileKind::Aggressive => AiProfile {
                attack_weight: 1.5,
                defense_weight: 0.5,
                support_weight: 0.3,
                risk_tolerance: 0.8,
                target_priority: vec![Queen, King, Bishop, Rook, Knight, Pawn],
                flee_threshold: 0.1,
                use_ability_chance: 0.3,
            },
            ProfileKind::Defensive => AiProfile {
                attack_weight: 0.6,
                defense_weight: 1.5,
                support_weight: 0.8,
                risk_tolerance: 0.2,
                target_priority: vec![Knight, Queen, Rook, Bishop, Pawn, King],
                flee_threshold: 0.4,
                use_ability_chance: 0.4,
            },
            ProfileKind::Support => AiProfile {
                attack_weight: 0.5,
                defense_weight: 1.0,
                support_weight: 1.5,
                risk_tolerance: 0.3,
                target_priority: vec![Bishop, Queen, Knight, Rook, Pawn, King],
                flee_threshold: 0.3,
                use_ability_chance: 0.6,
            },
            ProfileKind::Balanced => AiProfile {
                attack_weight: 1.0,
                defense_weight: 1.0,
                support_weight: 1.0,
                risk_tolerance: 0.5,
                target_priority: vec![Queen, Rook, Bishop, Knight, Pawn, King],
                flee_threshold: 0.25,
                use_ability_chance: 0.35,
            },
            ProfileKind::Boss => AiProfile {
                attack_weight: 1.3,
                defense_weight: 1.2,
                support_weight: 0.8,
                risk_tolerance: 0.7,
                target_priority: vec![King, Queen, Rook, Bishop, Knight, Pawn],
                flee_threshold: 0.15,
                use_ability_chance: 0.5,
            },
        }
    }

    /// 1-based rank of `unit_type` in the priority list.
    pub fn priority_rank(&self, unit_type: UnitType) -> Option<usize> {
        self.target_priority.iter().position(|&t| t == unit_type).map(|i| i + 1)
    }

    pub fn stance(&self) -> Stance {
        if self.attack_weight > self.defense_weight && self.attack_weight > self.support_weight {
            Stance::Attack
        } else if self.defense_weight > self.attack_weight && self.defense_weight > self.support_weight {
            Stance::Defense
        } else {
            Stance::Neutral
        }
    }
}

/// Partial profile from config; absent fields keep the built-in value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileOverride {
    pub attack_weight: Option<f64>,
    pub defense_weight: Option<f64>,
    pub support_weight: Option<f64>,
    pub risk_tolerance: Option<f64>,
    pub target_priority: Option<Vec<UnitType>>,
    pub flee_threshold: Option<f64>,
    pub use_ability_chance: Option<f64>,
}

impl ProfileOverride {
    pub fn apply(&self, profile: &mut AiProfile) {
        if let Some(v) = self.attack_weight { profile.attack_weight = v; }
        if let Some(v) = self.defense_weight { profile.defense_weight = v; }
        if let Some(v) = self.support_weight { profile.support_weight = v; }
        if let Some(v) = self.risk_tolerance { profile.risk_tolerance = v; }
        if let Some(v) = &self.target_priority { profile.target_priority = v.clone(); }
        if let Some(v) = self.flee_threshold { profile.flee_threshold = v; }
        if let Some(v) = self.use_ability_chance { profile.use_ability_chance = v; }
    }
}

/// The lookup table of profiles in force. Read-only during a turn.
#[derive(Debug, Clone)]
pub struct ProfileBook {
    profiles: HashMap<ProfileKind, AiProfile>,
}

impl Default for ProfileBook {
    fn default() -> Self {
        ProfileBook {
            profiles: ProfileKind::ALL.iter().map(|&k| (k, AiProfile::builtin(k))).collect(),
        }
    }
}

impl ProfileBook {
    /// Built-ins with config overrides keyed by profile name.
    pub fn with_overrides(overrides: &HashMap<String, ProfileOverride>) -> crate::error::Result<Self> {
        let mut book = ProfileBook::default();
        for (name, patch) in overrides {
            let kind: ProfileKind = name.parse()?;
            if let Some(profile) = book.profiles.get_mut(&kind) {
                patch.apply(profile);
            }
        }
        Ok(book)
    }

    pub fn get(&self, kind: ProfileKind) -> &AiProfile {
        &self.profiles[&kind]
    }
}

/// Default profile for a chess role before any health adjustment.
pub fn default_kind_for(unit_type: UnitType) -> ProfileKind {
    match unit_type {
        UnitType::Pawn | UnitType::Knight => ProfileKind::Aggressive,
        UnitType::Bishop => ProfileKind::Support,
        UnitType::Rook | UnitType::King => ProfileKind::Defensive,
        UnitType::Queen => ProfileKind::Balanced,
    }
}

/// Pick the profile for `unit` this turn. `allies` is the friendly snapshot and may
/// include `unit` itself.
pub fn resolve_profile_kind(unit: &Unit, allies: &[Unit]) -> ProfileKind {
    if unit.boss {
        return ProfileKind::Boss;
    }
    let mut kind = default_kind_for(unit.unit_type);
    let ratio = unit.health_ratio();

    if ratio < 0.3 && kind != ProfileKind::Aggressive {
        kind = ProfileKind::Defensive;
    }
    if ratio > 0.8 && unit.unit_type == UnitType::Pawn {
        kind = ProfileKind::Aggressive;
    }

    let can_heal = unit.abilities.iter().any(|a| is_healing(a));
    let ally_hurt = allies
        .iter()
        .any(|a| a.id != unit.id && a.is_alive() && a.health_ratio() < 0.5);
    if can_heal && ally_hurt {
        kind = ProfileKind::Support;
    }
    kind
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(id: u32, unit_type: UnitType) -> Unit {
        Unit::new(UnitId(id), Faction::Enemy, unit_type, Pos::new(1, id as i32))
    }

    #[test]
    fn test_builtin_priority_lists_cover_every_role() {
        for kind in ProfileKind::ALL {
            let profile = AiProfile::builtin(kind);
            for t in UnitType::ALL {
                assert!(profile.priority_rank(t).is_some(), "{} misses {}", kind, t);
            }
        }
    }

    #[test]
    fn test_stance() {
        assert_eq!(AiProfile::builtin(ProfileKind::Aggressive).stance(), Stance::Attack);
        assert_eq!(AiProfile::builtin(ProfileKind::Defensive).stance(), Stance::Defense);
        assert_eq!(AiProfile::builtin(ProfileKind::Support).stance(), Stance::Neutral);
        assert_eq!(AiProfile::builtin(ProfileKind::Balanced).stance(), Stance::Neutral);
    }

    #[test]
    fn test_boss_overrides_everything() {
        let mut queen = unit(1, UnitType::Queen);
        queen.boss = true;
        queen.health = 1;
        assert_eq!(resolve_profile_kind(&queen, &[]), ProfileKind::Boss);
    }

    #[test]
    fn test_low_health_turns_defensive_unless_aggressive() {
        let mut rook = unit(1, UnitType::Rook);
        rook.health = 4;
        assert_eq!(resolve_profile_kind(&rook, &[]), ProfileKind::Defensive);

        let mut knight = unit(2, UnitType::Knight);
        knight.health = 2;
        assert_eq!(resolve_profile_kind(&knight, &[]), ProfileKind::Aggressive);

        let mut queen = unit(3, UnitType::Queen);
        queen.health = 3;
        assert_eq!(resolve_profile_kind(&queen, &[]), ProfileKind::Defensive);
    }

    #[test]
    fn test_healer_turns_support_when_ally_hurt() {
        let queen = unit(1, UnitType::Queen);
        let mut pawn = unit(2, UnitType::Pawn);
        assert_eq!(resolve_profile_kind(&queen, &[queen.clone(), pawn.clone()]), ProfileKind::Balanced);
        pawn.health = 3;
        assert_eq!(resolve_profile_kind(&queen, &[queen.clone(), pawn]), ProfileKind::Support);
    }

    #[test]
    fn test_wounded_healer_does_not_count_itself() {
        let mut queen = unit(1, UnitType::Queen);
        queen.health = 8;
        assert_eq!(resolve_profile_kind(&queen, &[queen.clone()]), ProfileKind::Balanced);
    }

    #[test]
    fn test_overrides_patch_builtin() {
        let mut overrides = HashMap::new();
        overrides.insert(
            "aggressive".to_string(),
            ProfileOverride { use_ability_chance: Some(0.0), ..Default::default() },
        );
        let book = ProfileBook::with_overrides(&overrides).unwrap();
        let aggressive = book.get(ProfileKind::Aggressive);
        assert_eq!(aggressive.use_ability_chance, 0.0);
        assert_eq!(aggressive.attack_weight, 1.5);

        overrides.insert("reckless".to_string(), ProfileOverride::default());
        assert!(matches!(ProfileBook::with_overrides(&overrides), Err(AiError::UnknownProfile(_))));
    }
}
