// ═══════════════════════════════════════════════════════════════════════
// Core types — factions, chess roles, units and the actions they take
// ═══════════════════════════════════════════════════════════════════════

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

// ── Enums ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Faction {
    Player,
    Enemy,
}

impl Faction {
    pub const ALL: [Faction; 2] = [Faction::Player, Faction::Enemy];

    pub fn opponent(self) -> Faction {
        match self {
            Faction::Player => Faction::Enemy,
            Faction::Enemy => Faction::Player,
        }
    }
}

impl std::fmt::Display for Faction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Faction::Player => write!(f, "player"),
            Faction::Enemy => write!(f, "enemy"),
        }
    }
}

/// The six chess roles a unit can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl UnitType {
    pub const ALL: [UnitType; 6] = [
        UnitType::Pawn,
        UnitType::Knight,
        UnitType::Bishop,
        UnitType::Rook,
        UnitType::Queen,
        UnitType::King,
    ];

    /// Kings and queens are the pieces a formation forms up around.
    pub fn is_high_value(self) -> bool {
        matches!(self, UnitType::King | UnitType::Queen)
    }

    pub fn name(self) -> &'static str {
        match self {
            UnitType::Pawn => "pawn",
            UnitType::Knight => "knight",
            UnitType::Bishop => "bishop",
            UnitType::Rook => "rook",
            UnitType::Queen => "queen",
            UnitType::King => "king",
        }
    }
}

impl std::fmt::Display for UnitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UnitType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UnitType::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| EngineError::UnknownUnitType(s.to_string()))
    }
}

// ── Position ───────────────────────────────────────────────────────────
// Board cells are 1-based, like ranks and files: (1,1) is the corner.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Pos { x, y }
    }

    pub fn manhattan(self, other: Pos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn offset(self, dx: i32, dy: i32) -> Pos {
        Pos::new(self.x + dx, self.y + dy)
    }

    /// The four orthogonal neighbours.
    pub fn neighbors(self) -> [Pos; 4] {
        [
            self.offset(0, -1),
            self.offset(1, 0),
            self.offset(0, 1),
            self.offset(-1, 0),
        ]
    }
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

// ── Unit ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u32);

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub faction: Faction,
    pub unit_type: UnitType,
    pub boss: bool,
    pub pos: Pos,

    pub health: i32,
    pub max_health: i32,
    pub attack: i32,
    pub defense: i32,
    pub energy: u32,
    pub max_energy: u32,
    pub move_range: u32,
    pub attack_range: u32,
    pub action_points: u32,
    pub max_action_points: u32,
    pub initiative: u32,
    pub crit_chance: f64,

    pub abilities: Vec<String>,
    /// Remaining turns per ability; absent or 0 means ready.
    pub cooldowns: HashMap<String, u32>,
}

/// Base statistics for a freshly spawned unit of a given role.
struct BaseStats {
    health: i32,
    attack: i32,
    defense: i32,
    energy: u32,
    max_energy: u32,
    move_range: u32,
    attack_range: u32,
    initiative: u32,
    crit_chance: f64,
    abilities: &'static [&'static str],
}

fn base_stats(unit_type: UnitType) -> BaseStats {
    match unit_type {
        UnitType::Pawn => BaseStats {
            health: 10, attack: 3, defense: 1, energy: 3, max_energy: 5,
            move_range: 1, attack_range: 1, initiative: 3, crit_chance: 0.05,
            abilities: &["charge", "rally"],
        },
        UnitType::Knight => BaseStats {
            health: 14, attack: 5, defense: 2, energy: 4, max_energy: 6,
            move_range: 3, attack_range: 1, initiative: 6, crit_chance: 0.10,
            abilities: &["charge", "fork", "fortify"],
        },
        UnitType::Bishop => BaseStats {
            health: 12, attack: 4, defense: 1, energy: 6, max_energy: 8,
            move_range: 3, attack_range: 2, initiative: 5, crit_chance: 0.10,
            abilities: &["heal", "drain", "ward"],
        },
        UnitType::Rook => BaseStats {
            health: 20, attack: 5, defense: 3, energy: 4, max_energy: 6,
            move_range: 2, attack_range: 2, initiative: 4, crit_chance: 0.05,
            abilities: &["bombard", "fortify"],
        },
        UnitType::Queen => BaseStats {
            health: 18, attack: 7, defense: 2, energy: 6, max_energy: 8,
            move_range: 3, attack_range: 2, initiative: 7, crit_chance: 0.15,
            abilities: &["smite", "empower", "heal"],
        },
        UnitType::King => BaseStats {
            health: 25, attack: 4, defense: 4, energy: 5, max_energy: 8,
            move_range: 1, attack_range: 1, initiative: 2, crit_chance: 0.05,
            abilities: &["fortify", "rally"],
        },
    }
}

impl Unit {
    /// Spawn a unit with the base statistics of its role.
    pub fn new(id: UnitId, faction: Faction, unit_type: UnitType, pos: Pos) -> Self {
        let base = base_stats(unit_type);
        Unit {
            id,
            faction,
            unit_type,
            boss: false,
            pos,
            health: base.health,
            max_health: base.health,
            attack: base.attack,
            defense: base.defense,
            energy: base.energy,
            max_energy: base.max_energy,
            move_range: base.move_range,
            attack_range: base.attack_range,
            action_points: 1,
            max_action_points: 1,
            initiative: base.initiative,
            crit_chance: base.crit_chance,
            abilities: base.abilities.iter().map(|a| a.to_string()).collect(),
            cooldowns: HashMap::new(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Current health as a fraction of max health (0 for a degenerate max).
    pub fn health_ratio(&self) -> f64 {
        if self.max_health <= 0 {
            return 0.0;
        }
        self.health as f64 / self.max_health as f64
    }

    pub fn has_ability(&self, name: &str) -> bool {
        self.abilities.iter().any(|a| a == name)
    }

    pub fn cooldown(&self, name: &str) -> u32 {
        self.cooldowns.get(name).copied().unwrap_or(0)
    }

    pub fn ability_ready(&self, name: &str) -> bool {
        self.has_ability(name) && self.cooldown(name) == 0
    }

    /// Crit chance usable as a probability: clamped to [0,1], 0 when not finite.
    pub fn crit_probability(&self) -> f64 {
        if self.crit_chance.is_finite() {
            self.crit_chance.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn in_range(&self, other: &Unit, range: u32) -> bool {
        self.pos.manhattan(other.pos) <= range
    }
}

// ── Actions ────────────────────────────────────────────────────────────

/// Discriminant of an action, as exposed to callers (`move|attack|ability|wait`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionTag {
    Move,
    Attack,
    Ability,
    Wait,
}

impl ActionTag {
    pub const ALL: [ActionTag; 4] = [ActionTag::Move, ActionTag::Attack, ActionTag::Ability, ActionTag::Wait];
}

impl std::fmt::Display for ActionTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionTag::Move => write!(f, "move"),
            ActionTag::Attack => write!(f, "attack"),
            ActionTag::Ability => write!(f, "ability"),
            ActionTag::Wait => write!(f, "wait"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionKind {
    /// Move to a cell. `tactic` names the formation that assigned it, if any.
    Move { to: Pos, tactic: Option<String> },
    Attack { target: UnitId },
    UseAbility { ability: String, target: UnitId },
    Wait,
}

/// One unit's intent for one turn. The engine applies it; deciding never mutates state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub actor: UnitId,
    pub kind: ActionKind,
}

impl Action {
    pub fn wait(actor: UnitId) -> Self {
        Action { actor, kind: ActionKind::Wait }
    }

    pub fn move_to(actor: UnitId, to: Pos) -> Self {
        Action { actor, kind: ActionKind::Move { to, tactic: None } }
    }

    pub fn tactical_move(actor: UnitId, to: Pos, tactic: &str) -> Self {
        Action { actor, kind: ActionKind::Move { to, tactic: Some(tactic.to_string()) } }
    }

    pub fn attack(actor: UnitId, target: UnitId) -> Self {
        Action { actor, kind: ActionKind::Attack { target } }
    }

    pub fn ability(actor: UnitId, ability: &str, target: UnitId) -> Self {
        Action {
            actor,
            kind: ActionKind::UseAbility { ability: ability.to_string(), target },
        }
    }

    pub fn tag(&self) -> ActionTag {
        match self.kind {
            ActionKind::Move { .. } => ActionTag::Move,
            ActionKind::Attack { .. } => ActionTag::Attack,
            ActionKind::UseAbility { .. } => ActionTag::Ability,
            ActionKind::Wait => ActionTag::Wait,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ActionKind::Move { to, tactic: Some(t) } => write!(f, "{} move {} [{}]", self.actor, to, t),
            ActionKind::Move { to, tactic: None } => write!(f, "{} move {}", self.actor, to),
            ActionKind::Attack { target } => write!(f, "{} attack {}", self.actor, target),
            ActionKind::UseAbility { ability, target } => {
                write!(f, "{} {} -> {}", self.actor, ability, target)
            }
            ActionKind::Wait => write!(f, "{} wait", self.actor),
        }
    }
}
