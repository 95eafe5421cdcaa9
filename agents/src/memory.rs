// ═══════════════════════════════════════════════════════════════════════
// AI memory — what the engine has seen over the encounter
//
// Observability data only: nothing here changes a decision.
// ═══════════════════════════════════════════════════════════════════════

use gambit_engine::types::*;
use serde::Serialize;
use std::collections::VecDeque;

/// Recent player actions kept; older ones are evicted first.
pub const PLAYER_ACTION_MEMORY: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayerActionRecord {
    pub turn: u32,
    pub actor: UnitId,
    pub tag: ActionTag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttackRecord {
    pub turn: u32,
    pub attacker: UnitId,
    pub target: UnitId,
    pub damage: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DamageRecord {
    pub turn: u32,
    pub unit: UnitId,
    pub amount: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LossRecord {
    pub turn: u32,
    pub unit: UnitId,
    pub unit_type: UnitType,
}

/// Coarse read on how the player is playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerTendency {
    Aggressive,
    Defensive,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemorySizes {
    pub player_actions: usize,
    pub successful_attacks: usize,
    pub failed_attacks: usize,
    pub damage_taken: usize,
    pub units_lost: usize,
}

#[derive(Debug, Clone, Default)]
pub struct AiMemory {
    player_actions: VecDeque<PlayerActionRecord>,
    successful_attacks: Vec<AttackRecord>,
    failed_attacks: Vec<AttackRecord>,
    damage_taken: Vec<DamageRecord>,
    units_lost: Vec<LossRecord>,
}

impl AiMemory {
    pub fn record_player_action(&mut self, record: PlayerActionRecord) {
        self.player_actions.push_back(record);
        self.trim();
    }

    pub fn record_successful_attack(&mut self, record: AttackRecord) {
        self.successful_attacks.push(record);
    }

    pub fn record_failed_attack(&mut self, record: AttackRecord) {
        self.failed_attacks.push(record);
    }

    pub fn record_damage_taken(&mut self, record: DamageRecord) {
        self.damage_taken.push(record);
    }

    pub fn record_unit_lost(&mut self, record: LossRecord) {
        self.units_lost.push(record);
    }

    /// Evict the oldest player actions beyond the ring capacity.
    pub fn trim(&mut self) {
        while self.player_actions.len() > PLAYER_ACTION_MEMORY {
            self.player_actions.pop_front();
        }
    }

    /// Oldest first.
    pub fn player_actions(&self) -> impl Iterator<Item = &PlayerActionRecord> {
        self.player_actions.iter()
    }

    pub fn total_damage_taken(&self) -> i32 {
        self.damage_taken.iter().map(|d| d.amount).sum()
    }

    /// Aggressive when at least 60% of remembered actions were attacks or
    /// abilities, defensive at 20% or less. Needs a few actions to judge.
    pub fn tendency(&self) -> PlayerTendency {
        if self.player_actions.len() < 3 {
            return PlayerTendency::Unknown;
        }
        let hostile = self
            .player_actions
            .iter()
            .filter(|r| matches!(r.tag, ActionTag::Attack | ActionTag::Ability))
            .count();
        let share = hostile as f64 / self.player_actions.len() as f64;
        if share >= 0.6 {
            PlayerTendency::Aggressive
        } else if share <= 0.2 {
            PlayerTendency::Defensive
        } else {
            PlayerTendency::Unknown
        }
    }

    pub fn sizes(&self) -> MemorySizes {
        MemorySizes {
            player_actions: self.player_actions.len(),
            successful_attacks: self.successful_attacks.len(),
            failed_attacks: self.failed_attacks.len(),
            damage_taken: self.damage_taken.len(),
            units_lost: self.units_lost.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(turn: u32, tag: ActionTag) -> PlayerActionRecord {
        PlayerActionRecord { turn, actor: UnitId(turn), tag }
    }

    #[test]
    fn test_ring_keeps_latest_ten_in_order() {
        let mut memory = AiMemory::default();
        for turn in 1..=15 {
            memory.record_player_action(action(turn, ActionTag::Move));
        }
        let kept: Vec<u32> = memory.player_actions().map(|r| r.turn).collect();
        assert_eq!(kept, (6..=15).collect::<Vec<_>>());
        assert_eq!(memory.sizes().player_actions, PLAYER_ACTION_MEMORY);
    }

    #[test]
    fn test_tendency() {
        let mut memory = AiMemory::default();
        assert_eq!(memory.tendency(), PlayerTendency::Unknown);
        for turn in 1..=4 {
            memory.record_player_action(action(turn, ActionTag::Attack));
        }
        memory.record_player_action(action(5, ActionTag::Move));
        assert_eq!(memory.tendency(), PlayerTendency::Aggressive);

        let mut cautious = AiMemory::default();
        for turn in 1..=5 {
            cautious.record_player_action(action(turn, ActionTag::Wait));
        }
        assert_eq!(cautious.tendency(), PlayerTendency::Defensive);
    }

    #[test]
    fn test_logs_are_unbounded() {
        let mut memory = AiMemory::default();
        for turn in 0..25 {
            memory.record_damage_taken(DamageRecord { turn, unit: UnitId(1), amount: 2 });
        }
        assert_eq!(memory.sizes().damage_taken, 25);
        assert_eq!(memory.total_damage_taken(), 50);
    }
}
