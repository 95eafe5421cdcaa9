// ═══════════════════════════════════════════════════════════════════════
// Arena tests — full encounters and result storage
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use crate::database::Database;
    use crate::runner::*;
    use gambit_agents::{AiConfig, Difficulty};
    use gambit_engine::types::*;

    fn config(difficulty: Difficulty) -> ArenaConfig {
        ArenaConfig {
            ai: AiConfig { difficulty, ..AiConfig::default() },
            max_rounds: 40,
            ..ArenaConfig::default()
        }
    }

    #[test]
    fn test_encounter_runs_to_completion() {
        for difficulty in Difficulty::ALL {
            let result = run_encounter(&config(difficulty), 11).unwrap();
            assert_eq!(result.difficulty, difficulty);
            assert!(result.rounds >= 1 && result.rounds <= 40);
            assert!(result.ai_actions.total() > 0);
            match result.winner {
                Some(Faction::Enemy) => assert_eq!(result.player_survivors, 0),
                Some(Faction::Player) => assert_eq!(result.enemy_survivors, 0),
                None => assert!(result.player_survivors > 0 && result.enemy_survivors > 0),
            }
        }
    }

    #[test]
    fn test_encounter_is_seed_deterministic() {
        let a = run_encounter(&config(Difficulty::Normal), 21).unwrap();
        let b = run_encounter(&config(Difficulty::Normal), 21).unwrap();
        assert_eq!(a.winner, b.winner);
        assert_eq!(a.rounds, b.rounds);
        assert_eq!(a.ai_actions, b.ai_actions);
        assert_eq!(a.enemy_survivors, b.enemy_survivors);
    }

    #[test]
    fn test_log_sees_every_applied_action() {
        let mut entries = Vec::new();
        let result = play_encounter(&config(Difficulty::Hard), 5, |e| entries.push(e.clone())).unwrap();
        let enemy_logged = entries.iter().filter(|e| e.side == Faction::Enemy).count() as u32;
        assert_eq!(enemy_logged, result.ai_actions.total());
        assert!(entries.iter().all(|e| e.action.actor == actor_of(&e.outcome)));
    }

    fn actor_of(outcome: &gambit_engine::engine::ActionOutcome) -> UnitId {
        use gambit_engine::engine::ActionOutcome::*;
        match outcome {
            Moved { actor, .. } | Hit { actor, .. } | AbilityUsed { actor, .. } | Waited { actor } | Rejected { actor, .. } => *actor,
        }
    }

    #[test]
    fn test_batch_keeps_seed_order() {
        let seeds = [1, 2, 3, 4];
        let results = run_batch(&config(Difficulty::Easy), &seeds);
        let got: Vec<u64> = results.into_iter().map(|r| r.unwrap().seed).collect();
        assert_eq!(got, seeds);
    }

    #[test]
    fn test_store_and_aggregate() {
        let db = Database::in_memory().unwrap();
        assert_eq!(db.encounter_count().unwrap(), 0);
        assert!(db.difficulty_stats().unwrap().is_empty());

        let base = EncounterResult {
            seed: 1,
            difficulty: Difficulty::Hard,
            winner: Some(Faction::Enemy),
            rounds: 10,
            enemy_survivors: 4,
            player_survivors: 0,
            ai_actions: ActionCounts::default(),
        };
        db.store_encounter(&base).unwrap();
        db.store_encounter(&EncounterResult { seed: 2, winner: Some(Faction::Player), rounds: 20, ..base.clone() }).unwrap();
        db.store_encounter(&EncounterResult { seed: 3, winner: None, rounds: 30, ..base.clone() }).unwrap();
        db.store_encounter(&EncounterResult { seed: 4, difficulty: Difficulty::Easy, ..base.clone() }).unwrap();

        assert_eq!(db.encounter_count().unwrap(), 4);
        let stats = db.difficulty_stats().unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].difficulty, "easy");
        assert_eq!(stats[0].encounters, 1);
        let hard = &stats[1];
        assert_eq!(hard.difficulty, "hard");
        assert_eq!((hard.encounters, hard.enemy_wins, hard.player_wins, hard.draws), (3, 1, 1, 1));
        assert!((hard.mean_rounds - 20.0).abs() < 1e-9);
        assert!((hard.enemy_win_rate() - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_bad_config_is_an_error() {
        let mut bad = config(Difficulty::Normal);
        bad.ai.decision_quality = Some(2.0);
        assert!(run_encounter(&bad, 1).is_err());
    }
}
