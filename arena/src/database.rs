// ═══════════════════════════════════════════════════════════════════════
// Database — SQLite storage for encounter results
// ═══════════════════════════════════════════════════════════════════════

use crate::error::{ArenaError, Result};
use crate::runner::EncounterResult;
use gambit_agents::Difficulty;
use gambit_engine::types::Faction;
use rusqlite::{params, Connection};
use serde::Serialize;
use std::path::Path;

pub struct Database {
    conn: Connection,
}

/// Aggregate outcome of every stored encounter at one difficulty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DifficultyStats {
    pub difficulty: String,
    pub encounters: u32,
    pub enemy_wins: u32,
    pub player_wins: u32,
    pub draws: u32,
    pub mean_rounds: f64,
}

impl DifficultyStats {
    pub fn enemy_win_rate(&self) -> f64 {
        if self.encounters == 0 {
            return 0.0;
        }
        self.enemy_wins as f64 / self.encounters as f64
    }
}

impl Database {
    /// Open (or create) a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Database { conn: Connection::open(path)? };
        db.create_schema()?;
        Ok(db)
    }

    /// In-memory database (useful for tests).
    pub fn in_memory() -> Result<Self> {
        let db = Database { conn: Connection::open_in_memory()? };
        db.create_schema()?;
        Ok(db)
    }

    fn create_schema(&self) -> Result<()> {
        self.conn.execute_batch("
            CREATE TABLE IF NOT EXISTS encounters (
                id               INTEGER PRIMARY KEY,
                seed             INTEGER NOT NULL,
                difficulty       TEXT NOT NULL,
                winner           TEXT,
                rounds           INTEGER NOT NULL,
                enemy_survivors  INTEGER NOT NULL,
                player_survivors INTEGER NOT NULL,
                ai_moves         INTEGER NOT NULL,
                ai_attacks       INTEGER NOT NULL,
                ai_abilities     INTEGER NOT NULL,
                ai_waits         INTEGER NOT NULL,
                ai_rejected      INTEGER NOT NULL,
                played_at        TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX IF NOT EXISTS encounters_by_difficulty ON encounters (difficulty);
        ")?;
        Ok(())
    }

    /// Store one encounter. Returns its row id.
    pub fn store_encounter(&self, result: &EncounterResult) -> Result<i64> {
        let counts = &result.ai_actions;
        self.conn.execute(
            "INSERT INTO encounters (seed, difficulty, winner, rounds, enemy_survivors, player_survivors,
                                     ai_moves, ai_attacks, ai_abilities, ai_waits, ai_rejected)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                result.seed as i64,
                result.difficulty.to_string(),
                result.winner.map(|f| f.to_string()),
                result.rounds as i64,
                result.enemy_survivors as i64,
                result.player_survivors as i64,
                counts.moves as i64,
                counts.attacks as i64,
                counts.abilities as i64,
                counts.waits as i64,
                counts.rejected as i64,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Win/draw breakdown per difficulty, in easy-normal-hard order.
    pub fn difficulty_stats(&self) -> Result<Vec<DifficultyStats>> {
        let mut stmt = self.conn.prepare(
            "SELECT COUNT(*),
                    COALESCE(SUM(winner = ?2), 0),
                    COALESCE(SUM(winner = ?3), 0),
                    COALESCE(SUM(winner IS NULL), 0),
                    COALESCE(AVG(rounds), 0.0)
             FROM encounters WHERE difficulty = ?1",
        )?;

        let mut stats = Vec::new();
        for difficulty in Difficulty::ALL {
            let row = stmt.query_row(
                params![difficulty.to_string(), Faction::Enemy.to_string(), Faction::Player.to_string()],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, f64>(4)?,
                    ))
                },
            )?;
            let (encounters, enemy_wins, player_wins, draws, mean_rounds) = row;
            if encounters == 0 {
                continue;
            }
            stats.push(DifficultyStats {
                difficulty: difficulty.to_string(),
                encounters: to_count(encounters)?,
                enemy_wins: to_count(enemy_wins)?,
                player_wins: to_count(player_wins)?,
                draws: to_count(draws)?,
                mean_rounds,
            });
        }
        Ok(stats)
    }

    /// Get total number of encounters stored.
    pub fn encounter_count(&self) -> Result<u32> {
        let n: i64 = self.conn.query_row("SELECT COUNT(*) FROM encounters", [], |row| row.get(0))?;
        to_count(n)
    }
}

fn to_count(n: i64) -> Result<u32> {
    u32::try_from(n).map_err(|_| ArenaError::Corrupt(format!("count {} out of range", n)))
}
