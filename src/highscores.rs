//! Best score per difficulty tier
//!
//! Persisted as a single JSON record `{ "easy": n, "medium": n, "hard": n }`.
//! Reads never fail: missing or malformed data comes back as all zeros.
//! Writes are best-effort and never interrupt gameplay.

use serde::{Deserialize, Serialize};

use crate::persistence::{Storage, StorageError};
use crate::sim::DifficultyTier;

/// Storage key for the high-score record
pub const STORAGE_KEY: &str = "pop_to_make_high_scores";

/// Best score for each tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighScoreTable {
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
}

impl HighScoreTable {
    pub fn best(&self, tier: DifficultyTier) -> u32 {
        match tier {
            DifficultyTier::Beginner => self.easy,
            DifficultyTier::Explorer => self.medium,
            DifficultyTier::MathMaster => self.hard,
        }
    }

    pub fn set(&mut self, tier: DifficultyTier, score: u32) {
        match tier {
            DifficultyTier::Beginner => self.easy = score,
            DifficultyTier::Explorer => self.medium = score,
            DifficultyTier::MathMaster => self.hard = score,
        }
    }

    /// Check if a score strictly beats the stored best
    pub fn qualifies(&self, tier: DifficultyTier, score: u32) -> bool {
        score > self.best(tier)
    }
}

/// High-score table on top of a storage backend
#[derive(Debug, Clone)]
pub struct HighScoreStore<S: Storage> {
    storage: S,
}

impl<S: Storage> HighScoreStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Load the table, recovering to zeros on any problem
    pub fn load(&self) -> HighScoreTable {
        let json = match self.storage.get_item(STORAGE_KEY) {
            Ok(Some(json)) => json,
            Ok(None) => {
                log::info!("No high scores found, starting fresh");
                return HighScoreTable::default();
            }
            Err(err) => {
                log::warn!("High scores unreadable, using defaults: {err}");
                return HighScoreTable::default();
            }
        };

        match serde_json::from_str::<HighScoreTable>(&json) {
            Ok(table) => {
                log::info!("Loaded high scores {:?}", table);
                table
            }
            Err(err) => {
                log::warn!("High score record is corrupt, using defaults: {err}");
                HighScoreTable::default()
            }
        }
    }

    /// Overwrite one tier's entry, writing the whole table
    pub fn try_save(&mut self, tier: DifficultyTier, score: u32) -> Result<(), StorageError> {
        let mut table = self.load();
        table.set(tier, score);
        let json = serde_json::to_string(&table)?;
        self.storage.set_item(STORAGE_KEY, &json)?;
        log::info!("High score saved: {} = {}", tier.storage_key(), score);
        Ok(())
    }

    /// Best-effort variant of [`try_save`](Self::try_save)
    pub fn save(&mut self, tier: DifficultyTier, score: u32) {
        if let Err(err) = self.try_save(tier, score) {
            log::warn!("Could not save high score: {err}");
        }
    }

    /// Store `score` if it beats the current best.
    /// Returns whether it was a new best, even when the write fails.
    pub fn record(&mut self, tier: DifficultyTier, score: u32) -> bool {
        if !self.load().qualifies(tier, score) {
            return false;
        }
        self.save(tier, score);
        true
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}
