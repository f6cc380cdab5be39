//! Best score, persisted as a string-encoded integer under one key.

use crate::storage::Store;
use anyhow::Result;

/// Key of the single persisted entry.
pub const HIGH_SCORE_KEY: &str = "snakeHighScore";

#[derive(Debug, Clone)]
pub struct HighScore {
    store: Store,
    best: u32,
}

impl HighScore {
    /// Read the stored best once. Missing or unparsable → 0.
    pub fn load(store: Store) -> Self {
        let best = match store.get(HIGH_SCORE_KEY) {
            Some(raw) => raw.parse::<u32>().unwrap_or_else(|_| {
                log::warn!("ignoring invalid high score {:?}", raw);
                0
            }),
            None => 0,
        };
        log::info!("high score loaded: {}", best);
        Self { store, best }
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    /// Record a finished session. Returns true (and persists) when it beats the best.
    /// The in-memory best only moves once the write succeeds.
    pub fn record(&mut self, score: u32) -> Result<bool> {
        if score <= self.best {
            return Ok(false);
        }
        self.store.set(HIGH_SCORE_KEY, &score.to_string())?;
        self.best = score;
        log::info!("new high score {}", score);
        Ok(true)
    }
}
