//! High score leaderboard system
//!
//! Persisted to LocalStorage as a JSON array, keeps the top 3 runs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::HIGH_SCORES_KEY;
use crate::persistence::{KeyValueStore, StoreError};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 3;

/// Name recorded when the player leaves the field blank
pub const ANONYMOUS_DRIVER: &str = "Piloto Anónimo";

#[derive(Debug, Error)]
pub enum HighScoreError {
    #[error("malformed leaderboard: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScore {
    pub name: String,
    pub score: u64,
    /// Display date, formatted when the score was saved
    pub date: String,
}

/// High score leaderboard, sorted descending by score
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HighScores {
    pub entries: Vec<HighScore>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Parse a stored leaderboard, re-sorting and trimming it
    pub fn from_json(json: &str) -> Result<Self, HighScoreError> {
        let mut scores: HighScores = serde_json::from_str(json)?;
        scores.normalize();
        Ok(scores)
    }

    /// Read the leaderboard; missing or malformed data yields an empty board
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match Self::try_load(store) {
            Ok(scores) => {
                log::info!("Loaded {} high scores", scores.entries.len());
                scores
            }
            Err(e) => {
                log::warn!("Discarding stored high scores: {}", e);
                Self::new()
            }
        }
    }

    fn try_load(store: &dyn KeyValueStore) -> Result<Self, HighScoreError> {
        match store.get(HIGH_SCORES_KEY)? {
            Some(json) => Self::from_json(&json),
            None => Ok(Self::new()),
        }
    }

    /// Write the full leaderboard
    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), HighScoreError> {
        let json = serde_json::to_string(self)?;
        store.set(HIGH_SCORES_KEY, &json)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }

    /// Check if a score would make the board
    pub fn qualifies(&self, score: u64) -> bool {
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Add a score to the board. Returns the rank achieved (1-indexed) or
    /// None if it fell off the bottom.
    pub fn add_score(&mut self, name: &str, score: u64, date: String) -> Option<usize> {
        let name = name.trim();
        let name = if name.is_empty() {
            ANONYMOUS_DRIVER
        } else {
            name
        };

        // Ties keep the earlier entry first
        let pos = self
            .entries
            .iter()
            .position(|e| score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(
            pos,
            HighScore {
                name: name.to_string(),
                score,
                date,
            },
        );
        self.entries.truncate(MAX_HIGH_SCORES);

        (pos < MAX_HIGH_SCORES).then_some(pos + 1)
    }

    /// Add a score and persist the whole board
    pub fn save_score(
        &mut self,
        store: &mut dyn KeyValueStore,
        name: &str,
        score: u64,
        date: String,
    ) -> Result<Option<usize>, HighScoreError> {
        let rank = self.add_score(name, score, date);
        self.save(store)?;
        Ok(rank)
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    fn normalize(&mut self) {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_HIGH_SCORES);
    }
}

/// Today's date for a new entry
#[cfg(target_arch = "wasm32")]
pub fn today() -> String {
    let date = js_sys::Date::new_0();
    String::from(date.to_locale_date_string("es-ES", &wasm_bindgen::JsValue::UNDEFINED))
}

#[cfg(not(target_arch = "wasm32"))]
pub fn today() -> String {
    "N/A".to_string()
}
