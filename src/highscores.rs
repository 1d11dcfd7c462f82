//! High score leaderboard
//!
//! `ScoreStore` is the contract the game needs from persistence: append a
//! `(name, score)` record and read the records back best first. The game
//! runs without any store attached; a failing store only costs the record.

use serde::{Deserialize, Serialize};

use crate::error::ScoreStoreError;

/// Maximum number of high scores kept by the in-memory leaderboard
pub const MAX_HIGH_SCORES: usize = 10;

/// Longest accepted player name
pub const MAX_NAME_LEN: usize = 25;

/// A single stored score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub name: String,
    pub score: u64,
}

impl ScoreRecord {
    /// Build a record, trimming the name and rejecting empty or long names
    pub fn new(name: &str, score: u64) -> Result<Self, ScoreStoreError> {
        let name = name.trim();
        let len = name.chars().count();
        if len == 0 || len > MAX_NAME_LEN {
            return Err(ScoreStoreError::InvalidName {
                len,
                max: MAX_NAME_LEN,
            });
        }
        Ok(Self {
            name: name.to_string(),
            score,
        })
    }
}

/// Append-only score storage
pub trait ScoreStore {
    fn save(&mut self, record: &ScoreRecord) -> Result<(), ScoreStoreError>;

    /// All records, highest score first; ties keep insertion order
    fn ranked(&self) -> Result<Vec<ScoreRecord>, ScoreStoreError>;
}

/// Sort best first, keeping insertion order among equal scores
pub fn rank(records: &mut [ScoreRecord]) {
    records.sort_by(|a, b| b.score.cmp(&a.score));
}

/// Save a score if a store is attached. Failures are logged and reported as
/// `false`; they never interrupt the game.
pub fn record_score(store: Option<&mut dyn ScoreStore>, name: &str, score: u64) -> bool {
    let Some(store) = store else {
        log::info!("No score store attached, score {score} not recorded");
        return false;
    };

    let result = ScoreRecord::new(name, score).and_then(|record| store.save(&record));
    match result {
        Ok(()) => {
            log::info!("Recorded score {score} for {}", name.trim());
            true
        }
        Err(e) => {
            log::warn!("Score not recorded: {e}");
            false
        }
    }
}

/// In-memory leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<ScoreRecord>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a new score to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(&mut self, record: ScoreRecord) -> Option<usize> {
        if !self.qualifies(record.score) {
            return None;
        }

        // Find insertion point (sorted descending by score)
        let pos = self.entries.iter().position(|e| record.score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, record);
                i + 1
            }
            None => {
                self.entries.push(record);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    /// Build a leaderboard from any ranked list
    pub fn from_records(records: impl IntoIterator<Item = ScoreRecord>) -> Self {
        let mut board = Self::new();
        for record in records {
            board.add_score(record);
        }
        board
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

impl ScoreStore for HighScores {
    fn save(&mut self, record: &ScoreRecord) -> Result<(), ScoreStoreError> {
        self.add_score(record.clone());
        Ok(())
    }

    fn ranked(&self) -> Result<Vec<ScoreRecord>, ScoreStoreError> {
        Ok(self.entries.clone())
    }
}
