//! Dino Run - A single-lane endless runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (kinematics, spawner, collisions, episodes)
//! - `neat`: Neuroevolution driver that learns when to jump
//! - `view`: Entity-state snapshots for an external renderer
//! - `platform`: Wall-clock frame pacing
//! - `highscores` / `persistence`: Leaderboard and score storage
//! - `settings`: Data-driven game configuration

pub mod error;
pub mod highscores;
pub mod neat;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod view;

pub use error::{ConfigError, GenomeError, ScoreStoreError};
pub use highscores::{HighScores, ScoreRecord, ScoreStore};
pub use settings::GameSettings;

/// Game configuration constants
pub mod consts {
    /// Window dimensions
    pub const WINDOW_WIDTH: u32 = 800;
    pub const WINDOW_HEIGHT: u32 = 400;
    /// Target simulation rate (ticks per second)
    pub const FPS: u32 = 60;

    /// Ground line the spawner works from
    pub const GROUND_HEIGHT: f32 = 330.0;
    /// Players and obstacles stand this far below the ground line
    pub const FOOTING_OFFSET: f32 = 20.0;

    /// Player defaults
    pub const PLAYER_X: f32 = 80.0;
    pub const JUMP_HEIGHT: f32 = 125.0;
    pub const GRAVITY: f32 = 0.7;
    pub const ANIMATION_SPEED: f32 = 0.15;
    pub const RUN_FRAMES: u32 = 8;

    /// Spawner defaults
    pub const OBSTACLE_SPAWN_X: f32 = 900.0;
    pub const OBSTACLE_SPEED: f32 = 5.0;
    pub const MIN_GAP_OFFSET: f32 = 50.0;
    /// Chance per tick that no spawn is attempted
    pub const SPAWN_SKIP_CHANCE: f64 = 0.97;
    /// How far behind the player an obstacle still counts as "ahead"
    pub const OBSERVATION_LOOKBACK: f32 = 20.0;

    /// Elapsed ticks per score point
    pub const SCORE_DIVISOR: u64 = 100;
}
