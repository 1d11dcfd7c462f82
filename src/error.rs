//! Error types for configuration, score storage and genomes

use std::path::PathBuf;

use thiserror::Error;

/// Fatal configuration problems, reported once at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("gravity must be positive and finite, got {0}")]
    InvalidGravity(f32),
    #[error("jump height must be positive and finite, got {0}")]
    InvalidJumpHeight(f32),
    #[error("obstacle speed must be positive and finite, got {0}")]
    InvalidSpeed(f32),
    #[error("{name} must be between 0.0 and 1.0, got {value}")]
    InvalidProbability { name: &'static str, value: f64 },
    #[error("frame rate must be non-zero")]
    ZeroFrameRate,
    #[error("score divisor must be non-zero")]
    ZeroScoreDivisor,
    #[error("obstacle catalog is empty")]
    EmptyCatalog,
    #[error("shape '{name}' has no solid pixels or zero size")]
    EmptyShape { name: String },
    #[error("pixel rows for '{name}' are ragged (row {row} has {actual} columns, expected {expected})")]
    RaggedShape {
        name: String,
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("shape '{name}' is {width}x{height}, sides are limited to {max} pixels")]
    ShapeTooLarge {
        name: String,
        width: u32,
        height: u32,
        max: u32,
    },
    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidMagnitude { name: &'static str, value: f32 },
    #[error("{name} must be non-zero")]
    Zero { name: &'static str },
    #[error(transparent)]
    Genome(#[from] GenomeError),
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Score persistence failures; never fatal to gameplay
#[derive(Debug, Error)]
pub enum ScoreStoreError {
    #[error("player name must be 1..={max} characters, got {len}")]
    InvalidName { len: usize, max: usize },
    #[error("score store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("score store at {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised when a genome does not fit its network topology
#[derive(Debug, Error, PartialEq)]
pub enum GenomeError {
    #[error("network needs at least one hidden node")]
    NoHiddenNodes,
    #[error("genome carries {actual} weights, topology needs {expected}")]
    WeightCount { expected: usize, actual: usize },
}
