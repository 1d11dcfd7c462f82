//! Game settings
//!
//! Loaded from a JSON file at startup. Any value that would make the
//! simulation meaningless is rejected here, never per tick.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::{JumpKinematics, ShapeSpec};

/// Window and pacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub width: u32,
    pub height: u32,
    /// Target ticks per second
    pub fps: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: WINDOW_WIDTH,
            height: WINDOW_HEIGHT,
            fps: FPS,
        }
    }
}

/// Player configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Fixed horizontal position (mid-bottom anchor)
    pub x: f32,
    /// Players stand this far below the ground line
    pub ground_offset: f32,
    pub jump_height: f32,
    pub gravity: f32,
    /// Animation phase advance per grounded tick
    pub animation_speed: f32,
    /// Number of frames in the run cycle
    pub run_frames: u32,
    pub shape: ShapeSpec,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            x: PLAYER_X,
            ground_offset: FOOTING_OFFSET,
            jump_height: JUMP_HEIGHT,
            gravity: GRAVITY,
            animation_speed: ANIMATION_SPEED,
            run_frames: RUN_FRAMES,
            shape: ShapeSpec::Ellipse {
                width: 36,
                height: 52,
            },
        }
    }
}

/// Spawner tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerSettings {
    /// Leading-edge x where new obstacles appear
    pub spawn_x: f32,
    /// Shared speed of every obstacle (pixels/tick)
    pub speed: f32,
    /// Safety margin added to the feasibility gate
    pub min_gap_offset: f32,
    /// Chance per tick that no spawn is attempted
    pub spawn_skip_chance: f64,
    /// Obstacles stand this far below the ground line
    pub y_offset: f32,
    /// How far behind the player an obstacle still counts for observations
    pub lookback: f32,
}

impl Default for SpawnerSettings {
    fn default() -> Self {
        Self {
            spawn_x: OBSTACLE_SPAWN_X,
            speed: OBSTACLE_SPEED,
            min_gap_offset: MIN_GAP_OFFSET,
            spawn_skip_chance: SPAWN_SKIP_CHANCE,
            y_offset: FOOTING_OFFSET,
            lookback: OBSERVATION_LOOKBACK,
        }
    }
}

/// One entry of the obstacle catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleKind {
    pub name: String,
    pub shape: ShapeSpec,
}

impl ObstacleKind {
    pub fn new(name: &str, shape: ShapeSpec) -> Self {
        Self {
            name: name.to_string(),
            shape,
        }
    }
}

fn default_catalog() -> Vec<ObstacleKind> {
    vec![
        ObstacleKind::new(
            "small_cactus",
            ShapeSpec::Rect {
                width: 20,
                height: 40,
            },
        ),
        ObstacleKind::new(
            "large_cactus",
            ShapeSpec::Rect {
                width: 28,
                height: 56,
            },
        ),
        ObstacleKind::new(
            "boulder",
            ShapeSpec::Ellipse {
                width: 44,
                height: 30,
            },
        ),
    ]
}

/// Complete game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub window: WindowSettings,
    /// Ground line shared by the spawner and every player
    pub ground_height: f32,
    pub player: PlayerSettings,
    pub spawner: SpawnerSettings,
    pub obstacles: Vec<ObstacleKind>,
    /// Elapsed ticks per score point
    pub score_divisor: u64,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            window: WindowSettings::default(),
            ground_height: GROUND_HEIGHT,
            player: PlayerSettings::default(),
            spawner: SpawnerSettings::default(),
            obstacles: default_catalog(),
            score_divisor: SCORE_DIVISOR,
        }
    }
}

impl GameSettings {
    /// Jump constants for the configured player
    pub fn kinematics(&self) -> Result<JumpKinematics, ConfigError> {
        JumpKinematics::new(self.player.jump_height, self.player.gravity)
    }

    /// Check every value the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.kinematics()?;

        if self.window.fps == 0 {
            return Err(ConfigError::ZeroFrameRate);
        }
        if self.score_divisor == 0 {
            return Err(ConfigError::ZeroScoreDivisor);
        }
        if self.player.run_frames == 0 {
            return Err(ConfigError::Zero {
                name: "player.run_frames",
            });
        }
        let speed = self.spawner.speed;
        if !(speed.is_finite() && speed > 0.0) {
            return Err(ConfigError::InvalidSpeed(speed));
        }
        let skip = self.spawner.spawn_skip_chance;
        if !(0.0..=1.0).contains(&skip) {
            return Err(ConfigError::InvalidProbability {
                name: "spawner.spawn_skip_chance",
                value: skip,
            });
        }

        self.player.shape.build("player")?;
        if self.obstacles.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        for kind in &self.obstacles {
            kind.shape.build(&kind.name)?;
        }
        Ok(())
    }

    /// Load and validate settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings, using the defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Write settings as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Serialize {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let settings = GameSettings::default();
        settings.validate().unwrap();
        assert_eq!(settings.ground_height, 330.0);
        assert_eq!(settings.spawner.spawn_x, 900.0);
        assert_eq!(settings.window.fps, 60);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut settings = GameSettings::default();
        settings.player.gravity = 0.0;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidGravity(_))
        ));

        let mut settings = GameSettings::default();
        settings.obstacles.clear();
        assert!(matches!(settings.validate(), Err(ConfigError::EmptyCatalog)));

        let mut settings = GameSettings::default();
        settings.spawner.spawn_skip_chance = 1.5;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidProbability { .. })
        ));

        let mut settings = GameSettings::default();
        settings.window.fps = 0;
        assert!(matches!(settings.validate(), Err(ConfigError::ZeroFrameRate)));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{ "player": { "jump_height": 150.0 }, "spawner": { "speed": 6.0 } }"#;
        let settings: GameSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.player.jump_height, 150.0);
        assert_eq!(settings.player.gravity, GRAVITY);
        assert_eq!(settings.spawner.speed, 6.0);
        assert_eq!(settings.obstacles.len(), 3);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut settings = GameSettings::default();
        settings.spawner.min_gap_offset = 75.0;
        settings.save(&path).unwrap();

        let loaded = GameSettings::load(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = GameSettings::load_or_default(&dir.path().join("absent.json")).unwrap();
        assert_eq!(settings, GameSettings::default());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            GameSettings::load_or_default(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
