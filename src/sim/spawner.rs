//! Obstacle spawner
//!
//! Every obstacle shares one speed and one spawn point, so whether a new
//! obstacle can be jumped reduces to a closed-form gap check against the
//! obstacle spawned before it. No lookahead simulation is needed.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::kinematics::JumpKinematics;
use super::mask::Mask;
use super::state::Obstacle;
use crate::error::ConfigError;
use crate::settings::{GameSettings, SpawnerSettings};

/// A catalog entry with its rasterized hit shape
#[derive(Debug, Clone)]
pub struct ObstacleShape {
    pub name: String,
    pub mask: Mask,
}

/// Result of one spawn step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnOutcome {
    /// The random draw skipped the attempt
    Skipped,
    /// The feasibility gate rejected the spawn
    Blocked { gap: f32, required: f32 },
    Spawned { id: u32 },
}

/// Creates, moves and retires obstacles for one episode
#[derive(Debug, Clone)]
pub struct ObstacleSpawner {
    config: SpawnerSettings,
    ground_height: f32,
    time_of_jump: f32,
    catalog: Vec<ObstacleShape>,
    /// Live obstacles in spawn order
    obstacles: Vec<Obstacle>,
    rng: Pcg32,
    next_id: u32,
}

impl ObstacleSpawner {
    pub fn new(
        config: SpawnerSettings,
        ground_height: f32,
        kinematics: &JumpKinematics,
        catalog: Vec<ObstacleShape>,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        if catalog.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        if !(config.speed.is_finite() && config.speed > 0.0) {
            return Err(ConfigError::InvalidSpeed(config.speed));
        }
        Ok(Self {
            config,
            ground_height,
            time_of_jump: kinematics.time_of_jump(),
            catalog,
            obstacles: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        })
    }

    /// Build the spawner and rasterize the catalog from settings
    pub fn from_settings(
        settings: &GameSettings,
        kinematics: &JumpKinematics,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        let catalog = settings
            .obstacles
            .iter()
            .map(|kind| {
                Ok(ObstacleShape {
                    name: kind.name.clone(),
                    mask: kind.shape.build(&kind.name)?,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Self::new(
            settings.spawner.clone(),
            settings.ground_height,
            kinematics,
            catalog,
            seed,
        )
    }

    pub fn config(&self) -> &SpawnerSettings {
        &self.config
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn mask(&self, kind: usize) -> &Mask {
        &self.catalog[kind].mask
    }

    pub fn kind_name(&self, kind: usize) -> &str {
        &self.catalog[kind].name
    }

    /// Bottom edge of every obstacle
    pub fn obstacle_y(&self) -> f32 {
        self.ground_height + self.config.y_offset
    }

    /// Largest leading-edge x among live obstacles, or 0 with none
    pub fn furthest_x(&self) -> f32 {
        self.obstacles.iter().map(|o| o.x).fold(0.0, f32::max)
    }

    /// Distance an obstacle of `width` covers during one jump, plus its width
    pub fn air_distance(&self, width: f32) -> f32 {
        self.time_of_jump * self.config.speed + width
    }

    /// Smallest gap (exclusive) that admits an obstacle of `width`
    pub fn required_gap(&self, width: f32) -> f32 {
        self.air_distance(width) + self.config.min_gap_offset
    }

    /// Current gap to the furthest obstacle and the gap the feasibility
    /// gate requires for catalog entry `kind`
    pub fn gap_for(&self, kind: usize) -> (f32, f32) {
        let width = self.catalog[kind].mask.width() as f32;
        (self.config.spawn_x - self.furthest_x(), self.required_gap(width))
    }

    /// Spawn step with explicit randomness: `draw` in [0, 1) decides whether
    /// an attempt happens, `kind` picks the catalog entry
    pub fn try_spawn(&mut self, draw: f64, kind: usize) -> SpawnOutcome {
        if draw >= 1.0 - self.config.spawn_skip_chance {
            return SpawnOutcome::Skipped;
        }

        let (gap, required) = self.gap_for(kind);
        if gap <= required {
            log::trace!("Spawn blocked: gap {gap:.1} <= {required:.1}");
            return SpawnOutcome::Blocked { gap, required };
        }

        let id = self.place(self.config.spawn_x, kind);
        log::debug!(
            "Spawned {} #{} at x={}",
            self.catalog[kind].name,
            id,
            self.config.spawn_x
        );
        SpawnOutcome::Spawned { id }
    }

    /// One spawn step using the spawner's own seeded RNG
    pub fn generate(&mut self) -> SpawnOutcome {
        let draw: f64 = self.rng.random();
        if draw >= 1.0 - self.config.spawn_skip_chance {
            return SpawnOutcome::Skipped;
        }
        let kind = self.rng.random_range(0..self.catalog.len());
        self.try_spawn(draw, kind)
    }

    /// Append an obstacle at `x` without consulting the gate
    pub fn place(&mut self, x: f32, kind: usize) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.obstacles.push(Obstacle {
            id,
            kind,
            x,
            y: self.obstacle_y(),
            speed: self.config.speed,
            width: self.catalog[kind].mask.width() as f32,
        });
        id
    }

    /// Move every obstacle one tick and drop those past the left edge.
    /// Returns how many were removed.
    pub fn advance(&mut self) -> usize {
        for obstacle in &mut self.obstacles {
            obstacle.tick();
        }
        let before = self.obstacles.len();
        self.obstacles.retain(|o| !o.is_off_screen());
        before - self.obstacles.len()
    }

    /// Horizontal distance from `player_x` to the nearest obstacle that is
    /// not yet behind the player; `spawn_x` when nothing qualifies
    pub fn distance_to_nearest(&self, player_x: f32) -> f32 {
        self.obstacles
            .iter()
            .filter(|o| o.x > player_x - self.config.lookback)
            .map(|o| o.x - player_x)
            .reduce(f32::min)
            .unwrap_or(self.config.spawn_x)
    }
}
