//! Episode state and entity types
//!
//! Entities are plain records. Drawing is done elsewhere from `view()`
//! snapshots, so nothing here knows about sprites or surfaces.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::controller::{Controller, Observation};
use super::kinematics::JumpKinematics;
use super::mask::Mask;
use super::spawner::ObstacleSpawner;
use crate::error::ConfigError;
use crate::settings::GameSettings;
use crate::view::{FrameView, ObstacleView, PlayerView};

/// Lifecycle of an episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodePhase {
    /// At least one player alive
    Running,
    /// All players dead, or cancelled
    Finished,
}

/// What the renderer should show for a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerPose {
    Airborne,
    Running { frame: u32 },
}

/// A runner with fixed x and vertical jump physics
#[derive(Debug, Clone, Serialize)]
pub struct Player {
    pub id: u32,
    /// Mid-bottom anchor; only `y` changes
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    /// Floor under this player, fixed at spawn
    pub ground_height: f32,
    pub kinematics: JumpKinematics,
    pub alive: bool,
    /// Final score, valid once dead
    pub score: u64,
    pub start_tick: u64,
    pub death_tick: Option<u64>,
    /// Run-cycle phase, advanced while grounded
    pub animation_phase: f32,
    animation_speed: f32,
    run_frames: u32,
}

impl Player {
    pub fn new(id: u32, x: f32, ground_height: f32, start_tick: u64, kinematics: JumpKinematics) -> Self {
        Self {
            id,
            position: Vec2::new(x, ground_height),
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            ground_height,
            kinematics,
            alive: true,
            score: 0,
            start_tick,
            death_tick: None,
            animation_phase: 0.0,
            animation_speed: crate::consts::ANIMATION_SPEED,
            run_frames: crate::consts::RUN_FRAMES,
        }
    }

    /// Override the run-cycle animation parameters
    pub fn with_animation(mut self, speed: f32, frames: u32) -> Self {
        self.animation_speed = speed;
        self.run_frames = frames.max(1);
        self
    }

    /// At or past the ground line counts as grounded
    pub fn on_ground(&self) -> bool {
        self.position.y >= self.ground_height
    }

    /// Start a jump; ignored while airborne
    pub fn jump(&mut self) {
        if self.on_ground() {
            self.velocity.y = -self.kinematics.jump_velocity();
            self.acceleration.y = self.kinematics.gravity();
        }
    }

    /// Integrate one tick; dead players are frozen
    pub fn tick(&mut self) {
        if !self.alive {
            return;
        }

        self.position += self.velocity + 0.5 * self.acceleration;
        self.velocity += self.acceleration;
        if self.position.y > self.ground_height {
            self.position.y = self.ground_height;
            self.velocity.y = 0.0;
            self.acceleration.y = 0.0;
        }

        if self.on_ground() {
            self.animation_phase += self.animation_speed;
            if self.animation_phase >= self.run_frames as f32 {
                self.animation_phase = 0.0;
            }
        } else {
            self.animation_phase = 0.0;
        }
    }

    /// Score this player would have at `tick`
    pub fn score_at(&self, tick: u64, divisor: u64) -> u64 {
        tick.saturating_sub(self.start_tick) / divisor
    }

    /// Freeze the player and compute the final score
    pub fn game_over(&mut self, tick: u64, divisor: u64) {
        if !self.alive {
            return;
        }
        self.alive = false;
        self.death_tick = Some(tick);
        self.score = self.score_at(tick, divisor);
    }

    /// Height above the ground line
    pub fn height(&self) -> f32 {
        self.ground_height - self.position.y
    }

    pub fn pose(&self) -> PlayerPose {
        if self.on_ground() {
            PlayerPose::Running {
                frame: self.animation_phase as u32,
            }
        } else {
            PlayerPose::Airborne
        }
    }
}

/// An obstacle sliding left at constant speed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    /// Index into the spawner's catalog
    pub kind: usize,
    /// Leading (left) edge
    pub x: f32,
    /// Bottom edge
    pub y: f32,
    pub speed: f32,
    pub width: f32,
}

impl Obstacle {
    pub fn tick(&mut self) {
        self.x -= self.speed;
    }

    /// Trailing edge
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Fully past the left edge of the screen
    pub fn is_off_screen(&self) -> bool {
        self.right() < 0.0
    }
}

/// One run of the game: a shared spawner and one or more players
pub struct Episode {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Simulation clock
    pub time_ticks: u64,
    pub phase: EpisodePhase,
    pub spawner: ObstacleSpawner,
    /// Every player ever added, in insertion order (dead ones stay)
    pub players: Vec<Player>,
    pub(crate) controllers: Vec<Box<dyn Controller>>,
    pub(crate) player_mask: Mask,
    kinematics: JumpKinematics,
    player_x: f32,
    player_ground: f32,
    animation_speed: f32,
    run_frames: u32,
    pub(crate) frame_rate: f32,
    pub(crate) score_divisor: u64,
    next_player_id: u32,
}

impl Episode {
    /// Create an empty episode; players are added with `add_player`
    pub fn new(settings: &GameSettings, seed: u64) -> Result<Self, ConfigError> {
        settings.validate()?;
        let kinematics = settings.kinematics()?;
        let spawner = ObstacleSpawner::from_settings(settings, &kinematics, seed)?;

        Ok(Self {
            seed,
            time_ticks: 0,
            phase: EpisodePhase::Running,
            spawner,
            players: Vec::new(),
            controllers: Vec::new(),
            player_mask: settings.player.shape.build("player")?,
            kinematics,
            player_x: settings.player.x,
            player_ground: settings.ground_height + settings.player.ground_offset,
            animation_speed: settings.player.animation_speed,
            run_frames: settings.player.run_frames,
            frame_rate: settings.window.fps as f32,
            score_divisor: settings.score_divisor,
            next_player_id: 1,
        })
    }

    /// Add a player driven by `controller`; scoring starts now
    pub fn add_player(&mut self, controller: Box<dyn Controller>) -> u32 {
        let id = self.next_player_id;
        self.next_player_id += 1;
        let player = Player::new(id, self.player_x, self.player_ground, self.time_ticks, self.kinematics)
            .with_animation(self.animation_speed, self.run_frames);
        self.players.push(player);
        self.controllers.push(controller);
        id
    }

    pub fn alive_count(&self) -> usize {
        self.players.iter().filter(|p| p.alive).count()
    }

    pub fn is_finished(&self) -> bool {
        self.phase == EpisodePhase::Finished
    }

    /// What a controller sees for `player` this tick
    pub fn observe(&self, player: &Player) -> Observation {
        Observation {
            height: player.position.y,
            distance: self.spawner.distance_to_nearest(player.position.x),
            frame_rate: self.frame_rate,
        }
    }

    /// Per-player scores in insertion order; alive players report the
    /// score so far
    pub fn scores(&self) -> Vec<u64> {
        self.players
            .iter()
            .map(|p| {
                if p.alive {
                    p.score_at(self.time_ticks, self.score_divisor)
                } else {
                    p.score
                }
            })
            .collect()
    }

    /// Snapshot for the renderer
    pub fn view(&self) -> FrameView {
        let scores = self.scores();
        FrameView {
            tick: self.time_ticks,
            players: self
                .players
                .iter()
                .zip(scores)
                .map(|(p, score)| PlayerView {
                    id: p.id,
                    x: p.position.x,
                    y: p.position.y,
                    pose: p.pose(),
                    alive: p.alive,
                    score,
                })
                .collect(),
            obstacles: self
                .spawner
                .obstacles()
                .iter()
                .map(|o| ObstacleView {
                    id: o.id,
                    kind: self.spawner.kind_name(o.kind).to_string(),
                    x: o.x,
                    y: o.y,
                    width: o.width,
                })
                .collect(),
        }
    }
}
