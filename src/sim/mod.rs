//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (players by insertion, obstacles by spawn)
//! - No rendering or platform dependencies

pub mod collision;
pub mod controller;
pub mod kinematics;
pub mod mask;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{first_collision, player_hits_obstacle};
pub use controller::{
    Controller, FitnessHandle, HumanInput, Idle, JumpSignal, NetworkController, Observation,
};
pub use kinematics::JumpKinematics;
pub use mask::{Mask, ShapeSpec};
pub use spawner::{ObstacleShape, ObstacleSpawner, SpawnOutcome};
pub use state::{Episode, EpisodePhase, Obstacle, Player, PlayerPose};
pub use tick::{TickInput, tick};
