//! Jump kinematics
//!
//! A jump is a single constant-acceleration parabola. The player integrator
//! (`position += velocity + 0.5 * acceleration`) tracks it exactly at integer
//! ticks, so the closed forms here agree with the simulation tick for tick.

use serde::Serialize;

use crate::error::ConfigError;

/// Derived jump constants for one `(jump_height, gravity)` configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JumpKinematics {
    jump_height: f32,
    gravity: f32,
    time_of_jump: f32,
    jump_velocity: f32,
}

impl JumpKinematics {
    /// Derive `time_of_jump = sqrt(2h / g)` and `jump_velocity = g * time_of_jump`
    pub fn new(jump_height: f32, gravity: f32) -> Result<Self, ConfigError> {
        if !(gravity.is_finite() && gravity > 0.0) {
            return Err(ConfigError::InvalidGravity(gravity));
        }
        if !(jump_height.is_finite() && jump_height > 0.0) {
            return Err(ConfigError::InvalidJumpHeight(jump_height));
        }

        let time_of_jump = (2.0 * jump_height / gravity).sqrt();
        Ok(Self {
            jump_height,
            gravity,
            time_of_jump,
            jump_velocity: gravity * time_of_jump,
        })
    }

    pub fn jump_height(&self) -> f32 {
        self.jump_height
    }

    pub fn gravity(&self) -> f32 {
        self.gravity
    }

    /// Ticks from launch to apex
    pub fn time_of_jump(&self) -> f32 {
        self.time_of_jump
    }

    /// Upward speed imparted at launch
    pub fn jump_velocity(&self) -> f32 {
        self.jump_velocity
    }

    /// Ticks from launch until the parabola returns to the ground line
    pub fn airtime(&self) -> f32 {
        2.0 * self.time_of_jump
    }

    /// Height above ground `ticks` after launch (negative once landed)
    pub fn height_after(&self, ticks: f32) -> f32 {
        self.jump_velocity * ticks - 0.5 * self.gravity * ticks * ticks
    }
}
