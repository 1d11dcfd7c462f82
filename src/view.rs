//! Render-facing snapshots
//!
//! The simulation never draws. Once per tick the driver takes a `FrameView`
//! and hands it to whatever `FrameSink` is attached.

use serde::Serialize;

use crate::sim::PlayerPose;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub pose: PlayerPose,
    pub alive: bool,
    pub score: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObstacleView {
    pub id: u32,
    /// Catalog name, used by the renderer to pick a sprite
    pub kind: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameView {
    pub tick: u64,
    pub players: Vec<PlayerView>,
    pub obstacles: Vec<ObstacleView>,
}

impl FrameView {
    /// Highest score on screen
    pub fn best_score(&self) -> u64 {
        self.players.iter().map(|p| p.score).max().unwrap_or(0)
    }
}

/// Fire-and-forget consumer of frames
pub trait FrameSink {
    fn present(&mut self, frame: &FrameView);
}

/// Draws the lane as one line of text: `@` for players, `^` for obstacles
#[derive(Debug, Clone)]
pub struct AsciiLane {
    columns: usize,
    scale: f32,
    pub last_line: String,
}

impl AsciiLane {
    /// `world_width` pixels squeezed into `columns` characters
    pub fn new(world_width: f32, columns: usize) -> Self {
        Self {
            columns,
            scale: columns as f32 / world_width,
            last_line: String::new(),
        }
    }

    fn column(&self, x: f32) -> Option<usize> {
        let c = (x * self.scale).floor();
        if c < 0.0 || c as usize >= self.columns {
            None
        } else {
            Some(c as usize)
        }
    }

    pub fn render(&self, frame: &FrameView) -> String {
        let mut lane = vec!['_'; self.columns];
        for obstacle in &frame.obstacles {
            if let Some(c) = self.column(obstacle.x) {
                lane[c] = '^';
            }
        }
        for player in frame.players.iter().filter(|p| p.alive) {
            if let Some(c) = self.column(player.x) {
                lane[c] = match player.pose {
                    PlayerPose::Airborne => '*',
                    PlayerPose::Running { .. } => '@',
                };
            }
        }
        let lane: String = lane.into_iter().collect();
        format!("{lane} score {}", frame.best_score())
    }
}

impl FrameSink for AsciiLane {
    fn present(&mut self, frame: &FrameView) {
        self.last_line = self.render(frame);
    }
}
