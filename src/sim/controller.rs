//! Jump decision sources
//!
//! A controller is injected into each player slot of an episode and polled
//! once per tick before the player integrates.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::neat::Network;

/// Output above this triggers a jump
pub const JUMP_THRESHOLD: f32 = 0.5;

/// What a controller sees each tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Player's vertical position (screen coordinates, ground is largest)
    pub height: f32,
    /// Distance to the nearest obstacle still ahead
    pub distance: f32,
    /// Target ticks per second
    pub frame_rate: f32,
}

impl Observation {
    pub fn as_inputs(&self) -> [f32; 3] {
        [self.height, self.distance, self.frame_rate]
    }
}

/// Decides whether a player jumps this tick
pub trait Controller {
    fn decide(&mut self, observation: &Observation) -> bool;

    /// Called once when the player's final score is known (death or cancel)
    fn report_score(&mut self, _score: u64) {}
}

/// Latched "jump requested" flag set by an input driver
#[derive(Debug, Clone, Default)]
pub struct JumpSignal(Arc<AtomicBool>);

impl JumpSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Read and clear the flag
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

/// Human player polling a `JumpSignal`
#[derive(Debug, Clone)]
pub struct HumanInput {
    signal: JumpSignal,
}

impl HumanInput {
    pub fn new(signal: JumpSignal) -> Self {
        Self { signal }
    }
}

impl Controller for HumanInput {
    fn decide(&mut self, _observation: &Observation) -> bool {
        self.signal.take()
    }
}

/// Shared slot a controller writes its fitness into
#[derive(Debug, Clone, Default)]
pub struct FitnessHandle(Rc<Cell<f64>>);

impl FitnessHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> f64 {
        self.0.get()
    }

    pub fn set(&self, fitness: f64) {
        self.0.set(fitness);
    }
}

/// Player driven by an evolved network
#[derive(Debug, Clone)]
pub struct NetworkController {
    network: Network,
    fitness: FitnessHandle,
}

impl NetworkController {
    pub fn new(network: Network, fitness: FitnessHandle) -> Self {
        Self { network, fitness }
    }

    pub fn network(&self) -> &Network {
        &self.network
    }
}

impl Controller for NetworkController {
    fn decide(&mut self, observation: &Observation) -> bool {
        self.network.activate(&observation.as_inputs()) > JUMP_THRESHOLD
    }

    fn report_score(&mut self, score: u64) {
        self.fitness.set(score as f64);
    }
}

/// Never jumps
#[derive(Debug, Clone, Copy, Default)]
pub struct Idle;

impl Controller for Idle {
    fn decide(&mut self, _observation: &Observation) -> bool {
        false
    }
}
