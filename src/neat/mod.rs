//! Neuroevolution of jump controllers
//!
//! A fixed-topology network is evolved by a small generational GA. Every
//! genome of a generation plays the same episode, so they all face the
//! same obstacle layout.

pub mod network;
pub mod trainer;

pub use network::{Genome, INPUTS, Network};
pub use trainer::{EvolutionConfig, GenerationReport, Trainer, TrainingSummary};
