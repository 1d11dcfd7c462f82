//! Genomes and the feed-forward networks built from them
//!
//! Topology is fixed: 3 inputs -> `hidden` tanh nodes -> 1 sigmoid output.
//! Only weights and biases evolve.

use std::fs;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, GenomeError};

/// Observation width (height, distance, frame rate)
pub const INPUTS: usize = 3;

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Flat weight vector plus the hidden layer size it was built for.
///
/// Layout: input->hidden weights (row per hidden node), hidden biases,
/// hidden->output weights, output bias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    hidden: usize,
    weights: Vec<f32>,
}

impl Genome {
    /// Number of weights a network with `hidden` nodes needs
    pub fn weight_count(hidden: usize) -> usize {
        hidden * INPUTS + hidden + hidden + 1
    }

    pub fn from_weights(hidden: usize, weights: Vec<f32>) -> Result<Self, GenomeError> {
        if hidden == 0 {
            return Err(GenomeError::NoHiddenNodes);
        }
        let expected = Self::weight_count(hidden);
        if weights.len() != expected {
            return Err(GenomeError::WeightCount {
                expected,
                actual: weights.len(),
            });
        }
        Ok(Self { hidden, weights })
    }

    /// All weights zero: the network outputs exactly 0.5 for any input
    pub fn zeroed(hidden: usize) -> Self {
        let hidden = hidden.max(1);
        Self {
            hidden,
            weights: vec![0.0; Self::weight_count(hidden)],
        }
    }

    /// Weights drawn uniformly from `[-range, range]`
    pub fn random<R: Rng>(hidden: usize, range: f32, rng: &mut R) -> Self {
        let hidden = hidden.max(1);
        let weights = (0..Self::weight_count(hidden))
            .map(|_| rng.random_range(-range..=range))
            .collect();
        Self { hidden, weights }
    }

    pub fn hidden(&self) -> usize {
        self.hidden
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn set_output_bias(&mut self, bias: f32) {
        if let Some(last) = self.weights.last_mut() {
            *last = bias;
        }
    }

    /// Perturb each weight with probability `rate` by up to `power`
    pub fn mutate<R: Rng>(&mut self, rate: f64, power: f32, rng: &mut R) {
        for w in &mut self.weights {
            if rng.random_bool(rate) {
                *w += rng.random_range(-power..=power);
            }
        }
    }

    /// Uniform crossover; parents must share a topology
    pub fn crossover<R: Rng>(a: &Genome, b: &Genome, rng: &mut R) -> Genome {
        debug_assert_eq!(a.hidden, b.hidden);
        let weights = a
            .weights
            .iter()
            .zip(&b.weights)
            .map(|(&wa, &wb)| if rng.random_bool(0.5) { wa } else { wb })
            .collect();
        Genome {
            hidden: a.hidden,
            weights,
        }
    }

    /// Build the phenotype
    pub fn network(&self) -> Network {
        let h = self.hidden;
        let (input_weights, rest) = self.weights.split_at(h * INPUTS);
        let (hidden_bias, rest) = rest.split_at(h);
        let (output_weights, output_bias) = rest.split_at(h);
        Network {
            input_weights: input_weights.to_vec(),
            hidden_bias: hidden_bias.to_vec(),
            output_weights: output_weights.to_vec(),
            output_bias: output_bias[0],
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let genome: Genome = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_weights(genome.hidden, genome.weights)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Serialize {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Evaluable feed-forward network
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    input_weights: Vec<f32>,
    hidden_bias: Vec<f32>,
    output_weights: Vec<f32>,
    output_bias: f32,
}

impl Network {
    /// Single output in (0, 1)
    pub fn activate(&self, inputs: &[f32; INPUTS]) -> f32 {
        let mut out = self.output_bias;
        for (h, (&bias, &w_out)) in self.hidden_bias.iter().zip(&self.output_weights).enumerate() {
            let row = &self.input_weights[h * INPUTS..(h + 1) * INPUTS];
            let sum = bias + row.iter().zip(inputs).map(|(w, x)| w * x).sum::<f32>();
            out += w_out * sum.tanh();
        }
        sigmoid(out)
    }
}
