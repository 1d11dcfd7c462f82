//! Generation loop
//!
//! Each generation is one episode: every genome gets its own player, all
//! players share the same spawner, and a genome's fitness is its player's
//! final score.

use std::fs;
use std::path::Path;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::network::Genome;
use crate::error::ConfigError;
use crate::settings::GameSettings;
use crate::sim::{Episode, FitnessHandle, NetworkController};

/// Optimizer configuration blob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub generations: u32,
    pub hidden_nodes: usize,
    /// Initial weights are drawn from `[-range, range]`
    pub initial_weight_range: f32,
    /// Per-weight mutation probability
    pub mutation_rate: f64,
    /// Largest single weight perturbation
    pub mutation_power: f32,
    /// Genomes copied unchanged into the next generation
    pub elitism: usize,
    pub tournament_size: usize,
    /// Episodes are cancelled after this many ticks
    pub max_episode_ticks: u64,
    /// Stop early once a genome reaches this fitness
    pub fitness_threshold: f64,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 50,
            hidden_nodes: 4,
            initial_weight_range: 1.0,
            mutation_rate: 0.2,
            mutation_power: 0.5,
            elitism: 2,
            tournament_size: 3,
            max_episode_ticks: 30_000,
            fitness_threshold: 250.0,
        }
    }
}

impl EvolutionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::Zero {
                name: "population_size",
            });
        }
        if self.hidden_nodes == 0 {
            return Err(ConfigError::Zero {
                name: "hidden_nodes",
            });
        }
        if self.tournament_size == 0 {
            return Err(ConfigError::Zero {
                name: "tournament_size",
            });
        }
        if self.max_episode_ticks == 0 {
            return Err(ConfigError::Zero {
                name: "max_episode_ticks",
            });
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigError::InvalidProbability {
                name: "mutation_rate",
                value: self.mutation_rate,
            });
        }
        for (name, value) in [
            ("initial_weight_range", self.initial_weight_range),
            ("mutation_power", self.mutation_power),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidMagnitude { name, value });
            }
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }
}

/// Outcome of one evaluated generation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationReport {
    pub generation: u32,
    pub best: f64,
    pub mean: f64,
    /// Ticks the generation's episode lasted
    pub ticks: u64,
}

/// Final result of a training run
#[derive(Debug, Clone)]
pub struct TrainingSummary {
    pub best_genome: Genome,
    pub best_fitness: f64,
    pub history: Vec<GenerationReport>,
}

pub struct Trainer {
    config: EvolutionConfig,
    settings: GameSettings,
    seed: u64,
    rng: Pcg32,
    population: Vec<Genome>,
    generation: u32,
    best: Option<(Genome, f64)>,
    history: Vec<GenerationReport>,
}

impl Trainer {
    /// Validate both configurations and seed a random population
    pub fn new(config: EvolutionConfig, settings: GameSettings, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        settings.validate()?;

        let mut rng = Pcg32::seed_from_u64(seed);
        let population = (0..config.population_size)
            .map(|_| Genome::random(config.hidden_nodes, config.initial_weight_range, &mut rng))
            .collect();

        Ok(Self {
            config,
            settings,
            seed,
            rng,
            population,
            generation: 0,
            best: None,
            history: Vec::new(),
        })
    }

    pub fn population(&self) -> &[Genome] {
        &self.population
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Run one episode with the current population; returns per-genome
    /// fitness in population order and the episode length
    pub fn evaluate(&self) -> Result<(Vec<f64>, u64), ConfigError> {
        let episode_seed = self.seed.wrapping_add(self.generation as u64 + 1);
        let mut episode = Episode::new(&self.settings, episode_seed)?;

        let handles: Vec<FitnessHandle> = self
            .population
            .iter()
            .map(|genome| {
                let handle = FitnessHandle::new();
                episode.add_player(Box::new(NetworkController::new(genome.network(), handle.clone())));
                handle
            })
            .collect();

        episode.run(self.config.max_episode_ticks);
        Ok((handles.iter().map(FitnessHandle::get).collect(), episode.time_ticks))
    }

    /// Evaluate the current generation and breed the next one
    pub fn step(&mut self) -> Result<GenerationReport, ConfigError> {
        let (fitness, ticks) = self.evaluate()?;

        let (best_index, best) = fitness
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap_or((0, 0.0));
        let mean = fitness.iter().sum::<f64>() / fitness.len().max(1) as f64;

        if self.best.as_ref().is_none_or(|(_, f)| best > *f) {
            self.best = Some((self.population[best_index].clone(), best));
        }

        let report = GenerationReport {
            generation: self.generation,
            best,
            mean,
            ticks,
        };
        log::info!(
            "Generation {}: best {:.0}, mean {:.1}, {} ticks",
            report.generation,
            report.best,
            report.mean,
            report.ticks
        );
        self.history.push(report.clone());

        self.population = self.breed(&fitness);
        self.generation += 1;
        Ok(report)
    }

    /// Run until the generation budget is spent or the threshold is met
    pub fn run(&mut self, mut on_generation: impl FnMut(&GenerationReport)) -> Result<TrainingSummary, ConfigError> {
        while self.generation < self.config.generations {
            let report = self.step()?;
            on_generation(&report);
            if report.best >= self.config.fitness_threshold {
                log::info!(
                    "Fitness threshold {} reached in generation {}",
                    self.config.fitness_threshold,
                    report.generation
                );
                break;
            }
        }

        let (best_genome, best_fitness) = self
            .best
            .clone()
            .unwrap_or_else(|| (self.population[0].clone(), 0.0));
        Ok(TrainingSummary {
            best_genome,
            best_fitness,
            history: self.history.clone(),
        })
    }

    /// Elites first, then tournament-selected, crossed over, mutated children
    fn breed(&mut self, fitness: &[f64]) -> Vec<Genome> {
        let size = self.config.population_size;
        let mut order: Vec<usize> = (0..self.population.len()).collect();
        order.sort_by(|&a, &b| fitness[b].total_cmp(&fitness[a]));

        let mut next: Vec<Genome> = order
            .iter()
            .take(self.config.elitism.min(size))
            .map(|&i| self.population[i].clone())
            .collect();

        while next.len() < size {
            let a = self.tournament(fitness);
            let b = self.tournament(fitness);
            let mut child = Genome::crossover(&self.population[a], &self.population[b], &mut self.rng);
            child.mutate(self.config.mutation_rate, self.config.mutation_power, &mut self.rng);
            next.push(child);
        }
        next
    }

    fn tournament(&mut self, fitness: &[f64]) -> usize {
        let mut winner = self.rng.random_range(0..self.population.len());
        for _ in 1..self.config.tournament_size {
            let challenger = self.rng.random_range(0..self.population.len());
            if fitness[challenger] > fitness[winner] {
                winner = challenger;
            }
        }
        winner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> EvolutionConfig {
        EvolutionConfig {
            population_size: 6,
            generations: 3,
            max_episode_ticks: 600,
            ..Default::default()
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(EvolutionConfig::default().validate().is_ok());
        let bad = EvolutionConfig {
            population_size: 0,
            ..Default::default()
        };
        assert!(matches!(bad.validate(), Err(ConfigError::Zero { .. })));
        let bad = EvolutionConfig {
            mutation_rate: 2.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_weight_scales_must_be_non_negative() {
        for (range, power) in [(-1.0, 0.5), (f32::NAN, 0.5), (1.0, -0.5), (1.0, f32::INFINITY)] {
            let config = EvolutionConfig {
                initial_weight_range: range,
                mutation_power: power,
                ..small_config()
            };
            assert!(matches!(config.validate(), Err(ConfigError::InvalidMagnitude { .. })));
            assert!(Trainer::new(config, GameSettings::default(), 1).is_err());
        }

        // Zero is a legal degenerate range
        let frozen = EvolutionConfig {
            initial_weight_range: 0.0,
            mutation_power: 0.0,
            ..small_config()
        };
        let mut trainer = Trainer::new(frozen, GameSettings::default(), 1).unwrap();
        assert!(trainer.population().iter().all(|g| g.weights().iter().all(|&w| w == 0.0)));
        trainer.step().unwrap();
    }

    #[test]
    fn test_load_rejects_negative_weight_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("evolution.json");
        fs::write(&path, r#"{"initial_weight_range": -1.0}"#).unwrap();
        assert!(matches!(
            EvolutionConfig::load(&path),
            Err(ConfigError::InvalidMagnitude {
                name: "initial_weight_range",
                ..
            })
        ));
    }

    #[test]
    fn test_fitness_matches_episode_scores() {
        let trainer = Trainer::new(small_config(), GameSettings::default(), 11).unwrap();
        let (fitness, ticks) = trainer.evaluate().unwrap();
        assert_eq!(fitness.len(), 6);
        assert!(ticks <= 600);
        // No obstacle reaches the players in the first hundred ticks, so every
        // genome scores at least one point and none can pass the tick cap
        for f in &fitness {
            assert!((1.0..=6.0).contains(f), "fitness {f}");
            assert_eq!(f.fract(), 0.0);
        }
    }

    #[test]
    fn test_step_keeps_population_and_elites() {
        let mut trainer = Trainer::new(small_config(), GameSettings::default(), 5).unwrap();
        let before = trainer.population().to_vec();
        let (fitness, _) = trainer.evaluate().unwrap();

        let report = trainer.step().unwrap();
        assert_eq!(report.generation, 0);
        assert_eq!(trainer.generation(), 1);
        assert_eq!(trainer.population().len(), 6);

        // The top genome survives unchanged
        let elite = &trainer.population()[0];
        let index = before.iter().position(|g| g == elite).unwrap();
        assert_eq!(fitness[index], report.best);
    }

    #[test]
    fn test_training_is_deterministic() {
        let run = || {
            let mut trainer = Trainer::new(small_config(), GameSettings::default(), 77).unwrap();
            trainer.run(|_| {}).unwrap()
        };
        let a = run();
        let b = run();
        assert_eq!(a.history, b.history);
        assert_eq!(a.best_genome, b.best_genome);
        assert_eq!(a.history.len(), 3);
    }

    #[test]
    fn test_threshold_stops_early() {
        let config = EvolutionConfig {
            fitness_threshold: 0.0,
            ..small_config()
        };
        let mut trainer = Trainer::new(config, GameSettings::default(), 1).unwrap();
        let summary = trainer.run(|_| {}).unwrap();
        assert_eq!(summary.history.len(), 1);
    }
}
