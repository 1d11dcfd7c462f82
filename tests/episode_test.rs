//! Episode-level behavior tests.
//!
//! Drives full episodes through the public API and checks the invariants
//! that must hold on every tick: players never sink below their floor,
//! scores only grow, obstacles move in lockstep and every spawn passed the
//! feasibility gate.

use std::collections::HashMap;

use dino_run::neat::{EvolutionConfig, Genome, Trainer};
use dino_run::settings::GameSettings;
use dino_run::sim::{
    Controller, Episode, EpisodePhase, FitnessHandle, Idle, JumpKinematics, NetworkController, Observation,
    Player, TickInput,
};
use dino_run::view::{AsciiLane, FrameSink};
use proptest::prelude::*;

/// Replays a jump pattern in a loop
struct Pattern {
    jumps: Vec<bool>,
    tick: usize,
}

impl Controller for Pattern {
    fn decide(&mut self, _observation: &Observation) -> bool {
        let jump = self.jumps[self.tick % self.jumps.len()];
        self.tick += 1;
        jump
    }
}

/// Jumps whenever an obstacle is close
struct Reflex;

impl Controller for Reflex {
    fn decide(&mut self, observation: &Observation) -> bool {
        observation.distance < 60.0
    }
}

#[derive(Debug, Clone, Copy)]
struct Seen {
    x: f32,
    width: f32,
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_episode_invariants(
        seed in any::<u64>(),
        skip in 0.8f64..1.0,
        jumps in prop::collection::vec(any::<bool>(), 1..40),
    ) {
        let mut settings = GameSettings::default();
        settings.spawner.spawn_skip_chance = skip;
        let mut episode = Episode::new(&settings, seed).unwrap();
        episode.add_player(Box::new(Idle));
        episode.add_player(Box::new(Pattern { jumps, tick: 0 }));
        episode.add_player(Box::new(Reflex));

        let spawn_x = episode.spawner.config().spawn_x;
        let speed = episode.spawner.config().speed;
        let mut seen: HashMap<u32, Seen> = HashMap::new();
        let mut max_id = 0;
        let mut last_scores = episode.scores();

        for _ in 0..3_000 {
            let furthest = episode.spawner.furthest_x();
            let before_tick = episode.time_ticks;
            let phase = episode.step(&TickInput::default());
            prop_assert_eq!(episode.time_ticks, before_tick + 1);

            // Players stay on or above their floor
            for p in &episode.players {
                prop_assert!(p.position.y <= p.ground_height);
            }

            // Scores never decrease, dead scores never change
            let scores = episode.scores();
            for (i, (now, then)) in scores.iter().zip(&last_scores).enumerate() {
                prop_assert!(now >= then);
                if episode.players[i].death_tick.is_some_and(|d| d < episode.time_ticks) {
                    prop_assert_eq!(now, then);
                }
            }
            last_scores = scores;
            for p in &episode.players {
                if let Some(death) = p.death_tick {
                    prop_assert_eq!(p.score, (death - p.start_tick) / settings.score_divisor);
                }
            }

            if phase == EpisodePhase::Finished {
                break;
            }

            let mut spawned = 0;
            for o in episode.spawner.obstacles() {
                match seen.get(&o.id) {
                    Some(prev) => {
                        prop_assert_eq!(o.x, prev.x - speed);
                    }
                    None => {
                        // New obstacles appear at the spawn point and advance once
                        spawned += 1;
                        prop_assert!(o.id > max_id);
                        prop_assert_eq!(o.x, spawn_x - speed);
                        let required = episode.spawner.required_gap(o.width);
                        prop_assert!(spawn_x - furthest > required);
                        max_id = o.id;
                    }
                }
            }
            prop_assert!(spawned <= 1);

            // Anything dropped must have left the screen
            for (id, prev) in &seen {
                if !episode.spawner.obstacles().iter().any(|o| o.id == *id) {
                    prop_assert!(prev.x - speed + prev.width < 0.0);
                }
            }
            seen = episode
                .spawner
                .obstacles()
                .iter()
                .map(|o| (o.id, Seen { x: o.x, width: o.width }))
                .collect();
        }
    }

    #[test]
    fn prop_player_stays_above_ground(jumps in prop::collection::vec(any::<bool>(), 1..400)) {
        let mut p = Player::new(1, 80.0, 350.0, 0, JumpKinematics::new(125.0, 0.7).unwrap());
        for jump in jumps {
            if jump {
                p.jump();
            }
            p.tick();
            prop_assert!(p.position.y <= p.ground_height);
            if p.on_ground() {
                prop_assert_eq!(p.velocity.y, 0.0);
                prop_assert_eq!(p.acceleration.y, 0.0);
            }
        }
    }
}

#[test]
fn test_identical_seeds_give_identical_frames() {
    let settings = GameSettings::default();
    let build = || {
        let mut episode = Episode::new(&settings, 1234).unwrap();
        episode.add_player(Box::new(Reflex));
        episode.add_player(Box::new(Idle));
        episode
    };
    let mut a = build();
    let mut b = build();
    let mut lane = AsciiLane::new(800.0, 40);

    while !a.is_finished() && a.time_ticks < 5_000 {
        a.step(&TickInput::default());
        b.step(&TickInput::default());
        let frame = a.view();
        assert_eq!(frame, b.view());
        lane.present(&frame);
    }
    assert_eq!(a.scores(), b.scores());
    assert!(lane.last_line.contains("score"));
}

#[test]
fn test_different_seeds_diverge() {
    let settings = GameSettings::default();
    let layout = |seed| {
        let mut episode = Episode::new(&settings, seed).unwrap();
        episode.add_player(Box::new(Pattern {
            jumps: vec![true],
            tick: 0,
        }));
        for _ in 0..2_000 {
            episode.step(&TickInput::default());
        }
        episode.spawner.obstacles().iter().map(|o| o.x).collect::<Vec<_>>()
    };
    assert_ne!(layout(1), layout(2));
}

#[test]
fn test_network_fitness_is_the_final_score() {
    let settings = GameSettings::default();
    let mut episode = Episode::new(&settings, 7).unwrap();
    let handle = FitnessHandle::new();

    // Output bias alone decides: this network never jumps
    let mut genome = Genome::zeroed(2);
    genome.set_output_bias(-10.0);
    episode.add_player(Box::new(NetworkController::new(genome.network(), handle.clone())));

    let scores = episode.run(50_000);
    assert!(episode.is_finished());
    assert_eq!(handle.get(), scores[0] as f64);
}

#[test]
fn test_short_training_run_saves_a_loadable_genome() {
    let config = EvolutionConfig {
        population_size: 8,
        generations: 2,
        max_episode_ticks: 1_000,
        ..Default::default()
    };
    let mut trainer = Trainer::new(config, GameSettings::default(), 3).unwrap();
    let mut reports = Vec::new();
    let summary = trainer.run(|r| reports.push(r.clone())).unwrap();
    assert_eq!(reports, summary.history);
    assert!(summary.best_fitness >= summary.history[0].best);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("best.json");
    summary.best_genome.save(&path).unwrap();
    assert_eq!(Genome::load(&path).unwrap(), summary.best_genome);
}
