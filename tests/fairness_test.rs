//! Jump-feasibility tests for the spawner gate.
//!
//! Any pair of obstacles the gate lets through must be clearable by some
//! sequence of jumps. These tests search for that sequence by replaying the
//! real episode with scripted jump ticks: first the earliest jump that
//! clears the leading obstacle, then any later jump that clears the next.

use dino_run::settings::{GameSettings, ObstacleKind};
use dino_run::sim::{Controller, Episode, EpisodePhase, Observation, ShapeSpec, TickInput};
use proptest::prelude::*;

/// Jumps on the listed decision ticks (1-based)
struct Script {
    jumps: Vec<u64>,
    tick: u64,
}

impl Script {
    fn new(jumps: &[u64]) -> Self {
        Self {
            jumps: jumps.to_vec(),
            tick: 0,
        }
    }
}

impl Controller for Script {
    fn decide(&mut self, _observation: &Observation) -> bool {
        self.tick += 1;
        self.jumps.contains(&self.tick)
    }
}

/// Run one player against obstacles of catalog entry `kinds[i]` placed at
/// `xs[i]`; true if the player is alive once every obstacle has passed
fn survives(settings: &GameSettings, layout: &[(f32, usize)], jumps: &[u64]) -> bool {
    let mut episode = Episode::new(settings, 0).unwrap();
    episode.add_player(Box::new(Script::new(jumps)));
    for &(x, kind) in layout {
        episode.spawner.place(x, kind);
    }
    let player_left = settings.player.x - settings.player.shape.width() as f32 / 2.0;

    for _ in 0..5_000 {
        let passed = episode
            .spawner
            .obstacles()
            .iter()
            .all(|o| o.right() + 1.0 < player_left);
        if passed {
            return episode.players[0].alive;
        }
        if episode.step(&TickInput::default()) == EpisodePhase::Finished {
            return false;
        }
    }
    false
}

/// Ticks until an obstacle at `x` has gone past the player
fn ticks_to_pass(settings: &GameSettings, x: f32) -> u64 {
    ((x - settings.player.x) / settings.spawner.speed).ceil() as u64 + 10
}

/// Place `first` so the gate admits `second` at the spawn point with
/// `slack` pixels to spare, then look for a surviving jump schedule
fn assert_pair_clearable(settings: &GameSettings, first: usize, second: usize, slack: f32) -> Result<(), TestCaseError> {
    let spawn_x = settings.spawner.spawn_x;
    let mut staged = Episode::new(settings, 0).unwrap();
    let width = settings.obstacles[second].shape.width() as f32;
    let x_first = spawn_x - staged.spawner.required_gap(width) - slack;

    staged.spawner.place(x_first, first);
    let (gap, required) = staged.spawner.gap_for(second);
    prop_assert!(gap > required, "gap {gap} should pass the gate ({required})");

    let first_jump = (1..=ticks_to_pass(settings, x_first)).find(|&j| survives(settings, &[(x_first, first)], &[j]));
    let Some(first_jump) = first_jump else {
        return Err(TestCaseError::fail(format!("no jump clears the obstacle at {x_first}")));
    };

    let layout = [(x_first, first), (spawn_x, second)];
    let second_jump =
        (first_jump + 1..=ticks_to_pass(settings, spawn_x)).find(|&j| survives(settings, &layout, &[first_jump, j]));
    prop_assert!(
        second_jump.is_some(),
        "gate admitted gap {gap} but no second jump after tick {first_jump} survives"
    );
    Ok(())
}

fn block_settings(jump_height: f32, gravity: f32, speed: f32, offset: f32, block: (u32, u32)) -> GameSettings {
    let mut settings = GameSettings::default();
    settings.player.jump_height = jump_height;
    settings.player.gravity = gravity;
    settings.player.shape = ShapeSpec::Rect {
        width: 20,
        height: 20,
    };
    settings.spawner.speed = speed;
    settings.spawner.min_gap_offset = offset;
    // Only the layouts placed by the test
    settings.spawner.spawn_skip_chance = 1.0;
    settings.obstacles = vec![ObstacleKind::new(
        "block",
        ShapeSpec::Rect {
            width: block.0,
            height: block.1,
        },
    )];
    settings
}

#[test]
fn test_default_catalog_pairs_are_clearable() {
    let mut settings = GameSettings::default();
    settings.spawner.spawn_skip_chance = 1.0;
    let kinds = settings.obstacles.len();
    for first in 0..kinds {
        for second in 0..kinds {
            assert_pair_clearable(&settings, first, second, 0.5).unwrap();
        }
    }
}

#[test]
fn test_single_obstacle_kills_a_player_that_never_jumps() {
    let settings = block_settings(125.0, 0.7, 5.0, 50.0, (20, 40));
    assert!(!survives(&settings, &[(400.0, 0)], &[]));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_gate_admitted_pairs_are_clearable(
        jump_height in 100.0f32..150.0,
        gravity in 0.4f32..0.9,
        speed in 4.0f32..6.0,
        offset in 50.0f32..80.0,
        block_width in 8u32..30,
        height_fraction in 0.1f32..0.4,
        slack in 0.5f32..5.0,
    ) {
        let block_height = ((jump_height * height_fraction) as u32).max(1);
        let settings = block_settings(jump_height, gravity, speed, offset, (block_width, block_height));
        assert_pair_clearable(&settings, 0, 0, slack)?;
    }
}
