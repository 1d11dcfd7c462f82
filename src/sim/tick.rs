//! Fixed timestep simulation tick
//!
//! Advances an episode by exactly one tick. Observations and collisions are
//! taken from the start-of-tick state, then obstacles and players move.

use super::collision::first_collision;
use super::controller::Observation;
use super::state::{Episode, EpisodePhase};

/// Input sampled once per tick by the outer driver
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Stop the episode now (window closed, tick cap reached)
    pub cancel: bool,
}

/// Advance the episode by one fixed timestep
pub fn tick(episode: &mut Episode, input: &TickInput) -> EpisodePhase {
    if episode.phase == EpisodePhase::Finished {
        return EpisodePhase::Finished;
    }

    episode.time_ticks += 1;
    let now = episode.time_ticks;

    if input.cancel {
        finish(episode, "cancelled");
        return EpisodePhase::Finished;
    }

    // Collisions against the start-of-tick layout
    for (player, controller) in episode.players.iter_mut().zip(episode.controllers.iter_mut()) {
        if !player.alive {
            continue;
        }
        if let Some(obstacle_id) = first_collision(player, &episode.player_mask, &episode.spawner) {
            player.game_over(now, episode.score_divisor);
            controller.report_score(player.score);
            log::debug!(
                "Player {} hit obstacle #{} at tick {} (score {})",
                player.id,
                obstacle_id,
                now,
                player.score
            );
        }
    }

    if episode.alive_count() == 0 {
        finish(episode, "all players dead");
        return EpisodePhase::Finished;
    }

    // Decisions against the start-of-tick layout
    let observations: Vec<Observation> = episode.players.iter().map(|p| episode.observe(p)).collect();
    let decisions: Vec<bool> = episode
        .players
        .iter()
        .zip(observations)
        .zip(episode.controllers.iter_mut())
        .map(|((player, observation), controller)| player.alive && controller.decide(&observation))
        .collect();

    episode.spawner.generate();
    episode.spawner.advance();

    for (player, jump) in episode.players.iter_mut().zip(decisions) {
        if !player.alive {
            continue;
        }
        if jump {
            player.jump();
        }
        player.tick();
    }

    EpisodePhase::Running
}

/// Move to `Finished`, handing survivors their score so far
fn finish(episode: &mut Episode, reason: &str) {
    let now = episode.time_ticks;
    for (player, controller) in episode.players.iter().zip(episode.controllers.iter_mut()) {
        if player.alive {
            controller.report_score(player.score_at(now, episode.score_divisor));
        }
    }
    episode.phase = EpisodePhase::Finished;
    log::info!(
        "Episode {} finished at tick {} ({}), scores {:?}",
        episode.seed,
        now,
        reason,
        episode.scores()
    );
}

impl Episode {
    /// Advance one tick
    pub fn step(&mut self, input: &TickInput) -> EpisodePhase {
        tick(self, input)
    }

    /// Run headless until every player is dead or `max_ticks` have elapsed,
    /// returning the per-player scores in insertion order
    pub fn run(&mut self, max_ticks: u64) -> Vec<u64> {
        let start = self.time_ticks;
        while self.phase == EpisodePhase::Running {
            let input = TickInput {
                cancel: self.time_ticks - start >= max_ticks,
            };
            tick(self, &input);
        }
        self.scores()
    }
}
