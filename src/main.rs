//! Dino Run entry point
//!
//! Three modes: play in the terminal, train a network headless, or list the
//! stored high scores.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use dino_run::highscores::{HighScores, ScoreStore, record_score};
use dino_run::neat::{EvolutionConfig, Genome, Trainer};
use dino_run::persistence::JsonScoreStore;
use dino_run::platform::FrameClock;
use dino_run::settings::GameSettings;
use dino_run::sim::{Controller, Episode, FitnessHandle, HumanInput, JumpSignal, NetworkController, TickInput};
use dino_run::view::{AsciiLane, FrameSink};

/// Characters used for the terminal lane
const LANE_COLUMNS: usize = 80;

#[derive(Parser, Debug)]
#[command(name = "dino-run")]
#[command(about = "Single-lane endless runner with a neuroevolution trainer")]
struct Cli {
    /// Game settings JSON (defaults are used when the file is absent)
    #[arg(long, default_value = "dino-run.json")]
    settings: PathBuf,
    /// High score table
    #[arg(long, default_value = "scores.json")]
    scores: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play in the terminal: Enter jumps, `q` or EOF quits
    Play {
        /// Run seed (random when omitted)
        #[arg(long)]
        seed: Option<u64>,
        /// Watch a trained genome instead of playing
        #[arg(long)]
        genome: Option<PathBuf>,
    },
    /// Evolve a jump network headless
    Train {
        /// Evolution config JSON
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = 1)]
        seed: u64,
        #[arg(long)]
        generations: Option<u32>,
        /// Where to write the best genome
        #[arg(long, default_value = "best-genome.json")]
        out: PathBuf,
    },
    /// Print the high score table
    Scores {
        /// Only show the top entries
        #[arg(long)]
        top: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let settings = GameSettings::load_or_default(&cli.settings)
        .with_context(|| format!("loading settings from {}", cli.settings.display()))?;

    match cli.command {
        Commands::Play { seed, genome } => play(&settings, &cli.scores, seed, genome.as_deref()),
        Commands::Train {
            config,
            seed,
            generations,
            out,
        } => train(settings, config.as_deref(), seed, generations, &out),
        Commands::Scores { top } => scores(&cli.scores, top),
    }
}

fn play(settings: &GameSettings, scores_path: &Path, seed: Option<u64>, genome: Option<&Path>) -> Result<()> {
    let seed = seed.unwrap_or_else(rand::random);
    let mut episode = Episode::new(settings, seed)?;
    log::info!("Starting episode with seed {seed}");

    let signal = JumpSignal::new();
    let controller: Box<dyn Controller> = match genome {
        Some(path) => {
            let genome = Genome::load(path).with_context(|| format!("loading genome {}", path.display()))?;
            Box::new(NetworkController::new(genome.network(), FitnessHandle::new()))
        }
        None => Box::new(HumanInput::new(signal.clone())),
    };
    episode.add_player(controller);
    let lines = spawn_input_reader();

    let mut lane = AsciiLane::new(settings.window.width as f32, LANE_COLUMNS);
    let mut clock = FrameClock::new(settings.window.fps);
    let mut stdout = io::stdout();
    let mut quit = false;

    while !episode.is_finished() {
        loop {
            match lines.try_recv() {
                Ok(line) if line.trim() == "q" => quit = true,
                Ok(_) => signal.press(),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    // A watched network keeps running without a terminal
                    quit |= genome.is_none();
                    break;
                }
            }
        }
        episode.step(&TickInput { cancel: quit });
        lane.present(&episode.view());
        write!(stdout, "\r{}", lane.last_line)?;
        stdout.flush()?;
        clock.wait();
    }
    writeln!(stdout)?;
    if clock.late_frames > 0 {
        log::debug!("{} frames ran late", clock.late_frames);
    }

    let score = episode.scores().first().copied().unwrap_or(0);
    println!("Game over! Score: {score}");
    // A quit still ends a human run that can be recorded
    if genome.is_some() {
        return Ok(());
    }

    let Some(name) = prompt_name(&lines, &mut stdout)? else {
        return Ok(());
    };

    match JsonScoreStore::open(scores_path) {
        Ok(mut store) => {
            record_score(Some(&mut store), &name, score);
        }
        Err(e) => {
            log::warn!("Score store unavailable: {e}");
            record_score(None, &name, score);
        }
    }
    Ok(())
}

/// Ask for a high-score name; `None` once the input has closed
fn prompt_name(lines: &Receiver<String>, out: &mut impl Write) -> Result<Option<String>> {
    write!(out, "Name for the high score table: ")?;
    out.flush()?;
    Ok(lines.recv().ok())
}

/// Forward stdin lines; the channel closes on EOF
fn spawn_input_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn train(
    settings: GameSettings,
    config_path: Option<&Path>,
    seed: u64,
    generations: Option<u32>,
    out: &Path,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => EvolutionConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => EvolutionConfig::default(),
    };
    if let Some(generations) = generations {
        config.generations = generations;
    }

    log::info!(
        "Training {} genomes for up to {} generations (seed {seed})",
        config.population_size,
        config.generations
    );
    let mut trainer = Trainer::new(config, settings, seed)?;
    let summary = trainer.run(|report| {
        println!(
            "gen {:>4}  best {:>6.0}  mean {:>8.2}  ticks {:>7}",
            report.generation, report.best, report.mean, report.ticks
        );
    })?;

    summary
        .best_genome
        .save(out)
        .with_context(|| format!("saving genome to {}", out.display()))?;
    println!("Best fitness {:.0}, genome written to {}", summary.best_fitness, out.display());
    Ok(())
}

fn scores(path: &Path, top: bool) -> Result<()> {
    let store = JsonScoreStore::open(path)?;
    let records = store.ranked()?;
    let records = if top {
        HighScores::from_records(records).entries
    } else {
        records
    };

    if records.is_empty() {
        println!("No scores yet");
        return Ok(());
    }
    for (i, record) in records.iter().enumerate() {
        println!("{:>3}. {:<25} {:>6}", i + 1, record.name, record.score);
    }
    Ok(())
}
