//! savanna - CLI entry point.
//!
//! Drives the headless simulation: run with a config file, generate a default
//! config, or benchmark the tick loop.

use clap::{Parser, Subcommand};
use savanna::{benchmark, Config, World, DEFAULT_DT};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "savanna")]
#[command(version)]
#[command(about = "Evolutionary ecosystem simulator with per-creature Q-learning")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Number of ticks to simulate
        #[arg(short, long, default_value = "36000")]
        ticks: u64,

        /// Simulated seconds per tick
        #[arg(long, default_value_t = DEFAULT_DT)]
        dt: f32,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Output path for the stats history JSON
        #[arg(short, long, default_value = "stats_history.json")]
        output: PathBuf,

        /// Quiet mode (no per-interval summaries)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Generate a default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },

    /// Run a performance benchmark
    Benchmark {
        /// Number of ticks
        #[arg(short, long, default_value = "10000")]
        ticks: u64,

        /// Initial creature count
        #[arg(short, long, default_value = "100")]
        creatures: usize,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            ticks,
            dt,
            seed,
            output,
            quiet,
        } => run_simulation(config, ticks, dt, seed, output, quiet),

        Commands::Init { output } => generate_config(output),

        Commands::Benchmark { ticks, creatures } => run_benchmark(ticks, creatures),
    }
}

fn run_simulation(
    config_path: PathBuf,
    ticks: u64,
    dt: f32,
    seed: Option<u64>,
    output: PathBuf,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = if config_path.exists() {
        println!("Loading config from: {:?}", config_path);
        Config::from_file(&config_path)?
    } else {
        println!("Using default configuration");
        Config::default()
    };

    let mut world = if let Some(s) = seed {
        println!("Using seed: {}", s);
        World::new_with_seed(config.clone(), s)
    } else {
        World::new(config.clone())
    };

    println!("Starting simulation");
    println!("  Field: {}x{}", config.world.width, config.world.height);
    println!("  Creatures: {}", world.creature_count());
    println!("  Plants: {}", world.plant_count());
    println!("  Ticks: {} at dt={:.4}s", ticks, dt);
    println!();

    let start = Instant::now();
    let stats_interval = config.logging.stats_interval;

    for i in 0..ticks {
        world.step(dt);

        if !quiet && i % stats_interval == 0 {
            println!("{}", world.stats.summary());
        }

        if world.is_extinct() {
            println!("\nAll creatures extinct at tick {}", world.ticks);
            break;
        }
    }

    let elapsed = start.elapsed();
    let ticks_per_sec = world.ticks as f64 / elapsed.as_secs_f64();

    println!();
    println!("=== Simulation Complete ===");
    println!("Wall time: {:.2}s", elapsed.as_secs_f64());
    println!("Simulated: {:.1}s over {} ticks", world.time, world.ticks);
    println!("Speed: {:.1} ticks/s", ticks_per_sec);
    println!("Creatures: {}", world.creature_count());
    println!("Plants: {}", world.plant_count());
    println!("Max generation: {}", world.generation_max);
    println!("Average Q: {:.3}", world.stats.q_mean);

    let ranking = world.stats.species_ranking();
    if !ranking.is_empty() {
        println!();
        println!("--- Species Count ---");
        for (name, count) in ranking {
            println!("{}: {}", name, count);
        }
    }

    world.stats_history.save(output.to_str().ok_or("bad output path")?)?;
    println!();
    println!("Stats history: {:?}", output);

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}

fn run_benchmark(ticks: u64, creatures: usize) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== savanna Benchmark ===");
    println!("Ticks: {}", ticks);
    println!("Creatures: {}", creatures);
    println!();

    let result = benchmark(ticks, creatures);
    println!("{}", result);

    Ok(())
}
