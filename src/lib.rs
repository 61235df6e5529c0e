//! # savanna
//!
//! Evolutionary ecosystem simulator on a bounded 2D field. Mobile creatures
//! carry a six-field genome evolved through crossover and mutation, plus a
//! per-individual tabular Q-learning policy (4 observation states, 4 actions)
//! that governs movement. Stationary plants are the food floor. One shared
//! per-tick loop drives the decision loops, predation, reproduction and
//! population replenishment.
//!
//! ## Quick start
//!
//! ```rust
//! use savanna::{Config, World};
//!
//! let config = Config::default();
//! let mut world = World::new_with_seed(config, 42);
//!
//! // one minute of simulated time at 60 ticks per second
//! world.run(3600, 1.0 / 60.0);
//!
//! println!("Creatures: {}", world.creature_count());
//! println!("Max generation: {}", world.generation_max);
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use savanna::Config;
//!
//! let mut config = Config::default();
//! config.world.initial_creatures = 20;
//! config.plants.replenish_floor = 25;
//! assert!(config.validate().is_ok());
//! ```

pub mod config;
pub mod entity;
pub mod genome;
pub mod policy;
pub mod stats;
pub mod world;

// Re-export main types
pub use config::Config;
pub use entity::{Creature, Entity, Plant};
pub use genome::Genome;
pub use policy::QTable;
pub use world::World;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fixed timestep used by the CLI driver (60 ticks per simulated second)
pub const DEFAULT_DT: f32 = 1.0 / 60.0;

/// Run a quick benchmark
pub fn benchmark(ticks: u64, creatures: usize) -> BenchmarkResult {
    use std::time::Instant;

    let mut config = Config::default();
    config.world.initial_creatures = creatures;

    let mut world = World::new(config);

    let start = Instant::now();
    world.run(ticks, DEFAULT_DT);
    let elapsed = start.elapsed();

    BenchmarkResult {
        ticks,
        initial_creatures: creatures,
        final_creatures: world.creature_count(),
        elapsed_secs: elapsed.as_secs_f64(),
        ticks_per_second: ticks as f64 / elapsed.as_secs_f64(),
        max_generation: world.generation_max,
    }
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub ticks: u64,
    pub initial_creatures: usize,
    pub final_creatures: usize,
    pub elapsed_secs: f64,
    pub ticks_per_second: f64,
    pub max_generation: u32,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Ticks: {}", self.ticks)?;
        writeln!(
            f,
            "Creatures: {} -> {}",
            self.initial_creatures, self.final_creatures
        )?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.1} ticks/s", self.ticks_per_second)?;
        writeln!(f, "Max generation: {}", self.max_generation)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_quick_simulation() {
        let config = Config::default();
        let mut world = World::new_with_seed(config, 1);

        world.run(100, DEFAULT_DT);

        assert_eq!(world.ticks, 100);
    }

    #[test]
    fn test_benchmark() {
        let result = benchmark(100, 10);

        assert_eq!(result.ticks, 100);
        assert!(result.ticks_per_second > 0.0);
    }
}
