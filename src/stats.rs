//! Statistics tracking for the simulation.
//!
//! `Stats` is the per-tick aggregate the presentation layer reads once per
//! frame; `StatsHistory` records snapshots on an interval and exports JSON.

use crate::entity::Entity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Aggregate snapshot of one simulation tick
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Stats {
    /// Ticks executed so far
    pub ticks: u64,
    /// Simulated seconds elapsed
    pub time: f32,
    /// Live creature count
    pub creatures: usize,
    /// Live plant count
    pub plants: usize,
    /// Maximum generation among live creatures
    pub generation_max: u32,
    /// Population mean of per-creature Q-table means; 0 with no creatures
    pub q_mean: f32,
    /// Mean energy across live creatures
    pub energy_mean: f32,
    /// Births this tick
    pub births: usize,
    /// Deaths this tick
    pub deaths: usize,
    /// Live creature count per derived species name
    pub species: HashMap<String, usize>,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute aggregates from the current entity arena
    pub fn update(&mut self, entities: &[Entity]) {
        self.creatures = 0;
        self.plants = 0;
        self.generation_max = 0;
        self.species.clear();

        let mut q_sum = 0.0f32;
        let mut energy_sum = 0.0f32;

        for entity in entities {
            match entity {
                Entity::Plant(p) if p.alive => self.plants += 1,
                Entity::Creature(c) if c.alive => {
                    self.creatures += 1;
                    q_sum += c.q_mean();
                    energy_sum += c.energy;
                    self.generation_max = self.generation_max.max(c.generation);
                    *self.species.entry(c.species_name()).or_insert(0) += 1;
                }
                _ => {}
            }
        }

        // defined neutral values when nobody is alive, never a division by zero
        if self.creatures == 0 {
            self.q_mean = 0.0;
            self.energy_mean = 0.0;
        } else {
            self.q_mean = q_sum / self.creatures as f32;
            self.energy_mean = energy_sum / self.creatures as f32;
        }
    }

    /// Format stats as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "T:{:8.1}s | Creatures:{:4} | Plants:{:4} | Gen:{:3} | AvgQ:{:7.3} | Energy:{:.0} | B/D: {}/{}",
            self.time,
            self.creatures,
            self.plants,
            self.generation_max,
            self.q_mean,
            self.energy_mean,
            self.births,
            self.deaths,
        )
    }

    /// Species histogram sorted by descending count, then name
    pub fn species_ranking(&self) -> Vec<(String, usize)> {
        let mut ranking: Vec<(String, usize)> = self
            .species
            .iter()
            .map(|(name, &count)| (name.clone(), count))
            .collect();
        ranking.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranking
    }

    /// Save stats to a JSON file
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }
}

/// Historical statistics tracker
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatsHistory {
    /// All recorded snapshots
    pub snapshots: Vec<Stats>,
    /// Recording interval in ticks
    pub interval: u64,
}

impl StatsHistory {
    pub fn new(interval: u64) -> Self {
        Self {
            snapshots: Vec::new(),
            interval,
        }
    }

    /// Record a stats snapshot
    pub fn record(&mut self, stats: Stats) {
        self.snapshots.push(stats);
    }

    /// Creature population over time
    pub fn population_series(&self) -> Vec<(u64, usize)> {
        self.snapshots.iter().map(|s| (s.ticks, s.creatures)).collect()
    }

    /// Mean Q value over time
    pub fn q_series(&self) -> Vec<(u64, f32)> {
        self.snapshots.iter().map(|s| (s.ticks, s.q_mean)).collect()
    }

    /// Maximum generation over time
    pub fn generation_series(&self) -> Vec<(u64, u32)> {
        self.snapshots
            .iter()
            .map(|s| (s.ticks, s.generation_max))
            .collect()
    }

    /// Save history to a JSON file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)
    }

    /// Load history from a JSON file
    pub fn load(path: &str) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
