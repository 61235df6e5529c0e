//! Configuration system for the savanna simulation.
//!
//! Supports YAML configuration files with sensible defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub world: WorldConfig,
    pub creatures: CreatureConfig,
    pub plants: PlantConfig,
    pub rewards: RewardConfig,
    pub logging: LoggingConfig,
}

/// World/field configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Field width in pixels
    pub width: f32,
    /// Field height in pixels
    pub height: f32,
    /// Number of creatures at start
    pub initial_creatures: usize,
    /// Number of plants at start
    pub initial_plants: usize,
    /// Margin from the field edge for plant/creature spawning
    pub spawn_margin: f32,
}

/// Creature economics and physics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatureConfig {
    /// Starting energy for root creatures
    pub initial_energy: f32,
    /// Energy drained per second while alive
    pub energy_drain: f32,
    /// Collision radius
    pub radius: f32,
    /// Turn rate in degrees per second
    pub turn_rate: f32,
    /// Minimum energy to reproduce
    pub reproduction_threshold: f32,
    /// Seconds between reproductions
    pub reproduction_cooldown: f32,
    /// Fraction of the initiating parent's energy given to the child
    pub child_energy_share: f32,
    /// Probability that a scanned candidate is accepted as partner
    pub partner_accept_chance: f32,
}

/// Plant configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantConfig {
    /// Collision radius
    pub radius: f32,
    /// Replenishment triggers when live plants drop below this floor
    pub replenish_floor: usize,
    /// Plants added per replenishment
    pub replenish_count: usize,
}

/// Reward shaping and interaction constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardConfig {
    /// Per-tick time penalty fed into every Q update
    pub time_penalty: f32,
    /// Energy gained from eating a plant
    pub plant_energy: f32,
    /// Reward for eating a plant
    pub plant_reward: f32,
    /// Energy gained from a kill
    pub prey_energy: f32,
    /// Reward for a kill
    pub prey_reward: f32,
    /// Base poison damage, scaled by (1 - resistance)
    pub poison_damage: f32,
    /// Base penalty on death by starvation
    pub starvation_penalty: f32,
    /// Base penalty on death by predation
    pub predation_penalty: f32,
    /// Penalty mitigation per offspring produced
    pub offspring_bonus: f32,
    /// Penalty mitigation per second survived
    pub lifetime_bonus: f32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Steps between stats snapshots
    pub stats_interval: u64,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            creatures: CreatureConfig::default(),
            plants: PlantConfig::default(),
            rewards: RewardConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            initial_creatures: 8,
            initial_plants: 30,
            spawn_margin: 50.0,
        }
    }
}

impl Default for CreatureConfig {
    fn default() -> Self {
        Self {
            initial_energy: 60.0,
            energy_drain: 0.4,
            radius: 15.0,
            turn_rate: 90.0,
            reproduction_threshold: 50.0,
            reproduction_cooldown: 5.0,
            child_energy_share: 0.6,
            partner_accept_chance: 0.2,
        }
    }
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            radius: 10.0,
            replenish_floor: 15,
            replenish_count: 5,
        }
    }
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            time_penalty: -0.002,
            plant_energy: 15.0,
            plant_reward: 5.0,
            prey_energy: 25.0,
            prey_reward: 10.0,
            poison_damage: 12.0,
            starvation_penalty: -10.0,
            predation_penalty: -40.0,
            offspring_bonus: 5.0,
            lifetime_bonus: 0.1,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            stats_interval: 60,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.world.width <= 0.0 || self.world.height <= 0.0 {
            return Err("field dimensions must be positive".to_string());
        }
        // creature spawning keeps twice the margin clear on each side
        if self.world.spawn_margin * 4.0 >= self.world.width.min(self.world.height) {
            return Err("spawn_margin leaves no room to spawn".to_string());
        }
        if self.world.initial_creatures == 0 {
            return Err("initial_creatures must be > 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.creatures.child_energy_share) {
            return Err("child_energy_share must be in [0, 1]".to_string());
        }
        if !(0.0..=1.0).contains(&self.creatures.partner_accept_chance) {
            return Err("partner_accept_chance must be in [0, 1]".to_string());
        }
        if self.plants.replenish_count == 0 && self.plants.replenish_floor > 0 {
            return Err("replenish_count must be > 0 when a floor is set".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let loaded: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config.world.width, loaded.world.width);
        assert_eq!(config.rewards.prey_energy, loaded.rewards.prey_energy);
    }

    #[test]
    fn test_invalid_margin_rejected() {
        let mut config = Config::default();
        config.world.spawn_margin = 400.0;
        assert!(config.validate().is_err());
    }
}
