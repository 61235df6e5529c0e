//! World simulation engine - main simulation loop.
//!
//! One tick executes strictly ordered phases over the entity arena: per-entity
//! update, interaction resolution, reproduction, pruning, replenishment,
//! stats. All structural mutation (inserts/removes) happens in dedicated
//! phases, never while a scan is in flight, and every random draw comes from
//! the single seeded RNG owned by the world.

use crate::config::Config;
use crate::entity::{blend_colors, distance_squared, Creature, Entity, Plant, SensedEntity, SensedKind};
use crate::genome::Genome;
use crate::policy::QTable;
use crate::stats::{Stats, StatsHistory};
use log::debug;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// The simulation world
pub struct World {
    /// Entity arena; the sole point of truth for who exists right now
    pub entities: Vec<Entity>,

    /// Simulated seconds elapsed
    pub time: f32,
    /// Ticks executed
    pub ticks: u64,
    /// Highest generation ever produced
    pub generation_max: u32,

    pub config: Config,

    pub stats: Stats,
    pub stats_history: StatsHistory,

    // Random number generator (seeded for reproducibility)
    rng: ChaCha8Rng,
    seed: u64,

    births_this_step: usize,
    deaths_this_step: usize,
}

impl World {
    /// Create a new world with the given configuration and a random seed
    pub fn new(config: Config) -> Self {
        let seed = rand::thread_rng().gen();
        Self::new_with_seed(config, seed)
    }

    /// Create a new world with a specific seed for reproducibility
    pub fn new_with_seed(config: Config, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut entities = Vec::new();

        // root creatures spawn away from the walls
        let cm = config.world.spawn_margin * 2.0;
        for _ in 0..config.world.initial_creatures {
            let genome = Genome::random(&mut rng);
            let x = rng.gen_range(cm..config.world.width - cm);
            let y = rng.gen_range(cm..config.world.height - cm);
            let color = [
                rng.gen_range(100..=255),
                rng.gen_range(100..=255),
                rng.gen_range(100..=255),
            ];
            let creature = Creature::new(genome, x, y, color, 0, &mut rng, &config);
            entities.push(Entity::Creature(creature));
        }

        let pm = config.world.spawn_margin;
        for _ in 0..config.world.initial_plants {
            let x = rng.gen_range(pm..config.world.width - pm);
            let y = rng.gen_range(pm..config.world.height - pm);
            entities.push(Entity::Plant(Plant::new(x, y, config.plants.radius)));
        }

        let stats_history = StatsHistory::new(config.logging.stats_interval);

        Self {
            entities,
            time: 0.0,
            ticks: 0,
            generation_max: 0,
            config,
            stats: Stats::new(),
            stats_history,
            rng,
            seed,
            births_this_step: 0,
            deaths_this_step: 0,
        }
    }

    /// Main simulation step; `dt` is the elapsed time in seconds
    pub fn step(&mut self, dt: f32) {
        self.births_this_step = 0;
        self.deaths_this_step = 0;

        // Phase 1: per-creature decision loops against a start-of-tick snapshot
        let view = self.snapshot();
        {
            let Self {
                entities,
                rng,
                config,
                ..
            } = self;
            for idx in 0..entities.len() {
                if let Entity::Creature(c) = &mut entities[idx] {
                    c.update(dt, idx, Some(&view), rng, config);
                }
            }
        }

        // Phase 2: interaction resolution against post-movement positions
        let view = self.snapshot();
        self.resolve_interactions(&view);

        // Phase 3: reproduction; children buffered and appended after the pass
        self.handle_reproduction();

        // Phase 4: remove dead entities
        self.remove_dead();

        // Phase 5: keep the food floor
        self.replenish_plants();

        // Phase 6: statistics
        self.time += dt;
        self.ticks += 1;
        self.update_stats();
    }

    /// Observation snapshot of all live entities, valid for this tick only
    fn snapshot(&self) -> Vec<SensedEntity> {
        self.entities
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_alive())
            .map(|(index, e)| {
                let (x, y) = e.position();
                let kind = match e {
                    Entity::Plant(_) => SensedKind::Plant,
                    Entity::Creature(c) => SensedKind::Creature {
                        attack: c.genome.attack,
                    },
                };
                SensedEntity { index, x, y, kind }
            })
            .collect()
    }

    /// Pairwise collision/predation/feeding resolution.
    ///
    /// Every live creature is tried as the aggressor against every other live
    /// entity, so one tick can realize multiple kills; dead entities are
    /// skipped on both sides.
    fn resolve_interactions(&mut self, view: &[SensedEntity]) {
        let Self {
            entities,
            rng,
            config,
            ..
        } = self;
        let n = entities.len();

        for i in 0..n {
            let (ax, ay, ar) = match &entities[i] {
                Entity::Creature(c) if c.alive => (c.x, c.y, c.radius),
                _ => continue,
            };

            for j in 0..n {
                if j == i || !entities[j].is_alive() {
                    continue;
                }

                let (jx, jy) = entities[j].position();
                let reach = ar + entities[j].radius();
                if distance_squared(ax, ay, jx, jy) >= reach * reach {
                    continue;
                }

                let (ei, ej) = pair_mut(entities, i, j);
                let Some(attacker) = ei.as_creature_mut() else {
                    continue;
                };

                match ej {
                    Entity::Plant(plant) => {
                        plant.on_eaten();
                        attacker.add_energy(config.rewards.plant_energy);
                        attacker.apply_reward(config.rewards.plant_reward, i, Some(view), rng);
                    }
                    Entity::Creature(defender) => {
                        // strictly higher attack wins; equal attack is a standoff
                        if attacker.genome.attack > defender.genome.attack {
                            defender.on_eaten(j, Some(view), rng, &config.rewards);
                            attacker.add_energy(config.rewards.prey_energy);
                            attacker.apply_reward(config.rewards.prey_reward, i, Some(view), rng);
                            if defender.genome.poison {
                                let dmg = config.rewards.poison_damage
                                    * (1.0 - attacker.genome.poison_resistance);
                                attacker.add_energy(-dmg);
                            }
                        }
                    }
                }
            }
        }
    }

    /// Reproduction pass: each eligible creature takes the first eligible
    /// partner passing the acceptance draw, or falls back to pairing with
    /// itself. Children go through the same crossover either way.
    fn handle_reproduction(&mut self) {
        let mut children = Vec::new();
        let n = self.entities.len();

        for i in 0..n {
            let eligible = self.entities[i]
                .as_creature()
                .map(|c| c.can_reproduce(&self.config))
                .unwrap_or(false);
            if !eligible {
                continue;
            }

            let mut partner = i; // self-pairing fallback
            for j in 0..n {
                if j == i {
                    continue;
                }
                let candidate = self.entities[j]
                    .as_creature()
                    .map(|c| c.can_reproduce(&self.config))
                    .unwrap_or(false);
                if candidate
                    && self.rng.gen::<f32>() < self.config.creatures.partner_accept_chance
                {
                    partner = j;
                    break;
                }
            }

            if let Some(child) = self.reproduce(i, partner) {
                self.generation_max = self.generation_max.max(child.generation);
                children.push(Entity::Creature(child));
                self.births_this_step += 1;
            }
        }

        if !children.is_empty() {
            debug!("tick {}: {} births", self.ticks, children.len());
        }
        self.entities.extend(children);
    }

    /// Produce a child from parents `i` and `j` (`i == j` is the asexual
    /// fallback). The initiating parent pays the energy cost; both parents
    /// get their cooldown reset and offspring counter bumped.
    fn reproduce(&mut self, i: usize, j: usize) -> Option<Creature> {
        let Self {
            entities,
            rng,
            config,
            ..
        } = self;

        let share = config.creatures.child_energy_share;
        let (genome, policy, color, generation, energy, x, y) = {
            let p1 = entities[i].as_creature()?;
            let p2 = entities[j].as_creature()?;
            (
                Genome::crossover_and_mutate(&p1.genome, &p2.genome, rng),
                QTable::inherit(&p1.policy, &p2.policy, rng),
                blend_colors(p1.color, p2.color, rng),
                p1.generation.max(p2.generation) + 1,
                p1.energy * share,
                p1.x,
                p1.y,
            )
        };

        let mut child = Creature::new(genome, x, y, color, generation, rng, config);
        child.energy = energy;
        child.policy = policy;

        let p1 = entities[i].as_creature_mut()?;
        p1.energy *= 1.0 - share;
        p1.offspring_count += 1;
        p1.reset_reproduction_cooldown(config);

        if j != i {
            let p2 = entities[j].as_creature_mut()?;
            p2.offspring_count += 1;
            p2.reset_reproduction_cooldown(config);
        }

        Some(child)
    }

    /// Remove dead entities
    fn remove_dead(&mut self) {
        let before = self.entities.len();
        self.entities.retain(|e| e.is_alive());
        self.deaths_this_step = before - self.entities.len();
    }

    /// Inject plants whenever the food population falls below the floor
    fn replenish_plants(&mut self) {
        let plants = self.plant_count();
        if plants < self.config.plants.replenish_floor {
            let m = self.config.world.spawn_margin;
            for _ in 0..self.config.plants.replenish_count {
                let x = self.rng.gen_range(m..self.config.world.width - m);
                let y = self.rng.gen_range(m..self.config.world.height - m);
                self.entities
                    .push(Entity::Plant(Plant::new(x, y, self.config.plants.radius)));
            }
            debug!(
                "tick {}: replenished plants {} -> {}",
                self.ticks,
                plants,
                plants + self.config.plants.replenish_count
            );
        }
    }

    /// Update statistics
    fn update_stats(&mut self) {
        self.stats.ticks = self.ticks;
        self.stats.time = self.time;
        self.stats.births = self.births_this_step;
        self.stats.deaths = self.deaths_this_step;
        self.stats.update(&self.entities);

        if self.ticks % self.config.logging.stats_interval == 0 {
            self.stats_history.record(self.stats.clone());
        }
    }

    /// Run the simulation for a number of ticks at a fixed timestep
    pub fn run(&mut self, ticks: u64, dt: f32) {
        for _ in 0..ticks {
            self.step(dt);
        }
    }

    /// Run with a per-tick callback for progress reporting
    pub fn run_with_callback<F>(&mut self, ticks: u64, dt: f32, mut callback: F)
    where
        F: FnMut(&World, u64),
    {
        for i in 0..ticks {
            self.step(dt);
            callback(self, i);
        }
    }

    /// Live creature count
    pub fn creature_count(&self) -> usize {
        self.entities
            .iter()
            .filter(|e| matches!(e, Entity::Creature(c) if c.alive))
            .count()
    }

    /// Live plant count
    pub fn plant_count(&self) -> usize {
        self.entities
            .iter()
            .filter(|e| matches!(e, Entity::Plant(p) if p.alive))
            .count()
    }

    /// Check if all creatures are gone
    pub fn is_extinct(&self) -> bool {
        self.creature_count() == 0
    }

    /// Get seed for reproducibility
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// Mutable references to two distinct arena slots
fn pair_mut(entities: &mut [Entity], i: usize, j: usize) -> (&mut Entity, &mut Entity) {
    debug_assert_ne!(i, j);
    if i < j {
        let (left, right) = entities.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = entities.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}
