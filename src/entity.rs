//! Simulated entities: stationary plants and mobile creatures.
//!
//! `Entity` is a closed sum type so the interaction resolver can match
//! variants exhaustively instead of probing runtime types. Creatures carry a
//! genome and a Q-table and run the observe -> act -> learn loop every tick;
//! plants only exist to be eaten.

use crate::config::{Config, RewardConfig};
use crate::genome::Genome;
use crate::policy::QTable;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Probability of sensing food when no population view is available
const FOOD_FALLBACK_CHANCE: f64 = 0.08;
/// Probability of sensing a predator when no population view is available
const PREDATOR_FALLBACK_CHANCE: f64 = 0.05;

/// Default plant color
pub const PLANT_COLOR: [u8; 3] = [120, 200, 120];

/// Squared Euclidean distance between two points
#[inline]
pub fn distance_squared(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    let dx = ax - bx;
    let dy = ay - by;
    dx * dx + dy * dy
}

/// A simulated object on the field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Entity {
    Plant(Plant),
    Creature(Creature),
}

impl Entity {
    pub fn position(&self) -> (f32, f32) {
        match self {
            Entity::Plant(p) => (p.x, p.y),
            Entity::Creature(c) => (c.x, c.y),
        }
    }

    pub fn radius(&self) -> f32 {
        match self {
            Entity::Plant(p) => p.radius,
            Entity::Creature(c) => c.radius,
        }
    }

    pub fn is_alive(&self) -> bool {
        match self {
            Entity::Plant(p) => p.alive,
            Entity::Creature(c) => c.alive,
        }
    }

    /// Stable display color for the presentation layer
    pub fn color(&self) -> [u8; 3] {
        match self {
            Entity::Plant(p) => p.color,
            Entity::Creature(c) => c.color,
        }
    }

    pub fn as_creature(&self) -> Option<&Creature> {
        match self {
            Entity::Creature(c) => Some(c),
            Entity::Plant(_) => None,
        }
    }

    pub fn as_creature_mut(&mut self) -> Option<&mut Creature> {
        match self {
            Entity::Creature(c) => Some(c),
            Entity::Plant(_) => None,
        }
    }
}

/// A stationary food source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plant {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: [u8; 3],
    pub alive: bool,
}

impl Plant {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self {
            x,
            y,
            radius,
            color: PLANT_COLOR,
            alive: true,
        }
    }

    /// Consumed by a creature; the plant is inert afterwards
    pub fn on_eaten(&mut self) {
        self.alive = false;
    }
}

/// What an observing creature can tell about another entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensedKind {
    Plant,
    Creature { attack: f32 },
}

/// One entry of the per-tick observation snapshot.
///
/// The snapshot replaces a back-reference into the live population: it is
/// rebuilt by the world each phase and is only valid for the current tick.
#[derive(Debug, Clone, Copy)]
pub struct SensedEntity {
    /// Index of the entity in the population arena
    pub index: usize,
    pub x: f32,
    pub y: f32,
    pub kind: SensedKind,
}

/// A mobile organism with heritable traits and a learned movement policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Creature {
    pub genome: Genome,
    pub policy: QTable,
    /// Reproduction events in the ancestry chain; root creatures are 0
    pub generation: u32,
    pub x: f32,
    pub y: f32,
    /// Facing direction in degrees; bounces add 180 without normalizing
    pub direction: f32,
    pub color: [u8; 3],
    pub energy: f32,
    pub reproduction_cooldown: f32,
    /// Seconds survived so far
    pub lifetime: f32,
    pub offspring_count: u32,
    pub radius: f32,
    pub alive: bool,
    /// Observation state recorded when the last action was taken
    pub state: usize,
    /// Action taken last tick; updates resolve against this pair
    pub action: usize,
}

impl Creature {
    pub fn new<R: Rng>(
        genome: Genome,
        x: f32,
        y: f32,
        color: [u8; 3],
        generation: u32,
        rng: &mut R,
        config: &Config,
    ) -> Self {
        Self {
            genome,
            policy: QTable::new(),
            generation,
            x,
            y,
            direction: rng.gen_range(0.0..360.0),
            color,
            energy: config.creatures.initial_energy,
            reproduction_cooldown: 0.0,
            lifetime: 0.0,
            offspring_count: 0,
            radius: config.creatures.radius,
            alive: true,
            state: 0,
            action: 0,
        }
    }

    /// One tick of the decision loop: learn from the previous action, observe,
    /// select, act. `me` is this creature's index in the arena, used to skip
    /// itself in the snapshot.
    pub fn update<R: Rng>(
        &mut self,
        dt: f32,
        me: usize,
        view: Option<&[SensedEntity]>,
        rng: &mut R,
        config: &Config,
    ) {
        if !self.alive {
            return;
        }

        self.lifetime += dt;

        let reward = config.rewards.time_penalty;

        self.energy -= dt * config.creatures.energy_drain;
        if self.energy <= 0.0 {
            self.alive = false;
            // starvation: one final update combining the pending time penalty
            // with the death reward, then no further action this tick
            let final_reward = self.death_reward(config.rewards.starvation_penalty, &config.rewards);
            self.apply_reward(reward + final_reward, me, view, rng);
            return;
        }

        // settle the previous (state, action) pair first
        self.apply_reward(reward, me, view, rng);

        self.state = self.observe_state(me, view, rng);
        self.action = self.policy.select_action(self.state, rng);
        self.perform_action(self.action, dt, config);

        if self.reproduction_cooldown > 0.0 {
            self.reproduction_cooldown -= dt;
        }
    }

    /// Consumed by a stronger creature: terminal reward, then inert
    pub fn on_eaten<R: Rng>(
        &mut self,
        me: usize,
        view: Option<&[SensedEntity]>,
        rng: &mut R,
        rewards: &RewardConfig,
    ) {
        self.alive = false;
        let final_reward = self.death_reward(rewards.predation_penalty, rewards);
        self.apply_reward(final_reward, me, view, rng);
    }

    /// Death reward: base penalty mitigated by offspring produced and time
    /// survived, so dying with a legacy hurts the policy less
    fn death_reward(&self, base: f32, rewards: &RewardConfig) -> f32 {
        base + self.offspring_count as f32 * rewards.offspring_bonus
            + self.lifetime * rewards.lifetime_bonus
    }

    /// Deliver a reward into the Q update for the recorded (state, action)
    /// pair, bootstrapping off a freshly observed state.
    pub fn apply_reward<R: Rng>(
        &mut self,
        reward: f32,
        me: usize,
        view: Option<&[SensedEntity]>,
        rng: &mut R,
    ) {
        let next = self.observe_state(me, view, rng);
        self.policy.update(self.state, self.action, reward, next);
    }

    /// 2-bit observation: bit0 = food-class entity within sense range, bit1 =
    /// predator-class entity within sense range.
    ///
    /// Food class is a plant or a creature with strictly lower attack;
    /// predator class is a creature with strictly higher attack. Without a
    /// view (degraded mode) the bits are drawn from fixed probabilities.
    pub fn observe_state<R: Rng>(
        &self,
        me: usize,
        view: Option<&[SensedEntity]>,
        rng: &mut R,
    ) -> usize {
        let mut food_near = false;
        let mut predator_near = false;

        match view {
            None => {
                food_near = rng.gen_bool(FOOD_FALLBACK_CHANCE);
                predator_near = rng.gen_bool(PREDATOR_FALLBACK_CHANCE);
            }
            Some(entries) => {
                let sr2 = self.genome.sense_range * self.genome.sense_range;
                for e in entries {
                    if e.index == me {
                        continue;
                    }
                    if distance_squared(self.x, self.y, e.x, e.y) > sr2 {
                        continue;
                    }
                    match e.kind {
                        SensedKind::Plant => food_near = true,
                        SensedKind::Creature { attack } => {
                            if attack < self.genome.attack {
                                food_near = true;
                            } else if attack > self.genome.attack {
                                predator_near = true;
                            }
                        }
                    }
                    if food_near && predator_near {
                        break;
                    }
                }
            }
        }

        (food_near as usize) | ((predator_near as usize) << 1)
    }

    /// Execute one action: 0 forward, 1 turn left, 2 turn right, 3 no-op.
    /// Positions are clamped to the field and crossing a bound flips the
    /// facing by 180 degrees (a bounce, not a hard stop).
    fn perform_action(&mut self, action: usize, dt: f32, config: &Config) {
        match action {
            0 => {
                let rad = self.direction.to_radians();
                self.x += rad.cos() * self.genome.speed * dt;
                self.y += rad.sin() * self.genome.speed * dt;
            }
            1 => self.direction -= config.creatures.turn_rate * dt,
            2 => self.direction += config.creatures.turn_rate * dt,
            _ => {}
        }

        if self.x < 0.0 {
            self.x = 0.0;
            self.direction += 180.0;
        }
        if self.x > config.world.width {
            self.x = config.world.width;
            self.direction += 180.0;
        }
        if self.y < 0.0 {
            self.y = 0.0;
            self.direction += 180.0;
        }
        if self.y > config.world.height {
            self.y = config.world.height;
            self.direction += 180.0;
        }
    }

    pub fn add_energy(&mut self, amount: f32) {
        self.energy += amount;
    }

    /// Eligible to reproduce this tick
    pub fn can_reproduce(&self, config: &Config) -> bool {
        self.alive
            && self.energy > config.creatures.reproduction_threshold
            && self.reproduction_cooldown <= 0.0
    }

    pub fn reset_reproduction_cooldown(&mut self, config: &Config) {
        self.reproduction_cooldown = config.creatures.reproduction_cooldown;
    }

    /// Mean of all 16 Q cells; exposed as a learning-progress indicator
    pub fn q_mean(&self) -> f32 {
        self.policy.mean()
    }

    pub fn species_name(&self) -> String {
        self.genome.species_name()
    }
}

/// Child color: per-channel parental average plus small jitter
pub fn blend_colors<R: Rng>(c1: [u8; 3], c2: [u8; 3], rng: &mut R) -> [u8; 3] {
    let mut out = [0u8; 3];
    for i in 0..3 {
        let avg = (c1[i] as i32 + c2[i] as i32) / 2;
        let jitter = rng.gen_range(-5..=5);
        out[i] = (avg + jitter).clamp(0, 255) as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_creature(rng: &mut ChaCha8Rng, config: &Config) -> Creature {
        let genome = Genome {
            speed: 100.0,
            attack: 10.0,
            poison: false,
            legs: 2,
            sense_range: 100.0,
            poison_resistance: 0.5,
        };
        Creature::new(genome, 400.0, 300.0, [200, 100, 100], 0, rng, config)
    }

    #[test]
    fn test_boundary_bounce_clamps_and_flips() {
        let config = Config::default();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut c = test_creature(&mut rng, &config);
        c.x = 799.0;
        c.y = 300.0;
        c.direction = 0.0;
        c.genome.speed = 200.0;
        c.policy.epsilon = 0.0;
        c.policy.q[0][0] = 1.0; // keep "forward" the greedy pick after the time penalty lands

        c.update(1.0, 0, Some(&[]), &mut rng, &config);

        assert_eq!(c.x, 800.0);
        assert_eq!(c.direction, 180.0);
    }

    #[test]
    fn test_starvation_delivers_death_reward() {
        let config = Config::default();
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut c = test_creature(&mut rng, &config);
        c.energy = 0.3; // drained below zero by one 1-second tick

        c.update(1.0, 0, Some(&[]), &mut rng, &config);

        assert!(!c.alive);
        // lifetime is 1.0s at death; reward = -0.002 + (-10 + 0*5 + 0.1*1.0)
        let expected = 0.1 * (-0.002 + -10.0 + 0.1);
        assert!((c.policy.q[0][0] - expected).abs() < 1e-5);
    }

    #[test]
    fn test_dead_creature_is_inert() {
        let config = Config::default();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut c = test_creature(&mut rng, &config);
        c.alive = false;
        let (x, y, energy) = (c.x, c.y, c.energy);

        c.update(1.0, 0, Some(&[]), &mut rng, &config);

        assert_eq!((c.x, c.y, c.energy), (x, y, energy));
    }

    #[test]
    fn test_predation_death_reward_scales_with_legacy() {
        let config = Config::default();
        let mut rng = ChaCha8Rng::seed_from_u64(10);
        let mut c = test_creature(&mut rng, &config);
        c.offspring_count = 2;
        c.lifetime = 30.0;

        c.on_eaten(0, Some(&[]), &mut rng, &config.rewards);

        assert!(!c.alive);
        // -40 + 2*5 + 30*0.1 = -27, through one update on a zero table
        assert!((c.policy.q[0][0] - 0.1 * -27.0).abs() < 1e-4);
    }

    #[test]
    fn test_observation_classifies_neighbors() {
        let config = Config::default();
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let c = test_creature(&mut rng, &config);

        let plant_near = [SensedEntity {
            index: 1,
            x: 420.0,
            y: 300.0,
            kind: SensedKind::Plant,
        }];
        assert_eq!(c.observe_state(0, Some(&plant_near), &mut rng), 1);

        let predator_near = [SensedEntity {
            index: 1,
            x: 420.0,
            y: 300.0,
            kind: SensedKind::Creature { attack: 40.0 },
        }];
        assert_eq!(c.observe_state(0, Some(&predator_near), &mut rng), 2);

        let both = [
            SensedEntity {
                index: 1,
                x: 420.0,
                y: 300.0,
                kind: SensedKind::Plant,
            },
            SensedEntity {
                index: 2,
                x: 380.0,
                y: 300.0,
                kind: SensedKind::Creature { attack: 40.0 },
            },
        ];
        assert_eq!(c.observe_state(0, Some(&both), &mut rng), 3);

        // equal attack is neither food nor predator
        let peer = [SensedEntity {
            index: 1,
            x: 420.0,
            y: 300.0,
            kind: SensedKind::Creature { attack: 10.0 },
        }];
        assert_eq!(c.observe_state(0, Some(&peer), &mut rng), 0);
    }

    #[test]
    fn test_observation_respects_sense_range() {
        let config = Config::default();
        let mut rng = ChaCha8Rng::seed_from_u64(14);
        let c = test_creature(&mut rng, &config); // sense_range 100

        let far_plant = [SensedEntity {
            index: 1,
            x: 400.0 + 101.0,
            y: 300.0,
            kind: SensedKind::Plant,
        }];
        assert_eq!(c.observe_state(0, Some(&far_plant), &mut rng), 0);
    }

    #[test]
    fn test_observation_skips_self() {
        let config = Config::default();
        let mut rng = ChaCha8Rng::seed_from_u64(15);
        let c = test_creature(&mut rng, &config);

        // a weaker creature at our own index must be ignored
        let own_entry = [SensedEntity {
            index: 7,
            x: 400.0,
            y: 300.0,
            kind: SensedKind::Creature { attack: 0.0 },
        }];
        assert_eq!(c.observe_state(7, Some(&own_entry), &mut rng), 0);
    }

    #[test]
    fn test_fallback_observation_probabilities() {
        let config = Config::default();
        let mut rng = ChaCha8Rng::seed_from_u64(16);
        let c = test_creature(&mut rng, &config);

        let trials = 20_000;
        let mut food = 0;
        let mut predator = 0;
        for _ in 0..trials {
            let s = c.observe_state(0, None, &mut rng);
            if s & 1 != 0 {
                food += 1;
            }
            if s & 2 != 0 {
                predator += 1;
            }
        }

        let food_share = food as f64 / trials as f64;
        let predator_share = predator as f64 / trials as f64;
        assert!((0.06..=0.10).contains(&food_share), "food {}", food_share);
        assert!(
            (0.035..=0.065).contains(&predator_share),
            "predator {}",
            predator_share
        );
    }

    #[test]
    fn test_no_op_keeps_position_and_facing() {
        let config = Config::default();
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let mut c = test_creature(&mut rng, &config);
        c.policy.epsilon = 0.0;
        c.policy.q[0] = [0.0, 0.0, 0.0, 1.0]; // prefer the no-op
        let (x, y, dir) = (c.x, c.y, c.direction);

        c.update(0.016, 0, Some(&[]), &mut rng, &config);

        assert_eq!((c.x, c.y, c.direction), (x, y, dir));
    }

    #[test]
    fn test_cooldown_ticks_down() {
        let config = Config::default();
        let mut rng = ChaCha8Rng::seed_from_u64(18);
        let mut c = test_creature(&mut rng, &config);
        c.reproduction_cooldown = 1.0;

        c.update(0.25, 0, Some(&[]), &mut rng, &config);
        assert!((c.reproduction_cooldown - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_blend_colors_stays_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(19);
        for _ in 0..500 {
            let c = blend_colors([0, 128, 255], [255, 128, 0], &mut rng);
            // averages sit mid-range, jitter is +-5
            assert!((122..=133).contains(&c[0]));
            assert!((123..=133).contains(&c[1]));
            assert!((122..=133).contains(&c[2]));
        }
    }
}
