//! Heritable traits and genetic operators.
//!
//! A genome is a fixed six-field trait vector, copied by value. Children are
//! produced by per-field crossover followed by per-field mutation, and every
//! field is clamped back into its documented range before the genome leaves
//! this module.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Allowed range for movement speed (pixels per second)
pub const SPEED_RANGE: (f32, f32) = (10.0, 200.0);
/// Allowed range for attack power
pub const ATTACK_RANGE: (f32, f32) = (0.0, 50.0);
/// Allowed range for sensing radius (pixels)
pub const SENSE_RANGE: (f32, f32) = (20.0, 300.0);
/// Allowed range for poison resistance
pub const RESISTANCE_RANGE: (f32, f32) = (0.0, 1.0);

// Per-field mutation odds and magnitudes; not themselves heritable.
const SPEED_MUTATION_CHANCE: f64 = 0.10;
const SPEED_MUTATION_STEP: f32 = 0.5;
const ATTACK_MUTATION_CHANCE: f64 = 0.10;
const ATTACK_MUTATION_STEP: f32 = 1.0;
const SENSE_MUTATION_CHANCE: f64 = 0.10;
const SENSE_MUTATION_STEP: f32 = 20.0;
const LEGS_MUTATION_CHANCE: f64 = 0.05;
const POISON_FLIP_CHANCE: f64 = 0.05;
const RESISTANCE_MUTATION_CHANCE: f64 = 0.10;
const RESISTANCE_MUTATION_STEP: f32 = 0.2;

/// The heritable trait vector of a creature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    /// Movement speed in pixels per second
    pub speed: f32,
    /// Attack power; decides predation outcomes
    pub attack: f32,
    /// Whether this creature poisons its predator when eaten
    pub poison: bool,
    /// Leg count, at least 1
    pub legs: u32,
    /// Sensing radius in pixels
    pub sense_range: f32,
    /// Poison resistance in [0, 1]; scales poison damage taken
    pub poison_resistance: f32,
}

impl Genome {
    /// Random genome for a root creature (generation 0)
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self {
            speed: rng.gen_range(30.0..70.0),
            attack: rng.gen_range(0.0..5.0),
            poison: rng.gen_bool(0.30),
            legs: rng.gen_range(1..=4),
            sense_range: rng.gen_range(50.0..150.0),
            poison_resistance: rng.gen_range(0.0..1.0),
        }
    }

    /// Produce a child genome from two parents.
    ///
    /// Each field is inherited from one parent by an unbiased coin flip (a
    /// per-field pick, not a blend), then independently mutated with its own
    /// probability, then clamped. Pure given the RNG stream.
    pub fn crossover_and_mutate<R: Rng>(a: &Genome, b: &Genome, rng: &mut R) -> Genome {
        let mut child = Genome {
            speed: if rng.gen_bool(0.5) { a.speed } else { b.speed },
            attack: if rng.gen_bool(0.5) { a.attack } else { b.attack },
            poison: if rng.gen_bool(0.5) { a.poison } else { b.poison },
            legs: if rng.gen_bool(0.5) { a.legs } else { b.legs },
            sense_range: if rng.gen_bool(0.5) { a.sense_range } else { b.sense_range },
            poison_resistance: if rng.gen_bool(0.5) {
                a.poison_resistance
            } else {
                b.poison_resistance
            },
        };

        if rng.gen_bool(SPEED_MUTATION_CHANCE) {
            child.speed += rng.gen_range(-SPEED_MUTATION_STEP..SPEED_MUTATION_STEP);
        }
        if rng.gen_bool(ATTACK_MUTATION_CHANCE) {
            child.attack += rng.gen_range(-ATTACK_MUTATION_STEP..ATTACK_MUTATION_STEP);
        }
        if rng.gen_bool(SENSE_MUTATION_CHANCE) {
            child.sense_range += rng.gen_range(-SENSE_MUTATION_STEP..SENSE_MUTATION_STEP);
        }
        if rng.gen_bool(LEGS_MUTATION_CHANCE) {
            // step of -1, 0 or +1, floored at one leg
            match rng.gen_range(0..3) {
                0 => child.legs = child.legs.saturating_sub(1).max(1),
                1 => {}
                _ => child.legs += 1,
            }
        }
        if rng.gen_bool(POISON_FLIP_CHANCE) {
            child.poison = !child.poison;
        }
        if rng.gen_bool(RESISTANCE_MUTATION_CHANCE) {
            child.poison_resistance +=
                rng.gen_range(-RESISTANCE_MUTATION_STEP..RESISTANCE_MUTATION_STEP);
        }

        child.clamp();
        child
    }

    /// Clamp every field back into its documented range
    pub fn clamp(&mut self) {
        self.speed = self.speed.clamp(SPEED_RANGE.0, SPEED_RANGE.1);
        self.attack = self.attack.clamp(ATTACK_RANGE.0, ATTACK_RANGE.1);
        self.sense_range = self.sense_range.clamp(SENSE_RANGE.0, SENSE_RANGE.1);
        self.poison_resistance = self
            .poison_resistance
            .clamp(RESISTANCE_RANGE.0, RESISTANCE_RANGE.1);
        if self.legs < 1 {
            self.legs = 1;
        }
    }

    /// True when every field lies inside its clamp range
    pub fn in_bounds(&self) -> bool {
        (SPEED_RANGE.0..=SPEED_RANGE.1).contains(&self.speed)
            && (ATTACK_RANGE.0..=ATTACK_RANGE.1).contains(&self.attack)
            && (SENSE_RANGE.0..=SENSE_RANGE.1).contains(&self.sense_range)
            && (RESISTANCE_RANGE.0..=RESISTANCE_RANGE.1).contains(&self.poison_resistance)
            && self.legs >= 1
    }

    /// Derived species name, computed deterministically from trait buckets.
    ///
    /// Format: `{speed}_{attack}_{poison}_Leg{n}_{resistance}`, e.g.
    /// `Slow_LowAtk_NonPois_Leg4_MidRes`.
    pub fn species_name(&self) -> String {
        let speed_cat = if self.speed < 60.0 {
            "Slow"
        } else if self.speed < 120.0 {
            "Mid"
        } else {
            "Fast"
        };

        let attack_cat = if self.attack < 10.0 {
            "LowAtk"
        } else if self.attack < 30.0 {
            "MedAtk"
        } else {
            "HighAtk"
        };

        let poison_cat = if self.poison { "Poison" } else { "NonPois" };

        let resist_cat = if self.poison_resistance < 0.33 {
            "LowRes"
        } else if self.poison_resistance < 0.66 {
            "MidRes"
        } else {
            "HighRes"
        };

        format!(
            "{}_{}_{}_Leg{}_{}",
            speed_cat, attack_cat, poison_cat, self.legs, resist_cat
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn extreme_parents() -> (Genome, Genome) {
        let a = Genome {
            speed: 10.0,
            attack: 0.0,
            poison: false,
            legs: 1,
            sense_range: 20.0,
            poison_resistance: 0.0,
        };
        let b = Genome {
            speed: 200.0,
            attack: 50.0,
            poison: true,
            legs: 8,
            sense_range: 300.0,
            poison_resistance: 1.0,
        };
        (a, b)
    }

    #[test]
    fn test_child_always_in_bounds() {
        let (a, b) = extreme_parents();
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..10_000 {
            let child = Genome::crossover_and_mutate(&a, &b, &mut rng);
            assert!(child.in_bounds(), "out-of-range child: {:?}", child);
        }
    }

    #[test]
    fn test_crossover_is_roughly_fair() {
        let (a, b) = extreme_parents();
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        // Speed mutation is at most +-0.5, so with parents at 10 and 200 a
        // child's speed unambiguously identifies which parent it came from.
        let trials = 4000;
        let mut from_a = 0;
        for _ in 0..trials {
            let child = Genome::crossover_and_mutate(&a, &b, &mut rng);
            if child.speed < 100.0 {
                from_a += 1;
            }
        }

        let share = from_a as f64 / trials as f64;
        assert!(
            (0.45..=0.55).contains(&share),
            "biased crossover: {} of {} from parent A",
            from_a,
            trials
        );
    }

    #[test]
    fn test_legs_never_below_one() {
        let one_leg = Genome {
            legs: 1,
            ..extreme_parents().0
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        for _ in 0..5000 {
            let child = Genome::crossover_and_mutate(&one_leg, &one_leg, &mut rng);
            assert!(child.legs >= 1);
        }
    }

    #[test]
    fn test_deterministic_given_seed() {
        let (a, b) = extreme_parents();

        let mut rng1 = ChaCha8Rng::seed_from_u64(99);
        let mut rng2 = ChaCha8Rng::seed_from_u64(99);

        for _ in 0..100 {
            let c1 = Genome::crossover_and_mutate(&a, &b, &mut rng1);
            let c2 = Genome::crossover_and_mutate(&a, &b, &mut rng2);
            assert_eq!(c1, c2);
        }
    }

    #[test]
    fn test_species_name_buckets() {
        let g = Genome {
            speed: 45.0,
            attack: 12.0,
            poison: true,
            legs: 3,
            sense_range: 100.0,
            poison_resistance: 0.9,
        };
        assert_eq!(g.species_name(), "Slow_MedAtk_Poison_Leg3_HighRes");

        let g = Genome {
            speed: 120.0,
            attack: 30.0,
            poison: false,
            legs: 1,
            sense_range: 100.0,
            poison_resistance: 0.5,
        };
        // boundaries are inclusive on the upper bucket
        assert_eq!(g.species_name(), "Fast_HighAtk_NonPois_Leg1_MidRes");
    }

    #[test]
    fn test_random_genome_in_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..1000 {
            let g = Genome::random(&mut rng);
            assert!(g.in_bounds());
            assert!((1..=4).contains(&g.legs));
        }
    }
}
