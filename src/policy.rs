//! Per-creature tabular Q-learning policy.
//!
//! The observation space is 2 bits (food nearby, predator nearby) and the
//! action space has four entries, so the whole policy fits in a 4x4 table.
//! Each creature owns one table; offspring inherit a noisy average of both
//! parents' tables and then learn independently.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of observation states (2 bits: food near, predator near)
pub const NUM_STATES: usize = 4;
/// Number of actions (forward, turn left, turn right, no-op)
pub const NUM_ACTIONS: usize = 4;

/// Exploration rate for e-greedy selection
pub const EPSILON: f32 = 0.2;
/// Learning rate
pub const ALPHA: f32 = 0.1;
/// Discount factor
pub const GAMMA: f32 = 0.9;

/// Inherited table cells are clamped into this range
pub const INHERIT_CLAMP: f32 = 50.0;
/// Uniform noise added to each inherited cell
const INHERIT_NOISE: f32 = 0.1;

/// Tabular action-value store for one creature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QTable {
    /// Action values indexed by [state][action]
    pub q: [[f32; NUM_ACTIONS]; NUM_STATES],
    /// Exploration rate; a plain field so tests can pin it to 0 or 1
    pub epsilon: f32,
    /// Learning rate
    pub alpha: f32,
    /// Discount factor
    pub gamma: f32,
}

impl Default for QTable {
    fn default() -> Self {
        Self::new()
    }
}

impl QTable {
    /// Zero-initialized table with the standard hyperparameters
    pub fn new() -> Self {
        Self {
            q: [[0.0; NUM_ACTIONS]; NUM_STATES],
            epsilon: EPSILON,
            alpha: ALPHA,
            gamma: GAMMA,
        }
    }

    /// Derive a child table from two parents.
    ///
    /// Each cell is the parental mean plus uniform noise in [-0.1, 0.1],
    /// clamped to [-50, 50]: a head start biased toward parental experience
    /// without collapsing exploration diversity.
    pub fn inherit<R: Rng>(p1: &QTable, p2: &QTable, rng: &mut R) -> QTable {
        let mut child = QTable::new();
        for s in 0..NUM_STATES {
            for a in 0..NUM_ACTIONS {
                let mean = 0.5 * (p1.q[s][a] + p2.q[s][a]);
                let noisy = mean + rng.gen_range(-INHERIT_NOISE..INHERIT_NOISE);
                child.q[s][a] = noisy.clamp(-INHERIT_CLAMP, INHERIT_CLAMP);
            }
        }
        child
    }

    /// e-greedy action selection.
    ///
    /// Greedy ties resolve to the lowest action index.
    pub fn select_action<R: Rng>(&self, state: usize, rng: &mut R) -> usize {
        if rng.gen::<f32>() < self.epsilon {
            rng.gen_range(0..NUM_ACTIONS)
        } else {
            let row = &self.q[state];
            let mut best = 0;
            for a in 1..NUM_ACTIONS {
                if row[a] > row[best] {
                    best = a;
                }
            }
            best
        }
    }

    /// Highest action value available from `state`
    pub fn max_value(&self, state: usize) -> f32 {
        self.q[state]
            .iter()
            .fold(f32::NEG_INFINITY, |acc, &v| acc.max(v))
    }

    /// One-step Q-learning update.
    ///
    /// `state`/`action` are the pair recorded when the action was taken;
    /// `next_state` is freshly observed at delivery time.
    pub fn update(&mut self, state: usize, action: usize, reward: f32, next_state: usize) {
        let old = self.q[state][action];
        let target = reward + self.gamma * self.max_value(next_state);
        self.q[state][action] = old + self.alpha * (target - old);
    }

    /// Mean of all 16 cells; a rough learning-progress indicator
    pub fn mean(&self) -> f32 {
        let sum: f32 = self.q.iter().flatten().sum();
        sum / (NUM_STATES * NUM_ACTIONS) as f32
    }
}
