//! Epsilon-greedy value estimator over dishes.
//!
//! Each dish is an arm. Estimates are running means of the rewards applied to
//! that arm; selection explores uniformly with probability epsilon and
//! otherwise exploits the current best estimate.

use crate::archive::DishHistory;
use crate::error::{DemandError, Result};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

pub const DEFAULT_EPSILON: f64 = 0.2;
pub const DEFAULT_EPISODES: usize = 100;
pub const SNAPSHOT_VERSION: u32 = 1;

/// Seeded generator when `seed` is given, OS entropy otherwise.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Index of the largest value; ties go to the lowest index.
pub fn argmax_first(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

// ---------------------------------------------------------------------------
// EpsilonGreedy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct EpsilonGreedy<R> {
    epsilon: f64,
    q_values: Vec<f64>,
    counts: Vec<u64>,
    rng: R,
}

impl<R: Rng> EpsilonGreedy<R> {
    pub fn new(n_actions: usize, epsilon: f64, rng: R) -> Result<Self> {
        if !(0.0..=1.0).contains(&epsilon) {
            return Err(DemandError::InvalidEpsilon(epsilon));
        }
        if n_actions == 0 {
            return Err(DemandError::NoActions);
        }
        Ok(Self {
            epsilon,
            q_values: vec![0.0; n_actions],
            counts: vec![0; n_actions],
            rng,
        })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn q_values(&self) -> &[f64] {
        &self.q_values
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Uniform random arm with probability epsilon, greedy arm otherwise.
    pub fn select_action(&mut self) -> usize {
        if self.rng.gen::<f64>() < self.epsilon {
            return self.rng.gen_range(0..self.q_values.len());
        }
        self.greedy_action()
    }

    pub fn greedy_action(&self) -> usize {
        // new() guarantees at least one arm.
        argmax_first(&self.q_values).unwrap_or(0)
    }

    /// Fold `reward` into the running mean of `action`.
    pub fn update(&mut self, action: usize, reward: f64) -> Result<()> {
        let actions = self.q_values.len();
        let (Some(q), Some(n)) = (self.q_values.get_mut(action), self.counts.get_mut(action))
        else {
            return Err(DemandError::ActionOutOfRange {
                index: action,
                actions,
            });
        };
        *n += 1;
        *q += (reward - *q) / *n as f64;
        Ok(())
    }

    pub(crate) fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }
}

// ---------------------------------------------------------------------------
// Training
// ---------------------------------------------------------------------------

/// Where the reward for a selected dish comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardSignal {
    /// The dish's mean yield over the whole archive. Every pull of an arm
    /// returns the same value, so estimates converge to the known averages.
    #[default]
    DatasetMean,
    /// One historical observation of the dish, drawn uniformly per pull.
    Sampled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainedModel {
    pub dishes: Vec<String>,
    pub epsilon: f64,
    pub q_values: Vec<f64>,
    pub counts: Vec<u64>,
}

impl TrainedModel {
    pub fn best_action(&self) -> Option<BestAction> {
        let i = argmax_first(&self.q_values)?;
        Some(BestAction {
            dish: self.dishes[i].clone(),
            value: self.q_values[i],
        })
    }
}

pub fn train<R: Rng>(
    history: &DishHistory,
    epsilon: f64,
    episodes: usize,
    signal: RewardSignal,
    rng: R,
) -> Result<TrainedModel> {
    let mut agent = EpsilonGreedy::new(history.len(), epsilon, rng)?;

    for _ in 0..episodes {
        let action = agent.select_action();
        let reward = match signal {
            RewardSignal::DatasetMean => history.mean(action),
            RewardSignal::Sampled => {
                let obs = &history.observations[action];
                if obs.is_empty() {
                    0.0
                } else {
                    let pick = agent.rng_mut().gen_range(0..obs.len());
                    obs[pick]
                }
            }
        };
        agent.update(action, reward)?;
    }

    tracing::debug!(
        dishes = history.len(),
        episodes,
        ?signal,
        "bandit training finished"
    );

    Ok(TrainedModel {
        dishes: history.dishes.clone(),
        epsilon: agent.epsilon(),
        q_values: agent.q_values().to_vec(),
        counts: agent.counts().to_vec(),
    })
}

// ---------------------------------------------------------------------------
// Persisted forms
// ---------------------------------------------------------------------------

/// Versioned estimator state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub version: u32,
    pub q_values: Vec<f64>,
    pub counts: Vec<u64>,
    pub dishes: Vec<String>,
    pub epsilon: f64,
}

impl ModelSnapshot {
    pub fn from_model(model: &TrainedModel) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            q_values: model.q_values.clone(),
            counts: model.counts.clone(),
            dishes: model.dishes.clone(),
            epsilon: model.epsilon,
        }
    }

    pub fn from_json(data: &[u8]) -> Result<Self> {
        let snapshot: ModelSnapshot = serde_json::from_slice(data)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(DemandError::UnsupportedSnapshot(snapshot.version));
        }
        Ok(snapshot)
    }

    pub fn into_model(self) -> TrainedModel {
        TrainedModel {
            dishes: self.dishes,
            epsilon: self.epsilon,
            q_values: self.q_values,
            counts: self.counts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestAction {
    pub dish: String,
    pub value: f64,
}

/// Dashboard-facing training summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionSummary {
    pub trained_at: DateTime<Utc>,
    pub epsilon: f64,
    pub dishes: Vec<String>,
    #[serde(rename = "q_values")]
    pub q_values: Vec<f64>,
    pub counts: Vec<u64>,
    pub best_action: BestAction,
}

impl PredictionSummary {
    pub fn from_model(model: &TrainedModel, trained_at: DateTime<Utc>) -> Result<Self> {
        let best_action = model.best_action().ok_or(DemandError::NoActions)?;
        Ok(Self {
            trained_at,
            epsilon: model.epsilon,
            dishes: model.dishes.clone(),
            q_values: model.q_values.clone(),
            counts: model.counts.clone(),
            best_action,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
