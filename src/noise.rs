//! Ornstein-Uhlenbeck exploration noise.

use ndarray::Array1;
use rand::prelude::*;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// A temporally correlated noise process for exploration in continuous
/// action spaces.
///
/// Each call to [`sample`](OrnsteinUhlenbeck::sample) integrates
/// `dx = theta * (mu - x) + sigma * N(0, 1)` per dimension and returns the
/// updated state. `theta` pulls the state back toward `mu`; `sigma` scales
/// the stochastic term.
#[derive(Serialize, Deserialize, Clone)]
pub struct OrnsteinUhlenbeck {
    mu: Array1<f32>,
    theta: f32,
    sigma: f32,
    state: Array1<f32>,
    #[serde(skip)]
    rng: ThreadRng,
}

impl OrnsteinUhlenbeck {
    /// Create a process over `size` dimensions with explicit parameters.
    pub fn new(size: usize, mu: f32, theta: f32, sigma: f32) -> Self {
        let mu = Array1::from_elem(size, mu);
        let state = mu.clone();
        OrnsteinUhlenbeck {
            mu,
            theta,
            sigma,
            state,
            rng: thread_rng(),
        }
    }

    /// Create a process with the standard parameters
    /// (`mu = 0`, `theta = 0.15`, `sigma = 0.2`).
    pub fn standard(size: usize) -> Self {
        Self::new(size, 0.0, 0.15, 0.2)
    }

    /// Reset the internal state to the mean.
    pub fn reset(&mut self) {
        self.state.assign(&self.mu);
    }

    /// Advance the process and return the new state as a noise sample.
    pub fn sample(&mut self) -> Array1<f32> {
        for i in 0..self.state.len() {
            let noise: f32 = self.rng.sample(StandardNormal);
            let dx = self.theta * (self.mu[i] - self.state[i]) + self.sigma * noise;
            self.state[i] += dx;
        }
        self.state.clone()
    }

    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    pub fn state(&self) -> &Array1<f32> {
        &self.state
    }

    pub fn sigma(&self) -> f32 {
        self.sigma
    }
}
