use ndarray::Array1;
use rand::seq::SliceRandom;
use rand::thread_rng;
use std::collections::VecDeque;

/// A single transition observed while interacting with the environment.
#[derive(Clone, Debug, PartialEq)]
pub struct Experience {
    pub state: Array1<f32>,
    pub action: Array1<f32>,
    pub reward: f32,
    pub next_state: Array1<f32>,
    pub done: bool,
}

/// Fixed-capacity buffer of past transitions, sampled uniformly to
/// decorrelate training updates. The oldest transition is evicted once
/// the buffer is full.
#[derive(Clone)]
pub struct ReplayBuffer {
    buffer: VecDeque<Experience>,
    capacity: usize,
}

impl ReplayBuffer {
    pub fn new(capacity: usize) -> Self {
        ReplayBuffer {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn add(&mut self, experience: Experience) {
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(experience);
    }

    /// Sample up to `batch_size` experiences uniformly without replacement.
    pub fn sample(&self, batch_size: usize) -> Vec<&Experience> {
        let mut rng = thread_rng();
        let mut indices = (0..self.buffer.len()).collect::<Vec<usize>>();
        indices.shuffle(&mut rng);
        indices.truncate(batch_size);
        indices.into_iter().map(|i| &self.buffer[i]).collect()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
