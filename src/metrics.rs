use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Bounded-history training metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingMetrics {
    /// Critic loss values over time
    pub critic_losses: VecDeque<f32>,

    /// Actor loss values over time
    pub actor_losses: VecDeque<f32>,

    /// Rewards per episode
    pub episode_rewards: VecDeque<f32>,

    /// Episode lengths
    pub episode_lengths: VecDeque<usize>,

    /// Exploration coefficient over time
    pub explorations: VecDeque<f32>,
}

impl TrainingMetrics {
    pub fn new(history_size: usize) -> Self {
        TrainingMetrics {
            critic_losses: VecDeque::with_capacity(history_size),
            actor_losses: VecDeque::with_capacity(history_size),
            episode_rewards: VecDeque::with_capacity(history_size),
            episode_lengths: VecDeque::with_capacity(history_size),
            explorations: VecDeque::with_capacity(history_size),
        }
    }
}

/// Tracks metrics during training
pub struct MetricsTracker {
    metrics: TrainingMetrics,
    history_size: usize,

    // Episode tracking
    current_episode_reward: f32,
    current_episode_length: usize,
    episode_count: usize,
    total_steps: usize,
}

impl MetricsTracker {
    pub fn new(history_size: usize) -> Self {
        MetricsTracker {
            metrics: TrainingMetrics::new(history_size),
            history_size,
            current_episode_reward: 0.0,
            current_episode_length: 0,
            episode_count: 0,
            total_steps: 0,
        }
    }

    /// Record the losses of one learning burst
    pub fn record_losses(&mut self, critic_loss: f32, actor_loss: f32) {
        push_bounded(&mut self.metrics.critic_losses, critic_loss, self.history_size);
        push_bounded(&mut self.metrics.actor_losses, actor_loss, self.history_size);
    }

    /// Record the exploration coefficient
    pub fn record_exploration(&mut self, exploration: f32) {
        push_bounded(&mut self.metrics.explorations, exploration, self.history_size);
    }

    /// Start a new episode
    pub fn start_episode(&mut self) {
        self.current_episode_reward = 0.0;
        self.current_episode_length = 0;
    }

    /// Record a step within an episode
    pub fn step(&mut self, reward: f32) {
        self.current_episode_reward += reward;
        self.current_episode_length += 1;
        self.total_steps += 1;
    }

    /// End the current episode
    pub fn end_episode(&mut self) {
        push_bounded(
            &mut self.metrics.episode_rewards,
            self.current_episode_reward,
            self.history_size,
        );
        if self.metrics.episode_lengths.len() >= self.history_size {
            self.metrics.episode_lengths.pop_front();
        }
        self.metrics.episode_lengths.push_back(self.current_episode_length);
        self.episode_count += 1;
    }

    pub fn metrics(&self) -> &TrainingMetrics {
        &self.metrics
    }

    pub fn episode_count(&self) -> usize {
        self.episode_count
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    /// Recent average critic loss
    pub fn avg_critic_loss(&self, window: usize) -> Option<f32> {
        windowed_avg(&self.metrics.critic_losses, window)
    }

    /// Recent average actor loss
    pub fn avg_actor_loss(&self, window: usize) -> Option<f32> {
        windowed_avg(&self.metrics.actor_losses, window)
    }

    /// Recent average episode reward
    pub fn avg_episode_reward(&self, window: usize) -> Option<f32> {
        windowed_avg(&self.metrics.episode_rewards, window)
    }

    /// Save metrics to a JSON file
    pub fn save(&self, path: &str) -> crate::error::Result<()> {
        let serialized = serde_json::to_string_pretty(&self.metrics)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Load metrics from a JSON file
    pub fn load(&mut self, path: &str) -> crate::error::Result<()> {
        let data = std::fs::read_to_string(path)?;
        self.metrics = serde_json::from_str(&data)?;
        Ok(())
    }
}

impl Default for MetricsTracker {
    fn default() -> Self {
        Self::new(1000)
    }
}

fn push_bounded(series: &mut VecDeque<f32>, value: f32, limit: usize) {
    if series.len() >= limit {
        series.pop_front();
    }
    series.push_back(value);
}

fn windowed_avg(series: &VecDeque<f32>, window: usize) -> Option<f32> {
    if series.is_empty() {
        return None;
    }
    let n = window.min(series.len());
    let sum: f32 = series.iter().rev().take(n).sum();
    Some(sum / n as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_accounting() {
        let mut tracker = MetricsTracker::new(10);
        tracker.start_episode();
        tracker.step(1.0);
        tracker.step(2.0);
        tracker.end_episode();

        assert_eq!(tracker.episode_count(), 1);
        assert_eq!(tracker.total_steps(), 2);
        assert_eq!(tracker.avg_episode_reward(5), Some(3.0));
        assert_eq!(tracker.metrics().episode_lengths[0], 2);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut tracker = MetricsTracker::new(3);
        for i in 0..10 {
            tracker.record_losses(i as f32, 0.0);
        }
        assert_eq!(tracker.metrics().critic_losses.len(), 3);
        // Oldest entries evicted first
        assert_eq!(tracker.metrics().critic_losses[0], 7.0);
    }

    #[test]
    fn test_windowed_average() {
        let mut tracker = MetricsTracker::new(100);
        tracker.record_losses(1.0, -1.0);
        tracker.record_losses(3.0, -3.0);
        assert_eq!(tracker.avg_critic_loss(2), Some(2.0));
        assert_eq!(tracker.avg_actor_loss(1), Some(-3.0));
        assert_eq!(tracker.avg_critic_loss(10), Some(2.0));
    }
}
