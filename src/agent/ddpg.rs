use log::{debug, info};
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::activations::Activation;
use crate::error::{Result, TalosError};
use crate::init::WeightInit;
use crate::network::NeuralNetwork;
use crate::noise::OrnsteinUhlenbeck;
use crate::optimizer::{GradientClipper, OptimizerWrapper};
use crate::replay_buffer::{Experience, ReplayBuffer};

/// Hyperparameters for a [`DdpgAgent`].
///
/// The defaults reproduce the usual DDPG settings: a 10k-transition
/// buffer, batches of 512, learning every 4 observed steps with 2
/// consecutive update iterations, Polyak `tau` of 1e-3 and the
/// 1e-4 / 1e-3 actor/critic learning-rate split.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DdpgConfig {
    /// Hidden layer widths shared by actor and critic
    pub hidden_sizes: Vec<usize>,
    /// Replay buffer capacity
    pub buffer_size: usize,
    /// Batch size for each learning iteration
    pub batch_size: usize,
    /// Minimum stored transitions before learning starts
    pub min_required_experience: usize,
    /// Observed steps between learning triggers
    pub learn_every: usize,
    /// Update iterations per learning trigger
    pub consecutive_learn_iterations: usize,
    /// Actor learning rate
    pub actor_lr: f32,
    /// Critic learning rate
    pub critic_lr: f32,
    /// L2 weight decay applied to the critic's gradients
    pub weight_decay: f32,
    /// Soft update coefficient
    pub tau: f32,
    /// Discount factor
    pub gamma: f32,
    /// Action bounds
    pub action_low: f32,
    pub action_high: f32,
    /// Exploration coefficient decay per learning trigger
    pub exploration_decay: f32,
    /// Exploration coefficient decay per update iteration
    pub exploration_step_decay: f32,
    /// Global gradient norm ceiling for actor and critic updates
    pub max_grad_norm: f32,
    /// Ornstein-Uhlenbeck noise parameters
    pub ou_mu: f32,
    pub ou_theta: f32,
    pub ou_sigma: f32,
}

impl Default for DdpgConfig {
    fn default() -> Self {
        DdpgConfig {
            hidden_sizes: vec![256, 256],
            buffer_size: 10_000,
            batch_size: 512,
            min_required_experience: 200,
            learn_every: 4,
            consecutive_learn_iterations: 2,
            actor_lr: 1e-4,
            critic_lr: 1e-3,
            weight_decay: 1e-4,
            tau: 1e-3,
            gamma: 0.99,
            action_low: -1.0,
            action_high: 1.0,
            exploration_decay: 0.975,
            exploration_step_decay: 0.999,
            max_grad_norm: 1.0,
            ou_mu: 0.0,
            ou_theta: 0.15,
            ou_sigma: 0.2,
        }
    }
}

impl DdpgConfig {
    /// Load a config from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: DdpgConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config to a JSON file.
    pub fn to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(TalosError::invalid_parameter(
                "batch_size",
                "must be greater than 0",
            ));
        }
        if self.buffer_size < self.batch_size {
            return Err(TalosError::invalid_parameter(
                "buffer_size",
                "must be at least batch_size",
            ));
        }
        if self.learn_every == 0 {
            return Err(TalosError::invalid_parameter(
                "learn_every",
                "must be greater than 0",
            ));
        }
        if self.consecutive_learn_iterations == 0 {
            return Err(TalosError::invalid_parameter(
                "consecutive_learn_iterations",
                "must be greater than 0",
            ));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(TalosError::invalid_parameter(
                "gamma",
                "must lie in [0, 1]",
            ));
        }
        if !(self.tau > 0.0 && self.tau <= 1.0) {
            return Err(TalosError::invalid_parameter(
                "tau",
                "must lie in (0, 1]",
            ));
        }
        if self.action_high <= self.action_low {
            return Err(TalosError::invalid_parameter(
                "action_high",
                "must exceed action_low",
            ));
        }
        Ok(())
    }
}

/// Deep Deterministic Policy Gradient agent for continuous action spaces.
///
/// Holds an actor (deterministic policy), a critic (Q-function), target
/// copies of both, an Ornstein-Uhlenbeck noise process and a replay
/// buffer. Interaction follows the observe/trigger pattern: every stored
/// transition advances a step counter, and once `learn_every` steps have
/// accumulated the next [`trigger_learn`](DdpgAgent::trigger_learn) runs
/// a burst of update iterations.
///
/// Serialized checkpoints capture all four networks together with their
/// optimizer state and the hyperparameters; replay memory is not
/// persisted.
#[derive(Serialize, Deserialize)]
pub struct DdpgAgent {
    /// Agent name, used to stamp checkpoint files
    pub name: String,
    /// Actor network (deterministic policy)
    pub actor: NeuralNetwork,
    /// Actor target network
    pub actor_target: NeuralNetwork,
    /// Critic network (Q-function over concatenated state and action)
    pub critic: NeuralNetwork,
    /// Critic target network
    pub critic_target: NeuralNetwork,
    /// Hyperparameters
    pub config: DdpgConfig,
    /// Exploration noise process
    pub noise: OrnsteinUhlenbeck,
    #[serde(skip, default = "placeholder_memory")]
    memory: ReplayBuffer,
    clipper: GradientClipper,
    exploration: f32,
    step_count: usize,
    learn_pending: bool,
}

fn placeholder_memory() -> ReplayBuffer {
    // Replaced with a correctly sized buffer in `load`
    ReplayBuffer::new(1)
}

impl DdpgAgent {
    /// Create a new agent for the given state and action dimensions.
    pub fn new(
        name: impl Into<String>,
        state_size: usize,
        action_size: usize,
        config: DdpgConfig,
        optimizer: OptimizerWrapper,
    ) -> Result<Self> {
        config.validate()?;
        if state_size == 0 {
            return Err(TalosError::invalid_parameter("state_size", "must be greater than 0"));
        }
        if action_size == 0 {
            return Err(TalosError::invalid_parameter("action_size", "must be greater than 0"));
        }

        // Actor: state -> hidden (ReLU) -> action (Tanh). Hidden layers use
        // fan-in initialization, the output layer starts near zero so early
        // actions stay close to the center of the action range.
        let mut actor_sizes = vec![state_size];
        actor_sizes.extend_from_slice(&config.hidden_sizes);
        actor_sizes.push(action_size);

        let actor_activations = vec![Activation::Relu; config.hidden_sizes.len()]
            .into_iter()
            .chain(std::iter::once(Activation::Tanh))
            .collect::<Vec<_>>();

        let mut inits = vec![WeightInit::FanInUniform; config.hidden_sizes.len()];
        inits.push(WeightInit::Uniform { min: -3e-3, max: 3e-3 });

        let actor = NeuralNetwork::new_with_init(
            &actor_sizes,
            &actor_activations,
            &inits,
            optimizer.clone(),
        );
        let actor_target = actor.clone();

        // Critic: concatenated state and action -> hidden (ReLU) -> scalar Q (Linear)
        let mut critic_sizes = vec![state_size + action_size];
        critic_sizes.extend_from_slice(&config.hidden_sizes);
        critic_sizes.push(1);

        let critic_activations = vec![Activation::Relu; config.hidden_sizes.len()]
            .into_iter()
            .chain(std::iter::once(Activation::Linear))
            .collect::<Vec<_>>();

        let critic = NeuralNetwork::new_with_init(
            &critic_sizes,
            &critic_activations,
            &inits,
            optimizer,
        );
        let critic_target = critic.clone();

        let noise = OrnsteinUhlenbeck::new(action_size, config.ou_mu, config.ou_theta, config.ou_sigma);
        let memory = ReplayBuffer::new(config.buffer_size);
        let clipper = GradientClipper::ClipByGlobalNorm {
            max_norm: config.max_grad_norm,
        };

        Ok(DdpgAgent {
            name: name.into(),
            actor,
            actor_target,
            critic,
            critic_target,
            config,
            noise,
            memory,
            clipper,
            exploration: 1.0,
            step_count: 0,
            learn_pending: false,
        })
    }

    pub fn state_size(&self) -> usize {
        self.actor.input_size()
    }

    pub fn action_size(&self) -> usize {
        self.actor.output_size()
    }

    /// Current exploration coefficient scaling the noise process.
    pub fn exploration(&self) -> f32 {
        self.exploration
    }

    pub fn set_exploration(&mut self, exploration: f32) {
        self.exploration = exploration.clamp(0.0, 1.0);
    }

    /// Number of transitions currently held in replay memory.
    pub fn memory_len(&self) -> usize {
        self.memory.len()
    }

    /// Select an action for `state` under the current policy.
    ///
    /// With `add_noise`, a sample of the noise process scaled by the
    /// exploration coefficient perturbs the action. The result is always
    /// clamped into `[action_low, action_high]`.
    pub fn act(&mut self, state: ArrayView1<f32>, add_noise: bool) -> Result<Array1<f32>> {
        if state.len() != self.state_size() {
            return Err(TalosError::dimension_mismatch(
                format!("state of length {}", self.state_size()),
                format!("length {}", state.len()),
            ));
        }

        let raw = self.actor.forward(state);
        let mut action = self.scale_action(raw);

        if add_noise {
            let noise = self.noise.sample();
            let scale = self.exploration * self.half_range();
            for i in 0..action.len() {
                action[i] += noise[i] * scale;
            }
        }

        let (low, high) = (self.config.action_low, self.config.action_high);
        action.mapv_inplace(|a| a.clamp(low, high));
        Ok(action)
    }

    /// Store a transition and advance the learning gate.
    pub fn observe(
        &mut self,
        state: Array1<f32>,
        action: Array1<f32>,
        reward: f32,
        next_state: Array1<f32>,
        done: bool,
    ) {
        self.memory.add(Experience {
            state,
            action,
            reward,
            next_state,
            done,
        });
        self.step_count += 1;
        if self.step_count % self.config.learn_every == 0 {
            self.learn_pending = true;
        }
    }

    /// Run a burst of update iterations if one is due and enough
    /// experience has accumulated.
    ///
    /// Returns the mean `(critic_loss, actor_loss)` over the burst, or
    /// `None` when nothing was learned.
    pub fn trigger_learn(&mut self) -> Result<Option<(f32, f32)>> {
        if !self.learn_pending {
            return Ok(None);
        }
        self.learn_pending = false;
        self.exploration *= self.config.exploration_decay;

        let required = self.config.batch_size.max(self.config.min_required_experience);
        if self.memory.len() < required {
            return Ok(None);
        }

        let iterations = self.config.consecutive_learn_iterations;
        let mut critic_loss = 0.0;
        let mut actor_loss = 0.0;
        for _ in 0..iterations {
            let (c, a) = self.learn()?;
            critic_loss += c;
            actor_loss += a;
        }
        critic_loss /= iterations as f32;
        actor_loss /= iterations as f32;

        debug!(
            "{}: learned for {} iterations, critic_loss={:.6} actor_loss={:.6} exploration={:.4}",
            self.name, iterations, critic_loss, actor_loss, self.exploration
        );
        Ok(Some((critic_loss, actor_loss)))
    }

    /// One DDPG update iteration on a sampled batch.
    ///
    /// Critic: minimize the TD error against
    /// `y = r + γ·(1 − done)·Q'(s', μ'(s'))`.
    /// Actor: ascend `Q(s, μ(s))` by backpropagating through the critic.
    /// Both targets are then soft-updated with `tau`.
    pub fn learn(&mut self) -> Result<(f32, f32)> {
        self.exploration *= self.config.exploration_step_decay;

        let batch = self.memory.sample(self.config.batch_size);
        if batch.is_empty() {
            return Err(TalosError::EmptyBuffer("no experiences to learn from".to_string()));
        }

        let batch_size = batch.len();
        let states = stack_batch(batch.iter().map(|e| e.state.view()).collect());
        let actions = stack_batch(batch.iter().map(|e| e.action.view()).collect());
        let next_states = stack_batch(batch.iter().map(|e| e.next_state.view()).collect());
        let rewards = batch.iter().map(|e| e.reward).collect::<Vec<_>>();
        let dones = batch.iter().map(|e| e.done).collect::<Vec<_>>();

        // Bootstrap targets from the target networks
        let next_actions_raw = self.actor_target.forward_batch(next_states.view());
        let next_actions = self.scale_action_batch(next_actions_raw);
        let target_inputs = concat_columns(next_states.view(), next_actions.view());
        let q_next = self.critic_target.forward_batch(target_inputs.view());

        let mut q_targets = Array2::zeros((batch_size, 1));
        for i in 0..batch_size {
            let not_done = if dones[i] { 0.0 } else { 1.0 };
            q_targets[[i, 0]] = rewards[i] + self.config.gamma * q_next[[i, 0]] * not_done;
        }

        // Critic update
        let critic_inputs = concat_columns(states.view(), actions.view());
        let q_predicted = self.critic.forward_batch(critic_inputs.view());
        let diff = &q_predicted - &q_targets;
        let critic_loss = diff.mapv(|x| x * x).mean().unwrap_or(f32::INFINITY);

        let output_errors = diff * (2.0 / batch_size as f32);
        let (mut critic_grads, _) = self.critic.backward_batch(output_errors.view());
        if self.config.weight_decay > 0.0 {
            for (layer, grads) in self.critic.layers.iter().zip(critic_grads.iter_mut()) {
                grads.weights = &grads.weights + &(&layer.weights * self.config.weight_decay);
                grads.biases = &grads.biases + &(&layer.biases * self.config.weight_decay);
            }
        }
        self.clipper.clip(&mut critic_grads);
        self.critic.apply_gradients(&critic_grads, self.config.critic_lr);

        // Actor update: dQ/da flows out of the critic's input error
        let actions_pred_raw = self.actor.forward_batch(states.view());
        let actions_pred = self.scale_action_batch(actions_pred_raw);
        let actor_inputs = concat_columns(states.view(), actions_pred.view());
        let q_values = self.critic.forward_batch(actor_inputs.view());
        let actor_loss = -q_values.mean().unwrap_or(f32::INFINITY);

        let q_grad = Array2::from_elem((batch_size, 1), -1.0 / batch_size as f32);
        let (_, critic_input_errors) = self.critic.backward_batch(q_grad.view());
        let state_size = self.state_size();
        let action_errors =
            critic_input_errors.slice(s![.., state_size..]).to_owned() * self.half_range();

        let (mut actor_grads, _) = self.actor.backward_batch(action_errors.view());
        self.clipper.clip(&mut actor_grads);
        self.actor.apply_gradients(&actor_grads, self.config.actor_lr);

        // Soft-update targets
        self.critic_target.soft_update_from(&self.critic, self.config.tau);
        self.actor_target.soft_update_from(&self.actor, self.config.tau);

        Ok((critic_loss, actor_loss))
    }

    /// Reset the noise process and the learning gate between episodes.
    pub fn reset(&mut self) {
        self.noise.reset();
        self.step_count = 0;
        self.learn_pending = false;
    }

    /// Save the agent to disk.
    pub fn save(&self, path: &str) -> Result<()> {
        let serialized = bincode::serialize(self)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Load an agent from disk. Replay memory starts empty.
    pub fn load(path: &str) -> Result<Self> {
        let data = std::fs::read(path)?;
        let mut agent: Self = bincode::deserialize(&data)?;
        agent.memory = ReplayBuffer::new(agent.config.buffer_size);
        Ok(agent)
    }

    /// Write an episode-stamped checkpoint `{name}_episode_{episode}.bin`
    /// into `dir`, creating the directory if needed. Returns the path.
    pub fn save_checkpoint(&self, dir: &Path, episode: usize) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}_episode_{}.bin", self.name, episode));
        let serialized = bincode::serialize(self)?;
        std::fs::write(&path, serialized)?;
        info!("{}: checkpoint written to {}", self.name, path.display());
        Ok(path)
    }

    fn half_range(&self) -> f32 {
        0.5 * (self.config.action_high - self.config.action_low)
    }

    /// Map raw actor output from `[-1, 1]` to `[action_low, action_high]`.
    fn scale_action(&self, mut raw: Array1<f32>) -> Array1<f32> {
        let (low, high) = (self.config.action_low, self.config.action_high);
        raw.mapv_inplace(|a| (a + 1.0) * 0.5 * (high - low) + low);
        raw
    }

    fn scale_action_batch(&self, mut raw: Array2<f32>) -> Array2<f32> {
        let (low, high) = (self.config.action_low, self.config.action_high);
        raw.mapv_inplace(|a| (a + 1.0) * 0.5 * (high - low) + low);
        raw
    }
}

/// Stack 1D views into a 2D batch array.
fn stack_batch(arrays: Vec<ArrayView1<f32>>) -> Array2<f32> {
    if arrays.is_empty() {
        return Array2::zeros((0, 0));
    }

    let rows = arrays.len();
    let cols = arrays[0].len();
    let mut result = Array2::zeros((rows, cols));
    for (i, arr) in arrays.iter().enumerate() {
        result.row_mut(i).assign(arr);
    }
    result
}

/// Concatenate two batches along the column axis.
fn concat_columns(left: ArrayView2<f32>, right: ArrayView2<f32>) -> Array2<f32> {
    let (rows, left_cols) = left.dim();
    let right_cols = right.dim().1;
    let mut result = Array2::zeros((rows, left_cols + right_cols));
    result.slice_mut(s![.., ..left_cols]).assign(&left);
    result.slice_mut(s![.., left_cols..]).assign(&right);
    result
}

/// Builder for [`DdpgAgent`]
pub struct DdpgBuilder {
    name: String,
    state_size: usize,
    action_size: usize,
    config: DdpgConfig,
    optimizer: Option<OptimizerWrapper>,
}

impl DdpgBuilder {
    pub fn new(state_size: usize, action_size: usize) -> Self {
        DdpgBuilder {
            name: "ddpg".to_string(),
            state_size,
            action_size,
            config: DdpgConfig::default(),
            optimizer: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn config(mut self, config: DdpgConfig) -> Self {
        self.config = config;
        self
    }

    pub fn hidden_sizes(mut self, sizes: Vec<usize>) -> Self {
        self.config.hidden_sizes = sizes;
        self
    }

    pub fn optimizer(mut self, optimizer: OptimizerWrapper) -> Self {
        self.optimizer = Some(optimizer);
        self
    }

    pub fn gamma(mut self, gamma: f32) -> Self {
        self.config.gamma = gamma;
        self
    }

    pub fn tau(mut self, tau: f32) -> Self {
        self.config.tau = tau;
        self
    }

    pub fn action_bounds(mut self, low: f32, high: f32) -> Self {
        self.config.action_low = low;
        self.config.action_high = high;
        self
    }

    pub fn noise_params(mut self, mu: f32, theta: f32, sigma: f32) -> Self {
        self.config.ou_mu = mu;
        self.config.ou_theta = theta;
        self.config.ou_sigma = sigma;
        self
    }

    pub fn buffer_size(mut self, capacity: usize) -> Self {
        self.config.buffer_size = capacity;
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    pub fn learn_every(mut self, steps: usize) -> Self {
        self.config.learn_every = steps;
        self
    }

    pub fn consecutive_learn_iterations(mut self, iterations: usize) -> Self {
        self.config.consecutive_learn_iterations = iterations;
        self
    }

    pub fn min_required_experience(mut self, transitions: usize) -> Self {
        self.config.min_required_experience = transitions;
        self
    }

    pub fn learning_rates(mut self, actor_lr: f32, critic_lr: f32) -> Self {
        self.config.actor_lr = actor_lr;
        self.config.critic_lr = critic_lr;
        self
    }

    pub fn weight_decay(mut self, weight_decay: f32) -> Self {
        self.config.weight_decay = weight_decay;
        self
    }

    pub fn exploration_decay(mut self, per_trigger: f32, per_iteration: f32) -> Self {
        self.config.exploration_decay = per_trigger;
        self.config.exploration_step_decay = per_iteration;
        self
    }

    pub fn max_grad_norm(mut self, max_norm: f32) -> Self {
        self.config.max_grad_norm = max_norm;
        self
    }

    pub fn build(self) -> Result<DdpgAgent> {
        let optimizer = self.optimizer.ok_or_else(|| TalosError::InvalidParameter {
            name: "optimizer".to_string(),
            reason: "Optimizer not specified".to_string(),
        })?;

        DdpgAgent::new(self.name, self.state_size, self.action_size, self.config, optimizer)
    }
}
