//! # Deep Deterministic Policy Gradient agents
//!
//! This module provides the [`DdpgAgent`], an off-policy actor-critic
//! agent for continuous action spaces.
//!
//! ## Core Concepts
//!
//! - **Deterministic policy**: the actor maps a state directly to an
//!   action instead of a distribution over actions
//! - **Q-learning critic**: the critic estimates the value of
//!   state-action pairs and supplies the policy gradient
//! - **Target networks**: slowly blended copies of actor and critic
//!   stabilize the bootstrap targets
//! - **Exploration noise**: a temporally correlated Ornstein-Uhlenbeck
//!   process perturbs actions during training
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use talos::agent::DdpgBuilder;
//! use talos::optimizer::{Adam, OptimizerWrapper};
//! use ndarray::array;
//!
//! // An agent for a 3-dimensional state and 1-dimensional action
//! let mut agent = DdpgBuilder::new(3, 1)
//!     .hidden_sizes(vec![128, 128])
//!     .optimizer(OptimizerWrapper::Adam(Adam::default()))
//!     .action_bounds(-2.0, 2.0)
//!     .build()
//!     .unwrap();
//!
//! let state = array![0.1, -0.2, 0.3];
//! let action = agent.act(state.view(), true).unwrap();
//!
//! // After an environment step:
//! let next_state = array![0.15, -0.25, 0.35];
//! agent.observe(state, action, 1.0, next_state, false);
//! if let Some((critic_loss, actor_loss)) = agent.trigger_learn().unwrap() {
//!     println!("critic {critic_loss:.4} actor {actor_loss:.4}");
//! }
//! ```

mod ddpg;

pub use ddpg::{DdpgAgent, DdpgBuilder, DdpgConfig};
