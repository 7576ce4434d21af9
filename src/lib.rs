//! # Talos - Deep Deterministic Policy Gradient for Continuous Control
//!
//! Talos implements the DDPG algorithm on plain `ndarray` tensors with
//! hand-rolled backpropagation: actor and critic networks with target
//! copies and soft updates, an Ornstein-Uhlenbeck exploration noise
//! process, and a fixed-capacity experience replay buffer.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use talos::agent::DdpgBuilder;
//! use talos::optimizer::{Adam, OptimizerWrapper};
//!
//! // An agent for a 3-dimensional state and 1-dimensional action in [-2, 2]
//! let agent = DdpgBuilder::new(3, 1)
//!     .hidden_sizes(vec![256, 256])
//!     .optimizer(OptimizerWrapper::Adam(Adam::default()))
//!     .action_bounds(-2.0, 2.0)
//!     .build()
//!     .unwrap();
//! ```
//!
//! ## Module Organization
//!
//! - [`activations`] - Activation functions (ReLU, Tanh, Sigmoid, ...)
//! - [`agent`] - The DDPG agent, its configuration and builder
//! - [`error`] - Error types and result handling
//! - [`init`] - Weight initialization strategies
//! - [`metrics`] - Training metrics and tracking
//! - [`network`] - Core neural network implementation
//! - [`noise`] - Ornstein-Uhlenbeck exploration noise
//! - [`optimizer`] - Optimization algorithms and gradient clipping
//! - [`replay_buffer`] - Experience replay

pub mod activations;
pub mod agent;
pub mod error;
pub mod init;
pub mod metrics;
pub mod network;
pub mod noise;
pub mod optimizer;
pub mod replay_buffer;

#[cfg(test)]
mod tests;
