//! Activation functions for network layers.
//!
//! ReLU is the default for hidden layers. The actor's output layer uses
//! Tanh so raw actions land in `[-1, 1]` before scaling; the critic's
//! output layer is Linear.

use ndarray::{Array1, Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// An enumeration of the activation functions usable in a network layer.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default)]
pub enum Activation {
    #[default]
    Relu,
    Linear,
    Tanh,
    Sigmoid,
    LeakyRelu { alpha: f32 },
}

impl Activation {
    /// Apply the activation function to an input array in-place.
    pub fn apply(&self, input: &mut Array1<f32>) {
        match self {
            Activation::Relu => {
                input.mapv_inplace(|v| v.max(0.0));
            }
            Activation::Linear => {}
            Activation::Tanh => {
                input.mapv_inplace(|v| v.tanh());
            }
            Activation::Sigmoid => {
                input.mapv_inplace(|v| 1.0 / (1.0 + (-v).exp()));
            }
            Activation::LeakyRelu { alpha } => {
                let a = *alpha;
                input.mapv_inplace(|v| if v > 0.0 { v } else { a * v });
            }
        }
    }

    /// Apply the activation function to a batch of inputs in-place.
    pub fn apply_batch(&self, inputs: &mut Array2<f32>) {
        match self {
            Activation::Relu => {
                inputs.mapv_inplace(|v| v.max(0.0));
            }
            Activation::Linear => {}
            Activation::Tanh => {
                inputs.mapv_inplace(|v| v.tanh());
            }
            Activation::Sigmoid => {
                inputs.mapv_inplace(|v| 1.0 / (1.0 + (-v).exp()));
            }
            Activation::LeakyRelu { alpha } => {
                let a = *alpha;
                inputs.mapv_inplace(|v| if v > 0.0 { v } else { a * v });
            }
        }
    }

    /// Compute the derivative of the activation for a pre-activation array.
    pub fn derivative(&self, input: &Array1<f32>) -> Array1<f32> {
        match self {
            Activation::Relu => input.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 }),
            Activation::Linear => Array1::ones(input.len()),
            Activation::Tanh => input.mapv(|v| {
                let t = v.tanh();
                1.0 - t * t
            }),
            Activation::Sigmoid => input.mapv(|v| {
                let s = 1.0 / (1.0 + (-v).exp());
                s * (1.0 - s)
            }),
            Activation::LeakyRelu { alpha } => {
                let a = *alpha;
                input.mapv(|v| if v > 0.0 { 1.0 } else { a })
            }
        }
    }

    /// Compute the derivative of the activation for a batch of pre-activations.
    pub fn derivative_batch(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        match self {
            Activation::Relu => inputs.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 }),
            Activation::Linear => Array2::ones(inputs.dim()),
            Activation::Tanh => inputs.mapv(|v| {
                let t = v.tanh();
                1.0 - t * t
            }),
            Activation::Sigmoid => inputs.mapv(|v| {
                let s = 1.0 / (1.0 + (-v).exp());
                s * (1.0 - s)
            }),
            Activation::LeakyRelu { alpha } => {
                let a = *alpha;
                inputs.mapv(|v| if v > 0.0 { 1.0 } else { a })
            }
        }
    }
}
