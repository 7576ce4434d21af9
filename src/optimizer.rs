//! Optimization algorithms and gradient clipping.
//!
//! Optimizer state is keyed by layer index so one optimizer instance can
//! serve a whole network; the state travels inside the network when it is
//! serialized, so checkpoints restore mid-training momentum exactly.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::network::LayerGradients;

pub trait Optimizer {
    fn update_weights(
        &mut self,
        layer_idx: usize,
        weights: &mut Array2<f32>,
        gradients: &Array2<f32>,
        learning_rate: f32,
    );

    fn update_biases(
        &mut self,
        layer_idx: usize,
        biases: &mut Array1<f32>,
        gradients: &Array1<f32>,
        learning_rate: f32,
    );
}

#[derive(Serialize, Deserialize, Clone)]
pub enum OptimizerWrapper {
    SGD(SGD),
    Adam(Adam),
    RMSProp(RMSProp),
}

impl Optimizer for OptimizerWrapper {
    fn update_weights(
        &mut self,
        layer_idx: usize,
        weights: &mut Array2<f32>,
        gradients: &Array2<f32>,
        learning_rate: f32,
    ) {
        match self {
            OptimizerWrapper::SGD(o) => o.update_weights(layer_idx, weights, gradients, learning_rate),
            OptimizerWrapper::Adam(o) => o.update_weights(layer_idx, weights, gradients, learning_rate),
            OptimizerWrapper::RMSProp(o) => o.update_weights(layer_idx, weights, gradients, learning_rate),
        }
    }

    fn update_biases(
        &mut self,
        layer_idx: usize,
        biases: &mut Array1<f32>,
        gradients: &Array1<f32>,
        learning_rate: f32,
    ) {
        match self {
            OptimizerWrapper::SGD(o) => o.update_biases(layer_idx, biases, gradients, learning_rate),
            OptimizerWrapper::Adam(o) => o.update_biases(layer_idx, biases, gradients, learning_rate),
            OptimizerWrapper::RMSProp(o) => o.update_biases(layer_idx, biases, gradients, learning_rate),
        }
    }
}

/// Plain stochastic gradient descent.
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct SGD;

impl SGD {
    pub fn new() -> SGD {
        SGD
    }
}

impl Optimizer for SGD {
    fn update_weights(
        &mut self,
        _layer_idx: usize,
        weights: &mut Array2<f32>,
        gradients: &Array2<f32>,
        learning_rate: f32,
    ) {
        weights.zip_mut_with(gradients, |w, &g| *w -= learning_rate * g);
    }

    fn update_biases(
        &mut self,
        _layer_idx: usize,
        biases: &mut Array1<f32>,
        gradients: &Array1<f32>,
        learning_rate: f32,
    ) {
        biases.zip_mut_with(gradients, |b, &g| *b -= learning_rate * g);
    }
}

/// Per-layer Adam state. Moments are sized lazily from the first gradient
/// seen for that layer, and each parameter tensor keeps its own timestep
/// for bias correction.
#[derive(Serialize, Deserialize, Clone, Default)]
struct AdamLayerState {
    m_weights: Array2<f32>,
    v_weights: Array2<f32>,
    m_biases: Array1<f32>,
    v_biases: Array1<f32>,
    t_weights: usize,
    t_biases: usize,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct Adam {
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
    state: Vec<AdamLayerState>,
}

impl Adam {
    pub fn new(beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Adam {
            beta1,
            beta2,
            epsilon,
            state: Vec::new(),
        }
    }

    fn slot_mut(&mut self, layer_idx: usize) -> &mut AdamLayerState {
        while self.state.len() <= layer_idx {
            self.state.push(AdamLayerState::default());
        }
        &mut self.state[layer_idx]
    }
}

impl Default for Adam {
    fn default() -> Self {
        Self::new(0.9, 0.999, 1e-8)
    }
}

impl Optimizer for Adam {
    fn update_weights(
        &mut self,
        layer_idx: usize,
        weights: &mut Array2<f32>,
        gradients: &Array2<f32>,
        learning_rate: f32,
    ) {
        let beta1 = self.beta1;
        let beta2 = self.beta2;
        let epsilon = self.epsilon;
        let slot = self.slot_mut(layer_idx);

        if slot.m_weights.dim() != gradients.dim() {
            slot.m_weights = Array2::zeros(gradients.dim());
            slot.v_weights = Array2::zeros(gradients.dim());
            slot.t_weights = 0;
        }
        slot.t_weights += 1;
        let t = slot.t_weights as i32;

        slot.m_weights = &slot.m_weights * beta1 + gradients * (1.0 - beta1);
        slot.v_weights = &slot.v_weights * beta2 + &(gradients * gradients) * (1.0 - beta2);

        let m_hat = slot.m_weights.mapv(|x| x / (1.0 - beta1.powi(t)));
        let v_hat = slot.v_weights.mapv(|x| x / (1.0 - beta2.powi(t)));

        *weights -= &((&m_hat / (v_hat.mapv(f32::sqrt) + epsilon)) * learning_rate);
    }

    fn update_biases(
        &mut self,
        layer_idx: usize,
        biases: &mut Array1<f32>,
        gradients: &Array1<f32>,
        learning_rate: f32,
    ) {
        let beta1 = self.beta1;
        let beta2 = self.beta2;
        let epsilon = self.epsilon;
        let slot = self.slot_mut(layer_idx);

        if slot.m_biases.dim() != gradients.dim() {
            slot.m_biases = Array1::zeros(gradients.dim());
            slot.v_biases = Array1::zeros(gradients.dim());
            slot.t_biases = 0;
        }
        slot.t_biases += 1;
        let t = slot.t_biases as i32;

        slot.m_biases = &slot.m_biases * beta1 + gradients * (1.0 - beta1);
        slot.v_biases = &slot.v_biases * beta2 + &(gradients * gradients) * (1.0 - beta2);

        let m_hat = slot.m_biases.mapv(|x| x / (1.0 - beta1.powi(t)));
        let v_hat = slot.v_biases.mapv(|x| x / (1.0 - beta2.powi(t)));

        *biases -= &((&m_hat / (v_hat.mapv(f32::sqrt) + epsilon)) * learning_rate);
    }
}

/// RMSProp optimizer with per-layer squared-gradient state.
#[derive(Serialize, Deserialize, Clone)]
pub struct RMSProp {
    pub beta: f32,
    pub epsilon: f32,
    v_weights: Vec<Array2<f32>>,
    v_biases: Vec<Array1<f32>>,
}

impl RMSProp {
    pub fn new(beta: f32, epsilon: f32) -> Self {
        RMSProp {
            beta,
            epsilon,
            v_weights: Vec::new(),
            v_biases: Vec::new(),
        }
    }
}

impl Default for RMSProp {
    fn default() -> Self {
        Self::new(0.9, 1e-8)
    }
}

impl Optimizer for RMSProp {
    fn update_weights(
        &mut self,
        layer_idx: usize,
        weights: &mut Array2<f32>,
        gradients: &Array2<f32>,
        learning_rate: f32,
    ) {
        while self.v_weights.len() <= layer_idx {
            self.v_weights.push(Array2::zeros((0, 0)));
        }
        let v = &mut self.v_weights[layer_idx];
        if v.dim() != gradients.dim() {
            *v = Array2::zeros(gradients.dim());
        }

        *v = &*v * self.beta + &(gradients * gradients) * (1.0 - self.beta);
        *weights -= &((gradients / (v.mapv(f32::sqrt) + self.epsilon)) * learning_rate);
    }

    fn update_biases(
        &mut self,
        layer_idx: usize,
        biases: &mut Array1<f32>,
        gradients: &Array1<f32>,
        learning_rate: f32,
    ) {
        while self.v_biases.len() <= layer_idx {
            self.v_biases.push(Array1::zeros(0));
        }
        let v = &mut self.v_biases[layer_idx];
        if v.dim() != gradients.dim() {
            *v = Array1::zeros(gradients.dim());
        }

        *v = &*v * self.beta + &(gradients * gradients) * (1.0 - self.beta);
        *biases -= &((gradients / (v.mapv(f32::sqrt) + self.epsilon)) * learning_rate);
    }
}

/// Gradient clipping methods
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum GradientClipper {
    /// Clip every gradient element into `[min, max]`
    ClipByValue { min: f32, max: f32 },

    /// Rescale each tensor whose norm exceeds `max_norm`
    ClipByNorm { max_norm: f32 },

    /// Rescale the whole gradient set when its joint norm exceeds `max_norm`
    ClipByGlobalNorm { max_norm: f32 },

    /// No clipping
    None,
}

impl GradientClipper {
    /// Clip a network's gradient set in place.
    pub fn clip(&self, gradients: &mut [LayerGradients]) {
        match self {
            GradientClipper::ClipByValue { min, max } => {
                for grads in gradients.iter_mut() {
                    grads.weights.mapv_inplace(|g| g.clamp(*min, *max));
                    grads.biases.mapv_inplace(|g| g.clamp(*min, *max));
                }
            }

            GradientClipper::ClipByNorm { max_norm } => {
                for grads in gradients.iter_mut() {
                    let weight_norm = grads.weights.iter().map(|&g| g * g).sum::<f32>().sqrt();
                    if weight_norm > *max_norm {
                        let scale = max_norm / weight_norm;
                        grads.weights.mapv_inplace(|g| g * scale);
                    }
                    let bias_norm = grads.biases.iter().map(|&g| g * g).sum::<f32>().sqrt();
                    if bias_norm > *max_norm {
                        let scale = max_norm / bias_norm;
                        grads.biases.mapv_inplace(|g| g * scale);
                    }
                }
            }

            GradientClipper::ClipByGlobalNorm { max_norm } => {
                let global_norm = Self::global_norm(gradients);
                if global_norm > *max_norm {
                    let scale = max_norm / global_norm;
                    for grads in gradients.iter_mut() {
                        grads.weights.mapv_inplace(|g| g * scale);
                        grads.biases.mapv_inplace(|g| g * scale);
                    }
                }
            }

            GradientClipper::None => {}
        }
    }

    /// Joint L2 norm of a gradient set.
    pub fn global_norm(gradients: &[LayerGradients]) -> f32 {
        gradients
            .iter()
            .map(|g| {
                g.weights.iter().map(|&x| x * x).sum::<f32>()
                    + g.biases.iter().map(|&x| x * x).sum::<f32>()
            })
            .sum::<f32>()
            .sqrt()
    }
}
