//! Core feed-forward network with hand-rolled backpropagation.
//!
//! `backward_batch` returns the error with respect to the network *input*
//! in addition to the per-layer gradients. The actor update relies on
//! this: the policy gradient is obtained by pushing `-1/B` through the
//! critic and reading off the error on the action columns of its input.

use bincode::{deserialize, serialize};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use std::fs;

use crate::activations::Activation;
use crate::error::Result;
use crate::init::WeightInit;
use crate::optimizer::{Optimizer, OptimizerWrapper};

/// A fully connected layer: weights, biases, and an activation function.
///
/// The inputs and pre-activation outputs of the most recent forward pass
/// are cached so a subsequent backward pass can compute gradients.
#[derive(Serialize, Deserialize, Clone)]
pub struct Layer {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
    pub activation: Activation,
    #[serde(skip)]
    pre_activation: Option<Array2<f32>>,
    #[serde(skip)]
    inputs: Option<Array2<f32>>,
}

/// Weight and bias gradients for a single layer.
#[derive(Clone, Debug)]
pub struct LayerGradients {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
}

impl Layer {
    /// Create a new layer with weights uniform in `[-0.1, 0.1]` and zero biases.
    pub fn new(input_size: usize, output_size: usize, activation: Activation) -> Self {
        Self::new_with_init(
            input_size,
            output_size,
            activation,
            WeightInit::Uniform { min: -0.1, max: 0.1 },
        )
    }

    /// Create a new layer with an explicit initialization strategy.
    pub fn new_with_init(
        input_size: usize,
        output_size: usize,
        activation: Activation,
        init: WeightInit,
    ) -> Self {
        Layer {
            weights: init.initialize_weights((input_size, output_size)),
            biases: init.initialize_biases(output_size),
            activation,
            pre_activation: None,
            inputs: None,
        }
    }

    pub fn with_weights(mut self, weights: Array2<f32>) -> Self {
        assert_eq!(weights.dim(), self.weights.dim());
        self.weights = weights;
        self
    }

    pub fn with_biases(mut self, biases: Array1<f32>) -> Self {
        assert_eq!(biases.dim(), self.biases.dim());
        self.biases = biases;
        self
    }

    /// Forward pass for a batch of input vectors, caching intermediates.
    fn forward_batch(&mut self, inputs: ArrayView2<f32>) -> Array2<f32> {
        self.inputs = Some(inputs.to_owned());
        let mut outputs = inputs.dot(&self.weights) + &self.biases.view().insert_axis(Axis(0));
        self.pre_activation = Some(outputs.clone());
        self.activation.apply_batch(&mut outputs);
        outputs
    }

    /// Gradients for a batch of output errors, using the cached forward state.
    ///
    /// Returns `(input_errors, gradients)` where `input_errors` is the error
    /// propagated to this layer's input.
    fn backward_batch(&self, output_errors: ArrayView2<f32>) -> (Array2<f32>, LayerGradients) {
        let pre_activation = self
            .pre_activation
            .as_ref()
            .expect("forward_batch() must be called before backward_batch()");
        let inputs = self
            .inputs
            .as_ref()
            .expect("forward_batch() must be called before backward_batch()");

        let activation_deriv = self.activation.derivative_batch(pre_activation.view());
        let delta = output_errors.to_owned() * &activation_deriv;
        let weight_gradients = inputs.t().dot(&delta);
        let bias_gradients = delta.sum_axis(Axis(0));
        let input_errors = delta.dot(&self.weights.t());

        (
            input_errors,
            LayerGradients {
                weights: weight_gradients,
                biases: bias_gradients,
            },
        )
    }

    pub fn input_size(&self) -> usize {
        self.weights.nrows()
    }

    pub fn output_size(&self) -> usize {
        self.weights.ncols()
    }
}

/// A feed-forward neural network: ordered layers plus an optimizer.
#[derive(Serialize, Deserialize, Clone)]
pub struct NeuralNetwork {
    pub layers: Vec<Layer>,
    pub optimizer: OptimizerWrapper,
}

impl NeuralNetwork {
    /// Create a network from consecutive layer sizes and activations.
    ///
    /// `layer_sizes` has one more entry than `activations`; each window of
    /// two sizes becomes one layer.
    pub fn new(layer_sizes: &[usize], activations: &[Activation], optimizer: OptimizerWrapper) -> Self {
        assert_eq!(layer_sizes.len() - 1, activations.len());

        let layers = layer_sizes
            .windows(2)
            .zip(activations.iter())
            .map(|(window, &activation)| Layer::new(window[0], window[1], activation))
            .collect::<Vec<_>>();

        NeuralNetwork { layers, optimizer }
    }

    /// Create a network with a per-layer initialization strategy.
    pub fn new_with_init(
        layer_sizes: &[usize],
        activations: &[Activation],
        inits: &[WeightInit],
        optimizer: OptimizerWrapper,
    ) -> Self {
        assert_eq!(layer_sizes.len() - 1, activations.len());
        assert_eq!(activations.len(), inits.len());

        let layers = layer_sizes
            .windows(2)
            .zip(activations.iter().zip(inits.iter()))
            .map(|(window, (&activation, &init))| {
                Layer::new_with_init(window[0], window[1], activation, init)
            })
            .collect::<Vec<_>>();

        NeuralNetwork { layers, optimizer }
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, Layer::input_size)
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, Layer::output_size)
    }

    /// Forward pass for a single input vector.
    pub fn forward(&mut self, input: ArrayView1<f32>) -> Array1<f32> {
        let input = input.insert_axis(Axis(0));
        let output = self.forward_batch(input);
        let output_size = output.shape()[1];
        output.into_shape((output_size,)).unwrap()
    }

    /// Forward pass for a batch of input vectors, caching layer intermediates.
    pub fn forward_batch(&mut self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let mut current = inputs.to_owned();
        for layer in &mut self.layers {
            current = layer.forward_batch(current.view());
        }
        current
    }

    /// Backpropagate arbitrary output-side errors through the network.
    ///
    /// Must follow a `forward_batch` on the inputs the errors refer to.
    /// Returns per-layer gradients (input layer first) and the error with
    /// respect to the network input.
    pub fn backward_batch(
        &self,
        output_errors: ArrayView2<f32>,
    ) -> (Vec<LayerGradients>, Array2<f32>) {
        let mut gradients = Vec::with_capacity(self.layers.len());
        let mut current_errors = output_errors.to_owned();

        for layer in self.layers.iter().rev() {
            let (input_errors, layer_gradients) = layer.backward_batch(current_errors.view());
            gradients.push(layer_gradients);
            current_errors = input_errors;
        }

        gradients.reverse();
        (gradients, current_errors)
    }

    /// Apply per-layer gradients through the optimizer.
    pub fn apply_gradients(&mut self, gradients: &[LayerGradients], learning_rate: f32) {
        for (idx, (layer, grads)) in self.layers.iter_mut().zip(gradients).enumerate() {
            self.optimizer
                .update_weights(idx, &mut layer.weights, &grads.weights, learning_rate);
            self.optimizer
                .update_biases(idx, &mut layer.biases, &grads.biases, learning_rate);
        }
    }

    /// Supervised MSE training step on a minibatch. Returns the loss before
    /// the update.
    pub fn train_minibatch(
        &mut self,
        inputs: ArrayView2<f32>,
        targets: ArrayView2<f32>,
        learning_rate: f32,
    ) -> f32 {
        let outputs = self.forward_batch(inputs);
        let diff = &outputs - &targets;
        let n = diff.len() as f32;
        let loss = diff.mapv(|x| x * x).sum() / n;

        let output_errors = diff * (2.0 / n);
        let (gradients, _) = self.backward_batch(output_errors.view());
        self.apply_gradients(&gradients, learning_rate);
        loss
    }

    /// Polyak-blend this network's parameters toward `source`:
    /// `θ ← τ·θ_source + (1 − τ)·θ`.
    pub fn soft_update_from(&mut self, source: &NeuralNetwork, tau: f32) {
        for (target, src) in self.layers.iter_mut().zip(source.layers.iter()) {
            target.weights = &target.weights * (1.0 - tau) + &src.weights * tau;
            target.biases = &target.biases * (1.0 - tau) + &src.biases * tau;
        }
    }

    /// Copy all parameters from `source`.
    pub fn hard_update_from(&mut self, source: &NeuralNetwork) {
        for (target, src) in self.layers.iter_mut().zip(source.layers.iter()) {
            target.weights = src.weights.clone();
            target.biases = src.biases.clone();
        }
    }

    /// Serialize the network (including optimizer state) to a file.
    pub fn save(&self, path: &str) -> Result<()> {
        let serialized = serialize(self)?;
        fs::write(path, serialized)?;
        Ok(())
    }

    /// Load a network from a file written by [`NeuralNetwork::save`].
    pub fn load(path: &str) -> Result<Self> {
        let data = fs::read(path)?;
        let network = deserialize(&data)?;
        Ok(network)
    }
}
