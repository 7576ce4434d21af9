use crate::activations::Activation;
use crate::init::WeightInit;
use crate::network::{Layer, NeuralNetwork};
use crate::optimizer::{OptimizerWrapper, SGD};
use ndarray::{array, Array2};

fn small_network() -> NeuralNetwork {
    let optimizer = OptimizerWrapper::SGD(SGD::new());
    NeuralNetwork::new(&[3, 8, 2], &[Activation::Relu, Activation::Linear], optimizer)
}

#[test]
fn test_forward_output_shape() {
    let mut network = small_network();
    let output = network.forward(array![0.1, 0.2, 0.3].view());
    assert_eq!(output.len(), 2);
}

#[test]
fn test_forward_batch_output_shape() {
    let mut network = small_network();
    let inputs = Array2::zeros((5, 3));
    let outputs = network.forward_batch(inputs.view());
    assert_eq!(outputs.dim(), (5, 2));
}

#[test]
fn test_forward_is_deterministic() {
    let mut network = small_network();
    let input = array![0.5, -0.5, 1.0];
    let first = network.forward(input.view());
    let second = network.forward(input.view());
    assert_eq!(first, second);
}

#[test]
fn test_sizes() {
    let network = small_network();
    assert_eq!(network.input_size(), 3);
    assert_eq!(network.output_size(), 2);
    assert_eq!(network.layers.len(), 2);
}

#[test]
fn test_backward_input_error_shape() {
    let mut network = small_network();
    let inputs = Array2::ones((4, 3));
    network.forward_batch(inputs.view());

    let output_errors = Array2::ones((4, 2));
    let (gradients, input_errors) = network.backward_batch(output_errors.view());

    assert_eq!(gradients.len(), 2);
    assert_eq!(gradients[0].weights.dim(), (3, 8));
    assert_eq!(gradients[0].biases.len(), 8);
    assert_eq!(gradients[1].weights.dim(), (8, 2));
    assert_eq!(input_errors.dim(), (4, 3));
}

#[test]
fn test_input_error_matches_analytic_linear_case() {
    // Single linear layer: y = x·W + b, so dL/dx = dL/dy · Wᵀ exactly.
    let optimizer = OptimizerWrapper::SGD(SGD::new());
    let layer = Layer::new(2, 1, Activation::Linear)
        .with_weights(array![[2.0], [-3.0]])
        .with_biases(array![0.0]);
    let mut network = NeuralNetwork {
        layers: vec![layer],
        optimizer,
    };

    let inputs = array![[1.0, 1.0]];
    network.forward_batch(inputs.view());

    let output_errors = array![[1.0]];
    let (_, input_errors) = network.backward_batch(output_errors.view());
    assert!((input_errors[[0, 0]] - 2.0).abs() < 1e-6);
    assert!((input_errors[[0, 1]] + 3.0).abs() < 1e-6);
}

#[test]
fn test_train_minibatch_reduces_loss() {
    // Fit y = x0 + x1 on a fixed batch
    let optimizer = OptimizerWrapper::SGD(SGD::new());
    let mut network = NeuralNetwork::new(&[2, 1], &[Activation::Linear], optimizer);

    let inputs = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0], [0.5, 0.5]];
    let targets = array![[1.0], [1.0], [2.0], [1.0]];

    let first_loss = network.train_minibatch(inputs.view(), targets.view(), 0.5);
    let mut last_loss = first_loss;
    for _ in 0..200 {
        last_loss = network.train_minibatch(inputs.view(), targets.view(), 0.5);
    }
    assert!(last_loss < first_loss);
    assert!(last_loss < 0.01);
}

#[test]
fn test_soft_update_blends_parameters() {
    let optimizer = OptimizerWrapper::SGD(SGD::new());
    let source = NeuralNetwork {
        layers: vec![Layer::new(1, 1, Activation::Linear)
            .with_weights(array![[1.0]])
            .with_biases(array![1.0])],
        optimizer: optimizer.clone(),
    };
    let mut target = NeuralNetwork {
        layers: vec![Layer::new(1, 1, Activation::Linear)
            .with_weights(array![[0.0]])
            .with_biases(array![0.0])],
        optimizer,
    };

    target.soft_update_from(&source, 0.1);
    assert!((target.layers[0].weights[[0, 0]] - 0.1).abs() < 1e-6);
    assert!((target.layers[0].biases[0] - 0.1).abs() < 1e-6);

    target.soft_update_from(&source, 1.0);
    assert!((target.layers[0].weights[[0, 0]] - 1.0).abs() < 1e-6);
}

#[test]
fn test_hard_update_copies_parameters() {
    let optimizer = OptimizerWrapper::SGD(SGD::new());
    let source = small_network();
    let mut target = small_network();
    target.hard_update_from(&source);

    for (src, dst) in source.layers.iter().zip(target.layers.iter()) {
        assert_eq!(src.weights, dst.weights);
        assert_eq!(src.biases, dst.biases);
    }
}

#[test]
fn test_save_load_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("network.bin");
    let path = path.to_str().unwrap();

    let mut network = small_network();
    let input = array![0.1, -0.2, 0.3];
    let before = network.forward(input.view());

    network.save(path).unwrap();
    let mut restored = NeuralNetwork::load(path).unwrap();
    let after = restored.forward(input.view());

    assert_eq!(before, after);
}

#[test]
fn test_explicit_init_zeros() {
    let layer = Layer::new_with_init(4, 3, Activation::Relu, WeightInit::Zeros);
    assert!(layer.weights.iter().all(|&w| w == 0.0));
    assert!(layer.biases.iter().all(|&b| b == 0.0));
}

#[test]
fn test_fan_in_init_range() {
    let layer = Layer::new_with_init(100, 10, Activation::Relu, WeightInit::FanInUniform);
    let limit = 1.0 / (100.0_f32).sqrt();
    for &w in layer.weights.iter() {
        assert!(w.abs() <= limit);
    }
}
