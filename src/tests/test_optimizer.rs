use crate::network::LayerGradients;
use crate::optimizer::{Adam, GradientClipper, Optimizer, OptimizerWrapper, RMSProp, SGD};
use ndarray::{array, Array1, Array2};

#[test]
fn test_sgd_moves_against_gradient() {
    let mut sgd = SGD::new();
    let mut weights = array![[1.0, 1.0]];
    let gradients = array![[0.5, -0.5]];

    sgd.update_weights(0, &mut weights, &gradients, 0.1);
    assert!((weights[[0, 0]] - 0.95).abs() < 1e-6);
    assert!((weights[[0, 1]] - 1.05).abs() < 1e-6);

    let mut biases = array![1.0];
    sgd.update_biases(0, &mut biases, &array![1.0], 0.1);
    assert!((biases[0] - 0.9).abs() < 1e-6);
}

#[test]
fn test_adam_first_step_magnitude() {
    // With bias correction, the very first Adam step is close to lr
    // in the direction opposing the gradient.
    let mut adam = Adam::default();
    let mut weights = array![[0.0]];
    let gradients = array![[10.0]];

    adam.update_weights(0, &mut weights, &gradients, 0.01);
    assert!(weights[[0, 0]] < 0.0);
    assert!((weights[[0, 0]] + 0.01).abs() < 1e-3);
}

#[test]
fn test_adam_state_is_per_layer() {
    let mut adam = Adam::default();
    let mut w0 = array![[0.0]];
    let mut w1 = array![[0.0, 0.0]];

    // Different layers with different shapes must not clobber each other
    adam.update_weights(0, &mut w0, &array![[1.0]], 0.01);
    adam.update_weights(1, &mut w1, &array![[1.0, -1.0]], 0.01);
    adam.update_weights(0, &mut w0, &array![[1.0]], 0.01);

    assert!(w0[[0, 0]] < 0.0);
    assert!(w1[[0, 0]] < 0.0);
    assert!(w1[[0, 1]] > 0.0);
}

#[test]
fn test_adam_converges_on_quadratic() {
    // Minimize f(w) = w² with gradient 2w
    let mut adam = Adam::default();
    let mut weights = array![[5.0]];

    for _ in 0..2000 {
        let gradients = &weights * 2.0;
        adam.update_weights(0, &mut weights, &gradients, 0.05);
    }
    assert!(weights[[0, 0]].abs() < 0.1);
}

#[test]
fn test_rmsprop_moves_against_gradient() {
    let mut rmsprop = RMSProp::default();
    let mut weights = array![[1.0]];
    rmsprop.update_weights(0, &mut weights, &array![[1.0]], 0.01);
    assert!(weights[[0, 0]] < 1.0);
}

#[test]
fn test_wrapper_dispatch() {
    let mut wrapper = OptimizerWrapper::SGD(SGD::new());
    let mut weights = array![[1.0]];
    wrapper.update_weights(0, &mut weights, &array![[1.0]], 0.5);
    assert!((weights[[0, 0]] - 0.5).abs() < 1e-6);
}

fn gradient_set(weight_value: f32, bias_value: f32) -> Vec<LayerGradients> {
    vec![LayerGradients {
        weights: Array2::from_elem((2, 2), weight_value),
        biases: Array1::from_elem(2, bias_value),
    }]
}

#[test]
fn test_clip_by_value() {
    let mut gradients = gradient_set(5.0, -5.0);
    GradientClipper::ClipByValue { min: -1.0, max: 1.0 }.clip(&mut gradients);

    assert!(gradients[0].weights.iter().all(|&g| g == 1.0));
    assert!(gradients[0].biases.iter().all(|&g| g == -1.0));
}

#[test]
fn test_clip_by_global_norm_rescales() {
    let mut gradients = gradient_set(3.0, 4.0);
    let before = GradientClipper::global_norm(&gradients);
    assert!(before > 1.0);

    GradientClipper::ClipByGlobalNorm { max_norm: 1.0 }.clip(&mut gradients);
    let after = GradientClipper::global_norm(&gradients);
    assert!((after - 1.0).abs() < 1e-5);

    // Direction is preserved
    let w = gradients[0].weights[[0, 0]];
    let b = gradients[0].biases[0];
    assert!((b / w - 4.0 / 3.0).abs() < 1e-5);
}

#[test]
fn test_clip_global_norm_no_op_below_threshold() {
    let mut gradients = gradient_set(1e-3, 1e-3);
    let before = gradients[0].weights.clone();
    GradientClipper::ClipByGlobalNorm { max_norm: 1.0 }.clip(&mut gradients);
    assert_eq!(gradients[0].weights, before);
}

#[test]
fn test_clip_none_is_identity() {
    let mut gradients = gradient_set(100.0, -100.0);
    GradientClipper::None.clip(&mut gradients);
    assert!(gradients[0].weights.iter().all(|&g| g == 100.0));
}
