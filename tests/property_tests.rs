#[cfg(test)]
mod property_tests {
    use ndarray::Array1;
    use proptest::prelude::*;
    use talos::activations::Activation;
    use talos::agent::DdpgBuilder;
    use talos::network::NeuralNetwork;
    use talos::noise::OrnsteinUhlenbeck;
    use talos::optimizer::{OptimizerWrapper, SGD};
    use talos::replay_buffer::{Experience, ReplayBuffer};

    // Strategy for generating bounded state vectors
    fn state_strategy(size: usize) -> impl Strategy<Value = Array1<f32>> {
        prop::collection::vec(-10.0f32..10.0, size).prop_map(Array1::from_vec)
    }

    proptest! {
        #[test]
        fn test_actions_always_within_bounds(
            state in state_strategy(3),
            low in -5.0f32..-0.1,
            span in 0.1f32..10.0,
        ) {
            let high = low + span;
            let mut agent = DdpgBuilder::new(3, 2)
                .hidden_sizes(vec![8])
                .action_bounds(low, high)
                .optimizer(OptimizerWrapper::SGD(SGD::new()))
                .build()
                .unwrap();

            for add_noise in [false, true] {
                let action = agent.act(state.view(), add_noise).unwrap();
                prop_assert_eq!(action.len(), 2);
                for &a in action.iter() {
                    prop_assert!(a >= low && a <= high,
                        "action {} escaped [{}, {}]", a, low, high);
                }
            }
        }

        #[test]
        fn test_replay_buffer_never_exceeds_capacity(
            capacity in 1usize..=32,
            additions in 0usize..=100,
        ) {
            let mut buffer = ReplayBuffer::new(capacity);
            for i in 0..additions {
                buffer.add(Experience {
                    state: Array1::zeros(2),
                    action: Array1::zeros(1),
                    reward: i as f32,
                    next_state: Array1::zeros(2),
                    done: false,
                });
                prop_assert!(buffer.len() <= capacity);
            }
            prop_assert_eq!(buffer.len(), additions.min(capacity));
        }

        #[test]
        fn test_replay_buffer_keeps_newest(
            capacity in 1usize..=16,
            additions in 17usize..=64,
        ) {
            let mut buffer = ReplayBuffer::new(capacity);
            for i in 0..additions {
                buffer.add(Experience {
                    state: Array1::zeros(1),
                    action: Array1::zeros(1),
                    reward: i as f32,
                    next_state: Array1::zeros(1),
                    done: false,
                });
            }
            let oldest_kept = (additions - capacity) as f32;
            for e in buffer.sample(capacity) {
                prop_assert!(e.reward >= oldest_kept);
            }
        }

        #[test]
        fn test_soft_update_endpoints(
            tau in 0.0f32..=1.0,
        ) {
            let optimizer = OptimizerWrapper::SGD(SGD::new());
            let source = NeuralNetwork::new(&[2, 4, 1],
                &[Activation::Relu, Activation::Linear], optimizer.clone());
            let mut target = NeuralNetwork::new(&[2, 4, 1],
                &[Activation::Relu, Activation::Linear], optimizer);
            let frozen = target.clone();

            target.soft_update_from(&source, tau);

            for ((updated, src), old) in target.layers.iter()
                .zip(source.layers.iter())
                .zip(frozen.layers.iter())
            {
                for ((&u, &s), &o) in updated.weights.iter()
                    .zip(src.weights.iter())
                    .zip(old.weights.iter())
                {
                    let expected = tau * s + (1.0 - tau) * o;
                    prop_assert!((u - expected).abs() < 1e-5);
                }
            }
        }

        #[test]
        fn test_ou_noise_contracts_without_stochastic_term(
            mu in -1.0f32..1.0,
            theta in 0.01f32..0.9,
        ) {
            let mut noise = OrnsteinUhlenbeck::new(1, mu, theta, 0.0);
            // Start at the mean, so with sigma = 0 the process never leaves it
            let sample = noise.sample();
            prop_assert!((sample[0] - mu).abs() < 1e-6);

            // After a reset the state is exactly the mean again
            noise.reset();
            prop_assert!((noise.state()[0] - mu).abs() < 1e-6);
        }

        #[test]
        fn test_forward_outputs_are_finite(
            state in state_strategy(4),
        ) {
            let optimizer = OptimizerWrapper::SGD(SGD::new());
            let mut network = NeuralNetwork::new(&[4, 16, 2],
                &[Activation::Relu, Activation::Tanh], optimizer);

            let output = network.forward(state.view());
            for &v in output.iter() {
                prop_assert!(v.is_finite());
                prop_assert!((-1.0..=1.0).contains(&v));
            }
        }
    }
}
