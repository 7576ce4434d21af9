use crate::noise::OrnsteinUhlenbeck;

#[test]
fn test_standard_parameters() {
    let mut noise = OrnsteinUhlenbeck::standard(2);
    assert_eq!(noise.len(), 2);
    assert_eq!(noise.sample().len(), 2);
}

#[test]
fn test_reset_after_sampling() {
    let mut noise = OrnsteinUhlenbeck::new(3, 0.0, 0.15, 0.2);
    for _ in 0..10 {
        noise.sample();
    }
    noise.reset();
    assert!(noise.state().iter().all(|&v| v == 0.0));
}

#[test]
fn test_degenerate_process_stays_at_mean() {
    // theta = 0 and sigma = 0: no pull, no noise
    let mut noise = OrnsteinUhlenbeck::new(2, 0.3, 0.0, 0.0);
    for _ in 0..5 {
        let sample = noise.sample();
        assert!(sample.iter().all(|&v| (v - 0.3).abs() < 1e-6));
    }
}

#[test]
fn test_long_run_mean_near_mu() {
    // The stationary distribution of the process is centered on mu.
    let mut noise = OrnsteinUhlenbeck::new(1, 0.0, 0.15, 0.2);
    let mut sum = 0.0;
    let n = 10_000;
    for _ in 0..n {
        sum += noise.sample()[0];
    }
    let mean = sum / n as f32;
    assert!(mean.abs() < 0.1, "long-run mean drifted: {}", mean);
}

#[test]
fn test_samples_are_correlated_with_state() {
    let mut noise = OrnsteinUhlenbeck::standard(2);
    let sample = noise.sample();
    assert_eq!(&sample, noise.state());
}
